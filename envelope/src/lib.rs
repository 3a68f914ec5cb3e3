//! X12 Envelope Library
//!
//! Builds interchanges, functional groups and transaction sets from a stream
//! of tokenized segments and validates each envelope as it closes.
//!
//! The [`EnvelopeMachine`] is a [`segment::SegmentHandler`]: feed it segments
//! through a [`segment::SegmentBuffer`] and call
//! [`EnvelopeMachine::finish`] at end of input to collect the completed
//! interchanges.
//!
//! ```ignore
//! let mut machine = EnvelopeMachine::new(delimiters);
//! buffer.drain(&delimiters, &mut machine)?;
//! let interchanges = machine.finish()?;
//! ```

mod machine;
mod model;
mod validate;

use core::fmt;

pub use machine::EnvelopeMachine;
pub use model::{FunctionalGroup, Interchange, SegmentLookup, TransactionSet};

/// Nesting level bounded by an envelope pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeLevel {
    /// ISA / IEA
    Interchange,
    /// GS / GE
    FunctionalGroup,
    /// ST / SE
    TransactionSet,
}

impl EnvelopeLevel {
    /// Identifier of the opening segment
    pub fn header_id(self) -> &'static str {
        match self {
            Self::Interchange => "ISA",
            Self::FunctionalGroup => "GS",
            Self::TransactionSet => "ST",
        }
    }

    /// Identifier of the closing segment
    pub fn trailer_id(self) -> &'static str {
        match self {
            Self::Interchange => "IEA",
            Self::FunctionalGroup => "GE",
            Self::TransactionSet => "SE",
        }
    }

    /// What the trailer's count element counts
    fn children(self) -> &'static str {
        match self {
            Self::Interchange => "functional group",
            Self::FunctionalGroup => "transaction set",
            Self::TransactionSet => "segment",
        }
    }
}

impl fmt::Display for EnvelopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interchange => write!(f, "interchange"),
            Self::FunctionalGroup => write!(f, "functional group"),
            Self::TransactionSet => write!(f, "transaction set"),
        }
    }
}

/// Segment identifiers the envelope grammar gives meaning to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    InterchangeHeader,
    InterchangeTrailer,
    GroupHeader,
    GroupTrailer,
    TransactionHeader,
    TransactionTrailer,
    /// Any other segment; only valid inside a transaction set
    Data,
}

impl SegmentKind {
    pub fn from_id(id: &str) -> Self {
        match id {
            "ISA" => Self::InterchangeHeader,
            "IEA" => Self::InterchangeTrailer,
            "GS" => Self::GroupHeader,
            "GE" => Self::GroupTrailer,
            "ST" => Self::TransactionHeader,
            "SE" => Self::TransactionTrailer,
            _ => Self::Data,
        }
    }

    /// Required element count including the segment ID, for envelope segments
    pub fn element_count(self) -> Option<usize> {
        match self {
            Self::InterchangeHeader => Some(segment::ISA_ELEMENT_COUNT),
            Self::GroupHeader => Some(9),
            Self::InterchangeTrailer
            | Self::GroupTrailer
            | Self::TransactionHeader
            | Self::TransactionTrailer => Some(3),
            Self::Data => None,
        }
    }
}

/// Structural errors in the envelope grammar
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Element count counts data elements, excluding the segment ID
    #[error("{segment} segment must have {expected} elements, found {found}")]
    WrongElementCount {
        segment: String,
        expected: usize,
        found: usize,
    },

    #[error("found {} segment while previous {level} is still open", .level.header_id())]
    NestedOpeningEnvelope { level: EnvelopeLevel },

    #[error("{} segment found without matching {}", .level.trailer_id(), .level.header_id())]
    NoMatchingOpen { level: EnvelopeLevel },

    #[error("GS segment found outside of interchange")]
    OutsideInterchange,

    #[error("ST segment found outside of functional group")]
    OutsideFunctionalGroup,

    #[error("data segment {segment} found outside of transaction set")]
    OutsideTransactionSet { segment: String },

    #[error("segment {segment} found outside of expected context")]
    UnexpectedSegment { segment: String },

    #[error(
        "{} {} count ({declared}) does not match actual count ({actual})",
        .level.trailer_id(),
        .level.children()
    )]
    CountMismatch {
        level: EnvelopeLevel,
        declared: usize,
        actual: usize,
    },

    #[error(
        "{} control number {trailer:?} does not match {} control number {header:?}",
        .level.trailer_id(),
        .level.header_id()
    )]
    ControlNumberMismatch {
        level: EnvelopeLevel,
        header: String,
        trailer: String,
    },

    #[error("{} count {value:?} is not a number", .level.trailer_id())]
    InvalidCount { level: EnvelopeLevel, value: String },

    #[error("{level} has no {}s", .level.children())]
    EmptyEnvelope { level: EnvelopeLevel },

    #[error("{level} was never closed")]
    UnclosedEnvelope { level: EnvelopeLevel },
}
