//! X12 Segment Tokenizer
//!
//! Delimiter discovery and streaming segment tokenization for X12 documents.
//! The host application feeds decoded text into a [`SegmentBuffer`], which
//! slices complete segments off the front and hands them to a
//! [`SegmentHandler`] one at a time.
//!
//! # Design Philosophy
//! - Delimiters are never assumed: they are read from the fixed-width ISA header
//! - Segments never span handler calls: partial segments stay buffered until
//!   their terminator arrives
//! - Fail fast: the first handler error stops the drain and reports the raw
//!   segment that caused it
//!
//! # Usage
//! ```ignore
//! let mut buffer = SegmentBuffer::new();
//! buffer.push_str(&chunk);
//! let delimiters = buffer.delimiters()?;
//!
//! loop {
//!     buffer.drain(&delimiters, &mut handler)?;
//!     // read the next chunk, or stop at end of input
//! }
//! ```

mod buffer;
mod isa;
mod qualifier;

pub use buffer::{Rejected, SegmentBuffer};
pub use isa::{IsaHeader, ISA_ELEMENT_COUNT, ISA_LENGTH, ISA_TAG};
pub use qualifier::Qualifier;

/// Errors raised while discovering delimiters from the opening ISA segment
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// Input ended before the fixed-width ISA segment was complete
    #[error("incomplete ISA segment at start of input: expected {expected} characters, found {found}")]
    IncompleteEnvelope { expected: usize, found: usize },

    /// Input does not begin with an ISA segment
    #[error("input must start with an ISA segment")]
    MissingOpeningEnvelope,

    /// Delimiters could not be read from the ISA segment
    #[error("could not determine delimiters from ISA segment: {reason}")]
    UndeterminedDelimiters { reason: &'static str },
}

/// X12 delimiters extracted from ISA segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Element separator (4th character of ISA, typically '*')
    pub element: char,

    /// Sub-element separator (105th character of ISA, typically ':')
    pub subelement: char,

    /// Segment terminator (106th character of ISA, typically '~')
    pub segment: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            element: '*',
            subelement: ':',
            segment: '~',
        }
    }
}

/// A single element value with its 1-based position in the segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    value: String,
    position: usize,
}

impl Element {
    /// Create a new element. Surrounding whitespace is trimmed, so a
    /// whitespace-only value becomes empty.
    pub fn new(value: &str, position: usize) -> Self {
        Self {
            value: value.trim().to_owned(),
            position,
        }
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Split element by sub-element separator
    ///
    /// An empty element yields no components.
    pub fn components(&self, separator: char) -> impl Iterator<Item = &str> + '_ {
        (!self.value.is_empty())
            .then(|| self.value.split(separator))
            .into_iter()
            .flatten()
    }
}

/// An owned segment: identifier, elements numbered from 1, and its position
/// within the enclosing envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    id: String,
    elements: Vec<Element>,
    position: usize,
}

impl Segment {
    /// Build an owned segment from a tokenized one
    pub fn new(raw: &RawSegment<'_>, position: usize) -> Self {
        Self {
            id: raw.id().to_owned(),
            elements: raw
                .data_elements()
                .iter()
                .enumerate()
                .map(|(i, value)| Element::new(value, i + 1))
                .collect(),
            position,
        }
    }

    /// Segment identifier (e.g., "ISA", "GS", "ST", "NM1")
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// 1-based position within the enclosing transaction set, or 1/2 for
    /// interchange and functional group headers/trailers
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get element value by X12 element number (ISA-01 is `element(1)`)
    pub fn element(&self, position: usize) -> Option<&str> {
        self.elements
            .iter()
            .find(|element| element.position == position)
            .map(Element::value)
    }
}

/// A tokenized segment borrowed from the [`SegmentBuffer`]
///
/// Element 0 is the segment identifier, matching X12 numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment<'a> {
    text: &'a str,
    elements: Vec<&'a str>,
}

impl<'a> RawSegment<'a> {
    /// Split trimmed segment text on the element separator
    pub fn split(text: &'a str, separator: char) -> Self {
        Self {
            text,
            elements: text.split(separator).collect(),
        }
    }

    /// Segment text as it appeared in the input, without its terminator
    #[inline]
    pub fn text(&self) -> &'a str {
        self.text
    }

    #[inline]
    pub fn id(&self) -> &'a str {
        self.elements[0]
    }

    /// Get element by X12 element number
    ///
    /// - `element(0)` returns the segment ID (e.g., ISA-00)
    /// - `element(1)` returns the first data element (e.g., ISA-01)
    #[inline]
    pub fn element(&self, element_number: usize) -> Option<&'a str> {
        self.elements.get(element_number).copied()
    }

    /// Get total element count including segment ID
    ///
    /// For example, ISA has 17 elements total (ISA-00 through ISA-16).
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Data elements, excluding the segment ID
    #[inline]
    pub fn data_elements(&self) -> &[&'a str] {
        &self.elements[1..]
    }
}

/// Trait for handling tokenized segments
///
/// Implement this trait to process segments as they are tokenized.
/// The segment borrows the tokenizer's buffer, so anything kept past
/// the call must be copied out (see [`Segment::new`]).
pub trait SegmentHandler {
    /// Error that aborts tokenizing
    type Error;

    /// Handle one tokenized segment
    ///
    /// # Returns
    ///
    /// - `Ok(())` to continue tokenizing
    /// - `Err(e)` to stop; the buffer reports `e` together with the raw
    ///   segment text
    fn handle(&mut self, segment: &RawSegment<'_>) -> Result<(), Self::Error>;
}
