use crate::qualifier::Qualifier;
use crate::{Delimiters, RawSegment, SegmentError};

/// Identifier of the interchange control header
pub const ISA_TAG: &str = "ISA";

/// ISA segment is exactly 106 characters including terminator
pub const ISA_LENGTH: usize = 106;

/// ISA-00 through ISA-16
pub const ISA_ELEMENT_COUNT: usize = 17;

// 0-based character offsets within the fixed-width header
const ELEMENT_SEPARATOR_OFFSET: usize = 3;
const SUBELEMENT_SEPARATOR_OFFSET: usize = 104;
const SEGMENT_TERMINATOR_OFFSET: usize = 105;

impl Delimiters {
    /// Extract delimiters from the fixed-width ISA header at the start of `text`
    ///
    /// `text` may hold more than the header; only the first
    /// [`ISA_LENGTH`] characters are inspected.
    pub fn from_header(text: &str) -> Result<Self, SegmentError> {
        let header: Vec<char> = text.chars().take(ISA_LENGTH).collect();

        if header.len() < ISA_LENGTH {
            return Err(SegmentError::IncompleteEnvelope {
                expected: ISA_LENGTH,
                found: header.len(),
            });
        }

        if !text.starts_with(ISA_TAG) {
            return Err(SegmentError::MissingOpeningEnvelope);
        }

        let delimiters = match (
            header.get(ELEMENT_SEPARATOR_OFFSET),
            header.get(SUBELEMENT_SEPARATOR_OFFSET),
            header.get(SEGMENT_TERMINATOR_OFFSET),
        ) {
            (Some(&element), Some(&subelement), Some(&segment)) => Delimiters {
                element,
                subelement,
                segment,
            },
            _ => {
                return Err(SegmentError::UndeterminedDelimiters {
                    reason: "delimiter positions are missing",
                })
            }
        };

        // Tokenizing is ambiguous unless all three differ
        if delimiters.element == delimiters.subelement
            || delimiters.element == delimiters.segment
            || delimiters.subelement == delimiters.segment
        {
            return Err(SegmentError::UndeterminedDelimiters {
                reason: "element, sub-element and segment delimiters must differ",
            });
        }

        Ok(delimiters)
    }
}

/// Named view over a tokenized ISA segment
///
/// Callers must check [`RawSegment::element_count`] against
/// [`ISA_ELEMENT_COUNT`] first; missing elements read as empty.
#[derive(Debug, Clone, Copy)]
pub struct IsaHeader<'s, 'buf> {
    segment: &'s RawSegment<'buf>,
}

impl<'s, 'buf> IsaHeader<'s, 'buf> {
    pub fn new(segment: &'s RawSegment<'buf>) -> Self {
        Self { segment }
    }

    fn field(&self, number: usize) -> &'buf str {
        self.segment.element(number).unwrap_or_default()
    }

    // ISA-01 -- ISA-04 carry authorization and security information and
    // are not surfaced.

    /// ISA-05
    pub fn sender_qualifier(&self) -> Qualifier<'buf> {
        Qualifier::from(self.field(5))
    }

    /// ISA-06
    pub fn sender_id(&self) -> &'buf str {
        self.field(6).trim()
    }

    /// ISA-07
    pub fn receiver_qualifier(&self) -> Qualifier<'buf> {
        Qualifier::from(self.field(7))
    }

    /// ISA-08
    pub fn receiver_id(&self) -> &'buf str {
        self.field(8).trim()
    }

    /// ISA-09, YYMMDD
    pub fn date(&self) -> &'buf str {
        self.field(9).trim()
    }

    /// ISA-10, HHMM
    pub fn time(&self) -> &'buf str {
        self.field(10).trim()
    }

    /// ISA-12
    pub fn version(&self) -> &'buf str {
        self.field(12).trim()
    }

    /// ISA-13
    pub fn control_number(&self) -> &'buf str {
        self.field(13).trim()
    }
}
