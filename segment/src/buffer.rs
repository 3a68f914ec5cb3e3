use crate::{Delimiters, RawSegment, SegmentError, SegmentHandler, ISA_LENGTH};

/// A segment the handler refused, with the handler's error
#[derive(Debug)]
pub struct Rejected<E> {
    /// Trimmed segment text, without its terminator
    pub segment: String,
    pub cause: E,
}

/// Growable text buffer that yields complete segments
///
/// Chunks are appended at the back; segments are sliced off the front once
/// their terminator has arrived. Consumed text is compacted away lazily, so
/// the buffer only ever holds the unconsumed tail plus at most one chunk.
#[derive(Debug, Default)]
pub struct SegmentBuffer {
    text: String,
    start: usize,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded chunk
    pub fn push_str(&mut self, chunk: &str) {
        // Compact if we've consumed more than half
        if self.start > 0 && self.start >= self.text.len() / 2 {
            self.text.drain(..self.start);
            self.start = 0;
        }
        self.text.push_str(chunk);
    }

    /// Unconsumed text
    #[inline]
    pub fn pending(&self) -> &str {
        &self.text[self.start..]
    }

    /// Allocated length in bytes, including consumed text not yet compacted
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Whether enough text is buffered to hold the fixed-width ISA header
    pub fn has_header(&self) -> bool {
        self.pending().chars().nth(ISA_LENGTH - 1).is_some()
    }

    /// Read delimiters from the ISA header at the front of the buffer
    ///
    /// Nothing is consumed: the ISA segment is tokenized like any other.
    pub fn delimiters(&self) -> Result<Delimiters, SegmentError> {
        Delimiters::from_header(self.pending())
    }

    /// Take the next complete segment, skipping empty ones
    ///
    /// Returns `None` when no terminator is left in the buffer; the
    /// partial segment after the last terminator stays buffered.
    pub fn next_segment(&mut self, delimiters: &Delimiters) -> Option<RawSegment<'_>> {
        loop {
            let end = self.text[self.start..].find(delimiters.segment)?;
            let from = self.start;
            let to = from + end;
            self.start = to + delimiters.segment.len_utf8();

            if self.text[from..to].trim().is_empty() {
                continue;
            }

            return Some(RawSegment::split(
                self.text[from..to].trim(),
                delimiters.element,
            ));
        }
    }

    /// Hand every complete segment to `handler`
    ///
    /// Returns the number of segments handled. Stops at the first handler
    /// error; segments after the rejected one stay buffered.
    pub fn drain<H: SegmentHandler>(
        &mut self,
        delimiters: &Delimiters,
        handler: &mut H,
    ) -> Result<usize, Rejected<H::Error>> {
        let mut handled = 0;

        while let Some(segment) = self.next_segment(delimiters) {
            if let Err(cause) = handler.handle(&segment) {
                return Err(Rejected {
                    segment: segment.text().to_owned(),
                    cause,
                });
            }
            handled += 1;
        }

        Ok(handled)
    }

    /// Non-whitespace text left after the last terminator, if any
    pub fn remainder(&self) -> Option<&str> {
        let rest = self.pending().trim();
        (!rest.is_empty()).then_some(rest)
    }
}
