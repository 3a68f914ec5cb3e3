use std::fmt::Display;

use segment::{Delimiters, RawSegment, SegmentHandler};

/// Collects tokenized segments for reconstruction and validation
pub struct SegmentCollector {
    delimiters: Delimiters,
    segments: Vec<SegmentData>,
    /// Reject the first segment with this ID
    reject: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentData {
    pub id: String,
    pub elements: Vec<String>,
    pub delimiters: Delimiters,
}

impl SegmentCollector {
    pub fn new(delimiters: Delimiters) -> Self {
        Self {
            delimiters,
            segments: Vec::new(),
            reject: None,
        }
    }

    pub fn rejecting(delimiters: Delimiters, id: &'static str) -> Self {
        Self {
            reject: Some(id),
            ..Self::new(delimiters)
        }
    }

    /// Reconstruct the X12 document from collected segments
    pub fn reconstruct(&self) -> String {
        self.segments.iter().fold(String::new(), |mut acc, seg| {
            acc.push_str(&seg.to_string());
            acc
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn get_segment(&self, idx: usize) -> Option<&SegmentData> {
        self.segments.get(idx)
    }
}

impl SegmentHandler for SegmentCollector {
    type Error = String;

    fn handle(&mut self, segment: &RawSegment<'_>) -> Result<(), Self::Error> {
        if self.reject == Some(segment.id()) {
            return Err(format!("refused {}", segment.id()));
        }

        self.segments.push(SegmentData {
            id: segment.id().to_owned(),
            elements: segment.data_elements().iter().map(|e| e.to_string()).collect(),
            delimiters: self.delimiters,
        });

        Ok(())
    }
}

impl Display for SegmentData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)?;
        for element in &self.elements {
            write!(f, "{}{}", self.delimiters.element, element)?;
        }
        write!(f, "{}", self.delimiters.segment)
    }
}
