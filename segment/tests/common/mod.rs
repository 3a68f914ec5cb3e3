#![allow(dead_code)]

mod segment_collector;

pub use segment_collector::{SegmentCollector, SegmentData};

use segment::{Delimiters, SegmentBuffer};

pub const ISA: &str = "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *210101*1200*^*00501*000000001*0*P*:~";

/// Stream `input` through a fresh buffer `chunk_size` characters at a time
pub fn tokenize(input: &str, chunk_size: usize) -> (SegmentCollector, SegmentBuffer) {
    let chars: Vec<char> = input.chars().collect();
    let mut buffer = SegmentBuffer::new();
    let mut delimiters: Option<Delimiters> = None;
    let mut collector = None;

    for chunk in chars.chunks(chunk_size) {
        buffer.push_str(&chunk.iter().collect::<String>());

        if delimiters.is_none() && buffer.has_header() {
            let found = buffer.delimiters().unwrap();
            delimiters = Some(found);
            collector = Some(SegmentCollector::new(found));
        }

        if let (Some(delimiters), Some(collector)) = (&delimiters, collector.as_mut()) {
            buffer.drain(delimiters, collector).unwrap();
        }
    }

    (collector.expect("input holds an ISA header"), buffer)
}
