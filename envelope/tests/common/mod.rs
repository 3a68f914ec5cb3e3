#![allow(dead_code)]

use segment::{Rejected, SegmentBuffer};
use x12_envelope::{EnvelopeError, EnvelopeMachine, Interchange};

pub const ISA: &str = "ISA*00*          *00*          *01*123456789      *  *RECEIVER       *210101*1200*^*00501*000000001*0*P*:~";

/// Feed a whole document through a buffer into a fresh machine
pub fn run(document: &str) -> Result<Vec<Interchange>, Rejected<EnvelopeError>> {
    let mut buffer = SegmentBuffer::new();
    buffer.push_str(document);

    let delimiters = buffer.delimiters().unwrap();
    let mut machine = EnvelopeMachine::new(delimiters);
    buffer.drain(&delimiters, &mut machine)?;

    Ok(machine.finish().unwrap())
}
