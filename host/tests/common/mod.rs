#![allow(dead_code)]

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use x12_envelope::Interchange;
use x12_host::{ParseConfig, ParseError, TextEncoding, X12Parser};

/// Interchange header with control number 000000001
pub const ISA: &str = "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *210101*1200*^*00501*000000001*0*P*:~";

/// Interchange header with control number 000000002
pub const ISA_2: &str = "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *210102*0800*^*00501*000000002*0*P*:~";

/// Minimal eligibility inquiry: one interchange, one group, one two-segment set
pub fn minimal() -> String {
    format!(
        "{ISA}\
         GS*HS*SENDER*RECEIVER*20210101*1200*1*X*005010X279A1~\
         ST*270*0001~\
         SE*2*0001~\
         GE*1*1~\
         IEA*1*000000001~"
    )
}

/// Two interchanges: the first with two groups (two claims, one
/// eligibility inquiry), the second with a single claim
pub fn claims() -> String {
    format!(
        "{ISA}\
         GS*HC*SENDER*RECEIVER*20210101*1200*1*X*005010X222A1~\
         ST*837*0001~\
         BHT*0019*00*0123*20210101*1200*CH~\
         NM1*41*2*SUBMITTER*****46*TGJ23~\
         NM1*40*2*RECEIVER*****46*66783JJT~\
         HL*1**20*1~\
         CLM*26463774*100***11:B:1*Y*A*Y*I~\
         SE*7*0001~\
         ST*837*0002~\
         BHT*0019*00*0124*20210101*1200*CH~\
         NM1*41*2*SUBMITTER*****46*TGJ23~\
         SE*4*0002~\
         GE*2*1~\
         GS*HS*SENDER*RECEIVER*20210101*1201*2*X*005010X279A1~\
         ST*270*0003~\
         BHT*0022*13*10001234*20210101*1319~\
         SE*3*0003~\
         GE*1*2~\
         IEA*2*000000001~\
         {ISA_2}\
         GS*HC*SENDER*RECEIVER*20210102*0800*3*X*005010X222A1~\
         ST*837*0001~\
         SE*2*0001~\
         GE*1*3~\
         IEA*1*000000002~"
    )
}

/// Same document with a line break after every terminator
pub fn with_line_breaks(document: &str) -> String {
    document.replace('~', "~\r\n")
}

pub fn parser(chunk_size: usize) -> X12Parser {
    X12Parser::new(ParseConfig {
        chunk_size,
        encoding: TextEncoding::default(),
    })
    .unwrap()
}

pub fn parse(input: &[u8], chunk_size: usize) -> Result<Vec<Interchange>, ParseError> {
    parser(chunk_size).parse_bytes(input)
}

/// Reader that fails once `limit` bytes have been read
pub struct FailingReader {
    inner: Cursor<Vec<u8>>,
    limit: u64,
}

impl FailingReader {
    pub fn new(data: &str, limit: u64) -> Self {
        Self {
            inner: Cursor::new(data.as_bytes().to_vec()),
            limit,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inner.position() >= self.limit {
            return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        }
        self.inner.read(buf)
    }
}

impl Seek for FailingReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
