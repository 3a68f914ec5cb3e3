//! X12 Host Library
//!
//! Parses X12 files with chunked reading: detects the text encoding, reads
//! delimiters from the ISA header, streams segments through the envelope
//! state machine and returns the completed interchanges.
//!
//! ```ignore
//! let mut parser = X12Parser::new(ParseConfig::default())?;
//! for interchange in parser.parse_file("claims.x12")? {
//!     println!("{} groups", interchange.functional_groups().len());
//! }
//! ```

mod encoding;

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use segment::{Rejected, SegmentBuffer, SegmentError};
use tracing::{debug, info};
use x12_envelope::{EnvelopeError, EnvelopeMachine, Interchange};

pub use encoding::{detect_bom, detect_encoding, DecodeError, TextEncoding};

use encoding::ChunkDecoder;

/// Default bytes per read (8KB)
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Configuration for chunked file parsing
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Bytes requested per read; must be at least 1
    pub chunk_size: usize,
    /// Encoding used when the input has no byte-order mark
    pub encoding: TextEncoding,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            encoding: TextEncoding::default(),
        }
    }
}

/// Statistics collected during the last parse
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseStatistics {
    /// Bytes read after any byte-order mark
    pub bytes_read: u64,
    /// Reads issued against the source, including the final empty one
    pub chunks_read: usize,
    /// Segments handed to the envelope state machine
    pub segments_parsed: usize,
    /// Largest size the text buffer reached, in bytes
    pub max_buffer_size: usize,
}

/// Everything that can stop a parse
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("chunk size must be at least 1 byte")]
    InvalidChunkSize,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// ISA header missing, short or with unusable delimiters
    #[error(transparent)]
    Header(#[from] SegmentError),

    /// The envelope state machine rejected a segment
    #[error("error processing segment \"{segment}\": {source}")]
    SegmentProcessing {
        segment: String,
        source: EnvelopeError,
    },

    #[error("incomplete segment at end of input: {remainder}")]
    IncompleteSegmentAtEof { remainder: String },

    /// Envelopes still open at end of input
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl From<Rejected<EnvelopeError>> for ParseError {
    fn from(rejected: Rejected<EnvelopeError>) -> Self {
        ParseError::SegmentProcessing {
            segment: rejected.segment,
            source: rejected.cause,
        }
    }
}

/// Reads fixed-size byte chunks and decodes them
struct ChunkReader<R> {
    source: R,
    decoder: ChunkDecoder,
    chunk: Vec<u8>,
    text: String,
    finished: bool,
    bytes_read: u64,
    reads: usize,
}

impl<R: Read> ChunkReader<R> {
    fn new(source: R, encoding: TextEncoding, chunk_size: usize) -> Self {
        Self {
            source,
            decoder: encoding.decoder(),
            chunk: vec![0u8; chunk_size],
            text: String::new(),
            finished: false,
            bytes_read: 0,
            reads: 0,
        }
    }

    /// Next non-empty run of decoded text, or `None` at end of input
    fn next_chunk(&mut self) -> Result<Option<&str>, ParseError> {
        loop {
            if self.finished {
                return Ok(None);
            }

            self.text.clear();
            let n = self.source.read(&mut self.chunk)?;
            self.reads += 1;
            self.bytes_read += n as u64;

            let last = n == 0;
            self.decoder.decode(&self.chunk[..n], &mut self.text, last)?;
            self.finished = last;

            if !self.text.is_empty() {
                return Ok(Some(&self.text));
            }
        }
    }
}

/// Chunked X12 parser
///
/// Each `parse_*` call is an independent run with its own buffer and
/// envelope state; nothing carries over between runs except the
/// configuration.
#[derive(Debug)]
pub struct X12Parser {
    config: ParseConfig,
    stats: ParseStatistics,
}

impl X12Parser {
    /// Create a new parser with custom configuration
    pub fn new(config: ParseConfig) -> Result<Self, ParseError> {
        if config.chunk_size == 0 {
            return Err(ParseError::InvalidChunkSize);
        }

        Ok(Self {
            config,
            stats: ParseStatistics::default(),
        })
    }

    /// Create a new parser with default configuration
    pub fn with_default_config() -> Self {
        Self {
            config: ParseConfig::default(),
            stats: ParseStatistics::default(),
        }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Get statistics of the most recent parse
    pub fn statistics(&self) -> &ParseStatistics {
        &self.stats
    }

    /// Parse a file from a path
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<Interchange>, ParseError> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse an in-memory document
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<Vec<Interchange>, ParseError> {
        self.parse_reader(Cursor::new(bytes))
    }

    /// Parse from a seekable reader, starting at its current position
    pub fn parse_reader<R: Read + Seek>(
        &mut self,
        mut source: R,
    ) -> Result<Vec<Interchange>, ParseError> {
        self.stats = ParseStatistics::default();

        let (encoding, bom_length) = detect_encoding(&mut source, self.config.encoding)?;
        source.seek(SeekFrom::Current(bom_length as i64))?;
        debug!(encoding = encoding.name(), bom_length, "detected encoding");

        let mut reader = ChunkReader::new(source, encoding, self.config.chunk_size);
        let mut buffer = SegmentBuffer::new();

        while !buffer.has_header() {
            if !self.fill(&mut reader, &mut buffer)? {
                break;
            }
        }

        let delimiters = buffer.delimiters()?;
        debug!(
            element = ?delimiters.element,
            subelement = ?delimiters.subelement,
            segment = ?delimiters.segment,
            "read delimiters from ISA header"
        );

        let mut machine = EnvelopeMachine::new(delimiters);
        loop {
            self.stats.segments_parsed += buffer.drain(&delimiters, &mut machine)?;

            if !self.fill(&mut reader, &mut buffer)? {
                break;
            }
        }

        if let Some(remainder) = buffer.remainder() {
            return Err(ParseError::IncompleteSegmentAtEof {
                remainder: remainder.to_owned(),
            });
        }

        let interchanges = machine.finish()?;
        info!(
            interchanges = interchanges.len(),
            segments = self.stats.segments_parsed,
            bytes = self.stats.bytes_read,
            "parsed X12 document"
        );
        Ok(interchanges)
    }

    /// Append the next decoded chunk; `false` at end of input
    fn fill<R: Read>(
        &mut self,
        reader: &mut ChunkReader<R>,
        buffer: &mut SegmentBuffer,
    ) -> Result<bool, ParseError> {
        let chunk = reader.next_chunk()?;
        let more = match chunk {
            Some(text) => {
                buffer.push_str(text);
                true
            }
            None => false,
        };

        self.stats.bytes_read = reader.bytes_read;
        self.stats.chunks_read = reader.reads;
        self.stats.max_buffer_size = self.stats.max_buffer_size.max(buffer.len());
        Ok(more)
    }
}

impl Default for X12Parser {
    fn default() -> Self {
        Self::with_default_config()
    }
}
