//! Byte-order-mark detection and chunk-by-chunk decoding

use std::io::{self, Read, Seek, SeekFrom};

use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// Text encoding of an X12 source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Any encoding implemented by `encoding_rs`
    Standard(&'static Encoding),
    /// UTF-32 little-endian, which `encoding_rs` does not implement
    Utf32Le,
    /// UTF-32 big-endian
    Utf32Be,
}

impl Default for TextEncoding {
    /// ASCII-compatible 8-bit. `encoding_rs` maps the `ascii` label to
    /// windows-1252.
    fn default() -> Self {
        Self::Standard(WINDOWS_1252)
    }
}

impl TextEncoding {
    /// Resolve an encoding label such as `ascii`, `utf-8`, `utf-16be` or
    /// `utf-32le`
    pub fn for_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-32" | "utf-32le" | "utf32" | "utf32le" => Some(Self::Utf32Le),
            "utf-32be" | "utf32be" => Some(Self::Utf32Be),
            other => Encoding::for_label(other.as_bytes()).map(Self::Standard),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard(encoding) => encoding.name(),
            Self::Utf32Le => "UTF-32LE",
            Self::Utf32Be => "UTF-32BE",
        }
    }

    pub(crate) fn decoder(self) -> ChunkDecoder {
        let kind = match self {
            Self::Standard(encoding) => DecoderKind::Standard(encoding.new_decoder_without_bom_handling()),
            Self::Utf32Le => DecoderKind::Utf32 {
                big_endian: false,
                pending: Vec::with_capacity(4),
            },
            Self::Utf32Be => DecoderKind::Utf32 {
                big_endian: true,
                pending: Vec::with_capacity(4),
            },
        };

        ChunkDecoder {
            encoding: self,
            kind,
            consumed: 0,
        }
    }
}

/// Match a byte-order mark at the start of `bytes`
///
/// Returns the encoding and the length of the mark. UTF-32 is checked
/// before UTF-16 since `FF FE` prefixes both little-endian marks.
pub fn detect_bom(bytes: &[u8]) -> Option<(TextEncoding, usize)> {
    match bytes {
        [0xFF, 0xFE, 0x00, 0x00, ..] => Some((TextEncoding::Utf32Le, 4)),
        [0x00, 0x00, 0xFE, 0xFF, ..] => Some((TextEncoding::Utf32Be, 4)),
        [0xEF, 0xBB, 0xBF, ..] => Some((TextEncoding::Standard(UTF_8), 3)),
        [0xFF, 0xFE, ..] => Some((TextEncoding::Standard(UTF_16LE), 2)),
        [0xFE, 0xFF, ..] => Some((TextEncoding::Standard(UTF_16BE), 2)),
        _ => None,
    }
}

/// Peek at up to 4 leading bytes of `source` for a byte-order mark
///
/// The read position is restored before returning. Without a mark,
/// `default` is returned with nothing to skip.
pub fn detect_encoding<R: Read + Seek>(
    source: &mut R,
    default: TextEncoding,
) -> io::Result<(TextEncoding, usize)> {
    let start = source.stream_position()?;

    let mut bom = [0u8; 4];
    let mut filled = 0;
    while filled < bom.len() {
        let n = source.read(&mut bom[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    source.seek(SeekFrom::Start(start))?;
    Ok(detect_bom(&bom[..filled]).unwrap_or((default, 0)))
}

/// Input is not valid in the selected encoding
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("input is not valid {encoding} near byte {offset}")]
pub struct DecodeError {
    pub encoding: &'static str,
    /// Offset from the end of the byte-order mark
    pub offset: u64,
}

enum DecoderKind {
    Standard(Decoder),
    Utf32 { big_endian: bool, pending: Vec<u8> },
}

/// Stateful decoder: a character split across two chunks decodes once its
/// remaining bytes arrive
pub(crate) struct ChunkDecoder {
    encoding: TextEncoding,
    kind: DecoderKind,
    consumed: u64,
}

impl ChunkDecoder {
    /// Decode `bytes` onto the end of `out`. `last` flushes any partial
    /// character, which is an error if incomplete.
    pub(crate) fn decode(
        &mut self,
        bytes: &[u8],
        out: &mut String,
        last: bool,
    ) -> Result<(), DecodeError> {
        let start = self.consumed;
        self.consumed += bytes.len() as u64;

        match &mut self.kind {
            DecoderKind::Standard(decoder) => {
                let mut input = bytes;
                loop {
                    let needed = decoder
                        .max_utf8_buffer_length_without_replacement(input.len())
                        .unwrap_or(input.len() * 4);
                    out.reserve(needed);

                    let (result, read) =
                        decoder.decode_to_string_without_replacement(input, out, last);
                    input = &input[read..];

                    match result {
                        DecoderResult::InputEmpty => return Ok(()),
                        DecoderResult::OutputFull => continue,
                        DecoderResult::Malformed(malformed, after) => {
                            // `read` already covers the bad sequence and the bytes after it
                            let read = (bytes.len() - input.len()) as u64;
                            let offset = (start + read)
                                .saturating_sub(u64::from(malformed) + u64::from(after));
                            return Err(DecodeError {
                                encoding: self.encoding.name(),
                                offset,
                            });
                        }
                    }
                }
            }
            DecoderKind::Utf32 {
                big_endian,
                pending,
            } => {
                let carried = pending.len() as u64;
                pending.extend_from_slice(bytes);

                let whole = pending.len() - pending.len() % 4;
                for (i, unit) in pending[..whole].chunks_exact(4).enumerate() {
                    let unit = [unit[0], unit[1], unit[2], unit[3]];
                    let value = if *big_endian {
                        u32::from_be_bytes(unit)
                    } else {
                        u32::from_le_bytes(unit)
                    };

                    match char::from_u32(value) {
                        Some(c) => out.push(c),
                        None => {
                            return Err(DecodeError {
                                encoding: self.encoding.name(),
                                offset: (start + (i as u64) * 4).saturating_sub(carried),
                            })
                        }
                    }
                }
                pending.drain(..whole);

                if last && !pending.is_empty() {
                    return Err(DecodeError {
                        encoding: self.encoding.name(),
                        offset: self.consumed - pending.len() as u64,
                    });
                }
                Ok(())
            }
        }
    }
}
