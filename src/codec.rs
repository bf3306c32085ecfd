//! Binary layout of a serialized filter.
//!
//! ```text
//! offset  size        field
//! 0       2           magic "BF"
//! 2       2           version, ASCII decimal
//! 4       2           hash function count, ASCII decimal
//! 6       8           bit array length, ASCII decimal, zero-padded
//! 14      2           delimiter "\r\n"
//! 16      ceil(m/8)   packed bits, most significant bit first
//! ```

use crate::engine::{BitArray, FilterEngine};
use crate::error::{BloomError, FormatField, Result};
use crate::filter::BloomFilter;
use crate::hash::{HashKind, MAX_BIT_ARRAY_LEN};
use crate::reader::{DELIMITER, DelimitedChunks};
use std::io::Read;

pub const MAGIC: &[u8; 2] = b"BF";
pub const VERSION: u8 = 1;

const VERSION_WIDTH: usize = 2;
const HASH_COUNT_WIDTH: usize = 2;
const BIT_LEN_WIDTH: usize = 8;

/// Header line length as written, without the delimiter.
pub const HEADER_LEN: usize = MAGIC.len() + VERSION_WIDTH + HASH_COUNT_WIDTH + BIT_LEN_WIDTH;

/// Total encoded size of a filter with `bits` bits.
pub fn encoded_len(bits: u64) -> usize {
    HEADER_LEN + DELIMITER.len() + packed_len(bits)
}

fn packed_len(bits: u64) -> usize {
    bits.div_ceil(8) as usize
}

/// Fixed-width fields preceding the delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub hash_count: usize,
    pub bit_len: u64,
}

impl Header {
    pub fn for_filter(filter: &BloomFilter) -> Self {
        Self {
            version: VERSION,
            hash_count: filter.hash_count(),
            bit_len: filter.size(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "BF{:02}{:02}{:08}",
            self.version, self.hash_count, self.bit_len
        )
        .into_bytes()
    }

    /// Parses a complete header line (the bytes before the delimiter).
    pub fn parse(line: &[u8]) -> Result<Self> {
        let (header, used) = Self::parse_prefix(line)?;
        if used != line.len() {
            return Err(BloomError::format(
                FormatField::Delimiter,
                format!(
                    "expected \"\\r\\n\" at offset {used}, header line is {} bytes",
                    line.len()
                ),
            ));
        }
        Ok(header)
    }

    /// Parses the header fields at the start of `input` and returns the
    /// header with the number of bytes it spans.
    ///
    /// The length field is the run of ASCII digits after the hash count. It
    /// is written as exactly eight digits; wider zero-padded runs are read
    /// as long as the value fits in a `u64`.
    pub fn parse_prefix(input: &[u8]) -> Result<(Self, usize)> {
        let mut rest = input;

        let magic = take(&mut rest, MAGIC.len())
            .ok_or_else(|| BloomError::format(FormatField::Magic, "input too short"))?;
        if magic != MAGIC {
            return Err(BloomError::format(
                FormatField::Magic,
                format!("expected \"BF\", got {:?}", String::from_utf8_lossy(magic)),
            ));
        }

        let version = parse_fixed(&mut rest, VERSION_WIDTH, FormatField::Version)?;
        if version != u64::from(VERSION) {
            return Err(BloomError::format(
                FormatField::Version,
                format!("unsupported version {version}"),
            ));
        }

        let hash_count = parse_fixed(&mut rest, HASH_COUNT_WIDTH, FormatField::HashCount)?;
        if hash_count == 0 || hash_count > HashKind::ALL.len() as u64 {
            return Err(BloomError::format(
                FormatField::HashCount,
                format!(
                    "{hash_count} hash functions, expected 1 to {}",
                    HashKind::ALL.len()
                ),
            ));
        }

        let bit_len = parse_bit_len(&mut rest)?;
        if bit_len == 0 {
            return Err(BloomError::format(
                FormatField::BitLength,
                "bit array length is zero",
            ));
        }

        let header = Self {
            version: VERSION,
            hash_count: hash_count as usize,
            bit_len,
        };
        Ok((header, input.len() - rest.len()))
    }
}

fn take<'a>(rest: &mut &'a [u8], len: usize) -> Option<&'a [u8]> {
    if rest.len() < len {
        return None;
    }
    let (head, tail) = rest.split_at(len);
    *rest = tail;
    Some(head)
}

fn not_digits(width: usize, field: FormatField, bytes: &[u8]) -> BloomError {
    BloomError::format(
        field,
        format!(
            "expected {width} ASCII digits, got {:?}",
            String::from_utf8_lossy(bytes)
        ),
    )
}

fn too_short(width: usize, field: FormatField) -> BloomError {
    BloomError::format(field, format!("expected {width} bytes, input too short"))
}

/// Fixed-width, all-digit decimal field.
fn parse_fixed(rest: &mut &[u8], width: usize, field: FormatField) -> Result<u64> {
    let digits = take(rest, width).ok_or_else(|| too_short(width, field))?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(not_digits(width, field, digits));
    }
    Ok(digits
        .iter()
        .fold(0u64, |acc, &d| acc * 10 + u64::from(d - b'0')))
}

/// At least `BIT_LEN_WIDTH` digits, up to the first non-digit byte.
fn parse_bit_len(rest: &mut &[u8]) -> Result<u64> {
    let field = FormatField::BitLength;
    let run = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if run < BIT_LEN_WIDTH {
        return Err(match rest.get(..BIT_LEN_WIDTH) {
            Some(bytes) => not_digits(BIT_LEN_WIDTH, field, bytes),
            None => too_short(BIT_LEN_WIDTH, field),
        });
    }

    let digits = take(rest, run).unwrap_or_default();
    // all ASCII digits, so always valid UTF-8
    let text = std::str::from_utf8(digits).unwrap_or_default();
    text.parse::<u64>().map_err(|e| {
        BloomError::format(field, format!("{text:?} is not a 64-bit length: {e}"))
    })
}

/// Serializes `filter`: header, delimiter, then the bits packed MSB first
/// with the last byte zero-padded.
pub fn encode(filter: &BloomFilter) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(filter.size()));
    out.extend_from_slice(&Header::for_filter(filter).to_bytes());
    out.extend_from_slice(DELIMITER);
    out.extend(pack_bits(filter.bits()));
    out
}

fn pack_bits(bits: &BitArray) -> impl Iterator<Item = u8> + '_ {
    bits.chunks(8).map(|chunk| {
        chunk
            .iter()
            .by_vals()
            .enumerate()
            .fold(0u8, |byte, (i, bit)| byte | (u8::from(bit) << (7 - i)))
    })
}

/// Parses a complete serialized filter.
pub fn decode(bytes: &[u8]) -> Result<BloomFilter> {
    let (header, used) = Header::parse_prefix(bytes)?;
    let rest = &bytes[used..];
    match rest.get(..DELIMITER.len()) {
        Some(d) if d == DELIMITER => {}
        _ => return Err(missing_delimiter(used)),
    }
    decode_parts(&header, &rest[DELIMITER.len()..])
}

fn missing_delimiter(offset: usize) -> BloomError {
    BloomError::format(
        FormatField::Delimiter,
        format!("expected \"\\r\\n\" at offset {offset}"),
    )
}

/// Builds a filter from a parsed header and the bytes after the delimiter.
/// Bytes beyond `ceil(bit_len / 8)` are ignored.
pub fn decode_parts(header: &Header, payload: &[u8]) -> Result<BloomFilter> {
    if header.bit_len > MAX_BIT_ARRAY_LEN {
        return Err(BloomError::format(
            FormatField::BitLength,
            format!("{} bits does not fit the length field", header.bit_len),
        ));
    }
    let needed = packed_len(header.bit_len);
    let packed = payload.get(..needed).ok_or_else(|| {
        BloomError::format(
            FormatField::Payload,
            format!(
                "expected {needed} bytes for {} bits, got {}",
                header.bit_len,
                payload.len()
            ),
        )
    })?;

    let mut bits = BitArray::from_slice(packed);
    bits.truncate(header.bit_len as usize);

    let engine = FilterEngine::from_bits(bits, header.hash_count)?;
    Ok(BloomFilter::from_engine(engine))
}

/// Reads a serialized filter from a stream: the header line comes from the
/// first delimited chunk, the payload from everything after it.
pub fn decode_stream<R: Read>(reader: R) -> Result<BloomFilter> {
    let mut chunks = DelimitedChunks::new(reader);

    let line = chunks.next().transpose()?.unwrap_or_default();
    if !chunks.header_terminated() {
        // stream ended inside the header line
        let (_, used) = Header::parse_prefix(&line)?;
        return Err(missing_delimiter(used));
    }
    let header = Header::parse(&line)?;

    let mut payload = Vec::with_capacity(packed_len(header.bit_len.min(MAX_BIT_ARRAY_LEN)));
    for chunk in chunks {
        payload.extend_from_slice(&chunk?);
    }
    decode_parts(&header, &payload)
}
