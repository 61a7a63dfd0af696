//! The huffpack container format.
//!
//! Every artifact starts with a one-byte mode marker:
//!
//! | Marker | Mode        | Remainder                                   |
//! |--------|-------------|---------------------------------------------|
//! | `0xFF` | Passthrough | the input bytes, verbatim                   |
//! | `0x00` | Huffman     | header, frequency table, bit-packed payload |
//!
//! Huffman header layout (all integers little-endian):
//! - Unique-symbol count: u8 (1-255 as-is, 0 means 256)
//! - Original length: u64
//! - Frequency table: `count` entries of symbol (u8) + frequency (u64),
//!   in ascending symbol order
//! - Payload: codes for every input byte, MSB-first, zero-padded
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::frequency::FrequencyTable;
use crate::{HuffError, HuffResult};

/// Inputs at or below this many bytes are stored verbatim by default.
pub const PASSTHROUGH_THRESHOLD: usize = 8;

/// Marker + unique count + original length.
pub const HUFFMAN_FIXED_HEADER_SIZE: usize = 1 + 1 + 8;
/// Symbol + frequency.
pub const FREQUENCY_ENTRY_SIZE: usize = 1 + 8;

/// Container mode, stored as the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Huffman = 0x00,
    Passthrough = 0xFF,
}

impl TryFrom<u8> for Mode {
    type Error = HuffError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0x00 => Ok(Self::Huffman),
            0xFF => Ok(Self::Passthrough),
            _ => Err(HuffError::Format("unknown mode marker")),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Huffman => f.write_str("huffman"),
            Mode::Passthrough => f.write_str("passthrough"),
        }
    }
}

/// Everything that precedes the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Passthrough,
    Huffman {
        original_len: u64,
        freq: FrequencyTable,
    },
}

impl Header {
    pub fn mode(&self) -> Mode {
        match self {
            Header::Passthrough => Mode::Passthrough,
            Header::Huffman { .. } => Mode::Huffman,
        }
    }

    /// Serialized size of this header in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Header::Passthrough => 1,
            Header::Huffman { freq, .. } => {
                HUFFMAN_FIXED_HEADER_SIZE + freq.used as usize * FREQUENCY_ENTRY_SIZE
            }
        }
    }
}

fn encode_symbol_count(used: u32) -> u8 {
    // 256 wraps to 0, which is never a valid count on its own.
    (used % 256) as u8
}

fn decode_symbol_count(raw: u8) -> u32 {
    if raw == 0 {
        256
    } else {
        raw as u32
    }
}

/// Write `header` to `w`.
pub fn write_header<W: Write>(w: &mut W, header: &Header) -> io::Result<()> {
    match header {
        Header::Passthrough => w.write_u8(Mode::Passthrough as u8),
        Header::Huffman { original_len, freq } => {
            if freq.used == 0 || freq.used > 256 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "frequency table has no symbols",
                ));
            }
            w.write_u8(Mode::Huffman as u8)?;
            w.write_u8(encode_symbol_count(freq.used))?;
            w.write_u64::<LittleEndian>(*original_len)?;
            for (symbol, count) in freq.symbols() {
                w.write_u8(symbol)?;
                w.write_u64::<LittleEndian>(count)?;
            }
            Ok(())
        }
    }
}

/// Map a short read to a format error naming the missing field.
fn field<T>(result: io::Result<T>, what: &'static str) -> HuffResult<T> {
    result.map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HuffError::Format(what),
        _ => HuffError::Io(e),
    })
}

/// Read and validate a header from `r`, leaving it positioned at the payload.
pub fn read_header<R: Read>(r: &mut R) -> HuffResult<Header> {
    let marker = field(r.read_u8(), "missing mode marker")?;
    match Mode::try_from(marker)? {
        Mode::Passthrough => Ok(Header::Passthrough),
        Mode::Huffman => {
            let used = decode_symbol_count(field(r.read_u8(), "missing unique-symbol count")?);
            let original_len = field(
                r.read_u64::<LittleEndian>(),
                "missing original byte count",
            )?;
            if original_len == 0 {
                return Err(HuffError::Format("original byte count is zero"));
            }

            let mut freq = FrequencyTable::new();
            let mut sum = 0u64;
            for _ in 0..used {
                let symbol = field(r.read_u8(), "truncated frequency table")?;
                let count = field(r.read_u64::<LittleEndian>(), "truncated frequency table")?;
                if count == 0 {
                    return Err(HuffError::Format("zero frequency entry"));
                }
                if freq.byte[symbol as usize] != 0 {
                    return Err(HuffError::Format("duplicate symbol in frequency table"));
                }
                sum = sum
                    .checked_add(count)
                    .ok_or(HuffError::Format("frequency sum overflows"))?;
                freq.byte[symbol as usize] = count;
            }
            if sum != original_len {
                return Err(HuffError::Format(
                    "frequency sum does not match original byte count",
                ));
            }
            freq.total = sum;
            freq.used = used;

            Ok(Header::Huffman { original_len, freq })
        }
    }
}

/// Summary of a container, produced without decoding its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerInfo {
    pub mode: Mode,
    pub original_len: u64,
    /// Distinct symbols in the frequency table (0 for passthrough).
    pub unique_symbols: u32,
    pub header_len: u64,
    pub payload_len: u64,
    /// Shannon entropy of the stored distribution, in bits per symbol.
    pub entropy: Option<f64>,
}

impl ContainerInfo {
    pub fn compressed_len(&self) -> u64 {
        self.header_len + self.payload_len
    }

    /// Space saved relative to the original, in percent. Negative if the
    /// container is larger than its input.
    pub fn space_saving(&self) -> f64 {
        if self.original_len == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_len() as f64 / self.original_len as f64) * 100.0
    }
}

/// Describe a container of `total_len` bytes that starts with `header`.
pub fn describe(header: &Header, total_len: u64) -> ContainerInfo {
    let header_len = header.encoded_len() as u64;
    let payload_len = total_len.saturating_sub(header_len);

    match header {
        Header::Passthrough => ContainerInfo {
            mode: Mode::Passthrough,
            original_len: payload_len,
            unique_symbols: 0,
            header_len,
            payload_len,
            entropy: None,
        },
        Header::Huffman { original_len, freq } => ContainerInfo {
            mode: Mode::Huffman,
            original_len: *original_len,
            unique_symbols: freq.used,
            header_len,
            payload_len,
            entropy: Some(freq.entropy()),
        },
    }
}

/// Parse the header of `data` and describe the container.
pub fn inspect(data: &[u8]) -> HuffResult<ContainerInfo> {
    let header = read_header(&mut &data[..])?;
    Ok(describe(&header, data.len() as u64))
}
