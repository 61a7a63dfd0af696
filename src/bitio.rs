//! Bit-granular I/O over byte streams.
//!
//! Bits are packed most-significant first. Each writer and reader owns its
//! partial byte, so independent sessions never share buffer state.

use std::io::{self, Read, Write};

use bitvec::prelude::*;
use byteorder::{ReadBytesExt, WriteBytesExt};

/// Packs bits MSB-first into bytes and writes them to `W`.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    buffer: u8,
    nbits: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        BitWriter {
            inner,
            buffer: 0,
            nbits: 0,
            bits_written: 0,
        }
    }

    /// Append one bit. A full byte is emitted as soon as 8 bits accumulate.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.nbits += 1;
        self.bits_written += 1;
        if self.nbits == 8 {
            self.inner.write_u8(self.buffer)?;
            self.buffer = 0;
            self.nbits = 0;
        }
        Ok(())
    }

    /// Append every bit of `bits` in order.
    pub fn write_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> io::Result<()> {
        for bit in bits.iter().by_vals() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Total number of bits written so far, excluding padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Emit any partial byte, zero-padding its low bits.
    ///
    /// Calling this on a byte boundary writes nothing.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.nbits > 0 {
            let padded = self.buffer << (8 - self.nbits);
            self.inner.write_u8(padded)?;
            self.buffer = 0;
            self.nbits = 0;
        }
        self.inner.flush()
    }

    /// Flush the partial byte and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

/// Reads bits MSB-first from a byte source `R`.
///
/// A new byte is pulled only once every bit of the previous one has been
/// consumed.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    buffer: u8,
    nbits: u8,
    exhausted: bool,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        BitReader {
            inner,
            buffer: 0,
            nbits: 0,
            exhausted: false,
        }
    }

    /// Read the next bit, or `None` once the source is exhausted.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.nbits == 0 {
            if self.exhausted {
                return Ok(None);
            }
            match self.inner.read_u8() {
                Ok(byte) => {
                    self.buffer = byte;
                    self.nbits = 8;
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
        self.nbits -= 1;
        Ok(Some((self.buffer >> self.nbits) & 1 == 1))
    }

    /// Hand back the underlying reader. Unread bits of the current byte are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
