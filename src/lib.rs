//! Byte-oriented Huffman compression with a self-describing container.
//!
//! Compression counts byte frequencies, builds a Huffman tree through a
//! min-heap, derives a prefix code per symbol and bit-packs the input.
//! The container stores only the frequency table; the decoder rebuilds
//! the identical tree from it.
//!
//! ```
//! let data = b"abracadabra, abracadabra";
//! let packed = huffpack::pipeline::compress(data)?;
//! let unpacked = huffpack::pipeline::decompress(&packed)?;
//! assert_eq!(unpacked.data, data);
//! assert!(unpacked.truncation.is_none());
//! # Ok::<(), huffpack::HuffError>(())
//! ```

pub mod bitio;
pub mod container;
pub mod file;
pub mod frequency;
pub mod huffman;
pub mod pipeline;
pub mod pqueue;

#[cfg(test)]
mod validation;

/// Error types for huffpack operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HuffError {
    /// Compression was requested on a zero-length source.
    #[error("input is empty")]
    EmptyInput,
    /// A tree was requested from a frequency table with no used symbols.
    #[error("frequency table has no symbols")]
    EmptyAlphabet,
    /// The container is missing a field or violates a format check.
    #[error("invalid container: {0}")]
    Format(&'static str),
    /// Reading or writing a source or destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HuffResult<T> = Result<T, HuffError>;

impl From<HuffError> for std::io::Error {
    fn from(e: HuffError) -> Self {
        match e {
            HuffError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
