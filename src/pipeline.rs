/// Compression orchestrator.
///
/// **Compression:** bytes → frequency table → Huffman tree → code table →
/// bit-packed payload, preceded by a container header (see [`container`]).
/// Inputs no longer than [`CompressOptions::passthrough_threshold`] are
/// stored verbatim behind a one-byte marker instead.
///
/// **Decompression:** header → frequency table → rebuilt tree → tree walk
/// over the payload bits. A payload that ends before the declared length is
/// not an error: the bytes decoded so far are returned together with a
/// [`Truncation`] report.
///
/// [`container`]: crate::container
use std::fmt;
use std::io::{Read, Write};

use crate::bitio::{BitReader, BitWriter};
use crate::container::{self, Header, Mode, PASSTHROUGH_THRESHOLD};
use crate::frequency::FrequencyTable;
use crate::huffman::HuffmanTree;
use crate::{HuffError, HuffResult};

/// Upper bound on the output buffer reserved up front from an untrusted header.
const MAX_PREALLOC: usize = 64 << 20;

/// Options controlling compression.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Inputs of at most this many bytes use passthrough mode.
    pub passthrough_threshold: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        CompressOptions {
            passthrough_threshold: PASSTHROUGH_THRESHOLD,
        }
    }
}

/// The payload ended before the declared original length was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    /// Original byte count declared in the header.
    pub expected: u64,
    /// Bytes actually recovered.
    pub decoded: u64,
}

impl Truncation {
    pub fn missing(&self) -> u64 {
        self.expected - self.decoded
    }
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payload truncated: decoded {} of {} bytes ({} missing)",
            self.decoded,
            self.expected,
            self.missing()
        )
    }
}

/// Result of decompressing a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub data: Vec<u8>,
    /// Set when the payload ran out early; `data` then holds a prefix.
    pub truncation: Option<Truncation>,
}

impl Decompressed {
    pub fn is_complete(&self) -> bool {
        self.truncation.is_none()
    }
}

/// Compress data with default options.
///
/// Returns a self-contained container.
pub fn compress(input: &[u8]) -> HuffResult<Vec<u8>> {
    compress_with_options(input, &CompressOptions::default())
}

/// Compress data with the given options.
pub fn compress_with_options(input: &[u8], options: &CompressOptions) -> HuffResult<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len() / 2 + container::HUFFMAN_FIXED_HEADER_SIZE);
    compress_to(input, &mut output, options)?;
    Ok(output)
}

/// Compress `input` and write the container to `output`.
///
/// Returns the number of bytes written. Fails with
/// [`HuffError::EmptyInput`] before writing anything if `input` is empty.
pub fn compress_to<W: Write>(
    input: &[u8],
    mut output: W,
    options: &CompressOptions,
) -> HuffResult<u64> {
    if input.is_empty() {
        return Err(HuffError::EmptyInput);
    }

    if input.len() <= options.passthrough_threshold {
        log::debug!("{} bytes: passthrough mode", input.len());
        container::write_header(&mut output, &Header::Passthrough)?;
        output.write_all(input)?;
        output.flush()?;
        return Ok(1 + input.len() as u64);
    }

    let mut freq = FrequencyTable::new();
    freq.count(input);
    log::trace!(
        "frequency table: {} symbols, entropy {:.3} bits/byte",
        freq.used,
        freq.entropy()
    );

    let tree = HuffmanTree::from_frequency_table(&freq)?;
    let codes = tree.code_table();

    let header = Header::Huffman {
        original_len: input.len() as u64,
        freq,
    };
    container::write_header(&mut output, &header)?;

    let mut writer = BitWriter::new(output);
    codes.encode(input, &mut writer)?;
    let payload_bits = writer.bits_written();
    writer.finish()?;

    let payload_len = payload_bits.div_ceil(8);
    log::debug!(
        "{} bytes: huffman mode, {} symbols, max code {} bits, header {} + payload {} bytes",
        input.len(),
        tree.leaf_count,
        codes.max_code_len(),
        header.encoded_len(),
        payload_len
    );
    Ok(header.encoded_len() as u64 + payload_len)
}

/// Decompress a container held in memory.
pub fn decompress(container: &[u8]) -> HuffResult<Decompressed> {
    decompress_from(container)
}

/// Decompress a container read from `input`.
///
/// Header violations fail with [`HuffError::Format`]; a short payload is
/// reported through [`Decompressed::truncation`] and logged as a warning.
pub fn decompress_from<R: Read>(mut input: R) -> HuffResult<Decompressed> {
    let header = container::read_header(&mut input)?;

    match header {
        Header::Passthrough => {
            let mut data = Vec::new();
            input.read_to_end(&mut data)?;
            if data.is_empty() {
                return Err(HuffError::Format("passthrough container has no payload"));
            }
            log::debug!("{} mode: {} bytes", Mode::Passthrough, data.len());
            Ok(Decompressed {
                data,
                truncation: None,
            })
        }
        Header::Huffman { original_len, freq } => {
            let tree = HuffmanTree::from_frequency_table(&freq)?;
            let prealloc = usize::try_from(original_len)
                .unwrap_or(usize::MAX)
                .min(MAX_PREALLOC);
            let mut data = Vec::with_capacity(prealloc);

            let mut reader = BitReader::new(input);
            let decoded = tree.decode(&mut reader, original_len, &mut data)?;
            log::debug!(
                "{} mode: {} symbols, {} of {} bytes decoded",
                Mode::Huffman,
                tree.leaf_count,
                decoded,
                original_len
            );

            let truncation = (decoded < original_len).then(|| Truncation {
                expected: original_len,
                decoded,
            });
            if let Some(t) = &truncation {
                log::warn!("{t}");
            }
            Ok(Decompressed { data, truncation })
        }
    }
}
