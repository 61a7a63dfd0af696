//! File-to-file compression sessions.
//!
//! Each session writes its artifact to a temporary file next to the
//! destination and renames it into place only after the whole session has
//! succeeded. A failed session leaves the destination as it was.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::container::{self, ContainerInfo};
use crate::pipeline::{self, CompressOptions, Truncation};
use crate::{HuffError, HuffResult};

/// Sizes and outcome of one file session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub input_len: u64,
    pub output_len: u64,
    /// Only set by decompression sessions whose payload ended early.
    pub truncation: Option<Truncation>,
}

impl SessionReport {
    /// `(1 - compressed / original) * 100`, from the perspective of a
    /// compression session.
    pub fn space_saving(&self) -> f64 {
        if self.input_len == 0 {
            return 0.0;
        }
        (1.0 - self.output_len as f64 / self.input_len as f64) * 100.0
    }
}

/// Run `write` against a temp file in `dest`'s directory, then move it over `dest`.
fn write_atomically<T, F>(dest: &Path, write: F) -> HuffResult<T>
where
    F: FnOnce(&mut dyn Write) -> HuffResult<T>,
{
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;

    let value = {
        let mut out = BufWriter::new(tmp.as_file_mut());
        let value = write(&mut out)?;
        out.flush()?;
        value
    };
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| HuffError::Io(e.error))?;
    Ok(value)
}

/// Compress the file at `input` into a container at `output`.
///
/// An empty source fails with [`HuffError::EmptyInput`] and creates nothing.
pub fn compress_file(
    input: &Path,
    output: &Path,
    options: &CompressOptions,
) -> HuffResult<SessionReport> {
    let data = fs::read(input)?;
    if data.is_empty() {
        return Err(HuffError::EmptyInput);
    }

    let written = write_atomically(output, |w| pipeline::compress_to(&data, w, options))?;
    log::debug!(
        "{} -> {}: {} -> {} bytes",
        input.display(),
        output.display(),
        data.len(),
        written
    );

    Ok(SessionReport {
        input_len: data.len() as u64,
        output_len: written,
        truncation: None,
    })
}

/// Decompress the container at `input` into `output`.
///
/// Header violations fail before `output` is touched. A truncated payload
/// still produces `output` holding every byte that could be recovered.
pub fn decompress_file(input: &Path, output: &Path) -> HuffResult<SessionReport> {
    let file = File::open(input)?;
    let input_len = file.metadata()?.len();
    let decoded = pipeline::decompress_from(BufReader::new(file))?;

    write_atomically(output, |w| Ok(w.write_all(&decoded.data)?))?;
    log::debug!(
        "{} -> {}: {} -> {} bytes",
        input.display(),
        output.display(),
        input_len,
        decoded.data.len()
    );

    Ok(SessionReport {
        input_len,
        output_len: decoded.data.len() as u64,
        truncation: decoded.truncation,
    })
}

/// Describe the container at `path`, reading only its header.
pub fn inspect_file(path: &Path) -> HuffResult<ContainerInfo> {
    let file = File::open(path)?;
    let total_len = file.metadata()?.len();
    let header = container::read_header(&mut BufReader::new(file))?;
    Ok(container::describe(&header, total_len))
}
