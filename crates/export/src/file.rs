//! Exported files and their naming.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ExportError;

/// Stem shared by every exported file name.
pub const FILE_STEM: &str = "noisy-gradient";

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }
}

/// Returns `noisy-gradient-<millis>.<ext>`.
pub fn file_name(format: ExportFormat, unix_millis: u128) -> String {
    format!("{FILE_STEM}-{unix_millis}.{}", format.extension())
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// An encoded export, held in memory until saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub format: ExportFormat,
    pub file_name: String,
    /// Declared width of the document (pixel width for raster output).
    pub width: u32,
    /// Declared height of the document (pixel height for raster output).
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Wraps encoded bytes, naming the file after the current time.
    pub fn new(format: ExportFormat, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name: file_name(format, now_millis()),
            width,
            height,
            bytes,
        }
    }

    /// Writes the file into `dir` and returns the path written.
    ///
    /// Never overwrites: if the name is taken, `-1`, `-2`, ... is appended
    /// to the stem.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let stem = self
            .file_name
            .strip_suffix(&format!(".{}", self.format.extension()))
            .unwrap_or(&self.file_name);
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                self.file_name.clone()
            } else {
                format!("{stem}-{attempt}.{}", self.format.extension())
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    write_or_remove(&path, &mut file, &self.bytes)?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Writes `bytes` to the freshly created `path`, removing it if the write fails.
fn write_or_remove(path: &Path, out: &mut impl Write, bytes: &[u8]) -> Result<(), ExportError> {
    if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
        let _ = std::fs::remove_file(path);
        return Err(e.into());
    }
    Ok(())
}
