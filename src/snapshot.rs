// Writes presented frames to timestamped PNG files.
// Best effort: callers log failures and carry on presenting.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use image::ImageFormat;

use crate::error::DisplayError;
use crate::present::Frame;

pub const DEFAULT_PREFIX: &str = "DisplaySS";

#[derive(Debug, Clone)]
pub struct SnapshotSink {
    prefix: String,
}

impl Default for SnapshotSink {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl SnapshotSink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Encode `frame` into a new file under `dir`.
    /// Returns `Ok(None)` when `dir` does not exist.
    pub fn capture(&self, dir: &Path, frame: &Frame) -> Result<Option<PathBuf>, DisplayError> {
        if !dir.is_dir() {
            log::debug!("Snapshot directory {} missing, skipping", dir.display());
            return Ok(None);
        }

        let image = frame.to_rgba_image().ok_or(DisplayError::MalformedFrame {
            width: frame.width,
            height: frame.height,
            len: frame.bytes.len(),
        })?;
        let (path, file) = self.create_unique(dir)?;
        write_or_remove(&path, file, |out| {
            image.write_to(out, ImageFormat::Png)?;
            Ok(())
        })?;

        log::debug!("Snapshot written to {}", path.display());
        Ok(Some(path))
    }

    /// `<prefix>_<timestamp without colons>.png`
    pub fn file_stem(&self) -> String {
        let stamp = Local::now()
            .to_rfc3339_opts(SecondsFormat::Micros, false)
            .replace(':', "");
        format!("{}_{}", self.prefix, stamp)
    }

    // Never overwrite: on collision append -1, -2, ...
    fn create_unique(&self, dir: &Path) -> Result<(PathBuf, File), DisplayError> {
        let stem = self.file_stem();
        let mut n = 0u32;
        loop {
            let name = if n == 0 {
                format!("{stem}.png")
            } else {
                format!("{stem}-{n}.png")
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

// A failed write must not leave a truncated file behind.
fn write_or_remove<F>(path: &Path, file: File, write: F) -> Result<(), DisplayError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), DisplayError>,
{
    let mut out = BufWriter::new(file);
    let result = write(&mut out).and_then(|()| out.flush().map_err(DisplayError::from));
    if result.is_err() {
        drop(out);
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("Could not remove partial snapshot {}: {e}", path.display());
        }
    }
    result
}
