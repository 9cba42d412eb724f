//! Helpers for writing the validation run's persisted outputs.
//!
//! Grounded in the original `fileManagement.py`: open-or-create, write,
//! close, one file per artifact.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::err::{Result, ShaclError};

/// Opens `path/filename` for writing, creating `path` if necessary.
pub fn open_file(path: &Path, filename: &str) -> Result<BufWriter<File>> {
    std::fs::create_dir_all(path)
        .map_err(|e| ShaclError::Io(format!("failed to create '{}': {}", path.display(), e)))?;
    let file = File::create(path.join(filename))
        .map_err(|e| ShaclError::Io(format!("failed to create '{}': {}", filename, e)))?;
    Ok(BufWriter::new(file))
}

/// Writes `contents` to `path/filename`, creating `path` if necessary.
pub fn write_file(path: &Path, filename: &str, contents: &str) -> Result<()> {
    let mut writer = open_file(path, filename)?;
    writer
        .write_all(contents.as_bytes())
        .map_err(|e| ShaclError::Io(format!("failed to write '{}': {}", filename, e)))
}
