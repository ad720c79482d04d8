//! Tri-state file reads and atomic write-back
//!
//! Reads of tracked files distinguish "present", "missing", and "a directory
//! sits where the file should be". Missing is an expected state during
//! bootstrap; a directory at the tracked path is a recoverable obstruction
//! the caller may clear and regenerate over. Genuine I/O failures surface as
//! errors so they are never mistaken for absence.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::{Error, Result};

/// Outcome of reading a tracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The file exists and was read in full.
    Present(String),
    /// Nothing exists at the path.
    Missing,
    /// A directory occupies the tracked path.
    IsDirectory,
}

impl ReadOutcome {
    /// The file content, if present.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Present(content) => Some(content),
            _ => None,
        }
    }
}

/// Read a tracked file, classifying absence separately from failure.
///
/// # Errors
///
/// Returns an error only for genuine I/O failures (permissions, hardware),
/// never for a missing file.
pub fn read_tracked(path: &Path) -> Result<ReadOutcome> {
    if path.is_dir() {
        return Ok(ReadOutcome::IsDirectory);
    }
    match fs::read_to_string(path) {
        Ok(content) => Ok(ReadOutcome::Present(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ReadOutcome::Missing),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename in the target directory so a crash or a
/// concurrent reader (the kubelet watches the manifest directory) never
/// observes a partially written file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}
