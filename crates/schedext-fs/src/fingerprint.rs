//! Content fingerprints for change detection
//!
//! Produces a single canonical fingerprint format (`sha256:<hex>`) over the
//! raw bytes of a tracked file. Fingerprints gate every rewrite: a file whose
//! fingerprint matches the last observed one is never touched.

use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::Path;

use crate::{Error, Result};

/// Prefix for all fingerprints produced by this module
const PREFIX: &str = "sha256:";

/// Compute the fingerprint of in-memory content.
pub fn fingerprint_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the fingerprint of a file's contents.
///
/// Returns `Ok(None)` when the file does not exist. A missing tracked file is
/// a control signal for the reconciler, not a failure.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn fingerprint_file(path: &Path) -> Result<Option<String>> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(fingerprint_bytes(&content))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}
