//! Error types for schedext-core

use std::path::PathBuf;

/// Result type for schedext-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in schedext-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest is absent and no previously reconciled copy exists to
    /// regenerate from. Fatal on the first pass.
    #[error("Manifest not found at {path} and no reconciled copy exists to regenerate from")]
    ManifestMissing { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from schedext-fs
    #[error(transparent)]
    Fs(#[from] schedext_fs::Error),

    /// Policy document error from schedext-policy
    #[error(transparent)]
    Policy(#[from] schedext_policy::Error),

    /// Manifest error from schedext-manifest
    #[error(transparent)]
    Manifest(#[from] schedext_manifest::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error should terminate the process instead of being
    /// retried on the next tick.
    ///
    /// A structurally broken manifest would be re-corrupted on every retry,
    /// and a manifest that never existed cannot be reconciled at all. I/O
    /// and policy-parse failures are transient and retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Manifest(_) | Error::ManifestMissing { .. })
    }
}
