//! Filesystem primitives for the scheduler extender reconciler
//!
//! Provides content fingerprints for drift detection, tri-state file reads,
//! and atomic write-back for the tracked policy and manifest files.

pub mod error;
pub mod fingerprint;
pub mod io;

pub use error::{Error, Result};
pub use fingerprint::{fingerprint_bytes, fingerprint_file};
pub use io::{ReadOutcome, read_tracked, write_atomic};
