//! Reconciliation engine for the scheduler extender config
//!
//! Coordinates the leaf crates into the node-level reconciliation loop:
//!
//! - **Settings**: the externally supplied configuration and derived paths
//! - **BackupManager**: timestamped copies of tracked files with retention
//! - **Reconciler**: fingerprint-gated passes that merge the policy document
//!   and patch the scheduler manifest
//!
//! ```text
//!          schedext-cli
//!               |
//!         schedext-core
//!               |
//!     +---------+----------+
//!     |         |          |
//! schedext-fs  schedext-policy  schedext-manifest
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod reconcile;

pub use backup::BackupManager;
pub use config::Settings;
pub use error::{Error, Result};
pub use reconcile::{PassReport, ReconcileState, Reconciler};
