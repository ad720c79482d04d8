//! Static-pod manifest schema and idempotent patcher
//!
//! The kube-scheduler static-pod manifest is parsed into a small typed
//! schema, validated once at the parse boundary, and edited through a fixed
//! set of idempotent patches. Unknown fields ride along untouched.

pub mod error;
pub mod patch;
pub mod schema;

pub use error::{Error, Result};
pub use patch::{PatchSpec, REVISION_ANNOTATION};
pub use schema::{Container, HostPathVolumeSource, PodManifest, Volume, VolumeMount};
