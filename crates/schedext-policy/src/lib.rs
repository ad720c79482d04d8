//! Scheduler extender policy document model and merger
//!
//! The policy document is the JSON file the scheduler reads its extender
//! registrations from. This crate owns its typed schema, the merge rule that
//! keeps exactly one entry per managed resource, and the URL host rewrite
//! that points every registration at the current node.

pub mod document;
pub mod error;
pub mod merge;
pub mod url;

pub use document::{ExtenderEntry, ManagedResource, PolicyDocument};
pub use error::{Error, Result};
pub use merge::merge;
pub use url::rewrite_host;
