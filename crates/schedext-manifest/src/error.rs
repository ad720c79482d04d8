//! Error types for schedext-manifest

/// Result type for schedext-manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in schedext-manifest operations
///
/// Both variants abort the whole patch pass: a manifest that fails the parse
/// boundary or has no scheduler container must never be partially rewritten.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed manifest: {message}")]
    Malformed { message: String },

    #[error("No container whose command starts with '{binary}' found in manifest")]
    SchedulerContainerNotFound { binary: String },
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
