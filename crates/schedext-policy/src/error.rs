//! Error types for schedext-policy

/// Result type for schedext-policy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in schedext-policy operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed policy document: {message}")]
    Malformed { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
