//! Manifest error types.

use thiserror::Error;
use warmind_types::DestinyHash;

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while loading or resolving definitions.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("service error {code} ({status}): {message}")]
    Service {
        code: i64,
        status: String,
        message: String,
    },

    #[error("manifest has no content for language '{language}' (available: {available})")]
    LanguageUnavailable { language: String, available: String },

    #[error("initialization failed in a concurrent call: {0}")]
    InitializationFailed(String),

    #[error("manifest download timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("definition not found: {entity_type} {hash}")]
    NotFound {
        entity_type: String,
        hash: DestinyHash,
    },

    #[error("batch of {requested} exceeds the limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },

    #[error("{0} is not supported by this source")]
    Unsupported(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ManifestError {
    /// Returns true if this error represents a 404 or a missing record.
    pub fn is_not_found(&self) -> bool {
        match self {
            ManifestError::NotFound { .. } => true,
            ManifestError::Http(e) => e.status().is_some_and(|s| s.as_u16() == 404),
            _ => false,
        }
    }
}
