//! Analyzer error types.

use thiserror::Error;
use warmind_manifest::ManifestError;
use warmind_types::DestinyHash;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("no item definition for hash {0}")]
    DefinitionNotFound(DestinyHash),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
}
