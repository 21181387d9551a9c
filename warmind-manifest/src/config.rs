//! Processor configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`ManifestProcessor`](crate::ManifestProcessor).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Language loaded by `initialize()`.
    pub language: String,
    /// Host that root-relative image paths are joined onto.
    pub content_host: String,
    /// Upper bound for the snapshot download, in seconds.
    pub download_timeout_secs: u64,
    /// How deep child references are followed from one top-level lookup.
    pub max_resolve_depth: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            content_host: "https://www.bungie.net".to_string(),
            download_timeout_secs: 300,
            max_resolve_depth: 4,
        }
    }
}

impl ProcessorConfig {
    /// Snapshot download timeout.
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
