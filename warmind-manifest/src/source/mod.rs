//! Definition sources.
//!
//! The processor never talks to the network directly. Everything it needs
//! from the game service goes through [`DefinitionSource`], so the cache and
//! resolver logic can run against an in-memory source in tests.

pub mod bungie;

pub use bungie::{BungieConfig, BungieSource};

use crate::error::{ManifestError, ManifestResult};
use async_trait::async_trait;
use warmind_types::{BatchResponse, DestinyHash, ManifestInfo, ManifestSnapshot, RawDefinition};

/// Largest number of hashes a single batch fetch may carry.
pub const MAX_BATCH_SIZE: usize = 20;

/// Abstract provider of manifest data.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Returns a short name for log output.
    fn name(&self) -> &'static str;

    /// Fetches the current manifest version and per-language content paths.
    async fn get_manifest_info(&self) -> ManifestResult<ManifestInfo>;

    /// Downloads the full snapshot at a root-relative content path.
    async fn download_content(&self, path: &str) -> ManifestResult<ManifestSnapshot>;

    /// Fetches one definition.
    async fn get_entity(
        &self,
        entity_type: &str,
        hash: DestinyHash,
    ) -> ManifestResult<RawDefinition>;

    /// Fetches up to [`MAX_BATCH_SIZE`] definitions in one call.
    ///
    /// Per-hash failures are reported in the response rather than as `Err`.
    async fn get_batch(
        &self,
        entity_type: &str,
        hashes: &[DestinyHash],
    ) -> ManifestResult<BatchResponse>;

    /// Free-text search over names and descriptions.
    async fn search(
        &self,
        _entity_type: &str,
        _term: &str,
        _limit: usize,
    ) -> ManifestResult<Vec<RawDefinition>> {
        Err(ManifestError::Unsupported("search"))
    }
}
