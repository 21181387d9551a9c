//! Many-hash lookups.

use crate::error::ManifestResult;
use crate::processor::ManifestProcessor;
use crate::source::MAX_BATCH_SIZE;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};
use warmind_types::{BatchItemError, DestinyHash, ProcessedDefinition};

/// Outcome of a batch lookup.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Resolved definitions keyed by canonical hash.
    pub definitions: BTreeMap<DestinyHash, Arc<ProcessedDefinition>>,
    /// Hashes the source reported as failed.
    pub errors: Vec<BatchItemError>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, hash: impl Into<DestinyHash>) -> Option<&Arc<ProcessedDefinition>> {
        self.definitions.get(&hash.into())
    }
}

impl ManifestProcessor {
    /// Resolves many hashes of one entity type.
    ///
    /// Cached hashes are served directly; the rest are fetched with batch
    /// calls of at most [`MAX_BATCH_SIZE`] hashes. Duplicates collapse to one
    /// entry. Remote failures never fail the batch: a failed call is logged
    /// and skipped, per-hash failures land in [`BatchResult::errors`].
    pub async fn batch_get_definitions<I, H>(
        &self,
        entity_type: &str,
        hashes: I,
    ) -> ManifestResult<BatchResult>
    where
        I: IntoIterator<Item = H>,
        H: Into<DestinyHash>,
    {
        let requested: BTreeSet<DestinyHash> = hashes.into_iter().map(Into::into).collect();
        let mut result = BatchResult::default();
        if requested.is_empty() {
            return Ok(result);
        }

        self.ensure_initialized().await?;

        let mut uncached = Vec::new();
        for hash in requested {
            match self.cache().get(entity_type, hash) {
                Some(definition) => {
                    result.definitions.insert(hash, definition);
                }
                None => uncached.push(hash),
            }
        }

        debug!(
            "Batch {}: {} cached, {} to fetch",
            entity_type,
            result.definitions.len(),
            uncached.len()
        );

        for chunk in uncached.chunks(MAX_BATCH_SIZE) {
            let generation = self.generation();
            let response = match self.source().get_batch(entity_type, chunk).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        "Batch fetch of {} {} definitions failed: {}",
                        chunk.len(),
                        entity_type,
                        e
                    );
                    continue;
                }
            };

            for error in &response.errors {
                warn!("Batch item {} {} failed: {}", entity_type, error.hash, error.error);
            }
            result.errors.extend(response.errors);

            let processed = join_all(
                response
                    .results
                    .into_iter()
                    .map(|(hash, raw)| async move {
                        (hash, self.process_and_cache(entity_type, hash, raw, generation).await)
                    }),
            )
            .await;
            result.definitions.extend(processed);
        }

        Ok(result)
    }
}
