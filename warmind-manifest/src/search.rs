//! Free-text lookup by name and description.

use crate::error::ManifestResult;
use crate::processor::ManifestProcessor;
use std::sync::Arc;
use tracing::{debug, warn};
use warmind_types::{ProcessedDefinition, hash_at};

impl ManifestProcessor {
    /// Searches definitions of one entity type.
    ///
    /// The source's search is preferred and its results are returned as
    /// delivered (the source applies `limit`). If it fails or is not
    /// supported, the cache is scanned instead.
    pub async fn search_definitions(
        &self,
        entity_type: &str,
        term: &str,
        limit: usize,
    ) -> ManifestResult<Vec<Arc<ProcessedDefinition>>> {
        self.ensure_initialized().await?;

        match self.source().search(entity_type, term, limit).await {
            Ok(results) => {
                let mut definitions = Vec::with_capacity(results.len());
                for raw in &results {
                    // Cached records are complete; search hits may be summaries.
                    let cached = hash_at(raw, "/hash")
                        .and_then(|hash| self.cache().get(entity_type, hash));
                    let definition = match cached {
                        Some(definition) => definition,
                        None => Arc::new(self.process_definition(entity_type, raw).await),
                    };
                    definitions.push(definition);
                }
                debug!(
                    "{} search for '{}' returned {} results",
                    entity_type,
                    term,
                    definitions.len()
                );
                Ok(definitions)
            }
            Err(e) => {
                warn!("Remote search failed ({}), scanning local cache", e);
                Ok(self.search_cache(entity_type, term, limit))
            }
        }
    }

    /// Case-insensitive scan of cached names and descriptions.
    ///
    /// Every match is collected, sorted by hash, then cut to `limit`.
    pub fn search_cache(
        &self,
        entity_type: &str,
        term: &str,
        limit: usize,
    ) -> Vec<Arc<ProcessedDefinition>> {
        let needle = term.to_lowercase();
        let mut matches = Vec::new();
        if limit == 0 {
            return matches;
        }

        self.cache().scan(entity_type, |definition| {
            let props = &definition.display_properties;
            if props.name.to_lowercase().contains(&needle)
                || props.description.to_lowercase().contains(&needle)
            {
                matches.push(Arc::clone(definition));
            }
            true
        });

        matches.sort_by_key(|definition| definition.hash);
        matches.truncate(limit);
        matches
    }
}
