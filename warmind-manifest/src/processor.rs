//! Manifest processor: bulk load, single lookups and the processing pipeline.
//!
//! The processor owns the definition cache. It is loaded once from a
//! versioned snapshot and afterwards serves lookups from memory, falling
//! back to the source for anything the snapshot did not contain.

use crate::cache::DefinitionCache;
use crate::config::ProcessorConfig;
use crate::display;
use crate::error::{ManifestError, ManifestResult};
use crate::source::DefinitionSource;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, join_all};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError, RwLock as StdRwLock};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use warmind_types::{
    DestinyHash, ManifestMetadata, ManifestSnapshot, ManifestStatus, ProcessedDefinition,
    RawDefinition, ResolvedHashes, ResolvedStat, entity, hash_at, hash_from_value, hashes_at,
    value_at,
};

/// Where a lookup may look for a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// Cache only; used while bulk loading so gaps in the snapshot stay gaps.
    CacheOnly,
    /// Cache, then a single fetch from the source.
    CacheOrFetch,
}

/// Definitions currently being resolved on one top-level call, innermost first.
pub(crate) struct ResolveChain<'a> {
    entity_type: &'a str,
    hash: DestinyHash,
    parent: Option<&'a ResolveChain<'a>>,
}

impl ResolveChain<'_> {
    fn contains(&self, entity_type: &str, hash: DestinyHash) -> bool {
        let mut link = Some(self);
        while let Some(current) = link {
            if current.hash == hash && current.entity_type == entity_type {
                return true;
            }
            link = current.parent;
        }
        false
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut link = Some(self);
        while let Some(current) = link {
            depth += 1;
            link = current.parent;
        }
        depth
    }
}

/// Loads, caches and resolves manifest definitions.
///
/// Construct one per language and share it behind an `Arc`. Lifecycle:
/// `new` → `initialize` → lookups → optionally `clear` to force a reload.
pub struct ManifestProcessor {
    config: ProcessorConfig,
    source: Arc<dyn DefinitionSource>,
    cache: DefinitionCache,
    metadata: RwLock<Option<ManifestMetadata>>,
    initialized: AtomicBool,
    /// Held for the whole of a load so concurrent callers wait for it.
    init_lock: Mutex<()>,
    /// Incremented by every finished load attempt, successful or not.
    load_attempts: AtomicU64,
    /// Error of the most recent attempt; `None` after a success or `clear()`.
    last_load_error: StdMutex<Option<String>>,
    /// Bumped whenever the cache is emptied. Miss-fills started under an
    /// older generation are discarded.
    generation: StdRwLock<u64>,
}

impl ManifestProcessor {
    /// Creates an empty, uninitialized processor.
    pub fn new(source: Arc<dyn DefinitionSource>, config: ProcessorConfig) -> Self {
        Self {
            config,
            source,
            cache: DefinitionCache::new(),
            metadata: RwLock::new(None),
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
            load_attempts: AtomicU64::new(0),
            last_load_error: StdMutex::new(None),
            generation: StdRwLock::new(0),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Returns the definition cache.
    pub fn cache(&self) -> &DefinitionCache {
        &self.cache
    }

    /// Returns the source this processor reads from.
    pub fn source(&self) -> &Arc<dyn DefinitionSource> {
        &self.source
    }

    /// Returns whether a snapshot has been fully loaded.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Metadata of the loaded snapshot.
    pub async fn metadata(&self) -> Option<ManifestMetadata> {
        self.metadata.read().await.clone()
    }

    /// Version of the loaded snapshot.
    pub async fn version(&self) -> Option<String> {
        self.metadata.read().await.as_ref().map(|m| m.version.clone())
    }

    /// Point-in-time status for diagnostics.
    pub async fn status(&self) -> ManifestStatus {
        let metadata = self.metadata.read().await;
        ManifestStatus {
            initialized: self.is_initialized(),
            version: metadata.as_ref().map(|m| m.version.clone()),
            language: metadata.as_ref().map(|m| m.language.clone()),
            cached_definitions: self.cache.len(),
            loaded_at: metadata.as_ref().map(|m| m.loaded_at),
        }
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Loads the snapshot for the configured language.
    pub async fn initialize(&self) -> ManifestResult<()> {
        let language = self.config.language.clone();
        self.initialize_language(&language).await
    }

    /// Loads the snapshot for `language`.
    ///
    /// Returns immediately once loaded. Calls that arrive while a load is in
    /// flight wait for it and share its outcome instead of downloading again.
    /// Switching language requires `clear()` first.
    pub async fn initialize_language(&self, language: &str) -> ManifestResult<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let attempts_seen = self.load_attempts.load(Ordering::Acquire);
        let _guard = self.init_lock.lock().await;

        if self.is_initialized() {
            return Ok(());
        }
        // only a failed attempt is shared; a success followed by clear() loads again
        if self.load_attempts.load(Ordering::Acquire) != attempts_seen
            && let Some(message) = self.last_load_error()
        {
            return Err(ManifestError::InitializationFailed(message));
        }

        let result = self.load(language).await;
        self.load_attempts.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(metadata) => {
                info!(
                    "Manifest {} ({}) ready: {} definitions",
                    metadata.version, metadata.language, metadata.definition_count
                );
                *self.metadata.write().await = Some(metadata);
                self.set_load_error(None);
                self.initialized.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                warn!("Manifest initialization failed: {}", e);
                self.reset_cache();
                self.set_load_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Drops the cache and metadata so the next call loads a fresh snapshot.
    pub async fn clear(&self) {
        let _guard = self.init_lock.lock().await;
        self.reset_cache();
        *self.metadata.write().await = None;
        self.set_load_error(None);
        self.initialized.store(false, Ordering::Release);
        debug!("Manifest cache cleared");
    }

    fn last_load_error(&self) -> Option<String> {
        self.last_load_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_load_error(&self, error: Option<String>) {
        *self
            .last_load_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }

    /// Empties the cache and starts a new generation.
    fn reset_cache(&self) {
        let mut generation = self
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.cache.clear();
    }

    /// Current cache generation, captured before a remote fetch.
    pub(crate) fn generation(&self) -> u64 {
        *self
            .generation
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Caches a fetched definition unless the cache was emptied since
    /// `generation` was captured.
    fn fill(
        &self,
        entity_type: &str,
        hash: DestinyHash,
        definition: Arc<ProcessedDefinition>,
        generation: u64,
    ) {
        let current = self
            .generation
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if *current == generation {
            self.cache.insert(entity_type, hash, definition);
        } else {
            debug!("Discarding {} {} fetched before a cache reset", entity_type, hash);
        }
    }

    pub(crate) async fn ensure_initialized(&self) -> ManifestResult<()> {
        if self.is_initialized() {
            return Ok(());
        }
        self.initialize().await
    }

    async fn load(&self, language: &str) -> ManifestResult<ManifestMetadata> {
        let info = self.source.get_manifest_info().await?;
        debug!("{} reports manifest version {}", self.source.name(), info.version);

        let path = info
            .content_paths_by_language
            .get(language)
            .ok_or_else(|| ManifestError::LanguageUnavailable {
                language: language.to_string(),
                available: info
                    .content_paths_by_language
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        info!("Downloading manifest content for '{}'", language);
        let snapshot = tokio::time::timeout(
            self.config.download_timeout(),
            self.source.download_content(path),
        )
        .await
        .map_err(|_| ManifestError::Timeout {
            secs: self.config.download_timeout_secs,
        })??;

        let definition_count = self.populate(snapshot).await;

        Ok(ManifestMetadata {
            version: info.version.clone(),
            language: language.to_string(),
            content_paths_by_language: info.content_paths_by_language,
            loaded_at: Utc::now(),
            definition_count,
        })
    }

    /// Inserts a snapshot into the cache, returning the number of definitions.
    ///
    /// First every record goes in with display properties only; then records
    /// with child references are re-processed against the complete cache.
    async fn populate(&self, snapshot: ManifestSnapshot) -> usize {
        let mut with_children = Vec::new();
        let mut count = 0;

        for (entity_type, definitions) in snapshot {
            for (key, raw) in definitions {
                let hash = key
                    .parse::<DestinyHash>()
                    .ok()
                    .or_else(|| hash_at(&raw, "/hash"));
                let Some(hash) = hash else {
                    warn!("Skipping {} entry with unusable key '{}'", entity_type, key);
                    continue;
                };

                if has_child_references(&raw) {
                    with_children.push((entity_type.clone(), hash));
                }

                let shallow = ProcessedDefinition {
                    entity_type: entity_type.clone(),
                    hash,
                    display_properties: display::display_properties(
                        &raw,
                        &self.config.content_host,
                    ),
                    resolved_hashes: ResolvedHashes::default(),
                    raw,
                };
                self.cache.insert(&entity_type, hash, Arc::new(shallow));
                count += 1;
            }
        }

        debug!(
            "Inserted {} definitions, resolving references for {}",
            count,
            with_children.len()
        );

        for (i, (entity_type, hash)) in with_children.iter().enumerate() {
            let Some(shallow) = self.cache.get(entity_type, *hash) else {
                continue;
            };
            let chain = ResolveChain {
                entity_type,
                hash: *hash,
                parent: None,
            };
            let resolved_hashes = self
                .resolve_children(&shallow.raw, Lookup::CacheOnly, Some(&chain))
                .await;

            let processed = ProcessedDefinition {
                resolved_hashes,
                ..(*shallow).clone()
            };
            self.cache.insert(entity_type, *hash, Arc::new(processed));

            if i % 1024 == 1023 {
                tokio::task::yield_now().await;
            }
        }

        count
    }

    // ── Lookups ──────────────────────────────────────────────────

    /// Returns one definition, loading the manifest first if needed.
    ///
    /// A cache miss falls back to a single fetch from the source. A failed
    /// fetch is logged and reported as `Ok(None)`; only a failed
    /// initialization is an error.
    pub async fn get_definition(
        &self,
        entity_type: &str,
        hash: impl Into<DestinyHash>,
    ) -> ManifestResult<Option<Arc<ProcessedDefinition>>> {
        self.ensure_initialized().await?;
        Ok(self
            .resolve(entity_type, hash.into(), Lookup::CacheOrFetch, None)
            .await)
    }

    /// Runs the processing pipeline on a raw record without caching it.
    ///
    /// The input is not modified.
    pub async fn process_definition(
        &self,
        entity_type: &str,
        raw: &RawDefinition,
    ) -> ProcessedDefinition {
        let hash = hash_at(raw, "/hash").unwrap_or_default();
        let chain = ResolveChain {
            entity_type,
            hash,
            parent: None,
        };
        self.process(entity_type, hash, raw.clone(), Lookup::CacheOrFetch, Some(&chain))
            .await
    }

    /// Processes a fetched record and stores it in the cache.
    ///
    /// `generation` is the cache generation from before the fetch started.
    pub(crate) async fn process_and_cache(
        &self,
        entity_type: &str,
        hash: DestinyHash,
        raw: RawDefinition,
        generation: u64,
    ) -> Arc<ProcessedDefinition> {
        let chain = ResolveChain {
            entity_type,
            hash,
            parent: None,
        };
        let processed = Arc::new(
            self.process(entity_type, hash, raw, Lookup::CacheOrFetch, Some(&chain))
                .await,
        );
        self.fill(entity_type, hash, Arc::clone(&processed), generation);
        processed
    }

    /// Cache-or-fetch lookup used for top-level calls and child references.
    pub(crate) fn resolve<'a>(
        &'a self,
        entity_type: &'a str,
        hash: DestinyHash,
        lookup: Lookup,
        chain: Option<&'a ResolveChain<'a>>,
    ) -> BoxFuture<'a, Option<Arc<ProcessedDefinition>>> {
        async move {
            if let Some(hit) = self.cache.get(entity_type, hash) {
                return Some(hit);
            }
            if lookup == Lookup::CacheOnly {
                return None;
            }
            if let Some(chain) = chain {
                if chain.contains(entity_type, hash) {
                    warn!("Reference cycle at {} {}, leaving unresolved", entity_type, hash);
                    return None;
                }
                if chain.depth() > self.config.max_resolve_depth {
                    debug!("Depth limit reached at {} {}", entity_type, hash);
                    return None;
                }
            }

            let generation = self.generation();
            let raw = match self.source.get_entity(entity_type, hash).await {
                Ok(raw) => raw,
                Err(e) if e.is_not_found() => {
                    warn!("{} {} not found in manifest or source", entity_type, hash);
                    return None;
                }
                Err(e) => {
                    warn!("Failed to fetch {} {}: {}", entity_type, hash, e);
                    return None;
                }
            };

            let link = ResolveChain {
                entity_type,
                hash,
                parent: chain,
            };
            let processed = self
                .process(entity_type, hash, raw, lookup, Some(&link))
                .await;
            let processed = Arc::new(processed);
            self.fill(entity_type, hash, Arc::clone(&processed), generation);
            Some(processed)
        }
        .boxed()
    }

    async fn process(
        &self,
        entity_type: &str,
        hash: DestinyHash,
        raw: RawDefinition,
        lookup: Lookup,
        chain: Option<&ResolveChain<'_>>,
    ) -> ProcessedDefinition {
        let display_properties = display::display_properties(&raw, &self.config.content_host);
        let resolved_hashes = self.resolve_children(&raw, lookup, chain).await;

        ProcessedDefinition {
            entity_type: entity_type.to_string(),
            hash,
            display_properties,
            resolved_hashes,
            raw,
        }
    }

    /// Resolves damage type, item categories and stats referenced by `raw`.
    ///
    /// All child lookups run concurrently and complete before returning.
    async fn resolve_children(
        &self,
        raw: &RawDefinition,
        lookup: Lookup,
        chain: Option<&ResolveChain<'_>>,
    ) -> ResolvedHashes {
        let category_hashes = hashes_at(raw, "/itemCategoryHashes");
        let damage_hash = hash_at(raw, "/defaultDamageTypeHash").filter(|h| h.as_u32() != 0);
        let stat_entries = stat_entries(raw);

        let categories = join_all(
            category_hashes
                .iter()
                .map(|&h| self.resolve(entity::ITEM_CATEGORY, h, lookup, chain)),
        );
        let damage_type = async {
            match damage_hash {
                Some(h) => self.resolve(entity::DAMAGE_TYPE, h, lookup, chain).await,
                None => None,
            }
        };
        let stat_definitions = join_all(
            stat_entries
                .iter()
                .map(|entry| self.resolve(entity::STAT, entry.0, lookup, chain)),
        );

        let (categories, default_damage_type, stat_definitions) =
            futures::join!(categories, damage_type, stat_definitions);

        let stats = stat_entries
            .into_iter()
            .zip(stat_definitions)
            .map(|((hash, value, maximum), definition)| {
                (
                    hash,
                    ResolvedStat {
                        definition,
                        value,
                        maximum,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        ResolvedHashes {
            default_damage_type,
            item_categories: categories.into_iter().flatten().collect(),
            stats,
        }
    }
}

/// `(stat hash, value, maximum)` for each entry of `stats.stats`.
fn stat_entries(raw: &RawDefinition) -> Vec<(DestinyHash, i64, i64)> {
    let Some(stats) = value_at(raw, "/stats/stats").and_then(|v| v.as_object()) else {
        return Vec::new();
    };

    stats
        .iter()
        .filter_map(|(key, entry)| {
            let hash = key
                .parse::<DestinyHash>()
                .ok()
                .or_else(|| entry.get("statHash").and_then(hash_from_value))?;
            let value = entry.get("value").and_then(|v| v.as_i64()).unwrap_or(0);
            let maximum = entry.get("maximum").and_then(|v| v.as_i64()).unwrap_or(0);
            Some((hash, value, maximum))
        })
        .collect()
}

fn has_child_references(raw: &RawDefinition) -> bool {
    raw.contains_key("itemCategoryHashes")
        || raw.contains_key("defaultDamageTypeHash")
        || value_at(raw, "/stats/stats").is_some()
}
