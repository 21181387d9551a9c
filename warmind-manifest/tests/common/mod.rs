//! Shared test helpers: an in-memory definition source with call counters.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use warmind_manifest::{
    DefinitionSource, ManifestError, ManifestProcessor, ManifestResult, ProcessorConfig,
};
use warmind_types::{
    BatchItemError, BatchResponse, DestinyHash, ManifestInfo, ManifestSnapshot, RawDefinition,
};

pub const STAT: &str = "DestinyStatDefinition";
pub const ITEM: &str = "DestinyInventoryItemDefinition";
pub const CATEGORY: &str = "DestinyItemCategoryDefinition";
pub const DAMAGE: &str = "DestinyDamageTypeDefinition";

pub const ATTACK_HASH: u32 = 1_480_404_414;
pub const ITEM_HASH: u32 = 1_363_886_209;
pub const CONTENT_PATH: &str = "/common/destiny2_content/json/en/aggregate.json";

/// Converts a JSON literal into a raw definition.
pub fn raw(value: Value) -> RawDefinition {
    value.as_object().cloned().expect("definition must be a JSON object")
}

/// Raw definition with the given hash and display name.
pub fn named(hash: u32, name: &str) -> RawDefinition {
    raw(json!({
        "hash": hash,
        "displayProperties": {"name": name, "description": format!("{name} description")}
    }))
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub manifest_info: AtomicUsize,
    pub download: AtomicUsize,
    pub entity: AtomicUsize,
    pub batch: AtomicUsize,
    pub search: AtomicUsize,
}

impl Calls {
    pub fn network_total(&self) -> usize {
        self.manifest_info.load(Ordering::SeqCst)
            + self.download.load(Ordering::SeqCst)
            + self.entity.load(Ordering::SeqCst)
            + self.batch.load(Ordering::SeqCst)
            + self.search.load(Ordering::SeqCst)
    }

    pub fn entity(&self) -> usize {
        self.entity.load(Ordering::SeqCst)
    }

    pub fn batch(&self) -> usize {
        self.batch.load(Ordering::SeqCst)
    }

    pub fn download(&self) -> usize {
        self.download.load(Ordering::SeqCst)
    }
}

/// In-memory source: a snapshot for bulk loads plus a separate set of
/// records only reachable through single and batch fetches.
#[derive(Default)]
pub struct FakeSource {
    pub version: String,
    pub languages: BTreeMap<String, String>,
    pub snapshot: ManifestSnapshot,
    pub remote: HashMap<(String, DestinyHash), RawDefinition>,
    pub search_results: Option<Vec<RawDefinition>>,
    pub fail_manifest_info: bool,
    pub fail_download: bool,
    pub fail_batch: bool,
    pub download_delay: Option<Duration>,
    pub entity_delay: Option<Duration>,
    pub calls: Calls,
}

impl FakeSource {
    pub fn new() -> Self {
        let mut languages = BTreeMap::new();
        languages.insert("en".to_string(), CONTENT_PATH.to_string());
        Self {
            version: "230101.1".to_string(),
            languages,
            ..Default::default()
        }
    }

    /// Adds a record to the bulk snapshot.
    pub fn with_snapshot(
        mut self,
        entity_type: &str,
        hash: u32,
        definition: RawDefinition,
    ) -> Self {
        self.snapshot
            .entry(entity_type.to_string())
            .or_default()
            .insert(hash.to_string(), definition);
        self
    }

    /// Adds a record only reachable through single/batch fetches.
    pub fn with_remote(mut self, entity_type: &str, hash: u32, definition: RawDefinition) -> Self {
        self.remote
            .insert((entity_type.to_string(), DestinyHash::new(hash)), definition);
        self
    }

    pub fn with_search_results(mut self, results: Vec<RawDefinition>) -> Self {
        self.search_results = Some(results);
        self
    }

    fn lookup(&self, entity_type: &str, hash: DestinyHash) -> Option<RawDefinition> {
        self.remote
            .get(&(entity_type.to_string(), hash))
            .cloned()
            .or_else(|| {
                self.snapshot
                    .get(entity_type)
                    .and_then(|defs| defs.get(&hash.to_string()))
                    .cloned()
            })
    }
}

#[async_trait]
impl DefinitionSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn get_manifest_info(&self) -> ManifestResult<ManifestInfo> {
        self.calls.manifest_info.fetch_add(1, Ordering::SeqCst);
        if self.fail_manifest_info {
            return Err(ManifestError::Api("manifest unavailable".to_string()));
        }
        Ok(ManifestInfo {
            version: self.version.clone(),
            content_paths_by_language: self.languages.clone(),
        })
    }

    async fn download_content(&self, path: &str) -> ManifestResult<ManifestSnapshot> {
        self.calls.download.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.download_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_download {
            return Err(ManifestError::Api(format!("download of {path} failed")));
        }
        Ok(self.snapshot.clone())
    }

    async fn get_entity(
        &self,
        entity_type: &str,
        hash: DestinyHash,
    ) -> ManifestResult<RawDefinition> {
        self.calls.entity.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.entity_delay {
            tokio::time::sleep(delay).await;
        }
        self.remote
            .get(&(entity_type.to_string(), hash))
            .cloned()
            .ok_or_else(|| ManifestError::NotFound {
                entity_type: entity_type.to_string(),
                hash,
            })
    }

    async fn get_batch(
        &self,
        entity_type: &str,
        hashes: &[DestinyHash],
    ) -> ManifestResult<BatchResponse> {
        self.calls.batch.fetch_add(1, Ordering::SeqCst);
        if self.fail_batch {
            return Err(ManifestError::Api("batch endpoint down".to_string()));
        }

        let mut response = BatchResponse::default();
        for &hash in hashes {
            match self.lookup(entity_type, hash) {
                Some(definition) => {
                    response.results.insert(hash, definition);
                }
                None => response.errors.push(BatchItemError {
                    hash,
                    error: "not found".to_string(),
                }),
            }
        }
        Ok(response)
    }

    async fn search(
        &self,
        _entity_type: &str,
        _term: &str,
        limit: usize,
    ) -> ManifestResult<Vec<RawDefinition>> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        match &self.search_results {
            Some(results) => Ok(results.iter().take(limit).cloned().collect()),
            None => Err(ManifestError::Api("search unavailable".to_string())),
        }
    }
}

/// Builds a processor over `source`, keeping a handle to the source.
pub fn processor(source: FakeSource) -> (Arc<FakeSource>, ManifestProcessor) {
    let source = Arc::new(source);
    let processor = ManifestProcessor::new(source.clone(), ProcessorConfig::default());
    (source, processor)
}

/// The stat/item pair: "Attack" stat and an item whose stat block references it.
pub fn attack_snapshot() -> FakeSource {
    FakeSource::new()
        .with_snapshot(STAT, ATTACK_HASH, named(ATTACK_HASH, "Attack"))
        .with_snapshot(
            ITEM,
            ITEM_HASH,
            raw(json!({
                "hash": ITEM_HASH,
                "displayProperties": {"name": "Jade Rabbit", "icon": "/common/jade.jpg", "hasIcon": true},
                "itemType": 1,
                "stats": {"stats": {
                    "1480404414": {"statHash": ATTACK_HASH, "value": 42, "maximum": 100}
                }}
            })),
        )
}
