//! In-memory definition cache.
//!
//! Keys are `(entity type, canonical hash)`. Every hash argument goes through
//! [`DestinyHash`]'s conversions before the key is built, so a definition
//! stored under one encoding is found under the other.

use dashmap::DashMap;
use std::sync::Arc;
use warmind_types::{DestinyHash, ProcessedDefinition};

/// Composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity_type: String,
    pub hash: DestinyHash,
}

impl CacheKey {
    /// Builds a key from any hash encoding.
    pub fn new(entity_type: &str, hash: impl Into<DestinyHash>) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            hash: hash.into(),
        }
    }
}

/// Concurrent map of processed definitions.
///
/// Reads do not block each other or the bulk loader; writes lock only the
/// shard that holds the key.
#[derive(Debug, Default)]
pub struct DefinitionCache {
    entries: DashMap<CacheKey, Arc<ProcessedDefinition>>,
}

impl DefinitionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached definition, if any.
    pub fn get(
        &self,
        entity_type: &str,
        hash: impl Into<DestinyHash>,
    ) -> Option<Arc<ProcessedDefinition>> {
        self.entries
            .get(&CacheKey::new(entity_type, hash))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Stores a definition, replacing any previous entry for the key.
    pub fn insert(
        &self,
        entity_type: &str,
        hash: impl Into<DestinyHash>,
        definition: Arc<ProcessedDefinition>,
    ) {
        self.entries
            .insert(CacheKey::new(entity_type, hash), definition);
    }

    /// Returns true if the key is cached.
    pub fn contains(&self, entity_type: &str, hash: impl Into<DestinyHash>) -> bool {
        self.entries.contains_key(&CacheKey::new(entity_type, hash))
    }

    /// Removes and returns an entry.
    pub fn remove(
        &self,
        entity_type: &str,
        hash: impl Into<DestinyHash>,
    ) -> Option<Arc<ProcessedDefinition>> {
        self.entries
            .remove(&CacheKey::new(entity_type, hash))
            .map(|(_, definition)| definition)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Total number of cached definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cached definitions of one entity type.
    pub fn len_of_type(&self, entity_type: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().entity_type == entity_type)
            .count()
    }

    /// Visits cached definitions of one entity type until `visit` returns false.
    ///
    /// Iteration order is unspecified.
    pub fn scan<F>(&self, entity_type: &str, mut visit: F)
    where
        F: FnMut(&Arc<ProcessedDefinition>) -> bool,
    {
        for entry in self.entries.iter() {
            if entry.key().entity_type != entity_type {
                continue;
            }
            if !visit(entry.value()) {
                break;
            }
        }
    }
}
