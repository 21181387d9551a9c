//! Manifest metadata and definition-source payloads.

use crate::{DestinyHash, RawDefinition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Entity type names used by the resolver and analyzer.
pub mod entity {
    pub const INVENTORY_ITEM: &str = "DestinyInventoryItemDefinition";
    pub const STAT: &str = "DestinyStatDefinition";
    pub const DAMAGE_TYPE: &str = "DestinyDamageTypeDefinition";
    pub const ITEM_CATEGORY: &str = "DestinyItemCategoryDefinition";
    pub const SOCKET_CATEGORY: &str = "DestinySocketCategoryDefinition";
    pub const SOCKET_TYPE: &str = "DestinySocketTypeDefinition";
    pub const SANDBOX_PERK: &str = "DestinySandboxPerkDefinition";
}

/// Manifest metadata as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestInfo {
    pub version: String,
    /// Root-relative content path per language code.
    pub content_paths_by_language: BTreeMap<String, String>,
}

/// Full per-language snapshot: entity type → hash string → raw definition.
pub type ManifestSnapshot = HashMap<String, HashMap<String, RawDefinition>>;

/// Metadata of the snapshot a processor has loaded.
///
/// Fixed for the lifetime of one initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    pub version: String,
    pub language: String,
    pub content_paths_by_language: BTreeMap<String, String>,
    pub loaded_at: DateTime<Utc>,
    /// Number of definitions inserted by the bulk load.
    pub definition_count: usize,
}

/// Point-in-time view of a processor, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStatus {
    pub initialized: bool,
    pub version: Option<String>,
    pub language: Option<String>,
    pub cached_definitions: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// A per-hash failure inside a batch fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemError {
    pub hash: DestinyHash,
    pub error: String,
}

/// Response of a batch fetch: whatever resolved plus per-hash failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: HashMap<DestinyHash, RawDefinition>,
    #[serde(default)]
    pub errors: Vec<BatchItemError>,
}
