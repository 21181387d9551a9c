//! Manifest definitions, raw and processed.
//!
//! A raw definition is the JSON object the game service delivers for one
//! record. It references other records only by hash. Processing attaches
//! normalized display properties and the eagerly resolved children named
//! in [`ResolvedHashes`].

use crate::DestinyHash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Placeholder name for definitions that carry no display name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// An entity-type-specific record exactly as the source returned it.
pub type RawDefinition = serde_json::Map<String, Value>;

/// Normalized display block of a processed definition.
///
/// Image fields are absolute URLs, or `None` when the raw record had no path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProperties {
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub has_icon: bool,
    pub icon_watermark: Option<String>,
    pub icon_watermark_shelved: Option<String>,
    pub screenshot: Option<String>,
}

impl Default for DisplayProperties {
    fn default() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            description: String::new(),
            icon: None,
            has_icon: false,
            icon_watermark: None,
            icon_watermark_shelved: None,
            screenshot: None,
        }
    }
}

/// One entry of a definition's stat block, with its stat definition attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStat {
    pub definition: Option<Arc<ProcessedDefinition>>,
    pub value: i64,
    pub maximum: i64,
}

/// Child definitions resolved while processing a parent.
///
/// Every entry is a processed definition or absent; raw hashes never appear here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedHashes {
    pub default_damage_type: Option<Arc<ProcessedDefinition>>,
    pub item_categories: Vec<Arc<ProcessedDefinition>>,
    pub stats: BTreeMap<DestinyHash, ResolvedStat>,
}

impl ResolvedHashes {
    /// Returns true when nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.default_damage_type.is_none()
            && self.item_categories.is_empty()
            && self.stats.is_empty()
    }
}

/// A raw definition augmented with display properties and resolved children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDefinition {
    /// Entity type name, e.g. `DestinyInventoryItemDefinition`.
    pub entity_type: String,
    /// Canonical hash of this record.
    pub hash: DestinyHash,
    pub display_properties: DisplayProperties,
    pub resolved_hashes: ResolvedHashes,
    /// The untouched source record.
    pub raw: RawDefinition,
}

impl ProcessedDefinition {
    /// Display name, `"Unknown"` when the record had none.
    pub fn name(&self) -> &str {
        &self.display_properties.name
    }

    /// Looks up a value by JSON pointer into the raw record (`/inventory/tierType`).
    pub fn at(&self, pointer: &str) -> Option<&Value> {
        value_at(&self.raw, pointer)
    }

    /// Integer at `pointer`, if present and integral.
    pub fn int_at(&self, pointer: &str) -> Option<i64> {
        self.at(pointer).and_then(Value::as_i64)
    }

    /// String at `pointer`.
    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        self.at(pointer).and_then(Value::as_str)
    }

    /// Boolean at `pointer`.
    pub fn bool_at(&self, pointer: &str) -> Option<bool> {
        self.at(pointer).and_then(Value::as_bool)
    }

    /// Hash at `pointer`, accepting any encoding the service emits.
    pub fn hash_at(&self, pointer: &str) -> Option<DestinyHash> {
        self.at(pointer).and_then(hash_from_value)
    }

    /// Every hash in the array at `pointer`; malformed entries are skipped.
    pub fn hashes_at(&self, pointer: &str) -> Vec<DestinyHash> {
        hashes_at(&self.raw, pointer)
    }
}

/// Looks up a value by JSON pointer inside a raw definition.
pub fn value_at<'a>(raw: &'a RawDefinition, pointer: &str) -> Option<&'a Value> {
    let path = pointer.strip_prefix('/').unwrap_or(pointer);
    match path.split_once('/') {
        Some((head, rest)) => raw.get(head)?.pointer(&format!("/{rest}")),
        None => raw.get(path),
    }
}

/// Hash at `pointer` inside a raw definition.
pub fn hash_at(raw: &RawDefinition, pointer: &str) -> Option<DestinyHash> {
    value_at(raw, pointer).and_then(hash_from_value)
}

/// Every hash in the array at `pointer` inside a raw definition.
pub fn hashes_at(raw: &RawDefinition, pointer: &str) -> Vec<DestinyHash> {
    value_at(raw, pointer)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(hash_from_value).collect())
        .unwrap_or_default()
}

/// Converts a JSON number or decimal string into a hash.
pub fn hash_from_value(value: &Value) -> Option<DestinyHash> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(DestinyHash::from)
            .or_else(|| n.as_u64().map(DestinyHash::from)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
