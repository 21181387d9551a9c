//! Shared fixtures: a snapshot-backed source and a small weapon/armor manifest.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use warmind_analyzer::ItemAnalyzer;
use warmind_manifest::{
    DefinitionSource, ManifestError, ManifestProcessor, ManifestResult, ProcessorConfig,
};
use warmind_types::{BatchResponse, DestinyHash, ManifestInfo, ManifestSnapshot, RawDefinition};

pub const ITEM: &str = "DestinyInventoryItemDefinition";
pub const STAT: &str = "DestinyStatDefinition";
pub const CATEGORY: &str = "DestinyItemCategoryDefinition";
pub const SOCKET_CATEGORY: &str = "DestinySocketCategoryDefinition";
pub const SOCKET_TYPE: &str = "DestinySocketTypeDefinition";
pub const SANDBOX_PERK: &str = "DestinySandboxPerkDefinition";

pub const WEAPON: u32 = 3_211_806_999;
pub const ARMOR: u32 = 2_000_000_001;
pub const IMPACT: u32 = 4_043_523_819;
pub const RANGE: u32 = 1_240_592_695;
pub const STABILITY: u32 = 155_624_089;
pub const PERKS_CATEGORY: u32 = 4_241_085_061;
pub const INTRINSIC_FRAME: u32 = 3_468_089_894;
pub const TRAIT_A: u32 = 2_387_244_414;
pub const TRAIT_B: u32 = 1_015_611_457;
pub const SHADER: u32 = 4_248_210_736;
pub const SOCKET_TYPE_HASH: u32 = 3_956_125_808;
pub const WEAPON_CATEGORY: u32 = 1;
pub const AUTO_RIFLE_CATEGORY: u32 = 5;
pub const SANDBOX_PERK_HASH: u32 = 1_820_235_745;

pub fn raw(value: Value) -> RawDefinition {
    value.as_object().cloned().expect("definition must be a JSON object")
}

/// Source that serves a fixed snapshot and single fetches from it.
#[derive(Default)]
pub struct SnapshotSource {
    pub snapshot: ManifestSnapshot,
    pub fail_download: bool,
}

impl SnapshotSource {
    pub fn insert(&mut self, entity_type: &str, hash: u32, definition: Value) {
        self.snapshot
            .entry(entity_type.to_string())
            .or_default()
            .insert(hash.to_string(), raw(definition));
    }
}

#[async_trait]
impl DefinitionSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn get_manifest_info(&self) -> ManifestResult<ManifestInfo> {
        let mut paths = BTreeMap::new();
        paths.insert("en".to_string(), "/content/en.json".to_string());
        Ok(ManifestInfo {
            version: "240601.2".to_string(),
            content_paths_by_language: paths,
        })
    }

    async fn download_content(&self, _path: &str) -> ManifestResult<ManifestSnapshot> {
        if self.fail_download {
            return Err(ManifestError::Api("content unavailable".to_string()));
        }
        Ok(self.snapshot.clone())
    }

    async fn get_entity(
        &self,
        entity_type: &str,
        hash: DestinyHash,
    ) -> ManifestResult<RawDefinition> {
        Err(ManifestError::NotFound {
            entity_type: entity_type.to_string(),
            hash,
        })
    }

    async fn get_batch(
        &self,
        _entity_type: &str,
        _hashes: &[DestinyHash],
    ) -> ManifestResult<BatchResponse> {
        Ok(BatchResponse::default())
    }
}

fn named(hash: u32, name: &str) -> Value {
    json!({"hash": hash, "displayProperties": {"name": name, "description": format!("{name} description")}})
}

fn plug(hash: u32, name: &str, category: &str, type_name: &str, tier: i64) -> Value {
    json!({
        "hash": hash,
        "displayProperties": {"name": name, "description": format!("{name} description"), "icon": format!("/icons/{hash}.png")},
        "itemTypeDisplayName": type_name,
        "inventory": {"tierType": tier},
        "plug": {"plugCategoryIdentifier": category, "energyCost": {"energyCost": 1, "energyType": 1}}
    })
}

/// A legendary auto rifle, an armor piece and every definition they reference.
pub fn fixture() -> SnapshotSource {
    let mut source = SnapshotSource::default();

    source.insert(STAT, IMPACT, named(IMPACT, "Impact"));
    source.insert(STAT, RANGE, named(RANGE, "Range"));
    source.insert(STAT, STABILITY, named(STABILITY, "Stability"));

    source.insert(
        CATEGORY,
        WEAPON_CATEGORY,
        json!({"hash": 1, "displayProperties": {"name": "Weapon"}, "shortTitle": "Weapon", "visible": true}),
    );
    source.insert(
        CATEGORY,
        AUTO_RIFLE_CATEGORY,
        json!({"hash": 5, "displayProperties": {"name": "Auto Rifle"}, "shortTitle": "AR", "visible": false}),
    );

    source.insert(SOCKET_CATEGORY, PERKS_CATEGORY, named(PERKS_CATEGORY, "WEAPON PERKS"));
    source.insert(SOCKET_TYPE, SOCKET_TYPE_HASH, json!({"hash": SOCKET_TYPE_HASH}));
    source.insert(SANDBOX_PERK, SANDBOX_PERK_HASH, named(SANDBOX_PERK_HASH, "Rampage"));

    source.insert(
        ITEM,
        INTRINSIC_FRAME,
        plug(INTRINSIC_FRAME, "Adaptive Frame", "intrinsics", "Intrinsic", 2),
    );
    source.insert(ITEM, TRAIT_A, plug(TRAIT_A, "Outlaw", "frames", "Trait", 3));
    source.insert(ITEM, TRAIT_B, plug(TRAIT_B, "Kill Clip", "frames", "Trait", 3));
    source.insert(ITEM, SHADER, plug(SHADER, "Default Shader", "shader", "Shader", 2));

    source.insert(
        ITEM,
        WEAPON,
        json!({
            "hash": WEAPON,
            "displayProperties": {"name": "Gnawing Hunger", "description": "Auto rifle", "icon": "/icons/gh.jpg"},
            "itemType": 1,
            "itemTypeDisplayName": "Auto Rifle",
            "defaultDamageType": 4,
            "inventory": {"tierType": 5},
            "classType": 3,
            "equippingBlock": {"ammoType": 1, "minimumLevel": 20},
            "itemCategoryHashes": [WEAPON_CATEGORY, AUTO_RIFLE_CATEGORY, 999],
            "stats": {"stats": {
                "4043523819": {"statHash": IMPACT, "value": 29, "maximum": 100},
                "1240592695": {"statHash": RANGE, "value": 44, "maximum": 100}
            }},
            "investmentStats": [{"statTypeHash": IMPACT, "value": 29}],
            "sockets": {
                "socketEntries": [
                    {"socketTypeHash": SOCKET_TYPE_HASH, "singleInitialItemHash": INTRINSIC_FRAME},
                    {"socketTypeHash": SOCKET_TYPE_HASH, "singleInitialItemHash": TRAIT_A},
                    {"socketTypeHash": SOCKET_TYPE_HASH, "singleInitialItemHash": SHADER}
                ],
                "socketCategories": [
                    {"socketCategoryHash": PERKS_CATEGORY, "socketIndexes": [0, 1, 2, 7]}
                ]
            },
            "collectibleHash": 1_234_567,
            "loreHash": 0,
            "summaryItemHash": 3_520_001_075u32
        }),
    );

    source.insert(
        ITEM,
        ARMOR,
        json!({
            "hash": ARMOR,
            "displayProperties": {"name": "Ophidia Spathe"},
            "itemType": 2,
            "inventory": {"tierType": 6},
            "classType": 0
        }),
    );

    source
}

pub fn analyzer(source: SnapshotSource) -> ItemAnalyzer {
    let processor = ManifestProcessor::new(Arc::new(source), ProcessorConfig::default());
    ItemAnalyzer::new(Arc::new(processor))
}
