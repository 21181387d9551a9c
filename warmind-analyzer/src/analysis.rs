//! Item analysis output.
//!
//! Every section is plain data so callers can serialize it directly.

use serde::Serialize;
use warmind_types::DestinyHash;

/// Result of analyzing one item instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemAnalysis {
    /// Every section was computed.
    Full(Box<FullAnalysis>),
    /// Section resolution failed; only the basic section is available.
    Fallback {
        error: String,
        #[serde(rename = "itemHash")]
        item_hash: DestinyHash,
        basic: BasicInfo,
    },
}

impl ItemAnalysis {
    /// Basic section, present in both forms.
    pub fn basic(&self) -> &BasicInfo {
        match self {
            ItemAnalysis::Full(full) => &full.basic,
            ItemAnalysis::Fallback { basic, .. } => basic,
        }
    }

    pub fn full(&self) -> Option<&FullAnalysis> {
        match self {
            ItemAnalysis::Full(full) => Some(full),
            ItemAnalysis::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ItemAnalysis::Fallback { .. })
    }

    /// Error message of a fallback analysis.
    pub fn error(&self) -> Option<&str> {
        match self {
            ItemAnalysis::Full(_) => None,
            ItemAnalysis::Fallback { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullAnalysis {
    pub basic: BasicInfo,
    pub sockets: Vec<SocketCategoryAnalysis>,
    pub stats: Vec<StatAnalysis>,
    pub perks: Vec<PerkAnalysis>,
    pub categories: Vec<CategoryAnalysis>,
    pub requirements: Requirements,
    pub quality: Quality,
    pub metadata: Metadata,
}

/// Identity and headline properties of the item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub hash: DestinyHash,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub item_type: String,
    pub item_type_display_name: String,
    pub damage_type: String,
    pub tier: String,
    pub is_equipped: bool,
    pub is_locked: bool,
    /// Energy used, as reported by the instance.
    pub masterwork_level: i64,
    pub primary_stat: Option<i64>,
    pub item_instance_id: Option<String>,
}

/// One socket category of the definition and its sockets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketCategoryAnalysis {
    pub hash: DestinyHash,
    pub name: String,
    pub description: String,
    pub sockets: Vec<SocketAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketAnalysis {
    /// Position in the definition's socket entries.
    pub index: usize,
    pub socket_type_hash: Option<DestinyHash>,
    /// Whether the socket type definition was found.
    pub socket_type_resolved: bool,
    pub plug: Option<PlugAnalysis>,
    pub is_enabled: bool,
    pub is_visible: bool,
}

/// The plug item inserted in a socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugAnalysis {
    pub hash: DestinyHash,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub item_type_display_name: String,
    pub plug_category: Option<String>,
    pub tier: String,
    pub energy_cost: Option<i64>,
    pub energy_type: Option<String>,
}

/// Where a stat value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatSource {
    Instance,
    Definition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatAnalysis {
    pub hash: DestinyHash,
    pub name: String,
    pub description: String,
    pub value: i64,
    /// Maximum declared by the definition, when it declares the stat.
    pub maximum: Option<i64>,
    pub source: StatSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PerkSource {
    /// A perk or trait plug in one of the item's sockets.
    Plug,
    /// A sandbox perk reported on the instance.
    Instance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkAnalysis {
    pub hash: DestinyHash,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub is_intrinsic: bool,
    pub is_active: bool,
    pub source: PerkSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysis {
    pub hash: DestinyHash,
    pub name: String,
    pub description: String,
    pub short_title: String,
    pub visible: bool,
}

/// Equip requirements read straight from the definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    pub minimum_level: i64,
    pub class_type: i64,
    pub class_name: String,
    pub class_restricted: bool,
    pub ammo_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    pub masterworked: bool,
    pub energy_capacity: i64,
    pub energy_used: i64,
    pub energy_type: String,
    pub investment_stats: Vec<InvestmentStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentStat {
    pub hash: DestinyHash,
    pub name: String,
    pub value: i64,
}

/// Reference hashes passed through for downstream use; not resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub collectible_hash: Option<DestinyHash>,
    pub lore_hash: Option<DestinyHash>,
    pub summary_item_hash: Option<DestinyHash>,
    pub manifest_version: Option<String>,
}
