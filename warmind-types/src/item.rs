//! Live item instances as reported by the game service.
//!
//! Only the fields the analyzer reads are modeled; unknown fields are ignored.

use crate::DestinyHash;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

bitflags! {
    /// Transient state bits carried on an item instance.
    ///
    /// Serialized as the raw integer the service sends; unknown bits are kept.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(from = "u32", into = "u32")]
    pub struct ItemState: u32 {
        const EQUIPPED = 4;
        const LOCKED = 8;
    }
}

impl From<u32> for ItemState {
    fn from(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

impl From<ItemState> for u32 {
    fn from(state: ItemState) -> Self {
        state.bits()
    }
}

/// A stat value reported for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStat {
    pub stat_hash: DestinyHash,
    pub value: i64,
}

/// Energy block of an armor or weapon instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemEnergy {
    pub energy_type_hash: Option<DestinyHash>,
    pub energy_type: i64,
    pub energy_capacity: i64,
    pub energy_used: i64,
    pub energy_unused: i64,
}

/// The plug currently inserted into one socket of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSocketState {
    pub plug_hash: Option<DestinyHash>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

/// A sandbox perk active on an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPerkState {
    pub perk_hash: DestinyHash,
    pub icon_path: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

/// An item instance supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemInstance {
    pub item_hash: DestinyHash,
    pub item_instance_id: Option<String>,
    /// Socket states, indexed like the definition's socket entries.
    pub sockets: Vec<ItemSocketState>,
    pub stats: BTreeMap<DestinyHash, InstanceStat>,
    pub perks: Vec<ItemPerkState>,
    pub primary_stat: Option<InstanceStat>,
    pub energy: Option<ItemEnergy>,
    pub state: ItemState,
}

impl ItemInstance {
    /// Creates a bare instance of the given item.
    pub fn new(item_hash: impl Into<DestinyHash>) -> Self {
        Self {
            item_hash: item_hash.into(),
            ..Default::default()
        }
    }

    /// Whether the equipped state bit is set.
    pub fn is_equipped(&self) -> bool {
        self.state.contains(ItemState::EQUIPPED)
    }

    /// Whether the locked state bit is set.
    pub fn is_locked(&self) -> bool {
        self.state.contains(ItemState::LOCKED)
    }
}
