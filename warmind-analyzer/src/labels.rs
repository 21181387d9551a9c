//! Display labels for the numeric enums carried by item definitions.

/// Label for `itemType`.
pub fn item_type(value: i64) -> &'static str {
    match value {
        1 => "Weapon",
        2 => "Armor",
        3 => "Ghost",
        4 => "Vehicle",
        7 => "Emblem",
        8 => "Emote",
        9 => "Ship",
        10 => "Sparrow",
        11 => "ClanBanner",
        12 => "Aura",
        13 => "Mod",
        14 => "Consumable",
        15 => "ExchangeMaterial",
        16 => "MissionReward",
        17 => "Currency",
        _ => "Unknown",
    }
}

/// Label for `defaultDamageType`.
pub fn damage_type(value: i64) -> &'static str {
    match value {
        1 => "Kinetic",
        2 => "Arc",
        3 => "Solar",
        4 => "Void",
        5 => "Raid",
        6 => "Stasis",
        7 => "Strand",
        _ => "None",
    }
}

/// Label for `inventory.tierType`.
pub fn tier(value: i64) -> &'static str {
    match value {
        2 => "Common",
        3 => "Uncommon",
        4 => "Rare",
        5 => "Legendary",
        6 => "Exotic",
        _ => "Unknown",
    }
}

/// Tier value of common (intrinsic) plugs.
pub const COMMON_TIER: i64 = 2;

/// Label for `equippingBlock.ammoType`.
pub fn ammo_type(value: i64) -> &'static str {
    match value {
        1 => "Primary",
        2 => "Special",
        3 => "Heavy",
        _ => "None",
    }
}

/// Class type that any character may equip.
pub const ANY_CLASS: i64 = 3;

/// Label for `classType`.
pub fn class_type(value: i64) -> &'static str {
    match value {
        0 => "Titan",
        1 => "Hunter",
        2 => "Warlock",
        ANY_CLASS => "Any",
        _ => "Unknown",
    }
}

/// Label for an energy type, as found on instance energy and plug costs.
pub fn energy_type(value: i64) -> &'static str {
    match value {
        0 => "Any",
        1 => "Arc",
        2 => "Solar",
        3 => "Void",
        4 => "Ghost",
        5 => "Subclass",
        6 => "Stasis",
        _ => "Unknown",
    }
}

/// Energy capacity at which an item counts as masterworked.
pub const MASTERWORK_CAPACITY: i64 = 10;

/// Whether an energy capacity is a full masterwork.
pub fn is_masterworked(energy_capacity: i64) -> bool {
    energy_capacity >= MASTERWORK_CAPACITY
}

const PERK_MARKERS: [&str; 4] = ["trait", "perk", "frame", "intrinsic"];

/// Whether a plug's category identifier or type name marks it as a perk.
pub fn is_perk_plug(plug_category: Option<&str>, item_type_display_name: &str) -> bool {
    let mentions_perk = |text: &str| {
        let text = text.to_lowercase();
        PERK_MARKERS.iter().any(|marker| text.contains(marker))
    };
    plug_category.is_some_and(mentions_perk) || mentions_perk(item_type_display_name)
}
