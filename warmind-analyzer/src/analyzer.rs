//! Composes resolved definitions into an [`ItemAnalysis`].

use crate::analysis::{
    BasicInfo, CategoryAnalysis, FullAnalysis, InvestmentStat, ItemAnalysis, Metadata,
    PerkAnalysis, PerkSource, PlugAnalysis, Quality, Requirements, SocketAnalysis,
    SocketCategoryAnalysis, StatAnalysis, StatSource,
};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::labels;
use futures::future::try_join_all;
use futures::try_join;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};
use warmind_manifest::{ManifestProcessor, display};
use warmind_types::{
    DestinyHash, ItemInstance, ProcessedDefinition, UNKNOWN_NAME, entity, hash_from_value,
};

/// Builds item analyses from a shared manifest processor.
pub struct ItemAnalyzer {
    manifest: Arc<ManifestProcessor>,
}

impl ItemAnalyzer {
    pub fn new(manifest: Arc<ManifestProcessor>) -> Self {
        Self { manifest }
    }

    pub fn manifest(&self) -> &Arc<ManifestProcessor> {
        &self.manifest
    }

    /// Analyzes one item instance.
    ///
    /// `definition` skips the item lookup when the caller already holds it.
    /// Without it the item definition must resolve, otherwise this returns
    /// [`AnalyzerError::DefinitionNotFound`]. Once the definition is known,
    /// failures while resolving sections produce [`ItemAnalysis::Fallback`].
    pub async fn analyze_item(
        &self,
        item: &ItemInstance,
        definition: Option<Arc<ProcessedDefinition>>,
    ) -> AnalyzerResult<ItemAnalysis> {
        let definition = match definition {
            Some(definition) => definition,
            None => self
                .lookup(entity::INVENTORY_ITEM, item.item_hash)
                .await?
                .ok_or(AnalyzerError::DefinitionNotFound(item.item_hash))?,
        };

        debug!("Analyzing {} ({})", definition.name(), item.item_hash);
        let basic = basic_info(item, &definition);

        match self.analyze_sections(item, &definition, basic.clone()).await {
            Ok(full) => Ok(ItemAnalysis::Full(Box::new(full))),
            Err(e) => {
                warn!("Analysis of {} reduced to basic info: {}", item.item_hash, e);
                Ok(ItemAnalysis::Fallback {
                    error: e.to_string(),
                    item_hash: item.item_hash,
                    basic,
                })
            }
        }
    }

    async fn analyze_sections(
        &self,
        item: &ItemInstance,
        definition: &ProcessedDefinition,
        basic: BasicInfo,
    ) -> AnalyzerResult<FullAnalysis> {
        let (sockets, stats, categories, quality, instance_perks) = try_join!(
            self.sockets(item, definition),
            self.stats(item, definition),
            self.categories(definition),
            self.quality(item, definition),
            self.instance_perks(item)
        )?;

        let mut perks = plug_perks(&sockets);
        perks.extend(instance_perks);

        Ok(FullAnalysis {
            basic,
            sockets,
            stats,
            perks,
            categories,
            requirements: requirements(definition),
            quality,
            metadata: Metadata {
                collectible_hash: nonzero_hash(definition, "/collectibleHash"),
                lore_hash: nonzero_hash(definition, "/loreHash"),
                summary_item_hash: nonzero_hash(definition, "/summaryItemHash"),
                manifest_version: self.manifest.version().await,
            },
        })
    }

    async fn lookup(
        &self,
        entity_type: &str,
        hash: DestinyHash,
    ) -> AnalyzerResult<Option<Arc<ProcessedDefinition>>> {
        Ok(self.manifest.get_definition(entity_type, hash).await?)
    }

    // ── Sockets ──────────────────────────────────────────────────

    async fn sockets(
        &self,
        item: &ItemInstance,
        definition: &ProcessedDefinition,
    ) -> AnalyzerResult<Vec<SocketCategoryAnalysis>> {
        let entries = array_at(definition, "/sockets/socketEntries");
        let categories = array_at(definition, "/sockets/socketCategories");

        try_join_all(categories.iter().filter_map(|category| {
            let hash = category.get("socketCategoryHash").and_then(hash_from_value)?;
            let indexes = category
                .get("socketIndexes")
                .and_then(Value::as_array)
                .map(|indexes| {
                    indexes
                        .iter()
                        .filter_map(Value::as_u64)
                        .filter_map(|i| usize::try_from(i).ok())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            Some(self.socket_category(item, entries, hash, indexes))
        }))
        .await
    }

    async fn socket_category(
        &self,
        item: &ItemInstance,
        entries: &[Value],
        hash: DestinyHash,
        indexes: Vec<usize>,
    ) -> AnalyzerResult<SocketCategoryAnalysis> {
        let category = self.lookup(entity::SOCKET_CATEGORY, hash);
        // indexes without a socket entry are skipped
        let sockets = try_join_all(indexes.into_iter().filter_map(|index| {
            let entry = entries.get(index)?;
            Some(self.socket(item, index, entry))
        }));

        let (category, sockets) = try_join!(category, sockets)?;
        let (name, description) = names(category.as_deref());

        Ok(SocketCategoryAnalysis {
            hash,
            name,
            description,
            sockets,
        })
    }

    async fn socket(
        &self,
        item: &ItemInstance,
        index: usize,
        entry: &Value,
    ) -> AnalyzerResult<SocketAnalysis> {
        let state = item.sockets.get(index);
        let plug_hash = state
            .and_then(|s| s.plug_hash)
            .or_else(|| entry.get("singleInitialItemHash").and_then(hash_from_value))
            .filter(|h| h.as_u32() != 0);
        let socket_type_hash = entry
            .get("socketTypeHash")
            .and_then(hash_from_value)
            .filter(|h| h.as_u32() != 0);

        let plug = async {
            match plug_hash {
                Some(hash) => self.lookup(entity::INVENTORY_ITEM, hash).await,
                None => Ok(None),
            }
        };
        let socket_type = async {
            match socket_type_hash {
                Some(hash) => self.lookup(entity::SOCKET_TYPE, hash).await,
                None => Ok(None),
            }
        };
        let (plug, socket_type) = try_join!(plug, socket_type)?;

        Ok(SocketAnalysis {
            index,
            socket_type_hash,
            socket_type_resolved: socket_type.is_some(),
            plug: plug.as_deref().map(plug_analysis),
            is_enabled: state.is_none_or(|s| s.is_enabled),
            is_visible: state.is_none_or(|s| s.is_visible),
        })
    }

    // ── Stats ────────────────────────────────────────────────────

    /// Instance values win over definition values for the same stat hash.
    async fn stats(
        &self,
        item: &ItemInstance,
        definition: &ProcessedDefinition,
    ) -> AnalyzerResult<Vec<StatAnalysis>> {
        let declared = &definition.resolved_hashes.stats;
        let mut hashes: BTreeSet<DestinyHash> = declared.keys().copied().collect();
        hashes.extend(item.stats.keys().copied());

        try_join_all(hashes.into_iter().map(|hash| async move {
            let declared = declared.get(&hash);
            let stat_definition = match declared.and_then(|s| s.definition.clone()) {
                Some(definition) => Some(definition),
                None => self.lookup(entity::STAT, hash).await?,
            };

            let (value, source) = match item.stats.get(&hash) {
                Some(instance) => (instance.value, StatSource::Instance),
                None => (declared.map_or(0, |s| s.value), StatSource::Definition),
            };
            let (name, description) = names(stat_definition.as_deref());

            Ok::<_, AnalyzerError>(StatAnalysis {
                hash,
                name,
                description,
                value,
                maximum: declared.map(|s| s.maximum),
                source,
            })
        }))
        .await
    }

    // ── Perks and categories ─────────────────────────────────────

    async fn instance_perks(&self, item: &ItemInstance) -> AnalyzerResult<Vec<PerkAnalysis>> {
        let host = &self.manifest.config().content_host;

        try_join_all(item.perks.iter().filter(|perk| perk.visible).map(|perk| async move {
            let definition = self.lookup(entity::SANDBOX_PERK, perk.perk_hash).await?;
            let icon = definition
                .as_ref()
                .and_then(|d| d.display_properties.icon.clone())
                .or_else(|| display::absolute_url(host, perk.icon_path.as_deref()));
            let (name, description) = names(definition.as_deref());

            Ok::<_, AnalyzerError>(PerkAnalysis {
                hash: perk.perk_hash,
                name,
                description,
                icon,
                is_intrinsic: false,
                is_active: perk.is_active,
                source: PerkSource::Instance,
            })
        }))
        .await
    }

    async fn categories(
        &self,
        definition: &ProcessedDefinition,
    ) -> AnalyzerResult<Vec<CategoryAnalysis>> {
        let found = try_join_all(
            definition
                .hashes_at("/itemCategoryHashes")
                .into_iter()
                .map(|hash| self.lookup(entity::ITEM_CATEGORY, hash)),
        )
        .await?;

        Ok(found
            .into_iter()
            .flatten()
            .map(|category| CategoryAnalysis {
                hash: category.hash,
                name: category.display_properties.name.clone(),
                description: category.display_properties.description.clone(),
                short_title: category.str_at("/shortTitle").unwrap_or_default().to_string(),
                visible: category.bool_at("/visible").unwrap_or(true),
            })
            .collect())
    }

    // ── Quality ──────────────────────────────────────────────────

    async fn quality(
        &self,
        item: &ItemInstance,
        definition: &ProcessedDefinition,
    ) -> AnalyzerResult<Quality> {
        let entries: Vec<(DestinyHash, i64)> = array_at(definition, "/investmentStats")
            .iter()
            .filter_map(|stat| {
                let hash = stat.get("statTypeHash").and_then(hash_from_value)?;
                let value = stat.get("value").and_then(Value::as_i64).unwrap_or(0);
                Some((hash, value))
            })
            .collect();

        let investment_stats = try_join_all(entries.into_iter().map(|(hash, value)| async move {
            let stat = self.lookup(entity::STAT, hash).await?;
            Ok::<_, AnalyzerError>(InvestmentStat {
                hash,
                name: stat.map_or_else(|| UNKNOWN_NAME.to_string(), |s| s.name().to_string()),
                value,
            })
        }))
        .await?;

        let energy = item.energy.unwrap_or_default();
        Ok(Quality {
            masterworked: labels::is_masterworked(energy.energy_capacity),
            energy_capacity: energy.energy_capacity,
            energy_used: energy.energy_used,
            energy_type: item
                .energy
                .map_or("None", |e| labels::energy_type(e.energy_type))
                .to_string(),
            investment_stats,
        })
    }
}

fn basic_info(item: &ItemInstance, definition: &ProcessedDefinition) -> BasicInfo {
    let props = &definition.display_properties;
    BasicInfo {
        hash: definition.hash,
        name: props.name.clone(),
        description: props.description.clone(),
        icon: props.icon.clone(),
        item_type: labels::item_type(definition.int_at("/itemType").unwrap_or(0)).to_string(),
        item_type_display_name: definition
            .str_at("/itemTypeDisplayName")
            .unwrap_or_default()
            .to_string(),
        damage_type: labels::damage_type(definition.int_at("/defaultDamageType").unwrap_or(0))
            .to_string(),
        tier: labels::tier(definition.int_at("/inventory/tierType").unwrap_or(0)).to_string(),
        is_equipped: item.is_equipped(),
        is_locked: item.is_locked(),
        masterwork_level: item.energy.map_or(0, |e| e.energy_used),
        primary_stat: item.primary_stat.map(|s| s.value),
        item_instance_id: item.item_instance_id.clone(),
    }
}

fn plug_analysis(plug: &ProcessedDefinition) -> PlugAnalysis {
    PlugAnalysis {
        hash: plug.hash,
        name: plug.display_properties.name.clone(),
        description: plug.display_properties.description.clone(),
        icon: plug.display_properties.icon.clone(),
        item_type_display_name: plug
            .str_at("/itemTypeDisplayName")
            .unwrap_or_default()
            .to_string(),
        plug_category: plug.str_at("/plug/plugCategoryIdentifier").map(String::from),
        tier: labels::tier(plug.int_at("/inventory/tierType").unwrap_or(0)).to_string(),
        energy_cost: plug.int_at("/plug/energyCost/energyCost"),
        energy_type: plug
            .int_at("/plug/energyCost/energyType")
            .map(|t| labels::energy_type(t).to_string()),
    }
}

/// Perk and trait plugs across every socket category.
fn plug_perks(sockets: &[SocketCategoryAnalysis]) -> Vec<PerkAnalysis> {
    let intrinsic_tier = labels::tier(labels::COMMON_TIER);

    sockets
        .iter()
        .flat_map(|category| &category.sockets)
        .filter_map(|socket| socket.plug.as_ref().map(|plug| (socket, plug)))
        .filter(|(_, plug)| {
            labels::is_perk_plug(plug.plug_category.as_deref(), &plug.item_type_display_name)
        })
        .map(|(socket, plug)| PerkAnalysis {
            hash: plug.hash,
            name: plug.name.clone(),
            description: plug.description.clone(),
            icon: plug.icon.clone(),
            is_intrinsic: plug.tier == intrinsic_tier,
            is_active: socket.is_enabled,
            source: PerkSource::Plug,
        })
        .collect()
}

fn requirements(definition: &ProcessedDefinition) -> Requirements {
    let class_type = definition.int_at("/classType").unwrap_or(labels::ANY_CLASS);
    Requirements {
        minimum_level: definition.int_at("/equippingBlock/minimumLevel").unwrap_or(0),
        class_type,
        class_name: labels::class_type(class_type).to_string(),
        class_restricted: class_type != labels::ANY_CLASS,
        ammo_type: labels::ammo_type(definition.int_at("/equippingBlock/ammoType").unwrap_or(0))
            .to_string(),
    }
}

fn names(definition: Option<&ProcessedDefinition>) -> (String, String) {
    match definition {
        Some(d) => (
            d.display_properties.name.clone(),
            d.display_properties.description.clone(),
        ),
        None => (UNKNOWN_NAME.to_string(), String::new()),
    }
}

fn array_at<'a>(definition: &'a ProcessedDefinition, pointer: &str) -> &'a [Value] {
    definition
        .at(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn nonzero_hash(definition: &ProcessedDefinition, pointer: &str) -> Option<DestinyHash> {
    definition.hash_at(pointer).filter(|h| h.as_u32() != 0)
}
