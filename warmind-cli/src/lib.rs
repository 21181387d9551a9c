//! Argument parsing and command execution for the `warmind` binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warmind_analyzer::ItemAnalyzer;
use warmind_manifest::{
    BungieConfig, BungieSource, DefinitionSource, ManifestProcessor, ProcessorConfig,
};
use warmind_types::{DestinyHash, ItemInstance, ProcessedDefinition, entity};

#[derive(Parser, Debug)]
#[command(name = "warmind")]
#[command(about = "Resolve Destiny 2 manifest definitions and analyze items")]
pub struct Args {
    /// Bungie.net application API key
    #[arg(long, env = "BUNGIE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Manifest language to load
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Platform API base URL
    #[arg(long, default_value = "https://www.bungie.net/Platform")]
    pub api_base_url: String,

    /// Host that manifest content and images are served from
    #[arg(long, default_value = "https://www.bungie.net")]
    pub content_base_url: String,

    /// Manifest download timeout in seconds
    #[arg(long, default_value = "300")]
    pub download_timeout: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current manifest version and its languages
    Version,

    /// Look up definitions by hash
    Lookup {
        /// Entity type, full name or alias (item, stat, damage-type, ...)
        entity_type: String,

        /// Hashes to resolve, signed or unsigned
        #[arg(required = true, allow_negative_numbers = true)]
        hashes: Vec<DestinyHash>,
    },

    /// Search definitions by name or description
    Search {
        /// Entity type, full name or alias
        entity_type: String,

        /// Text to look for
        term: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "25")]
        limit: usize,
    },

    /// Analyze an item instance read from a JSON file
    Analyze {
        /// Path to the item instance JSON
        item: PathBuf,
    },
}

impl Args {
    pub fn bungie_config(&self) -> BungieConfig {
        BungieConfig {
            api_key: self.api_key.clone(),
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            content_base_url: self.content_base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            language: self.language.clone(),
            content_host: self.content_base_url.clone(),
            download_timeout_secs: self.download_timeout,
            ..Default::default()
        }
    }
}

/// Log filter from `RUST_LOG`-style directives, falling back to `info`
/// (or `debug` with `--verbose`) when none are given or they do not parse.
pub fn log_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// Expands a short alias to its entity type name; anything else passes through.
pub fn entity_type(name: &str) -> &str {
    match name.to_ascii_lowercase().as_str() {
        "item" => entity::INVENTORY_ITEM,
        "stat" => entity::STAT,
        "damage-type" => entity::DAMAGE_TYPE,
        "item-category" => entity::ITEM_CATEGORY,
        "socket-category" => entity::SOCKET_CATEGORY,
        "socket-type" => entity::SOCKET_TYPE,
        "sandbox-perk" => entity::SANDBOX_PERK,
        _ => name,
    }
}

#[derive(Serialize)]
struct VersionOutput {
    version: String,
    languages: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupOutput<'a> {
    definitions: Vec<&'a ProcessedDefinition>,
    missing: Vec<DestinyHash>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit<'a> {
    hash: DestinyHash,
    name: &'a str,
    description: &'a str,
    icon: Option<&'a str>,
}

/// Runs one command and returns its output as pretty-printed JSON.
pub async fn run(args: &Args) -> Result<String> {
    let source = Arc::new(
        BungieSource::new(args.bungie_config()).context("Failed to create Bungie.net client")?,
    );

    let output = match &args.command {
        Command::Version => {
            let info = source
                .get_manifest_info()
                .await
                .context("Failed to fetch manifest metadata")?;
            serde_json::to_value(VersionOutput {
                version: info.version,
                languages: info.content_paths_by_language.into_keys().collect(),
            })?
        }
        Command::Lookup {
            entity_type: name,
            hashes,
        } => {
            let processor = load(args, source).await?;
            lookup(&processor, entity_type(name), hashes).await?
        }
        Command::Search {
            entity_type: name,
            term,
            limit,
        } => {
            let processor = load(args, source).await?;
            search(&processor, entity_type(name), term, *limit).await?
        }
        Command::Analyze { item } => {
            let processor = load(args, source).await?;
            analyze(processor, item).await?
        }
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

async fn load(args: &Args, source: Arc<BungieSource>) -> Result<Arc<ManifestProcessor>> {
    let processor = ManifestProcessor::new(source, args.processor_config());
    processor
        .initialize()
        .await
        .context("Failed to load manifest")?;

    let status = processor.status().await;
    info!(
        "Manifest {} loaded: {} definitions",
        status.version.unwrap_or_default(),
        status.cached_definitions
    );
    Ok(Arc::new(processor))
}

async fn lookup(
    processor: &ManifestProcessor,
    entity_type: &str,
    hashes: &[DestinyHash],
) -> Result<Value> {
    let batch = processor
        .batch_get_definitions(entity_type, hashes.iter().copied())
        .await?;

    let missing = hashes
        .iter()
        .copied()
        .filter(|hash| batch.get(*hash).is_none())
        .collect();
    let output = LookupOutput {
        definitions: batch.definitions.values().map(|definition| &**definition).collect(),
        missing,
    };
    Ok(serde_json::to_value(output)?)
}

async fn search(
    processor: &ManifestProcessor,
    entity_type: &str,
    term: &str,
    limit: usize,
) -> Result<Value> {
    let results = processor
        .search_definitions(entity_type, term, limit)
        .await?;

    let hits: Vec<SearchHit<'_>> = results
        .iter()
        .map(|definition| SearchHit {
            hash: definition.hash,
            name: &definition.display_properties.name,
            description: &definition.display_properties.description,
            icon: definition.display_properties.icon.as_deref(),
        })
        .collect();
    Ok(serde_json::to_value(hits)?)
}

async fn analyze(processor: Arc<ManifestProcessor>, path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let item: ItemInstance =
        serde_json::from_str(&text).context("Item file is not a valid item instance")?;

    let analysis = ItemAnalyzer::new(processor).analyze_item(&item, None).await?;
    Ok(serde_json::to_value(analysis)?)
}
