//! Manifest definition cache and hash resolution for Warmind.
//!
//! The game service returns records that point at each other only by
//! 32-bit hash. This crate downloads a versioned snapshot of every
//! definition, indexes it by `(entity type, canonical hash)`, and resolves
//! hash references into nested [`ProcessedDefinition`]s.
//!
//! # Components
//!
//! - **Cache**: concurrent map keyed by canonical hash
//! - **Loader**: [`ManifestProcessor::initialize`] fetches metadata and the
//!   per-language snapshot and bulk-populates the cache
//! - **Resolver**: [`ManifestProcessor::get_definition`], cache first, then a
//!   single fetch from the source
//! - **Batch**: [`ManifestProcessor::batch_get_definitions`]
//! - **Search**: [`ManifestProcessor::search_definitions`], remote first,
//!   local scan as fallback
//!
//! All network access goes through a [`DefinitionSource`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warmind_manifest::{BungieConfig, BungieSource, ManifestProcessor, ProcessorConfig};
//!
//! # async fn run() -> warmind_manifest::ManifestResult<()> {
//! let source = BungieSource::new(BungieConfig {
//!     api_key: "my-key".to_string(),
//!     ..Default::default()
//! })?;
//! let processor = ManifestProcessor::new(Arc::new(source), ProcessorConfig::default());
//!
//! processor.initialize().await?;
//! let stat = processor
//!     .get_definition("DestinyStatDefinition", 1480404414_u32)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ProcessedDefinition`]: warmind_types::ProcessedDefinition

mod batch;
mod cache;
mod config;
pub mod display;
mod error;
mod processor;
mod search;
pub mod source;

pub use batch::BatchResult;
pub use cache::{CacheKey, DefinitionCache};
pub use config::ProcessorConfig;
pub use error::{ManifestError, ManifestResult};
pub use processor::ManifestProcessor;
pub use source::{BungieConfig, BungieSource, DefinitionSource, MAX_BATCH_SIZE};
