//! Item analysis for Warmind.
//!
//! [`ItemAnalyzer`] takes a live item instance, resolves everything its
//! definition references through a shared [`ManifestProcessor`], and returns
//! a structured [`ItemAnalysis`]: basic properties, sockets and plugs,
//! merged stats, perks, categories, requirements, quality and metadata.
//!
//! [`ManifestProcessor`]: warmind_manifest::ManifestProcessor

mod analysis;
mod analyzer;
mod error;
pub mod labels;

pub use analysis::{
    BasicInfo, CategoryAnalysis, FullAnalysis, InvestmentStat, ItemAnalysis, Metadata,
    PerkAnalysis, PerkSource, PlugAnalysis, Quality, Requirements, SocketAnalysis,
    SocketCategoryAnalysis, StatAnalysis, StatSource,
};
pub use analyzer::ItemAnalyzer;
pub use error::{AnalyzerError, AnalyzerResult};
