//! Core type definitions for Warmind.
//!
//! This crate defines the data shapes shared by the manifest processor and
//! the item analyzer:
//! - Definition hashes and their signed/unsigned normalization
//! - Raw and processed manifest definitions
//! - Manifest metadata and definition-source payloads
//! - Live item instances as reported by the game service
//!
//! Nothing here performs I/O.

mod definition;
mod hash;
mod item;
mod manifest;

pub use definition::{
    DisplayProperties, ProcessedDefinition, RawDefinition, ResolvedHashes, ResolvedStat,
    UNKNOWN_NAME, hash_at, hash_from_value, hashes_at, value_at,
};
pub use hash::{DestinyHash, canonicalize};
pub use item::{
    InstanceStat, ItemEnergy, ItemInstance, ItemPerkState, ItemSocketState, ItemState,
};
pub use manifest::{
    BatchItemError, BatchResponse, ManifestInfo, ManifestMetadata, ManifestSnapshot,
    ManifestStatus, entity,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid hash: {0}")]
    InvalidHash(String),
}
