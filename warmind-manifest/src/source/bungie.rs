//! Bungie.net platform source.
//!
//! Talks to the public Destiny 2 platform API. Platform responses come
//! wrapped in an envelope whose `ErrorCode` must be 1; content downloads
//! are plain JSON.

use super::{DefinitionSource, MAX_BATCH_SIZE};
use crate::error::{ManifestError, ManifestResult};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use warmind_types::{
    BatchItemError, BatchResponse, DestinyHash, ManifestInfo, ManifestSnapshot, RawDefinition,
};

/// Bungie.net source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BungieConfig {
    /// Application API key sent as `X-API-Key`.
    pub api_key: String,
    /// Base URL of the platform API (e.g. `https://www.bungie.net/Platform`).
    pub api_base_url: String,
    /// Base URL that root-relative content paths are served from.
    pub content_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BungieConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://www.bungie.net/Platform".to_string(),
            content_base_url: "https://www.bungie.net".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Platform response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope<T> {
    response: Option<T>,
    error_code: i64,
    #[serde(default)]
    error_status: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestResponse {
    version: String,
    json_world_content_paths: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchPage,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<RawDefinition>,
}

/// Definition source backed by the Bungie.net platform API.
pub struct BungieSource {
    config: BungieConfig,
    client: Client,
}

impl BungieSource {
    /// Creates a new source.
    pub fn new(config: BungieConfig) -> ManifestResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ManifestError::Config("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ManifestError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BungieConfig {
        &self.config
    }

    /// Issues a platform GET and unwraps the response envelope.
    async fn platform_get<T: DeserializeOwned>(&self, path: &str) -> ManifestResult<Option<T>> {
        let url = format!("{}{}", self.config.api_base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(ManifestError::Api(format!("{path} returned {status}: {error}")));
        }

        let envelope: Envelope<T> = response.json().await?;
        if envelope.error_code != 1 {
            return Err(ManifestError::Service {
                code: envelope.error_code,
                status: envelope.error_status,
                message: envelope.message,
            });
        }

        Ok(envelope.response)
    }
}

#[async_trait]
impl DefinitionSource for BungieSource {
    fn name(&self) -> &'static str {
        "Bungie.net"
    }

    async fn get_manifest_info(&self) -> ManifestResult<ManifestInfo> {
        let manifest: ManifestResponse = self
            .platform_get("/Destiny2/Manifest/")
            .await?
            .ok_or_else(|| ManifestError::Api("manifest response was empty".to_string()))?;

        Ok(ManifestInfo {
            version: manifest.version,
            content_paths_by_language: manifest.json_world_content_paths,
        })
    }

    async fn download_content(&self, path: &str) -> ManifestResult<ManifestSnapshot> {
        let url = format!("{}{}", self.config.content_base_url, path);
        debug!("Downloading manifest content: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(ManifestError::Api(format!(
                "content download returned {status}: {error}"
            )));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_entity(
        &self,
        entity_type: &str,
        hash: DestinyHash,
    ) -> ManifestResult<RawDefinition> {
        let path = format!(
            "/Destiny2/Manifest/{}/{}/",
            urlencoding::encode(entity_type),
            hash
        );

        self.platform_get(&path)
            .await?
            .ok_or_else(|| ManifestError::NotFound {
                entity_type: entity_type.to_string(),
                hash,
            })
    }

    async fn get_batch(
        &self,
        entity_type: &str,
        hashes: &[DestinyHash],
    ) -> ManifestResult<BatchResponse> {
        if hashes.len() > MAX_BATCH_SIZE {
            return Err(ManifestError::BatchTooLarge {
                requested: hashes.len(),
                limit: MAX_BATCH_SIZE,
            });
        }

        let fetches = hashes
            .iter()
            .map(|&hash| async move { (hash, self.get_entity(entity_type, hash).await) });

        let mut batch = BatchResponse::default();
        for (hash, result) in join_all(fetches).await {
            match result {
                Ok(raw) => {
                    batch.results.insert(hash, raw);
                }
                Err(e) => batch.errors.push(BatchItemError {
                    hash,
                    error: e.to_string(),
                }),
            }
        }

        Ok(batch)
    }

    async fn search(
        &self,
        entity_type: &str,
        term: &str,
        limit: usize,
    ) -> ManifestResult<Vec<RawDefinition>> {
        let path = format!(
            "/Destiny2/Armory/Search/{}/{}/",
            urlencoding::encode(entity_type),
            urlencoding::encode(term)
        );

        // a missing endpoint means the armory is unavailable, not "no results"
        let mut results = self
            .platform_get::<SearchResponse>(&path)
            .await?
            .map(|response| response.results.results)
            .ok_or(ManifestError::Unsupported("search"))?;

        results.truncate(limit);
        Ok(results)
    }
}
