//! Subtitle service client
//!
//! The subtitle service translates (or serves a cached translation of) a
//! subtitle for a TMDB title and hands back a directly fetchable URL.
//!
//! `POST {base}/api/subtitle/fetch` with `{tmdbId, type[, season, episode]}`,
//! answered by `{success, subtitleUrl?, fromCache?, message?}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

const FETCH_PATH: &str = "/api/subtitle/fetch";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Subtitle service error types
#[derive(Error, Debug)]
pub enum SubtitleServiceError {
    #[error("Subtitle service error: {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Title a subtitle is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubtitleTarget {
    Movie {
        #[serde(rename = "tmdbId")]
        tmdb_id: u64,
    },
    Tv {
        #[serde(rename = "tmdbId")]
        tmdb_id: u64,
        season: u32,
        episode: u32,
    },
}

impl SubtitleTarget {
    pub fn tmdb_id(&self) -> u64 {
        match self {
            SubtitleTarget::Movie { tmdb_id } | SubtitleTarget::Tv { tmdb_id, .. } => *tmdb_id,
        }
    }
}

/// Raw service answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleFetchResponse {
    #[serde(default)]
    pub success: bool,
    pub subtitle_url: Option<String>,
    pub from_cache: Option<bool>,
    pub message: Option<String>,
}

/// Seam for the subtitle orchestrator
#[async_trait]
pub trait SubtitleService: Send + Sync {
    async fn fetch(
        &self,
        target: SubtitleTarget,
    ) -> Result<SubtitleFetchResponse, SubtitleServiceError>;
}

/// HTTP client for the subtitle service
#[derive(Debug, Clone)]
pub struct SubtitleServiceClient {
    base_url: String,
    client: reqwest::Client,
}

impl SubtitleServiceClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::build(base_url.into(), DEFAULT_TIMEOUT)
    }

    /// Create a client from startup configuration
    pub fn from_config(config: &Config) -> Self {
        Self::build(config.subtitle_service_url.clone(), config.request_timeout())
    }

    fn build(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn fetch_url(&self) -> String {
        format!("{}{}", self.base_url, FETCH_PATH)
    }
}

#[async_trait]
impl SubtitleService for SubtitleServiceClient {
    async fn fetch(
        &self,
        target: SubtitleTarget,
    ) -> Result<SubtitleFetchResponse, SubtitleServiceError> {
        tracing::debug!(?target, "Requesting subtitle");

        let response = self
            .client
            .post(self.fetch_url())
            .json(&target)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // The service reports its own failures as `success: false` bodies,
        // sometimes alongside an error status. Prefer the body when it parses.
        match serde_json::from_str::<SubtitleFetchResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(SubtitleServiceError::Status(status.as_u16())),
            Err(e) => Err(SubtitleServiceError::InvalidResponse(format!(
                "JSON parse error: {}",
                e
            ))),
        }
    }
}
