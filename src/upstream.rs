//! Shared plumbing for talking to third-party providers

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::Result;
use crate::SiteSurveyError;
use crate::config::ProviderConfig;

/// Longest provider error body carried into error details
const MAX_DETAIL_CHARS: usize = 300;

/// Identity of an external data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Geocoding (Nominatim-compatible)
    Nominatim,
    /// Spatial features (Overpass-compatible)
    Overpass,
    /// Climate archive (Open-Meteo-compatible)
    OpenMeteo,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Nominatim => "Nominatim",
            Provider::Overpass => "Overpass",
            Provider::OpenMeteo => "Open-Meteo",
        };
        f.write_str(name)
    }
}

/// Build the HTTP client shared by every provider
pub fn http_client(config: &ProviderConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(config.user_agent.clone());
    if let Some(seconds) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    builder
        .build()
        .map_err(|e| SiteSurveyError::config(format!("Failed to create HTTP client: {e}")))
}

/// Turn a non-success response into an upstream error
pub async fn ensure_success(provider: Provider, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        debug!(%provider, status = status.as_u16(), "provider responded");
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(%provider, status = status.as_u16(), "provider returned an error status");
    Err(SiteSurveyError::upstream_status(
        provider,
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        excerpt(&body),
    ))
}

/// Read a successful response as JSON
pub async fn read_json<T: DeserializeOwned>(provider: Provider, response: Response) -> Result<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| SiteSurveyError::upstream_transport(provider, e))?;
    serde_json::from_slice(&body).map_err(|e| SiteSurveyError::malformed(provider, e))
}

fn excerpt(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_DETAIL_CHARS).collect())
}
