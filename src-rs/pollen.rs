use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollenError {
    #[error("pollen API returned status {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("pollen API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for the Google Pollen `forecast:lookup` endpoint. The API key is
/// passed per call so the client can exist before a key is configured.
#[derive(Clone)]
pub struct PollenClient {
    http: reqwest::Client,
    api_base: String,
}

impl PollenClient {
    pub fn new(api_base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build pollen HTTP client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn lookup_url(&self) -> String {
        format!("{}/forecast:lookup", self.api_base)
    }

    /// One-day English forecast for a coordinate.
    pub async fn lookup(
        &self,
        api_key: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Value, PollenError> {
        let response = self
            .http
            .get(self.lookup_url())
            .query(&[
                ("key", api_key.to_string()),
                ("location.latitude", latitude.to_string()),
                ("location.longitude", longitude.to_string()),
                ("days", "1".to_string()),
                ("languageCode", "en".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PollenError::Upstream { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}
