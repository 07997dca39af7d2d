use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AIR_QUALITY_BASE: &str = "https://air-quality-api.open-meteo.com/v1";
pub const DEFAULT_GEOCODING_BASE: &str = "https://geocoding-api.open-meteo.com/v1";

const REPORT_METRICS: &str =
    "us_aqi,pm10,pm2_5,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,ozone";

/// Current conditions as returned under `current` by the air-quality API.
/// Any metric can be missing for remote locations.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AirQualityReading {
    pub us_aqi: Option<f64>,
    pub pm10: Option<f64>,
    pub pm2_5: Option<f64>,
    pub carbon_monoxide: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub ozone: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: Option<AirQualityReading>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
}

impl Place {
    /// `name, admin1, country`, skipping the parts the geocoder left out.
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.admin1.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn short_label(&self) -> String {
        match self.country.as_deref().filter(|country| !country.is_empty()) {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Clone)]
pub struct AirQualityClient {
    http: reqwest::Client,
    base_url: String,
}

impl AirQualityClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build air-quality HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> anyhow::Result<AirQualityReading> {
        self.fetch(latitude, longitude, REPORT_METRICS).await
    }

    /// AQI only, as used for the city ticker.
    pub async fn current_aqi(&self, latitude: f64, longitude: f64) -> anyhow::Result<Option<f64>> {
        let reading = self.fetch(latitude, longitude, "us_aqi").await?;
        Ok(reading.us_aqi)
    }

    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        metrics: &str,
    ) -> anyhow::Result<AirQualityReading> {
        let url = format!("{}/air-quality", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", metrics.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("failed to fetch air quality for {latitude},{longitude}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "air-quality API failed with status {}: {}",
                status,
                body
            ));
        }

        let body = response
            .json::<AirQualityResponse>()
            .await
            .context("failed to decode air-quality response")?;

        body.current
            .ok_or_else(|| anyhow!("Air quality data unavailable for this location."))
    }
}

#[derive(Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build geocoding HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Up to five English-language candidates for a place name.
    pub async fn search(&self, name: &str) -> anyhow::Result<Vec<Place>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("name", name),
                ("count", "5"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .with_context(|| format!("failed to search places for {name:?}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("geocoding API failed with status {}: {}", status, body));
        }

        let body = response
            .json::<GeocodingResponse>()
            .await
            .context("failed to decode geocoding response")?;

        Ok(body.results)
    }
}
