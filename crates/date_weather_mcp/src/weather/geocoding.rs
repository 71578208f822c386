use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::core::{
    error::{DateWeatherError, DateWeatherResult},
    models::Coordinates,
};
use crate::weather::client::get_json;

const ENDPOINT: &str = "geocoding";

/// Resolves a free-text place name to coordinates
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> DateWeatherResult<Coordinates>;
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    // Omitted entirely when nothing matches
    #[serde(default)]
    results: Vec<GeocodingMatch>,
}

#[derive(Debug, Deserialize)]
struct GeocodingMatch {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Open-Meteo geocoding lookup; the first match wins
#[derive(Debug, Clone)]
pub struct GeocodingService {
    client: Client,
    base_url: String,
    language: String,
}

impl GeocodingService {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.geocoding_url.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl LocationResolver for GeocodingService {
    async fn resolve(&self, name: &str) -> DateWeatherResult<Coordinates> {
        let query = [
            ("name", name),
            ("count", "1"),
            ("language", self.language.as_str()),
            ("format", "json"),
        ];

        let response: GeocodingResponse =
            get_json(&self.client, ENDPOINT, &self.base_url, &query)
                .await
                .inspect_err(|e| tracing::warn!("Geocoding '{}' failed: {}", name, e))?;

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| DateWeatherError::LocationNotFound {
                name: name.to_string(),
            })?;

        let coordinates = Coordinates::new(first.latitude, first.longitude)
            .map_err(|e| DateWeatherError::upstream(ENDPOINT, e.to_string()))?
            .with_elevation(first.elevation.unwrap_or(0.0));

        tracing::debug!(
            "Resolved '{}' to {} ({}) at {}, {}",
            name,
            first.name.as_deref().unwrap_or("?"),
            first.country.as_deref().unwrap_or("?"),
            coordinates.latitude,
            coordinates.longitude
        );

        Ok(coordinates)
    }
}
