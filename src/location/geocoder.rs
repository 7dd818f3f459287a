use crate::client::ClientError;
use crate::config::GeocoderConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves a map coordinate to a human-readable address.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the provider has no name for the point.
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<String>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

/// Reverse geocoding against an OpenStreetMap Nominatim instance.
pub struct NominatimGeocoder {
    http_client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<String>, ClientError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(lat, lng, "Reverse geocoding");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Reverse geocoding failed");
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ReverseResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.display_name.filter(|name| !name.trim().is_empty()))
    }
}
