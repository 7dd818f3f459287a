use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::orchestrator::CategoryDefinition;

/// Complete Wayfarer configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WayfarerConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Research backend endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL for search, scraping, travel-plan and analysis calls
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base URL for hotel-info generation (deployed separately upstream).
    /// Falls back to `api_url` when unset.
    #[serde(default)]
    pub hotel_api_url: Option<String>,
    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl BackendConfig {
    pub fn hotel_api_url(&self) -> &str {
        self.hotel_api_url.as_deref().unwrap_or(&self.api_url)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            hotel_api_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Reverse-geocoding provider used for map clicks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,
    /// Nominatim rejects requests without an identifying User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout (seconds); a click waits on this lookup
    #[serde(default = "default_geocoder_timeout")]
    pub request_timeout_secs: u64,
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "wayfarer/0.1".to_string()
}

fn default_geocoder_timeout() -> u64 {
    10
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_geocoder_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Ordered category chain run for every location selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "CategoryDefinition::defaults")]
    pub categories: Vec<CategoryDefinition>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            categories: CategoryDefinition::defaults(),
        }
    }
}

impl WayfarerConfig {
    /// Apply environment overrides on top of file/default values.
    ///
    /// - `WAYFARER_API_URL`
    /// - `WAYFARER_HOTEL_API_URL`
    /// - `WAYFARER_PORT`
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var("WAYFARER_API_URL") {
            if !v.is_empty() {
                self.backend.api_url = v;
            }
        }
        if let Ok(v) = std::env::var("WAYFARER_HOTEL_API_URL") {
            if !v.is_empty() {
                self.backend.hotel_api_url = Some(v);
            }
        }
        if let Ok(v) = std::env::var("WAYFARER_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.server.port = port;
            }
        }
        self
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<WayfarerConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: WayfarerConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load the file at `path` if it exists, otherwise defaults; then apply env overrides.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<WayfarerConfig> {
    let path = path.as_ref();
    let config = if path.exists() {
        load_config(path)?
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        WayfarerConfig::default()
    };
    Ok(config.apply_env())
}
