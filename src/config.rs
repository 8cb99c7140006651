use std::fs;

use serde::Deserialize;

use crate::error::{ItineraryError, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub itinerary_service: ItineraryServiceConfig,
}

#[derive(Debug, Deserialize)]
pub struct ItineraryServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Health probes are short; a dead service should fail fast.
    #[serde(default = "default_health_timeout")]
    pub health_timeout_seconds: u64,
    /// Generation routinely runs for minutes.
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_seconds: u64,
    #[serde(default = "default_edit_timeout")]
    pub edit_timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:5500".to_string()
}

fn default_health_timeout() -> u64 {
    10
}

fn default_generation_timeout() -> u64 {
    290
}

fn default_edit_timeout() -> u64 {
    60
}

impl Default for ItineraryServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_timeout_seconds: default_health_timeout(),
            generation_timeout_seconds: default_generation_timeout(),
            edit_timeout_seconds: default_edit_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            itinerary_service: ItineraryServiceConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ItineraryError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
