//! Configuration management for tronmock

use serde::Deserialize;
use std::fs;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the fabricated transaction table.
    #[serde(default = "default_store_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResponderConfig {
    /// Block number reported for records that carry none.
    #[serde(default = "default_sentinel_block")]
    pub sentinel_block: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            sentinel_block: default_sentinel_block(),
        }
    }
}

fn default_api_port() -> u16 {
    8080
}

fn default_store_path() -> String {
    "pegasus.json".to_string()
}

fn default_sentinel_block() -> u64 {
    45_000_000
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string("config.toml").unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        // Sane defaults when config.toml is absent
        Config::default()
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.store.path.is_empty() {
        return Err("store.path must be set in config.toml".into());
    }

    Ok(config)
}
