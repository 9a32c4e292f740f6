use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::common::AnyResult;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub soundcloud: SoundCloudConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SoundCloudConfig {
    /// Client-credentials pair for the token exchange.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Pre-provisioned bearer token; when set, no exchange is performed.
    pub access_token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Scratch location for the durable token record. Absent disables the
    /// secondary store.
    pub token_cache_path: Option<PathBuf>,
}

impl Default for SoundCloudConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            access_token: None,
            api_base: default_api_base(),
            token_url: default_token_url(),
            token_cache_path: None,
        }
    }
}

fn default_api_base() -> String {
    "https://api.soundcloud.com".to_string()
}

fn default_token_url() -> String {
    "https://secure.soundcloud.com/oauth/token".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl Config {
    pub fn load() -> AnyResult<Self> {
        let config_str = std::fs::read_to_string("config.toml").unwrap_or_else(|_| "".to_string());
        if config_str.is_empty() {
            return Err("config.toml not found or empty".into());
        }
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}
