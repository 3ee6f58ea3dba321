//! Service configuration
//!
//! A single TOML file with serde-backed defaults. A missing config file is
//! not an error: the defaults are written out so the deployment has a file to
//! edit next time. The cache bound and preview resolution are deliberately
//! not configurable; they are part of the service contract.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8650
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 8650);
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() {
        let config: Config = toml::from_str("[web]\nport = 9000\n").unwrap();
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 9000);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = Config::load_from_file(path).unwrap();
        assert_eq!(config.web.port, 8650);
        assert!(std::path::Path::new(path).exists());

        // a second load reads the file it just wrote
        let reloaded = Config::load_from_file(path).unwrap();
        assert_eq!(reloaded.web.host, config.web.host);
    }
}
