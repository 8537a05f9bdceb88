// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for SentiSense

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Feedback store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Reference dataset settings
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

// Default value functions
fn default_store_path() -> String { "feedback_data.csv".to_string() }
fn default_dataset_path() -> String { "IMDB Dataset.csv".to_string() }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self { path: default_dataset_path() }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::SentiError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.store.path, "feedback_data.csv");
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 8080);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.store.path = "custom.csv".to_string();
        config.web.port = 9999;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.store.path, "custom.csv");
        assert_eq!(loaded.web.port, 9999);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"web": {"port": 3000}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.store.path, "feedback_data.csv");
    }
}
