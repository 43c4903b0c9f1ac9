use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::constants::{APP_DIR_NAME, CONFIG_FILE, CONFIG_PATH_ENV, LOW_STOCK_THRESHOLD};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AppConfig {
    pub wallet: WalletConfig,
    /// Start with the demo inventory and its history
    pub seed_demo_data: bool,
    pub low_stock_threshold: u32,
}

/// Describes the mock wallet standing in for a browser extension.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct WalletConfig {
    /// When false the app behaves as if no wallet were installed
    pub installed: bool,
    pub accounts: Vec<String>,
    pub chain_id: u64,
    /// Chains the wallet knows; switching to any other fails with 4902
    pub available_chains: Vec<u64>,
    /// Accounts already authorized for this app at startup
    pub preauthorized: bool,
    pub reject_connections: bool,
    pub latency_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wallet: WalletConfig::default(),
            seed_demo_data: true,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            installed: true,
            accounts: vec![
                "0x71c7656ec7ab88b098defb751b7401b5f6d8976f".to_string(),
                "0x2546bcd3c84621e976d8185a91a922ae77ecec30".to_string(),
            ],
            chain_id: 11_155_111,
            available_chains: vec![1, 11_155_111],
            preauthorized: false,
            reject_connections: false,
            latency_ms: 400,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE))
}

impl AppConfig {
    /// Reads the config file if present; every field falls back to its default.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: PathBuf) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "wallet": { "installed": false, "latency_ms": 0 }, "low_stock_threshold": 3 }"#,
        )
        .unwrap();

        let config = AppConfig::from_file(path).unwrap();
        assert!(!config.wallet.installed);
        assert_eq!(config.wallet.latency_ms, 0);
        assert_eq!(config.wallet.chain_id, 11_155_111);
        assert_eq!(config.low_stock_threshold, 3);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::from_file(path).is_err());
    }
}
