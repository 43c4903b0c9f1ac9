use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::{
    APP_DIR_NAME, PREFERENCES_FILE, PREF_ANALYTICS, PREF_AUTO_CONNECT, PREF_DARK_MODE,
    PREF_NOTIFICATIONS, PREF_WALLET_CONNECTED,
};

/// Settings toggles in display order: (key, label, default)
pub const TOGGLES: [(&str, &str, bool); 4] = [
    (PREF_AUTO_CONNECT, "Auto Connect Wallet", false),
    (PREF_NOTIFICATIONS, "Transaction Notifications", true),
    (PREF_DARK_MODE, "Dark Mode", false),
    (PREF_ANALYTICS, "Usage Analytics", true),
];

/// Client preferences, stored as string-encoded booleans ("true"/"false")
/// in a flat JSON object. Without a path the store lives only in memory.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    values: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(PREFERENCES_FILE))
}

fn default_for(key: &str) -> bool {
    TOGGLES
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, default)| *default)
        .unwrap_or(false)
}

impl Preferences {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads preferences from `path`. A missing file yields an empty store
    /// that will be written on the first change.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences from {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Malformed preferences file {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = values.len(), "loaded preferences");
        Ok(Preferences { values, path: Some(path) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Anything other than "true"/"false" reads as unset.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get_raw(key) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get_bool(key).unwrap_or_else(|| default_for(key))
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    pub fn toggle(&mut self, key: &str) -> Result<bool> {
        let next = !self.flag(key);
        self.set_bool(key, next)?;
        Ok(next)
    }

    /// Like `set_bool`, but a failed write is logged and swallowed. The wallet
    /// session uses this so a read-only config dir never breaks connecting.
    pub fn set_bool_lossy(&mut self, key: &str, value: bool) {
        if let Err(e) = self.set_bool(key, value) {
            warn!(key, error = %e, "failed to persist preference");
        }
    }

    pub fn auto_connect(&self) -> bool {
        self.flag(PREF_AUTO_CONNECT)
    }

    pub fn wallet_connected(&self) -> bool {
        self.flag(PREF_WALLET_CONNECTED)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write preferences to {}", path.display()))?;
        Ok(())
    }
}
