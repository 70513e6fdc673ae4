//! Client configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! selects the API base URL, the durable storage backend and remembers the
//! last email used to log in.
//!
//! Configuration is stored at `~/.config/lifehub/config.json`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FileStorage, KeyringStorage, Storage};

/// Application name used for config/data directory paths
const APP_NAME: &str = "lifehub";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "LIFEHUB_API_URL";

/// API base used when neither the environment nor the config file set one.
/// Points at the dev server, which proxies `/api` to the backend.
pub const DEFAULT_API_URL: &str = "http://localhost:5173/api";

/// Where the session token is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Effective API base: environment, then config file, then the default.
    pub fn api_url(&self) -> String {
        let env_url = std::env::var(API_URL_ENV).ok().filter(|u| !u.trim().is_empty());
        Self::pick_api_url(env_url, self.api_url.as_deref())
    }

    fn pick_api_url(env_url: Option<String>, configured: Option<&str>) -> String {
        let url = env_url
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    /// Build the storage backend selected by this config.
    pub fn open_storage(&self) -> Result<Arc<dyn Storage>> {
        let storage: Arc<dyn Storage> = match self.storage {
            StorageKind::File => Arc::new(FileStorage::new(Self::data_dir()?)),
            StorageKind::Keyring => Arc::new(KeyringStorage::new(APP_NAME)),
        };
        Ok(storage)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
