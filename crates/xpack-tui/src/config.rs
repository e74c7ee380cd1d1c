//! Application configuration management.
//!
//! Configuration is stored at `~/.config/xpack/config.json`. Every field is
//! optional; `XPACK_ORIGIN` and `XPACK_CACHE_NAME` (also read from `.env`)
//! override the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use xpack_core::offline::WorkerConfig;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "xpack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ORIGIN_VAR: &str = "XPACK_ORIGIN";
const CACHE_NAME_VAR: &str = "XPACK_CACHE_NAME";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server the relative asset paths resolve against
    pub origin: Option<String>,
    /// Cache version tag
    pub cache_name: Option<String>,
    /// Extra hosts served cache-first
    #[serde(default)]
    pub cdn_hosts: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(origin) = var(ORIGIN_VAR).filter(|v| !v.trim().is_empty()) {
            self.origin = Some(origin);
        }
        if let Some(name) = var(CACHE_NAME_VAR).filter(|v| !v.trim().is_empty()) {
            self.cache_name = Some(name);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Where the asset cache stores live
    pub fn offline_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join("offline"))
    }

    /// Worker settings: built-in manifest and hosts, overridden by config
    pub fn worker_config(&self) -> WorkerConfig {
        let mut worker = WorkerConfig::default();
        if let Some(ref origin) = self.origin {
            worker = worker.with_origin(origin);
        }
        if let Some(ref name) = self.cache_name {
            worker = worker.with_cache_name(name);
        }
        for host in &self.cdn_hosts {
            if !worker.cdn_hosts.contains(host) {
                worker.cdn_hosts.push(host.clone());
            }
        }
        worker
    }
}
