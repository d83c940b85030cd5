use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::client::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const BASE_URL_ENV: &str = "CHECKIN_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub skip_tunnel_warning: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub start_max_attempts: Option<u32>,
    pub start_backoff_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Backend address: environment first, then config, then the local default.
    pub fn resolve_base_url(&self) -> String {
        let env_url = std::env::var(BASE_URL_ENV).ok();
        self.resolve_base_url_with(env_url.as_deref())
    }

    fn resolve_base_url_with(&self, env_url: Option<&str>) -> String {
        env_url
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn skip_tunnel_warning(&self) -> bool {
        self.skip_tunnel_warning.unwrap_or(true)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(30))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.start_max_attempts.unwrap_or(defaults.max_attempts).max(1),
            backoff: self
                .start_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff),
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("checkin"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
