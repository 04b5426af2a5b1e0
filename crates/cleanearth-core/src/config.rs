use crate::error::AppError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "shell.json";
pub const DEFAULT_BASE_URL: &str = "http://192.168.1.9:5000";
pub const BASE_URL_ENV: &str = "CLEANEARTH_BASE_URL";

/// Every key is optional in `shell.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub base_url: String,
    pub warm_up_ms: u64,
    pub analysis_delay_ms: u64,
    pub status_probe_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            warm_up_ms: 3000,
            analysis_delay_ms: 2000,
            status_probe_ms: 1000,
        }
    }
}

impl ShellConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            debug!("No shell config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| AppError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config: ShellConfig = serde_json::from_str(&content).map_err(|e| AppError {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        info!("Loaded shell config from {}", path.display());
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_base_url_override(std::env::var(BASE_URL_ENV).ok())
    }

    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            info!("Base URL overridden to {}", url);
            self.base_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err("Base URL must not be empty".into());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("Base URL must use http or https: {}", url).into());
        }
        Ok(())
    }

    /// Remote-URL pattern covering every page of the hosted site's origin,
    /// explicit port included, for granting it the bridge commands.
    pub fn remote_origin_pattern(&self) -> Result<String, AppError> {
        self.validate()?;
        let url = self.base_url.trim();
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| AppError::from(format!("Base URL has no scheme: {}", url)))?;
        let authority = rest
            .split(|c| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        if authority.is_empty() {
            return Err(format!("Base URL has no host: {}", url).into());
        }
        Ok(format!("{}://{}/*", scheme, authority))
    }

    pub fn warm_up(&self) -> Duration {
        Duration::from_millis(self.warm_up_ms)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn status_probe(&self) -> Duration {
        Duration::from_millis(self.status_probe_ms)
    }
}
