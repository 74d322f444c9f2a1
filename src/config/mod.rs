//! Configuration management module
//!
//! Provides:
//! - Well-known paths (log file, settings file) under `$HOME/.ml-alert/`
//! - Build information (version)
//! - [`GatewaySettings`]: where the UI console proxy and the search endpoint live, read from
//!   `config.toml` and overridden by `ML_ALERT_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use crate::proxy::{DEFAULT_CONSOLE_PATH, DEFAULT_WATCHER_PREFIX};
use crate::scripts::ScriptNames;

const APP_DIR: &str = ".ml-alert";

/// Configuration paths and build info
pub struct Config;

impl Config {
    fn app_dir() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(APP_DIR))
    }

    /// Get the log file path
    ///
    /// Returns `$HOME/.ml-alert/debug.log`, or a file in the temp directory if HOME is not set.
    pub fn log_file_path() -> PathBuf {
        Self::app_dir()
            .map(|dir| dir.join("debug.log"))
            .unwrap_or_else(|| std::env::temp_dir().join("ml-alert-debug.log"))
    }

    /// Ensure the log directory exists
    pub fn ensure_log_directory() -> std::io::Result<()> {
        let log_path = Self::log_file_path();
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Settings file: `$HOME/.ml-alert/config.toml` (temp dir fallback).
    pub fn config_file_path() -> PathBuf {
        Self::app_dir()
            .map(|dir| dir.join("config.toml"))
            .unwrap_or_else(|| std::env::temp_dir().join("ml-alert-config.toml"))
    }

    /// Returns the package version from CARGO_PKG_VERSION.
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Connection and naming settings for the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Base URL of the UI server hosting the console proxy, e.g. `http://localhost:5601`.
    pub kibana_url: String,
    /// Search endpoint used to list watches.
    pub elasticsearch_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
    pub console_path: String,
    pub watcher_prefix: String,
    pub scripts: ScriptNames,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            kibana_url: "http://localhost:5601".to_string(),
            elasticsearch_url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
            console_path: DEFAULT_CONSOLE_PATH.to_string(),
            watcher_prefix: DEFAULT_WATCHER_PREFIX.to_string(),
            scripts: ScriptNames::default(),
        }
    }
}

/// Non-empty, trimmed value of an environment variable.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GatewaySettings {
    /// Load settings: defaults, then the TOML file (explicit `path` or the default location,
    /// skipped when absent), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::config_file_path);

        let mut settings = if file.exists() {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read settings file {:?}", file))?;
            info!("Config: loaded settings from {:?}", file);
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse settings file {:?}", file))?
        } else if path.is_some() {
            anyhow::bail!("Settings file {:?} does not exist", file);
        } else {
            debug!("Config: no settings file at {:?}, using defaults", file);
            Self::default()
        };

        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `ML_ALERT_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(read_env);
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ML_ALERT_KIBANA_URL") {
            self.kibana_url = v;
        }
        if let Some(v) = lookup("ML_ALERT_ELASTICSEARCH_URL") {
            self.elasticsearch_url = v;
        }
        if let Some(v) = lookup("ML_ALERT_USERNAME") {
            self.username = Some(v);
        }
        if let Some(v) = lookup("ML_ALERT_PASSWORD") {
            self.password = Some(v);
        }
        if let Some(v) = lookup("ML_ALERT_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!("Config: ignoring ML_ALERT_TIMEOUT_SECS={:?}", v),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.kibana_url).context("Invalid kibana_url")?;
        Url::parse(&self.elasticsearch_url).context("Invalid elasticsearch_url")?;
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.password.is_some() && self.username.is_none() {
            anyhow::bail!("password is set but username is not");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = GatewaySettings::from_toml(
            r#"
            kibana_url = "https://kibana.example.com"
            watcher_prefix = "_xpack/watcher"

            [scripts]
            mail = "custom_mail"
            "#,
        )
        .unwrap();
        assert_eq!(settings.kibana_url, "https://kibana.example.com");
        assert_eq!(settings.watcher_prefix, "_xpack/watcher");
        assert_eq!(settings.console_path, "/api/console/proxy");
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.scripts.mail, "custom_mail");
        assert_eq!(settings.scripts.slack, "mla_script_for_slack");
    }

    #[test]
    fn overrides_win() {
        let env: HashMap<&str, &str> = [
            ("ML_ALERT_KIBANA_URL", "http://k:5601"),
            ("ML_ALERT_USERNAME", "elastic"),
            ("ML_ALERT_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let mut settings = GatewaySettings::default();
        settings.apply_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(settings.kibana_url, "http://k:5601");
        assert_eq!(settings.username.as_deref(), Some("elastic"));
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(GatewaySettings::default().validate().is_ok());

        let bad_url = GatewaySettings {
            kibana_url: "kibana".to_string(),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let orphan_password = GatewaySettings {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(orphan_password.validate().is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("ml-alert-missing-settings.toml");
        assert!(GatewaySettings::load(Some(path.as_path())).is_err());
    }
}
