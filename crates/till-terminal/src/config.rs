//! # Terminal Configuration
//!
//! Deployment configuration for one terminal.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Configuration Priority                          │
//! │                                                                     │
//! │  1. Environment Variables (highest priority)                        │
//! │     TILL_BACKEND_URL=http://pos-backend:8000                        │
//! │     TILL_TAX_RATE_BPS=825                                           │
//! │     TILL_REQUEST_TIMEOUT_SECS=5                                     │
//! │                                                                     │
//! │  2. TOML Config File                                                │
//! │     ~/.config/till-pos/terminal.toml (Linux)                        │
//! │     ~/Library/Application Support/com.till-pos/terminal.toml (mac)  │
//! │                                                                     │
//! │  3. Default Values (lowest priority)                                │
//! │     localhost backend, 8% tax, 10s timeout                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [backend]
//! base_url = "http://127.0.0.1:8000"
//! request_timeout_secs = 10
//!
//! [sale]
//! tax_rate_bps = 800          # 8%
//! default_customer = "Walk-in Customer"
//!
//! [terminal]
//! name = "Front Counter"
//! ```
//!
//! The tax rate lives here, not in code: the observed deployment runs 8%,
//! other deployments won't.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use till_core::types::TaxRate;
use till_core::{DEFAULT_TAX_RATE_BPS, WALK_IN_CUSTOMER};

/// Config file name within the platform config directory.
const CONFIG_FILE: &str = "terminal.toml";

// =============================================================================
// Config Error
// =============================================================================

/// Failures while loading or saving terminal configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
}

// =============================================================================
// Backend Settings
// =============================================================================

/// Where the backend lives and how long we wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the backend REST service. Never hard-coded in a
    /// production build.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Checkout must not hang unbounded;
    /// a timed-out attempt surfaces as a rejected outcome.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// Sale Settings
// =============================================================================

/// Per-deployment sale rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleSettings {
    /// Tax rate in basis points (800 = 8%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    /// Customer name used when the operator doesn't enter one.
    #[serde(default = "default_customer")]
    pub default_customer: String,
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

fn default_customer() -> String {
    WALK_IN_CUSTOMER.to_string()
}

impl Default for SaleSettings {
    fn default() -> Self {
        SaleSettings {
            tax_rate_bps: default_tax_rate_bps(),
            default_customer: default_customer(),
        }
    }
}

// =============================================================================
// Terminal Settings
// =============================================================================

/// Identity of this terminal (receipts, logs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSettings {
    #[serde(default = "default_terminal_name")]
    pub name: String,
}

fn default_terminal_name() -> String {
    "Front Counter".to_string()
}

impl Default for TerminalSettings {
    fn default() -> Self {
        TerminalSettings {
            name: default_terminal_name(),
        }
    }
}

// =============================================================================
// Main Terminal Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub sale: SaleSettings,

    #[serde(default)]
    pub terminal: TerminalSettings,
}

impl TerminalConfig {
    /// Loads configuration: file (when present) with env overrides on top.
    ///
    /// A missing file is normal on first run and yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path)?,
            Some(path) => {
                debug!(path = %path.display(), "no config file, using defaults");
                TerminalConfig::default()
            }
            None => {
                warn!("could not determine config directory, using defaults");
                TerminalConfig::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded terminal config");
        Ok(config)
    }

    /// Writes the configuration to an explicit path (creating parents).
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Platform config file location.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "till-pos", "till-pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Applies `TILL_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override application with an injectable lookup (testable without
    /// mutating process environment).
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TILL_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(raw) = lookup("TILL_TAX_RATE_BPS") {
            match raw.parse::<u32>() {
                Ok(bps) => self.sale.tax_rate_bps = bps,
                Err(_) => warn!(value = %raw, "ignoring invalid TILL_TAX_RATE_BPS"),
            }
        }
        if let Some(raw) = lookup("TILL_REQUEST_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => self.backend.request_timeout_secs = secs,
                Err(_) => warn!(value = %raw, "ignoring invalid TILL_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    /// The configured tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.sale.tax_rate_bps)
    }

    /// The configured request timeout.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.backend.request_timeout_secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = TerminalConfig::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.sale.tax_rate_bps, 800);
        assert_eq!(config.sale.default_customer, "Walk-in Customer");
        assert_eq!(config.request_timeout().as_secs(), 10);
    }

    #[test]
    fn test_parse_full_file() {
        let config: TerminalConfig = toml::from_str(
            r#"
            [backend]
            base_url = "http://pos-backend:8000"
            request_timeout_secs = 5

            [sale]
            tax_rate_bps = 825
            default_customer = "Guest"

            [terminal]
            name = "Register 2"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://pos-backend:8000");
        assert_eq!(config.tax_rate().bps(), 825);
        assert_eq!(config.sale.default_customer, "Guest");
        assert_eq!(config.terminal.name, "Register 2");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: TerminalConfig = toml::from_str(
            r#"
            [sale]
            tax_rate_bps = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.sale.tax_rate_bps, 0);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.terminal.name, "Front Counter");
    }

    #[test]
    fn test_env_overrides() {
        let mut env = HashMap::new();
        env.insert("TILL_BACKEND_URL", "http://10.0.0.5:8000");
        env.insert("TILL_TAX_RATE_BPS", "700");
        env.insert("TILL_REQUEST_TIMEOUT_SECS", "not-a-number");

        let mut config = TerminalConfig::default();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.sale.tax_rate_bps, 700);
        // invalid value is ignored, default kept
        assert_eq!(config.backend.request_timeout_secs, 10);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join("till-pos-config-test");
        let path = dir.join("terminal.toml");

        let mut config = TerminalConfig::default();
        config.sale.tax_rate_bps = 825;
        config.save_to_path(&path).unwrap();

        let reloaded = TerminalConfig::load_from_path(&path).unwrap();
        assert_eq!(reloaded.sale.tax_rate_bps, 825);

        std::fs::remove_dir_all(&dir).ok();
    }
}
