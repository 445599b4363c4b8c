//! Application configuration.
//!
//! Looked up as `--config <file>`, else `<data-dir>/tiredesk.toml`, else the
//! built-in defaults. Environment variables are applied last.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tiredesk_inventory::search::DEFAULT_PAGE_SIZE;
use tiredesk_pricing::ServicePrices;
use tiredesk_quoting::QuoteSettings;

pub const CONFIG_FILE_NAME: &str = "tiredesk.toml";
pub const ENV_ADMIN_PASSWORD: &str = "TIREDESK_ADMIN_PASSWORD";
pub const ENV_VENDOR: &str = "TIREDESK_VENDOR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("page_size must be at least 1")]
    ZeroPageSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dealer name printed on quotes and used in quote file names.
    pub vendor: String,
    pub address_lines: Vec<String>,
    /// Suffix appended to every printed amount.
    pub currency: String,
    pub admin_password: String,
    /// Rows per search page.
    pub page_size: usize,
    pub service_prices: ServicePrices,
}

impl Default for AppConfig {
    fn default() -> Self {
        let quote = QuoteSettings::default();
        Self {
            vendor: quote.vendor,
            address_lines: quote.address_lines,
            currency: quote.currency,
            admin_password: "admin".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            service_prices: ServicePrices::default(),
        }
    }
}

impl AppConfig {
    /// Resolve, read and validate the configuration, then apply the process
    /// environment.
    pub fn load(explicit: Option<&Path>, data_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = data_dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Apply `TIREDESK_*` overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD).filter(|v| !v.is_empty()) {
            self.admin_password = password;
        }
        if let Some(vendor) = lookup(ENV_VENDOR).filter(|v| !v.trim().is_empty()) {
            self.vendor = vendor;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.admin_password == "admin" {
            tracing::warn!(
                "admin password is the default; set {ENV_ADMIN_PASSWORD} or admin_password"
            );
        }
        Ok(())
    }

    pub fn quote_settings(&self) -> QuoteSettings {
        QuoteSettings {
            vendor: self.vendor.clone(),
            address_lines: self.address_lines.clone(),
            currency: self.currency.clone(),
        }
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Vendor:      {}", self.vendor)?;
        for line in &self.address_lines {
            writeln!(f, "             {line}")?;
        }
        writeln!(f, "Currency:    {}", self.currency)?;
        writeln!(f, "Page size:   {}", self.page_size)
    }
}
