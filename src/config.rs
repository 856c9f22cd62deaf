//! Registry configuration
//!
//! JSON file; every field has a default, so `{}` is a valid configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::AuditOrder;
use crate::observability::{Logger, Severity};
use crate::registry::{RegistryOptions, DEFAULT_SCAN_PAGE_SIZE};

/// Configuration path used when none is given
pub const DEFAULT_CONFIG_PATH: &str = "./docregistry.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Snapshot file holding the reference ledger
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Entries fetched per scan page (must be > 0)
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: usize,

    /// Order of audit query results
    #[serde(default)]
    pub audit_order: AuditOrder,

    /// Minimum severity written to the log
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("./docregistry.ledger.json")
}

fn default_scan_page_size() -> usize {
    DEFAULT_SCAN_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            scan_page_size: default_scan_page_size(),
            audit_order: AuditOrder::default(),
            log_level: default_log_level(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Like [`RegistryConfig::load`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: RegistryConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.scan_page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "scan_page_size",
                reason: "must be > 0".to_string(),
            });
        }
        if self.ledger_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "ledger_path",
                reason: "must not be empty".to_string(),
            });
        }
        self.severity()?;
        Ok(())
    }

    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level.parse().map_err(|_| ConfigError::Invalid {
            field: "log_level",
            reason: format!(
                "'{}' is not one of trace, info, warn, error, fatal",
                self.log_level
            ),
        })
    }

    /// Sets the process-wide log threshold
    pub fn apply_log_level(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            scan_page_size: self.scan_page_size,
            audit_order: self.audit_order,
        }
    }
}
