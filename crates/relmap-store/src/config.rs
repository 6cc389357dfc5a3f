//! Store configuration
//!
//! `StoreConfig` can be built in code, parsed from TOML, or taken from the
//! environment. A missing `path` means an in-memory database.
//!
//! ```toml
//! path = ".relmap/store.db"
//! foreign_keys = true
//! journal_mode = "WAL"
//! busy_timeout_ms = 5000
//! ```

use crate::errors::{config_error, io_error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the database file
pub const ENV_DB_PATH: &str = "RELMAP_DB_PATH";

const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file; `None` for an in-memory database
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,

    /// Ignored for in-memory databases
    #[serde(default = "default_journal_mode")]
    pub journal_mode: String,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_foreign_keys() -> bool {
    true
}

fn default_journal_mode() -> String {
    "WAL".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: default_foreign_keys(),
            journal_mode: default_journal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Defaults, with `path` taken from `RELMAP_DB_PATH` when set
    pub fn from_env() -> Self {
        match std::env::var_os(ENV_DB_PATH) {
            Some(path) if !path.is_empty() => Self::file(path),
            _ => Self::default(),
        }
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Config` on malformed TOML, unknown keys or an
    /// unsupported journal mode.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(source)
            .map_err(|e| config_error(format!("Invalid store config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Io` if the file cannot be read, otherwise as
    /// `from_toml_str`.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| io_error("load_config", e))?;
        Self::from_toml_str(&source)
    }

    /// Check values that end up inside PRAGMA statements
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Config` for an unknown journal mode.
    pub fn validate(&self) -> Result<()> {
        let mode = self.journal_mode.to_ascii_uppercase();
        if !JOURNAL_MODES.contains(&mode.as_str()) {
            return Err(config_error(format!(
                "Unsupported journal_mode '{}', expected one of {}",
                self.journal_mode,
                JOURNAL_MODES.join(", ")
            )));
        }
        Ok(())
    }

    pub fn is_memory(&self) -> bool {
        self.path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(config.is_memory());
        assert!(config.foreign_keys);
        assert_eq!(config.journal_mode, "WAL");
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = StoreConfig::from_toml_str("path = \"data/store.db\"\nbusy_timeout_ms = 250\n")
            .unwrap();
        assert_eq!(config.path, Some(PathBuf::from("data/store.db")));
        assert_eq!(config.busy_timeout_ms, 250);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_rejects_unknown_journal_mode() {
        let err = StoreConfig::from_toml_str("journal_mode = \"WAL; DROP TABLE x\"").unwrap_err();
        assert_eq!(err.kind(), relmap_core::ExErrorKind::Config);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(StoreConfig::from_toml_str("pathh = \"x.db\"").is_err());
    }
}
