//! Configuration loading.
//!
//! Settings come from a TOML file when one is found, otherwise defaults:
//!
//! ```toml
//! [database]
//! path = "hanaprx.db"
//!
//! [logging]
//! level = "info"
//!
//! [search]
//! default_page_size = 20
//! max_page_size = 100
//! low_stock_threshold = 10
//! autocomplete_min_chars = 2
//! autocomplete_limit = 10
//! pagination_scope = "medicines"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogConfig;
use crate::models::{DEFAULT_PAGE_SIZE, LOW_STOCK_THRESHOLD, MAX_PAGE_SIZE};

/// Files searched, in order, when no explicit path is given.
const CONFIG_CANDIDATES: [&str; 3] = ["hanaprx.toml", ".hanaprx.toml", ".config/hanaprx.toml"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Loaded settings plus the file they came from.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LogConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hanaprx.db"),
        }
    }
}

/// Which set a search page is cut from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationScope {
    /// Page over distinct medicines; every branch row of a paged medicine is
    /// returned and `total` counts medicines.
    #[default]
    Medicines,
    /// Page over the flattened, filtered, sorted rows; `total` counts rows.
    Rows,
}

/// Tuning for search and autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub low_stock_threshold: u32,
    pub autocomplete_min_chars: usize,
    pub autocomplete_limit: u32,
    pub pagination_scope: PaginationScope,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            autocomplete_min_chars: 2,
            autocomplete_limit: 10,
            pagination_scope: PaginationScope::Medicines,
        }
    }
}

impl Config {
    /// Load from `path`, or the first standard location that exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).or_else(find_config_file);

        let settings = match &config_path {
            Some(p) => load_config_file(p)?,
            None => Settings::default(),
        };

        Ok(Self {
            settings,
            path: config_path,
        })
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn load_config_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Settings::from_toml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.settings.search.default_page_size, 20);
        assert_eq!(config.settings.search.max_page_size, 100);
        assert_eq!(config.settings.search.low_stock_threshold, 10);
        assert_eq!(config.settings.search.pagination_scope, PaginationScope::Medicines);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [search]
            pagination_scope = "rows"
            autocomplete_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.search.pagination_scope, PaginationScope::Rows);
        assert_eq!(settings.search.autocomplete_limit, 5);
        assert_eq!(settings.search.max_page_size, 100);
        assert_eq!(settings.database.path, PathBuf::from("hanaprx.db"));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"/tmp/pharmacy.db\"\n[logging]\nlevel = \"debug\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.path.as_deref(), Some(file.path()));
        assert_eq!(config.settings.database.path, PathBuf::from("/tmp/pharmacy.db"));
        assert_eq!(config.settings.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmax_page_size = \"lots\"").unwrap();

        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
