//! Configuration file support for Biblio.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/biblio/config.toml`.

use crate::storage::DEFAULT_CATALOG_FILE;
use crate::{Error, Result, YearBounds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub books: BooksConfig,
}

/// Catalog file location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_file: default_catalog_file(),
        }
    }
}

/// Rules applied when adding books
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BooksConfig {
    #[serde(default = "default_min_year")]
    pub min_year: u16,

    #[serde(default = "default_max_year")]
    pub max_year: u16,
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl BooksConfig {
    pub fn year_bounds(&self) -> YearBounds {
        YearBounds {
            min: self.min_year,
            max: self.max_year,
        }
    }
}

// Default value functions
fn default_catalog_file() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_FILE)
}

fn default_min_year() -> u16 {
    YearBounds::default().min
}

fn default_max_year() -> u16 {
    YearBounds::default().max
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            other => {
                tracing::debug!("No config file found at {:?}, using defaults", other);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("biblio").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.books.min_year > self.books.max_year {
            return Err(Error::Config(format!(
                "min_year {} is greater than max_year {}",
                self.books.min_year, self.books.max_year
            )));
        }
        if self.storage.catalog_file.as_os_str().is_empty() {
            return Err(Error::Config("catalog_file cannot be empty".into()));
        }
        Ok(())
    }
}
