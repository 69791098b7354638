//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (applied by the `check` command, not here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit path (`--config`)
//! 2. `$OCFL_AUDIT_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/ocfl-audit/config.toml`
//! 4. `~/.ocfl-audit/config.toml`
//!
//! An explicit path that does not exist is an error. Missing files at the
//! other locations are not; defaults are used instead.
//!
//! # Example
//!
//! ```no_run
//! use ocfl_audit::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Namespace: {}", config.namespace());
//! println!("Fetch limit: {}", config.max_concurrent_fetches());
//! ```

pub mod schema;

pub use schema::{AuditConfig, FetchSettings, ScanSettings};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default identifier namespace.
pub const DEFAULT_NAMESPACE: &str = "public_ocfl";

/// Default accepted catalog filenames, in priority order.
pub const DEFAULT_CATALOG_FILES: &[&str] = &["ro-crate-metadata.json", "ro-crate-metadata.jsonld"];

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "OCFL_AUDIT_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied by accessor methods.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw values from the config file
    pub file: AuditConfig,
    /// Path the file was loaded from (if any)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated, or if an explicit path does not exist.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => Self::search_default_locations(),
        };

        let Some(path) = path else {
            return Ok(Config::default());
        };

        let file = Self::read_config(&path)?;
        file.validate()?;

        Ok(Config {
            file,
            loaded_from: Some(path),
        })
    }

    /// Build a config directly from parsed values.
    pub fn from_values(file: AuditConfig) -> Result<Config, ConfigError> {
        file.validate()?;
        Ok(Config {
            file,
            loaded_from: None,
        })
    }

    /// Find the first existing config file in the default locations.
    fn search_default_locations() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("ocfl-audit/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".ocfl-audit/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<AuditConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Identifier namespace. Defaults to `public_ocfl`.
    pub fn namespace(&self) -> &str {
        self.file.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Remote endpoint, if one is configured.
    pub fn endpoint(&self) -> Option<&str> {
        self.file.endpoint.as_deref()
    }

    /// Accepted catalog filenames in priority order.
    pub fn catalog_files(&self) -> Vec<String> {
        match &self.file.catalog_files {
            Some(files) => files.clone(),
            None => DEFAULT_CATALOG_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether fetched files are verified. Defaults to `false`.
    pub fn fixity(&self) -> bool {
        self.file.fixity.unwrap_or(false)
    }

    /// Fetch filter pattern, if any.
    pub fn fetch_filter(&self) -> Option<&str> {
        self.file.fetch_filter.as_deref()
    }

    /// Scratch directory for downloads.
    ///
    /// Defaults to `ocfl-audit` under the system temp directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.file
            .fetch
            .as_ref()
            .and_then(|f| f.scratch_dir.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("ocfl-audit"))
    }

    /// Maximum simultaneous remote fetches. Defaults to 4.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.file
            .fetch
            .as_ref()
            .and_then(|f| f.max_concurrent)
            .unwrap_or(4)
    }

    /// Per-request timeout. Defaults to 300 seconds.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(
            self.file
                .fetch
                .as_ref()
                .and_then(|f| f.timeout_secs)
                .unwrap_or(300),
        )
    }

    /// Whether verified downloads are kept. Defaults to `false`.
    pub fn keep_downloads(&self) -> bool {
        self.file
            .fetch
            .as_ref()
            .and_then(|f| f.keep_downloads)
            .unwrap_or(false)
    }

    /// Objects audited at once. Defaults to 8.
    pub fn object_parallelism(&self) -> usize {
        self.file
            .scan
            .as_ref()
            .and_then(|s| s.object_parallelism)
            .unwrap_or(8)
    }

    /// Path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
