//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order (first hit wins):
//! 1. `--config <path>` on the command line
//! 2. `$OCFL_AUDIT_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/ocfl-audit/config.toml`
//! 4. `~/.ocfl-audit/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing (the fetch filter must be a
//! valid regex, the endpoint an http(s) URL, limits non-zero).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Auditor configuration.
///
/// # Example
///
/// ```toml
/// namespace = "public_ocfl"
/// endpoint = "https://oni.example.org/ocfl"
/// catalog_files = ["ro-crate-metadata.json", "ro-crate-metadata.jsonld"]
/// fixity = true
/// fetch_filter = "\\.csv$"
///
/// [fetch]
/// scratch_dir = "/var/tmp/ocfl-audit"
/// max_concurrent = 4
/// timeout_secs = 300
/// keep_downloads = false
///
/// [scan]
/// object_parallelism = 8
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Identifier namespace looked up in each catalog
    pub namespace: Option<String>,

    /// Remote endpoint base URL
    pub endpoint: Option<String>,

    /// Accepted catalog filenames, in priority order
    pub catalog_files: Option<Vec<String>>,

    /// Verify fetched files against the manifest digest
    pub fixity: Option<bool>,

    /// Only physical paths matching this regex are fetched
    pub fetch_filter: Option<String>,

    /// Remote fetch settings
    pub fetch: Option<FetchSettings>,

    /// Local scan settings
    pub scan: Option<ScanSettings>,
}

impl AuditConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(namespace) = &self.namespace {
            if namespace.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "namespace cannot be empty".to_string(),
                ));
            }
        }

        if let Some(endpoint) = &self.endpoint {
            validate_endpoint(endpoint)?;
        }

        if let Some(catalogs) = &self.catalog_files {
            if catalogs.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "catalog_files must list at least one filename".to_string(),
                ));
            }
            if let Some(bad) = catalogs.iter().find(|c| c.is_empty() || c.contains('/')) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid catalog filename '{}'",
                    bad
                )));
            }
        }

        if let Some(filter) = &self.fetch_filter {
            regex::Regex::new(filter).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid fetch_filter: {}", e))
            })?;
        }

        if let Some(fetch) = &self.fetch {
            fetch.validate()?;
        }

        if let Some(scan) = &self.scan {
            scan.validate()?;
        }

        Ok(())
    }
}

/// Check that an endpoint is an http(s) URL.
pub(crate) fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "endpoint must be an http(s) URL, got '{}'",
            endpoint
        )))
    }
}

/// Remote fetch settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    /// Directory downloads are written to
    pub scratch_dir: Option<String>,

    /// Maximum simultaneous remote fetches
    pub max_concurrent: Option<usize>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Keep verified downloads instead of removing them
    pub keep_downloads: Option<bool>,
}

impl FetchSettings {
    /// Validate fetch settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == Some(0) {
            return Err(ConfigError::InvalidValue(
                "fetch.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Local scan settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSettings {
    /// Objects audited at the same time
    pub object_parallelism: Option<usize>,
}

impl ScanSettings {
    /// Validate scan settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.object_parallelism == Some(0) {
            return Err(ConfigError::InvalidValue(
                "scan.object_parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
