//! History pipeline configuration with layered loading.
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: hardcoded below
//! 2. **Config file**: TOML file, path from the `ANNAL_CONFIG` env var
//! 3. **Environment variables**: `ANNAL__*` overrides with `__` separators
//!    (e.g. `ANNAL__WRITE_PATH_URL=http://loki:3100`)
//!
//! Configuration is validated at load time; invalid values (empty URLs,
//! zero timeouts) return errors rather than failing at the first request.
//!
//! # Example
//!
//! ```toml
//! write_path_url = "http://loki-write:3100"
//! read_path_url = "http://loki-read:3100"
//! tenant_id = "org-12"
//! request_timeout_seconds = 10
//!
//! [external_labels]
//! cluster = "prod-1"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Settings for the remote log store used as the history backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Base URL of the store's write path. Must start with `http`.
    pub write_path_url: String,

    /// Base URL of the store's read path. Must start with `http`. May equal
    /// the write path for single-binary deployments.
    pub read_path_url: String,

    /// Tenant to scope requests to on multi-tenant stores, sent as the
    /// `X-Scope-OrgID` header when set.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Username for HTTP basic authentication, if the store requires it.
    #[serde(default)]
    pub basic_auth_user: Option<String>,

    /// Password for HTTP basic authentication.
    #[serde(default)]
    pub basic_auth_password: Option<String>,

    /// Deadline for one write or read operation in seconds. Must be greater
    /// than 0. Defaults to `30`.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Maximum number of entries requested per range query. Must be greater
    /// than 0. Defaults to `500`.
    #[serde(default = "default_max_query_entries")]
    pub max_query_entries: u32,

    /// Static labels attached to every written stream, e.g. a cluster name.
    #[serde(default)]
    pub external_labels: BTreeMap<String, String>,
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_max_query_entries() -> u32 {
    500
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            write_path_url: "http://localhost:3100".to_string(),
            read_path_url: "http://localhost:3100".to_string(),
            tenant_id: None,
            basic_auth_user: None,
            basic_auth_password: None,
            request_timeout_seconds: default_request_timeout_seconds(),
            max_query_entries: default_max_query_entries(),
            external_labels: BTreeMap::new(),
        }
    }
}

impl HistoryConfig {
    /// Loads configuration from a TOML file with environment overrides.
    ///
    /// Environment variables with the `ANNAL__` prefix can override any
    /// value, using `__` as the separator for nested fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("write_path_url", "http://localhost:3100")?
            .set_default("read_path_url", "http://localhost:3100")?
            .set_default("request_timeout_seconds", 30)?
            .set_default("max_query_entries", 500)?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("ANNAL").separator("__"))
            .build()?;

        builder.try_deserialize()
    }

    /// Loads configuration from `config/annal.toml` with fallback to
    /// defaults; the path can be overridden with the `ANNAL_CONFIG` env var.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("ANNAL_CONFIG").unwrap_or_else(|_| "config/annal.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Validates the configuration for correctness.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.write_path_url.is_empty() {
            return Err("Write path URL must not be empty".to_string());
        }
        if !self.write_path_url.starts_with("http") {
            return Err(format!("Invalid write path URL: {}", self.write_path_url));
        }
        if self.read_path_url.is_empty() {
            return Err("Read path URL must not be empty".to_string());
        }
        if !self.read_path_url.starts_with("http") {
            return Err(format!("Invalid read path URL: {}", self.read_path_url));
        }
        if self.request_timeout_seconds == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.max_query_entries == 0 {
            return Err("Max query entries must be greater than 0".to_string());
        }
        for key in self.external_labels.keys() {
            if key.starts_with("__") {
                return Err(format!("External label key must not be private: {key}"));
            }
        }
        Ok(())
    }

    /// Returns the per-operation deadline as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
