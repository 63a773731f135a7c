//! Configuration module for the overlay resolution cache.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `STRATA_` and use double
//! underscores to separate nested levels:
//! - `STRATA_CACHING=false` sets `caching`
//! - `STRATA_INDEXED_SUBTREE=layouts` sets `indexed_subtree`
//! - `STRATA_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "strata.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Ordered overlay root directories. Position defines precedence:
    /// a lower index wins when multiple roots provide the same resource.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Name of the directory under each root whose contents are indexed.
    /// An empty string indexes the whole root.
    #[serde(default = "default_indexed_subtree")]
    pub indexed_subtree: String,

    /// Whether the live cache is enabled. When false, the disabled service
    /// is installed and query operations are rejected.
    #[serde(default = "default_true")]
    pub caching: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log level defaults and per-module overrides.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `registrar = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_indexed_subtree() -> String {
    "layouts".to_string()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            roots: Vec::new(),
            indexed_subtree: default_indexed_subtree(),
            caching: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, `strata.toml`, and environment.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("STRATA_").split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Load settings from a specific TOML file (plus environment overrides).
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("STRATA_").split("__"))
            .extract()
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.caching);
        assert!(settings.roots.is_empty());
        assert_eq!(settings.indexed_subtree, "layouts");
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("strata.toml");
        std::fs::write(
            &config_path,
            r#"
roots = ["/srv/app/workspace", "/srv/app/defaults"]
indexed_subtree = "layouts"
caching = false

[logging]
default = "info"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.roots.len(), 2);
        assert_eq!(settings.roots[0], PathBuf::from("/srv/app/workspace"));
        assert!(!settings.caching);
        assert_eq!(settings.logging.default, "info");
    }
}
