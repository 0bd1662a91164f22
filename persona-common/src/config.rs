//! Configuration loading and resolution
//!
//! Bootstrap settings are resolved in priority order:
//! 1. Command-line argument / environment variable (highest priority)
//! 2. TOML config file
//! 3. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5780";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://persona.db?mode=rwc";
pub const DEFAULT_AGIFY_URL: &str = "https://api.agify.io";
pub const DEFAULT_GENDERIZE_URL: &str = "https://api.genderize.io";
pub const DEFAULT_NATIONALIZE_URL: &str = "https://api.nationalize.io";
pub const DEFAULT_BRANCH_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_DB_TIMEOUT_MS: u64 = 1000;

/// Settings read from the TOML config file
///
/// Every field is optional; missing fields fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub listen: Option<String>,
    pub database_url: Option<String>,
    pub branch_timeout_ms: Option<u64>,
    pub db_timeout_ms: Option<u64>,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Base URLs of the three prediction services
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupConfig {
    pub agify_url: Option<String>,
    pub genderize_url: Option<String>,
    pub nationalize_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub database_url: Option<String>,
    pub agify_url: Option<String>,
    pub genderize_url: Option<String>,
    pub nationalize_url: Option<String>,
    pub branch_timeout_ms: Option<u64>,
    pub db_timeout_ms: Option<u64>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub listen: String,
    pub database_url: String,
    pub agify_url: String,
    pub genderize_url: String,
    pub nationalize_url: String,
    /// Bound applied to every enrichment branch individually
    pub branch_timeout: Duration,
    /// Database pool acquire timeout
    pub db_timeout: Duration,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides, TOML and compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Result<Self> {
        let branch_timeout_ms = overrides
            .branch_timeout_ms
            .or(toml.branch_timeout_ms)
            .unwrap_or(DEFAULT_BRANCH_TIMEOUT_MS);
        if branch_timeout_ms == 0 {
            return Err(Error::Config(
                "branch timeout must be greater than zero".to_string(),
            ));
        }

        let db_timeout_ms = overrides
            .db_timeout_ms
            .or(toml.db_timeout_ms)
            .unwrap_or(DEFAULT_DB_TIMEOUT_MS);

        Ok(Self {
            listen: pick(overrides.listen, toml.listen, DEFAULT_LISTEN),
            database_url: pick(overrides.database_url, toml.database_url, DEFAULT_DATABASE_URL),
            agify_url: pick(overrides.agify_url, toml.lookup.agify_url, DEFAULT_AGIFY_URL),
            genderize_url: pick(
                overrides.genderize_url,
                toml.lookup.genderize_url,
                DEFAULT_GENDERIZE_URL,
            ),
            nationalize_url: pick(
                overrides.nationalize_url,
                toml.lookup.nationalize_url,
                DEFAULT_NATIONALIZE_URL,
            ),
            branch_timeout: Duration::from_millis(branch_timeout_ms),
            db_timeout: Duration::from_millis(db_timeout_ms),
            log_level: toml.logging.level,
        })
    }
}

fn pick(first: Option<String>, second: Option<String>, default: &str) -> String {
    first
        .filter(|v| !v.trim().is_empty())
        .or(second.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default.to_string())
}

/// Default config file location (`~/.config/persona/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("persona").join("config.toml"))
}

/// TOML settings together with the file they came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// `None` when no file was found and compiled defaults apply
    pub source: Option<PathBuf>,
}

/// Load the TOML config file
///
/// An explicitly requested file must exist. Without one, the default
/// location is tried and a missing file yields compiled defaults.
///
/// Runs before logging is initialised, so nothing is logged here; callers
/// report [`LoadedConfig::source`] once the subscriber is installed.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(LoadedConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    Ok(LoadedConfig {
        config,
        source: Some(path),
    })
}
