use crate::core::{DirectoryError, Result};
use crate::directory::ValidationPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// SQLite-related configuration.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Database file; an in-memory database is used when absent
    pub path: Option<String>,
    pub journal_mode: Option<String>,
    pub busy_timeout_ms: Option<u64>,
}

/// Directory behaviour configuration.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct DirectoryConfig {
    /// Whether updates and standalone phone additions re-validate formats
    #[serde(default)]
    pub validation: ValidationPolicy,
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// use customer_directory::config::load_config;
///
/// let config = load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| DirectoryError::Config(e.to_string()))
}

/// Default location of the configuration file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("customer-directory").join("config.toml"))
}

/// Loads the configuration at `path`, or the default location when `path`
/// is None. A missing default file yields `Config::default()`.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => match default_config_path() {
            Some(default) if default.exists() => load_config(default),
            _ => Ok(Config::default()),
        },
    }
}
