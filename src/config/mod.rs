//! Configuration loading and validation.
//!
//! Configuration is a JSON object with `auth`, `connection` and `history`
//! sections. Missing sections and keys take their defaults; the result is
//! validated before it is returned.

pub mod schema;

pub use schema::{HistoryConfig, PluginConfig, StoreFailurePolicy};

use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(std::io::Error),

    /// The configuration is not valid JSON or does not match the schema.
    Parse(serde_json::Error),

    /// The configuration parsed but failed validation.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "Failed to read configuration: {}", err),
            ConfigError::Parse(err) => write!(f, "Failed to parse configuration: {}", err),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Loads configuration from a JSON value.
///
/// `None` yields the default configuration.
///
/// # Example
///
/// ```
/// use rest_plugins::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "auth": [{"type": "header", "key": "X-Api-Key", "value": "abc"}],
///     "history": {"limit": 5}
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.auth.len(), 1);
/// assert_eq!(config.history.limit, 5);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<PluginConfig, ConfigError> {
    let config = match settings_json {
        Some(settings) => serde_json::from_value::<PluginConfig>(settings)?,
        None => PluginConfig::default(),
    };

    config.validate().map_err(ConfigError::Invalid)?;

    Ok(config)
}

/// Loads configuration from a JSON file.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<PluginConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let settings: Value = serde_json::from_str(&contents)?;
    load_config(Some(settings))
}
