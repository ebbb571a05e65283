//! Configuration schema for the auth and history plugins.
//!
//! All keys are camelCase. Missing keys fall back to the defaults below.

use crate::auth::{AuthKind, AuthParameter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level plugin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// Auth parameters applied to every request, in order.
    #[serde(default)]
    pub auth: Vec<AuthParameter>,

    /// Connection-specific values substituted for `:name` placeholders in
    /// the auth parameters.
    #[serde(default)]
    pub connection: HashMap<String, String>,

    /// History recorder settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// What the history recorder does when the external store write fails.
///
/// The transaction is added to the local history either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreFailurePolicy {
    /// Log a warning and keep going with local history only.
    #[default]
    LocalOnly,
    /// Return the store error to the caller.
    Propagate,
}

/// History recorder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of transactions kept in memory. Defaults to 10.
    ///
    /// Must be > 0.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Expiry applied to the external collection on every write, in seconds.
    /// Defaults to 86400 (one day).
    ///
    /// Must be > 0.
    #[serde(default = "default_expire_seconds")]
    pub expire_seconds: u64,

    /// Key of the external collection. Defaults to `history:<uuid>`.
    #[serde(default = "default_record_id")]
    pub record_id: String,

    #[serde(default)]
    pub store_failure_policy: StoreFailurePolicy,

    /// Attempts per store write before giving up. Defaults to 1.
    ///
    /// Must be > 0.
    #[serde(default = "default_store_attempts")]
    pub store_attempts: u32,

    /// Redis server URL. Without one, history is mirrored to an in-process
    /// store.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Timeout for connecting to the store and for each store command, in
    /// milliseconds. Defaults to 2000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            expire_seconds: default_expire_seconds(),
            record_id: default_record_id(),
            store_failure_policy: StoreFailurePolicy::default(),
            store_attempts: default_store_attempts(),
            redis_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl HistoryConfig {
    /// Returns the store timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

impl PluginConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive message.
    pub fn validate(&self) -> Result<(), String> {
        for (index, param) in self.auth.iter().enumerate() {
            match param.kind {
                AuthKind::Query | AuthKind::Header if param.key.trim().is_empty() => {
                    return Err(format!("auth[{}]: key must not be empty", index));
                }
                _ => {}
            }
        }

        let history = &self.history;
        if history.limit == 0 {
            return Err("history.limit must be greater than 0".to_string());
        }
        if history.expire_seconds == 0 {
            return Err("history.expireSeconds must be greater than 0".to_string());
        }
        if history.store_attempts == 0 {
            return Err("history.storeAttempts must be greater than 0".to_string());
        }
        if history.record_id.trim().is_empty() {
            return Err("history.recordId must not be empty".to_string());
        }
        if history.timeout_ms == 0 {
            return Err("history.timeoutMs must be greater than 0".to_string());
        }

        Ok(())
    }
}

// Default value functions for serde

fn default_limit() -> usize {
    10
}

fn default_expire_seconds() -> u64 {
    86_400
}

fn default_record_id() -> String {
    format!("history:{}", uuid::Uuid::new_v4())
}

fn default_store_attempts() -> u32 {
    1
}

fn default_timeout_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PluginConfig::default();
        assert!(config.auth.is_empty());
        assert_eq!(config.history.limit, 10);
        assert_eq!(config.history.expire_seconds, 86_400);
        assert_eq!(config.history.store_attempts, 1);
        assert_eq!(
            config.history.store_failure_policy,
            StoreFailurePolicy::LocalOnly
        );
        assert!(config.history.record_id.starts_with("history:"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_record_ids_are_unique() {
        assert_ne!(
            HistoryConfig::default().record_id,
            HistoryConfig::default().record_id
        );
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = PluginConfig::default();
        config.history.limit = 0;
        assert!(config.validate().unwrap_err().contains("limit"));
    }

    #[test]
    fn test_validate_rejects_zero_expire() {
        let mut config = PluginConfig::default();
        config.history.expire_seconds = 0;
        assert!(config.validate().unwrap_err().contains("expireSeconds"));
    }

    #[test]
    fn test_validate_rejects_empty_header_name() {
        let mut config = PluginConfig::default();
        config.auth.push(AuthParameter::header(" ", "abc"));
        assert!(config.validate().unwrap_err().starts_with("auth[0]"));
    }

    #[test]
    fn test_validate_allows_unknown_kind_with_empty_key() {
        let mut config = PluginConfig::default();
        config.auth.push(AuthParameter::new(AuthKind::Unknown, "", ""));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: PluginConfig = serde_json::from_str(
            r#"{"history": {"expireSeconds": 60, "storeFailurePolicy": "propagate", "recordId": "h1"}}"#,
        )
        .unwrap();

        assert_eq!(config.history.expire_seconds, 60);
        assert_eq!(
            config.history.store_failure_policy,
            StoreFailurePolicy::Propagate
        );
        assert_eq!(config.history.record_id, "h1");
        assert_eq!(config.history.limit, 10);
    }
}
