//! Client configuration and retry defaults.
//!
//! [`ClientConfig`] is what callers hand to the client; every field has a
//! documented default. [`RetryPolicy`] folds the timing knobs into one
//! immutable value the request engine reads per call.
//!
//! The CLI persists the configuration as TOML at
//! `~/.config/organisely/config.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{default_user_agent, API_BASE_URL};
use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 30_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Client configuration.
///
/// Serialized to/from TOML by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bearer token sent with every request when set.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Fallback user for endpoints scoped to a user.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Static headers merged into every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    API_BASE_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_retries() -> u32 {
    DEFAULT_RETRIES
}
fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            user_id: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            user_agent: default_user_agent(),
            headers: BTreeMap::new(),
        }
    }
}

/// Timing and retry knobs for the request engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Deadline for a single attempt.
    pub timeout: Duration,
    /// Retries after the first attempt; a call makes at most `max_retries + 1` attempts.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub retry_delay: Duration,
    pub backoff_multiplier: f64,
    /// Upper bound for any single delay.
    pub max_retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_retry_delay: Duration::from_millis(DEFAULT_MAX_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            ..Self::default()
        }
    }

    /// Delay to wait before attempt number `attempt` (1-based retry index).
    ///
    /// `retry_delay * backoff_multiplier^(attempt - 1)`, capped at `max_retry_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_ms = self.retry_delay.as_millis() as f64;
        let cap_ms = self.max_retry_delay.as_millis() as f64;
        let delay_ms = (base_ms * self.backoff_multiplier.powi(exponent)).min(cap_ms);
        Duration::from_millis(delay_ms.max(0.0) as u64)
    }
}

/// Returns `~/.config/organisely[-dev]/` based on ORGANISELY_ENV.
///
/// Set ORGANISELY_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ORGANISELY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("organisely-dev")
    } else {
        base_dir.join("organisely")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

impl ClientConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default location of the persisted configuration.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Apply `ORGANISELY_API_KEY`, `ORGANISELY_BASE_URL` and `ORGANISELY_USER_ID`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("ORGANISELY_API_KEY").filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("ORGANISELY_BASE_URL").filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(user) = lookup("ORGANISELY_USER_ID").filter(|v| !v.is_empty()) {
            self.user_id = Some(user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn config_default_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url, "https://api.organisely.com/v1");
        assert_eq!(cfg.timeout_ms, 30_000);
        assert_eq!(cfg.retries, 3);
        assert_eq!(cfg.retry_delay_ms, 1_000);
        assert_eq!(cfg.user_agent, "Organisely-SDK/1.0.0");
        assert!(cfg.api_key.is_none());
        assert!(cfg.headers.is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: ClientConfig = toml::from_str(indoc! {r#"
            api_key = "sk_test"
            retries = 5

            [headers]
            X-Team = "core"
        "#})
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("sk_test"));
        assert_eq!(cfg.retries, 5);
        assert_eq!(cfg.timeout_ms, 30_000);
        assert_eq!(cfg.headers.get("X-Team").map(String::as_str), Some("core"));
    }

    #[test]
    fn retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.retry_delay, Duration::from_secs(1));
        assert_eq!(policy.backoff_multiplier, 2.0);
        assert_eq!(policy.max_retry_delay, Duration::from_secs(30));
    }

    #[test]
    fn delay_doubles_then_caps() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=7).map(|a| policy.delay_for(a).as_millis() as u64).collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000]);
    }

    #[test]
    fn delay_survives_huge_attempt_numbers() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn policy_from_config_keeps_backoff_defaults() {
        let cfg = ClientConfig {
            timeout_ms: 500,
            retries: 1,
            retry_delay_ms: 10,
            ..ClientConfig::default()
        };
        let policy = RetryPolicy::from_config(&cfg);
        assert_eq!(policy.timeout, Duration::from_millis(500));
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.retry_delay, Duration::from_millis(10));
        assert_eq!(policy.backoff_multiplier, 2.0);
    }

    #[test]
    fn get_and_set_by_key() {
        let mut cfg = ClientConfig::default();
        assert_eq!(cfg.get("retries").as_deref(), Some("3"));
        assert!(cfg.get("api_key").is_none());

        cfg.set("api_key", "sk_live").unwrap();
        cfg.set("retries", "7").unwrap();
        cfg.set("headers", r#"{"X-Env":"staging"}"#).unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("sk_live"));
        assert_eq!(cfg.retries, 7);
        assert_eq!(cfg.get("headers.X-Env").as_deref(), Some("staging"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_number() {
        let mut cfg = ClientConfig::default();
        assert!(matches!(cfg.set("nope", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("timeout_ms", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn env_overrides_ignore_empty_values() {
        let mut cfg = ClientConfig::default();
        cfg.apply_overrides_from(|name| match name {
            "ORGANISELY_API_KEY" => Some("sk_env".to_string()),
            "ORGANISELY_USER_ID" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.api_key.as_deref(), Some("sk_env"));
        assert!(cfg.user_id.is_none());
        assert_eq!(cfg.base_url, API_BASE_URL);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = ClientConfig::load_from(&path).unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = ClientConfig::default();
        cfg.user_id = Some("user_42".to_string());
        cfg.headers.insert("X-Trace".to_string(), "on".to_string());
        cfg.save_to(&path).unwrap();

        let loaded = ClientConfig::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "retries = \"many\"").unwrap();

        assert!(matches!(
            ClientConfig::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
