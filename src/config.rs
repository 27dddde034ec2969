//! Configuration file parser for ~/.config/gather/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown keys are accepted with a logged warning.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. The timing fields are exposed here rather than hard-coded so
/// operators can tune backoff without a rebuild.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite store path.
    pub store_path: String,

    /// Polling tick in seconds: how often the engine wakes to consider a
    /// download cycle.
    pub poll_interval_secs: u64,

    /// Cooldown after a successful cycle before any new attempt.
    pub success_cooldown_secs: u64,

    /// Cooldown after the failure ceiling is reached.
    pub failure_cooldown_secs: u64,

    /// Consecutive exhausted-feed failures that trigger the failure hold.
    pub max_failed_attempts: u32,

    /// Fetch attempts per feed per cycle before counting one failure.
    pub retry_ceiling: u32,

    /// Honor each feed's minimum retrieval interval. Off by default: all
    /// listed feeds are eligible every cycle, limited only by the engine's
    /// own backoff.
    pub feed_expiry_enabled: bool,

    /// How often the consumer loop drains the staging area, in seconds.
    pub consumer_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: "gather.db".to_owned(),
            poll_interval_secs: 2,
            success_cooldown_secs: 300,
            failure_cooldown_secs: 300,
            max_failed_attempts: 9,
            retry_ceiling: 3,
            feed_expiry_enabled: false,
            consumer_interval_secs: 1,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line info
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "store_path",
                "poll_interval_secs",
                "success_cooldown_secs",
                "failure_cooldown_secs",
                "max_failed_attempts",
                "retry_ceiling",
                "feed_expiry_enabled",
                "consumer_interval_secs",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_constants() {
        let config = Config::default();
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.success_cooldown_secs, 300);
        assert_eq!(config.failure_cooldown_secs, 300);
        assert_eq!(config.max_failed_attempts, 9);
        assert_eq!(config.retry_ceiling, 3);
        assert!(!config.feed_expiry_enabled);
    }

    #[test]
    fn missing_file_returns_default() {
        let path = Path::new("/tmp/gather_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.store_path, "gather.db");
    }

    #[test]
    fn empty_file_returns_default() {
        let dir = std::env::temp_dir().join("gather_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "  \n ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.retry_ceiling, 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("gather_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "retry_ceiling = 5\nfeed_expiry_enabled = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.retry_ceiling, 5);
        assert!(config.feed_expiry_enabled);
        assert_eq!(config.max_failed_attempts, 9); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("gather_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn wrong_type_returns_error() {
        let dir = std::env::temp_dir().join("gather_config_test_wrongtype");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "retry_ceiling = \"lots\"\n").unwrap();

        assert!(Config::load(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unknown_keys_accepted() {
        let dir = std::env::temp_dir().join("gather_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "store_path = \"/tmp/x.db\"\ntotally_fake = 1\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store_path, "/tmp/x.db");

        std::fs::remove_dir_all(&dir).ok();
    }
}
