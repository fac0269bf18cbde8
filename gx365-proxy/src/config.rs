use std::path::Path;
use std::time::Duration;

use gx365_common::track_id::DEFAULT_TEST_MARKER;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Release settings and the storage backend, loaded from YAML.
#[derive(Clone, Deserialize)]
pub struct ReleaseConfig {
    /// The calendar year tracks unlock over, one per UTC day.
    #[serde(default = "default_release_year")]
    pub release_year: i32,
    /// Keys containing this (any case) skip the release date check.
    #[serde(default = "default_test_marker")]
    pub test_marker: String,
    /// How long a resolved `/tracks.json` may be reused. 0 disables caching.
    #[serde(default = "default_mapping_cache_secs")]
    pub mapping_cache_secs: u64,
    pub storage: StorageConfig,
}

#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_release_year() -> i32 {
    2026
}

fn default_test_marker() -> String {
    DEFAULT_TEST_MARKER.to_string()
}

fn default_mapping_cache_secs() -> u64 {
    3600
}

fn default_timeout_secs() -> u64 {
    30
}

impl ReleaseConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: ReleaseConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.test_marker.trim().is_empty() {
            return Err(ConfigError::Invalid("test_marker must not be empty".into()));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.bucket must not be empty".into()));
        }
        if self.storage.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "storage.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn mapping_cache_ttl(&self) -> Option<Duration> {
        (self.mapping_cache_secs > 0).then(|| Duration::from_secs(self.mapping_cache_secs))
    }
}
