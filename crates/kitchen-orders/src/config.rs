//! Startup configuration.
//!
//! Built-in defaults, then `kitchen.toml` (or the file named by `KITCHEN_CONFIG`), then
//! environment variables. Any problem is a [`ConfigError`] and the process does not start.
//!
//! ```toml
//! [store]
//! data_dir = "/var/lib/kitchen/orders"
//! request_timeout_ms = 2000
//! channel_capacity = 32
//!
//! [refresh]
//! interval_secs = 5
//! ```

use crate::journal::JournalError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "KITCHEN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "kitchen.toml";
pub const DATA_DIR_ENV: &str = "KITCHEN_DATA_DIR";
pub const REQUEST_TIMEOUT_ENV: &str = "KITCHEN_REQUEST_TIMEOUT_MS";
pub const REFRESH_ENV: &str = "KITCHEN_REFRESH_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no order data directory configured (set store.data_dir or KITCHEN_DATA_DIR)")]
    MissingDataDir,
    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
    #[error("cannot use order data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: JournalError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    pub data_dir: Option<PathBuf>,
    pub request_timeout_ms: u64,
    pub channel_capacity: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            request_timeout_ms: 2_000,
            channel_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefreshSettings {
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub store: StoreSettings,
    pub refresh: RefreshSettings,
}

impl Settings {
    /// Loads settings from the process environment and the config file.
    ///
    /// An explicit `KITCHEN_CONFIG` file must exist; the default `kitchen.toml` is only read
    /// when present.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            }
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Builds settings from an optional TOML file and an environment lookup.
    pub fn from_sources(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = match file {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str::<Settings>(&raw).map_err(|source| ConfigError::Malformed {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Settings::default(),
        };

        if let Some(dir) = env(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            settings.store.data_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(v) = env(REQUEST_TIMEOUT_ENV) {
            settings.store.request_timeout_ms = parse_number(REQUEST_TIMEOUT_ENV, &v)?;
        }
        if let Some(v) = env(REFRESH_ENV) {
            settings.refresh.interval_secs = parse_number(REFRESH_ENV, &v)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.data_dir.is_none() {
            return Err(ConfigError::MissingDataDir);
        }
        require_positive("store.request_timeout_ms", self.store.request_timeout_ms)?;
        require_positive("store.channel_capacity", self.store.channel_capacity as u64)?;
        require_positive("refresh.interval_secs", self.refresh.interval_secs)?;
        Ok(())
    }

    pub fn data_dir(&self) -> Result<&Path, ConfigError> {
        self.store
            .data_dir
            .as_deref()
            .ok_or(ConfigError::MissingDataDir)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.store.request_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn require_positive(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_with_data_dir_from_env() {
        let settings = Settings::from_sources(None, env(&[(DATA_DIR_ENV, "/tmp/orders")])).unwrap();
        assert_eq!(settings.data_dir().unwrap(), Path::new("/tmp/orders"));
        assert_eq!(settings.refresh_interval(), Duration::from_secs(5));
        assert_eq!(settings.request_timeout(), Duration::from_millis(2_000));
        assert_eq!(settings.store.channel_capacity, 32);
    }

    #[test]
    fn test_missing_data_dir_is_fatal() {
        let result = Settings::from_sources(None, env(&[]));
        assert!(matches!(result, Err(ConfigError::MissingDataDir)));
    }

    #[test]
    fn test_file_then_env_override() {
        let file = config_file(
            "[store]\ndata_dir = \"/srv/orders\"\nrequest_timeout_ms = 750\n\n[refresh]\ninterval_secs = 10\n",
        );
        let settings = Settings::from_sources(Some(file.path()), env(&[])).unwrap();
        assert_eq!(settings.data_dir().unwrap(), Path::new("/srv/orders"));
        assert_eq!(settings.request_timeout(), Duration::from_millis(750));
        assert_eq!(settings.refresh_interval(), Duration::from_secs(10));

        let settings =
            Settings::from_sources(Some(file.path()), env(&[(REFRESH_ENV, "2")])).unwrap();
        assert_eq!(settings.refresh_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_rejects_bad_values() {
        let result = Settings::from_sources(
            None,
            env(&[(DATA_DIR_ENV, "/tmp/orders"), (REFRESH_ENV, "soon")]),
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == REFRESH_ENV));

        let result = Settings::from_sources(
            None,
            env(&[(DATA_DIR_ENV, "/tmp/orders"), (REQUEST_TIMEOUT_ENV, "0")]),
        );
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "store.request_timeout_ms")
        );

        let file = config_file("[store]\ndata_dir = 5\n");
        let result = Settings::from_sources(Some(file.path()), env(&[]));
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));

        let result = Settings::from_sources(Some(Path::new("/nonexistent/kitchen.toml")), env(&[]));
        assert!(matches!(result, Err(ConfigError::Unreadable { .. })));
    }
}
