// SPDX-License-Identifier: PMPL-1.0-or-later
//! Server configuration.
//!
//! Read from the environment:
//! - `RECORDLOG_HOST` (default `0.0.0.0`)
//! - `RECORDLOG_PORT` (default `8080`)
//! - `RECORDLOG_DATA_PATH`: store file; unset keeps records in memory only
//! - `RECORDLOG_SYNC`: `buffered` (default), `fsync` or `periodic:<millis>`
//! - `RECORDLOG_BUFFER_CAPACITY`: write buffer size in bytes (default 4096)

use std::path::PathBuf;

use recordlog_store::{StoreConfig, SyncMode};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Backing store file; `None` selects the in-memory log
    pub data_path: Option<PathBuf>,
    /// Store tuning
    pub store: StoreConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_path: None,
            store: StoreConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Build a configuration from `RECORDLOG_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("RECORDLOG_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("RECORDLOG_PORT") {
            config.port = parse("RECORDLOG_PORT", port, |v| v.parse().ok())?;
        }
        if let Some(path) = lookup("RECORDLOG_DATA_PATH").filter(|p| !p.is_empty()) {
            config.data_path = Some(PathBuf::from(path));
        }
        if let Some(mode) = lookup("RECORDLOG_SYNC") {
            config.store.sync_mode =
                parse("RECORDLOG_SYNC", mode, |v| v.parse::<SyncMode>().ok())?;
        }
        if let Some(capacity) = lookup("RECORDLOG_BUFFER_CAPACITY") {
            config.store.buffer_capacity =
                parse("RECORDLOG_BUFFER_CAPACITY", capacity, |v| v.parse().ok())?;
        }

        Ok(config)
    }

    /// `host:port` string to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(
    key: &'static str,
    value: String,
    parser: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    parser(value.trim()).ok_or(ConfigError::InvalidValue { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.data_path.is_none());
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_reads_all_keys() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("RECORDLOG_HOST", "127.0.0.1"),
            ("RECORDLOG_PORT", "9092"),
            ("RECORDLOG_DATA_PATH", "/var/lib/recordlog/records.log"),
            ("RECORDLOG_SYNC", "periodic:100"),
            ("RECORDLOG_BUFFER_CAPACITY", "65536"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9092");
        assert_eq!(
            config.data_path,
            Some(PathBuf::from("/var/lib/recordlog/records.log"))
        );
        assert_eq!(
            config.store.sync_mode,
            SyncMode::Periodic(Duration::from_millis(100))
        );
        assert_eq!(config.store.buffer_capacity, 65536);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = ApiConfig::from_lookup(lookup(&[("RECORDLOG_PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "RECORDLOG_PORT",
                value: "eighty".to_string()
            }
        );

        assert!(ApiConfig::from_lookup(lookup(&[("RECORDLOG_SYNC", "sometimes")])).is_err());
    }
}
