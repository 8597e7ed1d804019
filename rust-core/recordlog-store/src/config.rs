// SPDX-License-Identifier: PMPL-1.0-or-later
//
// recordlog storage engine - Store configuration
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::str::FromStr;
use std::time::Duration;

use crate::error::LogError;

/// Default capacity of the store's write buffer, in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

// ---------------------------------------------------------------------------
// SyncMode
// ---------------------------------------------------------------------------

/// Controls when the store pushes buffered frames to stable storage.
///
/// Regardless of mode, a read always flushes the buffer first, so readers in
/// the same process observe every completed append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Leave frames in the write buffer until a read, `sync()` or `close()`
    /// flushes them. Highest throughput; unflushed frames are lost on crash.
    #[default]
    Buffered,

    /// Flush and `fsync` after every append.
    Fsync,

    /// Flush and `fsync` at most once per interval, checked on append.
    Periodic(Duration),
}

impl FromStr for SyncMode {
    type Err = LogError;

    /// Accepts `buffered`, `fsync` or `periodic:<millis>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "buffered" => Ok(Self::Buffered),
            "fsync" => Ok(Self::Fsync),
            other => other
                .strip_prefix("periodic:")
                .and_then(|millis| millis.parse::<u64>().ok())
                .map(|millis| Self::Periodic(Duration::from_millis(millis)))
                .ok_or_else(|| LogError::InvalidSyncMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for a [`crate::Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Durability policy applied after each append.
    pub sync_mode: SyncMode,
    /// Capacity of the write buffer in bytes.
    pub buffer_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sync_mode: SyncMode::Buffered,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_modes() {
        assert_eq!("buffered".parse::<SyncMode>().unwrap(), SyncMode::Buffered);
        assert_eq!(" FSYNC ".parse::<SyncMode>().unwrap(), SyncMode::Fsync);
        assert_eq!(
            "periodic:250".parse::<SyncMode>().unwrap(),
            SyncMode::Periodic(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_parse_invalid_sync_mode() {
        for input in ["", "always", "periodic:", "periodic:soon"] {
            match input.parse::<SyncMode>() {
                Err(LogError::InvalidSyncMode(_)) => {}
                other => panic!("Expected InvalidSyncMode for {input:?}, got: {other:?}"),
            }
        }
    }

    #[test]
    fn test_default_config_is_buffered() {
        let config = StoreConfig::default();
        assert_eq!(config.sync_mode, SyncMode::Buffered);
        assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    }
}
