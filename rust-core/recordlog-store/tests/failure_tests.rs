// SPDX-License-Identifier: PMPL-1.0-or-later
//! I/O failures must leave the offset index and the store in agreement.
//!
//! `/dev/full` stands in for a full disk: it opens like a regular file and
//! fails every write that reaches it with `ENOSPC`.
#![cfg(target_os = "linux")]

use std::path::Path;

use recordlog_store::{Log, LogError, RecordLog, StoreConfig, SyncMode, LEN_WIDTH};

const TEST_DATA: &[u8] = b"Hello, World!";
const FRAME: u64 = TEST_DATA.len() as u64 + LEN_WIDTH;

fn open_full_log(config: StoreConfig) -> Option<Log> {
    let path = Path::new("/dev/full");
    if !path.exists() {
        return None;
    }
    Some(Log::open(path, config).unwrap())
}

#[test]
fn test_sync_failure_still_indexes_record() {
    let config = StoreConfig {
        sync_mode: SyncMode::Fsync,
        ..StoreConfig::default()
    };
    let Some(log) = open_full_log(config) else {
        return;
    };

    for appended in 1..=3u64 {
        assert!(matches!(log.append(TEST_DATA), Err(LogError::Io(_))));
        assert_eq!(log.len(), appended);
        assert_eq!(log.store_size(), FRAME * appended);
    }
}

#[test]
fn test_failed_frame_write_is_not_indexed() {
    let config = StoreConfig {
        buffer_capacity: 8,
        ..StoreConfig::default()
    };
    let Some(log) = open_full_log(config) else {
        return;
    };

    assert!(matches!(log.append(&[1u8; 100]), Err(LogError::Io(_))));
    assert_eq!(log.len(), 0);
    assert_eq!(log.store_size(), 0);

    // A small frame would fit in the buffer, but the store no longer trusts
    // its tail.
    assert!(matches!(
        log.append(b"x"),
        Err(LogError::WriteFailed { position: 0 })
    ));
    assert_eq!(log.len(), 0);
    assert_eq!(log.store_size(), 0);
}

#[test]
fn test_failed_close_can_be_retried() {
    let Some(log) = open_full_log(StoreConfig::default()) else {
        return;
    };
    assert_eq!(log.append(TEST_DATA).unwrap(), 0);

    assert!(matches!(log.close(), Err(LogError::Io(_))));
    assert!(matches!(log.close(), Err(LogError::Io(_))));

    // The log was not marked closed, so appends keep their offsets.
    assert_eq!(log.append(TEST_DATA).unwrap(), 1);
    assert_eq!(log.store_size(), FRAME * 2);
}
