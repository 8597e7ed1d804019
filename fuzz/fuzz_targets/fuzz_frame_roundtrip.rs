// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for frame append/read round trips and index rebuild

#![no_main]

use libfuzzer_sys::fuzz_target;
use recordlog_store::{Log, RecordLog, StoreConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::TempDir::new() else {
        return;
    };
    let path = dir.path().join("records.log");

    // The first byte of each chunk picks the next payload's length.
    let mut payloads = Vec::new();
    let mut rest = data;
    while let Some((&len, tail)) = rest.split_first() {
        let len = (len as usize).min(tail.len());
        let (payload, tail) = tail.split_at(len);
        payloads.push(payload);
        rest = tail;
    }

    {
        let log = Log::open(&path, StoreConfig::default()).unwrap();
        for (expected, payload) in payloads.iter().enumerate() {
            assert_eq!(log.append(payload).unwrap(), expected as i64);
        }
        log.close().unwrap();
    }

    // Reopening must rebuild exactly the same offsets.
    let log = Log::open(&path, StoreConfig::default()).unwrap();
    assert_eq!(log.len(), payloads.len() as u64);
    for (offset, payload) in payloads.iter().enumerate() {
        assert_eq!(log.read(offset as i64).unwrap(), *payload);
    }
    assert!(log.read(payloads.len() as i64).is_err());
});
