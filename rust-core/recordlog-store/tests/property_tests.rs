// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for the store and the offset index

use proptest::prelude::*;
use recordlog_store::{Log, RecordLog, Store, StoreConfig, LEN_WIDTH};
use tempfile::TempDir;

/// Generate arbitrary payloads, including empty ones
fn arb_payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..512), 1..32)
}

proptest! {
    #[test]
    fn test_offsets_are_gap_free_and_round_trip(payloads in arb_payloads()) {
        let dir = TempDir::new().unwrap();
        let log = Log::open(dir.path().join("records.log"), StoreConfig::default()).unwrap();

        for (expected, payload) in payloads.iter().enumerate() {
            prop_assert_eq!(log.append(payload).unwrap(), expected as i64);
        }

        for (offset, payload) in payloads.iter().enumerate() {
            prop_assert_eq!(&log.read(offset as i64).unwrap(), payload);
        }

        let n = payloads.len() as i64;
        prop_assert!(log.read(n).unwrap_err().is_offset_out_of_range());
        prop_assert!(log.read(-1).unwrap_err().is_offset_out_of_range());
    }

    #[test]
    fn test_positions_and_size_accounting(payloads in arb_payloads()) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store.log"), &StoreConfig::default()).unwrap();

        let mut expected_position = 0u64;
        for payload in &payloads {
            let (written, position) = store.append(payload).unwrap();
            prop_assert_eq!(position, expected_position);
            prop_assert_eq!(written, LEN_WIDTH + payload.len() as u64);
            expected_position += written;
        }

        let total: u64 = payloads.iter().map(|p| LEN_WIDTH + p.len() as u64).sum();
        prop_assert_eq!(store.size(), total);
    }

    #[test]
    fn test_reopen_preserves_records(
        before in arb_payloads(),
        extra in prop::collection::vec(any::<u8>(), 0..64)
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.log");

        let size_before = {
            let log = Log::open(&path, StoreConfig::default()).unwrap();
            for payload in &before {
                log.append(payload).unwrap();
            }
            log.close().unwrap();
            log.store_size()
        };

        let log = Log::open(&path, StoreConfig::default()).unwrap();
        prop_assert_eq!(log.len(), before.len() as u64);

        let offset = log.append(&extra).unwrap();
        prop_assert_eq!(offset, before.len() as i64);
        prop_assert_eq!(log.store_size(), size_before + LEN_WIDTH + extra.len() as u64);

        for (offset, payload) in before.iter().enumerate() {
            prop_assert_eq!(&log.read(offset as i64).unwrap(), payload);
        }
        prop_assert_eq!(log.read(offset).unwrap(), extra);
    }
}
