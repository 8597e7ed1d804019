// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory record log.
//
// A mutex-guarded vector of payloads. Same offset semantics as the durable
// `Log`, nothing survives a restart. Intended for tests, development and
// ephemeral servers.

use std::sync::{Mutex, MutexGuard};

use crate::backend::{Offset, RecordLog};
use crate::error::{LogError, LogResult};

/// An in-memory record log.
///
/// # Example
///
/// ```rust
/// use recordlog_store::{MemoryLog, RecordLog};
///
/// let log = MemoryLog::new();
/// let offset = log.append(b"hello").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(log.read(offset).unwrap(), b"hello");
/// assert!(log.read(1).unwrap_err().is_offset_out_of_range());
/// ```
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<Vec<u8>>>,
}

impl MemoryLog {
    /// Create a new, empty in-memory log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> LogResult<MutexGuard<'_, Vec<Vec<u8>>>> {
        self.records.lock().map_err(|_| LogError::LockPoisoned)
    }
}

impl RecordLog for MemoryLog {
    fn append(&self, value: &[u8]) -> LogResult<Offset> {
        let mut records = self.lock()?;
        records.push(value.to_vec());
        Ok(records.len() as Offset - 1)
    }

    fn read(&self, offset: Offset) -> LogResult<Vec<u8>> {
        let records = self.lock()?;
        usize::try_from(offset)
            .ok()
            .and_then(|index| records.get(index))
            .cloned()
            .ok_or(LogError::OffsetOutOfRange {
                offset,
                len: records.len() as u64,
            })
    }

    fn len(&self) -> u64 {
        match self.records.lock() {
            Ok(records) => records.len() as u64,
            Err(poisoned) => poisoned.into_inner().len() as u64,
        }
    }

    fn sync(&self) -> LogResult<()> {
        Ok(())
    }

    fn close(&self) -> LogResult<()> {
        Ok(())
    }
}
