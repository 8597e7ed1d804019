// SPDX-License-Identifier: PMPL-1.0-or-later
//
// recordlog storage engine - Offset index over a store
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The `Log` maps logical offsets to frame positions in its `Store`. The
// mapping lives in memory and is rebuilt from the frame prefixes whenever a
// log is opened, so the store file is the only thing that has to be durable.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::backend::{Offset, RecordLog};
use crate::config::StoreConfig;
use crate::error::{LogError, LogResult};
use crate::frame::{decode_len, frame_size, LEN_WIDTH};
use crate::store::Store;

/// Location of one record inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexEntry {
    /// Start of the record's frame.
    position: u64,
    /// Payload length in bytes.
    len: u64,
}

/// A durable record log: a [`Store`] plus an offset index.
///
/// The index lock is held for the whole of every append and read, and is
/// always taken before the store's own lock. Two appends are therefore fully
/// serialized, which keeps offset assignment gap-free.
pub struct Log {
    store: Store,
    entries: Mutex<Vec<IndexEntry>>,
}

impl Log {
    /// Open (or create) the store file at `path` and rebuild its index.
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> LogResult<Self> {
        Self::with_store(Store::open(path, &config)?)
    }

    /// Wrap an open store, rebuilding the offset index from its frames.
    ///
    /// Fails with [`LogError::TruncatedFrame`] if the store does not end on
    /// a frame boundary.
    pub fn with_store(store: Store) -> LogResult<Self> {
        let entries = rebuild_index(&store)?;

        info!(
            path = %store.path().display(),
            records = entries.len(),
            size = store.size(),
            "Rebuilt offset index"
        );

        Ok(Self {
            store,
            entries: Mutex::new(entries),
        })
    }

    /// Size in bytes of the underlying store.
    pub fn store_size(&self) -> u64 {
        self.store.size()
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    fn lock_entries(&self) -> LogResult<MutexGuard<'_, Vec<IndexEntry>>> {
        self.entries.lock().map_err(|_| LogError::LockPoisoned)
    }
}

impl RecordLog for Log {
    /// Append `value` and return its offset.
    ///
    /// A record whose frame reached the store is indexed even when the sync
    /// policy then fails; the sync error is returned, and the record stays
    /// readable at the next offset so the index and store never disagree.
    fn append(&self, value: &[u8]) -> LogResult<Offset> {
        let mut entries = self.lock_entries()?;
        let offset = entries.len() as Offset;

        let appended = self.store.append_frame(value)?;
        entries.push(IndexEntry {
            position: appended.position,
            len: value.len() as u64,
        });

        debug!(offset, position = appended.position, "Appended record");

        appended.synced.map(|()| offset)
    }

    fn read(&self, offset: Offset) -> LogResult<Vec<u8>> {
        let entries = self.lock_entries()?;

        let entry = usize::try_from(offset)
            .ok()
            .and_then(|index| entries.get(index))
            .copied()
            .ok_or(LogError::OffsetOutOfRange {
                offset,
                len: entries.len() as u64,
            })?;

        let value = self.store.read(entry.position)?;
        debug_assert_eq!(value.len() as u64, entry.len);

        Ok(value)
    }

    fn len(&self) -> u64 {
        match self.entries.lock() {
            Ok(entries) => entries.len() as u64,
            Err(poisoned) => poisoned.into_inner().len() as u64,
        }
    }

    fn sync(&self) -> LogResult<()> {
        let _entries = self.lock_entries()?;
        self.store.sync()
    }

    fn close(&self) -> LogResult<()> {
        let _entries = self.lock_entries()?;
        self.store.close()
    }
}

/// Walk the store's frame prefixes from position 0 and record where each
/// frame starts.
fn rebuild_index(store: &Store) -> LogResult<Vec<IndexEntry>> {
    let file_len = store.size();
    let mut entries = Vec::new();
    let mut position = 0u64;

    while position < file_len {
        let remaining = file_len - position;
        if remaining < LEN_WIDTH {
            warn!(position, file_len, "Store ends inside a length prefix");
            return Err(LogError::TruncatedFrame { position, file_len });
        }

        let mut prefix = [0u8; LEN_WIDTH as usize];
        store.read_at(&mut prefix, position)?;
        let len = decode_len(prefix);

        let frame = match frame_size(len) {
            Some(frame) if frame <= remaining => frame,
            _ => {
                warn!(position, len, file_len, "Store ends inside a payload");
                return Err(LogError::TruncatedFrame { position, file_len });
            }
        };

        entries.push(IndexEntry { position, len });
        position += frame;
    }

    Ok(entries)
}
