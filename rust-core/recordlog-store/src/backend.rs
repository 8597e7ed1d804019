// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Record log trait consumed by transports.
//
// Defines the `RecordLog` trait: append a payload and receive its offset,
// or read a payload back by offset. Implementations are synchronous and
// blocking, and must be safe to share across threads.

use crate::error::LogResult;

/// Logical, zero-based, gap-free record sequence number.
///
/// Signed so that a transport can pass a caller-supplied negative value
/// straight through and get [`crate::LogError::OffsetOutOfRange`] back.
pub type Offset = i64;

/// An append-only log of opaque byte records.
///
/// Offsets are assigned in strictly increasing order starting at 0 with no
/// gaps. Concurrent appends are serialized; each caller receives the offset
/// matching its place in that order.
pub trait RecordLog: Send + Sync {
    /// Append `value` and return the offset assigned to it.
    fn append(&self, value: &[u8]) -> LogResult<Offset>;

    /// Read the payload stored at `offset`.
    ///
    /// Fails with `OffsetOutOfRange` if `offset < 0` or
    /// `offset >= self.len()`.
    fn read(&self, offset: Offset) -> LogResult<Vec<u8>>;

    /// Number of records appended so far.
    fn len(&self) -> u64;

    /// Returns `true` if no record has been appended.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push every appended record to stable storage.
    fn sync(&self) -> LogResult<()>;

    /// Flush and release underlying resources.
    fn close(&self) -> LogResult<()>;
}
