// SPDX-License-Identifier: PMPL-1.0-or-later
//
// recordlog storage engine - Error types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Every failure the engine can produce is a value of `LogError`. Nothing is
// retried internally and nothing terminates the process.

use thiserror::Error;

/// Errors that can occur during store and log operations.
#[derive(Debug, Error)]
pub enum LogError {
    /// An I/O error occurred while opening, reading, writing, flushing or
    /// closing the backing file. Reads past the end of the store surface
    /// here with `ErrorKind::UnexpectedEof`.
    #[error("log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested offset is negative or not yet assigned.
    #[error("offset {offset} out of range (log holds {len} records)")]
    OffsetOutOfRange {
        /// The offset the caller asked for.
        offset: i64,
        /// Number of records in the log when the read was attempted.
        len: u64,
    },

    /// The backing file does not end on a frame boundary. Reported while
    /// rebuilding the offset index; no repair is attempted.
    #[error("truncated frame at position {position} (file length {file_len})")]
    TruncatedFrame {
        /// Start of the incomplete frame.
        position: u64,
        /// Length of the backing file when it was scanned.
        file_len: u64,
    },

    /// An earlier frame write failed part way, so the tail of the backing
    /// file may hold a partial frame. The store refuses further appends;
    /// frames before `position` stay readable.
    #[error("store refuses appends after a failed frame write at position {position}")]
    WriteFailed {
        /// Position the failed frame was meant to start at.
        position: u64,
    },

    /// The store has been closed and its file handle released.
    #[error("store is closed")]
    Closed,

    /// A thread panicked while holding a store or index lock.
    #[error("lock poisoned")]
    LockPoisoned,

    /// A sync mode string could not be parsed.
    #[error("invalid sync mode: {0}")]
    InvalidSyncMode(String),
}

impl LogError {
    /// Returns `true` for the recoverable "no such record" condition, which
    /// transports report as "not found" rather than as a server failure.
    pub fn is_offset_out_of_range(&self) -> bool {
        matches!(self, Self::OffsetOutOfRange { .. })
    }
}

/// Convenience type alias for log results.
pub type LogResult<T> = Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_offset_out_of_range() {
        let error = LogError::OffsetOutOfRange { offset: -1, len: 4 };
        let message = format!("{error}");
        assert!(message.contains("-1"));
        assert!(message.contains("4 records"));
        assert!(error.is_offset_out_of_range());
    }

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file gone");
        let error = LogError::from(io_error);
        let message = format!("{error}");
        assert!(message.contains("file gone"));
        assert!(!error.is_offset_out_of_range());
    }

    #[test]
    fn test_error_display_truncated_frame() {
        let error = LogError::TruncatedFrame {
            position: 21,
            file_len: 25,
        };
        let message = format!("{error}");
        assert!(message.contains("21"));
        assert!(message.contains("25"));
    }

    #[test]
    fn test_error_display_write_failed() {
        let error = LogError::WriteFailed { position: 42 };
        let message = format!("{error}");
        assert!(message.contains("42"));
        assert!(!error.is_offset_out_of_range());
    }
}
