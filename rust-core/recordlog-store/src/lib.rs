// SPDX-License-Identifier: PMPL-1.0-or-later
//
// recordlog storage engine
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A single-file, append-only record log. Records are opaque byte payloads
// addressed by a zero-based, gap-free logical offset.
//
// # Architecture
//
// Two layers, each behind its own mutex:
//
// - [`Store`] owns the backing file and its write buffer. It appends
//   length-prefixed frames and serves position-addressed reads.
// - [`Log`] maps logical offsets to frame positions and is the public
//   produce/consume surface. Lock order is always Log, then Store.
//
// ## On-disk frame format
//
// ```text
// [8 bytes: payload length (u64, big-endian)]
// [N bytes: payload]
// ```
//
// There is no file header, no checksum and no delimiter beyond the length
// prefix. The offset index is not persisted separately; it is rebuilt from
// the frame prefixes when a log is opened.
//
// ## Usage
//
// ```no_run
// use recordlog_store::{Log, RecordLog, StoreConfig};
//
// let log = Log::open("/tmp/recordlog/records.log", StoreConfig::default()).unwrap();
// let offset = log.append(b"Hello, World!").unwrap();
// assert_eq!(log.read(offset).unwrap(), b"Hello, World!");
// log.close().unwrap();
// ```

pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod log;
pub mod memory;
pub mod store;

// Re-export the primary public API for ergonomic imports.
pub use backend::{Offset, RecordLog};
pub use config::{StoreConfig, SyncMode, DEFAULT_BUFFER_CAPACITY};
pub use error::{LogError, LogResult};
pub use frame::LEN_WIDTH;
pub use log::Log;
pub use memory::MemoryLog;
pub use store::Store;
