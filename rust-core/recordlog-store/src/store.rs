// SPDX-License-Identifier: PMPL-1.0-or-later
//
// recordlog storage engine - Record store
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The `Store` owns a single append-only backing file. Appends go through a
// write buffer; every read flushes that buffer first so it observes all
// completed appends. A single mutex serializes every operation, so no reader
// ever sees a torn frame and `size` bookkeeping never races.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{StoreConfig, SyncMode};
use crate::error::{LogError, LogResult};
use crate::frame::{decode_len, encode_frame, LEN_WIDTH};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Durable, sequential, length-framed byte storage with positional reads.
///
/// The store has no notion of logical offsets; it hands out byte positions.
/// Positions passed back to [`Store::read`] must be frame starts previously
/// returned by [`Store::append`].
pub struct Store {
    /// Path of the backing file.
    path: PathBuf,

    /// Durability policy applied after each append.
    sync_mode: SyncMode,

    /// Buffer, file handle and size, guarded together.
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    /// `None` once the store has been closed.
    writer: Option<BufWriter<File>>,

    /// Bytes written so far, including buffered bytes. Also the position of
    /// the next frame.
    size: u64,

    /// Last time the buffer was flushed and fsynced (for `SyncMode::Periodic`).
    last_sync: Instant,

    /// Start of a frame whose write failed. Set once; appends are refused
    /// from then on.
    failed_at: Option<u64>,
}

/// A frame that reached the store, and the outcome of the sync policy run
/// after it.
pub(crate) struct Appended {
    pub(crate) bytes_written: u64,
    pub(crate) position: u64,
    pub(crate) synced: LogResult<()>,
}

impl Store {
    /// Open the backing file at `path`, creating it (and any missing parent
    /// directories) if needed.
    ///
    /// The initial size is the file's current length, so a previously
    /// written store resumes appending at its end.
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> LogResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!(dir = %parent.display(), "Created store directory");
            }
        }

        // Append mode pins every write to end-of-file, so seeking for reads
        // never moves the write position.
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();

        info!(path = %path.display(), size, "Opened store");

        Ok(Self {
            path,
            sync_mode: config.sync_mode,
            inner: Mutex::new(StoreInner {
                writer: Some(BufWriter::with_capacity(config.buffer_capacity, file)),
                size,
                last_sync: Instant::now(),
                failed_at: None,
            }),
        })
    }

    /// Append one frame carrying `payload`.
    ///
    /// Returns `(bytes_written, position)`: the frame's total size
    /// (`8 + payload.len()`) and the position at which it starts.
    ///
    /// If the sync policy fails after the frame was written, the error is
    /// returned but the frame stays in the store and counts towards
    /// [`Store::size`]. If the frame write itself fails, the store refuses
    /// every later append with [`LogError::WriteFailed`].
    pub fn append(&self, payload: &[u8]) -> LogResult<(u64, u64)> {
        let appended = self.append_frame(payload)?;
        appended.synced?;
        Ok((appended.bytes_written, appended.position))
    }

    /// Write one frame, then run the sync policy.
    ///
    /// `Err` means no frame was committed. `Ok` means the frame is in the
    /// store at `position`, whatever `synced` says.
    pub(crate) fn append_frame(&self, payload: &[u8]) -> LogResult<Appended> {
        let mut inner = self.lock()?;
        if let Some(position) = inner.failed_at {
            return Err(LogError::WriteFailed { position });
        }

        let position = inner.size;
        let frame = encode_frame(payload);

        let written = inner.writer()?.write_all(&frame);
        if let Err(e) = written {
            warn!(position, error = %e, "Frame write failed; refusing further appends");
            inner.failed_at = Some(position);
            return Err(e.into());
        }

        let bytes_written = frame.len() as u64;
        inner.size += bytes_written;
        debug!(position, bytes = bytes_written, "Appended frame");

        let synced = inner.maybe_sync(self.sync_mode);
        if let Err(e) = &synced {
            warn!(position, error = %e, "Sync after append failed");
        }

        Ok(Appended {
            bytes_written,
            position,
            synced,
        })
    }

    /// Read the payload of the frame starting at `position`.
    ///
    /// Fails with an `UnexpectedEof` I/O error if the prefix or the payload
    /// it declares would extend past the end of the store.
    pub fn read(&self, position: u64) -> LogResult<Vec<u8>> {
        let mut inner = self.lock()?;
        let size = inner.size;
        let file = inner.flushed_file()?;

        check_bounds(position, LEN_WIDTH, size)?;
        let mut prefix = [0u8; LEN_WIDTH as usize];
        read_exact_at(file, &mut prefix, position)?;

        let len = decode_len(prefix);
        let payload_start = position + LEN_WIDTH;
        check_bounds(payload_start, len, size)?;

        let mut payload = vec![0u8; len as usize];
        read_exact_at(file, &mut payload, payload_start)?;

        Ok(payload)
    }

    /// Raw positional read into `buf` starting at byte `offset`.
    ///
    /// Fills the whole buffer or fails; a short read is an `UnexpectedEof`
    /// I/O error. Returns the number of bytes read.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> LogResult<usize> {
        let mut inner = self.lock()?;
        let size = inner.size;
        let file = inner.flushed_file()?;

        check_bounds(offset, buf.len() as u64, size)?;
        read_exact_at(file, buf, offset)?;

        Ok(buf.len())
    }

    /// Flush the write buffer and fsync the backing file.
    pub fn sync(&self) -> LogResult<()> {
        self.lock()?.sync()
    }

    /// Flush the write buffer, fsync and release the file handle.
    ///
    /// Closing an already closed store is a no-op. Every other operation on
    /// a closed store fails with [`LogError::Closed`]. If the flush or fsync
    /// fails, the error is returned and the store stays open, buffered
    /// frames included, so `close` can be retried.
    pub fn close(&self) -> LogResult<()> {
        let mut inner = self.lock()?;

        let Some(writer) = inner.writer.as_mut() else {
            warn!(path = %self.path.display(), "Store already closed");
            return Ok(());
        };

        writer.flush()?;
        writer.get_ref().sync_all()?;
        inner.writer = None;

        info!(path = %self.path.display(), size = inner.size, "Closed store");

        Ok(())
    }

    /// Total bytes appended so far, buffered bytes included.
    pub fn size(&self) -> u64 {
        match self.inner.lock() {
            Ok(inner) => inner.size,
            Err(poisoned) => poisoned.into_inner().size,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> LogResult<MutexGuard<'_, StoreInner>> {
        self.inner.lock().map_err(|_| LogError::LockPoisoned)
    }
}

// ---------------------------------------------------------------------------
// StoreInner
// ---------------------------------------------------------------------------

impl StoreInner {
    fn writer(&mut self) -> LogResult<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or(LogError::Closed)
    }

    /// Flush buffered frames and hand back the file for positional reads.
    fn flushed_file(&mut self) -> LogResult<&mut File> {
        let writer = self.writer()?;
        writer.flush()?;
        Ok(writer.get_mut())
    }

    fn sync(&mut self) -> LogResult<()> {
        let writer = self.writer()?;
        writer.flush()?;
        writer.get_ref().sync_data()?;
        self.last_sync = Instant::now();
        Ok(())
    }

    fn maybe_sync(&mut self, sync_mode: SyncMode) -> LogResult<()> {
        match sync_mode {
            SyncMode::Buffered => Ok(()),
            SyncMode::Fsync => self.sync(),
            SyncMode::Periodic(interval) => {
                if self.last_sync.elapsed() >= interval {
                    self.sync()
                } else {
                    Ok(())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Positional read helpers
// ---------------------------------------------------------------------------

fn check_bounds(position: u64, len: u64, size: u64) -> io::Result<()> {
    match position.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("read of {len} bytes at position {position} exceeds store size {size}"),
        )),
    }
}

fn read_exact_at(file: &mut File, buf: &mut [u8], position: u64) -> io::Result<()> {
    file.seek(SeekFrom::Start(position))?;
    file.read_exact(buf)
}
