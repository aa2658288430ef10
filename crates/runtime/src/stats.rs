//! Run statistics
//!
//! Process-wide counters updated by the fatal underflow path and the I/O entry
//! points, and read by the at-exit report and the SIGQUIT dump. A passing stack
//! check touches none of them. Updates are single relaxed `fetch_add`s; reads
//! only happen when a report or dump is produced.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static START_TIME: OnceLock<Instant> = OnceLock::new();

pub static UNDERFLOWS: AtomicU64 = AtomicU64::new(0);
pub static BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
pub static BYTES_READ: AtomicU64 = AtomicU64::new(0);
pub static INTS_PRINTED: AtomicU64 = AtomicU64::new(0);
pub static INTS_READ: AtomicU64 = AtomicU64::new(0);
pub static READ_ERRORS: AtomicU64 = AtomicU64::new(0);
pub static FLUSHES: AtomicU64 = AtomicU64::new(0);

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub underflows: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub ints_printed: u64,
    pub ints_read: u64,
    pub read_errors: u64,
    pub flushes: u64,
}

/// Record the start of the run (first call wins)
pub fn mark_start() {
    START_TIME.get_or_init(Instant::now);
}

/// Time since `mark_start`, if the runtime was initialised
pub fn elapsed() -> Option<Duration> {
    START_TIME.get().map(|start| start.elapsed())
}

pub fn snapshot() -> RunStats {
    RunStats {
        underflows: UNDERFLOWS.load(Ordering::Relaxed),
        bytes_written: BYTES_WRITTEN.load(Ordering::Relaxed),
        bytes_read: BYTES_READ.load(Ordering::Relaxed),
        ints_printed: INTS_PRINTED.load(Ordering::Relaxed),
        ints_read: INTS_READ.load(Ordering::Relaxed),
        read_errors: READ_ERRORS.load(Ordering::Relaxed),
        flushes: FLUSHES.load(Ordering::Relaxed),
    }
}

pub fn record_underflow() {
    UNDERFLOWS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_bytes_written(n: u64) {
    BYTES_WRITTEN.fetch_add(n, Ordering::Relaxed);
}

#[inline]
pub fn record_bytes_read(n: u64) {
    BYTES_READ.fetch_add(n, Ordering::Relaxed);
}

#[inline]
pub fn record_int_printed() {
    INTS_PRINTED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_int_read() {
    INTS_READ.fetch_add(1, Ordering::Relaxed);
}

pub fn record_read_error() {
    READ_ERRORS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_flush() {
    FLUSHES.fetch_add(1, Ordering::Relaxed);
}
