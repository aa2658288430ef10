//! Console I/O primitives for generated programs
//!
//! These functions are exported with C ABI for LLVM codegen to call.
//!
//! # Safety Contract
//!
//! **IMPORTANT:** These functions are designed to be called ONLY by compiler-generated code,
//! not by end users or arbitrary C code. The compiler is responsible for passing a
//! valid, writable pointer to `nebula_read_int_plus`.
//!
//! # Stream Model
//!
//! All entry points share one process-wide [`Console`] over stdin and stdout, so
//! byte reads and integer reads consume from the same input buffer. Output is
//! written through `std::io::Stdout` and reaches the destination when its
//! buffer fills, on a newline, on `nebula_flush`, or when the process exits
//! through libc `exit` (including a return from the generated `main`).
//!
//! # End of Stream
//!
//! `nebula_read_byte` returns [`EOF_SENTINEL`] (-1) at end of stream. End of
//! stream is sticky: once seen, every later read reports it again without
//! touching the underlying reader.
//!
//! # Integer Input
//!
//! `nebula_read_int` accepts the same tokens as C `scanf("%d")`: leading
//! whitespace, an optional sign, then decimal digits. Malformed or exhausted
//! input returns 0 and records a runtime error (see `nebula_has_error`);
//! `nebula_read_int_plus` reports the outcome as a status instead.

use crate::stats;
use nebula_core::set_runtime_error;
use std::fmt;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tracing::warn;

/// Value returned by `read_byte` once the input stream is exhausted
pub const EOF_SENTINEL: i64 = -1;

/// Longest decimal rendering of an i32 ("-2147483648")
const MAX_INT_TEXT: usize = 11;

/// Why `read_int` produced no value
#[derive(Debug)]
pub enum ReadIntError {
    /// Input ended before any digit was seen
    Eof,
    /// A byte that cannot start or continue an integer token (left unread)
    Malformed(u8),
    /// The token does not fit in a 32-bit signed integer (digits consumed)
    OutOfRange,
    /// The underlying reader failed
    Io(io::Error),
}

impl fmt::Display for ReadIntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadIntError::Eof => write!(f, "end of input before integer"),
            ReadIntError::Malformed(b) => {
                write!(f, "expected integer, found byte 0x{:02x}", b)
            }
            ReadIntError::OutOfRange => write!(f, "integer out of 32-bit range"),
            ReadIntError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl ReadIntError {
    /// Input ran out; the normal way for an integer-reading loop to stop
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, ReadIntError::Eof)
    }
}

impl std::error::Error for ReadIntError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadIntError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReadIntError {
    fn from(e: io::Error) -> Self {
        ReadIntError::Io(e)
    }
}

/// A reader/writer pair with the primitive operations generated code needs.
///
/// The process console wraps stdin/stdout; tests use in-memory buffers.
pub struct Console<R, W> {
    reader: R,
    writer: W,
    eof: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Console {
            reader,
            writer,
            eof: false,
        }
    }

    /// Write the low byte of `value`
    pub fn print_byte(&mut self, value: i64) -> io::Result<()> {
        self.writer.write_all(&[value as u8])
    }

    /// Write `value` truncated to i32 in decimal; returns the byte count
    pub fn print_int(&mut self, value: i64) -> io::Result<usize> {
        let mut buf = [0u8; MAX_INT_TEXT];
        let mut cursor = io::Cursor::new(&mut buf[..]);
        write!(cursor, "{}", value as i32)?;
        let len = cursor.position() as usize;
        self.writer.write_all(&buf[..len])?;
        Ok(len)
    }

    /// Read one byte; `None` at end of stream
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.reader.consume(1);
        }
        Ok(byte)
    }

    /// Read the next decimal integer token
    pub fn read_int(&mut self) -> Result<i64, ReadIntError> {
        loop {
            match self.peek()? {
                Some(b) if is_space(b) => self.reader.consume(1),
                Some(_) => break,
                None => return Err(ReadIntError::Eof),
            }
        }

        let mut negative = false;
        if let Some(sign @ (b'+' | b'-')) = self.peek()? {
            negative = sign == b'-';
            self.reader.consume(1);
        }

        let mut magnitude: i64 = 0;
        let mut digits = 0usize;
        let mut overflow = false;
        while let Some(b) = self.peek()? {
            if !b.is_ascii_digit() {
                break;
            }
            self.reader.consume(1);
            digits += 1;
            if !overflow {
                magnitude = magnitude * 10 + i64::from(b - b'0');
                overflow = magnitude > i64::from(i32::MAX) + 1;
            }
        }

        if digits == 0 {
            return match self.peek()? {
                Some(b) => Err(ReadIntError::Malformed(b)),
                None => Err(ReadIntError::Eof),
            };
        }

        let value = if negative { -magnitude } else { magnitude };
        if overflow || i32::try_from(value).is_err() {
            return Err(ReadIntError::OutOfRange);
        }
        Ok(value)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.eof {
            return Ok(None);
        }
        loop {
            match self.reader.fill_buf() {
                Ok([]) => {
                    self.eof = true;
                    return Ok(None);
                }
                Ok(buf) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// C `isspace` in the "C" locale (includes vertical tab, unlike
/// `u8::is_ascii_whitespace`)
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

type ProcessConsole = Console<BufReader<Stdin>, Stdout>;

/// Process-wide console. Generated code is single-threaded; the mutex only
/// keeps the static `Sync` and is never contended.
static CONSOLE: LazyLock<Mutex<ProcessConsole>> = LazyLock::new(|| {
    register_exit_flush();
    Mutex::new(Console::new(BufReader::new(io::stdin()), io::stdout()))
});

/// Generated `main` returns to the C runtime instead of going through Rust's
/// exit path, so Rust never flushes its stdout buffer on its own. Hook the
/// flush into libc `exit`, which runs on both a `main` return and `exit()`.
fn register_exit_flush() {
    extern "C" fn flush_at_exit() {
        flush_stdout();
    }

    let rc = unsafe { libc::atexit(flush_at_exit) };
    if rc != 0 {
        warn!("could not register exit-time stdout flush");
    }
}

fn console() -> MutexGuard<'static, ProcessConsole> {
    CONSOLE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn record_write_error(op: &str, e: io::Error) {
    warn!(op, error = %e, "stdout write failed");
    set_runtime_error(format!("{}: failed to write to stdout: {}", op, e));
}

/// Flush stdout without going through the console lock.
///
/// Used on the fatal path, which may run while the console is held.
pub fn flush_stdout() {
    let _ = io::stdout().flush();
}

/// Write the low byte of `value` to stdout
#[unsafe(no_mangle)]
pub extern "C" fn nebula_print_byte(value: i64) {
    match console().print_byte(value) {
        Ok(()) => stats::record_bytes_written(1),
        Err(e) => record_write_error("print_byte", e),
    }
}

/// Write `value` (truncated to i32) to stdout in decimal
#[unsafe(no_mangle)]
pub extern "C" fn nebula_print_int(value: i64) {
    match console().print_int(value) {
        Ok(len) => {
            stats::record_int_printed();
            stats::record_bytes_written(len as u64);
        }
        Err(e) => record_write_error("print_int", e),
    }
}

/// Read one byte from stdin, or [`EOF_SENTINEL`] at end of stream
#[unsafe(no_mangle)]
pub extern "C" fn nebula_read_byte() -> i64 {
    match console().read_byte() {
        Ok(Some(b)) => {
            stats::record_bytes_read(1);
            i64::from(b)
        }
        Ok(None) => EOF_SENTINEL,
        Err(e) => {
            stats::record_read_error();
            warn!(error = %e, "stdin read failed, treating as end of stream");
            set_runtime_error(format!("read_byte: failed to read from stdin: {}", e));
            EOF_SENTINEL
        }
    }
}

/// Read the next decimal integer from stdin
///
/// Returns 0 and records a runtime error when no integer could be read.
#[unsafe(no_mangle)]
pub extern "C" fn nebula_read_int() -> i64 {
    match read_int_recorded() {
        Ok(value) => value,
        Err(e) => {
            set_runtime_error(format!("read_int: {}", e));
            0
        }
    }
}

/// Read the next decimal integer from stdin with an explicit status
///
/// Returns 1 and stores the value through `out` on success; returns 0 and
/// leaves `out` untouched otherwise.
///
/// # Safety
/// `out` must be null or valid for a write of one `i64`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nebula_read_int_plus(out: *mut i64) -> i64 {
    match read_int_recorded() {
        Ok(value) => {
            if !out.is_null() {
                unsafe { *out = value };
            }
            1
        }
        Err(_) => 0,
    }
}

fn read_int_recorded() -> Result<i64, ReadIntError> {
    let result = console().read_int();
    match &result {
        Ok(_) => stats::record_int_read(),
        Err(e) => {
            if !e.is_end_of_input() {
                stats::record_read_error();
            }
            tracing::debug!(error = %e, "read_int produced no value");
        }
    }
    result
}

/// Flush buffered stdout
#[unsafe(no_mangle)]
pub extern "C" fn nebula_flush() {
    stats::record_flush();
    if let Err(e) = console().flush() {
        record_write_error("flush", e);
    }
}

// Public re-exports with short names for internal use
pub use nebula_flush as flush;
pub use nebula_print_byte as print_byte;
pub use nebula_print_int as print_int;
pub use nebula_read_byte as read_byte;
pub use nebula_read_int as read_int;
pub use nebula_read_int_plus as read_int_plus;
