//! Checked stack access for generated code
//!
//! Generated code calls these entry points before it pops from the data stack
//! or returns through the call stack. A passing check returns immediately;
//! a failing one never returns.
//!
//! # Fatal Path
//!
//! An underflow means the code generator or the compiler emitted a broken
//! program, so there is nothing to recover. `fatal_underflow`:
//!
//! 1. flushes pending stdout (a C `exit` would do the same)
//! 2. writes exactly one diagnostic line to stderr and flushes it
//! 3. exits with status [`UNDERFLOW_EXIT_CODE`]
//!
//! ```text
//! stack underflow at <block>
//! call stack underflow at <block> (<position>)
//! ```
//!
//! # Safety Contract
//!
//! `ctx` must be null or point to a live `ExecutionContext`. `block` must be
//! null or a NUL-terminated string; `pos` may be null for single-part tags.

use crate::io::flush_stdout;
use crate::stats;
use nebula_core::{ExecutionContext, Location, StackUnderflow};
use std::borrow::Cow;
use std::ffi::{CStr, c_char};
use std::io::Write;
use tracing::{error, trace};

/// Exit status for any stack underflow
pub const UNDERFLOW_EXIT_CODE: i32 = 1;

/// Block name used when generated code passes a null tag
const UNKNOWN_BLOCK: &str = "<unknown>";

static EMPTY_CONTEXT: ExecutionContext = ExecutionContext::new();

/// Report an underflow and terminate the process. Never returns.
#[cold]
pub fn fatal_underflow(err: &StackUnderflow) -> ! {
    stats::record_underflow();
    error!(
        kind = ?err.kind,
        location = %err.location,
        required = err.required,
        actual = err.actual,
        "stack guard failed"
    );

    flush_stdout();
    write_stderr_line(&err.to_string());
    let _ = std::io::stderr().flush();

    std::process::exit(UNDERFLOW_EXIT_CODE);
}

/// Pass on `Ok`, terminate via [`fatal_underflow`] on `Err`.
#[inline]
pub fn enforce(result: Result<(), StackUnderflow>) {
    if let Err(err) = result {
        fatal_underflow(&err);
    }
}

/// Write one line straight to fd 2, bypassing Rust's stderr handle.
fn write_stderr_line(line: &str) {
    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');

    let mut written = 0;
    while written < buf.len() {
        let rest = &buf[written..];
        let n = unsafe { libc::write(2, rest.as_ptr() as *const libc::c_void, rest.len() as _) };
        if n <= 0 {
            break;
        }
        written += n as usize;
    }
}

unsafe fn context_ref<'a>(ctx: *const ExecutionContext) -> &'a ExecutionContext {
    if ctx.is_null() {
        &EMPTY_CONTEXT
    } else {
        unsafe { &*ctx }
    }
}

unsafe fn tag<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
    }
}

/// Require at least `min_depth` values on the data stack
///
/// # Safety
/// See the module-level safety contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nebula_check_stack(
    ctx: *const ExecutionContext,
    min_depth: u64,
    block: *const c_char,
    pos: *const c_char,
) {
    let ctx = unsafe { context_ref(ctx) };
    let block = unsafe { tag(block) };
    let pos = unsafe { tag(pos) };
    let location = Location {
        block: block.as_deref().unwrap_or(UNKNOWN_BLOCK),
        position: pos.as_deref(),
    };
    trace!(min_depth, depth = ctx.data_depth, %location, "check_stack");
    enforce(ctx.require_data_stack(min_depth, location));
}

/// Require a non-empty call stack
///
/// # Safety
/// See the module-level safety contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nebula_check_call_stack(
    ctx: *const ExecutionContext,
    block: *const c_char,
    pos: *const c_char,
) {
    let ctx = unsafe { context_ref(ctx) };
    let block = unsafe { tag(block) };
    let pos = unsafe { tag(pos) };
    let location = Location {
        block: block.as_deref().unwrap_or(UNKNOWN_BLOCK),
        position: pos.as_deref(),
    };
    trace!(depth = ctx.call_depth, %location, "check_call_stack");
    enforce(ctx.require_call_stack(location));
}

// Public re-exports with short names for internal use
pub use nebula_check_call_stack as check_call_stack;
pub use nebula_check_stack as check_stack;
