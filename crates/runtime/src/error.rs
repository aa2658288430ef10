//! FFI access to the runtime error slot
//!
//! Recoverable failures (malformed integer input, stream errors) are recorded
//! in a thread-local slot owned by `nebula-core` rather than panicking across
//! the C ABI. Generated code polls it with these functions.
//!
//! # WARNING: Pointer Lifetime
//! Pointers returned by `nebula_get_error` and `nebula_take_error` are only
//! valid until the next call that touches the error slot. Callers must copy
//! the string immediately if they need to retain it.

use nebula_core::error::{pending_error_ptr, take_error_ptr};
use nebula_core::{clear_runtime_error, has_runtime_error};
use std::ffi::c_char;

/// Check if there's a pending runtime error (FFI-safe)
#[unsafe(no_mangle)]
pub extern "C" fn nebula_has_error() -> bool {
    has_runtime_error()
}

/// Get the last error message as a C string pointer, or null (FFI-safe)
#[unsafe(no_mangle)]
pub extern "C" fn nebula_get_error() -> *const c_char {
    pending_error_ptr()
}

/// Take (and clear) the last error as a C string pointer, or null (FFI-safe)
#[unsafe(no_mangle)]
pub extern "C" fn nebula_take_error() -> *const c_char {
    take_error_ptr()
}

/// Clear any pending error (FFI-safe)
#[unsafe(no_mangle)]
pub extern "C" fn nebula_clear_error() {
    clear_runtime_error();
}

pub use nebula_clear_error as clear_error;
pub use nebula_get_error as get_error;
pub use nebula_has_error as has_error;
pub use nebula_take_error as take_error;
