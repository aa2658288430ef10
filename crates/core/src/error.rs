//! Runtime Error Handling
//!
//! Provides thread-local error state so runtime entry points can report
//! recoverable failures (malformed integer input, stream errors) without
//! panicking across the FFI boundary.
//!
//! # Usage
//!
//! Entry points record an error and return a neutral value:
//! ```ignore
//! Err(e) => {
//!     set_runtime_error(format!("read_int: {}", e));
//!     return 0;
//! }
//! ```
//!
//! Callers can check for errors:
//! ```ignore
//! if has_runtime_error() {
//!     let error = take_runtime_error();
//!     // Handle error...
//! }
//! ```

use std::cell::RefCell;
use std::ffi::{CString, c_char};
use std::ptr;

thread_local! {
    /// Thread-local storage for the last runtime error message
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };

    /// Cached C string for FFI access (avoids allocation on every get)
    static ERROR_CSTRING: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last runtime error message
///
/// Note: This clears any cached CString to prevent stale pointer access.
pub fn set_runtime_error(msg: impl Into<String>) {
    ERROR_CSTRING.with(|cs| *cs.borrow_mut() = None);
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(msg.into());
    });
}

/// Take (and clear) the last runtime error message
pub fn take_runtime_error() -> Option<String> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Check if there's a pending runtime error
pub fn has_runtime_error() -> bool {
    LAST_ERROR.with(|e| e.borrow().is_some())
}

/// Clear any pending runtime error
pub fn clear_runtime_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
    ERROR_CSTRING.with(|e| *e.borrow_mut() = None);
}

/// Pointer to the pending error as a C string, or null if none is pending.
///
/// The pointer stays valid until the next call that touches the error slot.
pub fn pending_error_ptr() -> *const c_char {
    let msg = LAST_ERROR.with(|e| e.borrow().clone());
    match msg {
        Some(msg) => cache_cstring(&msg),
        None => ptr::null(),
    }
}

/// Take the pending error as a C string pointer, or null if none is pending.
///
/// Same lifetime rules as [`pending_error_ptr`].
pub fn take_error_ptr() -> *const c_char {
    match take_runtime_error() {
        Some(msg) => cache_cstring(&msg),
        None => ptr::null(),
    }
}

fn cache_cstring(msg: &str) -> *const c_char {
    // Interior NULs would truncate the message on the C side
    let safe_msg: String = msg.chars().map(|c| if c == '\0' { '?' } else { c }).collect();
    let cstring = match CString::new(safe_msg) {
        Ok(cs) => cs,
        Err(_) => return ptr::null(),
    };
    ERROR_CSTRING.with(|cs| {
        let ptr = cstring.as_ptr();
        *cs.borrow_mut() = Some(cstring);
        ptr
    })
}
