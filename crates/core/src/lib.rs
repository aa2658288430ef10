//! Nebula Core: checked stack access for generated stack-machine code
//!
//! This crate holds the part of the runtime that does not touch any stream:
//! the execution context owned by generated code and the guard that decides
//! whether an upcoming pop or return is safe.
//!
//! Key design principles:
//! - ExecutionContext: the two depth counters, owned by the generated program
//! - Guard: pure checks returning `Result<(), StackUnderflow>`
//! - Termination policy lives in `nebula-runtime`, never here
//!
//! # Modules
//!
//! - `context`: `#[repr(C)]` depth counters shared with generated code
//! - `location`: block/position tags used in diagnostics
//! - `guard`: data-stack and call-stack preconditions
//! - `error`: Thread-local error handling for FFI safety

pub mod context;
pub mod error;
pub mod guard;
pub mod location;

// Re-export key types and functions
pub use context::ExecutionContext;
pub use guard::{StackKind, StackUnderflow};
pub use location::{Location, OwnedLocation};

// Error handling
pub use error::{
    clear_runtime_error, has_runtime_error, pending_error_ptr, set_runtime_error, take_error_ptr,
    take_runtime_error,
};
