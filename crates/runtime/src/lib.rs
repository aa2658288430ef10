//! Nebula Runtime: support library for programs compiled from the stack IR
//!
//! Generated code links against this crate's staticlib and calls it for two
//! things only:
//! - Stack guard: `nebula_check_stack` / `nebula_check_call_stack` before
//!   popping or returning; a failed check reports one line and exits 1
//! - Console I/O: byte and integer print/read plus an explicit flush
//!
//! The depth counters live in an `ExecutionContext` owned by generated code
//! (see `nebula-core`); the runtime never mutates them.

pub mod config;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod error;
pub mod guard;
pub mod io;
pub mod lifecycle;
pub mod logging;
#[cfg(feature = "diagnostics")]
pub mod report;
#[cfg(not(feature = "diagnostics"))]
#[path = "report_stub.rs"]
pub mod report;
pub mod stats;

// Re-export key types from the core
pub use nebula_core::{ExecutionContext, Location, OwnedLocation, StackKind, StackUnderflow};

// Stack guard (exported for LLVM linking)
pub use guard::{
    UNDERFLOW_EXIT_CODE, enforce, fatal_underflow, nebula_check_call_stack as check_call_stack,
    nebula_check_stack as check_stack,
};

// I/O operations (exported for LLVM linking)
pub use io::{
    Console, EOF_SENTINEL, ReadIntError, nebula_flush as flush, nebula_print_byte as print_byte,
    nebula_print_int as print_int, nebula_read_byte as read_byte, nebula_read_int as read_int,
    nebula_read_int_plus as read_int_plus,
};

// Error slot (exported for LLVM linking)
pub use error::{
    nebula_clear_error as clear_error, nebula_get_error as get_error,
    nebula_has_error as has_error, nebula_take_error as take_error,
};

// Lifecycle (exported for LLVM linking)
pub use lifecycle::{
    nebula_runtime_finish as runtime_finish, nebula_runtime_init as runtime_init,
};

pub use config::{ReportConfig, RuntimeConfig};
pub use stats::RunStats;
