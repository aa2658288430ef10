//! Execution context shared with generated code
//!
//! Generated code owns one `ExecutionContext` per VM instance and updates the
//! two depth counters as it pushes and pops. The runtime only reads them.
//!
//! The layout is `#[repr(C)]` so generated code can allocate the struct as a
//! global (or on its own stack) and pass a pointer into the checked-access
//! entry points:
//!
//! ```text
//! offset 0: data_depth  (u64)
//! offset 8: call_depth  (u64)
//! ```

use crate::guard::StackUnderflow;
use crate::location::Location;

/// Depth counters for one VM instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Number of values currently on the data stack
    pub data_depth: u64,
    /// Number of active call frames
    pub call_depth: u64,
}

impl ExecutionContext {
    /// A fresh context with both stacks empty
    pub const fn new() -> Self {
        ExecutionContext {
            data_depth: 0,
            call_depth: 0,
        }
    }

    pub const fn with_depths(data_depth: u64, call_depth: u64) -> Self {
        ExecutionContext {
            data_depth,
            call_depth,
        }
    }

    /// Record `n` values pushed onto the data stack (saturates at `u64::MAX`)
    pub fn push_data(&mut self, n: u64) {
        self.data_depth = self.data_depth.saturating_add(n);
    }

    /// Checked pop of `n` data-stack values
    ///
    /// Mirrors what generated code does: require first, then adjust the
    /// counter. On underflow the counter is left untouched.
    pub fn pop_data(&mut self, n: u64, location: Location<'_>) -> Result<(), StackUnderflow> {
        self.require_data_stack(n, location)?;
        self.data_depth -= n;
        Ok(())
    }

    /// Record a call frame being entered (saturates at `u64::MAX`)
    pub fn push_frame(&mut self) {
        self.call_depth = self.call_depth.saturating_add(1);
    }

    /// Checked return from the innermost call frame
    pub fn pop_frame(&mut self, location: Location<'_>) -> Result<(), StackUnderflow> {
        self.require_call_stack(location)?;
        self.call_depth -= 1;
        Ok(())
    }
}
