//! Stack guard: preconditions for stack-consuming operations
//!
//! Before generated code pops N values it asks whether the data stack holds at
//! least N; before it returns it asks whether a call frame exists. A check is a
//! single read followed by a branch and carries no state of its own.
//!
//! The checks return a typed error instead of terminating. Whoever owns the
//! context decides what an underflow means; for compiled programs that is the
//! fatal driver in `nebula-runtime`.
//!
//! # Diagnostic format
//!
//! `StackUnderflow` displays as exactly one line (without the newline):
//!
//! ```text
//! stack underflow at <location>
//! call stack underflow at <location>
//! ```

use crate::context::ExecutionContext;
use crate::location::{Location, OwnedLocation};
use std::fmt;

/// Which of the two stacks ran dry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Data,
    Call,
}

impl StackKind {
    fn label(self) -> &'static str {
        match self {
            StackKind::Data => "stack",
            StackKind::Call => "call stack",
        }
    }
}

/// A failed precondition at a generated check site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackUnderflow {
    pub kind: StackKind,
    pub location: OwnedLocation,
    /// Minimum depth the operation needed
    pub required: u64,
    /// Depth observed at the time of the check
    pub actual: u64,
}

impl fmt::Display for StackUnderflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} underflow at {}", self.kind.label(), self.location)
    }
}

impl std::error::Error for StackUnderflow {}

impl ExecutionContext {
    /// Require at least `min_depth` values on the data stack.
    ///
    /// A requirement of zero always passes.
    #[inline]
    pub fn require_data_stack(
        &self,
        min_depth: u64,
        location: Location<'_>,
    ) -> Result<(), StackUnderflow> {
        if self.data_depth < min_depth {
            return Err(underflow(StackKind::Data, location, min_depth, self.data_depth));
        }
        Ok(())
    }

    /// Require a non-empty call stack (a return target must exist).
    #[inline]
    pub fn require_call_stack(&self, location: Location<'_>) -> Result<(), StackUnderflow> {
        if self.call_depth < 1 {
            return Err(underflow(StackKind::Call, location, 1, self.call_depth));
        }
        Ok(())
    }
}

#[cold]
fn underflow(kind: StackKind, location: Location<'_>, required: u64, actual: u64) -> StackUnderflow {
    StackUnderflow {
        kind,
        location: location.to_owned_location(),
        required,
        actual,
    }
}
