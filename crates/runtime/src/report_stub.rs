//! Stub module for report operations when the "diagnostics" feature is disabled.
//!
//! These are no-op functions that ensure linking works regardless of feature flags.

/// No-op report when diagnostics is disabled
pub fn emit_report() {}
