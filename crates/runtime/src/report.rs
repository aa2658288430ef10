//! At-exit report for compiled programs
//!
//! Dumps run statistics when the program finishes, controlled by the
//! `NEBULA_REPORT` env var (see `config`).
//!
//! ## Feature Flag
//!
//! This module requires the `diagnostics` feature (enabled by default).
//! When disabled, `report_stub.rs` provides no-op FFI symbols.

use crate::config::{ReportConfig, ReportDestination, ReportFormat, runtime_config};
use crate::stats::{self, RunStats};
use std::io::Write;

/// Collected metrics for the report
#[derive(Debug)]
pub struct ReportData {
    pub wall_clock_ms: u64,
    pub stats: RunStats,
}

/// Collect all metrics
pub fn collect_report_data() -> ReportData {
    let wall_clock_ms = stats::elapsed()
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    ReportData {
        wall_clock_ms,
        stats: stats::snapshot(),
    }
}

// =============================================================================
// Formatting
// =============================================================================

fn format_human(data: &ReportData) -> String {
    let s = &data.stats;
    let mut out = String::new();
    out.push_str("=== NEBULA REPORT ===\n");
    out.push_str(&format!("Wall clock:      {} ms\n", data.wall_clock_ms));
    out.push_str(&format!("Underflows:      {}\n", s.underflows));
    out.push_str(&format!("Bytes written:   {}\n", s.bytes_written));
    out.push_str(&format!("Bytes read:      {}\n", s.bytes_read));
    out.push_str(&format!("Ints printed:    {}\n", s.ints_printed));
    out.push_str(&format!("Ints read:       {}\n", s.ints_read));
    out.push_str(&format!("Read errors:     {}\n", s.read_errors));
    out.push_str(&format!("Flushes:         {}\n", s.flushes));
    out.push_str("=====================\n");
    out
}

#[cfg(feature = "report-json")]
fn format_json(data: &ReportData) -> String {
    let s = &data.stats;
    let obj = serde_json::json!({
        "wall_clock_ms": data.wall_clock_ms,
        "underflows": s.underflows,
        "bytes_written": s.bytes_written,
        "bytes_read": s.bytes_read,
        "ints_printed": s.ints_printed,
        "ints_read": s.ints_read,
        "read_errors": s.read_errors,
        "flushes": s.flushes,
    });
    serde_json::to_string(&obj).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(not(feature = "report-json"))]
fn format_json(data: &ReportData) -> String {
    eprintln!(
        "Warning: NEBULA_REPORT=json requires the 'report-json' feature. Falling back to human format."
    );
    format_human(data)
}

// =============================================================================
// Emit
// =============================================================================

/// Write the report described by `config`
pub fn write_report(config: &ReportConfig, data: &ReportData) {
    let output = match config.format {
        ReportFormat::Human => format_human(data),
        ReportFormat::Json => format_json(data),
    };

    match &config.destination {
        ReportDestination::Stderr => {
            let _ = std::io::stderr().write_all(output.as_bytes());
        }
        ReportDestination::File(path) => {
            if let Ok(mut f) = std::fs::File::create(path) {
                let _ = f.write_all(output.as_bytes());
            } else {
                tracing::warn!(path = %path.display(), "could not write report file");
                eprintln!("Warning: could not write report to {}", path.display());
                let _ = std::io::stderr().write_all(output.as_bytes());
            }
        }
    }
}

/// Emit the report if `NEBULA_REPORT` asked for one
pub fn emit_report() {
    let Some(config) = &runtime_config().report else {
        return;
    };
    write_report(config, &collect_report_data());
}

// =============================================================================
// Tests
// =============================================================================
