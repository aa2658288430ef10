//! Runtime diagnostics for production debugging
//!
//! Provides a SIGQUIT (kill -3) handler that dumps run statistics to stderr,
//! similar to JVM thread dumps. Useful for seeing whether a long-running
//! program is stuck reading input or still making progress.
//!
//! ## Usage
//!
//! ```bash
//! kill -3 <pid>
//! ```
//!
//! The process will dump diagnostics to stderr and continue running.
//!
//! ## Signal Safety
//!
//! `dump_diagnostics()` does I/O, which is NOT safe to call from a signal
//! handler. A dedicated thread waits for signals using signal-hook's iterator
//! API and does the dump outside signal context.

use crate::stats;
use std::sync::Once;

static SIGNAL_HANDLER_INIT: Once = Once::new();

/// Install the SIGQUIT signal handler for diagnostics
///
/// Called by `nebula_runtime_init`. Safe to call multiple times (idempotent).
pub fn install_signal_handler() {
    SIGNAL_HANDLER_INIT.call_once(|| {
        #[cfg(unix)]
        {
            use signal_hook::consts::SIGQUIT;
            use signal_hook::iterator::Signals;

            let mut signals = match Signals::new([SIGQUIT]) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "could not register SIGQUIT handler");
                    return;
                }
            };

            std::thread::Builder::new()
                .name("nebula-diagnostics".to_string())
                .spawn(move || {
                    for sig in signals.forever() {
                        if sig == SIGQUIT {
                            dump_diagnostics();
                        }
                    }
                })
                .ok();
        }
    });
}

/// Dump runtime diagnostics to stderr
///
/// Output goes to stderr to avoid mixing with program output.
pub fn dump_diagnostics() {
    use std::io::Write;

    let mut out = std::io::stderr().lock();
    let s = stats::snapshot();

    let _ = writeln!(out, "\n=== Nebula Runtime Diagnostics ===");
    let _ = writeln!(out, "Timestamp: {:?}", std::time::SystemTime::now());
    if let Some(elapsed) = stats::elapsed() {
        let _ = writeln!(out, "Uptime:    {:.3}s", elapsed.as_secs_f64());
    }

    let _ = writeln!(out, "\n[Stack Guard]");
    let _ = writeln!(out, "  Underflows:  {}", s.underflows);

    let _ = writeln!(out, "\n[I/O]");
    let _ = writeln!(out, "  Written:     {}", format_bytes(s.bytes_written));
    let _ = writeln!(out, "  Read:        {}", format_bytes(s.bytes_read));
    let _ = writeln!(out, "  Ints out/in: {}/{}", s.ints_printed, s.ints_read);
    let _ = writeln!(out, "  Flushes:     {}", s.flushes);
    if s.read_errors > 0 {
        let _ = writeln!(out, "  WARNING: {} integer reads failed", s.read_errors);
    }

    let _ = writeln!(out, "\n=== End Diagnostics ===\n");
}

/// Format bytes as human-readable string
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
