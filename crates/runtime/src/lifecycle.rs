//! Runtime start-up and shutdown
//!
//! Generated `main` calls `nebula_runtime_init` before the first block and
//! `nebula_runtime_finish` on the exit terminator. Neither is required for the
//! guard or I/O entry points to work; they add logging, the SIGQUIT dump and
//! the at-exit report.

use crate::config::runtime_config;
use crate::{io, logging, report, stats};
use std::sync::Once;
use tracing::debug;

static RUNTIME_INIT: Once = Once::new();

/// Read configuration, install logging and diagnostics, start the clock.
///
/// Idempotent.
#[unsafe(no_mangle)]
pub extern "C" fn nebula_runtime_init() {
    RUNTIME_INIT.call_once(|| {
        let config = runtime_config();
        logging::init_logging(config.log_filter.as_deref());
        stats::mark_start();

        #[cfg(feature = "diagnostics")]
        crate::diagnostics::install_signal_handler();

        debug!(
            report = config.report.is_some(),
            "nebula runtime initialised"
        );
    });
}

/// Flush program output and emit the at-exit report, if configured.
#[unsafe(no_mangle)]
pub extern "C" fn nebula_runtime_finish() {
    io::flush_stdout();
    let s = stats::snapshot();
    debug!(
        underflows = s.underflows,
        bytes_written = s.bytes_written,
        bytes_read = s.bytes_read,
        "nebula runtime finished"
    );
    report::emit_report();
}

pub use nebula_runtime_finish as runtime_finish;
pub use nebula_runtime_init as runtime_init;
