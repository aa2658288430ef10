//! Runtime configuration
//!
//! Compiled programs take no command-line flags from the runtime, so the few
//! knobs it has come from environment variables, read once on first use:
//!
//! - `NEBULA_LOG`: tracing filter (e.g. `debug`, `nebula_runtime=trace`).
//!   Unset or empty: no subscriber is installed.
//! - `NEBULA_REPORT`: at-exit report.
//!   - Unset, empty or `0` → no report, zero cost
//!   - `1` → human-readable to stderr
//!   - `json` → JSON to stderr
//!   - `json:/path` → JSON to file

use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const LOG_ENV: &str = "NEBULA_LOG";
pub const REPORT_ENV: &str = "NEBULA_REPORT";

/// Output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

/// Output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    Stderr,
    File(PathBuf),
}

/// Parsed report configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub destination: ReportDestination,
}

/// An environment variable held a value the runtime does not understand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}' not recognized", self.var, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl ReportConfig {
    /// Parse a `NEBULA_REPORT` value; `Ok(None)` means reporting is off
    pub fn parse(val: &str) -> Result<Option<Self>, ConfigError> {
        match val {
            "" | "0" => Ok(None),
            "1" => Ok(Some(ReportConfig {
                format: ReportFormat::Human,
                destination: ReportDestination::Stderr,
            })),
            "json" => Ok(Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::Stderr,
            })),
            s if s.starts_with("json:") && s.len() > 5 => Ok(Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::File(PathBuf::from(&s[5..])),
            })),
            _ => Err(ConfigError {
                var: REPORT_ENV,
                value: val.to_string(),
            }),
        }
    }
}

/// Everything the runtime reads from its environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Tracing filter directive, if logging was requested
    pub log_filter: Option<String>,
    pub report: Option<ReportConfig>,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(LOG_ENV).ok(),
            std::env::var(REPORT_ENV).ok(),
        )
    }

    /// Build from raw variable values. Unrecognised values are reported on
    /// stderr and ignored; logging is not up yet at this point.
    pub fn from_vars(log: Option<String>, report: Option<String>) -> Self {
        let log_filter = log.filter(|s| !s.trim().is_empty());
        let report = match report.as_deref().map(ReportConfig::parse) {
            None => None,
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                eprintln!("Warning: {}, ignoring", e);
                None
            }
        };
        RuntimeConfig { log_filter, report }
    }
}

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// The process configuration, parsed on first access
pub fn runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get_or_init(RuntimeConfig::from_env)
}
