//! Tracing subscriber setup
//!
//! Compiled programs own stdout, and stderr carries the underflow diagnostic,
//! so nothing is logged unless `NEBULA_LOG` asks for it. When it does, events
//! go to stderr through a `fmt` subscriber filtered by the variable's value.

use crate::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber for `filter`.
///
/// Returns `true` if a subscriber was installed by this call. An invalid
/// filter, or a subscriber that is already set, leaves logging as it was.
pub fn init_logging(filter: Option<&str>) -> bool {
    let Some(directives) = filter else {
        return false;
    };

    let env_filter = match EnvFilter::try_new(directives) {
        Ok(f) => f,
        Err(e) => {
            eprintln!(
                "Warning: {}='{}' is not a valid filter ({}), logging disabled",
                LOG_ENV, directives, e
            );
            return false;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_installs_nothing() {
        assert!(!init_logging(None));
    }

    #[test]
    fn test_invalid_filter_rejected() {
        assert!(!init_logging(Some("nebula_runtime=notalevel")));
    }
}
