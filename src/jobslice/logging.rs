//! # Logging
//!
//! Diagnostics go through `tracing` and are written to stderr, leaving stdout
//! to the user-facing output of the CLI.
//!
//! The filter comes from `JOBSLICE_LOG` when set (any `EnvFilter` directive,
//! e.g. `JOBSLICE_LOG=jobslice=debug`). Otherwise the `-v` count picks the
//! level for this crate:
//!
//! | flag     | level |
//! |----------|-------|
//! | (none)   | warn  |
//! | `-v`     | info  |
//! | `-vv`    | debug |
//! | `-vvv`   | trace |

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "JOBSLICE_LOG";

pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "jobslice={}",
            level_for(verbosity).as_str().to_lowercase()
        ))
    });

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global tracing subscriber already set, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(3), Level::TRACE);
        assert_eq!(level_for(9), Level::TRACE);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(0);
        init_logging(2);
    }
}
