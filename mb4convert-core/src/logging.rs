//! Logging setup for the mb4convert binary.
//!
//! Log records go to stderr so they never interleave with a printed plan on
//! stdout.

use crate::Result;
use tracing_subscriber::EnvFilter;

/// Maps the `-v` count and `--quiet` flag to a maximum log level.
///
/// * quiet - ERROR regardless of verbosity
/// * 0 - WARN
/// * 1 - INFO
/// * 2 - DEBUG (every dispatched statement is logged)
/// * 3+ - TRACE
pub fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Initializes structured logging based on verbosity level.
///
/// `RUST_LOG`, when set, overrides the level derived from the flags.
///
/// # Example
/// ```rust,no_run
/// use mb4convert_core::logging::init_logging;
///
/// // INFO level
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = level_for(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::MigrateError::configuration(format!(
                "Failed to initialize logging: {}",
                e
            ))
        })?;

    Ok(())
}
