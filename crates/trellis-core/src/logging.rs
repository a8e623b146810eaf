//! File-backed `tracing` setup.
//!
//! A full-screen TUI owns stdout, so diagnostics go to a file instead.

use crate::runtime::ProgramError;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install a global `tracing` subscriber that appends to `path`.
///
/// The filter comes from `RUST_LOG` when set, otherwise [`DEFAULT_FILTER`].
/// Fails if the file cannot be opened or a global subscriber is already
/// installed.
///
/// # Example
///
/// ```no_run
/// trellis_core::log_to_file("trellis.log").unwrap();
/// tracing::info!("ready");
/// ```
pub fn log_to_file(path: impl AsRef<Path>) -> Result<(), ProgramError> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| ProgramError::Logging(e.to_string()))
}
