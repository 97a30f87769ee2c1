//! Logging init: file under the XDG state dir, or graceful fallback to stderr.

use anyhow::Result;
use std::fs;
use std::io;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,coursegen=debug"))
}

/// Initialize structured logging to `~/.local/state/coursegen/coursegen.log`.
/// Returns Err when the log dir is unwritable so the caller can fall back to
/// stderr-only logging.
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("coursegen")?;
    let log_dir = xdg_dirs.get_state_home().join("coursegen");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("coursegen.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(move || -> Box<dyn io::Write + Send> {
            // Fall back to stderr if the handle cannot be cloned.
            match file.try_clone() {
                Ok(f) => Box::new(f),
                Err(_) => Box::new(io::stderr()),
            }
        })
        .with_ansi(false)
        .init();

    tracing::info!("coursegen logging initialized at {}", log_path.display());
    Ok(())
}

/// Stderr-only logging, for when [`init_logging`] fails.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}
