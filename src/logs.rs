//! Log output for the tray process itself.
use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::EnvFilter;

use crate::constants::{APP_NAME, LOG_DIR_NAME};

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error; used when nothing else owns the terminal.
    Stderr,
    /// Append to a file; used while the interactive tray owns the terminal.
    File(PathBuf),
}

/// Returns `<base_dir>/logs/sqltray.log`.
pub fn resolve_log_path(base_dir: &Path) -> PathBuf {
    base_dir.join(LOG_DIR_NAME).join(format!("{APP_NAME}.log"))
}

/// Builds the filter from an explicit level, falling back to `RUST_LOG`, then `info`.
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Installs the global subscriber. A subscriber that is already installed is left alone.
pub fn init_logging(level: Option<&str>, target: &LogTarget) -> io::Result<()> {
    let filter = build_filter(level);

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .try_init();
        }
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
    }

    Ok(())
}
