//! Configuration management for sqltray.
//!
//! There is no configuration file: everything is derived from the application's base
//! directory (where the executable lives) plus a handful of command-line flags.
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::constants::{
    ADMIN_EXECUTABLE_STEM, CREDENTIALS_FILE_NAME, DEFAULT_SHUTDOWN_TIMEOUT,
    SERVER_EXECUTABLE_STEM, executable_name,
};
use crate::error::{Result, TrayError};

/// Fixed locations of the artifacts sqltray works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory containing the executables; used as cwd for every child process.
    pub base_dir: PathBuf,
    /// Server executable, e.g. `<base>/mysqld`.
    pub server_executable: PathBuf,
    /// Admin client used for shutdown, e.g. `<base>/mysqladmin`.
    pub admin_executable: PathBuf,
    /// Optional credentials file, e.g. `<base>/mylogin.cnf`.
    pub credentials_file: PathBuf,
}

impl Layout {
    /// Builds the standard layout rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_executables(
            base_dir,
            &executable_name(SERVER_EXECUTABLE_STEM),
            &executable_name(ADMIN_EXECUTABLE_STEM),
        )
    }

    /// Builds a layout with non-standard executable names. The credentials file name
    /// stays fixed.
    pub fn with_executables(
        base_dir: impl Into<PathBuf>,
        server_name: &str,
        admin_name: &str,
    ) -> Self {
        let base_dir = base_dir.into();
        Self {
            server_executable: base_dir.join(server_name),
            admin_executable: base_dir.join(admin_name),
            credentials_file: base_dir.join(CREDENTIALS_FILE_NAME),
            base_dir,
        }
    }

    /// The process name the server shows up under in the process table.
    pub fn server_process_name(&self) -> String {
        self.server_executable
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Runtime settings assembled from the command line.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Artifact locations.
    pub layout: Layout,
    /// Bound applied to each shutdown command.
    pub shutdown_timeout: Duration,
    /// Run without the interactive terminal UI.
    pub headless: bool,
    /// Start the server as soon as the tray is up.
    pub autostart: bool,
    /// Render with ANSI colors.
    pub color: bool,
}

impl TrayConfig {
    /// Config with defaults for the given layout.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            headless: false,
            autostart: false,
            color: true,
        }
    }
}

/// Returns the directory containing the running executable.
///
/// The tray can be started from any working directory, so the current directory is
/// never consulted.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = env::current_exe().map_err(TrayError::BaseDirUnavailable)?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        TrayError::BaseDirUnavailable(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("'{}' has no parent directory", exe.display()),
        ))
    })
}

/// Resolves the base directory, preferring an explicit override.
pub fn resolve_base_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) if dir.is_absolute() => Ok(dir.to_path_buf()),
        Some(dir) => {
            let resolved = env::current_dir()
                .map_err(TrayError::BaseDirUnavailable)?
                .join(dir);
            Ok(resolved.canonicalize().unwrap_or(resolved))
        }
        None => executable_dir(),
    }
}

/// Parses a user-facing duration string in the format `<number>[ms|s|m|h]`.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TrayError::InvalidDuration(raw.to_string()));
    }

    if let Some(millis) = value.strip_suffix("ms") {
        let amount: u64 = millis
            .trim()
            .parse()
            .map_err(|_| TrayError::InvalidDuration(raw.to_string()))?;
        return Ok(Duration::from_millis(amount));
    }

    let (amount_str, multiplier) = if let Some(stripped) = value.strip_suffix('s') {
        (stripped.trim(), 1)
    } else if let Some(stripped) = value.strip_suffix('m') {
        (stripped.trim(), 60)
    } else if let Some(stripped) = value.strip_suffix('h') {
        (stripped.trim(), 3600)
    } else {
        (value, 1)
    };

    let amount: u64 = amount_str
        .parse()
        .map_err(|_| TrayError::InvalidDuration(raw.to_string()))?;

    Ok(Duration::from_secs(amount.saturating_mul(multiplier)))
}
