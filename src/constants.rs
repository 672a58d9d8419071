//! Constants and fixed deployment values for sqltray.
//!
//! File names here are a deployment contract with the bundled MySQL distribution and are
//! intentionally not configurable at runtime.

use std::{env::consts::EXE_SUFFIX, time::Duration};

// ============================================================================
// Deployment Artifacts
// ============================================================================

/// Base name of the server executable, without the platform suffix.
pub const SERVER_EXECUTABLE_STEM: &str = "mysqld";

/// Base name of the administrative client used for shutdown, without the platform suffix.
pub const ADMIN_EXECUTABLE_STEM: &str = "mysqladmin";

/// Optional credentials file handed to the admin client via `--defaults-extra-file`.
pub const CREDENTIALS_FILE_NAME: &str = "mylogin.cnf";

/// Returns the platform-specific file name for an executable stem (`mysqld.exe` on Windows).
pub fn executable_name(stem: &str) -> String {
    format!("{stem}{EXE_SUFFIX}")
}

// ============================================================================
// Shutdown Negotiation
// ============================================================================

/// Administrative account used for the password-less shutdown attempt.
pub const ADMIN_USER: &str = "root";

/// Directive passed to the admin client to stop the server.
pub const SHUTDOWN_DIRECTIVE: &str = "shutdown";

/// Flag prefix pointing the admin client at the credentials file.
pub const DEFAULTS_EXTRA_FILE_FLAG: &str = "--defaults-extra-file=";

/// Bound applied to every shutdown command invocation.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Polling interval while waiting on a shutdown command.
pub const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Interval between probes while waiting for the server to disappear after shutdown.
pub const PROCESS_CHECK_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Tray Presentation
// ============================================================================

/// Display name used in tray titles and notifications.
pub const SERVER_DISPLAY_NAME: &str = "MySQL";

/// Application name used for the tray tooltip and log file prefix.
pub const APP_NAME: &str = "sqltray";

/// Directory (relative to the base directory) holding the tray's own log file.
pub const LOG_DIR_NAME: &str = "logs";

/// Number of notifications kept on screen.
pub const MAX_VISIBLE_NOTIFICATIONS: usize = 3;

/// How long the UI loop waits for terminal input before draining status updates.
pub const UI_POLL_INTERVAL: Duration = Duration::from_millis(100);
