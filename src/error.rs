//! Error handling for sqltray.
use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Defines all possible errors that can occur while controlling the server.
#[derive(Debug, Error)]
pub enum TrayError {
    /// The server executable could not be launched (missing, not executable, ...).
    #[error("Failed to start '{}': {source}", .program.display())]
    ProcessSpawn {
        /// The executable that failed to launch.
        program: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// The shutdown command did not finish within its time bound.
    #[error("Shutdown command did not finish within {timeout:?}")]
    ShutdownTimeout {
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The shutdown command ran but exited unsuccessfully.
    #[error("Shutdown command exited with status {code:?}{}", stderr_suffix(.stderr))]
    ShutdownRejected {
        /// Exit code, if the command exited normally.
        code: Option<i32>,
        /// Trimmed standard error output of the command.
        stderr: String,
    },

    /// The no-password attempt failed and there is no credentials file to fall back on.
    #[error("No credentials file found at '{}'", .path.display())]
    CredentialsMissing {
        /// Where the credentials file was expected.
        path: PathBuf,
    },

    /// The OS refused to run the shutdown command itself.
    #[error("Failed to run '{}': {source}", .program.display())]
    UnexpectedInvocation {
        /// The shutdown executable.
        program: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Another start/stop/exit action is still running.
    #[error("Another action is already in progress")]
    Busy,

    /// A worker thread for a tray action could not be started.
    #[error("Failed to start worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A duration flag could not be parsed.
    #[error("Invalid duration value: '{0}'")]
    InvalidDuration(String),

    /// The directory holding the executable could not be determined.
    #[error("Unable to determine the application directory: {0}")]
    BaseDirUnavailable(#[source] std::io::Error),

    /// The interactive terminal front-end failed.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TrayError>;
