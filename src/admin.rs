//! Invocation of the admin client's `shutdown` directive.
use std::{
    ffi::OsString,
    io::Read,
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::constants::{
    ADMIN_USER, COMMAND_POLL_INTERVAL, DEFAULTS_EXTRA_FILE_FLAG, SHUTDOWN_DIRECTIVE,
};
use crate::error::{Result, TrayError};

/// How a shutdown command authenticates against the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Connect as `user` without a password.
    NoPassword {
        /// Account name passed with `-u`.
        user: String,
    },
    /// Read user and password from an option file.
    CredentialsFile(PathBuf),
}

impl AuthMode {
    /// Password-less attempt as the standard administrative account.
    pub fn admin_without_password() -> Self {
        Self::NoPassword {
            user: ADMIN_USER.to_string(),
        }
    }

    /// Full argument list for the admin client, ending with the shutdown directive.
    pub fn command_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = match self {
            Self::NoPassword { user } => vec!["-u".into(), user.into()],
            Self::CredentialsFile(path) => {
                let mut flag = OsString::from(DEFAULTS_EXTRA_FILE_FLAG);
                flag.push(path.as_os_str());
                vec![flag]
            }
        };
        args.push(SHUTDOWN_DIRECTIVE.into());
        args
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoPassword { .. } => "no-password",
            Self::CredentialsFile(_) => "credentials-file",
        }
    }
}

/// Runs one shutdown command and reports how it ended.
///
/// `Ok(())` means the command exited with status 0. Failures are reported as
/// [`TrayError::ShutdownRejected`], [`TrayError::ShutdownTimeout`] or
/// [`TrayError::UnexpectedInvocation`].
pub trait ShutdownInvoker: Send + Sync {
    fn invoke(&self, auth: &AuthMode, timeout: Duration) -> Result<()>;
}

/// The real admin client on disk.
#[derive(Debug, Clone)]
pub struct AdminCommand {
    program: PathBuf,
    working_dir: PathBuf,
}

impl AdminCommand {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl ShutdownInvoker for AdminCommand {
    fn invoke(&self, auth: &AuthMode, timeout: Duration) -> Result<()> {
        debug!(
            "Running {} {} shutdown (timeout {:?})",
            self.program.display(),
            auth.label(),
            timeout
        );

        let mut child = Command::new(&self.program)
            .args(auth.command_args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TrayError::UnexpectedInvocation {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(capture);
        let stderr = child.stderr.take().map(capture);

        let status = match wait_with_timeout(&mut child, timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!(
                    "{} shutdown timed out after {:?}. Terminating command.",
                    auth.label(),
                    timeout
                );
                if let Err(err) = child.kill() {
                    warn!("Failed to terminate timed-out shutdown command: {err}");
                }
                let _ = child.wait();
                return Err(TrayError::ShutdownTimeout { timeout });
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TrayError::UnexpectedInvocation {
                    program: self.program.clone(),
                    source,
                });
            }
        };

        let stdout = collect(stdout);
        if !stdout.is_empty() {
            debug!("{} shutdown output: {stdout}", auth.label());
        }

        if status.success() {
            return Ok(());
        }

        let stderr = collect(stderr);
        Err(TrayError::ShutdownRejected {
            code: status.code(),
            stderr,
        })
    }
}

/// Drains a child pipe on a helper thread so a chatty command cannot fill it.
fn capture(mut pipe: impl Read + Send + 'static) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut raw = Vec::new();
        let _ = pipe.read_to_end(&mut raw);
        String::from_utf8_lossy(&raw).trim().to_string()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Wait for a child process with a timeout, returning `Ok(None)` on timeout.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status)),
            None => {
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                thread::sleep(COMMAND_POLL_INTERVAL);
            }
        }
    }
}
