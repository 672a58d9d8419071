//! Graceful shutdown negotiation.
//!
//! Stopping the server needs credentials only on installations where the administrative
//! account has a password, and that can change while the tray is running. The negotiator
//! therefore escalates through two strategies:
//!
//! 1. `mysqladmin -u root shutdown` with no password.
//! 2. `mysqladmin --defaults-extra-file=<mylogin.cnf> shutdown`, only when the first attempt
//!    failed and the credentials file exists at that moment.
//!
//! A timed-out command counts as a failed one. Every run ends in exactly one
//! [`ShutdownOutcome`] after at most two command invocations.
use std::{
    fmt,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::admin::{AuthMode, ShutdownInvoker};
use crate::constants::{DEFAULT_SHUTDOWN_TIMEOUT, PROCESS_CHECK_INTERVAL};
use crate::credentials::CredentialResolver;
use crate::error::TrayError;
use crate::probe::ProcessProbe;

/// Result of a single shutdown command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownAttempt {
    /// Which strategy was used.
    pub auth: AuthMode,
    /// The command exited with status 0.
    pub succeeded: bool,
    /// The command was killed after exceeding its bound.
    pub timed_out: bool,
    /// Human-readable failure description, if any.
    pub error_detail: Option<String>,
}

impl ShutdownAttempt {
    fn from_result(auth: AuthMode, result: &Result<(), TrayError>) -> Self {
        match result {
            Ok(()) => Self {
                auth,
                succeeded: true,
                timed_out: false,
                error_detail: None,
            },
            Err(err) => Self {
                auth,
                succeeded: false,
                timed_out: matches!(err, TrayError::ShutdownTimeout { .. }),
                error_detail: Some(err.to_string()),
            },
        }
    }
}

/// Terminal classification of a negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// A shutdown command succeeded.
    Stopped,
    /// The server was not running to begin with.
    NotRunning,
    /// The credentials file exists but the server rejected it (or the attempt timed out).
    FailedInvalidCredentials,
    /// The password-less attempt failed and there is no credentials file.
    FailedMissingCredentials,
    /// The authenticated shutdown command could not be run at all.
    FailedError(String),
}

impl ShutdownOutcome {
    /// `true` when the server is known to be down afterwards.
    pub fn is_server_down(&self) -> bool {
        matches!(self, Self::Stopped | Self::NotRunning)
    }
}

impl fmt::Display for ShutdownOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::NotRunning => write!(f, "not running"),
            Self::FailedInvalidCredentials => write!(f, "failed (invalid credentials)"),
            Self::FailedMissingCredentials => write!(f, "failed (missing credentials)"),
            Self::FailedError(detail) => write!(f, "failed ({detail})"),
        }
    }
}

/// Outcome plus the attempts that led to it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    pub outcome: ShutdownOutcome,
    pub attempts: Vec<ShutdownAttempt>,
}

/// Drives the server from running to stopped.
pub struct ShutdownNegotiator<'a> {
    probe: &'a dyn ProcessProbe,
    credentials: &'a CredentialResolver,
    invoker: &'a dyn ShutdownInvoker,
    timeout: Duration,
}

impl<'a> ShutdownNegotiator<'a> {
    pub fn new(
        probe: &'a dyn ProcessProbe,
        credentials: &'a CredentialResolver,
        invoker: &'a dyn ShutdownInvoker,
    ) -> Self {
        Self {
            probe,
            credentials,
            invoker,
            timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Overrides the per-attempt bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the negotiation to a terminal outcome.
    pub fn negotiate(&self) -> Negotiation {
        let mut attempts = Vec::with_capacity(2);

        if !self.probe.is_running() {
            debug!("Server not running; nothing to shut down");
            return Negotiation {
                outcome: ShutdownOutcome::NotRunning,
                attempts,
            };
        }

        let no_password = AuthMode::admin_without_password();
        let result = self.invoker.invoke(&no_password, self.timeout);
        attempts.push(ShutdownAttempt::from_result(no_password, &result));

        match result {
            Ok(()) => {
                info!("Server accepted password-less shutdown");
                return self.finish(ShutdownOutcome::Stopped, attempts);
            }
            Err(err) => warn!("Password-less shutdown failed: {err}"),
        }

        let source = self.credentials.resolve();
        if !source.exists {
            let err = TrayError::CredentialsMissing { path: source.path };
            warn!("{err}; giving up");
            return self.finish(ShutdownOutcome::FailedMissingCredentials, attempts);
        }

        let with_credentials = AuthMode::CredentialsFile(source.path);
        let result = self.invoker.invoke(&with_credentials, self.timeout);
        attempts.push(ShutdownAttempt::from_result(with_credentials, &result));

        let outcome = match result {
            Ok(()) => {
                info!("Server accepted shutdown with credentials file");
                ShutdownOutcome::Stopped
            }
            Err(err @ (TrayError::ShutdownRejected { .. } | TrayError::ShutdownTimeout { .. })) => {
                warn!("Shutdown with credentials file failed: {err}");
                ShutdownOutcome::FailedInvalidCredentials
            }
            Err(err) => {
                warn!("Shutdown with credentials file could not run: {err}");
                ShutdownOutcome::FailedError(err.to_string())
            }
        };

        self.finish(outcome, attempts)
    }

    fn finish(&self, outcome: ShutdownOutcome, attempts: Vec<ShutdownAttempt>) -> Negotiation {
        if outcome == ShutdownOutcome::Stopped {
            self.await_exit();
        }
        Negotiation { outcome, attempts }
    }

    /// `mysqladmin shutdown` can return slightly before the server process is gone; give it
    /// up to one more timeout period so the next probe sees the final state.
    fn await_exit(&self) {
        let deadline = Instant::now() + self.timeout;
        while self.probe.is_running() {
            if Instant::now() >= deadline {
                warn!("Server still present {:?} after shutdown succeeded", self.timeout);
                return;
            }
            std::thread::sleep(PROCESS_CHECK_INTERVAL);
        }
    }
}
