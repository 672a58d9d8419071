//! The three user-facing actions: start, stop, and exit.
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{error, info, warn};

use crate::admin::{AdminCommand, ShutdownInvoker};
use crate::config::TrayConfig;
use crate::constants::{CREDENTIALS_FILE_NAME, SERVER_DISPLAY_NAME};
use crate::credentials::CredentialResolver;
use crate::error::{Result, TrayError};
use crate::launcher::{DetachedSpawner, Launcher, ServerSpawner};
use crate::probe::{ProcessProbe, ProcessTableProbe};
use crate::shutdown::{ShutdownNegotiator, ShutdownOutcome};
use crate::status::{IconState, StatusPublisher, StatusReport};
use crate::tray::MenuAction;

/// Collaborators the controller drives.
pub struct Components {
    pub probe: Box<dyn ProcessProbe>,
    pub spawner: Box<dyn ServerSpawner>,
    pub invoker: Box<dyn ShutdownInvoker>,
    pub credentials: CredentialResolver,
    pub shutdown_timeout: Duration,
}

impl Components {
    /// The real process table, executables and credentials file from `config`.
    pub fn from_config(config: &TrayConfig) -> Self {
        let layout = &config.layout;
        Self {
            probe: Box::new(ProcessTableProbe::new(layout.server_process_name())),
            spawner: Box::new(DetachedSpawner::new(
                &layout.server_executable,
                &layout.base_dir,
            )),
            invoker: Box::new(AdminCommand::new(
                &layout.admin_executable,
                &layout.base_dir,
            )),
            credentials: CredentialResolver::new(&layout.credentials_file),
            shutdown_timeout: config.shutdown_timeout,
        }
    }
}

/// What an action ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Launched,
    AlreadyRunning,
    LaunchFailed(String),
    Shutdown(ShutdownOutcome),
    /// The server is down; the tray was told to terminate.
    ExitApproved(ShutdownOutcome),
    /// Shutdown failed; the tray stays alive.
    ExitAborted(ShutdownOutcome),
    /// Another action was still running.
    Busy,
}

struct Shared {
    components: Components,
    publisher: StatusPublisher,
    busy: AtomicBool,
    /// Latched once an exit is approved; no action may run afterwards.
    closing: AtomicBool,
}

/// Releases the action slot when dropped.
struct ActionGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl Shared {
    fn begin(&self) -> Option<ActionGuard<'_>> {
        if self.closing.load(Ordering::Acquire) {
            return None;
        }
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ActionGuard { busy: &self.busy })
    }
}

/// Orchestrates probe, launcher and negotiator, and reports every result to the tray.
///
/// Cheap to clone; clones share the same components and the same action slot, so at most
/// one action runs at a time.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl Controller {
    pub fn new(components: Components, publisher: StatusPublisher) -> Self {
        Self {
            shared: Arc::new(Shared {
                components,
                publisher,
                busy: AtomicBool::new(false),
                closing: AtomicBool::new(false),
            }),
        }
    }

    /// Current liveness of the server, for the tray's initial state.
    pub fn server_running(&self) -> bool {
        self.shared.components.probe.is_running()
    }

    /// Runs `action` on a fresh worker thread. A worker that cannot be started is reported
    /// to the tray as well as returned.
    pub fn dispatch(&self, action: MenuAction) -> Result<JoinHandle<ActionOutcome>> {
        let controller = self.clone();
        thread::Builder::new()
            .name(format!("action-{}", action.as_ref()))
            .spawn(move || controller.run(action))
            .map_err(|source| {
                let err = TrayError::WorkerSpawn(source);
                self.report_dispatch_failure(action, &err);
                err
            })
    }

    /// Runs `action` on the calling thread.
    pub fn run(&self, action: MenuAction) -> ActionOutcome {
        match action {
            MenuAction::Start => self.start(),
            MenuAction::Stop => self.stop(),
            MenuAction::Exit => self.exit_request(),
        }
    }

    /// Starts the server unless it is already running.
    pub fn start(&self) -> ActionOutcome {
        let Some(_guard) = self.shared.begin() else {
            return self.reject_busy(MenuAction::Start);
        };
        let components = &self.shared.components;
        let publisher = &self.shared.publisher;

        let launcher = Launcher::new(&*components.probe, &*components.spawner);
        match launcher.launch() {
            Ok(result) if result.started => {
                info!("{SERVER_DISPLAY_NAME} started");
                publisher.publish(StatusReport::new(
                    format!("{SERVER_DISPLAY_NAME} is running"),
                    IconState::Green,
                ));
                ActionOutcome::Launched
            }
            Ok(_) => {
                info!("{SERVER_DISPLAY_NAME} already running");
                publisher.publish(StatusReport::title_only(format!(
                    "{SERVER_DISPLAY_NAME} is already running"
                )));
                ActionOutcome::AlreadyRunning
            }
            Err(err) => {
                error!("Failed to start {SERVER_DISPLAY_NAME}: {err}");
                publisher.publish_failure(
                    StatusReport::title_only(format!("Failed to start {SERVER_DISPLAY_NAME}")),
                    format!("{SERVER_DISPLAY_NAME} could not be started: {err}"),
                );
                ActionOutcome::LaunchFailed(err.to_string())
            }
        }
    }

    /// Negotiates a graceful shutdown and reports the outcome.
    pub fn stop(&self) -> ActionOutcome {
        let Some(_guard) = self.shared.begin() else {
            return self.reject_busy(MenuAction::Stop);
        };

        let outcome = self.negotiate();
        let (report, message) = stop_report(&outcome);
        self.publish(report, message);
        ActionOutcome::Shutdown(outcome)
    }

    /// Like [`Controller::stop`], but on success the tray is told to terminate. On failure
    /// the tray stays up so the user can fix the problem and retry.
    pub fn exit_request(&self) -> ActionOutcome {
        let Some(_guard) = self.shared.begin() else {
            return self.reject_busy(MenuAction::Exit);
        };

        let outcome = self.negotiate();
        if outcome.is_server_down() {
            info!("Exit approved ({outcome})");
            self.shared.closing.store(true, Ordering::Release);
            let (report, _) = stop_report(&outcome);
            self.shared.publisher.publish(report);
            self.shared.publisher.request_exit();
            return ActionOutcome::ExitApproved(outcome);
        }

        warn!("Exit aborted: shutdown {outcome}");
        let (report, message) = exit_abort_report(&outcome);
        self.publish(report, message);
        ActionOutcome::ExitAborted(outcome)
    }

    fn negotiate(&self) -> ShutdownOutcome {
        let components = &self.shared.components;
        let negotiation = ShutdownNegotiator::new(
            &*components.probe,
            &components.credentials,
            &*components.invoker,
        )
        .with_timeout(components.shutdown_timeout)
        .negotiate();

        info!(
            "Shutdown {} after {} attempt(s)",
            negotiation.outcome,
            negotiation.attempts.len()
        );
        negotiation.outcome
    }

    fn publish(&self, report: StatusReport, message: Option<String>) {
        match message {
            Some(message) => self.shared.publisher.publish_failure(report, message),
            None => self.shared.publisher.publish(report),
        }
    }

    fn report_dispatch_failure(&self, action: MenuAction, err: &TrayError) {
        error!("Could not run {} action: {err}", action.as_ref());
        self.shared.publisher.publish_failure(
            StatusReport::title_only(format!("Could not {}", action.as_ref())),
            format!("{SERVER_DISPLAY_NAME} {} request failed: {err}", action.as_ref()),
        );
    }

    fn reject_busy(&self, action: MenuAction) -> ActionOutcome {
        warn!("Rejecting {} request: {}", action.as_ref(), TrayError::Busy);
        self.shared.publisher.publish(StatusReport::title_only(format!(
            "Another {SERVER_DISPLAY_NAME} action is in progress"
        )));
        ActionOutcome::Busy
    }
}

/// Status (and notification, for failures) shown after a stop.
fn stop_report(outcome: &ShutdownOutcome) -> (StatusReport, Option<String>) {
    match outcome {
        ShutdownOutcome::Stopped => (
            StatusReport::new(format!("{SERVER_DISPLAY_NAME} stopped"), IconState::Red),
            None,
        ),
        ShutdownOutcome::NotRunning => (
            StatusReport::title_only(format!("{SERVER_DISPLAY_NAME} is not running")),
            None,
        ),
        ShutdownOutcome::FailedInvalidCredentials => (
            StatusReport::title_only("Shutdown failed (invalid login)"),
            Some(format!(
                "{SERVER_DISPLAY_NAME} shutdown failed. Invalid credentials in {CREDENTIALS_FILE_NAME}."
            )),
        ),
        ShutdownOutcome::FailedMissingCredentials => (
            StatusReport::title_only("Shutdown failed (missing login file)"),
            Some(format!(
                "{SERVER_DISPLAY_NAME} shutdown failed. You probably have a password set but no login file.\n\
                 Create a '{CREDENTIALS_FILE_NAME}' file with your credentials to allow stopping {SERVER_DISPLAY_NAME}."
            )),
        ),
        ShutdownOutcome::FailedError(detail) => (
            StatusReport::title_only("Shutdown failed (error)"),
            Some(format!("{SERVER_DISPLAY_NAME} shutdown failed: {detail}")),
        ),
    }
}

/// Status and notification when an exit is aborted. Only called for failures.
fn exit_abort_report(outcome: &ShutdownOutcome) -> (StatusReport, Option<String>) {
    match outcome {
        ShutdownOutcome::FailedInvalidCredentials => (
            StatusReport::title_only("Exit aborted due to invalid credentials"),
            Some(format!(
                "Could not stop {SERVER_DISPLAY_NAME}.\nCheck if the login credentials are correct."
            )),
        ),
        ShutdownOutcome::FailedMissingCredentials => (
            StatusReport::title_only("Exit aborted (missing login file)"),
            Some(format!(
                "Cannot stop {SERVER_DISPLAY_NAME}.\nShutdown without password failed and no login file found.\n\
                 Create a '{CREDENTIALS_FILE_NAME}' with your credentials to allow stopping {SERVER_DISPLAY_NAME}."
            )),
        ),
        ShutdownOutcome::FailedError(detail) => (
            StatusReport::title_only("Exit aborted due to error"),
            Some(format!("{SERVER_DISPLAY_NAME} shutdown failed: {detail}")),
        ),
        ShutdownOutcome::Stopped | ShutdownOutcome::NotRunning => stop_report(outcome),
    }
}
