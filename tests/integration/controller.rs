use std::{fs, path::Path, sync::mpsc::Receiver, time::Duration};

use sqltray::{
    admin::AuthMode,
    controller::{ActionOutcome, Components, Controller},
    credentials::CredentialResolver,
    shutdown::ShutdownOutcome,
    status::{IconState, StatusReport, TrayUpdate, status_channel},
    test_utils::{FakeServer, ScriptedReply},
    tray::{Flow, MenuAction, TrayState},
};
use tempfile::tempdir;

fn controller_for(
    server: &FakeServer,
    credentials: &Path,
) -> (Controller, Receiver<TrayUpdate>) {
    let (publisher, rx) = status_channel();
    let components = Components {
        probe: Box::new(server.clone()),
        spawner: Box::new(server.clone()),
        invoker: Box::new(server.clone()),
        credentials: CredentialResolver::new(credentials),
        shutdown_timeout: Duration::from_millis(200),
    };
    (Controller::new(components, publisher), rx)
}

fn drain(rx: &Receiver<TrayUpdate>) -> Vec<TrayUpdate> {
    rx.try_iter().collect()
}

fn statuses(updates: &[TrayUpdate]) -> Vec<StatusReport> {
    updates
        .iter()
        .filter_map(|update| match update {
            TrayUpdate::Status(report) => Some(report.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn exit_is_refused_until_login_file_exists() {
    let temp = tempdir().expect("failed to create tempdir");
    let login = temp.path().join("mylogin.cnf");

    let server = FakeServer::running();
    let (controller, rx) = controller_for(&server, &login);
    let mut state = TrayState::initial(controller.server_running());
    assert_eq!(state.icon, IconState::Green);

    // Root has a password and there is no login file yet.
    server.script([ScriptedReply::Exit(1)]);
    let outcome = controller.run(MenuAction::Exit);
    assert_eq!(
        outcome,
        ActionOutcome::ExitAborted(ShutdownOutcome::FailedMissingCredentials)
    );
    for update in drain(&rx) {
        assert_eq!(state.apply(update), Flow::Continue);
    }
    assert_eq!(state.title, "Exit aborted (missing login file)");
    assert_eq!(state.icon, IconState::Green);
    assert_eq!(state.notifications().count(), 1);
    assert!(server.is_alive());

    // The user creates the login file and retries.
    fs::write(&login, "[client]\nuser=root\npassword=secret\n").expect("failed to write login");
    server.script([ScriptedReply::Exit(1), ScriptedReply::Success]);
    let outcome = controller.run(MenuAction::Exit);
    assert_eq!(outcome, ActionOutcome::ExitApproved(ShutdownOutcome::Stopped));

    let updates = drain(&rx);
    assert_eq!(updates.last(), Some(&TrayUpdate::Exit));
    let flows: Vec<_> = updates.into_iter().map(|u| state.apply(u)).collect();
    assert_eq!(flows.last(), Some(&Flow::Exit));
    assert!(!server.is_alive());

    let invocations = server.invocations();
    assert_eq!(invocations.len(), 3);
    assert_eq!(invocations[2], AuthMode::CredentialsFile(login));
}

#[test]
fn start_then_stop_cycles_icon() {
    let temp = tempdir().expect("failed to create tempdir");
    let server = FakeServer::stopped();
    let (controller, rx) = controller_for(&server, &temp.path().join("mylogin.cnf"));

    assert_eq!(controller.run(MenuAction::Start), ActionOutcome::Launched);
    server.script([ScriptedReply::Success]);
    assert_eq!(
        controller.run(MenuAction::Stop),
        ActionOutcome::Shutdown(ShutdownOutcome::Stopped)
    );

    let reports = statuses(&drain(&rx));
    assert_eq!(
        reports,
        vec![
            StatusReport::new("MySQL is running", IconState::Green),
            StatusReport::new("MySQL stopped", IconState::Red),
        ]
    );
}

#[test]
fn exit_with_server_down_needs_no_commands() {
    let temp = tempdir().expect("failed to create tempdir");
    let server = FakeServer::stopped();
    let (controller, rx) = controller_for(&server, &temp.path().join("mylogin.cnf"));

    assert_eq!(
        controller.run(MenuAction::Exit),
        ActionOutcome::ExitApproved(ShutdownOutcome::NotRunning)
    );
    assert!(server.invocations().is_empty());
    assert_eq!(
        drain(&rx),
        vec![
            TrayUpdate::Status(StatusReport::title_only("MySQL is not running")),
            TrayUpdate::Exit,
        ]
    );

    // A start racing the tray's shutdown must not bring the server back.
    assert_eq!(controller.run(MenuAction::Start), ActionOutcome::Busy);
    assert_eq!(server.spawn_count(), 0);
}

#[test]
fn timed_out_authenticated_attempt_keeps_tray_open() {
    let temp = tempdir().expect("failed to create tempdir");
    let login = temp.path().join("mylogin.cnf");
    fs::write(&login, "[client]\n").expect("failed to write login");

    let server = FakeServer::running();
    server.script([ScriptedReply::Timeout, ScriptedReply::Timeout]);
    let (controller, rx) = controller_for(&server, &login);

    assert_eq!(
        controller.run(MenuAction::Exit),
        ActionOutcome::ExitAborted(ShutdownOutcome::FailedInvalidCredentials)
    );
    let updates = drain(&rx);
    assert!(!updates.contains(&TrayUpdate::Exit));
    assert_eq!(
        statuses(&updates),
        vec![StatusReport::title_only(
            "Exit aborted due to invalid credentials"
        )]
    );
}

#[test]
fn dispatched_actions_report_through_channel() {
    let temp = tempdir().expect("failed to create tempdir");
    let server = FakeServer::stopped();
    let (controller, rx) = controller_for(&server, &temp.path().join("mylogin.cnf"));

    let handle = controller
        .dispatch(MenuAction::Start)
        .expect("failed to dispatch");
    assert_eq!(handle.join().expect("worker panicked"), ActionOutcome::Launched);

    let update = rx
        .recv_timeout(Duration::from_secs(1))
        .expect("no status published");
    assert_eq!(
        update,
        TrayUpdate::Status(StatusReport::new("MySQL is running", IconState::Green))
    );
    assert_eq!(server.spawn_count(), 1);
}
