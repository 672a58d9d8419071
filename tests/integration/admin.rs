#![cfg(unix)]

#[path = "common/mod.rs"]
mod common;

use std::{
    fs,
    path::PathBuf,
    time::{Duration, Instant},
};

use common::write_script;
use sqltray::{
    admin::{AdminCommand, AuthMode, ShutdownInvoker},
    credentials::CredentialResolver,
    error::TrayError,
    probe::ProcessProbe,
    shutdown::{ShutdownNegotiator, ShutdownOutcome},
};
use tempfile::tempdir;

/// Reports the server as running while a marker file exists in the base directory.
struct MarkerProbe(PathBuf);

impl ProcessProbe for MarkerProbe {
    fn is_running(&self) -> bool {
        self.0.exists()
    }
}

#[test]
fn successful_shutdown_runs_in_base_dir() {
    let temp = tempdir().expect("failed to create tempdir");
    let dir = temp.path();
    let admin = write_script(dir, "mysqladmin", r#"echo "$@" >> calls.log; exit 0"#);

    AdminCommand::new(&admin, dir)
        .invoke(&AuthMode::admin_without_password(), Duration::from_secs(5))
        .expect("shutdown should succeed");

    let calls = fs::read_to_string(dir.join("calls.log")).expect("admin client never ran");
    assert_eq!(calls.trim(), "-u root shutdown");
}

#[test]
fn chatty_output_does_not_block_shutdown() {
    let temp = tempdir().expect("failed to create tempdir");
    let admin = write_script(
        temp.path(),
        "mysqladmin",
        "head -c 500000 /dev/zero | tr '\\0' 'x'; echo; exit 0",
    );

    AdminCommand::new(&admin, temp.path())
        .invoke(&AuthMode::admin_without_password(), Duration::from_secs(10))
        .expect("shutdown should succeed despite large output");
}

#[test]
fn nonzero_exit_is_a_rejection_with_stderr() {
    let temp = tempdir().expect("failed to create tempdir");
    let admin = write_script(
        temp.path(),
        "mysqladmin",
        r#"echo "Access denied for user 'root'@'localhost'" >&2; exit 1"#,
    );

    let err = AdminCommand::new(&admin, temp.path())
        .invoke(&AuthMode::admin_without_password(), Duration::from_secs(5))
        .expect_err("shutdown should be rejected");

    match err {
        TrayError::ShutdownRejected { code, stderr } => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("Access denied"), "stderr was {stderr:?}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn hanging_command_is_killed_at_the_bound() {
    let temp = tempdir().expect("failed to create tempdir");
    let admin = write_script(temp.path(), "mysqladmin", "exec sleep 30");

    let started = Instant::now();
    let err = AdminCommand::new(&admin, temp.path())
        .invoke(&AuthMode::admin_without_password(), Duration::from_millis(300))
        .expect_err("shutdown should time out");

    assert!(matches!(err, TrayError::ShutdownTimeout { .. }), "{err}");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn missing_admin_client_is_unexpected() {
    let temp = tempdir().expect("failed to create tempdir");
    let err = AdminCommand::new(temp.path().join("mysqladmin"), temp.path())
        .invoke(&AuthMode::admin_without_password(), Duration::from_secs(1))
        .expect_err("missing executable cannot succeed");

    assert!(matches!(err, TrayError::UnexpectedInvocation { .. }), "{err}");
}

#[test]
fn negotiation_escalates_to_login_file() {
    let temp = tempdir().expect("failed to create tempdir");
    let dir = temp.path();
    let marker = dir.join("running");
    fs::write(&marker, "").expect("failed to write marker");
    let login = dir.join("mylogin.cnf");
    fs::write(&login, "[client]\nuser=root\npassword=secret\n").expect("failed to write login");

    let admin = write_script(
        dir,
        "mysqladmin",
        r#"echo "$@" >> calls.log
case "$1" in
  --defaults-extra-file=*) rm -f running; exit 0 ;;
  *) echo "Access denied" >&2; exit 1 ;;
esac"#,
    );

    let probe = MarkerProbe(marker.clone());
    let credentials = CredentialResolver::new(&login);
    let invoker = AdminCommand::new(&admin, dir);
    let negotiation = ShutdownNegotiator::new(&probe, &credentials, &invoker)
        .with_timeout(Duration::from_secs(5))
        .negotiate();

    assert_eq!(negotiation.outcome, ShutdownOutcome::Stopped);
    assert_eq!(negotiation.attempts.len(), 2);
    assert!(!negotiation.attempts[0].succeeded);
    assert!(negotiation.attempts[1].succeeded);
    assert!(!marker.exists());

    let calls = fs::read_to_string(dir.join("calls.log")).expect("admin client never ran");
    let calls: Vec<_> = calls.lines().collect();
    assert_eq!(calls[0], "-u root shutdown");
    assert_eq!(
        calls[1],
        format!("--defaults-extra-file={} shutdown", login.display())
    );
}

#[test]
fn negotiation_reports_rejected_login_file() {
    let temp = tempdir().expect("failed to create tempdir");
    let dir = temp.path();
    let marker = dir.join("running");
    fs::write(&marker, "").expect("failed to write marker");
    let login = dir.join("mylogin.cnf");
    fs::write(&login, "[client]\npassword=wrong\n").expect("failed to write login");
    let admin = write_script(dir, "mysqladmin", r#"echo "Access denied" >&2; exit 1"#);

    let probe = MarkerProbe(marker.clone());
    let credentials = CredentialResolver::new(&login);
    let invoker = AdminCommand::new(&admin, dir);
    let negotiation = ShutdownNegotiator::new(&probe, &credentials, &invoker)
        .with_timeout(Duration::from_secs(5))
        .negotiate();

    assert_eq!(negotiation.outcome, ShutdownOutcome::FailedInvalidCredentials);
    assert_eq!(negotiation.attempts.len(), 2);
    assert!(marker.exists());
}
