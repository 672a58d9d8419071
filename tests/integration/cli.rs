use assert_cmd::{Command, cargo::cargo_bin};
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn help_lists_tray_options() {
    Command::new(cargo_bin!("sqltray"))
        .arg("--help")
        .assert()
        .success()
        .stdout(
            contains("--shutdown-timeout")
                .and(contains("--headless"))
                .and(contains("--base-dir")),
        );
}

#[test]
fn invalid_shutdown_timeout_is_rejected() {
    let temp = tempdir().expect("failed to create tempdir");
    Command::new(cargo_bin!("sqltray"))
        .arg("--headless")
        .arg("--base-dir")
        .arg(temp.path())
        .args(["--shutdown-timeout", "soon"])
        .assert()
        .failure()
        .stderr(contains("soon"));
}

#[test]
fn invalid_log_level_is_rejected() {
    Command::new(cargo_bin!("sqltray"))
        .args(["--headless", "--log-level", "loud"])
        .assert()
        .failure()
        .stderr(contains("invalid log level"));
}
