#![cfg(target_os = "linux")]

#[path = "common/mod.rs"]
mod common;

use std::{fs, path::Path, process::Command, time::Duration};

use common::{kill_by_name, wait_until, write_script};
use sqltray::{
    error::TrayError,
    launcher::{DetachedSpawner, Launcher, ServerSpawner},
    probe::{ProcessProbe, ProcessTableProbe},
};
use tempfile::tempdir;

const SERVER_LOOP: &str = "while true; do sleep 1; done";

fn kill(pid: u32) {
    let _ = Command::new("kill").arg(pid.to_string()).status();
}

#[test]
fn spawned_server_shows_up_in_process_table() {
    let temp = tempdir().expect("failed to create tempdir");
    let server = write_script(temp.path(), "fkmysqld1", SERVER_LOOP);
    let probe = ProcessTableProbe::new("fkmysqld1");
    assert!(!probe.is_running());

    let pid = DetachedSpawner::new(&server, temp.path())
        .spawn()
        .expect("spawn should succeed")
        .expect("spawner should report a pid");

    assert!(
        wait_until(Duration::from_secs(5), || probe.is_running()),
        "server never appeared"
    );

    kill(pid);
    assert!(
        wait_until(Duration::from_secs(5), || !probe.is_running()),
        "server never went away"
    );
}

#[test]
fn launcher_does_not_start_a_second_server() {
    let temp = tempdir().expect("failed to create tempdir");
    let server = write_script(temp.path(), "fkmysqld2", SERVER_LOOP);
    let probe = ProcessTableProbe::new("fkmysqld2");
    let spawner = DetachedSpawner::new(&server, temp.path());
    let launcher = Launcher::new(&probe, &spawner);

    assert!(launcher.launch().expect("first launch").started);
    assert!(wait_until(Duration::from_secs(5), || probe.is_running()));
    assert!(!launcher.launch().expect("second launch").started);

    kill_by_name("fkmysqld2");
    assert!(wait_until(Duration::from_secs(5), || !probe.is_running()));
}

#[test]
fn server_runs_in_base_dir() {
    let temp = tempdir().expect("failed to create tempdir");
    let base = temp.path().canonicalize().expect("failed to canonicalize tempdir");
    let server = write_script(&base, "fkmysqld3", &format!("pwd -P > cwd.txt\n{SERVER_LOOP}"));
    let probe = ProcessTableProbe::new("fkmysqld3");

    DetachedSpawner::new(&server, &base)
        .spawn()
        .expect("spawn should succeed");

    let cwd_file = base.join("cwd.txt");
    assert!(
        wait_until(Duration::from_secs(5), || fs::read_to_string(&cwd_file)
            .map(|cwd| !cwd.trim().is_empty())
            .unwrap_or(false)),
        "server never wrote its working directory"
    );
    let cwd = fs::read_to_string(&cwd_file).expect("failed to read cwd file");
    assert_eq!(Path::new(cwd.trim()), base);
    assert!(wait_until(Duration::from_secs(5), || probe.is_running()));

    kill_by_name("fkmysqld3");
    assert!(wait_until(Duration::from_secs(5), || !probe.is_running()));
}

#[test]
fn missing_server_executable_fails_to_spawn() {
    let temp = tempdir().expect("failed to create tempdir");
    let err = DetachedSpawner::new(temp.path().join("mysqld"), temp.path())
        .spawn()
        .expect_err("spawn cannot succeed");

    assert!(matches!(err, TrayError::ProcessSpawn { .. }), "{err}");
}
