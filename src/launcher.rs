//! Starting the server process.
use std::{
    path::PathBuf,
    process::{Command, Stdio},
    thread,
};

use tracing::{debug, info, warn};

use crate::error::{Result, TrayError};
use crate::probe::ProcessProbe;

/// Starts a new server process without waiting for it.
pub trait ServerSpawner: Send + Sync {
    /// Returns the PID of the new process, if known.
    fn spawn(&self) -> Result<Option<u32>>;
}

/// Spawns the server executable detached from the tray.
///
/// The child gets no arguments, the base directory as its working directory, null stdio,
/// and (on Unix) its own process group so terminal signals aimed at the tray do not reach
/// it. A background thread reaps it when it exits.
#[derive(Debug, Clone)]
pub struct DetachedSpawner {
    program: PathBuf,
    working_dir: PathBuf,
}

impl DetachedSpawner {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl ServerSpawner for DetachedSpawner {
    fn spawn(&self) -> Result<Option<u32>> {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|source| TrayError::ProcessSpawn {
            program: self.program.clone(),
            source,
        })?;
        let pid = child.id();

        let reaper = thread::Builder::new()
            .name(format!("reaper-{pid}"))
            .spawn(move || match child.wait() {
                Ok(status) => info!("Server process {pid} exited with {status}"),
                Err(err) => warn!("Failed to wait on server process {pid}: {err}"),
            });
        if let Err(err) = reaper {
            warn!("Could not start reaper for server process {pid}: {err}");
        }

        Ok(Some(pid))
    }
}

/// Whether a launch actually started anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchResult {
    pub started: bool,
}

/// Starts the server unless it is already up.
pub struct Launcher<'a> {
    probe: &'a dyn ProcessProbe,
    spawner: &'a dyn ServerSpawner,
}

impl<'a> Launcher<'a> {
    pub fn new(probe: &'a dyn ProcessProbe, spawner: &'a dyn ServerSpawner) -> Self {
        Self { probe, spawner }
    }

    /// Idempotent: a running server is left alone and reported as `started: false`.
    pub fn launch(&self) -> Result<LaunchResult> {
        if self.probe.is_running() {
            debug!("Server already running; skipping launch");
            return Ok(LaunchResult { started: false });
        }

        let pid = self.spawner.spawn()?;
        match pid {
            Some(pid) => info!("Launched server process {pid}"),
            None => info!("Launched server process"),
        }
        Ok(LaunchResult { started: true })
    }
}
