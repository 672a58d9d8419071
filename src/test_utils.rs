//! In-memory stand-ins used by unit and integration tests.
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::admin::{AuthMode, ShutdownInvoker};
use crate::error::{Result, TrayError};
use crate::launcher::ServerSpawner;
use crate::probe::ProcessProbe;

/// How the fake admin client answers the next shutdown invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Exit 0 and take the server down.
    Success,
    /// Exit with the given nonzero code.
    Exit(i32),
    /// Exceed the time bound.
    Timeout,
    /// The admin client cannot be started.
    LaunchError,
}

#[derive(Default)]
struct FakeState {
    alive: AtomicBool,
    fail_spawns: AtomicBool,
    spawns: AtomicUsize,
    replies: Mutex<VecDeque<ScriptedReply>>,
    invocations: Mutex<Vec<AuthMode>>,
}

/// A controllable server: probe, spawner and admin client in one.
///
/// Unscripted shutdown invocations answer with exit code 1.
#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<FakeState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeServer {
    pub fn running() -> Self {
        let server = Self::default();
        server.state.alive.store(true, Ordering::SeqCst);
        server
    }

    pub fn stopped() -> Self {
        Self::default()
    }

    /// Replaces the queue of replies for upcoming shutdown invocations.
    pub fn script(&self, replies: impl IntoIterator<Item = ScriptedReply>) {
        *lock(&self.state.replies) = replies.into_iter().collect();
    }

    /// Makes every subsequent spawn fail.
    pub fn fail_spawns(&self) {
        self.state.fail_spawns.store(true, Ordering::SeqCst);
    }

    pub fn set_alive(&self, alive: bool) {
        self.state.alive.store(alive, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.state.alive.load(Ordering::SeqCst)
    }

    pub fn spawn_count(&self) -> usize {
        self.state.spawns.load(Ordering::SeqCst)
    }

    /// Every shutdown invocation so far, in order.
    pub fn invocations(&self) -> Vec<AuthMode> {
        lock(&self.state.invocations).clone()
    }
}

impl ProcessProbe for FakeServer {
    fn is_running(&self) -> bool {
        self.is_alive()
    }
}

impl ServerSpawner for FakeServer {
    fn spawn(&self) -> Result<Option<u32>> {
        if self.state.fail_spawns.load(Ordering::SeqCst) {
            return Err(TrayError::ProcessSpawn {
                program: PathBuf::from("mysqld"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        self.state.spawns.fetch_add(1, Ordering::SeqCst);
        self.set_alive(true);
        Ok(None)
    }
}

impl ShutdownInvoker for FakeServer {
    fn invoke(&self, auth: &AuthMode, timeout: Duration) -> Result<()> {
        lock(&self.state.invocations).push(auth.clone());
        let reply = lock(&self.state.replies)
            .pop_front()
            .unwrap_or(ScriptedReply::Exit(1));

        match reply {
            ScriptedReply::Success => {
                self.set_alive(false);
                Ok(())
            }
            ScriptedReply::Exit(code) => Err(TrayError::ShutdownRejected {
                code: Some(code),
                stderr: "Access denied for user 'root'@'localhost'".into(),
            }),
            ScriptedReply::Timeout => Err(TrayError::ShutdownTimeout { timeout }),
            ScriptedReply::LaunchError => Err(TrayError::UnexpectedInvocation {
                program: PathBuf::from("mysqladmin"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}
