//! Status reports and the channel that carries them to the UI thread.
//!
//! Worker threads never touch the tray directly. They publish [`TrayUpdate`] values through
//! a [`StatusPublisher`]; the UI loop owns the receiving end and is the only place where
//! the visible state changes.
use std::sync::mpsc;

use strum_macros::{AsRefStr, EnumString};
use tracing::debug;

/// Color of the tray icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum IconState {
    /// State unknown or never changed.
    #[default]
    Gray,
    /// Server running.
    Green,
    /// Server stopped by the tray.
    Red,
}

/// Title plus optional icon change, published after every controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub title: String,
    /// `None` leaves the current icon as is.
    pub icon: Option<IconState>,
}

impl StatusReport {
    pub fn new(title: impl Into<String>, icon: IconState) -> Self {
        Self {
            title: title.into(),
            icon: Some(icon),
        }
    }

    /// A report that only changes the title.
    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: None,
        }
    }
}

/// User-facing error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

/// Messages from workers to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayUpdate {
    Status(StatusReport),
    Notify(Notification),
    /// The server is down and the tray may terminate.
    Exit,
}

/// Sending half handed to worker threads.
#[derive(Debug, Clone)]
pub struct StatusPublisher {
    tx: mpsc::Sender<TrayUpdate>,
}

/// Creates a publisher and the receiver the UI loop drains.
pub fn status_channel() -> (StatusPublisher, mpsc::Receiver<TrayUpdate>) {
    let (tx, rx) = mpsc::channel();
    (StatusPublisher { tx }, rx)
}

impl StatusPublisher {
    pub fn publish(&self, report: StatusReport) {
        self.send(TrayUpdate::Status(report));
    }

    /// Publishes a failure: the status report always accompanies the notification so the
    /// icon and the message never disagree.
    pub fn publish_failure(&self, report: StatusReport, message: impl Into<String>) {
        self.send(TrayUpdate::Status(report));
        self.send(TrayUpdate::Notify(Notification {
            message: message.into(),
        }));
    }

    pub fn request_exit(&self) {
        self.send(TrayUpdate::Exit);
    }

    fn send(&self, update: TrayUpdate) {
        if self.tx.send(update).is_err() {
            debug!("Tray UI is gone; dropping status update");
        }
    }
}
