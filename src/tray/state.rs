//! What the tray currently shows. Owned by the UI thread only.
use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::constants::{MAX_VISIBLE_NOTIFICATIONS, SERVER_DISPLAY_NAME};
use crate::status::{IconState, Notification, StatusReport, TrayUpdate};
use crate::tray::menu::MenuAction;

/// Whether the UI loop keeps going after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone)]
pub struct TrayState {
    pub title: String,
    pub icon: IconState,
    pub updated_at: Option<DateTime<Local>>,
    /// Action dispatched but not yet reported back.
    pub pending: Option<MenuAction>,
    notifications: VecDeque<Notification>,
}

impl TrayState {
    /// State shown before any action, from a single probe.
    pub fn initial(server_running: bool) -> Self {
        let (title, icon) = if server_running {
            (format!("{SERVER_DISPLAY_NAME} is running"), IconState::Green)
        } else {
            (format!("{SERVER_DISPLAY_NAME} is not running"), IconState::Gray)
        };
        Self {
            title,
            icon,
            updated_at: None,
            pending: None,
            notifications: VecDeque::new(),
        }
    }

    pub fn apply(&mut self, update: TrayUpdate) -> Flow {
        match update {
            TrayUpdate::Status(StatusReport { title, icon }) => {
                self.title = title;
                if let Some(icon) = icon {
                    self.icon = icon;
                }
                self.pending = None;
                self.updated_at = Some(Local::now());
            }
            TrayUpdate::Notify(notification) => {
                if self.notifications.len() == MAX_VISIBLE_NOTIFICATIONS {
                    self.notifications.pop_front();
                }
                self.notifications.push_back(notification);
            }
            TrayUpdate::Exit => return Flow::Exit,
        }
        Flow::Continue
    }

    /// Most recent last.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn dismiss_notifications(&mut self) {
        self.notifications.clear();
    }

    /// Tooltip-style summary line.
    pub fn headline(&self) -> String {
        match self.pending {
            Some(action) => action.progress_label(),
            None => self.title.clone(),
        }
    }
}
