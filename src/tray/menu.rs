//! Context menu of the tray.
use strum_macros::{AsRefStr, EnumString};

use crate::constants::SERVER_DISPLAY_NAME;

/// Actions that can be triggered from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MenuAction {
    /// Start the server.
    Start,
    /// Stop the server.
    Stop,
    /// Stop the server and quit the tray.
    Exit,
}

impl MenuAction {
    /// Keyboard shortcut shown next to the item.
    pub fn shortcut(&self) -> char {
        match self {
            Self::Start => 's',
            Self::Stop => 't',
            Self::Exit => 'q',
        }
    }

    /// Maps a pressed key to an action (case-insensitive).
    pub fn from_shortcut(key: char) -> Option<Self> {
        [Self::Start, Self::Stop, Self::Exit]
            .into_iter()
            .find(|action| action.shortcut() == key.to_ascii_lowercase())
    }

    /// Text shown while the action runs.
    pub fn progress_label(&self) -> String {
        match self {
            Self::Start => format!("Starting {SERVER_DISPLAY_NAME}..."),
            Self::Stop => format!("Stopping {SERVER_DISPLAY_NAME}..."),
            Self::Exit => format!("Stopping {SERVER_DISPLAY_NAME} before exit..."),
        }
    }
}

/// A single menu entry. An entry without an action is a separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Display text.
    pub label: String,
    /// Action triggered on click.
    pub action: Option<MenuAction>,
}

impl MenuItem {
    fn action(label: String, action: MenuAction) -> Self {
        Self {
            label,
            action: Some(action),
        }
    }

    fn separator() -> Self {
        Self {
            label: String::new(),
            action: None,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.action.is_none()
    }
}

/// Builds the fixed tray menu.
pub fn build_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::action(format!("Start {SERVER_DISPLAY_NAME}"), MenuAction::Start),
        MenuItem::action(format!("Stop {SERVER_DISPLAY_NAME}"), MenuAction::Stop),
        MenuItem::separator(),
        MenuItem::action("Exit".into(), MenuAction::Exit),
    ]
}
