//! Tray front-ends.
//!
//! The tray loop runs on the thread that owns the visible state. It turns menu input into
//! [`MenuAction`]s for the [`Controller`](crate::controller::Controller) and applies the
//! [`TrayUpdate`](crate::status::TrayUpdate)s that come back. Two renderers exist:
//! - [`run_interactive`]: a terminal status icon and menu (crossterm)
//! - [`run_headless`]: no UI, updates go to the log

mod headless;
mod menu;
mod state;
mod terminal;

pub use headless::run_headless;
pub use menu::{MenuAction, MenuItem, build_menu};
pub use state::{Flow, TrayState};
pub use terminal::run_interactive;
