use std::sync::mpsc::Receiver;

use tracing::{error, info};

use crate::status::TrayUpdate;
use crate::tray::state::{Flow, TrayState};

/// Blocks on status updates until an approved exit arrives (or every publisher is gone),
/// logging each change. Returns the final state.
pub fn run_headless(updates: Receiver<TrayUpdate>, mut state: TrayState) -> TrayState {
    info!("[{}] {}", state.icon.as_ref(), state.title);

    while let Ok(update) = updates.recv() {
        match &update {
            TrayUpdate::Status(_) => {}
            TrayUpdate::Notify(notification) => error!("{}", notification.message),
            TrayUpdate::Exit => info!("Server is down; exiting"),
        }

        let is_status = matches!(update, TrayUpdate::Status(_));
        if state.apply(update) == Flow::Exit {
            break;
        }
        if is_status {
            info!("[{}] {}", state.icon.as_ref(), state.title);
        }
    }

    state
}
