use std::error::Error;

use tracing::{error, info};

use sqltray::{
    cli::{Cli, parse_args},
    config::TrayConfig,
    controller::{Components, Controller},
    logs::{LogTarget, init_logging, resolve_log_path},
    status::status_channel,
    tray::{MenuAction, TrayState, run_headless, run_interactive},
};

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    let config = args.to_config()?;
    init_tray_logging(&args, &config)?;

    info!(
        "Managing {} in {:?}",
        config.layout.server_executable.display(),
        config.layout.base_dir
    );

    let (publisher, updates) = status_channel();
    let controller = Controller::new(Components::from_config(&config), publisher);
    register_signal_handler(&controller)?;

    let state = TrayState::initial(controller.server_running());

    if config.autostart
        && let Err(err) = controller.dispatch(MenuAction::Start)
    {
        error!("{err}");
    }

    let state = if config.headless {
        run_headless(updates, state)
    } else {
        run_interactive(&controller, updates, state, config.color)?
    };

    info!("sqltray exiting: {}", state.title);
    Ok(())
}

fn init_tray_logging(args: &Cli, config: &TrayConfig) -> Result<(), Box<dyn Error>> {
    // The interactive tray owns the terminal, so its log lines go to a file.
    let target = if config.headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(resolve_log_path(&config.layout.base_dir))
    };
    init_logging(args.log_level.map(|level| level.as_str()), &target)?;
    Ok(())
}

/// Ctrl-C behaves like the Exit menu entry: the tray only closes once the server is down.
fn register_signal_handler(controller: &Controller) -> Result<(), Box<dyn Error>> {
    let controller = controller.clone();
    ctrlc::set_handler(move || {
        info!("Interrupt received; requesting exit");
        if let Err(err) = controller.dispatch(MenuAction::Exit) {
            error!("{err}");
        }
    })?;

    Ok(())
}
