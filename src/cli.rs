//! Command-line interface for sqltray.
use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::config::{Layout, TrayConfig, parse_duration, resolve_base_dir};
use crate::error::Result;

/// Log verbosity, parsed from a name ("info", "debug", ...) or a number (0-5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// String representation suitable for `RUST_LOG`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("log level cannot be empty".into());
        }

        if let Ok(number) = trimmed.parse::<u8>() {
            let level = match number {
                0 => LevelFilter::OFF,
                1 => LevelFilter::ERROR,
                2 => LevelFilter::WARN,
                3 => LevelFilter::INFO,
                4 => LevelFilter::DEBUG,
                5 => LevelFilter::TRACE,
                _ => {
                    return Err(format!(
                        "unsupported log level number '{number}' (expected 0-5)"
                    ));
                }
            };
            return Ok(LogLevelArg(level));
        }

        let level = match trimmed.to_ascii_lowercase().as_str() {
            "off" => LevelFilter::OFF,
            "error" | "err" => LevelFilter::ERROR,
            "warn" | "warning" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            "trace" => LevelFilter::TRACE,
            _ => return Err(format!("invalid log level '{trimmed}'")),
        };

        Ok(LogLevelArg(level))
    }
}

/// Command-line interface for sqltray.
#[derive(Parser, Debug)]
#[command(name = "sqltray", version, author)]
#[command(
    about = "Tray controller that starts and gracefully stops a bundled MySQL server",
    long_about = None
)]
pub struct Cli {
    /// Override the logging verbosity.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Directory holding mysqld, mysqladmin and mylogin.cnf (defaults to the directory of
    /// this executable).
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Time bound for each shutdown attempt (e.g. "5", "5s", "500ms").
    #[arg(long, value_name = "DURATION", default_value = "5s")]
    pub shutdown_timeout: String,

    /// Run without the interactive tray; status changes are logged and Ctrl-C requests exit.
    #[arg(long)]
    pub headless: bool,

    /// Start the server as soon as the tray is up.
    #[arg(long)]
    pub start: bool,

    /// Disable ANSI colors.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    /// Resolves paths and durations into a [`TrayConfig`].
    pub fn to_config(&self) -> Result<TrayConfig> {
        let base_dir = resolve_base_dir(self.base_dir.as_deref())?;
        let mut config = TrayConfig::new(Layout::new(base_dir));
        config.shutdown_timeout = parse_duration(&self.shutdown_timeout)?;
        config.headless = self.headless;
        config.autostart = self.start;
        config.color = !self.no_color;
        Ok(config)
    }
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
