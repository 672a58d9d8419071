//! sqltray is a small tray controller for a MySQL server shipped next to it. It starts the
//! server on request and stops it gracefully through the admin client, first without a
//! password and then with a credentials file. Exiting the tray is only allowed once the
//! server is down.

/// Admin client invocation used for shutdown.
pub mod admin;

/// CLI interface.
pub mod cli;

/// Configuration management.
pub mod config;

/// Fixed names, flags and timings.
pub mod constants;

/// Start, stop and exit orchestration.
pub mod controller;

/// Credentials file lookup.
pub mod credentials;

/// Error handling.
pub mod error;

/// Server launch.
pub mod launcher;

/// Logging setup.
pub mod logs;

/// Process liveness checks.
pub mod probe;

/// Shutdown negotiation.
pub mod shutdown;

/// Status reports sent to the tray.
pub mod status;

/// Fakes for tests.
#[doc(hidden)]
pub mod test_utils;

/// Tray front-ends.
pub mod tray;
