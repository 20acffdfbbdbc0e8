//! Hoist, a compact lockfile-driven package manager.
//!
//! This library backs the `hoist` binary. The layout follows a conventional
//! split:
//!
//! - [`core`] holds the domain types: manifests, package IDs and ID
//!   specifiers, workspaces, and the lockfile graph.
//! - [`ops`] holds one module per user-facing operation (`add`, `remove`,
//!   `fetch`, `publish`, ...). These are the entry points the CLI calls.
//! - [`util`] holds the ambient machinery: configuration, errors, the
//!   output shell, process spawning, and TOML editing.

use std::io::Write;

use crate::core::Shell;
use anyhow::Error;
use tracing::debug;

pub use crate::util::errors::{CliError, CliResult, HoistResult};
pub use crate::util::Config;

pub mod core;
pub mod ops;
pub mod util;

pub const HOIST_ENV: &str = "HOIST";

pub fn version() -> String {
    format!("hoist {}", env!("CARGO_PKG_VERSION"))
}

/// Displays an error, and all its causes, to stderr.
pub fn display_error(err: &Error, shell: &mut Shell) {
    debug!("display_error; err={:?}", err);
    _display_error(err, shell, true);
}

/// Displays a warning, with an error object providing detail.
pub fn display_warning_with_error(warning: &str, err: &Error, shell: &mut Shell) {
    drop(shell.warn(warning));
    drop(writeln!(shell.err()));
    _display_error(err, shell, false);
}

fn _display_error(err: &Error, shell: &mut Shell, as_err: bool) {
    let verbosity = shell.verbosity();
    let is_verbose = |e: &(dyn std::error::Error + 'static)| -> bool {
        verbosity != crate::core::shell::Verbosity::Verbose
            && e.downcast_ref::<crate::util::errors::VerboseError>().is_some()
    };
    if is_verbose(err.as_ref()) {
        return;
    }
    if as_err {
        drop(shell.error(err));
    } else {
        drop(writeln!(shell.err(), "{}", err));
    }
    for cause in err.chain().skip(1) {
        if is_verbose(cause) {
            continue;
        }
        drop(writeln!(shell.err(), "\nCaused by:"));
        for line in cause.to_string().lines() {
            if line.is_empty() {
                drop(writeln!(shell.err()));
            } else {
                drop(writeln!(shell.err(), "  {}", line));
            }
        }
    }
}

/// Displays a top-level error and terminates the process.
pub fn exit_with_error(err: CliError, shell: &mut Shell) -> ! {
    debug!("exit_with_error; err={:?}", err);

    let CliError { error, exit_code } = err;
    if let Some(error) = error {
        display_error(&error, shell);
    }

    std::process::exit(exit_code)
}

#[macro_export]
macro_rules! drop_print {
    ($config:expr, $($arg:tt)*) => {{
        use std::io::Write as _;
        let _ = ::std::write!($config.shell().out(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! drop_println {
    ($config:expr) => {{
        use std::io::Write as _;
        let _ = ::std::writeln!($config.shell().out());
    }};
    ($config:expr, $($arg:tt)*) => {{
        use std::io::Write as _;
        let _ = ::std::writeln!($config.shell().out(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! drop_eprintln {
    ($config:expr, $($arg:tt)*) => {{
        use std::io::Write as _;
        let _ = ::std::writeln!($config.shell().err(), $($arg)*);
    }};
}
