//! Error types and the CLI error boundary.

use anyhow::Error;
use std::fmt;
use std::path::PathBuf;

pub type HoistResult<T> = anyhow::Result<T>;

/// An error wrapper for errors that should only be displayed with `--verbose`.
///
/// This should only be used in rare cases. When emitting this error, you
/// should have a normal error higher up the chain with a short summary so the
/// default output has something actionable in it.
#[derive(Debug)]
pub struct VerboseError {
    inner: Error,
}

impl VerboseError {
    pub fn new(inner: Error) -> VerboseError {
        VerboseError { inner }
    }
}

impl std::error::Error for VerboseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl fmt::Display for VerboseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Error returned when a manifest could not be located for the current
/// directory, carrying the directory the search started from.
#[derive(Debug, thiserror::Error)]
#[error("could not find `{name}` in `{}` or any parent directory", .cwd.display())]
pub struct ManifestNotFound {
    pub name: &'static str,
    pub cwd: PathBuf,
}

// =============================================================================
// CLI errors

pub type CliResult = Result<(), CliError>;

/// The error type for the command-line interface.
///
/// Any failure that bubbles up to the CLI boundary exits the process with
/// code 101 unless a more specific code was attached (for example the exit
/// status of a failed test harness).
#[derive(Debug)]
pub struct CliError {
    /// The error to display. This can be `None` in rare cases to exit with a
    /// code without displaying a message.
    pub error: Option<Error>,
    /// The process exit code.
    pub exit_code: i32,
}

impl CliError {
    pub fn new(error: Error, code: i32) -> CliError {
        CliError {
            error: Some(error),
            exit_code: code,
        }
    }

    pub fn code(code: i32) -> CliError {
        CliError {
            error: None,
            exit_code: code,
        }
    }
}

impl From<Error> for CliError {
    fn from(err: Error) -> CliError {
        CliError::new(err, 101)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> CliError {
        CliError::new(err.into(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_defaults_to_101() {
        let err: CliError = anyhow::format_err!("boom").into();
        assert_eq!(err.exit_code, 101);
        assert!(err.error.is_some());
    }

    #[test]
    fn bare_exit_code_has_no_message() {
        let err = CliError::code(7);
        assert_eq!(err.exit_code, 7);
        assert!(err.error.is_none());
    }
}
