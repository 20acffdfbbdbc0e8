//! A builder for an external process, with nice error reporting.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus, Output};

use anyhow::{Context as _, Result};
use shell_escape::escape;

/// A builder object for an external process, similar to
/// [`std::process::Command`].
#[derive(Clone, Debug)]
pub struct ProcessBuilder {
    /// The program to execute.
    program: OsString,
    /// A list of arguments to pass to the program.
    args: Vec<OsString>,
    /// Any environment variables that should be set for the program.
    env: BTreeMap<String, Option<OsString>>,
    /// The directory to run the program from.
    cwd: Option<OsString>,
}

impl fmt::Display for ProcessBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`")?;
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", escape(arg.to_string_lossy()))?;
        }
        write!(f, "`")
    }
}

impl ProcessBuilder {
    /// Creates a new [`ProcessBuilder`] with the given executable path.
    pub fn new(cmd: impl AsRef<OsStr>) -> ProcessBuilder {
        ProcessBuilder {
            program: cmd.as_ref().to_os_string(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// (chainable) Adds `arg` to the args list.
    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut ProcessBuilder {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// (chainable) Adds multiple `args` to the args list.
    pub fn args<T: AsRef<OsStr>>(&mut self, args: &[T]) -> &mut ProcessBuilder {
        self.args.extend(args.iter().map(|t| t.as_ref().to_os_string()));
        self
    }

    /// (chainable) Sets an environment variable for the process.
    pub fn env(&mut self, key: &str, val: impl AsRef<OsStr>) -> &mut ProcessBuilder {
        self.env.insert(key.to_string(), Some(val.as_ref().to_os_string()));
        self
    }

    /// (chainable) Unsets an environment variable for the process.
    pub fn env_remove(&mut self, key: &str) -> &mut ProcessBuilder {
        self.env.insert(key.to_string(), None);
        self
    }

    /// (chainable) Sets the current working directory of the process.
    pub fn cwd(&mut self, path: impl AsRef<OsStr>) -> &mut ProcessBuilder {
        self.cwd = Some(path.as_ref().to_os_string());
        self
    }

    pub fn get_program(&self) -> &OsString {
        &self.program
    }

    pub fn get_args(&self) -> impl Iterator<Item = &OsString> {
        self.args.iter()
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_ref().map(Path::new)
    }

    /// Runs the process, waiting for completion, and mapping non-success exit
    /// codes to an error.
    pub fn exec(&self) -> Result<()> {
        let mut command = self.build_command();
        let exit = command
            .status()
            .with_context(|| ProcessError::could_not_execute(self))?;

        if exit.success() {
            Ok(())
        } else {
            Err(ProcessError::new(
                &format!("process didn't exit successfully: {self}"),
                Some(exit),
                None,
            )
            .into())
        }
    }

    /// Runs the process, returning the stdio output, or an error if
    /// non-zero exit status.
    pub fn exec_with_output(&self) -> Result<Output> {
        let mut command = self.build_command();
        let output = command
            .output()
            .with_context(|| ProcessError::could_not_execute(self))?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(ProcessError::new(
                &format!("process didn't exit successfully: {self}"),
                Some(output.status),
                Some(&output),
            )
            .into())
        }
    }

    /// Runs the process, waiting for completion, without checking the exit
    /// status.
    pub fn status(&self) -> Result<ExitStatus> {
        self.build_command()
            .status()
            .with_context(|| ProcessError::could_not_execute(self))
    }

    /// Converts `ProcessBuilder` into a `std::process::Command`.
    pub fn build_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(cwd) = self.get_cwd() {
            command.current_dir(cwd);
        }
        for arg in &self.args {
            command.arg(arg);
        }
        for (k, v) in &self.env {
            match v {
                Some(v) => {
                    command.env(k, v);
                }
                None => {
                    command.env_remove(k);
                }
            }
        }
        command
    }
}

/// An error from a subprocess that did not exit successfully.
#[derive(Debug, thiserror::Error)]
#[error("{desc}")]
pub struct ProcessError {
    /// A detailed description to show to the user why the process failed.
    pub desc: String,
    /// The exit status of the process.
    ///
    /// This can be `None` if the process failed to launch (like process not
    /// found) or if the exit status wasn't a code but was instead a signal.
    pub code: Option<i32>,
}

impl ProcessError {
    /// Creates a new [`ProcessError`].
    pub fn new(msg: &str, status: Option<ExitStatus>, output: Option<&Output>) -> ProcessError {
        let exit = match status {
            Some(s) => exit_status_to_string(s),
            None => "never executed".to_string(),
        };

        let mut desc = format!("{msg} ({exit})");

        if let Some(out) = output {
            match String::from_utf8_lossy(&out.stdout) {
                s if !s.trim().is_empty() => {
                    desc.push_str("\n--- stdout\n");
                    desc.push_str(&s);
                }
                _ => {}
            }
            match String::from_utf8_lossy(&out.stderr) {
                s if !s.trim().is_empty() => {
                    desc.push_str("\n--- stderr\n");
                    desc.push_str(&s);
                }
                _ => {}
            }
        }

        ProcessError {
            desc,
            code: status.and_then(|s| s.code()),
        }
    }

    /// Creates a [`ProcessError`] with "could not execute process {cmd}".
    pub fn could_not_execute(cmd: impl fmt::Display) -> String {
        format!("could not execute process {cmd}")
    }
}

/// Converts an [`ExitStatus`] to a human-readable string, including signal
/// names on unix.
pub fn exit_status_to_string(status: ExitStatus) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal: {signal}");
        }
    }
    status.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_args() {
        let mut p = ProcessBuilder::new("sh");
        p.arg("-c").arg("echo hello world");
        assert_eq!(p.to_string(), "`sh -c 'echo hello world'`");
    }
}
