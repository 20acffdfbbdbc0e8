//! Terminal output abstraction.
//!
//! All user-facing output funnels through [`Shell`] so that verbosity and
//! color preferences are honored in one place. Status lines (`Fetching`,
//! `Adding`, ...) go to stderr; command output proper (`pkgid`, `search`
//! listings) goes to stdout via [`Shell::out`].

use std::fmt;
use std::io::prelude::*;
use std::io::IsTerminal;

use anstream::AutoStream;
use anstyle::Style;

use crate::util::errors::HoistResult;
use crate::util::style::*;

/// The requested verbosity of output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verbosity {
    Verbose,
    Normal,
    Quiet,
}

/// Whether messages should use color output.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ColorChoice {
    /// Force color output.
    Always,
    /// Force disable color output.
    Never,
    /// Use color if stderr is a tty and the terminal appears to support it.
    Auto,
}

impl ColorChoice {
    fn to_anstream_color_choice(self) -> anstream::ColorChoice {
        match self {
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
            ColorChoice::Auto => anstream::ColorChoice::Auto,
        }
    }
}

enum ShellOut {
    /// A plain write object without color support.
    Write(AutoStream<Box<dyn Write>>),
    /// Color-enabled stdio, with information on whether color should be used.
    Stream {
        stdout: AutoStream<std::io::Stdout>,
        stderr: AutoStream<std::io::Stderr>,
        stderr_tty: bool,
        color_choice: ColorChoice,
    },
}

/// An abstraction around console output that remembers preferences for output
/// verbosity and color.
pub struct Shell {
    output: ShellOut,
    verbosity: Verbosity,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.output {
            ShellOut::Write(_) => f
                .debug_struct("Shell")
                .field("verbosity", &self.verbosity)
                .finish(),
            ShellOut::Stream { color_choice, .. } => f
                .debug_struct("Shell")
                .field("verbosity", &self.verbosity)
                .field("color_choice", &color_choice)
                .finish(),
        }
    }
}

impl Shell {
    /// Creates a new shell (color choice and verbosity), defaulting to 'auto'
    /// color and verbose output.
    pub fn new() -> Shell {
        let auto_clr = ColorChoice::Auto;
        Shell {
            output: ShellOut::Stream {
                stdout: AutoStream::new(
                    std::io::stdout(),
                    auto_clr.to_anstream_color_choice(),
                ),
                stderr: AutoStream::new(
                    std::io::stderr(),
                    auto_clr.to_anstream_color_choice(),
                ),
                color_choice: auto_clr,
                stderr_tty: std::io::stderr().is_terminal(),
            },
            verbosity: Verbosity::Verbose,
        }
    }

    /// Creates a shell from a plain writable object, with no color, and max
    /// verbosity. Used by tests to capture output.
    pub fn from_write(out: Box<dyn Write>) -> Shell {
        Shell {
            output: ShellOut::Write(AutoStream::never(out)),
            verbosity: Verbosity::Verbose,
        }
    }

    /// Prints a message, where the status will have `style` applied and the
    /// rest colored normally.
    fn print(
        &mut self,
        status: &dyn fmt::Display,
        message: Option<&dyn fmt::Display>,
        style: &Style,
        justified: bool,
    ) -> HoistResult<()> {
        match self.verbosity {
            Verbosity::Quiet => Ok(()),
            _ => self.output.message_stderr(status, message, style, justified),
        }
    }

    /// Shortcut to right-align and color green a status message.
    pub fn status<T, U>(&mut self, status: T, message: U) -> HoistResult<()>
    where
        T: fmt::Display,
        U: fmt::Display,
    {
        self.print(&status, Some(&message), &HEADER, true)
    }

    /// Shortcut to right-align a status message with a custom color.
    pub fn status_with_color<T, U>(
        &mut self,
        status: T,
        message: U,
        color: &Style,
    ) -> HoistResult<()>
    where
        T: fmt::Display,
        U: fmt::Display,
    {
        self.print(&status, Some(&message), color, true)
    }

    /// Runs the callback only if we are in verbose mode.
    pub fn verbose<F>(&mut self, mut callback: F) -> HoistResult<()>
    where
        F: FnMut(&mut Shell) -> HoistResult<()>,
    {
        match self.verbosity {
            Verbosity::Verbose => callback(self),
            _ => Ok(()),
        }
    }

    /// Prints a red 'error' message. The message is always shown, regardless
    /// of verbosity.
    pub fn error<T: fmt::Display>(&mut self, message: T) -> HoistResult<()> {
        self.output
            .message_stderr(&"error", Some(&message), &ERROR, false)
    }

    /// Prints an amber 'warning' message.
    pub fn warn<T: fmt::Display>(&mut self, message: T) -> HoistResult<()> {
        match self.verbosity {
            Verbosity::Quiet => Ok(()),
            _ => self.print(&"warning", Some(&message), &WARN, false),
        }
    }

    /// Prints a cyan 'note' message.
    pub fn note<T: fmt::Display>(&mut self, message: T) -> HoistResult<()> {
        self.print(&"note", Some(&message), &NOTE, false)
    }

    /// Updates the verbosity of the shell.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Gets the verbosity of the shell.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Updates the color choice (always, never, or auto) from a string.
    pub fn set_color_choice(&mut self, color: Option<&str>) -> HoistResult<()> {
        if let ShellOut::Stream {
            stdout,
            stderr,
            color_choice,
            ..
        } = &mut self.output
        {
            let cfg = match color {
                Some("always") => ColorChoice::Always,
                Some("never") => ColorChoice::Never,
                Some("auto") | None => ColorChoice::Auto,
                Some(arg) => anyhow::bail!(
                    "argument for --color must be auto, always, or \
                     never, but found `{}`",
                    arg
                ),
            };
            *color_choice = cfg;
            let choice = cfg.to_anstream_color_choice();
            *stdout = AutoStream::new(std::io::stdout(), choice);
            *stderr = AutoStream::new(std::io::stderr(), choice);
        }
        Ok(())
    }

    /// Gets the current color choice.
    ///
    /// If we are not using a color stream, this will always return `Never`,
    /// even if the color choice has been set to something else.
    pub fn color_choice(&self) -> ColorChoice {
        match self.output {
            ShellOut::Stream { color_choice, .. } => color_choice,
            ShellOut::Write(_) => ColorChoice::Never,
        }
    }

    /// Whether `stderr` refers to a terminal.
    pub fn is_err_tty(&self) -> bool {
        match self.output {
            ShellOut::Stream { stderr_tty, .. } => stderr_tty,
            _ => false,
        }
    }

    /// Gets a reference to the underlying stdout writer.
    pub fn out(&mut self) -> &mut dyn Write {
        self.output.stdout()
    }

    /// Gets a reference to the underlying stderr writer.
    pub fn err(&mut self) -> &mut dyn Write {
        self.output.stderr()
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellOut {
    /// Prints out a message with a status to stderr. The status comes first,
    /// and is bold plus the given color. The status can be justified, in
    /// which case the max width that will right align is 12 chars.
    fn message_stderr(
        &mut self,
        status: &dyn fmt::Display,
        message: Option<&dyn fmt::Display>,
        style: &Style,
        justified: bool,
    ) -> HoistResult<()> {
        let style = style.render();
        let bold = (anstyle::Style::new() | anstyle::Effects::BOLD).render();
        let reset = anstyle::Reset.render();

        let mut buffer = Vec::new();
        if justified {
            write!(&mut buffer, "{style}{status:>12}{reset}")?;
        } else {
            write!(&mut buffer, "{style}{status}{reset}{bold}:{reset}")?;
        }
        match message {
            Some(message) => writeln!(buffer, " {message}")?,
            None => write!(buffer, " ")?,
        }
        self.stderr().write_all(&buffer)?;
        Ok(())
    }

    /// Gets stdout as a `io::Write`.
    fn stdout(&mut self) -> &mut dyn Write {
        match self {
            ShellOut::Stream { stdout, .. } => stdout,
            ShellOut::Write(w) => w,
        }
    }

    /// Gets stderr as a `io::Write`.
    fn stderr(&mut self) -> &mut dyn Write {
        match self {
            ShellOut::Stream { stderr, .. } => stderr,
            ShellOut::Write(w) => w,
        }
    }
}
