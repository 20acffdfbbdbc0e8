use anstyle::*;

pub const NOP: Style = Style::new();
pub const HEADER: Style = AnsiColor::Green.on_default().bold();
pub const USAGE: Style = AnsiColor::Cyan.on_default().bold();
pub const LITERAL: Style = AnsiColor::Cyan.on_default().bold();
pub const PLACEHOLDER: Style = AnsiColor::Cyan.on_default();
pub const ERROR: Style = AnsiColor::Red.on_default().bold();
pub const WARN: Style = AnsiColor::Yellow.on_default().bold();
pub const NOTE: Style = AnsiColor::Cyan.on_default().bold();
pub const GOOD: Style = AnsiColor::Green.on_default().bold();
pub const VALID: Style = AnsiColor::Cyan.on_default().bold();
pub const INVALID: Style = AnsiColor::Yellow.on_default().bold();
