pub use self::config::Config;
pub use self::errors::{CliError, CliResult, HoistResult};

pub mod auth;
pub mod command_prelude;
pub mod config;
pub mod edit_distance;
pub mod errors;
pub mod important_paths;
pub mod paths;
pub mod process_builder;
pub mod semver_ext;
pub mod sha256;
pub mod style;
pub mod toml_mut;

/// Formats a number of bytes into a human readable SI-prefixed string.
/// Returns the result and the base unit (e.g. `8.2`, `MiB`).
pub fn human_readable_bytes(bytes: u64) -> (f32, &'static str) {
    static UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let bytes = bytes as f32;
    let i = ((bytes.log2() / 10.0) as usize).min(UNITS.len() - 1);
    (bytes / 1024_f32.powi(i as i32), UNITS[i])
}

/// Truncates a string to the given display width, appending `...` if it had
/// to cut anything off.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut prefix = String::new();
    let mut width = 0;
    for c in s.chars() {
        let c_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + c_width > max_width - 3 {
            break;
        }
        prefix.push(c);
        width += c_width;
    }
    prefix.push_str("...");
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes() {
        assert_eq!(human_readable_bytes(0), (0., "B"));
        assert_eq!(human_readable_bytes(8), (8., "B"));
        assert_eq!(human_readable_bytes(1024), (1., "KiB"));
        assert_eq!(human_readable_bytes(1024 * 420 + 512), (420.5, "KiB"));
        assert_eq!(human_readable_bytes(1024 * 1024), (1., "MiB"));
        assert_eq!(
            human_readable_bytes(u64::MAX),
            (16., "EiB")
        );
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_with_ellipsis("short", 40), "short");
        assert_eq!(truncate_with_ellipsis("a very long description", 10), "a very ...");
    }
}
