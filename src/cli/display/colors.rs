//! Provenance coloring for CLI output.
//!
//! `console` drops styling when stdout is not a terminal or `NO_COLOR` is set.

use console::{style, StyledObject};

use crate::domain::models::ConfigSource;

/// Color a provenance tag.
///
/// - Green:  argument
/// - Cyan:   detected from a directory
/// - Yellow: config file
/// - Dim:    default
pub fn colorize_source(source: ConfigSource) -> StyledObject<&'static str> {
    let tag = style(source.as_str());
    match source {
        ConfigSource::Argument => tag.green().bold(),
        ConfigSource::KeyboardDirectory
        | ConfigSource::KeymapDirectory
        | ConfigSource::LayoutDirectory
        | ConfigSource::UserDirectory => tag.cyan(),
        ConfigSource::ConfigFile => tag.yellow(),
        ConfigSource::Default => tag.dim(),
    }
}

/// Styled label for detail views (bold + dimmed colon).
pub fn label(name: &str) -> String {
    format!("{}{}", style(name).bold(), style(":").dim())
}

/// Placeholder for a value that is not set
pub fn unset() -> String {
    style("(not set)").dim().to_string()
}
