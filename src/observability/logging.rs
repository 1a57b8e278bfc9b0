//! Logging initialization.
//!
//! `tracing` output goes to stderr in either human or JSON form; stdout
//! belongs to the session renderer. `BREATHPACE_LOG_LEVEL` replaces the
//! `-v` count when it holds a valid filter directive.

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "BREATHPACE_LOG_LEVEL";

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Plain text, colored when the terminal allows it.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// `-v` count to level: 0 warn, 1 info, 2 debug, 3 and up trace.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Picks the filter: a parseable env directive wins, otherwise the `-v`
/// level. Blank or malformed env values fall back to `verbosity`.
fn build_filter(env_directive: Option<&str>, verbosity: u8) -> EnvFilter {
    env_directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Whether human log lines carry ANSI escapes.
const fn wants_ansi(color: ColorChoice, stderr_is_terminal: bool, no_color: bool) -> bool {
    match color {
        ColorChoice::Auto => stderr_is_terminal && !no_color,
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// A second call leaves the first subscriber in place.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let env_directive = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(env_directive.as_deref(), verbosity);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Human => {
            let ansi = wants_ansi(
                color,
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            );
            builder.with_ansi(ansi).try_init()
        }
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already set, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_default_is_human() {
        assert_eq!(LogFormat::default(), LogFormat::Human);
    }

    #[test]
    fn verbosity_mapping_saturates() {
        let levels: Vec<&str> = [0, 1, 2, 3, 255]
            .into_iter()
            .map(verbosity_to_directive)
            .collect();
        assert_eq!(levels, ["warn", "info", "debug", "trace", "trace"]);
    }

    #[test]
    fn env_directive_overrides_verbosity() {
        let filter = build_filter(Some("breathpace=trace"), 0);
        assert_eq!(filter.to_string(), "breathpace=trace");
    }

    #[test]
    fn missing_env_uses_verbosity() {
        assert_eq!(build_filter(None, 1).to_string(), "info");
        assert_eq!(build_filter(None, 0).to_string(), "warn");
    }

    #[test]
    fn blank_or_malformed_env_falls_back() {
        assert_eq!(build_filter(Some("   "), 2).to_string(), "debug");
        assert_eq!(build_filter(Some("breathpace=loud"), 2).to_string(), "debug");
    }

    #[test]
    fn auto_color_needs_terminal_and_no_no_color() {
        assert!(wants_ansi(ColorChoice::Auto, true, false));
        assert!(!wants_ansi(ColorChoice::Auto, true, true));
        assert!(!wants_ansi(ColorChoice::Auto, false, false));
    }

    #[test]
    fn explicit_color_ignores_environment() {
        assert!(wants_ansi(ColorChoice::Always, false, true));
        assert!(!wants_ansi(ColorChoice::Never, true, false));
    }

    #[test]
    fn init_logging_twice_is_harmless() {
        init_logging(LogFormat::Human, 0, ColorChoice::Auto);
        init_logging(LogFormat::Json, 3, ColorChoice::Never);
    }
}
