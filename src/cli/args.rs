//! CLI argument definitions
//!
//! All Clap derive structs for `breathpace` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::schema::{SessionOverrides, TimingsSpec};
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Guided breathing sessions in the terminal.
#[derive(Parser, Debug)]
#[command(name = "breathpace", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "BREATHPACE_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "BREATHPACE_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a breathing session.
    Run(RunArgs),

    /// Validate session files without running them.
    Validate(ValidateArgs),

    /// List the built-in breathing patterns.
    Patterns(PatternsArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to a YAML session file.
    #[arg(short, long, env = "BREATHPACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Built-in pattern to start from (see `breathpace patterns`).
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Inhale seconds.
    #[arg(long, value_name = "SECONDS")]
    pub inhale: Option<u32>,

    /// Hold seconds.
    #[arg(long, value_name = "SECONDS")]
    pub hold: Option<u32>,

    /// Exhale seconds.
    #[arg(long, value_name = "SECONDS")]
    pub exhale: Option<u32>,

    /// Rest seconds.
    #[arg(long, value_name = "SECONDS")]
    pub rest: Option<u32>,

    /// Number of cycles.
    #[arg(short = 'n', long)]
    pub cycles: Option<u32>,

    /// Wall-clock time per tick (e.g. `1s`, `250ms`).
    #[arg(long, value_name = "DURATION")]
    pub tick: Option<String>,

    /// Wait for a start command on stdin instead of starting immediately.
    #[arg(long)]
    pub paused: bool,

    /// How each tick is rendered on stdout.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write the JSONL event stream to this file.
    #[arg(long, env = "BREATHPACE_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on `127.0.0.1:<PORT>`.
    #[arg(long, env = "BREATHPACE_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

impl RunArgs {
    /// Flags that override the session file.
    #[must_use]
    pub fn overrides(&self) -> SessionOverrides {
        SessionOverrides {
            pattern: self.pattern.clone(),
            timings: TimingsSpec {
                inhale: self.inhale,
                hold: self.hold,
                exhale: self.exhale,
                rest: self.rest,
            },
            cycles: self.cycles,
            tick: self.tick.clone(),
            autostart: self.paused.then_some(false),
        }
    }
}

// ============================================================================
// Validate / Patterns / Completions / Version
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Session files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `patterns`.
#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Only list patterns carrying this tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell.
    pub shell: Shell,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal and `NO_COLOR`.
    #[default]
    Auto,
    /// Always emit ANSI colors.
    Always,
    /// Never emit ANSI colors.
    Never,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// Machine-readable JSON.
    Json,
}

/// Shells supported by `completions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash.
    Bash,
    /// Zsh.
    Zsh,
    /// Fish.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
