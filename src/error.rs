//! Error types for `breathpace`
//!
//! The sequencer core has a single failure mode (an invalid configuration).
//! Everything else here belongs to the shell: session files, the tick
//! driver, and process exit codes.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `breathpace` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure, unknown pattern)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Sequencer error (rejected timings)
    pub const SEQUENCER_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `breathpace` operations.
///
/// Aggregates the domain errors and maps each to a process exit code.
#[derive(Debug, Error)]
pub enum BreathpaceError {
    /// Session file loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Sequencer rejected a configuration
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    /// Session driver error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BreathpaceError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Sequencer(_) => ExitCode::SEQUENCER_ERROR,
            Self::Session(SessionError::Interrupted) => ExitCode::INTERRUPTED,
            Self::Session(_) => ExitCode::ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Sequencer Errors
// ============================================================================

/// Errors raised by the phase sequencer.
///
/// Only construction and reconfiguration can fail; every other operation is
/// total over a valid state.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// One or more timing fields are out of range.
    #[error("invalid sequencer configuration: {}", join_issues(.issues))]
    InvalidConfig {
        /// Every offending field, not just the first
        issues: Vec<ValidationIssue>,
    },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} {}", i.path, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Session file loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the session file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// The file contained nothing but whitespace or comments
    #[error("session file is empty: {path}")]
    Empty {
        /// Path to the session file
        path: PathBuf,
    },

    /// The file exceeds the configured size limit
    #[error("session file too large: {path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the session file
        path: PathBuf,
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Validation found at least one error
    #[error("validation failed for {path}: {}", join_issues(.errors))]
    ValidationError {
        /// Path to the session file
        path: String,
        /// List of validation errors found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced session file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Named breathing pattern does not exist
    #[error("unknown pattern '{name}'{}", did_you_mean(.suggestion.as_deref()))]
    UnknownPattern {
        /// Name that was requested
        name: String,
        /// Closest built-in name, if any is near enough
        suggestion: Option<String>,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors from the asynchronous session driver.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The driver task is gone and can no longer accept commands
    #[error("session command channel closed")]
    CommandChannelClosed,

    /// The session was stopped by a signal before finishing
    #[error("session interrupted")]
    Interrupted,

    /// The driver task panicked or was aborted
    #[error("session task failed: {0}")]
    TaskFailed(String),
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "timings.hold")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl ValidationIssue {
    /// Creates an error-severity issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Creates a warning-severity issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported but does not block loading
    Warning,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `breathpace` operations.
pub type Result<T> = std::result::Result<T, BreathpaceError>;

// ============================================================================
// Tests
// ============================================================================
