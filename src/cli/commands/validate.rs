//! `breathpace validate`: loads session files without running them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadResult};
use crate::error::{BreathpaceError, ConfigError, Severity, ValidationIssue};

/// Outcome for one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: PathBuf,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle_seconds: Option<u64>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Validate every file, print a report, and fail with the first error.
///
/// All files are checked even after a failure.
///
/// # Errors
///
/// Returns the first file's loading or validation error. With `--strict`,
/// warnings count as validation errors.
pub fn run(args: &ValidateArgs, quiet: bool) -> Result<(), BreathpaceError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<BreathpaceError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating session file");
        let outcome = loader
            .load(path)
            .and_then(|result| check_strict(path, result, args.strict));

        let report = match outcome {
            Ok(result) => {
                for warning in &result.warnings {
                    tracing::warn!(
                        file = %path.display(),
                        location = warning.location.as_deref().unwrap_or("<unknown>"),
                        "{}",
                        warning.message
                    );
                }
                tracing::info!(file = %path.display(), "session file valid");
                FileReport {
                    file: path.clone(),
                    valid: true,
                    name: Some(result.config.name.clone()),
                    cycle_seconds: Some(result.config.sequencer.cycle_seconds()),
                    warnings: result.warnings.iter().map(|w| w.message.clone()).collect(),
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "session file invalid");
                let report = FileReport {
                    file: path.clone(),
                    valid: false,
                    name: None,
                    cycle_seconds: None,
                    warnings: Vec::new(),
                    error: Some(e.to_string()),
                };
                first_error.get_or_insert(e.into());
                report
            }
        };
        reports.push(report);
    }

    if !quiet {
        match args.format {
            OutputFormat::Human => {
                for report in &reports {
                    println!("{}", human_line(report));
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        }
    }

    first_error.map_or(Ok(()), Err)
}

/// Promotes warnings to errors under `--strict`.
fn check_strict(path: &Path, result: LoadResult, strict: bool) -> Result<LoadResult, ConfigError> {
    if !strict || result.warnings.is_empty() {
        return Ok(result);
    }
    let errors = result
        .warnings
        .into_iter()
        .map(|w| ValidationIssue {
            path: w.location.unwrap_or_default(),
            message: w.message,
            severity: Severity::Error,
        })
        .collect();
    Err(ConfigError::ValidationError {
        path: path.display().to_string(),
        errors,
    })
}

fn human_line(report: &FileReport) -> String {
    if let Some(error) = &report.error {
        return format!("FAIL  {}: {error}", report.file.display());
    }
    let mut line = format!(
        "ok    {} ({}, {}s per cycle)",
        report.file.display(),
        report.name.as_deref().unwrap_or("unnamed"),
        report.cycle_seconds.unwrap_or_default()
    );
    if !report.warnings.is_empty() {
        line.push_str(&format!(", {} warning(s)", report.warnings.len()));
    }
    line
}
