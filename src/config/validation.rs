//! Session validation
//!
//! Runs on the fully resolved `SessionConfig`, after the pattern and any
//! overrides have been merged in. Validation collects every issue instead of
//! stopping at the first one.

use std::time::Duration;

use crate::config::loader::ConfigLimits;
use crate::config::schema::SessionConfig;
use crate::error::{Severity, ValidationIssue};
use crate::sequencer::Phase;

/// Shortest tick interval accepted.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Sessions longer than this draw a warning.
const LONG_SESSION_SECS: u64 = 60 * 60;

/// Longest display name accepted without a warning.
const MAX_NAME_LEN: usize = 100;

// ============================================================================
// Public API
// ============================================================================

/// Result of session validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Session validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a session and returns every error and warning found.
    pub fn validate(&mut self, config: &SessionConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_name(config);
        self.validate_timings(config, limits);
        self.validate_tick(config);
        self.validate_length(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_name(&mut self, config: &SessionConfig) {
        if config.name.trim().is_empty() {
            self.add_warning("session.name", "Session name is empty");
        }
        if config.name.len() > MAX_NAME_LEN {
            self.add_warning(
                "session.name",
                "Session name is unusually long (> 100 characters)",
            );
        }
    }

    fn validate_timings(&mut self, config: &SessionConfig, limits: &ConfigLimits) {
        // Lower bounds are the sequencer's own rule; reuse it verbatim.
        for issue in config.sequencer.issues() {
            let path = if issue.path == "cycles" {
                issue.path
            } else {
                format!("timings.{}", issue.path)
            };
            self.errors.push(ValidationIssue { path, ..issue });
        }

        for phase in Phase::ALL {
            let seconds = config.sequencer.duration_of(phase);
            if seconds > limits.max_phase_seconds {
                self.add_error(
                    &format!("timings.{phase}"),
                    &format!(
                        "Phase lasts {seconds}s, above the limit of {}s",
                        limits.max_phase_seconds
                    ),
                );
            }
        }

        if config.sequencer.total_cycles > limits.max_cycles {
            self.add_error(
                "cycles",
                &format!(
                    "{} cycles requested, above the limit of {}",
                    config.sequencer.total_cycles, limits.max_cycles
                ),
            );
        }
    }

    fn validate_tick(&mut self, config: &SessionConfig) {
        if config.tick_interval < MIN_TICK_INTERVAL {
            self.add_error(
                "session.tick",
                &format!(
                    "Tick interval {} is shorter than the minimum of {}",
                    humantime::format_duration(config.tick_interval),
                    humantime::format_duration(MIN_TICK_INTERVAL)
                ),
            );
        }
    }

    fn validate_length(&mut self, config: &SessionConfig) {
        if config.sequencer.total_seconds() > LONG_SESSION_SECS {
            self.add_warning(
                "cycles",
                &format!(
                    "Session lasts {} ticks, longer than an hour at one tick per second",
                    config.sequencer.total_seconds()
                ),
            );
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DEFAULT_TICK;
    use crate::sequencer::SequencerConfig;

    fn limits() -> ConfigLimits {
        ConfigLimits {
            max_config_size: 64 * 1024,
            max_phase_seconds: 600,
            max_cycles: 1000,
        }
    }

    fn session(sequencer: SequencerConfig) -> SessionConfig {
        SessionConfig {
            name: "test".to_string(),
            pattern: None,
            sequencer,
            tick_interval: DEFAULT_TICK,
            autostart: true,
        }
    }

    #[test]
    fn test_valid_session() {
        let result = Validator::new().validate(&session(SequencerConfig::new(4, 7, 8, 4, 4)), &limits());
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_zero_durations_collected() {
        let result =
            Validator::new().validate(&session(SequencerConfig::new(0, 7, 0, 4, 0)), &limits());
        assert!(result.has_errors());
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["timings.inhale", "timings.exhale", "cycles"]);
    }

    #[test]
    fn test_phase_above_limit() {
        let result =
            Validator::new().validate(&session(SequencerConfig::new(4, 601, 8, 4, 1)), &limits());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "timings.hold");
    }

    #[test]
    fn test_cycles_above_limit() {
        let result =
            Validator::new().validate(&session(SequencerConfig::new(1, 1, 1, 1, 1001)), &limits());
        assert!(result.errors.iter().any(|e| e.path == "cycles"));
    }

    #[test]
    fn test_tick_too_short() {
        let mut config = session(SequencerConfig::new(4, 4, 4, 4, 1));
        config.tick_interval = Duration::from_millis(5);
        let result = Validator::new().validate(&config, &limits());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "session.tick");
    }

    #[test]
    fn test_long_session_warns() {
        // 23 s per cycle * 200 cycles > 1 h
        let result =
            Validator::new().validate(&session(SequencerConfig::new(4, 7, 8, 4, 200)), &limits());
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_empty_name_warns() {
        let mut config = session(SequencerConfig::new(4, 4, 4, 4, 1));
        config.name = "  ".to_string();
        let result = Validator::new().validate(&config, &limits());
        assert!(result.is_valid());
        assert_eq!(result.warnings[0].path, "session.name");
    }

    #[test]
    fn test_validator_is_reusable() {
        let mut validator = Validator::new();
        let bad = validator.validate(&session(SequencerConfig::new(0, 1, 1, 1, 1)), &limits());
        assert!(bad.has_errors());
        let good = validator.validate(&session(SequencerConfig::new(1, 1, 1, 1, 1)), &limits());
        assert!(good.is_valid());
    }
}
