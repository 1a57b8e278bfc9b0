//! Session loader
//!
//! Loading pipeline:
//! 1. Size limit check
//! 2. Empty-file rejection
//! 3. YAML parsing into `SessionFile`
//! 4. Command-line overrides
//! 5. Pattern resolution and timing merge
//! 6. Validation
//! 7. Freeze with `Arc`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::{
    DEFAULT_TICK, SessionConfig, SessionFile, SessionOverrides, TimingsSpec,
};
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};
use crate::patterns::{self, BreathPattern};
use crate::sequencer::SequencerConfig;

/// Pattern used when a session names neither a pattern nor any timings.
pub const DEFAULT_PATTERN: &str = "4-7-8";

/// Path label used for sessions that did not come from a file.
const INLINE_PATH: &str = "<inline>";

// ============================================================================
// Public API
// ============================================================================

/// Options for the session loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Limits applied during validation.
    pub config_limits: ConfigLimits,
}

/// Limits guarding against absurd session files.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum session file size in bytes.
    pub max_config_size: usize,

    /// Maximum duration of a single phase, in seconds.
    pub max_phase_seconds: u32,

    /// Maximum number of cycles.
    pub max_cycles: u32,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("BREATHPACE_MAX_CONFIG_SIZE", 64 * 1024),
            max_phase_seconds: env_or("BREATHPACE_MAX_PHASE_SECONDS", 600),
            max_cycles: env_or("BREATHPACE_MAX_CYCLES", 1000),
        }
    }
}

/// Result of loading a session.
#[derive(Debug)]
pub struct LoadResult {
    /// The resolved and validated session.
    pub config: Arc<SessionConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during session loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl From<ValidationIssue> for LoadWarning {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            message: issue.message,
            location: Some(issue.path),
        }
    }
}

/// Session loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a session file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is empty or too large,
    /// fails to parse, names an unknown pattern, or fails validation.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        self.load_with(path, &SessionOverrides::default())
    }

    /// Loads a session file and applies `overrides` on top of it.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with(
        &self,
        path: &Path,
        overrides: &SessionOverrides,
    ) -> Result<LoadResult, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read(path).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: e.to_string(),
        })?;
        let text = String::from_utf8(raw).map_err(|_| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: "file is not valid UTF-8".to_string(),
        })?;
        self.load_text(&text, path, overrides)
    }

    /// Loads a session from a YAML string.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_from_str(&self, yaml: &str) -> Result<LoadResult, ConfigError> {
        self.load_text(yaml, Path::new(INLINE_PATH), &SessionOverrides::default())
    }

    /// Builds a session from overrides alone, with no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the overrides name an unknown pattern or the
    /// result fails validation.
    pub fn from_overrides(&self, overrides: &SessionOverrides) -> Result<LoadResult, ConfigError> {
        let file = overrides.apply(SessionFile::default());
        self.finish(file, INLINE_PATH)
    }

    fn load_text(
        &self,
        text: &str,
        path: &Path,
        overrides: &SessionOverrides,
    ) -> Result<LoadResult, ConfigError> {
        let limit = self.options.config_limits.max_config_size;
        if text.len() > limit {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: text.len(),
                limit,
            });
        }

        if is_blank(text) {
            return Err(ConfigError::Empty {
                path: path.to_path_buf(),
            });
        }

        let file: SessionFile = serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

        let file = overrides.apply(file);
        self.finish(file, &path.display().to_string())
    }

    /// Resolves, validates, and freezes a parsed file.
    fn finish(&self, file: SessionFile, path: &str) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();
        let config = resolve(file, path, &mut warnings)?;

        let result = Validator::new().validate(&config, &self.options.config_limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.to_string(),
                errors: result.errors,
            });
        }
        warnings.extend(result.warnings.into_iter().map(LoadWarning::from));

        tracing::debug!(
            path,
            name = %config.name,
            pattern = config.pattern.as_deref().unwrap_or("<custom>"),
            "session resolved"
        );

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Merges pattern defaults, explicit timings, and the cycle count.
fn resolve(
    file: SessionFile,
    path: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Result<SessionConfig, ConfigError> {
    let explicit = file.timings.unwrap_or_default();

    let pattern_name = match file.session.pattern {
        Some(name) => Some(name),
        None if explicit.is_empty() => {
            warnings.push(LoadWarning {
                message: format!("No pattern or timings given; using '{DEFAULT_PATTERN}'"),
                location: Some("session.pattern".to_string()),
            });
            Some(DEFAULT_PATTERN.to_string())
        }
        None => None,
    };
    let pattern = pattern_name
        .as_deref()
        .map(patterns::resolve_pattern)
        .transpose()?;

    let base = pattern.map(pattern_timings).unwrap_or_default();
    let timings = base.merged_with(explicit);
    let cycles = file.cycles.or(pattern.map(|p| p.recommended_cycles));

    let mut missing = Vec::new();
    let mut require = |value: Option<u32>, field: &str| {
        value.unwrap_or_else(|| {
            missing.push(ValidationIssue::error(
                field,
                "is required when no pattern is given",
            ));
            0
        })
    };
    let sequencer = SequencerConfig::new(
        require(timings.inhale, "timings.inhale"),
        require(timings.hold, "timings.hold"),
        require(timings.exhale, "timings.exhale"),
        require(timings.rest, "timings.rest"),
        require(cycles, "cycles"),
    );
    if !missing.is_empty() {
        return Err(ConfigError::ValidationError {
            path: path.to_string(),
            errors: missing,
        });
    }

    let tick_interval = match file.session.tick {
        Some(raw) => parse_tick(&raw)?,
        None => DEFAULT_TICK,
    };

    let name = file
        .session
        .name
        .or_else(|| pattern.map(|p| p.label.to_string()))
        .unwrap_or_else(|| "custom".to_string());

    Ok(SessionConfig {
        name,
        pattern: pattern.map(|p| p.name.to_string()),
        sequencer,
        tick_interval,
        autostart: file.autostart.unwrap_or(true),
    })
}

const fn pattern_timings(pattern: &BreathPattern) -> TimingsSpec {
    TimingsSpec {
        inhale: Some(pattern.timings.inhale),
        hold: Some(pattern.timings.hold),
        exhale: Some(pattern.timings.exhale),
        rest: Some(pattern.timings.rest),
    }
}

/// Parses a humantime tick interval such as `1s` or `250ms`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the string is not a duration.
pub fn parse_tick(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        field: "session.tick".to_string(),
        value: raw.to_string(),
        expected: format!("a duration like '1s' or '500ms' ({e})"),
    })
}

/// Returns `true` if the text holds nothing but whitespace and comments.
fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    })
}

/// Reads a limit from the environment, falling back to `default`.
fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
