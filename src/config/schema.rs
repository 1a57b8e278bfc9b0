//! Session file schema
//!
//! Raw YAML shape (`SessionFile`) and the resolved form the runner uses
//! (`SessionConfig`).
//!
//! ```yaml
//! session:
//!   name: evening wind-down
//!   pattern: 4-7-8
//!   tick: 1s
//! timings:
//!   hold: 6
//! cycles: 3
//! autostart: true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sequencer::SequencerConfig;

/// Default interval between ticks.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

// ============================================================================
// Raw File Form
// ============================================================================

/// Top-level session file as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionFile {
    /// Session metadata and pattern selection.
    #[serde(default)]
    pub session: SessionMetadata,

    /// Per-phase durations; any field left out falls back to the pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<TimingsSpec>,

    /// Number of cycles; falls back to the pattern's recommendation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,

    /// Start ticking immediately (default `true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autostart: Option<bool>,
}

/// The `session:` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionMetadata {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Built-in pattern to start from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Tick interval in humantime form (`1s`, `500ms`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<String>,
}

/// The `timings:` block. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimingsSpec {
    /// Inhale seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inhale: Option<u32>,
    /// Hold seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<u32>,
    /// Exhale seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhale: Option<u32>,
    /// Rest seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<u32>,
}

impl TimingsSpec {
    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inhale.is_none() && self.hold.is_none() && self.exhale.is_none() && self.rest.is_none()
    }

    /// Overlays `other` on top of `self`; set fields in `other` win.
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        Self {
            inhale: other.inhale.or(self.inhale),
            hold: other.hold.or(self.hold),
            exhale: other.exhale.or(self.exhale),
            rest: other.rest.or(self.rest),
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Values supplied outside the file (command-line flags).
///
/// Anything set here overrides the session file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOverrides {
    /// Pattern name.
    pub pattern: Option<String>,
    /// Per-phase durations.
    pub timings: TimingsSpec,
    /// Cycle count.
    pub cycles: Option<u32>,
    /// Tick interval in humantime form.
    pub tick: Option<String>,
    /// Whether to start immediately.
    pub autostart: Option<bool>,
}

impl SessionOverrides {
    /// Applies these overrides to a parsed file.
    #[must_use]
    pub fn apply(&self, mut file: SessionFile) -> SessionFile {
        if let Some(pattern) = &self.pattern {
            file.session.pattern = Some(pattern.clone());
        }
        if let Some(tick) = &self.tick {
            file.session.tick = Some(tick.clone());
        }
        if !self.timings.is_empty() {
            let base = file.timings.unwrap_or_default();
            file.timings = Some(base.merged_with(self.timings));
        }
        if self.cycles.is_some() {
            file.cycles = self.cycles;
        }
        if self.autostart.is_some() {
            file.autostart = self.autostart;
        }
        file
    }
}

// ============================================================================
// Resolved Form
// ============================================================================

/// Fully resolved session, ready to drive a sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    /// Display name.
    pub name: String,
    /// Pattern the timings were derived from, if any.
    pub pattern: Option<String>,
    /// Timings and cycle count.
    pub sequencer: SequencerConfig,
    /// Wall-clock time between ticks.
    #[serde(with = "display_duration")]
    pub tick_interval: Duration,
    /// Start ticking immediately.
    pub autostart: bool,
}

/// Serializes a `Duration` in humantime form (`1s`, `250ms`).
mod display_duration {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*d))
    }
}
