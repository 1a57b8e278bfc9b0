//! Built-in breathing patterns
//!
//! Named timing presets selectable from a session file or the command line:
//! `breathpace run --pattern box`

use serde::Serialize;

use crate::error::ConfigError;
use crate::sequencer::SequencerConfig;

// ============================================================================
// Types
// ============================================================================

/// Per-phase durations of a pattern, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternTimings {
    /// Inhale seconds.
    pub inhale: u32,
    /// Hold seconds.
    pub hold: u32,
    /// Exhale seconds.
    pub exhale: u32,
    /// Rest seconds.
    pub rest: u32,
}

impl PatternTimings {
    /// Length of one cycle in seconds.
    #[must_use]
    pub const fn cycle_seconds(&self) -> u32 {
        self.inhale + self.hold + self.exhale + self.rest
    }
}

/// A built-in breathing pattern.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreathPattern {
    /// Unique identifier (kebab-case, e.g., "4-7-8").
    pub name: &'static str,

    /// Short display label.
    pub label: &'static str,

    /// One-line description.
    pub description: &'static str,

    /// Tags for filtering.
    pub tags: &'static [&'static str],

    /// Phase durations.
    pub timings: PatternTimings,

    /// Cycle count used when a session does not specify one.
    pub recommended_cycles: u32,
}

impl BreathPattern {
    /// Builds a sequencer configuration from this pattern.
    ///
    /// `cycles` overrides [`recommended_cycles`](Self::recommended_cycles).
    #[must_use]
    pub fn config(&self, cycles: Option<u32>) -> SequencerConfig {
        SequencerConfig::new(
            self.timings.inhale,
            self.timings.hold,
            self.timings.exhale,
            self.timings.rest,
            cycles.unwrap_or(self.recommended_cycles),
        )
    }

    /// Breaths per minute at this pattern's pace.
    #[must_use]
    pub fn breaths_per_minute(&self) -> f64 {
        60.0 / f64::from(self.timings.cycle_seconds())
    }
}

// ============================================================================
// Registry
// ============================================================================

const fn timings(inhale: u32, hold: u32, exhale: u32, rest: u32) -> PatternTimings {
    PatternTimings {
        inhale,
        hold,
        exhale,
        rest,
    }
}

static BUILTIN_PATTERNS: [BreathPattern; 8] = [
    BreathPattern {
        name: "4-7-8",
        label: "Tranquility",
        description: "Long hold and slow exhale for winding down before sleep",
        tags: &["sleep", "anxiety"],
        timings: timings(4, 7, 8, 4),
        recommended_cycles: 4,
    },
    BreathPattern {
        name: "box",
        label: "Focus",
        description: "Four equal sides for steady attention",
        tags: &["focus"],
        timings: timings(4, 4, 4, 4),
        recommended_cycles: 6,
    },
    BreathPattern {
        name: "tactical",
        label: "Tactical",
        description: "Extended box breathing for high-stress moments",
        tags: &["focus", "stress"],
        timings: timings(5, 5, 5, 5),
        recommended_cycles: 5,
    },
    BreathPattern {
        name: "triangle",
        label: "Triangle",
        description: "Even inhale, hold and exhale with a short rest",
        tags: &["balance"],
        timings: timings(4, 4, 4, 1),
        recommended_cycles: 8,
    },
    BreathPattern {
        name: "calm",
        label: "Balance",
        description: "Exhale longer than the inhale to settle the heart rate",
        tags: &["balance", "stress"],
        timings: timings(4, 1, 6, 1),
        recommended_cycles: 8,
    },
    BreathPattern {
        name: "coherence",
        label: "Coherence",
        description: "Roughly five breaths a minute",
        tags: &["balance", "hrv"],
        timings: timings(5, 1, 5, 1),
        recommended_cycles: 10,
    },
    BreathPattern {
        name: "7-11",
        label: "Deep Calm",
        description: "Very long exhale for acute anxiety",
        tags: &["anxiety"],
        timings: timings(7, 1, 11, 1),
        recommended_cycles: 4,
    },
    BreathPattern {
        name: "buteyko",
        label: "Light Air",
        description: "Short, light breaths followed by a longer pause",
        tags: &["health"],
        timings: timings(3, 1, 3, 4),
        recommended_cycles: 12,
    },
];

// ============================================================================
// Public API
// ============================================================================

/// Looks up a pattern by exact name.
#[must_use]
pub fn find_pattern(name: &str) -> Option<&'static BreathPattern> {
    BUILTIN_PATTERNS.iter().find(|p| p.name == name)
}

/// Looks up a pattern, suggesting a near match on failure.
///
/// # Errors
///
/// Returns `ConfigError::UnknownPattern` if no pattern has this name.
pub fn resolve_pattern(name: &str) -> Result<&'static BreathPattern, ConfigError> {
    find_pattern(name).ok_or_else(|| ConfigError::UnknownPattern {
        name: name.to_string(),
        suggestion: suggest_pattern(name),
    })
}

/// Lists patterns in registry order, optionally filtered by tag.
#[must_use]
pub fn list_patterns(tag: Option<&str>) -> Vec<&'static BreathPattern> {
    BUILTIN_PATTERNS
        .iter()
        .filter(|p| tag.is_none_or(|t| p.tags.contains(&t)))
        .collect()
}

/// Suggests a similar pattern name for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is at most 3.
#[must_use]
pub fn suggest_pattern(input: &str) -> Option<String> {
    BUILTIN_PATTERNS
        .iter()
        .map(|p| (p.name, strsim::damerau_levenshtein(input, p.name)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

// ============================================================================
// Tests
// ============================================================================
