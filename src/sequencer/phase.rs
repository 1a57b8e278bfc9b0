//! Breathing phases and their fixed cyclic order.

use serde::{Deserialize, Serialize};

/// One stage of a breathing cycle.
///
/// The order is fixed: Inhale → Hold → Exhale → Rest → Inhale. A phase
/// carries no duration of its own; durations come from the active
/// [`SequencerConfig`](super::SequencerConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Breathing in. First phase of every cycle.
    #[default]
    Inhale,
    /// Holding the breath after inhaling.
    Hold,
    /// Breathing out.
    Exhale,
    /// Pause after exhaling. Last phase of every cycle.
    Rest,
}

impl Phase {
    /// All phases in cyclic order, starting from [`Phase::Inhale`].
    pub const ALL: [Self; 4] = [Self::Inhale, Self::Hold, Self::Exhale, Self::Rest];

    /// Returns the phase that follows `self`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Inhale => Self::Hold,
            Self::Hold => Self::Exhale,
            Self::Exhale => Self::Rest,
            Self::Rest => Self::Inhale,
        }
    }

    /// Whether leaving this phase completes a cycle.
    #[must_use]
    pub const fn ends_cycle(self) -> bool {
        matches!(self, Self::Rest)
    }

    /// Zero-based position within a cycle.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Inhale => 0,
            Self::Hold => 1,
            Self::Exhale => 2,
            Self::Rest => 3,
        }
    }

    /// Stable lowercase label used in logs, events, and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inhale => "inhale",
            Self::Hold => "hold",
            Self::Exhale => "exhale",
            Self::Rest => "rest",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
