//! Sequencer state snapshots.
//!
//! A [`SequencerState`] is a plain `Copy` value. The sequencer owns the live
//! one; renderers and the session driver only ever receive copies.

use serde::Serialize;

use super::config::SequencerConfig;
use super::phase::Phase;

/// Position of a run at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequencerState {
    /// Phase currently being displayed.
    pub phase: Phase,
    /// Whole seconds left before the phase ends.
    pub seconds_remaining_in_phase: u32,
    /// Cycles finished so far, never above the configured total.
    pub completed_cycles: u32,
    /// Whether ticks currently advance the run.
    pub running: bool,
}

impl SequencerState {
    /// The ready pose for `config`: stopped at the start of the first inhale.
    #[must_use]
    pub const fn ready(config: &SequencerConfig) -> Self {
        Self {
            phase: Phase::Inhale,
            seconds_remaining_in_phase: config.inhale_seconds,
            completed_cycles: 0,
            running: false,
        }
    }

    /// Whether every configured cycle has been completed.
    #[must_use]
    pub const fn is_terminal(&self, config: &SequencerConfig) -> bool {
        self.completed_cycles >= config.total_cycles
    }

    /// Whether this is exactly the ready pose for `config`.
    #[must_use]
    pub fn is_ready(&self, config: &SequencerConfig) -> bool {
        *self == Self::ready(config)
    }
}

/// A phase boundary crossed during a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    /// Phase that just ended.
    pub from: Phase,
    /// Phase that was entered.
    pub to: Phase,
    /// Completed cycles after the transition.
    pub completed_cycles: u32,
}

impl PhaseTransition {
    /// Whether this transition finished a cycle (Rest → Inhale).
    #[must_use]
    pub const fn completes_cycle(&self) -> bool {
        self.from.ends_cycle()
    }
}

/// Result of applying one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// State after the tick.
    pub state: SequencerState,
    /// Boundary crossed by this tick, if any.
    pub transition: Option<PhaseTransition>,
    /// True only on the tick that completed the final cycle.
    pub finished: bool,
}

impl TickOutcome {
    /// An outcome in which nothing moved.
    #[must_use]
    pub const fn idle(state: SequencerState) -> Self {
        Self {
            state,
            transition: None,
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_pose() {
        let config = SequencerConfig::new(5, 2, 6, 1, 3);
        let state = SequencerState::ready(&config);
        assert_eq!(state.phase, Phase::Inhale);
        assert_eq!(state.seconds_remaining_in_phase, 5);
        assert_eq!(state.completed_cycles, 0);
        assert!(!state.running);
        assert!(state.is_ready(&config));
        assert!(!state.is_terminal(&config));
    }

    #[test]
    fn test_terminal_when_cycles_reached() {
        let config = SequencerConfig::new(1, 1, 1, 1, 2);
        let state = SequencerState {
            completed_cycles: 2,
            ..SequencerState::ready(&config)
        };
        assert!(state.is_terminal(&config));
        assert!(!state.is_ready(&config));
    }

    #[test]
    fn test_transition_completes_cycle() {
        let t = PhaseTransition {
            from: Phase::Rest,
            to: Phase::Inhale,
            completed_cycles: 1,
        };
        assert!(t.completes_cycle());

        let t = PhaseTransition {
            from: Phase::Inhale,
            to: Phase::Hold,
            completed_cycles: 0,
        };
        assert!(!t.completes_cycle());
    }

    #[test]
    fn test_snapshot_serializes() {
        let config = SequencerConfig::new(4, 7, 8, 4, 1);
        let json = serde_json::to_value(SequencerState::ready(&config)).unwrap();
        assert_eq!(json["phase"], "inhale");
        assert_eq!(json["seconds_remaining_in_phase"], 4);
        assert_eq!(json["completed_cycles"], 0);
        assert_eq!(json["running"], false);
    }
}
