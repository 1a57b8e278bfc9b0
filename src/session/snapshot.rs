//! Read-only view of a session published after every tick and command.

use serde::Serialize;

use crate::sequencer::{PhaseSequencer, SequencerState};

/// What a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Running ticks delivered so far.
    pub tick: u64,
    /// Sequencer position.
    #[serde(flatten)]
    pub state: SequencerState,
    /// Configured length of the current phase.
    pub phase_seconds: u32,
    /// Configured number of cycles.
    pub total_cycles: u32,
    /// Ticks left until the final cycle completes.
    pub session_remaining_seconds: u64,
    /// Whether every cycle has completed.
    pub finished: bool,
}

impl Snapshot {
    /// Captures the current view of `sequencer`.
    #[must_use]
    pub fn capture(sequencer: &PhaseSequencer, tick: u64) -> Self {
        let state = sequencer.state();
        Self {
            tick,
            state,
            phase_seconds: sequencer.config().duration_of(state.phase),
            total_cycles: sequencer.config().total_cycles,
            session_remaining_seconds: sequencer.session_remaining_seconds(),
            finished: sequencer.is_terminal(),
        }
    }

    /// One-based number of the cycle in progress, capped at the total.
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.state
            .completed_cycles
            .saturating_add(1)
            .min(self.total_cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{Phase, SequencerConfig};

    #[test]
    fn capture_ready_pose() {
        let seq = PhaseSequencer::new(SequencerConfig::new(4, 7, 8, 4, 2)).unwrap();
        let snap = Snapshot::capture(&seq, 0);
        assert_eq!(snap.state.phase, Phase::Inhale);
        assert_eq!(snap.phase_seconds, 4);
        assert_eq!(snap.cycle(), 1);
        assert_eq!(snap.session_remaining_seconds, 46);
        assert!(!snap.finished);
    }

    #[test]
    fn cycle_is_capped_when_finished() {
        let mut seq = PhaseSequencer::new(SequencerConfig::new(1, 1, 1, 1, 1)).unwrap();
        seq.start();
        for _ in 0..4 {
            seq.tick();
        }
        let snap = Snapshot::capture(&seq, 4);
        assert!(snap.finished);
        assert_eq!(snap.cycle(), 1);
        assert_eq!(snap.session_remaining_seconds, 0);
    }

    #[test]
    fn serializes_flat() {
        let seq = PhaseSequencer::new(SequencerConfig::new(4, 4, 4, 4, 1)).unwrap();
        let json = serde_json::to_value(Snapshot::capture(&seq, 3)).unwrap();
        assert_eq!(json["tick"], 3);
        assert_eq!(json["phase"], "inhale");
        assert_eq!(json["seconds_remaining_in_phase"], 4);
        assert_eq!(json["running"], false);
    }
}
