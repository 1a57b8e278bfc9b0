//! Phase sequencer state machine.
//!
//! [`advance`] is the pure transition function: one running tick in, one
//! state out. [`PhaseSequencer`] owns a config and a state, routes commands,
//! and delegates ticks to [`advance`]. The sequencer has no clock of its own.
//! Whoever owns it decides how often to call [`PhaseSequencer::tick`].

use tracing::{debug, info, trace};

use crate::error::SequencerError;

use super::config::SequencerConfig;
use super::phase::Phase;
use super::state::{PhaseTransition, SequencerState, TickOutcome};

/// Applies one second of elapsed time to `state` under `config`.
///
/// A stopped state is returned unchanged. A running state loses one second
/// from its current phase; when that consumes the phase's last second the
/// successor phase is entered with its full configured duration in the same
/// tick. Leaving [`Phase::Rest`] completes a cycle, and
/// completing the final cycle stops the run at a fresh inhale pose.
#[must_use]
pub fn advance(state: SequencerState, config: &SequencerConfig) -> TickOutcome {
    if !state.running {
        return TickOutcome::idle(state);
    }

    let mut next = state;

    if state.seconds_remaining_in_phase > 1 {
        next.seconds_remaining_in_phase -= 1;
        return TickOutcome::idle(next);
    }

    // Phase exhausted on this tick: roll over to the successor.
    let from = state.phase;
    let to = from.next();
    next.phase = to;
    next.seconds_remaining_in_phase = config.duration_of(to);

    let mut finished = false;
    if from.ends_cycle() {
        next.completed_cycles = state
            .completed_cycles
            .saturating_add(1)
            .min(config.total_cycles);
        if next.is_terminal(config) {
            next.running = false;
            finished = true;
        }
    }

    TickOutcome {
        state: next,
        transition: Some(PhaseTransition {
            from,
            to,
            completed_cycles: next.completed_cycles,
        }),
        finished,
    }
}

/// Four-phase breathing sequencer.
///
/// Commands (`start`, `pause`, `reset`, `reconfigure`) and ticks must be
/// issued serially from a single owner.
#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    config: SequencerConfig,
    state: SequencerState,
}

impl PhaseSequencer {
    /// Creates a sequencer in the ready pose.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::InvalidConfig` if any duration or the cycle
    /// count is below 1.
    pub fn new(config: SequencerConfig) -> Result<Self, SequencerError> {
        config.validate()?;
        debug!(
            inhale = config.inhale_seconds,
            hold = config.hold_seconds,
            exhale = config.exhale_seconds,
            rest = config.rest_seconds,
            cycles = config.total_cycles,
            "sequencer created"
        );
        Ok(Self {
            state: SequencerState::ready(&config),
            config,
        })
    }

    /// Starts or resumes the run.
    ///
    /// Progress is kept, so resuming continues mid-phase. Does nothing if
    /// already running, or if every cycle has completed (call
    /// [`reset`](Self::reset) first).
    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        if self.is_terminal() {
            debug!("start ignored: run already finished");
            return;
        }
        self.state.running = true;
        info!(
            phase = %self.state.phase,
            remaining = self.state.seconds_remaining_in_phase,
            completed_cycles = self.state.completed_cycles,
            "sequencer started"
        );
    }

    /// Pauses the run, keeping phase, remaining time, and cycle count.
    pub fn pause(&mut self) {
        if !self.state.running {
            return;
        }
        self.state.running = false;
        info!(
            phase = %self.state.phase,
            remaining = self.state.seconds_remaining_in_phase,
            "sequencer paused"
        );
    }

    /// Pauses when running, starts otherwise.
    pub fn toggle(&mut self) {
        if self.state.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Returns to the ready pose of the current configuration.
    pub fn reset(&mut self) {
        self.state = SequencerState::ready(&self.config);
        info!("sequencer reset");
    }

    /// Advances one second if running and returns the resulting snapshot.
    pub fn tick(&mut self) -> SequencerState {
        self.tick_with_outcome().state
    }

    /// Like [`tick`](Self::tick), but also reports any phase boundary crossed.
    pub fn tick_with_outcome(&mut self) -> TickOutcome {
        let outcome = advance(self.state, &self.config);
        self.state = outcome.state;

        if let Some(transition) = outcome.transition {
            debug!(
                from = %transition.from,
                to = %transition.to,
                completed_cycles = transition.completed_cycles,
                "phase transition"
            );
        } else {
            trace!(
                phase = %self.state.phase,
                remaining = self.state.seconds_remaining_in_phase,
                "tick"
            );
        }
        if outcome.finished {
            info!(
                completed_cycles = self.state.completed_cycles,
                "all cycles completed"
            );
        }

        outcome
    }

    /// Installs a new configuration for future duration lookups.
    ///
    /// The current phase keeps its remaining time; new durations apply from
    /// the next phase boundary, or immediately after a [`reset`](Self::reset).
    /// A cycle count at or below the cycles already completed ends the run:
    /// the completed count is clamped to the new total and the sequencer
    /// stops where it is.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::InvalidConfig` if the new configuration is
    /// invalid. The previous configuration and state are left untouched.
    pub fn reconfigure(&mut self, config: SequencerConfig) -> Result<(), SequencerError> {
        config.validate()?;
        self.config = config;
        if self.state.completed_cycles >= config.total_cycles {
            self.state.completed_cycles = config.total_cycles;
            if self.state.running {
                self.state.running = false;
                info!(
                    completed_cycles = self.state.completed_cycles,
                    "run finished: cycle count lowered to completed cycles"
                );
            }
        }
        info!(
            inhale = config.inhale_seconds,
            hold = config.hold_seconds,
            exhale = config.exhale_seconds,
            rest = config.rest_seconds,
            cycles = config.total_cycles,
            "sequencer reconfigured"
        );
        Ok(())
    }

    /// Current snapshot.
    #[must_use]
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Whether ticks currently advance the run.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    /// Whether every configured cycle has completed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal(&self.config)
    }

    /// Seconds already spent in the current phase.
    #[must_use]
    pub const fn elapsed_in_phase(&self) -> u32 {
        self.config
            .duration_of(self.state.phase)
            .saturating_sub(self.state.seconds_remaining_in_phase)
    }

    /// Fraction of the current cycle already elapsed, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cycle_progress(&self) -> f64 {
        if self.is_terminal() {
            return 1.0;
        }
        let total = self.config.cycle_seconds();
        let before: u64 = Phase::ALL[..self.state.phase.index()]
            .iter()
            .map(|p| u64::from(self.config.duration_of(*p)))
            .sum();
        let position = (before + u64::from(self.elapsed_in_phase())).min(total);
        position as f64 / total as f64
    }

    /// Seconds of ticking left until the final cycle completes.
    #[must_use]
    pub fn session_remaining_seconds(&self) -> u64 {
        if self.is_terminal() {
            return 0;
        }
        let later_phases: u64 = Phase::ALL[self.state.phase.index() + 1..]
            .iter()
            .map(|p| u64::from(self.config.duration_of(*p)))
            .sum();
        let later_cycles = u64::from(
            self.config
                .total_cycles
                .saturating_sub(self.state.completed_cycles)
                .saturating_sub(1),
        );
        u64::from(self.state.seconds_remaining_in_phase)
            + later_phases
            + later_cycles * self.config.cycle_seconds()
    }
}
