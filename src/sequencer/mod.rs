//! Timed phase sequencer
//!
//! A four-phase breathing cycle (inhale, hold, exhale, rest) advanced by
//! discrete one-second ticks supplied from outside.
//!
//! # Architecture
//!
//! - [`Phase`]: the four phases and their fixed successor order
//! - [`SequencerConfig`]: per-phase durations and the cycle count
//! - [`SequencerState`]: copyable snapshot handed to renderers
//! - [`PhaseSequencer`]: command handling around the pure [`advance`] step

pub mod config;
pub mod engine;
pub mod phase;
pub mod state;

pub use config::SequencerConfig;
pub use engine::{PhaseSequencer, advance};
pub use phase::Phase;
pub use state::{PhaseTransition, SequencerState, TickOutcome};
