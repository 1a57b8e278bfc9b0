//! Session driver
//!
//! The imperative shell around [`PhaseSequencer`](crate::sequencer::PhaseSequencer).
//! A single task owns the sequencer and serializes clock ticks and control
//! commands through it. Everyone else talks to that task through a
//! [`SessionHandle`].

pub mod command;
pub mod driver;
pub mod snapshot;

pub use command::Command;
pub use driver::{SessionDriver, SessionHandle, SessionSummary};
pub use snapshot::Snapshot;
