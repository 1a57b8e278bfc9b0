//! `breathpace` - guided breathing sessions
//!
//! A four-phase breathing sequencer (inhale, hold, exhale, rest) with a pure
//! tick function at its core, plus the shell that runs it against a wall
//! clock: session files, built-in patterns, a tick driver, events, metrics,
//! and a CLI.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod patterns;
pub mod sequencer;
pub mod session;
