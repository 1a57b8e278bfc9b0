//! Sequencer timing configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SequencerError, ValidationIssue};

use super::phase::Phase;

/// Phase durations and cycle count for one run.
///
/// Durations are whole-second tick counts. Every field must be at least 1;
/// the sequencer checks this on construction and on reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Ticks spent breathing in.
    #[serde(rename = "inhale")]
    pub inhale_seconds: u32,
    /// Ticks spent holding after the inhale.
    #[serde(rename = "hold")]
    pub hold_seconds: u32,
    /// Ticks spent breathing out.
    #[serde(rename = "exhale")]
    pub exhale_seconds: u32,
    /// Ticks spent resting after the exhale.
    #[serde(rename = "rest")]
    pub rest_seconds: u32,
    /// Number of full cycles before the run ends.
    #[serde(rename = "cycles")]
    pub total_cycles: u32,
}

impl SequencerConfig {
    /// Creates a configuration without validating it.
    #[must_use]
    pub const fn new(inhale: u32, hold: u32, exhale: u32, rest: u32, cycles: u32) -> Self {
        Self {
            inhale_seconds: inhale,
            hold_seconds: hold,
            exhale_seconds: exhale,
            rest_seconds: rest,
            total_cycles: cycles,
        }
    }

    /// Configured duration of `phase`, in ticks.
    #[must_use]
    pub const fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale_seconds,
            Phase::Hold => self.hold_seconds,
            Phase::Exhale => self.exhale_seconds,
            Phase::Rest => self.rest_seconds,
        }
    }

    /// Length of one full cycle, in ticks.
    #[must_use]
    pub fn cycle_seconds(&self) -> u64 {
        Phase::ALL
            .iter()
            .map(|p| u64::from(self.duration_of(*p)))
            .sum()
    }

    /// Length of the whole run, in ticks.
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        self.cycle_seconds() * u64::from(self.total_cycles)
    }

    /// Lists every out-of-range field.
    ///
    /// An empty result means the configuration is valid.
    #[must_use]
    pub fn issues(&self) -> Vec<ValidationIssue> {
        let fields = [
            ("inhale", self.inhale_seconds),
            ("hold", self.hold_seconds),
            ("exhale", self.exhale_seconds),
            ("rest", self.rest_seconds),
            ("cycles", self.total_cycles),
        ];
        fields
            .into_iter()
            .filter(|(_, value)| *value < 1)
            .map(|(name, value)| {
                ValidationIssue::error(name, format!("must be at least 1 (got {value})"))
            })
            .collect()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::InvalidConfig` listing every duration below 1
    /// and a cycle count below 1.
    pub fn validate(&self) -> Result<(), SequencerError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SequencerError::InvalidConfig { issues })
        }
    }
}
