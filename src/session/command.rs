//! Control commands accepted by the session driver.

use crate::sequencer::SequencerConfig;

/// A request to change the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start or resume ticking.
    Start,
    /// Stop ticking, keeping position.
    Pause,
    /// Pause when running, start otherwise.
    Toggle,
    /// Return to the ready pose.
    Reset,
    /// Install new timings from the next phase boundary.
    Reconfigure(SequencerConfig),
    /// Pause and end the session as interrupted.
    Interrupt,
}

impl Command {
    /// Lowercase name used for logs and metric labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Toggle => "toggle",
            Self::Reset => "reset",
            Self::Reconfigure(_) => "reconfigure",
            Self::Interrupt => "interrupt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_distinct() {
        let commands = [
            Command::Start,
            Command::Pause,
            Command::Toggle,
            Command::Reset,
            Command::Reconfigure(SequencerConfig::new(1, 1, 1, 1, 1)),
            Command::Interrupt,
        ];
        let mut names: Vec<&str> = commands.iter().map(Command::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), commands.len());
    }
}
