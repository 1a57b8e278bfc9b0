//! `breathpace run`: drives a session in the terminal.
//!
//! The session driver owns the sequencer. This module wires it to stdout
//! (one rendered line per snapshot), to stdin (line-based controls when
//! attached to a terminal), and to the process shutdown signal.

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::ConfigLoader;
use crate::error::{BreathpaceError, SessionError};
use crate::observability::{EventEmitter, FinishReason, init_metrics};
use crate::sequencer::{Phase, PhaseSequencer};
use crate::session::{Command, SessionDriver, SessionSummary, Snapshot};

/// Run a session to completion.
///
/// # Errors
///
/// Returns a configuration error if the session cannot be loaded,
/// `BreathpaceError::Io` if the event file or metrics listener cannot be
/// opened, and `SessionError::Interrupted` if `shutdown` fires first.
pub async fn run(
    args: &RunArgs,
    quiet: bool,
    shutdown: CancellationToken,
) -> Result<(), BreathpaceError> {
    let loader = ConfigLoader::with_defaults();
    let overrides = args.overrides();
    let load_result = match &args.config {
        Some(path) => loader.load_with(path, &overrides)?,
        None => loader.from_overrides(&overrides)?,
    };
    for warning in &load_result.warnings {
        warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    let session = load_result.config;

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
    }

    let emitter = match &args.events_file {
        Some(path) => Arc::new(EventEmitter::from_file(path)?),
        None => Arc::new(EventEmitter::noop()),
    };

    let interactive = std::io::stdin().is_terminal();
    let autostart = if !session.autostart && !interactive {
        warn!("stdin is not a terminal, starting without waiting for a start command");
        true
    } else {
        session.autostart
    };

    let sequencer = PhaseSequencer::new(session.sequencer)?;
    let cancel = CancellationToken::new();
    let handle = SessionDriver::new(sequencer, session.tick_interval)
        .with_name(session.name.clone())
        .with_emitter(emitter)
        .with_autostart(autostart)
        .launch(cancel.clone());

    info!(
        session_id = %handle.session_id(),
        name = %session.name,
        pattern = session.pattern.as_deref().unwrap_or("custom"),
        "running session"
    );

    let renderer = tokio::spawn(render_snapshots(handle.subscribe(), args.format, quiet));

    let controls = interactive.then(|| {
        if !quiet {
            eprintln!("{CONTROLS_HINT}");
        }
        tokio::spawn(read_controls(handle.commands(), cancel.clone()))
    });

    let interrupter = {
        let commands = handle.commands();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            debug!("shutdown requested, interrupting session");
            let _ = commands.send(Command::Interrupt).await;
        })
    };

    let summary = handle.join().await?;
    interrupter.abort();
    if let Some(controls) = controls {
        controls.abort();
    }
    let _ = renderer.await;

    if !quiet && args.format == OutputFormat::Human {
        println!("{}", summary_line(&summary));
    }

    match summary.reason {
        FinishReason::Interrupted => Err(SessionError::Interrupted.into()),
        FinishReason::Completed | FinishReason::Cancelled => Ok(()),
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Instruction shown to the user for each phase.
#[must_use]
pub const fn instruction(phase: Phase) -> &'static str {
    match phase {
        Phase::Inhale => "Breathe in",
        Phase::Hold => "Hold",
        Phase::Exhale => "Breathe out",
        Phase::Rest => "Rest",
    }
}

/// Renders one snapshot as a single output line.
///
/// # Errors
///
/// Returns a JSON error if the snapshot cannot be serialized.
pub fn render_line(snapshot: &Snapshot, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string(snapshot),
        OutputFormat::Human => {
            let status = if snapshot.finished {
                "  done"
            } else if snapshot.state.running {
                ""
            } else {
                "  (paused)"
            };
            Ok(format!(
                "{:<11} {:>3}s  cycle {}/{}{status}",
                instruction(snapshot.state.phase),
                snapshot.state.seconds_remaining_in_phase,
                snapshot.cycle(),
                snapshot.total_cycles
            ))
        }
    }
}

fn summary_line(summary: &SessionSummary) -> String {
    format!(
        "session {}: {} cycle(s) in {} tick(s)",
        summary.reason, summary.completed_cycles, summary.ticks
    )
}

/// Prints every distinct snapshot until the driver drops its sender.
async fn render_snapshots(mut rx: watch::Receiver<Snapshot>, format: OutputFormat, quiet: bool) {
    let mut last: Option<Snapshot> = None;
    loop {
        let snapshot = *rx.borrow_and_update();
        if !quiet && last != Some(snapshot) {
            match render_line(&snapshot, format) {
                Ok(line) => {
                    let mut out = std::io::stdout().lock();
                    if writeln!(out, "{line}").and_then(|()| out.flush()).is_err() {
                        debug!("stdout closed, rendering stopped");
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "failed to render snapshot"),
            }
            last = Some(snapshot);
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

// ============================================================================
// Stdin controls
// ============================================================================

/// Printed once when stdin controls are live. Enter toggles, so on a
/// `--paused` session it also starts the run.
const CONTROLS_HINT: &str = "controls: <enter>/p start-pause, s start, r reset, q quit";

/// A line typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Send(Command),
    Quit,
}

fn parse_control(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "p" | "pause" => Some(Control::Send(Command::Toggle)),
        "s" | "start" => Some(Control::Send(Command::Start)),
        "r" | "reset" => Some(Control::Send(Command::Reset)),
        "q" | "quit" => Some(Control::Quit),
        _ => None,
    }
}

async fn read_controls(commands: mpsc::Sender<Command>, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            () = cancel.cancelled() => return,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(line)) => match parse_control(&line) {
                Some(Control::Send(command)) => {
                    if commands.send(command).await.is_err() {
                        return;
                    }
                }
                Some(Control::Quit) => {
                    info!("quit requested");
                    cancel.cancel();
                    return;
                }
                None => warn!(input = %line.trim(), "unrecognized control"),
            },
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::SequencerConfig;
    use uuid::Uuid;

    fn snapshot_after(ticks: usize, start: bool) -> Snapshot {
        let mut seq = PhaseSequencer::new(SequencerConfig::new(4, 7, 8, 4, 2)).unwrap();
        if start {
            seq.start();
        }
        for _ in 0..ticks {
            seq.tick();
        }
        Snapshot::capture(&seq, ticks as u64)
    }

    #[test]
    fn instructions_per_phase() {
        let texts: Vec<&str> = Phase::ALL.iter().map(|p| instruction(*p)).collect();
        assert_eq!(texts, vec!["Breathe in", "Hold", "Breathe out", "Rest"]);
    }

    #[test]
    fn human_line_running() {
        let line = render_line(&snapshot_after(5, true), OutputFormat::Human).unwrap();
        assert_eq!(line, "Hold          6s  cycle 1/2");
    }

    #[test]
    fn human_line_paused() {
        let line = render_line(&snapshot_after(0, false), OutputFormat::Human).unwrap();
        assert_eq!(line, "Breathe in    4s  cycle 1/2  (paused)");
    }

    #[test]
    fn human_line_finished() {
        let line = render_line(&snapshot_after(46, true), OutputFormat::Human).unwrap();
        assert!(line.ends_with("cycle 2/2  done"), "{line}");
    }

    #[test]
    fn json_line_is_snapshot() {
        let line = render_line(&snapshot_after(12, true), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["phase"], "exhale");
        assert_eq!(value["seconds_remaining_in_phase"], 7);
        assert_eq!(value["tick"], 12);
    }

    #[test]
    fn controls_parse() {
        assert_eq!(parse_control(""), Some(Control::Send(Command::Toggle)));
        assert_eq!(parse_control(" P "), Some(Control::Send(Command::Toggle)));
        assert_eq!(parse_control("s"), Some(Control::Send(Command::Start)));
        assert_eq!(parse_control("reset"), Some(Control::Send(Command::Reset)));
        assert_eq!(parse_control("q"), Some(Control::Quit));
        assert_eq!(parse_control("jump"), None);
    }

    #[test]
    fn enter_starts_a_waiting_session() {
        let mut seq = PhaseSequencer::new(SequencerConfig::new(4, 7, 8, 4, 2)).unwrap();
        let Some(Control::Send(command)) = parse_control("") else {
            panic!("enter should map to a command");
        };
        assert_eq!(command, Command::Toggle);
        seq.toggle();
        assert!(seq.is_running());
        seq.toggle();
        assert!(!seq.is_running());
        assert!(CONTROLS_HINT.contains("<enter>/p start-pause"));
    }

    #[test]
    fn summary_line_mentions_reason() {
        let summary = SessionSummary {
            session_id: Uuid::nil(),
            completed_cycles: 2,
            ticks: 46,
            reason: FinishReason::Completed,
        };
        assert_eq!(summary_line(&summary), "session completed: 2 cycle(s) in 46 tick(s)");
    }
}
