//! Tick loop and handle.
//!
//! [`SessionDriver`] moves a sequencer into a spawned task that selects over
//! a tokio interval, a bounded command channel, and a cancellation token.
//! Each tick or command publishes a fresh [`Snapshot`] on a watch channel
//! and emits the matching events and metrics.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BreathpaceError, SessionError};
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter, FinishReason};
use crate::sequencer::{Phase, PhaseSequencer, SequencerConfig};

use super::command::Command;
use super::snapshot::Snapshot;

/// Commands buffered before `send` starts waiting.
const COMMAND_BUFFER: usize = 32;

// ============================================================================
// Summary
// ============================================================================

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Id shared with every event of the run.
    pub session_id: Uuid,
    /// Cycles completed before the end.
    pub completed_cycles: u32,
    /// Running ticks delivered.
    pub ticks: u64,
    /// Why the session ended.
    pub reason: FinishReason,
}

// ============================================================================
// Driver
// ============================================================================

/// Owns a sequencer and drives it from a wall clock.
#[derive(Debug)]
pub struct SessionDriver {
    sequencer: PhaseSequencer,
    tick_interval: Duration,
    emitter: Arc<EventEmitter>,
    name: String,
    autostart: bool,
    exit_on_finish: bool,
    session_id: Uuid,
    ticks: u64,
}

impl SessionDriver {
    /// Creates a driver with a silent emitter that waits for `Start` and
    /// exits once every cycle has completed.
    #[must_use]
    pub fn new(sequencer: PhaseSequencer, tick_interval: Duration) -> Self {
        Self {
            sequencer,
            tick_interval,
            emitter: Arc::new(EventEmitter::noop()),
            name: "session".to_string(),
            autostart: false,
            exit_on_finish: true,
            session_id: Uuid::new_v4(),
            ticks: 0,
        }
    }

    /// Spawns a driver with default options.
    #[must_use]
    pub fn spawn(
        sequencer: PhaseSequencer,
        tick_interval: Duration,
        emitter: Arc<EventEmitter>,
        cancel: CancellationToken,
    ) -> SessionHandle {
        Self::new(sequencer, tick_interval)
            .with_emitter(emitter)
            .launch(cancel)
    }

    /// Sets the display name reported in `SessionStarted`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Starts ticking as soon as the task runs.
    #[must_use]
    pub fn with_autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    /// Whether the task ends when the final cycle completes. When `false`
    /// the task stays alive for `Reset` until cancelled.
    #[must_use]
    pub fn exit_on_finish(mut self, exit: bool) -> Self {
        self.exit_on_finish = exit;
        self
    }

    /// Moves the driver into a tokio task and returns its handle.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn launch(self, cancel: CancellationToken) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::capture(&self.sequencer, 0));
        let session_id = self.session_id;
        let task = tokio::spawn(self.run(command_rx, snapshot_tx, cancel.clone()));

        SessionHandle {
            session_id,
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<Snapshot>,
        cancel: CancellationToken,
    ) -> SessionSummary {
        self.emitter.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            session_id: self.session_id,
            name: self.name.clone(),
            config: *self.sequencer.config(),
        });
        info!(
            session_id = %self.session_id,
            name = %self.name,
            tick = %humantime::format_duration(self.tick_interval),
            "session started"
        );
        metrics::set_current_phase(self.sequencer.state().phase, None);

        let mut interval =
            tokio::time::interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if self.autostart {
            self.handle_start(&mut interval);
            self.publish(&snapshots);
        }

        let reason = loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("session driver cancelled");
                    break FinishReason::Cancelled;
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("all session handles dropped");
                        break FinishReason::Cancelled;
                    };
                    metrics::record_command(command.name());
                    let finished = self.handle_command(command, &mut interval);
                    self.publish(&snapshots);
                    if let Some(reason) = finished {
                        break reason;
                    }
                }
                _ = interval.tick() => {
                    let finished = self.handle_tick();
                    self.publish(&snapshots);
                    if finished && self.exit_on_finish {
                        break FinishReason::Completed;
                    }
                }
            }
        };

        let completed_cycles = self.sequencer.state().completed_cycles;
        self.emitter.emit(Event::SessionFinished {
            timestamp: Utc::now(),
            completed_cycles,
            reason,
        });
        info!(
            session_id = %self.session_id,
            completed_cycles,
            ticks = self.ticks,
            %reason,
            "session finished"
        );

        SessionSummary {
            session_id: self.session_id,
            completed_cycles,
            ticks: self.ticks,
            reason,
        }
    }

    /// Applies one clock tick. Returns `true` on the tick that finished the run.
    fn handle_tick(&mut self) -> bool {
        if !self.sequencer.is_running() {
            return false;
        }

        let outcome = self.sequencer.tick_with_outcome();
        self.ticks += 1;
        metrics::record_tick();

        if let Some(transition) = outcome.transition {
            metrics::record_phase_transition(transition.from, transition.to);
            metrics::set_current_phase(transition.to, Some(transition.from));
            if transition.completes_cycle() {
                metrics::record_cycle_completed();
                self.emitter.emit(Event::CycleCompleted {
                    timestamp: Utc::now(),
                    completed_cycles: transition.completed_cycles,
                    total_cycles: self.sequencer.config().total_cycles,
                });
            }
            if !outcome.finished {
                self.emit_phase_entered();
            }
        }

        outcome.finished
    }

    /// Applies a command. Returns a reason when the session should end.
    fn handle_command(&mut self, command: Command, interval: &mut Interval) -> Option<FinishReason> {
        debug!(command = command.name(), "command received");
        match command {
            Command::Start => self.handle_start(interval),
            Command::Pause => self.handle_pause(),
            Command::Toggle => {
                if self.sequencer.is_running() {
                    self.handle_pause();
                } else {
                    self.handle_start(interval);
                }
            }
            Command::Reset => {
                let previous = self.sequencer.state().phase;
                self.sequencer.reset();
                metrics::set_current_phase(Phase::Inhale, Some(previous));
                self.emitter.emit(Event::Reset {
                    timestamp: Utc::now(),
                });
            }
            Command::Reconfigure(config) => {
                if let Err(e) = self.sequencer.reconfigure(config) {
                    warn!(error = %e, "reconfigure rejected");
                    return None;
                }
                self.emitter.emit(Event::Reconfigured {
                    timestamp: Utc::now(),
                    config,
                });
                // Lowering the cycle count to what the run already completed
                // stops the sequencer; nothing is left to resume.
                if self.exit_on_finish && self.sequencer.is_terminal() {
                    return Some(FinishReason::Completed);
                }
            }
            Command::Interrupt => {
                self.handle_pause();
                return Some(FinishReason::Interrupted);
            }
        }
        None
    }

    fn handle_start(&mut self, interval: &mut Interval) {
        if self.sequencer.is_running() {
            return;
        }
        let was_ready = self.sequencer.state().is_ready(self.sequencer.config());
        self.sequencer.start();
        if !self.sequencer.is_running() {
            return;
        }

        // Next tick lands a full interval after the resume.
        interval.reset();

        let state = self.sequencer.state();
        self.emitter.emit(Event::Resumed {
            timestamp: Utc::now(),
            phase: state.phase,
            seconds_remaining: state.seconds_remaining_in_phase,
        });
        if was_ready {
            self.emit_phase_entered();
        }
    }

    fn handle_pause(&mut self) {
        if !self.sequencer.is_running() {
            return;
        }
        self.sequencer.pause();
        let state = self.sequencer.state();
        self.emitter.emit(Event::Paused {
            timestamp: Utc::now(),
            phase: state.phase,
            seconds_remaining: state.seconds_remaining_in_phase,
        });
    }

    fn emit_phase_entered(&self) {
        let snapshot = Snapshot::capture(&self.sequencer, self.ticks);
        self.emitter.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            phase: snapshot.state.phase,
            duration_seconds: snapshot.phase_seconds,
            cycle: snapshot.cycle(),
        });
    }

    fn publish(&self, snapshots: &watch::Sender<Snapshot>) {
        snapshots.send_replace(Snapshot::capture(&self.sequencer, self.ticks));
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Control surface for a running session.
#[derive(Debug)]
pub struct SessionHandle {
    session_id: Uuid,
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Id shared with every event of the run.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Queues a command for the driver.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CommandChannelClosed` if the driver has exited.
    pub async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::CommandChannelClosed)
    }

    /// Validates `config` and queues it for the driver.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::InvalidConfig` without contacting the driver
    /// if `config` is invalid, or `SessionError::CommandChannelClosed` if the
    /// driver has exited.
    pub async fn reconfigure(&self, config: SequencerConfig) -> Result<(), BreathpaceError> {
        config.validate()?;
        self.send(Command::Reconfigure(config)).await?;
        Ok(())
    }

    /// A second sender for feeding commands from another task.
    #[must_use]
    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    /// Receiver that wakes on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshots.borrow()
    }

    /// Asks the driver to stop. The session ends as cancelled.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Waits for the driver task to end.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::TaskFailed` if the task panicked or was aborted.
    pub async fn join(self) -> Result<SessionSummary, SessionError> {
        self.task
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))
    }
}
