//! Structured event stream.
//!
//! Discrete, typed events emitted while a session runs. Events are
//! serialized as newline-delimited JSON (JSONL) and carry a monotonically
//! increasing sequence number for ordering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::sequencer::{Phase, SequencerConfig};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Every configured cycle ran.
    Completed,
    /// The driver was cancelled (shutdown or all handles dropped).
    Cancelled,
    /// The user interrupted the process.
    Interrupted,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// A discrete event emitted during a session.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A session was created and its driver spawned.
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Unique id for this run.
        session_id: Uuid,
        /// Display name.
        name: String,
        /// Timings and cycle count in effect.
        config: SequencerConfig,
    },

    /// A new phase has been entered.
    PhaseEntered {
        /// When the transition occurred.
        timestamp: DateTime<Utc>,
        /// Phase that was entered.
        phase: Phase,
        /// Configured length of that phase.
        duration_seconds: u32,
        /// One-based cycle the phase belongs to.
        cycle: u32,
    },

    /// A full cycle finished.
    CycleCompleted {
        /// When the cycle finished.
        timestamp: DateTime<Utc>,
        /// Cycles completed so far.
        completed_cycles: u32,
        /// Cycles configured.
        total_cycles: u32,
    },

    /// Ticking was paused.
    Paused {
        /// When the pause took effect.
        timestamp: DateTime<Utc>,
        /// Phase at the moment of pausing.
        phase: Phase,
        /// Seconds left in that phase.
        seconds_remaining: u32,
    },

    /// Ticking was (re)started.
    Resumed {
        /// When ticking resumed.
        timestamp: DateTime<Utc>,
        /// Phase ticking resumes in.
        phase: Phase,
        /// Seconds left in that phase.
        seconds_remaining: u32,
    },

    /// The session returned to its ready pose.
    Reset {
        /// When the reset happened.
        timestamp: DateTime<Utc>,
    },

    /// New timings were accepted.
    Reconfigured {
        /// When the new timings were accepted.
        timestamp: DateTime<Utc>,
        /// The configuration now in effect.
        config: SequencerConfig,
    },

    /// The session ended.
    SessionFinished {
        /// When the session ended.
        timestamp: DateTime<Utc>,
        /// Cycles completed before the end.
        completed_cycles: u32,
        /// Why it ended.
        reason: FinishReason,
    },
}

impl Event {
    /// Short name of the variant, matching the serialized `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "SessionStarted",
            Self::PhaseEntered { .. } => "PhaseEntered",
            Self::CycleCompleted { .. } => "CycleCompleted",
            Self::Paused { .. } => "Paused",
            Self::Resumed { .. } => "Resumed",
            Self::Reset { .. } => "Reset",
            Self::Reconfigured { .. } => "Reconfigured",
            Self::SessionFinished { .. } => "SessionFinished",
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) atomically increments the sequence
/// counter, serializes the event as a single JSON line, and flushes the
/// underlying writer. Serialization or I/O failures are dropped; a broken
/// event sink never stops a session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(sequence = seq, kind = event.kind(), "emitting event");
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    pub(crate) struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        pub(crate) fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        pub(crate) fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }

        /// Parsed JSON lines written so far.
        pub(crate) fn lines(&self) -> Vec<serde_json::Value> {
            self.contents()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> Event {
        Event::PhaseEntered {
            timestamp: DateTime::parse_from_rfc3339("2025-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            phase: Phase::Hold,
            duration_seconds: 7,
            cycle: 1,
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "PhaseEntered");
        assert_eq!(parsed["phase"], "hold");
        assert_eq!(parsed["duration_seconds"], 7);
    }

    #[test]
    fn emitter_writes_valid_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());

        let output = tw.contents();
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["type"], "PhaseEntered");
        assert_eq!(parsed["cycle"], 1);
        assert_eq!(parsed["sequence"], 0);
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(Event::SessionFinished {
            timestamp: Utc::now(),
            completed_cycles: 4,
            reason: FinishReason::Completed,
        });

        assert_eq!(emitter.event_count(), 2);

        let lines = tw.lines();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["reason"], "completed");
    }

    #[test]
    fn all_event_variants_serialize_to_valid_json() {
        let now = Utc::now();
        let config = SequencerConfig::new(4, 7, 8, 4, 2);
        let variants: Vec<Event> = vec![
            Event::SessionStarted {
                timestamp: now,
                session_id: Uuid::new_v4(),
                name: "evening".to_owned(),
                config,
            },
            sample_event(),
            Event::CycleCompleted {
                timestamp: now,
                completed_cycles: 1,
                total_cycles: 2,
            },
            Event::Paused {
                timestamp: now,
                phase: Phase::Exhale,
                seconds_remaining: 3,
            },
            Event::Resumed {
                timestamp: now,
                phase: Phase::Exhale,
                seconds_remaining: 3,
            },
            Event::Reset { timestamp: now },
            Event::Reconfigured {
                timestamp: now,
                config,
            },
            Event::SessionFinished {
                timestamp: now,
                completed_cycles: 0,
                reason: FinishReason::Interrupted,
            },
        ];

        for variant in &variants {
            let json = serde_json::to_string(variant).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed["type"], variant.kind(), "bad type tag: {json}");
        }
    }

    #[test]
    fn session_started_embeds_config() {
        let event = Event::SessionStarted {
            timestamp: Utc::now(),
            session_id: Uuid::nil(),
            name: "box".to_owned(),
            config: SequencerConfig::new(4, 4, 4, 4, 6),
        };
        let parsed = serde_json::to_value(&event).unwrap();
        assert_eq!(parsed["session_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(parsed["config"]["inhale"], 4);
        assert_eq!(parsed["config"]["cycles"], 6);
    }

    #[test]
    fn envelope_flattens_event_fields() {
        let envelope = EventEnvelope {
            sequence: 7,
            event: sample_event(),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["sequence"], 7);
        assert_eq!(parsed["type"], "PhaseEntered");
        assert_eq!(parsed["phase"], "hold");
        assert!(
            parsed.get("event").is_none(),
            "event field should be flattened"
        );
    }
}
