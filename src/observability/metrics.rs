//! Prometheus metrics.
//!
//! Label values all come from closed sets (`Phase`, command names), so no
//! cardinality guard is needed.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::BreathpaceError;
use crate::sequencer::Phase;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `BreathpaceError::Io` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), BreathpaceError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| BreathpaceError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    tracing::info!(port = ?port, "metrics recorder installed");
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!("breathpace_ticks_total", "Ticks delivered to the sequencer");
    describe_counter!(
        "breathpace_phase_transitions_total",
        "Phase transitions by source and target phase"
    );
    describe_counter!(
        "breathpace_cycles_completed_total",
        "Breathing cycles completed"
    );
    describe_gauge!(
        "breathpace_current_phase",
        "Currently active phase (1 = active)"
    );
    describe_counter!(
        "breathpace_commands_total",
        "Control commands received by the session driver"
    );
}

/// Records one delivered tick.
pub fn record_tick() {
    counter!("breathpace_ticks_total").increment(1);
}

/// Records a phase transition.
pub fn record_phase_transition(from: Phase, to: Phase) {
    counter!(
        "breathpace_phase_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Records a completed cycle.
pub fn record_cycle_completed() {
    counter!("breathpace_cycles_completed_total").increment(1);
}

/// Sets the currently active phase gauge.
///
/// Zeros out the previous phase label (if any) so only one phase reads `1.0`.
pub fn set_current_phase(phase: Phase, previous: Option<Phase>) {
    if let Some(prev) = previous.filter(|p| *p != phase) {
        gauge!("breathpace_current_phase", "phase" => prev.as_str()).set(0.0);
    }
    gauge!("breathpace_current_phase", "phase" => phase.as_str()).set(1.0);
}

/// Records a control command.
pub fn record_command(command: &'static str) {
    counter!("breathpace_commands_total", "command" => command).increment(1);
}
