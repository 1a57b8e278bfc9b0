//! Observability
//!
//! Logging, metrics, and the structured event stream for watching a session
//! from outside the process.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter, FinishReason};
pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
