//! # Telemetry interface
//!
//! Telemetry sinks are best-effort: a failed write is reported back so the
//! caller can count it, but it never affects control.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::motion::Pose;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Destination for display lines and telemetry events.
pub trait TelemetrySink: Send {
    /// Show `text` on the given line of the robot's display.
    fn display(&mut self, line: u8, text: &str) -> Result<(), SinkError>;

    /// Record a telemetry event.
    fn log(&mut self, event: &TlmEvent) -> Result<(), SinkError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Telemetry events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TlmEvent {
    /// A periodic sample of the motion controller's pose.
    PoseSample {
        /// Time of the sample on the reporter's clock.
        ///
        /// Units: milliseconds
        elapsed_ms: u64,

        pose: Pose
    }
}

/// Failures when writing to a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("The sink has been closed")]
    Closed,

    #[error("Display line {0} does not exist")]
    InvalidLine(u8),

    #[error("Could not write to the sink: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Sink backend error: {0}")]
    BackendError(String)
}
