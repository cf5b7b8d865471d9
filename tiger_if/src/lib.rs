//! # Tiger interface crate.
//!
//! Defines the boundary between the robot's decision layer and the
//! collaborators it drives: the hardware I/O layer, the motion controller and
//! the telemetry sinks. Implementations live elsewhere (on the robot, or in
//! the simulation inside `tiger_exec`).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Hardware identifiers and the hardware I/O interface
pub mod eqpt;

/// Pose types and the motion controller interface
pub mod motion;

/// Telemetry events and the sink interface
pub mod tlm;
