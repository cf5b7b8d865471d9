//! # Tiger library.
//!
//! Control logic shared by every Tiger robot. The `tiger_exec` binary wires these modules
//! together, and other tools in the workspace can use them directly.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Subsystem arbiter - picks the one active subsystem command set each tick
pub mod arbiter;

/// Autonomous routine selector - lets the operator pick a routine before the match
pub mod auto_select;

/// Autonomous sequencer - parses and executes autonomous scripts
pub mod auto_seq;

/// Data store for the operator control loop
pub mod data_store;

/// Drive control - shapes the operator's sticks and mixes them into wheel commands
pub mod drive_ctrl;

/// Operator input sampling
pub mod input;

/// Operator control loop
pub mod opcontrol;

/// Executable parameters
pub mod params;

/// Match phases and the signal which ends them
pub mod phase;

/// Per-robot profiles
pub mod profile;

/// Simulated hardware, motion controller and input scripts
pub mod sim;

/// Telemetry reporter - periodically publishes the robot's pose
pub mod tlm_reporter;

/// Actuator toggles
pub mod toggle;
