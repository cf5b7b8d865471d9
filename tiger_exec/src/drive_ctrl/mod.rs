//! Drive control module
//!
//! Turns the operator's throttle and steer sticks into drivetrain commands:
//! each axis is shaped by its input curve, then the two are arcade-mixed into
//! left and right commands which are limited and scaled to the drive motors'
//! output range.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod curve;
mod mixer;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use curve::*;
pub use mixer::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest magnitude of a drive command in stick units.
pub const DRIVE_CMD_MAX: f64 = tiger_if::eqpt::ANALOG_MAX as f64;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("DriveCtrl has not been initialised")]
    NotInitialised,
}
