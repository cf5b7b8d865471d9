//! # Subsystem arbiter
//!
//! Several subsystem mechanisms share motors and are driven by overlapping
//! buttons. The arbiter evaluates the profile's guard rules in priority order
//! each tick and selects exactly one of them, or the idle command when no
//! guard is held. Every subsystem motor is commanded every tick, so a motor
//! not used by the selected rule is always idled.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Command given to a subsystem motor that the selected rule does not use.
pub const IDLE_DEM: f64 = 0.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during arbitration.
#[derive(Debug, thiserror::Error)]
pub enum ArbiterError {
    #[error("The subsystem arbiter has not been initialised")]
    NotInitialised,

    #[error("Guard rule {0:?} has no guard buttons")]
    EmptyGuard(String),

    #[error("Guard rule {0:?} commands motor {1}, which is not a subsystem motor")]
    UnknownMotor(String, String),
}
