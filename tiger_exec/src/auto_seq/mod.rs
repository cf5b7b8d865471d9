//! # Autonomous sequencer
//!
//! Autonomous routines are scripts of steps executed strictly in order, once
//! each. Timed steps are dead-reckoned: they command the drivetrain and wait
//! for the literal duration with no feedback. Closed-loop steps are handed to
//! the motion controller, which either arrives or times out. A timeout is not
//! an error and the script carries on.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod script;
mod sequencer;
mod step;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use script::*;
pub use sequencer::*;
pub use step::*;
