//! # Simulation
//!
//! Host-side stand-ins for the robot's collaborators, so that the executable
//! and the tests can run without a robot:
//!
//! - [`SimHardware`] records every motor and actuator write, and serves
//!   controller inputs either set directly or replayed from an input script.
//! - [`SimMotion`] is a kinematic motion controller: it moves the pose at the
//!   drivetrain's free speed and reports arrival or timeout.
//!
//! Both read time from a shared [`util::time::Clock`], so under a
//! [`util::time::SimClock`] a full match runs in no real time at all.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod hw;
mod input_script;
mod motion;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use hw::*;
pub use input_script::*;
pub use motion::*;
