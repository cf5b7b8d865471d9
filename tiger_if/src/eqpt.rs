//! # Equipment Interface
//!
//! This module defines the identifiers of the robot's controller inputs,
//! motors and actuators, and the interface through which they are read and
//! written.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod hw;

// -----------------------------------------------------------------------------------------------
// REEXPORTS
// -----------------------------------------------------------------------------------------------

pub use hw::*;
