//! # Motion controller interface
//!
//! The motion controller owns odometry and closed-loop navigation. The
//! decision layer only asks it to move, turn, or report where it thinks the
//! robot is.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Closed-loop navigation from a pose estimate.
///
/// All methods take `&self` as the controller is shared between the phase
/// currently driving the robot and the telemetry reporter, which reads the
/// pose concurrently.
pub trait MotionController: Send + Sync {
    /// Calibrate the pose sensors. Blocks until complete.
    fn calibrate(&self);

    /// Overwrite the current pose estimate.
    fn set_pose(&self, pose: Pose);

    /// Snapshot of the current pose estimate.
    fn get_pose(&self) -> Pose;

    /// Drive to a point in the field frame.
    ///
    /// Blocks until the point is reached or `timeout_ms` has elapsed.
    fn move_to_point(
        &self,
        x: f64,
        y: f64,
        timeout_ms: u64,
        options: &MoveOptions
    ) -> MotionOutcome;

    /// Turn on the spot to a heading in the field frame.
    ///
    /// Blocks until the heading is reached or `timeout_ms` has elapsed.
    fn turn_to_heading(&self, heading_deg: f64, timeout_ms: u64) -> MotionOutcome;

    /// Open-loop arcade command, both inputs in `-127..=127`.
    fn drive_arcade(&self, throttle: f64, steer: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Estimated pose of the robot in the field frame.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Units: inches
    pub x: f64,

    /// Units: inches
    pub y: f64,

    /// Clockwise from the field's +Y axis.
    ///
    /// Units: degrees
    pub heading_deg: f64
}

/// A point in the field frame.
///
/// Units: inches
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64
}

/// Options passed through to [`MotionController::move_to_point`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MoveOptions {
    /// Drive forwards (`true`) or backwards into the point.
    pub forwards: bool,

    /// Maximum drive speed, `0..=127`.
    pub max_speed: f64,

    /// Minimum drive speed, `0..=127`.
    pub min_speed: f64,

    /// Distance from the target at which the move counts as reached.
    ///
    /// Units: inches
    pub early_exit_range: f64
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How a blocking closed-loop motion ended.
///
/// A timeout is a normal ending, not an error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum MotionOutcome {
    Reached,
    TimedOut
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self { x, y, heading_deg }
    }
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            forwards: true,
            max_speed: 127.0,
            min_speed: 0.0,
            early_exit_range: 0.0
        }
    }
}
