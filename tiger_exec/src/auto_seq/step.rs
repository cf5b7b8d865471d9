//! Autonomous steps

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use tiger_if::{
    eqpt::{ActId, MotorId},
    motion::{MoveOptions, Point, Pose},
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A single step of an autonomous routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AutoStep {
    /// Write voltages to the drivetrain then wait.
    TimedDrive {
        /// Units: millivolts
        left: f64,

        /// Units: millivolts
        right: f64,

        duration_ms: u64,
    },

    /// Hold the current outputs.
    Wait {
        duration_ms: u64,
    },

    /// Set a digital actuator.
    ActuatorSet {
        actuator: ActId,
        value: bool,
    },

    /// Write a voltage to a single non-drive motor.
    MotorSet {
        motor: MotorId,

        /// Units: millivolts
        value: f64,
    },

    /// Drive to a point with the motion controller.
    ClosedLoopMove {
        target: Point,
        timeout_ms: u64,

        #[serde(default)]
        options: MoveOptions,
    },

    /// Turn to a heading with the motion controller.
    ClosedLoopTurn {
        heading_deg: f64,
        timeout_ms: u64,
    },

    /// Overwrite the motion controller's pose estimate.
    SetPose {
        x: f64,
        y: f64,
        heading_deg: f64,
    },

    /// Calibrate the motion controller's sensors.
    Calibrate,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutoStep {
    /// Short name of the step's kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            AutoStep::TimedDrive { .. } => "TimedDrive",
            AutoStep::Wait { .. } => "Wait",
            AutoStep::ActuatorSet { .. } => "ActuatorSet",
            AutoStep::MotorSet { .. } => "MotorSet",
            AutoStep::ClosedLoopMove { .. } => "ClosedLoopMove",
            AutoStep::ClosedLoopTurn { .. } => "ClosedLoopTurn",
            AutoStep::SetPose { .. } => "SetPose",
            AutoStep::Calibrate => "Calibrate",
        }
    }

    /// Longest time the step can take, if known.
    ///
    /// Timed steps take exactly their duration and closed-loop steps at most
    /// their timeout. Calibration has no bound.
    pub fn max_duration_ms(&self) -> Option<u64> {
        match self {
            AutoStep::TimedDrive { duration_ms, .. } | AutoStep::Wait { duration_ms } => {
                Some(*duration_ms)
            }
            AutoStep::ClosedLoopMove { timeout_ms, .. }
            | AutoStep::ClosedLoopTurn { timeout_ms, .. } => Some(*timeout_ms),
            AutoStep::ActuatorSet { .. } | AutoStep::MotorSet { .. } | AutoStep::SetPose { .. } => {
                Some(0)
            }
            AutoStep::Calibrate => None,
        }
    }

    /// The pose of a `SetPose` step.
    pub fn pose(&self) -> Option<Pose> {
        match self {
            AutoStep::SetPose { x, y, heading_deg } => Some(Pose::new(*x, *y, *heading_deg)),
            _ => None,
        }
    }
}
