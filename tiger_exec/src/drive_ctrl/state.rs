//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{arcade_mix, shape, DriveCtrlError, DRIVE_CMD_MAX};
use crate::profile::{CurveParams, DriveOutput, RobotProfile};
use tiger_if::eqpt::MotorMode;
use util::{maths::lin_map, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Option<DriveCtrlParams>,

    pub(crate) report: StatusReport,

    pub(crate) output: Option<OutputData>,
}

/// Configuration of drive control, taken from the robot profile.
#[derive(Debug, Clone, Copy)]
pub struct DriveCtrlParams {
    pub throttle_curve: CurveParams,
    pub steer_curve: CurveParams,

    /// Where the drive command goes.
    pub output: DriveOutput,

    /// Units of the motor demands.
    pub motor_mode: MotorMode,

    /// Motor demand at full stick deflection.
    pub max_output: f64,
}

/// Input data to drive control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// Raw throttle stick value.
    pub throttle: i32,

    /// Raw steer stick value.
    pub steer: i32,
}

/// Drive command for the tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct OutputData {
    /// Shaped throttle, stick units.
    pub throttle: f64,

    /// Shaped steer, stick units.
    pub steer: f64,

    /// Mixed left command, stick units.
    pub left: f64,

    /// Mixed right command, stick units.
    pub right: f64,

    /// Left motor demand in the drivetrain's motor mode units.
    pub left_dem: f64,

    /// Right motor demand in the drivetrain's motor mode units.
    pub right_dem: f64,
}

/// Status report for drive control processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub left_limited: bool,
    pub right_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCtrlParams {
    pub fn from_profile(profile: &RobotProfile) -> Self {
        Self {
            throttle_curve: profile.throttle_curve,
            steer_curve: profile.steer_curve,
            output: profile.drivetrain.output,
            motor_mode: profile.drivetrain.motor_mode,
            max_output: profile.drivetrain.max_output,
        }
    }
}

impl State for DriveCtrl {
    type InitData = DriveCtrlParams;
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.params = Some(init_data);
        self.report = StatusReport::default();
        self.output = None;

        Ok(())
    }

    /// Shape, mix and scale the operator's sticks.
    ///
    /// There is no memory between ticks, the output depends only on this
    /// tick's input.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let params = self.params.as_ref().ok_or(DriveCtrlError::NotInitialised)?;

        let throttle = shape(input_data.throttle as f64, &params.throttle_curve);
        let steer = shape(input_data.steer as f64, &params.steer_curve);

        let mix = arcade_mix(throttle, steer);

        let to_dem = |cmd: f64| lin_map(
            (-DRIVE_CMD_MAX, DRIVE_CMD_MAX),
            (-params.max_output, params.max_output),
            cmd
        );

        let output = OutputData {
            throttle,
            steer,
            left: mix.left,
            right: mix.right,
            left_dem: to_dem(mix.left),
            right_dem: to_dem(mix.right),
        };

        self.report = StatusReport {
            left_limited: mix.left_limited,
            right_limited: mix.right_limited,
        };

        trace!(
            "DriveCtrl output: thr {:.1} str {:.1} -> L {:.1} R {:.1}",
            output.throttle,
            output.steer,
            output.left_dem,
            output.right_dem
        );

        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl DriveCtrl {
    /// The output of the most recent tick, if any.
    pub fn last_output(&self) -> Option<OutputData> {
        self.output
    }
}
