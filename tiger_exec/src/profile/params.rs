//! Parameter structures making up a robot profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use tiger_if::eqpt::{ActId, AxisId, ButtonId, MotorId, MotorMode};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Static configuration of one robot.
///
/// A profile is loaded once at startup and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotProfile {
    /// Name of the robot, shown in the log.
    pub name: String,

    pub drivetrain: DrivetrainParams,

    /// Gains handed to the motion controller for lateral moves.
    pub linear_gains: ControllerGains,

    /// Gains handed to the motion controller for turns.
    pub angular_gains: ControllerGains,

    /// Input curve applied to the throttle axis.
    pub throttle_curve: CurveParams,

    /// Input curve applied to the steer axis.
    pub steer_curve: CurveParams,

    pub axes: AxisBindings,

    /// Pneumatic actuators and the buttons which toggle them.
    #[serde(default)]
    pub toggles: Vec<ToggleBinding>,

    pub subsystems: SubsystemParams,

    pub autonomous: AutonParams,
}

/// Drivetrain geometry and output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrivetrainParams {
    /// Distance between the left and right wheels.
    ///
    /// Units: inches
    pub track_width_in: f64,

    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Wheel revolutions per motor revolution.
    pub gear_ratio: f64,

    /// Free speed of the drive motors before the gearing.
    ///
    /// Units: rpm
    pub rated_rpm: f64,

    /// Drift allowance passed to the motion controller.
    #[serde(default)]
    pub horizontal_drift: f64,

    /// Motor group driving the left side.
    pub left_motor: MotorId,

    /// Motor group driving the right side.
    pub right_motor: MotorId,

    /// Where the operator's drive command is sent.
    pub output: DriveOutput,

    /// Mode used when writing the drive motors directly.
    pub motor_mode: MotorMode,

    /// Motor command corresponding to a full stick deflection, in the units
    /// of `motor_mode`.
    pub max_output: f64,
}

/// Gains of one of the motion controller's loops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub anti_windup: f64,

    /// Error below which the motion is considered settled.
    ///
    /// Units: inches for linear gains, degrees for angular gains
    pub small_error_range: f64,
    pub small_error_timeout_ms: u64,
    pub large_error_range: f64,
    pub large_error_timeout_ms: u64,

    /// Maximum acceleration, 0 for unlimited.
    pub slew: f64,
}

/// Deadband and exponential curve applied to a stick axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    /// Stick magnitudes at or below this produce no output.
    pub deadband: f64,

    /// Smallest non-zero output.
    pub min_output: f64,

    /// Strength of the exponential curve, 1.0 is linear.
    pub gain: f64,
}

/// Which stick axes drive the robot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisBindings {
    pub throttle: AxisId,
    pub steer: AxisId,
}

/// A button that toggles a pneumatic actuator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleBinding {
    pub actuator: ActId,
    pub button: ButtonId,
}

/// The button-driven subsystems (intakes, rollers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemParams {
    /// Every motor owned by the subsystems. Each one is written every tick.
    pub motors: Vec<MotorId>,

    /// Mode used for all subsystem motor writes.
    pub mode: MotorMode,

    /// Guarded command sets in priority order, first match wins.
    #[serde(default)]
    pub rules: Vec<GuardRule>,
}

/// A set of motor commands which is active while its guard buttons are held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardRule {
    pub name: String,

    /// Buttons which must all be held for this rule to be selected.
    pub guard: Vec<ButtonId>,

    /// Commands for the rule. Subsystem motors not listed are idled.
    pub commands: Vec<MotorCmd>,
}

/// A single motor command within a guard rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorCmd {
    pub motor: MotorId,

    /// Magnitude of the command in the subsystem's motor mode units.
    pub value: f64,

    #[serde(default)]
    pub dir: Direction,
}

/// Autonomous routines available to this robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonParams {
    /// Button cycling through the routines before the autonomous phase.
    #[serde(default = "default_selector_button")]
    pub selector_button: ButtonId,

    /// Routines in selection order, the first is the default.
    pub routines: Vec<RoutineParams>,
}

/// A named autonomous routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineParams {
    pub name: String,

    /// Path to the routine's script, relative to the `scripts` directory.
    pub script: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Destination of the operator's drive command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveOutput {
    /// Mixed left/right commands written straight to the drive motors.
    Motors,

    /// Shaped throttle/steer forwarded to the motion controller's arcade
    /// drive.
    Chassis,
}

/// Direction of a subsystem motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Fwd,
    Rev,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DrivetrainParams {
    /// Free speed of the wheels.
    ///
    /// Units: inches/second
    pub fn free_speed_ins(&self) -> f64 {
        self.rated_rpm * self.gear_ratio * std::f64::consts::PI * self.wheel_diameter_in / 60.0
    }
}

impl MotorCmd {
    /// The command's value with the direction applied.
    pub fn signed_value(&self) -> f64 {
        match self.dir {
            Direction::Fwd => self.value,
            Direction::Rev => -self.value,
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Fwd
    }
}

fn default_selector_button() -> ButtonId {
    ButtonId::Left
}
