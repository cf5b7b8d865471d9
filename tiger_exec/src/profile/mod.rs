//! # Robot profile
//!
//! Every robot runs the same control logic. What differs between them
//! (geometry, gains, input curves, button bindings, autonomous routines) is
//! captured in a [`RobotProfile`] loaded from `params/profiles/<robot>.toml`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::collections::HashSet;

// Internal
pub use params::*;
use tiger_if::eqpt::ANALOG_MAX;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors found while loading or validating a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Could not load the profile: {0}")]
    LoadError(#[from] util::params::LoadError),

    #[error("The {0} curve is invalid: {1}")]
    InvalidCurve(&'static str, String),

    #[error("The drivetrain parameters are invalid: {0}")]
    InvalidDrivetrain(String),

    #[error("Actuator {0} is bound to more than one toggle button")]
    DuplicateToggle(String),

    #[error("Guard rule {0:?} has no guard buttons")]
    EmptyGuard(String),

    #[error("Guard rule {0:?} commands motor {1}, which is not a subsystem motor")]
    UnknownSubsystemMotor(String, String),

    #[error("Subsystem motor {0} is listed more than once")]
    DuplicateSubsystemMotor(String),

    #[error("Motor {0} is both a drive motor and a subsystem motor")]
    DriveMotorConflict(String),

    #[error("Guard rule {0:?} gives motor {1} a negative value, use `dir = \"rev\"` instead")]
    NegativeCommand(String, String),

    #[error("No autonomous routines are defined")]
    NoRoutines,

    #[error("Autonomous routine {0:?} is defined more than once")]
    DuplicateRoutine(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotProfile {
    /// Load and validate a profile.
    ///
    /// The path is relative to the `params/profiles` directory.
    pub fn load(profile_file: &str) -> Result<Self, ProfileError> {
        let profile: RobotProfile = util::params::load(&format!("profiles/{}", profile_file))?;
        profile.validate()?;

        info!(
            "Loaded profile {:?}: {} toggle(s), {} guard rule(s), {} routine(s)",
            profile.name,
            profile.toggles.len(),
            profile.subsystems.rules.len(),
            profile.autonomous.routines.len()
        );

        Ok(profile)
    }

    /// Check the profile for authoring mistakes.
    pub fn validate(&self) -> Result<(), ProfileError> {
        check_curve("throttle", &self.throttle_curve)?;
        check_curve("steer", &self.steer_curve)?;

        let dt = &self.drivetrain;
        for (name, value) in &[
            ("track width", dt.track_width_in),
            ("wheel diameter", dt.wheel_diameter_in),
            ("gear ratio", dt.gear_ratio),
            ("rated rpm", dt.rated_rpm),
            ("max output", dt.max_output),
        ] {
            if !(*value > 0.0) {
                return Err(ProfileError::InvalidDrivetrain(
                    format!("{} must be positive, found {}", name, value)
                ));
            }
        }
        if dt.left_motor == dt.right_motor {
            return Err(ProfileError::InvalidDrivetrain(
                "left and right motors must differ".into()
            ));
        }

        let mut actuators = HashSet::new();
        for binding in &self.toggles {
            if !actuators.insert(&binding.actuator) {
                return Err(ProfileError::DuplicateToggle(binding.actuator.to_string()));
            }
        }

        let mut motors = HashSet::new();
        for motor in &self.subsystems.motors {
            if !motors.insert(motor) {
                return Err(ProfileError::DuplicateSubsystemMotor(motor.to_string()));
            }
            // The arbiter writes every subsystem motor each cycle
            if *motor == dt.left_motor || *motor == dt.right_motor {
                return Err(ProfileError::DriveMotorConflict(motor.to_string()));
            }
        }
        for rule in &self.subsystems.rules {
            if rule.guard.is_empty() {
                return Err(ProfileError::EmptyGuard(rule.name.clone()));
            }
            if let Some(cmd) = rule.commands.iter().find(|c| !motors.contains(&c.motor)) {
                return Err(ProfileError::UnknownSubsystemMotor(
                    rule.name.clone(),
                    cmd.motor.to_string()
                ));
            }
            if let Some(cmd) = rule.commands.iter().find(|c| !(c.value >= 0.0)) {
                return Err(ProfileError::NegativeCommand(
                    rule.name.clone(),
                    cmd.motor.to_string()
                ));
            }
        }

        if self.autonomous.routines.is_empty() {
            return Err(ProfileError::NoRoutines);
        }
        let mut names = HashSet::new();
        for routine in &self.autonomous.routines {
            if !names.insert(routine.name.as_str()) {
                return Err(ProfileError::DuplicateRoutine(routine.name.clone()));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_curve(name: &'static str, curve: &CurveParams) -> Result<(), ProfileError> {
    let max = ANALOG_MAX as f64;

    if !(0.0..max).contains(&curve.deadband) {
        return Err(ProfileError::InvalidCurve(
            name,
            format!("deadband must be within [0, {}), found {}", max, curve.deadband)
        ));
    }
    if !(0.0..max).contains(&curve.min_output) {
        return Err(ProfileError::InvalidCurve(
            name,
            format!("min output must be within [0, {}), found {}", max, curve.min_output)
        ));
    }
    // Below 1 the curve is no longer monotonic
    if !(curve.gain >= 1.0) {
        return Err(ProfileError::InvalidCurve(
            name,
            format!("gain must be at least 1.0, found {}", curve.gain)
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TEST PROFILE
// ---------------------------------------------------------------------------

/// Profile shared by the unit tests of the crate.
#[cfg(test)]
pub(crate) const TEST_PROFILE: &str = r#"
name = "test_bot"

[drivetrain]
track_width_in = 11.125
wheel_diameter_in = 3.25
gear_ratio = 0.3333
rated_rpm = 600
horizontal_drift = 2
left_motor = "drv_left"
right_motor = "drv_right"
output = "motors"
motor_mode = "voltage"
max_output = 12000

[linear_gains]
kp = 11
kd = 36
small_error_range = 0.5

[angular_gains]
kp = 2
kd = 10
small_error_range = 1.0

[throttle_curve]
deadband = 3
min_output = 10
gain = 1.019

[steer_curve]
deadband = 3
min_output = 10
gain = 1.019

[axes]
throttle = "left_y"
steer = "right_x"

[[toggles]]
actuator = "loader"
button = "L1"

[[toggles]]
actuator = "bazooka"
button = "R1"

[[toggles]]
actuator = "wings"
button = "UP"

[subsystems]
motors = ["top_chain", "intake_front", "intake", "upper_roller"]
mode = "velocity"

[[subsystems.rules]]
name = "intake_to_back"
guard = ["A"]
commands = [
    { motor = "top_chain", value = 200 },
    { motor = "intake_front", value = 200, dir = "rev" },
    { motor = "intake", value = 200, dir = "rev" },
    { motor = "upper_roller", value = 200 },
]

[[subsystems.rules]]
name = "intake_to_bazooka"
guard = ["R2"]
commands = [
    { motor = "top_chain", value = 200 },
    { motor = "intake_front", value = 200, dir = "rev" },
    { motor = "intake", value = 200, dir = "rev" },
    { motor = "upper_roller", value = 200, dir = "rev" },
]

[[subsystems.rules]]
name = "eject"
guard = ["L2"]
commands = [
    { motor = "top_chain", value = 200, dir = "rev" },
    { motor = "intake_front", value = 200 },
    { motor = "intake", value = 200 },
]

[autonomous]
routines = [
    { name = "test", script = "test.auto" },
    { name = "blue", script = "blue.auto" },
    { name = "red", script = "red.auto" },
]
"#;

/// Parse the shared test profile.
#[cfg(test)]
pub(crate) fn test_profile() -> RobotProfile {
    let profile: RobotProfile = util::params::load_str(TEST_PROFILE).unwrap();
    profile.validate().unwrap();
    profile
}

#[cfg(test)]
mod test {
    use super::*;
    use tiger_if::eqpt::{AxisId, ButtonId, MotorId};

    #[test]
    fn test_profile_parses() {
        let p = test_profile();

        assert_eq!(p.name, "test_bot");
        assert_eq!(p.drivetrain.output, DriveOutput::Motors);
        assert_eq!(p.toggles.len(), 3);
        assert_eq!(p.subsystems.rules[0].guard, vec![ButtonId::A]);
        assert_eq!(p.subsystems.rules[0].commands[1].signed_value(), -200.0);
        assert_eq!(p.autonomous.selector_button, ButtonId::Left);
        assert_eq!(p.linear_gains.kp, 11.0);
        assert_eq!(p.linear_gains.ki, 0.0);
        assert_eq!(p.drivetrain.horizontal_drift, 2.0);

        // 600 rpm * 1/3 over a 3.25" wheel is roughly 34 in/s
        let v = p.drivetrain.free_speed_ins();
        assert!(v > 33.0 && v < 35.0);
    }

    #[test]
    fn test_invalid_curve() {
        let mut p = test_profile();
        p.steer_curve.gain = 0.9;
        assert!(matches!(p.validate(), Err(ProfileError::InvalidCurve("steer", _))));

        let mut p = test_profile();
        p.throttle_curve.deadband = 127.0;
        assert!(matches!(p.validate(), Err(ProfileError::InvalidCurve("throttle", _))));
    }

    #[test]
    fn test_duplicate_toggle() {
        let mut p = test_profile();
        let dup = p.toggles[0].clone();
        p.toggles.push(ToggleBinding { button: ButtonId::B, ..dup });
        assert!(matches!(p.validate(), Err(ProfileError::DuplicateToggle(_))));
    }

    #[test]
    fn test_rule_checks() {
        let mut p = test_profile();
        p.subsystems.rules[1].guard.clear();
        assert!(matches!(p.validate(), Err(ProfileError::EmptyGuard(_))));

        let mut p = test_profile();
        p.subsystems.rules[2].commands.push(MotorCmd {
            motor: MotorId::from("drv_left"),
            value: 100.0,
            dir: Direction::Fwd,
        });
        assert!(matches!(p.validate(), Err(ProfileError::UnknownSubsystemMotor(_, _))));

        let mut p = test_profile();
        p.subsystems.rules[0].commands[0].value = -200.0;
        assert!(matches!(
            p.validate(),
            Err(ProfileError::NegativeCommand(name, motor))
                if name == "intake_to_back" && motor == "top_chain"
        ));
    }

    #[test]
    fn test_drive_motor_conflict() {
        let mut p = test_profile();
        p.subsystems.motors.push(MotorId::from("drv_right"));
        assert!(matches!(
            p.validate(),
            Err(ProfileError::DriveMotorConflict(motor)) if motor == "drv_right"
        ));

        // Toggles drive actuators, which never conflict with the drive motors
        let mut p = test_profile();
        p.toggles[0].actuator = "drv_left".into();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_routine_checks() {
        let mut p = test_profile();
        p.autonomous.routines.clear();
        assert!(matches!(p.validate(), Err(ProfileError::NoRoutines)));

        let mut p = test_profile();
        let dup = p.autonomous.routines[0].clone();
        p.autonomous.routines.push(dup);
        assert!(matches!(p.validate(), Err(ProfileError::DuplicateRoutine(_))));
    }

    #[test]
    fn test_shipped_files() {
        use crate::{auto_seq::AutoScript, params::TigerExecParams, sim::InputScript};
        use std::{fs, path::Path};

        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");

        let exec_params: TigerExecParams =
            util::params::load_path(root.join("params/tiger_exec.toml")).unwrap();
        exec_params.validate().unwrap();

        let mut names = vec![];
        for entry in fs::read_dir(root.join("params/profiles")).unwrap() {
            let path = entry.unwrap().path();
            if path.extension().map_or(true, |e| e != "toml") {
                continue;
            }

            let p: RobotProfile = util::params::load_path(&path).unwrap();
            p.validate().unwrap();

            // Every robot is driven with the same stick layout
            assert_eq!(p.axes.throttle, AxisId::LeftY, "{}", p.name);
            assert_eq!(p.axes.steer, AxisId::RightX, "{}", p.name);

            for routine in &p.autonomous.routines {
                let script = AutoScript::load_path(
                    &routine.name,
                    root.join("scripts").join(&routine.script)
                ).unwrap();

                // Every routine must fit in the autonomous phase
                if let Some(max) = script.max_duration_ms() {
                    assert!(max <= exec_params.auto_duration_ms(), "{} is too long", routine.name);
                }
            }

            names.push(p.name);
        }

        names.sort();
        assert_eq!(names, vec!["tiger1", "tiger2", "tiger3", "tiger4", "tiger_shark"]);
        assert!(names.contains(&exec_params.profile.trim_end_matches(".toml").to_string()));

        let inputs = InputScript::load(root.join("scripts/inputs/driver_demo.inputs")).unwrap();
        assert_eq!(inputs.duration_ms(), 8000);
    }

    #[test]
    fn test_invalid_drivetrain() {
        let mut p = test_profile();
        p.drivetrain.max_output = 0.0;
        assert!(matches!(p.validate(), Err(ProfileError::InvalidDrivetrain(_))));
    }
}
