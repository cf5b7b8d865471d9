//! # Hardware I/O
//!
//! Identifiers for everything the decision layer reads or writes, and the
//! [`HardwareIo`] trait implemented by the hardware abstraction layer.
//!
//! Faults in sensors and motors are the hardware layer's responsibility, so
//! none of the trait's methods can fail from the caller's point of view.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest magnitude of an analog axis reading.
pub const ANALOG_MAX: i32 = 127;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Access to the controller inputs, motors and digital actuators.
pub trait HardwareIo {
    /// Read an analog axis. The value is nominally within
    /// `-ANALOG_MAX..=ANALOG_MAX` but is not guaranteed to be.
    fn read_analog(&self, axis: AxisId) -> i32;

    /// Read a digital button, `true` while it is held.
    fn read_digital(&self, button: ButtonId) -> bool;

    /// Command a motor (or motor group).
    ///
    /// Units of `value` depend on the mode: rpm for `Velocity`, millivolts
    /// for `Voltage`.
    fn set_motor_output(&mut self, motor: &MotorId, value: f64, mode: MotorMode);

    /// Set a digital (pneumatic) actuator.
    fn set_digital_actuator(&mut self, actuator: &ActId, value: bool);

    /// Read the temperature and current draw of a motor (or motor group).
    ///
    /// `None` if the hardware does not report them for this motor.
    fn motor_diagnostics(&self, _motor: &MotorId) -> Option<MotorDiagnostics> {
        None
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifier of a motor or motor group, as named in the robot profile.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct MotorId(pub String);

/// Identifier of a digital actuator (piston), as named in the robot profile.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct ActId(pub String);

/// Health readings of a motor. For a group, the hottest motor's temperature
/// and the group's total current.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MotorDiagnostics {
    /// Units: degrees Celsius
    pub temperature_c: f64,

    /// Units: amps
    pub current_a: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Analog axes of the operator's controller.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    LeftX,
    LeftY,
    RightX,
    RightY
}

/// Digital buttons of the operator's controller.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
#[serde(rename_all = "UPPERCASE")]
pub enum ButtonId {
    L1,
    L2,
    R1,
    R2,
    Up,
    Down,
    Left,
    Right,
    X,
    B,
    Y,
    A
}

/// How a motor interprets its commanded value.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum MotorMode {
    /// Closed-loop velocity, rpm.
    Velocity,

    /// Open-loop voltage, millivolts.
    Voltage
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ButtonId {
    /// Every button, in the order they are sampled.
    pub const ALL: [ButtonId; 12] = [
        ButtonId::L1,
        ButtonId::L2,
        ButtonId::R1,
        ButtonId::R2,
        ButtonId::Up,
        ButtonId::Down,
        ButtonId::Left,
        ButtonId::Right,
        ButtonId::X,
        ButtonId::B,
        ButtonId::Y,
        ButtonId::A,
    ];
}

impl From<&str> for MotorId {
    fn from(s: &str) -> Self {
        MotorId(s.to_string())
    }
}

impl From<&str> for ActId {
    fn from(s: &str) -> Self {
        ActId(s.to_string())
    }
}

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_id_names() {
        let b: ButtonId = serde_json::from_str("\"R1\"").unwrap();
        assert_eq!(b, ButtonId::R1);
        let b: ButtonId = serde_json::from_str("\"DOWN\"").unwrap();
        assert_eq!(b, ButtonId::Down);

        let a: AxisId = serde_json::from_str("\"right_x\"").unwrap();
        assert_eq!(a, AxisId::RightX);

        let m: MotorMode = serde_json::from_str("\"voltage\"").unwrap();
        assert_eq!(m, MotorMode::Voltage);

        let act: ActId = serde_json::from_str("\"bazooka\"").unwrap();
        assert_eq!(act, ActId::from("bazooka"));
        assert_eq!(format!("{}", act), "bazooka");
    }

    #[test]
    fn test_all_buttons_distinct() {
        let mut all = ButtonId::ALL.to_vec();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), ButtonId::ALL.len());
    }

    /// Hardware with no diagnostics support.
    struct NoDiag;

    impl HardwareIo for NoDiag {
        fn read_analog(&self, _axis: AxisId) -> i32 {
            0
        }

        fn read_digital(&self, _button: ButtonId) -> bool {
            false
        }

        fn set_motor_output(&mut self, _motor: &MotorId, _value: f64, _mode: MotorMode) {}

        fn set_digital_actuator(&mut self, _actuator: &ActId, _value: bool) {}
    }

    #[test]
    fn test_diagnostics_unsupported() {
        assert_eq!(NoDiag.motor_diagnostics(&MotorId::from("drv_left")), None);
    }
}
