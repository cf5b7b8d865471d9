//! Simulated hardware I/O

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::Serialize;
use std::{collections::{BTreeMap, HashMap}, sync::Arc};

use tiger_if::eqpt::{ActId, AxisId, ButtonId, HardwareIo, MotorDiagnostics, MotorId, MotorMode};
use util::time::Clock;

use super::InputScript;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Temperature reported by a motor with no set diagnostics.
pub const AMBIENT_TEMP_C: f64 = 25.0;

/// Current drawn by a motor at full output.
pub const FULL_OUTPUT_CURRENT_A: f64 = 2.5;

/// Full output of a motor in each mode.
const FULL_VELOCITY_RPM: f64 = 600.0;
const FULL_VOLTAGE_MV: f64 = 12000.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated controller, motors and actuators.
pub struct SimHardware {
    clock: Arc<dyn Clock>,

    /// Inputs set directly, used when there is no input script.
    analog: HashMap<AxisId, i32>,
    buttons: HashMap<ButtonId, bool>,

    inputs: Option<InputScript>,

    /// Clock time the input script is replayed from.
    inputs_start_ms: u64,

    record: bool,
    writes: Vec<HwWrite>,
    num_writes: usize,

    motors: BTreeMap<MotorId, (f64, MotorMode)>,
    actuators: BTreeMap<ActId, bool>,

    /// Diagnostics set directly, overriding the modelled ones.
    diagnostics: BTreeMap<MotorId, MotorDiagnostics>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A write made to the simulated hardware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HwWrite {
    Motor {
        time_ms: u64,
        motor: MotorId,
        value: f64,
        mode: MotorMode,
    },
    Actuator {
        time_ms: u64,
        actuator: ActId,
        value: bool,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimHardware {
    /// New hardware with centred sticks, released buttons, and recording
    /// enabled.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            analog: HashMap::new(),
            buttons: HashMap::new(),
            inputs: None,
            inputs_start_ms: 0,
            record: true,
            writes: vec![],
            num_writes: 0,
            motors: BTreeMap::new(),
            actuators: BTreeMap::new(),
            diagnostics: BTreeMap::new(),
        }
    }

    pub fn set_analog(&mut self, axis: AxisId, value: i32) {
        self.analog.insert(axis, value);
    }

    pub fn set_button(&mut self, button: ButtonId, pressed: bool) {
        self.buttons.insert(button, pressed);
    }

    /// Replay an input script, starting now.
    ///
    /// While the script is loaded it replaces any inputs set directly.
    pub fn set_input_script(&mut self, script: InputScript) {
        self.inputs_start_ms = self.clock.now_ms();
        self.inputs = Some(script);
    }

    /// Restart the input script, if there is one, from now.
    pub fn restart_input_script(&mut self) {
        self.inputs_start_ms = self.clock.now_ms();
    }

    /// Enable or disable keeping a log of every write.
    ///
    /// Latest outputs and the write count are kept either way.
    pub fn set_recording(&mut self, record: bool) {
        self.record = record;
    }

    /// Every recorded write, oldest first.
    pub fn writes(&self) -> &[HwWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Total number of writes made, recorded or not.
    pub fn num_writes(&self) -> usize {
        self.num_writes
    }

    /// Last value written to a motor.
    pub fn motor_output(&self, motor: &MotorId) -> Option<f64> {
        self.motors.get(motor).map(|(v, _)| *v)
    }

    /// Last value and mode written to every motor.
    pub fn motor_outputs(&self) -> &BTreeMap<MotorId, (f64, MotorMode)> {
        &self.motors
    }

    /// Report fixed diagnostics for a motor instead of modelled ones.
    pub fn set_motor_diagnostics(&mut self, motor: &MotorId, diagnostics: MotorDiagnostics) {
        self.diagnostics.insert(motor.clone(), diagnostics);
    }

    /// Last value written to an actuator.
    pub fn actuator_output(&self, actuator: &ActId) -> Option<bool> {
        self.actuators.get(actuator).copied()
    }

    fn script_frame(&self) -> Option<&super::InputFrame> {
        let elapsed = self.clock.now_ms().saturating_sub(self.inputs_start_ms);
        self.inputs.as_ref().and_then(|s| s.frame_at(elapsed))
    }

    fn push(&mut self, write: HwWrite) {
        self.num_writes += 1;
        if self.record {
            self.writes.push(write);
        }
    }
}

impl HardwareIo for SimHardware {
    fn read_analog(&self, axis: AxisId) -> i32 {
        match (&self.inputs, self.script_frame()) {
            (Some(_), Some(frame)) => frame.axis(axis),
            // Centred until the script's first frame
            (Some(_), None) => 0,
            (None, _) => self.analog.get(&axis).copied().unwrap_or(0),
        }
    }

    fn read_digital(&self, button: ButtonId) -> bool {
        match (&self.inputs, self.script_frame()) {
            (Some(_), Some(frame)) => frame.button(button),
            (Some(_), None) => false,
            (None, _) => self.buttons.get(&button).copied().unwrap_or(false),
        }
    }

    fn set_motor_output(&mut self, motor: &MotorId, value: f64, mode: MotorMode) {
        let time_ms = self.clock.now_ms();
        trace!("[{} ms] motor {} <- {:.1} ({:?})", time_ms, motor, value, mode);

        self.motors.insert(motor.clone(), (value, mode));
        self.push(HwWrite::Motor {
            time_ms,
            motor: motor.clone(),
            value,
            mode,
        });
    }

    fn set_digital_actuator(&mut self, actuator: &ActId, value: bool) {
        let time_ms = self.clock.now_ms();
        trace!("[{} ms] actuator {} <- {}", time_ms, actuator, value);

        self.actuators.insert(actuator.clone(), value);
        self.push(HwWrite::Actuator {
            time_ms,
            actuator: actuator.clone(),
            value,
        });
    }

    /// Set diagnostics, otherwise the motor sits at ambient temperature and
    /// draws current in proportion to its last output. A motor never written
    /// reports nothing.
    fn motor_diagnostics(&self, motor: &MotorId) -> Option<MotorDiagnostics> {
        if let Some(d) = self.diagnostics.get(motor) {
            return Some(*d);
        }

        self.motors.get(motor).map(|(value, mode)| {
            let full = match mode {
                MotorMode::Velocity => FULL_VELOCITY_RPM,
                MotorMode::Voltage => FULL_VOLTAGE_MV,
            };

            MotorDiagnostics {
                temperature_c: AMBIENT_TEMP_C,
                current_a: FULL_OUTPUT_CURRENT_A * (value.abs() / full).min(1.0),
            }
        })
    }
}
