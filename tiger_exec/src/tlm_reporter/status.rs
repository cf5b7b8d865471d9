//! Phase status and motor diagnostics on the robot's display

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use tiger_if::{
    eqpt::{HardwareIo, MotorId},
    tlm::{SinkError, TelemetrySink},
};

use super::NUM_DISPLAY_LINES;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Line holding the name of the current phase.
pub const STATUS_LINE: u8 = 0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Shows the temperature and current of a set of motors, two lines per
/// motor below the status line.
#[derive(Debug, Clone)]
pub struct DiagnosticsDisplay {
    motors: Vec<MotorId>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DiagnosticsDisplay {
    /// Motors which don't fit on the display are left out.
    pub fn new(mut motors: Vec<MotorId>) -> Self {
        motors.truncate(((NUM_DISPLAY_LINES - STATUS_LINE - 1) / 2) as usize);
        Self { motors }
    }

    pub fn motors(&self) -> &[MotorId] {
        &self.motors
    }

    /// Write the diagnostics of every motor which reports them.
    pub fn show(&self, hw: &dyn HardwareIo, sink: &mut dyn TelemetrySink) -> Result<(), SinkError> {
        let mut line = STATUS_LINE + 1;

        for motor in self.motors.iter() {
            if let Some(d) = hw.motor_diagnostics(motor) {
                sink.display(line, &format!("{} Temp: {:.1}C", motor, d.temperature_c))?;
                sink.display(line + 1, &format!("{} Current: {:.2}A", motor, d.current_a))?;
                line += 2;
            }
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Show the name of the current phase.
pub fn show_status(sink: &mut dyn TelemetrySink, text: &str) -> Result<(), SinkError> {
    sink.display(STATUS_LINE, text)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{sim::SimHardware, tlm_reporter::MemSink};
    use std::sync::Arc;
    use tiger_if::eqpt::{MotorDiagnostics, MotorMode};
    use util::time::SimClock;

    #[test]
    fn test_show() {
        let mut hw = SimHardware::new(Arc::new(SimClock::new()));
        hw.set_motor_diagnostics(&MotorId::from("drv_left"), MotorDiagnostics {
            temperature_c: 41.3,
            current_a: 1.5,
        });
        hw.set_motor_output(&MotorId::from("drv_right"), 0.0, MotorMode::Voltage);

        let display = DiagnosticsDisplay::new(vec![
            MotorId::from("drv_left"),
            MotorId::from("intake"),
            MotorId::from("drv_right"),
        ]);

        let handle = MemSink::new();
        let mut sink = handle.clone();
        show_status(&mut sink, "Driver Control").unwrap();
        display.show(&hw, &mut sink).unwrap();

        // The intake was never written so reports nothing and takes no lines
        assert_eq!(handle.contents().lines, vec![
            "Driver Control",
            "drv_left Temp: 41.3C",
            "drv_left Current: 1.50A",
            "drv_right Temp: 25.0C",
            "drv_right Current: 0.00A",
        ]);
    }

    #[test]
    fn test_motors_fit_display() {
        let motors = (0..6).map(|i| MotorId(format!("m{}", i))).collect();
        let display = DiagnosticsDisplay::new(motors);

        assert_eq!(display.motors().len(), 3);

        // Every motor reporting still stays within the display
        let mut hw = SimHardware::new(Arc::new(SimClock::new()));
        for m in display.motors() {
            hw.set_motor_output(m, 100.0, MotorMode::Velocity);
        }
        let mut sink = MemSink::new();
        display.show(&hw, &mut sink).unwrap();
        assert_eq!(sink.contents().lines.len(), NUM_DISPLAY_LINES as usize - 1);
    }
}
