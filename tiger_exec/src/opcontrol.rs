//! # Operator control
//!
//! The control loop of the driver phase. Each cycle:
//!
//! - Sample the controller into an `InputSnapshot`
//! - Drive control: shape and mix the sticks, write the drivetrain
//! - Toggle bank: debounce the toggle buttons, write flipped actuators
//! - Subsystem arbiter: select one guard rule, write every subsystem motor
//! - Sleep for the rest of the cycle period
//!
//! Every `DIAGNOSTICS_PERIOD_CYCLES` cycles the drive motors' diagnostics are
//! refreshed on the display.
//!
//! All modules work from the same snapshot, so every decision in a cycle is
//! made on the same inputs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use crate::{
    arbiter::ArbiterError,
    data_store::DataStore,
    drive_ctrl::{self, DriveCtrlError, DriveCtrlParams},
    input::InputSampler,
    phase::{PhaseSignal, Robot},
    profile::{DriveOutput, RobotProfile},
    tlm_reporter::{show_status, DiagnosticsDisplay},
    toggle::ToggleError,
};
use tiger_if::{
    eqpt::{MotorId, MotorMode},
    tlm::{SinkError, TelemetrySink},
};
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of cycles between refreshes of the diagnostics display.
pub const DIAGNOSTICS_PERIOD_CYCLES: u64 = 10;

/// Phase name shown on the display while the loop runs.
pub const STATUS_TEXT: &str = "Driver Control";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The operator control loop.
pub struct OpControl {
    sampler: InputSampler,
    drive: DriveTarget,
    diagnostics: DiagnosticsDisplay,

    pub ds: DataStore,
}

/// Where the drive command is written.
#[derive(Debug, Clone)]
struct DriveTarget {
    output: DriveOutput,
    left_motor: MotorId,
    right_motor: MotorId,
    mode: MotorMode,
}

/// Statistics of a run of the control loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    pub cycles: u64,
    pub overruns: u64,

    /// Number of display refreshes which could not be written.
    pub display_failures: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OpControlError {
    #[error("DriveCtrl error: {0}")]
    DriveCtrlError(#[from] DriveCtrlError),

    #[error("Toggle bank error: {0}")]
    ToggleError(#[from] ToggleError),

    #[error("Subsystem arbiter error: {0}")]
    ArbiterError(#[from] ArbiterError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OpControl {
    /// Initialise every module of the loop from the profile.
    pub fn new(profile: &RobotProfile) -> Result<Self, OpControlError> {
        let mut ds = DataStore::default();

        ds.drive_ctrl.init(DriveCtrlParams::from_profile(profile))?;
        debug!("DriveCtrl init complete");

        ds.toggles.init(profile.toggles.clone())?;
        debug!("Toggle bank init complete");

        ds.arbiter.init(profile.subsystems.clone())?;
        debug!("Subsystem arbiter init complete");

        Ok(Self {
            sampler: InputSampler::new(&profile.axes),
            drive: DriveTarget {
                output: profile.drivetrain.output,
                left_motor: profile.drivetrain.left_motor.clone(),
                right_motor: profile.drivetrain.right_motor.clone(),
                mode: profile.drivetrain.motor_mode,
            },
            diagnostics: DiagnosticsDisplay::new(vec![
                profile.drivetrain.left_motor.clone(),
                profile.drivetrain.right_motor.clone(),
            ]),
            ds,
        })
    }

    /// Prepare for a new phase of operator control.
    pub fn enter(&mut self) {
        self.ds.toggles.reset();
        self.ds.num_consec_cycle_overruns = 0;
    }

    /// Run cycles every `period_ms` while the phase is active.
    ///
    /// The display only reports on the loop, a failure to write to it is
    /// counted and otherwise ignored.
    pub fn run(
        &mut self,
        robot: &mut Robot,
        display: &mut dyn TelemetrySink,
        period_ms: u64,
        phase: &PhaseSignal,
    ) -> Result<LoopStats, OpControlError> {
        let start_cycles = self.ds.num_cycles;
        let start_overruns = self.ds.num_cycle_overruns;
        let mut display_failures = 0;

        info!("Begining control loop, period {} ms", period_ms);

        if let Err(e) = show_status(display, STATUS_TEXT) {
            warn!("Could not show the phase status: {}", e);
            display_failures += 1;
        }

        while phase.is_active(robot.clock) {
            let cycle_start_ms = robot.clock.now_ms();

            self.tick(robot)?;

            if (self.ds.num_cycles - start_cycles) % DIAGNOSTICS_PERIOD_CYCLES == 0 {
                if let Err(e) = self.show_diagnostics(robot, display) {
                    if display_failures == 0 {
                        warn!("Could not show the motor diagnostics: {}", e);
                    }
                    display_failures += 1;
                }
            }

            // ---- CYCLE MANAGEMENT ----

            let cycle_dur_ms = robot.clock.now_ms() - cycle_start_ms;

            match period_ms.checked_sub(cycle_dur_ms) {
                Some(d) => {
                    self.ds.cycle_end(false);
                    robot.clock.sleep_ms(d);
                }
                None => {
                    warn!("Cycle overran by {} ms", cycle_dur_ms - period_ms);
                    self.ds.cycle_end(true);
                }
            }
        }

        let stats = LoopStats {
            cycles: self.ds.num_cycles - start_cycles,
            overruns: self.ds.num_cycle_overruns - start_overruns,
            display_failures,
        };

        info!(
            "Control loop ended after {} cycle(s), {} overrun(s)",
            stats.cycles, stats.overruns
        );
        if stats.display_failures > 0 {
            warn!("{} display refresh(es) failed", stats.display_failures);
        }

        Ok(stats)
    }

    /// Refresh the drive motors' diagnostics on the display.
    pub fn show_diagnostics(
        &self,
        robot: &Robot,
        display: &mut dyn TelemetrySink,
    ) -> Result<(), SinkError> {
        self.diagnostics.show(&*robot.hw, display)
    }

    /// Execute a single cycle.
    pub fn tick(&mut self, robot: &mut Robot) -> Result<(), OpControlError> {
        let ds = &mut self.ds;

        ds.cycle_start(robot.clock.now_ms());

        // ---- DATA INPUT ----

        ds.input = self.sampler.sample(&*robot.hw);

        // ---- DRIVE ----

        ds.drive_ctrl_input = drive_ctrl::InputData {
            throttle: ds.input.throttle,
            steer: ds.input.steer,
        };

        let (output, rpt) = ds.drive_ctrl.proc(&ds.drive_ctrl_input)?;
        ds.drive_ctrl_output = output;
        ds.drive_ctrl_status_rpt = rpt;

        match self.drive.output {
            DriveOutput::Motors => {
                robot.hw.set_motor_output(&self.drive.left_motor, output.left_dem, self.drive.mode);
                robot.hw.set_motor_output(&self.drive.right_motor, output.right_dem, self.drive.mode);
            }
            DriveOutput::Chassis => robot.motion.drive_arcade(output.throttle, output.steer),
        }

        // ---- TOGGLES ----

        let (events, rpt) = match ds.toggles.proc(&ds.input) {
            Ok(r) => r,
            Err(e) => match e {},
        };

        for event in events.iter() {
            robot.hw.set_digital_actuator(&event.actuator, event.value);
        }

        ds.toggle_events = events;
        ds.toggle_status_rpt = rpt;

        // ---- SUBSYSTEMS ----

        let (selection, rpt) = ds.arbiter.proc(&ds.input)?;

        for (motor, dem) in selection.dems.iter() {
            robot.hw.set_motor_output(motor, *dem, selection.mode);
        }

        ds.arbiter_output = Some(selection);
        ds.arbiter_status_rpt = rpt;

        trace!(
            "Cycle {}: L {:.0} R {:.0}, {} toggle(s), subsystems {}",
            ds.num_cycles,
            ds.drive_ctrl_output.left_dem,
            ds.drive_ctrl_output.right_dem,
            ds.toggle_events.len(),
            ds.arbiter_output.as_ref().map_or("idle", |s| s.name.as_str())
        );

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        profile::test_profile,
        sim::{HwWrite, SimHardware, SimMotion},
        tlm_reporter::MemSink,
    };
    use std::sync::Arc;
    use tiger_if::{
        eqpt::{ActId, AxisId, ButtonId, HardwareIo},
        motion::MotionController,
    };
    use util::time::{Clock, SimClock};

    struct Rig {
        clock: Arc<SimClock>,
        hw: SimHardware,
        motion: SimMotion,
        opcontrol: OpControl,
    }

    fn rig(profile: RobotProfile) -> Rig {
        let clock = Arc::new(SimClock::new());
        Rig {
            hw: SimHardware::new(clock.clone()),
            motion: SimMotion::new(&profile, clock.clone()),
            opcontrol: OpControl::new(&profile).unwrap(),
            clock,
        }
    }

    impl Rig {
        fn tick(&mut self) {
            let mut robot = Robot {
                hw: &mut self.hw,
                motion: &self.motion,
                clock: self.clock.as_ref(),
            };
            self.opcontrol.tick(&mut robot).unwrap();
            self.clock.advance_ms(10);
        }

        fn press(&mut self, buttons: &[ButtonId]) {
            for b in ButtonId::ALL.iter() {
                self.hw.set_button(*b, buttons.contains(b));
            }
        }

        fn motor(&self, name: &str) -> Option<f64> {
            self.hw.motor_output(&MotorId::from(name))
        }
    }

    #[test]
    fn test_centred_inputs() {
        let mut rig = rig(test_profile());
        rig.tick();

        assert_eq!(rig.motor("drv_left"), Some(0.0));
        assert_eq!(rig.motor("drv_right"), Some(0.0));
        for m in ["top_chain", "intake_front", "intake", "upper_roller"].iter() {
            assert_eq!(rig.motor(m), Some(0.0));
        }
        assert!(rig.hw.writes().iter().all(|w| matches!(w, HwWrite::Motor { .. })));
    }

    #[test]
    fn test_every_subsystem_motor_written() {
        let mut rig = rig(test_profile());

        rig.press(&[ButtonId::L2]);
        rig.tick();

        // Two drive writes plus one per subsystem motor
        assert_eq!(rig.hw.writes().len(), 6);
        assert_eq!(rig.motor("top_chain"), Some(-200.0));
        assert_eq!(rig.motor("upper_roller"), Some(0.0));

        // Released, everything idles on the next cycle
        rig.press(&[]);
        rig.tick();
        assert_eq!(rig.motor("top_chain"), Some(0.0));
        assert_eq!(rig.motor("intake"), Some(0.0));
        assert_eq!(rig.opcontrol.ds.arbiter_output.as_ref().unwrap().rule, None);
    }

    #[test]
    fn test_priority() {
        let mut rig = rig(test_profile());

        rig.press(&[ButtonId::A, ButtonId::R2]);
        rig.tick();

        assert_eq!(rig.motor("upper_roller"), Some(200.0));
        assert_eq!(rig.opcontrol.ds.arbiter_output.as_ref().unwrap().name, "intake_to_back");
    }

    #[test]
    fn test_toggles() {
        let mut rig = rig(test_profile());
        let loader = ActId::from("loader");

        rig.press(&[ButtonId::L1]);
        for _ in 0..5 {
            rig.tick();
        }
        assert_eq!(rig.hw.actuator_output(&loader), Some(true));

        let num_actuator_writes = rig
            .hw
            .writes()
            .iter()
            .filter(|w| matches!(w, HwWrite::Actuator { .. }))
            .count();
        assert_eq!(num_actuator_writes, 1);

        rig.press(&[]);
        rig.tick();
        rig.press(&[ButtonId::L1]);
        rig.tick();
        assert_eq!(rig.hw.actuator_output(&loader), Some(false));

        // Entering a new phase resets without writing
        rig.opcontrol.enter();
        rig.tick();
        assert_eq!(rig.hw.actuator_output(&loader), Some(true));
    }

    #[test]
    fn test_drive() {
        let mut rig = rig(test_profile());

        rig.hw.set_analog(AxisId::LeftY, 127);
        rig.hw.set_analog(AxisId::RightX, 127);
        rig.tick();

        assert!((rig.motor("drv_left").unwrap() - 12000.0).abs() < 1e-6);
        assert!(rig.motor("drv_right").unwrap().abs() < 1e-6);
        assert!(rig.opcontrol.ds.drive_ctrl_status_rpt.left_limited);
    }

    #[test]
    fn test_chassis_output() {
        let mut profile = test_profile();
        profile.drivetrain.output = DriveOutput::Chassis;
        let mut rig = rig(profile);

        rig.hw.set_analog(AxisId::LeftY, 127);
        rig.tick();
        rig.tick();

        // Nothing written to the drive motors, the motion controller drives
        assert_eq!(rig.motor("drv_left"), None);
        assert!(rig.motion.get_pose().y > 0.0);
    }

    /// Hardware whose reads take 8 ms of clock time.
    struct SlowHw {
        hw: SimHardware,
        clock: Arc<SimClock>,
    }

    impl HardwareIo for SlowHw {
        fn read_analog(&self, axis: AxisId) -> i32 {
            self.clock.advance_ms(8);
            self.hw.read_analog(axis)
        }

        fn read_digital(&self, button: ButtonId) -> bool {
            self.hw.read_digital(button)
        }

        fn set_motor_output(&mut self, motor: &MotorId, value: f64, mode: MotorMode) {
            self.hw.set_motor_output(motor, value, mode)
        }

        fn set_digital_actuator(&mut self, actuator: &ActId, value: bool) {
            self.hw.set_digital_actuator(actuator, value)
        }
    }

    #[test]
    fn test_run_period() {
        let mut rig = rig(test_profile());
        let phase = PhaseSignal::timed(rig.clock.as_ref(), 1000);

        let mut robot = Robot {
            hw: &mut rig.hw,
            motion: &rig.motion,
            clock: rig.clock.as_ref(),
        };
        let stats = rig.opcontrol.run(&mut robot, &mut MemSink::new(), 10, &phase).unwrap();

        assert_eq!(stats, LoopStats { cycles: 100, overruns: 0, display_failures: 0 });
        assert_eq!(rig.clock.now_ms(), 1000);
    }

    #[test]
    fn test_diagnostics_display() {
        let mut rig = rig(test_profile());
        rig.hw.set_analog(AxisId::LeftY, 127);

        let phase = PhaseSignal::timed(rig.clock.as_ref(), 50);
        let display = MemSink::new();
        let mut robot = Robot {
            hw: &mut rig.hw,
            motion: &rig.motion,
            clock: rig.clock.as_ref(),
        };
        rig.opcontrol.run(&mut robot, &mut display.clone(), 10, &phase).unwrap();

        // Full forward is full voltage on both sides
        assert_eq!(display.contents().lines, vec![
            STATUS_TEXT,
            "drv_left Temp: 25.0C",
            "drv_left Current: 2.50A",
            "drv_right Temp: 25.0C",
            "drv_right Current: 2.50A",
        ]);

        // A failing display leaves the loop running
        display.set_failing(true);
        let phase = PhaseSignal::timed(rig.clock.as_ref(), 100);
        let mut robot = Robot {
            hw: &mut rig.hw,
            motion: &rig.motion,
            clock: rig.clock.as_ref(),
        };
        let stats = rig.opcontrol.run(&mut robot, &mut display.clone(), 10, &phase).unwrap();

        assert_eq!(stats.cycles, 10);
        // The status line and the refresh on the first cycle
        assert_eq!(stats.display_failures, 2);
    }

    #[test]
    fn test_overruns() {
        let profile = test_profile();
        let clock = Arc::new(SimClock::new());
        let motion = SimMotion::new(&profile, clock.clone());
        let mut hw = SlowHw {
            hw: SimHardware::new(clock.clone()),
            clock: clock.clone(),
        };
        let mut opcontrol = OpControl::new(&profile).unwrap();

        // Each cycle takes 16 ms against a 10 ms period
        let phase = PhaseSignal::timed(clock.as_ref(), 100);
        let mut robot = Robot {
            hw: &mut hw,
            motion: &motion,
            clock: clock.as_ref(),
        };
        let stats = opcontrol.run(&mut robot, &mut MemSink::new(), 10, &phase).unwrap();

        assert_eq!(stats, LoopStats { cycles: 7, overruns: 7, display_failures: 0 });
        assert_eq!(opcontrol.ds.num_consec_cycle_overruns, 7);
        assert_eq!(clock.now_ms(), 112);
    }
}
