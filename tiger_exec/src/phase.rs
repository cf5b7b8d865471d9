//! # Match phases
//!
//! A match is a pre-autonomous selection window, the autonomous phase, then
//! the driver phase. Only one phase drives the robot at a time. Each phase
//! lasts until its [`PhaseSignal`] goes inactive, either at its deadline or
//! when it is ended early.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};

// Internal
use crate::{
    auto_select::AutonSelector,
    auto_seq::{AutoScript, SeqContext, SeqReport, Sequencer},
    input::InputSampler,
    opcontrol::{LoopStats, OpControl, OpControlError},
    tlm_reporter::show_status,
};
use tiger_if::{eqpt::HardwareIo, motion::MotionController, tlm::TelemetrySink};
use util::time::Clock;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Phase name shown on the display during the selection window.
pub const SELECTION_STATUS: &str = "Pre-Autonomous";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Says whether a phase is still running.
#[derive(Debug)]
pub struct PhaseSignal {
    active: AtomicBool,

    /// Clock time at which the phase ends by itself.
    deadline_ms: Option<u64>,
}

/// The collaborators every phase works with.
pub struct Robot<'a> {
    pub hw: &'a mut dyn HardwareIo,
    pub motion: &'a dyn MotionController,
    pub clock: &'a dyn Clock,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PhaseSignal {
    /// A phase which runs until ended.
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            deadline_ms: None,
        }
    }

    /// A phase which ends `duration_ms` from now.
    pub fn timed(clock: &dyn Clock, duration_ms: u64) -> Self {
        Self {
            active: AtomicBool::new(true),
            deadline_ms: Some(clock.now_ms() + duration_ms),
        }
    }

    pub fn is_active(&self, clock: &dyn Clock) -> bool {
        self.active.load(Ordering::SeqCst)
            && self.deadline_ms.map_or(true, |d| clock.now_ms() < d)
    }

    /// End the phase before its deadline.
    pub fn end(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }
}

impl Default for PhaseSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Let the operator pick the autonomous routine.
///
/// Returns the index of the selected routine.
pub fn run_selection(
    robot: &mut Robot,
    selector: &mut AutonSelector,
    sampler: &InputSampler,
    display: &mut dyn TelemetrySink,
    period_ms: u64,
    window_ms: u64,
) -> usize {
    info!("Routine selection open for {} ms", window_ms);

    let phase = PhaseSignal::timed(robot.clock, window_ms);

    if let Err(e) = show_status(display, SELECTION_STATUS) {
        warn!("Could not show the phase status: {}", e);
    }
    if let Err(e) = selector.show(display) {
        warn!("Could not show the selection: {}", e);
    }

    while phase.is_active(robot.clock) {
        let input = sampler.sample(&*robot.hw);

        if selector.update(&input) {
            if let Err(e) = selector.show(display) {
                warn!("Could not show the selection: {}", e);
            }
        }

        robot.clock.sleep_ms(period_ms);
    }

    selector.finish()
}

/// Run an autonomous routine for `duration_ms`.
///
/// The phase is only checked between steps. A step in progress at the
/// deadline runs to completion, so a routine which overruns delays the next
/// phase by `SeqReport::overrun_ms`.
pub fn run_auto(
    robot: &mut Robot,
    sequencer: &Sequencer,
    script: &AutoScript,
    duration_ms: u64,
) -> SeqReport {
    info!("Autonomous phase: {} ms", duration_ms);

    let phase = PhaseSignal::timed(robot.clock, duration_ms);

    let mut ctx = SeqContext {
        hw: &mut *robot.hw,
        motion: robot.motion,
        clock: robot.clock,
        phase: &phase,
    };

    let report = sequencer.run(script, &mut ctx);

    // Outputs are held for the rest of the phase
    if report.overrun_ms > 0 {
        warn!("Autonomous phase overran, the next phase starts {} ms late", report.overrun_ms);
    }
    else if let Some(deadline) = phase.deadline_ms() {
        robot.clock.sleep_ms(deadline.saturating_sub(robot.clock.now_ms()));
    }

    report
}

/// Run the operator control loop for `duration_ms`.
pub fn run_driver(
    robot: &mut Robot,
    opcontrol: &mut OpControl,
    display: &mut dyn TelemetrySink,
    period_ms: u64,
    duration_ms: u64,
) -> Result<LoopStats, OpControlError> {
    info!("Driver phase: {} ms", duration_ms);

    let phase = PhaseSignal::timed(robot.clock, duration_ms);

    opcontrol.enter();
    opcontrol.run(robot, display, period_ms, &phase)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        profile::test_profile,
        sim::{InputScript, SimHardware, SimMotion},
        tlm_reporter::MemSink,
    };
    use std::sync::Arc;
    use tiger_if::eqpt::{ActId, MotorId};
    use util::time::SimClock;

    #[test]
    fn test_phase_signal() {
        let clock = SimClock::new();

        let phase = PhaseSignal::timed(&clock, 100);
        assert!(phase.is_active(&clock));
        clock.advance_ms(99);
        assert!(phase.is_active(&clock));
        clock.advance_ms(1);
        assert!(!phase.is_active(&clock));

        let phase = PhaseSignal::new();
        clock.advance_ms(1_000_000);
        assert!(phase.is_active(&clock));
        phase.end();
        assert!(!phase.is_active(&clock));
    }

    #[test]
    fn test_auto_holds_until_deadline() {
        let profile = test_profile();
        let clock = Arc::new(SimClock::new());
        let motion = SimMotion::new(&profile, clock.clone());
        let mut hw = SimHardware::new(clock.clone());
        let sequencer = Sequencer::new(&profile.drivetrain);
        let script = AutoScript::parse(
            "short",
            "DRIVE: {\"left\": 3000, \"right\": 3000, \"duration_ms\": 400};"
        ).unwrap();

        let mut robot = Robot {
            hw: &mut hw,
            motion: &motion,
            clock: clock.as_ref(),
        };
        let report = run_auto(&mut robot, &sequencer, &script, 1000);

        assert_eq!(report.elapsed_ms, 400);
        assert_eq!(report.overrun_ms, 0);
        assert_eq!(clock.now_ms(), 1000);
        assert_eq!(hw.motor_output(&MotorId::from("drv_left")), Some(3000.0));
    }

    #[test]
    fn test_match() {
        let profile = test_profile();
        let clock = Arc::new(SimClock::new());
        let motion = SimMotion::new(&profile, clock.clone());
        let mut hw = SimHardware::new(clock.clone());
        hw.set_recording(false);

        // Select the second routine, then drive forwards with the bazooka
        // toggled during the driver phase
        hw.set_input_script(InputScript::parse(
            r#"
            0.00: {};
            0.50: {"buttons": ["LEFT"]};
            0.60: {};
            25.50: {"left_y": 127};
            26.00: {"left_y": 127, "buttons": ["R1"]};
            26.50: {"left_y": 127};
            "#
        ).unwrap());

        let sampler = InputSampler::new(&profile.axes);
        let mut selector = AutonSelector::new(&profile.autonomous);
        let mut display = MemSink::new();
        let mut opcontrol = OpControl::new(&profile).unwrap();
        let script = AutoScript::parse(
            "blue",
            "ACTUATOR: {\"actuator\": \"wings\", \"value\": true};\n\
             DRIVE: {\"left\": 6000, \"right\": 6000, \"duration_ms\": 20000};\n\
             WAIT: {\"duration_ms\": 10};"
        ).unwrap();
        let sequencer = Sequencer::new(&profile.drivetrain);

        let mut robot = Robot {
            hw: &mut hw,
            motion: &motion,
            clock: clock.as_ref(),
        };

        let selected = run_selection(&mut robot, &mut selector, &sampler, &mut display, 10, 5000);
        assert_eq!(selected, 1);
        assert_eq!(display.contents().lines[0], SELECTION_STATUS);
        assert_eq!(display.contents().lines[2], "[BLUE]");
        assert_eq!(robot.clock.now_ms(), 5000);

        // The drive step outlasts the phase, so the wait is never run
        let report = run_auto(&mut robot, &sequencer, &script, 15_000);
        assert_eq!(report.steps_run, 2);
        assert_eq!(report.overrun_ms, 5000);
        assert_eq!(robot.clock.now_ms(), 25_000);

        let stats = run_driver(&mut robot, &mut opcontrol, &mut display, 10, 2000).unwrap();
        assert_eq!(stats.cycles, 200);
        assert_eq!(stats.overruns, 0);
        assert_eq!(stats.display_failures, 0);
        assert_eq!(display.contents().lines[0], crate::opcontrol::STATUS_TEXT);
        assert_eq!(display.contents().lines[1], "drv_left Temp: 25.0C");
        drop(robot);

        assert_eq!(hw.actuator_output(&ActId::from("wings")), Some(true));
        assert_eq!(hw.actuator_output(&ActId::from("bazooka")), Some(true));
        assert!(hw.motor_output(&MotorId::from("drv_left")).unwrap() > 11_000.0);
        assert_eq!(hw.motor_output(&MotorId::from("intake")), Some(0.0));
    }
}
