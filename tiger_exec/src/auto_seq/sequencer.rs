//! Executes autonomous scripts

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::{AutoScript, AutoStep};
use crate::{phase::PhaseSignal, profile::DrivetrainParams};
use tiger_if::{
    eqpt::{HardwareIo, MotorId, MotorMode},
    motion::{MotionController, MotionOutcome, Pose},
};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs autonomous scripts against the robot.
#[derive(Debug, Clone)]
pub struct Sequencer {
    left_motor: MotorId,
    right_motor: MotorId,
}

/// Everything the sequencer drives during a run.
///
/// The hardware is borrowed mutably for the whole run, so nothing else can
/// write to the motors or actuators while a script is executing.
pub struct SeqContext<'a> {
    pub hw: &'a mut dyn HardwareIo,
    pub motion: &'a dyn MotionController,
    pub clock: &'a dyn Clock,

    /// The autonomous phase, checked before each step.
    pub phase: &'a PhaseSignal,
}

/// Summary of a script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeqReport {
    /// Number of steps started.
    pub steps_run: usize,

    /// Number of closed-loop steps which timed out.
    pub timeouts: usize,

    pub end: SeqEnd,

    /// Units: milliseconds
    pub elapsed_ms: u64,

    /// How long past the phase's deadline the routine finished, zero if it
    /// finished in time.
    ///
    /// Units: milliseconds
    pub overrun_ms: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a script run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeqEnd {
    /// Every step was run.
    Completed,

    /// The phase ended before the script did.
    Terminated,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Sequencer {
    pub fn new(drivetrain: &DrivetrainParams) -> Self {
        Self {
            left_motor: drivetrain.left_motor.clone(),
            right_motor: drivetrain.right_motor.clone(),
        }
    }

    /// Run the script from start to finish, or until the phase ends.
    ///
    /// Outputs are left as last commanded when the run returns.
    pub fn run(&self, script: &AutoScript, ctx: &mut SeqContext) -> SeqReport {
        let start_ms = ctx.clock.now_ms();
        let mut steps_run = 0;
        let mut timeouts = 0;
        let mut end = SeqEnd::Completed;

        info!("Starting routine {:?} ({} steps)", script.name, script.steps.len());

        for (index, step) in script.steps.iter().enumerate() {
            if !ctx.phase.is_active(ctx.clock) {
                info!("Phase ended before step {} of routine {:?}", index, script.name);
                end = SeqEnd::Terminated;
                break;
            }

            debug!(
                "Step {} ({}) at {} ms",
                index,
                step.kind(),
                ctx.clock.now_ms() - start_ms
            );
            steps_run += 1;

            if self.exec_step(step, ctx) == Some(MotionOutcome::TimedOut) {
                warn!("Step {} ({}) timed out", index, step.kind());
                timeouts += 1;
            }
        }

        // A step is never cut short, so one which outlasts the phase delays
        // whatever comes after it
        let end_ms = ctx.clock.now_ms();
        let overrun_ms = ctx.phase.deadline_ms().map_or(0, |d| end_ms.saturating_sub(d));
        if overrun_ms > 0 {
            warn!("Routine {:?} overran its phase by {} ms", script.name, overrun_ms);
        }

        let report = SeqReport {
            steps_run,
            timeouts,
            end,
            elapsed_ms: end_ms - start_ms,
            overrun_ms,
        };

        info!(
            "Routine {:?} finished: {:?} after {} step(s) in {} ms, {} timeout(s)",
            script.name, report.end, report.steps_run, report.elapsed_ms, report.timeouts
        );

        report
    }

    /// Execute one step, returning the outcome of closed-loop steps.
    fn exec_step(&self, step: &AutoStep, ctx: &mut SeqContext) -> Option<MotionOutcome> {
        match step {
            AutoStep::TimedDrive { left, right, duration_ms } => {
                ctx.hw.set_motor_output(&self.left_motor, *left, MotorMode::Voltage);
                ctx.hw.set_motor_output(&self.right_motor, *right, MotorMode::Voltage);
                ctx.clock.sleep_ms(*duration_ms);
                None
            }
            AutoStep::Wait { duration_ms } => {
                ctx.clock.sleep_ms(*duration_ms);
                None
            }
            AutoStep::ActuatorSet { actuator, value } => {
                ctx.hw.set_digital_actuator(actuator, *value);
                None
            }
            AutoStep::MotorSet { motor, value } => {
                ctx.hw.set_motor_output(motor, *value, MotorMode::Voltage);
                None
            }
            AutoStep::ClosedLoopMove { target, timeout_ms, options } => {
                Some(ctx.motion.move_to_point(target.x, target.y, *timeout_ms, options))
            }
            AutoStep::ClosedLoopTurn { heading_deg, timeout_ms } => {
                Some(ctx.motion.turn_to_heading(*heading_deg, *timeout_ms))
            }
            AutoStep::SetPose { x, y, heading_deg } => {
                ctx.motion.set_pose(Pose::new(*x, *y, *heading_deg));
                None
            }
            AutoStep::Calibrate => {
                ctx.motion.calibrate();
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        profile::test_profile,
        sim::{HwWrite, SimHardware, SimMotion},
    };
    use std::sync::Arc;
    use tiger_if::eqpt::ActId;
    use util::time::SimClock;

    struct Rig {
        clock: Arc<SimClock>,
        hw: SimHardware,
        motion: SimMotion,
        phase: PhaseSignal,
        seq: Sequencer,
    }

    fn rig() -> Rig {
        let profile = test_profile();
        let clock = Arc::new(SimClock::new());

        Rig {
            hw: SimHardware::new(clock.clone()),
            motion: SimMotion::new(&profile, clock.clone()),
            clock,
            phase: PhaseSignal::new(),
            seq: Sequencer::new(&profile.drivetrain),
        }
    }

    impl Rig {
        fn run(&mut self, script: &str) -> SeqReport {
            let script = AutoScript::parse("test", script).unwrap();
            let mut ctx = SeqContext {
                hw: &mut self.hw,
                motion: &self.motion,
                clock: self.clock.as_ref(),
                phase: &self.phase,
            };
            self.seq.run(&script, &mut ctx)
        }
    }

    #[test]
    fn test_timed_sequence() {
        let mut rig = rig();

        let report = rig.run(
            r#"
            DRIVE: {"left": 6000, "right": -6000, "duration_ms": 1000};
            WAIT: {"duration_ms": 500};
            ACTUATOR: {"actuator": "piston_a", "value": true};
            "#,
        );

        assert_eq!(report, SeqReport {
            steps_run: 3,
            timeouts: 0,
            end: SeqEnd::Completed,
            elapsed_ms: 1500,
            overrun_ms: 0,
        });

        let writes = rig.hw.writes();
        assert_eq!(writes.len(), 3);

        // Both drive writes at t = 0, nothing else until the actuator
        assert_eq!(writes[0], HwWrite::Motor {
            time_ms: 0,
            motor: MotorId::from("drv_left"),
            value: 6000.0,
            mode: MotorMode::Voltage,
        });
        assert_eq!(writes[1], HwWrite::Motor {
            time_ms: 0,
            motor: MotorId::from("drv_right"),
            value: -6000.0,
            mode: MotorMode::Voltage,
        });
        assert_eq!(writes[2], HwWrite::Actuator {
            time_ms: 1500,
            actuator: ActId::from("piston_a"),
            value: true,
        });

        // Outputs held after the end of the script
        assert_eq!(rig.hw.motor_output(&MotorId::from("drv_left")), Some(6000.0));
    }

    #[test]
    fn test_timed_drive_duration() {
        let mut rig = rig();

        for d in [0u64, 1, 250, 1612].iter() {
            let before = rig.clock.now_ms();
            let report = rig.run(&format!(
                "DRIVE: {{\"left\": 1, \"right\": 1, \"duration_ms\": {}}};",
                d
            ));
            assert_eq!(report.elapsed_ms, *d);
            assert_eq!(rig.clock.now_ms() - before, *d);
        }
    }

    #[test]
    fn test_timeout_continues() {
        let mut rig = rig();

        // Far too far to drive in 100 ms
        let report = rig.run(
            r#"
            POSE: {"x": 0, "y": 0, "heading_deg": 0};
            MOVE: {"target": {"x": 0, "y": 100}, "timeout_ms": 100};
            MOTOR: {"motor": "intake", "value": -12000};
            "#,
        );

        assert_eq!(report.steps_run, 3);
        assert_eq!(report.timeouts, 1);
        assert_eq!(report.end, SeqEnd::Completed);
        assert_eq!(report.elapsed_ms, 100);
        assert_eq!(rig.hw.motor_output(&MotorId::from("intake")), Some(-12000.0));
    }

    #[test]
    fn test_closed_loop_reached() {
        let mut rig = rig();

        let report = rig.run(
            r#"
            POSE: {"x": 0, "y": 0, "heading_deg": 0};
            MOVE: {"target": {"x": 0, "y": 10}, "timeout_ms": 4000};
            TURN: {"heading_deg": 90, "timeout_ms": 4000};
            "#,
        );

        assert_eq!(report.timeouts, 0);
        assert!(report.elapsed_ms < 8000);

        let pose = rig.motion.get_pose();
        assert!((pose.y - 10.0).abs() < 0.5);
        assert!((pose.heading_deg - 90.0).abs() < 1.0);
    }

    #[test]
    fn test_terminated() {
        let mut rig = rig();
        rig.phase.end();

        let report = rig.run("CALIBRATE;\nWAIT: {\"duration_ms\": 100};");

        assert_eq!(report.steps_run, 0);
        assert_eq!(report.end, SeqEnd::Terminated);
        assert_eq!(report.elapsed_ms, 0);
        assert!(rig.hw.writes().is_empty());
    }

    #[test]
    fn test_phase_overrun() {
        let mut rig = rig();
        rig.phase = PhaseSignal::timed(rig.clock.as_ref(), 1000);

        // The drive runs to completion, the actuator is skipped
        let report = rig.run(
            r#"
            WAIT: {"duration_ms": 600};
            DRIVE: {"left": 6000, "right": 6000, "duration_ms": 700};
            ACTUATOR: {"actuator": "piston_a", "value": true};
            "#,
        );

        assert_eq!(report.steps_run, 2);
        assert_eq!(report.end, SeqEnd::Terminated);
        assert_eq!(report.elapsed_ms, 1300);
        assert_eq!(report.overrun_ms, 300);
        assert_eq!(rig.hw.actuator_output(&ActId::from("piston_a")), None);

        // Finishing right at the deadline is not an overrun
        let mut on_time = self::rig();
        on_time.phase = PhaseSignal::timed(on_time.clock.as_ref(), 1000);
        let report = on_time.run("WAIT: {\"duration_ms\": 1000};");
        assert_eq!(report.end, SeqEnd::Completed);
        assert_eq!(report.overrun_ms, 0);
    }
}
