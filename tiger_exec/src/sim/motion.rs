//! Kinematic motion controller
//!
//! Moves and turns happen at the drivetrain's free speed in small steps, so a
//! concurrent reader of the pose sees it progress. Arcade commands are
//! integrated as a differential drive whenever the pose is read or changed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use nalgebra::Vector2;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tiger_if::motion::{MotionController, MotionOutcome, MoveOptions, Pose};
use util::{maths::get_ang_dist_deg, time::Clock};

use crate::{
    drive_ctrl::{arcade_mix, DRIVE_CMD_MAX},
    profile::RobotProfile,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Integration and motion step.
///
/// Units: milliseconds
pub const SIM_STEP_MS: u64 = 10;

/// Arrival tolerance used when the profile's gains do not give one.
///
/// Units: inches
const DEFAULT_LIN_TOL_IN: f64 = 0.5;

/// Arrival tolerance used when the profile's gains do not give one.
///
/// Units: degrees
const DEFAULT_ANG_TOL_DEG: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimMotion {
    clock: Arc<dyn Clock>,
    state: Mutex<MotionState>,

    /// Units: inches/second
    free_speed_ins: f64,

    /// Units: inches
    track_width_in: f64,

    /// Units: inches
    lin_tol_in: f64,

    /// Units: degrees
    ang_tol_deg: f64,
}

struct MotionState {
    /// Units: inches
    position: Vector2<f64>,

    /// Clockwise from +Y, not wrapped.
    ///
    /// Units: degrees
    heading_deg: f64,

    /// Current arcade command, stick units.
    throttle: f64,
    steer: f64,

    /// Time the state was last integrated to.
    last_ms: u64,

    calibrated: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMotion {
    pub fn new(profile: &RobotProfile, clock: Arc<dyn Clock>) -> Self {
        let tol = |range: f64, default: f64| if range > 0.0 { range } else { default };

        let state = MotionState {
            position: Vector2::zeros(),
            heading_deg: 0.0,
            throttle: 0.0,
            steer: 0.0,
            last_ms: clock.now_ms(),
            calibrated: false,
        };

        Self {
            free_speed_ins: profile.drivetrain.free_speed_ins(),
            track_width_in: profile.drivetrain.track_width_in,
            lin_tol_in: tol(profile.linear_gains.small_error_range, DEFAULT_LIN_TOL_IN),
            ang_tol_deg: tol(profile.angular_gains.small_error_range, DEFAULT_ANG_TOL_DEG),
            state: Mutex::new(state),
            clock,
        }
    }

    /// Has `calibrate` been called.
    pub fn is_calibrated(&self) -> bool {
        self.lock().calibrated
    }

    /// Turn rate on the spot at full speed.
    ///
    /// Units: degrees/second
    fn turn_rate_dps(&self) -> f64 {
        (2.0 * self.free_speed_ins / self.track_width_in).to_degrees()
    }

    /// Lock the state and bring it up to the current time.
    fn lock(&self) -> MutexGuard<MotionState> {
        // The state is plain data, still usable after a panic elsewhere
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now_ms = self.clock.now_ms();
        self.integrate(&mut state, now_ms);
        state
    }

    /// Integrate the arcade command up to `now_ms`.
    fn integrate(&self, state: &mut MotionState, now_ms: u64) {
        let mix = arcade_mix(state.throttle, state.steer);
        let left = mix.left / DRIVE_CMD_MAX * self.free_speed_ins;
        let right = mix.right / DRIVE_CMD_MAX * self.free_speed_ins;

        let speed = (left + right) / 2.0;
        let rate_dps = ((left - right) / self.track_width_in).to_degrees();

        let mut t_ms = state.last_ms;
        while t_ms < now_ms {
            let dt_s = (now_ms - t_ms).min(SIM_STEP_MS) as f64 / 1000.0;

            state.position += forward(state.heading_deg) * speed * dt_s;
            state.heading_deg += rate_dps * dt_s;

            t_ms += SIM_STEP_MS;
        }

        state.last_ms = state.last_ms.max(now_ms);
    }

    /// Stop any arcade command and return the pose.
    fn stop(&self) -> Pose {
        let mut state = self.lock();
        state.throttle = 0.0;
        state.steer = 0.0;
        to_pose(&state)
    }
}

impl MotionController for SimMotion {
    fn calibrate(&self) {
        let mut state = self.lock();
        state.position = Vector2::zeros();
        state.heading_deg = 0.0;
        state.calibrated = true;

        debug!("SimMotion calibrated");
    }

    fn set_pose(&self, pose: Pose) {
        let mut state = self.lock();
        state.position = Vector2::new(pose.x, pose.y);
        state.heading_deg = pose.heading_deg;
    }

    fn get_pose(&self) -> Pose {
        to_pose(&self.lock())
    }

    fn move_to_point(
        &self,
        x: f64,
        y: f64,
        timeout_ms: u64,
        options: &MoveOptions
    ) -> MotionOutcome {
        self.stop();

        let target = Vector2::new(x, y);
        let tol = self.lin_tol_in.max(options.early_exit_range);
        let speed = self.free_speed_ins * options.max_speed.max(0.0).min(DRIVE_CMD_MAX) / DRIVE_CMD_MAX;
        let start_ms = self.clock.now_ms();

        loop {
            let remaining = target - self.lock().position;
            if remaining.norm() <= tol {
                trace!("Move to ({:.1}, {:.1}) reached", x, y);
                return MotionOutcome::Reached;
            }

            let elapsed_ms = self.clock.now_ms() - start_ms;
            if elapsed_ms >= timeout_ms {
                return MotionOutcome::TimedOut;
            }

            let step_ms = SIM_STEP_MS.min(timeout_ms - elapsed_ms);
            self.clock.sleep_ms(step_ms);

            let mut state = self.lock();
            let remaining = target - state.position;
            let dist = remaining.norm();
            let step = (speed * step_ms as f64 / 1000.0).min(dist);

            if dist > 0.0 {
                state.position += remaining / dist * step;

                let travel_deg = remaining.x.atan2(remaining.y).to_degrees();
                let facing_deg = if options.forwards { travel_deg } else { travel_deg + 180.0 };
                let turn_deg = get_ang_dist_deg(state.heading_deg, facing_deg);
                state.heading_deg += turn_deg;
            }
        }
    }

    fn turn_to_heading(&self, heading_deg: f64, timeout_ms: u64) -> MotionOutcome {
        self.stop();

        let rate_dps = self.turn_rate_dps();
        let start_ms = self.clock.now_ms();

        loop {
            let error_deg = get_ang_dist_deg(self.lock().heading_deg, heading_deg);
            if error_deg.abs() <= self.ang_tol_deg {
                trace!("Turn to {:.1} deg reached", heading_deg);
                return MotionOutcome::Reached;
            }

            let elapsed_ms = self.clock.now_ms() - start_ms;
            if elapsed_ms >= timeout_ms {
                return MotionOutcome::TimedOut;
            }

            let step_ms = SIM_STEP_MS.min(timeout_ms - elapsed_ms);
            self.clock.sleep_ms(step_ms);

            let mut state = self.lock();
            let error_deg = get_ang_dist_deg(state.heading_deg, heading_deg);
            let step = (rate_dps * step_ms as f64 / 1000.0).min(error_deg.abs());
            state.heading_deg += step * error_deg.signum();
        }
    }

    fn drive_arcade(&self, throttle: f64, steer: f64) {
        let mut state = self.lock();
        state.throttle = throttle;
        state.steer = steer;
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Unit vector along a heading.
fn forward(heading_deg: f64) -> Vector2<f64> {
    let h = heading_deg.to_radians();
    Vector2::new(h.sin(), h.cos())
}

fn to_pose(state: &MotionState) -> Pose {
    Pose::new(state.position.x, state.position.y, state.heading_deg)
}
