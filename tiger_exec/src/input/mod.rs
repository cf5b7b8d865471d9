//! # Input sampling
//!
//! Once per tick the operator's controller is read into an [`InputSnapshot`],
//! which every other module of the control loop works from. Nothing reads
//! the hardware inputs directly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::collections::BTreeMap;

use tiger_if::eqpt::{AxisId, ButtonId, HardwareIo, ANALOG_MAX};

use crate::profile::AxisBindings;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The operator's inputs on one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputSnapshot {
    /// Forward/backward axis, `-ANALOG_MAX..=ANALOG_MAX`.
    pub throttle: i32,

    /// Turning axis, `-ANALOG_MAX..=ANALOG_MAX`.
    pub steer: i32,

    /// Pressed state of every button.
    pub buttons: BTreeMap<ButtonId, bool>,
}

/// Reads the controller into snapshots.
#[derive(Debug, Clone, Copy)]
pub struct InputSampler {
    throttle_axis: AxisId,
    steer_axis: AxisId,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputSampler {
    pub fn new(axes: &AxisBindings) -> Self {
        Self {
            throttle_axis: axes.throttle,
            steer_axis: axes.steer,
        }
    }

    /// Take a snapshot of the controller.
    ///
    /// Analog readings outside the declared range are clamped.
    pub fn sample(&self, hw: &dyn HardwareIo) -> InputSnapshot {
        InputSnapshot {
            throttle: clamp_analog(hw.read_analog(self.throttle_axis)),
            steer: clamp_analog(hw.read_analog(self.steer_axis)),
            buttons: ButtonId::ALL
                .iter()
                .map(|&b| (b, hw.read_digital(b)))
                .collect(),
        }
    }
}

impl InputSnapshot {
    /// Build a snapshot with the given buttons held and all others released.
    pub fn with_pressed(throttle: i32, steer: i32, pressed: &[ButtonId]) -> Self {
        Self {
            throttle,
            steer,
            buttons: ButtonId::ALL
                .iter()
                .map(|b| (*b, pressed.contains(b)))
                .collect(),
        }
    }

    /// Is the button held on this tick.
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    /// Are all of the buttons held on this tick.
    pub fn all_pressed(&self, buttons: &[ButtonId]) -> bool {
        buttons.iter().all(|b| self.is_pressed(*b))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn clamp_analog(value: i32) -> i32 {
    value.max(-ANALOG_MAX).min(ANALOG_MAX)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimHardware;
    use std::sync::Arc;
    use util::time::SimClock;

    fn sampler() -> InputSampler {
        InputSampler::new(&AxisBindings {
            throttle: AxisId::LeftY,
            steer: AxisId::RightX,
        })
    }

    #[test]
    fn test_sample() {
        let mut hw = SimHardware::new(Arc::new(SimClock::new()));
        hw.set_analog(AxisId::LeftY, 100);
        hw.set_analog(AxisId::RightX, -20);
        hw.set_analog(AxisId::LeftX, 55);
        hw.set_button(ButtonId::R1, true);

        let snap = sampler().sample(&hw);

        assert_eq!(snap.throttle, 100);
        assert_eq!(snap.steer, -20);
        assert!(snap.is_pressed(ButtonId::R1));
        assert!(!snap.is_pressed(ButtonId::L1));
        assert_eq!(snap.buttons.len(), ButtonId::ALL.len());
    }

    #[test]
    fn test_out_of_range_clamped() {
        let mut hw = SimHardware::new(Arc::new(SimClock::new()));
        hw.set_analog(AxisId::LeftY, 300);
        hw.set_analog(AxisId::RightX, -128);

        let snap = sampler().sample(&hw);

        assert_eq!(snap.throttle, ANALOG_MAX);
        assert_eq!(snap.steer, -ANALOG_MAX);
    }

    #[test]
    fn test_all_pressed() {
        let snap = InputSnapshot::with_pressed(0, 0, &[ButtonId::A, ButtonId::B]);
        assert!(snap.all_pressed(&[ButtonId::A]));
        assert!(snap.all_pressed(&[ButtonId::A, ButtonId::B]));
        assert!(!snap.all_pressed(&[ButtonId::A, ButtonId::X]));
    }
}
