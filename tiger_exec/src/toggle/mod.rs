//! # Toggle debouncing
//!
//! Pneumatic actuators are toggled by a button: one press flips the actuator
//! once, however long the button is held. Each actuator has its own
//! [`ToggleState`]; no state is shared between actuators.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod bank;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

pub use bank::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Detects the released-to-pressed transition of a sampled button.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeDetector {
    was_pressed: bool,
}

/// Toggle memory of one actuator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleState {
    /// Value last written to the actuator.
    pub output: bool,

    edge: EdgeDetector,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EdgeDetector {
    /// Feed this tick's sample, returning `true` on a rising edge.
    pub fn rising(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        rising
    }

    /// Was the button held on the previous sample.
    pub fn was_pressed(&self) -> bool {
        self.was_pressed
    }
}

impl ToggleState {
    /// Feed this tick's sample of the bound button.
    ///
    /// Returns the new output if it flipped, which is the value that must be
    /// written to the actuator.
    pub fn update(&mut self, pressed: bool) -> Option<bool> {
        if self.edge.rising(pressed) {
            self.output = !self.output;
            Some(self.output)
        }
        else {
            None
        }
    }

    /// Was the bound button held on the previous sample.
    pub fn was_pressed(&self) -> bool {
        self.edge.was_pressed()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_edge_detector() {
        let mut e = EdgeDetector::default();
        assert!(!e.rising(false));
        assert!(e.rising(true));
        assert!(!e.rising(true));
        assert!(!e.rising(false));
        assert!(e.rising(true));
    }

    #[test]
    fn test_one_toggle_per_press() {
        // Runs of pressed samples of different lengths, separated by releases
        let samples = [
            false, true, false, true, true, true, true, true, false, false, true, true, false,
            true,
        ];

        let mut state = ToggleState::default();
        let mut events = vec![];

        for s in samples.iter() {
            if let Some(v) = state.update(*s) {
                events.push(v);
            }
        }

        // Four maximal runs of pressed samples, so four toggles
        assert_eq!(events, vec![true, false, true, false]);
        assert_eq!(state.output, false);
        assert!(state.was_pressed());
    }

    #[test]
    fn test_held_from_start() {
        let mut state = ToggleState::default();
        assert_eq!(state.update(true), Some(true));
        for _ in 0..100 {
            assert_eq!(state.update(true), None);
        }
        assert_eq!(state.update(false), None);
        assert_eq!(state.update(true), Some(false));
    }
}
