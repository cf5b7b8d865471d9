//! # Autonomous selector
//!
//! Before the autonomous phase the operator picks the routine to run by
//! pressing the selector button, which steps through the profile's routines
//! and wraps back to the first after the last.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, trace};

use crate::{
    input::InputSnapshot,
    profile::AutonParams,
    tlm_reporter::STATUS_LINE,
    toggle::EdgeDetector,
};
use tiger_if::{
    eqpt::ButtonId,
    tlm::{SinkError, TelemetrySink},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const TITLE: &str = "Autonomous selector";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Cycles through the routines on each press of the selector button.
#[derive(Debug, Clone)]
pub struct AutonSelector {
    names: Vec<String>,
    button: ButtonId,
    index: usize,
    edge: EdgeDetector,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutonSelector {
    /// The first routine is selected to begin with.
    pub fn new(params: &AutonParams) -> Self {
        Self {
            names: params.routines.iter().map(|r| r.name.clone()).collect(),
            button: params.selector_button,
            index: 0,
            edge: EdgeDetector::default(),
        }
    }

    /// Feed this tick's inputs, returning `true` if the selection changed.
    pub fn update(&mut self, input: &InputSnapshot) -> bool {
        if !self.edge.rising(input.is_pressed(self.button)) || self.names.is_empty() {
            return false;
        }

        self.index = (self.index + 1) % self.names.len();
        trace!("Selected routine {:?}", self.selected_name());

        true
    }

    /// Index of the selected routine.
    pub fn selected(&self) -> usize {
        self.index
    }

    pub fn selected_name(&self) -> &str {
        self.names.get(self.index).map(String::as_str).unwrap_or("")
    }

    /// Show the selection on the display, below the status line.
    pub fn show(&self, sink: &mut dyn TelemetrySink) -> Result<(), SinkError> {
        sink.display(STATUS_LINE + 1, TITLE)?;
        sink.display(STATUS_LINE + 2, &format!("[{}]", self.selected_name().to_uppercase()))?;
        sink.display(STATUS_LINE + 3, &format!("Press {:?} to cycle", self.button))
    }

    /// Log the final selection, returning its index.
    pub fn finish(&self) -> usize {
        info!("Autonomous routine {:?} selected", self.selected_name());
        self.index
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{profile::test_profile, tlm_reporter::MemSink};

    fn press(sel: &mut AutonSelector, pressed: bool) -> bool {
        let buttons: &[ButtonId] = if pressed { &[ButtonId::Left] } else { &[] };
        sel.update(&InputSnapshot::with_pressed(0, 0, buttons))
    }

    #[test]
    fn test_wraps() {
        let mut sel = AutonSelector::new(&test_profile().autonomous);
        assert_eq!(sel.selected_name(), "test");

        let mut names = vec![];
        for _ in 0..4 {
            assert!(press(&mut sel, true));
            assert!(!press(&mut sel, true));
            assert!(!press(&mut sel, false));
            names.push(sel.selected_name().to_string());
        }

        assert_eq!(names, vec!["blue", "red", "test", "blue"]);
        assert_eq!(sel.finish(), 1);
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut sel = AutonSelector::new(&test_profile().autonomous);
        let snap = InputSnapshot::with_pressed(0, 0, &[ButtonId::Right, ButtonId::A]);

        assert!(!sel.update(&snap));
        assert_eq!(sel.selected(), 0);
    }

    #[test]
    fn test_show() {
        let mut sel = AutonSelector::new(&test_profile().autonomous);
        press(&mut sel, true);

        let handle = MemSink::new();
        sel.show(&mut handle.clone()).unwrap();

        assert_eq!(handle.contents().lines, vec![
            "",
            "Autonomous selector",
            "[BLUE]",
            "Press Left to cycle",
        ]);
    }
}
