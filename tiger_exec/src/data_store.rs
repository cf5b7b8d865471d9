//! # Data Store

use crate::{
    arbiter::{self, Selection, SubsystemArbiter},
    drive_ctrl::{self, DriveCtrl},
    input::InputSnapshot,
    toggle::{self, ToggleBank, ToggleEvent},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Data store for the operator control loop.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Clock time at the start of this cycle
    pub cycle_start_ms: u64,

    // Inputs
    pub input: InputSnapshot,

    // DriveCtrl
    pub drive_ctrl: DriveCtrl,
    pub drive_ctrl_input: drive_ctrl::InputData,
    pub drive_ctrl_output: drive_ctrl::OutputData,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Toggles
    pub toggles: ToggleBank,
    pub toggle_events: Vec<ToggleEvent>,
    pub toggle_status_rpt: toggle::StatusReport,

    // Subsystems
    pub arbiter: SubsystemArbiter,
    pub arbiter_output: Option<Selection>,
    pub arbiter_status_rpt: arbiter::StatusReport,

    // Monitoring Counters
    /// Total number of cycle overruns
    pub num_cycle_overruns: u64,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the outputs of the previous cycle so that nothing from it can
    /// be written again by mistake.
    pub fn cycle_start(&mut self, now_ms: u64) {
        self.cycle_start_ms = now_ms;

        self.input = InputSnapshot::default();

        self.drive_ctrl_input = drive_ctrl::InputData::default();
        self.drive_ctrl_output = drive_ctrl::OutputData::default();
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();

        self.toggle_events.clear();
        self.toggle_status_rpt = toggle::StatusReport::default();

        self.arbiter_output = None;
        self.arbiter_status_rpt = arbiter::StatusReport::default();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self, overran: bool) {
        if overran {
            self.num_cycle_overruns += 1;
            self.num_consec_cycle_overruns += 1;
        }
        else {
            self.num_consec_cycle_overruns = 0;
        }

        self.num_cycles += 1;
    }
}
