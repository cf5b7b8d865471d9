//! The bank of toggled actuators

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;

// Internal
use super::ToggleState;
use crate::{input::InputSnapshot, profile::ToggleBinding};
use tiger_if::eqpt::{ActId, ButtonId};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// All toggled actuators of the robot, keyed by actuator.
#[derive(Debug, Default)]
pub struct ToggleBank {
    channels: BTreeMap<ActId, Channel>,
}

/// A toggled actuator and the button bound to it.
#[derive(Debug, Clone, Copy)]
struct Channel {
    button: ButtonId,
    state: ToggleState,
}

/// An actuator write requested by the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleEvent {
    pub actuator: ActId,
    pub value: bool,
}

/// Status report of the bank for one tick.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StatusReport {
    /// Output of every actuator after this tick.
    pub outputs: BTreeMap<ActId, bool>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ToggleError {
    #[error("Actuator {0} is bound more than once")]
    DuplicateActuator(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ToggleBank {
    type InitData = Vec<ToggleBinding>;
    type InitError = ToggleError;

    type InputData = InputSnapshot;
    type OutputData = Vec<ToggleEvent>;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.channels.clear();

        for binding in init_data {
            let channel = Channel {
                button: binding.button,
                state: ToggleState::default(),
            };

            if self.channels.insert(binding.actuator.clone(), channel).is_some() {
                return Err(ToggleError::DuplicateActuator(binding.actuator.to_string()));
            }
        }

        Ok(())
    }

    /// Debounce every actuator's button.
    ///
    /// Events are returned in actuator order, at most one per actuator.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut events = vec![];

        for (actuator, channel) in self.channels.iter_mut() {
            if let Some(value) = channel.state.update(input_data.is_pressed(channel.button)) {
                trace!("Toggle {} -> {}", actuator, value);
                events.push(ToggleEvent {
                    actuator: actuator.clone(),
                    value,
                });
            }
        }

        Ok((events, self.report()))
    }
}

impl ToggleBank {
    /// Return every actuator to its default, released and off.
    ///
    /// Called on entry to a control phase. Nothing is written to the
    /// actuators.
    pub fn reset(&mut self) {
        debug!("Resetting {} toggle(s)", self.channels.len());

        for channel in self.channels.values_mut() {
            channel.state = ToggleState::default();
        }
    }

    /// Current state of an actuator's toggle.
    pub fn state(&self, actuator: &ActId) -> Option<ToggleState> {
        self.channels.get(actuator).map(|c| c.state)
    }

    fn report(&self) -> StatusReport {
        StatusReport {
            outputs: self
                .channels
                .iter()
                .map(|(a, c)| (a.clone(), c.state.output))
                .collect(),
        }
    }
}
