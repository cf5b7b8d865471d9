//! Implementations for the SubsystemArbiter state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;
use std::collections::BTreeMap;

// Internal
use super::{ArbiterError, IDLE_DEM};
use crate::{input::InputSnapshot, profile::SubsystemParams};
use tiger_if::eqpt::{ButtonId, MotorId, MotorMode};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Subsystem arbiter module state
#[derive(Debug, Default)]
pub struct SubsystemArbiter {
    params: Option<ArbiterParams>,

    /// Rule selected on the previous tick, used to log changes only.
    prev_rule: Option<usize>,
}

/// The guard table the arbiter is built from.
#[derive(Debug, Clone)]
struct ArbiterParams {
    motors: Vec<MotorId>,
    mode: MotorMode,
    rules: Vec<Rule>,
}

/// A guard rule with its commands resolved into a full demand set.
#[derive(Debug, Clone)]
struct Rule {
    name: String,
    guard: Vec<ButtonId>,

    /// Demand for every subsystem motor, idle where the rule is silent.
    dems: BTreeMap<MotorId, f64>,
}

/// The command set selected for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Index of the selected rule, `None` when idle.
    pub rule: Option<usize>,

    /// Name of the selected rule, `"idle"` when no rule is selected.
    pub name: String,

    /// Mode of every demand in `dems`.
    pub mode: MotorMode,

    /// Demand for every subsystem motor.
    pub dems: BTreeMap<MotorId, f64>,
}

/// Status report for arbitration.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Number of rules whose guard was held this tick.
    pub num_guards_held: usize,

    /// The selection differs from the previous tick's.
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SubsystemArbiter {
    type InitData = SubsystemParams;
    type InitError = ArbiterError;

    type InputData = InputSnapshot;
    type OutputData = Selection;
    type StatusReport = StatusReport;
    type ProcError = ArbiterError;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let idle: BTreeMap<MotorId, f64> = init_data
            .motors
            .iter()
            .map(|m| (m.clone(), IDLE_DEM))
            .collect();

        let mut rules = Vec::with_capacity(init_data.rules.len());

        for rule in init_data.rules {
            if rule.guard.is_empty() {
                return Err(ArbiterError::EmptyGuard(rule.name));
            }

            let mut dems = idle.clone();
            for cmd in &rule.commands {
                match dems.get_mut(&cmd.motor) {
                    Some(d) => *d = cmd.signed_value(),
                    None => return Err(ArbiterError::UnknownMotor(
                        rule.name.clone(),
                        cmd.motor.to_string()
                    ))
                }
            }

            rules.push(Rule {
                name: rule.name,
                guard: rule.guard,
                dems,
            });
        }

        self.params = Some(ArbiterParams {
            motors: init_data.motors,
            mode: init_data.mode,
            rules,
        });
        self.prev_rule = None;

        Ok(())
    }

    /// Select the first rule whose guard is fully held, or idle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let params = self.params.as_ref().ok_or(ArbiterError::NotInitialised)?;

        let held: Vec<usize> = params
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| input_data.all_pressed(&r.guard))
            .map(|(i, _)| i)
            .collect();

        let selection = match held.first() {
            Some(&i) => {
                let rule = &params.rules[i];
                Selection {
                    rule: Some(i),
                    name: rule.name.clone(),
                    mode: params.mode,
                    dems: rule.dems.clone(),
                }
            },
            None => Selection {
                rule: None,
                name: String::from("idle"),
                mode: params.mode,
                dems: params.motors.iter().map(|m| (m.clone(), IDLE_DEM)).collect(),
            }
        };

        let changed = selection.rule != self.prev_rule;
        if changed {
            trace!("Subsystem selection: {}", selection.name);
        }
        self.prev_rule = selection.rule;

        Ok((selection, StatusReport {
            num_guards_held: held.len(),
            changed,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::profile::{test_profile, Direction, GuardRule, MotorCmd};

    fn arbiter() -> SubsystemArbiter {
        let mut arb = SubsystemArbiter::default();
        arb.init(test_profile().subsystems).unwrap();
        arb
    }

    fn select(arb: &mut SubsystemArbiter, pressed: &[ButtonId]) -> (Selection, StatusReport) {
        arb.proc(&InputSnapshot::with_pressed(0, 0, pressed)).unwrap()
    }

    #[test]
    fn test_not_initialised() {
        let mut arb = SubsystemArbiter::default();
        assert!(matches!(
            arb.proc(&InputSnapshot::default()),
            Err(ArbiterError::NotInitialised)
        ));
    }

    #[test]
    fn test_idle() {
        let mut arb = arbiter();
        let (sel, rpt) = select(&mut arb, &[ButtonId::X, ButtonId::L1]);

        assert_eq!(sel.rule, None);
        assert_eq!(sel.dems.len(), 4);
        assert!(sel.dems.values().all(|d| *d == IDLE_DEM));
        assert_eq!(rpt.num_guards_held, 0);
    }

    #[test]
    fn test_priority() {
        let mut arb = arbiter();

        // A (intake_to_back) is listed before R2 (intake_to_bazooka)
        let (sel, rpt) = select(&mut arb, &[ButtonId::R2, ButtonId::A]);
        assert_eq!(sel.rule, Some(0));
        assert_eq!(sel.name, "intake_to_back");
        assert_eq!(sel.dems[&MotorId::from("upper_roller")], 200.0);
        assert_eq!(rpt.num_guards_held, 2);

        let (sel, _) = select(&mut arb, &[ButtonId::R2]);
        assert_eq!(sel.rule, Some(1));
        assert_eq!(sel.dems[&MotorId::from("upper_roller")], -200.0);
    }

    #[test]
    fn test_unused_motors_idled() {
        let mut arb = arbiter();

        // Eject does not command the upper roller
        let (sel, _) = select(&mut arb, &[ButtonId::L2]);
        assert_eq!(sel.name, "eject");
        assert_eq!(sel.mode, MotorMode::Velocity);
        assert_eq!(sel.dems[&MotorId::from("top_chain")], -200.0);
        assert_eq!(sel.dems[&MotorId::from("intake")], 200.0);
        assert_eq!(sel.dems[&MotorId::from("upper_roller")], IDLE_DEM);
        assert_eq!(sel.dems.len(), 4);
    }

    #[test]
    fn test_chord_guard() {
        let mut params = test_profile().subsystems;
        params.rules.insert(0, GuardRule {
            name: String::from("chord"),
            guard: vec![ButtonId::A, ButtonId::B],
            commands: vec![MotorCmd {
                motor: MotorId::from("intake"),
                value: 50.0,
                dir: Direction::Rev,
            }],
        });

        let mut arb = SubsystemArbiter::default();
        arb.init(params).unwrap();

        // Only half the chord falls through to the next rule
        assert_eq!(select(&mut arb, &[ButtonId::A]).0.name, "intake_to_back");

        let (sel, _) = select(&mut arb, &[ButtonId::A, ButtonId::B]);
        assert_eq!(sel.name, "chord");
        assert_eq!(sel.dems[&MotorId::from("intake")], -50.0);
        assert_eq!(sel.dems[&MotorId::from("top_chain")], IDLE_DEM);
    }

    #[test]
    fn test_changed() {
        let mut arb = arbiter();

        assert!(select(&mut arb, &[ButtonId::A]).1.changed);
        assert!(!select(&mut arb, &[ButtonId::A]).1.changed);
        assert!(select(&mut arb, &[]).1.changed);
        assert!(!select(&mut arb, &[]).1.changed);
    }

    #[test]
    fn test_invalid_rules() {
        let mut params = test_profile().subsystems;
        params.rules[0].guard.clear();
        assert!(matches!(
            SubsystemArbiter::default().init(params),
            Err(ArbiterError::EmptyGuard(_))
        ));

        let mut params = test_profile().subsystems;
        params.rules[0].commands[0].motor = MotorId::from("drv_left");
        assert!(matches!(
            SubsystemArbiter::default().init(params),
            Err(ArbiterError::UnknownMotor(_, _))
        ));
    }
}
