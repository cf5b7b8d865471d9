//! # Tiger Executable Parameters
//!
//! Parameters of the executable itself, loaded from `params/tiger_exec.toml`.
//! Everything specific to one robot lives in its profile instead.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TigerExecParams {
    /// Profile used when none is given on the command line, relative to
    /// `params/profiles`.
    pub profile: String,

    /// Period of the control loop.
    ///
    /// Units: milliseconds
    pub control_period_ms: u64,

    /// Period of the telemetry reporter.
    ///
    /// Units: milliseconds
    pub telemetry_period_ms: u64,

    /// Time the operator has to pick a routine before a match.
    ///
    /// Units: milliseconds
    pub select_window_ms: u64,

    /// Units: seconds
    pub auto_duration_s: f64,

    /// Units: seconds
    pub driver_duration_s: f64,

    /// Write pose samples to `pose.csv` in the session archive.
    pub csv_telemetry: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExecParamsError {
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TigerExecParams {
    fn default() -> Self {
        Self {
            profile: String::from("tiger1.toml"),
            control_period_ms: 10,
            telemetry_period_ms: 50,
            select_window_ms: 5000,
            auto_duration_s: 15.0,
            driver_duration_s: 105.0,
            csv_telemetry: true,
        }
    }
}

impl TigerExecParams {
    pub fn validate(&self) -> Result<(), ExecParamsError> {
        if self.control_period_ms == 0 {
            return Err(ExecParamsError::NotPositive("control_period_ms"));
        }
        if self.telemetry_period_ms == 0 {
            return Err(ExecParamsError::NotPositive("telemetry_period_ms"));
        }
        if !(self.auto_duration_s > 0.0) {
            return Err(ExecParamsError::NotPositive("auto_duration_s"));
        }
        if !(self.driver_duration_s > 0.0) {
            return Err(ExecParamsError::NotPositive("driver_duration_s"));
        }

        Ok(())
    }

    /// Units: milliseconds
    pub fn auto_duration_ms(&self) -> u64 {
        (self.auto_duration_s * 1000.0).round() as u64
    }

    /// Units: milliseconds
    pub fn driver_duration_ms(&self) -> u64 {
        (self.driver_duration_s * 1000.0).round() as u64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file() {
        let p: TigerExecParams = util::params::load_str(
            "profile = \"tiger_shark.toml\"\ncontrol_period_ms = 20\n"
        ).unwrap();

        assert_eq!(p.profile, "tiger_shark.toml");
        assert_eq!(p.control_period_ms, 20);
        assert_eq!(p.telemetry_period_ms, 50);
        assert_eq!(p.auto_duration_ms(), 15_000);
        assert_eq!(p.driver_duration_ms(), 105_000);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let p = TigerExecParams { control_period_ms: 0, ..Default::default() };
        assert!(matches!(p.validate(), Err(ExecParamsError::NotPositive("control_period_ms"))));
    }
}
