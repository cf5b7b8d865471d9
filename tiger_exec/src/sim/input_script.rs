//! Timed controller input scripts
//!
//! Each statement gives the state of the controller from a point in time
//! until the next statement:
//!
//! ```text
//! 0.0: {"left_y": 100};
//! 1.5: {"left_y": 100, "right_x": -40, "buttons": ["R2"]};
//! 3.0: {};
//! ```
//!
//! Axes not given are centred and buttons not given are released.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use regex::RegexBuilder;
use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use tiger_if::eqpt::{AxisId, ButtonId};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the controller held by one script statement.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputFrame {
    pub left_x: i32,
    pub left_y: i32,
    pub right_x: i32,
    pub right_y: i32,
    pub buttons: Vec<ButtonId>,
}

/// A parsed input script, frames in time order.
#[derive(Debug, Clone)]
pub struct InputScript {
    frames: Vec<(u64, InputFrame)>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum InputScriptError {
    #[error("Could not find the input script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the input script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The input script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Input script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Input script contains an invalid frame at {0} s: {1}")]
    InvalidFrame(f64, serde_json::Error),

    #[error("Input script frame at {0} s is earlier than the one before it")]
    OutOfOrder(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputFrame {
    pub fn axis(&self, axis: AxisId) -> i32 {
        match axis {
            AxisId::LeftX => self.left_x,
            AxisId::LeftY => self.left_y,
            AxisId::RightX => self.right_x,
            AxisId::RightY => self.right_y,
        }
    }

    pub fn button(&self, button: ButtonId) -> bool {
        self.buttons.contains(&button)
    }
}

impl InputScript {
    /// Load an input script from a file.
    pub fn load<P: AsRef<Path>>(script_path: P) -> Result<Self, InputScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(InputScriptError::ScriptNotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(&path).map_err(InputScriptError::ScriptLoadError)?;

        Self::parse(&text)
    }

    /// Parse the text of an input script.
    pub fn parse(text: &str) -> Result<Self, InputScriptError> {
        let re = match RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
        {
            Ok(re) => re,
            Err(e) => util::raise_error!("Input script regex is invalid: {}", e),
        };

        let mut frames: Vec<(u64, InputFrame)> = vec![];

        for cap in re.captures_iter(text) {
            let time_s: f64 = cap[1]
                .parse()
                .map_err(|e| InputScriptError::InvalidTimestamp(format!("{}", e)))?;

            let frame: InputFrame = serde_json::from_str(&cap[3])
                .map_err(|e| InputScriptError::InvalidFrame(time_s, e))?;

            let time_ms = (time_s * 1000.0).round() as u64;

            if let Some((prev_ms, _)) = frames.last() {
                if time_ms < *prev_ms {
                    return Err(InputScriptError::OutOfOrder(time_s));
                }
            }

            frames.push((time_ms, frame));
        }

        if frames.is_empty() {
            return Err(InputScriptError::ScriptEmpty);
        }

        Ok(Self { frames })
    }

    /// The frame in force at the given time.
    ///
    /// `None` before the first frame.
    pub fn frame_at(&self, time_ms: u64) -> Option<&InputFrame> {
        let num_started = self.frames.partition_point(|(t, _)| *t <= time_ms);

        num_started
            .checked_sub(1)
            .map(|i| &self.frames[i].1)
    }

    /// Time of the last frame.
    ///
    /// Units: milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.frames.last().map(|(t, _)| *t).unwrap_or(0)
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        0.5: {"left_y": 100};
        1.5: {"left_y": 100, "right_x": -40, "buttons": ["R2", "A"]};
        3: {};
    "#;

    #[test]
    fn test_parse() {
        let script = InputScript::parse(SCRIPT).unwrap();

        assert_eq!(script.num_frames(), 3);
        assert_eq!(script.duration_ms(), 3000);

        assert_eq!(script.frame_at(0), None);
        assert_eq!(script.frame_at(500).map(|f| f.left_y), Some(100));
        assert_eq!(script.frame_at(1499).map(|f| f.right_x), Some(0));

        let f = script.frame_at(1500).unwrap();
        assert_eq!(f.axis(AxisId::RightX), -40);
        assert!(f.button(ButtonId::A));
        assert!(!f.button(ButtonId::B));

        assert_eq!(script.frame_at(10_000), Some(&InputFrame::default()));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(InputScript::parse("nothing"), Err(InputScriptError::ScriptEmpty)));
        assert!(matches!(
            InputScript::parse("1.0: {\"left_z\": 4};"),
            Err(InputScriptError::InvalidFrame(_, _))
        ));
        assert!(matches!(
            InputScript::parse("2.0: {};\n1.0: {};"),
            Err(InputScriptError::OutOfOrder(_))
        ));
    }
}
