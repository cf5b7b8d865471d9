//! # Autonomous script loader
//!
//! Routines are kept in `.auto` files under `$TIGER_SW_ROOT/scripts`, one
//! statement per step:
//!
//! ```text
//! # Score the preload
//! DRIVE: {"left": 6000, "right": -6000, "duration_ms": 1000};
//! WAIT: {"duration_ms": 500};
//! ACTUATOR: {"actuator": "bazooka", "value": true};
//! CALIBRATE;
//! ```
//!
//! A statement is a keyword, optionally followed by a colon and a JSON object
//! holding the step's fields, terminated by a semicolon. Semicolons inside
//! JSON strings do not end a statement. Lines starting with `#` are comments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use super::AutoStep;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Script keywords and the step each one produces.
const KEYWORDS: [(&str, &str); 8] = [
    ("DRIVE", "timed_drive"),
    ("WAIT", "wait"),
    ("ACTUATOR", "actuator_set"),
    ("MOTOR", "motor_set"),
    ("MOVE", "closed_loop_move"),
    ("TURN", "closed_loop_turn"),
    ("POSE", "set_pose"),
    ("CALIBRATE", "calibrate"),
];

/// Directory within the software root holding the scripts.
pub const SCRIPTS_DIR: &str = "scripts";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A parsed autonomous routine.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoScript {
    /// Name of the routine, used in logs and on the display.
    pub name: String,

    pub steps: Vec<AutoStep>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("The TIGER_SW_ROOT environment variable is not set")]
    SwRootNotSet,

    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Statement {0} is malformed: {1:?}")]
    MalformedStatement(usize, String),

    #[error("Statement {0} has an unknown keyword: {1}")]
    UnknownKeyword(usize, String),

    #[error("Statement {0} has an invalid payload: {1}")]
    InvalidJson(usize, serde_json::Error),

    #[error("Statement {0} has a payload which is not a JSON object")]
    PayloadNotObject(usize),

    #[error("The script ends with an unterminated statement: {0:?}")]
    Unterminated(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutoScript {
    /// Load a script from `$TIGER_SW_ROOT/scripts`.
    pub fn load(name: &str, script_file: &str) -> Result<Self, ScriptError> {
        let path = util::host::get_tiger_sw_root()
            .map_err(|_| ScriptError::SwRootNotSet)?
            .join(SCRIPTS_DIR)
            .join(script_file);

        Self::load_path(name, path)
    }

    /// Load a script from the given path.
    pub fn load_path<P: AsRef<Path>>(name: &str, script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let script = Self::parse(name, &text)?;
        debug!(
            "Loaded {} step(s) of routine {:?} from {}",
            script.steps.len(),
            name,
            path.display()
        );

        Ok(script)
    }

    /// Parse the text of a script.
    ///
    /// Statement indices in errors count from 0.
    pub fn parse(name: &str, text: &str) -> Result<Self, ScriptError> {
        let statement_re = statement_regex();

        // Remove the comments so that they may contain semicolons
        let body: String = text
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");

        let mut parts = split_statements(&body);

        // Anything after the last semicolon must be whitespace
        if let Some(tail) = parts.pop() {
            if !tail.trim().is_empty() {
                return Err(ScriptError::Unterminated(tail.trim().to_string()));
            }
        }

        let mut steps = Vec::with_capacity(parts.len());

        for (index, statement) in parts.iter().enumerate() {
            let cap = statement_re.captures(statement).ok_or_else(|| {
                ScriptError::MalformedStatement(index, statement.trim().to_string())
            })?;

            // Group 1 always participates in a match
            let keyword = &cap[1];
            let tag = KEYWORDS
                .iter()
                .find(|(k, _)| *k == keyword)
                .map(|(_, t)| *t)
                .ok_or_else(|| ScriptError::UnknownKeyword(index, keyword.to_string()))?;

            let mut payload = match cap.get(2) {
                Some(p) => {
                    serde_json::from_str(p.as_str()).map_err(|e| ScriptError::InvalidJson(index, e))?
                }
                None => Value::Object(Default::default()),
            };

            match payload.as_object_mut() {
                Some(obj) => {
                    obj.insert(String::from("step"), Value::String(tag.to_string()));
                }
                None => return Err(ScriptError::PayloadNotObject(index)),
            }

            steps.push(
                serde_json::from_value(payload).map_err(|e| ScriptError::InvalidJson(index, e))?,
            );
        }

        if steps.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(Self {
            name: name.to_string(),
            steps,
        })
    }

    /// Longest time the script can take, `None` if any step is unbounded.
    pub fn max_duration_ms(&self) -> Option<u64> {
        self.steps.iter().map(|s| s.max_duration_ms()).sum()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Split on the semicolons which are not inside a JSON string.
///
/// The last part is whatever follows the final semicolon.
fn split_statements(body: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            }
            else if c == '\\' {
                escaped = true;
            }
            else if c == '"' {
                in_string = false;
            }
        }
        else if c == '"' {
            in_string = true;
        }
        else if c == ';' {
            parts.push(&body[start..i]);
            start = i + 1;
        }
    }
    parts.push(&body[start..]);

    parts
}

/// A keyword, and an optional payload after a colon.
fn statement_regex() -> Regex {
    match RegexBuilder::new(r"^\s*([A-Za-z_]+)\s*(?::\s*(.*?))?\s*$")
        .dot_matches_new_line(true)
        .build()
    {
        Ok(re) => re,
        Err(e) => util::raise_error!("Statement regex is invalid: {}", e),
    }
}
