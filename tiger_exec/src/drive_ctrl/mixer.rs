//! Arcade mixing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::clamp;

use super::DRIVE_CMD_MAX;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Left and right commands produced by the mixer, in stick units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Mix {
    pub left: f64,
    pub right: f64,

    /// The left command hit the limit.
    pub left_limited: bool,

    /// The right command hit the limit.
    pub right_limited: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Mix throttle and steer into left and right commands.
///
/// Each side saturates at `DRIVE_CMD_MAX` independently.
pub fn arcade_mix(throttle: f64, steer: f64) -> Mix {
    let (left, left_limited) = clamp(throttle + steer, -DRIVE_CMD_MAX, DRIVE_CMD_MAX);
    let (right, right_limited) = clamp(throttle - steer, -DRIVE_CMD_MAX, DRIVE_CMD_MAX);

    Mix {
        left,
        right,
        left_limited,
        right_limited,
    }
}
