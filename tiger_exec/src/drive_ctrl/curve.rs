//! Stick input curve

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::sign;

use super::DRIVE_CMD_MAX;
use crate::profile::CurveParams;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply the deadband and exponential curve to a stick value.
///
/// Magnitudes at or below the deadband give zero. Above it the output starts
/// at `min_output` and rises along an exponential to `DRIVE_CMD_MAX` at full
/// deflection, with the same shape for negative inputs.
pub fn shape(x: f64, curve: &CurveParams) -> f64 {
    let mag = x.abs();

    if mag <= curve.deadband {
        return 0.0;
    }

    sign(x) * scale(mag, curve)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Curve for a magnitude strictly above the deadband.
fn scale(mag: f64, curve: &CurveParams) -> f64 {
    let g = mag - curve.deadband;
    let g_max = DRIVE_CMD_MAX - curve.deadband;

    let i = curve.gain.powf(g - DRIVE_CMD_MAX) * g;
    let i_max = curve.gain.powf(g_max - DRIVE_CMD_MAX) * g_max;

    (DRIVE_CMD_MAX - curve.min_output) / DRIVE_CMD_MAX * i * DRIVE_CMD_MAX / i_max
        + curve.min_output
}
