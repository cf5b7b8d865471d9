//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit `value` to `[min, max]`.
///
/// Also reports whether the value had to be limited.
pub fn clamp<T>(value: T, min: T, max: T) -> (T, bool)
where
    T: Float
{
    if value > max {
        (max, true)
    }
    else if value < min {
        (min, true)
    }
    else {
        (value, false)
    }
}

/// Sign of a value, with zero mapping to zero (unlike `Float::signum`).
pub fn sign<T>(value: T) -> T
where
    T: Float
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

/// Get the signed angular distance from `a` to `b`, both in degrees.
///
/// The shortest way round is taken, so the result is within [-180, 180].
pub fn get_ang_dist_deg<T>(a: T, b: T) -> T
where
    T: Float
{
    let full: T = T::from(360.0).unwrap();

    let c = rem_euclid(a - b, full);
    let d = rem_euclid(b - a, full);

    if c < d {
        -c
    }
    else {
        d
    }
}

/// Wrap a heading in degrees into [0, 360).
pub fn wrap_deg<T>(value: T) -> T
where
    T: Float
{
    rem_euclid(value, T::from(360.0).unwrap())
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}
