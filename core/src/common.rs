//! Common

use num_traits::Num;

/// Use 64-bit precision for floating point numbers. Sun positions are placed
/// ~1e8 km away so single precision is not enough for shadow rays.
pub type Float = f64;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// PI (π)
pub const PI: Float = std::f64::consts::PI;

/// PI/2 (π/2)
pub const PI_OVER_TWO: Float = PI * 0.5;

/// PI/4 (π/4)
pub const PI_OVER_FOUR: Float = PI * 0.25;

/// Machine Epsilon
pub const MACHINE_EPSILON: Float = std::f64::EPSILON * 0.5;

/// Returns the minimum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn min<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the maximum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn max<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a > b {
        a
    } else {
        b
    }
}

/// Clamps a value to the range [low, high].
///
/// * `val`  - The value to clamp.
/// * `low`  - Lower bound.
/// * `high` - Upper bound.
#[inline(always)]
pub fn clamp<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Error bound for `n` floating point operations, γ(n).
///
/// * `n` - Number of operations.
#[inline(always)]
pub fn gamma(n: Int) -> Float {
    let n = n as Float * MACHINE_EPSILON;
    n / (1.0 - n)
}

/// Default signed integer.
pub type Int = i32;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
