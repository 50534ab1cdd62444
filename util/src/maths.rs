//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Convert an angle in radians into degrees.
pub fn r2d<T>(angle_rad: T) -> T
where
    T: Float,
{
    angle_rad.to_degrees()
}

/// Bound an angle in degrees into the half-open range (-180, 180].
///
/// The result is the shortest signed turn equivalent to `angle_deg`, so that
/// a controller acting on it never commands more than half a rotation. A turn
/// of exactly half a rotation is reported as +180.
pub fn bound_half_degrees<T>(angle_deg: T) -> T
where
    T: Float,
{
    let full: T = T::from(360.0).unwrap();
    let half: T = T::from(180.0).unwrap();

    let wrapped = rem_euclid(angle_deg, full);

    if wrapped > half {
        wrapped - full
    } else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}
