//! 3-D Vectors

use super::{max, min, Axis, Float, PI};
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, Mul, MulAssign, Neg, Sub, SubAssign};

/// A 3-D vector containing numeric values. Body-fixed positions are stored
/// as vectors from the body origin.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D vector containing `Float` values.
pub type Vector3f = Vector3<Float>;

impl<T: Num> Vector3<T> {
    /// Creates a new 3-D vector.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a new 3-D zero vector.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    /// Returns the square of the vector's length.
    pub fn length_squared(&self) -> T
    where
        T: Copy,
    {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the dot product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn dot(&self, other: &Self) -> T
    where
        T: Copy,
    {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the cross product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn cross(&self, other: &Self) -> Self
    where
        T: Copy,
    {
        Self::new(
            (self.y * other.z) - (self.z * other.y),
            (self.z * other.x) - (self.x * other.z),
            (self.x * other.y) - (self.y * other.x),
        )
    }

    /// Return the component-wise minimum coordinate values with another vector.
    ///
    /// * `other` - The other vector.
    pub fn min(&self, other: &Self) -> Self
    where
        T: PartialOrd + Copy,
    {
        Self::new(min(self.x, other.x), min(self.y, other.y), min(self.z, other.z))
    }

    /// Return the component-wise maximum coordinate values with another vector.
    ///
    /// * `other` - The other vector.
    pub fn max(&self, other: &Self) -> Self
    where
        T: PartialOrd + Copy,
    {
        Self::new(max(self.x, other.x), max(self.y, other.y), max(self.z, other.z))
    }

    /// Returns a new vector with permuted coordinates according to given axes.
    ///
    /// * `x` - Axis to use for the x-coordinate of returned vector.
    /// * `y` - Axis to use for the y-coordinate of returned vector.
    /// * `z` - Axis to use for the z-coordinate of returned vector.
    pub fn permute(&self, x: Axis, y: Axis, z: Axis) -> Self
    where
        T: Copy,
    {
        Self::new(self[x], self[y], self[z])
    }
}

impl Vector3f {
    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the vector's length.
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector.
    pub fn normalize(&self) -> Self {
        *self / self.length()
    }

    /// Returns a new vector containing absolute values of the components.
    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Returns the axis with largest coordinate value.
    pub fn max_dimension(&self) -> Axis {
        if self.x > self.y {
            if self.x > self.z {
                Axis::X
            } else {
                Axis::Z
            }
        } else if self.y > self.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns the largest coordinate value.
    pub fn max_component(&self) -> Float {
        self.x.max(self.y.max(self.z))
    }

    /// Returns the distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance(&self, other: &Self) -> Float {
        (*self - *other).length()
    }

    /// Returns the squared distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance_squared(&self, other: &Self) -> Float {
        (*self - *other).length_squared()
    }

    /// Returns the angle in radians between this vector and another one, in
    /// [0, π]. Nearly (anti)parallel vectors use the cross product so small
    /// angles keep their precision. Returns 0 if either vector is zero.
    ///
    /// * `other` - The other vector.
    pub fn angle(&self, other: &Self) -> Float {
        let norm_product = self.length() * other.length();
        if norm_product == 0.0 {
            return 0.0;
        }

        let dot = self.dot(other);
        let threshold = norm_product * 0.9999;
        if dot < -threshold || dot > threshold {
            let v3 = self.cross(other);
            if dot >= 0.0 {
                (v3.length() / norm_product).asin()
            } else {
                PI - (v3.length() / norm_product).asin()
            }
        } else {
            (dot / norm_product).acos()
        }
    }

    /// Returns the planetocentric latitude in radians, in [-π/2, π/2].
    pub fn latitude(&self) -> Float {
        let l = self.length();
        if l == 0.0 {
            0.0
        } else {
            (self.z / l).asin()
        }
    }

    /// Returns the longitude in radians, in (-π, π].
    pub fn longitude(&self) -> Float {
        self.y.atan2(self.x)
    }

    /// Returns the unit vector for a latitude and longitude.
    ///
    /// * `lat` - Latitude in radians.
    /// * `lon` - Longitude in radians.
    pub fn from_lat_lon(lat: Float, lon: Float) -> Self {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        Self::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }
}

impl<T: Num> Add for Vector3<T> {
    type Output = Self;

    /// Adds the given vector and returns the result.
    ///
    /// * `other` -  The vector to add.
    fn add(self, other: Self) -> Self::Output {
        Self::Output::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> AddAssign for Vector3<T> {
    /// Performs the `+=` operation.
    ///
    /// * `other` -  The vector to add.
    fn add_assign(&mut self, other: Self) {
        *self = Self::new(self.x + other.x, self.y + other.y, self.z + other.z);
    }
}

impl<T: Num> Sub for Vector3<T> {
    type Output = Self;

    /// Subtracts the given vector and returns the result.
    ///
    /// * `other` -  The vector to subtract.
    fn sub(self, other: Self) -> Self::Output {
        Self::Output::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> SubAssign for Vector3<T> {
    /// Performs the `-=` operation.
    ///
    /// * `other` -  The vector to subtract.
    fn sub_assign(&mut self, other: Self) {
        *self = Self::new(self.x - other.x, self.y - other.y, self.z - other.z);
    }
}

impl<T: Num + Copy> Mul<T> for Vector3<T> {
    type Output = Vector3<T>;

    /// Scale the vector.
    ///
    /// * `f` -  The scaling factor.
    fn mul(self, f: T) -> Self::Output {
        Self::Output::new(f * self.x, f * self.y, f * self.z)
    }
}

impl Mul<Vector3<Float>> for Float {
    type Output = Vector3<Float>;

    /// Scale the vector.
    ///
    /// * `v` -  The vector.
    fn mul(self, v: Vector3<Float>) -> Vector3<Float> {
        Vector3::new(self * v.x, self * v.y, self * v.z)
    }
}

impl<T: Num + Copy> MulAssign<T> for Vector3<T> {
    /// Scale and assign the result to the vector.
    ///
    /// * `f` -  The scaling factor.
    fn mul_assign(&mut self, f: T) {
        *self = Self::new(f * self.x, f * self.y, f * self.z);
    }
}

impl<T: Num + Copy> Div<T> for Vector3<T> {
    type Output = Self;

    /// Scale the vector by 1/f.
    ///
    /// * `f` -  The scaling factor.
    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());

        let inv = T::one() / f;
        Self::Output::new(inv * self.x, inv * self.y, inv * self.z)
    }
}

impl<T: Num + Neg<Output = T>> Neg for Vector3<T> {
    type Output = Vector3<T>;

    /// Flip the vector's direction (scale by -1).
    fn neg(self) -> Self::Output {
        Self::Output::new(-self.x, -self.y, -self.z)
    }
}

impl<T> Index<Axis> for Vector3<T> {
    type Output = T;

    /// Index the vector by an axis to get the immutable coordinate axis value.
    ///
    /// * `axis` -  A 3-D coordinate axis.
    fn index(&self, axis: Axis) -> &Self::Output {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl<T> From<[T; 3]> for Vector3<T> {
    /// Convert a 3-element array to a 3-D vector.
    ///
    /// * `a` - The array.
    fn from(a: [T; 3]) -> Self {
        let [x, y, z] = a;
        Self { x, y, z }
    }
}

impl<T: fmt::Display> fmt::Display for Vector3<T> {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.x, self.y, self.z)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PI_OVER_TWO;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn zero_vector() {
        assert!(Vector3::new(0, 0, 0) == Vector3::zero());
        assert!(Vector3::new(0.0, 0.0, 0.0) == Vector3f::zero());
    }

    #[test]
    fn angle_of_orthogonal_vectors() {
        let a = Vector3f::new(1.0, 0.0, 0.0);
        let b = Vector3f::new(0.0, 3.0, 0.0);
        assert!(approx_eq!(f64, a.angle(&b), PI_OVER_TWO, epsilon = 1e-12));
    }

    #[test]
    fn angle_of_parallel_and_antiparallel_vectors() {
        let a = Vector3f::new(0.0, 0.0, 2.0);
        assert_eq!(a.angle(&Vector3f::new(0.0, 0.0, 5.0)), 0.0);
        assert!(approx_eq!(f64, a.angle(&Vector3f::new(0.0, 0.0, -1.0)), PI, epsilon = 1e-12));
    }

    #[test]
    fn angle_with_zero_vector() {
        assert_eq!(Vector3f::zero().angle(&Vector3f::new(1.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn lat_lon_of_axes() {
        let north = Vector3f::new(0.0, 0.0, 10.0);
        assert!(approx_eq!(f64, north.latitude(), PI_OVER_TWO, epsilon = 1e-12));

        let east = Vector3f::new(0.0, 1.0, 0.0);
        assert!(approx_eq!(f64, east.latitude(), 0.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, east.longitude(), PI_OVER_TWO, epsilon = 1e-12));
    }

    #[test]
    fn cross_product() {
        let x = Vector3::new(1, 0, 0);
        let y = Vector3::new(0, 1, 0);
        assert_eq!(x.cross(&y), Vector3::new(0, 0, 1));
    }

    // Define some properties for tests.
    prop_vector3!(vector3_f64, f64, -100.0..100.0f64, -100.0..100.0f64, -100.0..100.0f64);

    proptest! {
        #[test]
        fn length_squared_f64(v in vector3_f64()) {
            prop_assert_eq!(v.length_squared(), v.x * v.x + v.y * v.y + v.z * v.z);
        }

        #[test]
        fn add_sub_f64(v1 in vector3_f64(), v2 in vector3_f64()) {
            prop_assert_eq!(v1 + v2, Vector3::new(v1.x + v2.x, v1.y + v2.y, v1.z + v2.z));
            prop_assert_eq!(v1 - v2, Vector3::new(v1.x - v2.x, v1.y - v2.y, v1.z - v2.z));
        }

        #[test]
        fn lat_lon_round_trip(lat in -1.5..1.5f64, lon in -3.1..3.1f64) {
            let v = Vector3f::from_lat_lon(lat, lon);
            prop_assert!((v.length() - 1.0).abs() < 1e-12);
            prop_assert!((v.latitude() - lat).abs() < 1e-9);
            prop_assert!((v.longitude() - lon).abs() < 1e-9);
        }

        #[test]
        fn angle_is_symmetric(v1 in vector3_f64(), v2 in vector3_f64()) {
            prop_assert!((v1.angle(&v2) - v2.angle(&v1)).abs() < 1e-12);
            prop_assert!(v1.angle(&v2) >= 0.0 && v1.angle(&v2) <= PI);
        }
    }
}
