//! Rotations

use super::{Float, Vector3f};
use std::ops::Mul;

/// A proper rotation stored as a 3x3 row-major matrix. `apply()` computes
/// `M v`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rotation {
    /// The matrix.
    pub m: [[Float; 3]; 3],
}

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Creates a rotation whose matrix rows are the given vectors. Rows are
    /// expected to be orthonormal.
    ///
    /// * `r0` - First row.
    /// * `r1` - Second row.
    /// * `r2` - Third row.
    pub fn from_rows(r0: Vector3f, r1: Vector3f, r2: Vector3f) -> Self {
        Self {
            m: [[r0.x, r0.y, r0.z], [r1.x, r1.y, r1.z], [r2.x, r2.y, r2.z]],
        }
    }

    /// Creates a rotation that turns vectors counter-clockwise by `angle`
    /// about `axis` (Rodrigues' formula).
    ///
    /// * `axis`  - Rotation axis; need not be normalized.
    /// * `angle` - Angle in radians.
    pub fn from_axis_angle(axis: &Vector3f, angle: Float) -> Self {
        let k = axis.normalize();
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Self {
            m: [
                [t * k.x * k.x + c, t * k.x * k.y - s * k.z, t * k.x * k.z + s * k.y],
                [t * k.x * k.y + s * k.z, t * k.y * k.y + c, t * k.y * k.z - s * k.x],
                [t * k.x * k.z - s * k.y, t * k.y * k.z + s * k.x, t * k.z * k.z + c],
            ],
        }
    }

    /// Creates a frame transform: the rotation that re-expresses a fixed
    /// vector in a frame rotated by `angle` about `axis`. This is the inverse
    /// of `from_axis_angle()`.
    ///
    /// * `axis`  - Rotation axis; need not be normalized.
    /// * `angle` - Angle in radians.
    pub fn frame_transform(axis: &Vector3f, angle: Float) -> Self {
        Self::from_axis_angle(axis, -angle)
    }

    /// Returns the inverse rotation.
    pub fn inverse(&self) -> Self {
        let m = &self.m;
        Self {
            m: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }

    /// Returns the `i`-th column.
    ///
    /// * `i` - Column index.
    pub fn column(&self, i: usize) -> Vector3f {
        Vector3f::new(self.m[0][i], self.m[1][i], self.m[2][i])
    }

    /// Rotates a vector.
    ///
    /// * `v` - The vector.
    pub fn apply(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m;
        Vector3f::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Rotation {
    type Output = Rotation;

    /// Composes two rotations; `(a * b).apply(v) == a.apply(&b.apply(v))`.
    ///
    /// * `other` - The rotation applied first.
    fn mul(self, other: Rotation) -> Self::Output {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..3).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Rotation { m }
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

    fn assert_vec_eq(a: &Vector3f, b: &Vector3f) {
        assert!(approx_eq!(f64, a.x, b.x, epsilon = 1e-12), "{a} != {b}");
        assert!(approx_eq!(f64, a.y, b.y, epsilon = 1e-12), "{a} != {b}");
        assert!(approx_eq!(f64, a.z, b.z, epsilon = 1e-12), "{a} != {b}");
    }

    #[test]
    fn quarter_turn_about_z() {
        let r = Rotation::from_axis_angle(&Vector3f::new(0.0, 0.0, 1.0), PI_OVER_TWO);
        assert_vec_eq(&r.apply(&Vector3f::new(1.0, 0.0, 0.0)), &Vector3f::new(0.0, 1.0, 0.0));

        let f = Rotation::frame_transform(&Vector3f::new(0.0, 0.0, 1.0), PI_OVER_TWO);
        assert_vec_eq(&f.apply(&Vector3f::new(1.0, 0.0, 0.0)), &Vector3f::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn rows_and_columns() {
        let r = Rotation::from_rows(
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
        );
        assert_eq!(r.inverse().column(2), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(r.apply(&Vector3f::new(1.0, 0.0, 0.0)), Vector3f::new(0.0, 0.0, 1.0));
    }

    proptest! {
        #[test]
        fn inverse_undoes_rotation(
            ax in -1.0..1.0f64, ay in -1.0..1.0f64, az in 0.1..1.0f64,
            angle in -3.0..3.0f64,
            x in -10.0..10.0f64, y in -10.0..10.0f64, z in -10.0..10.0f64,
        ) {
            let r = Rotation::from_axis_angle(&Vector3f::new(ax, ay, az), angle);
            let v = Vector3f::new(x, y, z);
            let back = r.inverse().apply(&r.apply(&v));
            prop_assert!((back - v).length() < 1e-9);
            prop_assert!((r.apply(&v).length() - v.length()).abs() < 1e-9);
            let composed = (r.inverse() * r).apply(&v);
            prop_assert!((composed - v).length() < 1e-9);
        }
    }
}
