//! 3-D Axis Aligned Bounding Boxes.

use super::{gamma, Axis, Float, Ray, Vector3f, INFINITY};

/// 3-D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Vector3f,

    /// Maximum bounds.
    pub p_max: Vector3f,
}

impl Bounds3f {
    /// An empty bounding box. Minimum and maximum bounds are flipped so the
    /// box can be grown from nothing iteratively.
    pub const EMPTY: Self = Self {
        p_min: Vector3f { x: INFINITY, y: INFINITY, z: INFINITY },
        p_max: Vector3f { x: -INFINITY, y: -INFINITY, z: -INFINITY },
    };

    /// Creates a new 3-D bounding box from 2 points. The minimum and maximum
    /// bounds are used for each coordinate axis.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Vector3f, p2: Vector3f) -> Self {
        Self { p_min: p1.min(&p2), p_max: p1.max(&p2) }
    }

    /// Returns true if any of the components of `p_max` are less than `p_min`.
    pub fn is_empty(&self) -> bool {
        self.p_max.x < self.p_min.x || self.p_max.y < self.p_min.y || self.p_max.z < self.p_min.z
    }

    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the center of the box.
    pub fn centroid(&self) -> Vector3f {
        0.5 * (self.p_min + self.p_max)
    }

    /// Returns the index of which of the axes is longest.
    pub fn maximum_extent(&self) -> Axis {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            Axis::X
        } else if d.y > d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns the box grown to contain a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Vector3f) -> Self {
        Self { p_min: self.p_min.min(p), p_max: self.p_max.max(p) }
    }

    /// Returns the box grown to contain another box.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self { p_min: self.p_min.min(&other.p_min), p_max: self.p_max.max(&other.p_max) }
    }

    /// Returns the squared distance from a point to the box; zero if the point
    /// is inside.
    ///
    /// * `p` - The point.
    pub fn distance_squared(&self, p: &Vector3f) -> Float {
        let dx = (self.p_min.x - p.x).max(0.0).max(p.x - self.p_max.x);
        let dy = (self.p_min.y - p.y).max(0.0).max(p.y - self.p_max.y);
        let dz = (self.p_min.z - p.z).max(0.0).max(p.z - self.p_max.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Returns the minimum or maximum corner.
    ///
    /// * `i` - 0 for `p_min`, 1 for `p_max`.
    fn corner(&self, i: u8) -> &Vector3f {
        if i == 0 {
            &self.p_min
        } else {
            &self.p_max
        }
    }

    /// Returns true if the ray segment `[0, ray.t_max)` hits the box, using
    /// the precomputed reciprocal direction and direction signs.
    ///
    /// * `ray`        - The ray.
    /// * `inv_dir`    - Reciprocal of the ray direction.
    /// * `dir_is_neg` - 1 for each negative direction component, else 0.
    pub fn intersect_p_inv(&self, ray: &Ray, inv_dir: &Vector3f, dir_is_neg: [u8; 3]) -> bool {
        // Check for ray intersection against x and y slabs.
        let mut t_min = (self.corner(dir_is_neg[0]).x - ray.o.x) * inv_dir.x;
        let mut t_max = (self.corner(1 - dir_is_neg[0]).x - ray.o.x) * inv_dir.x;
        let ty_min = (self.corner(dir_is_neg[1]).y - ray.o.y) * inv_dir.y;
        let mut ty_max = (self.corner(1 - dir_is_neg[1]).y - ray.o.y) * inv_dir.y;

        // Update `t_max` and `ty_max` to ensure robust bounds intersection.
        t_max *= 1.0 + 2.0 * gamma(3);
        ty_max *= 1.0 + 2.0 * gamma(3);

        if t_min > ty_max || ty_min > t_max {
            return false;
        }
        if ty_min > t_min {
            t_min = ty_min;
        }
        if ty_max < t_max {
            t_max = ty_max;
        }

        // Check for ray intersection against z slab.
        let tz_min = (self.corner(dir_is_neg[2]).z - ray.o.z) * inv_dir.z;
        let mut tz_max = (self.corner(1 - dir_is_neg[2]).z - ray.o.z) * inv_dir.z;
        tz_max *= 1.0 + 2.0 * gamma(3);

        if t_min > tz_max || tz_min > t_max {
            return false;
        }
        if tz_min > t_min {
            t_min = tz_min;
        }
        if tz_max < t_max {
            t_max = tz_max;
        }

        t_min < ray.t_max && t_max > 0.0
    }
}

impl Default for Bounds3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Bounds3f {
        Bounds3f::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0))
    }

    fn hits(b: &Bounds3f, ray: &Ray) -> bool {
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        let dir_is_neg = [
            (inv_dir.x < 0.0) as u8,
            (inv_dir.y < 0.0) as u8,
            (inv_dir.z < 0.0) as u8,
        ];
        b.intersect_p_inv(ray, &inv_dir, dir_is_neg)
    }

    #[test]
    fn empty_grows_with_points() {
        let b = Bounds3f::EMPTY
            .union_point(&Vector3f::new(1.0, 2.0, 3.0))
            .union_point(&Vector3f::new(-1.0, 0.0, 5.0));
        assert!(!b.is_empty());
        assert_eq!(b.p_min, Vector3f::new(-1.0, 0.0, 3.0));
        assert_eq!(b.p_max, Vector3f::new(1.0, 2.0, 5.0));
        assert!(Bounds3f::EMPTY.is_empty());
    }

    #[test]
    fn maximum_extent() {
        let b = Bounds3f::new(Vector3f::zero(), Vector3f::new(1.0, 5.0, 2.0));
        assert_eq!(b.maximum_extent(), Axis::Y);
    }

    #[test]
    fn distance_to_point() {
        let b = unit_box();
        assert_eq!(b.distance_squared(&Vector3f::zero()), 0.0);
        assert_eq!(b.distance_squared(&Vector3f::new(3.0, 0.0, 0.0)), 4.0);
    }

    #[test]
    fn ray_hits_and_misses() {
        let b = unit_box();
        let toward = Ray::new(Vector3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(hits(&b, &toward));

        let away = Ray::new(Vector3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!hits(&b, &away));

        let beside = Ray::new(Vector3f::new(5.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(!hits(&b, &beside));
    }
}
