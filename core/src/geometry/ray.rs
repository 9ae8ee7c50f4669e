//! Rays

use super::{Float, Vector3f, INFINITY};
use std::fmt;

/// A semi-infinite line specified by its origin and direction.
#[derive(Copy, Clone, Debug, Default)]
pub struct Ray {
    /// Origin.
    pub o: Vector3f,

    /// Direction. Not required to be normalized.
    pub d: Vector3f,

    /// Restricts the ray to segment `[0, t_max)` in units of `d`.
    pub t_max: Float,
}

impl Ray {
    /// Returns a new unbounded ray.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn new(o: Vector3f, d: Vector3f) -> Self {
        Self { o, d, t_max: INFINITY }
    }

    /// Returns a new ray restricted to `[0, t_max)`.
    ///
    /// * `o`     - Origin.
    /// * `d`     - Direction.
    /// * `t_max` - Maximum extent in units of `d`.
    pub fn with_t_max(o: Vector3f, d: Vector3f, t_max: Float) -> Self {
        Self { o, d, t_max }
    }

    /// Returns the position along the ray at parameter `t`.
    ///
    /// * `t` - The parameter.
    pub fn at(&self, t: Float) -> Vector3f {
        self.o + self.d * t
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[o={}, d={}, t_max={}]", self.o, self.d, self.t_max)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_along_ray() {
        let r = Ray::new(Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 2.0, 0.0));
        assert_eq!(r.at(1.5), Vector3f::new(1.0, 3.0, 0.0));
        assert!(r.t_max.is_infinite());
    }
}
