//! Model alignment

use render_core::common::*;
use render_core::error::{Error, Result};
use render_core::geometry::*;

/// Optional uniform scale and rotation applied to a shape model about its
/// centroid. The scale is applied first.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ModelTransform {
    /// Uniform scale factor.
    pub scale: Option<Float>,

    /// Rotation.
    pub rotation: Option<Rotation>,
}

impl ModelTransform {
    /// Creates a transform.
    ///
    /// * `scale`    - Uniform scale factor.
    /// * `rotation` - Rotation.
    pub fn new(scale: Option<Float>, rotation: Option<Rotation>) -> Self {
        Self { scale, rotation }
    }

    /// Creates a transform from command line values.
    ///
    /// * `scale`  - Uniform scale factor.
    /// * `rotate` - Rotation as `angle,x,y,z` with the angle in degrees.
    pub fn from_options(scale: Option<Float>, rotate: Option<&str>) -> Result<Self> {
        if let Some(s) = scale {
            if !s.is_finite() || s <= 0.0 {
                return Err(Error::Config(format!("model scale {s} must be positive")));
            }
        }
        let rotation = rotate.map(Self::parse_rotation).transpose()?;
        Ok(Self::new(scale, rotation))
    }

    /// Parses a rotation given as `angle,x,y,z`. The angle is in degrees and
    /// the rotation is a frame transform about the axis `(x, y, z)`.
    ///
    /// * `s` - The rotation string.
    pub fn parse_rotation(s: &str) -> Result<Rotation> {
        let values: Vec<Float> = s
            .split(',')
            .map(|v| v.trim().parse::<Float>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Config(format!("invalid rotation '{s}': {e}")))?;
        if values.len() != 4 {
            return Err(Error::Config(format!("invalid rotation '{s}': expected angle,x,y,z")));
        }
        let axis = Vector3f::new(values[1], values[2], values[3]);
        if axis.length_squared() == 0.0 {
            return Err(Error::Config(format!("invalid rotation '{s}': zero length axis")));
        }
        Ok(Rotation::frame_transform(&axis, values[0].to_radians()))
    }

    /// Returns `true` if the transform leaves points unchanged.
    pub fn is_identity(&self) -> bool {
        self.scale.is_none() && self.rotation.is_none()
    }

    /// Transforms points in place about their centroid.
    ///
    /// * `points` - The points.
    pub fn apply(&self, points: &mut [Vector3f]) {
        if self.is_identity() || points.is_empty() {
            return;
        }
        let center = centroid(points);
        for p in points.iter_mut() {
            let mut q = *p - center;
            if let Some(s) = self.scale {
                q = q * s;
            }
            if let Some(r) = &self.rotation {
                q = r.apply(&q);
            }
            *p = q + center;
        }
    }
}

/// Returns the mean of a set of points.
///
/// * `points` - The points.
pub fn centroid(points: &[Vector3f]) -> Vector3f {
    let sum = points.iter().fold(Vector3f::zero(), |acc, p| acc + *p);
    sum / points.len().max(1) as Float
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn parse_rotation() {
        let r = ModelTransform::parse_rotation("90, 0, 0, 1").unwrap();
        let v = r.apply(&Vector3f::new(1.0, 0.0, 0.0));
        assert!(approx_eq!(f64, v.x, 0.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, v.y, -1.0, epsilon = 1e-12));

        assert!(ModelTransform::parse_rotation("90,0,0").is_err());
        assert!(ModelTransform::parse_rotation("90,0,0,0").is_err());
        assert!(ModelTransform::parse_rotation("a,0,0,1").is_err());
    }

    #[test]
    fn scale_about_centroid() {
        let mut points = vec![Vector3f::new(1.0, 1.0, 1.0), Vector3f::new(3.0, 1.0, 1.0)];
        ModelTransform::from_options(Some(2.0), None).unwrap().apply(&mut points);
        assert_eq!(points, vec![Vector3f::new(0.0, 1.0, 1.0), Vector3f::new(4.0, 1.0, 1.0)]);
    }

    #[test]
    fn rotate_about_centroid() {
        let mut points = vec![Vector3f::new(1.0, 0.0, 5.0), Vector3f::new(-1.0, 0.0, 5.0)];
        ModelTransform::from_options(None, Some("90,0,0,1")).unwrap().apply(&mut points);
        assert!(approx_eq!(f64, points[0].y, -1.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, points[0].z, 5.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, points[1].y, 1.0, epsilon = 1e-12));
    }

    #[test]
    fn invalid_scale() {
        assert!(ModelTransform::from_options(Some(0.0), None).is_err());
        assert!(ModelTransform::from_options(None, None).unwrap().is_identity());
    }
}
