//! Triangle

use render_core::common::*;
use render_core::geometry::*;

/// Returns the ray parameter of the intersection of a ray with a triangle,
/// or `None` if the ray misses it. The test is watertight: rays through a
/// shared edge or vertex hit at least one of the adjoining triangles.
///
/// * `p0` - First vertex.
/// * `p1` - Second vertex.
/// * `p2` - Third vertex.
/// * `r`  - The ray. Only hits in `(0, r.t_max)` are reported.
pub fn intersect_triangle(p0: &Vector3f, p1: &Vector3f, p2: &Vector3f, r: &Ray) -> Option<Float> {
    // Translate vertices based on ray origin.
    let mut p0t = *p0 - r.o;
    let mut p1t = *p1 - r.o;
    let mut p2t = *p2 - r.o;

    // Permute components of triangle vertices and ray direction.
    let kz = r.d.abs().max_dimension();
    let kx = kz + 1;
    let ky = kx + 1;
    let d = r.d.permute(kx, ky, kz);
    p0t = p0t.permute(kx, ky, kz);
    p1t = p1t.permute(kx, ky, kz);
    p2t = p2t.permute(kx, ky, kz);
    if d.z == 0.0 {
        return None;
    }

    // Apply shear transformation to translated vertex positions.
    let sx = -d.x / d.z;
    let sy = -d.y / d.z;
    let sz = 1.0 / d.z;
    p0t.x += sx * p0t.z;
    p0t.y += sy * p0t.z;
    p1t.x += sx * p1t.z;
    p1t.y += sy * p1t.z;
    p2t.x += sx * p2t.z;
    p2t.y += sy * p2t.z;

    // Compute edge function coefficients e0, e1, e2.
    let e0 = p1t.x * p2t.y - p1t.y * p2t.x;
    let e1 = p2t.x * p0t.y - p2t.y * p0t.x;
    let e2 = p0t.x * p1t.y - p0t.y * p1t.x;

    // Perform triangle edge and determinant tests.
    if (e0 < 0.0 || e1 < 0.0 || e2 < 0.0) && (e0 > 0.0 || e1 > 0.0 || e2 > 0.0) {
        return None;
    }
    let det = e0 + e1 + e2;
    if det == 0.0 {
        return None;
    }

    // Compute scaled hit distance to triangle and test against ray `t` range.
    p0t.z *= sz;
    p1t.z *= sz;
    p2t.z *= sz;
    let t_scaled = e0 * p0t.z + e1 * p1t.z + e2 * p2t.z;
    if det < 0.0 && (t_scaled >= 0.0 || t_scaled < r.t_max * det) {
        return None;
    } else if det > 0.0 && (t_scaled <= 0.0 || t_scaled > r.t_max * det) {
        return None;
    }

    let inv_det = 1.0 / det;
    let t = t_scaled * inv_det;

    // Ensure that computed triangle `t` is conservatively greater than zero.
    let max_z_t = Vector3f::new(p0t.z, p1t.z, p2t.z).abs().max_component();
    let delta_z = gamma(3) * max_z_t;

    let max_x_t = Vector3f::new(p0t.x, p1t.x, p2t.x).abs().max_component();
    let max_y_t = Vector3f::new(p0t.y, p1t.y, p2t.y).abs().max_component();
    let delta_x = gamma(5) * (max_x_t + max_z_t);
    let delta_y = gamma(5) * (max_y_t + max_z_t);

    let delta_e = 2.0 * (gamma(2) * max_x_t * max_y_t + delta_y * max_x_t + delta_x * max_y_t);

    let max_e = Vector3f::new(e0, e1, e2).abs().max_component();
    let delta_t = 3.0 * (gamma(3) * max_e * max_z_t + delta_e * max_z_t + delta_z * max_e) * inv_det.abs();
    if t <= delta_t {
        return None;
    }

    Some(t)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn triangle() -> [Vector3f; 3] {
        [
            Vector3f::new(-1.0, -1.0, 0.0),
            Vector3f::new(1.0, -1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn hit_from_above_and_below() {
        let [p0, p1, p2] = triangle();
        let down = Ray::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -2.0));
        let t = intersect_triangle(&p0, &p1, &p2, &down).unwrap();
        assert!(approx_eq!(f64, t, 2.5, epsilon = 1e-12));

        let up = Ray::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&p0, &p1, &p2, &up).is_some());
    }

    #[test]
    fn misses() {
        let [p0, p1, p2] = triangle();
        let outside = Ray::new(Vector3f::new(2.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(intersect_triangle(&p0, &p1, &p2, &outside).is_none());

        let behind = Ray::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&p0, &p1, &p2, &behind).is_none());

        let short = Ray::with_t_max(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), 4.0);
        assert!(intersect_triangle(&p0, &p1, &p2, &short).is_none());

        let parallel = Ray::new(Vector3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(intersect_triangle(&p0, &p1, &p2, &parallel).is_none());
    }

    #[test]
    fn shared_edge_is_watertight() {
        // Two triangles sharing the edge x = 0.
        let a = [Vector3f::new(0.0, -1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0)];
        let b = [Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), Vector3f::new(1.0, 0.0, 0.0)];
        let r = Ray::new(Vector3f::new(0.0, 0.3, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit_a = intersect_triangle(&a[0], &a[1], &a[2], &r).is_some();
        let hit_b = intersect_triangle(&b[0], &b[1], &b[2], &r).is_some();
        assert!(hit_a || hit_b);
    }

    proptest! {
        #[test]
        fn interior_points_are_hit(u in 0.01..0.98f64, v in 0.01..0.98f64, h in 0.1..100.0f64) {
            prop_assume!(u + v < 0.99);
            let [p0, p1, p2] = triangle();
            let target = p0 + (p1 - p0) * u + (p2 - p0) * v;
            let origin = target + Vector3f::new(0.3, -0.2, 1.0) * h;
            let r = Ray::new(origin, target - origin);
            let t = intersect_triangle(&p0, &p1, &p2, &r);
            prop_assert!(t.is_some());
            prop_assert!((r.at(t.unwrap()) - target).length() < 1e-9);
        }
    }
}
