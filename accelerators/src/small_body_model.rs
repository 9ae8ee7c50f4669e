//! Small body shape model

use crate::{BVHAccel, SplitMethod};
use render_core::common::*;
use render_core::error::Result;
use render_core::geometry::*;
use render_core::surface::*;
use shapes::{load_shape_model, ModelTransform, TriangleMesh};
use std::collections::BTreeSet;
use std::path::Path;

/// Maximum number of faces in a BVH leaf.
const MAX_PRIMS_IN_NODE: usize = 4;

/// A triangulated shape model with a BVH over its faces. Immutable once
/// built; shared by reference between render workers.
pub struct SmallBodyModel {
    /// The mesh.
    mesh: TriangleMesh,

    /// Hierarchy over face bounds.
    bvh: BVHAccel,
}

impl SmallBodyModel {
    /// Builds the acceleration structure for a mesh.
    ///
    /// * `mesh` - The mesh.
    pub fn new(mesh: TriangleMesh) -> Self {
        let bounds: Vec<Bounds3f> = (0..mesh.n_triangles()).map(|f| mesh.face_bounds(f)).collect();
        let bvh = BVHAccel::new(&bounds, MAX_PRIMS_IN_NODE, SplitMethod::Middle);
        Self { mesh, bvh }
    }

    /// Loads an OBJ or PLY model and applies the alignment transform.
    ///
    /// * `path`      - The file path.
    /// * `transform` - Scale and rotation about the model centroid.
    pub fn from_file<P: AsRef<Path>>(path: P, transform: &ModelTransform) -> Result<Self> {
        let mesh = load_shape_model(path, transform)?;
        Ok(Self::new(mesh))
    }

    /// Returns the mesh.
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Returns the bounding box of the model.
    pub fn bounds(&self) -> Bounds3f {
        self.bvh.world_bound()
    }

    /// Returns the closest face hit by a ray segment and its ray parameter.
    ///
    /// * `ray` - The ray.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(ElementId, Float)> {
        let mut r = *ray;
        self.bvh.intersect(&mut r, |face, r| self.mesh.intersect_face(face, r))
    }
}

impl SurfaceQuery for SmallBodyModel {
    fn intersect(&self, origin: &Vector3f, direction: &Vector3f) -> Option<SurfaceHit> {
        let ray = Ray::new(*origin, *direction);
        self.intersect_ray(&ray).map(|(element, t)| SurfaceHit {
            element,
            point: ray.at(t),
        })
    }

    fn element_info(&self, element: ElementId) -> ElementInfo {
        ElementInfo {
            center: self.mesh.centers[element],
            normal: self.mesh.normals[element],
        }
    }

    fn elements_within_radius(&self, point: &Vector3f, radius: Float) -> BTreeSet<ElementId> {
        let radius_squared = radius * radius;
        let mut found = BTreeSet::new();
        self.bvh.visit_near(point, radius, |face| {
            if self.mesh.centers[face].distance_squared(point) <= radius_squared {
                found.insert(face);
            }
        });
        found
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    /// Axis aligned cube `[-1, 1]^3` with outward facing triangles.
    fn cube() -> SmallBodyModel {
        let v = |x: Float, y: Float, z: Float| Vector3f::new(x, y, z);
        let vertices = vec![
            v(-1.0, -1.0, -1.0),
            v(1.0, -1.0, -1.0),
            v(1.0, 1.0, -1.0),
            v(-1.0, 1.0, -1.0),
            v(-1.0, -1.0, 1.0),
            v(1.0, -1.0, 1.0),
            v(1.0, 1.0, 1.0),
            v(-1.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [1, 2, 6],
            [1, 6, 5],
            [0, 4, 7],
            [0, 7, 3],
        ];
        SmallBodyModel::new(TriangleMesh::new(vertices, faces).unwrap())
    }

    #[test]
    fn nearest_face_is_reported() {
        let model = cube();
        let hit = model
            .intersect(&Vector3f::new(0.2, 0.3, 10.0), &Vector3f::new(0.0, 0.0, -1.0))
            .unwrap();
        assert!(approx_eq!(f64, hit.point.z, 1.0, epsilon = 1e-12));
        assert!(hit.element == 2 || hit.element == 3);
        let info = model.element_info(hit.element);
        assert_eq!(info.normal, Vector3f::new(0.0, 0.0, 1.0));

        // Same ray from the other side hits the bottom.
        let hit = model
            .intersect(&Vector3f::new(0.2, 0.3, -10.0), &Vector3f::new(0.0, 0.0, 1.0))
            .unwrap();
        assert!(hit.element == 0 || hit.element == 1);
    }

    #[test]
    fn miss() {
        let model = cube();
        assert!(model
            .intersect(&Vector3f::new(3.0, 0.0, 10.0), &Vector3f::new(0.0, 0.0, -1.0))
            .is_none());
        assert!(model
            .intersect(&Vector3f::new(0.0, 0.0, 10.0), &Vector3f::new(0.0, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn radius_query_uses_face_centers() {
        let model = cube();
        let top = Vector3f::new(0.0, 0.0, 1.0);
        assert!(model.elements_within_radius(&top, 0.1).is_empty());
        let near = model.elements_within_radius(&top, 0.8);
        assert_eq!(near.into_iter().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(model.elements_within_radius(&top, 10.0).len(), 12);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let model = SmallBodyModel::from_file(&path, &ModelTransform::default()).unwrap();
        assert_eq!(model.mesh().n_triangles(), 1);
        assert_eq!(model.bounds().p_max, Vector3f::new(1.0, 1.0, 0.0));
    }

    proptest! {
        #[test]
        fn rays_toward_center_always_hit(lat in -1.5..1.5f64, lon in -3.1..3.1f64) {
            let model = cube();
            let d = Vector3f::from_lat_lon(lat, lon);
            let hit = model.intersect(&(d * 10.0), &-d);
            prop_assert!(hit.is_some());
            let p = hit.unwrap().point;
            prop_assert!(approx_eq!(f64, p.abs().max_component(), 1.0, epsilon = 1e-9));
        }
    }
}
