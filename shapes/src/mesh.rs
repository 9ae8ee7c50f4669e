//! Triangle Mesh

use crate::{intersect_triangle, ModelTransform};
use render_core::common::*;
use render_core::error::{Error, Result};
use render_core::geometry::*;

/// An indexed triangle mesh with per-face centers and outward normals.
/// Faces are wound counter-clockwise when seen from outside.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Vector3f>,

    /// Vertex indices of each face.
    pub faces: Vec<[usize; 3]>,

    /// Face centers.
    pub centers: Vec<Vector3f>,

    /// Unit face normals. Degenerate faces have a zero normal.
    pub normals: Vec<Vector3f>,
}

impl TriangleMesh {
    /// Creates a mesh.
    ///
    /// * `vertices` - Vertex positions.
    /// * `faces`    - Vertex indices of each face.
    pub fn new(vertices: Vec<Vector3f>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if faces.is_empty() {
            return Err(Error::Model("mesh has no faces".to_string()));
        }
        if let Some((i, f)) = faces
            .iter()
            .enumerate()
            .find(|(_, f)| f.iter().any(|v| *v >= vertices.len()))
        {
            return Err(Error::Model(format!(
                "face {i} references vertex {:?} but there are only {} vertices",
                f,
                vertices.len()
            )));
        }
        if vertices.iter().any(Vector3f::has_nans) {
            return Err(Error::Model("mesh has NaN vertices".to_string()));
        }

        let mut mesh = Self {
            vertices,
            faces,
            centers: vec![],
            normals: vec![],
        };
        mesh.update_face_geometry();

        let degenerate = mesh.normals.iter().filter(|n| n.length_squared() == 0.0).count();
        if degenerate > 0 {
            warn!("Mesh has {degenerate} degenerate faces");
        }
        Ok(mesh)
    }

    /// Recomputes face centers and normals from the vertices.
    fn update_face_geometry(&mut self) {
        let (centers, normals) = self
            .faces
            .iter()
            .map(|f| {
                let [p0, p1, p2] = [self.vertices[f[0]], self.vertices[f[1]], self.vertices[f[2]]];
                let n = (p1 - p0).cross(&(p2 - p0));
                let l = n.length();
                let normal = if l > 0.0 { n / l } else { Vector3f::zero() };
                ((p0 + p1 + p2) / 3.0, normal)
            })
            .unzip();
        self.centers = centers;
        self.normals = normals;
    }

    /// Applies a model alignment transform to the vertices.
    ///
    /// * `transform` - The transform.
    pub fn transform(&mut self, transform: &ModelTransform) {
        if transform.is_identity() {
            return;
        }
        transform.apply(&mut self.vertices);
        self.update_face_geometry();
    }

    /// Returns the number of faces.
    pub fn n_triangles(&self) -> usize {
        self.faces.len()
    }

    /// Returns the vertices of a face.
    ///
    /// * `face` - Face index.
    pub fn triangle(&self, face: usize) -> [Vector3f; 3] {
        let f = self.faces[face];
        [self.vertices[f[0]], self.vertices[f[1]], self.vertices[f[2]]]
    }

    /// Returns the bounding box of a face.
    ///
    /// * `face` - Face index.
    pub fn face_bounds(&self, face: usize) -> Bounds3f {
        let [p0, p1, p2] = self.triangle(face);
        Bounds3f::new(p0, p1).union_point(&p2)
    }

    /// Returns the bounding box of the whole mesh.
    pub fn bounds(&self) -> Bounds3f {
        self.vertices.iter().fold(Bounds3f::EMPTY, |b, p| b.union_point(p))
    }

    /// Returns the ray parameter where a ray hits a face.
    ///
    /// * `face` - Face index.
    /// * `ray`  - The ray.
    pub fn intersect_face(&self, face: usize, ray: &Ray) -> Option<Float> {
        let [p0, p1, p2] = self.triangle(face);
        intersect_triangle(&p0, &p1, &p2, ray)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(2.0, 2.0, 0.0),
                Vector3f::new(0.0, 2.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn face_geometry() {
        let mesh = square();
        assert_eq!(mesh.n_triangles(), 2);
        assert_eq!(mesh.normals[0], Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.centers[1], Vector3f::new(2.0 / 3.0, 4.0 / 3.0, 0.0));
        let b = mesh.bounds();
        assert_eq!(b.p_max, Vector3f::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn rejects_bad_indices() {
        assert!(TriangleMesh::new(vec![Vector3f::zero(); 2], vec![[0, 1, 2]]).is_err());
        assert!(TriangleMesh::new(vec![Vector3f::zero(); 3], vec![]).is_err());
    }

    #[test]
    fn transform_updates_faces() {
        let mut mesh = square();
        mesh.transform(&ModelTransform::new(Some(2.0), None));
        assert_eq!(mesh.vertices[0], Vector3f::new(-1.0, -1.0, 0.0));
        assert!((mesh.centers[0] - Vector3f::new(5.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn intersect_face() {
        let mesh = square();
        let r = Ray::new(Vector3f::new(1.5, 0.5, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(mesh.intersect_face(0, &r).is_some());
        assert!(mesh.intersect_face(1, &r).is_none());
    }
}
