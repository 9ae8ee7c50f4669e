//! Shape model loading

use super::{ModelTransform, OBJMesh, PLYMesh, STLMesh, TriangleMesh};
use render_core::error::{Error, Result};
use render_core::fileutil::get_extension_from_filename;
use std::path::Path;

/// Loads a shape model, choosing the reader from the file extension, and
/// applies the model alignment transform.
///
/// * `path`      - The file path.
/// * `transform` - Scale and rotation about the model centroid.
pub fn load_shape_model<P: AsRef<Path>>(path: P, transform: &ModelTransform) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let name = path.to_string_lossy();
    let mut mesh = match get_extension_from_filename(&name).as_deref() {
        Some("obj") => OBJMesh::from_file(path)?,
        Some("ply") => PLYMesh::from_file(path)?,
        Some("stl") => STLMesh::from_file(path)?,
        Some(extension) => {
            return Err(Error::UnsupportedFormat(format!(
                "Shape model extension {extension} is not supported"
            )))
        }
        None => {
            return Err(Error::UnsupportedFormat(format!(
                "Can't determine shape model type from suffix of filename {name}"
            )))
        }
    };
    if !transform.is_identity() {
        debug!("Aligning {} with {:?}", name, transform);
        mesh.transform(transform);
    }
    Ok(mesh)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use render_core::geometry::Vector3f;

    #[test]
    fn dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("tri.OBJ");
        std::fs::write(&obj, "v 0 0 0\nv 2 0 0\nv 0 2 0\nf 1 2 3\n").unwrap();

        let mesh = load_shape_model(&obj, &ModelTransform::default()).unwrap();
        assert_eq!(mesh.n_triangles(), 1);

        let scaled = load_shape_model(&obj, &ModelTransform::new(Some(0.5), None)).unwrap();
        assert!((scaled.vertices[1] - Vector3f::new(4.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-12);

        let stl = dir.path().join("tri.stl");
        std::fs::write(
            &stl,
            "solid tri\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 2 0 0\nvertex 0 2 0\nendloop\nendfacet\nendsolid tri\n",
        )
        .unwrap();
        assert_eq!(load_shape_model(&stl, &ModelTransform::default()).unwrap().n_triangles(), 1);

        let vtk = dir.path().join("tri.vtk");
        std::fs::write(&vtk, "").unwrap();
        assert!(matches!(
            load_shape_model(&vtk, &ModelTransform::default()),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(load_shape_model(dir.path().join("missing.obj"), &ModelTransform::default()).is_err());
    }
}
