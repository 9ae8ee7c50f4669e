//! Wavefront OBJ mesh.

use super::TriangleMesh;
use render_core::error::{Error, Result};
use render_core::geometry::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Implements Wavefront OBJ mesh loading. Only vertex positions and faces
/// are used; polygons are triangulated and every object in the file is
/// merged into one mesh.
pub struct OBJMesh;

impl OBJMesh {
    /// Reads an OBJ file.
    ///
    /// * `path` - The file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader, path)
    }

    /// Reads OBJ data. Material libraries are not loaded.
    ///
    /// * `reader` - The OBJ data.
    /// * `path`   - Used in error messages.
    pub fn read<R: BufRead, P: AsRef<Path>>(reader: &mut R, path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj_buf(
            reader,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ignore_points: true,
                ignore_lines: true,
                ..Default::default()
            },
            |_| Err(tobj::LoadError::OpenFileFailed),
        )
        .map_err(|e| Error::Model(format!("Unable to parse OBJ file '{}'. {}.", path.display(), e)))?;

        let mut vertices: Vec<Vector3f> = vec![];
        let mut faces: Vec<[usize; 3]> = vec![];
        for model in models.iter() {
            let mesh = &model.mesh;
            let offset = vertices.len();
            vertices.extend(mesh.positions.chunks_exact(3).map(|v| Vector3f::new(v[0], v[1], v[2])));
            faces.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|f| [offset + f[0] as usize, offset + f[1] as usize, offset + f[2] as usize]),
            );
        }

        if vertices.is_empty() || faces.is_empty() {
            return Err(Error::Model(format!(
                "OBJ file '{}' is invalid! No face/vertex elements found!",
                path.display()
            )));
        }

        info!(
            "Read OBJ file {} with {} objects, {} vertices and {} faces",
            path.display(),
            models.len(),
            vertices.len(),
            faces.len()
        );
        TriangleMesh::new(vertices, faces)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
