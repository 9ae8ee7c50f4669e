//! PLY mesh.

use super::TriangleMesh;
use ply_rs::parser::Parser;
use ply_rs::ply::*;
use render_core::common::*;
use render_core::error::{Error, Result};
use render_core::geometry::*;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Implements PLY mesh loading.
pub struct PLYMesh;

impl PLYMesh {
    /// Reads a PLY file.
    ///
    /// * `path` - The file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read(&mut BufReader::new(file), path)
    }

    /// Reads a PLY stream.
    ///
    /// * `reader` - The stream.
    /// * `path`   - Used in messages.
    pub fn read<R: Read, P: AsRef<Path>>(reader: &mut R, path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let parser = Parser::<DefaultElement>::new();
        let ply = parser
            .read_ply(reader)
            .map_err(|e| Error::Model(format!("Unable to parse PLY file '{}'. {}.", path.display(), e)))?;

        let mut vertices: Vec<Vector3f> = vec![];
        let mut faces: Vec<[usize; 3]> = vec![];

        for (name, list) in ply.payload.iter() {
            match name.as_ref() {
                "vertex" => {
                    for elem in list.iter() {
                        vertices.push(Self::parse_vertex(elem));
                    }
                }
                "face" => {
                    for elem in list.iter() {
                        Self::parse_face(elem, &mut faces)?;
                    }
                }
                s => warn!("Ignoring unexpected element '{}' in '{}'", s, path.display()),
            }
        }

        // Inspect the structure of the PLY file.
        if vertices.is_empty() || faces.is_empty() {
            return Err(Error::Model(format!(
                "PLY file '{}' is invalid! No face/vertex elements found!",
                path.display()
            )));
        }

        info!(
            "Read PLY file {} with {} vertices and {} faces",
            path.display(),
            vertices.len(),
            faces.len()
        );
        TriangleMesh::new(vertices, faces)
    }

    /// Parse vertex data. Because of the way the parser works it gives one
    /// property at a time. Only positions are used.
    ///
    /// * `elem` - A map of property names and values.
    fn parse_vertex(elem: &KeyMap<Property>) -> Vector3f {
        let mut p = Vector3f::zero();
        for (name, value) in elem.iter() {
            let v = match value {
                Property::Float(v) => *v as Float,
                Property::Double(v) => *v,
                _ => {
                    debug!("Ignoring unexpected vertex property type");
                    continue;
                }
            };
            match name.as_ref() {
                "x" => p.x = v,
                "y" => p.y = v,
                "z" => p.z = v,
                s => debug!("Ignoring unexpected vertex element '{}'", s),
            }
        }
        p
    }

    /// Parse face data. Only vertex indices are supported. These can be
    /// present as signed or unsigned integers of any width; polygons are
    /// fan-triangulated.
    ///
    /// * `elem`  - A map of property names and values.
    /// * `faces` - Receives the triangles.
    fn parse_face(elem: &KeyMap<Property>, faces: &mut Vec<[usize; 3]>) -> Result<()> {
        for (name, value) in elem.iter() {
            match name.as_ref() {
                "vertex_indices" | "vertex_index" => {
                    let vi: Vec<i64> = match value {
                        Property::ListInt(v) => v.iter().map(|i| *i as i64).collect(),
                        Property::ListUInt(v) => v.iter().map(|i| *i as i64).collect(),
                        Property::ListShort(v) => v.iter().map(|i| *i as i64).collect(),
                        Property::ListUShort(v) => v.iter().map(|i| *i as i64).collect(),
                        Property::ListChar(v) => v.iter().map(|i| *i as i64).collect(),
                        Property::ListUChar(v) => v.iter().map(|i| *i as i64).collect(),
                        _ => {
                            debug!("Ignoring unexpected face property type");
                            continue;
                        }
                    };
                    if vi.len() < 3 || vi.iter().any(|i| *i < 0) {
                        return Err(Error::Model(format!("invalid PLY face {vi:?}")));
                    }
                    for k in 1..vi.len() - 1 {
                        faces.push([vi[0] as usize, vi[k] as usize, vi[k + 1] as usize]);
                    }
                }
                s => debug!("Ignoring unexpected face element '{}'", s),
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
