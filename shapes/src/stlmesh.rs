//! STL mesh.

use super::TriangleMesh;
use byteorder::{LittleEndian, ReadBytesExt};
use render_core::common::*;
use render_core::error::{Error, Result};
use render_core::geometry::*;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

/// Size of the binary STL header, including the triangle count.
const BINARY_HEADER_SIZE: usize = 84;

/// Size of one binary STL triangle record.
const BINARY_TRIANGLE_SIZE: usize = 50;

/// Implements binary and ASCII STL mesh loading. Stored facet normals are
/// ignored and coincident vertices are merged.
pub struct STLMesh;

impl STLMesh {
    /// Reads an STL file.
    ///
    /// * `path` - The file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Self::parse(&bytes, path)
    }

    /// Parses STL data. The data is binary when its length matches the
    /// triangle count in the binary header, ASCII otherwise.
    ///
    /// * `bytes` - STL contents.
    /// * `path`  - Used in error messages.
    pub fn parse<P: AsRef<Path>>(bytes: &[u8], path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let triangles = if Self::is_binary(bytes) {
            Self::binary_triangles(bytes, path)?
        } else {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| Error::Model(format!("Unable to parse STL file '{}'. {}.", path.display(), e)))?;
            Self::ascii_triangles(text, path)?
        };
        if triangles.is_empty() {
            return Err(Error::Model(format!("STL file '{}' has no facets", path.display())));
        }

        let mut indices: HashMap<[u64; 3], usize> = HashMap::new();
        let mut vertices: Vec<Vector3f> = vec![];
        let faces: Vec<[usize; 3]> = triangles
            .into_iter()
            .map(|triangle| {
                triangle.map(|p| {
                    *indices.entry([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]).or_insert_with(|| {
                        vertices.push(p);
                        vertices.len() - 1
                    })
                })
            })
            .collect();

        info!(
            "Read STL file {} with {} vertices and {} faces",
            path.display(),
            vertices.len(),
            faces.len()
        );
        TriangleMesh::new(vertices, faces)
    }

    /// Returns `true` if the data length matches a binary STL file.
    ///
    /// * `bytes` - STL contents.
    fn is_binary(bytes: &[u8]) -> bool {
        if bytes.len() < BINARY_HEADER_SIZE {
            return false;
        }
        let mut count = Cursor::new(&bytes[80..BINARY_HEADER_SIZE]);
        count
            .read_u32::<LittleEndian>()
            .map_or(false, |n| bytes.len() == BINARY_HEADER_SIZE + n as usize * BINARY_TRIANGLE_SIZE)
    }

    /// Reads the triangles of a binary STL file.
    ///
    /// * `bytes` - STL contents.
    /// * `path`  - Used in error messages.
    fn binary_triangles(bytes: &[u8], path: &Path) -> Result<Vec<[Vector3f; 3]>> {
        let n = (bytes.len() - BINARY_HEADER_SIZE) / BINARY_TRIANGLE_SIZE;
        let mut reader = Cursor::new(&bytes[BINARY_HEADER_SIZE..]);
        (0..n)
            .map(|i| {
                read_binary_triangle(&mut reader).map_err(|e| {
                    Error::Model(format!("Unable to read facet {} of STL file '{}'. {}.", i, path.display(), e))
                })
            })
            .collect()
    }

    /// Reads the triangles of an ASCII STL file.
    ///
    /// * `text` - STL contents.
    /// * `path` - Used in error messages.
    fn ascii_triangles(text: &str, path: &Path) -> Result<Vec<[Vector3f; 3]>> {
        let mut triangles = vec![];
        let mut facet: Vec<Vector3f> = vec![];
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("vertex") => {
                    let mut xyz = [0.0; 3];
                    for c in xyz.iter_mut() {
                        *c = tokens
                            .next()
                            .and_then(|t| t.parse::<Float>().ok())
                            .ok_or_else(|| Error::parse(path, line_no, "expected 3 vertex coordinates"))?;
                    }
                    facet.push(Vector3f::from(xyz));
                }
                Some("endfacet") => {
                    if facet.len() != 3 {
                        return Err(Error::parse(path, line_no, format!("facet has {} vertices", facet.len())));
                    }
                    triangles.push([facet[0], facet[1], facet[2]]);
                    facet.clear();
                }
                Some("solid") | Some("facet") | Some("outer") | Some("endloop") | Some("endsolid") | None => {}
                Some(s) => {
                    return Err(Error::parse(path, line_no, format!("unexpected STL keyword '{s}'")));
                }
            }
        }
        Ok(triangles)
    }
}

/// Reads one binary STL triangle record, skipping the stored normal and
/// the attribute count.
///
/// * `reader` - Positioned at the start of the record.
fn read_binary_triangle(reader: &mut Cursor<&[u8]>) -> io::Result<[Vector3f; 3]> {
    let _normal = read_binary_vector(reader)?;
    let triangle = [
        read_binary_vector(reader)?,
        read_binary_vector(reader)?,
        read_binary_vector(reader)?,
    ];
    let _attributes = reader.read_u16::<LittleEndian>()?;
    Ok(triangle)
}

/// Reads three little-endian `f32` values.
///
/// * `reader` - The reader.
fn read_binary_vector(reader: &mut Cursor<&[u8]>) -> io::Result<Vector3f> {
    let x = reader.read_f32::<LittleEndian>()?;
    let y = reader.read_f32::<LittleEndian>()?;
    let z = reader.read_f32::<LittleEndian>()?;
    Ok(Vector3f::new(x as Float, y as Float, z as Float))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
