//! Shapes

#[macro_use]
extern crate log;
extern crate ply_rs;

mod loader;
mod mesh;
mod objmesh;
mod plymesh;
mod stlmesh;
mod transform;
mod triangle;

// Re-export
pub use loader::*;
pub use mesh::*;
pub use objmesh::*;
pub use plymesh::*;
pub use stlmesh::*;
pub use transform::*;
pub use triangle::*;
