//! Ray intersection acceleration data structures.

#[macro_use]
extern crate log;

mod bvh;
mod small_body_model;

// Re-export
pub use bvh::*;
pub use small_body_model::*;
