//! Camera

#[macro_use]
extern crate log;

mod camera;
mod sum_file;

// Re-export
pub use camera::*;
pub use sum_file::*;
