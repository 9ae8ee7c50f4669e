//! Core

#[macro_use]
extern crate log;

// Re-export.
pub mod albedo;
pub mod app;
pub mod common;
pub mod error;
pub mod fileutil;
pub mod film;
pub mod geometry;
pub mod image_io;
pub mod metadata;
pub mod photometry;
pub mod surface;
