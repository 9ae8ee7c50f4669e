//! Integrators

#[macro_use]
extern crate log;

mod boresight;
mod brightness;
mod scheduler;
mod selector;

// Re-export.
pub use boresight::*;
pub use brightness::*;
pub use scheduler::*;
pub use selector::*;
