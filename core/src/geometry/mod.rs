//! Geometry

use super::common::*;

// Define macros for property based testing.
#[cfg(test)]
#[macro_export]
macro_rules! prop_vector3 {
    ($name: ident, $t: ty, $xr: expr, $yr: expr, $zr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr, z in $zr) -> Vector3<$t> {
                Vector3 { x, y, z }
            }
        }
    };
}

mod axis;
mod bounds3;
mod ray;
mod rotation;
mod vector3;

// Re-export
pub use axis::*;
pub use bounds3::*;
pub use ray::*;
pub use rotation::*;
pub use vector3::*;
