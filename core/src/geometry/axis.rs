//! Axis

use std::ops::Add;

/// Coordinate axis used to split BVH nodes and permute ray/triangle
/// coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Axis {
    #[default]
    X = 0,
    Y = 1,
    Z = 2,
}

impl From<usize> for Axis {
    fn from(i: usize) -> Self {
        match i {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("invalid axis value"),
        }
    }
}

impl From<Axis> for usize {
    fn from(axis: Axis) -> usize {
        axis as usize
    }
}

impl Add<usize> for Axis {
    type Output = Axis;
    fn add(self, i: usize) -> Self::Output {
        Axis::from((self as usize + i) % 3)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
