//! BVH Common

use render_core::geometry::*;

/// Splitting method to use to subdivide primitives.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SplitMethod {
    /// Splitting planes at the midpoint of the centroid bounds along the
    /// axis of largest extent.
    Middle,

    /// Partition primitives into equally sized subsets such that the first half
    /// of the primitives have smallest centroid coordinate values along the
    /// chosen axis, and second have have the largest centroid coordinate values.
    EqualCounts,
}

/// Stores information about a primitive.
#[derive(Copy, Clone, Debug)]
pub struct BVHPrimitiveInfo {
    /// Index of the face in the mesh.
    pub primitive_number: usize,

    /// The bounding box of primitive.
    pub bounds: Bounds3f,

    /// The centroid of bounding box of primitive.
    pub centroid: Vector3f,
}

impl BVHPrimitiveInfo {
    /// Create a `BVHPrimitiveInfo`.
    ///
    /// * `primitive_number` - Index of the face in the mesh.
    /// * `bounds`           - The bounding box of primitive.
    pub fn new(primitive_number: usize, bounds: Bounds3f) -> Self {
        Self {
            primitive_number,
            bounds,
            centroid: bounds.centroid(),
        }
    }
}

/// BVHBuildNode represents a node of the Bound Volume Hierarchy.
#[derive(Debug)]
pub struct BVHBuildNode {
    /// Bounding box of all children beneath this node.
    pub bounds: Bounds3f,

    /// Children of this node.
    pub children: Option<[Box<BVHBuildNode>; 2]>,

    /// Coordinate axis along which primitives are partitioned between the
    /// two children.
    pub split_axis: Axis,

    /// Index of first primitive in the ordered primitive list stored at this node.
    pub first_prim_offset: usize,

    /// Number of primitives stored at this node.
    pub n_primitives: usize,
}

impl BVHBuildNode {
    /// Create a leaf BVH node.
    ///
    /// * `first`  - Index of first primitive in the ordered list.
    /// * `n`      - Number of primitives.
    /// * `bounds` - Bounding box.
    pub fn leaf(first: usize, n: usize, bounds: Bounds3f) -> Self {
        Self {
            first_prim_offset: first,
            n_primitives: n,
            bounds,
            children: None,
            split_axis: Axis::default(),
        }
    }

    /// Allocates an interior BVH node.
    ///
    /// * `axis` - Axis used for partitioning children.
    /// * `c0`   - First child.
    /// * `c1`   - Second child.
    pub fn interior(axis: Axis, c0: BVHBuildNode, c1: BVHBuildNode) -> Self {
        Self {
            first_prim_offset: 0,
            n_primitives: 0,
            bounds: c0.bounds.union(&c1.bounds),
            children: Some([Box::new(c0), Box::new(c1)]),
            split_axis: axis,
        }
    }
}

/// Stores information needed to traverse the BVH.
#[derive(Copy, Clone, Default, Debug)]
pub struct LinearBVHNode {
    /// Bounding box for the node.
    pub bounds: Bounds3f,

    /// For leaf nodes, offset for the primitives in the node.
    /// For interior nodes, offset to the second child.
    pub offset: u32,

    /// For leaf nodes, the number of primitives in the node.
    /// For interior nodes, 0.
    pub n_primitives: u32,

    /// For interior nodes, which coordinate axis was used for partitioning.
    pub axis: u8,
}

impl LinearBVHNode {
    /// Creates a leaf linear bvh node.
    ///
    /// * `bounds`       - Bounding box for the node.
    /// * `offset`       - Offset for primitives in the node.
    /// * `n_primitives` - Number of primitives in the node.
    pub fn new_leaf_node(bounds: Bounds3f, offset: u32, n_primitives: u32) -> Self {
        Self {
            bounds,
            offset,
            n_primitives,
            axis: 0,
        }
    }

    /// Creates an interior linear bvh node.
    ///
    /// * `bounds` - Bounding box for the node.
    /// * `offset` - Offset to the second child.
    /// * `axis`   - Axis used for partitioning.
    pub fn new_interior_node(bounds: Bounds3f, offset: u32, axis: u8) -> Self {
        Self {
            bounds,
            offset,
            axis,
            n_primitives: 0,
        }
    }
}
