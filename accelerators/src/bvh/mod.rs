//! Bounding Volume Hierarchy.

mod build;
mod common;

use build::*;
pub use common::SplitMethod;
use common::*;
use render_core::common::*;
use render_core::geometry::*;

/// Bounding Volume Hierarchy over a set of primitives identified by index.
/// The hierarchy only stores bounds; primitive tests are supplied by the
/// caller during traversal.
#[derive(Clone, Debug)]
pub struct BVHAccel {
    /// Primitive numbers ordered so that leaves cover contiguous ranges.
    pub primitives: Vec<usize>,

    /// Maximum number of primitives in a leaf.
    pub max_prims_in_node: usize,

    /// Spliting method.
    pub split_method: SplitMethod,

    /// The list of nodes.
    pub nodes: Vec<LinearBVHNode>,
}

impl BVHAccel {
    /// Create a new Bounding Volume Hierarchy Accelerator.
    ///
    /// * `bounds`            - Bounding box of each primitive.
    /// * `max_prims_in_node` - Maximum number of primitives in a leaf.
    /// * `split_method`      - The splitting method.
    pub fn new(bounds: &[Bounds3f], max_prims_in_node: usize, split_method: SplitMethod) -> Self {
        let max_prims_in_node = max_prims_in_node.clamp(1, 255);
        let n_primitives = bounds.len();
        if n_primitives == 0 {
            return Self {
                primitives: vec![],
                max_prims_in_node,
                split_method,
                nodes: vec![],
            };
        }

        // Initializes primitive_info array for primitives.
        let mut primitive_info: Vec<BVHPrimitiveInfo> = bounds
            .iter()
            .enumerate()
            .map(|(i, b)| BVHPrimitiveInfo::new(i, *b))
            .collect();

        // Build BVH tree for primitives using primitive_info.
        let mut total_nodes = 0;
        let mut ordered_prims = Vec::with_capacity(n_primitives);
        let root = recursive_build(
            split_method,
            max_prims_in_node,
            &mut primitive_info,
            0,
            n_primitives,
            &mut total_nodes,
            &mut ordered_prims,
        );

        // Compute representation of depth-first traversal of BVH tree.
        let mut nodes = vec![LinearBVHNode::default(); total_nodes];
        let mut offset = 0_u32;
        Self::flatten_bvh_tree(&root, &mut nodes, &mut offset);
        debug_assert!(total_nodes == offset as usize);

        debug!("BVH created with {} nodes for {} primitives", total_nodes, n_primitives);

        Self {
            primitives: ordered_prims,
            max_prims_in_node,
            split_method,
            nodes,
        }
    }

    /// Flatten the tree to the linear representation.
    ///
    /// * `node`   - The node.
    /// * `nodes`  - The linear nodes.
    /// * `offset` - Tracks current offset into `nodes`.
    fn flatten_bvh_tree(node: &BVHBuildNode, nodes: &mut Vec<LinearBVHNode>, offset: &mut u32) -> u32 {
        let my_offset = *offset;
        *offset += 1;

        match &node.children {
            None => {
                nodes[my_offset as usize] = LinearBVHNode::new_leaf_node(
                    node.bounds,
                    node.first_prim_offset as u32,
                    node.n_primitives as u32,
                );
            }
            Some([c0, c1]) => {
                // Create interior flattened BVH nodes.
                Self::flatten_bvh_tree(c0, nodes, offset);
                let second_child_offset = Self::flatten_bvh_tree(c1, nodes, offset);
                nodes[my_offset as usize] = LinearBVHNode::new_interior_node(
                    node.bounds,
                    second_child_offset,
                    usize::from(node.split_axis) as u8,
                );
            }
        }

        my_offset
    }

    /// Returns the bounds of all primitives.
    pub fn world_bound(&self) -> Bounds3f {
        self.nodes.first().map_or(Bounds3f::EMPTY, |n| n.bounds)
    }

    /// Returns the closest primitive hit by a ray and the ray parameter of
    /// the hit. `intersect_primitive` returns the ray parameter of a hit on a
    /// primitive within `(0, ray.t_max)`.
    ///
    /// * `r`                   - The ray; `t_max` is shortened to the hit.
    /// * `intersect_primitive` - Ray-primitive test.
    pub fn intersect<F>(&self, r: &mut Ray, intersect_primitive: F) -> Option<(usize, Float)>
    where
        F: Fn(usize, &Ray) -> Option<Float>,
    {
        let mut closest: Option<(usize, Float)> = None;
        if self.nodes.is_empty() {
            return closest;
        }

        let inv_dir = Vector3f::new(1.0 / r.d.x, 1.0 / r.d.y, 1.0 / r.d.z);
        let dir_is_neg = [
            if inv_dir.x < 0.0 { 1_u8 } else { 0_u8 },
            if inv_dir.y < 0.0 { 1_u8 } else { 0_u8 },
            if inv_dir.z < 0.0 { 1_u8 } else { 0_u8 },
        ];

        // Follow ray through BVH nodes to find primitive intersections.
        let (mut to_visit_offset, mut current_node_index) = (0, 0);
        let mut nodes_to_visit = [0_usize; 64];

        loop {
            // Check ray against BVH node
            let node = &self.nodes[current_node_index];
            if node.bounds.intersect_p_inv(r, &inv_dir, dir_is_neg) {
                if node.n_primitives > 0 {
                    // Intersect ray with primitives in leaf BVH node.
                    for i in 0..node.n_primitives {
                        let prim = self.primitives[node.offset as usize + i as usize];
                        if let Some(t) = intersect_primitive(prim, r) {
                            if t < r.t_max {
                                r.t_max = t;
                                closest = Some((prim, t));
                            }
                        }
                    }
                    if to_visit_offset == 0 {
                        break;
                    }
                    to_visit_offset -= 1;
                    current_node_index = nodes_to_visit[to_visit_offset];
                } else {
                    // Put far BVH node on nodes_to_visit stack, advance to near
                    // node.
                    if dir_is_neg[node.axis as usize] == 1 {
                        nodes_to_visit[to_visit_offset] = current_node_index + 1;
                        to_visit_offset += 1;
                        current_node_index = node.offset as usize;
                    } else {
                        nodes_to_visit[to_visit_offset] = node.offset as usize;
                        to_visit_offset += 1;
                        current_node_index += 1;
                    }
                }
            } else {
                if to_visit_offset == 0 {
                    break;
                }
                to_visit_offset -= 1;
                current_node_index = nodes_to_visit[to_visit_offset];
            }
        }
        closest
    }

    /// Visits every primitive in a leaf whose bounds lie within `radius` of
    /// `point`. The caller applies the exact distance test.
    ///
    /// * `point`   - Query point.
    /// * `radius`  - Query radius.
    /// * `visitor` - Called with each candidate primitive number.
    pub fn visit_near<F>(&self, point: &Vector3f, radius: Float, mut visitor: F)
    where
        F: FnMut(usize),
    {
        if self.nodes.is_empty() {
            return;
        }
        let radius_squared = radius * radius;
        let mut nodes_to_visit = vec![0_usize];
        while let Some(current_node_index) = nodes_to_visit.pop() {
            let node = &self.nodes[current_node_index];
            if node.bounds.distance_squared(point) > radius_squared {
                continue;
            }
            if node.n_primitives > 0 {
                let first = node.offset as usize;
                for prim in &self.primitives[first..first + node.n_primitives as usize] {
                    visitor(*prim);
                }
            } else {
                nodes_to_visit.push(node.offset as usize);
                nodes_to_visit.push(current_node_index + 1);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Unit cubes along the x-axis at x = 0, 2, 4, ...
    fn boxes(n: usize) -> Vec<Bounds3f> {
        (0..n)
            .map(|i| {
                let x = 2.0 * i as Float;
                Bounds3f::new(Vector3f::new(x, 0.0, 0.0), Vector3f::new(x + 1.0, 1.0, 1.0))
            })
            .collect()
    }

    /// Ray parameter where a ray enters a box, if it does.
    fn hit_box(b: &Bounds3f, r: &Ray) -> Option<Float> {
        let inv_dir = Vector3f::new(1.0 / r.d.x, 1.0 / r.d.y, 1.0 / r.d.z);
        let mut t0: Float = 0.0;
        let mut t1 = r.t_max;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let near = (b.p_min[axis] - r.o[axis]) * inv_dir[axis];
            let far = (b.p_max[axis] - r.o[axis]) * inv_dir[axis];
            t0 = t0.max(near.min(far));
            t1 = t1.min(near.max(far));
        }
        (t0 <= t1 && t0 > 0.0).then_some(t0)
    }

    #[test]
    fn closest_hit_along_row() {
        let bounds = boxes(20);
        for method in [SplitMethod::Middle, SplitMethod::EqualCounts] {
            let bvh = BVHAccel::new(&bounds, 2, method);
            let mut r = Ray::new(Vector3f::new(-5.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0));
            let hit = bvh.intersect(&mut r, |i, r| hit_box(&bounds[i], r));
            assert_eq!(hit.map(|(i, _)| i), Some(0));

            let mut r = Ray::new(Vector3f::new(100.0, 0.5, 0.5), Vector3f::new(-1.0, 0.0, 0.0));
            let hit = bvh.intersect(&mut r, |i, r| hit_box(&bounds[i], r));
            assert_eq!(hit.map(|(i, _)| i), Some(19));
            assert_eq!(r.t_max, 100.0 - 39.0);

            let mut r = Ray::new(Vector3f::new(-5.0, 5.0, 0.5), Vector3f::new(1.0, 0.0, 0.0));
            assert!(bvh.intersect(&mut r, |i, r| hit_box(&bounds[i], r)).is_none());
        }
    }

    #[test]
    fn empty_hierarchy() {
        let bvh = BVHAccel::new(&[], 4, SplitMethod::Middle);
        let mut r = Ray::new(Vector3f::zero(), Vector3f::new(1.0, 0.0, 0.0));
        assert!(bvh.intersect(&mut r, |_, _| Some(1.0)).is_none());
        let mut visited = 0;
        bvh.visit_near(&Vector3f::zero(), 10.0, |_| visited += 1);
        assert_eq!(visited, 0);
    }

    proptest! {
        #[test]
        fn near_visits_every_box_in_range(x in -5.0..45.0f64, radius in 0.0..10.0f64) {
            let bounds = boxes(20);
            let bvh = BVHAccel::new(&bounds, 3, SplitMethod::Middle);
            let p = Vector3f::new(x, 0.5, 0.5);
            let mut visited = vec![];
            bvh.visit_near(&p, radius, |i| visited.push(i));
            for (i, b) in bounds.iter().enumerate() {
                if b.distance_squared(&p) <= radius * radius {
                    prop_assert!(visited.contains(&i));
                }
            }
        }
    }
}
