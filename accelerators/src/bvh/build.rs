//! Recursive BVH construction

use super::common::*;
use render_core::geometry::*;

/// Recursively build the BVH structure using the Middle or EqualCounts
/// algorithm.
///
/// * `split_method`      - Middle|EqualCounts
/// * `max_prims_in_node` - Maximum number of primitives in a leaf.
/// * `primitive_info`    - Primitive information.
/// * `start`             - Starting index.
/// * `end`               - Ending index (exclusive).
/// * `total_nodes`       - Used to return total number of nodes.
/// * `ordered_prims`     - Used to return the primitive numbers ordered such
///                         that primitives in leaf nodes occupy contiguous
///                         ranges.
pub fn recursive_build(
    split_method: SplitMethod,
    max_prims_in_node: usize,
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    total_nodes: &mut usize,
    ordered_prims: &mut Vec<usize>,
) -> BVHBuildNode {
    // Compute bounds of all primitives in BVH node.
    let bounds = primitive_info[start..end]
        .iter()
        .fold(Bounds3f::EMPTY, |b, pi| b.union(&pi.bounds));

    let n_primitives = end - start;
    *total_nodes += 1;

    // Compute bound of primitive centroids, choose split dimension dim.
    let centroid_bounds = primitive_info[start..end]
        .iter()
        .fold(Bounds3f::EMPTY, |b, pi| b.union_point(&pi.centroid));
    let dim = centroid_bounds.maximum_extent();

    let interior_midpoint = if n_primitives <= max_prims_in_node
        || centroid_bounds.p_max[dim] == centroid_bounds.p_min[dim]
    {
        None
    } else {
        match split_method {
            SplitMethod::Middle => Some(split_middle(primitive_info, start, end, dim, &centroid_bounds)),
            SplitMethod::EqualCounts => Some(split_equal_counts(primitive_info, start, end, dim)),
        }
    };

    match interior_midpoint {
        Some(mid) => {
            let c0 = recursive_build(
                split_method,
                max_prims_in_node,
                primitive_info,
                start,
                mid,
                total_nodes,
                ordered_prims,
            );
            let c1 = recursive_build(
                split_method,
                max_prims_in_node,
                primitive_info,
                mid,
                end,
                total_nodes,
                ordered_prims,
            );
            BVHBuildNode::interior(dim, c0, c1)
        }
        None => {
            // Create leaf BVHBuildNode.
            let first_prim_offset = ordered_prims.len();
            ordered_prims.extend(primitive_info[start..end].iter().map(|pi| pi.primitive_number));
            BVHBuildNode::leaf(first_prim_offset, n_primitives, bounds)
        }
    }
}

/// Partitions primitives about the midpoint of the centroid bounds.
///
/// * `primitive_info`  - Vector containing all primitive info.
/// * `start`           - Start index in primitive_info.
/// * `end`             - End index in primitive_info (exclusive).
/// * `dim`             - Axis used to partition primitives.
/// * `centroid_bounds` - Bounding box of primitive centroids from start to end.
fn split_middle(
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    dim: Axis,
    centroid_bounds: &Bounds3f,
) -> usize {
    let pmid = (centroid_bounds.p_min[dim] + centroid_bounds.p_max[dim]) / 2.0;

    let mut mid = start;
    for i in start..end {
        if primitive_info[i].centroid[dim] < pmid {
            primitive_info.swap(i, mid);
            mid += 1;
        }
    }

    if mid != start && mid != end {
        mid
    } else {
        // Lots of prims with large overlapping bounding boxes, this may fail
        // to partition; in that case use EqualCounts.
        split_equal_counts(primitive_info, start, end, dim)
    }
}

/// Partition primitives into equally sized subsets such that the first half
/// of the primitives have smallest centroid coordinate values along the
/// chosen axis, and second have have the largest centroid coordinate values.
///
/// * `primitive_info`  - Vector containing all primitive info.
/// * `start`           - Start index in primitive_info.
/// * `end`             - End index in primitive_info (exclusive).
/// * `dim`             - Axis used to partition primitives.
fn split_equal_counts(primitive_info: &mut [BVHPrimitiveInfo], start: usize, end: usize, dim: Axis) -> usize {
    let mid = (start + end) / 2;
    primitive_info[start..end].select_nth_unstable_by(mid - start, |a, b| a.centroid[dim].total_cmp(&b.centroid[dim]));
    mid
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn infos(n: usize) -> Vec<BVHPrimitiveInfo> {
        (0..n)
            .map(|i| {
                let x = (n - i) as f64;
                BVHPrimitiveInfo::new(i, Bounds3f::new(Vector3f::new(x, 0.0, 0.0), Vector3f::new(x + 0.5, 1.0, 1.0)))
            })
            .collect()
    }

    #[test]
    fn every_primitive_in_one_leaf() {
        for method in [SplitMethod::Middle, SplitMethod::EqualCounts] {
            let mut info = infos(37);
            let mut total_nodes = 0;
            let mut ordered = vec![];
            let root = recursive_build(method, 4, &mut info, 0, 37, &mut total_nodes, &mut ordered);
            let mut sorted = ordered.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..37).collect::<Vec<_>>());
            assert!(total_nodes > 1);
            assert!(root.children.is_some());
            assert_eq!(root.bounds.p_min.x, 1.0);
        }
    }

    #[test]
    fn coincident_centroids_make_a_leaf() {
        let b = Bounds3f::new(Vector3f::zero(), Vector3f::new(1.0, 1.0, 1.0));
        let mut info: Vec<_> = (0..10).map(|i| BVHPrimitiveInfo::new(i, b)).collect();
        let mut total_nodes = 0;
        let mut ordered = vec![];
        let root = recursive_build(SplitMethod::Middle, 4, &mut info, 0, 10, &mut total_nodes, &mut ordered);
        assert_eq!(total_nodes, 1);
        assert_eq!(root.n_primitives, 10);
    }
}
