//! Surface queries

use crate::common::Float;
use crate::geometry::Vector3f;
use std::collections::BTreeSet;

/// Identifier of a surface element (a facet of the shape model).
pub type ElementId = usize;

/// The nearest element hit by a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceHit {
    /// The element that was hit.
    pub element: ElementId,

    /// Body-fixed intersection point.
    pub point: Vector3f,
}

/// Geometry of a single surface element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElementInfo {
    /// Body-fixed center of the element.
    pub center: Vector3f,

    /// Outward unit normal.
    pub normal: Vector3f,
}

/// Read-only queries against a surface representation. Implementations are
/// immutable once built and are shared by reference between render workers.
pub trait SurfaceQuery: Send + Sync {
    /// Returns the nearest element hit by the ray from `origin` along
    /// `direction`, or `None` if the ray misses the surface.
    ///
    /// * `origin`    - Ray origin.
    /// * `direction` - Ray direction; need not be normalized.
    fn intersect(&self, origin: &Vector3f, direction: &Vector3f) -> Option<SurfaceHit>;

    /// Returns the center and outward normal of an element.
    ///
    /// * `element` - The element.
    fn element_info(&self, element: ElementId) -> ElementInfo;

    /// Returns the elements whose centers lie within `radius` of `point`,
    /// in ascending id order.
    ///
    /// * `point`  - Query point.
    /// * `radius` - Query radius.
    fn elements_within_radius(&self, point: &Vector3f, radius: Float) -> BTreeSet<ElementId>;
}
