//! Boresight geometry

use cameras::Camera;
use render_core::common::*;
use render_core::geometry::*;
use render_core::metadata::Metadata;
use render_core::surface::*;

/// Geometry of the point where the camera boresight meets the model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoresightGeometry {
    /// Element hit by the boresight.
    pub element: ElementId,

    /// Body-fixed intersection point.
    pub point: Vector3f,

    /// Incidence angle in radians.
    pub incidence: Float,

    /// Emission angle in radians.
    pub emission: Float,

    /// Phase angle in radians.
    pub phase: Float,

    /// Distance from the camera in model units.
    pub range: Float,
}

impl BoresightGeometry {
    /// Intersects the boresight with a surface. Returns `None` if it misses.
    ///
    /// * `surface` - The global model.
    /// * `camera`  - The camera.
    /// * `sun`     - Body-fixed sun position.
    pub fn compute<S: SurfaceQuery + ?Sized>(surface: &S, camera: &Camera, sun: Option<Vector3f>) -> Option<Self> {
        let hit = surface.intersect(&camera.position, &camera.boresight())?;
        let normal = surface.element_info(hit.element).normal;
        let to_camera = camera.position - hit.point;
        let (incidence, phase) = sun.map_or((0.0, 0.0), |sun| (sun.angle(&normal), sun.angle(&to_camera)));
        Some(Self {
            element: hit.element,
            point: hit.point,
            incidence,
            emission: to_camera.angle(&normal),
            phase,
            range: to_camera.length(),
        })
    }

    /// Adds the `image.*` center point entries to the metadata.
    ///
    /// * `metadata`        - The metadata.
    /// * `ifov`            - Angular size of a pixel in radians.
    /// * `meters_per_unit` - Metres per model length unit.
    pub fn add_metadata(&self, metadata: &mut Metadata, ifov: Float, meters_per_unit: Float) {
        metadata.add("image.cell", "Index of center pixel cell", self.element.to_string());
        metadata.add("image.lat", "Center latitude", format_latitude(self.point.latitude()));
        metadata.add("image.lon", "Center longitude", format_east_longitude(self.point.longitude()));
        metadata.add(
            "image.inc",
            "Center incidence in degrees",
            format!("{:.2}", self.incidence.to_degrees()),
        );
        metadata.add(
            "image.ems",
            "Center emission in degrees (may not be zero if facet is tilted)",
            format!("{:.2}", self.emission.to_degrees()),
        );
        metadata.add("image.phs", "Center phase in degrees", format!("{:.2}", self.phase.to_degrees()));
        metadata.add(
            "image.range",
            "Center point range in m",
            format!("{:.3}", self.range * meters_per_unit),
        );
        metadata.add(
            "image.resolution",
            "Center point resolution in m/pixel",
            format!("{:.3}", ifov * self.range * meters_per_unit),
        );
    }
}

/// Formats a latitude as degrees with an N or S suffix.
///
/// * `lat` - Latitude in radians.
pub fn format_latitude(lat: Float) -> String {
    let deg = lat.to_degrees();
    format!("{:.2} {}", deg.abs(), if deg < 0.0 { 'S' } else { 'N' })
}

/// Formats a longitude as degrees east in [0, 360).
///
/// * `lon` - Longitude in radians.
pub fn format_east_longitude(lon: Float) -> String {
    format!("{:.2} E", lon.to_degrees().rem_euclid(360.0))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use accelerators::SmallBodyModel;
    use float_cmp::*;
    use shapes::TriangleMesh;

    #[test]
    fn angle_formats() {
        assert_eq!(format_latitude((-12.346_f64).to_radians()), "12.35 S");
        assert_eq!(format_latitude(0.5_f64.to_radians()), "0.50 N");
        assert_eq!(format_east_longitude((-90.0_f64).to_radians()), "270.00 E");
        assert_eq!(format_east_longitude(45.0_f64.to_radians()), "45.00 E");
    }

    #[test]
    fn boresight_on_a_plate() {
        // Plate facing +x at x = 1; camera on the +x axis looking back.
        let mesh = TriangleMesh::new(
            vec![
                Vector3f::new(1.0, -1.0, -1.0),
                Vector3f::new(1.0, 1.0, -1.0),
                Vector3f::new(1.0, 1.0, 1.0),
                Vector3f::new(1.0, -1.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let model = SmallBodyModel::new(mesh);

        let cx = Vector3f::new(0.0, 1.0, 0.0);
        let cy = Vector3f::new(0.0, 0.0, -1.0);
        let cz = Vector3f::new(-1.0, 0.0, 0.0);
        let camera = Camera::new(
            Vector3f::new(11.0, 0.1, 0.2),
            Rotation::from_rows(cx, cy, cz).inverse(),
            1e-4,
            10,
            10,
            1,
        )
        .unwrap();
        let sun = Vector3f::new(0.0, 1.0e8, 0.0);

        let geometry = BoresightGeometry::compute(&model, &camera, Some(sun)).unwrap();
        assert!(approx_eq!(f64, geometry.range, 10.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, geometry.emission, 0.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, geometry.incidence, PI_OVER_TWO, epsilon = 1e-12));
        assert!(approx_eq!(f64, geometry.phase, PI_OVER_TWO, epsilon = 1e-6));

        let mut metadata = Metadata::new();
        geometry.add_metadata(&mut metadata, camera.ifov, 1000.0);
        assert_eq!(metadata.get("image.range"), Some("10000.000"));
        assert_eq!(metadata.get("image.resolution"), Some("1.000"));
        assert_eq!(metadata.get("image.ems"), Some("0.00"));
        assert_eq!(metadata.get("image.inc"), Some("90.00"));
        assert_eq!(metadata.len(), 8);

        let behind = Camera::new(
            Vector3f::new(-11.0, 0.0, 0.0),
            Rotation::from_rows(cx, cy, cz).inverse(),
            1e-4,
            10,
            10,
            1,
        )
        .unwrap();
        assert!(BoresightGeometry::compute(&model, &behind, Some(sun)).is_none());
    }
}
