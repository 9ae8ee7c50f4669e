//! Photometric brightness

use render_core::albedo::AlbedoOverride;
use render_core::common::*;
use render_core::film::PixelBrightnessRecord;
use render_core::geometry::*;
use render_core::photometry::PhotometricLaw;
use render_core::surface::*;

/// Contribution of a shadowed element so shadowed pixels stay distinct from
/// pixels with no data.
pub const SHADOW_FLOOR: Float = 0.001;

/// Largest emission angle used when sizing the pixel footprint.
const MAX_FOOTPRINT_EMISSION: Float = PI / 3.0;

/// Computes the brightness of a pixel by averaging the photometric response
/// of every surface element inside the pixel footprint.
pub struct BrightnessEngine<'a, L: PhotometricLaw + ?Sized> {
    /// Body-fixed camera position.
    camera: Vector3f,

    /// Angular size of a native pixel in radians.
    ifov: Float,

    /// Body-fixed sun position.
    sun: Option<Vector3f>,

    /// Per element albedo multipliers for the global model.
    albedo: &'a AlbedoOverride,

    /// The photometric law.
    law: &'a L,
}

impl<'a, L: PhotometricLaw + ?Sized> BrightnessEngine<'a, L> {
    /// Create a new `BrightnessEngine`.
    ///
    /// * `camera` - Body-fixed camera position.
    /// * `ifov`   - Angular size of a pixel in radians.
    /// * `sun`    - Body-fixed sun position, if known.
    /// * `albedo` - Albedo multipliers for the global model.
    /// * `law`    - The photometric law.
    pub fn new(camera: Vector3f, ifov: Float, sun: Option<Vector3f>, albedo: &'a AlbedoOverride, law: &'a L) -> Self {
        Self {
            camera,
            ifov,
            sun,
            albedo,
            law,
        }
    }

    /// Returns the footprint diameter of a pixel at the given range and
    /// emission angle.
    ///
    /// * `range`    - Distance from the camera.
    /// * `emission` - Emission angle in radians.
    pub fn footprint(&self, range: Float, emission: Float) -> Float {
        let cos_e = min(MAX_FOOTPRINT_EMISSION, emission).cos().abs();
        self.ifov * range / max(cos_e, MACHINE_EPSILON)
    }

    /// Samples the brightness at an intersection with the global model.
    /// Albedo multipliers apply.
    ///
    /// * `surface` - The global model.
    /// * `hit`     - The intersection.
    pub fn sample<S: SurfaceQuery + ?Sized>(&self, surface: &S, hit: &SurfaceHit) -> PixelBrightnessRecord {
        self.integrate::<S, S>(surface, None, hit, true)
    }

    /// Samples the brightness at an intersection with a local model. Albedo
    /// multipliers do not apply. An element of the patch is lit only if the
    /// global model does not block the sun either.
    ///
    /// * `patch`  - The local model that was hit.
    /// * `global` - The global model.
    /// * `hit`    - The intersection with `patch`.
    pub fn sample_local<P, G>(&self, patch: &P, global: &G, hit: &SurfaceHit) -> PixelBrightnessRecord
    where
        P: SurfaceQuery + ?Sized,
        G: SurfaceQuery + ?Sized,
    {
        self.integrate(patch, Some(global), hit, false)
    }

    /// Averages the photometric response over the footprint of `hit`.
    ///
    /// * `surface`      - The surface that was hit.
    /// * `occluder`     - Another surface that may shadow `surface`.
    /// * `hit`          - The intersection.
    /// * `apply_albedo` - Whether albedo multipliers apply to `surface`.
    fn integrate<S, G>(
        &self,
        surface: &S,
        occluder: Option<&G>,
        hit: &SurfaceHit,
        apply_albedo: bool,
    ) -> PixelBrightnessRecord
    where
        S: SurfaceQuery + ?Sized,
        G: SurfaceQuery + ?Sized,
    {
        let to_camera = self.camera - hit.point;
        let normal = surface.element_info(hit.element).normal;
        let range = to_camera.length();
        let footprint = self.footprint(range, to_camera.angle(&normal));

        let mut neighbors = surface.elements_within_radius(&hit.point, footprint / 2.0);
        neighbors.insert(hit.element);

        let mut sum = 0.0;
        let (mut incidence, mut emission, mut phase) = (0.0, 0.0, 0.0);
        let mut shadowed = 0;
        for &element in neighbors.iter() {
            let info = surface.element_info(element);
            let to_camera = self.camera - info.center;
            emission = to_camera.angle(&info.normal);
            incidence = 0.0;
            phase = 0.0;

            if let Some(sun) = self.sun {
                incidence = sun.angle(&info.normal);
                phase = to_camera.angle(&sun);

                let lit = surface
                    .intersect(&sun, &(info.center - sun))
                    .map_or(false, |h| h.element == element)
                    && !occluder.map_or(false, |g| occludes(g, &sun, &info.center, footprint));
                if !lit {
                    sum += SHADOW_FLOOR;
                    shadowed += 1;
                    continue;
                }
            }

            let albedo = if apply_albedo { self.albedo.get(element) } else { 1.0 };
            sum += albedo * self.law.value(incidence.cos(), emission.cos(), phase.to_degrees());
        }

        let brightness = sum / neighbors.len() as Float;
        trace!(
            "{} lat/lon {:.2}/{:.2}: {} elements, {} shadowed, brightness {}",
            hit.element,
            hit.point.latitude().to_degrees(),
            hit.point.longitude().to_degrees(),
            neighbors.len(),
            shadowed,
            brightness
        );

        PixelBrightnessRecord {
            brightness,
            incidence,
            emission,
            phase,
            range,
            facet: hit.point,
            normal,
        }
    }
}

/// Returns `true` if `occluder` is hit by the ray from the sun toward
/// `center` more than `tolerance` before reaching `center`.
///
/// * `occluder`  - The occluding surface.
/// * `sun`       - Body-fixed sun position.
/// * `center`    - The point that may be shadowed.
/// * `tolerance` - Distance along the ray within which hits are ignored.
fn occludes<G: SurfaceQuery + ?Sized>(occluder: &G, sun: &Vector3f, center: &Vector3f, tolerance: Float) -> bool {
    let to_center = *center - *sun;
    occluder
        .intersect(sun, &to_center)
        .map_or(false, |h| h.point.distance(sun) < to_center.length() - tolerance)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use render_core::photometry::PhotometricFunction;
    use std::collections::BTreeSet;

    /// Horizontal unit squares at the given heights, two triangles each,
    /// with upward normals. Ray tests are exact for axis-aligned rays.
    struct Plates {
        plates: Vec<(Float, Float)>,
    }

    impl Plates {
        fn element_count(&self) -> usize {
            self.plates.len()
        }
    }

    impl SurfaceQuery for Plates {
        fn intersect(&self, origin: &Vector3f, direction: &Vector3f) -> Option<SurfaceHit> {
            self.plates
                .iter()
                .enumerate()
                .filter_map(|(i, (z, half))| {
                    let t = (z - origin.z) / direction.z;
                    let p = *origin + *direction * t;
                    (t > 0.0 && p.x.abs() <= *half && p.y.abs() <= *half).then_some((i, t, p))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(element, _, point)| SurfaceHit { element, point })
        }

        fn element_info(&self, element: ElementId) -> ElementInfo {
            ElementInfo {
                center: Vector3f::new(0.0, 0.0, self.plates[element].0),
                normal: Vector3f::new(0.0, 0.0, 1.0),
            }
        }

        fn elements_within_radius(&self, point: &Vector3f, radius: Float) -> BTreeSet<ElementId> {
            (0..self.element_count())
                .filter(|i| self.element_info(*i).center.distance(point) <= radius)
                .collect()
        }
    }

    #[test]
    fn flat_plate_with_overhead_sun() {
        let plates = Plates { plates: vec![(0.0, 1.0)] };
        let albedo = AlbedoOverride::default();
        let law = PhotometricFunction::LommelSeeliger;
        let sun = Vector3f::new(0.0, 0.0, 1e8);
        let engine = BrightnessEngine::new(Vector3f::new(0.0, 0.0, 10.0), 1e-3, Some(sun), &albedo, &law);

        let hit = plates
            .intersect(&Vector3f::new(0.0, 0.0, 10.0), &Vector3f::new(0.0, 0.0, -1.0))
            .unwrap();
        let record = engine.sample(&plates, &hit);
        assert!(approx_eq!(f64, record.brightness, law.value(1.0, 1.0, 0.0), ulps = 4));
        assert_eq!(record.incidence, 0.0);
        assert_eq!(record.emission, 0.0);
        assert_eq!(record.phase, 0.0);
        assert_eq!(record.range, 10.0);
        assert_eq!(record.normal, Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn occluded_plate_gets_shadow_floor() {
        // Plate 1 above plate 0 blocks the sun. The camera looks at plate 0
        // from below the occluder.
        let plates = Plates {
            plates: vec![(0.0, 1.0), (5.0, 2.0)],
        };
        let albedo = AlbedoOverride::default();
        let law = PhotometricFunction::LommelSeeliger;
        let camera = Vector3f::new(0.0, 0.0, 2.0);
        let engine = BrightnessEngine::new(camera, 1e-3, Some(Vector3f::new(0.0, 0.0, 1e8)), &albedo, &law);

        let hit = plates.intersect(&camera, &Vector3f::new(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(hit.element, 0);
        let record = engine.sample(&plates, &hit);
        assert_eq!(record.brightness, SHADOW_FLOOR);
    }

    #[test]
    fn no_sun_means_no_shadows() {
        let plates = Plates {
            plates: vec![(0.0, 1.0), (5.0, 2.0)],
        };
        let albedo = AlbedoOverride::default();
        let law = PhotometricFunction::Lunar;
        let camera = Vector3f::new(0.0, 0.0, 2.0);
        let engine = BrightnessEngine::new(camera, 1e-3, None, &albedo, &law);

        let hit = plates.intersect(&camera, &Vector3f::new(0.0, 0.0, -1.0)).unwrap();
        let record = engine.sample(&plates, &hit);
        assert!(approx_eq!(f64, record.brightness, law.value(1.0, 1.0, 0.0), ulps = 4));
    }

    #[test]
    fn albedo_only_on_global_model() {
        let plates = Plates { plates: vec![(0.0, 1.0)] };
        let mut albedo = AlbedoOverride::default();
        albedo.insert(0, 0.5);
        let law = |cos_i: Float, _cos_e: Float, _phase: Float| cos_i;
        let camera = Vector3f::new(0.0, 0.0, 3.0);
        let engine = BrightnessEngine::new(camera, 1e-3, None, &albedo, &law);

        let hit = plates.intersect(&camera, &Vector3f::new(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(engine.sample(&plates, &hit).brightness, 0.5);
        assert_eq!(engine.sample_local(&plates, &Plates { plates: vec![] }, &hit).brightness, 1.0);

        let empty = AlbedoOverride::default();
        let engine = BrightnessEngine::new(camera, 1e-3, None, &empty, &law);
        assert_eq!(engine.sample(&plates, &hit).brightness, 1.0);
    }

    #[test]
    fn global_model_shadows_local_patch() {
        let patch = Plates { plates: vec![(0.0, 1.0)] };
        let albedo = AlbedoOverride::default();
        let law = PhotometricFunction::LommelSeeliger;
        let camera = Vector3f::new(0.0, 0.0, 2.0);
        let engine = BrightnessEngine::new(camera, 1e-3, Some(Vector3f::new(0.0, 0.0, 1e8)), &albedo, &law);
        let hit = patch.intersect(&camera, &Vector3f::new(0.0, 0.0, -1.0)).unwrap();
        let lit = law.value(1.0, 1.0, 0.0);

        // The patch alone is lit.
        assert!(approx_eq!(f64, engine.sample(&patch, &hit).brightness, lit, ulps = 4));

        // Global terrain above the camera blocks the sun.
        let occluded = Plates {
            plates: vec![(0.0, 1.0), (5.0, 2.0)],
        };
        assert_eq!(engine.sample_local(&patch, &occluded, &hit).brightness, SHADOW_FLOOR);

        // Global surface within a footprint of the patch does not shadow it.
        let coincident = Plates { plates: vec![(0.0005, 1.0)] };
        assert!(approx_eq!(
            f64,
            engine.sample_local(&patch, &coincident, &hit).brightness,
            lit,
            ulps = 4
        ));

        let above = Plates { plates: vec![(0.01, 1.0)] };
        assert_eq!(engine.sample_local(&patch, &above, &hit).brightness, SHADOW_FLOOR);
    }

    #[test]
    fn footprint_is_clamped_at_the_limb() {
        let albedo = AlbedoOverride::default();
        let law = PhotometricFunction::default();
        let engine = BrightnessEngine::new(Vector3f::zero(), 0.01, None, &albedo, &law);
        assert!(approx_eq!(f64, engine.footprint(100.0, 0.0), 1.0, ulps = 4));
        assert!(approx_eq!(f64, engine.footprint(100.0, PI_OVER_TWO), 2.0, epsilon = 1e-12));
        assert_eq!(engine.footprint(100.0, PI_OVER_TWO), engine.footprint(100.0, PI));
    }
}
