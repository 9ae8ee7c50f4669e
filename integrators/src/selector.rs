//! Resolution-keyed model selection

use accelerators::SmallBodyModel;
use render_core::common::*;
use render_core::error::{Error, Result};
use render_core::fileutil::{data_lines, resolve_sibling};
use render_core::geometry::*;
use render_core::surface::*;
use shapes::ModelTransform;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A local shape model patch and the body-fixed direction of its center.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalModelPatch {
    /// Unit vector toward the patch center.
    pub center: Vector3f,

    /// Model file.
    pub path: PathBuf,
}

/// Local shape model patches that share an alignment transform.
#[derive(Clone, Debug, Default)]
pub struct LocalModelCollection {
    /// The patches.
    patches: Vec<LocalModelPatch>,

    /// Alignment applied to every patch when it is loaded.
    transform: ModelTransform,
}

impl LocalModelCollection {
    /// Maximum angle between a point and the center of a patch that may
    /// cover it.
    pub const SEARCH_ANGLE: Float = PI_OVER_FOUR;

    /// Creates an empty collection.
    ///
    /// * `transform` - Alignment applied to every patch.
    pub fn new(transform: ModelTransform) -> Self {
        Self {
            patches: vec![],
            transform,
        }
    }

    /// Adds a patch.
    ///
    /// * `lat`  - Latitude of the patch center in degrees.
    /// * `lon`  - Longitude of the patch center in degrees.
    /// * `path` - Model file.
    pub fn add<P: Into<PathBuf>>(&mut self, lat: Float, lon: Float, path: P) {
        self.patches.push(LocalModelPatch {
            center: Vector3f::from_lat_lon(lat.to_radians(), lon.to_radians()),
            path: path.into(),
        });
    }

    /// Returns the number of patches.
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Returns true if there are no patches.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Returns the alignment applied to every patch.
    pub fn transform(&self) -> &ModelTransform {
        &self.transform
    }

    /// Returns the patches whose centers are within `SEARCH_ANGLE` of the
    /// direction of `point`, closest first.
    ///
    /// * `point` - Body-fixed point.
    pub fn candidates(&self, point: &Vector3f) -> Vec<&LocalModelPatch> {
        let mut found: Vec<(Float, &LocalModelPatch)> = self
            .patches
            .iter()
            .map(|patch| (patch.center.angle(point), patch))
            .filter(|(angle, _)| *angle < Self::SEARCH_ANGLE)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, patch)| patch).collect()
    }

    /// Reads a local model catalog. The first data line is the resolution
    /// threshold in meters per pixel; each following line is
    /// `lat, lon, path` with angles in degrees. Relative paths are resolved
    /// against the catalog's directory.
    ///
    /// * `path`      - Catalog file.
    /// * `transform` - Alignment applied to every patch.
    pub fn from_catalog<P: AsRef<Path>>(path: P, transform: ModelTransform) -> Result<(Float, Self)> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::parse_catalog(&text, path, transform)
    }

    /// Parses a local model catalog. See `from_catalog`.
    ///
    /// * `text`      - Catalog contents.
    /// * `path`      - Catalog file, used for messages and relative paths.
    /// * `transform` - Alignment applied to every patch.
    pub fn parse_catalog<P: AsRef<Path>>(
        text: &str,
        path: P,
        transform: ModelTransform,
    ) -> Result<(Float, Self)> {
        let path = path.as_ref();
        let mut lines = data_lines(text).into_iter();

        let (line_no, line) = lines
            .next()
            .ok_or_else(|| Error::parse(path, 0, "missing resolution threshold"))?;
        let threshold: Float = line
            .parse()
            .map_err(|_| Error::parse(path, line_no, format!("invalid resolution '{line}'")))?;

        let mut collection = Self::new(transform);
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.splitn(3, ',').map(str::trim).collect();
            if fields.len() != 3 || fields[2].is_empty() {
                return Err(Error::parse(path, line_no, "expected 'lat, lon, filename'"));
            }
            let lat: Float = fields[0]
                .parse()
                .map_err(|_| Error::parse(path, line_no, format!("invalid latitude '{}'", fields[0])))?;
            let lon: Float = fields[1]
                .parse()
                .map_err(|_| Error::parse(path, line_no, format!("invalid longitude '{}'", fields[1])))?;
            collection.add(lat, lon, resolve_sibling(fields[2], path));
        }

        info!(
            "Read {} local models for resolution {} m/pixel from {}",
            collection.len(),
            threshold,
            path.display()
        );
        Ok((threshold, collection))
    }
}

/// Local model collections keyed by the coarsest ground sample distance
/// (m/pixel) they should be used for. Thresholds are strictly increasing.
#[derive(Clone, Debug, Default)]
pub struct ResolutionModelMap {
    entries: Vec<(Float, LocalModelCollection)>,
}

impl ResolutionModelMap {
    /// Creates an empty map. Every lookup falls back to the global model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collection.
    ///
    /// * `threshold`  - Resolution in m/pixel; must be positive and unique.
    /// * `collection` - The local models.
    pub fn insert(&mut self, threshold: Float, collection: LocalModelCollection) -> Result<()> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(Error::Config(format!("resolution threshold {threshold} must be positive")));
        }
        match self.entries.binary_search_by(|(t, _)| t.total_cmp(&threshold)) {
            Ok(_) => Err(Error::Config(format!(
                "more than one local model catalog for resolution {threshold}"
            ))),
            Err(pos) => {
                self.entries.insert(pos, (threshold, collection));
                Ok(())
            }
        }
    }

    /// Returns the number of collections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no collections.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the collection with the smallest threshold not below `gsd`.
    ///
    /// * `gsd` - Ground sample distance in m/pixel.
    pub fn lookup(&self, gsd: Float) -> Option<(Float, &LocalModelCollection)> {
        let pos = self.entries.partition_point(|(t, _)| *t < gsd);
        self.entries.get(pos).map(|(t, c)| (*t, c))
    }
}

/// State private to one render worker. Local models are loaded on first use
/// and kept for the rest of the frame; models that fail to load are
/// remembered so they are not retried.
#[derive(Default)]
pub struct WorkerContext {
    local_models: HashMap<PathBuf, Option<SmallBodyModel>>,
}

impl WorkerContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of local models loaded or attempted.
    pub fn cached(&self) -> usize {
        self.local_models.len()
    }

    /// Returns a local model, loading it if needed.
    ///
    /// * `patch`     - The patch.
    /// * `transform` - Alignment applied on load.
    fn local_model(&mut self, patch: &LocalModelPatch, transform: &ModelTransform) -> Option<&SmallBodyModel> {
        self.local_models
            .entry(patch.path.clone())
            .or_insert_with(|| match SmallBodyModel::from_file(&patch.path, transform) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!("Unable to load local model {}: {}", patch.path.display(), e);
                    None
                }
            })
            .as_ref()
    }

    /// Returns the local model covering a point: the first candidate patch
    /// hit by the ray from the body origin through the point.
    ///
    /// * `collection` - The local models.
    /// * `point`      - Body-fixed point on the global model.
    pub fn covering_model(&mut self, collection: &LocalModelCollection, point: &Vector3f) -> Option<&SmallBodyModel> {
        let ray = Ray::with_t_max(Vector3f::zero(), *point, 2.0);
        let covering = collection.candidates(point).into_iter().find(|patch| {
            self.local_model(patch, collection.transform())
                .map_or(false, |model| model.intersect_ray(&ray).is_some())
        })?;
        self.local_model(covering, collection.transform())
    }
}

/// The surface a pixel is sampled on.
pub enum SelectedSurface<'a> {
    /// The global model.
    Global,

    /// A local model with the camera ray's intersection on it.
    Local(&'a SmallBodyModel, SurfaceHit),
}

/// Chooses the surface to sample for a camera ray that hit the global model.
///
/// * `map`             - Local models by resolution.
/// * `context`         - The calling worker's context.
/// * `origin`          - Camera position.
/// * `direction`       - Camera ray direction.
/// * `global_point`    - Intersection with the global model.
/// * `gsd`             - Ground sample distance at `global_point` in m/pixel.
pub fn select_surface<'a>(
    map: &ResolutionModelMap,
    context: &'a mut WorkerContext,
    origin: &Vector3f,
    direction: &Vector3f,
    global_point: &Vector3f,
    gsd: Float,
) -> SelectedSurface<'a> {
    let Some((threshold, collection)) = map.lookup(gsd) else {
        return SelectedSurface::Global;
    };
    let Some(model) = context.covering_model(collection, global_point) else {
        debug!(
            "No local model at {} for resolution {}, using global model",
            global_point, threshold
        );
        return SelectedSurface::Global;
    };
    match model.intersect(origin, direction) {
        Some(hit) => SelectedSurface::Local(model, hit),
        None => {
            debug!(
                "No intersection with local model at {}, using global intersection",
                global_point
            );
            SelectedSurface::Global
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
