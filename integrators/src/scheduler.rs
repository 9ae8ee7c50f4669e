//! Parallel frame rendering

use crate::{select_surface, BrightnessEngine, ResolutionModelMap, SelectedSurface, WorkerContext};
use cameras::Camera;
use indicatif::ProgressBar;
use render_core::albedo::AlbedoOverride;
use render_core::common::*;
use render_core::error::Error;
use render_core::film::{FrameBuffer, PartialFrame, PixelBrightnessRecord};
use render_core::geometry::*;
use render_core::photometry::PhotometricLaw;
use render_core::surface::*;
use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Splits `[0, n_pixels)` into `n_workers` contiguous ranges. The last range
/// absorbs the remainder; with more workers than pixels some ranges are
/// empty.
///
/// * `n_pixels`  - Number of pixels.
/// * `n_workers` - Number of ranges.
pub fn partitions(n_pixels: usize, n_workers: usize) -> Vec<Range<usize>> {
    let n_workers = n_workers.max(1);
    (0..n_workers)
        .map(|k| {
            let start = k * n_pixels / n_workers;
            let end = if k + 1 == n_workers {
                n_pixels
            } else {
                (k + 1) * n_pixels / n_workers
            };
            start..end
        })
        .collect()
}

/// Renders a frame of a shape model as seen by a camera.
pub struct FrameRenderer<'a, S: SurfaceQuery + ?Sized, L: PhotometricLaw + ?Sized> {
    /// The camera.
    camera: &'a Camera,

    /// The global shape model.
    global: &'a S,

    /// The photometric law.
    law: &'a L,

    /// Body-fixed sun position.
    sun: Option<Vector3f>,

    /// Albedo multipliers for the global model.
    albedo: AlbedoOverride,

    /// Local models by resolution.
    local_models: ResolutionModelMap,

    /// Metres per model length unit.
    meters_per_unit: Float,
}

impl<'a, S: SurfaceQuery + ?Sized, L: PhotometricLaw + ?Sized> FrameRenderer<'a, S, L> {
    /// Create a new `FrameRenderer` with no sun, no albedo multipliers, no
    /// local models and kilometre model units.
    ///
    /// * `camera` - The camera.
    /// * `global` - The global shape model.
    /// * `law`    - The photometric law.
    pub fn new(camera: &'a Camera, global: &'a S, law: &'a L) -> Self {
        Self {
            camera,
            global,
            law,
            sun: None,
            albedo: AlbedoOverride::default(),
            local_models: ResolutionModelMap::new(),
            meters_per_unit: 1000.0,
        }
    }

    /// Sets the sun position.
    ///
    /// * `sun` - Body-fixed sun position.
    pub fn with_sun(mut self, sun: Option<Vector3f>) -> Self {
        self.sun = sun;
        self
    }

    /// Sets the albedo multipliers.
    ///
    /// * `albedo` - Multipliers for the global model.
    pub fn with_albedo(mut self, albedo: AlbedoOverride) -> Self {
        self.albedo = albedo;
        self
    }

    /// Sets the local models.
    ///
    /// * `local_models` - Local models by resolution.
    pub fn with_local_models(mut self, local_models: ResolutionModelMap) -> Self {
        self.local_models = local_models;
        self
    }

    /// Sets the model length unit.
    ///
    /// * `meters_per_unit` - Metres per model length unit.
    pub fn with_meters_per_unit(mut self, meters_per_unit: Float) -> Self {
        self.meters_per_unit = meters_per_unit;
        self
    }

    /// Renders one supersampled pixel. Returns `None` if the pixel misses the
    /// model.
    ///
    /// * `engine`  - Brightness engine.
    /// * `context` - The calling worker's context.
    /// * `index`   - Flattened supersampled pixel index.
    fn render_pixel(
        &self,
        engine: &BrightnessEngine<'_, L>,
        context: &mut WorkerContext,
        index: usize,
    ) -> Option<PixelBrightnessRecord> {
        let origin = self.camera.position;
        let direction = self.camera.pixel_direction(index);
        let hit = self.global.intersect(&origin, &direction)?;
        let gsd = self.camera.ground_sample_distance(&hit.point, self.meters_per_unit);

        let record = match select_surface(&self.local_models, context, &origin, &direction, &hit.point, gsd) {
            SelectedSurface::Local(model, local_hit) => engine.sample_local(model, self.global, &local_hit),
            SelectedSurface::Global => engine.sample(self.global, &hit),
        };
        Some(record)
    }

    /// Renders a range of supersampled pixels into a private partial frame.
    ///
    /// * `pixels`   - The pixel range.
    /// * `progress` - Advanced once per completed pixel row.
    pub fn render_partition(&self, pixels: Range<usize>, progress: &ProgressBar) -> PartialFrame {
        let engine = BrightnessEngine::new(self.camera.position, self.camera.ifov, self.sun, &self.albedo, self.law);
        let mut context = WorkerContext::new();
        let width = self.camera.supersampled_width();

        let mut partial = PartialFrame::new();
        for index in pixels {
            if let Some(record) = self.render_pixel(&engine, &mut context, index) {
                partial.insert(index, record);
            }
            if (index + 1) % width == 0 {
                progress.inc(1);
            }
        }
        partial
    }

    /// Renders the frame using `n_workers` threads, one contiguous range of
    /// pixels per worker. A worker that panics loses only its own pixels.
    ///
    /// * `n_workers` - Number of worker threads.
    /// * `progress`  - Progress bar with one step per supersampled row.
    pub fn render(&self, n_workers: usize, progress: &ProgressBar) -> FrameBuffer {
        let n_workers = n_workers.max(1);
        let n_pixels = self.camera.pixel_count();
        info!("Rendering {} pixels with {} workers", n_pixels, n_workers);
        progress.set_message("Rendering");

        let mut partials: Vec<PartialFrame> = Vec::with_capacity(n_workers);
        thread::scope(|scope| {
            let (tx_worker, rx_worker) = crossbeam_channel::bounded::<(usize, Range<usize>)>(n_workers);
            let (tx_collector, rx_collector) = crossbeam_channel::bounded::<PartialFrame>(n_workers);

            // Spawn worker threads.
            for _ in 0..n_workers {
                let rx_worker = rx_worker.clone();
                let tx_collector = tx_collector.clone();
                scope.spawn(move || {
                    for (worker, pixels) in rx_worker.iter() {
                        info!("Worker {}: starting pixels {}..{}", worker, pixels.start, pixels.end);
                        let result =
                            panic::catch_unwind(AssertUnwindSafe(|| self.render_partition(pixels.clone(), progress)));
                        match result {
                            Ok(partial) => {
                                info!("Worker {}: finished with {} pixels", worker, partial.len());
                                if tx_collector.send(partial).is_err() {
                                    error!("Worker {}: result dropped", worker);
                                }
                            }
                            Err(payload) => {
                                let message = panic_message(payload.as_ref());
                                error!("{}; pixels {}..{} missing", Error::Worker { worker, message }, pixels.start, pixels.end);
                            }
                        }
                    }
                });
            }
            drop(rx_worker); // Drop extra since we've cloned one for each woker.
            drop(tx_collector);

            // Send work.
            for (worker, pixels) in partitions(n_pixels, n_workers).into_iter().enumerate() {
                if tx_worker.send((worker, pixels)).is_err() {
                    error!("No workers left to render partition {}", worker);
                }
            }
            drop(tx_worker);

            partials.extend(rx_collector.iter());
        });

        // Merge after every worker has finished.
        let mut frame = FrameBuffer::new(self.camera.supersampled_width(), self.camera.supersampled_height());
        for partial in partials {
            frame.merge(partial);
        }
        progress.finish_with_message("Render complete");

        info!("{} pixels hit the model, max brightness {}", frame.len(), frame.max_brightness());
        frame
    }
}

/// Returns the message carried by a panic payload.
///
/// * `payload` - The payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
