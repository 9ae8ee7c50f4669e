//! Camera Ray Model

use render_core::common::*;
use render_core::error::{Error, Result};
use render_core::geometry::*;

/// A framing camera with square pixels of constant angular size. Pixel
/// `(0, 0)` is the upper left corner with x increasing to the right and y
/// increasing down.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Body-fixed camera position.
    pub position: Vector3f,

    /// Rotation from the camera frame to the body-fixed frame.
    pub camera_to_body: Rotation,

    /// Angular size of a pixel in radians.
    pub ifov: Float,

    /// Native width in pixels.
    pub width: usize,

    /// Native height in pixels.
    pub height: usize,

    /// Supersampling factor along each axis.
    pub sub_pixel: usize,

    /// Native pixel x-coordinate of the boresight.
    center_x: Float,

    /// Native pixel y-coordinate of the boresight.
    center_y: Float,
}

impl Camera {
    /// Creates a new camera, rejecting geometry that would produce
    /// directions outside the unit hemisphere.
    ///
    /// * `position`       - Body-fixed camera position.
    /// * `camera_to_body` - Rotation from camera to body-fixed frame.
    /// * `ifov`           - Angular size of a pixel in radians.
    /// * `width`          - Native width in pixels.
    /// * `height`         - Native height in pixels.
    /// * `sub_pixel`      - Supersampling factor.
    pub fn new(
        position: Vector3f,
        camera_to_body: Rotation,
        ifov: Float,
        width: usize,
        height: usize,
        sub_pixel: usize,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Config(format!("image size {width}x{height} is empty")));
        }
        if sub_pixel == 0 {
            return Err(Error::Config("sub-pixel factor must be at least 1".to_string()));
        }
        if !ifov.is_finite() || ifov <= 0.0 {
            return Err(Error::Config(format!("ifov {ifov} must be positive")));
        }
        if position.has_nans() {
            return Err(Error::Config(format!("camera position {position} is not finite")));
        }

        let camera = Self {
            position,
            camera_to_body,
            ifov,
            width,
            height,
            sub_pixel,
            center_x: 0.5 * (width as Float - 1.0),
            center_y: 0.5 * (height as Float - 1.0),
        };

        if ifov * camera.center_x.max(camera.center_y) >= PI_OVER_TWO {
            return Err(Error::Config(format!(
                "field of view {:.3} degrees reaches past 90 degrees from the boresight",
                (ifov * camera.center_x.max(camera.center_y)).to_degrees()
            )));
        }

        // The last supersampled pixel lies a fraction of a pixel past the
        // native edge, so test the farthest corner actually queried.
        let last_x = (camera.supersampled_width() - 1) as Float / sub_pixel as Float;
        let last_y = (camera.supersampled_height() - 1) as Float / sub_pixel as Float;
        let dx = camera.center_x.max(last_x - camera.center_x);
        let dy = camera.center_y.max(last_y - camera.center_y);
        let (sx, sy) = ((ifov * dx).sin(), (ifov * dy).sin());
        if ifov * dx >= PI_OVER_TWO || ifov * dy >= PI_OVER_TWO || sx * sx + sy * sy > 1.0 {
            return Err(Error::Config(format!(
                "pixel grid {width}x{height} with ifov {ifov} does not fit in the image hemisphere"
            )));
        }

        debug!(
            "Camera at {} with ifov {} rad, {}x{} pixels, sub-pixel {}",
            position, ifov, width, height, sub_pixel
        );
        Ok(camera)
    }

    /// Returns the body-fixed unit look direction of a (possibly fractional)
    /// native pixel coordinate.
    ///
    /// * `ix` - Pixel x-coordinate.
    /// * `iy` - Pixel y-coordinate.
    pub fn direction(&self, ix: Float, iy: Float) -> Vector3f {
        let x = (self.ifov * (ix - self.center_x)).sin();
        let y = (self.ifov * (iy - self.center_y)).sin();
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        self.camera_to_body.apply(&Vector3f::new(x, y, z))
    }

    /// Returns the boresight direction.
    pub fn boresight(&self) -> Vector3f {
        self.camera_to_body.column(2)
    }

    /// Returns the supersampled width.
    pub fn supersampled_width(&self) -> usize {
        self.width * self.sub_pixel
    }

    /// Returns the supersampled height.
    pub fn supersampled_height(&self) -> usize {
        self.height * self.sub_pixel
    }

    /// Returns the number of supersampled pixels.
    pub fn pixel_count(&self) -> usize {
        self.supersampled_width() * self.supersampled_height()
    }

    /// Returns the supersampled `(i, j)` coordinates of a flattened index.
    ///
    /// * `index` - Flattened index `j * width + i`.
    pub fn pixel_coordinates(&self, index: usize) -> (usize, usize) {
        let w = self.supersampled_width();
        (index % w, index / w)
    }

    /// Returns the look direction of a flattened supersampled pixel index.
    ///
    /// * `index` - Flattened supersampled index.
    pub fn pixel_direction(&self, index: usize) -> Vector3f {
        let (i, j) = self.pixel_coordinates(index);
        let s = self.sub_pixel as Float;
        self.direction(i as Float / s, j as Float / s)
    }

    /// Returns the ground sample distance at a point: the size of a pixel
    /// projected at the point's range.
    ///
    /// * `point`           - Body-fixed point.
    /// * `meters_per_unit` - Metres per model length unit.
    pub fn ground_sample_distance(&self, point: &Vector3f, meters_per_unit: Float) -> Float {
        self.ifov * self.position.distance(point) * meters_per_unit
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
