//! Frame buffer and frame assembly

use crate::common::Float;
use crate::geometry::Vector3f;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use std::collections::HashMap;

/// Brightness and geometry sampled for one supersampled pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelBrightnessRecord {
    /// Unitless brightness, never negative.
    pub brightness: Float,

    /// Incidence angle in radians.
    pub incidence: Float,

    /// Emission angle in radians.
    pub emission: Float,

    /// Phase angle in radians.
    pub phase: Float,

    /// Distance from the camera to the intersection.
    pub range: Float,

    /// Body-fixed intersection point.
    pub facet: Vector3f,

    /// Normal of the intersected element.
    pub normal: Vector3f,
}

/// Name and unit comment of each data cube plane.
pub const CUBE_PLANES: [(&str, &str); 11] = [
    ("brightness", "from 0 to 1"),
    ("incidence", "degrees"),
    ("emission", "degrees"),
    ("phase", "degrees"),
    ("range", "kilometers"),
    ("facetX", "kilometers"),
    ("facetY", "kilometers"),
    ("facetZ", "kilometers"),
    ("normalX", "X component of unit normal"),
    ("normalY", "Y component of unit normal"),
    ("normalZ", "Z component of unit normal"),
];

impl PixelBrightnessRecord {
    /// Returns the record's data cube plane values in `CUBE_PLANES` order.
    pub fn plane_values(&self) -> [Float; 11] {
        [
            self.brightness,
            self.incidence.to_degrees(),
            self.emission.to_degrees(),
            self.phase.to_degrees(),
            self.range,
            self.facet.x,
            self.facet.y,
            self.facet.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
        ]
    }
}

/// Records keyed by flattened supersampled pixel index, filled by one worker.
pub type PartialFrame = HashMap<usize, PixelBrightnessRecord>;

/// The rendered frame at supersampled resolution. Pixels with no
/// intersection have no record.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Supersampled width.
    pub width: usize,

    /// Supersampled height.
    pub height: usize,

    records: HashMap<usize, PixelBrightnessRecord>,

    max_brightness: Float,
}

impl FrameBuffer {
    /// Creates an empty frame.
    ///
    /// * `width`  - Supersampled width.
    /// * `height` - Supersampled height.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            records: HashMap::new(),
            max_brightness: 0.0,
        }
    }

    /// Merges a worker's partial frame.
    ///
    /// * `partial` - Records from one worker.
    pub fn merge(&mut self, partial: PartialFrame) {
        for (index, record) in partial {
            debug_assert!(index < self.width * self.height);
            self.max_brightness = self.max_brightness.max(record.brightness);
            self.records.insert(index, record);
        }
    }

    /// Returns the record at pixel `(i, j)`, if any.
    ///
    /// * `i` - Column.
    /// * `j` - Row.
    pub fn get(&self, i: usize, j: usize) -> Option<&PixelBrightnessRecord> {
        self.records.get(&(j * self.width + i))
    }

    /// Returns the number of pixels with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no pixel intersected the surface.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the largest brightness of all records, or 0 for an empty frame.
    pub fn max_brightness(&self) -> Float {
        self.max_brightness
    }

    /// Iterates over `(index, record)` pairs in no particular order.
    pub fn records(&self) -> impl Iterator<Item = (usize, &PixelBrightnessRecord)> {
        self.records.iter().map(|(i, r)| (*i, r))
    }

    /// Returns the 8-bit grey level used for a brightness.
    ///
    /// * `brightness` - The brightness.
    pub fn grey_level(&self, brightness: Float) -> u8 {
        if brightness < 0.01 {
            1
        } else {
            (255.0 * brightness / self.max_brightness).floor().clamp(0.0, 255.0) as u8
        }
    }

    /// Returns the normalized greyscale image at supersampled resolution.
    pub fn supersampled_image(&self) -> GrayImage {
        let mut canvas = GrayImage::new(self.width as u32, self.height as u32);
        for (index, record) in self.records() {
            let (i, j) = (index % self.width, index / self.width);
            canvas.put_pixel(i as u32, j as u32, Luma([self.grey_level(record.brightness)]));
        }
        canvas
    }

    /// Returns the display image downsampled to the native resolution.
    ///
    /// * `width`  - Native width.
    /// * `height` - Native height.
    pub fn display_image(&self, width: u32, height: u32) -> GrayImage {
        if self.is_empty() {
            warn!("No intersections with shape model found!");
        }
        let canvas = self.supersampled_image();
        if canvas.width() == width && canvas.height() == height {
            canvas
        } else {
            imageops::resize(&canvas, width, height, FilterType::Triangle)
        }
    }

    /// Returns the 11-plane data cube at supersampled resolution.
    pub fn data_cube(&self) -> DataCube {
        if self.is_empty() {
            warn!("No intersections with shape model found!");
        }
        let mut cube = DataCube::new(self.width, self.height);
        for (index, record) in self.records() {
            let (i, j) = (index % self.width, index / self.width);
            let row = self.height - 1 - j;
            for (plane, value) in record.plane_values().into_iter().enumerate() {
                cube.set(plane, row, i, value);
            }
        }
        cube
    }
}

/// A stack of equally sized floating point planes, rows ordered bottom to top.
#[derive(Clone, Debug, PartialEq)]
pub struct DataCube {
    /// Plane width.
    pub width: usize,

    /// Plane height.
    pub height: usize,

    /// Plane-major, then row, then column.
    data: Vec<Float>,
}

impl DataCube {
    /// Number of planes.
    pub const PLANES: usize = CUBE_PLANES.len();

    /// Creates a cube of zeros.
    ///
    /// * `width`  - Plane width.
    /// * `height` - Plane height.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; Self::PLANES * width * height],
        }
    }

    fn offset(&self, plane: usize, row: usize, col: usize) -> usize {
        (plane * self.height + row) * self.width + col
    }

    /// Returns a value.
    ///
    /// * `plane` - Plane index.
    /// * `row`   - Cube row.
    /// * `col`   - Column.
    pub fn get(&self, plane: usize, row: usize, col: usize) -> Float {
        self.data[self.offset(plane, row, col)]
    }

    /// Sets a value.
    ///
    /// * `plane` - Plane index.
    /// * `row`   - Cube row.
    /// * `col`   - Column.
    /// * `value` - The value.
    pub fn set(&mut self, plane: usize, row: usize, col: usize, value: Float) {
        let offset = self.offset(plane, row, col);
        self.data[offset] = value;
    }

    /// Returns all values in storage order.
    pub fn values(&self) -> &[Float] {
        &self.data
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(brightness: Float) -> PixelBrightnessRecord {
        PixelBrightnessRecord {
            brightness,
            incidence: 0.5,
            emission: 0.25,
            phase: 0.75,
            range: 10.0,
            facet: Vector3f::new(1.0, 2.0, 3.0),
            normal: Vector3f::new(0.0, 0.0, 1.0),
        }
    }

    fn frame() -> FrameBuffer {
        let mut frame = FrameBuffer::new(4, 2);
        frame.merge(PartialFrame::from([(0, record(0.5)), (1, record(0.005))]));
        frame.merge(PartialFrame::from([(6, record(0.25))]));
        frame
    }

    #[test]
    fn merge_tracks_max_brightness() {
        let frame = frame();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.max_brightness(), 0.5);
        assert_eq!(frame.get(2, 1).map(|r| r.brightness), Some(0.25));
        assert!(frame.get(3, 1).is_none());
    }

    #[test]
    fn grey_levels() {
        let frame = frame();
        let canvas = frame.supersampled_image();
        assert_eq!(canvas.get_pixel(0, 0)[0], 255);
        assert_eq!(canvas.get_pixel(1, 0)[0], 1);
        assert_eq!(canvas.get_pixel(2, 1)[0], 127);
        assert_eq!(canvas.get_pixel(3, 1)[0], 0);
    }

    #[test]
    fn display_image_is_native_size() {
        let image = frame().display_image(2, 1);
        assert_eq!(image.dimensions(), (2, 1));

        let same = frame().display_image(4, 2);
        assert_eq!(same, frame().supersampled_image());
    }

    #[test]
    fn cube_rows_are_flipped() {
        let cube = frame().data_cube();
        assert_eq!(cube.values().len(), 11 * 8);
        assert_eq!(cube.get(0, 1, 0), 0.5);
        assert_eq!(cube.get(0, 0, 2), 0.25);
        assert_eq!(cube.get(0, 0, 0), 0.0);
        assert!((cube.get(1, 1, 0) - 0.5_f64.to_degrees()).abs() < 1e-12);
        assert_eq!(cube.get(7, 1, 0), 3.0);
        assert_eq!(cube.get(10, 1, 0), 1.0);
    }

    #[test]
    fn cube_brightness_matches_display_source() {
        let frame = frame();
        let cube = frame.data_cube();
        for j in 0..frame.height {
            for i in 0..frame.width {
                let expected = frame.get(i, j).map_or(0.0, |r| r.brightness);
                assert_eq!(cube.get(0, frame.height - 1 - j, i), expected);
            }
        }
    }

    #[test]
    fn empty_frame_is_black() {
        let frame = FrameBuffer::new(2, 2);
        assert!(frame.supersampled_image().pixels().all(|p| p[0] == 0));
        assert!(frame.data_cube().values().iter().all(|v| *v == 0.0));
    }
}
