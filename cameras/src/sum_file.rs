//! SUM file

use crate::Camera;
use render_core::common::*;
use render_core::error::{Error, Result};
use render_core::geometry::*;
use render_core::image_io::HeaderCard;
use std::fs;
use std::path::Path;

/// Distance along the sun direction at which the sun is placed.
pub const SUN_DISTANCE: Float = 1e8;

/// Camera pointing and illumination for one image, as written by the SPC
/// tool suite.
#[derive(Clone, Debug, PartialEq)]
pub struct SumFile {
    /// Picture name.
    pub picnm: String,

    /// Image time.
    pub utc: String,

    /// Number of pixels per line.
    pub npx: usize,

    /// Number of lines.
    pub nln: usize,

    /// Lower threshold.
    pub t1: i32,

    /// Upper threshold.
    pub t2: i32,

    /// Focal length in millimetres.
    pub mmfl: Float,

    /// Boresight sample.
    pub px0: Float,

    /// Boresight line.
    pub ln0: Float,

    /// Vector from the spacecraft to the body origin, body-fixed.
    pub scobj: Vector3f,

    /// Camera x-axis, body-fixed unit vector.
    pub cx: Vector3f,

    /// Camera y-axis, body-fixed unit vector.
    pub cy: Vector3f,

    /// Camera z-axis (boresight), body-fixed unit vector.
    pub cz: Vector3f,

    /// Unit vector to the sun, body-fixed.
    pub sz: Vector3f,

    /// First row of the camera K-matrix.
    pub kmat1: Vector3f,

    /// Second row of the camera K-matrix.
    pub kmat2: Vector3f,

    /// Distortion coefficients.
    pub distortion: [Float; 4],

    /// Spacecraft position uncertainty.
    pub sig_vso: Vector3f,

    /// Pointing uncertainty.
    pub sig_ptg: Vector3f,

    /// Field of view corner directions.
    pub frustum: [Vector3f; 4],
}

/// Parses a number that may use a Fortran `D` exponent.
fn parse_fortran(s: &str) -> Option<Float> {
    s.replace(['D', 'd'], "E").parse::<Float>().ok()
}

/// Splits the tokens of line `n` (0-based) of a SUM file.
struct SumLines<'a> {
    path: &'a Path,
    lines: Vec<&'a str>,
}

impl<'a> SumLines<'a> {
    fn line(&self, n: usize) -> Result<&'a str> {
        self.lines
            .get(n)
            .map(|l| l.trim())
            .ok_or_else(|| Error::parse(self.path, n + 1, "unexpected end of SUM file"))
    }

    fn floats<const N: usize>(&self, n: usize, offset: usize) -> Result<[Float; N]> {
        let tokens: Vec<&str> = self.line(n)?.split_whitespace().collect();
        let mut values = [0.0; N];
        for (i, value) in values.iter_mut().enumerate() {
            *value = tokens
                .get(offset + i)
                .and_then(|t| parse_fortran(t))
                .ok_or_else(|| Error::parse(self.path, n + 1, format!("expected {} numbers", offset + N)))?;
        }
        Ok(values)
    }

    fn vector(&self, n: usize, offset: usize) -> Result<Vector3f> {
        self.floats::<3>(n, offset).map(Vector3f::from)
    }

    fn unit_vector(&self, n: usize) -> Result<Vector3f> {
        let v = self.vector(n, 0)?;
        if v.length_squared() == 0.0 {
            return Err(Error::parse(self.path, n + 1, "zero length direction"));
        }
        Ok(v.normalize())
    }

    fn integers<const N: usize>(&self, n: usize) -> Result<[i64; N]> {
        let tokens: Vec<&str> = self.line(n)?.split_whitespace().collect();
        let mut values = [0; N];
        for (i, value) in values.iter_mut().enumerate() {
            *value = tokens
                .get(i)
                .and_then(|t| t.parse::<i64>().ok())
                .ok_or_else(|| Error::parse(self.path, n + 1, format!("expected {N} integers")))?;
        }
        Ok(values)
    }
}

impl SumFile {
    /// Reads a SUM file.
    ///
    /// * `path` - The file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let sum_file = Self::parse(&text, path)?;
        info!("Read SUM file {} for {} ({})", path.display(), sum_file.picnm, sum_file.utc);
        Ok(sum_file)
    }

    /// Parses the contents of a SUM file.
    ///
    /// * `text` - File contents.
    /// * `path` - Used in error messages.
    pub fn parse<P: AsRef<Path>>(text: &str, path: P) -> Result<Self> {
        let lines = SumLines {
            path: path.as_ref(),
            lines: text.lines().collect(),
        };

        let picnm = lines.line(0)?.to_string();
        let utc = lines.line(1)?.to_string();
        let [npx, nln, t1, t2] = lines.integers::<4>(2)?;
        if npx <= 0 || nln <= 0 {
            return Err(Error::parse(path.as_ref(), 3, format!("invalid image size {npx}x{nln}")));
        }
        let [mmfl, px0, ln0] = lines.floats::<3>(3, 0)?;
        let scobj = lines.vector(4, 0)?;
        let cx = lines.unit_vector(5)?;
        let cy = lines.unit_vector(6)?;
        let cz = lines.unit_vector(7)?;
        let sz = lines.unit_vector(8)?;
        let kmat1 = lines.vector(9, 0)?;
        let kmat2 = lines.vector(9, 3)?;
        let distortion = lines.floats::<4>(10, 0)?;
        let sig_vso = lines.vector(11, 0)?;
        let sig_ptg = lines.vector(12, 0).unwrap_or(sig_vso);

        let mut sum_file = Self {
            picnm,
            utc,
            npx: npx as usize,
            nln: nln as usize,
            t1: t1 as i32,
            t2: t2 as i32,
            mmfl,
            px0,
            ln0,
            scobj,
            cx,
            cy,
            cz,
            sz,
            kmat1,
            kmat2,
            distortion,
            sig_vso,
            sig_ptg,
            frustum: [Vector3f::zero(); 4],
        };
        sum_file.frustum = sum_file.compute_frustum();
        Ok(sum_file)
    }

    /// Returns the four field of view corner directions.
    fn compute_frustum(&self) -> [Vector3f; 4] {
        let fov1 = (self.npx as Float / (2.0 * self.mmfl * self.kmat1.x)).atan().abs();
        let fov2 = (self.nln as Float / (2.0 * self.mmfl * self.kmat2.y)).atan().abs();
        let (x, y) = (-fov1.tan(), -fov2.tan());
        let corner = |sx: Float, sy: Float| (sx * x * self.cx + sy * y * self.cy + self.cz).normalize();
        [
            corner(1.0, -1.0),
            corner(-1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ]
    }

    /// Returns the angular size of a pixel along a line.
    pub fn horizontal_resolution(&self) -> Float {
        self.frustum[2].angle(&self.frustum[3]) / self.npx as Float
    }

    /// Returns the angular size of a pixel along a sample.
    pub fn vertical_resolution(&self) -> Float {
        self.frustum[2].angle(&self.frustum[0]) / self.nln as Float
    }

    /// Returns the image width, stretched for non-square pixels.
    pub fn image_width(&self) -> usize {
        let (k00, k11) = (self.kmat1.x.abs(), self.kmat2.y.abs());
        if k11 > k00 {
            (self.npx as Float * (k11 / k00)).round() as usize
        } else {
            self.npx
        }
    }

    /// Returns the image height, stretched for non-square pixels.
    pub fn image_height(&self) -> usize {
        let (k00, k11) = (self.kmat1.x.abs(), self.kmat2.y.abs());
        if k00 > k11 {
            (self.nln as Float * (k00 / k11)).round() as usize
        } else {
            self.nln
        }
    }

    /// Returns the body-fixed camera position.
    pub fn camera_position(&self) -> Vector3f {
        -self.scobj
    }

    /// Returns the rotation from the camera frame to the body-fixed frame.
    pub fn camera_to_body(&self) -> Rotation {
        Rotation::from_rows(self.cx, self.cy, self.cz).inverse()
    }

    /// Returns the boresight direction.
    pub fn boresight(&self) -> Vector3f {
        self.cz
    }

    /// Returns the body-fixed sun position.
    pub fn sun_position(&self) -> Vector3f {
        self.sz * SUN_DISTANCE
    }

    /// Returns a camera for this image.
    ///
    /// * `sub_pixel` - Supersampling factor.
    pub fn camera(&self, sub_pixel: usize) -> Result<Camera> {
        Camera::new(
            self.camera_position(),
            self.camera_to_body(),
            self.horizontal_resolution(),
            self.image_width(),
            self.image_height(),
            sub_pixel,
        )
    }

    /// Returns FITS header keywords describing the image.
    pub fn header_cards(&self) -> Vec<HeaderCard> {
        let from_sum = Some("From SUM file");
        let distortion = self.distortion.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ");
        vec![
            HeaderCard::string("UTC", &self.utc, Some("Time from the SUM file")),
            HeaderCard::string("TITLE", &self.picnm, Some("Title of SUM file")),
            HeaderCard::real("MMFL", self.mmfl, from_sum),
            HeaderCard::string("SCOBJ", &self.scobj.to_string(), from_sum),
            HeaderCard::string("CX", &self.cx.to_string(), from_sum),
            HeaderCard::string("CY", &self.cy.to_string(), from_sum),
            HeaderCard::string("CZ", &self.cz.to_string(), from_sum),
            HeaderCard::string("SZ", &self.sz.to_string(), from_sum),
            HeaderCard::string("KMAT1", &self.kmat1.to_string(), from_sum),
            HeaderCard::string("KMAT2", &self.kmat2.to_string(), from_sum),
            HeaderCard::string("DIST", &format!("[{distortion}]"), from_sum),
            HeaderCard::string("SIGVSO", &self.sig_vso.to_string(), from_sum),
            HeaderCard::string("SIGPTG", &self.sig_ptg.to_string(), from_sum),
        ]
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
