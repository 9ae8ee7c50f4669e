//! Image I/O

use crate::common::Float;
use crate::error::{Error, Result};
use crate::fileutil::get_extension_from_filename;
use crate::film::{DataCube, CUBE_PLANES};
use byteorder::{BigEndian, WriteBytesExt};
use image::{GrayImage, ImageFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// FITS files are written in blocks of this many bytes.
const FITS_BLOCK: usize = 2880;

/// FITS header cards are exactly this many characters.
const CARD_LEN: usize = 80;

/// Output file types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// 8-bit greyscale display image.
    Png,

    /// Multi-plane data cube.
    Fits,
}

impl OutputFormat {
    /// Determines the output type from a file name.
    ///
    /// * `path` - Output file path.
    pub fn from_path(path: &str) -> Result<Self> {
        match get_extension_from_filename(path).as_deref() {
            Some("png") => Ok(Self::Png),
            Some("fits") | Some("fit") => Ok(Self::Fits),
            Some(extension) => Err(Error::UnsupportedFormat(format!("Extension {extension} is not supported"))),
            None => Err(Error::UnsupportedFormat(format!(
                "Can't determine file type from suffix of filename {path}"
            ))),
        }
    }
}

/// Writes a greyscale PNG.
///
/// * `path`  - Output file path.
/// * `image` - The image.
pub fn write_png<P: AsRef<Path>>(path: P, image: &GrayImage) -> Result<()> {
    let path = path.as_ref();
    info!(
        "Writing image {} with resolution {}x{}",
        path.display(),
        image.width(),
        image.height()
    );
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Value of a FITS header keyword.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    /// Character string.
    Str(String),

    /// Integer.
    Int(i64),

    /// Real number.
    Real(Float),

    /// Logical.
    Bool(bool),
}

/// A FITS header keyword record.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderCard {
    /// Keyword; at most 8 characters.
    pub key: String,

    /// Value.
    pub value: HeaderValue,

    /// Optional comment.
    pub comment: Option<String>,
}

impl HeaderCard {
    /// Creates a card.
    ///
    /// * `key`     - Keyword.
    /// * `value`   - Value.
    /// * `comment` - Optional comment.
    pub fn new(key: &str, value: HeaderValue, comment: Option<&str>) -> Self {
        Self {
            key: key.to_uppercase(),
            value,
            comment: comment.map(String::from),
        }
    }

    /// Creates a string card.
    pub fn string(key: &str, value: &str, comment: Option<&str>) -> Self {
        Self::new(key, HeaderValue::Str(value.to_string()), comment)
    }

    /// Creates a real card.
    pub fn real(key: &str, value: Float, comment: Option<&str>) -> Self {
        Self::new(key, HeaderValue::Real(value), comment)
    }

    /// Returns the 80 character record.
    pub fn format(&self) -> String {
        let value = match &self.value {
            HeaderValue::Str(s) => format!("{:<20}", format!("'{:<8}'", s.replace('\'', "''"))),
            HeaderValue::Int(i) => format!("{i:>20}"),
            HeaderValue::Real(r) => format!("{:>20}", format_real(*r)),
            HeaderValue::Bool(b) => format!("{:>20}", if *b { "T" } else { "F" }),
        };
        let mut card = format!("{:<8}= {value}", truncate(&self.key, 8));
        if let Some(comment) = &self.comment {
            card.push_str(" / ");
            card.push_str(comment);
        }
        pad_card(&card)
    }
}

/// Formats a real so that it always carries a decimal point or exponent.
fn format_real(r: Float) -> String {
    let s = format!("{r:E}");
    if s.len() <= 20 {
        s
    } else {
        format!("{r:.12E}")
    }
}

fn truncate(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

fn pad_card(card: &str) -> String {
    format!("{:<width$}", truncate(card, CARD_LEN), width = CARD_LEN)
}

/// Returns the header records of a data cube's primary HDU.
///
/// * `cube`  - The data cube.
/// * `extra` - Additional keywords describing the observation.
fn cube_header(cube: &DataCube, extra: &[HeaderCard]) -> Vec<String> {
    let mut cards = vec![
        HeaderCard::new("SIMPLE", HeaderValue::Bool(true), Some("conforms to FITS standard")),
        HeaderCard::new("BITPIX", HeaderValue::Int(-64), Some("array data type")),
        HeaderCard::new("NAXIS", HeaderValue::Int(3), Some("number of array dimensions")),
        HeaderCard::new("NAXIS1", HeaderValue::Int(cube.width as i64), None),
        HeaderCard::new("NAXIS2", HeaderValue::Int(cube.height as i64), None),
        HeaderCard::new("NAXIS3", HeaderValue::Int(DataCube::PLANES as i64), None),
    ];
    cards.extend(
        CUBE_PLANES
            .iter()
            .enumerate()
            .map(|(i, (name, unit))| HeaderCard::string(&format!("PLANE{}", i + 1), name, Some(unit))),
    );
    cards.extend(extra.iter().cloned());

    let mut records: Vec<String> = cards.iter().map(HeaderCard::format).collect();
    records.push(pad_card("END"));
    records
}

/// Writes a data cube as the primary HDU of a FITS file.
///
/// * `path`  - Output file path.
/// * `cube`  - The data cube.
/// * `extra` - Additional header keywords.
pub fn write_fits<P: AsRef<Path>>(path: P, cube: &DataCube, extra: &[HeaderCard]) -> Result<()> {
    let path = path.as_ref();
    info!(
        "Writing data cube {} with resolution {}x{}x{}",
        path.display(),
        cube.width,
        cube.height,
        DataCube::PLANES
    );
    let mut file = BufWriter::new(File::create(path)?);
    write_fits_to(&mut file, cube, extra)?;
    file.flush()?;
    Ok(())
}

/// Writes a FITS data cube to a stream.
///
/// * `out`   - Destination.
/// * `cube`  - The data cube.
/// * `extra` - Additional header keywords.
pub fn write_fits_to<W: Write>(out: &mut W, cube: &DataCube, extra: &[HeaderCard]) -> Result<()> {
    let header = cube_header(cube, extra).concat();
    out.write_all(header.as_bytes())?;
    write_padding(out, header.len(), b' ')?;

    for value in cube.values() {
        out.write_f64::<BigEndian>(*value)?;
    }
    write_padding(out, cube.values().len() * 8, 0)?;
    Ok(())
}

/// Pads a section of `len` bytes to a whole number of FITS blocks.
fn write_padding<W: Write>(out: &mut W, len: usize, fill: u8) -> Result<()> {
    let remainder = len % FITS_BLOCK;
    if remainder != 0 {
        out.write_all(&vec![fill; FITS_BLOCK - remainder])?;
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
