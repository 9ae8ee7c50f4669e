//! Application related stuff

use crate::common::Float;
use crate::photometry::PhotometricFunction;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

/// Command line options.
#[derive(Parser, Clone, Debug)]
#[clap(author, version, about = "Render a synthetic image of a small body from a SUM file.", long_about = None)]
pub struct Options {
    /// Path to the global shape model.
    #[clap(long = "model", short = 'm', value_name = "FILE", help = "Global shape model (OBJ, PLY or STL).")]
    pub model: String,

    /// Path to the SUM file describing the camera and sun.
    #[clap(long = "sum-file", short = 's', value_name = "FILE", help = "SUM file with camera and sun geometry.")]
    pub sum_file: String,

    /// Path to the output image.
    #[clap(
        long = "output",
        short = 'o',
        value_name = "FILE",
        help = "Output file. Extension .png writes a display image and metadata sidecar, .fits writes a data cube."
    )]
    pub output: String,

    /// Path to the per-facet albedo table.
    #[clap(long = "albedo-file", value_name = "FILE", help = "CSV of facet id and albedo multiplier.")]
    pub albedo_file: Option<String>,

    /// Local model catalogs.
    #[clap(
        long = "local-models",
        value_name = "FILE",
        help = "Local model catalog: a resolution line followed by 'lat, lon, file' lines. May be repeated."
    )]
    pub local_models: Vec<String>,

    /// Number of threads to use for rendering.
    #[clap(
        long = "num-threads",
        short = 't',
        value_name = "NUM",
        default_value_t = 2,
        help = "Use specified number of threads for rendering."
    )]
    n_threads: usize,

    /// Supersampling factor per image axis.
    #[clap(
        long = "sub-pixel",
        value_name = "NUM",
        default_value_t = 2,
        help = "Supersampling factor along each image axis."
    )]
    pub sub_pixel: usize,

    /// Photometric function.
    #[clap(long = "photo", value_name = "NAME", default_value_t = PhotometricFunction::Orex)]
    pub photo: PhotometricFunction,

    /// Uniform scale applied to the shape models.
    #[clap(long = "scale-model", value_name = "FLOAT", help = "Scale shape models about their centroid.")]
    pub scale_model: Option<Float>,

    /// Rotation applied to the shape models.
    #[clap(
        long = "rotate-model",
        value_name = "ANGLE,X,Y,Z",
        help = "Rotate shape models about their centroid by an angle in degrees about an axis, e.g. '30,0,0,1'."
    )]
    pub rotate_model: Option<String>,

    /// Metres per shape model unit, used for ground sample distances.
    #[clap(
        long = "unit-scale",
        value_name = "FLOAT",
        default_value_t = 1000.0,
        help = "Metres per model unit used to compute ground sample distance."
    )]
    pub unit_scale: Float,

    /// Log level used when RUST_LOG is not set.
    #[clap(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Suppress all text output other than error messages.
    #[clap(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => {
                warn!("Invalid num-threads");
                1
            }
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }
}

/// Returns a progress bar with `len` steps. The bar is hidden when `quiet`
/// is set.
///
/// * `len`   - Number of steps.
/// * `quiet` - Hide the bar.
pub fn create_progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{elapsed_precise}] [{wide_bar}] {pos}/{len} {eta}") {
        progress.set_style(style.progress_chars("#>-"));
    }
    progress
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
