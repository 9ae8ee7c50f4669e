#[macro_use]
extern crate log;

use accelerators::SmallBodyModel;
use cameras::SumFile;
use clap::Parser;
use integrators::*;
use render_core::albedo::AlbedoOverride;
use render_core::app::*;
use render_core::error::{Error, Result};
use render_core::image_io::*;
use render_core::metadata::Metadata;
use shapes::ModelTransform;
use std::path::Path;
use std::process::ExitCode;

/// Name and version written to metadata files.
const PROGRAM: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

#[cfg(all(feature = "dhat-rs", feature = "jemalloc"))]
compile_error!("feature 'dhat-rs' and feature 'jemalloc' cannot be enabled at the same time");

#[cfg(feature = "dhat-rs")]
use dhat::{Dhat, DhatAlloc};

#[cfg(feature = "dhat-rs")]
#[global_allocator]
static ALLOCATOR: DhatAlloc = DhatAlloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOCATOR: Jemalloc = Jemalloc;

fn main() -> ExitCode {
    #[cfg(feature = "dhat-rs")]
    let _dhat = Dhat::start_heap_profiling();

    let options = Options::parse();

    // Initialize `env_logger`.
    let level = if options.quiet { "error" } else { options.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let arguments = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    match render(&options, &arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Renders the image described by the command line options.
///
/// * `options`   - Command line options.
/// * `arguments` - The command line, recorded in the metadata file.
fn render(options: &Options, arguments: &str) -> Result<()> {
    // Validate everything that does not need the models first.
    let format = OutputFormat::from_path(&options.output)?;
    let transform = ModelTransform::from_options(options.scale_model, options.rotate_model.as_deref())?;
    if !options.unit_scale.is_finite() || options.unit_scale <= 0.0 {
        return Err(Error::Config(format!("unit scale {} must be positive", options.unit_scale)));
    }

    let sum_file = SumFile::from_file(&options.sum_file)?;
    let camera = sum_file.camera(options.sub_pixel)?;
    let sun = Some(sum_file.sun_position());

    let global = SmallBodyModel::from_file(&options.model, &transform)?;

    let mut metadata = Metadata::new();
    metadata.add("image.utc", "Imaging date.  Taken from sumfile", sum_file.utc.as_str());
    match BoresightGeometry::compute(&global, &camera, sun) {
        Some(geometry) => geometry.add_metadata(&mut metadata, camera.ifov, options.unit_scale),
        None => warn!("Boresight does not intersect {}", options.model),
    }

    let albedo = match &options.albedo_file {
        Some(path) => AlbedoOverride::from_file(path)?,
        None => AlbedoOverride::default(),
    };

    let mut local_models = ResolutionModelMap::new();
    for catalog in options.local_models.iter() {
        let (threshold, collection) = LocalModelCollection::from_catalog(catalog, transform)?;
        local_models.insert(threshold, collection)?;
    }

    let law = options.photo;
    info!("Using photometric function {}", law);

    let progress = create_progress_bar(camera.supersampled_height() as u64, options.quiet);
    let frame = FrameRenderer::new(&camera, &global, &law)
        .with_sun(sun)
        .with_albedo(albedo)
        .with_local_models(local_models)
        .with_meters_per_unit(options.unit_scale)
        .render(options.threads(), &progress);

    match format {
        OutputFormat::Png => {
            let image = frame.display_image(camera.width as u32, camera.height as u32);
            write_png(&options.output, &image)?;
            metadata.write(Path::new(&options.output).with_extension("txt"), PROGRAM, arguments)?;
        }
        OutputFormat::Fits => {
            write_fits(&options.output, &frame.data_cube(), &sum_file.header_cards())?;
        }
    }
    info!("Wrote {}", options.output);
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Looks down the -z axis from 10 km at a 16x16 pixel square.
    const SUM: &str = "\
TEST01
2021 JAN 01 00:00:00.000
    16    16     0 65535                                           NPX, NLN, THRSH
    1.0000000000D+03    7.5000000000D+00    7.5000000000D+00    MMFL, CTR
    0.0000000000D+00    0.0000000000D+00   -1.0000000000D+01    SCOBJ
    1.0000000000D+00    0.0000000000D+00    0.0000000000D+00    CX
    0.0000000000D+00   -1.0000000000D+00    0.0000000000D+00    CY
    0.0000000000D+00    0.0000000000D+00   -1.0000000000D+00    CZ
    0.0000000000D+00    0.0000000000D+00    1.0000000000D+00    SZ
    1.0000000000D+02    0.0000000000D+00    0.0000000000D+00    0.0000000000D+00    1.0000000000D+02    0.0000000000D+00    K-MATRIX
    0.0000000000D+00    0.0000000000D+00    0.0000000000D+00    0.0000000000D+00    DISTORTION
    1.0000000000D-03    1.0000000000D-03    1.0000000000D-03    SIGMA_VSO
    1.0000000000D-03    1.0000000000D-03    1.0000000000D-03    SIGMA_PTG
LANDMARKS
END FILE
";

    const PLATE: &str = "v -1 -1 1\nv 1 -1 1\nv 1 1 1\nv -1 1 1\nf 1 2 3 4\n";

    fn options(dir: &Path, output: &str) -> Options {
        let model = dir.join("plate.obj");
        let sum = dir.join("TEST01.SUM");
        fs::write(&model, PLATE).unwrap();
        fs::write(&sum, SUM).unwrap();
        Options::parse_from([
            "shape-render",
            "-m",
            model.to_str().unwrap(),
            "-s",
            sum.to_str().unwrap(),
            "-o",
            dir.join(output).to_str().unwrap(),
            "--quiet",
        ])
    }

    #[test]
    fn png_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        render(&options(dir.path(), "out.png"), "-o out.png").unwrap();

        let image = image::open(dir.path().join("out.png")).unwrap().to_luma8();
        let (width, height) = image.dimensions();
        assert_eq!(width, height);
        assert!(image.pixels().any(|p| p.0[0] > 0));

        let text = fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert!(text.starts_with(&format!("# Created by {PROGRAM}\n# arguments: -o out.png\n")));
        assert!(text.contains("image.utc = 2021 JAN 01 00:00:00.000\n"));
        assert!(text.contains("image.cell = "));
        assert!(text.contains("image.lat = 90.00 N\n"));
    }

    #[test]
    fn fits_cube() {
        let dir = tempfile::tempdir().unwrap();
        render(&options(dir.path(), "out.fits"), "").unwrap();

        let bytes = fs::read(dir.path().join("out.fits")).unwrap();
        assert_eq!(bytes.len() % 2880, 0);
        let header = String::from_utf8_lossy(&bytes[..2880]).to_string();
        assert!(header.starts_with("SIMPLE  ="));
        assert!(header.contains("TITLE   = 'TEST01"));
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn unsupported_output_is_rejected_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path(), "out.jpg");
        opts.model = dir.path().join("missing.obj").to_string_lossy().to_string();
        assert!(matches!(render(&opts, ""), Err(Error::UnsupportedFormat(_))));
    }
}
