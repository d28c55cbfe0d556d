//! Reading and writing images around the in-memory engine.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::info;

use crate::engine::{DepixOptions, Depixelator};
use crate::error::{Error, Result};
use crate::grid::{ChannelLayout, PixelGrid};
use crate::resolve::ResolutionStats;

/// Extensions `save_grid` can write.
const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "bmp"];

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the pixelated input.
    pub path: PathBuf,
    /// Where the reconstruction was written, if it was.
    pub output: Option<PathBuf>,
    /// Whether processing succeeded.
    pub success: bool,
    /// Resolution counts, zero on failure.
    pub stats: ResolutionStats,
    /// Human-readable status message.
    pub message: String,
}

/// Decode an image file into a grid with the given layout.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or has no pixels.
pub fn load_grid(path: &Path, layout: ChannelLayout) -> Result<PixelGrid> {
    let img = image::open(path)?;
    match layout {
        ChannelLayout::Rgb => PixelGrid::from_rgb_image(&img.to_rgb8()),
        ChannelLayout::Rgba => PixelGrid::from_rgba_image(&img.to_rgba8()),
    }
}

/// Encode a grid with format-specific settings.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_grid(grid: &PixelGrid, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = grid.to_dynamic();

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&DynamicImage::ImageRgb8(dyn_img.to_rgb8()))?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Depixelate one file against a search image and write the result.
///
/// Both images are decoded as RGB.
#[must_use]
pub fn process_file(
    pixelated: &Path,
    search: &Path,
    output: &Path,
    opts: &DepixOptions,
) -> ProcessResult {
    let mut result = ProcessResult {
        path: pixelated.to_path_buf(),
        output: None,
        success: false,
        stats: ResolutionStats::default(),
        message: String::new(),
    };

    if !is_supported_image(output) {
        result.message = format!("Unsupported output format: {}", output.display());
        return result;
    }

    info!("Loading pixelated image {}", pixelated.display());
    let pixelated_grid = match load_grid(pixelated, ChannelLayout::Rgb) {
        Ok(g) => g,
        Err(e) => {
            result.message = format!("Failed to load pixelated image: {e}");
            return result;
        }
    };

    info!("Loading search image {}", search.display());
    let search_grid = match load_grid(search, ChannelLayout::Rgb) {
        Ok(g) => g,
        Err(e) => {
            result.message = format!("Failed to load search image: {e}");
            return result;
        }
    };

    let reconstruction = match Depixelator::new(opts.clone()).run(&pixelated_grid, &search_grid) {
        Ok(r) => r,
        Err(e) => {
            result.message = format!("Failed to depixelate: {e}");
            return result;
        }
    };
    result.stats = reconstruction.stats;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                result.message = format!("Failed to create output directory: {e}");
                return result;
            }
        }
    }

    info!("Saving output image {}", output.display());
    match save_grid(&reconstruction.image, output) {
        Ok(()) => {
            result.success = true;
            result.output = Some(output.to_path_buf());
            result.message = format!("Reconstructed [{}]", reconstruction.stats);
        }
        Err(e) => {
            result.message = format!("Failed to save: {e}");
        }
    }

    result
}

/// Whether `path` names an image format that can be read and written back.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Generate a default output path from an input path.
///
/// Example: `"redacted.png"` becomes `"redacted_depixelated.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_depixelated.{ext}"))
}
