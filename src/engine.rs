//! Depixelation pipeline: segment, filter, group, search, resolve, reconstruct.

use tracing::info;

use crate::error::{Error, Result};
use crate::filter::{remove_moot_rectangles, FilterOptions};
use crate::geometry::Rectangle;
use crate::grid::PixelGrid;
use crate::group::{group_by_size, SizeGroups};
use crate::matching::{find_matches, MatchSet};
use crate::reconstruct::reconstruct;
use crate::resolve::{resolve, PropagationOptions, Resolution, ResolutionStats};
use crate::segment::{find_color_rectangles, ColorRectangle};

/// Options controlling a depixelation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepixOptions {
    /// Pixelated region inside the pixelated image; `None` means the whole image.
    pub bounds: Option<Rectangle>,
    /// Which rectangles to ignore.
    pub filter: FilterOptions,
    /// Geometric propagation settings.
    pub propagation: PropagationOptions,
}

/// Intermediate results of a run, before anything is written.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Region that was segmented.
    pub region: Rectangle,
    /// Number of rectangles segmentation produced.
    pub rectangles_found: usize,
    /// Rectangles kept after filtering; all indices below refer to this list.
    pub rectangles: Vec<ColorRectangle>,
    /// Kept rectangles grouped by size.
    pub groups: SizeGroups,
    /// Reference candidates per rectangle.
    pub matches: MatchSet,
    /// Final state per rectangle.
    pub resolution: Resolution,
}

/// Output of a depixelation run.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Best-effort reconstruction, same size as the pixelated input.
    pub image: PixelGrid,
    /// Resolved / ambiguous / dropped counts.
    pub stats: ResolutionStats,
    /// Number of rectangles segmentation produced.
    pub rectangles_found: usize,
    /// Number of rectangles that were searched for.
    pub rectangles_searched: usize,
    /// Number of distinct block sizes searched.
    pub block_sizes: usize,
}

/// Runs the pipeline with fixed options.
///
/// The engine holds no state between runs; the same instance can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct Depixelator {
    options: DepixOptions,
}

impl Depixelator {
    /// Create an engine with the given options.
    #[must_use]
    pub fn new(options: DepixOptions) -> Self {
        Self { options }
    }

    /// Check inputs and return the region to segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LayoutMismatch`] if the grids use different channel
    /// layouts and [`Error::BoundsOutsideImage`] if the configured region is
    /// not inside the pixelated image.
    pub fn validate(&self, pixelated: &PixelGrid, reference: &PixelGrid) -> Result<Rectangle> {
        if pixelated.layout() != reference.layout() {
            return Err(Error::LayoutMismatch {
                pixelated: pixelated.layout(),
                reference: reference.layout(),
            });
        }
        let full = pixelated.bounds();
        let region = self.options.bounds.unwrap_or(full);
        if !full.contains_rect(&region) {
            return Err(Error::BoundsOutsideImage {
                bounds: region,
                width: pixelated.width(),
                height: pixelated.height(),
            });
        }
        Ok(region)
    }

    /// Run every stage up to resolution.
    ///
    /// # Errors
    ///
    /// See [`Depixelator::validate`].
    pub fn analyze(&self, pixelated: &PixelGrid, reference: &PixelGrid) -> Result<Analysis> {
        let region = self.validate(pixelated, reference)?;

        info!("Finding color rectangles in pixelated region {region}");
        let found = find_color_rectangles(pixelated, region);
        let rectangles_found = found.len();
        info!("Found {rectangles_found} same color rectangles");

        let rectangles = remove_moot_rectangles(found, region, &self.options.filter);
        info!("{} rectangles left after moot filter", rectangles.len());

        let groups = group_by_size(&rectangles);
        info!("Found {} different rectangle sizes", groups.len());

        info!(
            "Finding matches in {}x{} search image",
            reference.width(),
            reference.height()
        );
        let matches = find_matches(&rectangles, &groups, reference);

        let resolution = resolve(&rectangles, &matches, &self.options.propagation);

        Ok(Analysis {
            region,
            rectangles_found,
            rectangles,
            groups,
            matches,
            resolution,
        })
    }

    /// Reconstruct the pixelated image using the reference image.
    ///
    /// Blocks that cannot be matched keep their pixelated color; check
    /// [`Reconstruction::stats`] to judge how much was recovered.
    ///
    /// # Errors
    ///
    /// See [`Depixelator::validate`].
    pub fn run(&self, pixelated: &PixelGrid, reference: &PixelGrid) -> Result<Reconstruction> {
        let analysis = self.analyze(pixelated, reference)?;

        let mut image = pixelated.clone();
        info!("Writing single and averaged matches to output");
        reconstruct(&mut image, &analysis.rectangles, &analysis.resolution, reference);

        let stats = analysis.resolution.stats();
        info!("Done [{stats}]");

        Ok(Reconstruction {
            image,
            stats,
            rectangles_found: analysis.rectangles_found,
            rectangles_searched: analysis.rectangles.len(),
            block_sizes: analysis.groups.len(),
        })
    }
}

/// Run the pipeline once with `options`.
///
/// # Errors
///
/// See [`Depixelator::validate`].
pub fn depixelate(
    pixelated: &PixelGrid,
    reference: &PixelGrid,
    options: &DepixOptions,
) -> Result<Reconstruction> {
    Depixelator::new(options.clone()).run(pixelated, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::grid::{ChannelLayout, Color};

    #[test]
    fn layout_mismatch_is_rejected() {
        let a = PixelGrid::new(4, 4, ChannelLayout::Rgb, Color::BLACK).unwrap();
        let b = PixelGrid::new(4, 4, ChannelLayout::Rgba, Color::BLACK).unwrap();
        let err = Depixelator::default().run(&a, &b).unwrap_err();
        assert!(matches!(err, Error::LayoutMismatch { .. }));
    }

    #[test]
    fn bounds_must_fit_the_pixelated_image() {
        let grid = PixelGrid::new(4, 4, ChannelLayout::Rgb, Color::BLACK).unwrap();
        let engine = Depixelator::new(DepixOptions {
            bounds: Some(Rectangle::new(Point::new(2, 2), Point::new(4, 3))),
            ..DepixOptions::default()
        });
        let err = engine.validate(&grid, &grid).unwrap_err();
        assert!(matches!(err, Error::BoundsOutsideImage { width: 4, height: 4, .. }));
    }

    #[test]
    fn default_region_is_the_full_image() {
        let grid = PixelGrid::new(3, 2, ChannelLayout::Rgb, Color::BLACK).unwrap();
        let region = Depixelator::default().validate(&grid, &grid).unwrap();
        assert_eq!(region, grid.bounds());
    }

    #[test]
    fn pixels_outside_the_region_are_untouched() {
        let grey = Color::rgb(60, 60, 60);
        let pixelated = PixelGrid::new(4, 2, ChannelLayout::Rgb, grey).unwrap();
        let reference = PixelGrid::new(4, 2, ChannelLayout::Rgb, grey).unwrap();
        let engine = Depixelator::new(DepixOptions {
            bounds: Some(Rectangle::new(Point::new(0, 0), Point::new(1, 1))),
            ..DepixOptions::default()
        });
        let out = engine.run(&pixelated, &reference).unwrap();
        assert_eq!(out.rectangles_found, 1);
        assert_eq!(out.image, pixelated);
        // A uniform reference matches everywhere the 2x2 block fits.
        assert_eq!(out.stats.ambiguous, 1);
    }
}
