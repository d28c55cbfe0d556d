//! Searching the reference image for blocks that pixelate to an observed color.
//!
//! A block's pixelation value is the per-channel mean of its pixels, rounded
//! half-up. A [`SummedAreaTable`] makes every block mean O(1), so a size group
//! costs one pass over the reference image regardless of how many rectangles
//! it holds.

use std::collections::HashMap;

use tracing::debug;

use crate::geometry::{BlockSize, Point};
use crate::grid::{Color, PixelGrid};
use crate::group::SizeGroups;
use crate::segment::ColorRectangle;

/// Per-channel 2D prefix sums over a grid.
///
/// Entry `(x, y)` holds the channel totals of all pixels strictly above and to
/// the left of `(x, y)`, so the table is one row and column larger than the grid.
#[derive(Debug, Clone)]
pub struct SummedAreaTable {
    width: u32,
    height: u32,
    sums: Vec<[u64; 4]>,
}

impl SummedAreaTable {
    /// Build the table in a single pass.
    #[must_use]
    pub fn new(grid: &PixelGrid) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let stride = width as usize + 1;
        let mut sums = vec![[0u64; 4]; stride * (height as usize + 1)];

        for y in 0..height {
            let mut row = [0u64; 4];
            for x in 0..width {
                for (total, v) in row.iter_mut().zip(grid.get(x, y).channels()) {
                    *total += u64::from(v);
                }
                let above = sums[y as usize * stride + x as usize + 1];
                sums[(y as usize + 1) * stride + x as usize + 1] =
                    std::array::from_fn(|ch| above[ch] + row[ch]);
            }
        }

        Self {
            width,
            height,
            sums,
        }
    }

    fn at(&self, x: u32, y: u32) -> [u64; 4] {
        self.sums[y as usize * (self.width as usize + 1) + x as usize]
    }

    /// Channel totals of the block at `origin`, which must lie inside the grid.
    #[must_use]
    pub fn block_sum(&self, origin: Point, size: BlockSize) -> [u64; 4] {
        debug_assert!(origin.x + size.width <= self.width);
        debug_assert!(origin.y + size.height <= self.height);
        let (x0, y0) = (origin.x, origin.y);
        let (x1, y1) = (x0 + size.width, y0 + size.height);
        let (a, b, c, d) = (self.at(x1, y1), self.at(x0, y1), self.at(x1, y0), self.at(x0, y0));
        std::array::from_fn(|ch| a[ch] + d[ch] - b[ch] - c[ch])
    }

    /// Rounded mean color of the block at `origin`.
    #[must_use]
    pub fn block_mean(&self, origin: Point, size: BlockSize) -> Color {
        Color::from_sums(self.block_sum(origin, size), size.area())
    }
}

/// Candidate reference positions per rectangle, in row-major scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    candidates: Vec<Vec<Point>>,
}

impl MatchSet {
    /// Wrap per-rectangle candidate lists.
    #[must_use]
    pub fn from_candidates(candidates: Vec<Vec<Point>>) -> Self {
        Self { candidates }
    }

    /// Candidates of rectangle `idx`; empty if unknown.
    #[must_use]
    pub fn get(&self, idx: usize) -> &[Point] {
        self.candidates.get(idx).map_or(&[], Vec::as_slice)
    }

    /// Number of rectangles covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no rectangles are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Iterate over candidate lists in rectangle order.
    pub fn iter(&self) -> impl Iterator<Item = &[Point]> {
        self.candidates.iter().map(Vec::as_slice)
    }
}

/// Find every reference position reproducing each rectangle's color.
#[must_use]
pub fn find_matches(
    rects: &[ColorRectangle],
    groups: &SizeGroups,
    reference: &PixelGrid,
) -> MatchSet {
    let table = SummedAreaTable::new(reference);
    let mut candidates = vec![Vec::new(); rects.len()];

    for (size, members) in groups.iter() {
        let mut wanted: HashMap<Color, Vec<Point>> =
            members.iter().map(|&i| (rects[i].color, Vec::new())).collect();

        for (color, at) in scan_block_means(&table, size, &wanted) {
            if let Some(hits) = wanted.get_mut(&color) {
                hits.push(at);
            }
        }

        debug!(
            "{size} blocks: {} rectangles, {} distinct colors, {} positions matched",
            members.len(),
            wanted.len(),
            wanted.values().map(Vec::len).sum::<usize>()
        );

        for &i in members {
            if let Some(hits) = wanted.get(&rects[i].color) {
                candidates[i].clone_from(hits);
            }
        }
    }

    MatchSet { candidates }
}

/// Positions whose block mean is one of the `wanted` colors, in row-major order.
fn scan_block_means(
    table: &SummedAreaTable,
    size: BlockSize,
    wanted: &HashMap<Color, Vec<Point>>,
) -> Vec<(Color, Point)> {
    if size.width > table.width || size.height > table.height {
        return Vec::new();
    }
    let last_y = table.height - size.height;
    let scan = |y: u32| scan_row(table, size, wanted, y);

    // Collecting an indexed range keeps row order under rayon as well.
    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<(Color, Point)>> = {
        use rayon::prelude::*;
        (0..=last_y).into_par_iter().map(scan).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<(Color, Point)>> = (0..=last_y).map(scan).collect();

    rows.into_iter().flatten().collect()
}

/// Matching positions on row `y`, left to right. The block must fit the table.
fn scan_row(
    table: &SummedAreaTable,
    size: BlockSize,
    wanted: &HashMap<Color, Vec<Point>>,
    y: u32,
) -> Vec<(Color, Point)> {
    (0..=table.width - size.width)
        .filter_map(|x| {
            let at = Point::new(x, y);
            let mean = table.block_mean(at, size);
            wanted.contains_key(&mean).then_some((mean, at))
        })
        .collect()
}
