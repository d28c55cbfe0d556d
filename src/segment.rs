//! Partitioning a region into monochromatic rectangles.
//!
//! The scan is row-major. From each pixel not yet covered, a rectangle is
//! grown greedily: rightward first while the color holds, then downward while
//! every pixel of the next row span holds. The result tiles the region exactly.

use crate::geometry::{Point, Rectangle};
use crate::grid::{Color, PixelGrid};

/// A rectangle whose pixels all share one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRectangle {
    /// Covered area in pixelated-image coordinates.
    pub rect: Rectangle,
    /// The shared color.
    pub color: Color,
}

/// Coverage flags for one segmentation call, indexed relative to the region.
struct VisitedArena {
    origin: Point,
    width: usize,
    cells: Vec<bool>,
}

impl VisitedArena {
    fn new(region: Rectangle) -> Self {
        let width = region.width() as usize;
        Self {
            origin: region.start(),
            width,
            cells: vec![false; width * region.height() as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y - self.origin.y) as usize * self.width + (x - self.origin.x) as usize
    }

    fn is_set(&self, x: u32, y: u32) -> bool {
        self.cells[self.index(x, y)]
    }

    fn mark(&mut self, rect: Rectangle) {
        for p in rect.points() {
            let idx = self.index(p.x, p.y);
            self.cells[idx] = true;
        }
    }
}

/// Split `bounds` into maximal same-color rectangles, in discovery order.
///
/// `bounds` is clipped to the grid; a region entirely outside yields nothing.
/// The returned rectangles are pairwise disjoint and their union is the clipped
/// region.
#[must_use]
pub fn find_color_rectangles(grid: &PixelGrid, bounds: Rectangle) -> Vec<ColorRectangle> {
    let Some(region) = bounds.intersection(&grid.bounds()) else {
        return Vec::new();
    };

    let mut visited = VisitedArena::new(region);
    let mut found = Vec::new();

    for start in region.points() {
        if visited.is_set(start.x, start.y) {
            continue;
        }
        let rect = grow(grid, &visited, region, start);
        visited.mark(rect.rect);
        found.push(rect);
    }

    found
}

fn grow(
    grid: &PixelGrid,
    visited: &VisitedArena,
    region: Rectangle,
    start: Point,
) -> ColorRectangle {
    let color = grid.get(start.x, start.y);
    let open = |x: u32, y: u32| !visited.is_set(x, y) && grid.get(x, y) == color;
    let limit = region.end();

    let mut end_x = start.x;
    while end_x < limit.x && open(end_x + 1, start.y) {
        end_x += 1;
    }

    let mut end_y = start.y;
    while end_y < limit.y && (start.x..=end_x).all(|x| open(x, end_y + 1)) {
        end_y += 1;
    }

    ColorRectangle {
        rect: Rectangle::new(start, Point::new(end_x, end_y)),
        color,
    }
}
