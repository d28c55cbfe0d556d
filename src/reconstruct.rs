//! Writing recovered content back over the pixelated blocks.

use crate::geometry::{Point, Rectangle};
use crate::grid::{Color, PixelGrid};
use crate::resolve::{Resolution, ResolutionState};
use crate::segment::ColorRectangle;

/// Copy the reference block at `from` over `rect` in `output`.
///
/// Pixels that would fall outside either grid are skipped.
pub fn write_block(output: &mut PixelGrid, rect: Rectangle, reference: &PixelGrid, from: Point) {
    for p in rect.points() {
        let src = source(rect, p, from);
        if let Some(color) = reference.get_checked(src.x, src.y) {
            if output.get_checked(p.x, p.y).is_some() {
                output.put(p.x, p.y, color);
            }
        }
    }
}

/// Write the per-pixel rounded mean of all candidate blocks over `rect`.
pub fn write_average(
    output: &mut PixelGrid,
    rect: Rectangle,
    reference: &PixelGrid,
    candidates: &[Point],
) {
    if candidates.is_empty() {
        return;
    }
    for p in rect.points() {
        let mut sums = [0u64; 4];
        let mut count = 0u64;
        for &from in candidates {
            let src = source(rect, p, from);
            let Some(color) = reference.get_checked(src.x, src.y) else {
                continue;
            };
            for (s, v) in sums.iter_mut().zip(color.channels()) {
                *s += u64::from(v);
            }
            count += 1;
        }
        if count > 0 && output.get_checked(p.x, p.y).is_some() {
            output.put(p.x, p.y, Color::from_sums(sums, count));
        }
    }
}

/// Reference pixel corresponding to `p` when `rect` is read from `from`.
fn source(rect: Rectangle, p: Point, from: Point) -> Point {
    let start = rect.start();
    Point::new(
        from.x.saturating_add(p.x - start.x),
        from.y.saturating_add(p.y - start.y),
    )
}

/// Apply every resolution state to `output`.
///
/// Resolved rectangles get an exact copy, ambiguous ones the candidate
/// average, dropped ones keep their pixelated color.
pub fn reconstruct(
    output: &mut PixelGrid,
    rects: &[ColorRectangle],
    resolution: &Resolution,
    reference: &PixelGrid,
) {
    for (rect, state) in rects.iter().zip(resolution.states()) {
        match state {
            ResolutionState::Resolved(from) => write_block(output, rect.rect, reference, *from),
            ResolutionState::Ambiguous(candidates) => {
                write_average(output, rect.rect, reference, candidates);
            }
            ResolutionState::Dropped => {}
        }
    }
}
