//! Removal of rectangles that carry no matching signal.

use crate::geometry::Rectangle;
use crate::grid::Color;
use crate::segment::ColorRectangle;

/// Which rectangles to discard before searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Colors that never identify content (text color, editor background).
    pub excluded_colors: Vec<Color>,
    /// Rectangles covering fewer pixels than this are dropped.
    pub min_area: u64,
    /// Drop rectangles spanning the full width or height of the region.
    pub exclude_full_span: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            excluded_colors: vec![Color::BLACK, Color::WHITE],
            min_area: 1,
            exclude_full_span: false,
        }
    }
}

impl FilterOptions {
    /// Also exclude the editor background color.
    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        if !self.excluded_colors.contains(&color) {
            self.excluded_colors.push(color);
        }
        self
    }

    /// Whether `rect` should be discarded when segmented from `region`.
    #[must_use]
    pub fn is_moot(&self, rect: &ColorRectangle, region: Rectangle) -> bool {
        if self.excluded_colors.contains(&rect.color) || rect.rect.area() < self.min_area {
            return true;
        }
        self.exclude_full_span
            && (rect.rect.width() == region.width() || rect.rect.height() == region.height())
    }
}

/// Keep only rectangles that are useful for matching, preserving order.
#[must_use]
pub fn remove_moot_rectangles(
    rects: Vec<ColorRectangle>,
    region: Rectangle,
    opts: &FilterOptions,
) -> Vec<ColorRectangle> {
    rects
        .into_iter()
        .filter(|r| !opts.is_moot(r, region))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn rect(x0: u32, y0: u32, x1: u32, y1: u32, color: Color) -> ColorRectangle {
        ColorRectangle {
            rect: Rectangle::new(Point::new(x0, y0), Point::new(x1, y1)),
            color,
        }
    }

    #[test]
    fn default_drops_black_and_white() {
        let region = Rectangle::new(Point::new(0, 0), Point::new(9, 9));
        let grey = Color::rgb(90, 90, 90);
        let kept = remove_moot_rectangles(
            vec![
                rect(0, 0, 1, 1, Color::BLACK),
                rect(2, 0, 3, 1, grey),
                rect(4, 0, 5, 1, Color::WHITE),
            ],
            region,
            &FilterOptions::default(),
        );
        assert_eq!(kept, vec![rect(2, 0, 3, 1, grey)]);
    }

    #[test]
    fn background_color_is_added_once() {
        let bg = Color::rgb(30, 30, 30);
        let opts = FilterOptions::default().with_background(bg).with_background(bg);
        assert_eq!(opts.excluded_colors.len(), 3);
        let region = Rectangle::new(Point::new(0, 0), Point::new(9, 9));
        assert!(opts.is_moot(&rect(0, 0, 1, 1, bg), region));
    }

    #[test]
    fn min_area_and_full_span() {
        let region = Rectangle::new(Point::new(0, 0), Point::new(9, 9));
        let grey = Color::rgb(90, 90, 90);
        let opts = FilterOptions {
            excluded_colors: Vec::new(),
            min_area: 4,
            exclude_full_span: true,
        };
        assert!(opts.is_moot(&rect(0, 0, 0, 2, grey), region));
        assert!(opts.is_moot(&rect(0, 0, 9, 1, grey), region));
        assert!(opts.is_moot(&rect(3, 0, 4, 9, grey), region));
        assert!(!opts.is_moot(&rect(3, 3, 4, 4, grey), region));
    }

    #[test]
    fn retained_rectangles_are_unchanged() {
        let region = Rectangle::new(Point::new(0, 0), Point::new(3, 3));
        let input = vec![
            rect(0, 0, 1, 1, Color::rgb(1, 2, 3)),
            rect(2, 2, 3, 3, Color::rgb(4, 5, 6)),
        ];
        let kept = remove_moot_rectangles(input.clone(), region, &FilterOptions::default());
        assert_eq!(kept, input);
    }
}
