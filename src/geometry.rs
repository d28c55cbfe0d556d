//! Integer coordinates and inclusive-corner rectangles.

use std::fmt;

/// An integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Shift by a signed offset, or `None` if the result leaves the `u32` range.
    #[must_use]
    pub fn offset(self, dx: i64, dy: i64) -> Option<Self> {
        let x = u32::try_from(i64::from(self.x) + dx).ok()?;
        let y = u32::try_from(i64::from(self.y) + dy).ok()?;
        Some(Self { x, y })
    }

    /// Signed offset that moves `other` onto `self`.
    #[must_use]
    pub fn offset_from(self, other: Self) -> (i64, i64) {
        (
            i64::from(self.x) - i64::from(other.x),
            i64::from(self.y) - i64::from(other.y),
        )
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a pixelation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BlockSize {
    /// Number of pixels in the block.
    #[must_use]
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle described by two inclusive corners.
///
/// `start` is the top-left pixel and `end` the bottom-right pixel, both part of
/// the rectangle, so a single pixel has `start == end` and a width of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    start: Point,
    end: Point,
}

impl Rectangle {
    /// Create a rectangle from any two opposite corners.
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            start: Point::new(a.x.min(b.x), a.y.min(b.y)),
            end: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create a rectangle from its top-left corner and a non-zero size.
    #[must_use]
    pub fn from_origin(origin: Point, size: BlockSize) -> Option<Self> {
        if size.width == 0 || size.height == 0 {
            return None;
        }
        let end = Point::new(
            origin.x.checked_add(size.width - 1)?,
            origin.y.checked_add(size.height - 1)?,
        );
        Some(Self { start: origin, end })
    }

    /// Top-left corner (inclusive).
    #[must_use]
    pub fn start(&self) -> Point {
        self.start
    }

    /// Bottom-right corner (inclusive).
    #[must_use]
    pub fn end(&self) -> Point {
        self.end
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.end.x - self.start.x + 1
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.end.y - self.start.y + 1
    }

    /// Width and height as a [`BlockSize`].
    #[must_use]
    pub fn size(&self) -> BlockSize {
        BlockSize {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.size().area()
    }

    /// Whether `p` lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        (self.start.x..=self.end.x).contains(&p.x) && (self.start.y..=self.end.y).contains(&p.y)
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// Overlapping part of two rectangles.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = Point::new(self.start.x.max(other.start.x), self.start.y.max(other.start.y));
        let end = Point::new(self.end.x.min(other.end.x), self.end.y.min(other.end.y));
        (start.x <= end.x && start.y <= end.y).then_some(Self { start, end })
    }

    /// All covered points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let (x0, x1) = (self.start.x, self.end.x);
        (self.start.y..=self.end.y).flat_map(move |y| (x0..=x1).map(move |x| Point::new(x, y)))
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_inclusive() {
        let r = Rectangle::new(Point::new(2, 3), Point::new(2, 3));
        assert_eq!(r.width(), 1);
        assert_eq!(r.height(), 1);
        assert_eq!(r.area(), 1);

        let r = Rectangle::new(Point::new(5, 7), Point::new(1, 2));
        assert_eq!(r.start(), Point::new(1, 2));
        assert_eq!(r.end(), Point::new(5, 7));
        assert_eq!(r.size(), BlockSize { width: 5, height: 6 });
    }

    #[test]
    fn from_origin_rejects_empty_size() {
        let size = BlockSize { width: 0, height: 4 };
        assert!(Rectangle::from_origin(Point::new(0, 0), size).is_none());

        let size = BlockSize { width: 3, height: 2 };
        let r = Rectangle::from_origin(Point::new(4, 4), size).unwrap();
        assert_eq!(r.end(), Point::new(6, 5));
    }

    #[test]
    fn intersection_of_disjoint_rectangles_is_none() {
        let a = Rectangle::new(Point::new(0, 0), Point::new(3, 3));
        let b = Rectangle::new(Point::new(4, 0), Point::new(6, 3));
        assert!(a.intersection(&b).is_none());

        let c = Rectangle::new(Point::new(2, 1), Point::new(8, 8));
        assert_eq!(
            a.intersection(&c),
            Some(Rectangle::new(Point::new(2, 1), Point::new(3, 3)))
        );
    }

    #[test]
    fn points_iterate_row_major() {
        let r = Rectangle::new(Point::new(1, 1), Point::new(2, 2));
        let pts: Vec<_> = r.points().collect();
        assert_eq!(
            pts,
            vec![
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(1, 2),
                Point::new(2, 2)
            ]
        );
    }

    #[test]
    fn offset_refuses_negative_coordinates() {
        let p = Point::new(3, 3);
        assert_eq!(p.offset(-3, 2), Some(Point::new(0, 5)));
        assert_eq!(p.offset(-4, 0), None);
        assert_eq!(Point::new(5, 1).offset_from(p), (2, -2));
    }
}
