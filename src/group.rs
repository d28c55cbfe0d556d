//! Grouping rectangles by block size.

use std::collections::BTreeMap;

use crate::geometry::BlockSize;
use crate::segment::ColorRectangle;

/// Rectangle indices keyed by exact block size.
///
/// Indices refer to the slice passed to [`group_by_size`] and keep its order
/// within each group. Groups iterate in ascending size order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeGroups {
    groups: BTreeMap<BlockSize, Vec<usize>>,
}

impl SizeGroups {
    /// Number of distinct sizes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Indices of the rectangles with the given size.
    #[must_use]
    pub fn get(&self, size: BlockSize) -> Option<&[usize]> {
        self.groups.get(&size).map(Vec::as_slice)
    }

    /// Iterate over `(size, indices)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (BlockSize, &[usize])> {
        self.groups.iter().map(|(size, idx)| (*size, idx.as_slice()))
    }
}

/// Group rectangles by `(width, height)`.
#[must_use]
pub fn group_by_size(rects: &[ColorRectangle]) -> SizeGroups {
    let mut groups: BTreeMap<BlockSize, Vec<usize>> = BTreeMap::new();
    for (i, r) in rects.iter().enumerate() {
        groups.entry(r.rect.size()).or_default().push(i);
    }
    SizeGroups { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rectangle};
    use crate::grid::Color;

    #[test]
    fn groups_preserve_discovery_order() {
        let mk = |x: u32, w: u32, h: u32| ColorRectangle {
            rect: Rectangle::from_origin(Point::new(x, 0), BlockSize { width: w, height: h })
                .unwrap(),
            color: Color::rgb(1, 1, 1),
        };
        let rects = vec![mk(0, 4, 4), mk(10, 2, 4), mk(20, 4, 4), mk(30, 4, 4)];
        let groups = group_by_size(&rects);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get(BlockSize { width: 4, height: 4 }), Some(&[0, 2, 3][..]));
        assert_eq!(groups.get(BlockSize { width: 2, height: 4 }), Some(&[1][..]));
        assert!(groups.get(BlockSize { width: 1, height: 1 }).is_none());
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(group_by_size(&[]).is_empty());
    }
}
