//! Property-based tests for the depixelation pipeline.
//!
//! - Segmentation tiles the region exactly with monochromatic rectangles
//! - Runs are deterministic
//! - Propagation never adds candidates and is stable once it stops promoting
//! - Without a reach limit a third round never changes the two-round result
//! - Averaging matches a direct per-channel mean

use depix::matching::MatchSet;
use depix::reconstruct::write_average;
use depix::resolve::{resolve, Resolution};
use depix::segment::find_color_rectangles;
use depix::{
    ChannelLayout, Color, ColorRectangle, Depixelator, PixelGrid, Point, PropagationOptions,
    PropagationRounds, Rectangle,
};
use proptest::prelude::*;

const PALETTE: [Color; 4] = [
    Color::rgb(200, 30, 30),
    Color::rgb(30, 200, 30),
    Color::rgb(30, 30, 200),
    Color::rgb(120, 120, 120),
];

/// A small grid drawn from a four-color palette, so that runs of equal
/// colors (and therefore multi-pixel rectangles) are common.
fn palette_grid() -> impl Strategy<Value = PixelGrid> {
    (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
        prop::collection::vec(0usize..PALETTE.len(), (w * h) as usize).prop_map(move |cells| {
            PixelGrid::from_fn(w, h, ChannelLayout::Rgb, |x, y| {
                PALETTE[cells[(y * w + x) as usize]]
            })
            .unwrap()
        })
    })
}

/// A grid together with a region inside it.
fn grid_and_region() -> impl Strategy<Value = (PixelGrid, Rectangle)> {
    palette_grid().prop_flat_map(|grid| {
        let (w, h) = (grid.width(), grid.height());
        (0..w, 0..h, 0..w, 0..h).prop_map(move |(x0, y0, x1, y1)| {
            (grid.clone(), Rectangle::new(Point::new(x0, y0), Point::new(x1, y1)))
        })
    })
}

/// A row of 2x2 blocks with random candidate lists drawn from a small pool
/// of positions, so anchors and candidates overlap often.
fn block_row() -> impl Strategy<Value = (Vec<ColorRectangle>, MatchSet)> {
    prop::collection::vec(
        prop::collection::btree_set((0u32..6, 0u32..3), 0..4),
        1..10,
    )
    .prop_map(|lists| {
        let rects = (0..lists.len())
            .map(|i| {
                let x = u32::try_from(i).unwrap() * 2;
                ColorRectangle {
                    rect: Rectangle::new(Point::new(x, 0), Point::new(x + 1, 1)),
                    color: Color::rgb(1, 2, 3),
                }
            })
            .collect();
        let candidates = lists
            .into_iter()
            .map(|set| set.into_iter().map(|(x, y)| Point::new(x * 2, y * 2)).collect())
            .collect();
        (rects, MatchSet::from_candidates(candidates))
    })
}

proptest! {
    #[test]
    fn segmentation_tiles_region_exactly((grid, region) in grid_and_region()) {
        let rects = find_color_rectangles(&grid, region);
        let mut cover = vec![0u32; (grid.width() * grid.height()) as usize];
        for r in &rects {
            prop_assert!(region.contains_rect(&r.rect));
            for p in r.rect.points() {
                cover[(p.y * grid.width() + p.x) as usize] += 1;
            }
        }
        for p in grid.bounds().points() {
            let expected = u32::from(region.contains(p));
            prop_assert_eq!(cover[(p.y * grid.width() + p.x) as usize], expected, "pixel {}", p);
        }
    }

    #[test]
    fn segmented_rectangles_are_monochromatic((grid, region) in grid_and_region()) {
        for r in find_color_rectangles(&grid, region) {
            for p in r.rect.points() {
                prop_assert_eq!(grid.get(p.x, p.y), r.color);
            }
        }
    }

    #[test]
    fn analysis_is_deterministic(pixelated in palette_grid(), reference in palette_grid()) {
        let engine = Depixelator::default();
        let first = engine.analyze(&pixelated, &reference).unwrap();
        let second = engine.analyze(&pixelated, &reference).unwrap();
        prop_assert_eq!(&first.rectangles, &second.rectangles);
        prop_assert_eq!(&first.matches, &second.matches);
        prop_assert_eq!(&first.resolution, &second.resolution);
    }

    #[test]
    fn candidate_counts_never_grow((rects, matches) in block_row()) {
        let mut res = Resolution::from_matches(&matches);
        for (idx, cands) in matches.iter().enumerate() {
            prop_assert!(res.states()[idx].candidate_count() <= cands.len());
        }
        for _ in 0..3 {
            let before: Vec<usize> = res.states().iter().map(|s| s.candidate_count()).collect();
            res.propagate_round(&rects, Some(1));
            for (b, s) in before.iter().zip(res.states()) {
                prop_assert!(s.candidate_count() <= *b);
            }
        }
    }

    #[test]
    fn rounds_after_a_quiet_round_change_nothing((rects, matches) in block_row()) {
        let stable = PropagationOptions {
            rounds: PropagationRounds::UntilStable,
            neighbor_reach: Some(1),
        };
        let mut res = resolve(&rects, &matches, &stable);
        let settled = res.states().to_vec();
        prop_assert_eq!(res.propagate_round(&rects, Some(1)), 0);
        prop_assert_eq!(res.states(), settled.as_slice());

        // A fixed bound at least as large as the rounds needed agrees with
        // running to a fixpoint.
        let needed = resolve(&rects, &matches, &stable).stats().rounds_run;
        let fixed = PropagationOptions {
            rounds: PropagationRounds::Fixed(needed + 1),
            neighbor_reach: Some(1),
        };
        let fixed_res = resolve(&rects, &matches, &fixed);
        prop_assert_eq!(fixed_res.states(), settled.as_slice());
    }

    #[test]
    fn third_round_without_reach_limit_changes_nothing((rects, matches) in block_row()) {
        let opts = PropagationOptions {
            rounds: PropagationRounds::Fixed(2),
            neighbor_reach: None,
        };
        let mut res = resolve(&rects, &matches, &opts);
        let after_two = res.states().to_vec();
        prop_assert_eq!(res.propagate_round(&rects, None), 0);
        prop_assert_eq!(res.states(), after_two.as_slice());
    }

    #[test]
    fn two_round_bound_is_reproducible((rects, matches) in block_row()) {
        let opts = PropagationOptions::default();
        let a = resolve(&rects, &matches, &opts);
        let b = resolve(&rects, &matches, &opts);
        prop_assert_eq!(a.states(), b.states());
        prop_assert_eq!(a.stats().rounds_run, 2);
    }

    #[test]
    fn averaging_is_rounded_channel_mean(
        pixels in prop::collection::vec(any::<[u8; 3]>(), 16),
        picks in prop::collection::btree_set((0u32..3, 0u32..3), 1..6),
    ) {
        let reference = PixelGrid::from_fn(4, 4, ChannelLayout::Rgb, |x, y| {
            let [r, g, b] = pixels[(y * 4 + x) as usize];
            Color::rgb(r, g, b)
        })
        .unwrap();
        let candidates: Vec<Point> = picks.into_iter().map(|(x, y)| Point::new(x, y)).collect();
        let mut out = PixelGrid::new(2, 2, ChannelLayout::Rgb, Color::BLACK).unwrap();
        let bounds = out.bounds();
        write_average(&mut out, bounds, &reference, &candidates);

        let n = candidates.len() as u64;
        for j in 0..2u32 {
            for i in 0..2u32 {
                let mut expected = [0u8; 4];
                for (ch, slot) in expected.iter_mut().enumerate() {
                    let sum: u64 = candidates
                        .iter()
                        .map(|c| u64::from(reference.get(c.x + i, c.y + j).channels()[ch]))
                        .sum();
                    *slot = u8::try_from((2 * sum + n) / (2 * n)).unwrap();
                }
                prop_assert_eq!(out.get(i, j), Color(expected));
            }
        }
    }
}
