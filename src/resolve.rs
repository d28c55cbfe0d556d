//! Classifying rectangles by their candidates and promoting ambiguous ones.
//!
//! Rectangles without candidates are dropped, rectangles with exactly one are
//! resolved, the rest are ambiguous. Geometric propagation then uses resolved
//! rectangles as anchors: text rendered in the pixelated image keeps its layout
//! in the reference image, so an ambiguous rectangle whose offset from an anchor
//! lands on exactly one of its candidates is resolved to that candidate.
//!
//! Each round reads a snapshot of the anchors taken before the round starts,
//! which keeps the outcome independent of evaluation order.

use std::collections::HashSet;
use std::fmt;

use tracing::info;

use crate::geometry::{Point, Rectangle};
use crate::matching::MatchSet;
use crate::segment::ColorRectangle;

/// Outcome for a single rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    /// Exactly one reference position.
    Resolved(Point),
    /// Several reference positions, in scan order.
    Ambiguous(Vec<Point>),
    /// No reference position reproduces the rectangle's color.
    Dropped,
}

impl ResolutionState {
    /// Number of candidates still attached to the rectangle.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        match self {
            Self::Resolved(_) => 1,
            Self::Ambiguous(c) => c.len(),
            Self::Dropped => 0,
        }
    }
}

/// How many propagation rounds to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationRounds {
    /// Exactly this many rounds, even if later ones could still promote.
    Fixed(u32),
    /// Repeat until a round promotes nothing.
    UntilStable,
}

impl Default for PropagationRounds {
    fn default() -> Self {
        Self::Fixed(2)
    }
}

/// Settings for geometric propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Number of rounds.
    pub rounds: PropagationRounds,
    /// How far an anchor may be from the rectangle it disambiguates, in
    /// blocks of that rectangle's size along each axis. `None` accepts every
    /// resolved rectangle.
    pub neighbor_reach: Option<u32>,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            rounds: PropagationRounds::default(),
            neighbor_reach: Some(1),
        }
    }
}

/// Counts describing how well a run went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Rectangles with a single position, including promoted ones.
    pub resolved: usize,
    /// Rectangles still carrying several positions.
    pub ambiguous: usize,
    /// Rectangles without any position.
    pub dropped: usize,
    /// Rectangles promoted by propagation.
    pub promoted: usize,
    /// Propagation rounds executed.
    pub rounds_run: u32,
}

impl fmt::Display for ResolutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} straight matches | {} multiple matches | {} dropped",
            self.resolved, self.ambiguous, self.dropped
        )
    }
}

/// Per-rectangle resolution states, indexed like the rectangle slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    states: Vec<ResolutionState>,
    promoted: usize,
    rounds_run: u32,
}

impl Resolution {
    /// Drop empty candidate lists and split the rest into resolved and ambiguous.
    #[must_use]
    pub fn from_matches(matches: &MatchSet) -> Self {
        let states = matches
            .iter()
            .map(|cands| match cands {
                [] => ResolutionState::Dropped,
                [only] => ResolutionState::Resolved(*only),
                many => ResolutionState::Ambiguous(many.to_vec()),
            })
            .collect();
        Self {
            states,
            promoted: 0,
            rounds_run: 0,
        }
    }

    /// Run one propagation round and return the number of promotions.
    ///
    /// Only rectangles resolved before the call act as anchors.
    pub fn propagate_round(
        &mut self,
        rects: &[ColorRectangle],
        neighbor_reach: Option<u32>,
    ) -> usize {
        self.rounds_run += 1;

        let anchors = self.anchors(rects);
        if anchors.is_empty() {
            return 0;
        }

        let decide = |(idx, state): (usize, &ResolutionState)| {
            promotion(idx, state, rects, &anchors, neighbor_reach)
        };

        #[cfg(feature = "parallel")]
        let promotions: Vec<(usize, Point)> = {
            use rayon::prelude::*;
            self.states.par_iter().enumerate().filter_map(decide).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let promotions: Vec<(usize, Point)> =
            self.states.iter().enumerate().filter_map(decide).collect();

        for &(idx, at) in &promotions {
            self.states[idx] = ResolutionState::Resolved(at);
        }
        self.promoted += promotions.len();
        promotions.len()
    }

    /// Run propagation rounds as configured.
    pub fn propagate(&mut self, rects: &[ColorRectangle], opts: &PropagationOptions) {
        match opts.rounds {
            PropagationRounds::Fixed(n) => {
                for _ in 0..n {
                    let promoted = self.propagate_round(rects, opts.neighbor_reach);
                    self.log_pass(promoted);
                }
            }
            PropagationRounds::UntilStable => loop {
                let promoted = self.propagate_round(rects, opts.neighbor_reach);
                self.log_pass(promoted);
                if promoted == 0 {
                    break;
                }
            },
        }
    }

    /// Pixelated origin and reference position of every resolved rectangle.
    fn anchors(&self, rects: &[ColorRectangle]) -> Vec<(Point, Point)> {
        self.states
            .iter()
            .zip(rects)
            .filter_map(|(state, r)| match state {
                ResolutionState::Resolved(at) => Some((r.rect.start(), *at)),
                _ => None,
            })
            .collect()
    }

    fn log_pass(&self, promoted: usize) {
        info!(
            "Geometric pass {}: promoted {promoted} [{}]",
            self.rounds_run,
            self.stats()
        );
    }

    /// All states in rectangle order.
    #[must_use]
    pub fn states(&self) -> &[ResolutionState] {
        &self.states
    }

    /// State of rectangle `idx`.
    #[must_use]
    pub fn state(&self, idx: usize) -> Option<&ResolutionState> {
        self.states.get(idx)
    }

    /// Summary counts.
    #[must_use]
    pub fn stats(&self) -> ResolutionStats {
        let mut stats = ResolutionStats {
            promoted: self.promoted,
            rounds_run: self.rounds_run,
            ..ResolutionStats::default()
        };
        for state in &self.states {
            match state {
                ResolutionState::Resolved(_) => stats.resolved += 1,
                ResolutionState::Ambiguous(_) => stats.ambiguous += 1,
                ResolutionState::Dropped => stats.dropped += 1,
            }
        }
        stats
    }
}

/// Promotion for rectangle `idx`, if it is ambiguous and anchors agree.
fn promotion(
    idx: usize,
    state: &ResolutionState,
    rects: &[ColorRectangle],
    anchors: &[(Point, Point)],
    neighbor_reach: Option<u32>,
) -> Option<(usize, Point)> {
    let ResolutionState::Ambiguous(candidates) = state else {
        return None;
    };
    let rect = rects.get(idx)?.rect;
    agreed_candidate(rect, candidates, anchors, neighbor_reach).map(|at| (idx, at))
}

/// The single candidate that some nearby anchor predicts, or `None` if
/// anchors predict none or disagree.
fn agreed_candidate(
    rect: Rectangle,
    candidates: &[Point],
    anchors: &[(Point, Point)],
    neighbor_reach: Option<u32>,
) -> Option<Point> {
    let lookup: HashSet<Point> = candidates.iter().copied().collect();
    let within_reach = |dx: i64, dy: i64| {
        neighbor_reach.is_none_or(|k| {
            dx.unsigned_abs() <= u64::from(k) * u64::from(rect.width())
                && dy.unsigned_abs() <= u64::from(k) * u64::from(rect.height())
        })
    };
    let mut agreed = None;

    for &(anchor_origin, anchor_match) in anchors {
        let (dx, dy) = rect.start().offset_from(anchor_origin);
        if !within_reach(dx, dy) {
            continue;
        }
        let Some(expected) = anchor_match.offset(dx, dy) else {
            continue;
        };
        if !lookup.contains(&expected) {
            continue;
        }
        match agreed {
            None => agreed = Some(expected),
            Some(at) if at == expected => {}
            Some(_) => return None,
        }
    }

    agreed
}

/// Classify every rectangle and run propagation.
#[must_use]
pub fn resolve(
    rects: &[ColorRectangle],
    matches: &MatchSet,
    opts: &PropagationOptions,
) -> Resolution {
    let mut resolution = Resolution::from_matches(matches);
    info!("Split single and multiple matches [{}]", resolution.stats());
    resolution.propagate(rects, opts);
    resolution
}
