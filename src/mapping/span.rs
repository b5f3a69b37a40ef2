//! Inclusive position ranges with a direction of travel.
//!
//! A `Span` is a `(start, end)` pair:
//! - `start <= end` is a forward block (a single point counts as forward)
//! - `start > end` is a reverse block, walked from `start` down to `end`

use std::fmt;

use serde::Serialize;

/// Direction in which a span is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Step added to move one position along the strand.
    pub fn step(self) -> i64 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

/// An inclusive range of positions, possibly reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// A span covering one position.
    pub const fn point(pos: i64) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn strand(&self) -> Strand {
        if self.end >= self.start {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }

    pub fn is_forward(&self) -> bool {
        self.strand() == Strand::Forward
    }

    /// True for a single position, which carries no direction.
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    /// Number of positions covered. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> i64 {
        (self.end - self.start).abs() + 1
    }

    pub fn min(&self) -> i64 {
        self.start.min(self.end)
    }

    pub fn max(&self) -> i64 {
        self.start.max(self.end)
    }

    /// Whether `pos` lies within the span, regardless of direction.
    pub fn contains(&self, pos: i64) -> bool {
        pos >= self.min() && pos <= self.max()
    }

    /// The same positions walked the other way.
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    /// Position reached after moving `offset` steps from `start`.
    pub fn position_at(&self, offset: i64) -> i64 {
        self.start + self.strand().step() * offset
    }

    /// Iterates positions in traversal order.
    pub fn positions(&self) -> impl Iterator<Item = i64> {
        let span = *self;
        (0..span.len()).map(move |i| span.position_at(i))
    }

    /// Pairs up a flat `[s1, e1, s2, e2, ...]` array; a trailing odd value is ignored.
    pub fn pairs_from_flat(flat: &[i64]) -> Vec<Span> {
        flat.chunks_exact(2).map(|p| Span::new(p[0], p[1])).collect()
    }

    /// Flattens spans back to `[s1, e1, s2, e2, ...]`.
    pub fn to_flat(spans: &[Span]) -> Vec<i64> {
        spans.iter().flat_map(|s| [s.start, s.end]).collect()
    }
}

impl From<(i64, i64)> for Span {
    fn from((start, end): (i64, i64)) -> Self {
        Self::new(start, end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
