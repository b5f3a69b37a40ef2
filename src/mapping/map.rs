//! The ratio-based interval map.
//!
//! A `RatioIntervalMap` pairs two ordered span lists. Walking both lists in
//! order, every `from_ratio` positions of the "from" side form one unit that
//! corresponds to the next `to_ratio` positions of the "to" side. A 3:1 map
//! links codons to residues; its inverse is 1:3.

use std::fmt;
use std::hash::{Hash, Hasher};

use log::debug;
use serde::Serialize;

use super::offsets::{count_positions, mapped_offsets_for_positions, positions_for_offsets, traverse_to_position};
use super::ranges::find_overlap;
use super::span::{Span, Strand};
use super::{MapError, MapResult};

/// Result of a single-position shift through the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftedPosition {
    /// First position of the corresponding unit on the other side.
    pub position: i64,
    /// 0-based position of the query within its unit.
    pub phase: usize,
    /// 0-based index of the unit.
    pub unit: usize,
    /// Strand of the span holding `position`.
    pub strand: Strand,
}

/// Bidirectional mapping between two span lists at a fixed unit ratio.
#[derive(Debug, Clone)]
pub struct RatioIntervalMap {
    from_ranges: Vec<Span>,
    to_ranges: Vec<Span>,
    from_ratio: usize,
    to_ratio: usize,
    from_bounds: (i64, i64),
    to_bounds: (i64, i64),
}

fn bounds(spans: &[Span]) -> (i64, i64) {
    spans.iter().fold((i64::MAX, i64::MIN), |(lo, hi), s| (lo.min(s.min()), hi.max(s.max())))
}

fn check_ratios(from_ratio: usize, to_ratio: usize) -> MapResult<()> {
    if from_ratio == 0 || to_ratio == 0 {
        return Err(MapError::ZeroRatio { from: from_ratio, to: to_ratio });
    }
    Ok(())
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

impl RatioIntervalMap {
    /// Builds a map from span lists, coalescing contiguous spans on each side.
    pub fn new(from: Vec<Span>, to: Vec<Span>, from_ratio: usize, to_ratio: usize) -> MapResult<Self> {
        check_ratios(from_ratio, to_ratio)?;
        Ok(Self::build(coalesce_ranges(&from), coalesce_ranges(&to), from_ratio, to_ratio))
    }

    /// Builds a map from flat `[s1, e1, s2, e2, ...]` arrays, taking the pairs as given.
    pub fn from_flat(from: &[i64], to: &[i64], from_ratio: usize, to_ratio: usize) -> MapResult<Self> {
        check_ratios(from_ratio, to_ratio)?;
        Ok(Self::build(Span::pairs_from_flat(from), Span::pairs_from_flat(to), from_ratio, to_ratio))
    }

    fn build(from_ranges: Vec<Span>, to_ranges: Vec<Span>, from_ratio: usize, to_ratio: usize) -> Self {
        let from_bounds = bounds(&from_ranges);
        let to_bounds = bounds(&to_ranges);
        Self {
            from_ranges,
            to_ranges,
            from_ratio,
            to_ratio,
            from_bounds,
            to_bounds,
        }
    }

    pub fn from_ranges(&self) -> &[Span] {
        &self.from_ranges
    }

    pub fn to_ranges(&self) -> &[Span] {
        &self.to_ranges
    }

    pub fn from_ratio(&self) -> usize {
        self.from_ratio
    }

    pub fn to_ratio(&self) -> usize {
        self.to_ratio
    }

    pub fn from_lowest(&self) -> i64 {
        self.from_bounds.0
    }

    pub fn from_highest(&self) -> i64 {
        self.from_bounds.1
    }

    pub fn to_lowest(&self) -> i64 {
        self.to_bounds.0
    }

    pub fn to_highest(&self) -> i64 {
        self.to_bounds.1
    }

    /// Maps a "from" position to the start of its unit on the "to" side.
    pub fn shift_from(&self, pos: i64) -> Option<ShiftedPosition> {
        shift(pos, &self.from_ranges, self.from_ratio, &self.to_ranges, self.to_ratio)
    }

    /// Maps a "to" position to the start of its unit on the "from" side.
    pub fn shift_to(&self, pos: i64) -> Option<ShiftedPosition> {
        shift(pos, &self.to_ranges, self.to_ratio, &self.from_ranges, self.from_ratio)
    }

    /// The "to" position for `pos`, or `pos` itself when it is not mapped.
    pub fn to_position(&self, pos: i64) -> i64 {
        self.shift_from(pos).map(|s| s.position).unwrap_or(pos)
    }

    /// "From" spans for the units touched by `start..=end` in "to" coordinates.
    pub fn locate_in_from(&self, start: i64, end: i64) -> Option<Vec<Span>> {
        map_positions(start, end, &self.to_ranges, &self.from_ranges, self.to_ratio, self.from_ratio)
    }

    /// "To" spans for the units touched by `start..=end` in "from" coordinates.
    pub fn locate_in_to(&self, start: i64, end: i64) -> Option<Vec<Span>> {
        map_positions(start, end, &self.from_ranges, &self.to_ranges, self.from_ratio, self.to_ratio)
    }

    /// Like `locate_in_from`, after clipping the query to the mapped "to" extent.
    pub fn overlaps_in_from(&self, begin: i64, end: i64) -> Option<Vec<Span>> {
        let clipped = find_overlap(&self.to_ranges, begin, end)?;
        self.locate_in_from(clipped.start, clipped.end)
    }

    /// Like `locate_in_to`, after clipping the query to the mapped "from" extent.
    pub fn overlaps_in_to(&self, begin: i64, end: i64) -> Option<Vec<Span>> {
        let clipped = find_overlap(&self.from_ranges, begin, end)?;
        self.locate_in_to(clipped.start, clipped.end)
    }

    /// Composes `self: A -> B` with `other: B -> C` into `A -> C`.
    ///
    /// Ratios multiply and are reduced by their common divisor. Every "to"
    /// span of `self` must map completely through `other`, otherwise there
    /// is no composition.
    pub fn traverse(&self, other: &RatioIntervalMap) -> Option<RatioIntervalMap> {
        let from_ratio = self.from_ratio * other.from_ratio;
        let to_ratio = self.to_ratio * other.to_ratio;
        let divisor = gcd(from_ratio, to_ratio);

        let mut to_ranges = Vec::new();
        for span in &self.to_ranges {
            let Some(transferred) = other.locate_in_to(span.start, span.end) else {
                debug!("composition failed: {} has no image", span);
                return None;
            };
            let mapped_len: i64 = transferred.iter().map(Span::len).sum();
            if span.len() * other.to_ratio as i64 != mapped_len * other.from_ratio as i64 {
                debug!("composition failed: {} maps only partially", span);
                return None;
            }
            to_ranges.extend(transferred);
        }

        Some(Self::build(
            self.from_ranges.clone(),
            coalesce_ranges(&to_ranges),
            from_ratio / divisor,
            to_ratio / divisor,
        ))
    }

    /// The map read in the opposite direction.
    pub fn inverse(&self) -> RatioIntervalMap {
        Self::build(
            self.to_ranges.clone(),
            self.from_ranges.clone(),
            self.to_ratio,
            self.from_ratio,
        )
    }

    /// Extends this map with the spans of `other`, merging contiguous boundaries.
    ///
    /// Adding an equal map is a no-op. Maps with different ratios cannot be merged.
    pub fn add_map_list(&mut self, other: &RatioIntervalMap) -> MapResult<()> {
        if self == other {
            return Ok(());
        }
        if (self.from_ratio, self.to_ratio) != (other.from_ratio, other.to_ratio) {
            return Err(MapError::RatioMismatch {
                expected: (self.from_ratio, self.to_ratio),
                found: (other.from_ratio, other.to_ratio),
            });
        }
        self.from_bounds = (
            self.from_bounds.0.min(other.from_bounds.0),
            self.from_bounds.1.max(other.from_bounds.1),
        );
        self.to_bounds = (
            self.to_bounds.0.min(other.to_bounds.0),
            self.to_bounds.1.max(other.to_bounds.1),
        );
        for span in &other.from_ranges {
            add_range(*span, &mut self.from_ranges);
        }
        for span in &other.to_ranges {
            add_range(*span, &mut self.to_ranges);
        }
        Ok(())
    }

    pub fn is_from_forward_strand(&self) -> bool {
        is_forward_strand(&self.from_ranges)
    }

    pub fn is_to_forward_strand(&self) -> bool {
        is_forward_strand(&self.to_ranges)
    }

    /// True for codon-to-residue maps in either direction.
    pub fn is_triplet_map(&self) -> bool {
        matches!((self.from_ratio, self.to_ratio), (3, 1) | (1, 3))
    }

    /// True when each side is a single span.
    pub fn is_contiguous(&self) -> bool {
        self.from_ranges.len() == 1 && self.to_ranges.len() == 1
    }
}

impl PartialEq for RatioIntervalMap {
    fn eq(&self, other: &Self) -> bool {
        self.from_ratio == other.from_ratio
            && self.to_ratio == other.to_ratio
            && self.from_ranges == other.from_ranges
            && self.to_ranges == other.to_ranges
    }
}

impl Eq for RatioIntervalMap {}

impl Hash for RatioIntervalMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from_ranges.hash(state);
        self.to_ranges.hash(state);
        self.from_ratio.hash(state);
        self.to_ratio.hash(state);
    }
}

impl fmt::Display for RatioIntervalMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for span in &self.from_ranges {
            write!(f, " {}", span)?;
        }
        write!(f, " ] {}:{} to [", self.from_ratio, self.to_ratio)?;
        for span in &self.to_ranges {
            write!(f, " {}", span)?;
        }
        write!(f, " ]")
    }
}

fn shift(pos: i64, source: &[Span], source_ratio: usize, target: &[Span], target_ratio: usize) -> Option<ShiftedPosition> {
    let (count, _) = count_positions(source, pos)?;
    let unit = (count - 1) / source_ratio;
    let phase = (count - 1) % source_ratio;
    let (position, strand) = traverse_to_position(target, 1 + unit * target_ratio)?;
    Some(ShiftedPosition { position, phase, unit, strand })
}

fn map_positions(
    start: i64,
    end: i64,
    source: &[Span],
    target: &[Span],
    source_ratio: usize,
    target_ratio: usize,
) -> Option<Vec<Span>> {
    let offsets = mapped_offsets_for_positions(start, end, source, source_ratio, target_ratio);
    let mapped = positions_for_offsets(target, &offsets);
    if mapped.is_empty() {
        None
    } else {
        Some(mapped)
    }
}

fn is_forward_strand(spans: &[Span]) -> bool {
    spans
        .iter()
        .find(|s| !s.is_point())
        .map(Span::is_forward)
        .unwrap_or(true)
}

/// Appends `span` to `list`, extending the last entry when it continues it.
///
/// The last entry is extended when both travel the same way and `span`
/// starts where it ends or one step beyond it. A reversal or a gap always
/// starts a new entry.
pub fn add_range(span: Span, list: &mut Vec<Span>) {
    let Some(last) = list.last_mut() else {
        list.push(span);
        return;
    };
    let same_direction = last.is_forward() == span.is_forward();
    let continues = last.end == span.start || last.end + last.strand().step() == span.start;
    if same_direction && continues {
        last.end = span.end;
    } else {
        list.push(span);
    }
}

/// Merges spans that continue one another into maximal spans.
///
/// Only a span starting one step past the previous end, in the same
/// direction, is merged. A single point takes the direction of the span
/// before it. Nested or overlapping spans are kept as they are.
pub fn coalesce_ranges(spans: &[Span]) -> Vec<Span> {
    let mut iter = spans.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut merged = vec![*first];
    let mut last_step = first.strand().step();

    for span in iter {
        let same_direction = span.is_point() || span.strand().step() == last_step;
        let Some(last) = merged.last_mut() else {
            break;
        };
        if same_direction && span.start == last.end + last_step {
            last.end = span.end;
        } else {
            merged.push(*span);
            if !span.is_point() {
                last_step = span.strand().step();
            }
        }
    }
    merged
}
