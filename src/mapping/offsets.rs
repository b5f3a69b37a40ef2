//! Offset and unit arithmetic over ordered span lists.
//!
//! A span list is walked in order; the *traversal offset* of a position is
//! the number of positions walked before it. Everything the interval map
//! does reduces to these steps:
//! - position -> 1-based count (`count_positions`)
//! - count -> position (`traverse_to_position`)
//! - position range -> set of unit offsets on the other side
//!   (`mapped_offsets_for_positions`)
//! - offset set -> maximal spans (`positions_for_offsets`)
//!
//! Scans always return the *first* occurrence of a position, so a boundary
//! position shared by two adjacent spans resolves to the earlier one for
//! point lookups, while range lookups see every occurrence.

use std::fmt;
use std::ops::RangeInclusive;

use bitvec::prelude::*;

use super::span::{Span, Strand};

/// A set of non-negative traversal offsets.
#[derive(Clone, Default)]
pub struct OffsetSet {
    bits: BitVec<u64, Lsb0>,
}

impl OffsetSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn grow_to(&mut self, len: usize) {
        if self.bits.len() < len {
            self.bits.resize(len, false);
        }
    }

    pub fn insert(&mut self, offset: usize) {
        self.grow_to(offset + 1);
        self.bits.set(offset, true);
    }

    /// Marks every offset in `range`.
    pub fn insert_range(&mut self, range: RangeInclusive<usize>) {
        let (first, last) = (*range.start(), *range.end());
        if first > last {
            return;
        }
        self.grow_to(last + 1);
        self.bits[first..=last].fill(true);
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.bits.get(offset).map(|b| *b).unwrap_or(false)
    }

    /// Number of offsets in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Offsets in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// First offset in the set at or after `from`.
    pub fn next_set(&self, from: usize) -> Option<usize> {
        if from >= self.bits.len() {
            return None;
        }
        self.bits[from..].first_one().map(|i| i + from)
    }

    /// First offset not in the set at or after `from`.
    pub fn next_clear(&self, from: usize) -> usize {
        if from >= self.bits.len() {
            return from;
        }
        self.bits[from..]
            .first_zero()
            .map(|i| i + from)
            .unwrap_or(self.bits.len())
    }
}

impl PartialEq for OffsetSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for OffsetSet {}

impl fmt::Debug for OffsetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for OffsetSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = OffsetSet::new();
        for offset in iter {
            set.insert(offset);
        }
        set
    }
}

/// Counts positions walked up to and including the first occurrence of `pos`.
///
/// Returns the 1-based count and the strand of the span it was found in.
pub fn count_positions(spans: &[Span], pos: i64) -> Option<(usize, Strand)> {
    let mut count = 0usize;
    for span in spans {
        if span.contains(pos) {
            let into = (pos - span.start).unsigned_abs() as usize;
            return Some((count + into + 1, span.strand()));
        }
        count += span.len() as usize;
    }
    None
}

/// Finds the position reached after walking `count` positions (1-based).
pub fn traverse_to_position(spans: &[Span], count: usize) -> Option<(i64, Strand)> {
    if count < 1 {
        return None;
    }
    let mut traversed = 0usize;
    for span in spans {
        let len = span.len() as usize;
        if count <= traversed + len {
            let pos = span.position_at((count - traversed - 1) as i64);
            return Some((pos, span.strand()));
        }
        traversed += len;
    }
    None
}

/// Unit offsets on the target side touched by positions `start..=end` on the source side.
///
/// Each source span overlapping the query contributes the traversal offsets
/// of its overlap, widened to whole units: source offset `o` lies in unit
/// `o / source_ratio`, and unit `u` owns target offsets
/// `u * target_ratio ..= u * target_ratio + target_ratio - 1`.
pub fn mapped_offsets_for_positions(
    start: i64,
    end: i64,
    source: &[Span],
    source_ratio: usize,
    target_ratio: usize,
) -> OffsetSet {
    let (start, end) = (start.min(end), start.max(end));
    let mut overlaps = OffsetSet::new();
    let mut offset = 0usize;

    for span in source {
        if start <= span.max() && end >= span.min() {
            let first = start.max(span.min());
            let last = end.min(span.max());
            let (first_offset, last_offset) = match span.strand() {
                Strand::Forward => (first - span.start, last - span.start),
                Strand::Reverse => (span.start - last, span.start - first),
            };
            let first_offset = offset + first_offset as usize;
            let last_offset = offset + last_offset as usize;

            let first_unit = first_offset / source_ratio * target_ratio;
            let last_unit = last_offset / source_ratio * target_ratio + target_ratio - 1;
            overlaps.insert_range(first_unit..=last_unit);
        }
        offset += span.len() as usize;
    }
    overlaps
}

/// Converts a set of traversal offsets into maximal spans of `target`.
///
/// Spans keep the direction of the target span they come from; a run of
/// offsets crossing from one target span into the next is split there.
pub fn positions_for_offsets(target: &[Span], offsets: &OffsetSet) -> Vec<Span> {
    let mut mapped = Vec::new();
    if offsets.is_empty() {
        return mapped;
    }

    let to_add = offsets.len();
    let mut added = 0;
    let mut traversed = 0usize;
    for span in target {
        if added >= to_add {
            break;
        }
        added += add_offset_positions(&mut mapped, traversed, *span, offsets);
        traversed += span.len() as usize;
    }
    mapped
}

/// Appends the parts of `span` selected by `offsets`, where the span begins
/// at traversal offset `span_offset`. Returns the number of positions added.
pub fn add_offset_positions(
    mapped: &mut Vec<Span>,
    span_offset: usize,
    span: Span,
    offsets: &OffsetSet,
) -> usize {
    let span_len = span.len() as usize;
    let mut from = 0usize;
    let mut added = 0usize;

    while from < span_len {
        let first = match offsets.next_set(span_offset + from) {
            Some(o) if o - span_offset < span_len => o - span_offset,
            _ => return added,
        };
        let clear = offsets.next_clear(span_offset + first + 1);
        let last = (span_len - 1).min(clear - span_offset - 1);

        mapped.push(Span::new(
            span.position_at(first as i64),
            span.position_at(last as i64),
        ));
        added += last - first + 1;
        from = last + 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(flat: &[i64]) -> Vec<Span> {
        Span::pairs_from_flat(flat)
    }

    fn offsets(values: &[usize]) -> OffsetSet {
        values.iter().copied().collect()
    }

    #[test]
    fn test_count_positions_forward() {
        let mut list = spans(&[10, 20]);
        assert_eq!(count_positions(&list, 9), None);
        assert_eq!(count_positions(&list, 15), Some((6, Strand::Forward)));
        assert_eq!(count_positions(&list, 21), None);

        // a repeated position resolves to its first occurrence
        list.extend(spans(&[25, 25, 25, 26]));
        assert_eq!(count_positions(&list, 25), Some((12, Strand::Forward)));
        assert_eq!(count_positions(&list, 26), Some((14, Strand::Forward)));
    }

    #[test]
    fn test_count_positions_mixed_strands() {
        let mut list = spans(&[5, -5]);
        assert_eq!(count_positions(&list, -1), Some((7, Strand::Reverse)));

        list.extend(spans(&[5, 10]));
        assert_eq!(count_positions(&list, 6), Some((13, Strand::Forward)));

        list.extend(spans(&[-10, -20]));
        assert_eq!(count_positions(&list, -12), Some((20, Strand::Reverse)));

        list.extend(spans(&[30, 30]));
        assert_eq!(count_positions(&list, 30), Some((29, Strand::Forward)));
    }

    #[test]
    fn test_count_positions_shared_boundary() {
        let list = spans(&[1, 2, 2, 3]);
        assert_eq!(count_positions(&list, 2), Some((2, Strand::Forward)));

        let list = spans(&[1, 2, 2, 3, -1, -2, -2, -3]);
        assert_eq!(count_positions(&list, -2), Some((6, Strand::Reverse)));
    }

    #[test]
    fn test_traverse_to_position() {
        let list = spans(&[10, 20, 40, 35]);
        assert_eq!(traverse_to_position(&list, 0), None);
        assert_eq!(traverse_to_position(&list, 1), Some((10, Strand::Forward)));
        assert_eq!(traverse_to_position(&list, 11), Some((20, Strand::Forward)));
        assert_eq!(traverse_to_position(&list, 12), Some((40, Strand::Reverse)));
        assert_eq!(traverse_to_position(&list, 17), Some((35, Strand::Reverse)));
        assert_eq!(traverse_to_position(&list, 18), None);
    }

    #[test]
    fn test_positions_for_offsets() {
        let mut list = spans(&[15, 25]);
        let wide: OffsetSet = (5..1000).collect();
        assert_eq!(positions_for_offsets(&list, &wide), spans(&[20, 25]));

        list.extend(spans(&[300, 320]));
        assert_eq!(positions_for_offsets(&list, &wide), spans(&[20, 25, 300, 320]));

        assert_eq!(positions_for_offsets(&list, &offsets(&[10])), spans(&[25, 25]));
        assert_eq!(
            positions_for_offsets(&list, &offsets(&[10, 11])),
            spans(&[25, 25, 300, 300])
        );
        assert!(positions_for_offsets(&list, &OffsetSet::new()).is_empty());
    }

    #[test]
    fn test_positions_for_offsets_wrapped_traversal() {
        let list = spans(&[100, 150, 60, 80]);
        let set: OffsetSet = (45..55).collect();
        assert_eq!(positions_for_offsets(&list, &set), spans(&[145, 150, 60, 63]));
    }

    #[test]
    fn test_positions_for_offsets_reverse() {
        let list = spans(&[4321, 4000]);
        assert_eq!(
            positions_for_offsets(&list, &offsets(&[20, 21, 30])),
            spans(&[4301, 4300, 4291, 4291])
        );
    }

    #[test]
    fn test_add_offset_positions() {
        let mut mapped = Vec::new();
        let added = add_offset_positions(&mut mapped, 0, Span::new(10, 20), &offsets(&[4, 5, 10]));
        assert_eq!(added, 3);
        assert_eq!(mapped, spans(&[14, 15, 20, 20]));

        let mut mapped = Vec::new();
        let added = add_offset_positions(&mut mapped, 0, Span::new(20, 10), &offsets(&[0, 6, 7, 10]));
        assert_eq!(added, 4);
        assert_eq!(mapped, spans(&[20, 20, 14, 13, 10, 10]));
    }

    #[test]
    fn test_mapped_offsets_one_to_one() {
        let list = spans(&[10, 20, 31, 40]);
        assert!(mapped_offsets_for_positions(1, 9, &list, 1, 1).is_empty());
        assert_eq!(mapped_offsets_for_positions(1, 11, &list, 1, 1), offsets(&[0, 1]));

        // 15-20 is offsets 5-10, 31-35 is offsets 11-15
        let set = mapped_offsets_for_positions(15, 35, &list, 1, 1);
        assert_eq!(set.len(), 11);
        assert_eq!(set, (5..16).collect());
    }

    #[test]
    fn test_mapped_offsets_scaled() {
        // peptide to codon: residue 9 is codon offsets 24-26
        let list = spans(&[1, 200]);
        assert_eq!(mapped_offsets_for_positions(9, 9, &list, 1, 3), offsets(&[24, 25, 26]));

        // codon to peptide: a partial codon still yields its residue
        let list = spans(&[101, 150, 171, 180]);
        assert_eq!(mapped_offsets_for_positions(101, 102, &list, 3, 1), offsets(&[0]));
        assert_eq!(mapped_offsets_for_positions(150, 171, &list, 3, 1), offsets(&[16]));
    }

    #[test]
    fn test_offsets_invert_positions() {
        let list = spans(&[3, 9, 30, 20, 41, 41, 50, 55]);
        let chosen = offsets(&[0, 1, 2, 8, 9, 17, 18, 19, 22]);
        let found = positions_for_offsets(&list, &chosen);
        let mut recovered = OffsetSet::new();
        for span in &found {
            for o in mapped_offsets_for_positions(span.start, span.end, &list, 1, 1).iter() {
                recovered.insert(o);
            }
        }
        assert_eq!(recovered, chosen);
    }

    #[test]
    fn test_offset_set_queries() {
        let mut set = OffsetSet::new();
        set.insert_range(3..=5);
        set.insert(9);
        assert_eq!(set.len(), 4);
        assert!(set.contains(4));
        assert!(!set.contains(6));
        assert!(!set.contains(100));
        assert_eq!(set.next_set(6), Some(9));
        assert_eq!(set.next_set(10), None);
        assert_eq!(set.next_clear(3), 6);
        assert_eq!(set.next_clear(9), 10);
        assert_eq!(set.next_clear(50), 50);
    }
}
