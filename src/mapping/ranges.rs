//! Small helpers over span lists.

use super::span::Span;

/// Expands a flat `[s1, e1, s2, e2, ...]` array into every position it covers.
///
/// Reverse pairs are expanded downwards. A trailing unpaired value is ignored.
pub fn flatten_ranges(flat: &[i64]) -> Vec<i64> {
    Span::pairs_from_flat(flat)
        .iter()
        .flat_map(|s| s.positions())
        .collect()
}

/// Total number of positions covered by `spans`.
pub fn get_length(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.len() as usize).sum()
}

/// Whether any span covers `value`.
pub fn contains(spans: &[Span], value: i64) -> bool {
    spans.iter().any(|s| s.contains(value))
}

/// Whether both ends of `inner` lie within `outer`, ignoring direction.
pub fn range_contains(outer: Span, inner: Span) -> bool {
    outer.contains(inner.start) && outer.contains(inner.end)
}

/// Drops the first `count` positions, returning a new list.
///
/// Whole spans are dropped and the span the count ends in is shortened
/// from its start, keeping its direction. Removing every position leaves
/// an empty list.
pub fn remove_start_positions(count: usize, spans: &[Span]) -> Vec<Span> {
    if count == 0 {
        return spans.to_vec();
    }
    let mut walked = 0usize;
    for (i, span) in spans.iter().enumerate() {
        walked += span.len() as usize;
        if count < walked {
            let keep = (walked - count) as i64;
            let trimmed = Span::new(span.end - span.strand().step() * (keep - 1), span.end);
            let mut rest = vec![trimmed];
            rest.extend_from_slice(&spans[i + 1..]);
            return rest;
        }
    }
    Vec::new()
}

/// Drops the last `count` positions in place, shortening or removing spans from the end.
pub fn remove_end_positions(count: usize, spans: &mut Vec<Span>) {
    let mut to_remove = count as i64;
    while to_remove > 0 {
        let Some(last) = spans.last_mut() else {
            return;
        };
        let len = last.len();
        if len > to_remove {
            last.end -= last.strand().step() * to_remove;
            return;
        }
        to_remove -= len;
        spans.pop();
    }
}

/// Clips `begin..=end` to the extent covered by `spans`.
///
/// The result runs from the lowest to the highest covered position inside
/// the query, whatever the direction of the spans or of the query. `None`
/// when no position of the query is covered.
pub fn find_overlap(spans: &[Span], begin: i64, end: i64) -> Option<Span> {
    let (lo, hi) = (begin.min(end), begin.max(end));
    spans
        .iter()
        .filter(|span| span.min() <= hi && span.max() >= lo)
        .map(|span| (span.min().max(lo), span.max().min(hi)))
        .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)))
        .map(|(from, to)| Span::new(from, to))
}
