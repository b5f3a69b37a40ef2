//! Registry of interval maps between sequences.
//!
//! Each entry links two dataset sequences through a `RatioIntervalMap`:
//! - "from" is usually the cDNA (nucleotide positions)
//! - "to" is usually the protein (residue positions)
//!
//! The registry is owned by the caller and passed by reference into the
//! projector; nothing here is global.

use log::{debug, warn};
use serde::Serialize;

use crate::mapping::{MapError, RatioIntervalMap, Span};
use crate::model::{Alignment, DatasetId, Sequence};

/// A dataset sequence and the residue numbers it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetRef {
    pub dataset: DatasetId,
    pub start: i64,
    pub end: i64,
}

impl DatasetRef {
    pub fn of(seq: &Sequence) -> Self {
        Self {
            dataset: seq.dataset(),
            start: seq.start(),
            end: seq.end(),
        }
    }

    fn len(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// A located region of a mapped sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Dataset the region belongs to.
    pub dataset: DatasetId,
    pub start: i64,
    pub end: i64,
    /// Positions per unit on the queried side.
    pub source_ratio: usize,
    /// Positions per unit on the matched side.
    pub target_ratio: usize,
}

/// One registered link between two dataset sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceMapping {
    pub from: DatasetRef,
    pub to: DatasetRef,
    pub map: RatioIntervalMap,
}

/// Total length of `spans` when all lie inside `start..=end`.
fn count_within(spans: &[Span], start: i64, end: i64) -> Option<i64> {
    spans.iter().try_fold(0, |total, span| {
        if span.min() < start || span.max() > end {
            None
        } else {
            Some(total + span.len())
        }
    })
}

impl SequenceMapping {
    /// True when either side is the sequence's dataset.
    pub fn involves(&self, seq: &Sequence) -> bool {
        self.involves_dataset(seq.dataset())
    }

    pub fn involves_dataset(&self, dataset: DatasetId) -> bool {
        self.from.dataset == dataset || self.to.dataset == dataset
    }

    /// The dataset on the opposite side from `seq`.
    pub fn other_side(&self, seq: &Sequence) -> Option<DatasetId> {
        if self.from.dataset == seq.dataset() {
            Some(self.to.dataset)
        } else if self.to.dataset == seq.dataset() {
            Some(self.from.dataset)
        } else {
            None
        }
    }

    /// Checks that the mapping accounts for the whole of `seq`.
    ///
    /// Every mapped span on the sequence's side must lie within its residue
    /// range (or the dataset's range with `local_cover`), and the mapped
    /// length plus a trailing stop codon must reach the range length. With
    /// `either`, full coverage of the other side's dataset also counts.
    pub fn covers(&self, seq: &Sequence, local_cover: bool, either: bool) -> bool {
        let (own, mapped, other, other_spans) = if self.from.dataset == seq.dataset() {
            (&self.from, self.map.from_ranges(), &self.to, self.map.to_ranges())
        } else if self.to.dataset == seq.dataset() {
            (&self.to, self.map.to_ranges(), &self.from, self.map.from_ranges())
        } else {
            return false;
        };

        let (start, end) = if local_cover {
            (own.start, own.end)
        } else {
            (seq.start(), seq.end())
        };
        if let Some(length) = count_within(mapped, start, end) {
            if length + 3 >= end - start + 1 {
                return true;
            }
        }
        if either {
            if let Some(length) = count_within(other_spans, other.start, other.end) {
                if length + 1 >= other.len() {
                    return true;
                }
            }
        }
        false
    }

    /// Regions of the other side mapped to residue `pos` of `seq`.
    pub fn mark_mapped_region(&self, seq: &Sequence, pos: i64) -> Vec<Match> {
        let (located, dataset, source_ratio, target_ratio) = if self.from.dataset == seq.dataset() {
            (
                self.map.locate_in_to(pos, pos),
                self.to.dataset,
                self.map.from_ratio(),
                self.map.to_ratio(),
            )
        } else if self.to.dataset == seq.dataset() {
            (
                self.map.locate_in_from(pos, pos),
                self.from.dataset,
                self.map.to_ratio(),
                self.map.from_ratio(),
            )
        } else {
            return Vec::new();
        };

        located
            .unwrap_or_default()
            .into_iter()
            .map(|span| Match {
                dataset,
                start: span.start,
                end: span.end,
                source_ratio,
                target_ratio,
            })
            .collect()
    }
}

/// Caller-owned collection of sequence mappings.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    mappings: Vec<SequenceMapping>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `map` from `from`'s dataset to `to`'s dataset.
    ///
    /// A map for an already linked pair is merged into the existing entry;
    /// registering the same map twice changes nothing.
    pub fn add_map(&mut self, from: &Sequence, to: &Sequence, map: RatioIntervalMap) {
        let from_ref = DatasetRef::of(from);
        let to_ref = DatasetRef::of(to);

        if let Some(existing) = self
            .mappings
            .iter_mut()
            .find(|m| m.from.dataset == from_ref.dataset && m.to.dataset == to_ref.dataset)
        {
            match existing.map.add_map_list(&map) {
                Ok(()) => {
                    debug!("merged mapping {} -> {}: {}", from.id, to.id, existing.map);
                    return;
                }
                Err(e @ MapError::RatioMismatch { .. }) => {
                    warn!("{} -> {}: {}; keeping a separate mapping", from.id, to.id, e);
                }
                Err(e) => warn!("{} -> {}: {}", from.id, to.id, e),
            }
        }

        debug!("added mapping {} -> {}: {}", from.id, to.id, map);
        self.mappings.push(SequenceMapping {
            from: from_ref,
            to: to_ref,
            map,
        });
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequenceMapping> {
        self.mappings.iter()
    }

    /// Every mapping with `seq`'s dataset on either side.
    pub fn maps_involving(&self, seq: &Sequence) -> Vec<&SequenceMapping> {
        self.mappings.iter().filter(|m| m.involves(seq)).collect()
    }

    /// True when some mapping links the two datasets, in either direction.
    pub fn links(&self, a: DatasetId, b: DatasetId) -> bool {
        self.mappings.iter().any(|m| {
            (m.from.dataset == a && m.to.dataset == b) || (m.from.dataset == b && m.to.dataset == a)
        })
    }

    /// Positions of `target` mapped to residue `pos` of `query`.
    pub fn mapped_region(&self, target: &Sequence, query: &Sequence, pos: i64) -> Option<Vec<Span>> {
        self.mappings.iter().find_map(|m| {
            if m.from.dataset == target.dataset() && m.to.dataset == query.dataset() {
                m.map.locate_in_from(pos, pos)
            } else if m.from.dataset == query.dataset() && m.to.dataset == target.dataset() {
                m.map.locate_in_to(pos, pos)
            } else {
                None
            }
        })
    }

    /// Row of `alignment` holding a sequence mapped to `seq`.
    ///
    /// Mappings from `seq` are tried before mappings to it.
    pub fn find_aligned_sequence(&self, seq: &Sequence, alignment: &Alignment) -> Option<usize> {
        let forward = self
            .mappings
            .iter()
            .filter(|m| m.from.dataset == seq.dataset())
            .find_map(|m| alignment.find_by_dataset(m.to.dataset));
        forward.or_else(|| {
            self.mappings
                .iter()
                .filter(|m| m.to.dataset == seq.dataset())
                .find_map(|m| alignment.find_by_dataset(m.from.dataset))
        })
    }

    /// A mapping that covers both sequences.
    pub fn covering_mapping(&self, a: &Sequence, b: &Sequence) -> Option<&SequenceMapping> {
        self.mappings
            .iter()
            .find(|m| m.covers(b, false, false) && m.covers(a, false, false))
    }
}
