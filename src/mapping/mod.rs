//! Ratio-based interval mapping between two coordinate systems.
//!
//! This module provides:
//! - `Span`: an inclusive, possibly reversed, position range
//! - `RatioIntervalMap`: paired span lists with a unit ratio (e.g. 3:1 codon to residue)
//! - offset/unit arithmetic shared by every lookup
//! - helpers over span lists (`flatten_ranges`, `find_overlap`, ...)
//!
//! Lookups that cover nothing return `None` or an empty result. Errors are
//! reserved for maps that cannot exist (a zero ratio) or cannot be merged.

pub mod map;
pub mod offsets;
pub mod ranges;
pub mod span;

use thiserror::Error;

pub use map::{add_range, coalesce_ranges, RatioIntervalMap, ShiftedPosition};
pub use offsets::OffsetSet;
pub use ranges::{
    contains, find_overlap, flatten_ranges, get_length, range_contains, remove_end_positions,
    remove_start_positions,
};
pub use span::{Span, Strand};

/// Errors raised when building or merging interval maps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Unit ratio must be positive (got {from}:{to})")]
    ZeroRatio { from: usize, to: usize },

    #[error("Cannot merge a map with ratio {found:?} into one with ratio {expected:?}")]
    RatioMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Result type for mapping operations.
pub type MapResult<T> = Result<T, MapError>;
