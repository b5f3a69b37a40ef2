//! Sequence and alignment model.
//!
//! This module contains the data structures the projector reads:
//! - Aligned sequences with residue numbering (`start`/`end`)
//! - Column <-> residue conversion (`find_position`, `find_index`)
//! - Dataset identity, so aligned copies of one underlying sequence are recognised
//! - Alignments with sequence type detection and a ragged-input warning

use std::borrow::Cow;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static NEXT_DATASET: AtomicU64 = AtomicU64::new(1);

/// Identity of an underlying (ungapped) dataset sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DatasetId(u64);

impl DatasetId {
    /// Allocates an identity not shared with any other dataset.
    pub fn fresh() -> Self {
        Self(NEXT_DATASET.fetch_add(1, Ordering::Relaxed))
    }
}

/// Returns true for alignment gap characters.
pub fn is_gap_char(c: u8) -> bool {
    matches!(c, b'-' | b'.' | b' ')
}

/// Nucleotide or amino acid content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequenceType {
    Nucleotide,
    AminoAcid,
}

impl SequenceType {
    /// Guesses the type from residues: mostly A/C/G/T/U/N means nucleotide.
    pub fn detect<'a>(sequences: impl IntoIterator<Item = &'a Sequence>) -> Self {
        let mut residues = 0usize;
        let mut nucleotides = 0usize;
        for seq in sequences {
            for &c in seq.as_bytes().iter().filter(|c| !is_gap_char(**c)) {
                residues += 1;
                if matches!(c.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'U' | b'N') {
                    nucleotides += 1;
                }
            }
        }
        if residues > 0 && nucleotides * 10 >= residues * 9 {
            SequenceType::Nucleotide
        } else {
            SequenceType::AminoAcid
        }
    }
}

/// An aligned sequence: gapped data plus the residue number of its first residue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    data: Vec<u8>,
    start: i64,
    dataset: DatasetId,
}

impl Sequence {
    /// Creates a sequence numbered from 1 with its own dataset identity.
    pub fn new(id: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            start: 1,
            dataset: DatasetId::fresh(),
        }
    }

    /// Sets the residue number of the first residue.
    pub fn with_start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    /// Makes this sequence an aligned copy of an existing dataset sequence.
    pub fn with_dataset(mut self, dataset: DatasetId) -> Self {
        self.dataset = dataset;
        self
    }

    /// Returns the length of the sequence in columns.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The data as text, with invalid UTF-8 replaced.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Gets the character at a column.
    pub fn char_at(&self, col: usize) -> Option<char> {
        self.as_bytes().get(col).map(|&b| b as char)
    }

    /// Gets a slice of the sequence data.
    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        let start = range.start.min(self.data.len());
        let end = range.end.min(self.data.len());
        &self.data[start..end]
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    /// Residue number of the last residue (`start - 1` when there are none).
    pub fn end(&self) -> i64 {
        self.start + self.residue_count() as i64 - 1
    }

    pub fn dataset(&self) -> DatasetId {
        self.dataset
    }

    /// True when both are aligned copies of the same dataset sequence.
    pub fn shares_dataset(&self, other: &Sequence) -> bool {
        self.dataset == other.dataset
    }

    /// True when the column holds a gap or lies beyond the sequence.
    pub fn is_gap(&self, col: usize) -> bool {
        self.as_bytes().get(col).map_or(true, |&c| is_gap_char(c))
    }

    /// Number of non-gap characters.
    pub fn residue_count(&self) -> usize {
        self.as_bytes().iter().filter(|c| !is_gap_char(**c)).count()
    }

    /// Residue number at a column.
    ///
    /// A gap column gives the number of the next residue to its right.
    pub fn find_position(&self, col: usize) -> i64 {
        let before = self
            .as_bytes()
            .iter()
            .take(col)
            .filter(|c| !is_gap_char(**c))
            .count();
        self.start + before as i64
    }

    /// 0-based column of a residue number, `None` outside `start..=end`.
    pub fn find_index(&self, pos: i64) -> Option<usize> {
        if pos < self.start {
            return None;
        }
        let wanted = (pos - self.start) as usize;
        self.as_bytes()
            .iter()
            .enumerate()
            .filter(|(_, c)| !is_gap_char(**c))
            .nth(wanted)
            .map(|(col, _)| col)
    }

    /// Character of a residue number.
    pub fn residue_at(&self, pos: i64) -> Option<u8> {
        self.find_index(pos).map(|col| self.as_bytes()[col])
    }

    /// The residues without gaps.
    pub fn ungapped(&self) -> Vec<u8> {
        self.data.iter().copied().filter(|&c| !is_gap_char(c)).collect()
    }

    /// Inserts `count` gap characters before `col`, padding with gaps if `col` is past the end.
    ///
    /// A non-ASCII `gap_char` is written as `-`.
    pub fn insert_gaps(&mut self, col: usize, count: usize, gap_char: char) {
        let gap = if gap_char.is_ascii() { gap_char as u8 } else { b'-' };
        if col > self.data.len() {
            self.data.resize(col, gap);
        }
        self.data.splice(col..col, std::iter::repeat(gap).take(count));
    }

    /// Removes up to `count` characters starting at `col`.
    pub fn delete_gaps(&mut self, col: usize, count: usize) {
        let start = col.min(self.data.len());
        let end = col.saturating_add(count).min(self.data.len());
        self.data.drain(start..end);
    }
}

/// Represents an alignment of multiple sequences.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// All sequences in the alignment
    pub sequences: Vec<Sequence>,
    /// Detected content type
    pub sequence_type: SequenceType,
    /// Gap character used when inserting gaps
    pub gap_char: char,
    /// The expected length of all sequences (if aligned)
    alignment_length: Option<usize>,
    /// Whether all sequences have the same length
    pub is_valid_alignment: bool,
    /// Warning message if sequences have different lengths
    pub warning: Option<String>,
}

impl Alignment {
    /// Creates a new alignment from a vector of sequences.
    pub fn new(sequences: Vec<Sequence>) -> Self {
        let (is_valid, alignment_length, warning) = Self::validate_alignment(&sequences);
        let sequence_type = SequenceType::detect(&sequences);
        let gap_char = sequences
            .iter()
            .flat_map(|s| s.as_bytes().iter())
            .find(|c| is_gap_char(**c))
            .map(|&c| c as char)
            .unwrap_or('-');
        Self {
            sequences,
            sequence_type,
            gap_char,
            alignment_length,
            is_valid_alignment: is_valid,
            warning,
        }
    }

    /// Validates that all sequences have the same length.
    fn validate_alignment(sequences: &[Sequence]) -> (bool, Option<usize>, Option<String>) {
        let Some(first) = sequences.first() else {
            return (true, None, None);
        };

        let first_len = first.len();
        if sequences.iter().all(|s| s.len() == first_len) {
            return (true, Some(first_len), None);
        }

        let min_len = sequences.iter().map(|s| s.len()).min().unwrap_or(0);
        let max_len = sequences.iter().map(|s| s.len()).max().unwrap_or(0);
        let warning = format!(
            "Warning: Sequences have different lengths (min: {}, max: {}). Not a valid alignment.",
            min_len, max_len
        );
        (false, Some(max_len), Some(warning))
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the alignment width (max sequence length).
    pub fn width(&self) -> usize {
        self.alignment_length.unwrap_or(0)
    }

    pub fn is_nucleotide(&self) -> bool {
        self.sequence_type == SequenceType::Nucleotide
    }

    /// Gets a sequence by row.
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    /// Row of the first sequence with this identifier.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.sequences.iter().position(|s| s.id == id)
    }

    /// Row of the first sequence aligned from this dataset.
    pub fn find_by_dataset(&self, dataset: DatasetId) -> Option<usize> {
        self.sequences.iter().position(|s| s.dataset == dataset)
    }

    /// Returns true if the alignment is empty.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Recomputes width and validity after sequences were edited.
    pub fn refresh(&mut self) {
        let (is_valid, alignment_length, warning) = Self::validate_alignment(&self.sequences);
        self.is_valid_alignment = is_valid;
        self.alignment_length = alignment_length;
        self.warning = warning;
    }
}
