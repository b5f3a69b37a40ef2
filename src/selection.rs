//! Column selections, hidden column regions and sequence groups.
//!
//! All columns are 0-based alignment columns. Groups refer to sequences by
//! row in the alignment they were made on.

use std::collections::BTreeSet;

use serde::Serialize;

/// A set of selected columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnSelection {
    selected: BTreeSet<usize>,
}

impl ColumnSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, col: usize) {
        self.selected.insert(col);
    }

    pub fn add_range(&mut self, first: usize, last: usize) {
        self.selected.extend(first..=last);
    }

    pub fn remove_column(&mut self, col: usize) {
        self.selected.remove(&col);
    }

    pub fn contains(&self, col: usize) -> bool {
        self.selected.contains(&col)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Selected columns in ascending order.
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }
}

impl FromIterator<usize> for ColumnSelection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

/// Hidden column regions, kept sorted and merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HiddenColumns {
    regions: Vec<(usize, usize)>,
}

impl HiddenColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hides `first..=last`, merging with overlapping or adjacent regions.
    pub fn hide_columns(&mut self, first: usize, last: usize) {
        let (mut first, mut last) = (first.min(last), first.max(last));
        let mut kept = Vec::with_capacity(self.regions.len() + 1);
        for &(start, end) in &self.regions {
            if end + 1 < first || last + 1 < start {
                kept.push((start, end));
            } else {
                first = first.min(start);
                last = last.max(end);
            }
        }
        kept.push((first, last));
        kept.sort_unstable();
        self.regions = kept;
    }

    pub fn is_hidden(&self, col: usize) -> bool {
        self.regions.iter().any(|&(s, e)| col >= s && col <= e)
    }

    pub fn regions(&self) -> &[(usize, usize)] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Display attributes carried along when a group is mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStyle {
    pub colour_text: bool,
    pub show_boxes: bool,
    pub show_text: bool,
    pub id_colour: Option<Rgb>,
    pub outline_colour: Option<Rgb>,
    pub text_colour: Option<Rgb>,
}

impl Default for GroupStyle {
    fn default() -> Self {
        Self {
            colour_text: false,
            show_boxes: true,
            show_text: true,
            id_colour: None,
            outline_colour: None,
            text_colour: None,
        }
    }
}

/// A rectangular selection: some rows over a column range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceGroup {
    pub name: String,
    sequences: Vec<usize>,
    pub start_res: usize,
    pub end_res: usize,
    pub style: GroupStyle,
}

impl SequenceGroup {
    pub fn new(name: impl Into<String>, start_res: usize, end_res: usize) -> Self {
        Self {
            name: name.into(),
            sequences: Vec::new(),
            start_res,
            end_res,
            style: GroupStyle::default(),
        }
    }

    /// Same name and style, no sequences, columns reset to 0.
    pub fn empty_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            sequences: Vec::new(),
            start_res: 0,
            end_res: 0,
            style: self.style.clone(),
        }
    }

    /// Adds a row unless it is already a member.
    pub fn add_sequence(&mut self, row: usize) {
        if !self.sequences.contains(&row) {
            self.sequences.push(row);
        }
    }

    pub fn remove_sequence(&mut self, row: usize) {
        self.sequences.retain(|&r| r != row);
    }

    /// Member rows in the order they were added.
    pub fn sequences(&self) -> &[usize] {
        &self.sequences
    }

    pub fn contains(&self, row: usize) -> bool {
        self.sequences.contains(&row)
    }

    pub fn clear(&mut self) {
        self.sequences.clear();
    }

    pub fn size(&self) -> usize {
        self.sequences.len()
    }
}
