//! Gap insertion and deletion edits on alignments.

use serde::Serialize;

use crate::model::Alignment;

/// Kind of column edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EditAction {
    InsertGap,
    DeleteGap,
}

impl EditAction {
    /// The action that reverts this one.
    pub fn undo_action(self) -> Self {
        match self {
            EditAction::InsertGap => EditAction::DeleteGap,
            EditAction::DeleteGap => EditAction::InsertGap,
        }
    }
}

/// One edit: `count` gaps inserted or deleted at `position` in the given rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub action: EditAction,
    pub sequences: Vec<usize>,
    pub position: usize,
    pub count: usize,
    pub gap_char: char,
}

impl Edit {
    pub fn new(action: EditAction, sequences: Vec<usize>, position: usize, count: usize, gap_char: char) -> Self {
        Self {
            action,
            sequences,
            position,
            count,
            gap_char,
        }
    }

    /// Applies the edit to every listed row; rows outside the alignment are skipped.
    pub fn apply(&self, alignment: &mut Alignment) {
        for &row in &self.sequences {
            if let Some(seq) = alignment.sequences.get_mut(row) {
                match self.action {
                    EditAction::InsertGap => seq.insert_gaps(self.position, self.count, self.gap_char),
                    EditAction::DeleteGap => seq.delete_gaps(self.position, self.count),
                }
            }
        }
        alignment.refresh();
    }
}

/// An ordered list of edits performed as one user action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditCommand {
    pub description: String,
    edits: Vec<Edit>,
}

impl EditCommand {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            edits: Vec::new(),
        }
    }

    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn size(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies every edit in order.
    pub fn apply(&self, alignment: &mut Alignment) {
        for edit in &self.edits {
            edit.apply(alignment);
        }
    }
}
