//! Report of a projection run, as JSON or wrapped text.
//!
//! Columns and residue positions in reports are 1-based, as users count them.

use serde::Serialize;

use crate::edit::{EditAction, EditCommand};
use crate::model::Alignment;
use crate::registry::{Match, MappingRegistry};
use crate::selection::{ColumnSelection, HiddenColumns, SequenceGroup};

/// One registered cDNA/protein link.
#[derive(Debug, Clone, Serialize)]
pub struct LinkEntry {
    pub cdna: String,
    pub protein: String,
    pub map: String,
}

/// A column selection and its image in the other view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnsEntry {
    pub selected: Vec<usize>,
    pub hidden: Vec<(usize, usize)>,
    pub mapped_selected: Vec<usize>,
    pub mapped_hidden: Vec<(usize, usize)>,
}

impl ColumnsEntry {
    pub fn new(
        selection: &ColumnSelection,
        hidden: &HiddenColumns,
        mapped_selection: &ColumnSelection,
        mapped_hidden: &HiddenColumns,
    ) -> Self {
        let one_based_regions =
            |h: &HiddenColumns| h.regions().iter().map(|&(s, e)| (s + 1, e + 1)).collect::<Vec<_>>();
        Self {
            selected: selection.columns().map(|c| c + 1).collect(),
            hidden: one_based_regions(hidden),
            mapped_selected: mapped_selection.columns().map(|c| c + 1).collect(),
            mapped_hidden: one_based_regions(mapped_hidden),
        }
    }
}

/// A mapped sequence group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupEntry {
    pub name: String,
    pub members: Vec<String>,
    pub start: usize,
    pub end: usize,
}

impl GroupEntry {
    pub fn new(group: &SequenceGroup, alignment: &Alignment) -> Self {
        Self {
            name: group.name.clone(),
            members: group
                .sequences()
                .iter()
                .filter_map(|&row| alignment.get(row))
                .map(|seq| seq.id.clone())
                .collect(),
            start: group.start_res + 1,
            end: group.end_res + 1,
        }
    }
}

/// A region found by a residue search.
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub sequence: String,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    pub sequence: String,
    pub position: i64,
    pub hits: Vec<Hit>,
    pub codons: Vec<String>,
}

impl SearchEntry {
    /// Names hits after the first row of `target` holding their dataset.
    pub fn new(sequence: &str, position: i64, matches: &[Match], target: &Alignment, codons: Vec<Vec<u8>>) -> Self {
        let hits = matches
            .iter()
            .map(|m| Hit {
                sequence: target
                    .find_by_dataset(m.dataset)
                    .and_then(|row| target.get(row))
                    .map_or_else(|| "?".to_string(), |seq| seq.id.clone()),
                start: m.start,
                end: m.end,
            })
            .collect();
        Self {
            sequence: sequence.to_string(),
            position,
            hits,
            codons: codons
                .into_iter()
                .map(|codon| String::from_utf8_lossy(&codon).into_owned())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EditLine {
    pub action: EditAction,
    pub sequences: Vec<String>,
    pub column: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditEntry {
    pub description: String,
    pub edits: Vec<EditLine>,
}

impl EditEntry {
    pub fn new(command: &EditCommand, alignment: &Alignment) -> Self {
        Self {
            description: command.description.clone(),
            edits: command
                .edits()
                .iter()
                .map(|edit| EditLine {
                    action: edit.action,
                    sequences: edit
                        .sequences
                        .iter()
                        .filter_map(|&row| alignment.get(row))
                        .map(|seq| seq.id.clone())
                        .collect(),
                    column: edit.position + 1,
                    count: edit.count,
                })
                .collect(),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub links: Vec<LinkEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnsEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditEntry>,
}

impl Report {
    /// Lists the links in `registry`, naming each side after its row in the alignments.
    pub fn with_links(registry: &MappingRegistry, protein: &Alignment, cdna: &Alignment) -> Self {
        let name = |alignment: &Alignment, mapping_side| {
            alignment
                .find_by_dataset(mapping_side)
                .and_then(|row| alignment.get(row))
                .map_or_else(|| "?".to_string(), |seq| seq.id.clone())
        };
        let links = registry
            .iter()
            .map(|mapping| LinkEntry {
                cdna: name(cdna, mapping.from.dataset),
                protein: name(protein, mapping.to.dataset),
                map: mapping.map.to_string(),
            })
            .collect();
        Self {
            links,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the report as text wrapped to `width` columns.
    pub fn to_text(&self, width: usize) -> String {
        let mut lines = Vec::new();
        let wrap = |text: String| {
            textwrap::fill(&text, textwrap::Options::new(width).subsequent_indent("    "))
        };

        lines.push(format!("Links: {}", self.links.len()));
        for link in &self.links {
            lines.push(wrap(format!("  {} -> {}: {}", link.cdna, link.protein, link.map)));
        }

        if let Some(columns) = &self.columns {
            lines.push(wrap(format!("Selected columns: {}", join(&columns.selected))));
            lines.push(wrap(format!("  mapped to: {}", join(&columns.mapped_selected))));
            if !columns.hidden.is_empty() {
                lines.push(wrap(format!("Hidden columns: {}", join_regions(&columns.hidden))));
                lines.push(wrap(format!("  mapped to: {}", join_regions(&columns.mapped_hidden))));
            }
        }

        if let Some(group) = &self.group {
            lines.push(wrap(format!(
                "Group {}: columns {}-{}, members {}",
                group.name,
                group.start,
                group.end,
                group.members.join(", ")
            )));
        }

        if let Some(search) = &self.search {
            let hits: Vec<String> = search
                .hits
                .iter()
                .map(|hit| format!("{}:{}-{}", hit.sequence, hit.start, hit.end))
                .collect();
            lines.push(wrap(format!(
                "Residue {} of {}: {}",
                search.position,
                search.sequence,
                if hits.is_empty() { "unmapped".to_string() } else { hits.join(", ") }
            )));
            if !search.codons.is_empty() {
                lines.push(format!("  codons: {}", search.codons.join(", ")));
            }
        }

        if let Some(edit) = &self.edit {
            lines.push(format!("Edit: {}", edit.description));
            for line in &edit.edits {
                let verb = match line.action {
                    EditAction::InsertGap => "insert",
                    EditAction::DeleteGap => "delete",
                };
                lines.push(wrap(format!(
                    "  {} {} gap(s) at column {} in {}",
                    verb,
                    line.count,
                    line.column,
                    line.sequences.join(", ")
                )));
            }
        }

        lines.join("\n")
    }
}

fn join(columns: &[usize]) -> String {
    if columns.is_empty() {
        return "none".to_string();
    }
    columns.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
}

fn join_regions(regions: &[(usize, usize)]) -> String {
    if regions.is_empty() {
        return "none".to_string();
    }
    regions
        .iter()
        .map(|(s, e)| format!("{s}-{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}
