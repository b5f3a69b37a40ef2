//! codonlink - project positions between protein and cDNA alignments
//!
//! Links each protein to the cDNA that encodes it, then carries a column
//! selection, a sequence group, a residue search or a gap edit from one
//! alignment over to the other.
//!
//! ## Usage
//!
//! ```bash
//! codonlink protein.fasta cdna.fasta -c 3,5-8
//! codonlink protein.fasta cdna.fasta --from cdna --hidden 1-12 --json
//! codonlink protein.fasta cdna.fasta -s P12345:40
//! codonlink protein.fasta cdna.fasta --insert-gap P12345:4:2
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use codonlink::edit::{Edit, EditAction, EditCommand};
use codonlink::fasta::parse_fasta_file;
use codonlink::genetic_code::GeneticCode;
use codonlink::linking::link_alignments;
use codonlink::model::Alignment;
use codonlink::projector::{build_matches, find_codons_for, map_column_selection, map_edit_command, map_sequence_group};
use codonlink::registry::MappingRegistry;
use codonlink::report::{ColumnsEntry, EditEntry, GroupEntry, Report, SearchEntry};
use codonlink::selection::{ColumnSelection, HiddenColumns, SequenceGroup};

const REPORT_WIDTH: usize = 100;

/// Alignment the projections start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    /// Project from protein columns to cDNA columns
    Protein,
    /// Project from cDNA columns to protein columns
    Cdna,
}

/// codonlink - map selections and edits between protein and cDNA alignments
///
/// Each protein is linked to the cDNA whose translation matches it (same
/// identifier first, then row order). Columns are 1-based.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Protein alignment (FASTA)
    protein: PathBuf,

    /// cDNA alignment (FASTA)
    cdna: PathBuf,

    /// Genetic code used to match cDNA to protein (1-33, default: 1 = Standard)
    #[arg(short = 'g', long = "genetic-code", default_value = "1")]
    genetic_code: u8,

    /// Alignment the selection, group, search and edit refer to
    #[arg(long = "from", value_enum, default_value = "protein")]
    from: View,

    /// Columns to select, e.g. "3,5-8"
    #[arg(short = 'c', long = "columns")]
    columns: Option<String>,

    /// Hidden column regions, e.g. "1-4,10-12"
    #[arg(long = "hidden")]
    hidden: Option<String>,

    /// Comma-separated sequence identifiers forming a group over the selected columns
    #[arg(long = "group")]
    group: Option<String>,

    /// Residue to search for, as ID:POSITION
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Insert gaps, as ID:COLUMN:COUNT
    #[arg(long = "insert-gap", conflicts_with = "delete_gap")]
    insert_gap: Option<String>,

    /// Delete gaps, as ID:COLUMN:COUNT
    #[arg(long = "delete-gap")]
    delete_gap: Option<String>,

    /// Write the report as JSON
    #[arg(long = "json")]
    json: bool,

    /// Log mapping decisions
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Parses "3,5-8" into 0-based inclusive column ranges.
fn parse_column_list(list: &str) -> Result<Vec<(usize, usize)>> {
    let mut ranges = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (first, last) = match item.split_once('-') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (item, item),
        };
        let first: usize = first.parse().with_context(|| format!("Invalid column: {}", item))?;
        let last: usize = last.parse().with_context(|| format!("Invalid column: {}", item))?;
        if first == 0 || last == 0 {
            bail!("Columns are numbered from 1 (got {})", item);
        }
        ranges.push((first.min(last) - 1, first.max(last) - 1));
    }
    if ranges.is_empty() {
        bail!("Empty column list: {:?}", list);
    }
    Ok(ranges)
}

/// Parses "ID:POSITION".
fn parse_search(spec: &str) -> Result<(&str, i64)> {
    let (id, pos) = spec
        .rsplit_once(':')
        .with_context(|| format!("Expected ID:POSITION, got {:?}", spec))?;
    let pos = pos.parse().with_context(|| format!("Invalid position in {:?}", spec))?;
    Ok((id, pos))
}

/// Parses "ID:COLUMN:COUNT" into the id, a 0-based column and the count.
fn parse_edit(spec: &str) -> Result<(&str, usize, usize)> {
    let mut parts = spec.rsplitn(3, ':');
    let (Some(count), Some(column), Some(id)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("Expected ID:COLUMN:COUNT, got {:?}", spec);
    };
    let column: usize = column.parse().with_context(|| format!("Invalid column in {:?}", spec))?;
    let count: usize = count.parse().with_context(|| format!("Invalid count in {:?}", spec))?;
    if column == 0 || count == 0 {
        bail!("Column and count must be positive (got {:?})", spec);
    }
    Ok((id, column - 1, count))
}

fn row_of(alignment: &Alignment, id: &str) -> Result<usize> {
    alignment
        .position_of(id)
        .with_context(|| format!("No sequence named {:?} in the source alignment", id))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = GeneticCode::by_id(args.genetic_code)
        .with_context(|| format!("Unknown genetic code: {}", args.genetic_code))?;

    let protein = parse_fasta_file(&args.protein)
        .with_context(|| format!("Failed to read {}", args.protein.display()))?;
    let cdna =
        parse_fasta_file(&args.cdna).with_context(|| format!("Failed to read {}", args.cdna.display()))?;
    for (alignment, path) in [(&protein, &args.protein), (&cdna, &args.cdna)] {
        if let Some(warning) = &alignment.warning {
            warn!("{}: {}", path.display(), warning);
        }
    }
    if protein.is_nucleotide() {
        warn!("{} looks like nucleotides", args.protein.display());
    }
    if !cdna.is_nucleotide() {
        warn!("{} does not look like nucleotides", args.cdna.display());
    }

    let mut registry = MappingRegistry::new();
    let linked = link_alignments(&protein, &cdna, &mut registry, &code);
    if linked == 0 {
        bail!("No cDNA sequence translates to any protein sequence (genetic code {})", code.id);
    }
    info!("linked {} of {} proteins using the {} code", linked, protein.sequence_count(), code.name);

    let (source, target) = match args.from {
        View::Protein => (&protein, &cdna),
        View::Cdna => (&cdna, &protein),
    };

    let mut report = Report::with_links(&registry, &protein, &cdna);

    let column_ranges = args.columns.as_deref().map(parse_column_list).transpose()?;
    let hidden_ranges = args.hidden.as_deref().map(parse_column_list).transpose()?;

    if column_ranges.is_some() || hidden_ranges.is_some() {
        let mut selection = ColumnSelection::new();
        for &(first, last) in column_ranges.iter().flatten() {
            selection.add_range(first, last);
        }
        let mut hidden = HiddenColumns::new();
        for &(first, last) in hidden_ranges.iter().flatten() {
            hidden.hide_columns(first, last);
        }
        if selection.columns().chain(hidden.regions().iter().map(|r| r.1)).any(|c| c >= source.width()) {
            warn!("some columns lie beyond the source alignment width ({})", source.width());
        }
        let (mapped_selection, mapped_hidden) = map_column_selection(&selection, &hidden, source, target, &registry);
        report.columns = Some(ColumnsEntry::new(&selection, &hidden, &mapped_selection, &mapped_hidden));
    }

    if let Some(ids) = &args.group {
        let (start, end) = match &column_ranges {
            Some(ranges) => (
                ranges.iter().map(|r| r.0).min().unwrap_or(0),
                ranges.iter().map(|r| r.1).max().unwrap_or(0),
            ),
            None => (0, source.width().saturating_sub(1)),
        };
        let mut group = SequenceGroup::new("group", start, end);
        for id in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            group.add_sequence(row_of(source, id)?);
        }
        let mapped = map_sequence_group(&group, source, target, &registry);
        report.group = Some(GroupEntry::new(&mapped, target));
    }

    if let Some(spec) = &args.search {
        let (id, pos) = parse_search(spec)?;
        let seq = &source.sequences[row_of(source, id)?];
        let matches = build_matches(seq, pos, &registry);
        let codons = match (args.from, seq.find_index(pos)) {
            (View::Protein, Some(col)) => find_codons_for(seq, col, &registry, &cdna),
            _ => Vec::new(),
        };
        report.search = Some(SearchEntry::new(id, pos, &matches, target, codons));
    }

    let edit_spec = match (&args.insert_gap, &args.delete_gap) {
        (Some(spec), _) => Some((EditAction::InsertGap, spec)),
        (None, Some(spec)) => Some((EditAction::DeleteGap, spec)),
        (None, None) => None,
    };
    if let Some((action, spec)) = edit_spec {
        let (id, column, count) = parse_edit(spec)?;
        let mut command = EditCommand::new(format!("{:?} {}", action, spec));
        command.add_edit(Edit::new(action, vec![row_of(source, id)?], column, count, source.gap_char));
        match map_edit_command(&command, source, target, &registry, false) {
            Some(mapped) => report.edit = Some(EditEntry::new(&mapped, target)),
            None => warn!("the edit {:?} does not map onto the other alignment", spec),
        }
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.to_text(REPORT_WIDTH));
    }

    Ok(())
}
