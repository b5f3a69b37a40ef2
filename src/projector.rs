//! Projecting selections, groups, edits and orderings between linked alignments.
//!
//! Every operation here reads a source alignment, a target alignment and the
//! registry linking their dataset sequences, and builds a fresh result for
//! the target. Nothing is cached between calls.
//!
//! Column numbers are 0-based alignment columns; residue positions are the
//! 1-based numbers carried by each sequence (`start..=end`).

use log::debug;

use crate::edit::{Edit, EditAction, EditCommand};
use crate::model::{Alignment, Sequence};
use crate::registry::{Match, MappingRegistry, SequenceMapping};
use crate::selection::{ColumnSelection, HiddenColumns, SequenceGroup};

/// Regions mapped to residue `pos` of `seq` by every mapping covering it.
///
/// A position shared by two codons (a splice junction) yields one match per
/// mapped region. Positions outside the sequence give nothing.
pub fn build_matches(seq: &Sequence, pos: i64, registry: &MappingRegistry) -> Vec<Match> {
    if pos < seq.start() || pos > seq.end() {
        return Vec::new();
    }
    registry
        .iter()
        .filter(|mapping| mapping.covers(seq, true, true))
        .flat_map(|mapping| mapping.mark_mapped_region(seq, pos))
        .collect()
}

/// First row of `target` holding the match's dataset over the matched residues.
fn matched_row<'a>(target: &'a Alignment, m: &Match) -> Option<&'a Sequence> {
    let (lo, hi) = (m.start.min(m.end), m.start.max(m.end));
    target
        .sequences
        .iter()
        .find(|seq| seq.dataset() == m.dataset && lo >= seq.start() && hi <= seq.end())
}

fn widen(range: &mut Option<(usize, usize)>, lo: usize, hi: usize) {
    *range = Some(match *range {
        Some((min, max)) => (min.min(lo), max.max(hi)),
        None => (lo, hi),
    });
}

/// Widest span of target columns mapped from the residues in source column `col`.
fn find_mapped_columns(
    col: usize,
    source: &Alignment,
    target: &Alignment,
    registry: &MappingRegistry,
) -> Option<(usize, usize)> {
    let mut mapped = None;
    for from_seq in &source.sequences {
        if from_seq.is_gap(col) {
            continue;
        }
        let pos = from_seq.find_position(col);
        for m in build_matches(from_seq, pos, registry) {
            let Some(to_seq) = matched_row(target, &m) else {
                continue;
            };
            if let (Some(a), Some(b)) = (to_seq.find_index(m.start), to_seq.find_index(m.end)) {
                widen(&mut mapped, a.min(b), a.max(b));
            }
        }
    }
    mapped
}

/// Maps selected and hidden columns of `source` onto `target`.
///
/// Each column maps to the widest span of target columns reached from any
/// residue in it, which may take in intron columns lying between codon
/// fragments. Columns that are gaps in every mapped sequence map to nothing.
pub fn map_column_selection(
    selection: &ColumnSelection,
    hidden: &HiddenColumns,
    source: &Alignment,
    target: &Alignment,
    registry: &MappingRegistry,
) -> (ColumnSelection, HiddenColumns) {
    let mut mapped_selection = ColumnSelection::new();
    let mut mapped_hidden = HiddenColumns::new();

    for col in selection.columns() {
        match find_mapped_columns(col, source, target, registry) {
            Some((first, last)) => mapped_selection.add_range(first, last),
            None => debug!("selected column {} maps to nothing", col + 1),
        }
    }

    for &(start, end) in hidden.regions() {
        for col in start..=end {
            if let Some((first, last)) = find_mapped_columns(col, source, target, registry) {
                mapped_hidden.hide_columns(first, last);
            }
        }
    }

    (mapped_selection, mapped_hidden)
}

/// First and last non-gap columns of `seq` within `start..=end`.
fn ungapped_bounds(seq: &Sequence, start: usize, end: usize) -> Option<(usize, usize)> {
    let first = (start..=end).find(|&col| !seq.is_gap(col))?;
    let last = (start..=end).rev().find(|&col| !seq.is_gap(col))?;
    Some((first, last))
}

/// Residue span on the other side of `mapping` reached from `start..=end` of `seq`.
fn mapped_residues(mapping: &SequenceMapping, seq: &Sequence, start: i64, end: i64) -> Option<(i64, i64)> {
    mapping
        .mark_mapped_region(seq, start)
        .into_iter()
        .chain(mapping.mark_mapped_region(seq, end))
        .fold(None, |acc, m| {
            let (lo, hi) = (m.start.min(m.end), m.start.max(m.end));
            Some(match acc {
                Some((min, max)) => (lo.min(min), hi.max(max)),
                None => (lo, hi),
            })
        })
}

/// Maps a group of source rows over a column range onto `target`.
///
/// A target row joins the group when it shares a dataset sequence with a
/// selected row, or when one registered mapping covers both. The group's
/// columns become the widest span of target columns mapped from the residues
/// each selected row holds in the group's range; rows with only gaps in the
/// range are skipped. Name and display style are carried over.
pub fn map_sequence_group(
    group: &SequenceGroup,
    source: &Alignment,
    target: &Alignment,
    registry: &MappingRegistry,
) -> SequenceGroup {
    let mut mapped = group.empty_copy();
    let mut columns = None;

    for &row in group.sequences() {
        let Some(selected) = source.get(row) else {
            continue;
        };
        let Some((first, last)) = ungapped_bounds(selected, group.start_res, group.end_res) else {
            continue;
        };
        let start_pos = selected.find_position(first);
        let end_pos = selected.find_position(last);

        for (target_row, seq) in target.sequences.iter().enumerate() {
            let residues = if seq.shares_dataset(selected) {
                let (lo, hi) = (start_pos.max(seq.start()), end_pos.min(seq.end()));
                if lo > hi {
                    continue;
                }
                Some((lo, hi))
            } else {
                let Some(mapping) = registry
                    .iter()
                    .find(|m| m.covers(selected, false, false) && m.covers(seq, false, false))
                else {
                    continue;
                };
                mapped_residues(mapping, selected, start_pos, end_pos)
            };

            mapped.add_sequence(target_row);
            if let Some((lo, hi)) = residues {
                if let (Some(a), Some(b)) = (seq.find_index(lo), seq.find_index(hi)) {
                    widen(&mut columns, a.min(b), a.max(b));
                }
            }
        }
    }

    let (start_res, end_res) = columns.unwrap_or((0, 0));
    mapped.start_res = start_res;
    mapped.end_res = end_res;
    mapped
}

/// Target positions per source position, when that is a whole number.
fn edit_scale(m: &Match) -> Option<usize> {
    if m.source_ratio == 0 || m.target_ratio % m.source_ratio != 0 {
        return None;
    }
    Some(m.target_ratio / m.source_ratio)
}

/// Where and how wide the mapped edit lands in `seq`, if it is mapped at all.
fn mapped_edit_site(seq: &Sequence, matches: &[Match], action: EditAction, count: usize) -> Option<(usize, usize)> {
    let m = matches.iter().find(|m| {
        let (lo, hi) = (m.start.min(m.end), m.start.max(m.end));
        m.dataset == seq.dataset() && lo >= seq.start() && hi <= seq.end()
    })?;
    let Some(scale) = edit_scale(m) else {
        debug!(
            "cannot scale an edit by {}:{} onto {}",
            m.target_ratio, m.source_ratio, seq.id
        );
        return None;
    };
    let col = seq.find_index(m.start)?;
    let mapped_count = count * scale;
    let position = match action {
        EditAction::InsertGap => col,
        // a deletion removes the gaps lying before the mapped residue
        EditAction::DeleteGap => col.checked_sub(mapped_count)?,
    };
    Some((position, mapped_count))
}

/// Maps a gap edit made on `source` onto the rows of `target`.
///
/// `source` is the alignment as the command found it (for an undo, as the
/// command left it). Edits are replayed on working copies of both alignments
/// so that each later edit is located against the state its predecessors
/// produced. Gap counts are scaled by the mapping's ratio, so two gaps in a
/// protein become six in its cDNA. Returns `None` when nothing maps.
pub fn map_edit_command(
    command: &EditCommand,
    source: &Alignment,
    target: &Alignment,
    registry: &MappingRegistry,
    undo: bool,
) -> Option<EditCommand> {
    let mut acted_on = source.clone();
    let mut target_copy = target.clone();
    let mut result = EditCommand::new(command.description.clone());

    let mut edits: Vec<&Edit> = command.edits().iter().collect();
    if undo {
        edits.reverse();
    }

    for edit in edits {
        let action = if undo { edit.action.undo_action() } else { edit.action };
        for &row in &edit.sequences {
            let Some(seq) = acted_on.get(row) else {
                continue;
            };
            let matches = build_matches(seq, seq.find_position(edit.position), registry);

            if !matches.is_empty() {
                for target_row in 0..target_copy.sequence_count() {
                    let Some((position, count)) = target_copy
                        .get(target_row)
                        .and_then(|copy| mapped_edit_site(copy, &matches, action, edit.count))
                    else {
                        continue;
                    };
                    let mapped = Edit::new(action, vec![target_row], position, count, target.gap_char);
                    mapped.apply(&mut target_copy);
                    result.add_edit(mapped);
                }
            }

            Edit::new(action, vec![row], edit.position, edit.count, edit.gap_char).apply(&mut acted_on);
        }
    }

    (!result.is_empty()).then_some(result)
}

/// Mappings involving `seq`, optionally only those reaching one of `restrict_to`.
///
/// Members of `restrict_to` sharing `seq`'s dataset are ignored when
/// filtering.
pub fn find_mappings_for_sequence<'a>(
    seq: &Sequence,
    registry: &'a MappingRegistry,
    restrict_to: Option<&[Sequence]>,
) -> Vec<&'a SequenceMapping> {
    registry
        .iter()
        .filter(|mapping| mapping.involves(seq))
        .filter(|mapping| match restrict_to {
            None => true,
            Some(others) => others
                .iter()
                .filter(|other| !other.shares_dataset(seq))
                .any(|other| mapping.involves(other)),
        })
        .collect()
}

/// Target row order following the source row `order` through covering mappings.
///
/// Unmapped target rows follow in their current order. `None` when no row maps.
pub fn map_sequence_order(
    order: &[usize],
    source: &Alignment,
    target: &Alignment,
    registry: &MappingRegistry,
) -> Option<Vec<usize>> {
    let mut mapped: Vec<usize> = Vec::with_capacity(target.sequence_count());
    for seq in order.iter().filter_map(|&row| source.get(row)) {
        let found = target
            .sequences
            .iter()
            .enumerate()
            .find(|(row, other)| !mapped.contains(row) && registry.covering_mapping(seq, other).is_some())
            .map(|(row, _)| row);
        if let Some(row) = found {
            mapped.push(row);
        }
    }
    if mapped.is_empty() {
        return None;
    }
    for row in 0..target.sequence_count() {
        if !mapped.contains(&row) {
            mapped.push(row);
        }
    }
    Some(mapped)
}

/// Codons (read from `cdna`) mapped to the residue at column `col` of protein `seq`.
pub fn find_codons_for(seq: &Sequence, col: usize, registry: &MappingRegistry, cdna: &Alignment) -> Vec<Vec<u8>> {
    if seq.is_gap(col) {
        return Vec::new();
    }
    let pos = seq.find_position(col);
    registry
        .iter()
        .filter(|mapping| mapping.to.dataset == seq.dataset() && mapping.map.from_ratio() == 3)
        .filter_map(|mapping| {
            let spans = mapping.map.locate_in_from(pos, pos)?;
            let dna = cdna.find_by_dataset(mapping.from.dataset).and_then(|row| cdna.get(row))?;
            let codon = spans
                .iter()
                .flat_map(|span| span.positions())
                .take(3)
                .map(|p| dna.residue_at(p))
                .collect::<Option<Vec<u8>>>()?;
            (codon.len() == 3).then_some(codon)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::RatioIntervalMap;

    fn codon_map(from: &[i64], to: &[i64]) -> RatioIntervalMap {
        RatioIntervalMap::from_flat(from, to, 3, 1).unwrap()
    }

    /// Three cDNAs with introns mapped to three gapped peptides.
    ///
    /// Upper case bases are coding:
    /// Seq1/10-18 AC-GctGtC-T -> Seq1/40-41 -K-P
    /// Seq2/20-27 Tc-GA-G-T-Tc -> Seq2/50-51 L--Q
    /// Seq3/30-38 TtTT-AaCGg- -> Seq3/60-61 G--S
    fn mapped_alignments() -> (Alignment, Alignment, MappingRegistry) {
        let cdna = Alignment::new(vec![
            Sequence::new("Seq1", "AC-GctGtC-T").with_start(10),
            Sequence::new("Seq2", "Tc-GA-G-T-Tc").with_start(20),
            Sequence::new("Seq3", "TtTT-AaCGg-").with_start(30),
        ]);
        let protein = Alignment::new(vec![
            Sequence::new("Seq1", "-K-P").with_start(40),
            Sequence::new("Seq2", "L--Q").with_start(50),
            Sequence::new("Seq3", "G--S").with_start(60),
        ]);
        let maps = [
            codon_map(&[10, 12, 15, 15, 17, 18], &[40, 41]),
            codon_map(&[20, 20, 22, 23, 24, 26], &[50, 51]),
            codon_map(&[30, 30, 32, 34, 36, 37], &[60, 61]),
        ];
        let mut registry = MappingRegistry::new();
        for (row, map) in maps.into_iter().enumerate() {
            registry.add_map(cdna.get(row).unwrap(), protein.get(row).unwrap(), map);
        }
        (cdna, protein, registry)
    }

    /// One mapping per row pair, the same map for each.
    fn paired(cdna: Vec<Sequence>, protein: Vec<Sequence>, map: RatioIntervalMap) -> (Alignment, Alignment, MappingRegistry) {
        let cdna = Alignment::new(cdna);
        let protein = Alignment::new(protein);
        let mut registry = MappingRegistry::new();
        for (dna, pep) in cdna.sequences.iter().zip(&protein.sequences) {
            registry.add_map(dna, pep, map.clone());
        }
        (cdna, protein, registry)
    }

    fn spans(matches: &[Match]) -> Vec<(i64, i64)> {
        matches.iter().map(|m| (m.start, m.end)).collect()
    }

    fn selected(sel: &ColumnSelection) -> Vec<usize> {
        sel.columns().collect()
    }

    #[test]
    fn test_build_matches() {
        let dna = Sequence::new("Seq1", "C-G-TA-GC").with_start(5);
        let pep = Sequence::new("Seq1", "-P-R").with_start(12);
        let mut registry = MappingRegistry::new();
        registry.add_map(&dna, &pep, codon_map(&[5, 10], &[12, 13]));

        let found = build_matches(&pep, 12, &registry);
        assert_eq!(spans(&found), vec![(5, 7)]);
        assert_eq!(found[0].dataset, dna.dataset());
        assert_eq!(spans(&build_matches(&pep, 13, &registry)), vec![(8, 10)]);

        for pos in 5..=10 {
            let expected = if pos <= 7 { 12 } else { 13 };
            assert_eq!(spans(&build_matches(&dna, pos, &registry)), vec![(expected, expected)]);
        }
        assert!(build_matches(&pep, 14, &registry).is_empty());
        assert!(build_matches(&dna, 4, &registry).is_empty());
    }

    #[test]
    fn test_build_matches_with_intron() {
        let (cdna, protein, registry) = mapped_alignments();
        let dna = cdna.get(0).unwrap();
        let pep = protein.get(0).unwrap();

        assert_eq!(spans(&build_matches(pep, 40, &registry)), vec![(10, 12)]);
        assert_eq!(spans(&build_matches(pep, 41, &registry)), vec![(15, 15), (17, 18)]);
        assert_eq!(spans(&build_matches(dna, 15, &registry)), vec![(41, 41)]);
        // bases 13, 14 and 16 are intronic
        assert!(build_matches(dna, 13, &registry).is_empty());
        assert!(build_matches(dna, 16, &registry).is_empty());
    }

    #[test]
    fn test_map_column_selection_protein_to_dna() {
        let (cdna, protein, registry) = mapped_alignments();
        let hidden = HiddenColumns::new();
        let map_cols = |cols: &[usize]| {
            let sel: ColumnSelection = cols.iter().copied().collect();
            selected(&map_column_selection(&sel, &hidden, &protein, &cdna, &registry).0)
        };

        assert_eq!(map_cols(&[0]), vec![0, 1, 2, 3, 4]);
        assert_eq!(map_cols(&[1]), vec![0, 1, 2, 3]);
        // all gaps
        assert!(map_cols(&[2]).is_empty());
        assert_eq!(map_cols(&[3]), vec![5, 6, 7, 8, 9, 10]);
        assert_eq!(map_cols(&[1, 3]), vec![0, 1, 2, 3, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_map_column_selection_dna_to_protein() {
        let (cdna, protein, registry) = mapped_alignments();
        let hidden = HiddenColumns::new();

        let sel: ColumnSelection = [0].into_iter().collect();
        let (mapped, _) = map_column_selection(&sel, &hidden, &cdna, &protein, &registry);
        assert_eq!(selected(&mapped), vec![0, 1]);

        let sel: ColumnSelection = [0, 3, 4, 5].into_iter().collect();
        let (mapped, _) = map_column_selection(&sel, &hidden, &cdna, &protein, &registry);
        assert_eq!(selected(&mapped), vec![0, 1, 3]);
    }

    #[test]
    fn test_map_column_selection_hidden_columns() {
        let (cdna, protein, registry) = mapped_alignments();
        let map_hidden = |regions: &[(usize, usize)], sel: &ColumnSelection| {
            let mut hidden = HiddenColumns::new();
            for &(start, end) in regions {
                hidden.hide_columns(start, end);
            }
            map_column_selection(sel, &hidden, &protein, &cdna, &registry)
        };
        let none = ColumnSelection::new();

        let (sel, hidden) = map_hidden(&[(0, 0)], &none);
        assert!(sel.is_empty());
        assert_eq!(hidden.regions(), &[(0, 4)]);

        assert_eq!(map_hidden(&[(1, 1)], &none).1.regions(), &[(0, 3)]);
        assert!(map_hidden(&[(2, 2)], &none).1.is_empty());

        let (sel, hidden) = map_hidden(&[(3, 3)], &[1].into_iter().collect());
        assert_eq!(selected(&sel), vec![0, 1, 2, 3]);
        assert_eq!(hidden.regions(), &[(5, 10)]);

        let (_, hidden) = map_hidden(&[(1, 1), (3, 3)], &none);
        assert_eq!(hidden.regions(), &[(0, 3), (5, 10)]);
    }

    #[test]
    fn test_map_sequence_group_sequences() {
        let (cdna, protein, registry) = paired(
            vec![Sequence::new("Seq1", "ACG"), Sequence::new("Seq2", "TGA"), Sequence::new("Seq3", "TAC")],
            vec![Sequence::new("Seq1", "K"), Sequence::new("Seq2", "L"), Sequence::new("Seq3", "Q")],
            codon_map(&[1, 3], &[1, 1]),
        );

        let mut group = SequenceGroup::new("sel", 0, protein.width() - 1);
        group.style.colour_text = true;
        group.style.id_colour = Some(crate::selection::Rgb(0, 255, 0));
        group.add_sequence(0);
        group.add_sequence(2);

        let mapped = map_sequence_group(&group, &protein, &cdna, &registry);
        assert!(mapped.style.colour_text);
        assert_eq!(mapped.style.id_colour, group.style.id_colour);
        assert_eq!(mapped.sequences(), &[0, 2]);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 2));

        let mut group = SequenceGroup::new("sel", 0, 2);
        group.add_sequence(1);
        group.add_sequence(0);
        let mapped = map_sequence_group(&group, &cdna, &protein, &registry);
        assert_eq!(mapped.sequences(), &[1, 0]);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 0));
    }

    #[test]
    fn test_map_sequence_group_columns() {
        let (cdna, protein, registry) = paired(
            vec![Sequence::new("Seq1", "ACGGCA"), Sequence::new("Seq2", "TGACAG"), Sequence::new("Seq3", "TACGTA")],
            vec![Sequence::new("Seq1", "KA"), Sequence::new("Seq2", "LQ"), Sequence::new("Seq3", "QV")],
            codon_map(&[1, 6], &[1, 2]),
        );

        let mut group = SequenceGroup::new("sel", 1, 1);
        for row in 0..3 {
            group.add_sequence(row);
        }
        let mapped = map_sequence_group(&group, &protein, &cdna, &registry);
        assert_eq!(mapped.sequences(), &[0, 1, 2]);
        assert_eq!((mapped.start_res, mapped.end_res), (3, 5));

        // dna columns 2 and 3 span both codons
        group.start_res = 2;
        group.end_res = 3;
        let mapped = map_sequence_group(&group, &cdna, &protein, &registry);
        assert_eq!(mapped.sequences(), &[0, 1, 2]);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 1));
    }

    #[test]
    fn test_map_sequence_group_region() {
        let (cdna, protein, registry) = paired(
            vec![
                Sequence::new("Seq1", "A-CG-GC--AT-CA"),
                Sequence::new("Seq2", "-TG-AC-AG-T-AT"),
                Sequence::new("Seq3", "-T--ACG-TAAT-G"),
            ],
            vec![
                Sequence::new("Seq1", "-KA-S"),
                Sequence::new("Seq2", "--L-QY"),
                Sequence::new("Seq3", "Q-V-M"),
            ],
            codon_map(&[1, 9], &[1, 3]),
        );

        // Seq2 only has a gap in column 1
        let mut group = SequenceGroup::new("sel", 1, 1);
        group.add_sequence(0);
        group.add_sequence(1);
        let mapped = map_sequence_group(&group, &protein, &cdna, &registry);
        assert_eq!(mapped.sequences(), &[0]);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 3));

        group.start_res = 2;
        group.end_res = 4;
        let mapped = map_sequence_group(&group, &protein, &cdna, &registry);
        assert_eq!((mapped.start_res, mapped.end_res), (1, 13));

        let mut group = SequenceGroup::new("sel", 4, 5);
        group.add_sequence(0);
        let mapped = map_sequence_group(&group, &cdna, &protein, &registry);
        assert_eq!((mapped.start_res, mapped.end_res), (2, 2));

        group.add_sequence(1);
        let mapped = map_sequence_group(&group, &cdna, &protein, &registry);
        assert_eq!((mapped.start_res, mapped.end_res), (2, 4));

        group.add_sequence(2);
        let mapped = map_sequence_group(&group, &cdna, &protein, &registry);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 4));
    }

    #[test]
    fn test_map_sequence_group_shared_dataset() {
        let dna = Sequence::new("dna", "aaatttgggcccaaatttgggccc");
        let cdna = Alignment::new(vec![
            Sequence::new("cds1", "aaattt").with_dataset(dna.dataset()),
            Sequence::new("cds1", "tttggg").with_start(4).with_dataset(dna.dataset()),
            Sequence::new("cds1", "gggccc").with_start(19).with_dataset(dna.dataset()),
        ]);
        let protein = Alignment::new(vec![
            Sequence::new("pep1", "KF"),
            Sequence::new("pep2", "FG"),
            Sequence::new("pep3", "GP"),
        ]);
        let mut registry = MappingRegistry::new();
        registry.add_map(&dna, protein.get(0).unwrap(), codon_map(&[1, 6], &[1, 2]));
        registry.add_map(&dna, protein.get(1).unwrap(), codon_map(&[4, 9], &[1, 2]));
        registry.add_map(&dna, protein.get(2).unwrap(), codon_map(&[19, 24], &[1, 2]));

        let mut group = SequenceGroup::new("sel", 0, protein.width() - 1);
        group.style.colour_text = true;
        group.add_sequence(0);
        group.add_sequence(2);
        let mapped = map_sequence_group(&group, &protein, &cdna, &registry);
        assert!(mapped.style.colour_text);
        assert_eq!(mapped.sequences(), &[0, 2]);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 5));

        let mut group = SequenceGroup::new("sel", 0, cdna.width() - 1);
        group.add_sequence(1);
        group.add_sequence(0);
        let mapped = map_sequence_group(&group, &cdna, &protein, &registry);
        assert_eq!(mapped.sequences(), &[1, 0]);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 1));
    }

    #[test]
    fn test_map_sequence_group_within_one_dataset() {
        let gene = Sequence::new("gene", "AAACCCGGG");
        let source = Alignment::new(vec![gene.clone()]);
        let target = Alignment::new(vec![
            Sequence::new("other", "TTT"),
            Sequence::new("exon", "--CCCGGG").with_start(4).with_dataset(gene.dataset()),
        ]);
        let mut group = SequenceGroup::new("sel", 2, 4);
        group.add_sequence(0);

        let mapped = map_sequence_group(&group, &source, &target, &MappingRegistry::new());
        assert_eq!(mapped.sequences(), &[1]);
        assert_eq!((mapped.start_res, mapped.end_res), (2, 3));
    }

    #[test]
    fn test_map_sequence_group_unmapped() {
        let source = Alignment::new(vec![Sequence::new("a", "KP")]);
        let target = Alignment::new(vec![Sequence::new("b", "AAACCC")]);
        let mut group = SequenceGroup::new("sel", 0, 1);
        group.add_sequence(0);
        group.add_sequence(7);

        let mapped = map_sequence_group(&group, &source, &target, &MappingRegistry::new());
        assert_eq!(mapped.size(), 0);
        assert_eq!((mapped.start_res, mapped.end_res), (0, 0));
        assert_eq!(mapped.name, "sel");
    }

    fn edit_fixture() -> (Alignment, Alignment, MappingRegistry) {
        let dna = Sequence::new("Seq1", "---ACG---GCATCA").with_start(8);
        let pep = Sequence::new("Seq2", "-T-AS").with_start(5);
        let mut registry = MappingRegistry::new();
        registry.add_map(&dna, &pep, codon_map(&[8, 16], &[5, 7]));
        (Alignment::new(vec![dna]), Alignment::new(vec![pep]), registry)
    }

    #[test]
    fn test_map_edit_command_insert() {
        let (nuc, prot, registry) = edit_fixture();
        let mut command = EditCommand::new("insert gaps");
        command.add_edit(Edit::new(EditAction::InsertGap, vec![0], 4, 2, '-'));

        let mapped = map_edit_command(&command, &prot, &nuc, &registry, false).unwrap();
        assert_eq!(mapped.size(), 1);
        let edit = &mapped.edits()[0];
        assert_eq!(edit.action, EditAction::InsertGap);
        assert_eq!(edit.sequences, vec![0]);
        assert_eq!(edit.position, 12);
        assert_eq!(edit.count, 6);
        assert_eq!(mapped.description, "insert gaps");

        let mut edited = nuc.clone();
        mapped.apply(&mut edited);
        assert_eq!(edited.get(0).unwrap().as_str(), "---ACG---GCA------TCA");
    }

    #[test]
    fn test_map_edit_command_undo() {
        let (nuc, prot, registry) = edit_fixture();
        let mut command = EditCommand::new("insert gaps");
        command.add_edit(Edit::new(EditAction::InsertGap, vec![0], 4, 2, '-'));

        let mut edited_prot = prot.clone();
        command.apply(&mut edited_prot);
        let mut edited_nuc = nuc.clone();
        map_edit_command(&command, &prot, &nuc, &registry, false)
            .unwrap()
            .apply(&mut edited_nuc);

        let undo = map_edit_command(&command, &edited_prot, &edited_nuc, &registry, true).unwrap();
        let edit = &undo.edits()[0];
        assert_eq!(edit.action, EditAction::DeleteGap);
        assert_eq!((edit.position, edit.count), (12, 6));
        undo.apply(&mut edited_nuc);
        assert_eq!(edited_nuc.get(0).unwrap().as_str(), nuc.get(0).unwrap().as_str());
    }

    #[test]
    fn test_map_edit_command_successive_edits() {
        let (nuc, prot, registry) = edit_fixture();
        let mut command = EditCommand::new("pad");
        command.add_edit(Edit::new(EditAction::InsertGap, vec![0], 4, 1, '-'));
        command.add_edit(Edit::new(EditAction::InsertGap, vec![0], 3, 1, '-'));

        let mapped = map_edit_command(&command, &prot, &nuc, &registry, false).unwrap();
        let sites: Vec<(usize, usize)> = mapped.edits().iter().map(|e| (e.position, e.count)).collect();
        // the second edit lands on A (residue 6), whose codon starts at column 9
        assert_eq!(sites, vec![(12, 3), (9, 3)]);
    }

    #[test]
    fn test_map_edit_command_unmapped() {
        let (nuc, prot, registry) = edit_fixture();
        let mut command = EditCommand::new("pad");
        command.add_edit(Edit::new(EditAction::InsertGap, vec![0], 4, 2, '-'));
        assert!(map_edit_command(&command, &prot, &nuc, &MappingRegistry::new(), false).is_none());

        // three bases per residue cannot be scaled down to whole residues
        let mut command = EditCommand::new("pad");
        command.add_edit(Edit::new(EditAction::InsertGap, vec![0], 3, 1, '-'));
        assert!(map_edit_command(&command, &nuc, &prot, &registry, false).is_none());
    }

    #[test]
    fn test_find_mappings_for_sequence() {
        let seqs: Vec<Sequence> = (1..=4).map(|i| Sequence::new(format!("Seq{i}"), "ABC")).collect();
        let map = RatioIntervalMap::from_flat(&[1, 3], &[1, 3], 1, 1).unwrap();
        let mut registry = MappingRegistry::new();
        registry.add_map(&seqs[0], &seqs[1], map.clone());
        registry.add_map(&seqs[1], &seqs[0], map.clone());
        registry.add_map(&seqs[2], &seqs[0], map.clone());

        assert_eq!(find_mappings_for_sequence(&seqs[0], &registry, None).len(), 3);
        assert_eq!(find_mappings_for_sequence(&seqs[1], &registry, None).len(), 2);
        assert_eq!(find_mappings_for_sequence(&seqs[2], &registry, None).len(), 1);
        assert!(find_mappings_for_sequence(&seqs[3], &registry, None).is_empty());

        registry.add_map(&seqs[2], &seqs[3], map);
        let aligned_seq1 = Sequence::new("Seq1", "-A-BC").with_dataset(seqs[0].dataset());
        let restrict = [seqs[0].clone(), seqs[1].clone(), aligned_seq1];
        let found = find_mappings_for_sequence(&seqs[0], &registry, Some(&restrict));
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| m.involves(&seqs[1])));
    }

    #[test]
    fn test_map_sequence_order() {
        let (cdna, protein, registry) = paired(
            vec![Sequence::new("a", "AAA"), Sequence::new("b", "CCC"), Sequence::new("c", "GGG")],
            vec![Sequence::new("a", "K"), Sequence::new("b", "P"), Sequence::new("c", "G")],
            codon_map(&[1, 3], &[1, 1]),
        );
        assert_eq!(map_sequence_order(&[2, 0, 1], &protein, &cdna, &registry), Some(vec![2, 0, 1]));
        assert_eq!(map_sequence_order(&[1], &cdna, &protein, &registry), Some(vec![1, 0, 2]));

        let unrelated = Alignment::new(vec![Sequence::new("x", "MMM")]);
        assert_eq!(map_sequence_order(&[0], &unrelated, &protein, &registry), None);
    }

    #[test]
    fn test_find_codons_for() {
        let (cdna, protein, registry) = mapped_alignments();
        let pep = protein.get(0).unwrap();
        assert_eq!(find_codons_for(pep, 1, &registry, &cdna), vec![b"ACG".to_vec()]);
        // split codon across the intron
        assert_eq!(find_codons_for(pep, 3, &registry, &cdna), vec![b"GCT".to_vec()]);
        assert!(find_codons_for(pep, 0, &registry, &cdna).is_empty());
    }
}
