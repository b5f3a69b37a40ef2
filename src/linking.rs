//! Discovering cDNA/protein pairs and building their codon maps.
//!
//! A cDNA is linked to a protein when its ungapped residues translate to
//! the protein's, optionally after discounting a trailing stop codon and a
//! leading start codon. The resulting map is the contiguous 3:1 map from the
//! coding positions to the protein's residue range.

use std::collections::HashSet;

use log::debug;

use crate::genetic_code::{is_start_codon, GeneticCode};
use crate::mapping::RatioIntervalMap;
use crate::model::{Alignment, DatasetId, Sequence};
use crate::registry::MappingRegistry;

const CODON_LENGTH: usize = 3;

/// Builds the codon map of `cdna` onto `protein`, if `cdna` encodes it.
pub fn map_cdna_to_protein(protein: &Sequence, cdna: &Sequence, code: &GeneticCode) -> Option<RatioIntervalMap> {
    let peptide = protein.ungapped();
    let dna = cdna.ungapped();
    if peptide.is_empty() || dna.len() < CODON_LENGTH {
        return None;
    }

    let mapped_length = CODON_LENGTH * peptide.len();
    let mut cdna_length = dna.len();
    let mut cdna_start = cdna.start();
    let mut cdna_end = cdna.end();

    if cdna_length != mapped_length && code.is_stop(&dna[cdna_length - CODON_LENGTH..]) {
        cdna_end -= CODON_LENGTH as i64;
        cdna_length -= CODON_LENGTH;
    }

    let mut offset = 0;
    if cdna_length != mapped_length && cdna_length >= CODON_LENGTH && is_start_codon(&dna[..CODON_LENGTH]) {
        offset = CODON_LENGTH;
        cdna_start += CODON_LENGTH as i64;
    }

    if !code.translates_as(&dna[offset..], &peptide) {
        return None;
    }

    RatioIntervalMap::from_flat(
        &[cdna_start, cdna_end],
        &[protein.start(), protein.end()],
        CODON_LENGTH,
        1,
    )
    .ok()
}

/// Links proteins to the cDNAs that encode them, adding maps to `registry`.
///
/// Sequences with the same identifier are tried first; any still unpaired
/// are then paired one-to-one in row order. Pairs already linked in the
/// registry are left alone. Returns the number of maps added.
pub fn link_alignments(
    protein: &Alignment,
    cdna: &Alignment,
    registry: &mut MappingRegistry,
    code: &GeneticCode,
) -> usize {
    let mut linked: HashSet<DatasetId> = HashSet::new();
    let mut added = 0;

    for by_name in [true, false] {
        for pep in &protein.sequences {
            if !by_name && linked.contains(&pep.dataset()) {
                continue;
            }
            for dna in &cdna.sequences {
                if by_name && dna.id != pep.id {
                    continue;
                }
                if !by_name && (linked.contains(&pep.dataset()) || linked.contains(&dna.dataset())) {
                    continue;
                }
                if registry.links(dna.dataset(), pep.dataset()) {
                    linked.extend([dna.dataset(), pep.dataset()]);
                    continue;
                }
                if let Some(map) = map_cdna_to_protein(pep, dna, code) {
                    debug!("linked {} to {}: {}", dna.id, pep.id, map);
                    registry.add_map(dna, pep, map);
                    linked.extend([dna.dataset(), pep.dataset()]);
                    added += 1;
                }
            }
        }
    }
    added
}
