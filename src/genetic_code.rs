//! Genetic code tables used to recognise a cDNA as the coding sequence of a protein.
//!
//! This module provides:
//! - NCBI genetic code tables (1-33)
//! - Codon lookup by table index (`TCAG` order, as NCBI publishes them)
//! - Stop and start codon tests

/// NCBI tables: id, name, amino acids for codons TTT, TTC, TTA, TTG, TCT, ...
const NCBI_TABLES: &[(u8, &str, &str)] = &[
    (1, "Standard", "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (2, "Vertebrate Mitochondrial", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG"),
    (3, "Yeast Mitochondrial", "FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (4, "Mold/Protozoan/Coelenterate Mitochondrial", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (5, "Invertebrate Mitochondrial", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSSSVVVVAAAADDEEGGGG"),
    (6, "Ciliate/Dasycladacean/Hexamita Nuclear", "FFLLSSSSYYQQCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (9, "Echinoderm/Flatworm Mitochondrial", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG"),
    (10, "Euplotid Nuclear", "FFLLSSSSYY**CCCWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (11, "Bacterial/Archaeal/Plant Plastid", "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (12, "Alternative Yeast Nuclear", "FFLLSSSSYY**CC*WLLLSPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (13, "Ascidian Mitochondrial", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSGGVVVVAAAADDEEGGGG"),
    (14, "Alternative Flatworm Mitochondrial", "FFLLSSSSYYY*CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG"),
    (15, "Blepharisma Macronuclear", "FFLLSSSSYY*QCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (16, "Chlorophycean Mitochondrial", "FFLLSSSSYY*LCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (21, "Trematode Mitochondrial", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNNKSSSSVVVVAAAADDEEGGGG"),
    (22, "Scenedesmus obliquus Mitochondrial", "FFLLSS*SYY*LCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (23, "Thraustochytrium Mitochondrial", "FF*LSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (24, "Rhabdopleuridae Mitochondrial", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSSKVVVVAAAADDEEGGGG"),
    (25, "Candidate Division SR1/Gracilibacteria", "FFLLSSSSYY**CCGWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (26, "Pachysolen tannophilus Nuclear", "FFLLSSSSYY**CC*WLLLAPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (27, "Karyorelict Nuclear", "FFLLSSSSYYQQCCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (28, "Condylostoma Nuclear", "FFLLSSSSYYQQCCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (29, "Mesodinium Nuclear", "FFLLSSSSYYYYCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (30, "Peritrich Nuclear", "FFLLSSSSYYEECC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (31, "Blastocrithidia Nuclear", "FFLLSSSSYYEECCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (32, "Balanophoraceae Plastid", "FFLLSSSSYY*WCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    (33, "Cephalodiscidae Mitochondrial", "FFLLSSSSYYY*CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSSKVVVVAAAADDEEGGGG"),
];

/// The start codon recognised when trimming a cDNA.
pub const START_CODON: &[u8; 3] = b"ATG";

/// Index of a base in NCBI `TCAG` order; U reads as T.
fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

/// A genetic code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneticCode {
    /// NCBI genetic code ID
    pub id: u8,
    /// Name of the genetic code
    pub name: &'static str,
    amino_acids: &'static [u8],
}

impl GeneticCode {
    /// Looks up an NCBI table by id.
    pub fn by_id(id: u8) -> Option<Self> {
        NCBI_TABLES
            .iter()
            .find(|(table_id, _, _)| *table_id == id)
            .map(|&(id, name, aa)| Self {
                id,
                name,
                amino_acids: aa.as_bytes(),
            })
    }

    /// The standard code (table 1).
    pub fn standard() -> Self {
        let (id, name, aa) = NCBI_TABLES[0];
        Self {
            id,
            name,
            amino_acids: aa.as_bytes(),
        }
    }

    /// Ids of every available table.
    pub fn ids() -> impl Iterator<Item = u8> {
        NCBI_TABLES.iter().map(|(id, _, _)| *id)
    }

    /// Amino acid (or `*` for stop) of a codon; `None` for ambiguous bases or gaps.
    pub fn translate_codon(&self, codon: &[u8]) -> Option<u8> {
        let [b1, b2, b3] = codon else {
            return None;
        };
        let index = base_index(*b1)? * 16 + base_index(*b2)? * 4 + base_index(*b3)?;
        self.amino_acids.get(index).copied()
    }

    pub fn is_stop(&self, codon: &[u8]) -> bool {
        self.translate_codon(codon) == Some(b'*')
    }

    /// True when `cdna` (read from its first base) encodes `protein`.
    ///
    /// A `*` in the protein matches a stop or untranslatable codon. Apart
    /// from an optional trailing stop codon, the whole cDNA must be used.
    pub fn translates_as(&self, cdna: &[u8], protein: &[u8]) -> bool {
        let mut codons = cdna.chunks_exact(3);
        for &residue in protein {
            let Some(codon) = codons.next() else {
                return false;
            };
            let translated = self.translate_codon(codon);
            let matched = match translated {
                Some(aa) => aa == residue.to_ascii_uppercase() || (aa == b'*' && residue == b'*'),
                None => residue == b'*',
            };
            if !matched {
                return false;
            }
        }
        if !codons.remainder().is_empty() {
            return false;
        }
        match (codons.next(), codons.next()) {
            (None, _) => true,
            (Some(last), None) => self.is_stop(last),
            _ => false,
        }
    }
}

impl Default for GeneticCode {
    fn default() -> Self {
        Self::standard()
    }
}

/// True for `ATG`, case-insensitively.
pub fn is_start_codon(codon: &[u8]) -> bool {
    codon.eq_ignore_ascii_case(START_CODON)
}
