//! # codonlink - Coordinate Mapping Between cDNA and Protein Alignments
//!
//! Maps positions between two coordinate systems related by a fixed unit
//! ratio (three bases per residue for codons), and projects alignment
//! selections, groups and gap edits from one view to the other.
//!
//! ## Architecture
//!
//! - `mapping`: the ratio interval map and its offset arithmetic
//! - `model`: aligned sequences with residue numbering and dataset identity
//! - `registry`: caller-owned collection of maps between dataset sequences
//! - `projector`: column, group, edit and order projection through the registry
//! - `selection` / `edit`: the containers the projector reads and builds
//! - `genetic_code` / `linking`: finding which cDNA encodes which protein
//! - `fasta`: FASTA input with `name/START-END` residue numbering
//! - `report`: JSON and text output for the command line tool

pub mod edit;
pub mod fasta;
pub mod genetic_code;
pub mod linking;
pub mod mapping;
pub mod model;
pub mod projector;
pub mod registry;
pub mod report;
pub mod selection;
