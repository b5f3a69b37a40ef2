//! FASTA file parser.
//!
//! This module handles reading and parsing FASTA format files.
//! It supports both single-line and multi-line sequences, and residue
//! numbering carried in the identifier.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence/12-40
//! -MK-LV...
//! ```
//!
//! An identifier ending in `/START-END` numbers the first residue `START`;
//! the suffix is removed from the identifier.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;
use thiserror::Error;

use crate::model::{Alignment, Sequence};

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses a FASTA file and returns an Alignment.
///
/// # Examples
///
/// ```no_run
/// use codonlink::fasta::parse_fasta_file;
///
/// let alignment = parse_fasta_file("protein.fasta").unwrap();
/// println!("Loaded {} sequences", alignment.sequence_count());
/// ```
pub fn parse_fasta_file<P: AsRef<Path>>(path: P) -> FastaResult<Alignment> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    parse_fasta(reader)
}

/// Splits `name/START-END` into the name and its residue range.
pub fn split_coordinates(id: &str) -> (&str, Option<(i64, i64)>) {
    let Some((name, suffix)) = id.rsplit_once('/') else {
        return (id, None);
    };
    let Some((start, end)) = suffix.split_once('-') else {
        return (id, None);
    };
    match (start.parse::<i64>(), end.parse::<i64>()) {
        (Ok(start), Ok(end)) if !name.is_empty() => (name, Some((start, end))),
        _ => (id, None),
    }
}

fn build_sequence(header_id: &str, data: String) -> Sequence {
    let (name, coordinates) = split_coordinates(header_id);
    let mut seq = Sequence::new(name, data);
    if let Some((start, end)) = coordinates {
        seq = seq.with_start(start);
        if seq.end() != end {
            warn!(
                "{}: header ends at residue {} but sequence ends at {}",
                header_id,
                end,
                seq.end()
            );
        }
    }
    seq
}

/// Parses FASTA content from a reader.
///
/// This function handles both single-line and multi-line sequences.
pub fn parse_fasta<R: BufRead>(reader: R) -> FastaResult<Alignment> {
    let mut sequences = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_seq = String::new();
    let mut line_number = 0;

    for line_result in reader.lines() {
        line_number += 1;
        let line = line_result?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                if !current_seq.is_empty() {
                    sequences.push(build_sequence(&id, std::mem::take(&mut current_seq)));
                }
            }

            // ID is everything up to the first whitespace
            let id = header.split_whitespace().next().unwrap_or(header).to_string();

            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }

            current_id = Some(id);
            current_seq.clear();
        } else {
            if current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }
            current_seq.extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }

    if let Some(id) = current_id {
        if !current_seq.is_empty() {
            sequences.push(build_sequence(&id, current_seq));
        }
    }

    if sequences.is_empty() {
        return Err(FastaError::EmptyFile);
    }

    Ok(Alignment::new(sequences))
}

/// Parses FASTA content from a string.
///
/// Useful for testing or processing in-memory data.
pub fn parse_fasta_str(content: &str) -> FastaResult<Alignment> {
    parse_fasta(content.as_bytes())
}
