//! Secondary-structure annotation and encoding.
//!
//! A structure predictor assigns each nucleotide one of six structural roles:
//! `F` (5' end), `S` (stem), `I` (interior loop), `M` (multi-loop),
//! `H` (hairpin loop) and `T` (3' end). The annotator folds each
//! (nucleotide, role) pair into a single symbol so that one stream carries
//! both, then the stream is padded and ordinal-encoded over a 26-symbol
//! alphabet.
//!
//! | | F | S | I | M | H | T |
//! |---|---|---|---|---|---|---|
//! | A | Q | W | E | R | T | Z |
//! | C | U | I | O | P | A | S |
//! | G | D | F | G | H | J | K |
//! | T | L | Y | X | C | V | B |
//!
//! Any other nucleotide becomes `N` whatever its role.

use log::warn;
use ndarray::Array2;

use crate::config::Padding;
use crate::constants::{
    ANNOTATION_TABLE, OTHER_NUCLEOTIDE_SYMBOL, STRUCTURE_LABELS, TARGET_SEQUENCE_LENGTH,
    UNKNOWN_STRUCTURE_SYMBOL,
};
use crate::sequence::{ANNOTATED_STRUCTURES, encode_batch};
use crate::types::{MncrError, StructureRecord};

pub mod io;

pub use io::*;

const fn nucleotide_column(nucleotide: u8) -> Option<usize> {
    match nucleotide {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

fn structure_row(label: u8) -> Option<usize> {
    STRUCTURE_LABELS.iter().position(|&l| l == label)
}

/// Joint symbol for one (nucleotide, structure label) position
#[must_use]
pub fn annotate_position(nucleotide: u8, label: u8) -> u8 {
    match nucleotide_column(nucleotide) {
        None => OTHER_NUCLEOTIDE_SYMBOL,
        Some(column) => structure_row(label)
            .map(|row| ANNOTATION_TABLE[column][row])
            .unwrap_or(UNKNOWN_STRUCTURE_SYMBOL),
    }
}

/// Fuses a nucleotide string with its structure string.
///
/// # Errors
///
/// Returns [`MncrError::StructureLengthMismatch`] if the strings differ in
/// length; nothing is produced for the record in that case.
///
/// # Examples
///
/// ```rust
/// use mncr_core::structure::annotate;
///
/// let annotated = annotate("example", b"ACGTN", b"FSIMH")?;
/// assert_eq!(annotated, b"QIGCN");
/// # Ok::<(), mncr_core::types::MncrError>(())
/// ```
pub fn annotate(identifier: &str, sequence: &[u8], structure: &[u8]) -> Result<Vec<u8>, MncrError> {
    if sequence.len() != structure.len() {
        return Err(MncrError::StructureLengthMismatch {
            identifier: identifier.to_string(),
            sequence_length: sequence.len(),
            structure_length: structure.len(),
        });
    }

    let annotated: Vec<u8> = sequence
        .iter()
        .zip(structure)
        .map(|(&nucleotide, &label)| annotate_position(nucleotide, label))
        .collect();

    let unknown = annotated
        .iter()
        .filter(|&&s| s == UNKNOWN_STRUCTURE_SYMBOL)
        .count();
    if unknown > 0 {
        warn!("{identifier}: {unknown} positions carry an unrecognized structure label");
    }

    Ok(annotated)
}

/// Annotates a structure record
pub fn annotate_record(record: &StructureRecord) -> Result<Vec<u8>, MncrError> {
    annotate(record.identifier(), record.sequence(), record.structure())
}

/// Turns structure records into fixed-width tensors over the annotated
/// alphabet (codes 0-25, unknown 26).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureEncoder {
    pub length: usize,
    pub padding: Padding,
}

impl Default for StructureEncoder {
    fn default() -> Self {
        Self::new(TARGET_SEQUENCE_LENGTH, Padding::Right)
    }
}

impl StructureEncoder {
    #[must_use]
    pub const fn new(length: usize, padding: Padding) -> Self {
        Self { length, padding }
    }

    /// Annotates and encodes records in input order.
    ///
    /// All records are annotated before any tensor is allocated, so a length
    /// mismatch aborts the whole batch.
    pub fn encode(&self, records: &[StructureRecord]) -> Result<Array2<u8>, MncrError> {
        let annotated = records
            .iter()
            .map(annotate_record)
            .collect::<Result<Vec<_>, _>>()?;
        self.encode_annotated(&annotated)
    }

    /// Encodes already annotated strings
    pub fn encode_annotated<S>(&self, annotated: &[S]) -> Result<Array2<u8>, MncrError>
    where
        S: AsRef<[u8]> + Sync,
    {
        encode_batch(annotated, self.length, self.padding, &ANNOTATED_STRUCTURES)
    }
}
