use ndarray::Array2;

use crate::config::Padding;
use crate::constants::TARGET_SEQUENCE_LENGTH;
use crate::sequence::{NUCLEOTIDES, encode_batch};
use crate::types::{MncrError, SequenceRecord};

/// Turns nucleotide strings into fixed-width integer tensors.
///
/// Stateless: the vocabulary is a compile-time table, so an encoder is just
/// a target length and a padding side.
///
/// # Examples
///
/// ```rust
/// use mncr_core::config::Padding;
/// use mncr_core::sequence::SequenceEncoder;
///
/// let encoder = SequenceEncoder::new(8, Padding::Right);
/// let tensor = encoder.encode_strings(&["ACGT", "ACGTN"])?;
///
/// assert_eq!(tensor.dim(), (2, 8));
/// assert_eq!(tensor.row(1).to_vec(), vec![0, 2, 4, 11, 8, 15, 15, 15]);
/// # Ok::<(), mncr_core::types::MncrError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEncoder {
    pub length: usize,
    pub padding: Padding,
}

impl Default for SequenceEncoder {
    fn default() -> Self {
        Self::new(TARGET_SEQUENCE_LENGTH, Padding::Right)
    }
}

impl SequenceEncoder {
    #[must_use]
    pub const fn new(length: usize, padding: Padding) -> Self {
        Self { length, padding }
    }

    /// Encodes records into an `(records.len(), length)` tensor in input order
    pub fn encode(&self, records: &[SequenceRecord]) -> Result<Array2<u8>, MncrError> {
        let sequences: Vec<&[u8]> = records.iter().map(|r| r.sequence.as_slice()).collect();
        self.encode_strings(&sequences)
    }

    /// Encodes raw strings; characters are expected to be uppercase already
    pub fn encode_strings<S>(&self, sequences: &[S]) -> Result<Array2<u8>, MncrError>
    where
        S: AsRef<[u8]> + Sync,
    {
        encode_batch(sequences, self.length, self.padding, &NUCLEOTIDES)
    }
}
