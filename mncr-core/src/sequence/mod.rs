//! Sequence reading and ordinal encoding.
//!
//! Every tensor row fed to a model is built the same way: the input string is
//! padded or cut to a fixed length, then each character is replaced by its
//! position in a fixed vocabulary. Characters outside the vocabulary get a
//! reserved unknown code one past the last symbol instead of failing the
//! batch.
//!
//! ## Nucleotide vocabulary
//!
//! Symbols are numbered in ascending byte order, the order the pretrained
//! models were fit on.
//!
//! | Code | Symbol | Code | Symbol |
//! |------|--------|------|--------|
//! | 0 | A | 8 | N |
//! | 1 | B | 9 | R |
//! | 2 | C | 10 | S |
//! | 3 | D | 11 | T |
//! | 4 | G | 12 | V |
//! | 5 | H | 13 | W |
//! | 6 | K | 14 | Y |
//! | 7 | M | 15 | `_` (pad) |
//!
//! Anything else encodes to 16.
//!
//! ## Modules
//!
//! - [`encoding`]: [`SequenceEncoder`](encoding::SequenceEncoder) building `(N, L)` tensors
//! - [`io`]: FASTA reading with optional ground-truth labels
//!
//! ## Examples
//!
//! ```rust
//! use mncr_core::config::Padding;
//! use mncr_core::sequence::{NUCLEOTIDES, encode_padded_into};
//!
//! let mut row = [0u8; 6];
//! encode_padded_into(b"ACGTZ", Padding::Right, &NUCLEOTIDES, &mut row);
//! assert_eq!(row, [0, 2, 4, 11, 16, 15]);
//!
//! // Left padding keeps the tail of a long input
//! let mut short = [0u8; 4];
//! encode_padded_into(b"ACGTAC", Padding::Left, &NUCLEOTIDES, &mut short);
//! assert_eq!(short, [4, 11, 0, 2]);
//! ```

use ndarray::Array2;
use rayon::prelude::*;

use crate::config::Padding;
use crate::constants::{
    ANNOTATED_UNKNOWN_CODE, ANNOTATED_VOCABULARY, NUCLEOTIDE_UNKNOWN_CODE, NUCLEOTIDE_VOCABULARY,
    PAD_SYMBOL,
};
use crate::types::MncrError;

pub mod encoding;
pub mod io;

pub use encoding::SequenceEncoder;
pub use io::*;

/// Byte-indexed lookup table from symbol to ordinal code.
///
/// Built at compile time from an ordered symbol list; lookups never fail.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    codes: [u8; 256],
    unknown_code: u8,
}

impl Vocabulary {
    /// Builds the table. Symbol `symbols[i]` gets code `i`, every other byte
    /// gets `unknown_code`.
    #[must_use]
    pub const fn new(symbols: &[u8], unknown_code: u8) -> Self {
        let mut codes = [unknown_code; 256];
        let mut i = 0;
        while i < symbols.len() {
            codes[symbols[i] as usize] = i as u8;
            i += 1;
        }
        Self {
            codes,
            unknown_code,
        }
    }

    #[inline]
    #[must_use]
    pub const fn code(&self, symbol: u8) -> u8 {
        self.codes[symbol as usize]
    }

    #[must_use]
    pub const fn unknown_code(&self) -> u8 {
        self.unknown_code
    }

    /// Code of the pad character
    #[must_use]
    pub const fn pad_code(&self) -> u8 {
        self.code(PAD_SYMBOL)
    }
}

/// Vocabulary for raw nucleotide sequences
pub static NUCLEOTIDES: Vocabulary =
    Vocabulary::new(&NUCLEOTIDE_VOCABULARY, NUCLEOTIDE_UNKNOWN_CODE);

/// Vocabulary for annotated structure strings
pub static ANNOTATED_STRUCTURES: Vocabulary =
    Vocabulary::new(&ANNOTATED_VOCABULARY, ANNOTATED_UNKNOWN_CODE);

/// Part of `symbols` that survives cutting to `length`
fn kept_window(symbols: &[u8], length: usize, padding: Padding) -> &[u8] {
    if symbols.len() <= length {
        return symbols;
    }
    match padding {
        Padding::Right => &symbols[..length],
        Padding::Left => &symbols[symbols.len() - length..],
    }
}

/// Pads or cuts `symbols` to `row.len()` and writes their codes into `row`
pub fn encode_padded_into(symbols: &[u8], padding: Padding, vocabulary: &Vocabulary, row: &mut [u8]) {
    let kept = kept_window(symbols, row.len(), padding);
    let offset = match padding {
        Padding::Right => 0,
        Padding::Left => row.len() - kept.len(),
    };
    let (pad_head, rest) = row.split_at_mut(offset);
    pad_head.fill(vocabulary.pad_code());
    let (body, pad_tail) = rest.split_at_mut(kept.len());
    for (slot, &symbol) in body.iter_mut().zip(kept) {
        *slot = vocabulary.code(symbol);
    }
    pad_tail.fill(vocabulary.pad_code());
}

/// Encodes a batch of strings into an `(inputs.len(), length)` tensor.
///
/// Rows are encoded in parallel; row `i` always corresponds to `inputs[i]`.
///
/// # Errors
///
/// Returns [`MncrError::Tensor`] if the tensor cannot be shaped.
pub fn encode_batch<S>(
    inputs: &[S],
    length: usize,
    padding: Padding,
    vocabulary: &Vocabulary,
) -> Result<Array2<u8>, MncrError>
where
    S: AsRef<[u8]> + Sync,
{
    if length == 0 {
        return Ok(Array2::zeros((inputs.len(), 0)));
    }

    let mut codes = vec![0u8; inputs.len() * length];
    codes
        .par_chunks_mut(length)
        .zip(inputs.par_iter())
        .for_each(|(row, input)| encode_padded_into(input.as_ref(), padding, vocabulary, row));

    Array2::from_shape_vec((inputs.len(), length), codes)
        .map_err(|e| MncrError::Tensor(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleotide_codes_follow_vocabulary_order() {
        for (i, &symbol) in NUCLEOTIDE_VOCABULARY.iter().enumerate() {
            assert_eq!(NUCLEOTIDES.code(symbol), i as u8);
        }
        assert_eq!(NUCLEOTIDES.code(b'N'), 8);
        assert_eq!(NUCLEOTIDES.pad_code(), 15);
    }

    #[test]
    fn test_nucleotide_codes_are_sorted() {
        let expected: [(u8, u8); 16] = [
            (b'A', 0),
            (b'B', 1),
            (b'C', 2),
            (b'D', 3),
            (b'G', 4),
            (b'H', 5),
            (b'K', 6),
            (b'M', 7),
            (b'N', 8),
            (b'R', 9),
            (b'S', 10),
            (b'T', 11),
            (b'V', 12),
            (b'W', 13),
            (b'Y', 14),
            (b'_', 15),
        ];
        for (symbol, code) in expected {
            assert_eq!(NUCLEOTIDES.code(symbol), code, "symbol {}", symbol as char);
        }
        assert!(NUCLEOTIDE_VOCABULARY.is_sorted());
    }

    #[test]
    fn test_annotated_codes_are_sorted() {
        let expected = b"ABCDEFGHIJKLNOPQRSTUVWXYZ_";
        for (code, &symbol) in expected.iter().enumerate() {
            assert_eq!(ANNOTATED_STRUCTURES.code(symbol), code as u8, "symbol {}", symbol as char);
        }
        assert_eq!(ANNOTATED_STRUCTURES.code(b'M'), 26);
        assert!(ANNOTATED_VOCABULARY.is_sorted());
    }

    #[test]
    fn test_unknown_symbols_get_reserved_code() {
        for symbol in [b'Z', b'U', b'a', b'-', b'*', 0u8, 255u8] {
            assert_eq!(NUCLEOTIDES.code(symbol), 16, "symbol {}", symbol);
        }
        assert_eq!(ANNOTATED_STRUCTURES.code(b'?'), 26);
        assert_eq!(ANNOTATED_STRUCTURES.unknown_code(), 26);
    }

    #[test]
    fn test_annotated_codes_follow_vocabulary_order() {
        for (i, &symbol) in ANNOTATED_VOCABULARY.iter().enumerate() {
            assert_eq!(ANNOTATED_STRUCTURES.code(symbol), i as u8);
        }
        assert_eq!(ANNOTATED_STRUCTURES.pad_code(), 25);
    }

    fn padded(symbols: &[u8], length: usize, padding: Padding) -> Vec<u8> {
        let mut row = vec![99u8; length];
        encode_padded_into(symbols, padding, &NUCLEOTIDES, &mut row);
        row
    }

    #[test]
    fn test_encode_padded_into_right() {
        assert_eq!(padded(b"ACG", 5, Padding::Right), [0, 2, 4, 15, 15]);
        assert_eq!(padded(b"ACGTACGT", 5, Padding::Right), [0, 2, 4, 11, 0]);
        assert_eq!(padded(b"", 3, Padding::Right), [15, 15, 15]);
    }

    #[test]
    fn test_encode_padded_into_exact_length_has_no_padding() {
        for padding in [Padding::Right, Padding::Left] {
            assert_eq!(padded(b"ACGTN", 5, padding), [0, 2, 4, 11, 8]);
        }
    }

    #[test]
    fn test_encode_padded_into_left() {
        let mut row = [99u8; 6];
        encode_padded_into(b"ACG", Padding::Left, &NUCLEOTIDES, &mut row);
        assert_eq!(row, [15, 15, 15, 0, 2, 4]);

        let mut short_row = [99u8; 2];
        encode_padded_into(b"ACGT", Padding::Left, &NUCLEOTIDES, &mut short_row);
        assert_eq!(short_row, [4, 11]);
    }

    #[test]
    fn test_encode_batch_shape_and_order() {
        let inputs = ["ACGT", "T", "GGGGGGGG"];
        let tensor = encode_batch(&inputs, 4, Padding::Right, &NUCLEOTIDES).unwrap();
        assert_eq!(tensor.dim(), (3, 4));
        assert_eq!(tensor.row(0).to_vec(), vec![0, 2, 4, 11]);
        assert_eq!(tensor.row(1).to_vec(), vec![11, 15, 15, 15]);
        assert_eq!(tensor.row(2).to_vec(), vec![4, 4, 4, 4]);
    }

    #[test]
    fn test_encode_batch_reencoding_is_idempotent() {
        let inputs = ["ACGTRYKMSWBDHVN_"];
        let first = encode_batch(&inputs, 16, Padding::Right, &NUCLEOTIDES).unwrap();
        let decoded: Vec<u8> = first
            .row(0)
            .iter()
            .map(|&code| NUCLEOTIDE_VOCABULARY[code as usize])
            .collect();
        assert_eq!(decoded, inputs[0].as_bytes());
        let second = encode_batch(&[decoded], 16, Padding::Right, &NUCLEOTIDES).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_batch_empty_inputs() {
        let inputs: Vec<&str> = Vec::new();
        let tensor = encode_batch(&inputs, 8, Padding::Right, &NUCLEOTIDES).unwrap();
        assert_eq!(tensor.dim(), (0, 8));

        let zero_width = encode_batch(&["ACGT"], 0, Padding::Right, &NUCLEOTIDES).unwrap();
        assert_eq!(zero_width.dim(), (1, 0));
    }
}
