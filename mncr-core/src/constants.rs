// =============================================================================
// =============================================================================

/// Version string for MncR
pub const VERSION: &str = "0.1.0";

// =============================================================================
// =============================================================================

/// Padded length of every sequence and structure tensor row
pub const TARGET_SEQUENCE_LENGTH: usize = 12_000;

/// Width of a dense graph feature vector
pub const GRAPH_FEATURE_WIDTH: usize = 32_768;

/// Number of ncRNA classes every model scores
pub const NUM_CLASSES: usize = 6;

/// Padding character appended (or prepended) to short inputs
pub const PAD_SYMBOL: u8 = b'_';

/// Prefix of identifiers synthesized for feature rows without a companion FASTA
pub const SYNTHETIC_ID_PREFIX: &str = "sequence_";

/// Marker that opens an identifier line in FASTA and structure files
pub const IDENTIFIER_MARKER: char = '>';

// =============================================================================
// =============================================================================

/// Ordinal vocabulary for nucleotide sequences.
///
/// The four canonical nucleotides, the eleven IUPAC ambiguity codes and the
/// pad character, in ascending byte order. The position of a symbol is its
/// code; the pretrained models were fit on this sorted order.
pub const NUCLEOTIDE_VOCABULARY: [u8; 16] = [
    b'A', b'B', b'C', b'D', b'G', b'H', b'K', b'M', b'N', b'R', b'S', b'T', b'V', b'W', b'Y',
    b'_',
];

/// Code assigned to any character outside [`NUCLEOTIDE_VOCABULARY`]
pub const NUCLEOTIDE_UNKNOWN_CODE: u8 = NUCLEOTIDE_VOCABULARY.len() as u8;

/// Ordinal vocabulary for annotated structure strings.
///
/// The 24 symbols of [`ANNOTATION_TABLE`], the shared `N` for non-canonical
/// nucleotides and the pad character, in ascending byte order.
pub const ANNOTATED_VOCABULARY: [u8; 26] = [
    b'A', b'B', b'C', b'D', b'E', b'F', b'G', b'H', b'I', b'J', b'K', b'L', b'N', b'O', b'P',
    b'Q', b'R', b'S', b'T', b'U', b'V', b'W', b'X', b'Y', b'Z', b'_',
];

/// Code assigned to any character outside [`ANNOTATED_VOCABULARY`]
pub const ANNOTATED_UNKNOWN_CODE: u8 = ANNOTATED_VOCABULARY.len() as u8;

/// Structure labels in table row order: Five-prime, Stem, Interior loop,
/// Multi-loop, Hairpin loop, Three-prime
pub const STRUCTURE_LABELS: [u8; 6] = [b'F', b'S', b'I', b'M', b'H', b'T'];

/// Canonical nucleotides in table column order
pub const CANONICAL_NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Joint (nucleotide, structure label) alphabet \[nucleotide\]\[structure label\]
pub const ANNOTATION_TABLE: [[u8; 6]; 4] = [
    [b'Q', b'W', b'E', b'R', b'T', b'Z'],
    [b'U', b'I', b'O', b'P', b'A', b'S'],
    [b'D', b'F', b'G', b'H', b'J', b'K'],
    [b'L', b'Y', b'X', b'C', b'V', b'B'],
];

/// Symbol for any position whose nucleotide is not A, C, G or T
pub const OTHER_NUCLEOTIDE_SYMBOL: u8 = b'N';

/// Symbol for a canonical nucleotide paired with an unrecognized structure label.
/// Not part of [`ANNOTATED_VOCABULARY`], so it always encodes to the unknown code.
pub const UNKNOWN_STRUCTURE_SYMBOL: u8 = b'?';

// =============================================================================
// =============================================================================

/// Default directory holding pretrained model artifacts
pub const DEFAULT_MODEL_DIR: &str = "model_files";

/// Artifact file for the sequence-only model
pub const SEQENC_ARTIFACT: &str = "seqenc_fold8.hdf5";

/// Artifact file for the structure-only model
pub const STRENC_ARTIFACT: &str = "strenc_fold7.hdf5";

/// Artifact file for the graph-only model
pub const GRENC_ARTIFACT: &str = "grenc_fold2.hdf5";

/// Artifact file for the sequence+graph fusion model
pub const MNCR_ARTIFACT: &str = "merged_fold7.hdf5";

// =============================================================================
// =============================================================================

/// File name of the text evaluation report
pub const REPORT_FILE_NAME: &str = "classification_scores.txt";

/// File name of the rendered confusion matrix
pub const CONFUSION_MATRIX_FILE_NAME: &str = "confusion_matrix.svg";

/// Normalized confusion values below this are left unlabeled in the figure
pub const CONFUSION_LABEL_THRESHOLD: f64 = 0.005;
