use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::GRAPH_FEATURE_WIDTH;

/// The six ncRNA types every model distinguishes.
///
/// The declaration order is the canonical label order. Class index `i` of a
/// model's probability row always means `RnaType::ALL[i]`; the models were
/// trained with exactly this ordering, so it must never change.
///
/// # Examples
///
/// ```rust
/// use mncr_core::types::RnaType;
///
/// assert_eq!(RnaType::from_index(0), Some(RnaType::LncRna));
/// assert_eq!("snoRNA".parse::<RnaType>().unwrap(), RnaType::SnoRna);
/// assert_eq!(RnaType::TRna.to_string(), "tRNA");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RnaType {
    /// Long non-coding RNA
    LncRna,
    /// Micro RNA
    MiRna,
    /// Ribosomal RNA
    RRna,
    /// Small nuclear RNA
    SnRna,
    /// Small nucleolar RNA
    SnoRna,
    /// Transfer RNA
    TRna,
}

impl RnaType {
    /// All types in canonical order
    pub const ALL: [RnaType; 6] = [
        Self::LncRna,
        Self::MiRna,
        Self::RRna,
        Self::SnRna,
        Self::SnoRna,
        Self::TRna,
    ];

    /// Canonical class index
    #[must_use]
    pub const fn to_index(self) -> usize {
        match self {
            Self::LncRna => 0,
            Self::MiRna => 1,
            Self::RRna => 2,
            Self::SnRna => 3,
            Self::SnoRna => 4,
            Self::TRna => 5,
        }
    }

    /// Type at a canonical class index
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Label string as written in FASTA headers and output listings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LncRna => "lncRNA",
            Self::MiRna => "miRNA",
            Self::RRna => "rRNA",
            Self::SnRna => "snRNA",
            Self::SnoRna => "snoRNA",
            Self::TRna => "tRNA",
        }
    }
}

impl fmt::Display for RnaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RnaType {
    type Err = MncrError;

    /// Label names are case sensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rna_type| rna_type.as_str() == s)
            .ok_or_else(|| MncrError::InvalidLabel(s.to_string()))
    }
}

/// A nucleotide sequence read from a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// First word of the header line
    pub identifier: String,
    /// Uppercased nucleotide letters
    pub sequence: Vec<u8>,
    /// Ground-truth type from the header, if one was given
    pub label: Option<RnaType>,
}

impl SequenceRecord {
    #[must_use]
    pub fn new(identifier: impl Into<String>, sequence: &[u8], label: Option<RnaType>) -> Self {
        Self {
            identifier: identifier.into(),
            sequence: sequence.to_ascii_uppercase(),
            label,
        }
    }

    /// Sequence length in nucleotides
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// A nucleotide sequence paired with its per-position structure labels.
///
/// Both strings have the same length; [`StructureRecord::new`] refuses to
/// build a record otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureRecord {
    identifier: String,
    sequence: Vec<u8>,
    structure: Vec<u8>,
}

impl StructureRecord {
    /// Pairs a sequence with its structure string.
    ///
    /// # Errors
    ///
    /// Returns [`MncrError::StructureLengthMismatch`] when the two strings
    /// differ in length.
    pub fn new(
        identifier: impl Into<String>,
        sequence: &[u8],
        structure: &[u8],
    ) -> Result<Self, MncrError> {
        let identifier = identifier.into();
        if sequence.len() != structure.len() {
            return Err(MncrError::StructureLengthMismatch {
                identifier,
                sequence_length: sequence.len(),
                structure_length: structure.len(),
            });
        }
        Ok(Self {
            identifier,
            sequence: sequence.to_ascii_uppercase(),
            structure: structure.to_vec(),
        })
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    #[must_use]
    pub fn structure(&self) -> &[u8] {
        &self.structure
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// One sparse graph-kernel feature vector.
///
/// Holds `(index, value)` pairs in file order; every index is below
/// [`GRAPH_FEATURE_WIDTH`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphFeatureVector {
    pub entries: Vec<(usize, f32)>,
}

impl GraphFeatureVector {
    /// Writes the vector into a zeroed dense row of width [`GRAPH_FEATURE_WIDTH`].
    /// A repeated index keeps its last value.
    pub fn scatter_into(&self, row: &mut [f32]) {
        debug_assert_eq!(row.len(), GRAPH_FEATURE_WIDTH);
        for &(index, value) in &self.entries {
            row[index] = value;
        }
    }
}

/// Classification of one input row
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub identifier: String,
    pub label: RnaType,
    /// Highest class probability of the row, in `[0, 1]`
    pub confidence: f32,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.identifier, self.label, self.confidence)
    }
}

/// Error types raised while reading, aligning, encoding or classifying records
#[derive(Error, Debug)]
pub enum MncrError {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// Malformed input line or record
    #[error("Format error in {source_name}{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Format {
        source_name: String,
        line: Option<usize>,
        message: String,
    },
    /// Feature file and sequence set disagree on the number of rows
    #[error("Graph feature file has {features} lines but {sequences} sequences were supplied")]
    FeatureCountMismatch { features: usize, sequences: usize },
    /// Nucleotide and structure strings of a record differ in length
    #[error(
        "Sequence and structure of {identifier} differ in length ({sequence_length} vs {structure_length})"
    )]
    StructureLengthMismatch {
        identifier: String,
        sequence_length: usize,
        structure_length: usize,
    },
    /// A field required by the active pipeline is absent for a row
    #[error("Missing {field} for {identifier}")]
    MissingField {
        identifier: String,
        field: &'static str,
    },
    /// The same identifier occurs twice in one input
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),
    /// An identifier is not present in the primary input
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),
    /// Label is not one of the six canonical ncRNA types
    #[error("Invalid label: {0}")]
    InvalidLabel(String),
    /// Two label or row sequences that must be paired differ in length
    #[error("Length mismatch: {0}")]
    LengthMismatch(String),
    /// Pretrained model artifact does not exist
    #[error("Missing model artifact: {}", .0.display())]
    MissingArtifact(PathBuf),
    /// Model produced unusable output
    #[error("Model error: {0}")]
    Model(String),
    /// Tensor construction or serialization failed
    #[error("Tensor error: {0}")]
    Tensor(String),
    /// Figure rendering failed
    #[error("Render error: {0}")]
    Render(String),
}

impl MncrError {
    pub(crate) fn format(
        source_name: impl Into<String>,
        line: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }
}
