use std::fmt;
use std::str::FromStr;

use crate::constants::{
    GRENC_ARTIFACT, MNCR_ARTIFACT, SEQENC_ARTIFACT, STRENC_ARTIFACT, TARGET_SEQUENCE_LENGTH,
};
use crate::types::MncrError;

/// Side on which short inputs are padded.
///
/// Long inputs are cut on the same side the padding would go: right padding
/// keeps the head of the string, left padding keeps the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// Append pad characters and drop the tail of long inputs
    #[default]
    Right,
    /// Prepend pad characters and drop the head of long inputs
    Left,
}

/// How identifier, nucleotide and structure lines are grouped in a
/// structure file.
///
/// Structure predictors in use emit the same three-line groups, but
/// downstream scripts disagree on how to find them. Both strategies are
/// supported explicitly and yield identical records on well-formed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructureLayout {
    /// Line `i` is an identifier when `i % 3 == 0`, a nucleotide line when
    /// `i % 3 == 1` and a structure line when `i % 3 == 2`.
    Cyclic,
    /// A line starting with `>` opens a record; the next two non-blank lines
    /// are its nucleotide and structure lines.
    #[default]
    HeaderScan,
}

impl FromStr for StructureLayout {
    type Err = MncrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cyclic" | "modulo" => Ok(Self::Cyclic),
            "header" | "header-scan" => Ok(Self::HeaderScan),
            other => Err(MncrError::format(
                "structure layout",
                None,
                format!("unknown layout '{other}' (expected cyclic or header)"),
            )),
        }
    }
}

/// The four fixed classification pipelines.
///
/// # Examples
///
/// ```rust
/// use mncr_core::config::{Padding, PipelineVariant};
///
/// let variant: PipelineVariant = "mncr".parse().unwrap();
/// assert_eq!(variant, PipelineVariant::Fusion);
/// assert_eq!(variant.padding(), Padding::Right);
/// assert_eq!(variant.artifact_name(), "merged_fold7.hdf5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineVariant {
    /// Encoded nucleotide sequence only (SeqEnc)
    SequenceOnly,
    /// Annotated secondary structure only (StrEnc)
    StructureOnly,
    /// Graph-kernel features only (GrEnc)
    GraphOnly,
    /// Encoded sequence together with graph-kernel features (MncR)
    Fusion,
}

impl PipelineVariant {
    pub const ALL: [PipelineVariant; 4] = [
        Self::SequenceOnly,
        Self::StructureOnly,
        Self::GraphOnly,
        Self::Fusion,
    ];

    /// Short name used on the command line and in output file names
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SequenceOnly => "seqenc",
            Self::StructureOnly => "strenc",
            Self::GraphOnly => "grenc",
            Self::Fusion => "mncr",
        }
    }

    /// Default pretrained artifact file name
    #[must_use]
    pub const fn artifact_name(self) -> &'static str {
        match self {
            Self::SequenceOnly => SEQENC_ARTIFACT,
            Self::StructureOnly => STRENC_ARTIFACT,
            Self::GraphOnly => GRENC_ARTIFACT,
            Self::Fusion => MNCR_ARTIFACT,
        }
    }

    /// Padding policy the variant's model was trained with
    #[must_use]
    pub const fn padding(self) -> Padding {
        match self {
            Self::SequenceOnly | Self::StructureOnly | Self::GraphOnly | Self::Fusion => {
                Padding::Right
            }
        }
    }

    /// Whether the variant consumes an encoded nucleotide tensor
    #[must_use]
    pub const fn uses_sequence(self) -> bool {
        matches!(self, Self::SequenceOnly | Self::Fusion)
    }

    /// Whether the variant consumes dense graph feature vectors
    #[must_use]
    pub const fn uses_graph(self) -> bool {
        matches!(self, Self::GraphOnly | Self::Fusion)
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PipelineVariant {
    type Err = MncrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "seqenc" | "sequence" => Ok(Self::SequenceOnly),
            "strenc" | "structure" => Ok(Self::StructureOnly),
            "grenc" | "graph" => Ok(Self::GraphOnly),
            "mncr" | "merged" | "fusion" => Ok(Self::Fusion),
            other => Err(MncrError::format(
                "model name",
                None,
                format!("unknown model '{other}' (expected seqenc, strenc, grenc or mncr)"),
            )),
        }
    }
}

/// Configuration settings for an MncR classification run.
///
/// # Examples
///
/// ```rust
/// use mncr_core::config::{MncrConfig, StructureLayout};
///
/// let config = MncrConfig {
///     structure_layout: StructureLayout::Cyclic,
///     quiet: true,
///     ..Default::default()
/// };
/// assert_eq!(config.sequence_length, 12_000);
/// ```
#[derive(Debug, Clone)]
pub struct MncrConfig {
    /// Length every sequence and structure row is padded or cut to.
    ///
    /// The shipped models expect 12,000 positions; other values are only
    /// meaningful for models trained on them.
    ///
    /// **Default**: `12000`
    pub sequence_length: usize,

    /// Line grouping used when reading structure files.
    ///
    /// **Default**: [`StructureLayout::HeaderScan`]
    pub structure_layout: StructureLayout,

    /// Number of threads for row encoding.
    ///
    /// When set, the caller should configure the Rayon global pool with it.
    /// Results do not depend on the thread count.
    ///
    /// **Default**: `None` (use all available cores)
    pub num_threads: Option<usize>,

    /// Suppress informational output during processing.
    ///
    /// **Default**: `false`
    pub quiet: bool,
}

impl Default for MncrConfig {
    fn default() -> Self {
        Self {
            sequence_length: TARGET_SEQUENCE_LENGTH,
            structure_layout: StructureLayout::default(),
            num_threads: None,
            quiet: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names_round_trip() {
        for variant in PipelineVariant::ALL {
            assert_eq!(variant.name().parse::<PipelineVariant>().unwrap(), variant);
        }
        assert_eq!(
            "SeqEnc".parse::<PipelineVariant>().unwrap(),
            PipelineVariant::SequenceOnly
        );
        assert!("rnn".parse::<PipelineVariant>().is_err());
    }

    #[test]
    fn test_variant_inputs() {
        assert!(PipelineVariant::SequenceOnly.uses_sequence());
        assert!(!PipelineVariant::SequenceOnly.uses_graph());
        assert!(!PipelineVariant::StructureOnly.uses_sequence());
        assert!(!PipelineVariant::StructureOnly.uses_graph());
        assert!(PipelineVariant::GraphOnly.uses_graph());
        assert!(PipelineVariant::Fusion.uses_sequence());
        assert!(PipelineVariant::Fusion.uses_graph());
    }

    #[test]
    fn test_variant_artifacts_are_distinct() {
        let mut names: Vec<&str> = PipelineVariant::ALL
            .iter()
            .map(|v| v.artifact_name())
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_structure_layout_parse() {
        assert_eq!(
            "cyclic".parse::<StructureLayout>().unwrap(),
            StructureLayout::Cyclic
        );
        assert_eq!(
            "header".parse::<StructureLayout>().unwrap(),
            StructureLayout::HeaderScan
        );
        assert!("columns".parse::<StructureLayout>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = MncrConfig::default();
        assert_eq!(config.sequence_length, TARGET_SEQUENCE_LENGTH);
        assert_eq!(config.structure_layout, StructureLayout::HeaderScan);
        assert_eq!(config.num_threads, None);
        assert!(!config.quiet);
    }
}
