//! The opaque classifier capability and label decoding.
//!
//! A [`Model`] maps a batch of fixed-shape input tensors to an `(N, 6)`
//! matrix of class probabilities. Column `j` of that matrix always means
//! `RnaType::ALL[j]`; decoding never consults the model about its labels.

use ndarray::{Array2, ArrayView2};

use crate::config::PipelineVariant;
use crate::dataset::AlignedBatch;
use crate::types::MncrError;

pub mod decode;
pub mod precomputed;
pub mod store;

pub use decode::{argmax, decode_predictions};
pub use precomputed::{PrecomputedLoader, PrecomputedModel};
pub use store::{ModelLoader, ModelStore};

/// Tensors handed to a model, tagged with the pipeline that built them
#[derive(Debug, Clone, Copy)]
pub enum ModelInput<'a> {
    /// `(N, L)` nucleotide codes
    Sequence(ArrayView2<'a, u8>),
    /// `(N, L)` annotated structure codes
    Structure(ArrayView2<'a, u8>),
    /// `(N, 32768)` dense graph features
    Graph(ArrayView2<'a, f32>),
    /// Row-paired nucleotide codes and graph features
    Fusion {
        sequence: ArrayView2<'a, u8>,
        graph: ArrayView2<'a, f32>,
    },
}

impl<'a> ModelInput<'a> {
    /// Borrows the tensors an aligned batch carries for its variant.
    ///
    /// # Errors
    ///
    /// Returns [`MncrError::Tensor`] if the batch lacks a tensor its variant
    /// needs.
    pub fn from_batch(batch: &'a AlignedBatch) -> Result<Self, MncrError> {
        let missing = |name: &str| {
            MncrError::Tensor(format!(
                "{} batch has no {name} tensor",
                batch.variant()
            ))
        };
        Ok(match batch.variant() {
            PipelineVariant::SequenceOnly => {
                Self::Sequence(batch.sequence().ok_or_else(|| missing("sequence"))?.view())
            }
            PipelineVariant::StructureOnly => {
                Self::Structure(batch.structure().ok_or_else(|| missing("structure"))?.view())
            }
            PipelineVariant::GraphOnly => {
                Self::Graph(batch.graph().ok_or_else(|| missing("graph"))?.view())
            }
            PipelineVariant::Fusion => Self::Fusion {
                sequence: batch.sequence().ok_or_else(|| missing("sequence"))?.view(),
                graph: batch.graph().ok_or_else(|| missing("graph"))?.view(),
            },
        })
    }

    #[must_use]
    pub fn variant(&self) -> PipelineVariant {
        match self {
            Self::Sequence(_) => PipelineVariant::SequenceOnly,
            Self::Structure(_) => PipelineVariant::StructureOnly,
            Self::Graph(_) => PipelineVariant::GraphOnly,
            Self::Fusion { .. } => PipelineVariant::Fusion,
        }
    }

    /// Number of batch rows
    #[must_use]
    pub fn rows(&self) -> usize {
        match self {
            Self::Sequence(t) | Self::Structure(t) => t.nrows(),
            Self::Graph(t) => t.nrows(),
            Self::Fusion { sequence, .. } => sequence.nrows(),
        }
    }
}

/// A pretrained classifier.
///
/// Implementations are opened read-only and may be shared between
/// invocations; `infer` must not mutate the model.
pub trait Model {
    /// Pipeline variant whose inputs this model accepts
    fn variant(&self) -> PipelineVariant;

    /// Class probabilities, one row per input row, six columns in canonical
    /// label order
    fn infer(&self, input: &ModelInput<'_>) -> Result<Array2<f32>, MncrError>;
}
