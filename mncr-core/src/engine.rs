//! Pipeline dispatch.
//!
//! A run is one of four closed variants, each carrying only the input files
//! it needs. Every variant ends the same way: the model is invoked once on
//! the whole batch and each output row is decoded against the canonical
//! label order.

use std::path::{Path, PathBuf};

use log::info;

use crate::config::{MncrConfig, PipelineVariant};
use crate::dataset::{AlignedBatch, DatasetAssembler};
use crate::model::{Model, ModelInput, ModelLoader, ModelStore, decode_predictions};
use crate::sequence::{LabelPolicy, read_sequence_records};
use crate::structure::read_structure_records;
use crate::types::{MncrError, PredictionResult};

/// Input files for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineInput {
    SequenceOnly {
        fasta: PathBuf,
    },
    /// Structure predictor output, optionally with the FASTA it was run on
    StructureOnly {
        structures: PathBuf,
        fasta: Option<PathBuf>,
    },
    /// Graph-kernel features, optionally with the FASTA they were computed from
    GraphOnly {
        features: PathBuf,
        fasta: Option<PathBuf>,
    },
    Fusion {
        fasta: PathBuf,
        features: PathBuf,
    },
}

impl PipelineInput {
    #[must_use]
    pub fn variant(&self) -> PipelineVariant {
        match self {
            Self::SequenceOnly { .. } => PipelineVariant::SequenceOnly,
            Self::StructureOnly { .. } => PipelineVariant::StructureOnly,
            Self::GraphOnly { .. } => PipelineVariant::GraphOnly,
            Self::Fusion { .. } => PipelineVariant::Fusion,
        }
    }

    /// The file that fixes row order
    #[must_use]
    pub fn primary_path(&self) -> &Path {
        match self {
            Self::SequenceOnly { fasta } | Self::Fusion { fasta, .. } => fasta,
            Self::StructureOnly {
                fasta: Some(fasta), ..
            }
            | Self::GraphOnly {
                fasta: Some(fasta), ..
            } => fasta,
            Self::StructureOnly { structures, .. } => structures,
            Self::GraphOnly { features, .. } => features,
        }
    }

    /// Companion or primary FASTA, if the run has one
    #[must_use]
    pub fn fasta(&self) -> Option<&Path> {
        match self {
            Self::SequenceOnly { fasta } | Self::Fusion { fasta, .. } => Some(fasta),
            Self::StructureOnly { fasta, .. } | Self::GraphOnly { fasta, .. } => fasta.as_deref(),
        }
    }
}

/// An aligned batch together with its decoded predictions
#[derive(Debug, Clone)]
pub struct Classification {
    pub batch: AlignedBatch,
    pub predictions: Vec<PredictionResult>,
}

/// Runs the classification pipelines.
///
/// # Examples
///
/// ```rust,no_run
/// use mncr_core::config::{MncrConfig, PipelineVariant};
/// use mncr_core::engine::{MncrClassifier, PipelineInput};
/// use mncr_core::model::{ModelStore, PrecomputedLoader};
/// use mncr_core::sequence::LabelPolicy;
///
/// let classifier = MncrClassifier::new(MncrConfig::default());
/// let input = PipelineInput::Fusion {
///     fasta: "test.fasta".into(),
///     features: "test.feature".into(),
/// };
/// let run = classifier.run(
///     &input,
///     &ModelStore::default(),
///     &PrecomputedLoader::new("probabilities.npy"),
///     LabelPolicy::Optional,
/// )?;
///
/// for prediction in &run.predictions {
///     println!("{prediction}");
/// }
/// # Ok::<(), mncr_core::types::MncrError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MncrClassifier {
    pub config: MncrConfig,
}

impl MncrClassifier {
    #[must_use]
    pub const fn new(config: MncrConfig) -> Self {
        Self { config }
    }

    /// Reads and aligns the input files of `input`.
    ///
    /// `policy` applies to FASTA headers; use [`LabelPolicy::Required`] in
    /// testing mode.
    ///
    /// # Errors
    ///
    /// Any reader or alignment error; no batch is produced on failure.
    pub fn assemble(
        &self,
        input: &PipelineInput,
        policy: LabelPolicy,
    ) -> Result<AlignedBatch, MncrError> {
        let variant = input.variant();
        let assembler = DatasetAssembler::new(&self.config, variant);
        if !self.config.quiet {
            info!(
                "Assembling {} batch from {}",
                variant,
                input.primary_path().display()
            );
        }

        let fasta = input
            .fasta()
            .map(|path| read_sequence_records(path, policy))
            .transpose()?;

        match input {
            PipelineInput::SequenceOnly { .. } => {
                assembler.sequence_only(fasta.as_deref().unwrap_or_default())
            }
            PipelineInput::StructureOnly { structures, .. } => {
                let records = read_structure_records(structures, self.config.structure_layout)?;
                assembler.structure_only(&records, fasta.as_deref())
            }
            PipelineInput::GraphOnly { features, .. } => {
                assembler.graph_only(features, fasta.as_deref())
            }
            PipelineInput::Fusion { features, .. } => {
                assembler.fusion(fasta.as_deref().unwrap_or_default(), features)
            }
        }
    }

    /// Invokes `model` once on the batch and decodes every row.
    ///
    /// # Errors
    ///
    /// - [`MncrError::Model`] if the model serves another variant or returns a
    ///   matrix that is not `(batch.len(), 6)`
    /// - whatever the model itself reports
    pub fn classify(
        &self,
        batch: &AlignedBatch,
        model: &dyn Model,
    ) -> Result<Vec<PredictionResult>, MncrError> {
        if model.variant() != batch.variant() {
            return Err(MncrError::Model(format!(
                "{} model cannot classify a {} batch",
                model.variant(),
                batch.variant()
            )));
        }
        let input = ModelInput::from_batch(batch)?;
        let probabilities = model.infer(&input)?;
        let predictions = decode_predictions(batch.identifiers(), &probabilities)?;
        if !self.config.quiet {
            info!("Classified {} sequences with {}", predictions.len(), batch.variant());
        }
        Ok(predictions)
    }

    /// Opens the model, assembles the batch and classifies it.
    ///
    /// The artifact is resolved first so a missing model fails before any
    /// input is read.
    pub fn run(
        &self,
        input: &PipelineInput,
        store: &ModelStore,
        loader: &dyn ModelLoader,
        policy: LabelPolicy,
    ) -> Result<Classification, MncrError> {
        let model = store.open(loader, input.variant())?;
        let batch = self.assemble(input, policy)?;
        let predictions = self.classify(&batch, model.as_ref())?;
        Ok(Classification { batch, predictions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrecomputedModel;
    use crate::types::RnaType;
    use ndarray::{Array2, arr2};
    use std::fs;
    use tempfile::TempDir;

    fn classifier() -> MncrClassifier {
        MncrClassifier::new(MncrConfig {
            sequence_length: 8,
            quiet: true,
            ..Default::default()
        })
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_primary_path() {
        let input = PipelineInput::GraphOnly {
            features: "x.feature".into(),
            fasta: None,
        };
        assert_eq!(input.primary_path(), Path::new("x.feature"));
        assert_eq!(input.fasta(), None);

        let input = PipelineInput::StructureOnly {
            structures: "x.txt".into(),
            fasta: Some("x.fa".into()),
        };
        assert_eq!(input.primary_path(), Path::new("x.fa"));
        assert_eq!(input.variant(), PipelineVariant::StructureOnly);
    }

    #[test]
    fn test_sequence_only_end_to_end() {
        let dir = TempDir::new().unwrap();
        let fasta = write(&dir, "in.fa", ">seq1 tRNA\nACGT\n>seq2 miRNA\nACGTN\n");
        let input = PipelineInput::SequenceOnly { fasta };

        let batch = classifier().assemble(&input, LabelPolicy::Required).unwrap();
        let model = PrecomputedModel::new(
            PipelineVariant::SequenceOnly,
            arr2(&[
                [0.0, 0.0, 0.0, 0.0, 0.1, 0.9],
                [0.1, 0.7, 0.1, 0.0, 0.1, 0.0],
            ]),
        );
        let predictions = classifier().classify(&batch, &model).unwrap();

        assert_eq!(predictions[0].identifier, "seq1");
        assert_eq!(predictions[0].label, RnaType::TRna);
        assert_eq!(predictions[0].confidence, 0.9);
        assert_eq!(predictions[1].label, RnaType::MiRna);
        assert_eq!(batch.complete_labels(), Some(vec![RnaType::TRna, RnaType::MiRna]));
    }

    #[test]
    fn test_variant_mismatch_between_batch_and_model() {
        let dir = TempDir::new().unwrap();
        let fasta = write(&dir, "in.fa", ">a\nACGT\n");
        let batch = classifier()
            .assemble(&PipelineInput::SequenceOnly { fasta }, LabelPolicy::Optional)
            .unwrap();
        let model = PrecomputedModel::new(PipelineVariant::GraphOnly, Array2::zeros((1, 6)));
        let result = classifier().classify(&batch, &model);
        assert!(matches!(result, Err(MncrError::Model(_))));
    }

    #[test]
    fn test_fusion_count_mismatch_aborts_before_inference() {
        let dir = TempDir::new().unwrap();
        let fasta = write(&dir, "in.fa", ">a\nACGT\n>b\nGG\n");
        let features = write(&dir, "in.feature", "1:1.0\n");
        let input = PipelineInput::Fusion { fasta, features };
        let result = classifier().assemble(&input, LabelPolicy::Optional);
        assert!(matches!(
            result,
            Err(MncrError::FeatureCountMismatch {
                features: 1,
                sequences: 2
            })
        ));
    }

    #[test]
    fn test_structure_only_with_layout() {
        let dir = TempDir::new().unwrap();
        let structures = write(&dir, "in.txt", "r1\nACGT\nFSHT\n");
        let input = PipelineInput::StructureOnly {
            structures,
            fasta: None,
        };
        let mut classifier = classifier();
        classifier.config.structure_layout = crate::config::StructureLayout::Cyclic;
        let batch = classifier.assemble(&input, LabelPolicy::Optional).unwrap();
        assert_eq!(batch.identifiers(), ["r1"]);
        assert_eq!(
            batch.structure().unwrap().row(0).to_vec(),
            vec![15, 8, 9, 1, 25, 25, 25, 25]
        );
    }

    #[test]
    fn test_run_reports_missing_artifact_first() {
        let dir = TempDir::new().unwrap();
        // The FASTA does not exist either; the artifact check must win.
        let input = PipelineInput::SequenceOnly {
            fasta: dir.path().join("missing.fa"),
        };
        let store = ModelStore::new(dir.path());
        let loader = crate::model::PrecomputedLoader::new(dir.path().join("p.npy"));
        let result = classifier().run(&input, &store, &loader, LabelPolicy::Optional);
        assert!(matches!(result, Err(MncrError::MissingArtifact(_))));
    }
}
