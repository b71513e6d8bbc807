//! Probability matrices computed outside this process.
//!
//! The network weights are executed by an external inference runtime that
//! consumes the `.npy` tensors written by [`crate::output::export_batch`] and
//! saves an `(N, 6)` float32 probability matrix. [`PrecomputedModel`] serves
//! that matrix back through the [`Model`] interface so decoding, listing and
//! reporting work the same as for any other backend.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array2;
use ndarray_npy::ReadNpyExt;

use crate::config::PipelineVariant;
use crate::model::{Model, ModelInput, ModelLoader};
use crate::types::MncrError;

/// A model whose outputs were computed ahead of time
#[derive(Debug, Clone)]
pub struct PrecomputedModel {
    variant: PipelineVariant,
    probabilities: Array2<f32>,
}

impl PrecomputedModel {
    #[must_use]
    pub fn new(variant: PipelineVariant, probabilities: Array2<f32>) -> Self {
        Self {
            variant,
            probabilities,
        }
    }

    /// Reads a float32 `.npy` probability matrix
    pub fn from_npy<P: AsRef<Path>>(variant: PipelineVariant, path: P) -> Result<Self, MncrError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let probabilities = Array2::<f32>::read_npy(reader)
            .map_err(|e| MncrError::Tensor(format!("{}: {e}", path.display())))?;
        debug!(
            "Read {:?} probability matrix from {}",
            probabilities.dim(),
            path.display()
        );
        Ok(Self::new(variant, probabilities))
    }

    #[must_use]
    pub fn probabilities(&self) -> &Array2<f32> {
        &self.probabilities
    }
}

impl Model for PrecomputedModel {
    fn variant(&self) -> PipelineVariant {
        self.variant
    }

    fn infer(&self, input: &ModelInput<'_>) -> Result<Array2<f32>, MncrError> {
        if input.variant() != self.variant {
            return Err(MncrError::Model(format!(
                "probabilities were computed for {} inputs, got {} inputs",
                self.variant,
                input.variant()
            )));
        }
        if input.rows() != self.probabilities.nrows() {
            return Err(MncrError::Model(format!(
                "probability matrix has {} rows for a batch of {}",
                self.probabilities.nrows(),
                input.rows()
            )));
        }
        Ok(self.probabilities.clone())
    }
}

/// Loads a [`PrecomputedModel`] once the variant's artifact is known to exist
#[derive(Debug, Clone)]
pub struct PrecomputedLoader {
    probabilities: PathBuf,
}

impl PrecomputedLoader {
    pub fn new<P: Into<PathBuf>>(probabilities: P) -> Self {
        Self {
            probabilities: probabilities.into(),
        }
    }
}

impl ModelLoader for PrecomputedLoader {
    fn load(&self, variant: PipelineVariant, artifact: &Path) -> Result<Box<dyn Model>, MncrError> {
        debug!(
            "Using precomputed {} outputs for artifact {}",
            variant,
            artifact.display()
        );
        Ok(Box::new(PrecomputedModel::from_npy(
            variant,
            &self.probabilities,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use ndarray_npy::WriteNpyExt;
    use tempfile::TempDir;

    fn write_probabilities(dir: &TempDir, matrix: &Array2<f32>) -> PathBuf {
        let path = dir.path().join("probabilities.npy");
        matrix.write_npy(File::create(&path).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_from_npy_round_trip() {
        let dir = TempDir::new().unwrap();
        let matrix = arr2(&[[0.1f32, 0.2, 0.3, 0.1, 0.2, 0.1]]);
        let path = write_probabilities(&dir, &matrix);

        let model = PrecomputedModel::from_npy(PipelineVariant::GraphOnly, &path).unwrap();
        assert_eq!(model.probabilities(), &matrix);
        assert_eq!(model.variant(), PipelineVariant::GraphOnly);
    }

    #[test]
    fn test_infer_checks_rows_and_variant() {
        let model = PrecomputedModel::new(PipelineVariant::SequenceOnly, Array2::zeros((2, 6)));
        let tensor = Array2::<u8>::zeros((3, 4));

        let wrong_rows = model.infer(&ModelInput::Sequence(tensor.view()));
        assert!(matches!(wrong_rows, Err(MncrError::Model(_))));

        let wrong_variant = model.infer(&ModelInput::Structure(tensor.view()));
        assert!(matches!(wrong_variant, Err(MncrError::Model(_))));

        let tensor = Array2::<u8>::zeros((2, 4));
        let output = model.infer(&ModelInput::Sequence(tensor.view())).unwrap();
        assert_eq!(output.dim(), (2, 6));
    }

    #[test]
    fn test_loader_reads_matrix() {
        let dir = TempDir::new().unwrap();
        let path = write_probabilities(&dir, &Array2::zeros((1, 6)));
        let loader = PrecomputedLoader::new(&path);
        let model = loader
            .load(PipelineVariant::Fusion, Path::new("merged_fold7.hdf5"))
            .unwrap();
        assert_eq!(model.variant(), PipelineVariant::Fusion);
    }

    #[test]
    fn test_unreadable_matrix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.npy");
        std::fs::write(&path, b"not a numpy file").unwrap();
        let result = PrecomputedModel::from_npy(PipelineVariant::GraphOnly, &path);
        assert!(matches!(result, Err(MncrError::Tensor(_))));
    }
}
