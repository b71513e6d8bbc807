use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::PipelineVariant;
use crate::constants::DEFAULT_MODEL_DIR;
use crate::model::Model;
use crate::types::MncrError;

/// Opens a pretrained artifact for a pipeline variant
pub trait ModelLoader {
    fn load(&self, variant: PipelineVariant, artifact: &Path) -> Result<Box<dyn Model>, MncrError>;
}

/// Resolves pretrained artifacts on disk.
///
/// Each variant's artifact lives at `<root>/<artifact name>` unless an
/// explicit path was registered for it.
///
/// # Examples
///
/// ```rust
/// use mncr_core::config::PipelineVariant;
/// use mncr_core::model::ModelStore;
/// use std::path::Path;
///
/// let store = ModelStore::new("models")
///     .with_artifact(PipelineVariant::GraphOnly, "custom/grenc.hdf5");
///
/// assert_eq!(
///     store.artifact_path(PipelineVariant::SequenceOnly),
///     Path::new("models/seqenc_fold8.hdf5")
/// );
/// assert_eq!(
///     store.artifact_path(PipelineVariant::GraphOnly),
///     Path::new("custom/grenc.hdf5")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
    overrides: HashMap<PipelineVariant, PathBuf>,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_DIR)
    }
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            overrides: HashMap::new(),
        }
    }

    /// Uses `path` as the artifact for `variant`
    #[must_use]
    pub fn with_artifact<P: Into<PathBuf>>(mut self, variant: PipelineVariant, path: P) -> Self {
        self.overrides.insert(variant, path.into());
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn artifact_path(&self, variant: PipelineVariant) -> PathBuf {
        self.overrides
            .get(&variant)
            .cloned()
            .unwrap_or_else(|| self.root.join(variant.artifact_name()))
    }

    /// Fails with [`MncrError::MissingArtifact`] unless the artifact exists
    pub fn require(&self, variant: PipelineVariant) -> Result<PathBuf, MncrError> {
        let path = self.artifact_path(variant);
        if !path.is_file() {
            return Err(MncrError::MissingArtifact(path));
        }
        Ok(path)
    }

    /// Opens the artifact for `variant` with `loader`.
    ///
    /// # Errors
    ///
    /// - [`MncrError::MissingArtifact`] if the artifact file does not exist
    /// - [`MncrError::Model`] if the loaded model serves another variant
    /// - anything the loader reports
    pub fn open(
        &self,
        loader: &dyn ModelLoader,
        variant: PipelineVariant,
    ) -> Result<Box<dyn Model>, MncrError> {
        let path = self.require(variant)?;
        info!("Loading {} model from {}", variant, path.display());
        let model = loader.load(variant, &path)?;
        if model.variant() != variant {
            return Err(MncrError::Model(format!(
                "artifact {} serves {} inputs, not {}",
                path.display(),
                model.variant(),
                variant
            )));
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelInput;
    use ndarray::Array2;
    use tempfile::TempDir;

    struct FixedLoader(PipelineVariant);

    struct FixedModel(PipelineVariant);

    impl Model for FixedModel {
        fn variant(&self) -> PipelineVariant {
            self.0
        }

        fn infer(&self, input: &ModelInput<'_>) -> Result<Array2<f32>, MncrError> {
            Ok(Array2::zeros((input.rows(), 6)))
        }
    }

    impl ModelLoader for FixedLoader {
        fn load(&self, _: PipelineVariant, _: &Path) -> Result<Box<dyn Model>, MncrError> {
            Ok(Box::new(FixedModel(self.0)))
        }
    }

    #[test]
    fn test_default_store_uses_model_files() {
        let store = ModelStore::default();
        assert_eq!(store.root(), Path::new("model_files"));
        assert_eq!(
            store.artifact_path(PipelineVariant::Fusion),
            Path::new("model_files/merged_fold7.hdf5")
        );
    }

    #[test]
    fn test_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let result = store.open(&FixedLoader(PipelineVariant::SequenceOnly), PipelineVariant::SequenceOnly);
        match result {
            Err(MncrError::MissingArtifact(path)) => {
                assert_eq!(path, dir.path().join("seqenc_fold8.hdf5"))
            }
            Err(other) => panic!("Expected MissingArtifact, got {:?}", other),
            Ok(_) => panic!("Expected MissingArtifact"),
        }
    }

    #[test]
    fn test_open_existing_artifact() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("strenc_fold7.hdf5"), b"weights").unwrap();
        let store = ModelStore::new(dir.path());
        let model = store
            .open(&FixedLoader(PipelineVariant::StructureOnly), PipelineVariant::StructureOnly)
            .unwrap();
        assert_eq!(model.variant(), PipelineVariant::StructureOnly);
    }

    #[test]
    fn test_variant_mismatch() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("grenc_fold2.hdf5"), b"weights").unwrap();
        let store = ModelStore::new(dir.path());
        let result = store.open(&FixedLoader(PipelineVariant::Fusion), PipelineVariant::GraphOnly);
        assert!(matches!(result, Err(MncrError::Model(_))));
    }
}
