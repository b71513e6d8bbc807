use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use ndarray::Array2;
use ndarray_npy::{WritableElement, WriteNpyExt};

use crate::dataset::AlignedBatch;
use crate::types::MncrError;

/// Row identifiers, one per line
pub const IDENTIFIERS_FILE_NAME: &str = "identifiers.txt";

/// Ground-truth labels, one per line, written when every row has one
pub const LABELS_FILE_NAME: &str = "labels.txt";

fn write_tensor<A: WritableElement>(path: &Path, tensor: &Array2<A>) -> Result<(), MncrError> {
    let mut writer = BufWriter::new(File::create(path)?);
    tensor
        .write_npy(&mut writer)
        .map_err(|e| MncrError::Tensor(format!("{}: {e}", path.display())))?;
    writer.flush()?;
    Ok(())
}

/// Writes a batch's identifiers, labels and tensors into `dir`.
///
/// Tensors go to `sequence.npy`, `structure.npy` and `graph.npy`, row-aligned
/// with `identifiers.txt`. Returns the files written.
pub fn export_batch<P: AsRef<Path>>(batch: &AlignedBatch, dir: P) -> Result<Vec<PathBuf>, MncrError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join(IDENTIFIERS_FILE_NAME);
    let mut writer = BufWriter::new(File::create(&path)?);
    for identifier in batch.identifiers() {
        writeln!(writer, "{identifier}")?;
    }
    writer.flush()?;
    written.push(path);

    if let Some(labels) = batch.complete_labels() {
        let path = dir.join(LABELS_FILE_NAME);
        let mut writer = BufWriter::new(File::create(&path)?);
        for label in labels {
            writeln!(writer, "{label}")?;
        }
        writer.flush()?;
        written.push(path);
    }

    if let Some(tensor) = batch.sequence() {
        let path = dir.join("sequence.npy");
        write_tensor(&path, tensor)?;
        written.push(path);
    }
    if let Some(tensor) = batch.structure() {
        let path = dir.join("structure.npy");
        write_tensor(&path, tensor)?;
        written.push(path);
    }
    if let Some(tensor) = batch.graph() {
        let path = dir.join("graph.npy");
        write_tensor(&path, tensor)?;
        written.push(path);
    }

    info!(
        "Exported {} {} rows to {}",
        batch.len(),
        batch.variant(),
        dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MncrConfig, PipelineVariant};
    use crate::dataset::DatasetAssembler;
    use crate::types::{RnaType, SequenceRecord};
    use ndarray_npy::ReadNpyExt;
    use tempfile::TempDir;

    #[test]
    fn test_export_sequence_batch() {
        let config = MncrConfig {
            sequence_length: 6,
            ..Default::default()
        };
        let records = vec![
            SequenceRecord::new("x", b"ACG", Some(RnaType::RRna)),
            SequenceRecord::new("y", b"TTTTTTTT", Some(RnaType::SnRna)),
        ];
        let batch = DatasetAssembler::new(&config, PipelineVariant::SequenceOnly)
            .sequence_only(&records)
            .unwrap();

        let dir = TempDir::new().unwrap();
        let written = export_batch(&batch, dir.path().join("out")).unwrap();
        assert_eq!(written.len(), 3);

        let identifiers = fs::read_to_string(dir.path().join("out/identifiers.txt")).unwrap();
        assert_eq!(identifiers, "x\ny\n");
        let labels = fs::read_to_string(dir.path().join("out/labels.txt")).unwrap();
        assert_eq!(labels, "rRNA\nsnRNA\n");

        let file = File::open(dir.path().join("out/sequence.npy")).unwrap();
        let tensor = Array2::<u8>::read_npy(file).unwrap();
        assert_eq!(&tensor, batch.sequence().unwrap());
        assert_eq!(tensor.row(1).to_vec(), vec![11; 6]);
    }

    #[test]
    fn test_export_skips_partial_labels() {
        let config = MncrConfig {
            sequence_length: 2,
            ..Default::default()
        };
        let records = vec![
            SequenceRecord::new("x", b"A", Some(RnaType::RRna)),
            SequenceRecord::new("y", b"C", None),
        ];
        let batch = DatasetAssembler::new(&config, PipelineVariant::SequenceOnly)
            .sequence_only(&records)
            .unwrap();
        let dir = TempDir::new().unwrap();
        export_batch(&batch, dir.path()).unwrap();
        assert!(!dir.path().join("labels.txt").exists());
    }
}
