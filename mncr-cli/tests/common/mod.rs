#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use mncr_core::config::PipelineVariant;
use ndarray::Array2;
use ndarray_npy::WriteNpyExt;
use tempfile::TempDir;

pub const TWO_RECORD_FASTA: &str = ">seq1 tRNA\nACGT\n>seq2 miRNA\nACGTN\n";

/// The mncr binary with logging reduced to warnings
pub fn mncr() -> Command {
    let mut cmd = Command::cargo_bin("mncr").unwrap();
    cmd.arg("--quiet");
    cmd
}

/// Writes `content` to `name` inside `dir`
pub fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Writes an `(rows.len(), 6)` float32 probability matrix
pub fn write_probabilities(dir: &TempDir, name: &str, rows: &[[f32; 6]]) -> PathBuf {
    let path = dir.path().join(name);
    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    let matrix = Array2::from_shape_vec((rows.len(), 6), flat).unwrap();
    matrix.write_npy(File::create(&path).unwrap()).unwrap();
    path
}

/// Creates `<dir>/model_files/<artifact>` for each variant and returns the
/// model directory
pub fn install_artifacts(dir: &TempDir, variants: &[PipelineVariant]) -> PathBuf {
    let model_dir = dir.path().join("model_files");
    fs::create_dir_all(&model_dir).unwrap();
    for variant in variants {
        fs::write(model_dir.join(variant.artifact_name()), b"weights").unwrap();
    }
    model_dir
}

/// Reads a text file with tabs shown as ` | ` for readable snapshots
pub fn read_listing(path: &Path) -> String {
    fs::read_to_string(path).unwrap().replace('\t', " | ")
}
