use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::config::PipelineVariant;
use crate::types::{MncrError, PredictionResult, RnaType};

/// Writes one `identifier<TAB>label<TAB>confidence` line per prediction
pub fn write_predictions<W: Write>(
    writer: &mut W,
    predictions: &[PredictionResult],
) -> Result<(), MncrError> {
    for prediction in predictions {
        writeln!(writer, "{prediction}")?;
    }
    Ok(())
}

/// Reads a prediction listing file
pub fn read_prediction_file<P: AsRef<Path>>(path: P) -> Result<Vec<PredictionResult>, MncrError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    read_predictions(reader, &path.display().to_string())
}

/// Parses a prediction listing.
///
/// Lines hold identifier, label and confidence separated by tabs, or by
/// commas when a line contains no tab. Blank lines are skipped.
pub fn read_predictions<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<Vec<PredictionResult>, MncrError> {
    let mut predictions = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let bad = |message: String| MncrError::format(source_name, Some(index + 1), message);

        let separator = if line.contains('\t') { '\t' } else { ',' };
        let fields: Vec<&str> = line.split(separator).map(str::trim).collect();
        let [identifier, label, confidence] = fields.as_slice() else {
            return Err(bad(format!(
                "expected identifier, label and confidence, found {} fields",
                fields.len()
            )));
        };

        let label: RnaType = label
            .parse()
            .map_err(|_| bad(format!("unknown label '{label}'")))?;
        let confidence: f32 = confidence
            .parse()
            .map_err(|_| bad(format!("invalid confidence '{confidence}'")))?;

        predictions.push(PredictionResult {
            identifier: (*identifier).to_string(),
            label,
            confidence,
        });
    }
    Ok(predictions)
}

/// `<dir>/<stem>_<variant>_predictions.txt` next to the primary input
#[must_use]
pub fn default_output_path(primary: &Path, variant: PipelineVariant) -> PathBuf {
    let stem = primary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    primary.with_file_name(format!("{stem}_{}_predictions.txt", variant.name()))
}
