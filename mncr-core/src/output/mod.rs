//! Result listings, tensor export and evaluation output.
//!
//! ## Examples
//!
//! ### Write predictions to stdout
//!
//! ```rust
//! use mncr_core::output::write_predictions;
//! use mncr_core::types::{PredictionResult, RnaType};
//! use std::io::stdout;
//!
//! let predictions = vec![PredictionResult {
//!     identifier: "URS0000".to_string(),
//!     label: RnaType::SnoRna,
//!     confidence: 0.97,
//! }];
//! write_predictions(&mut stdout(), &predictions)?;
//! # Ok::<(), mncr_core::types::MncrError>(())
//! ```
//!
//! ### Evaluate against ground truth
//!
//! ```rust,no_run
//! use mncr_core::output::write_evaluation;
//! use mncr_core::types::RnaType;
//!
//! let truth = [RnaType::TRna, RnaType::MiRna];
//! let predicted = [RnaType::TRna, RnaType::TRna];
//! let report = write_evaluation("results", &truth, &predicted)?;
//! println!("{report}");
//! # Ok::<(), mncr_core::types::MncrError>(())
//! ```

use std::fs;
use std::path::Path;

use log::info;

use crate::constants::{CONFUSION_MATRIX_FILE_NAME, REPORT_FILE_NAME};
use crate::types::{MncrError, RnaType};

pub mod export;
pub mod figure;
pub mod listing;
pub mod report;

pub use export::export_batch;
pub use figure::render_confusion_matrix;
pub use listing::{default_output_path, read_prediction_file, read_predictions, write_predictions};
pub use report::{ClassMetrics, ClassificationReport, ConfusionMatrix, parse_labels, read_label_file};

/// Writes `classification_scores.txt` and `confusion_matrix.svg` into `dir`.
///
/// # Errors
///
/// - [`MncrError::LengthMismatch`] if the label sequences differ in length
/// - [`MncrError::IoError`] or [`MncrError::Render`] when writing fails
pub fn write_evaluation<P: AsRef<Path>>(
    dir: P,
    truth: &[RnaType],
    predicted: &[RnaType],
) -> Result<ClassificationReport, MncrError> {
    let dir = dir.as_ref();
    let matrix = ConfusionMatrix::from_labels(truth, predicted)?;
    let report = ClassificationReport::from_confusion(&matrix);

    fs::create_dir_all(dir)?;
    fs::write(dir.join(REPORT_FILE_NAME), report.to_string())?;
    render_confusion_matrix(dir.join(CONFUSION_MATRIX_FILE_NAME), &matrix)?;

    info!(
        "Wrote evaluation of {} predictions to {}",
        truth.len(),
        dir.display()
    );
    Ok(report)
}
