//! Evaluation of predictions against ground truth.
//!
//! Everything here is a pure function of the two label sequences over the
//! fixed six-class label set; classes absent from both still appear, with
//! zero scores.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::NUM_CLASSES;
use crate::types::{MncrError, RnaType};

/// Confusion counts, rows indexed by true class and columns by predicted
/// class in canonical order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    counts: [[usize; NUM_CLASSES]; NUM_CLASSES],
}

impl ConfusionMatrix {
    /// Counts paired labels.
    ///
    /// # Errors
    ///
    /// Returns [`MncrError::LengthMismatch`] if the sequences differ in length.
    pub fn from_labels(truth: &[RnaType], predicted: &[RnaType]) -> Result<Self, MncrError> {
        check_lengths(truth, predicted)?;
        let mut counts = [[0; NUM_CLASSES]; NUM_CLASSES];
        for (t, p) in truth.iter().zip(predicted) {
            counts[t.to_index()][p.to_index()] += 1;
        }
        Ok(Self { counts })
    }

    #[must_use]
    pub fn counts(&self) -> &[[usize; NUM_CLASSES]; NUM_CLASSES] {
        &self.counts
    }

    #[must_use]
    pub fn count(&self, truth: RnaType, predicted: RnaType) -> usize {
        self.counts[truth.to_index()][predicted.to_index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Samples whose true class is `class`
    #[must_use]
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Samples predicted as `class`
    #[must_use]
    pub fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    /// Each row divided by its sum; rows without samples stay zero
    #[must_use]
    pub fn normalized(&self) -> [[f64; NUM_CLASSES]; NUM_CLASSES] {
        let mut normalized = [[0.0; NUM_CLASSES]; NUM_CLASSES];
        for (row, counts) in normalized.iter_mut().zip(&self.counts) {
            let total: usize = counts.iter().sum();
            if total == 0 {
                continue;
            }
            for (cell, &count) in row.iter_mut().zip(counts) {
                *cell = count as f64 / total as f64;
            }
        }
        normalized
    }

    /// Multiclass Matthews correlation coefficient; 0 when undefined
    #[must_use]
    pub fn matthews_correlation(&self) -> f64 {
        let samples = self.total() as f64;
        let correct: f64 = (0..NUM_CLASSES).map(|k| self.counts[k][k] as f64).sum();
        let true_sums: Vec<f64> = (0..NUM_CLASSES).map(|k| self.support(k) as f64).collect();
        let pred_sums: Vec<f64> = (0..NUM_CLASSES).map(|k| self.predicted(k) as f64).collect();

        let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
        let cov_true_pred = correct * samples - dot(&true_sums, &pred_sums);
        let cov_pred_pred = samples * samples - dot(&pred_sums, &pred_sums);
        let cov_true_true = samples * samples - dot(&true_sums, &true_sums);

        let denominator = cov_pred_pred * cov_true_true;
        if denominator == 0.0 {
            return 0.0;
        }
        cov_true_pred / denominator.sqrt()
    }
}

/// Precision, recall, F1 and support for one class or an average
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn average<W>(classes: &[ClassMetrics], weight: W, norm: f64, support: usize) -> ClassMetrics
where
    W: Fn(&ClassMetrics) -> f64,
{
    let mean = |field: fn(&ClassMetrics) -> f64| {
        if norm == 0.0 {
            0.0
        } else {
            classes.iter().map(|c| field(c) * weight(c)).sum::<f64>() / norm
        }
    };
    ClassMetrics {
        precision: mean(|c| c.precision),
        recall: mean(|c| c.recall),
        f1: mean(|c| c.f1),
        support,
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Per-class scores, accuracy, averages and MCC
///
/// # Examples
///
/// ```rust
/// use mncr_core::output::ClassificationReport;
/// use mncr_core::types::RnaType;
///
/// let truth = [RnaType::TRna, RnaType::MiRna, RnaType::MiRna];
/// let predicted = [RnaType::TRna, RnaType::MiRna, RnaType::TRna];
/// let report = ClassificationReport::from_labels(&truth, &predicted)?;
///
/// assert_eq!(report.class(RnaType::MiRna).recall, 0.5);
/// assert!((report.accuracy - 2.0 / 3.0).abs() < 1e-12);
/// # Ok::<(), mncr_core::types::MncrError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; NUM_CLASSES],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub mcc: f64,
    pub total: usize,
}

impl ClassificationReport {
    pub fn from_labels(truth: &[RnaType], predicted: &[RnaType]) -> Result<Self, MncrError> {
        Ok(Self::from_confusion(&ConfusionMatrix::from_labels(truth, predicted)?))
    }

    #[must_use]
    pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
        let mut classes = [ClassMetrics::default(); NUM_CLASSES];
        for (k, metrics) in classes.iter_mut().enumerate() {
            let hits = matrix.counts()[k][k];
            let precision = ratio(hits, matrix.predicted(k));
            let recall = ratio(hits, matrix.support(k));
            *metrics = ClassMetrics {
                precision,
                recall,
                f1: f1_score(precision, recall),
                support: matrix.support(k),
            };
        }

        let total = matrix.total();
        let correct = (0..NUM_CLASSES).map(|k| matrix.counts()[k][k]).sum();

        let macro_avg = average(&classes, |_| 1.0, NUM_CLASSES as f64, total);
        let weighted_avg = average(&classes, |c| c.support as f64, total as f64, total);

        Self {
            classes,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            mcc: matrix.matthews_correlation(),
            total,
        }
    }

    #[must_use]
    pub fn class(&self, rna_type: RnaType) -> &ClassMetrics {
        &self.classes[rna_type.to_index()]
    }
}

fn write_metrics_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{name:>12}  {:>9.4} {:>9.4} {:>9.4} {:>9}",
        m.precision, m.recall, m.f1, m.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (rna_type, metrics) in RnaType::ALL.iter().zip(&self.classes) {
            write_metrics_row(f, rna_type.as_str(), metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}  {:>9} {:>9} {:>9.4} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        write_metrics_row(f, "macro avg", &self.macro_avg)?;
        write_metrics_row(f, "weighted avg", &self.weighted_avg)?;
        writeln!(f)?;
        writeln!(f, "Matthews Correlation Coefficient: {:.4}", self.mcc)
    }
}

fn check_lengths(truth: &[RnaType], predicted: &[RnaType]) -> Result<(), MncrError> {
    if truth.len() != predicted.len() {
        return Err(MncrError::LengthMismatch(format!(
            "{} ground-truth labels for {} predictions",
            truth.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Reads a labels file: one canonical type name per line, line `n` for row
/// `n`. Blank lines are skipped.
pub fn read_label_file<P: AsRef<Path>>(path: P) -> Result<Vec<RnaType>, MncrError> {
    let path = path.as_ref();
    parse_labels(BufReader::new(File::open(path)?), &path.display().to_string())
}

/// Parses labels from any buffered reader
pub fn parse_labels<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<RnaType>, MncrError> {
    let mut labels = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let label = token.parse().map_err(|_| {
            MncrError::format(source_name, Some(index + 1), format!("unknown label '{token}'"))
        })?;
        labels.push(label);
    }
    Ok(labels)
}
