use ndarray::{Array2, ArrayView1};

use crate::constants::NUM_CLASSES;
use crate::types::{MncrError, PredictionResult, RnaType};

/// Index of the largest value in `row`.
///
/// Ties go to the earliest index and `NaN` never wins. Returns `None` when
/// the row holds no comparable value.
///
/// # Examples
///
/// ```rust
/// use mncr_core::model::argmax;
/// use ndarray::arr1;
///
/// assert_eq!(argmax(arr1(&[0.1, 0.4, 0.4, 0.1]).view()), Some(1));
/// assert_eq!(argmax(arr1(&[f32::NAN, 0.2]).view()), Some(1));
/// assert_eq!(argmax(arr1(&[f32::NAN]).view()), None);
/// ```
#[must_use]
pub fn argmax(row: ArrayView1<'_, f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in row.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Turns a probability matrix into one prediction per identifier.
///
/// # Errors
///
/// Returns [`MncrError::Model`] when the matrix is not `(identifiers.len(), 6)`
/// or a row has no non-`NaN` entry.
pub fn decode_predictions(
    identifiers: &[String],
    probabilities: &Array2<f32>,
) -> Result<Vec<PredictionResult>, MncrError> {
    let (rows, columns) = probabilities.dim();
    if columns != NUM_CLASSES {
        return Err(MncrError::Model(format!(
            "expected {NUM_CLASSES} class probabilities per row, got {columns}"
        )));
    }
    if rows != identifiers.len() {
        return Err(MncrError::Model(format!(
            "model returned {rows} rows for a batch of {}",
            identifiers.len()
        )));
    }

    identifiers
        .iter()
        .zip(probabilities.rows())
        .map(|(identifier, row)| {
            let index = argmax(row).ok_or_else(|| {
                MncrError::Model(format!("no usable probability for {identifier}"))
            })?;
            let label = RnaType::from_index(index)
                .ok_or_else(|| MncrError::Model(format!("class index {index} out of range")))?;
            Ok(PredictionResult {
                identifier: identifier.clone(),
                label,
                confidence: row[index],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, arr1, arr2};

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("r{i}")).collect()
    }

    #[test]
    fn test_one_hot_rows_decode_to_their_class() {
        let probabilities = Array2::<f32>::eye(NUM_CLASSES);
        let predictions = decode_predictions(&ids(NUM_CLASSES), &probabilities).unwrap();
        for (i, prediction) in predictions.iter().enumerate() {
            assert_eq!(prediction.label, RnaType::ALL[i]);
            assert_eq!(prediction.confidence, 1.0);
        }
    }

    #[test]
    fn test_ties_decode_to_earliest_class() {
        let probabilities = arr2(&[
            [0.0, 0.0, 0.5, 0.0, 0.5, 0.0],
            [0.2, 0.2, 0.2, 0.2, 0.1, 0.1],
        ]);
        let predictions = decode_predictions(&ids(2), &probabilities).unwrap();
        assert_eq!(predictions[0].label, RnaType::RRna);
        assert_eq!(predictions[0].confidence, 0.5);
        assert_eq!(predictions[1].label, RnaType::LncRna);
    }

    #[test]
    fn test_nan_never_wins() {
        assert_eq!(argmax(arr1(&[f32::NAN, 0.0, 0.3, f32::NAN]).view()), Some(2));
        assert_eq!(argmax(arr1(&[0.3, f32::NAN, 0.3]).view()), Some(0));

        let probabilities = arr2(&[[f32::NAN; NUM_CLASSES]]);
        let result = decode_predictions(&ids(1), &probabilities);
        assert!(matches!(result, Err(MncrError::Model(_))));
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let probabilities = Array2::<f32>::zeros((2, 5));
        let result = decode_predictions(&ids(2), &probabilities);
        match result {
            Err(MncrError::Model(message)) => assert!(message.contains("got 5")),
            other => panic!("Expected Model error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_row_count_is_rejected() {
        let probabilities = Array2::<f32>::zeros((3, NUM_CLASSES));
        let result = decode_predictions(&ids(2), &probabilities);
        assert!(matches!(result, Err(MncrError::Model(_))));
    }

    #[test]
    fn test_empty_batch() {
        let probabilities = Array2::<f32>::zeros((0, NUM_CLASSES));
        assert!(decode_predictions(&[], &probabilities).unwrap().is_empty());
    }
}
