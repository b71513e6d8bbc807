//! Graph-kernel feature reading.
//!
//! Feature files hold one sparse vector per line as whitespace-separated
//! `index:value` tokens, with no header and no identifiers. Rows are
//! materialized into dense vectors of width 32768.
//!
//! Because the format carries no identifiers, pairing rows with sequences is
//! an ordered zip: row `i` belongs to FASTA record `i`. The only check this
//! crate can make is that the two files have the same number of rows; that
//! both were produced from the same ordered sequence set is an external
//! invariant.
//!
//! ## Examples
//!
//! ```rust
//! use mncr_core::graph::parse_feature_line;
//!
//! let vector = parse_feature_line("5:1.0 10:2.5", "inline", 1)?;
//! let mut dense = vec![0.0; 32768];
//! vector.scatter_into(&mut dense);
//! assert_eq!((dense[5], dense[10]), (1.0, 2.5));
//! # Ok::<(), mncr_core::types::MncrError>(())
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};
use ndarray::Array2;

use crate::constants::{GRAPH_FEATURE_WIDTH, SYNTHETIC_ID_PREFIX};
use crate::types::{GraphFeatureVector, MncrError};

/// How feature rows get their identifiers
#[derive(Debug, Clone, Copy)]
pub enum GraphAlignment<'a> {
    /// Row `i` is named `sequence_<i>`
    Implicit,
    /// Row `i` takes `identifiers[i]`; counts must match
    Joined(&'a [String]),
}

/// Dense feature rows with their identifiers, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct GraphFeatureTable {
    pub identifiers: Vec<String>,
    /// Shape `(identifiers.len(), 32768)`
    pub features: Array2<f32>,
}

/// Synthetic identifier for feature row `row`
#[must_use]
pub fn synthetic_identifier(row: usize) -> String {
    format!("{SYNTHETIC_ID_PREFIX}{row}")
}

/// Number of lines in a feature file, blank lines included
pub fn count_feature_lines<P: AsRef<Path>>(path: P) -> Result<usize, MncrError> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}

/// Fails unless the feature file has exactly `sequences` lines
pub fn check_feature_count(features: usize, sequences: usize) -> Result<(), MncrError> {
    if features != sequences {
        return Err(MncrError::FeatureCountMismatch {
            features,
            sequences,
        });
    }
    Ok(())
}

/// Parses one feature line into a sparse vector.
///
/// # Errors
///
/// Returns [`MncrError::Format`] for tokens that are not `index:value`,
/// indices outside `[0, 32768)` and negative or non-finite values.
pub fn parse_feature_line(
    line: &str,
    source_name: &str,
    line_number: usize,
) -> Result<GraphFeatureVector, MncrError> {
    let bad = |message: String| MncrError::format(source_name, Some(line_number), message);

    let mut entries = Vec::new();
    for token in line.split_whitespace() {
        let (index, value) = token
            .split_once(':')
            .ok_or_else(|| bad(format!("token '{token}' is not index:value")))?;
        let index: usize = index
            .parse()
            .map_err(|_| bad(format!("invalid feature index in '{token}'")))?;
        if index >= GRAPH_FEATURE_WIDTH {
            return Err(bad(format!(
                "feature index {index} outside [0, {GRAPH_FEATURE_WIDTH})"
            )));
        }
        let value: f32 = value
            .parse()
            .map_err(|_| bad(format!("invalid feature value in '{token}'")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(bad(format!("feature value {value} is not a non-negative real")));
        }
        entries.push((index, value));
    }

    Ok(GraphFeatureVector { entries })
}

/// Reads feature files into dense tables.
///
/// The line count is checked against the join target before any line is
/// parsed. Each sparse row is written into the dense table as soon as it is
/// read and then dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphFeatureReader;

impl GraphFeatureReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reads `path` under the given alignment.
    ///
    /// # Errors
    ///
    /// - [`MncrError::FeatureCountMismatch`] in joined mode when the line and
    ///   identifier counts differ, raised before parsing
    /// - [`MncrError::Format`] for an unreadable line
    /// - [`MncrError::IoError`] if the file cannot be read
    pub fn read<P: AsRef<Path>>(
        &self,
        path: P,
        alignment: GraphAlignment<'_>,
    ) -> Result<GraphFeatureTable, MncrError> {
        let path = path.as_ref();
        let rows = count_feature_lines(path)?;

        let identifiers = match alignment {
            GraphAlignment::Joined(identifiers) => {
                check_feature_count(rows, identifiers.len())?;
                identifiers.to_vec()
            }
            GraphAlignment::Implicit => (0..rows).map(synthetic_identifier).collect(),
        };

        info!(
            "Reading {} graph feature vectors from {}",
            rows,
            path.display()
        );

        let source_name = path.display().to_string();
        let reader = BufReader::new(File::open(path)?);
        let mut dense = vec![0.0f32; rows * GRAPH_FEATURE_WIDTH];
        let mut parsed = 0;

        for (row, line) in reader.lines().enumerate() {
            let line = line?;
            if row >= rows {
                // File grew between the two passes.
                return Err(MncrError::FeatureCountMismatch {
                    features: row + 1,
                    sequences: rows,
                });
            }
            let vector = parse_feature_line(&line, &source_name, row + 1)?;
            let start = row * GRAPH_FEATURE_WIDTH;
            vector.scatter_into(&mut dense[start..start + GRAPH_FEATURE_WIDTH]);
            parsed += 1;
        }

        if parsed != rows {
            return Err(MncrError::FeatureCountMismatch {
                features: parsed,
                sequences: rows,
            });
        }
        debug!("Materialized {} x {} feature matrix", rows, GRAPH_FEATURE_WIDTH);

        let features = Array2::from_shape_vec((rows, GRAPH_FEATURE_WIDTH), dense)
            .map_err(|e| MncrError::Tensor(e.to_string()))?;

        Ok(GraphFeatureTable {
            identifiers,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn feature_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_parse_feature_line_density() {
        let vector = parse_feature_line("5:1.0 10:2.5", "t", 1).unwrap();
        assert_eq!(vector.entries, vec![(5, 1.0), (10, 2.5)]);
        let mut dense = vec![0.0; GRAPH_FEATURE_WIDTH];
        vector.scatter_into(&mut dense);
        for (i, &value) in dense.iter().enumerate() {
            match i {
                5 => assert_eq!(value, 1.0),
                10 => assert_eq!(value, 2.5),
                _ => assert_eq!(value, 0.0),
            }
        }
    }

    #[test]
    fn test_parse_feature_line_variable_precision_and_spacing() {
        let vector = parse_feature_line("  0:0.123456789\t32767:3  7:1e-3 \n", "t", 1).unwrap();
        assert_eq!(vector.entries.len(), 3);
        assert_eq!(vector.entries[1], (32767, 3.0));
        assert!((vector.entries[2].1 - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_parse_feature_line_blank_is_zero_vector() {
        let vector = parse_feature_line("", "t", 1).unwrap();
        assert!(vector.entries.is_empty());
        let mut dense = vec![0.0; GRAPH_FEATURE_WIDTH];
        vector.scatter_into(&mut dense);
        assert!(dense.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_parse_feature_line_rejects_bad_tokens() {
        for line in ["5", "x:1.0", "5:abc", "32768:1.0", "-1:1.0", "3:-0.5", "3:NaN"] {
            let result = parse_feature_line(line, "t.feature", 7);
            match result {
                Err(MncrError::Format { line, .. }) => assert_eq!(line, Some(7)),
                other => panic!("Expected Format error for {:?}, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_implicit_mode_synthesizes_identifiers() {
        let file = feature_file("1:1.0\n2:2.0\n\n");
        let table = GraphFeatureReader::new()
            .read(file.path(), GraphAlignment::Implicit)
            .unwrap();
        assert_eq!(
            table.identifiers,
            vec!["sequence_0", "sequence_1", "sequence_2"]
        );
        assert_eq!(table.features.dim(), (3, GRAPH_FEATURE_WIDTH));
        assert_eq!(table.features[[0, 1]], 1.0);
        assert_eq!(table.features[[1, 2]], 2.0);
        assert_eq!(table.features.row(2).sum(), 0.0);
    }

    #[test]
    fn test_joined_mode_pairs_in_order() {
        let file = feature_file("3:0.5\n4:0.25\n");
        let ids = vec!["first".to_string(), "second".to_string()];
        let table = GraphFeatureReader::new()
            .read(file.path(), GraphAlignment::Joined(&ids))
            .unwrap();
        assert_eq!(table.identifiers, ids);
        assert_eq!(table.features[[0, 3]], 0.5);
        assert_eq!(table.features[[1, 4]], 0.25);
    }

    #[test]
    fn test_joined_mode_count_mismatch_is_fatal() {
        // The malformed second line proves the check runs before parsing.
        let file = feature_file("3:0.5\nnot-a-feature\n");
        let ids = vec!["only".to_string()];
        let result = GraphFeatureReader::new().read(file.path(), GraphAlignment::Joined(&ids));
        match result {
            Err(MncrError::FeatureCountMismatch {
                features,
                sequences,
            }) => {
                assert_eq!(features, 2);
                assert_eq!(sequences, 1);
            }
            other => panic!("Expected FeatureCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let file = feature_file("1:1.0\n2:oops\n");
        let result = GraphFeatureReader::new().read(file.path(), GraphAlignment::Implicit);
        assert!(matches!(result, Err(MncrError::Format { line: Some(2), .. })));
    }

    #[test]
    fn test_count_feature_lines() {
        let file = feature_file("a\n\nb");
        assert_eq!(count_feature_lines(file.path()).unwrap(), 3);
        assert!(check_feature_count(3, 3).is_ok());
        assert!(check_feature_count(3, 4).is_err());
    }
}
