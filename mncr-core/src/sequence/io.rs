use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use bio::io::fasta;
use log::debug;

use crate::types::{MncrError, RnaType, SequenceRecord};

/// How ground-truth labels in FASTA headers (`>ID rna_type`) are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// Take the first description token as the label when it names a known
    /// type; anything else is ordinary description text.
    #[default]
    Optional,
    /// Every header must carry a known type as its first description token
    Required,
}

/// Reads every record of a FASTA file, uppercasing sequences.
///
/// # Errors
///
/// - [`MncrError::IoError`] if the file cannot be opened
/// - [`MncrError::Format`] for malformed FASTA or, under
///   [`LabelPolicy::Required`], a header without a valid label
/// - [`MncrError::DuplicateIdentifier`] if an identifier repeats
pub fn read_sequence_records<P: AsRef<Path>>(
    path: P,
    policy: LabelPolicy,
) -> Result<Vec<SequenceRecord>, MncrError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = parse_sequence_records(file, &path.display().to_string(), policy)?;
    debug!("Read {} sequences from {}", records.len(), path.display());
    Ok(records)
}

/// Parses FASTA content from any reader. `source_name` is used in errors.
pub fn parse_sequence_records<R: Read>(
    reader: R,
    source_name: &str,
    policy: LabelPolicy,
) -> Result<Vec<SequenceRecord>, MncrError> {
    let reader = fasta::Reader::new(reader);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| MncrError::format(source_name, None, e.to_string()))?;
        let identifier = record.id().to_string();
        if identifier.is_empty() {
            return Err(MncrError::format(
                source_name,
                None,
                format!("record {} has an empty identifier", records.len() + 1),
            ));
        }
        if !seen.insert(identifier.clone()) {
            return Err(MncrError::DuplicateIdentifier(identifier));
        }

        let label = header_label(&identifier, record.desc(), source_name, policy)?;
        records.push(SequenceRecord::new(identifier, record.seq(), label));
    }

    Ok(records)
}

fn header_label(
    identifier: &str,
    description: Option<&str>,
    source_name: &str,
    policy: LabelPolicy,
) -> Result<Option<RnaType>, MncrError> {
    let token = description.and_then(|d| d.split_whitespace().next());
    match (policy, token) {
        (LabelPolicy::Optional, token) => Ok(token.and_then(|t| t.parse().ok())),
        (LabelPolicy::Required, Some(token)) => token.parse().map(Some).map_err(|_| {
            MncrError::format(
                source_name,
                None,
                format!("header of {identifier} has unknown label '{token}'"),
            )
        }),
        (LabelPolicy::Required, None) => Err(MncrError::format(
            source_name,
            None,
            format!("header of {identifier} carries no label"),
        )),
    }
}
