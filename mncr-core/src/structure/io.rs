use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::config::StructureLayout;
use crate::constants::IDENTIFIER_MARKER;
use crate::types::{MncrError, StructureRecord};

/// Reads a structure predictor's output file.
///
/// Each record is an identifier line, a nucleotide line and a structure
/// label line; `layout` selects how the groups are located.
///
/// # Errors
///
/// - [`MncrError::IoError`] if the file cannot be read
/// - [`MncrError::Format`] for incomplete or misplaced groups
/// - [`MncrError::StructureLengthMismatch`] when a record's two data lines
///   differ in length
/// - [`MncrError::DuplicateIdentifier`] if an identifier repeats
pub fn read_structure_records<P: AsRef<Path>>(
    path: P,
    layout: StructureLayout,
) -> Result<Vec<StructureRecord>, MncrError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let records = parse_structure_records(reader, &path.display().to_string(), layout)?;
    debug!(
        "Read {} structure records from {} ({:?} layout)",
        records.len(),
        path.display(),
        layout
    );
    Ok(records)
}

/// Parses structure records from any buffered reader
pub fn parse_structure_records<R: BufRead>(
    reader: R,
    source_name: &str,
    layout: StructureLayout,
) -> Result<Vec<StructureRecord>, MncrError> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?.trim_end().to_string());
    }

    let records = match layout {
        StructureLayout::Cyclic => group_cyclic(&lines, source_name)?,
        StructureLayout::HeaderScan => group_by_header(&lines, source_name)?,
    };

    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.identifier()) {
            return Err(MncrError::DuplicateIdentifier(record.identifier().to_string()));
        }
    }
    Ok(records)
}

/// First word of an identifier line, without the leading marker
fn identifier_from_line(line: &str) -> &str {
    line.trim_start_matches(IDENTIFIER_MARKER)
        .split_whitespace()
        .next()
        .unwrap_or_default()
}

fn group_cyclic(lines: &[String], source_name: &str) -> Result<Vec<StructureRecord>, MncrError> {
    let used = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |last| last + 1);

    let mut records = Vec::with_capacity(used / 3);
    for (group_index, group) in lines[..used].chunks(3).enumerate() {
        let first_line = group_index * 3 + 1;
        let [header, sequence, structure] = group else {
            return Err(MncrError::format(
                source_name,
                Some(first_line),
                "incomplete record: expected identifier, sequence and structure lines",
            ));
        };
        let identifier = identifier_from_line(header);
        if identifier.is_empty() {
            return Err(MncrError::format(
                source_name,
                Some(first_line),
                "empty identifier line",
            ));
        }
        records.push(StructureRecord::new(
            identifier,
            sequence.as_bytes(),
            structure.as_bytes(),
        )?);
    }
    Ok(records)
}

fn group_by_header(lines: &[String], source_name: &str) -> Result<Vec<StructureRecord>, MncrError> {
    struct Pending<'a> {
        identifier: &'a str,
        line: usize,
        data: Vec<&'a str>,
    }

    fn finish(pending: Pending<'_>, source_name: &str) -> Result<StructureRecord, MncrError> {
        match pending.data.as_slice() {
            [sequence, structure] => {
                StructureRecord::new(pending.identifier, sequence.as_bytes(), structure.as_bytes())
            }
            _ => Err(MncrError::format(
                source_name,
                Some(pending.line),
                format!(
                    "record {} has {} data lines, expected sequence and structure",
                    pending.identifier,
                    pending.data.len()
                ),
            )),
        }
    }

    let mut records = Vec::new();
    let mut pending: Option<Pending<'_>> = None;

    for (index, line) in lines.iter().enumerate() {
        let line_number = index + 1;
        if line.is_empty() {
            continue;
        }
        if line.starts_with(IDENTIFIER_MARKER) {
            if let Some(done) = pending.take() {
                records.push(finish(done, source_name)?);
            }
            let identifier = identifier_from_line(line);
            if identifier.is_empty() {
                return Err(MncrError::format(
                    source_name,
                    Some(line_number),
                    "empty identifier line",
                ));
            }
            pending = Some(Pending {
                identifier,
                line: line_number,
                data: Vec::with_capacity(2),
            });
            continue;
        }

        match pending.as_mut() {
            Some(current) if current.data.len() < 2 => current.data.push(line),
            Some(current) => {
                return Err(MncrError::format(
                    source_name,
                    Some(line_number),
                    format!("unexpected third data line for {}", current.identifier),
                ));
            }
            None => {
                return Err(MncrError::format(
                    source_name,
                    Some(line_number),
                    "data line before the first identifier line",
                ));
            }
        }
    }

    if let Some(done) = pending.take() {
        records.push(finish(done, source_name)?);
    }
    Ok(records)
}
