//! Record alignment.
//!
//! Merges what the sequence, structure and graph readers produce into one
//! [`AlignedBatch`] per run, holding only the tensors the selected pipeline
//! consumes. Row order is the order of the primary input: the FASTA file when
//! one is supplied, otherwise the structure or feature file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, info};
use ndarray::Array2;

use crate::config::{MncrConfig, PipelineVariant};
use crate::graph::{GraphAlignment, GraphFeatureReader};
use crate::sequence::SequenceEncoder;
use crate::structure::{StructureEncoder, annotate_record};
use crate::types::{MncrError, RnaType, SequenceRecord, StructureRecord};

/// Fixed-shape inputs for one pipeline run, one row per identifier.
///
/// Every tensor present has exactly `identifiers.len()` rows, and row `i` of
/// each belongs to `identifiers[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedBatch {
    variant: PipelineVariant,
    identifiers: Vec<String>,
    labels: Vec<Option<RnaType>>,
    sequence: Option<Array2<u8>>,
    structure: Option<Array2<u8>>,
    graph: Option<Array2<f32>>,
}

impl AlignedBatch {
    fn new(
        variant: PipelineVariant,
        identifiers: Vec<String>,
        labels: Vec<Option<RnaType>>,
        sequence: Option<Array2<u8>>,
        structure: Option<Array2<u8>>,
        graph: Option<Array2<f32>>,
    ) -> Result<Self, MncrError> {
        let rows = identifiers.len();
        let tensor_rows = [
            ("labels", Some(labels.len())),
            ("sequence tensor", sequence.as_ref().map(Array2::nrows)),
            ("structure tensor", structure.as_ref().map(Array2::nrows)),
            ("graph tensor", graph.as_ref().map(Array2::nrows)),
        ];
        for (name, count) in tensor_rows {
            if let Some(count) = count
                && count != rows
            {
                return Err(MncrError::LengthMismatch(format!(
                    "{name} has {count} rows for {rows} identifiers"
                )));
            }
        }

        Ok(Self {
            variant,
            identifiers,
            labels,
            sequence,
            structure,
            graph,
        })
    }

    #[must_use]
    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    #[must_use]
    pub fn labels(&self) -> &[Option<RnaType>] {
        &self.labels
    }

    /// Ground-truth labels, if every row has one
    #[must_use]
    pub fn complete_labels(&self) -> Option<Vec<RnaType>> {
        self.labels.iter().copied().collect()
    }

    #[must_use]
    pub fn sequence(&self) -> Option<&Array2<u8>> {
        self.sequence.as_ref()
    }

    #[must_use]
    pub fn structure(&self) -> Option<&Array2<u8>> {
        self.structure.as_ref()
    }

    #[must_use]
    pub fn graph(&self) -> Option<&Array2<f32>> {
        self.graph.as_ref()
    }
}

/// Builds an [`AlignedBatch`] for each pipeline variant
#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    sequence_encoder: SequenceEncoder,
    structure_encoder: StructureEncoder,
}

impl DatasetAssembler {
    #[must_use]
    pub fn new(config: &MncrConfig, variant: PipelineVariant) -> Self {
        Self {
            sequence_encoder: SequenceEncoder::new(config.sequence_length, variant.padding()),
            structure_encoder: StructureEncoder::new(config.sequence_length, variant.padding()),
        }
    }

    /// Sequence-only rows in FASTA order
    pub fn sequence_only(&self, records: &[SequenceRecord]) -> Result<AlignedBatch, MncrError> {
        let tensor = self.sequence_encoder.encode(records)?;
        let (identifiers, labels) = identifiers_and_labels(records);
        info!("Assembled {} rows for sequence-only classification", records.len());
        AlignedBatch::new(
            PipelineVariant::SequenceOnly,
            identifiers,
            labels,
            Some(tensor),
            None,
            None,
        )
    }

    /// Structure-only rows.
    ///
    /// Without a FASTA the rows follow the structure file. With one, the rows
    /// and labels follow the FASTA: each FASTA identifier needs a structure
    /// record, and no structure record may name an identifier the FASTA lacks.
    ///
    /// # Errors
    ///
    /// - [`MncrError::MissingField`] when a FASTA record has no structure
    /// - [`MncrError::UnknownIdentifier`] for a structure record outside the FASTA
    /// - [`MncrError::StructureLengthMismatch`] from annotation
    pub fn structure_only(
        &self,
        structures: &[StructureRecord],
        fasta: Option<&[SequenceRecord]>,
    ) -> Result<AlignedBatch, MncrError> {
        let (ordered, identifiers, labels) = match fasta {
            None => (
                structures.iter().collect::<Vec<_>>(),
                structures
                    .iter()
                    .map(|r| r.identifier().to_string())
                    .collect::<Vec<_>>(),
                vec![None; structures.len()],
            ),
            Some(records) => {
                let ordered = order_structures_by_fasta(structures, records)?;
                let (identifiers, labels) = identifiers_and_labels(records);
                (ordered, identifiers, labels)
            }
        };

        let annotated = ordered
            .iter()
            .map(|record| annotate_record(record))
            .collect::<Result<Vec<_>, _>>()?;
        let tensor = self.structure_encoder.encode_annotated(&annotated)?;
        info!("Assembled {} rows for structure-only classification", identifiers.len());

        AlignedBatch::new(
            PipelineVariant::StructureOnly,
            identifiers,
            labels,
            None,
            Some(tensor),
            None,
        )
    }

    /// Graph-only rows from a feature file.
    ///
    /// With a FASTA the rows take its identifiers and labels in order, after
    /// the line count has been checked against it; without one they are
    /// named `sequence_<i>`.
    pub fn graph_only<P: AsRef<Path>>(
        &self,
        features: P,
        fasta: Option<&[SequenceRecord]>,
    ) -> Result<AlignedBatch, MncrError> {
        let reader = GraphFeatureReader::new();
        let (table, labels) = match fasta {
            Some(records) => {
                let (identifiers, labels) = identifiers_and_labels(records);
                let table = reader.read(features, GraphAlignment::Joined(&identifiers))?;
                (table, labels)
            }
            None => {
                let table = reader.read(features, GraphAlignment::Implicit)?;
                let labels = vec![None; table.identifiers.len()];
                (table, labels)
            }
        };
        info!("Assembled {} rows for graph-only classification", table.identifiers.len());

        AlignedBatch::new(
            PipelineVariant::GraphOnly,
            table.identifiers,
            labels,
            None,
            None,
            Some(table.features),
        )
    }

    /// Fusion rows: FASTA record `i` paired with feature line `i`.
    ///
    /// The line count is the only consistency check the feature format allows,
    /// and it runs before either input is encoded.
    pub fn fusion<P: AsRef<Path>>(
        &self,
        records: &[SequenceRecord],
        features: P,
    ) -> Result<AlignedBatch, MncrError> {
        let (identifiers, labels) = identifiers_and_labels(records);
        let table = GraphFeatureReader::new().read(features, GraphAlignment::Joined(&identifiers))?;
        let tensor = self.sequence_encoder.encode(records)?;
        info!("Assembled {} rows for fusion classification", identifiers.len());

        AlignedBatch::new(
            PipelineVariant::Fusion,
            identifiers,
            labels,
            Some(tensor),
            None,
            Some(table.features),
        )
    }
}

fn identifiers_and_labels(records: &[SequenceRecord]) -> (Vec<String>, Vec<Option<RnaType>>) {
    records
        .iter()
        .map(|record| (record.identifier.clone(), record.label))
        .unzip()
}

fn order_structures_by_fasta<'a>(
    structures: &'a [StructureRecord],
    records: &[SequenceRecord],
) -> Result<Vec<&'a StructureRecord>, MncrError> {
    let by_identifier: HashMap<&str, &StructureRecord> = structures
        .iter()
        .map(|record| (record.identifier(), record))
        .collect();

    let ordered = records
        .iter()
        .map(|record| {
            by_identifier
                .get(record.identifier.as_str())
                .copied()
                .ok_or_else(|| MncrError::MissingField {
                    identifier: record.identifier.clone(),
                    field: "structure",
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let known: HashSet<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
    if let Some(extra) = structures.iter().find(|s| !known.contains(s.identifier())) {
        return Err(MncrError::UnknownIdentifier(extra.identifier().to_string()));
    }

    debug!("Ordered {} structure records by FASTA", ordered.len());
    Ok(ordered)
}
