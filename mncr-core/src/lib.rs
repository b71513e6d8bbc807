//! # MncR - multimodal ncRNA classification
//!
//! Classifies non-coding RNA sequences into six types (lncRNA, miRNA, rRNA,
//! snRNA, snoRNA, tRNA) with pretrained networks fed by one of four input
//! representations.
//!
//! ## Overview
//!
//! The networks themselves are opaque. This library does the deterministic
//! part around them: it turns FASTA sequences, secondary-structure
//! predictions and sparse graph-kernel features into fixed-shape tensors,
//! keeps rows from independently produced files aligned, and decodes the
//! probability matrix a model returns into labels.
//!
//! ## Pipelines
//!
//! | Variant | Name | Inputs | Tensor |
//! |---|---|---|---|
//! | Sequence-only | `seqenc` | FASTA | `(N, 12000)` nucleotide codes |
//! | Structure-only | `strenc` | structure file, optional FASTA | `(N, 12000)` annotated codes |
//! | Graph-only | `grenc` | feature file, optional FASTA | `(N, 32768)` dense features |
//! | Fusion | `mncr` | FASTA and feature file | sequence codes and dense features |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mncr_core::{MncrClassifier, PipelineInput, config::MncrConfig};
//! use mncr_core::model::{ModelStore, PrecomputedLoader};
//! use mncr_core::sequence::LabelPolicy;
//!
//! let classifier = MncrClassifier::new(MncrConfig::default());
//! let input = PipelineInput::SequenceOnly {
//!     fasta: "test.fasta".into(),
//! };
//!
//! // Tensors for an external runtime
//! let batch = classifier.assemble(&input, LabelPolicy::Optional)?;
//! mncr_core::output::export_batch(&batch, "tensors")?;
//!
//! // Decode the probabilities it produced
//! let run = classifier.run(
//!     &input,
//!     &ModelStore::default(),
//!     &PrecomputedLoader::new("tensors/probabilities.npy"),
//!     LabelPolicy::Optional,
//! )?;
//! println!("Classified {} sequences", run.predictions.len());
//! # Ok::<(), mncr_core::types::MncrError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: Run configuration and pipeline variants
//! - [`types`]: Records, labels, predictions and errors
//! - [`sequence`]: FASTA reading and nucleotide encoding
//! - [`structure`]: Structure annotation, structure-file parsing and encoding
//! - [`graph`]: Graph-kernel feature reading
//! - [`dataset`]: Record alignment into batches
//! - [`model`]: Model capability, artifacts and label decoding
//! - [`engine`]: Pipeline dispatch
//! - [`output`]: Listings, tensor export, reports and figures
//!
//! ## Label order
//!
//! Column `j` of every probability matrix is `RnaType::ALL[j]`. The shipped
//! networks were trained with this order; decoding relies on it and never
//! inspects the model.

pub mod config;
pub mod constants;
pub mod dataset;
pub mod engine;
pub mod graph;
pub mod model;
pub mod output;
pub mod sequence;
pub mod structure;
pub mod types;

pub use config::{MncrConfig, Padding, PipelineVariant, StructureLayout};
pub use dataset::{AlignedBatch, DatasetAssembler};
pub use engine::{Classification, MncrClassifier, PipelineInput};
pub use types::{MncrError, PredictionResult, RnaType};
