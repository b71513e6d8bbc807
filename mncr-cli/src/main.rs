//! # MncR CLI - ncRNA Type Classification
//!
//! Command-line front end for the MncR classification pipelines.
//!
//! ## Usage
//!
//! ```bash
//! # Build model input tensors for an external inference runtime
//! mncr encode -m mncr -f test.fasta -g test.feature -d tensors/
//!
//! # Decode the probabilities it produced and write the listing
//! mncr predict -m mncr -f test.fasta -g test.feature -p tensors/probabilities.npy
//!
//! # Testing mode: labels from the FASTA headers, report and figure in results/
//! mncr predict -m seqenc -f test.fasta -p probs.npy --test --report-dir results/
//!
//! # Evaluate an existing listing
//! mncr report -i test_seqenc_predictions.txt -l labels.txt --report-dir results/
//! ```
//!
//! ## Models
//!
//! - `seqenc`: nucleotide sequence (`--fasta`)
//! - `strenc`: secondary structure (`--structure`, optional `--fasta`)
//! - `grenc`: graph-kernel features (`--features`, optional `--fasta`)
//! - `mncr`: sequence and graph features (`--fasta` and `--features`)
//!
//! ## Global Options
//!
//! - `-t, --threads <N>`: Worker threads for encoding (default: all cores)
//! - `-q, --quiet`: Only log warnings and errors
//! - `-v, --verbose`: Log debug detail

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, value_parser};
use log::{Level, error, info};
use mncr_core::constants::{DEFAULT_MODEL_DIR, TARGET_SEQUENCE_LENGTH};
use mncr_core::model::{ModelStore, PrecomputedLoader};
use mncr_core::output::{
    default_output_path, export_batch, read_label_file, read_prediction_file, write_evaluation,
    write_predictions,
};
use mncr_core::sequence::{LabelPolicy, read_sequence_records};
use mncr_core::*;
use simple_logger::init_with_level;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn input_args() -> Vec<Arg> {
    vec![
        Arg::new("model")
            .short('m')
            .long("model")
            .value_name("MODEL")
            .help("Pipeline: seqenc, strenc, grenc or mncr")
            .required(true)
            .value_parser(|s: &str| s.parse::<PipelineVariant>()),
        Arg::new("fasta")
            .short('f')
            .long("fasta")
            .value_name("FILE")
            .help("Input FASTA file")
            .value_parser(value_parser!(PathBuf)),
        Arg::new("structure")
            .short('s')
            .long("structure")
            .value_name("FILE")
            .help("Structure predictor output (identifier, sequence and structure lines)")
            .value_parser(value_parser!(PathBuf)),
        Arg::new("features")
            .short('g')
            .long("features")
            .value_name("FILE")
            .help("Graph-kernel feature file, one index:value line per sequence")
            .value_parser(value_parser!(PathBuf)),
        Arg::new("structure-layout")
            .long("structure-layout")
            .value_name("LAYOUT")
            .help("Structure file line grouping: cyclic or header")
            .default_value("header")
            .value_parser(|s: &str| s.parse::<StructureLayout>()),
        Arg::new("length")
            .long("length")
            .value_name("N")
            .help(format!(
                "Padded sequence length [default: {TARGET_SEQUENCE_LENGTH}]"
            ))
            .value_parser(value_parser!(usize)),
    ]
}

fn cli() -> Command {
    Command::new("mncr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multimodal ncRNA type classification")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("N")
                .help("Worker threads for encoding")
                .global(true)
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log warnings and errors")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug detail")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .subcommand(
            Command::new("encode")
                .about("Assemble model input tensors and write them as .npy files")
                .args(input_args())
                .arg(
                    Arg::new("out-dir")
                        .short('d')
                        .long("out-dir")
                        .value_name("DIR")
                        .help("Directory for identifiers.txt and tensors")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Decode model probabilities into an ncRNA type listing")
                .args(input_args())
                .arg(
                    Arg::new("probabilities")
                        .short('p')
                        .long("probabilities")
                        .value_name("FILE")
                        .help("(N, 6) float32 .npy probability matrix from the inference runtime")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("model-dir")
                        .long("model-dir")
                        .value_name("DIR")
                        .help("Directory holding the pretrained artifacts")
                        .default_value(DEFAULT_MODEL_DIR)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("artifact")
                        .long("artifact")
                        .value_name("FILE")
                        .help("Explicit artifact path for the selected model")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Listing file (default: <input>_<model>_predictions.txt)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("test")
                        .long("test")
                        .help("Testing mode: evaluate against ground-truth labels")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("labels")
                        .short('l')
                        .long("labels")
                        .value_name("FILE")
                        .help("Ground-truth labels, one per line (default: FASTA headers)")
                        .requires("test")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(report_dir_arg()),
        )
        .subcommand(
            Command::new("report")
                .about("Evaluate an existing prediction listing")
                .arg(
                    Arg::new("predictions")
                        .short('i')
                        .long("predictions")
                        .value_name("FILE")
                        .help("Prediction listing (tab or comma separated)")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("labels")
                        .short('l')
                        .long("labels")
                        .value_name("FILE")
                        .help("Ground-truth labels, one per listing line")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("fasta")
                        .short('f')
                        .long("fasta")
                        .value_name("FILE")
                        .help("Labeled FASTA, joined to the listing by identifier")
                        .value_parser(value_parser!(PathBuf)),
                )
                .group(
                    ArgGroup::new("truth")
                        .args(["labels", "fasta"])
                        .required(true),
                )
                .arg(report_dir_arg()),
        )
}

fn report_dir_arg() -> Arg {
    Arg::new("report-dir")
        .long("report-dir")
        .value_name("DIR")
        .help("Directory for classification_scores.txt and confusion_matrix.svg")
        .value_parser(value_parser!(PathBuf))
}

/// Main entry point for the MncR CLI application.
///
/// Configures logging and the thread pool, then runs the selected subcommand.
fn main() -> CliResult<()> {
    let matches = cli().get_matches();

    let quiet = matches.get_flag("quiet");
    let level = if quiet {
        Level::Warn
    } else if matches.get_flag("verbose") {
        Level::Debug
    } else {
        Level::Info
    };
    init_with_level(level)?;

    let num_threads = matches.get_one::<usize>("threads").copied();
    if let Some(threads) = num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let result = match matches.subcommand() {
        Some(("encode", sub)) => run_encode(sub, num_threads, quiet),
        Some(("predict", sub)) => run_predict(sub, num_threads, quiet),
        Some(("report", sub)) => run_report(sub),
        _ => Err("no subcommand given".into()),
    };

    if let Err(e) = &result {
        error!("{e}");
    }
    result
}

fn config_from(sub: &ArgMatches, num_threads: Option<usize>, quiet: bool) -> MncrConfig {
    MncrConfig {
        sequence_length: sub
            .get_one::<usize>("length")
            .copied()
            .unwrap_or(TARGET_SEQUENCE_LENGTH),
        structure_layout: sub
            .get_one::<StructureLayout>("structure-layout")
            .copied()
            .unwrap_or_default(),
        num_threads,
        quiet,
    }
}

/// Collects the files the selected pipeline needs
fn pipeline_input(sub: &ArgMatches) -> CliResult<PipelineInput> {
    let variant = *sub
        .get_one::<PipelineVariant>("model")
        .ok_or("--model is required")?;
    let path = |id: &str| sub.get_one::<PathBuf>(id).cloned();
    let require = |id: &str| path(id).ok_or_else(|| format!("--{id} is required for {variant}"));

    let input = match variant {
        PipelineVariant::SequenceOnly => PipelineInput::SequenceOnly {
            fasta: require("fasta")?,
        },
        PipelineVariant::StructureOnly => PipelineInput::StructureOnly {
            structures: require("structure")?,
            fasta: path("fasta"),
        },
        PipelineVariant::GraphOnly => PipelineInput::GraphOnly {
            features: require("features")?,
            fasta: path("fasta"),
        },
        PipelineVariant::Fusion => PipelineInput::Fusion {
            fasta: require("fasta")?,
            features: require("features")?,
        },
    };
    Ok(input)
}

fn run_encode(sub: &ArgMatches, num_threads: Option<usize>, quiet: bool) -> CliResult<()> {
    let input = pipeline_input(sub)?;
    let classifier = MncrClassifier::new(config_from(sub, num_threads, quiet));
    let batch = classifier.assemble(&input, LabelPolicy::Optional)?;

    let out_dir = sub
        .get_one::<PathBuf>("out-dir")
        .ok_or("--out-dir is required")?;
    let written = export_batch(&batch, out_dir)?;
    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_predict(sub: &ArgMatches, num_threads: Option<usize>, quiet: bool) -> CliResult<()> {
    let input = pipeline_input(sub)?;
    let variant = input.variant();
    let classifier = MncrClassifier::new(config_from(sub, num_threads, quiet));

    let model_dir = sub
        .get_one::<PathBuf>("model-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
    let mut store = ModelStore::new(model_dir);
    if let Some(artifact) = sub.get_one::<PathBuf>("artifact") {
        store = store.with_artifact(variant, artifact);
    }
    let probabilities = sub
        .get_one::<PathBuf>("probabilities")
        .ok_or("--probabilities is required")?;
    let loader = PrecomputedLoader::new(probabilities);

    let testing = sub.get_flag("test");
    let labels_file = sub.get_one::<PathBuf>("labels");
    let policy = if testing && labels_file.is_none() {
        LabelPolicy::Required
    } else {
        LabelPolicy::Optional
    };

    let run = classifier.run(&input, &store, &loader, policy)?;

    let output = sub
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| default_output_path(input.primary_path(), variant));
    let mut writer = BufWriter::new(File::create(&output)?);
    write_predictions(&mut writer, &run.predictions)?;
    writer.flush()?;
    info!(
        "Wrote {} predictions to {}",
        run.predictions.len(),
        output.display()
    );

    if testing {
        let truth = match labels_file {
            Some(path) => read_label_file(path)?,
            None => run
                .batch
                .complete_labels()
                .ok_or("testing mode needs --labels or a FASTA with labeled headers")?,
        };
        let predicted: Vec<RnaType> = run.predictions.iter().map(|p| p.label).collect();
        let report_dir = report_dir(sub, &output);
        let report = write_evaluation(&report_dir, &truth, &predicted)?;
        print!("{report}");
    }
    Ok(())
}

fn run_report(sub: &ArgMatches) -> CliResult<()> {
    let listing = sub
        .get_one::<PathBuf>("predictions")
        .ok_or("--predictions is required")?;
    let predictions = read_prediction_file(listing)?;
    let predicted: Vec<RnaType> = predictions.iter().map(|p| p.label).collect();

    let truth = if let Some(labels) = sub.get_one::<PathBuf>("labels") {
        read_label_file(labels)?
    } else {
        let fasta = sub
            .get_one::<PathBuf>("fasta")
            .ok_or("--labels or --fasta is required")?;
        let labels: HashMap<String, RnaType> = read_sequence_records(fasta, LabelPolicy::Required)?
            .into_iter()
            .filter_map(|record| record.label.map(|label| (record.identifier, label)))
            .collect();
        predictions
            .iter()
            .map(|p| {
                labels
                    .get(&p.identifier)
                    .copied()
                    .ok_or_else(|| MncrError::UnknownIdentifier(p.identifier.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let report = write_evaluation(report_dir(sub, listing), &truth, &predicted)?;
    print!("{report}");
    Ok(())
}

/// `--report-dir`, or the directory of `anchor`
fn report_dir(sub: &ArgMatches, anchor: &Path) -> PathBuf {
    sub.get_one::<PathBuf>("report-dir").cloned().unwrap_or_else(|| {
        anchor
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    })
}
