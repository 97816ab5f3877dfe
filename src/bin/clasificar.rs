//! Clasificar CLI - Multi-Label News Article Classification
//!
//! Train a classifier on a labeled article corpus, cross-validate it, and
//! classify directories of unlabeled articles.

use clap::{Parser, Subcommand};
use clasificar::corpus::{DocumentCodec, LoadReport};
use clasificar::data::{to_prediction_set, DatasetBuilder, LabelIndex};
use clasificar::eval::KFoldEvaluator;
use clasificar::ml::{decode, ClassifierPipeline};
use std::collections::BTreeMap;
use std::path::Path;

/// Clasificar - Multi-Label News Article Classification
#[derive(Parser)]
#[command(name = "clasificar")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a labeled corpus and save the fitted model
    Train {
        /// Directory of training articles (any nesting)
        #[arg(short, long)]
        input: String,

        /// Output path for the fitted pipeline
        #[arg(short, long, default_value = "models/pipeline.json")]
        model: String,

        /// Output path for the label index
        #[arg(short, long, default_value = "models/labels.json")]
        labels: String,

        /// Shuffle document order before training
        #[arg(long, default_value = "false")]
        randomize: bool,

        /// Shuffle seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Cross-validate a corpus and print the metrics report
    Evaluate {
        /// Directory of training articles
        #[arg(short, long)]
        input: String,

        /// Number of cross-validation folds
        #[arg(short = 'k', long, default_value = "10")]
        folds: usize,

        /// Decision cutoff applied to raw scores
        #[arg(short, long, default_value = "1.0")]
        cutoff: f32,

        /// Keep corpus order instead of shuffling before folding
        #[arg(long, default_value = "false")]
        no_shuffle: bool,

        /// Shuffle seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Classify a directory of articles with a saved model
    Classify {
        /// Directory of articles to classify
        #[arg(short, long)]
        input: String,

        /// Path to the fitted pipeline
        #[arg(short, long, default_value = "models/pipeline.json")]
        model: String,

        /// Path to the label index
        #[arg(short, long, default_value = "models/labels.json")]
        labels: String,

        /// Decision cutoff applied to raw scores
        #[arg(short, long, default_value = "0.0")]
        cutoff: f32,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Show corpus statistics without training
    Inspect {
        /// Directory of training articles
        #[arg(short, long)]
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train {
            input,
            model,
            labels,
            randomize,
            seed,
        } => run_train(&input, &model, &labels, randomize, seed),
        Commands::Evaluate {
            input,
            folds,
            cutoff,
            no_shuffle,
            seed,
            output,
        } => run_evaluate(&input, folds, cutoff, no_shuffle, seed, &output),
        Commands::Classify {
            input,
            model,
            labels,
            cutoff,
            output,
        } => run_classify(&input, &model, &labels, cutoff, &output),
        Commands::Inspect { input } => run_inspect(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Print corpus-loading diagnostics; always shown, even on clean loads.
fn print_load_report(report: &LoadReport) {
    println!(
        "Loaded {} documents ({} dropped with no categories, {} malformed)",
        report.retained,
        report.skipped_no_categories,
        report.malformed.len()
    );
    for id in &report.malformed {
        eprintln!("  malformed: {id}");
    }
}

fn run_train(
    input: &str,
    model: &str,
    labels: &str,
    randomize: bool,
    seed: u64,
) -> clasificar::Result<()> {
    let codec = DocumentCodec::new();
    let (corpus, report) = codec.load_corpus(Path::new(input))?;
    print_load_report(&report);

    let index = LabelIndex::build(&corpus);
    println!("Found {} categories", index.len());

    let dataset = DatasetBuilder::new()
        .randomize(randomize)
        .seed(seed)
        .build(&corpus, &index);

    println!("Training classifier on {} documents...", dataset.texts.len());
    let start = std::time::Instant::now();
    let mut pipeline = ClassifierPipeline::new();
    pipeline.fit(&dataset.texts, &dataset.indicator)?;
    println!("Train time: {:.3}s", start.elapsed().as_secs_f64());

    for path in [model, labels] {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    pipeline.save(Path::new(model))?;
    index.save(Path::new(labels))?;
    println!("Saved pipeline to {model}");
    println!("Saved label index to {labels}");

    Ok(())
}

fn run_evaluate(
    input: &str,
    folds: usize,
    cutoff: f32,
    no_shuffle: bool,
    seed: u64,
    output: &str,
) -> clasificar::Result<()> {
    let codec = DocumentCodec::new();
    let (corpus, report) = codec.load_corpus(Path::new(input))?;
    print_load_report(&report);

    let index = LabelIndex::build(&corpus);
    let dataset = DatasetBuilder::new()
        .randomize(!no_shuffle)
        .seed(seed)
        .build(&corpus, &index);

    println!(
        "Starting {folds}-fold cross-validation on {} documents (slice size {})",
        dataset.texts.len(),
        dataset.texts.len() / folds.max(1)
    );

    let evaluation = KFoldEvaluator::new()
        .folds(folds)
        .cutoff(cutoff)
        .show_progress(output == "text")
        .evaluate(&dataset.texts, &dataset.indicator, &index)?;

    if output == "json" {
        let json = serde_json::to_string_pretty(&evaluation)
            .map_err(|e| clasificar::Error::Serialization(e.to_string()))?;
        println!("{json}");
    } else {
        println!("{}", evaluation.to_ascii());
    }

    Ok(())
}

fn run_classify(
    input: &str,
    model: &str,
    labels: &str,
    cutoff: f32,
    output: &str,
) -> clasificar::Result<()> {
    let pipeline = ClassifierPipeline::load(Path::new(model))?;
    let index = LabelIndex::load(Path::new(labels))?;

    let codec = DocumentCodec::new();
    let (corpus, report) = codec.load_unlabeled(Path::new(input))?;
    print_load_report(&report);

    let (texts, ids) = to_prediction_set(&corpus);
    let scores = pipeline.predict(&texts)?;
    let decoded = decode(&scores, &index, cutoff);

    if output == "json" {
        let assignments: BTreeMap<&String, &Vec<String>> =
            ids.iter().zip(decoded.iter()).collect();
        let json = serde_json::to_string_pretty(&assignments)
            .map_err(|e| clasificar::Error::Serialization(e.to_string()))?;
        println!("{json}");
    } else {
        for (id, categories) in ids.iter().zip(decoded.iter()) {
            if categories.is_empty() {
                println!("{id}: (no categories)");
            } else {
                println!("{id}: {}", categories.join(", "));
            }
        }
    }

    Ok(())
}

fn run_inspect(input: &str) -> clasificar::Result<()> {
    let codec = DocumentCodec::new();
    let (corpus, report) = codec.load_corpus(Path::new(input))?;
    print_load_report(&report);

    let index = LabelIndex::build(&corpus);
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for document in corpus.iter() {
        for category in document.category_set() {
            *counts.entry(category).or_insert(0) += 1;
        }
    }

    println!("\n{} categories across {} documents:", index.len(), corpus.len());
    let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (category, count) in ordered {
        println!("{count:>6}  {category}");
    }

    Ok(())
}
