use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wagecast_trainer::{CategoricalEncoding, TrainingConfig, run_training};

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Fit the candidate classifiers and keep the most accurate one", long_about = None)]
struct Cli {
    /// Labeled training CSV
    #[arg(short, long, env = "WAGECAST_DATA", default_value = "adult.csv")]
    data: PathBuf,

    /// Output path for the selected model
    #[arg(long, env = "WAGECAST_MODEL", default_value = "best_model.json")]
    model_out: PathBuf,

    /// Output path for the feature schema
    #[arg(long, env = "WAGECAST_COLUMNS", default_value = "model_columns.json")]
    columns_out: PathBuf,

    /// Seed for the train/test split
    #[arg(long, env = "WAGECAST_SPLIT_SEED", default_value_t = 42)]
    split_seed: u64,

    /// Seed for model-internal randomness (clock-derived if omitted)
    #[arg(long, env = "WAGECAST_SEED")]
    seed: Option<u64>,

    /// Held-out share of rows
    #[arg(long, env = "WAGECAST_TEST_FRACTION", default_value_t = 0.2)]
    test_fraction: f64,

    /// Categorical encoding: one-hot or label
    #[arg(long, env = "WAGECAST_ENCODING", default_value = "one-hot")]
    encoding: CategoricalEncoding,

    /// Also write the training report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = TrainingConfig::new()
        .with_data_path(cli.data)
        .with_model_path(cli.model_out)
        .with_columns_path(cli.columns_out)
        .with_split_seed(cli.split_seed)
        .with_model_seed(cli.seed)
        .with_test_fraction(cli.test_fraction)
        .with_encoding(cli.encoding);

    let report = match run_training(config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Training failed: {e:#}");
            std::process::exit(1);
        }
    };

    for score in &report.scores {
        println!("{}: {:.4}", score.kind, score.accuracy);
    }
    println!(
        "Best model: {} (accuracy {:.4}, {} features)",
        report.best, report.best_accuracy, report.n_features
    );

    if let Some(path) = cli.report {
        let written = serde_json::to_string_pretty(&report)
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));
        if let Err(e) = written {
            eprintln!("Failed to write report {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}
