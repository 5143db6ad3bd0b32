use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use wagecast_core::{
    AlignmentReport, Language, Predictor, PredictorConfig, RawRecord, RawTable, RawValue,
    UiStrings, UnknownCategoryPolicy,
};

#[derive(Parser)]
#[command(name = "wagecast-predict")]
#[command(about = "Predict income brackets from raw employee attributes", long_about = None)]
struct Cli {
    /// Trained model artifact
    #[arg(long, env = "WAGECAST_MODEL", default_value = "best_model.json", global = true)]
    model: PathBuf,

    /// Feature schema the model was trained on
    #[arg(long, env = "WAGECAST_COLUMNS", default_value = "model_columns.json", global = true)]
    columns: PathBuf,

    /// Display language: en, hi or te (anything else falls back to en)
    #[arg(long, env = "WAGECAST_LANG", default_value = "en", global = true)]
    lang: String,

    /// Fail on categorical values the model never saw instead of zero-filling
    #[arg(long, global = true)]
    reject_unknown: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict one manually entered record
    Single {
        /// Field as NAME=VALUE; repeat for each field
        #[arg(short, long = "field", value_name = "NAME=VALUE", value_parser = parse_field, required = true)]
        fields: Vec<(String, RawValue)>,

        /// Also write the record and its prediction as a one-row CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Predict every row of a CSV file
    Bulk {
        /// Input CSV with a header row
        input: PathBuf,

        /// Where to write the table with its Prediction column
        #[arg(short, long, default_value = "predicted_results.csv")]
        output: PathBuf,
    },
}

/// Parses `name=value`. Anything after the first space in the value is a
/// display suffix (`"Male ♂️"`) and is dropped.
fn parse_field(arg: &str) -> Result<(String, RawValue), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {arg:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty field name in {arg:?}"));
    }
    let value = value.trim();
    let value = value.split_once(' ').map_or(value, |(head, _)| head);
    Ok((name.to_string(), RawValue::parse(value)))
}

/// Heading printed before each subcommand's output.
fn banner(strings: &UiStrings, command: &Commands) -> String {
    match command {
        Commands::Single { .. } => format!("{}\n{}", strings.title, strings.predict),
        Commands::Bulk { input, .. } => {
            format!("{}\n{}: {}", strings.title, strings.upload_csv, input.display())
        }
    }
}

fn print_report(report: &AlignmentReport) {
    if !report.is_clean() {
        for unknown in &report.unknown_values {
            warn!(
                row = unknown.row,
                field = %unknown.field,
                value = %unknown.value,
                "value not seen in training"
            );
        }
    }
    println!("{report}");
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let language = Language::from_code(&cli.lang);
    let strings = language.strings();
    let policy = if cli.reject_unknown {
        UnknownCategoryPolicy::Reject
    } else {
        UnknownCategoryPolicy::ZeroFill
    };
    let config = PredictorConfig::new()
        .with_model_path(&cli.model)
        .with_schema_path(&cli.columns)
        .with_unknown_policy(policy);
    let predictor = Predictor::load(&config).context("loading model artifacts")?;

    println!("{}", banner(strings, &cli.command));
    match cli.command {
        Commands::Single { fields, output } => {
            let record: RawRecord = fields.into_iter().collect();
            for (name, value) in record.iter() {
                let label = strings.field_label(name).unwrap_or(name);
                println!("  {label}: {value}");
            }

            let prediction = predictor.predict_record(&record)?;
            println!("{}: {}", strings.predicted_income, prediction.label);
            print_report(&prediction.report);

            if let Some(path) = output {
                prediction
                    .to_table(&record)?
                    .write_csv(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("{}: {}", strings.download, path.display());
            }
        }
        Commands::Bulk { input, output } => {
            let table = RawTable::read_csv(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let (predicted, report) = predictor.predict_table(&table)?;
            print_report(&report);
            predicted
                .write_csv(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("{}: {} ({} rows)", strings.download, output.display(), predicted.len());
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_values_are_typed() {
        assert_eq!(
            parse_field("age=30").unwrap(),
            ("age".to_string(), RawValue::Number(30.0))
        );
        assert_eq!(
            parse_field("workclass=Private").unwrap(),
            ("workclass".to_string(), RawValue::Text("Private".into()))
        );
    }

    #[test]
    fn display_suffix_is_stripped() {
        assert_eq!(
            parse_field("gender=Male ♂️").unwrap().1,
            RawValue::Text("Male".into())
        );
    }

    #[test]
    fn empty_value_is_missing() {
        assert_eq!(parse_field("gender=").unwrap().1, RawValue::Missing);
    }

    #[test]
    fn malformed_fields_are_rejected() {
        assert!(parse_field("age").is_err());
        assert!(parse_field("=30").is_err());
    }

    #[test]
    fn banners_are_localized() {
        let bulk = Commands::Bulk {
            input: PathBuf::from("people.csv"),
            output: PathBuf::from("predicted_results.csv"),
        };
        assert_eq!(
            banner(Language::English.strings(), &bulk),
            "Employee Salary Classification\nUpload CSV for Bulk Predictions: people.csv"
        );

        let single = Commands::Single {
            fields: vec![("age".into(), RawValue::Number(30.0))],
            output: None,
        };
        let hindi = Language::Hindi.strings();
        assert_eq!(
            banner(hindi, &single),
            format!("{}\n{}", hindi.title, hindi.predict)
        );
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "wagecast-predict",
            "--lang",
            "hi",
            "single",
            "-f",
            "age=30",
            "--field",
            "gender=Female",
        ])
        .unwrap();
        assert_eq!(Language::from_code(&cli.lang), Language::Hindi);
        match cli.command {
            Commands::Single { fields, output } => {
                assert_eq!(fields.len(), 2);
                assert!(output.is_none());
            }
            Commands::Bulk { .. } => panic!("expected single"),
        }

        let cli = Cli::try_parse_from(["wagecast-predict", "bulk", "in.csv", "--reject-unknown"]).unwrap();
        assert!(cli.reject_unknown);
        match cli.command {
            Commands::Bulk { input, output } => {
                assert_eq!(input, PathBuf::from("in.csv"));
                assert_eq!(output, PathBuf::from("predicted_results.csv"));
            }
            Commands::Single { .. } => panic!("expected bulk"),
        }
    }
}
