//! # rustful-lstm
//!
//! Command-line interface for training and querying LSTM trend and
//! seasonality models.

mod input;

use clap::{Parser, Subcommand, ValueEnum};
use forecast_facade::prelude::*;
use forecast_facade::recurrent::GateVariant;
use input::{format_timestamp, load_csv, parse_timestamp};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = std::result::Result<T, String>;

#[derive(Parser)]
#[command(name = "rustful-lstm")]
#[command(about = "LSTM trend and seasonality forecasting CLI", long_about = None)]
struct Cli {
    /// Directory holding the `lstm/` state folder
    #[arg(long, global = true, default_value = ".")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a CSV of timestamp,value rows
    Train {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Model name
        #[arg(short, long, default_value = "default")]
        model: String,

        /// JSON file with `hyper` and `training` sections
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run a single round instead of the remaining budget
        #[arg(long)]
        once: bool,

        /// Ignore any stored state and start fresh
        #[arg(long)]
        reset: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Predict from a trained model
    Predict {
        /// Input CSV file with recent observations
        #[arg(short, long)]
        input: PathBuf,

        /// Model name
        #[arg(short, long, default_value = "default")]
        model: String,

        /// Which component to predict
        #[arg(short, long, value_enum, default_value = "trend")]
        kind: Kind,

        /// Forecast past this time (trend only); defaults to the last row
        #[arg(short, long)]
        until: Option<String>,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a stored model
    Inspect {
        /// Model name
        #[arg(short, long, default_value = "default")]
        model: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Trend,
    Seasonality,
}

/// Hyperparameter flags applied on top of stored or configured values
#[derive(clap::Args, Debug, Default)]
struct Overrides {
    /// Round budget
    #[arg(long)]
    epochs: Option<usize>,

    /// Batches per round
    #[arg(long)]
    batches: Option<usize>,

    /// Grid interval in minutes
    #[arg(long)]
    interval: Option<u32>,

    /// Epochs per network training call
    #[arg(long)]
    iterations: Option<usize>,

    /// Unit variant
    #[arg(long, value_enum)]
    gate: Option<Gate>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Keep only the trailing days of history
    #[arg(long)]
    history_days: Option<u32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Gate {
    Plain,
    ForgetGated,
}

impl Overrides {
    fn apply(&self, hyper: &mut HyperParameters) {
        if let Some(epochs) = self.epochs {
            hyper.epochs = epochs;
        }
        if let Some(batches) = self.batches {
            hyper.batch_size = batches;
        }
        if let Some(interval) = self.interval {
            hyper.interval_minutes = interval;
        }
        if let Some(iterations) = self.iterations {
            hyper.gd_iterations = iterations;
        }
        if let Some(gate) = self.gate {
            hyper.gate = match gate {
                Gate::Plain => GateVariant::Plain,
                Gate::ForgetGated => GateVariant::ForgetGated,
            };
        }
        if self.seed.is_some() {
            hyper.seed = self.seed;
        }
    }
}

/// Optional JSON configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    hyper: HyperParameters,
    training: TrainingConfig,
}

fn load_config(path: Option<&Path>) -> CliResult<ConfigFile> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Write JSON to a file or stdout
fn write_json(value: &serde_json::Value, output: Option<&Path>) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to encode JSON: {}", e))?;
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!("Forecast written to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Run train command
fn run_train(
    state_dir: &Path,
    input: &Path,
    model: String,
    config: Option<&Path>,
    once: bool,
    reset: bool,
    overrides: &Overrides,
) -> CliResult<()> {
    let ConfigFile { hyper, training } = load_config(config)?;
    let training = TrainingConfig {
        model_name: model,
        history_days: overrides.history_days.or(training.history_days),
        ..training
    };
    let observations = load_csv(input)?;

    let driver = TrainingDriver::new(FileStateStore::new(state_dir), training)
        .map_err(|e| e.to_string())?;
    let mut state = if reset {
        ModelState::new(driver.config().model_name.clone(), hyper)
    } else {
        driver.load_state(hyper)
    };
    overrides.apply(&mut state.hyper);

    info!(
        model = %state.name,
        rows = observations.len(),
        round = state.progress.epoch_index,
        epochs = state.hyper.epochs,
        "training"
    );
    let report = if once {
        driver.train_once(&mut state, &observations.values, &observations.timestamps)
    } else {
        driver.train(&mut state, &observations.values, &observations.timestamps)
    }
    .map_err(|e| e.to_string())?;

    let summary = serde_json::to_value(&report).map_err(|e| e.to_string())?;
    write_json(&summary, None)
}

/// Run predict command
fn run_predict(
    state_dir: &Path,
    input: &Path,
    model: &str,
    kind: Kind,
    until: Option<&str>,
    output: Option<&Path>,
) -> CliResult<()> {
    let state = FileStateStore::new(state_dir)
        .load(model)
        .map_err(|e| e.to_string())?;
    let observations = load_csv(input)?;

    let forecast = match kind {
        Kind::Trend => {
            let until = match until {
                Some(raw) => {
                    parse_timestamp(raw).ok_or_else(|| format!("Unrecognized time '{}'", raw))?
                }
                None => observations
                    .last_timestamp()
                    .ok_or_else(|| "No observations".to_string())?,
            };
            predict_trend(&observations.values, &observations.timestamps, until, &state)
        }
        Kind::Seasonality => {
            predict_seasonality(&observations.values, &observations.timestamps, &state)
        }
    }
    .map_err(|e| e.to_string())?;

    let points: Vec<serde_json::Value> = forecast
        .points()
        .map(|(ts, v)| {
            serde_json::json!({
                "timestamp": ts,
                "time": format_timestamp(ts),
                "value": v,
            })
        })
        .collect();
    let json = serde_json::json!({
        "model": model,
        "kind": format!("{:?}", kind).to_lowercase(),
        "forecast": points,
    });
    write_json(&json, output)
}

/// Run inspect command
fn run_inspect(state_dir: &Path, model: &str) -> CliResult<()> {
    let state = FileStateStore::new(state_dir)
        .load(model)
        .map_err(|e| e.to_string())?;
    let summary = |registry: &forecast_facade::ModelRegistry| {
        serde_json::json!({
            "candidates": registry.len(),
            "segments": registry.best().map(|e| e.len()),
            "best_error": registry.best_error(),
        })
    };
    let json = serde_json::json!({
        "name": state.name,
        "gate": state.hyper.gate.to_string(),
        "interval_minutes": state.hyper.interval_minutes,
        "epochs": state.hyper.epochs,
        "progress": state.progress,
        "last_trained": state.last_trained.map(format_timestamp),
        "trend": summary(&state.trend),
        "seasonality": summary(&state.seasonality),
    });
    write_json(&json, None)
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rustful_lstm=info,forecast_api=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train {
            input,
            model,
            config,
            once,
            reset,
            overrides,
        } => run_train(
            &cli.state_dir,
            &input,
            model,
            config.as_deref(),
            once,
            reset,
            &overrides,
        ),

        Commands::Predict {
            input,
            model,
            kind,
            until,
            output,
        } => run_predict(
            &cli.state_dir,
            &input,
            &model,
            kind,
            until.as_deref(),
            output.as_deref(),
        ),

        Commands::Inspect { model } => run_inspect(&cli.state_dir, &model),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
