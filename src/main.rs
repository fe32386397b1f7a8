use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use env_logger::Env;

use oracle::{
    dataset, forecast, load_model,
    report::{self, Summary},
    save_model, train, validate, TrainConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "oracle")]
#[command(about = "Neural network forecasting of a univariate time series", long_about = None)]
struct Cli {
    /// Path to the time series data file
    #[arg(long, default_value = "data/sample.csv")]
    data: PathBuf,

    /// Optional CSV output path for the forecast
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, ignore_case = true, default_value = "text")]
    format: Format,

    /// Save the trained model as JSON
    #[arg(long)]
    save_model: Option<PathBuf>,

    /// Load a model from JSON and skip training
    #[arg(long)]
    load_model: Option<PathBuf>,

    /// Number of future points to predict
    #[arg(long, default_value_t = 5)]
    steps: usize,

    /// Number of past points used for one prediction
    #[arg(long)]
    lag: Option<usize>,

    /// Hidden layer size
    #[arg(long)]
    hidden: Option<usize>,

    /// Training epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Number of tail points for one-step holdout validation (0 disables)
    #[arg(long, default_value_t = 0)]
    holdout: usize,

    /// Learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with training settings, overridden by explicit flags
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn train_config(&self) -> anyhow::Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::from_json_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => TrainConfig::default(),
        };

        if let Some(lag) = self.lag {
            config.lag = lag;
        }
        if let Some(hidden) = self.hidden {
            config.hidden = hidden;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(lr) = self.lr {
            config.learning_rate = lr;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.train_config()?;

    let series = dataset::load_series(&cli.data)
        .with_context(|| format!("failed to load data from {}", cli.data.display()))?;

    let (result, validation) = match &cli.load_model {
        Some(path) => {
            let result = load_model(path)
                .with_context(|| format!("loading model {} failed", path.display()))?;

            let validation = match cli.holdout {
                0 => None,
                h => Some(validate(&result, &series, h).context("validation failed")?),
            };
            (result, validation)
        }
        None if cli.holdout > 0 => {
            if cli.holdout >= series.len() {
                bail!(
                    "invalid --holdout {}: must be smaller than data length {}",
                    cli.holdout,
                    series.len()
                );
            }

            let prefix = &series[..series.len() - cli.holdout];
            let result = train(prefix, config).context("training failed")?;
            let validation = validate(&result, &series, cli.holdout)
                .context("validation failed")?;

            // Forecasts come from a model that saw every observed point.
            let result = train(&series, config).context("full-data retraining failed")?;
            (result, Some(validation))
        }
        None => (train(&series, config).context("training failed")?, None),
    };

    if let Some(path) = &cli.save_model {
        save_model(path, &result)
            .with_context(|| format!("saving model to {} failed", path.display()))?;
    }

    let predictions = forecast(&result, &series, cli.steps).context("forecast failed")?;
    let points = report::forecast_points(&predictions, result.residual_std_dev());

    if let Some(path) = &cli.out {
        report::write_forecast_csv(path, &points)
            .with_context(|| format!("failed writing forecast CSV to {}", path.display()))?;
    }

    let summary = Summary {
        data_points: series.len(),
        lag: result.lag(),
        training_mse: result.mse(),
        residual_std_dev: result.residual_std_dev(),
        last_observed: series.last().copied().unwrap_or_default(),
        model_loaded_from: cli.load_model.clone(),
        model_saved_to: cli.save_model.clone(),
        validation,
        forecast: points,
        forecast_csv_path: cli.out.clone(),
    };

    match cli.format {
        Format::Json => println!("{}", summary.to_json()?),
        Format::Text => print!("{summary}"),
    }

    Ok(())
}
