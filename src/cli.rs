use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use house_price_model::{
    config::AppConfig,
    data::{train_test_split, DataError, Dataset, StandardScaler},
    ErrorKind, Evaluation, ModelError, PriceModel,
};
use log::info;
use ndarray::Array2;

/// Feature values the prediction form used to pre-fill: living area, bedrooms, full baths.
const DEFAULT_HOUSE: [f64; 3] = [1500.0, 3.0, 2.0];

/// Train, evaluate and query a linear regression house price model.
#[derive(Parser, Debug)]
#[command(version, name = "house-price")]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, short = 'c', env = "HOUSE_PRICE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit the model on the training split, report test metrics and save it
    Train(DataArgs),
    /// Score the saved model against a labelled dataset
    Evaluate(DataArgs),
    /// Predict the price of one house
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// CSV dataset, overrides `data_path` from the configuration
    #[arg(long, short = 'd')]
    pub data: Option<PathBuf>,

    /// Print the metrics as a JSON object
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// One value per configured feature, in order. Defaults to 1500 3 2.
    #[arg(allow_negative_numbers = true)]
    pub values: Vec<f64>,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Train(args) => train(&config, args),
        Command::Evaluate(args) => evaluate(&config, args),
        Command::Predict(args) => predict(&config, args),
    }
}

fn load_dataset(config: &AppConfig, data: Option<PathBuf>) -> Result<Dataset> {
    let path = data.unwrap_or_else(|| config.data_path.clone());
    let dataset = Dataset::from_csv(&path, &config.features, &config.target, config.fill_value)
        .with_context(|| format!("loading dataset '{}'", path.display()))?;
    Ok(dataset)
}

fn train(config: &AppConfig, args: DataArgs) -> Result<()> {
    let (x, y) = load_dataset(config, args.data)?.into_parts();
    let split = train_test_split(x.view(), y.view(), config.test_size, config.seed)?;
    info!(
        train = split.y_train.len(), test = split.y_test.len();
        "split dataset"
    );

    let (scaler, x_train) = StandardScaler::fit_transform(split.x_train.view())?;
    let x_test = scaler.transform(split.x_test.view())?;

    let mut model = PriceModel::new();
    model.train(x_train.view(), split.y_train.view())?;

    let eval = model.evaluate(x_test.view(), split.y_test.view())?;
    print_metrics(&eval, args.json)?;

    model.save(&config.model_path)?;
    scaler.save(&config.scaler_path)?;
    Ok(())
}

fn evaluate(config: &AppConfig, args: DataArgs) -> Result<()> {
    let model = PriceModel::load(&config.model_path)?;
    let scaler = StandardScaler::load(&config.scaler_path)?;

    let (x, y) = load_dataset(config, args.data)?.into_parts();
    let x = scaler.transform(x.view())?;

    let eval = model.evaluate(x.view(), y.view())?;
    print_metrics(&eval, args.json)
}

fn predict(config: &AppConfig, args: PredictArgs) -> Result<()> {
    let values = house_values(config, args.values)?;

    let model = PriceModel::load(&config.model_path)?;
    let scaler = StandardScaler::load(&config.scaler_path)?;

    let row = Array2::from_shape_vec((1, values.len()), values)?;
    let row = scaler.transform(row.view())?;
    let price = model.predict(row.view())?[0];
    let price = format_price(price)
        .with_context(|| format!("predicted price {price} is not a representable amount"))?;

    println!("Predicted House Price: {price}");
    Ok(())
}

/// Resolves the feature values of the house to price, checked against the
/// configured feature list.
fn house_values(config: &AppConfig, values: Vec<f64>) -> Result<Vec<f64>> {
    let values = if values.is_empty() {
        if !config.uses_default_features() {
            bail!(
                "expected {} values ({})",
                config.features.len(),
                config.features.join(", ")
            );
        }
        DEFAULT_HOUSE.to_vec()
    } else {
        values
    };

    if values.len() != config.features.len() {
        bail!(
            "expected {} values ({}), got {}",
            config.features.len(),
            config.features.join(", "),
            values.len()
        );
    }
    if !values.iter().all(|v| v.is_finite()) {
        return Err(ModelError::InvalidInput("feature values must be finite").into());
    }
    Ok(values)
}

fn print_metrics(eval: &Evaluation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(eval)?);
        return Ok(());
    }

    println!("Model Performance:");
    println!("MSE: {}", eval.mse());
    println!("RMSE: {}", eval.rmse());
    println!("R2: {}", eval.r2());
    Ok(())
}

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.56`.
///
/// # Returns
/// `None` if the amount is not finite or too large to count in cents.
pub fn format_price(amount: f64) -> Option<String> {
    let cents = (amount.abs() * 100.0).round();
    if !cents.is_finite() || cents >= u64::MAX as f64 {
        return None;
    }
    let cents = cents as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    Some(format!("{sign}${grouped}.{:02}", cents % 100))
}

/// One-line explanation of what went wrong, for the user.
pub fn describe(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ModelError>() {
            return match e.kind() {
                ErrorKind::InvalidState => "no trained model, run `house-price train` first",
                ErrorKind::InvalidInput => "the input is malformed",
                ErrorKind::NumericalError => "the training data does not determine a unique model",
                ErrorKind::Io => "cannot read or write the model files, run `house-price train` if they do not exist",
                ErrorKind::CorruptData => "the model files are corrupt, retrain to regenerate them",
            };
        }
        if cause.downcast_ref::<DataError>().is_some() {
            return "cannot prepare the dataset";
        }
    }
    "error"
}
