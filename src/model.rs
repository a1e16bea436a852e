use std::path::Path;

use log::{debug, info};
use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::{
    error::{ModelError, Result},
    metrics::Evaluation,
    ols,
    persistence::{self, ModelRecord, FORMAT_VERSION},
};

/// Coefficients and intercept of a fitted linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedParams {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl FittedParams {
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of features the parameters were fitted on.
    pub fn width(&self) -> usize {
        self.coefficients.len()
    }

    fn to_record(&self) -> ModelRecord {
        ModelRecord {
            format_version: FORMAT_VERSION,
            coefficients: self.coefficients.to_vec(),
            intercept: self.intercept,
        }
    }

    fn from_record(record: ModelRecord) -> Self {
        Self {
            coefficients: Array1::from(record.coefficients),
            intercept: record.intercept,
        }
    }
}

/// Lifecycle state of a [`PriceModel`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModelState {
    #[default]
    Untrained,
    Trained(FittedParams),
}

/// Linear regression house price model.
///
/// Starts untrained; `train` or `load` puts it in the trained state, and
/// retraining replaces the parameters. Instances share nothing.
#[derive(Debug, Clone, Default)]
pub struct PriceModel {
    state: ModelState,
}

impl PriceModel {
    /// Returns an untrained model.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    /// Returns the fitted parameters, if any.
    pub fn params(&self) -> Option<&FittedParams> {
        match &self.state {
            ModelState::Untrained => None,
            ModelState::Trained(params) => Some(params),
        }
    }

    /// Fits ordinary least squares on the given rows.
    ///
    /// # Args
    /// * `features` - Training feature matrix, one row per house.
    /// * `targets` - Observed prices aligned with `features`.
    ///
    /// # Errors
    /// * `ModelError::InvalidInput` / `ModelError::ShapeMismatch` if the data is empty,
    ///   not finite or misaligned.
    /// * `ModelError::Singular` if the features admit no unique solution.
    ///
    /// The previous parameters are kept when fitting fails.
    pub fn train(&mut self, features: ArrayView2<f64>, targets: ArrayView1<f64>) -> Result<()> {
        check_finite(features.iter(), "features must be finite")?;
        check_finite(targets.iter(), "targets must be finite")?;

        let fit = ols::fit(features, targets)?;
        info!(
            rows = features.nrows(), features = features.ncols();
            "model trained, intercept={}",
            fit.intercept
        );

        self.state = ModelState::Trained(FittedParams {
            coefficients: fit.coefficients,
            intercept: fit.intercept,
        });
        Ok(())
    }

    /// Predicts one price per row of `features`.
    ///
    /// # Args
    /// * `features` - Feature matrix with the fitted width, any number of rows.
    ///
    /// # Returns
    /// One predicted price per row, in row order.
    ///
    /// # Errors
    /// * `ModelError::NotTrained` before `train` or `load`.
    /// * `ModelError::ShapeMismatch` if the column count differs from the fitted one.
    pub fn predict(&self, features: ArrayView2<f64>) -> Result<Array1<f64>> {
        let params = self.params().ok_or(ModelError::NotTrained)?;

        if features.ncols() != params.width() {
            return Err(ModelError::ShapeMismatch {
                what: "feature width",
                got: features.ncols(),
                expected: params.width(),
            });
        }

        Ok(features.dot(&params.coefficients) + params.intercept)
    }

    /// Predicts `features` and scores the result against `targets`.
    ///
    /// # Returns
    /// The MSE, RMSE and R² of the predictions.
    ///
    /// # Errors
    /// Same as [`PriceModel::predict`], plus `ModelError::InvalidInput` for
    /// empty input and `ModelError::ShapeMismatch` for misaligned targets.
    pub fn evaluate(
        &self,
        features: ArrayView2<f64>,
        targets: ArrayView1<f64>,
    ) -> Result<Evaluation> {
        if !self.is_trained() {
            return Err(ModelError::NotTrained);
        }
        if features.nrows() == 0 {
            return Err(ModelError::InvalidInput("feature matrix has no rows"));
        }
        if targets.len() != features.nrows() {
            return Err(ModelError::ShapeMismatch {
                what: "targets",
                got: targets.len(),
                expected: features.nrows(),
            });
        }

        let y_pred = self.predict(features)?;
        let eval = Evaluation::compute(y_pred.view(), targets);
        debug!("evaluated {} rows: {eval:?}", targets.len());
        Ok(eval)
    }

    /// Persists the fitted parameters to `path`, overwriting it.
    ///
    /// # Errors
    /// * `ModelError::NotTrained` if there is nothing to save.
    /// * `ModelError::Io` if the destination cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = self.params().ok_or(ModelError::NotTrained)?;
        let path = path.as_ref();

        persistence::write(path, &params.to_record())?;
        info!("model saved to {}", path.display());
        Ok(())
    }

    /// Restores a trained model previously written by [`PriceModel::save`].
    ///
    /// # Returns
    /// A trained model with the persisted parameters.
    ///
    /// # Errors
    /// * `ModelError::Io` if `path` cannot be read.
    /// * `ModelError::Corrupt` if its content is not a valid model record.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let record: ModelRecord = persistence::read(path)?;
        info!("model loaded from {}", path.display());

        Ok(Self {
            state: ModelState::Trained(FittedParams::from_record(record)),
        })
    }
}

fn check_finite<'a>(mut values: impl Iterator<Item = &'a f64>, msg: &'static str) -> Result<()> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::InvalidInput(msg))
    }
}
