use ndarray::ArrayView1;
use serde::Serialize;

/// Regression quality of one prediction run against known targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    mse: f64,
    rmse: f64,
    r2: f64,
}

impl Evaluation {
    /// Computes every metric from aligned predictions and targets.
    ///
    /// Callers guarantee equal, non-zero lengths.
    pub(crate) fn compute(y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Self {
        let mse = mean_squared_error(y_pred, y);
        Self {
            mse,
            rmse: mse.sqrt(),
            r2: r2_score(y_pred, y),
        }
    }

    pub fn mse(&self) -> f64 {
        self.mse
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn r2(&self) -> f64 {
        self.r2
    }
}

/// Mean of the squared residuals. Zero for empty input.
pub fn mean_squared_error(y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    (&y_pred - &y)
        .mapv(|x| x.powi(2))
        .mean()
        .unwrap_or_default()
}

/// Coefficient of determination, `1 − SS_res / SS_tot`.
///
/// When the targets have no variance the ratio is undefined: the score is
/// `1.0` if every prediction is exact and `0.0` otherwise.
pub fn r2_score(y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let Some(mean) = y.mean() else {
        return 0.0;
    };

    let ss_res: f64 = (&y - &y_pred).mapv(|r| r * r).sum();
    let ss_tot: f64 = y.mapv(|v| (v - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}
