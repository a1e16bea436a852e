use std::path::Path;

use log::info;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::{
    error::{ModelError, Result},
    persistence::{self, ScalerRecord, FORMAT_VERSION},
};

/// Per-column standardisation, `(x − mean) / scale`.
///
/// `scale` is the population standard deviation of the column, or 1 for a
/// column without spread.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    /// Learns column means and deviations from `features`.
    ///
    /// # Errors
    /// `ModelError::InvalidInput` for a matrix without rows or columns.
    pub fn fit(features: ArrayView2<f64>) -> Result<Self> {
        if features.ncols() == 0 {
            return Err(ModelError::InvalidInput("feature matrix has no columns"));
        }
        let means = features
            .mean_axis(Axis(0))
            .ok_or(ModelError::InvalidInput("feature matrix has no rows"))?;

        let scales = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 && s.is_finite() { s } else { 1.0 });

        Ok(Self { means, scales })
    }

    /// Fits on `features` and returns them scaled.
    pub fn fit_transform(features: ArrayView2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(features)?;
        let scaled = scaler.transform(features)?;
        Ok((scaler, scaled))
    }

    /// Scales `features` with the learnt statistics.
    ///
    /// # Errors
    /// `ModelError::ShapeMismatch` if the column count differs from the fitted one.
    pub fn transform(&self, features: ArrayView2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.width() {
            return Err(ModelError::ShapeMismatch {
                what: "scaler width",
                got: features.ncols(),
                expected: self.width(),
            });
        }

        Ok((&features - &self.means) / &self.scales)
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn scales(&self) -> &Array1<f64> {
        &self.scales
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let record = ScalerRecord {
            format_version: FORMAT_VERSION,
            means: self.means.to_vec(),
            scales: self.scales.to_vec(),
        };

        persistence::write(path, &record)?;
        info!("scaler saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let record: ScalerRecord = persistence::read(path)?;

        Ok(Self {
            means: Array1::from(record.means),
            scales: Array1::from(record.scales),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::array;

    const TOL: f64 = 1e-12;

    #[test]
    fn standardises_columns() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(x.view()).unwrap();

        assert_eq!(scaler.means(), &array![2.5, 25.0]);
        for col in scaled.columns() {
            let mean = col.mean().unwrap();
            let std = col.std(0.0);
            assert!(mean.abs() < TOL);
            assert!((std - 1.0).abs() < TOL);
        }
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(x.view()).unwrap();

        assert_eq!(scaler.scales()[1], 1.0);
        assert!(scaled.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn transform_uses_fitted_statistics() {
        let train = array![[0.0], [2.0]];
        let scaler = StandardScaler::fit(train.view()).unwrap();

        // mean 1, population std 1
        let out = scaler.transform(array![[3.0], [1.0]].view()).unwrap();
        assert_eq!(out, array![[2.0], [0.0]]);
    }

    #[test]
    fn width_mismatch() {
        let scaler = StandardScaler::fit(array![[1.0, 2.0], [3.0, 4.0]].view()).unwrap();
        let err = scaler.transform(array![[1.0]].view()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_input() {
        let err = StandardScaler::fit(Array2::<f64>::zeros((0, 3)).view()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
