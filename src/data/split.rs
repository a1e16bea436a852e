use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::DataError;

/// Train and test partitions of one dataset.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Randomly partitions rows into a train and a test set.
///
/// `ceil(test_fraction · n)` rows go to the test set and the rest to the
/// train set. The permutation only depends on `seed`.
///
/// # Args
/// * `features` - Feature matrix, one row per sample.
/// * `targets` - Targets aligned with `features`.
/// * `test_fraction` - Share of rows held out, strictly between 0 and 1.
/// * `seed` - Seed of the row permutation.
///
/// # Errors
/// `DataError::InvalidSplit` for a fraction outside `(0, 1)`, misaligned
/// inputs, or a split that would leave either side empty.
pub fn train_test_split(
    features: ArrayView2<f64>,
    targets: ArrayView1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<Split, DataError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataError::InvalidSplit(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n = features.nrows();
    if targets.len() != n {
        return Err(DataError::InvalidSplit(format!(
            "{n} feature rows but {} targets",
            targets.len()
        )));
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(DataError::InvalidSplit(format!(
            "{n} rows cannot be split with test fraction {test_fraction}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut rng);
    let (test_idx, train_idx) = idx.split_at(n_test);

    debug!(train = n_train, test = n_test, seed = seed; "dataset split");

    Ok(Split {
        x_train: features.select(Axis(0), train_idx),
        x_test: features.select(Axis(0), test_idx),
        y_train: targets.select(Axis(0), train_idx),
        y_test: targets.select(Axis(0), test_idx),
    })
}
