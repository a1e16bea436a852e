//! Dataset preparation ahead of the model: CSV loading, scaling and splitting.

mod dataset;
mod scaler;
mod split;

pub use dataset::Dataset;
pub use scaler::StandardScaler;
pub use split::{train_test_split, Split};

use std::{error::Error, fmt, io};

use ndarray::ShapeError;

/// Errors produced while preparing a dataset.
#[derive(Debug)]
pub enum DataError {
    Io(io::Error),

    /// The CSV could not be read or tokenized.
    Csv(csv::Error),

    /// A requested column is not in the header.
    MissingColumn(String),

    /// A cell holds something that is neither a number nor a missing marker.
    InvalidValue {
        /// 1-based data row, header excluded.
        row: usize,
        column: String,
        value: String,
    },

    /// No usable rows were found.
    Empty,

    /// Rows could not be assembled into a matrix.
    Shape(ShapeError),

    /// The requested train/test split cannot be made.
    InvalidSplit(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io(e) => write!(f, "io error: {e}"),
            DataError::Csv(e) => write!(f, "csv error: {e}"),
            DataError::MissingColumn(name) => write!(f, "column '{name}' not found"),
            DataError::InvalidValue { row, column, value } => {
                write!(f, "row {row}: cannot parse '{value}' in column '{column}' as a number")
            }
            DataError::Empty => write!(f, "dataset is empty"),
            DataError::Shape(e) => write!(f, "shape error: {e}"),
            DataError::InvalidSplit(msg) => write!(f, "invalid split: {msg}"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataError::Io(e) => Some(e),
            DataError::Csv(e) => Some(e),
            DataError::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DataError {
    fn from(value: io::Error) -> Self {
        DataError::Io(value)
    }
}

impl From<csv::Error> for DataError {
    fn from(value: csv::Error) -> Self {
        DataError::Csv(value)
    }
}

impl From<ShapeError> for DataError {
    fn from(value: ShapeError) -> Self {
        DataError::Shape(value)
    }
}
