use std::{fs::File, io::Read, path::Path};

use log::{debug, info, warn};
use ndarray::{Array1, Array2};

use super::DataError;

/// A labelled table of houses ready for the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Array2<f64>,
    targets: Array1<f64>,
}

impl Dataset {
    /// Reads a headered CSV file and keeps `feature_columns` (in that order)
    /// plus `target_column`.
    ///
    /// Empty and `NA` feature cells are replaced with `fill_value`; rows with a
    /// missing target are skipped.
    ///
    /// # Errors
    /// * `DataError::Io` / `DataError::Csv` when the file cannot be read.
    /// * `DataError::MissingColumn` when a requested column is absent.
    /// * `DataError::InvalidValue` for a cell that is not a number.
    /// * `DataError::Empty` when no row survives.
    pub fn from_csv<S: AsRef<str>>(
        path: impl AsRef<Path>,
        feature_columns: &[S],
        target_column: &str,
        fill_value: f64,
    ) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(file, feature_columns, target_column, fill_value)?;

        info!(
            rows = dataset.len(), features = dataset.feature_names.len();
            "dataset loaded from {}",
            path.display()
        );
        Ok(dataset)
    }

    /// Same as [`Dataset::from_csv`] over any reader.
    pub fn from_reader<R: Read, S: AsRef<str>>(
        reader: R,
        feature_columns: &[S],
        target_column: &str,
        fill_value: f64,
    ) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };

        let feature_idx = feature_columns
            .iter()
            .map(|name| position(<S as AsRef<str>>::as_ref(name)))
            .collect::<Result<Vec<_>, _>>()?;
        let target_idx = position(target_column)?;

        let width = feature_idx.len();
        let mut values = Vec::new();
        let mut targets = Vec::new();
        let mut filled = 0;

        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = i + 1;

            let cell = |idx: usize| record.get(idx).unwrap_or("");

            let Some(target) = parse_cell(cell(target_idx), row, target_column)? else {
                warn!("row {row}: missing '{target_column}', skipping");
                continue;
            };

            for (&idx, name) in feature_idx.iter().zip(feature_columns) {
                match parse_cell(cell(idx), row, <S as AsRef<str>>::as_ref(name))? {
                    Some(v) => values.push(v),
                    None => {
                        values.push(fill_value);
                        filled += 1;
                    }
                }
            }
            targets.push(target);
        }

        if targets.is_empty() {
            return Err(DataError::Empty);
        }
        if filled > 0 {
            debug!("filled {filled} missing feature cells with {fill_value}");
        }

        let features = Array2::from_shape_vec((targets.len(), width), values)?;

        Ok(Self {
            feature_names: feature_columns
                .iter()
                .map(|s| <S as AsRef<str>>::as_ref(s).to_string())
                .collect(),
            features,
            targets: Array1::from(targets),
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.targets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.features, self.targets)
    }
}

/// `None` for a missing cell, the number otherwise.
fn parse_cell(raw: &str, row: usize, column: &str) -> Result<Option<f64>, DataError> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(DataError::InvalidValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const FEATURES: [&str; 3] = ["GrLivArea", "BedroomAbvGr", "FullBath"];

    fn load(csv: &str) -> Result<Dataset, DataError> {
        Dataset::from_reader(csv.as_bytes(), &FEATURES, "SalePrice", 0.0)
    }

    #[test]
    fn selects_columns_in_requested_order() {
        let csv = "\
Id,FullBath,SalePrice,GrLivArea,BedroomAbvGr
1,2,208500,1710,3
2,1,181500,1262,3
";
        let ds = load(csv).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.feature_names(), FEATURES);
        assert_eq!(ds.features(), &array![[1710.0, 3.0, 2.0], [1262.0, 3.0, 1.0]]);
        assert_eq!(ds.targets(), &array![208500.0, 181500.0]);
    }

    #[test]
    fn fills_missing_features() {
        let csv = "\
GrLivArea,BedroomAbvGr,FullBath,SalePrice
1500,NA,2,200000
,3, 1 ,150000
";
        let ds = Dataset::from_reader(csv.as_bytes(), &FEATURES, "SalePrice", -1.0).unwrap();
        assert_eq!(ds.features(), &array![[1500.0, -1.0, 2.0], [-1.0, 3.0, 1.0]]);
    }

    #[test]
    fn skips_rows_without_target() {
        let csv = "\
GrLivArea,BedroomAbvGr,FullBath,SalePrice
1500,3,2,
1600,3,2,NA
1700,4,2,250000
";
        let ds = load(csv).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.targets(), &array![250000.0]);
    }

    #[test]
    fn missing_column() {
        let csv = "GrLivArea,FullBath,SalePrice\n1500,2,100\n";
        match load(csv) {
            Err(DataError::MissingColumn(name)) => assert_eq!(name, "BedroomAbvGr"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn garbage_cell_is_reported_with_position() {
        let csv = "\
GrLivArea,BedroomAbvGr,FullBath,SalePrice
1500,3,2,100
1500,three,2,100
";
        match load(csv) {
            Err(DataError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "BedroomAbvGr");
                assert_eq!(value, "three");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn header_only_is_empty() {
        let csv = "GrLivArea,BedroomAbvGr,FullBath,SalePrice\n";
        assert!(matches!(load(csv), Err(DataError::Empty)));
    }
}
