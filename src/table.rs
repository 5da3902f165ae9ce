//! The in-memory columnar table passed between all pipeline stages.
//!
//! A [`Table`] wraps a polars `DataFrame` whose columns have been
//! normalized to exactly two shapes: `Float64` (kind `Numeric`) or
//! `String` (kind `Categorical`). The kind is decided once, at load time,
//! and carried through every stage via the dtype itself rather than
//! re-inspected ad hoc. Missing values are uniformly null: NaN is
//! rewritten to null during normalization.
//!
//! Every transformation in the pipeline produces a new `Table`; nothing
//! mutates a caller's table in place.

use crate::error::{ExploreError, Result};
use crate::utils::{is_numeric_dtype, is_numeric_string, numeric_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Semantic type of a column, fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Float64 storage; means, quantiles, and correlations apply.
    Numeric,
    /// String storage; only mode-based operations apply.
    Categorical,
}

/// An ordered collection of named, uniformly-sized, kind-tagged columns.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
}

impl Table {
    /// Build a table from an arbitrary DataFrame, normalizing every column
    /// to Float64 or String.
    ///
    /// Native numeric dtypes are widened to Float64. A String column whose
    /// non-empty values all parse as f64 is promoted to Float64 (the
    /// loader reads spreadsheet cells as text, so promotion is what turns
    /// them back into numbers). Everything else, booleans included, is
    /// rendered as String.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            columns.push(normalize_series(series)?.into_column());
        }
        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Wrap a DataFrame that is already normalized (internal fast path for
    /// stages that only drop rows or fill values).
    pub(crate) fn from_normalized(df: DataFrame) -> Self {
        Self { df }
    }

    /// Borrow the underlying DataFrame (e.g. for preview rendering).
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Consume the table, yielding the underlying DataFrame.
    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Look up a column as a Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.df
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| ExploreError::ColumnNotFound(name.to_string()))
    }

    /// The kind of a column.
    pub fn kind_of(&self, name: &str) -> Result<ColumnKind> {
        let series = self.series(name)?;
        Ok(kind_of_dtype(series.dtype()))
    }

    /// Whether a column is numeric.
    pub fn is_numeric(&self, name: &str) -> Result<bool> {
        Ok(self.kind_of(name)? == ColumnKind::Numeric)
    }

    /// Names of the numeric columns, in table order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| kind_of_dtype(col.dtype()) == ColumnKind::Numeric)
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Null-aware values of a numeric column.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self.series(name)?;
        Ok(numeric_values(series)?)
    }

    /// A new table containing only the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> Result<Table> {
        let selection: Vec<PlSmallStr> = names.iter().map(|s| s.as_str().into()).collect();
        let df = self
            .df
            .select(selection)
            .map_err(|_| column_not_found(&self.df, names))?;
        Ok(Table::from_normalized(df))
    }
}

fn column_not_found(df: &DataFrame, requested: &[String]) -> ExploreError {
    let present: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let missing = requested
        .iter()
        .find(|name| !present.contains(name))
        .cloned()
        .unwrap_or_default();
    ExploreError::ColumnNotFound(missing)
}

fn kind_of_dtype(dtype: &DataType) -> ColumnKind {
    if dtype == &DataType::Float64 {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Normalize one column to Float64 or String per the table contract.
fn normalize_series(series: &Series) -> PolarsResult<Series> {
    let dtype = series.dtype().clone();

    if is_numeric_dtype(&dtype) {
        let cast = series.cast(&DataType::Float64)?;
        let ca = cast.f64()?;
        let values: Vec<Option<f64>> = ca
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        return Ok(Series::new(series.name().clone(), values));
    }

    if dtype == DataType::String {
        let ca = series.str()?;
        let mut non_empty = 0usize;
        let mut all_numeric = true;
        for value in ca.into_iter().flatten() {
            if value.trim().is_empty() {
                continue;
            }
            non_empty += 1;
            if !is_numeric_string(value) {
                all_numeric = false;
                break;
            }
        }

        if non_empty > 0 && all_numeric {
            let values: Vec<Option<f64>> = ca
                .into_iter()
                .map(|v| {
                    v.and_then(|s| s.trim().parse::<f64>().ok())
                        .filter(|x| !x.is_nan())
                })
                .collect();
            return Ok(Series::new(series.name().clone(), values));
        }
        return Ok(series.clone());
    }

    // Booleans, dates, and anything else become categorical text.
    series.cast(&DataType::String)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_columns_widen_to_float64() {
        let df = df![
            "ints" => [1i64, 2, 3],
            "floats" => [1.5f64, 2.5, 3.5],
        ]
        .unwrap();
        let table = Table::from_dataframe(df).unwrap();

        assert_eq!(table.kind_of("ints").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.kind_of("floats").unwrap(), ColumnKind::Numeric);
        assert_eq!(
            table.numeric_column("ints").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn test_numeric_strings_promote() {
        let df = df![
            "quoted" => ["1", "2.5", " 3 "],
        ]
        .unwrap();
        let table = Table::from_dataframe(df).unwrap();

        assert_eq!(table.kind_of("quoted").unwrap(), ColumnKind::Numeric);
        assert_eq!(
            table.numeric_column("quoted").unwrap(),
            vec![Some(1.0), Some(2.5), Some(3.0)]
        );
    }

    #[test]
    fn test_mixed_strings_stay_categorical() {
        let df = df![
            "mixed" => ["1", "two", "3"],
        ]
        .unwrap();
        let table = Table::from_dataframe(df).unwrap();
        assert_eq!(table.kind_of("mixed").unwrap(), ColumnKind::Categorical);
    }

    #[test]
    fn test_nan_becomes_null() {
        let df = df![
            "v" => [Some(1.0), Some(f64::NAN), None],
        ]
        .unwrap();
        let table = Table::from_dataframe(df).unwrap();
        assert_eq!(
            table.numeric_column("v").unwrap(),
            vec![Some(1.0), None, None]
        );
        assert_eq!(table.series("v").unwrap().null_count(), 2);
    }

    #[test]
    fn test_booleans_become_categorical() {
        let df = df![
            "flag" => [true, false, true],
        ]
        .unwrap();
        let table = Table::from_dataframe(df).unwrap();
        assert_eq!(table.kind_of("flag").unwrap(), ColumnKind::Categorical);
    }

    #[test]
    fn test_numeric_column_names_in_order() {
        let df = df![
            "a" => [1.0, 2.0],
            "label" => ["x", "y"],
            "b" => [3.0, 4.0],
        ]
        .unwrap();
        let table = Table::from_dataframe(df).unwrap();
        assert_eq!(table.numeric_column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_column_error() {
        let df = df!["a" => [1.0]].unwrap();
        let table = Table::from_dataframe(df).unwrap();
        let err = table.series("nope").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_select_preserves_order() {
        let df = df![
            "a" => [1.0, 2.0],
            "b" => [3.0, 4.0],
            "c" => ["x", "y"],
        ]
        .unwrap();
        let table = Table::from_dataframe(df).unwrap();
        let selected = table
            .select(&["b".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(selected.column_names(), vec!["b", "a"]);
    }
}
