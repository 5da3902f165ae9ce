//! Declarative chart specifications.
//!
//! Each builder is a pure function from a [`Table`] and a column selection
//! to a [`ChartSpec`]; no rendering happens here. The specs are
//! renderer-agnostic and serialize to JSON for whatever front end draws
//! them.

use crate::error::Result;
use crate::table::Table;
use crate::utils::pearson;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed bin count for histograms.
pub const HISTOGRAM_BINS: u32 = 30;

/// Diverging palette used for correlation heatmaps.
const HEATMAP_PALETTE: &str = "RdBu";

/// Color scale bounds for a heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub palette: String,
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    fn diverging_correlation() -> Self {
        Self {
            palette: HEATMAP_PALETTE.to_string(),
            min: -1.0,
            max: 1.0,
        }
    }
}

/// A renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    /// Binned frequency plot; works for numeric and categorical columns.
    Histogram { column: String, bins: u32 },
    /// Single-column distribution summary.
    Boxplot { column: String },
    /// Two-column scatter, optionally with an OLS trend-line overlay.
    Scatter {
        x: String,
        y: String,
        trendline: bool,
    },
    /// Pairwise correlation matrix over numeric columns.
    Heatmap {
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
        color_scale: ColorScale,
        show_values: bool,
    },
}

/// Histogram of one column with 30 fixed bins.
pub fn histogram(table: &Table, column: &str) -> Result<ChartSpec> {
    table.series(column)?;
    Ok(ChartSpec::Histogram {
        column: column.to_string(),
        bins: HISTOGRAM_BINS,
    })
}

/// Boxplot of one column.
///
/// No numeric-ness check here; the renderer produces a degenerate plot
/// for text data, and restricting the selection is the caller's job.
pub fn boxplot(table: &Table, column: &str) -> Result<ChartSpec> {
    table.series(column)?;
    Ok(ChartSpec::Boxplot {
        column: column.to_string(),
    })
}

/// Scatter of `y` against `x`.
///
/// A trend line is included exactly when the two selections are distinct
/// columns and both are numeric. A same-column selection never gets one
/// (the overlay's data binding cannot express it), and a categorical axis
/// never gets one.
pub fn scatter(table: &Table, x: &str, y: &str) -> Result<ChartSpec> {
    let trendline = x != y && table.is_numeric(x)? && table.is_numeric(y)?;
    Ok(ChartSpec::Scatter {
        x: x.to_string(),
        y: y.to_string(),
        trendline,
    })
}

/// Pearson correlation heatmap over the table's numeric columns.
///
/// With fewer than two numeric columns there is nothing to correlate, so
/// a 1x1 zero placeholder spec is returned instead of an error. Each
/// matrix cell uses pairwise-complete observations (rows where both
/// columns have a value); a cell with fewer than two such pairs, or where
/// either side has zero variance, is NaN.
pub fn heatmap(table: &Table) -> Result<ChartSpec> {
    let columns = table.numeric_column_names();
    if columns.len() < 2 {
        debug!(
            "Heatmap requested with {} numeric column(s); emitting placeholder",
            columns.len()
        );
        return Ok(ChartSpec::Heatmap {
            columns: Vec::new(),
            values: vec![vec![0.0]],
            color_scale: ColorScale::diverging_correlation(),
            show_values: false,
        });
    }

    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| table.numeric_column(name))
        .collect::<Result<_>>()?;

    let mut values = vec![vec![0.0; columns.len()]; columns.len()];
    for i in 0..columns.len() {
        for j in i..columns.len() {
            let r = pairwise_correlation(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(ChartSpec::Heatmap {
        columns,
        values,
        color_scale: ColorScale::diverging_correlation(),
        show_values: true,
    })
}

/// Correlation over the rows where both columns have a value.
fn pairwise_correlation(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| x.zip(*y))
        .unzip();
    pearson(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn table(df: DataFrame) -> Table {
        Table::from_dataframe(df).unwrap()
    }

    fn sample() -> Table {
        table(
            df![
                "a" => [1.0, 2.0, 3.0, 4.0],
                "b" => [2.0, 4.0, 6.0, 8.0],
                "label" => ["x", "y", "x", "y"],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_histogram_fixed_bins() {
        let spec = histogram(&sample(), "a").unwrap();
        assert_eq!(
            spec,
            ChartSpec::Histogram {
                column: "a".to_string(),
                bins: 30,
            }
        );
    }

    #[test]
    fn test_histogram_accepts_categorical() {
        assert!(histogram(&sample(), "label").is_ok());
    }

    #[test]
    fn test_histogram_unknown_column() {
        let err = histogram(&sample(), "nope").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_scatter_trendline_both_numeric() {
        let spec = scatter(&sample(), "a", "b").unwrap();
        assert_eq!(
            spec,
            ChartSpec::Scatter {
                x: "a".to_string(),
                y: "b".to_string(),
                trendline: true,
            }
        );
    }

    #[test]
    fn test_scatter_same_column_never_has_trendline() {
        let spec = scatter(&sample(), "a", "a").unwrap();
        let ChartSpec::Scatter { trendline, .. } = spec else {
            panic!("expected scatter");
        };
        assert!(!trendline);
    }

    #[test]
    fn test_scatter_categorical_axis_never_has_trendline() {
        let spec = scatter(&sample(), "label", "b").unwrap();
        let ChartSpec::Scatter { trendline, .. } = spec else {
            panic!("expected scatter");
        };
        assert!(!trendline);
    }

    #[test]
    fn test_heatmap_correlation_matrix() {
        let spec = heatmap(&sample()).unwrap();
        let ChartSpec::Heatmap {
            columns,
            values,
            color_scale,
            show_values,
        } = spec
        else {
            panic!("expected heatmap");
        };

        assert_eq!(columns, vec!["a", "b"]);
        assert!(show_values);
        assert_eq!(color_scale.palette, "RdBu");
        assert_eq!(color_scale.min, -1.0);
        assert_eq!(color_scale.max, 1.0);
        // Diagonal is exactly 1, and a/b are perfectly correlated.
        assert!((values[0][0] - 1.0).abs() < 1e-12);
        assert!((values[1][1] - 1.0).abs() < 1e-12);
        assert!((values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_heatmap_placeholder_below_two_numeric() {
        let t = table(df!["only" => [1.0, 2.0], "label" => ["a", "b"]].unwrap());
        let spec = heatmap(&t).unwrap();
        assert_eq!(
            spec,
            ChartSpec::Heatmap {
                columns: Vec::new(),
                values: vec![vec![0.0]],
                color_scale: ColorScale::diverging_correlation(),
                show_values: false,
            }
        );
    }

    #[test]
    fn test_heatmap_constant_column_is_nan() {
        let t = table(
            df![
                "a" => [1.0, 2.0, 3.0],
                "flat" => [5.0, 5.0, 5.0],
            ]
            .unwrap(),
        );
        let ChartSpec::Heatmap { values, .. } = heatmap(&t).unwrap() else {
            panic!("expected heatmap");
        };
        assert!(values[0][1].is_nan());
        assert!(values[1][1].is_nan());
    }

    #[test]
    fn test_heatmap_pairwise_complete() {
        // Rows with a gap in either column are excluded from that pair.
        let t = table(
            df![
                "a" => [Some(1.0), Some(2.0), None, Some(4.0)],
                "b" => [Some(2.0), Some(4.0), Some(6.0), Some(8.0)],
            ]
            .unwrap(),
        );
        let ChartSpec::Heatmap { values, .. } = heatmap(&t).unwrap() else {
            panic!("expected heatmap");
        };
        assert!((values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spec_json_shape() {
        let spec = boxplot(&sample(), "a").unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"kind":"boxplot","column":"a"}"#);
    }
}
