//! IQR-based outlier removal.

use crate::error::Result;
use crate::table::Table;
use crate::utils::quantile_linear;
use polars::prelude::*;
use tracing::debug;

/// Multiplier applied to the interquartile range when computing bounds.
const IQR_MULTIPLIER: f64 = 1.5;

/// Drop every row that falls outside the IQR bounds of any numeric column.
///
/// For each numeric column, Q1 and Q3 are computed over the observed
/// values with linear interpolation, and a row survives the column's check
/// only when its value lies inside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`. The
/// checks are conjunctive across columns, and a missing value fails its
/// column's check, so rows with gaps in numeric columns are dropped.
/// Tables with no numeric columns pass through unchanged.
pub fn remove_outliers_iqr(table: &Table) -> Result<Table> {
    let numeric = table.numeric_column_names();
    if numeric.is_empty() || table.height() == 0 {
        return Ok(table.clone());
    }

    let mut keep = vec![true; table.height()];
    for name in &numeric {
        let values = table.numeric_column(name)?;
        let observed: Vec<f64> = values.iter().flatten().copied().collect();

        // A column with no observed values has no quartiles; every row
        // fails its check.
        let bounds = quantile_linear(&observed, 0.25)
            .zip(quantile_linear(&observed, 0.75))
            .map(|(q1, q3)| {
                let iqr = q3 - q1;
                (q1 - IQR_MULTIPLIER * iqr, q3 + IQR_MULTIPLIER * iqr)
            });

        if let Some((lower, upper)) = bounds {
            debug!(
                "Outlier bounds for '{}': [{:.4}, {:.4}]",
                name, lower, upper
            );
        }

        for (flag, value) in keep.iter_mut().zip(values.iter()) {
            let inside = match (bounds, value) {
                (Some((lower, upper)), Some(v)) => *v >= lower && *v <= upper,
                _ => false,
            };
            if !inside {
                *flag = false;
            }
        }
    }

    let mask = BooleanChunked::from_slice("outlier_mask".into(), &keep);
    let filtered = table.dataframe().filter(&mask)?;

    let removed = table.height() - filtered.height();
    if removed > 0 {
        debug!("Removed {} outlier rows of {}", removed, table.height());
    }
    Ok(Table::from_normalized(filtered))
}
