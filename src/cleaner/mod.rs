//! Data cleaning stages: missing-value imputation and outlier removal.
//!
//! Both stages take a [`Table`] and return a new one; the input is never
//! mutated. Imputation fills per column, outlier removal drops rows.

mod outliers;

pub use outliers::remove_outliers_iqr;

use crate::config::ImputeMethod;
use crate::error::Result;
use crate::table::{ColumnKind, Table};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, finite_values, mean, median, numeric_mode, string_mode,
};
use tracing::debug;

/// Fill missing values in every column that has any.
///
/// Numeric columns are filled per the chosen method; categorical columns
/// always use the mode (mean and median are undefined for text). A column
/// with no observed values at all is left untouched, since there is
/// nothing to derive a fill value from.
pub fn impute(table: &Table, method: ImputeMethod) -> Result<Table> {
    let mut df = table.dataframe().clone();

    for name in table.column_names() {
        let series = table.series(&name)?;
        if series.null_count() == 0 {
            continue;
        }

        let filled = match table.kind_of(&name)? {
            ColumnKind::Numeric => {
                let observed = finite_values(series)?;
                let fill_value = match method {
                    ImputeMethod::Mean => mean(&observed),
                    ImputeMethod::Median => median(&observed),
                    ImputeMethod::Mode => numeric_mode(&observed),
                };
                match fill_value {
                    Some(value) => {
                        debug!(
                            "Imputing {} missing values in '{}' with {:?} = {}",
                            series.null_count(),
                            name,
                            method,
                            value
                        );
                        fill_numeric_nulls(series, value)?
                    }
                    None => continue,
                }
            }
            ColumnKind::Categorical => match string_mode(series) {
                Some(value) => {
                    debug!(
                        "Imputing {} missing values in '{}' with mode '{}'",
                        series.null_count(),
                        name,
                        value
                    );
                    fill_string_nulls(series, &value)?
                }
                None => continue,
            },
        };

        df.replace(&name, filled)?;
    }

    Ok(Table::from_normalized(df))
}
