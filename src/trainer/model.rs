//! The fitted-model capability and its OLS implementation.

use crate::error::{ExploreError, Result};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};

/// A fitted regression model.
///
/// Callers see only prediction; the concrete algorithm stays hidden so it
/// can be swapped without touching the orchestrator.
pub trait Regressor: Send + Sync {
    /// Predict targets for a batch of feature rows.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>>;
}

/// Ordinary least squares via smartcore's linear regression.
#[derive(Debug)]
pub(crate) struct OlsRegressor {
    model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl OlsRegressor {
    pub(crate) fn fit(features: &[Vec<f64>], target: &[f64]) -> Result<Self> {
        let x = feature_matrix(features)?;
        let model = LinearRegression::fit(&x, &target.to_vec(), LinearRegressionParameters::default())
            .map_err(training_error)?;
        Ok(Self { model })
    }
}

impl Regressor for OlsRegressor {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        let x = feature_matrix(features)?;
        self.model.predict(&x).map_err(training_error)
    }
}

/// Build the feature matrix, rejecting input the matrix constructor
/// would panic on (no rows, zero-width rows, ragged rows).
fn feature_matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(ExploreError::Training("no feature rows".to_string()));
    }
    if rows.iter().any(|row| row.len() != width) {
        return Err(ExploreError::Training(
            "feature rows have inconsistent widths".to_string(),
        ));
    }
    Ok(DenseMatrix::from_2d_vec(&rows.to_vec()))
}

fn training_error(e: impl ToString) -> ExploreError {
    ExploreError::Training(e.to_string())
}
