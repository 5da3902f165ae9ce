//! Baseline regression: seeded train/test split, OLS fit, error metrics.
//!
//! The trainer assumes its preconditions hold: every feature column and
//! the target are numeric and gap-free. The orchestrator checks this
//! before calling (see [`crate::session`]).

mod model;

pub use model::Regressor;

use crate::error::Result;
use crate::table::Table;
use model::OlsRegressor;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use smartcore::metrics::{mean_absolute_error, mean_squared_error, r2};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Seed for the train/test shuffle. Fixed so repeated runs on the same
/// data produce the same split, predictions, and metrics.
pub const TRAIN_TEST_SEED: u64 = 42;

/// Fraction of rows held out for evaluation.
pub const TEST_FRACTION: f64 = 0.25;

/// Evaluation metrics on the held-out partition. All four are computed
/// together on every training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Metrics as a labelled mapping for display.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("MAE", self.mae),
            ("MSE", self.mse),
            ("RMSE", self.rmse),
            ("R2", self.r2),
        ])
    }
}

/// Outcome of one training run: the fitted model plus its held-out
/// evaluation. Created fresh on each request, never persisted.
pub struct RegressionResult {
    pub model: Box<dyn Regressor>,
    pub predictions: Vec<f64>,
    pub y_test: Vec<f64>,
    pub metrics: RegressionMetrics,
}

// Manual impl: the boxed model is opaque.
impl fmt::Debug for RegressionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegressionResult")
            .field("predictions", &self.predictions)
            .field("y_test", &self.y_test)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Fit an OLS model on a seeded 75/25 split and evaluate on the held-out
/// quarter.
///
/// `features` must contain only numeric columns and `target` must align
/// with its rows; both are the caller's responsibility.
pub fn train(features: &Table, target: &[f64]) -> Result<RegressionResult> {
    let rows = feature_rows(features)?;
    let (train_idx, test_idx) = split_indices(rows.len());

    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| rows[i].clone()).collect();
    let y_train: Vec<f64> = train_idx.iter().map(|&i| target[i]).collect();
    let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| rows[i].clone()).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| target[i]).collect();

    let model = OlsRegressor::fit(&x_train, &y_train)?;
    let predictions = model.predict(&x_test)?;
    let metrics = evaluate(&y_test, &predictions);

    info!(
        "Trained OLS on {} rows, evaluated on {}: RMSE = {:.4}, R2 = {:.4}",
        x_train.len(),
        y_test.len(),
        metrics.rmse,
        metrics.r2
    );

    Ok(RegressionResult {
        model: Box::new(model),
        predictions,
        y_test,
        metrics,
    })
}

/// Shuffle row indices with the fixed seed and hold out the leading
/// quarter (rounded up) as the test partition.
fn split_indices(n: usize) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(TRAIN_TEST_SEED);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * TEST_FRACTION).ceil() as usize;
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

fn feature_rows(features: &Table) -> Result<Vec<Vec<f64>>> {
    let columns: Vec<Vec<Option<f64>>> = features
        .column_names()
        .iter()
        .map(|name| features.numeric_column(name))
        .collect::<Result<_>>()?;

    Ok((0..features.height())
        .map(|i| {
            columns
                .iter()
                .map(|col| col[i].unwrap_or(f64::NAN))
                .collect()
        })
        .collect())
}

fn evaluate(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
    let y_true_vec = y_true.to_vec();
    let y_pred_vec = y_pred.to_vec();
    let mae = mean_absolute_error(&y_true_vec, &y_pred_vec);
    let mse = mean_squared_error(&y_true_vec, &y_pred_vec);
    let r2_val = r2(&y_true_vec, &y_pred_vec);

    RegressionMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        r2: r2_val,
    }
}
