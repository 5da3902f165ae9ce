//! The exploration session: one uploaded table plus the cleaning options
//! currently in effect.
//!
//! A session is the orchestrator the UI shell talks to. It keeps the
//! original table untouched and re-derives the cleaned view from it on
//! every call, so toggling a cleaning option never compounds with the
//! previous toggle.

use crate::charts::{self, ChartSpec};
use crate::cleaner;
use crate::config::SessionConfig;
use crate::error::{ExploreError, Result, ResultExt};
use crate::loader::{self, Separator};
use crate::table::Table;
use crate::trainer::{self, RegressionResult};
use polars::prelude::*;
use tracing::{info, warn};

/// A chart selection as made by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRequest {
    Histogram { column: String },
    Boxplot { column: String },
    Scatter { x: String, y: String },
    Heatmap,
}

/// One user's exploration state: the loaded table, its detected
/// separator, and the active cleaning configuration.
#[derive(Debug)]
pub struct Session {
    table: Table,
    separator: Option<Separator>,
    config: SessionConfig,
}

impl Session {
    /// Load an uploaded file and start a session over it.
    pub fn from_upload(raw: &[u8], filename: &str, config: SessionConfig) -> Result<Self> {
        let (table, separator) = loader::load(raw, filename)?;
        Ok(Self {
            table,
            separator,
            config,
        })
    }

    /// The table as loaded, before any cleaning.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The separator detected at load time; absent for spreadsheets.
    pub fn separator(&self) -> Option<Separator> {
        self.separator
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the cleaning configuration. Takes effect on the next call
    /// to [`Session::cleaned`]; nothing is cached.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// The cleaned view of the table under the current configuration.
    ///
    /// Always derived from the original upload: imputation first, then
    /// outlier removal.
    pub fn cleaned(&self) -> Result<Table> {
        let mut table = match self.config.impute {
            Some(method) => cleaner::impute(&self.table, method)?,
            None => self.table.clone(),
        };
        if self.config.remove_outliers {
            table = cleaner::remove_outliers_iqr(&table)?;
        }
        Ok(table)
    }

    /// Build a chart spec against the cleaned table.
    pub fn chart(&self, request: &ChartRequest) -> Result<ChartSpec> {
        let table = self.cleaned()?;
        match request {
            ChartRequest::Histogram { column } => charts::histogram(&table, column),
            ChartRequest::Boxplot { column } => charts::boxplot(&table, column),
            ChartRequest::Scatter { x, y } => charts::scatter(&table, x, y),
            ChartRequest::Heatmap => charts::heatmap(&table),
        }
    }

    /// Train a baseline OLS model predicting `target` from every other
    /// numeric column of the cleaned table.
    ///
    /// The trainer's preconditions are enforced here, not inside it: a
    /// non-numeric target or a feature set with no numeric columns is an
    /// advisory error, and rows with gaps in the target or any feature
    /// are dropped before fitting.
    pub fn train(&self, target: &str) -> Result<RegressionResult> {
        let table = self.cleaned()?;

        if !table.is_numeric(target)? {
            warn!("Regression target '{}' is not numeric; skipping", target);
            return Err(ExploreError::NonNumericTarget(target.to_string()));
        }

        let feature_names: Vec<String> = table
            .numeric_column_names()
            .into_iter()
            .filter(|name| name != target)
            .collect();
        if feature_names.is_empty() {
            warn!("No numeric feature columns besides '{}'; skipping", target);
            return Err(ExploreError::NoNumericFeatures);
        }

        let (features, target_values) = complete_rows(&table, &feature_names, target)?;
        info!(
            "Training on {} complete rows, {} feature(s), target '{}'",
            features.height(),
            feature_names.len(),
            target
        );
        trainer::train(&features, &target_values)
    }

    /// The held-out evaluation of a training run as a plottable table
    /// plus its scatter spec.
    pub fn actual_vs_predicted(result: &RegressionResult) -> Result<(Table, ChartSpec)> {
        let df = DataFrame::new(vec![
            Series::new("actual".into(), result.y_test.clone()).into_column(),
            Series::new("predicted".into(), result.predictions.clone()).into_column(),
        ])
        .context("Building actual-vs-predicted table")?;
        let table = Table::from_normalized(df);
        let spec = charts::scatter(&table, "actual", "predicted")?;
        Ok((table, spec))
    }
}

/// Restrict to the feature columns and target, keeping only rows where
/// every one of them has a value.
fn complete_rows(
    table: &Table,
    feature_names: &[String],
    target: &str,
) -> Result<(Table, Vec<f64>)> {
    let target_values = table.numeric_column(target)?;
    let feature_columns: Vec<Vec<Option<f64>>> = feature_names
        .iter()
        .map(|name| table.numeric_column(name))
        .collect::<Result<_>>()?;

    let keep: Vec<bool> = (0..table.height())
        .map(|i| target_values[i].is_some() && feature_columns.iter().all(|col| col[i].is_some()))
        .collect();

    let mask = BooleanChunked::from_slice("complete_mask".into(), &keep);
    let features = Table::from_normalized(table.select(feature_names)?.dataframe().filter(&mask)?);
    let target_kept: Vec<f64> = target_values
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .filter_map(|(v, _)| v)
        .collect();
    Ok((features, target_kept))
}

static_assertions::assert_impl_all!(Session: Send);
