//! Interactive Tabular-Data Exploration Library
//!
//! A small data-exploration pipeline built with Rust and Polars.
//!
//! # Overview
//!
//! This library takes a raw file upload through a linear pipeline:
//!
//! - **Loading**: separator sniffing for delimited text, spreadsheet
//!   parsing, duplicate column-name deduplication, and column typing
//!   (numeric vs. categorical, decided once at load)
//! - **Cleaning**: per-column missing-value imputation (mean/median/mode)
//!   and conjunctive IQR outlier filtering
//! - **Charting**: declarative chart specs (histogram, boxplot, scatter
//!   with trend-line eligibility, correlation heatmap) for an external
//!   renderer
//! - **Modeling**: a seeded 75/25 split, an OLS fit, and MAE/MSE/RMSE/R²
//!   evaluation on the held-out quarter
//!
//! Every stage returns a new [`Table`]; nothing is mutated in place, and
//! the cleaned view is always re-derived from the original upload.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabscope::{ChartRequest, ImputeMethod, Session, SessionConfig};
//!
//! let raw = std::fs::read("listings.csv")?;
//!
//! let config = SessionConfig::builder()
//!     .impute(ImputeMethod::Median)
//!     .remove_outliers(true)
//!     .build();
//!
//! let session = Session::from_upload(&raw, "listings.csv", config)?;
//! println!("Loaded {} rows", session.table().height());
//!
//! let spec = session.chart(&ChartRequest::Heatmap)?;
//! println!("{}", serde_json::to_string_pretty(&spec)?);
//!
//! let result = session.train("price")?;
//! for (name, value) in result.metrics.to_map() {
//!     println!("{name}: {value:.4}");
//! }
//! ```

pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod session;
pub mod table;
pub mod trainer;
pub mod utils;

pub use charts::{ChartSpec, ColorScale, HISTOGRAM_BINS};
pub use cleaner::{impute, remove_outliers_iqr};
pub use config::{ImputeMethod, SessionConfig, SessionConfigBuilder};
pub use error::{ExploreError, Result, ResultExt};
pub use loader::{load, Separator};
pub use session::{ChartRequest, Session};
pub use table::{ColumnKind, Table};
pub use trainer::{train, RegressionMetrics, RegressionResult, Regressor};
