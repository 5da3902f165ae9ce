//! Custom error types for the exploration pipeline.
//!
//! This module provides the error hierarchy using `thiserror`.
//!
//! Errors are serializable so a frontend shell can display them; advisory
//! errors (regression preconditions) are distinguished from hard failures
//! so the caller can surface a warning instead of aborting the session.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the exploration pipeline.
#[derive(Error, Debug)]
pub enum ExploreError {
    /// Uploaded payload could not be parsed as delimited text or spreadsheet.
    #[error("Failed to load '{filename}': {reason}")]
    Load { filename: String, reason: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Regression requested with a non-numeric target column.
    #[error("Target column '{0}' is not numeric; regression skipped")]
    NonNumericTarget(String),

    /// Regression requested but no numeric feature columns remain.
    #[error("No numeric feature columns available for regression")]
    NoNumericFeatures,

    /// Model fitting or prediction failed.
    #[error("Model training failed: {0}")]
    Training(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ExploreError>,
    },
}

impl ExploreError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ExploreError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load { .. } => "LOAD_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NonNumericTarget(_) => "NON_NUMERIC_TARGET",
            Self::NoNumericFeatures => "NO_NUMERIC_FEATURES",
            Self::Training(_) => "TRAINING_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is an advisory precondition failure rather than
    /// a hard failure. Advisory errors mean "skip this step and tell the
    /// user", never "the session is broken".
    pub fn is_advisory(&self) -> bool {
        match self {
            Self::NonNumericTarget(_) | Self::NoNumericFeatures => true,
            Self::WithContext { source, .. } => source.is_advisory(),
            _ => false,
        }
    }
}

/// Serialize implementation for frontend compatibility.
///
/// Errors are serialized as a struct with `code` and `message` fields,
/// making them easy to handle in a UI shell.
impl Serialize for ExploreError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ExploreError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for exploration operations.
pub type Result<T> = std::result::Result<T, ExploreError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ExploreError::Polars(e).with_context(context))
    }
}
