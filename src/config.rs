//! Configuration surface exposed to the orchestrator.

use serde::{Deserialize, Serialize};

/// Strategy for imputing missing values.
///
/// For categorical columns, mean and median are undefined and the cleaner
/// always falls back to the mode; the method selects behavior for numeric
/// columns only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeMethod {
    /// Use the mean of non-null values.
    Mean,
    /// Use the median of non-null values.
    Median,
    /// Use the first modal value.
    Mode,
}

/// Cleaning options for an exploration session.
///
/// Use [`SessionConfig::builder()`] for fluent construction.
///
/// # Example
///
/// ```rust,ignore
/// use tabscope::{ImputeMethod, SessionConfig};
///
/// let config = SessionConfig::builder()
///     .impute(ImputeMethod::Median)
///     .remove_outliers(true)
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Missing-value imputation method; `None` leaves gaps untouched.
    /// Default: None
    pub impute: Option<ImputeMethod>,

    /// Whether to drop rows outside the IQR bounds of any numeric column.
    /// Default: false
    pub remove_outliers: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            impute: None,
            remove_outliers: false,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for [`SessionConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    impute: Option<ImputeMethod>,
    remove_outliers: Option<bool>,
}

impl SessionConfigBuilder {
    /// Set the missing-value imputation method.
    pub fn impute(mut self, method: ImputeMethod) -> Self {
        self.impute = Some(method);
        self
    }

    /// Enable or disable IQR outlier removal.
    pub fn remove_outliers(mut self, remove: bool) -> Self {
        self.remove_outliers = Some(remove);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SessionConfig {
        SessionConfig {
            impute: self.impute,
            remove_outliers: self.remove_outliers.unwrap_or(false),
        }
    }
}
