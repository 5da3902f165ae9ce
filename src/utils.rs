//! Shared utilities for the exploration pipeline.
//!
//! Dtype helpers, null-aware fills, and the small statistics the cleaner
//! and chart builders share (mode, linear-interpolation quantiles, Pearson
//! correlation).

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a string parses as a plain f64 (no currency/thousands handling;
/// the loader promotes columns only when every value parses strictly).
pub fn is_numeric_string(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok()
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Extract a Float64 series as null-aware values.
///
/// The series must already be Float64 (the loader guarantees this for
/// numeric columns). NaN is treated as missing.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let ca = series.f64()?;
    Ok(ca
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Extract the non-missing values of a Float64 series.
pub fn finite_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Arithmetic mean, None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q` is in [0, 1]. Returns None for an empty slice.
pub fn quantile_linear(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let frac = rank - lower as f64;
    Some(sorted[lower] + frac * (sorted[upper] - sorted[lower]))
}

/// Median via linear-interpolation quantile.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_linear(values, 0.5)
}

/// First modal value of a numeric slice.
///
/// Ties break to the smallest value, matching the "first of the sorted
/// modal values" convention used elsewhere in the pipeline.
pub fn numeric_mode(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut counts: std::collections::HashMap<u64, (f64, usize)> =
        std::collections::HashMap::new();
    for &v in values {
        let entry = counts.entry(v.to_bits()).or_insert((v, 0));
        entry.1 += 1;
    }
    counts
        .into_values()
        .min_by(|(va, ca), (vb, cb)| cb.cmp(ca).then(va.total_cmp(vb)))
        .map(|(v, _)| v)
}

/// First modal value of a string Series.
///
/// Ties break to the lexicographically smallest value so the result is
/// deterministic.
pub fn string_mode(series: &Series) -> Option<String> {
    let ca = series.str().ok()?;

    let mut value_counts: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();
    for val in ca.into_iter().flatten() {
        *value_counts.entry(val.to_string()).or_insert(0) += 1;
    }

    value_counts
        .into_iter()
        .min_by(|(va, ca), (vb, cb)| cb.cmp(ca).then(va.cmp(vb)))
        .map(|(val, _)| val)
}

/// Pearson correlation over paired values.
///
/// Returns NaN when either side has zero variance or fewer than two pairs
/// remain; degenerate columns are reported explicitly rather than left to
/// incidental floating-point behavior.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill missing entries (null or NaN) in a Float64 Series with a value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let ca = series.f64()?;
    let filled: Vec<f64> = ca
        .into_iter()
        .map(|v| match v {
            Some(x) if !x.is_nan() => x,
            _ => fill_value,
        })
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let ca = series.str()?;
    let filled: Vec<String> = ca
        .into_iter()
        .map(|v| v.unwrap_or(fill_value).to_string())
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
