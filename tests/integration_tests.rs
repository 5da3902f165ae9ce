//! Integration tests for the exploration pipeline.
//!
//! These tests exercise the upload-to-result flow end to end: loading,
//! cleaning, chart building, and regression training.

use pretty_assertions::assert_eq;
use tabscope::{
    ChartRequest, ChartSpec, ImputeMethod, Separator, Session, SessionConfig,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn upload(raw: &[u8], filename: &str) -> Session {
    Session::from_upload(raw, filename, SessionConfig::default())
        .expect("Failed to load upload")
}

fn upload_with(raw: &[u8], filename: &str, config: SessionConfig) -> Session {
    Session::from_upload(raw, filename, config).expect("Failed to load upload")
}

/// A CSV with a numeric gap, a categorical gap, and one blatant outlier.
const LISTINGS: &[u8] = b"size,price,city\n\
    50,100,aa\n\
    55,,bb\n\
    60,120,aa\n\
    65,130,\n\
    70,140,aa\n\
    75,150,bb\n\
    80,160,aa\n\
    85,170,bb\n\
    90,9999,aa\n";

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_separator_inference_end_to_end() {
    let session = upload(b"a;b\n1;2\n3;4\n", "data.csv");
    assert_eq!(session.separator(), Some(Separator::Semicolon));

    // Ambiguous content falls back to the first candidate.
    let session = upload(b"only\n1\n2\n", "data.csv");
    assert_eq!(session.separator(), Some(Separator::Comma));
}

#[test]
fn test_duplicate_headers_are_renamed() {
    let session = upload(b"x,y,x,x\n1,2,3,4\n", "dup.csv");
    assert_eq!(
        session.table().column_names(),
        vec!["x", "y", "x_1", "x_2"]
    );
}

#[test]
fn test_numeric_looking_text_is_promoted() {
    let session = upload(b"v\n\"1\"\n\"2.5\"\n\"3\"\n", "quoted.csv");
    assert_eq!(
        session.table().numeric_column("v").unwrap(),
        vec![Some(1.0), Some(2.5), Some(3.0)]
    );
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_imputation_mean_and_median() {
    let raw = b"v\n1\n\n3\n";

    let mean = upload_with(
        raw,
        "v.csv",
        SessionConfig::builder().impute(ImputeMethod::Mean).build(),
    );
    assert_eq!(
        mean.cleaned().unwrap().numeric_column("v").unwrap(),
        vec![Some(1.0), Some(2.0), Some(3.0)]
    );

    let median = upload_with(
        raw,
        "v.csv",
        SessionConfig::builder().impute(ImputeMethod::Median).build(),
    );
    assert_eq!(
        median.cleaned().unwrap().numeric_column("v").unwrap(),
        vec![Some(1.0), Some(2.0), Some(3.0)]
    );
}

#[test]
fn test_imputation_categorical_uses_mode_for_any_method() {
    let raw = b"label\na\n\na\nb\n";
    for method in [ImputeMethod::Mean, ImputeMethod::Median, ImputeMethod::Mode] {
        let session = upload_with(
            raw,
            "labels.csv",
            SessionConfig::builder().impute(method).build(),
        );
        let cleaned = session.cleaned().unwrap();
        let series = cleaned.series("label").unwrap();
        let ca = series.str().unwrap();
        let values: Vec<&str> = ca.into_iter().flatten().collect();
        assert_eq!(values, vec!["a", "a", "a", "b"]);
    }
}

#[test]
fn test_outlier_removal_is_idempotent() {
    let session = upload_with(
        LISTINGS,
        "listings.csv",
        SessionConfig::builder()
            .impute(ImputeMethod::Median)
            .remove_outliers(true)
            .build(),
    );

    let once = session.cleaned().unwrap();
    let twice = tabscope::remove_outliers_iqr(&once).unwrap();
    assert_eq!(once.height(), twice.height());
    assert_eq!(once.dataframe(), twice.dataframe());

    // The 9999 price row is gone.
    assert!(
        once.numeric_column("price")
            .unwrap()
            .iter()
            .all(|v| v.unwrap() < 1000.0)
    );
}

#[test]
fn test_outlier_filter_is_conjunctive() {
    // Last row is fine on 'a' but extreme on 'b'; it goes anyway.
    let raw = b"a,b\n1,10\n2,11\n3,12\n4,11\n5,10\n6,9999\n";
    let session = upload_with(
        raw,
        "ab.csv",
        SessionConfig::builder().remove_outliers(true).build(),
    );
    assert_eq!(session.cleaned().unwrap().height(), 5);
}

#[test]
fn test_cleaning_never_mutates_the_upload() {
    let session = upload_with(
        LISTINGS,
        "listings.csv",
        SessionConfig::builder()
            .impute(ImputeMethod::Mean)
            .remove_outliers(true)
            .build(),
    );

    let before = session.table().clone();
    session.cleaned().unwrap();
    assert_eq!(session.table().dataframe(), before.dataframe());

    // Re-derivation is deterministic across calls.
    let a = session.cleaned().unwrap();
    let b = session.cleaned().unwrap();
    assert_eq!(a.dataframe(), b.dataframe());
}

// ============================================================================
// Charts
// ============================================================================

#[test]
fn test_trendline_eligibility() {
    let session = upload(LISTINGS, "listings.csv");

    let both_numeric = session
        .chart(&ChartRequest::Scatter {
            x: "size".to_string(),
            y: "price".to_string(),
        })
        .unwrap();
    assert!(matches!(
        both_numeric,
        ChartSpec::Scatter { trendline: true, .. }
    ));

    let same_column = session
        .chart(&ChartRequest::Scatter {
            x: "size".to_string(),
            y: "size".to_string(),
        })
        .unwrap();
    assert!(matches!(
        same_column,
        ChartSpec::Scatter {
            trendline: false,
            ..
        }
    ));

    let categorical_axis = session
        .chart(&ChartRequest::Scatter {
            x: "city".to_string(),
            y: "price".to_string(),
        })
        .unwrap();
    assert!(matches!(
        categorical_axis,
        ChartSpec::Scatter {
            trendline: false,
            ..
        }
    ));
}

#[test]
fn test_heatmap_correlation_and_degenerate_fallback() {
    let session = upload(LISTINGS, "listings.csv");
    let ChartSpec::Heatmap {
        columns,
        values,
        show_values,
        ..
    } = session.chart(&ChartRequest::Heatmap).unwrap()
    else {
        panic!("expected heatmap");
    };
    assert_eq!(columns, vec!["size", "price"]);
    assert!(show_values);
    assert!((values[0][0] - 1.0).abs() < 1e-9);
    assert!((values[1][1] - 1.0).abs() < 1e-9);

    // One numeric column: the 1x1 zero placeholder.
    let single = upload(b"v,label\n1,a\n2,b\n", "single.csv");
    let ChartSpec::Heatmap {
        columns,
        values,
        show_values,
        ..
    } = single.chart(&ChartRequest::Heatmap).unwrap()
    else {
        panic!("expected heatmap");
    };
    assert!(columns.is_empty());
    assert_eq!(values, vec![vec![0.0]]);
    assert!(!show_values);
}

#[test]
fn test_chart_specs_round_trip_through_json() {
    let session = upload(LISTINGS, "listings.csv");
    for request in [
        ChartRequest::Histogram {
            column: "price".to_string(),
        },
        ChartRequest::Boxplot {
            column: "price".to_string(),
        },
        ChartRequest::Scatter {
            x: "size".to_string(),
            y: "price".to_string(),
        },
        ChartRequest::Heatmap,
    ] {
        let spec = session.chart(&request).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        let back: ChartSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}

// ============================================================================
// Regression
// ============================================================================

#[test]
fn test_training_is_reproducible() {
    let session = upload_with(
        LISTINGS,
        "listings.csv",
        SessionConfig::builder()
            .impute(ImputeMethod::Median)
            .remove_outliers(true)
            .build(),
    );

    let a = session.train("price").unwrap();
    let b = session.train("price").unwrap();
    assert_eq!(a.predictions, b.predictions);
    assert_eq!(a.y_test, b.y_test);
    assert_eq!(a.metrics, b.metrics);
}

#[test]
fn test_rmse_is_root_of_mse() {
    let session = upload(LISTINGS, "listings.csv");
    let result = session.train("price").unwrap();
    assert!((result.metrics.rmse.powi(2) - result.metrics.mse).abs() < 1e-9);
}

#[test]
fn test_training_preconditions_are_advisory() {
    let session = upload(LISTINGS, "listings.csv");
    let err = session.train("city").unwrap_err();
    assert_eq!(err.error_code(), "NON_NUMERIC_TARGET");
    assert!(err.is_advisory());

    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"code\":\"NON_NUMERIC_TARGET\""));
}

#[test]
fn test_actual_vs_predicted_surface() {
    let session = upload(LISTINGS, "listings.csv");
    let result = session.train("price").unwrap();
    let (table, spec) = Session::actual_vs_predicted(&result).unwrap();

    assert_eq!(table.height(), result.y_test.len());
    assert!(matches!(spec, ChartSpec::Scatter { .. }));
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_bad_upload_reports_load_error() {
    let err =
        Session::from_upload(b"", "empty.csv", SessionConfig::default()).unwrap_err();
    assert_eq!(err.error_code(), "LOAD_ERROR");

    let err = Session::from_upload(b"not a workbook", "book.xlsx", SessionConfig::default())
        .unwrap_err();
    assert_eq!(err.error_code(), "LOAD_ERROR");
}

#[test]
fn test_failed_upload_does_not_poison_the_next_one() {
    let _ = Session::from_upload(b"", "empty.csv", SessionConfig::default());
    let session = upload(LISTINGS, "listings.csv");
    assert_eq!(session.table().height(), 9);
}
