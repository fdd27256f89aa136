//! Integration tests for the workbook input model.
//!
//! Covers the JSON interchange form, normalization and numeric helpers.

use decision_lens::error::WorkbookError;
use decision_lens::table::normalize::normalize_sheet;
use decision_lens::table::stats;
use decision_lens::{Column, Sheet, Value, Workbook};

#[test]
fn test_parse_interchange_form() {
    let json = r#"{"sheets": [
        {"name": "Budget", "columns": [
            {"name": "Region", "values": ["North", "South", null]},
            {"name": "Target", "values": [100, 120.5, 90]},
            {"name": "Active", "values": [true, false, true]}
        ]},
        {"name": "Actuals", "columns": []}
    ]}"#;

    let workbook = Workbook::from_json_str(json).unwrap();

    assert_eq!(workbook.sheets.len(), 2);
    assert_eq!(workbook.sheets[0].name, "Budget");
    assert_eq!(workbook.sheets[1].name, "Actuals");

    let budget = workbook.sheet("Budget").unwrap();
    assert_eq!(budget.row_count(), 3);
    let region = budget.column("Region").unwrap();
    assert_eq!(region.get(2), &Value::Null);
    assert_eq!(region.non_null_count(), 2);
    assert!(budget.column("Target").unwrap().is_numeric());
    assert!(!budget.column("Active").unwrap().is_numeric());
    assert_eq!(budget.column("Target").unwrap().get(1).as_f64(), Some(120.5));
}

#[test]
fn test_duplicate_sheet_rejected() {
    let json = r#"{"sheets": [{"name": "A", "columns": []}, {"name": "A", "columns": []}]}"#;
    let err = Workbook::from_json_str(json).unwrap_err();
    assert!(matches!(err, WorkbookError::DuplicateSheet(name) if name == "A"));
}

#[test]
fn test_malformed_json() {
    let err = Workbook::from_json_str("{\"sheets\": [").unwrap_err();
    assert!(matches!(err, WorkbookError::Json(_)));
}

#[test]
fn test_missing_file() {
    let err = Workbook::from_path("/nonexistent/workbook.json").unwrap_err();
    assert!(matches!(err, WorkbookError::FileNotFound(_)));
}

#[test]
fn test_row_count_is_longest_column() {
    let sheet = Sheet::new(
        "s",
        vec![
            Column::numbers("a", &[1.0, 2.0]),
            Column::numbers("b", &[1.0, 2.0, 3.0, 4.0]),
        ],
    );
    assert_eq!(sheet.row_count(), 4);
    assert_eq!(sheet.columns[0].get(3), &Value::Null);
}

#[test]
fn test_value_counts_first_seen_order() {
    let column = Column::texts("status", &["Active", "Blocked", "Active", " Active "]);
    assert_eq!(
        column.value_counts(),
        vec![("Active".to_string(), 3), ("Blocked".to_string(), 1)]
    );
    assert_eq!(column.unique_ratio(), 0.5);
}

#[test]
fn test_normalize_drops_empty_rows_and_columns() {
    let sheet = Sheet::new(
        "Orders",
        vec![
            Column::new(
                "Region",
                vec![Value::from("North"), Value::Null, Value::from("South")],
            ),
            Column::new(
                "Amount",
                vec![Value::from(10.0), Value::Null, Value::from(20.0)],
            ),
            Column::new("Empty", vec![Value::Null, Value::text(""), Value::Null]),
        ],
    );

    let out = normalize_sheet(&sheet).unwrap();

    assert_eq!(out.row_count(), 2);
    let names: Vec<&str> = out.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Region", "Amount"]);
    assert_eq!(out.column("Amount").unwrap().numeric_values(), vec![10.0, 20.0]);
}

#[test]
fn test_normalize_renames_duplicates() {
    let sheet = Sheet::new(
        "s",
        vec![
            Column::numbers("Amount", &[1.0, 2.0]),
            Column::numbers(" Amount", &[3.0, 4.0]),
            Column::texts("Region", &["a", "b"]),
        ],
    );
    let out = normalize_sheet(&sheet).unwrap();
    let names: Vec<&str> = out.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Amount_0", "Amount_1", "Region"]);
}

#[test]
fn test_normalize_skips_unusable_sheet() {
    let sheet = Sheet::new(
        "Index",
        vec![
            Column::numbers("Unnamed: 0", &[0.0, 1.0, 2.0]),
            Column::new("", vec![Value::from("x")]),
        ],
    );
    assert!(normalize_sheet(&sheet).is_none());
    assert!(normalize_sheet(&Sheet::new("Blank", vec![])).is_none());
}

#[test]
fn test_stats_sample_variance() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert_eq!(stats::mean(&values), Some(5.0));
    let var = stats::variance(&values).unwrap();
    assert!((var - 32.0 / 7.0).abs() < 1e-12);
    assert_eq!(stats::variance(&[1.0]), None);
    assert_eq!(stats::min_max(&values), Some((2.0, 9.0)));
}

#[test]
fn test_stats_correlation_pairwise_complete() {
    let xs = [Some(1.0), Some(2.0), None, Some(4.0)];
    let ys = [Some(2.0), Some(4.0), Some(100.0), Some(8.0)];
    let r = stats::correlation(&xs, &ys).unwrap();
    assert!((r - 1.0).abs() < 1e-12);
    assert_eq!(stats::correlation(&[Some(1.0), Some(1.0)], &[Some(1.0), Some(2.0)]), None);
}

#[test]
fn test_stats_approx_eq() {
    assert!(stats::approx_eq(100.5, 100.0, 0.01));
    assert!(!stats::approx_eq(102.0, 100.0, 0.01));
    assert!(stats::approx_eq(0.0, 0.0, 0.01));
    assert!(!stats::approx_eq(0.001, 0.0, 0.01));
}
