//! Integration tests for sheet and column classification.

use chrono::NaiveDate;
use decision_lens::inference::SheetClassifier;
use decision_lens::ontology::{ColumnSemanticType, SheetRole, TemporalCoverage};
use decision_lens::{Column, Sheet};

fn classifier() -> SheetClassifier {
    SheetClassifier::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
}

fn strings(values: impl IntoIterator<Item = String>) -> Vec<String> {
    values.into_iter().collect()
}

fn text_column(name: &str, values: &[String]) -> Column {
    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
    Column::texts(name, &refs)
}

#[test]
fn test_future_months_are_plan() {
    let sheet = Sheet::new(
        "Forecast",
        vec![
            Column::texts(
                "Month",
                &["2024-08-01", "2024-09-01", "2024-10-01", "2024-11-01", "2024-12-01"],
            ),
            Column::numbers("Target", &[120.5, 135.25, 150.75, 160.5, 171.25]),
        ],
    );

    let profile = classifier().classify_sheet(&sheet);

    assert_eq!(profile.temporal_coverage, TemporalCoverage::Future);
    assert_eq!(profile.temporal_columns, 1);
    assert_eq!(profile.role, SheetRole::Plan);
    assert_eq!(profile.confidence, 0.5);
    assert_eq!(
        profile.column("Target").unwrap().semantic_type,
        ColumnSemanticType::Currency
    );
}

#[test]
fn test_long_past_log_is_transactional() {
    let dates = strings((1..=25).map(|d| format!("2024-01-{:02}", d)));
    let revenue: Vec<f64> = (0..25).map(|i| 1000.25 + i as f64 * 13.5).collect();
    let sheet = Sheet::new(
        "Orders",
        vec![
            text_column("Date", &dates),
            Column::numbers("Revenue", &revenue),
        ],
    );

    let profile = classifier().classify_sheet(&sheet);

    assert_eq!(profile.row_count, 25);
    assert_eq!(profile.temporal_coverage, TemporalCoverage::Past);
    assert_eq!(profile.role, SheetRole::Transactional);
    assert!((profile.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn test_reference_list_is_master() {
    let names = strings((1..=10).map(|i| format!("Customer {:02}", i)));
    let codes = strings((1..=10).map(|i| format!("C-{:03}", i)));
    let segments = strings(
        ["Retail", "Retail", "Retail", "Retail", "Public", "Public", "Public", "Health", "Health", "Health"]
            .iter()
            .map(|s| s.to_string()),
    );
    let sheet = Sheet::new(
        "Customers",
        vec![
            text_column("Customer", &names),
            text_column("Code", &codes),
            text_column("Segment", &segments),
        ],
    );

    let profile = classifier().classify_sheet(&sheet);

    assert_eq!(profile.role, SheetRole::Master);
    assert!((profile.confidence - 0.6).abs() < 1e-9);
    let customer = profile.column("Customer").unwrap();
    assert_eq!(customer.semantic_type, ColumnSemanticType::EntityName);
    assert!(customer.is_potential_key);
    let segment = profile.column("Segment").unwrap();
    assert_eq!(segment.semantic_type, ColumnSemanticType::Dimension);
    assert_eq!(segment.distinct_count, 3);
    assert!(!segment.is_potential_key);
}

#[test]
fn test_status_remark_and_percentage_columns() {
    let mut status = vec!["Active".to_string(); 18];
    status.extend(["Blocked".to_string(), "Blocked".to_string()]);
    let remarks = strings((1..=20).map(|i| {
        format!(
            "Item {} is waiting on the supplier to confirm the revised delivery window",
            i
        )
    }));
    let scores: Vec<f64> = (0..20).map(|i| i as f64 / 20.0).collect();
    let sheet = Sheet::new(
        "Tracker",
        vec![
            text_column("Status", &status),
            text_column("Notes", &remarks),
            Column::numbers("Score", &scores),
        ],
    );

    let profile = classifier().classify_sheet(&sheet);

    let status = profile.column("Status").unwrap();
    assert_eq!(status.semantic_type, ColumnSemanticType::Status);
    assert!((status.unique_ratio - 0.1).abs() < 1e-12);
    assert_eq!(
        profile.column("Notes").unwrap().semantic_type,
        ColumnSemanticType::Remark
    );
    let score = profile.column("Score").unwrap();
    assert_eq!(score.semantic_type, ColumnSemanticType::Percentage);
    let stats = score.stats.as_ref().unwrap();
    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.max, 0.95);
    assert!(!stats.has_negatives);
    assert!(!stats.all_integers);
}

#[test]
fn test_negative_values_signal_comparison() {
    let sheet = Sheet::new(
        "Variance",
        vec![
            Column::texts("Region", &["North", "North", "North", "South", "South", "South"]),
            Column::numbers("Delta", &[-12.5, 8.25, -3.75, 7.5, -12.5, 8.25]),
        ],
    );
    let profile = classifier().classify_sheet(&sheet);
    assert!(profile.has_comparisons);
    assert_eq!(profile.role, SheetRole::Comparison);
}

#[test]
fn test_null_ratio() {
    let sheet = Sheet::new(
        "s",
        vec![
            Column::texts("Region", &["North", "South", "East", "West"]),
            Column::numbers("Amount", &[1.5, 2.5]),
        ],
    );
    let profile = classifier().classify_sheet(&sheet);
    assert_eq!(profile.column("Amount").unwrap().null_ratio, 0.5);
    assert_eq!(profile.null_ratio, 0.25);
}

#[test]
fn test_budget_and_actuals_resolve_as_twins() {
    let sheets = vec![
        Sheet::new(
            "Budget",
            vec![
                Column::texts("Region", &["North", "South"]),
                Column::numbers("Target", &[100.0, 120.0]),
            ],
        ),
        Sheet::new(
            "Actuals",
            vec![
                Column::texts("Region", &["North", "East"]),
                Column::numbers("Actual", &[70.0, 90.0]),
            ],
        ),
    ];

    let profiles = classifier().classify_all(&sheets);

    assert_eq!(profiles[0].role, SheetRole::Plan);
    assert_eq!(profiles[1].role, SheetRole::Actual);
    assert_eq!(profiles[0].confidence, 0.5);
}

#[test]
fn test_plan_promotes_transactional_to_actual() {
    let dates = strings((1..=25).map(|d| format!("2024-01-{:02}", d)));
    let revenue: Vec<f64> = (0..25).map(|i| 1000.25 + i as f64 * 13.5).collect();
    let sheets = vec![
        Sheet::new(
            "Forecast",
            vec![
                Column::texts(
                    "Month",
                    &["2024-08-01", "2024-09-01", "2024-10-01", "2024-11-01", "2024-12-01"],
                ),
                Column::numbers("Target", &[120.5, 135.25, 150.75, 160.5, 171.25]),
            ],
        ),
        Sheet::new(
            "Orders",
            vec![text_column("Date", &dates), Column::numbers("Revenue", &revenue)],
        ),
    ];

    let profiles = classifier().classify_all(&sheets);

    assert_eq!(profiles[0].role, SheetRole::Plan);
    assert_eq!(profiles[1].role, SheetRole::Actual);
}

#[test]
fn test_classification_is_aligned_and_total() {
    let sheets = vec![
        Sheet::new("Empty", vec![]),
        Sheet::new("Numbers", vec![Column::numbers("x", &[1.5, 2.5, 3.5])]),
    ];
    let profiles = classifier().classify_all(&sheets);
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].name, "Empty");
    assert_eq!(profiles[0].role, SheetRole::Unknown);
    assert_eq!(profiles[0].confidence, 0.0);
    assert!(profiles.iter().all(|p| (0.0..=1.0).contains(&p.confidence)));
}
