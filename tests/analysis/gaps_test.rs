//! Integration tests for plan-vs-actual gap analysis.

use chrono::NaiveDate;
use decision_lens::analysis::GapAnalyzer;
use decision_lens::inference::{EntityDetector, SheetClassifier};
use decision_lens::ontology::{GapDirection, Severity};
use decision_lens::{Column, Sheet};

fn analyze(sheets: &[Sheet]) -> (GapAnalyzer, EntityDetector) {
    let classifier = SheetClassifier::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    let profiles = classifier.classify_all(sheets);
    let mut detector = EntityDetector::default();
    detector.detect(sheets, &profiles);
    let mut analyzer = GapAnalyzer::new();
    analyzer.analyze(sheets, &profiles, &detector);
    (analyzer, detector)
}

fn budget_and_actuals() -> Vec<Sheet> {
    vec![
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
    ]
}

#[test]
fn test_separate_sheets_join_on_shared_entity() {
    let (analyzer, detector) = analyze(&budget_and_actuals());
    let region = detector.entity_for_column("Budget", "Region").unwrap();

    let gaps = analyzer.gaps();
    assert_eq!(gaps.len(), 1);
    let gap = &gaps[0];
    assert_eq!(gap.id, "gap-0001");
    assert_eq!(gap.entity_id.as_deref(), Some(region.id.as_str()));
    assert_eq!(gap.subject, "North");
    assert_eq!(gap.metric, "Target");
    assert_eq!(gap.plan_value, Some(100.0));
    assert_eq!(gap.actual_value, Some(70.0));
    assert_eq!(gap.absolute_gap, -30.0);
    assert_eq!(gap.percentage_gap, Some(-30.0));
    assert_eq!(gap.severity, Severity::Critical);
    assert_eq!(gap.direction, GapDirection::Under);
    assert_eq!(gap.source_sheet, "Budget");

    assert_eq!(analyzer.plans().len(), 1);
    assert_eq!(analyzer.plans()[0].id, "plan-0001");
    assert_eq!(analyzer.plans()[0].confidence, 0.8);
    assert_eq!(analyzer.actuals()[0].id, "act-0001");
    assert_eq!(analyzer.actuals()[0].source_sheet, "Actuals");
    assert_eq!(gap.plan_id.as_deref(), Some("plan-0001"));
    assert_eq!(gap.actual_id.as_deref(), Some("act-0001"));
}

#[test]
fn test_gap_sign_matches_direction() {
    let (analyzer, _) = analyze(&budget_and_actuals());
    for gap in analyzer.gaps() {
        let (Some(plan), Some(actual)) = (gap.plan_value, gap.actual_value) else {
            continue;
        };
        assert_eq!(gap.absolute_gap, actual - plan);
        if gap.direction == GapDirection::Under {
            assert!(actual < plan);
        }
    }
}

fn scorecard() -> Sheet {
    Sheet::new(
        "Scorecard",
        vec![
            Column::texts("Project", &["Apollo", "Borealis", "Cygnus", "Draco"]),
            Column::numbers("Target", &[20.0, 30.0, 40.0, 50.0]),
            Column::numbers("Actual", &[10.0, 30.0, 50.0, 70.0]),
        ],
    )
}

#[test]
fn test_correlated_columns_form_a_pair() {
    let (analyzer, detector) = analyze(&[scorecard()]);

    let pairs = analyzer.column_pairs();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].plan_column, "Target");
    assert_eq!(pairs[0].actual_column, "Actual");
    assert_eq!(pairs[0].sheet, "Scorecard");
    assert!((pairs[0].correlation - 1.0).abs() < 1e-9);

    let gaps = analyzer.gaps();
    assert_eq!(gaps.len(), 4);
    let subjects: Vec<&str> = gaps.iter().map(|g| g.subject.as_str()).collect();
    assert_eq!(subjects, ["Apollo", "Borealis", "Cygnus", "Draco"]);

    assert_eq!(gaps[0].percentage_gap, Some(-50.0));
    assert_eq!(gaps[0].direction, GapDirection::Under);
    assert_eq!(gaps[1].direction, GapDirection::OnTarget);
    assert_eq!(gaps[1].severity, Severity::Normal);
    assert_eq!(gaps[2].percentage_gap, Some(25.0));
    assert_eq!(gaps[2].direction, GapDirection::Over);
    assert_eq!(gaps[3].percentage_gap, Some(40.0));

    assert_eq!(analyzer.critical_gaps().len(), 3);
    let project = detector.entity_for_column("Scorecard", "Project").unwrap();
    assert_eq!(analyzer.gaps_for_entity(&project.id).len(), 4);
}

#[test]
fn test_difference_column_gaps() {
    let sheet = Sheet::new(
        "Variance",
        vec![
            Column::texts("Region", &["North", "North", "North", "South", "South", "South"]),
            Column::numbers("Delta", &[-12.5, 8.25, -3.75, 7.5, -12.5, 8.25]),
        ],
    );
    let (analyzer, detector) = analyze(&[sheet]);
    let region = detector.entity_for_column("Variance", "Region").unwrap();

    let gaps = analyzer.gaps();
    assert_eq!(gaps.len(), 6);
    let first = &gaps[0];
    assert_eq!(first.metric, "Delta");
    assert_eq!(first.subject, "North");
    assert_eq!(first.entity_id.as_deref(), Some(region.id.as_str()));
    assert_eq!(first.plan_value, None);
    assert_eq!(first.actual_value, None);
    assert_eq!(first.percentage_gap, None);
    assert_eq!(first.absolute_gap, -12.5);
    assert_eq!(first.direction, GapDirection::Under);
    assert_eq!(first.severity, Severity::Warning);
    assert_eq!(gaps[1].direction, GapDirection::Over);
    assert_eq!(gaps[1].severity, Severity::Normal);
    assert!(analyzer.plans().is_empty());
}

#[test]
fn test_no_signal_no_gaps() {
    let sheet = Sheet::new(
        "Lonely",
        vec![
            Column::texts("Item", &["a", "b", "c"]),
            Column::numbers("Count", &[1.0, 2.0, 3.0]),
        ],
    );
    let (analyzer, _) = analyze(&[sheet]);
    assert!(analyzer.gaps().is_empty());
    assert!(analyzer.column_pairs().is_empty());
    assert!(analyzer.critical_gaps().is_empty());
}

#[test]
fn test_rerun_resets_state() {
    let sheets = budget_and_actuals();
    let classifier = SheetClassifier::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    let profiles = classifier.classify_all(&sheets);
    let mut detector = EntityDetector::default();
    detector.detect(&sheets, &profiles);
    let mut analyzer = GapAnalyzer::new();
    analyzer.analyze(&sheets, &profiles, &detector);
    analyzer.analyze(&sheets, &profiles, &detector);
    assert_eq!(analyzer.gaps().len(), 1);
    assert_eq!(analyzer.gaps()[0].id, "gap-0001");
}
