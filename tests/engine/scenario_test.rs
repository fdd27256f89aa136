//! End-to-end scenarios through the full pipeline.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use decision_lens::cache::AnalysisStore;
use decision_lens::ontology::{DecisionType, GapDirection, Severity, SheetRole, ThemeType};
use decision_lens::{AnalysisResult, DecisionIntelligenceEngine, EngineConfig, Workbook};

const BUDGET_VS_ACTUALS: &str = r#"{"sheets": [
    {"name": "Budget", "columns": [
        {"name": "Region", "values": ["North", "South"]},
        {"name": "Target", "values": [100, 120]}
    ]},
    {"name": "Actuals", "columns": [
        {"name": "Region", "values": ["North", "East"]},
        {"name": "Actual", "values": [70, 90]}
    ]}
]}"#;

fn engine() -> DecisionIntelligenceEngine {
    let reference = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    DecisionIntelligenceEngine::new(EngineConfig::default().with_reference_date(reference))
}

fn projects(odd_status: &str) -> Workbook {
    portfolio(20, &[4, 11], odd_status)
}

fn portfolio(rows: usize, odd: &[usize], odd_status: &str) -> Workbook {
    let names: Vec<String> = (1..=rows).map(|i| format!("\"Project {:02}\"", i)).collect();
    let regions = ["North", "South", "East", "West", "Central"];
    let region: Vec<String> = (0..rows).map(|i| format!("\"{}\"", regions[i % 5])).collect();
    let status: Vec<String> = (0..rows)
        .map(|i| {
            let s = if odd.contains(&i) { odd_status } else { "Active" };
            format!("\"{}\"", s)
        })
        .collect();
    let json = format!(
        r#"{{"sheets": [{{"name": "Projects", "columns": [
            {{"name": "Project", "values": [{}]}},
            {{"name": "Region", "values": [{}]}},
            {{"name": "Status", "values": [{}]}}
        ]}}]}}"#,
        names.join(","),
        region.join(","),
        status.join(",")
    );
    Workbook::from_json_str(&json).unwrap()
}

fn note_bodies(result: &AnalysisResult) -> Vec<&str> {
    result
        .processing_notes
        .iter()
        .map(|n| n.split_once("] ").map_or(n.as_str(), |(_, body)| body))
        .collect()
}

#[test]
fn test_budget_against_actuals() {
    let workbook = Workbook::from_json_str(BUDGET_VS_ACTUALS).unwrap();
    let result = engine().analyze(&workbook, "q3-review");

    assert_eq!(result.dataset_id, "q3-review");
    assert_eq!(result.sheet_count, 2);
    assert_eq!(result.sheet_roles["Budget"], SheetRole::Plan);
    assert_eq!(result.sheet_roles["Actuals"], SheetRole::Actual);

    let region = result
        .entities
        .iter()
        .find(|e| e.canonical_name == "Region")
        .unwrap();
    assert_eq!(region.source_sheets, ["Budget", "Actuals"]);

    assert_eq!(result.gap_count, 1);
    assert_eq!(result.critical_gaps, 1);
    let gap = &result.gaps[0];
    assert_eq!(gap.subject, "North");
    assert_eq!(gap.entity_id.as_deref(), Some(region.id.as_str()));
    assert_eq!(gap.percentage_gap, Some(-30.0));
    assert_eq!(gap.severity, Severity::Critical);
    assert_eq!(gap.direction, GapDirection::Under);

    let types: Vec<DecisionType> = result.decisions.iter().map(|d| d.decision_type).collect();
    assert_eq!(
        types,
        [DecisionType::InvestigateSystemic, DecisionType::Investigate]
    );
    assert!((result.decisions[0].composite_score - 0.81).abs() < 1e-9);
    assert!((result.decisions[1].composite_score - 0.522).abs() < 1e-9);
    assert_eq!(result.decisions[1].affected_entities, [region.id.clone()]);
    assert_eq!(result.decisions[1].supporting_gaps, ["gap-0001"]);
    assert_eq!(
        result.top_decision_summary,
        "Systemic underperformance pattern detected; Underperformance detected: 1 critical gaps"
    );

    // Both decisions mention the Target metric.
    assert_eq!(result.themes.len(), 1);
    assert_eq!(result.themes[0].theme_type, ThemeType::Metric);
    assert_eq!(result.themes[0].name, "Target");
    assert_eq!(result.grouping_summary.total_decisions, 2);
}

#[test]
fn test_references_resolve() {
    let workbook = Workbook::from_json_str(BUDGET_VS_ACTUALS).unwrap();
    let result = engine().analyze(&workbook, "q3-review");

    for decision in &result.decisions {
        for id in &decision.supporting_gaps {
            assert!(result.gaps.iter().any(|g| &g.id == id));
        }
        for id in &decision.affected_entities {
            assert!(result.entities.iter().any(|e| &e.id == id));
        }
    }
    for theme in &result.themes {
        for id in &theme.decision_ids {
            assert!(result.decision(id).is_some());
        }
    }
    for (node, neighbors) in &result.entity_graph {
        for n in neighbors {
            assert!(result.entity_graph[n].contains(node));
        }
    }
}

#[test]
fn test_dependency_statuses_sequence() {
    let result = engine().analyze(&projects("Blocked"), "portfolio");

    assert_eq!(result.gap_count, 0);
    assert_eq!(result.constraint_count, 2);
    assert_eq!(result.blocking_constraints, 2);

    let summaries: Vec<&str> = result.decisions.iter().map(|d| d.summary.as_str()).collect();
    assert_eq!(
        summaries,
        [
            "Dependency constraint needs sequencing for Project 05",
            "Dependency constraint needs sequencing for Project 12",
        ]
    );
    for decision in &result.decisions {
        assert_eq!(decision.decision_type, DecisionType::Sequence);
        assert!((decision.composite_score - 0.64).abs() < 1e-9);
    }

    assert_eq!(result.themes.len(), 1);
    assert_eq!(result.themes[0].name, "Dependency Management");
}

#[test]
fn test_sequence_decisions_cite_their_own_constraint() {
    let result = engine().analyze(&projects("Blocked"), "portfolio");
    assert_eq!(result.decisions.len(), 2);
    for decision in &result.decisions {
        assert_eq!(decision.supporting_constraints.len(), 1);
        let constraint = result
            .constraints
            .iter()
            .find(|c| c.id == decision.supporting_constraints[0])
            .unwrap();
        assert_eq!(decision.subjects, [constraint.subject.clone().unwrap()]);
        assert!(decision.summary.ends_with(constraint.subject.as_deref().unwrap()));
    }
}

#[test]
fn test_uncommon_negated_statuses_sequence() {
    let result = engine().analyze(&projects("Not started"), "portfolio");
    assert_eq!(result.decisions.len(), 2);
    assert!(result
        .decisions
        .iter()
        .all(|d| d.decision_type == DecisionType::Sequence));
}

#[test]
fn test_rare_negated_status_resolves() {
    let result = engine().analyze(&portfolio(25, &[4], "Not started"), "portfolio");
    assert_eq!(result.decisions.len(), 1);
    assert_eq!(result.decisions[0].decision_type, DecisionType::Resolve);
    assert_eq!(
        result.decisions[0].summary,
        "Blocking issue requires resolution for Project 05"
    );
}

#[test]
fn test_in_progress_statuses_need_no_decision() {
    let result = engine().analyze(&projects("In progress"), "portfolio");
    assert_eq!(result.constraint_count, 2);
    assert_eq!(result.blocking_constraints, 0);
    assert!(result.decisions.is_empty());
}

#[test]
fn test_analysis_is_deterministic() {
    let workbook = Workbook::from_json_str(BUDGET_VS_ACTUALS).unwrap();
    let first = engine().analyze(&workbook, "q3-review");
    let second = engine().analyze(&workbook, "q3-review");

    assert_eq!(first.entities, second.entities);
    assert_eq!(first.gaps, second.gaps);
    assert_eq!(first.decisions, second.decisions);
    assert_eq!(first.themes, second.themes);
    assert_eq!(first.metadata, second.metadata);
    assert_eq!(note_bodies(&first), note_bodies(&second));
}

#[test]
fn test_theme_grouping_can_be_disabled() {
    let workbook = Workbook::from_json_str(BUDGET_VS_ACTUALS).unwrap();
    let engine = DecisionIntelligenceEngine::new(
        engine().config().clone().with_theme_grouping(false),
    );
    let result = engine.analyze(&workbook, "q3-review");
    assert_eq!(result.decision_count, 2);
    assert!(result.themes.is_empty());
    assert_eq!(result.grouping_summary.total_themes, 0);
}

#[test]
fn test_notes_describe_the_run() {
    let workbook = Workbook::from_json_str(BUDGET_VS_ACTUALS).unwrap();
    let result = engine().analyze(&workbook, "q3-review");
    let notes = note_bodies(&result);

    assert_eq!(notes[0], "Starting analysis of 2 sheets");
    assert!(notes.contains(&"  Sheet 'Budget': PLAN (confidence: 0.50)"));
    assert!(notes.contains(&"  Found 1 gaps (1 critical)"));
    assert_eq!(
        notes.last().copied(),
        Some("Analysis complete. Found 2 decision candidates.")
    );
    assert!(result.processing_notes[0].starts_with('['));
}

#[test]
fn test_result_serializes() {
    let workbook = Workbook::from_json_str(BUDGET_VS_ACTUALS).unwrap();
    let result = engine().analyze(&workbook, "q3-review");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["dataset_id"], "q3-review");
    assert_eq!(json["sheet_roles"]["Budget"], "PLAN");
    assert_eq!(json["gaps"][0]["direction"], "under");
    assert_eq!(json["decisions"][0]["decision_type"], "investigate_systemic");
    assert_eq!(json["metadata"]["global_dimensions"], serde_json::json!([]));
}

#[test]
fn test_cached_analysis() {
    let workbook = Workbook::from_json_str(BUDGET_VS_ACTUALS).unwrap();
    let engine = engine();
    let mut store = AnalysisStore::new();

    let first = engine.analyze_cached(&workbook, "q3-review", &mut store);
    let second = engine.analyze_cached(&workbook, "q3-review", &mut store);
    assert_eq!(store.len(), 1);
    assert_eq!(first.analyzed_at, second.analyzed_at);
    assert_eq!(first.processing_notes, second.processing_notes);

    let strict = DecisionIntelligenceEngine::new(engine.config().clone().with_max_supporting(1));
    strict.analyze_cached(&workbook, "q3-review", &mut store);
    assert_eq!(store.len(), 2);

    assert_eq!(store.invalidate("q3-review"), 2);
    assert!(store.is_empty());
}

struct BufWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for BufWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn init_logger(buf: Arc<Mutex<Vec<u8>>>) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || BufWriter { buf: buf.clone() })
        .with_ansi(false)
        .with_target(false)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

#[test]
fn test_steps_are_logged() {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let _guard = init_logger(buf.clone());

    let workbook = Workbook::from_json_str(
        r#"{"sheets": [
            {"name": "Blank", "columns": [{"name": "Unnamed: 0", "values": [null]}]},
            {"name": "Budget", "columns": [
                {"name": "Region", "values": ["North", "South"]},
                {"name": "Target", "values": [100, 120]}
            ]}
        ]}"#,
    )
    .unwrap();
    engine().analyze(&workbook, "logged");

    let contents = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    assert!(contents.contains("Step 6: Analyzing gaps..."), "log missing: {contents}");
    assert!(contents.contains("sheet skipped: no usable data"), "log missing: {contents}");
    assert!(contents.contains("WARN"), "log missing: {contents}");
}
