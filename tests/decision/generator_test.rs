//! Integration tests for decision generation and ranking.

use std::collections::BTreeMap;

use decision_lens::analysis::{direction_for, percentage_gap, severity_for};
use decision_lens::decision::{DecisionGenerator, NO_DECISIONS_SUMMARY};
use decision_lens::graph::{Relationship, RelationshipGraph, RelationshipType};
use decision_lens::ontology::{
    ActionType, Constraint, ConstraintSeverity, ConstraintType, DecisionContext, DecisionType,
    Entity, Evidence, Gap, Severity, SourceColumn,
};

fn gap(id: &str, entity: Option<&str>, subject: &str, plan: f64, actual: f64) -> Gap {
    let pct = percentage_gap(plan, actual);
    Gap {
        id: id.to_string(),
        entity_id: entity.map(str::to_string),
        subject: subject.to_string(),
        metric: "Revenue".to_string(),
        plan_value: Some(plan),
        actual_value: Some(actual),
        absolute_gap: actual - plan,
        percentage_gap: Some(pct),
        direction: direction_for(plan, actual, pct),
        severity: severity_for(pct),
        source_sheet: "Budget".to_string(),
        plan_id: None,
        actual_id: None,
    }
}

fn constraint(id: &str, subject: &str, constraint_type: ConstraintType) -> Constraint {
    Constraint {
        id: id.to_string(),
        entity_id: None,
        subject: Some(subject.to_string()),
        constraint_type,
        description: format!("Status indicates {}", constraint_type),
        source_text: constraint_type.as_str().to_string(),
        source_sheet: "Projects".to_string(),
        source_column: "Status".to_string(),
        row: 0,
        severity: ConstraintSeverity::from(constraint_type),
        confidence: 0.6,
        extracted_values: BTreeMap::new(),
    }
}

fn entity(id: &str, name: &str) -> Entity {
    Entity {
        id: id.to_string(),
        canonical_name: name.to_string(),
        source_columns: vec![SourceColumn::new("Sheet", name)],
        source_sheets: vec!["Sheet".to_string()],
        cardinality: 4,
        is_primary: true,
        related_entities: Vec::new(),
    }
}

fn generate(context: &DecisionContext) -> Vec<decision_lens::ontology::Decision> {
    DecisionGenerator::default()
        .generate(context, &RelationshipGraph::new())
        .to_vec()
}

#[test]
fn test_warning_gaps_are_monitored() {
    let context = DecisionContext {
        gaps: vec![gap("gap-0001", None, "North", 100.0, 90.0)],
        ..Default::default()
    };
    let decisions = generate(&context);
    let types: Vec<DecisionType> = decisions.iter().map(|d| d.decision_type).collect();
    assert_eq!(
        types,
        vec![DecisionType::InvestigateSystemic, DecisionType::Monitor]
    );

    let monitor = &decisions[1];
    assert_eq!(monitor.summary, "Potential issues: 1 metrics trending off-target");
    assert!((monitor.composite_score - 0.45).abs() < 1e-12);
    assert_eq!(monitor.actions[0].action_type, ActionType::Monitor);
    assert_eq!(monitor.actions[0].target.as_deref(), Some("North"));
    assert_eq!(monitor.rank, 2);
}

#[test]
fn test_overperformance_verifies_targets() {
    let context = DecisionContext {
        gaps: vec![
            gap("gap-0001", None, "North", 100.0, 140.0),
            gap("gap-0002", None, "South", 100.0, 101.0),
        ],
        ..Default::default()
    };
    let decisions = generate(&context);

    let investigate = decisions
        .iter()
        .find(|d| d.decision_type == DecisionType::Investigate)
        .unwrap();
    assert_eq!(
        investigate.summary,
        "Overperformance detected: 1 critical gaps (verify targets)"
    );
    assert_eq!(investigate.actions[0].action_type, ActionType::Optimize);

    let verify = decisions
        .iter()
        .find(|d| d.decision_type == DecisionType::VerifyTargets)
        .unwrap();
    assert_eq!(verify.reasoning, "100% of tracked metrics exceed targets - targets may be too conservative");
    assert!(matches!(
        verify.evidence[0],
        Evidence::Pattern { total_gaps: 2, .. }
    ));
}

#[test]
fn test_constraints_grouped_by_subject() {
    let context = DecisionContext {
        constraints: vec![
            constraint("con-0001", "Project 05", ConstraintType::Dependency),
            constraint("con-0002", "Project 12", ConstraintType::Blocking),
            constraint("con-0003", "Project 05", ConstraintType::Deadline),
            constraint("con-0004", "Project 07", ConstraintType::Resource),
        ],
        ..Default::default()
    };
    let decisions = generate(&context);
    let summaries: Vec<&str> = decisions.iter().map(|d| d.summary.as_str()).collect();
    assert_eq!(
        summaries,
        vec![
            "Deadline constraint detected for Project 05",
            "Blocking issue requires resolution for Project 12",
            "Resource constraints detected across 1 items",
        ]
    );

    let escalate = &decisions[0];
    assert_eq!(escalate.decision_type, DecisionType::Escalate);
    assert_eq!(escalate.urgency_score, 0.95);
    assert_eq!(escalate.evidence.len(), 2);
    assert_eq!(escalate.subjects, vec!["Project 05".to_string()]);
    assert_eq!(
        escalate.reasoning,
        "Detected 2 constraint(s) of type(s): deadline, dependency. These constraints may limit \
         execution or require resolution before proceeding."
    );
    assert_eq!(decisions[1].decision_type, DecisionType::Resolve);
    assert_eq!(decisions[2].decision_type, DecisionType::Allocate);
    assert_eq!(decisions[2].actions[0].action_type, ActionType::Reallocate);
}

#[test]
fn test_connected_entity_cascades() {
    let hub = "ent_000000000001";
    let neighbors = ["ent_000000000002", "ent_000000000003", "ent_000000000004"];
    let mut entities = vec![entity(hub, "Region")];
    entities.extend(
        neighbors
            .iter()
            .zip(["Store", "Manager", "Channel"])
            .map(|(id, name)| entity(id, name)),
    );
    let mut graph = RelationshipGraph::new();
    for n in neighbors {
        graph.add_relationship(Relationship::new(hub, n, RelationshipType::CoOccurs, 1.0));
    }
    let context = DecisionContext {
        entities,
        gaps: vec![gap("gap-0001", Some(hub), "North", 100.0, 70.0)],
        ..Default::default()
    };

    let decisions = DecisionGenerator::default()
        .generate(&context, &graph)
        .to_vec();
    let types: Vec<DecisionType> = decisions.iter().map(|d| d.decision_type).collect();
    assert_eq!(
        types,
        vec![
            DecisionType::InvestigateSystemic,
            DecisionType::Prioritize,
            DecisionType::Investigate,
        ]
    );

    let prioritize = &decisions[1];
    assert_eq!(
        prioritize.summary,
        "High-impact entity 'Region' affects 3 related items"
    );
    assert_eq!(prioritize.affected_entities.len(), 4);
    assert_eq!(prioritize.affected_entities[0], hub);
    assert!((prioritize.impact_score - 0.3).abs() < 1e-12);
    assert!(matches!(
        &prioritize.evidence[0],
        Evidence::Relationship { related_count: 3, severity: Severity::Critical, .. }
    ));
    assert_eq!(prioritize.supporting_gaps, vec!["gap-0001".to_string()]);
}

#[test]
fn test_supporting_ids_are_capped() {
    let gaps: Vec<Gap> = (1..=12)
        .map(|i| gap(&format!("gap-{:04}", i), Some("ent_a"), "North", 100.0, 50.0))
        .collect();
    let context = DecisionContext {
        gaps,
        ..Default::default()
    };
    let decisions = DecisionGenerator::new(5)
        .generate(&context, &RelationshipGraph::new())
        .to_vec();
    let investigate = decisions
        .iter()
        .find(|d| d.decision_type == DecisionType::Investigate)
        .unwrap();
    assert_eq!(investigate.summary, "Underperformance detected: 12 critical gaps");
    assert_eq!(investigate.supporting_gaps.len(), 5);
    assert_eq!(investigate.supporting_gaps[0], "gap-0001");
    assert!((investigate.impact_score - 0.6).abs() < 1e-12);
}

#[test]
fn test_gaps_grouped_per_row() {
    let region = Some("ent_region");
    let context = DecisionContext {
        gaps: vec![
            gap("gap-0001", region, "North", 100.0, 70.0),
            gap("gap-0002", region, "South", 100.0, 94.0),
            gap("gap-0003", region, "East", 90.0, 93.0),
            gap("gap-0004", region, "West", 100.0, 92.0),
        ],
        ..Default::default()
    };
    let decisions = generate(&context);

    let rows: Vec<(DecisionType, Option<&str>, Vec<&str>)> = decisions
        .iter()
        .map(|d| {
            (
                d.decision_type,
                d.actions[0].target.as_deref(),
                d.supporting_gaps.iter().map(String::as_str).collect(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            (
                DecisionType::InvestigateSystemic,
                None,
                vec!["gap-0001", "gap-0002", "gap-0004"]
            ),
            (DecisionType::Investigate, Some("North"), vec!["gap-0001"]),
            (DecisionType::Monitor, Some("South"), vec!["gap-0002"]),
            (DecisionType::Monitor, Some("West"), vec!["gap-0004"]),
        ]
    );
    assert_eq!(decisions[1].summary, "Underperformance detected: 1 critical gaps");
    assert_eq!(decisions[1].affected_entities, vec!["ent_region".to_string()]);
    assert_eq!(decisions[1].subjects, vec!["North".to_string()]);
    assert_ne!(decisions[2].id, decisions[3].id);
}

#[test]
fn test_supporting_constraints_follow_subject() {
    let context = DecisionContext {
        gaps: vec![gap("gap-0001", None, "North", 100.0, 70.0)],
        constraints: vec![
            constraint("con-0001", "North", ConstraintType::Dependency),
            constraint("con-0002", "South", ConstraintType::Dependency),
        ],
        ..Default::default()
    };
    let decisions = generate(&context);
    let find = |summary: &str| decisions.iter().find(|d| d.summary == summary).unwrap();

    let investigate = find("Underperformance detected: 1 critical gaps");
    assert_eq!(investigate.supporting_constraints, vec!["con-0001".to_string()]);

    let north = find("Dependency constraint needs sequencing for North");
    assert_eq!(north.supporting_constraints, vec!["con-0001".to_string()]);
    assert_eq!(north.supporting_gaps, vec!["gap-0001".to_string()]);

    let south = find("Dependency constraint needs sequencing for South");
    assert_eq!(south.supporting_constraints, vec!["con-0002".to_string()]);
    assert!(south.supporting_gaps.is_empty());
}

#[test]
fn test_hub_entity_prioritized_once() {
    let hub = "ent_000000000001";
    let neighbors = ["ent_000000000002", "ent_000000000003", "ent_000000000004"];
    let mut entities = vec![entity(hub, "Region")];
    entities.extend(
        neighbors
            .iter()
            .zip(["Store", "Manager", "Channel"])
            .map(|(id, name)| entity(id, name)),
    );
    let mut graph = RelationshipGraph::new();
    for n in neighbors {
        graph.add_relationship(Relationship::new(hub, n, RelationshipType::CoOccurs, 1.0));
    }
    let context = DecisionContext {
        entities,
        gaps: vec![
            gap("gap-0001", Some(hub), "North", 100.0, 70.0),
            gap("gap-0002", Some(hub), "South", 100.0, 60.0),
        ],
        ..Default::default()
    };

    let decisions = DecisionGenerator::default()
        .generate(&context, &graph)
        .to_vec();
    let prioritize: Vec<_> = decisions
        .iter()
        .filter(|d| d.decision_type == DecisionType::Prioritize)
        .collect();
    assert_eq!(prioritize.len(), 1);
    assert_eq!(
        prioritize[0].supporting_gaps,
        vec!["gap-0001".to_string(), "gap-0002".to_string()]
    );
    assert_eq!(
        prioritize[0].subjects,
        vec!["North".to_string(), "South".to_string()]
    );
    let investigations = decisions
        .iter()
        .filter(|d| d.decision_type == DecisionType::Investigate)
        .count();
    assert_eq!(investigations, 2);
}

#[test]
fn test_ranking_is_ordered_and_deterministic() {
    let context = DecisionContext {
        gaps: vec![
            gap("gap-0001", None, "North", 100.0, 70.0),
            gap("gap-0002", None, "South", 100.0, 92.0),
        ],
        constraints: vec![constraint("con-0001", "Project 05", ConstraintType::Blocking)],
        ..Default::default()
    };
    let first = generate(&context);
    let second = generate(&context);
    assert_eq!(first, second);

    for (i, d) in first.iter().enumerate() {
        assert_eq!(d.rank, i + 1);
        assert!(d.id.starts_with("dec_"));
        let expected = 0.4 * d.impact_score + 0.3 * d.urgency_score + 0.3 * d.confidence_score;
        assert!((d.composite_score - expected).abs() < 1e-12);
    }
    for pair in first.windows(2) {
        assert!(pair[0].composite_score >= pair[1].composite_score);
    }
}

#[test]
fn test_top_summary() {
    let mut generator = DecisionGenerator::default();
    assert_eq!(generator.top_summary(3), NO_DECISIONS_SUMMARY);

    let context = DecisionContext {
        gaps: vec![gap("gap-0001", None, "North", 100.0, 70.0)],
        ..Default::default()
    };
    generator.generate(&context, &RelationshipGraph::new());
    assert_eq!(
        generator.top_summary(3),
        "Systemic underperformance pattern detected; Underperformance detected: 1 critical gaps"
    );
    assert_eq!(generator.actions().len(), generator.decisions().len());
}
