//! Decision candidate generation and ranking.
//!
//! Four strategies each look at one kind of signal and propose candidates:
//! gaps per row instance, blocking and resource constraints, the overall
//! direction of all gaps, and critical gaps on well-connected entities.
//! Candidates are ranked by a weighted composite of impact, urgency and
//! confidence.

use std::collections::BTreeSet;

use tracing::debug;

use crate::cache::short_id;
use crate::graph::RelationshipGraph;
use crate::ontology::{
    Action, ActionType, Constraint, ConstraintType, Decision, DecisionContext, DecisionType,
    EntityId, Evidence, Gap, GapDirection, Severity,
};

/// Scores attached to each strategy's candidates.
pub mod scores {
    /// (impact, urgency, confidence) of a warning-only monitor decision.
    pub const MONITOR: (f64, f64, f64) = (0.3, 0.4, 0.7);
    pub const CRITICAL_URGENCY: f64 = 0.9;
    pub const CRITICAL_CONFIDENCE: f64 = 0.8;
    /// Absolute gap total that saturates critical-gap impact.
    pub const IMPACT_SCALE: f64 = 1000.0;

    pub const CONSTRAINT_IMPACT: f64 = 0.7;
    pub const CONSTRAINT_CONFIDENCE: f64 = 0.6;
    pub const DEADLINE_URGENCY: f64 = 0.95;
    pub const BLOCKING_URGENCY: f64 = 0.85;
    pub const DEPENDENCY_URGENCY: f64 = 0.6;
    pub const ALLOCATE: (f64, f64, f64) = (0.5, 0.5, 0.65);

    /// Share of under-target gaps above which underperformance is systemic.
    pub const SYSTEMIC_UNDER_SHARE: f64 = 0.7;
    /// Share of under-target gaps below which targets look too easy.
    pub const SYSTEMIC_OVER_SHARE: f64 = 0.3;
    pub const SYSTEMIC: (f64, f64, f64) = (0.9, 0.8, 0.7);
    pub const VERIFY_TARGETS: (f64, f64, f64) = (0.5, 0.3, 0.6);

    /// Neighbor count above which an entity's critical gap cascades.
    pub const CASCADE_MIN_NEIGHBORS: usize = 2;
    pub const CASCADE_URGENCY: f64 = 0.85;
    pub const CASCADE_CONFIDENCE: f64 = 0.75;
    /// Neighbors listed as affected besides the entity itself.
    pub const CASCADE_AFFECTED: usize = 5;
}

/// Default cap on supporting gaps and constraints per decision.
pub const DEFAULT_MAX_SUPPORTING: usize = 10;

/// Shown when no candidate was produced.
pub const NO_DECISIONS_SUMMARY: &str = "No significant decision candidates identified";

struct ActionDraft {
    action_type: ActionType,
    target: Option<String>,
    metric: Option<String>,
    estimated_impact: f64,
}

struct Candidate {
    decision_type: DecisionType,
    summary: String,
    reasoning: String,
    evidence: Vec<Evidence>,
    affected_entities: Vec<EntityId>,
    subjects: Vec<String>,
    action: ActionDraft,
    /// Gap and constraint ids cited by the decision, most relevant first.
    gap_ids: Vec<String>,
    constraint_ids: Vec<String>,
    impact: f64,
    urgency: f64,
    confidence: f64,
}

impl Candidate {
    fn composite(&self) -> f64 {
        Decision::composite(self.impact, self.urgency, self.confidence)
    }
}

/// Turns a populated [`DecisionContext`] into ranked decisions.
#[derive(Debug, Clone)]
pub struct DecisionGenerator {
    max_supporting: usize,
    decisions: Vec<Decision>,
    actions: Vec<Action>,
}

impl Default for DecisionGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUPPORTING)
    }
}

impl DecisionGenerator {
    pub fn new(max_supporting: usize) -> Self {
        Self {
            max_supporting,
            decisions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Generate, score and rank decisions.
    pub fn generate(&mut self, context: &DecisionContext, graph: &RelationshipGraph) -> &[Decision] {
        let mut candidates = Vec::new();
        candidates.extend(gap_candidates(context));
        candidates.extend(constraint_candidates(context));
        candidates.extend(pattern_candidates(context));
        candidates.extend(relationship_candidates(context, graph));

        // Stable: equal scores keep strategy order.
        candidates.sort_by(|a, b| b.composite().total_cmp(&a.composite()));
        debug!(candidates = candidates.len(), "decision candidates ranked");

        self.decisions.clear();
        self.actions.clear();
        for (i, candidate) in candidates.into_iter().enumerate() {
            let decision = self.build_decision(candidate, i + 1);
            self.decisions.push(decision);
        }
        &self.decisions
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Every action of every decision, in ranking order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn by_type(&self, decision_type: DecisionType) -> Vec<&Decision> {
        self.decisions
            .iter()
            .filter(|d| d.decision_type == decision_type)
            .collect()
    }

    /// First `n` summaries joined with `"; "`.
    pub fn top_summary(&self, n: usize) -> String {
        top_summary(&self.decisions, n)
    }

    pub fn into_parts(self) -> (Vec<Decision>, Vec<Action>) {
        (self.decisions, self.actions)
    }

    fn build_decision(&mut self, candidate: Candidate, rank: usize) -> Decision {
        let composite_score = candidate.composite();
        let action = Action {
            id: format!("action-{:04}", self.actions.len() + 1),
            action_type: candidate.action.action_type,
            description: format!(
                "{} for {}",
                candidate.action.action_type,
                candidate.action.target.as_deref().unwrap_or("target")
            ),
            target: candidate.action.target,
            metric: candidate.action.metric,
            estimated_impact: candidate.action.estimated_impact,
            confidence: candidate.confidence,
        };
        self.actions.push(action.clone());

        let mut supporting_gaps = candidate.gap_ids;
        supporting_gaps.truncate(self.max_supporting);
        let mut supporting_constraints = candidate.constraint_ids;
        supporting_constraints.truncate(self.max_supporting);

        let keys: BTreeSet<&str> = candidate
            .affected_entities
            .iter()
            .chain(&candidate.subjects)
            .map(String::as_str)
            .collect();
        let keys: Vec<String> = keys.into_iter().map(str::to_string).collect();
        let mut parts = vec![
            candidate.decision_type.as_str().to_string(),
            candidate.summary.clone(),
        ];
        parts.extend(keys);
        parts.push(rank.to_string());

        Decision {
            id: short_id("dec", &parts, 12),
            decision_type: candidate.decision_type,
            summary: candidate.summary,
            reasoning: candidate.reasoning,
            actions: vec![action],
            affected_entities: candidate.affected_entities,
            subjects: candidate.subjects,
            supporting_gaps,
            supporting_constraints,
            impact_score: candidate.impact,
            confidence_score: candidate.confidence,
            urgency_score: candidate.urgency,
            composite_score,
            rank,
            evidence: candidate.evidence,
        }
    }
}

/// First `n` decision summaries joined with `"; "`, or a fixed sentence.
pub fn top_summary(decisions: &[Decision], n: usize) -> String {
    if decisions.is_empty() {
        return NO_DECISIONS_SUMMARY.to_string();
    }
    decisions
        .iter()
        .take(n)
        .map(|d| d.summary.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// ----------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------

fn gap_candidates(context: &DecisionContext) -> Vec<Candidate> {
    // One candidate per row instance: the entity plus the row's subject.
    let mut rows: Vec<(Option<&str>, &str)> = Vec::new();
    for gap in &context.gaps {
        let key = (gap.entity_id.as_deref(), gap.subject.as_str());
        if !rows.contains(&key) {
            rows.push(key);
        }
    }

    let mut out = Vec::new();
    for (entity_id, subject) in rows {
        let gaps: Vec<&Gap> = context
            .gaps
            .iter()
            .filter(|g| g.entity_id.as_deref() == entity_id && g.subject == subject)
            .collect();
        let critical: Vec<&Gap> = gaps
            .iter()
            .copied()
            .filter(|g| g.severity == Severity::Critical)
            .collect();
        let warning: Vec<&Gap> = gaps
            .iter()
            .copied()
            .filter(|g| g.severity == Severity::Warning)
            .collect();
        let affected: Vec<EntityId> = entity_id.map(str::to_string).into_iter().collect();
        let subjects = vec![subject.to_string()];
        let constraint_ids = constraints_for(context, &affected, &subjects);

        if !critical.is_empty() {
            let under = critical.iter().filter(|g| g.direction == GapDirection::Under).count();
            let over = critical.iter().filter(|g| g.direction == GapDirection::Over).count();
            let (summary, action_type) = if under > over {
                (
                    format!("Underperformance detected: {} critical gaps", critical.len()),
                    ActionType::Increase,
                )
            } else {
                (
                    format!(
                        "Overperformance detected: {} critical gaps (verify targets)",
                        critical.len()
                    ),
                    ActionType::Optimize,
                )
            };
            let total: f64 = critical.iter().map(|g| g.absolute_gap.abs()).sum();
            out.push(Candidate {
                decision_type: DecisionType::Investigate,
                summary,
                reasoning: gap_reasoning(&critical),
                evidence: critical.iter().map(|g| gap_evidence(g, context)).collect(),
                affected_entities: affected,
                subjects,
                action: ActionDraft {
                    action_type,
                    target: Some(subject.to_string()),
                    metric: first_metric(&critical),
                    estimated_impact: total,
                },
                gap_ids: ids_of(&critical),
                constraint_ids,
                impact: (total / scores::IMPACT_SCALE).min(1.0),
                urgency: scores::CRITICAL_URGENCY,
                confidence: scores::CRITICAL_CONFIDENCE,
            });
        } else if !warning.is_empty() {
            let (impact, urgency, confidence) = scores::MONITOR;
            out.push(Candidate {
                decision_type: DecisionType::Monitor,
                summary: format!(
                    "Potential issues: {} metrics trending off-target",
                    warning.len()
                ),
                reasoning: gap_reasoning(&warning),
                evidence: warning.iter().map(|g| gap_evidence(g, context)).collect(),
                affected_entities: affected,
                subjects,
                action: ActionDraft {
                    action_type: ActionType::Monitor,
                    target: Some(subject.to_string()),
                    metric: first_metric(&warning),
                    estimated_impact: 0.0,
                },
                gap_ids: ids_of(&warning),
                constraint_ids,
                impact,
                urgency,
                confidence,
            });
        }
    }
    out
}

fn constraint_candidates(context: &DecisionContext) -> Vec<Candidate> {
    let mut out = Vec::new();

    let mut keys: Vec<&str> = Vec::new();
    for c in context.constraints.iter().filter(|c| c.constraint_type.is_blocking()) {
        let key = constraint_key(c);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    for key in keys {
        let group: Vec<&Constraint> = context
            .constraints
            .iter()
            .filter(|c| c.constraint_type.is_blocking() && constraint_key(c) == key)
            .collect();
        let has = |t: ConstraintType| group.iter().any(|c| c.constraint_type == t);
        let (decision_type, summary, urgency) = if has(ConstraintType::Deadline) {
            (
                DecisionType::Escalate,
                format!("Deadline constraint detected for {}", key),
                scores::DEADLINE_URGENCY,
            )
        } else if has(ConstraintType::Blocking) {
            (
                DecisionType::Resolve,
                format!("Blocking issue requires resolution for {}", key),
                scores::BLOCKING_URGENCY,
            )
        } else {
            (
                DecisionType::Sequence,
                format!("Dependency constraint needs sequencing for {}", key),
                scores::DEPENDENCY_URGENCY,
            )
        };

        let mut affected: Vec<EntityId> = Vec::new();
        let mut subjects: Vec<String> = Vec::new();
        for c in &group {
            if let Some(id) = &c.entity_id {
                if !affected.contains(id) {
                    affected.push(id.clone());
                }
            }
            if let Some(subject) = &c.subject {
                if !subjects.contains(subject) {
                    subjects.push(subject.clone());
                }
            }
        }

        out.push(Candidate {
            decision_type,
            summary,
            reasoning: constraint_reasoning(&group),
            evidence: group.iter().map(|c| constraint_evidence(c)).collect(),
            gap_ids: gaps_for(context, &affected, &subjects),
            constraint_ids: group.iter().map(|c| c.id.clone()).collect(),
            affected_entities: affected,
            subjects,
            action: ActionDraft {
                action_type: ActionType::ResolveConstraint,
                target: Some(key.to_string()),
                metric: None,
                estimated_impact: 0.0,
            },
            impact: scores::CONSTRAINT_IMPACT,
            urgency,
            confidence: scores::CONSTRAINT_CONFIDENCE,
        });
    }

    let resource: Vec<&Constraint> = context
        .constraints
        .iter()
        .filter(|c| c.constraint_type == ConstraintType::Resource)
        .collect();
    if !resource.is_empty() {
        let mut affected: Vec<EntityId> = Vec::new();
        let mut subjects: Vec<String> = Vec::new();
        for c in &resource {
            if let Some(id) = &c.entity_id {
                if !affected.contains(id) {
                    affected.push(id.clone());
                }
            }
            if let Some(subject) = &c.subject {
                if !subjects.contains(subject) {
                    subjects.push(subject.clone());
                }
            }
        }
        let (impact, urgency, confidence) = scores::ALLOCATE;
        out.push(Candidate {
            decision_type: DecisionType::Allocate,
            summary: format!(
                "Resource constraints detected across {} items",
                resource.len()
            ),
            reasoning: constraint_reasoning(&resource),
            evidence: resource.iter().map(|c| constraint_evidence(c)).collect(),
            gap_ids: gaps_for(context, &affected, &subjects),
            constraint_ids: resource.iter().map(|c| c.id.clone()).collect(),
            affected_entities: affected,
            subjects,
            action: ActionDraft {
                action_type: ActionType::Reallocate,
                target: None,
                metric: None,
                estimated_impact: resource.len() as f64,
            },
            impact,
            urgency,
            confidence,
        });
    }
    out
}

fn pattern_candidates(context: &DecisionContext) -> Vec<Candidate> {
    let total = context.gaps.len();
    if total == 0 {
        return Vec::new();
    }
    let under = context
        .gaps
        .iter()
        .filter(|g| g.direction == GapDirection::Under)
        .count();
    let under_ratio = under as f64 / total as f64;

    if under_ratio > scores::SYSTEMIC_UNDER_SHARE {
        let under_gaps: Vec<&Gap> = context
            .gaps
            .iter()
            .filter(|g| g.direction == GapDirection::Under)
            .collect();
        let (affected, subjects) = owners_of(&under_gaps);
        let (impact, urgency, confidence) = scores::SYSTEMIC;
        vec![Candidate {
            decision_type: DecisionType::InvestigateSystemic,
            summary: "Systemic underperformance pattern detected".to_string(),
            reasoning: format!(
                "{:.0}% of tracked metrics are below target, suggesting systemic issue rather than isolated problems",
                under_ratio * 100.0
            ),
            evidence: vec![Evidence::Pattern {
                pattern: "systemic_underperformance".to_string(),
                ratio: under_ratio,
                total_gaps: total,
            }],
            gap_ids: ids_of(&under_gaps),
            constraint_ids: constraints_for(context, &affected, &subjects),
            affected_entities: affected,
            subjects,
            action: ActionDraft {
                action_type: ActionType::RootCauseAnalysis,
                target: None,
                metric: None,
                estimated_impact: 0.0,
            },
            impact,
            urgency,
            confidence,
        }]
    } else if under_ratio < scores::SYSTEMIC_OVER_SHARE {
        let over_ratio = 1.0 - under_ratio;
        let over_gaps: Vec<&Gap> = context
            .gaps
            .iter()
            .filter(|g| g.direction == GapDirection::Over)
            .collect();
        let (impact, urgency, confidence) = scores::VERIFY_TARGETS;
        vec![Candidate {
            decision_type: DecisionType::VerifyTargets,
            summary: "Widespread overperformance suggests target review needed".to_string(),
            reasoning: format!(
                "{:.0}% of tracked metrics exceed targets - targets may be too conservative",
                over_ratio * 100.0
            ),
            evidence: vec![Evidence::Pattern {
                pattern: "systemic_overperformance".to_string(),
                ratio: over_ratio,
                total_gaps: total,
            }],
            gap_ids: ids_of(&over_gaps),
            constraint_ids: Vec::new(),
            affected_entities: Vec::new(),
            subjects: Vec::new(),
            action: ActionDraft {
                action_type: ActionType::AdjustTargets,
                target: None,
                metric: None,
                estimated_impact: 0.0,
            },
            impact,
            urgency,
            confidence,
        }]
    } else {
        Vec::new()
    }
}

fn relationship_candidates(context: &DecisionContext, graph: &RelationshipGraph) -> Vec<Candidate> {
    // Critical gaps per entity, so each hub yields one candidate.
    let mut by_entity: Vec<(&str, Vec<&Gap>)> = Vec::new();
    for gap in context.gaps.iter().filter(|g| g.severity == Severity::Critical) {
        let Some(id) = gap.entity_id.as_deref() else {
            continue;
        };
        match by_entity.iter_mut().find(|(e, _)| *e == id) {
            Some((_, gaps)) => gaps.push(gap),
            None => by_entity.push((id, vec![gap])),
        }
    }

    let mut out = Vec::new();
    for (id, gaps) in by_entity {
        let Some(entity) = context.entity(id) else {
            continue;
        };
        let related: Vec<String> = graph
            .related(&entity.id)
            .into_iter()
            .filter(|id| context.entity(id).is_some())
            .collect();
        if related.len() <= scores::CASCADE_MIN_NEIGHBORS {
            continue;
        }
        let n = related.len();
        let mut affected = vec![entity.id.clone()];
        affected.extend(related.into_iter().take(scores::CASCADE_AFFECTED));
        let mut subjects: Vec<String> = Vec::new();
        for g in &gaps {
            if !subjects.contains(&g.subject) {
                subjects.push(g.subject.clone());
            }
        }
        let metrics: BTreeSet<&str> = gaps.iter().map(|g| g.metric.as_str()).collect();
        let metric = first_metric(&gaps).unwrap_or_default();
        out.push(Candidate {
            decision_type: DecisionType::Prioritize,
            summary: format!(
                "High-impact entity '{}' affects {} related items",
                entity.canonical_name, n
            ),
            reasoning: format!(
                "Gap in '{}' for entity '{}' has {} downstream dependencies",
                metrics.into_iter().collect::<Vec<_>>().join("', '"),
                entity.canonical_name,
                n
            ),
            evidence: vec![Evidence::Relationship {
                entity_id: entity.id.clone(),
                entity_name: entity.canonical_name.clone(),
                related_count: n,
                metric: metric.clone(),
                severity: Severity::Critical,
            }],
            constraint_ids: constraints_for(context, &affected[..1], &subjects),
            gap_ids: ids_of(&gaps),
            affected_entities: affected,
            subjects,
            action: ActionDraft {
                action_type: ActionType::PrioritizeFix,
                target: Some(entity.id.clone()),
                metric: Some(metric),
                estimated_impact: n as f64,
            },
            impact: (n as f64 / 10.0).min(1.0),
            urgency: scores::CASCADE_URGENCY,
            confidence: scores::CASCADE_CONFIDENCE,
        });
    }
    out
}

// ----------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------

/// Grouping key of a blocking constraint: its subject, else `global`.
fn constraint_key(c: &Constraint) -> &str {
    c.subject.as_deref().unwrap_or("global")
}

fn ids_of(gaps: &[&Gap]) -> Vec<String> {
    gaps.iter().map(|g| g.id.clone()).collect()
}

/// Whether a record owned by `(entity_id, subject)` belongs to a decision.
///
/// Subject-keyed decisions match on the row subject, and an entity on both
/// sides must agree. Decisions without subjects match on entity only.
fn owned_by(
    entity_id: Option<&str>,
    subject: Option<&str>,
    affected: &[EntityId],
    subjects: &[String],
) -> bool {
    if subjects.is_empty() {
        return entity_id.is_some_and(|id| affected.iter().any(|a| a == id));
    }
    let Some(subject) = subject else {
        return false;
    };
    subjects.iter().any(|s| s == subject)
        && match entity_id {
            Some(id) if !affected.is_empty() => affected.iter().any(|a| a == id),
            _ => true,
        }
}

fn gaps_for(context: &DecisionContext, affected: &[EntityId], subjects: &[String]) -> Vec<String> {
    context
        .gaps
        .iter()
        .filter(|g| owned_by(g.entity_id.as_deref(), Some(g.subject.as_str()), affected, subjects))
        .map(|g| g.id.clone())
        .collect()
}

fn constraints_for(
    context: &DecisionContext,
    affected: &[EntityId],
    subjects: &[String],
) -> Vec<String> {
    context
        .constraints
        .iter()
        .filter(|c| owned_by(c.entity_id.as_deref(), c.subject.as_deref(), affected, subjects))
        .map(|c| c.id.clone())
        .collect()
}

/// Distinct entity ids (first-seen), and subjects of entity-less gaps.
fn owners_of(gaps: &[&Gap]) -> (Vec<EntityId>, Vec<String>) {
    let mut entities: Vec<EntityId> = Vec::new();
    let mut subjects: Vec<String> = Vec::new();
    for g in gaps {
        match &g.entity_id {
            Some(id) if !entities.contains(id) => entities.push(id.clone()),
            Some(_) => {}
            None if !subjects.contains(&g.subject) => subjects.push(g.subject.clone()),
            None => {}
        }
    }
    (entities, subjects)
}

fn first_metric(gaps: &[&Gap]) -> Option<String> {
    gaps.iter().map(|g| g.metric.as_str()).min().map(str::to_string)
}

fn gap_evidence(gap: &Gap, context: &DecisionContext) -> Evidence {
    Evidence::Gap {
        gap_id: gap.id.clone(),
        owner: gap.owner().to_string(),
        entity_name: gap
            .entity_id
            .as_deref()
            .and_then(|id| context.entity(id))
            .map(|e| e.canonical_name.clone()),
        metric: gap.metric.clone(),
        absolute_gap: gap.absolute_gap,
        percentage_gap: gap.percentage_gap,
        direction: gap.direction,
    }
}

fn constraint_evidence(c: &Constraint) -> Evidence {
    Evidence::Constraint {
        constraint_id: c.id.clone(),
        owner: c.subject.clone().or_else(|| c.entity_id.clone()),
        constraint_type: c.constraint_type,
        description: c.description.clone(),
        source: c.source_text.chars().take(100).collect(),
    }
}

fn gap_reasoning(gaps: &[&Gap]) -> String {
    if gaps.is_empty() {
        return "No gaps detected".to_string();
    }
    let total: f64 = gaps.iter().map(|g| g.absolute_gap.abs()).sum();
    let percentages: Vec<f64> = gaps.iter().filter_map(|g| g.percentage_gap).map(f64::abs).collect();
    let average = if percentages.is_empty() {
        0.0
    } else {
        percentages.iter().sum::<f64>() / percentages.len() as f64
    };
    let metrics: BTreeSet<&str> = gaps.iter().map(|g| g.metric.as_str()).collect();
    format!(
        "Analysis of {} metric(s) shows deviation from targets. Total absolute gap: {}. \
         Average percentage gap: {:.1}%. Metrics affected: {}.",
        gaps.len(),
        group_thousands(total),
        average,
        metrics.into_iter().collect::<Vec<_>>().join(", ")
    )
}

fn constraint_reasoning(constraints: &[&Constraint]) -> String {
    if constraints.is_empty() {
        return "No constraints detected".to_string();
    }
    let types: BTreeSet<&str> = constraints.iter().map(|c| c.constraint_type.as_str()).collect();
    format!(
        "Detected {} constraint(s) of type(s): {}. These constraints may limit execution or \
         require resolution before proceeding.",
        constraints.len(),
        types.into_iter().collect::<Vec<_>>().join(", ")
    )
}

/// Two decimals with comma-grouped thousands (`12,345.60`).
fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
