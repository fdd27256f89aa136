//! Shared vocabulary for the pipeline.
//!
//! Every stage speaks in these records. They carry no behavior beyond small
//! accessors; the logic lives in the stages that produce them.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

/// Identifier of an [`Entity`] (`ent_` + 12 hex digits).
pub type EntityId = String;

macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            /// Stable lowercase label, identical to the serialized form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Structural role of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetRole {
    Master,
    Transactional,
    Plan,
    Actual,
    Summary,
    Comparison,
    Unknown,
}

labelled_enum!(SheetRole {
    Master => "MASTER",
    Transactional => "TRANSACTIONAL",
    Plan => "PLAN",
    Actual => "ACTUAL",
    Summary => "SUMMARY",
    Comparison => "COMPARISON",
    Unknown => "UNKNOWN",
});

/// Semantic type inferred for a column from its value distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSemanticType {
    EntityId,
    EntityName,
    Temporal,
    Quantity,
    Currency,
    Percentage,
    Metric,
    Dimension,
    Status,
    Remark,
    Unknown,
}

labelled_enum!(ColumnSemanticType {
    EntityId => "entity_id",
    EntityName => "entity_name",
    Temporal => "temporal",
    Quantity => "quantity",
    Currency => "currency",
    Percentage => "percentage",
    Metric => "metric",
    Dimension => "dimension",
    Status => "status",
    Remark => "remark",
    Unknown => "unknown",
});

impl ColumnSemanticType {
    /// Measures: quantities, currency, percentages and generic metrics.
    pub fn is_measure(&self) -> bool {
        matches!(
            self,
            Self::Quantity | Self::Currency | Self::Percentage | Self::Metric
        )
    }

    /// Free or categorical text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::EntityName | Self::Remark | Self::Status)
    }
}

/// Where a sheet's dates sit relative to the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalCoverage {
    Past,
    Future,
    Mixed,
    #[serde(rename = "none")]
    Absent,
}

labelled_enum!(TemporalCoverage {
    Past => "past",
    Future => "future",
    Mixed => "mixed",
    Absent => "none",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapDirection {
    Under,
    Over,
    OnTarget,
}

labelled_enum!(GapDirection {
    Under => "under",
    Over => "over",
    OnTarget => "on_target",
});

/// Gap severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

labelled_enum!(Severity {
    Normal => "normal",
    Warning => "warning",
    Critical => "critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    Blocking,
    Deadline,
    Dependency,
    Capacity,
    Resource,
    Exception,
    InProgress,
}

labelled_enum!(ConstraintType {
    Blocking => "blocking",
    Deadline => "deadline",
    Dependency => "dependency",
    Capacity => "capacity",
    Resource => "resource",
    Exception => "exception",
    InProgress => "in_progress",
});

impl ConstraintType {
    /// Types that stop or order execution.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Blocking | Self::Deadline | Self::Dependency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSeverity {
    Low,
    Medium,
    High,
}

labelled_enum!(ConstraintSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

impl From<ConstraintType> for ConstraintSeverity {
    fn from(kind: ConstraintType) -> Self {
        match kind {
            ConstraintType::Blocking | ConstraintType::Deadline => Self::High,
            ConstraintType::Dependency | ConstraintType::Resource | ConstraintType::Capacity => {
                Self::Medium
            }
            ConstraintType::Exception | ConstraintType::InProgress => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Investigate,
    Monitor,
    Escalate,
    Resolve,
    Sequence,
    Allocate,
    InvestigateSystemic,
    VerifyTargets,
    Prioritize,
}

labelled_enum!(DecisionType {
    Investigate => "investigate",
    Monitor => "monitor",
    Escalate => "escalate",
    Resolve => "resolve",
    Sequence => "sequence",
    Allocate => "allocate",
    InvestigateSystemic => "investigate_systemic",
    VerifyTargets => "verify_targets",
    Prioritize => "prioritize",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Increase,
    Optimize,
    Monitor,
    ResolveConstraint,
    Reallocate,
    RootCauseAnalysis,
    AdjustTargets,
    PrioritizeFix,
}

labelled_enum!(ActionType {
    Increase => "increase",
    Optimize => "optimize",
    Monitor => "monitor",
    ResolveConstraint => "resolve_constraint",
    Reallocate => "reallocate",
    RootCauseAnalysis => "root_cause_analysis",
    AdjustTargets => "adjust_targets",
    PrioritizeFix => "prioritize_fix",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeType {
    RootCause,
    Metric,
    EntityCluster,
}

labelled_enum!(ThemeType {
    RootCause => "root_cause",
    Metric => "metric",
    EntityCluster => "entity_cluster",
});

/// A column that contributes to an entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceColumn {
    pub sheet: String,
    pub column: String,
}

impl SourceColumn {
    pub fn new(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for SourceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sheet, self.column)
    }
}

/// A tracked "thing" inferred from column structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub canonical_name: String,
    pub source_columns: Vec<SourceColumn>,
    /// Sheets in workbook order; the first is the entity's home sheet.
    pub source_sheets: Vec<String>,
    /// Distinct values across all linked columns.
    pub cardinality: usize,
    pub is_primary: bool,
    pub related_entities: Vec<EntityId>,
}

/// A target value for one (subject, metric).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub entity_id: Option<EntityId>,
    pub subject: String,
    pub metric: String,
    pub value: f64,
    pub source_sheet: String,
    pub confidence: f64,
}

/// A realized value for one (subject, metric).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actual {
    pub id: String,
    pub entity_id: Option<EntityId>,
    pub subject: String,
    pub metric: String,
    pub value: f64,
    pub source_sheet: String,
    pub confidence: f64,
}

/// A plan-actual discrepancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub id: String,
    /// Entity owning the subject's key column, when one was detected.
    pub entity_id: Option<EntityId>,
    /// Row key value (or `row N`) the gap is about.
    pub subject: String,
    pub metric: String,
    pub plan_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub absolute_gap: f64,
    /// Absent for pre-computed difference columns (no base to divide by).
    pub percentage_gap: Option<f64>,
    pub direction: GapDirection,
    pub severity: Severity,
    pub source_sheet: String,
    pub plan_id: Option<String>,
    pub actual_id: Option<String>,
}

impl Gap {
    /// Decision owner: the entity id, falling back to the subject.
    pub fn owner(&self) -> &str {
        self.entity_id.as_deref().unwrap_or(&self.subject)
    }
}

/// A text- or status-derived limiting factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub entity_id: Option<EntityId>,
    /// Value of the attributing entity column in the source row.
    pub subject: Option<String>,
    pub constraint_type: ConstraintType,
    pub description: String,
    pub source_text: String,
    pub source_sheet: String,
    pub source_column: String,
    pub row: usize,
    pub severity: ConstraintSeverity,
    pub confidence: f64,
    pub extracted_values: BTreeMap<String, String>,
}

/// A concrete step proposed by a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub action_type: ActionType,
    pub target: Option<String>,
    pub metric: Option<String>,
    pub description: String,
    pub estimated_impact: f64,
    pub confidence: f64,
}

/// One piece of evidence backing a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Evidence {
    Gap {
        gap_id: String,
        owner: String,
        entity_name: Option<String>,
        metric: String,
        absolute_gap: f64,
        percentage_gap: Option<f64>,
        direction: GapDirection,
    },
    Constraint {
        constraint_id: String,
        owner: Option<String>,
        constraint_type: ConstraintType,
        description: String,
        source: String,
    },
    Pattern {
        pattern: String,
        ratio: f64,
        total_gaps: usize,
    },
    Relationship {
        entity_id: EntityId,
        entity_name: String,
        related_count: usize,
        metric: String,
        severity: Severity,
    },
}

/// A ranked candidate action with its evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub decision_type: DecisionType,
    pub summary: String,
    pub reasoning: String,
    pub actions: Vec<Action>,
    /// Entity ids this decision is about.
    pub affected_entities: Vec<EntityId>,
    /// Row-level subjects (when no entity was attributable).
    pub subjects: Vec<String>,
    /// Gap ids, at most ten.
    pub supporting_gaps: Vec<String>,
    /// Constraint ids, at most ten.
    pub supporting_constraints: Vec<String>,
    pub impact_score: f64,
    pub confidence_score: f64,
    pub urgency_score: f64,
    pub composite_score: f64,
    /// Position in the ranking, starting at 1.
    pub rank: usize,
    pub evidence: Vec<Evidence>,
}

impl Decision {
    /// Weighted score used for ranking.
    pub fn composite(impact: f64, urgency: f64, confidence: f64) -> f64 {
        0.4 * impact + 0.3 * urgency + 0.3 * confidence
    }
}

/// Aggregate state for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub entities: Vec<Entity>,
    pub plans: Vec<Plan>,
    pub actuals: Vec<Actual>,
    pub gaps: Vec<Gap>,
    pub constraints: Vec<Constraint>,
    pub actions: Vec<Action>,
    pub decisions: Vec<Decision>,
    /// Adjacency lists, including `sheet:` aggregation nodes.
    pub entity_graph: BTreeMap<String, Vec<String>>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl DecisionContext {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn gap(&self, id: &str) -> Option<&Gap> {
        self.gaps.iter().find(|g| g.id == id)
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id == id)
    }

    /// Verify every cross-record id resolves within this context.
    pub fn check_references(&self) -> Result<(), InvariantViolation> {
        let entity_ids: HashSet<&str> = self.entities.iter().map(|e| e.id.as_str()).collect();
        let gap_ids: HashSet<&str> = self.gaps.iter().map(|g| g.id.as_str()).collect();
        let constraint_ids: HashSet<&str> =
            self.constraints.iter().map(|c| c.id.as_str()).collect();

        let check = |owner: &str, id: &str| -> Result<(), InvariantViolation> {
            if entity_ids.contains(id) {
                Ok(())
            } else {
                Err(InvariantViolation::DanglingEntity {
                    owner: owner.to_string(),
                    entity_id: id.to_string(),
                })
            }
        };

        for entity in &self.entities {
            for related in &entity.related_entities {
                check(&entity.id, related)?;
            }
        }
        for gap in &self.gaps {
            if let Some(id) = &gap.entity_id {
                check(&gap.id, id)?;
            }
        }
        for plan in &self.plans {
            if let Some(id) = &plan.entity_id {
                check(&plan.id, id)?;
            }
        }
        for actual in &self.actuals {
            if let Some(id) = &actual.entity_id {
                check(&actual.id, id)?;
            }
        }
        for constraint in &self.constraints {
            if let Some(id) = &constraint.entity_id {
                check(&constraint.id, id)?;
            }
        }
        for (node, neighbors) in &self.entity_graph {
            for id in std::iter::once(node).chain(neighbors) {
                if !id.starts_with(crate::graph::SHEET_NODE_PREFIX) {
                    check("entity graph", id)?;
                }
            }
        }
        for decision in &self.decisions {
            for id in &decision.affected_entities {
                check(&decision.id, id)?;
            }
            for gap_id in &decision.supporting_gaps {
                if !gap_ids.contains(gap_id.as_str()) {
                    return Err(InvariantViolation::DanglingGap {
                        decision_id: decision.id.clone(),
                        gap_id: gap_id.clone(),
                    });
                }
            }
            for constraint_id in &decision.supporting_constraints {
                if !constraint_ids.contains(constraint_id.as_str()) {
                    return Err(InvariantViolation::DanglingConstraint {
                        decision_id: decision.id.clone(),
                        constraint_id: constraint_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
