//! Grouping of ranked decisions into executive themes.
//!
//! Decisions are grouped along three axes: shared decision type (a proxy for
//! a common root cause), gap metrics they mention, and entities they name.
//! Near-duplicate themes are merged away and the rest ranked by urgency.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::cache::short_id;
use crate::ontology::{Decision, DecisionType, Entity, Evidence, Gap, Severity, ThemeType};

/// Theme overlap above which a later theme duplicates an earlier one.
pub const DEFAULT_THEME_OVERLAP: f64 = 0.8;
/// Cap on affected entities and metrics listed per theme.
pub const MAX_THEME_ITEMS: usize = 10;
/// Minimum decisions per theme.
pub const MIN_THEME_SIZE: usize = 2;

/// A group of related decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTheme {
    pub id: String,
    pub name: String,
    pub theme_type: ThemeType,
    pub headline: String,
    pub summary: String,
    pub decision_count: usize,
    pub total_impact: f64,
    pub avg_confidence: f64,
    pub max_urgency: f64,
    pub severity: Severity,
    pub affected_entities: Vec<String>,
    pub affected_metrics: Vec<String>,
    pub decision_ids: Vec<String>,
    /// Highest-impact decision of the theme.
    pub representative_decision: Option<String>,
}

/// Totals over all themes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingSummary {
    pub total_decisions: usize,
    pub total_themes: usize,
    pub themes_by_type: BTreeMap<String, usize>,
    pub critical_themes: usize,
    pub total_impact: f64,
}

/// Share of the smaller set contained in the larger one.
pub fn overlap(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / smaller as f64
}

fn root_cause_name(decision_type: DecisionType) -> &'static str {
    match decision_type {
        DecisionType::Investigate => "Performance Investigation Required",
        DecisionType::InvestigateSystemic => "Systemic Issues Detected",
        DecisionType::Escalate => "Escalation Required",
        DecisionType::Monitor => "Active Monitoring Needed",
        DecisionType::Resolve => "Resolution Actions Pending",
        DecisionType::Prioritize => "Prioritization Decisions",
        DecisionType::Allocate => "Resource Allocation Issues",
        DecisionType::Sequence => "Dependency Management",
        DecisionType::VerifyTargets => "Target Calibration Review",
    }
}

fn theme_severity(avg_impact: f64, max_urgency: f64) -> Severity {
    let score = (avg_impact + max_urgency) / 2.0;
    if score >= 0.7 {
        Severity::Critical
    } else if score >= 0.4 {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

fn prefix_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// Groups decisions into [`DecisionTheme`]s.
#[derive(Debug, Clone)]
pub struct DecisionGroupingEngine {
    overlap_threshold: f64,
    themes: Vec<DecisionTheme>,
}

impl Default for DecisionGroupingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THEME_OVERLAP)
    }
}

impl DecisionGroupingEngine {
    pub fn new(overlap_threshold: f64) -> Self {
        Self {
            overlap_threshold,
            themes: Vec::new(),
        }
    }

    /// Build themes. Empty `entities` or `gaps` switch off the matching axis.
    pub fn group(
        &mut self,
        decisions: &[Decision],
        entities: &[Entity],
        gaps: &[Gap],
    ) -> (&[DecisionTheme], GroupingSummary) {
        self.themes.clear();
        if decisions.is_empty() {
            return (self.themes.as_slice(), GroupingSummary::default());
        }

        let root_cause = group_by_root_cause(decisions);
        let metric = group_by_metric(decisions, gaps);
        let entity = group_by_entity(decisions, entities);

        let mut themes = self.merge([root_cause, metric, entity]);
        themes.sort_by(|a, b| {
            b.max_urgency
                .total_cmp(&a.max_urgency)
                .then(b.total_impact.total_cmp(&a.total_impact))
        });
        self.themes = themes;

        let mut themes_by_type: BTreeMap<String, usize> = BTreeMap::new();
        for theme in &self.themes {
            *themes_by_type.entry(theme.theme_type.to_string()).or_insert(0) += 1;
        }
        let summary = GroupingSummary {
            total_decisions: decisions.len(),
            total_themes: self.themes.len(),
            themes_by_type,
            critical_themes: self
                .themes
                .iter()
                .filter(|t| t.severity == Severity::Critical)
                .count(),
            total_impact: self.themes.iter().map(|t| t.total_impact).sum(),
        };
        (self.themes.as_slice(), summary)
    }

    pub fn themes(&self) -> &[DecisionTheme] {
        &self.themes
    }

    pub fn theme(&self, id: &str) -> Option<&DecisionTheme> {
        self.themes.iter().find(|t| t.id == id)
    }

    /// Decisions of a theme, in the order given. Unknown ids yield none.
    pub fn decisions_for_theme<'a>(&self, id: &str, decisions: &'a [Decision]) -> Vec<&'a Decision> {
        let Some(theme) = self.theme(id) else {
            return Vec::new();
        };
        let ids: HashSet<&str> = theme.decision_ids.iter().map(String::as_str).collect();
        decisions.iter().filter(|d| ids.contains(d.id.as_str())).collect()
    }

    /// Keep themes in axis order, dropping any that overlaps a kept one.
    fn merge<const N: usize>(&self, lists: [Vec<DecisionTheme>; N]) -> Vec<DecisionTheme> {
        let mut kept: Vec<DecisionTheme> = Vec::new();
        for theme in lists.into_iter().flatten() {
            let ids: HashSet<&str> = theme.decision_ids.iter().map(String::as_str).collect();
            let duplicate = kept.iter().any(|k| {
                let seen: HashSet<&str> = k.decision_ids.iter().map(String::as_str).collect();
                overlap(&ids, &seen) > self.overlap_threshold
            });
            if !duplicate {
                kept.push(theme);
            }
        }
        kept
    }
}

/// Insertion-ordered groups of decision indexes.
#[derive(Default)]
struct Groups {
    keys: Vec<String>,
    members: BTreeMap<String, Vec<usize>>,
}

impl Groups {
    fn add(&mut self, key: &str, index: usize) {
        let members = self.members.entry(key.to_string()).or_default();
        if members.is_empty() {
            self.keys.push(key.to_string());
        }
        if !members.contains(&index) {
            members.push(index);
        }
    }

    fn into_ordered(mut self) -> impl Iterator<Item = (String, Vec<usize>)> {
        let keys = std::mem::take(&mut self.keys);
        keys.into_iter().filter_map(move |k| {
            let members = self.members.remove(&k)?;
            Some((k, members))
        })
    }
}

fn group_by_root_cause(decisions: &[Decision]) -> Vec<DecisionTheme> {
    let mut groups = Groups::default();
    for (i, d) in decisions.iter().enumerate() {
        groups.add(d.decision_type.as_str(), i);
    }
    groups
        .into_ordered()
        .filter(|(_, members)| members.len() >= MIN_THEME_SIZE)
        .map(|(key, members)| {
            let decision_type = decisions[members[0]].decision_type;
            build_theme(
                decisions,
                &members,
                ThemeType::RootCause,
                root_cause_name(decision_type).to_string(),
                &format!("rc_{}", key),
            )
        })
        .collect()
}

fn group_by_metric(decisions: &[Decision], gaps: &[Gap]) -> Vec<DecisionTheme> {
    if gaps.is_empty() {
        return Vec::new();
    }
    let metrics: BTreeSet<String> = gaps
        .iter()
        .map(|g| g.metric.to_lowercase())
        .filter(|m| !m.is_empty())
        .collect();

    let mut groups = Groups::default();
    for (i, d) in decisions.iter().enumerate() {
        let text = format!("{} {}", d.summary, d.reasoning).to_lowercase();
        let mentioned: HashSet<&str> = words(&text).collect();

        let mut matched: BTreeSet<String> = BTreeSet::new();
        for metric in &metrics {
            if words(metric).any(|w| w.chars().count() >= 3 && mentioned.contains(w)) {
                matched.insert(metric.clone());
            }
        }
        for ev in &d.evidence {
            if let Evidence::Gap { metric, .. } = ev {
                if !metric.is_empty() {
                    matched.insert(metric.to_lowercase());
                }
            }
        }
        for metric in matched {
            groups.add(&metric, i);
        }
    }

    groups
        .into_ordered()
        .filter(|(_, members)| members.len() >= MIN_THEME_SIZE)
        .map(|(metric, members)| {
            build_theme(
                decisions,
                &members,
                ThemeType::Metric,
                metric.to_title_case(),
                &format!("metric_{}", prefix_chars(&metric, 20)),
            )
        })
        .collect()
}

fn group_by_entity(decisions: &[Decision], entities: &[Entity]) -> Vec<DecisionTheme> {
    if entities.is_empty() {
        return Vec::new();
    }
    let names: BTreeSet<String> = entities
        .iter()
        .map(|e| e.canonical_name.to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    let mut groups = Groups::default();
    for (i, d) in decisions.iter().enumerate() {
        let summary = d.summary.to_lowercase();
        for name in &names {
            if summary.contains(name.as_str()) {
                groups.add(name, i);
            }
        }
        for ev in &d.evidence {
            let evidence_name = match ev {
                Evidence::Gap { entity_name: Some(n), .. } => n,
                Evidence::Relationship { entity_name, .. } => entity_name,
                _ => continue,
            };
            let lower = evidence_name.to_lowercase();
            for name in &names {
                if lower.contains(name.as_str()) || name.contains(lower.as_str()) {
                    groups.add(name, i);
                }
            }
        }
    }

    groups
        .into_ordered()
        .filter(|(_, members)| members.len() >= MIN_THEME_SIZE)
        .map(|(name, members)| {
            build_theme(
                decisions,
                &members,
                ThemeType::EntityCluster,
                format!("{} Portfolio", name.to_title_case()),
                &format!("entity_{}", prefix_chars(&name, 20)),
            )
        })
        .collect()
}

fn build_theme(
    decisions: &[Decision],
    members: &[usize],
    theme_type: ThemeType,
    name: String,
    id_prefix: &str,
) -> DecisionTheme {
    let group: Vec<&Decision> = members.iter().map(|&i| &decisions[i]).collect();
    let count = group.len();

    let decision_ids: Vec<String> = group.iter().map(|d| d.id.clone()).collect();
    let mut sorted_ids = decision_ids.clone();
    sorted_ids.sort();

    let total_impact: f64 = group.iter().map(|d| d.impact_score).sum();
    let avg_confidence = group.iter().map(|d| d.confidence_score).sum::<f64>() / count as f64;
    let max_urgency = group.iter().map(|d| d.urgency_score).fold(0.0, f64::max);
    let severity = theme_severity(total_impact / count as f64, max_urgency);

    let mut affected_entities: BTreeSet<String> = BTreeSet::new();
    let mut affected_metrics: BTreeSet<String> = BTreeSet::new();
    for d in &group {
        affected_entities.extend(d.affected_entities.iter().cloned());
        for ev in &d.evidence {
            match ev {
                Evidence::Gap { metric, .. } | Evidence::Relationship { metric, .. } => {
                    affected_metrics.insert(metric.clone());
                }
                _ => {}
            }
        }
    }

    let mut representative: Option<&Decision> = None;
    for d in &group {
        if representative.map_or(true, |r| d.impact_score > r.impact_score) {
            representative = Some(*d);
        }
    }

    let prefix = match severity {
        Severity::Critical => "Critical: ",
        Severity::Warning => "Attention: ",
        Severity::Normal => "",
    };
    let summary = match theme_type {
        ThemeType::RootCause => format!(
            "{} related decisions identified with common root cause pattern. \
             Addressing the underlying issue may resolve multiple findings simultaneously.",
            count
        ),
        ThemeType::Metric => format!(
            "{} decisions relate to {} performance. Consider a focused review of this metric area.",
            count, name
        ),
        ThemeType::EntityCluster => format!(
            "{} decisions affect {}. A coordinated response may be more effective than individual actions.",
            count, name
        ),
    };

    DecisionTheme {
        id: short_id(id_prefix, &sorted_ids, 8),
        headline: format!("{}{} ({} Decisions)", prefix, name, count),
        name,
        theme_type,
        summary,
        decision_count: count,
        total_impact,
        avg_confidence,
        max_urgency,
        severity,
        affected_entities: affected_entities.into_iter().take(MAX_THEME_ITEMS).collect(),
        affected_metrics: affected_metrics.into_iter().take(MAX_THEME_ITEMS).collect(),
        decision_ids,
        representative_decision: representative.map(|d| d.id.clone()),
    }
}
