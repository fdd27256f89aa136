//! Plan-versus-actual gap detection.
//!
//! Three strategies run in order and append to one list:
//!
//! 1. **Separate sheets** - a PLAN sheet joined to every ACTUAL or
//!    TRANSACTIONAL sheet on a shared entity column, metrics paired by
//!    range and mean similarity.
//! 2. **Column pairs** - two correlated numeric columns of one sheet where
//!    the smoother one reads as the target.
//! 3. **Difference columns** - signed, zero-centered columns in comparison
//!    sheets that already hold the gap.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inference::{EntityDetector, SheetProfile};
use crate::ontology::{Actual, EntityId, Gap, GapDirection, Plan, Severity, SheetRole};
use crate::table::{stats, Column, Sheet};

use super::thresholds::gap as t;

/// Two columns of one sheet read as target and realized value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub plan_column: String,
    pub actual_column: String,
    pub sheet: String,
    pub correlation: f64,
    pub confidence: f64,
}

/// Percentage deviation of `actual` from `plan`.
///
/// A zero plan gives 100 when anything was realized, 0 otherwise.
pub fn percentage_gap(plan: f64, actual: f64) -> f64 {
    if plan != 0.0 {
        (actual - plan) / plan * 100.0
    } else if actual != 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Severity of a percentage gap: below 5% normal, below 15% warning.
pub fn severity_for(percentage: f64) -> Severity {
    let magnitude = percentage.abs();
    if magnitude < t::ON_TARGET_PCT {
        Severity::Normal
    } else if magnitude < t::CRITICAL_PCT {
        Severity::Warning
    } else {
        Severity::Critical
    }
}

/// Direction of a gap; within 5% is on target.
pub fn direction_for(plan: f64, actual: f64, percentage: f64) -> GapDirection {
    if percentage.abs() < t::ON_TARGET_PCT {
        GapDirection::OnTarget
    } else if actual < plan {
        GapDirection::Under
    } else {
        GapDirection::Over
    }
}

fn severity_from_z(value: f64, std: f64) -> Severity {
    if std <= 0.0 {
        return Severity::Normal;
    }
    let z = value.abs() / std;
    if z < 1.0 {
        Severity::Normal
    } else if z < 2.0 {
        Severity::Warning
    } else {
        Severity::Critical
    }
}

/// Who a row is about: the owning entity (if any) and the row's key text.
struct RowOwner {
    entity_id: Option<EntityId>,
    subject: String,
}

/// Detects gaps and records the plan/actual values behind them.
#[derive(Debug, Clone, Default)]
pub struct GapAnalyzer {
    gaps: Vec<Gap>,
    plans: Vec<Plan>,
    actuals: Vec<Actual>,
    column_pairs: Vec<ColumnPair>,
}

impl GapAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all strategies. `profiles` must be aligned with `sheets`.
    pub fn analyze(
        &mut self,
        sheets: &[Sheet],
        profiles: &[SheetProfile],
        detector: &EntityDetector,
    ) -> &[Gap] {
        self.gaps.clear();
        self.plans.clear();
        self.actuals.clear();
        self.column_pairs.clear();

        self.analyze_separate_sheets(sheets, profiles, detector);
        self.analyze_column_pairs(sheets, detector);
        self.analyze_difference_columns(sheets, profiles, detector);
        debug!(
            gaps = self.gaps.len(),
            pairs = self.column_pairs.len(),
            "gap analysis finished"
        );
        &self.gaps
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn actuals(&self) -> &[Actual] {
        &self.actuals
    }

    pub fn column_pairs(&self) -> &[ColumnPair] {
        &self.column_pairs
    }

    pub fn critical_gaps(&self) -> Vec<&Gap> {
        self.gaps
            .iter()
            .filter(|g| g.severity == Severity::Critical)
            .collect()
    }

    pub fn gaps_for_entity(&self, entity_id: &str) -> Vec<&Gap> {
        self.gaps
            .iter()
            .filter(|g| g.entity_id.as_deref() == Some(entity_id))
            .collect()
    }

    /// Consume the analyzer, returning gaps, plans and actuals.
    pub fn into_parts(self) -> (Vec<Gap>, Vec<Plan>, Vec<Actual>) {
        (self.gaps, self.plans, self.actuals)
    }

    // ------------------------------------------------------------------
    // Strategy 1: separate plan and actual sheets
    // ------------------------------------------------------------------

    fn analyze_separate_sheets(
        &mut self,
        sheets: &[Sheet],
        profiles: &[SheetProfile],
        detector: &EntityDetector,
    ) {
        let with_roles = |roles: &[SheetRole]| -> Vec<&Sheet> {
            sheets
                .iter()
                .zip(profiles)
                .filter(|(_, p)| roles.contains(&p.role))
                .map(|(s, _)| s)
                .collect()
        };
        let plan_sheets = with_roles(&[SheetRole::Plan]);
        let actual_sheets = with_roles(&[SheetRole::Actual, SheetRole::Transactional]);

        for plan_sheet in &plan_sheets {
            for actual_sheet in &actual_sheets {
                let keys = common_entity_columns(plan_sheet, actual_sheet, detector);
                if keys.is_empty() {
                    continue;
                }
                let plan_keys: Vec<&str> = keys.iter().map(|(p, _, _)| *p).collect();
                let actual_keys: Vec<&str> = keys.iter().map(|(_, a, _)| *a).collect();
                let metrics = match_metric_columns(plan_sheet, actual_sheet, &plan_keys, &actual_keys);
                for (plan_key, actual_key, entity_id) in &keys {
                    for (plan_metric, actual_metric) in &metrics {
                        self.join_sheets(
                            plan_sheet,
                            actual_sheet,
                            (*plan_key, *actual_key),
                            (*plan_metric, *actual_metric),
                            entity_id,
                        );
                    }
                }
            }
        }
    }

    /// Inner join of one metric pair on one key pair.
    fn join_sheets(
        &mut self,
        plan_sheet: &Sheet,
        actual_sheet: &Sheet,
        (plan_key, actual_key): (&str, &str),
        (plan_metric, actual_metric): (&str, &str),
        entity_id: &EntityId,
    ) {
        let (Some(pk), Some(pm), Some(ak), Some(am)) = (
            plan_sheet.column(plan_key),
            plan_sheet.column(plan_metric),
            actual_sheet.column(actual_key),
            actual_sheet.column(actual_metric),
        ) else {
            return;
        };

        let mut realized: HashMap<String, Vec<f64>> = HashMap::new();
        for row in 0..actual_sheet.row_count() {
            if let (Some(key), Some(value)) = (ak.get(row).key(), am.get(row).as_f64()) {
                realized.entry(key).or_default().push(value);
            }
        }

        for row in 0..plan_sheet.row_count() {
            let (Some(key), Some(plan)) = (pk.get(row).key(), pm.get(row).as_f64()) else {
                continue;
            };
            let Some(values) = realized.get(&key) else {
                continue;
            };
            for &actual in values {
                let owner = RowOwner {
                    entity_id: Some(entity_id.clone()),
                    subject: key.clone(),
                };
                self.push_pair_gap(owner, plan_metric, plan, actual, &plan_sheet.name, &actual_sheet.name);
            }
        }
    }

    // ------------------------------------------------------------------
    // Strategy 2: correlated column pairs inside one sheet
    // ------------------------------------------------------------------

    fn analyze_column_pairs(&mut self, sheets: &[Sheet], detector: &EntityDetector) {
        for sheet in sheets {
            let numeric: Vec<&Column> = sheet.columns.iter().filter(|c| c.is_numeric()).collect();
            if numeric.len() < 2 {
                continue;
            }
            let rows = sheet.row_count();
            let key_column = sheet.columns.iter().find(|c| {
                detector
                    .entity_for_column(&sheet.name, &c.name)
                    .is_some_and(|e| e.is_primary)
            });

            for (i, a) in numeric.iter().enumerate() {
                for b in &numeric[i + 1..] {
                    let Some(pair) = detect_pair(sheet, a, b, rows) else {
                        continue;
                    };
                    debug!(
                        sheet = %sheet.name,
                        plan = %pair.plan_column,
                        actual = %pair.actual_column,
                        "column pair"
                    );
                    let (plan_col, actual_col) = if pair.plan_column == a.name { (*a, *b) } else { (*b, *a) };
                    for row in 0..rows {
                        let (Some(plan), Some(actual)) =
                            (plan_col.get(row).as_f64(), actual_col.get(row).as_f64())
                        else {
                            continue;
                        };
                        let owner = row_owner(sheet, key_column, row, detector);
                        self.push_pair_gap(owner, &plan_col.name, plan, actual, &sheet.name, &sheet.name);
                    }
                    self.column_pairs.push(pair);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Strategy 3: pre-computed difference columns
    // ------------------------------------------------------------------

    fn analyze_difference_columns(
        &mut self,
        sheets: &[Sheet],
        profiles: &[SheetProfile],
        detector: &EntityDetector,
    ) {
        for (sheet, profile) in sheets.iter().zip(profiles) {
            if profile.role != SheetRole::Comparison && !profile.has_comparisons {
                continue;
            }
            for column in sheet.columns.iter().filter(|c| c.is_numeric()) {
                let values = column.numeric_values();
                let Some(std) = stats::std_dev(&values).filter(|s| *s > 0.0) else {
                    continue;
                };
                let mean = stats::mean(&values).unwrap_or(0.0);
                let has_negatives = values.iter().any(|v| *v < 0.0);
                if !has_negatives || mean.abs() >= std * t::DIFF_CENTERING {
                    continue;
                }

                let key_column = sheet.columns.iter().find(|c| {
                    c.name != column.name && detector.entity_for_column(&sheet.name, &c.name).is_some()
                });
                for row in 0..sheet.row_count() {
                    let Some(value) = column.get(row).as_f64() else {
                        continue;
                    };
                    if value.abs() <= t::DIFF_MIN_ABS {
                        continue;
                    }
                    let owner = row_owner(sheet, key_column, row, detector);
                    let id = format!("gap-{:04}", self.gaps.len() + 1);
                    self.gaps.push(Gap {
                        id,
                        entity_id: owner.entity_id,
                        subject: owner.subject,
                        metric: column.name.clone(),
                        plan_value: None,
                        actual_value: None,
                        absolute_gap: value,
                        percentage_gap: None,
                        direction: if value < 0.0 { GapDirection::Under } else { GapDirection::Over },
                        severity: severity_from_z(value, std),
                        source_sheet: sheet.name.clone(),
                        plan_id: None,
                        actual_id: None,
                    });
                }
            }
        }
    }

    fn push_pair_gap(
        &mut self,
        owner: RowOwner,
        metric: &str,
        plan: f64,
        actual: f64,
        plan_sheet: &str,
        actual_sheet: &str,
    ) {
        let seq = self.gaps.len() + 1;
        let plan_id = format!("plan-{:04}", seq);
        let actual_id = format!("act-{:04}", seq);
        let percentage = percentage_gap(plan, actual);

        self.plans.push(Plan {
            id: plan_id.clone(),
            entity_id: owner.entity_id.clone(),
            subject: owner.subject.clone(),
            metric: metric.to_string(),
            value: plan,
            source_sheet: plan_sheet.to_string(),
            confidence: t::RECORD_CONFIDENCE,
        });
        self.actuals.push(Actual {
            id: actual_id.clone(),
            entity_id: owner.entity_id.clone(),
            subject: owner.subject.clone(),
            metric: metric.to_string(),
            value: actual,
            source_sheet: actual_sheet.to_string(),
            confidence: t::RECORD_CONFIDENCE,
        });
        self.gaps.push(Gap {
            id: format!("gap-{:04}", seq),
            entity_id: owner.entity_id,
            subject: owner.subject,
            metric: metric.to_string(),
            plan_value: Some(plan),
            actual_value: Some(actual),
            absolute_gap: actual - plan,
            percentage_gap: Some(percentage),
            direction: direction_for(plan, actual, percentage),
            severity: severity_for(percentage),
            source_sheet: plan_sheet.to_string(),
            plan_id: Some(plan_id),
            actual_id: Some(actual_id),
        });
    }
}

/// (plan column, first actual column of the same entity, entity id).
fn common_entity_columns<'a>(
    plan: &'a Sheet,
    actual: &'a Sheet,
    detector: &EntityDetector,
) -> Vec<(&'a str, &'a str, EntityId)> {
    let mut out = Vec::new();
    for pc in &plan.columns {
        let Some(pe) = detector.entity_for_column(&plan.name, &pc.name) else {
            continue;
        };
        let matched = actual.columns.iter().find(|ac| {
            detector
                .entity_for_column(&actual.name, &ac.name)
                .is_some_and(|ae| ae.id == pe.id)
        });
        if let Some(ac) = matched {
            out.push((pc.name.as_str(), ac.name.as_str(), pe.id.clone()));
        }
    }
    out
}

/// Best actual metric for each plan metric, join keys excluded.
fn match_metric_columns<'a>(
    plan: &'a Sheet,
    actual: &'a Sheet,
    plan_keys: &[&str],
    actual_keys: &[&str],
) -> Vec<(&'a str, &'a str)> {
    let mut pairs = Vec::new();
    for pc in plan
        .columns
        .iter()
        .filter(|c| c.is_numeric() && !plan_keys.contains(&c.name.as_str()))
    {
        let mut best: Option<(&str, f64)> = None;
        for ac in actual
            .columns
            .iter()
            .filter(|c| c.is_numeric() && !actual_keys.contains(&c.name.as_str()))
        {
            let score = column_similarity(&pc.numeric_values(), &ac.numeric_values());
            if best.map_or(score > 0.0, |(_, s)| score > s) {
                best = Some((ac.name.as_str(), score));
            }
        }
        if let Some((name, score)) = best {
            if score > t::METRIC_MATCH_SCORE {
                pairs.push((pc.name.as_str(), name));
            }
        }
    }
    pairs
}

/// 0.5 × range ratio + 0.5 × mean ratio. Flat columns score 0.
fn column_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (Some((amin, amax)), Some((bmin, bmax))) = (stats::min_max(a), stats::min_max(b)) else {
        return 0.0;
    };
    let (ra, rb) = (amax - amin, bmax - bmin);
    if ra == 0.0 || rb == 0.0 {
        return 0.0;
    }
    let range_ratio = ra.min(rb) / ra.max(rb);
    let (ma, mb) = (stats::mean(a).unwrap_or(0.0), stats::mean(b).unwrap_or(0.0));
    let mean_ratio = if ma == 0.0 && mb == 0.0 { 1.0 } else { stats::ratio(ma, mb) };
    0.5 * range_ratio + 0.5 * mean_ratio
}

fn detect_pair(sheet: &Sheet, a: &Column, b: &Column, rows: usize) -> Option<ColumnPair> {
    let correlation = stats::correlation(&a.numeric_by_row(rows), &b.numeric_by_row(rows))?;
    if correlation <= t::PAIR_CORRELATION {
        return None;
    }
    let va = stats::variance(&a.numeric_values())?;
    let vb = stats::variance(&b.numeric_values())?;
    if va <= 0.0 || vb <= 0.0 || va.min(vb) / va.max(vb) >= t::PAIR_VARIANCE_RATIO {
        return None;
    }
    let (plan, actual) = if va < vb { (a, b) } else { (b, a) };
    Some(ColumnPair {
        plan_column: plan.name.clone(),
        actual_column: actual.name.clone(),
        sheet: sheet.name.clone(),
        correlation,
        confidence: t::PAIR_CONFIDENCE,
    })
}

fn row_owner(
    sheet: &Sheet,
    key_column: Option<&Column>,
    row: usize,
    detector: &EntityDetector,
) -> RowOwner {
    if let Some(column) = key_column {
        if let Some(key) = column.get(row).key() {
            return RowOwner {
                entity_id: detector
                    .entity_for_column(&sheet.name, &column.name)
                    .map(|e| e.id.clone()),
                subject: key,
            };
        }
    }
    RowOwner {
        entity_id: None,
        subject: format!("row {}", row),
    }
}
