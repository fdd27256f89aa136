//! Constraint extraction from status, remark and category columns.
//!
//! No vocabulary is involved: status values are judged by how rare they are
//! and by structural cues (negation, gerunds, ellipses); remarks by regex
//! families for quantities, dates, sequencing words and shortages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::inference::{EntityDetector, SheetProfile};
use crate::ontology::{
    ColumnSemanticType, Constraint, ConstraintSeverity, ConstraintType, EntityId,
};
use crate::table::{Column, Sheet};

use super::thresholds::constraint as t;

// A hyphenated negating prefix ("un-assigned") or a leading negating word.
static NEGATION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:un|non|dis|im|in)-[a-z]|(?:no|not|non)\b)").unwrap()
});
static NEGATION_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(not|no|none|never|cannot|cant|won't|wouldn't)\b").unwrap()
});
// Gerunds and "in <state>" phrases such as "in progress".
static PROCESS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ing\b|^in\s+\w").unwrap());
static CAPACITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(%|units?|days?|weeks?|months?|hours?)").unwrap()
});
static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b").unwrap());
static SEQUENCING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(then|after|before|requires|needs|depends)\b").unwrap());
static SHORTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(short|missing|lacking|needed)").unwrap());

/// Structural negation: a negating prefix word or a negation anywhere.
pub fn has_negation(text: &str) -> bool {
    NEGATION_PREFIX.is_match(text) || NEGATION_WORD.is_match(text)
}

fn has_process_marker(text: &str) -> bool {
    PROCESS.is_match(text) || text.contains("...")
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// How a column is mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRule {
    Status,
    Remark,
    Category,
}

/// A pattern found in one remark.
struct RemarkMatch {
    constraint_type: ConstraintType,
    matched: String,
    values: BTreeMap<String, String>,
    confidence: f64,
}

/// Collects constraints across a workbook.
#[derive(Debug, Clone, Default)]
pub struct ConstraintExtractor {
    constraints: Vec<Constraint>,
}

impl ConstraintExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract constraints. `profiles` must be aligned with `sheets`.
    pub fn extract(
        &mut self,
        sheets: &[Sheet],
        profiles: &[SheetProfile],
        detector: &EntityDetector,
    ) -> &[Constraint] {
        self.constraints.clear();
        for (sheet, profile) in sheets.iter().zip(profiles) {
            for (column, col_profile) in sheet.columns.iter().zip(&profile.columns) {
                let rule = match col_profile.semantic_type {
                    ColumnSemanticType::Status => ColumnRule::Status,
                    ColumnSemanticType::Remark => ColumnRule::Remark,
                    _ if !col_profile.is_numeric
                        && col_profile.non_null_count > 0
                        && col_profile.unique_ratio < t::CATEGORY_UNIQUENESS =>
                    {
                        ColumnRule::Category
                    }
                    _ => continue,
                };
                let before = self.constraints.len();
                match rule {
                    ColumnRule::Status => self.from_status(sheet, column, detector),
                    ColumnRule::Remark => self.from_remarks(sheet, column, detector),
                    ColumnRule::Category => self.from_category(sheet, column, detector),
                }
                debug!(
                    sheet = %sheet.name,
                    column = %column.name,
                    rule = ?rule,
                    found = self.constraints.len() - before,
                    "constraint column"
                );
            }
        }
        &self.constraints
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
    }

    pub fn by_type(&self, constraint_type: ConstraintType) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.constraint_type == constraint_type)
            .collect()
    }

    pub fn for_entity(&self, entity_id: &str) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.entity_id.as_deref() == Some(entity_id))
            .collect()
    }

    /// Blocking, deadline and dependency constraints.
    pub fn blocking(&self) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.constraint_type.is_blocking())
            .collect()
    }

    fn from_status(&mut self, sheet: &Sheet, column: &Column, detector: &EntityDetector) {
        // Shares are computed over lowercased, trimmed values.
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut total = 0usize;
        for key in column.values.iter().filter_map(|v| v.key()) {
            *counts.entry(key.to_lowercase()).or_insert(0) += 1;
            total += 1;
        }
        if total == 0 {
            return;
        }
        let classified: BTreeMap<String, ConstraintType> = counts
            .into_iter()
            .filter_map(|(value, count)| {
                classify_status(&value, count as f64 / total as f64).map(|ct| (value, ct))
            })
            .collect();
        if classified.is_empty() {
            return;
        }

        for row in 0..sheet.row_count() {
            let Some(raw) = column.get(row).key() else {
                continue;
            };
            let Some(constraint_type) = classified.get(&raw.to_lowercase()).copied() else {
                continue;
            };
            let mut values = BTreeMap::new();
            values.insert("status".to_string(), raw.clone());
            self.push(
                sheet,
                column,
                row,
                detector,
                Draft {
                    constraint_type,
                    description: format!("Status indicates {}: {}", constraint_type, raw),
                    source_text: raw,
                    severity: ConstraintSeverity::from(constraint_type),
                    confidence: t::STATUS_CONFIDENCE,
                    extracted_values: values,
                },
            );
        }
    }

    fn from_remarks(&mut self, sheet: &Sheet, column: &Column, detector: &EntityDetector) {
        for row in 0..sheet.row_count() {
            let Some(text) = column.get(row).key() else {
                continue;
            };
            if text.chars().count() < t::MIN_REMARK_CHARS {
                continue;
            }
            for m in analyze_remark(&text) {
                let severity = if m.confidence > t::SEVERITY_CONFIDENCE {
                    ConstraintSeverity::from(m.constraint_type)
                } else {
                    ConstraintSeverity::Low
                };
                self.push(
                    sheet,
                    column,
                    row,
                    detector,
                    Draft {
                        constraint_type: m.constraint_type,
                        description: format!(
                            "Extracted from remark: {}",
                            truncate(&m.matched, t::MAX_MATCH_CHARS)
                        ),
                        source_text: text.clone(),
                        severity,
                        confidence: m.confidence,
                        extracted_values: m.values,
                    },
                );
            }
        }
    }

    fn from_category(&mut self, sheet: &Sheet, column: &Column, detector: &EntityDetector) {
        let counts = column.value_counts();
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return;
        }
        for (value, count) in counts {
            let share = count as f64 / total as f64;
            if share >= t::RARE_SHARE {
                continue;
            }
            for row in 0..sheet.row_count() {
                if column.get(row).key().as_deref() != Some(value.as_str()) {
                    continue;
                }
                let mut values = BTreeMap::new();
                values.insert("category".to_string(), value.clone());
                values.insert("proportion".to_string(), format!("{:.4}", share));
                self.push(
                    sheet,
                    column,
                    row,
                    detector,
                    Draft {
                        constraint_type: ConstraintType::Exception,
                        description: format!("Rare category value: {}", value),
                        source_text: value.clone(),
                        severity: ConstraintSeverity::Medium,
                        confidence: t::CATEGORY_CONFIDENCE,
                        extracted_values: values,
                    },
                );
            }
        }
    }

    fn push(
        &mut self,
        sheet: &Sheet,
        column: &Column,
        row: usize,
        detector: &EntityDetector,
        draft: Draft,
    ) {
        let (entity_id, subject) = row_entity(sheet, row, detector)
            .map(|(id, subject)| (Some(id), Some(subject)))
            .unwrap_or((None, None));
        self.constraints.push(Constraint {
            id: format!("con-{:04}", self.constraints.len() + 1),
            entity_id,
            subject,
            constraint_type: draft.constraint_type,
            description: draft.description,
            source_text: truncate(&draft.source_text, t::MAX_SOURCE_CHARS),
            source_sheet: sheet.name.clone(),
            source_column: column.name.clone(),
            row,
            severity: draft.severity,
            confidence: draft.confidence,
            extracted_values: draft.extracted_values,
        });
    }
}

struct Draft {
    constraint_type: ConstraintType,
    description: String,
    source_text: String,
    severity: ConstraintSeverity,
    confidence: f64,
    extracted_values: BTreeMap<String, String>,
}

/// Constraint type of a status value given its share of the column.
///
/// Values at 20% or more never qualify. Rare values (< 5%) are blocking
/// when negated and exceptions otherwise. The 5-20% band is in-progress work
/// or a dependency; negation plays no part there.
pub fn classify_status(value: &str, share: f64) -> Option<ConstraintType> {
    if share >= t::ATTENTION_SHARE {
        return None;
    }
    if share < t::RARE_SHARE {
        return Some(if has_negation(value) {
            ConstraintType::Blocking
        } else {
            ConstraintType::Exception
        });
    }
    if has_process_marker(value) {
        Some(ConstraintType::InProgress)
    } else {
        Some(ConstraintType::Dependency)
    }
}

fn analyze_remark(text: &str) -> Vec<RemarkMatch> {
    let lower = text.to_lowercase();
    let mut out = Vec::new();

    for caps in CAPACITY.captures_iter(&lower) {
        let (value, unit) = (&caps[1], &caps[2]);
        let mut values = BTreeMap::new();
        values.insert("value".to_string(), value.to_string());
        values.insert("unit".to_string(), unit.to_string());
        out.push(RemarkMatch {
            constraint_type: ConstraintType::Capacity,
            matched: format!("{} {}", value, unit),
            values,
            confidence: 0.7,
        });
    }

    for caps in DATE_TOKEN.captures_iter(text) {
        let date = caps[1].to_string();
        let mut values = BTreeMap::new();
        values.insert("date".to_string(), date.clone());
        out.push(RemarkMatch {
            constraint_type: ConstraintType::Deadline,
            matched: date,
            values,
            confidence: 0.6,
        });
    }

    let full_text = || {
        let mut values = BTreeMap::new();
        values.insert("full_text".to_string(), text.to_string());
        values
    };
    if SEQUENCING.is_match(&lower) {
        out.push(RemarkMatch {
            constraint_type: ConstraintType::Dependency,
            matched: text.to_string(),
            values: full_text(),
            confidence: 0.5,
        });
    }
    if has_negation(&lower) {
        out.push(RemarkMatch {
            constraint_type: ConstraintType::Blocking,
            matched: text.to_string(),
            values: full_text(),
            confidence: 0.6,
        });
    }

    if let Some(caps) = SHORTAGE.captures(&lower) {
        let mut values = BTreeMap::new();
        values.insert("quantity".to_string(), caps[1].to_string());
        values.insert("type".to_string(), caps[2].to_string());
        out.push(RemarkMatch {
            constraint_type: ConstraintType::Resource,
            matched: caps[0].to_string(),
            values,
            confidence: 0.7,
        });
    }
    out
}

/// First primary-entity column with a value in `row`.
fn row_entity(sheet: &Sheet, row: usize, detector: &EntityDetector) -> Option<(EntityId, String)> {
    sheet.columns.iter().find_map(|c| {
        let entity = detector.entity_for_column(&sheet.name, &c.name)?;
        if !entity.is_primary {
            return None;
        }
        c.get(row).key().map(|v| (entity.id.clone(), v))
    })
}
