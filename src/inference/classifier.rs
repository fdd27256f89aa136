//! Sheet and column classification.
//!
//! Each column gets a [`ColumnSemanticType`] from its value distribution.
//! Each sheet is then scored against six role hypotheses from aggregate
//! signals (text/numeric balance, dates and their direction, totals rows,
//! comparable columns). A final cross-sheet pass fixes up roles that only
//! make sense in relation to each other.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ontology::{ColumnSemanticType, SheetRole, TemporalCoverage};
use crate::table::{stats, Column, Sheet, Value};

use super::temporal::{coverage_of, parse_date};
use super::thresholds::{column as col_t, sheet as sheet_t};

/// Numeric shape of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericProfile {
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub has_negatives: bool,
    pub all_integers: bool,
}

impl NumericProfile {
    fn from_values(values: &[f64]) -> Option<Self> {
        let (min, max) = stats::min_max(values)?;
        Some(Self {
            mean: stats::mean(values)?,
            std: stats::std_dev(values),
            min,
            max,
            has_negatives: min < 0.0,
            all_integers: values.iter().all(|v| v.fract() == 0.0),
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Structural fingerprint of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub semantic_type: ColumnSemanticType,
    pub null_ratio: f64,
    pub unique_ratio: f64,
    pub distinct_count: usize,
    pub non_null_count: usize,
    pub is_numeric: bool,
    pub is_potential_key: bool,
    /// Average rendered length of present values.
    pub avg_length: f64,
    pub stats: Option<NumericProfile>,
}

/// Structural fingerprint of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetProfile {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub numeric_ratio: f64,
    pub text_ratio: f64,
    pub temporal_columns: usize,
    pub null_ratio: f64,
    pub avg_uniqueness: f64,
    pub has_aggregations: bool,
    pub has_comparisons: bool,
    pub temporal_coverage: TemporalCoverage,
    pub role: SheetRole,
    pub confidence: f64,
    pub columns: Vec<ColumnProfile>,
}

impl SheetProfile {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            row_count: 0,
            column_count: 0,
            numeric_ratio: 0.0,
            text_ratio: 0.0,
            temporal_columns: 0,
            null_ratio: 0.0,
            avg_uniqueness: 0.0,
            has_aggregations: false,
            has_comparisons: false,
            temporal_coverage: TemporalCoverage::Absent,
            role: SheetRole::Unknown,
            confidence: 0.0,
            columns: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Assigns sheet roles and column semantic types.
#[derive(Debug, Clone)]
pub struct SheetClassifier {
    reference_date: NaiveDate,
}

impl Default for SheetClassifier {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl SheetClassifier {
    /// `reference_date` anchors past/future temporal coverage.
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Classify every sheet, then refine roles across sheets.
    ///
    /// The output is aligned with `sheets`.
    pub fn classify_all(&self, sheets: &[Sheet]) -> Vec<SheetProfile> {
        let mut profiles: Vec<SheetProfile> =
            sheets.iter().map(|s| self.classify_sheet(s)).collect();
        refine_twin_sheets(sheets, &mut profiles);
        refine_missing_actual(&mut profiles);
        profiles
    }

    /// Profile one sheet in isolation. Never fails; sheets without data get
    /// a zero-confidence UNKNOWN profile.
    pub fn classify_sheet(&self, sheet: &Sheet) -> SheetProfile {
        if sheet.is_empty() {
            return SheetProfile::empty(&sheet.name);
        }

        let rows = sheet.row_count();
        let columns: Vec<ColumnProfile> = sheet
            .columns
            .iter()
            .map(|c| profile_column(c, rows))
            .collect();
        let n = columns.len() as f64;

        let numeric_ratio =
            columns.iter().filter(|c| c.semantic_type.is_measure()).count() as f64 / n;
        let text_ratio =
            columns.iter().filter(|c| c.semantic_type.is_textual()).count() as f64 / n;
        let temporal_columns = columns
            .iter()
            .filter(|c| c.semantic_type == ColumnSemanticType::Temporal)
            .count();
        let null_ratio = columns.iter().map(|c| c.null_ratio).sum::<f64>() / n;
        let avg_uniqueness = columns.iter().map(|c| c.unique_ratio).sum::<f64>() / n;
        let has_aggregations = detect_aggregations(sheet, &columns, rows);
        let has_comparisons = detect_comparisons(&columns);
        let temporal_coverage = self.temporal_coverage(sheet, &columns);

        let mut profile = SheetProfile {
            name: sheet.name.clone(),
            row_count: rows,
            column_count: columns.len(),
            numeric_ratio,
            text_ratio,
            temporal_columns,
            null_ratio,
            avg_uniqueness,
            has_aggregations,
            has_comparisons,
            temporal_coverage,
            role: SheetRole::Unknown,
            confidence: 0.0,
            columns,
        };
        let (role, confidence) = score_roles(&profile);
        profile.role = role;
        profile.confidence = confidence;

        debug!(
            sheet = %profile.name,
            role = %profile.role,
            confidence = profile.confidence,
            "classified sheet"
        );
        profile
    }

    fn temporal_coverage(&self, sheet: &Sheet, columns: &[ColumnProfile]) -> TemporalCoverage {
        for (column, profile) in sheet.columns.iter().zip(columns) {
            if profile.semantic_type != ColumnSemanticType::Temporal {
                continue;
            }
            let dates: Vec<NaiveDate> = column
                .values
                .iter()
                .filter_map(Value::as_text)
                .filter_map(parse_date)
                .collect();
            if let Some(coverage) =
                coverage_of(&dates, self.reference_date, sheet_t::TEMPORAL_MARGIN_DAYS)
            {
                return coverage;
            }
        }
        TemporalCoverage::Absent
    }
}

fn profile_column(column: &Column, rows: usize) -> ColumnProfile {
    let non_null_count = column.non_null_count();
    let distinct = column.distinct_keys();
    let unique_ratio = column.unique_ratio();
    let is_numeric = column.is_numeric();
    let numbers = if is_numeric {
        column.numeric_values()
    } else {
        Vec::new()
    };
    let stats = NumericProfile::from_values(&numbers);

    let keys: Vec<String> = column.values.iter().filter_map(Value::key).collect();
    let avg_length = if keys.is_empty() {
        0.0
    } else {
        keys.iter().map(|k| k.chars().count()).sum::<usize>() as f64 / keys.len() as f64
    };

    let semantic_type = if non_null_count == 0 {
        ColumnSemanticType::Unknown
    } else if is_numeric {
        classify_numeric(&numbers, unique_ratio)
    } else if is_temporal(column) {
        ColumnSemanticType::Temporal
    } else {
        classify_text(unique_ratio, distinct.len(), avg_length)
    };

    ColumnProfile {
        name: column.name.clone(),
        semantic_type,
        null_ratio: if rows == 0 {
            0.0
        } else {
            (rows - non_null_count.min(rows)) as f64 / rows as f64
        },
        unique_ratio,
        distinct_count: distinct.len(),
        non_null_count,
        is_numeric,
        is_potential_key: unique_ratio > col_t::POTENTIAL_KEY,
        avg_length,
        stats,
    }
}

fn is_temporal(column: &Column) -> bool {
    let sample: Vec<&Value> = column.non_null().take(col_t::TEMPORAL_SAMPLE).collect();
    if sample.is_empty() {
        return false;
    }
    let parsed = sample
        .iter()
        .filter(|v| v.as_text().and_then(parse_date).is_some())
        .count();
    parsed as f64 / sample.len() as f64 > col_t::TEMPORAL_PARSE_RATIO
}

/// Semantic type of an all-numeric column.
pub(crate) fn classify_numeric(values: &[f64], unique_ratio: f64) -> ColumnSemanticType {
    let Some((min, max)) = stats::min_max(values) else {
        return ColumnSemanticType::Metric;
    };
    let mean = stats::mean(values).unwrap_or(0.0);
    let std = stats::std_dev(values).unwrap_or(0.0);

    if min >= 0.0 && max <= 1.0 {
        return ColumnSemanticType::Percentage;
    }
    if min >= 0.0 && max <= 100.0 && mean < col_t::PERCENT_MAX_MEAN && std < col_t::PERCENT_MAX_STD
    {
        return ColumnSemanticType::Percentage;
    }
    if min >= 0.0 && max > col_t::CURRENCY_MIN_MAGNITUDE {
        let two_decimals = values
            .iter()
            .filter(|v| stats::decimal_places(**v) == 2)
            .count();
        if two_decimals as f64 / values.len() as f64 > col_t::CURRENCY_DECIMAL_SHARE {
            return ColumnSemanticType::Currency;
        }
    }

    let all_integers = values.iter().all(|v| v.fract() == 0.0);
    if unique_ratio > col_t::ID_UNIQUENESS && all_integers {
        return ColumnSemanticType::EntityId;
    }
    if all_integers && min >= 0.0 {
        return ColumnSemanticType::Quantity;
    }
    ColumnSemanticType::Metric
}

/// Semantic type of a text column.
pub(crate) fn classify_text(
    unique_ratio: f64,
    distinct: usize,
    avg_length: f64,
) -> ColumnSemanticType {
    if unique_ratio > col_t::NAME_UNIQUENESS
        && avg_length > col_t::NAME_MIN_LENGTH
        && avg_length < col_t::NAME_MAX_LENGTH
    {
        return ColumnSemanticType::EntityName;
    }
    if unique_ratio <= col_t::STATUS_UNIQUENESS {
        if distinct < col_t::STATUS_MAX_DISTINCT {
            return ColumnSemanticType::Status;
        }
        return ColumnSemanticType::Dimension;
    }
    if avg_length > col_t::REMARK_MIN_LENGTH {
        return ColumnSemanticType::Remark;
    }
    if unique_ratio < col_t::DIMENSION_UNIQUENESS {
        return ColumnSemanticType::Dimension;
    }
    ColumnSemanticType::EntityName
}

fn detect_aggregations(sheet: &Sheet, columns: &[ColumnProfile], rows: usize) -> bool {
    if rows < 3 {
        return false;
    }

    let additive = columns
        .iter()
        .filter(|c| {
            matches!(
                c.semantic_type,
                ColumnSemanticType::Quantity
                    | ColumnSemanticType::Currency
                    | ColumnSemanticType::Metric
            )
        })
        .count();
    if rows < sheet_t::SMALL_SHEET_ROWS && additive as f64 > columns.len() as f64 * 0.5 {
        return true;
    }

    sheet
        .columns
        .iter()
        .filter(|c| c.is_numeric())
        .any(|c| has_total_row(&c.numeric_values()))
}

/// The last value equals the sum of the ones before it.
pub(crate) fn has_total_row(values: &[f64]) -> bool {
    let Some((last, rest)) = values.split_last() else {
        return false;
    };
    if rest.len() < 2 {
        return false;
    }
    let parts: f64 = rest.iter().sum();
    stats::approx_eq(parts, *last, sheet_t::AGGREGATION_TOLERANCE)
}

fn detect_comparisons(columns: &[ColumnProfile]) -> bool {
    let measures: Vec<&NumericProfile> = columns
        .iter()
        .filter(|c| c.semantic_type.is_measure())
        .filter_map(|c| c.stats.as_ref())
        .collect();

    for (i, a) in measures.iter().enumerate() {
        for b in &measures[i + 1..] {
            let (ra, rb) = (a.range(), b.range());
            if ra > 0.0 && rb > 0.0 && stats::ratio(ra, rb) > sheet_t::COMPARISON_RANGE_RATIO {
                return true;
            }
        }
    }

    columns
        .iter()
        .filter_map(|c| c.stats.as_ref())
        .any(|s| s.has_negatives)
}

const SCORED_ROLES: [SheetRole; 6] = [
    SheetRole::Master,
    SheetRole::Transactional,
    SheetRole::Plan,
    SheetRole::Actual,
    SheetRole::Summary,
    SheetRole::Comparison,
];

fn score_roles(p: &SheetProfile) -> (SheetRole, f64) {
    let mut scores = [0.0_f64; 6];
    let has_key = p.columns.iter().any(|c| c.is_potential_key);

    // MASTER
    if p.text_ratio > 0.4 && p.avg_uniqueness > 0.6 && p.temporal_columns == 0 {
        scores[0] += 0.4;
    }
    if has_key {
        scores[0] += 0.2;
    }
    // TRANSACTIONAL
    if p.temporal_columns > 0 && p.row_count > 20 {
        scores[1] += 0.3;
    }
    if p.temporal_coverage == TemporalCoverage::Past {
        scores[1] += 0.2;
    }
    // PLAN
    if p.temporal_coverage == TemporalCoverage::Future {
        scores[2] += 0.5;
    }
    if p.temporal_coverage == TemporalCoverage::Mixed && p.numeric_ratio > 0.5 {
        scores[2] += 0.3;
    }
    // ACTUAL
    if p.temporal_coverage == TemporalCoverage::Past && p.numeric_ratio > 0.5 {
        scores[3] += 0.4;
    }
    // SUMMARY
    if p.has_aggregations {
        scores[4] += 0.4;
    }
    if p.row_count < sheet_t::SMALL_SHEET_ROWS && p.numeric_ratio > 0.6 {
        scores[4] += 0.2;
    }
    // COMPARISON
    if p.has_comparisons {
        scores[5] += 0.5;
    }

    let mut best = 0;
    for i in 1..scores.len() {
        if scores[i] > scores[best] {
            best = i;
        }
    }
    let confidence = scores[best].min(1.0);
    if confidence < sheet_t::MIN_ROLE_SCORE {
        return (SheetRole::Unknown, confidence);
    }
    (SCORED_ROLES[best], confidence)
}

/// With no PLAN sheet, look for two structurally identical sheets keyed on
/// overlapping values. The one with rounder numbers is the plan.
fn refine_twin_sheets(sheets: &[Sheet], profiles: &mut [SheetProfile]) {
    if profiles.iter().any(|p| p.role == SheetRole::Plan) {
        return;
    }

    for i in 0..sheets.len() {
        for j in (i + 1)..sheets.len() {
            if !are_twins(&sheets[i], &sheets[j]) {
                continue;
            }
            let (plan, actual) = if roundness(&sheets[j]) > roundness(&sheets[i]) {
                (j, i)
            } else {
                (i, j)
            };
            debug!(
                plan = %sheets[plan].name,
                actual = %sheets[actual].name,
                "structural twin sheets"
            );
            profiles[plan].role = SheetRole::Plan;
            profiles[plan].confidence = sheet_t::TWIN_CONFIDENCE;
            profiles[actual].role = SheetRole::Actual;
            profiles[actual].confidence = sheet_t::TWIN_CONFIDENCE;
            return;
        }
    }
}

fn are_twins(a: &Sheet, b: &Sheet) -> bool {
    if a.is_empty() || b.is_empty() || a.columns.len() != b.columns.len() {
        return false;
    }
    let mut numeric = 0;
    let mut shared_key = false;
    for (ca, cb) in a.columns.iter().zip(&b.columns) {
        let (na, nb) = (ca.is_numeric(), cb.is_numeric());
        if na != nb {
            return false;
        }
        if na {
            numeric += 1;
        } else if !shared_key {
            let keys = ca.distinct_keys();
            shared_key = cb.distinct_keys().iter().any(|k| keys.contains(k));
        }
    }
    numeric > 0 && shared_key
}

fn roundness(sheet: &Sheet) -> f64 {
    let values: Vec<f64> = sheet
        .columns
        .iter()
        .filter(|c| c.is_numeric())
        .flat_map(|c| c.numeric_values())
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| stats::trailing_zeros(*v) as f64).sum::<f64>() / values.len() as f64
}

/// A PLAN with no ACTUAL promotes the most confident TRANSACTIONAL sheet.
fn refine_missing_actual(profiles: &mut [SheetProfile]) {
    let has_plan = profiles.iter().any(|p| p.role == SheetRole::Plan);
    let has_actual = profiles.iter().any(|p| p.role == SheetRole::Actual);
    if !has_plan || has_actual {
        return;
    }

    let mut best: Option<usize> = None;
    for (i, p) in profiles.iter().enumerate() {
        if p.role != SheetRole::Transactional {
            continue;
        }
        match best {
            Some(b) if profiles[b].confidence >= p.confidence => {}
            _ => best = Some(i),
        }
    }
    if let Some(i) = best {
        debug!(sheet = %profiles[i].name, "promoting transactional sheet to actual");
        profiles[i].role = SheetRole::Actual;
    }
}
