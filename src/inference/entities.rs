//! Cross-sheet entity detection.
//!
//! Identifier-like columns become candidates. Candidates that share values
//! and look alike (value pattern, cardinality, length) are linked into a
//! single [`Entity`] with union-find.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::short_id;
use crate::ontology::{ColumnSemanticType, Entity, EntityId, SourceColumn};
use crate::table::Sheet;

use super::classifier::{ColumnProfile, SheetProfile};
use super::thresholds::{entity as ent_t, similarity as sim_t};

/// Structural shape shared by most values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePattern {
    Numeric,
    Alpha,
    Alphanumeric,
    WithSpaces,
    CodeLike,
    Mixed,
}

static PATTERNS: LazyLock<Vec<(ValuePattern, Regex)>> = LazyLock::new(|| {
    vec![
        (ValuePattern::Numeric, Regex::new(r"^\d+$").unwrap()),
        (ValuePattern::Alpha, Regex::new(r"^[A-Za-z]+$").unwrap()),
        (ValuePattern::Alphanumeric, Regex::new(r"^[A-Za-z0-9]+$").unwrap()),
        (ValuePattern::WithSpaces, Regex::new(r"^[\w\s]+$").unwrap()),
        (ValuePattern::CodeLike, Regex::new(r"^[A-Z]{2,4}[-_]?\d+$").unwrap()),
    ]
});

impl ValuePattern {
    /// First pattern matched by at least 80% of a sorted sample.
    pub fn detect(values: &BTreeSet<String>) -> Self {
        let sample: Vec<&String> = values.iter().take(ent_t::PATTERN_SAMPLE).collect();
        if sample.is_empty() {
            return ValuePattern::Mixed;
        }
        for (pattern, re) in PATTERNS.iter() {
            let hits = sample.iter().filter(|v| re.is_match(v)).count();
            if hits as f64 / sample.len() as f64 >= ent_t::PATTERN_MATCH_SHARE {
                return *pattern;
            }
        }
        ValuePattern::Mixed
    }
}

/// A column that might identify an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCandidate {
    pub sheet: String,
    pub column: String,
    pub values: BTreeSet<String>,
    pub unique_ratio: f64,
    pub pattern: ValuePattern,
    pub avg_length: f64,
    pub is_numeric_id: bool,
}

impl EntityCandidate {
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }

    pub fn source(&self) -> SourceColumn {
        SourceColumn::new(self.sheet.clone(), self.column.clone())
    }

    /// Jaccard index of the two value sets.
    pub fn jaccard(&self, other: &Self) -> f64 {
        let union = self.values.union(&other.values).count();
        if union == 0 {
            return 0.0;
        }
        self.values.intersection(&other.values).count() as f64 / union as f64
    }

    /// Weighted similarity in [0, 1].
    pub fn similarity(&self, other: &Self) -> f64 {
        let pattern = if self.pattern == other.pattern {
            1.0
        } else {
            sim_t::PATTERN_MISMATCH
        };
        let (ca, cb) = (self.cardinality() as f64, other.cardinality() as f64);
        let cardinality = if ca.max(cb) > 0.0 { ca.min(cb) / ca.max(cb) } else { 0.0 };
        let (la, lb) = (self.avg_length, other.avg_length);
        let length = if la.max(lb) > 0.0 { la.min(lb) / la.max(lb) } else { 0.0 };

        sim_t::JACCARD * self.jaccard(other)
            + sim_t::PATTERN * pattern
            + sim_t::CARDINALITY * cardinality
            + sim_t::LENGTH * length
    }

    fn readability(&self) -> u32 {
        let mut score = 0;
        if !self.is_numeric_id {
            score += 2;
        }
        if matches!(self.pattern, ValuePattern::Alpha | ValuePattern::WithSpaces) {
            score += 1;
        }
        if self.cardinality() > 5 {
            score += 1;
        }
        score
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Attach `b`'s set under `a`'s root.
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Finds entities and keeps lookup indexes over them.
#[derive(Debug, Clone)]
pub struct EntityDetector {
    link_threshold: f64,
    candidates: Vec<EntityCandidate>,
    entities: Vec<Entity>,
    column_index: BTreeMap<SourceColumn, usize>,
    value_index: HashMap<String, Vec<usize>>,
}

impl Default for EntityDetector {
    fn default() -> Self {
        Self::new(ent_t::LINK_THRESHOLD)
    }
}

impl EntityDetector {
    pub fn new(link_threshold: f64) -> Self {
        Self {
            link_threshold,
            candidates: Vec::new(),
            entities: Vec::new(),
            column_index: BTreeMap::new(),
            value_index: HashMap::new(),
        }
    }

    /// Detect entities across `sheets`. `profiles` must be aligned with
    /// `sheets`, as produced by [`super::SheetClassifier::classify_all`].
    pub fn detect(&mut self, sheets: &[Sheet], profiles: &[SheetProfile]) -> &[Entity] {
        self.candidates.clear();
        self.entities.clear();
        self.column_index.clear();
        self.value_index.clear();

        for (sheet, profile) in sheets.iter().zip(profiles) {
            let rows = sheet.row_count();
            for (column, col_profile) in sheet.columns.iter().zip(&profile.columns) {
                if !is_candidate(col_profile, rows) {
                    continue;
                }
                let values = column.distinct_keys();
                if values.len() < 2 {
                    continue;
                }
                let present = col_profile.non_null_count.max(1) as f64;
                let lengths: Vec<usize> = column
                    .non_null()
                    .filter_map(|v| v.key())
                    .map(|k| k.chars().count())
                    .collect();
                let avg_length = lengths.iter().sum::<usize>() as f64 / lengths.len().max(1) as f64;
                let unique_ratio = values.len() as f64 / present;
                let candidate = EntityCandidate {
                    sheet: sheet.name.clone(),
                    column: column.name.clone(),
                    pattern: ValuePattern::detect(&values),
                    unique_ratio,
                    avg_length,
                    is_numeric_id: col_profile.is_numeric && unique_ratio > ent_t::PRIMARY_UNIQUENESS,
                    values,
                };
                debug!(
                    sheet = %candidate.sheet,
                    column = %candidate.column,
                    pattern = ?candidate.pattern,
                    "entity candidate"
                );
                self.candidates.push(candidate);
            }
        }

        let groups = self.link_candidates();
        for group in groups {
            self.add_entity(&group);
        }
        &self.entities
    }

    /// Whether two candidates describe the same entity.
    pub fn links(&self, a: &EntityCandidate, b: &EntityCandidate) -> bool {
        a.jaccard(b) > 0.0 && a.similarity(b) >= self.link_threshold
    }

    fn link_candidates(&self) -> Vec<Vec<usize>> {
        let n = self.candidates.len();
        let mut uf = UnionFind::new(n);
        let mut visited = vec![false; n];

        for i in 0..n {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for j in (i + 1)..n {
                if !visited[j] && self.links(&self.candidates[i], &self.candidates[j]) {
                    uf.union(i, j);
                    visited[j] = true;
                }
            }
        }

        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut order: Vec<usize> = Vec::new();
        for i in 0..n {
            let root = uf.find(i);
            let members = by_root.entry(root).or_default();
            if members.is_empty() {
                order.push(root);
            }
            members.push(i);
        }
        order
            .into_iter()
            .filter_map(|root| by_root.remove(&root))
            .collect()
    }

    fn add_entity(&mut self, group: &[usize]) {
        let members: Vec<&EntityCandidate> = group.iter().map(|&i| &self.candidates[i]).collect();
        let Some(first) = members.first() else {
            return;
        };

        let mut best = *first;
        for c in &members[1..] {
            if c.readability() > best.readability() {
                best = c;
            }
        }

        let source_columns: Vec<SourceColumn> = members.iter().map(|c| c.source()).collect();
        let mut source_sheets: Vec<String> = Vec::new();
        for c in &members {
            if !source_sheets.contains(&c.sheet) {
                source_sheets.push(c.sheet.clone());
            }
        }
        let all_values: BTreeSet<String> = members
            .iter()
            .flat_map(|c| c.values.iter().cloned())
            .collect();
        let is_primary = source_sheets.len() > 1
            || members
                .iter()
                .any(|c| c.unique_ratio > ent_t::PRIMARY_UNIQUENESS);

        let mut keys: Vec<String> = source_columns.iter().map(|s| s.to_string()).collect();
        keys.sort();
        let id: EntityId = short_id("ent", &keys, 12);

        let index = self.entities.len();
        for source in &source_columns {
            self.column_index.insert(source.clone(), index);
        }
        for value in &all_values {
            self.value_index.entry(value.clone()).or_default().push(index);
        }

        debug!(
            id = %id,
            name = %best.column,
            sheets = source_sheets.len(),
            "entity"
        );
        self.entities.push(Entity {
            id,
            canonical_name: best.column.clone(),
            source_columns,
            source_sheets,
            cardinality: all_values.len(),
            is_primary,
            related_entities: Vec::new(),
        });
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn candidates(&self) -> &[EntityCandidate] {
        &self.candidates
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// The entity a column was linked into, if any.
    pub fn entity_for_column(&self, sheet: &str, column: &str) -> Option<&Entity> {
        let key = SourceColumn::new(sheet, column);
        self.column_index
            .get(&key)
            .and_then(|&i| self.entities.get(i))
    }

    /// Entities whose columns contain `value` (canonical form).
    pub fn find_entities_by_value(&self, value: &str) -> Vec<&Entity> {
        self.value_index
            .get(value)
            .map(|ids| ids.iter().filter_map(|&i| self.entities.get(i)).collect())
            .unwrap_or_default()
    }

    /// Replace relationship lists once the graph is known.
    pub fn set_related(&mut self, related: impl Fn(&str) -> Vec<EntityId>) {
        for entity in &mut self.entities {
            entity.related_entities = related(&entity.id);
        }
    }
}

fn is_candidate(profile: &ColumnProfile, rows: usize) -> bool {
    match profile.semantic_type {
        ColumnSemanticType::EntityId | ColumnSemanticType::EntityName => return true,
        ColumnSemanticType::Dimension => {
            let distinct = profile.distinct_count as f64;
            if distinct >= 2.0 && distinct <= rows as f64 * ent_t::DIMENSION_MAX_SHARE {
                return true;
            }
        }
        _ => {}
    }
    profile.unique_ratio > ent_t::CANDIDATE_UNIQUENESS && profile.distinct_count >= 2
}
