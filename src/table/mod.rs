//! In-memory workbook model.
//!
//! A [`Workbook`] is an ordered list of named sheets; each sheet is a list of
//! named columns holding heterogeneous, possibly missing [`Value`]s. Raw file
//! parsing (CSV, spreadsheet formats) happens elsewhere; this crate reads a
//! small JSON interchange form:
//!
//! ```json
//! {"sheets": [{"name": "Budget", "columns": [
//!     {"name": "Region", "values": ["North", "South"]},
//!     {"name": "Target", "values": [100, 120]}
//! ]}]}
//! ```

pub mod normalize;
pub mod stats;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WorkbookError, WorkbookResult};

/// A single cell.
///
/// NaN numbers and blank text count as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

static NULL: Value = Value::Null;

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Whether this cell carries no information.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(s) => s.trim().is_empty(),
            Value::Bool(_) => false,
        }
    }

    /// Numeric view of the cell. Only finite numbers qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    /// Canonical string form used for distinct-value sets and joins.
    ///
    /// Integral numbers render without a fractional part (`100`, not `100.0`).
    pub fn key(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        Some(match self {
            Value::Number(n) => format!("{}", n),
            Value::Text(s) => s.trim().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => return None,
        })
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column of numbers.
    pub fn numbers(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().map(|v| Value::Number(*v)).collect())
    }

    /// Column of text cells. Empty strings become missing values.
    pub fn texts(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, values.iter().map(|v| Value::from(*v)).collect())
    }

    /// Cell at `row`, or [`Value::Null`] past the end.
    pub fn get(&self, row: usize) -> &Value {
        self.values.get(row).unwrap_or(&NULL)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_null())
    }

    pub fn non_null_count(&self) -> usize {
        self.non_null().count()
    }

    /// A column is numeric when it has data and every present cell is a number.
    pub fn is_numeric(&self) -> bool {
        let mut any = false;
        for v in self.non_null() {
            if v.as_f64().is_none() {
                return false;
            }
            any = true;
        }
        any
    }

    /// Finite numbers in row order, missing cells skipped.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Numbers aligned to rows, missing cells as `None`.
    pub fn numeric_by_row(&self, rows: usize) -> Vec<Option<f64>> {
        (0..rows).map(|r| self.get(r).as_f64()).collect()
    }

    /// Canonical distinct values.
    pub fn distinct_keys(&self) -> BTreeSet<String> {
        self.values.iter().filter_map(Value::key).collect()
    }

    /// Occurrences per canonical value, in first-seen order.
    pub fn value_counts(&self) -> Vec<(String, usize)> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for key in self.values.iter().filter_map(Value::key) {
            let entry = counts.entry(key.clone()).or_insert(0);
            if *entry == 0 {
                order.push(key);
            }
            *entry += 1;
        }
        order
            .into_iter()
            .map(|k| {
                let n = counts.get(&k).copied().unwrap_or(0);
                (k, n)
            })
            .collect()
    }

    /// Distinct present values divided by present values.
    pub fn unique_ratio(&self) -> f64 {
        let present = self.non_null_count();
        if present == 0 {
            return 0.0;
        }
        self.distinct_keys().len() as f64 / present as f64
    }
}

/// A named table of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Number of rows, taken from the longest column.
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.row_count() == 0
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Parse the JSON interchange form.
    pub fn from_json_str(json: &str) -> WorkbookResult<Self> {
        let workbook: Workbook = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        for sheet in &workbook.sheets {
            if !seen.insert(sheet.name.as_str()) {
                return Err(WorkbookError::DuplicateSheet(sheet.name.clone()));
            }
        }
        Ok(workbook)
    }

    /// Load a workbook from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> WorkbookResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WorkbookError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
