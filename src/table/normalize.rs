//! Sheet normalization applied before any inference.

use std::collections::{HashMap, HashSet};

use super::{Column, Sheet, Value};

/// Clean a sheet for analysis.
///
/// - trims column names
/// - drops unnamed index columns (`Unnamed: 0`, empty names)
/// - drops fully empty rows and columns
/// - renames duplicate column names to `name_0`, `name_1`, ..., skipping
///   suffixes already used by another column
///
/// Returns `None` when nothing is left.
pub fn normalize_sheet(sheet: &Sheet) -> Option<Sheet> {
    let mut columns: Vec<Column> = sheet
        .columns
        .iter()
        .map(|c| Column::new(c.name.trim(), c.values.clone()))
        .filter(|c| !is_unnamed(&c.name))
        .collect();

    if columns.is_empty() {
        return None;
    }

    let rows = columns.iter().map(Column::len).max().unwrap_or(0);
    let kept_rows: Vec<usize> = (0..rows)
        .filter(|&r| columns.iter().any(|c| !c.get(r).is_null()))
        .collect();

    for column in &mut columns {
        let values: Vec<Value> = kept_rows.iter().map(|&r| column.get(r).clone()).collect();
        column.values = values;
    }
    columns.retain(|c| c.non_null_count() > 0);

    if columns.is_empty() || kept_rows.is_empty() {
        return None;
    }

    dedupe_names(&mut columns);
    Some(Sheet::new(sheet.name.clone(), columns))
}

fn is_unnamed(name: &str) -> bool {
    name.is_empty() || name.to_ascii_lowercase().starts_with("unnamed:")
}

fn dedupe_names(columns: &mut [Column]) {
    let mut totals: HashMap<String, usize> = HashMap::new();
    for c in columns.iter() {
        *totals.entry(c.name.clone()).or_insert(0) += 1;
    }

    let mut taken: HashSet<String> = totals.keys().cloned().collect();
    let mut next: HashMap<String, usize> = HashMap::new();
    for c in columns.iter_mut() {
        if totals.get(&c.name).copied().unwrap_or(0) < 2 {
            continue;
        }
        let n = next.entry(c.name.clone()).or_insert(0);
        let mut renamed = format!("{}_{}", c.name, n);
        while taken.contains(&renamed) {
            *n += 1;
            renamed = format!("{}_{}", c.name, n);
        }
        *n += 1;
        taken.insert(renamed.clone());
        c.name = renamed;
    }
}
