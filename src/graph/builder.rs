//! Graph construction from classified sheets and detected entities.
//!
//! Construction runs three independent passes:
//! - co-occurrence of entity columns within a sheet
//! - cross-sheet references of multi-sheet entities
//! - summary sheets holding totals of detail sheet columns

use tracing::debug;

use crate::inference::{EntityDetector, SheetProfile};
use crate::ontology::{Entity, SheetRole};
use crate::table::{stats, Sheet};

use super::{sheet_node, Relationship, RelationshipGraph, RelationshipType};

/// Share of rows in which both entity columns must be filled.
pub const CO_OCCURRENCE_MIN_SHARE: f64 = 0.5;
/// Strength of a cross-sheet reference.
pub const REFERENCE_STRENGTH: f64 = 0.7;
/// Strength of a sheet aggregation edge.
pub const AGGREGATION_STRENGTH: f64 = 0.9;
/// Relative tolerance when matching a summary value to a detail total.
pub const AGGREGATION_TOLERANCE: f64 = 0.01;

impl RelationshipGraph {
    /// Build the graph. `profiles` must be aligned with `sheets`.
    pub fn build(sheets: &[Sheet], profiles: &[SheetProfile], detector: &EntityDetector) -> Self {
        let mut graph = Self::new();
        graph.add_co_occurrences(sheets, detector);
        graph.add_references(sheets, detector);
        graph.add_aggregations(sheets, profiles);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "relationship graph built"
        );
        graph
    }

    fn add_co_occurrences(&mut self, sheets: &[Sheet], detector: &EntityDetector) {
        for sheet in sheets {
            let rows = sheet.row_count();
            if rows == 0 {
                continue;
            }
            let entity_columns: Vec<(usize, &Entity)> = sheet
                .columns
                .iter()
                .enumerate()
                .filter_map(|(i, c)| detector.entity_for_column(&sheet.name, &c.name).map(|e| (i, e)))
                .collect();

            for (pos, (ci, ea)) in entity_columns.iter().enumerate() {
                for (cj, eb) in &entity_columns[pos + 1..] {
                    if ea.id == eb.id {
                        continue;
                    }
                    let (a, b) = (&sheet.columns[*ci], &sheet.columns[*cj]);
                    let both = (0..rows)
                        .filter(|&r| !a.get(r).is_null() && !b.get(r).is_null())
                        .count();
                    let share = both as f64 / rows as f64;
                    if share > CO_OCCURRENCE_MIN_SHARE {
                        self.add_relationship(
                            Relationship::new(&ea.id, &eb.id, RelationshipType::CoOccurs, share)
                                .with_evidence("sheet", sheet.name.as_str())
                                .with_evidence("source_column", a.name.as_str())
                                .with_evidence("target_column", b.name.as_str())
                                .with_evidence("co_occurrence_count", both),
                        );
                    }
                }
            }
        }
    }

    fn add_references(&mut self, sheets: &[Sheet], detector: &EntityDetector) {
        for entity in detector.entities() {
            let Some((home, others)) = entity.source_sheets.split_first() else {
                continue;
            };
            for other in others {
                let Some(sheet) = sheets.iter().find(|s| &s.name == other) else {
                    continue;
                };
                for column in &sheet.columns {
                    let Some(target) = detector.entity_for_column(&sheet.name, &column.name) else {
                        continue;
                    };
                    if target.id == entity.id {
                        continue;
                    }
                    self.add_relationship(
                        Relationship::new(
                            &entity.id,
                            &target.id,
                            RelationshipType::References,
                            REFERENCE_STRENGTH,
                        )
                        .with_evidence("mechanism", "cross_sheet_reference")
                        .with_evidence("sheets", vec![home.clone(), other.clone()]),
                    );
                }
            }
        }
    }

    fn add_aggregations(&mut self, sheets: &[Sheet], profiles: &[SheetProfile]) {
        let with_role = |roles: &[SheetRole]| -> Vec<&Sheet> {
            sheets
                .iter()
                .zip(profiles)
                .filter(|(_, p)| roles.contains(&p.role))
                .map(|(s, _)| s)
                .collect()
        };
        let summaries = with_role(&[SheetRole::Summary]);
        let details = with_role(&[SheetRole::Transactional, SheetRole::Actual, SheetRole::Plan]);

        for summary in &summaries {
            for detail in &details {
                if let Some((sum_col, det_col)) = find_aggregated_column(summary, detail) {
                    self.add_relationship(
                        Relationship::new(
                            sheet_node(&detail.name),
                            sheet_node(&summary.name),
                            RelationshipType::Aggregates,
                            AGGREGATION_STRENGTH,
                        )
                        .with_evidence("detail_column", det_col)
                        .with_evidence("summary_column", sum_col)
                        .with_evidence("aggregation_type", "sum"),
                    );
                }
            }
        }
    }
}

/// First (summary column, detail column) where a summary value equals the
/// detail column total.
fn find_aggregated_column<'a>(summary: &'a Sheet, detail: &'a Sheet) -> Option<(&'a str, &'a str)> {
    for sum_col in summary.columns.iter().filter(|c| c.is_numeric()) {
        let values = sum_col.numeric_values();
        for det_col in detail.columns.iter().filter(|c| c.is_numeric()) {
            let total: f64 = det_col.numeric_values().iter().sum();
            if values
                .iter()
                .any(|v| stats::approx_eq(*v, total, AGGREGATION_TOLERANCE))
            {
                return Some((sum_col.name.as_str(), det_col.name.as_str()));
            }
        }
    }
    None
}
