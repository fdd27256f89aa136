//! Undirected relationship graph over entities and sheets.
//!
//! Entities are linked when they co-occur in rows or when a multi-sheet
//! entity references another; sheets are linked when one aggregates another.
//! Sheet nodes carry the [`SHEET_NODE_PREFIX`] so they never collide with
//! entity ids.

mod builder;
pub mod query;
pub mod types;

pub use types::*;

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

/// Prefix of sheet pseudo-nodes (`sheet:Budget`).
pub const SHEET_NODE_PREFIX: &str = "sheet:";

/// Node id for a sheet.
pub fn sheet_node(sheet: &str) -> String {
    format!("{}{}", SHEET_NODE_PREFIX, sheet)
}

/// The relationship graph.
#[derive(Debug, Clone)]
pub struct RelationshipGraph {
    /// The underlying undirected graph; node weights are node ids
    graph: UnGraph<String, Relationship>,

    /// Index: node id → NodeIndex
    node_index: HashMap<String, NodeIndex>,
}

impl RelationshipGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            node_index: HashMap::new(),
        }
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(idx) = self.node_index.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.node_index.insert(id.to_string(), idx);
        idx
    }

    /// Add an edge. A second edge between the same pair keeps the stronger one.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        if relationship.source == relationship.target {
            return;
        }
        let a = self.ensure_node(&relationship.source);
        let b = self.ensure_node(&relationship.target);
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if let Some(existing) = self.graph.edge_weight_mut(edge) {
                    if relationship.strength > existing.strength {
                        *existing = relationship;
                    }
                }
            }
            None => {
                self.graph.add_edge(a, b, relationship);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }
}

impl Default for RelationshipGraph {
    fn default() -> Self {
        Self::new()
    }
}
