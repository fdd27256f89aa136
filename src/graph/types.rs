//! Edge types for the relationship graph.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How two nodes came to be related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Both entity columns are filled in most rows of one sheet.
    CoOccurs,
    /// A multi-sheet entity sits next to another entity in a secondary sheet.
    References,
    /// A summary sheet holds the total of a detail sheet column.
    Aggregates,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::CoOccurs => "co_occurs",
            RelationshipType::References => "references",
            RelationshipType::Aggregates => "aggregates",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undirected, weighted link between two nodes.
///
/// Nodes are entity ids or `sheet:<name>` pseudo-nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub relationship_type: RelationshipType,
    /// Confidence in [0, 1].
    pub strength: f64,
    pub evidence: BTreeMap<String, serde_json::Value>,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: RelationshipType,
        strength: f64,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship_type,
            strength,
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.evidence.insert(key.to_string(), value.into());
        self
    }

    /// Whether this edge joins `a` and `b`, in either order.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}
