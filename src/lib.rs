//! # Decision Lens
//!
//! Schema-agnostic decision intelligence over multi-sheet business workbooks.
//!
//! ## Architecture
//!
//! A workbook of unknown shape goes through a strict, deterministic pipeline.
//! Every stage is a structural heuristic; none of them relies on domain
//! vocabulary.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Workbook (sheets × columns)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [table::normalize]
//! ┌─────────────────────────────────────────────────────────┐
//! │            SheetClassifier  →  SheetProfile              │
//! │      (sheet role + per-column semantic type)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference::entities]
//! ┌─────────────────────────────────────────────────────────┐
//! │     EntityDetector (cross-sheet linking, union-find)     │
//! │     RelationshipGraph (co-occurs/references/aggregates)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [analysis]
//! ┌─────────────────────────────────────────────────────────┐
//! │   GapAnalyzer (plan vs actual)  ConstraintExtractor      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [decision]
//! ┌─────────────────────────────────────────────────────────┐
//! │   DecisionGenerator → DecisionGroupingEngine (themes)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [engine]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    AnalysisResult                        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod analysis;
pub mod cache;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod graph;
pub mod inference;
pub mod logging;
pub mod ontology;
pub mod table;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analysis::{ConstraintExtractor, GapAnalyzer};
    pub use crate::decision::{
        DecisionGenerator, DecisionGroupingEngine, DecisionLedger, DecisionTheme, Verdict,
    };
    pub use crate::engine::{AnalysisResult, DecisionIntelligenceEngine, EngineConfig};
    pub use crate::graph::RelationshipGraph;
    pub use crate::inference::{EntityDetector, SheetClassifier, SheetProfile};
    pub use crate::ontology::{
        ColumnSemanticType, Constraint, ConstraintType, Decision, DecisionContext, DecisionType,
        Entity, Gap, GapDirection, Severity, SheetRole,
    };
    pub use crate::table::{Column, Sheet, Value, Workbook};
}

pub use engine::{AnalysisResult, DecisionIntelligenceEngine, EngineConfig};
pub use table::{Column, Sheet, Value, Workbook};
