//! Decision generation, grouping and review.
//!
//! - [`DecisionGenerator`] proposes ranked decisions from gaps, constraints,
//!   gap patterns and the relationship graph.
//! - [`DecisionGroupingEngine`] clusters those decisions into themes.
//! - [`DecisionLedger`] records approve/reject verdicts against them.

mod generator;
mod grouping;
mod ledger;

pub use generator::{
    scores, top_summary, DecisionGenerator, DEFAULT_MAX_SUPPORTING, NO_DECISIONS_SUMMARY,
};
pub use grouping::{
    overlap, DecisionGroupingEngine, DecisionTheme, GroupingSummary, DEFAULT_THEME_OVERLAP,
};
pub use ledger::{DecisionLedger, LedgerEntry, LedgerError, LedgerResult, Verdict};
