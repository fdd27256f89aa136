//! Append-only record of verdicts on decisions.
//!
//! Each decision can be decided once. The entry keeps a JSON snapshot of the
//! decision as it was when decided, so later re-analysis cannot rewrite what
//! the reviewer saw.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ontology::Decision;

/// Errors raised by [`DecisionLedger`].
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Decision {decision_id} was already {existing}")]
    Conflict {
        decision_id: String,
        existing: Verdict,
    },

    #[error("Unknown decision: {0}")]
    UnknownDecision(String),

    #[error("Failed to snapshot decision: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approve,
    Reject,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Approve => f.write_str("approved"),
            Verdict::Reject => f.write_str("rejected"),
        }
    }
}

/// One recorded verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub decision_id: String,
    pub verdict: Verdict,
    pub actor: String,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    /// The decision, evidence included, at the time of the verdict.
    pub snapshot: serde_json::Value,
}

/// In-memory, append-only ledger.
#[derive(Debug, Clone, Default)]
pub struct DecisionLedger {
    entries: Vec<LedgerEntry>,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict on `decision`.
    ///
    /// # Errors
    /// [`LedgerError::Conflict`] when the decision already has a verdict,
    /// even if the new verdict is the same.
    pub fn record(
        &mut self,
        decision: &Decision,
        verdict: Verdict,
        actor: &str,
        notes: Option<&str>,
    ) -> LedgerResult<&LedgerEntry> {
        if let Some(existing) = self.entry(&decision.id) {
            return Err(LedgerError::Conflict {
                decision_id: decision.id.clone(),
                existing: existing.verdict,
            });
        }
        let snapshot = serde_json::to_value(decision)?;
        self.entries.push(LedgerEntry {
            decision_id: decision.id.clone(),
            verdict,
            actor: actor.to_string(),
            notes: notes.map(str::to_string),
            recorded_at: Utc::now(),
            snapshot,
        });
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Record a verdict on the decision with `decision_id` among `decisions`.
    pub fn record_by_id(
        &mut self,
        decisions: &[Decision],
        decision_id: &str,
        verdict: Verdict,
        actor: &str,
        notes: Option<&str>,
    ) -> LedgerResult<&LedgerEntry> {
        let decision = decisions
            .iter()
            .find(|d| d.id == decision_id)
            .ok_or_else(|| LedgerError::UnknownDecision(decision_id.to_string()))?;
        self.record(decision, verdict, actor, notes)
    }

    pub fn approve(&mut self, decision: &Decision, actor: &str, notes: Option<&str>) -> LedgerResult<&LedgerEntry> {
        self.record(decision, Verdict::Approve, actor, notes)
    }

    pub fn reject(&mut self, decision: &Decision, actor: &str, notes: Option<&str>) -> LedgerResult<&LedgerEntry> {
        self.record(decision, Verdict::Reject, actor, notes)
    }

    pub fn entry(&self, decision_id: &str) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.decision_id == decision_id)
    }

    /// All entries in recording order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
