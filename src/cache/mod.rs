//! Content hashing and the in-memory analysis store.
//!
//! Results are cached per dataset id and content hash. The store is an
//! explicit value owned by the caller; nothing is process-global.
//!
//! # Key Format
//!
//! ```text
//! {dataset_id}:{sha256 of workbook + engine config}  -> AnalysisResult
//! ```
//!
//! Lookups are advisory: evicting or clearing the store only costs a
//! re-analysis, the result is the same.

mod hash;
pub use hash::{compute_hash, digest_hex, short_id};

use std::collections::HashMap;

use crate::engine::AnalysisResult;

/// Cached analysis results.
#[derive(Debug, Clone, Default)]
pub struct AnalysisStore {
    entries: HashMap<String, AnalysisResult>,
    capacity: Option<usize>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that clears itself once `capacity` entries are held.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    fn key(dataset_id: &str, content_hash: &str) -> String {
        format!("{}:{}", dataset_id, content_hash)
    }

    pub fn get(&self, dataset_id: &str, content_hash: &str) -> Option<&AnalysisResult> {
        self.entries.get(&Self::key(dataset_id, content_hash))
    }

    pub fn insert(&mut self, dataset_id: &str, content_hash: &str, result: AnalysisResult) {
        if self.capacity.is_some_and(|cap| self.entries.len() >= cap) {
            self.entries.clear();
        }
        self.entries.insert(Self::key(dataset_id, content_hash), result);
    }

    /// Drop every result stored for `dataset_id`.
    pub fn invalidate(&mut self, dataset_id: &str) -> usize {
        let prefix = format!("{}:", dataset_id);
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(&prefix));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
