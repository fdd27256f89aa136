//! Gap and constraint analysis.
//!
//! [`GapAnalyzer`] compares planned against realized numbers using three
//! structural strategies; [`ConstraintExtractor`] reads limiting factors out
//! of status, remark and category columns. Both attribute their findings to
//! entities found by [`crate::inference::EntityDetector`].

mod constraints;
mod gaps;

pub use constraints::ConstraintExtractor;
pub use gaps::{direction_for, percentage_gap, severity_for, ColumnPair, GapAnalyzer};

/// Centralized cut-offs for gap and constraint analysis.
pub mod thresholds {
    /// Plan/actual pairing and gap scoring.
    pub mod gap {
        /// |percentage gap| below which a gap is on target and normal.
        pub const ON_TARGET_PCT: f64 = 5.0;
        /// |percentage gap| at or above which a gap is critical.
        pub const CRITICAL_PCT: f64 = 15.0;
        /// Minimum range/mean similarity for a cross-sheet metric pair.
        pub const METRIC_MATCH_SCORE: f64 = 0.3;
        /// Correlation above which two columns in a sheet form a pair.
        pub const PAIR_CORRELATION: f64 = 0.7;
        /// Variance ratio below which the smoother column is the plan.
        pub const PAIR_VARIANCE_RATIO: f64 = 0.8;
        pub const PAIR_CONFIDENCE: f64 = 0.7;
        /// |mean| / std below which a signed column holds differences.
        pub const DIFF_CENTERING: f64 = 0.5;
        /// Differences at or below this are noise.
        pub const DIFF_MIN_ABS: f64 = 0.01;
        pub const RECORD_CONFIDENCE: f64 = 0.8;
    }

    /// Constraint extraction.
    pub mod constraint {
        /// Uniqueness below which a plain text column is categorical.
        pub const CATEGORY_UNIQUENESS: f64 = 0.3;
        /// Share below which a minority status needs attention.
        pub const ATTENTION_SHARE: f64 = 0.2;
        /// Share below which a value is an exception.
        pub const RARE_SHARE: f64 = 0.05;
        /// Remark cells shorter than this are skipped.
        pub const MIN_REMARK_CHARS: usize = 3;
        /// Confidence above which the type-based severity applies.
        pub const SEVERITY_CONFIDENCE: f64 = 0.7;
        pub const STATUS_CONFIDENCE: f64 = 0.6;
        pub const CATEGORY_CONFIDENCE: f64 = 0.5;
        pub const MAX_SOURCE_CHARS: usize = 200;
        pub const MAX_MATCH_CHARS: usize = 100;
    }
}
