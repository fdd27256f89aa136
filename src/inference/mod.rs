//! Structural inference over normalized sheets.
//!
//! Two stages live here:
//!
//! 1. **Classification** - profile every column (semantic type, uniqueness,
//!    numeric shape) and score each sheet against six role hypotheses.
//! 2. **Entity detection** - find identifier-like columns and link the ones
//!    that describe the same thing across sheets.
//!
//! Both are pure heuristics: no vocabulary, no training data. Every cut-off
//! lives in [`thresholds`].
//!
//! # Example
//!
//! ```ignore
//! use decision_lens::inference::{EntityDetector, SheetClassifier};
//!
//! let profiles = SheetClassifier::default().classify_all(&workbook.sheets);
//! let entities = EntityDetector::default().detect(&workbook.sheets, &profiles);
//! ```

mod classifier;
mod entities;
pub mod temporal;

pub use classifier::{ColumnProfile, NumericProfile, SheetClassifier, SheetProfile};
pub use entities::{EntityCandidate, EntityDetector, ValuePattern};

/// Centralized cut-offs for the inference heuristics.
pub mod thresholds {
    /// Column-level semantic typing.
    pub mod column {
        /// Leading non-null values inspected for date parsing.
        pub const TEMPORAL_SAMPLE: usize = 20;
        /// Share of the sample that must parse as dates.
        pub const TEMPORAL_PARSE_RATIO: f64 = 0.8;
        /// Upper bound of the mean for a 0-100 percentage column.
        pub const PERCENT_MAX_MEAN: f64 = 50.0;
        /// Upper bound of the spread for a 0-100 percentage column.
        pub const PERCENT_MAX_STD: f64 = 30.0;
        /// Magnitude above which two-decimal numbers read as money.
        pub const CURRENCY_MIN_MAGNITUDE: f64 = 100.0;
        /// Share of values with exactly two decimals for currency.
        pub const CURRENCY_DECIMAL_SHARE: f64 = 0.5;
        /// Uniqueness above which an all-integer column is an identifier.
        pub const ID_UNIQUENESS: f64 = 0.9;
        /// Uniqueness above which a short text column names entities.
        pub const NAME_UNIQUENESS: f64 = 0.8;
        pub const NAME_MIN_LENGTH: f64 = 3.0;
        pub const NAME_MAX_LENGTH: f64 = 50.0;
        /// Uniqueness at or below which text is a status or dimension.
        pub const STATUS_UNIQUENESS: f64 = 0.1;
        /// Distinct values below which a low-uniqueness column is a status.
        pub const STATUS_MAX_DISTINCT: usize = 10;
        /// Average length above which text is a free-form remark.
        pub const REMARK_MIN_LENGTH: f64 = 50.0;
        /// Uniqueness below which short text is a dimension.
        pub const DIMENSION_UNIQUENESS: f64 = 0.5;
        /// Uniqueness above which a column could be a key.
        pub const POTENTIAL_KEY: f64 = 0.9;
    }

    /// Sheet-level signals and role scoring.
    pub mod sheet {
        /// Relative tolerance when comparing a total against its parts.
        pub const AGGREGATION_TOLERANCE: f64 = 0.01;
        /// Rows below which a numeric-heavy sheet looks like a summary.
        pub const SMALL_SHEET_ROWS: usize = 20;
        /// Range overlap (min/max ratio) suggesting side-by-side comparison.
        pub const COMPARISON_RANGE_RATIO: f64 = 0.5;
        /// Window around the reference date for temporal coverage.
        pub const TEMPORAL_MARGIN_DAYS: i64 = 30;
        /// Best role score below which a sheet is UNKNOWN.
        pub const MIN_ROLE_SCORE: f64 = 0.2;
        /// Confidence given to a plan/actual pair found by structure alone.
        pub const TWIN_CONFIDENCE: f64 = 0.5;
    }

    /// Entity candidate selection and linking.
    pub mod entity {
        /// Uniqueness above which any column is a candidate.
        pub const CANDIDATE_UNIQUENESS: f64 = 0.7;
        /// Maximum cardinality (as a share of rows) for a dimension candidate.
        pub const DIMENSION_MAX_SHARE: f64 = 0.8;
        /// Distinct values sampled for pattern detection.
        pub const PATTERN_SAMPLE: usize = 100;
        /// Share of the sample a pattern must match.
        pub const PATTERN_MATCH_SHARE: f64 = 0.8;
        /// Similarity at or above which two candidates link.
        pub const LINK_THRESHOLD: f64 = 0.3;
        /// Uniqueness above which a candidate makes its entity primary.
        pub const PRIMARY_UNIQUENESS: f64 = 0.9;
    }

    /// Weights of the candidate similarity score.
    pub mod similarity {
        pub const JACCARD: f64 = 0.5;
        pub const PATTERN: f64 = 0.2;
        pub const CARDINALITY: f64 = 0.15;
        pub const LENGTH: f64 = 0.15;
        /// Pattern credit when the two patterns differ.
        pub const PATTERN_MISMATCH: f64 = 0.3;
    }
}
