//! End-to-end analysis of one workbook.
//!
//! ```text
//! Workbook → normalize → classify → entities → graph → metrics/dimensions
//!          → gaps → constraints → decisions → themes → AnalysisResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use decision_lens::{DecisionIntelligenceEngine, EngineConfig, Workbook};
//!
//! let workbook = Workbook::from_path("q3.json")?;
//! let engine = DecisionIntelligenceEngine::new(EngineConfig::default());
//! let result = engine.analyze(&workbook, "q3");
//! println!("{}", result.top_decision_summary);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analysis::{ConstraintExtractor, GapAnalyzer};
use crate::cache::{compute_hash, AnalysisStore};
use crate::decision::{
    top_summary, DecisionGenerator, DecisionGroupingEngine, DecisionTheme, GroupingSummary,
    DEFAULT_MAX_SUPPORTING, DEFAULT_THEME_OVERLAP,
};
use crate::graph::{RelationshipGraph, SHEET_NODE_PREFIX};
use crate::inference::{thresholds, EntityDetector, SheetClassifier, SheetProfile};
use crate::ontology::{
    Actual, ColumnSemanticType, Constraint, Decision, DecisionContext, Entity, Gap, Plan,
    SheetRole,
};
use crate::table::{normalize::normalize_sheet, Sheet, Workbook};

/// Decisions concatenated into [`AnalysisResult::top_decision_summary`].
pub const TOP_SUMMARY_COUNT: usize = 3;

// ============================================================================
// Configuration
// ============================================================================

/// Knobs for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Anchor for past/future temporal coverage. `None` means today (UTC).
    pub reference_date: Option<NaiveDate>,
    /// Similarity at or above which entity candidates link.
    pub link_threshold: f64,
    /// Supporting gaps and constraints kept per decision.
    pub max_supporting: usize,
    /// Overlap above which two themes are duplicates.
    pub theme_overlap: f64,
    /// Whether to cluster decisions into themes.
    pub group_themes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            link_threshold: thresholds::entity::LINK_THRESHOLD,
            max_supporting: DEFAULT_MAX_SUPPORTING,
            theme_overlap: DEFAULT_THEME_OVERLAP,
            group_themes: true,
        }
    }
}

impl EngineConfig {
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_link_threshold(mut self, threshold: f64) -> Self {
        self.link_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_supporting(mut self, max: usize) -> Self {
        self.max_supporting = max;
        self
    }

    pub fn with_theme_overlap(mut self, overlap: f64) -> Self {
        self.theme_overlap = overlap.clamp(0.0, 1.0);
        self
    }

    pub fn with_theme_grouping(mut self, enabled: bool) -> Self {
        self.group_themes = enabled;
        self
    }

    /// This config with `reference_date` pinned, today (UTC) when unset.
    pub fn resolved(&self) -> Self {
        let mut config = self.clone();
        config
            .reference_date
            .get_or_insert_with(|| Utc::now().date_naive());
        config
    }
}

// ============================================================================
// Result
// ============================================================================

/// Everything one analysis produced.
///
/// Non-finite numbers serialize as JSON `null`; optional numeric fields are
/// cleared to `None` before the result is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub dataset_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub sheet_count: usize,
    pub sheet_roles: BTreeMap<String, SheetRole>,
    pub sheet_profiles: Vec<SheetProfile>,
    pub entity_count: usize,
    pub entities: Vec<Entity>,
    pub entity_graph: BTreeMap<String, Vec<String>>,
    pub gap_count: usize,
    pub critical_gaps: usize,
    pub gaps: Vec<Gap>,
    pub plans: Vec<Plan>,
    pub actuals: Vec<Actual>,
    pub constraint_count: usize,
    pub blocking_constraints: usize,
    pub constraints: Vec<Constraint>,
    pub decision_count: usize,
    pub decisions: Vec<Decision>,
    pub top_decision_summary: String,
    pub themes: Vec<DecisionTheme>,
    pub grouping_summary: GroupingSummary,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub processing_notes: Vec<String>,
}

impl AnalysisResult {
    pub fn decision(&self, id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.id == id)
    }

    pub fn theme(&self, id: &str) -> Option<&DecisionTheme> {
        self.themes.iter().find(|t| t.id == id)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Runs the full pipeline. Every call builds its own context; the engine
/// itself holds only configuration, so one instance can serve many workbooks.
#[derive(Debug, Clone, Default)]
pub struct DecisionIntelligenceEngine {
    config: EngineConfig,
}

impl DecisionIntelligenceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze `workbook`. Never fails: unusable sheets are skipped with a
    /// note and thin data gives empty lists.
    pub fn analyze(&self, workbook: &Workbook, dataset_id: &str) -> AnalysisResult {
        self.run(&self.config.resolved(), workbook, dataset_id)
    }

    fn run(&self, config: &EngineConfig, workbook: &Workbook, dataset_id: &str) -> AnalysisResult {
        let mut notes = Notes::default();
        let mut context = DecisionContext::default();

        notes.push(format!("Starting analysis of {} sheets", workbook.sheets.len()));

        notes.push("Step 1: Normalizing data...");
        let sheets: Vec<Sheet> = workbook
            .sheets
            .iter()
            .filter_map(|sheet| match normalize_sheet(sheet) {
                Some(normalized) => Some(normalized),
                None => {
                    warn!(sheet = %sheet.name, "sheet skipped: no usable data");
                    notes.push(format!("  Skipped sheet '{}': no usable data", sheet.name));
                    None
                }
            })
            .collect();

        notes.push("Step 2: Classifying sheets...");
        let classifier = SheetClassifier::new(
            config
                .reference_date
                .unwrap_or_else(|| Utc::now().date_naive()),
        );
        let profiles = classifier.classify_all(&sheets);
        for profile in &profiles {
            notes.push(format!(
                "  Sheet '{}': {} (confidence: {:.2})",
                profile.name, profile.role, profile.confidence
            ));
        }

        notes.push("Step 3: Detecting entities...");
        let mut detector = EntityDetector::new(config.link_threshold);
        detector.detect(&sheets, &profiles);
        notes.push(format!("  Detected {} unique entities", detector.entities().len()));

        notes.push("Step 4: Building relationship graph...");
        let graph = RelationshipGraph::build(&sheets, &profiles, &detector);
        detector.set_related(|id| {
            graph
                .related(id)
                .into_iter()
                .filter(|n| !n.starts_with(SHEET_NODE_PREFIX))
                .collect()
        });
        context.entities = detector.entities().to_vec();
        context.entity_graph = graph.adjacency();
        notes.push(format!("  Built graph with {} relationships", graph.edge_count()));

        notes.push("Step 5: Identifying metrics and dimensions...");
        let (metrics, dimensions) = global_columns(&profiles);
        notes.push(format!(
            "  Found {} metrics, {} dimensions",
            metrics.len(),
            dimensions.len()
        ));
        context.metadata.insert("dataset_id".into(), dataset_id.into());
        context.metadata.insert("sheet_count".into(), sheets.len().into());
        context.metadata.insert("global_metrics".into(), metrics.into_iter().collect());
        context.metadata.insert("global_dimensions".into(), dimensions.into_iter().collect());

        notes.push("Step 6: Analyzing gaps...");
        let mut gap_analyzer = GapAnalyzer::new();
        gap_analyzer.analyze(&sheets, &profiles, &detector);
        let critical_gaps = gap_analyzer.critical_gaps().len();
        let (gaps, plans, actuals) = gap_analyzer.into_parts();
        notes.push(format!("  Found {} gaps ({} critical)", gaps.len(), critical_gaps));
        context.gaps = gaps;
        context.plans = plans;
        context.actuals = actuals;

        notes.push("Step 7: Extracting constraints...");
        let mut extractor = ConstraintExtractor::new();
        extractor.extract(&sheets, &profiles, &detector);
        let blocking_constraints = extractor.blocking().len();
        context.constraints = extractor.into_constraints();
        notes.push(format!(
            "  Extracted {} constraints ({} blocking)",
            context.constraints.len(),
            blocking_constraints
        ));

        notes.push("Step 8: Generating decisions...");
        let mut generator = DecisionGenerator::new(config.max_supporting);
        generator.generate(&context, &graph);
        let (decisions, actions) = generator.into_parts();
        context.decisions = decisions;
        context.actions = actions;

        let references = context.check_references();
        if let Err(violation) = &references {
            error!(%violation, "analysis context is inconsistent");
        }
        debug_assert!(references.is_ok(), "{references:?}");

        notes.push("Step 9: Compiling results...");
        let (themes, grouping_summary) = if config.group_themes {
            let mut grouping = DecisionGroupingEngine::new(config.theme_overlap);
            let (themes, summary) =
                grouping.group(&context.decisions, &context.entities, &context.gaps);
            (themes.to_vec(), summary)
        } else {
            (Vec::new(), GroupingSummary::default())
        };

        notes.push(format!(
            "Analysis complete. Found {} decision candidates.",
            context.decisions.len()
        ));

        let mut result = AnalysisResult {
            dataset_id: dataset_id.to_string(),
            analyzed_at: Utc::now(),
            sheet_count: sheets.len(),
            sheet_roles: profiles.iter().map(|p| (p.name.clone(), p.role)).collect(),
            sheet_profiles: profiles,
            entity_count: context.entities.len(),
            entities: context.entities,
            entity_graph: context.entity_graph,
            gap_count: context.gaps.len(),
            critical_gaps,
            gaps: context.gaps,
            plans: context.plans,
            actuals: context.actuals,
            constraint_count: context.constraints.len(),
            blocking_constraints,
            constraints: context.constraints,
            decision_count: context.decisions.len(),
            top_decision_summary: top_summary(&context.decisions, TOP_SUMMARY_COUNT),
            decisions: context.decisions,
            themes,
            grouping_summary,
            metadata: context.metadata,
            processing_notes: notes.into_inner(),
        };
        clear_non_finite(&mut result);
        result
    }

    /// Like [`analyze`](Self::analyze), reusing a stored result when the
    /// same dataset id, workbook content and configuration were seen before.
    /// The key covers the resolved reference date, so an unpinned engine
    /// misses once the day changes.
    pub fn analyze_cached(
        &self,
        workbook: &Workbook,
        dataset_id: &str,
        store: &mut AnalysisStore,
    ) -> AnalysisResult {
        let config = self.config.resolved();
        let content_hash = match cache_key(workbook, &config) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(%err, "workbook not hashable, analysis not cached");
                return self.run(&config, workbook, dataset_id);
            }
        };
        if let Some(hit) = store.get(dataset_id, &content_hash) {
            info!(dataset_id, "analysis cache hit");
            return hit.clone();
        }
        let result = self.run(&config, workbook, dataset_id);
        store.insert(dataset_id, &content_hash, result.clone());
        result
    }
}

/// Content hash of a workbook under a resolved config.
pub fn cache_key(workbook: &Workbook, config: &EngineConfig) -> serde_json::Result<String> {
    compute_hash(&(workbook, config))
}

/// Processing notes, each stamped and mirrored to the log.
#[derive(Default)]
struct Notes(Vec<String>);

impl Notes {
    fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message.trim_start());
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.0.push(format!("[{stamp}] {message}"));
    }

    fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Distinct measure and dimension column names across all sheets.
fn global_columns(profiles: &[SheetProfile]) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut metrics = BTreeSet::new();
    let mut dimensions = BTreeSet::new();
    for column in profiles.iter().flat_map(|p| &p.columns) {
        if column.semantic_type.is_measure() {
            metrics.insert(column.name.clone());
        } else if column.semantic_type == ColumnSemanticType::Dimension {
            dimensions.insert(column.name.clone());
        }
    }
    (metrics, dimensions)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn clear_non_finite(result: &mut AnalysisResult) {
    for gap in &mut result.gaps {
        gap.plan_value = finite(gap.plan_value);
        gap.actual_value = finite(gap.actual_value);
        gap.percentage_gap = finite(gap.percentage_gap);
    }
    for profile in &mut result.sheet_profiles {
        for column in &mut profile.columns {
            if let Some(stats) = &mut column.stats {
                stats.std = finite(stats.std);
            }
        }
    }
}
