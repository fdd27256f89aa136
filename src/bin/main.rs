//! decision-lens CLI - Find decisions hiding in a workbook
//!
//! Usage:
//!   decision-lens analyze <workbook.json> [--dataset-id <id>] [--config <path>] [--compact]
//!   decision-lens profile <workbook.json> [--config <path>]
//!
//! Examples:
//!   decision-lens analyze q3.json
//!   decision-lens analyze q3.json --dataset-id q3-final --compact
//!   decision-lens profile q3.json

use clap::{Parser, Subcommand};
use decision_lens::config::Settings;
use decision_lens::inference::SheetClassifier;
use decision_lens::table::normalize::normalize_sheet;
use decision_lens::{logging, DecisionIntelligenceEngine, Sheet, Workbook};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "decision-lens")]
#[command(about = "decision-lens - Schema-agnostic decision intelligence for business workbooks")]
#[command(version)]
struct Cli {
    /// Path to a decision-lens.toml (overrides the default lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and print the result as JSON
    Analyze {
        /// Path to the workbook JSON file
        file: PathBuf,

        /// Dataset identifier (defaults to the file stem)
        #[arg(short, long)]
        dataset_id: Option<String>,

        /// Print JSON on one line
        #[arg(long)]
        compact: bool,
    },

    /// Print sheet roles and column semantic types
    Profile {
        /// Path to the workbook JSON file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("Warning: logging not initialized: {}", e);
    }

    match cli.command {
        Commands::Analyze {
            file,
            dataset_id,
            compact,
        } => cmd_analyze(&settings, file, dataset_id, compact),
        Commands::Profile { file } => cmd_profile(&settings, file),
    }
}

fn load_workbook(file: &Path) -> Option<Workbook> {
    match Workbook::from_path(file) {
        Ok(wb) => Some(wb),
        Err(e) => {
            eprintln!("Error loading workbook '{}': {}", file.display(), e);
            None
        }
    }
}

fn cmd_analyze(
    settings: &Settings,
    file: PathBuf,
    dataset_id: Option<String>,
    compact: bool,
) -> ExitCode {
    let Some(workbook) = load_workbook(&file) else {
        return ExitCode::FAILURE;
    };

    let dataset_id = dataset_id.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string())
    });

    let engine = DecisionIntelligenceEngine::new(settings.engine_config());
    let result = engine.analyze(&workbook, &dataset_id);

    let rendered = if compact {
        serde_json::to_string(&result)
    } else {
        serde_json::to_string_pretty(&result)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize result: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_profile(settings: &Settings, file: PathBuf) -> ExitCode {
    let Some(workbook) = load_workbook(&file) else {
        return ExitCode::FAILURE;
    };

    let sheets: Vec<Sheet> = workbook.sheets.iter().filter_map(normalize_sheet).collect();
    let classifier = match settings.analysis.reference_date {
        Some(date) => SheetClassifier::new(date),
        None => SheetClassifier::default(),
    };
    let profiles = classifier.classify_all(&sheets);

    println!("File: {}", file.display());
    println!();

    if profiles.is_empty() {
        println!("No usable sheets.");
        return ExitCode::SUCCESS;
    }

    for profile in &profiles {
        println!(
            "{} [{}] (confidence: {:.2}, rows: {}, coverage: {})",
            profile.name,
            profile.role,
            profile.confidence,
            profile.row_count,
            profile.temporal_coverage
        );
        let width = profile.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
        for column in &profile.columns {
            let key = if column.is_potential_key { "  key" } else { "" };
            println!(
                "  - {:<width$}  {:<12} unique {:>5.2}  null {:>5.2}{}",
                column.name,
                column.semantic_type.as_str(),
                column.unique_ratio,
                column.null_ratio,
                key,
                width = width
            );
        }
        println!();
    }

    ExitCode::SUCCESS
}
