//! Lumascan - Image Scanning Analysis Engine
//!
//! Walks a directory tree, scores each image for blur via a
//! Laplacian-variance hybrid, and clusters images into exact-duplicate
//! (content digest) and perceptually similar (average hash) groups. The
//! CLI in this crate is a thin front-end; all detection lives in
//! [`analysis`] and [`scanner`] and is reusable in-process.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::sync::Arc;

use anyhow::Context;

use crate::analysis::{AnalysisResult, EngineError, ScanEngine, ScanRequest, Thresholds};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::progress::ConsoleProgress;

/// Run the application: resolve thresholds, scan, and render results.
///
/// # Errors
///
/// Returns an error for fatal failures only (unreadable scan root,
/// interruption); per-file failures are part of the result and influence
/// the exit code instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    // Precedence: CLI flag, then config file, then built-in default.
    let config = Config::load();
    let thresholds = Thresholds {
        blur: cli.blur_threshold.unwrap_or(config.blur_threshold),
        similarity: cli
            .similarity_threshold
            .unwrap_or(config.similarity_threshold),
    };

    if cli.save_config {
        let resolved = Config {
            blur_threshold: thresholds.blur,
            similarity_threshold: thresholds.similarity,
        };
        resolved
            .save()
            .context("Failed to save configuration")?;
        log::info!("Saved thresholds as new defaults");
    }

    let shutdown = match signal::install_handler() {
        Ok(handler) => handler,
        Err(e) => {
            log::warn!("Failed to install Ctrl+C handler: {}", e);
            signal::ShutdownHandler::new()
        }
    };

    // JSON mode keeps stdout machine-readable; no progress bar there.
    let show_progress = !cli.quiet && cli.output == OutputFormat::Text;
    let mut engine = ScanEngine::new()
        .with_progress(Arc::new(ConsoleProgress::new(!show_progress)))
        .with_cancel_flag(shutdown.get_flag())
        .with_io_threads(cli.threads);
    engine.set_thresholds(thresholds);

    let request = ScanRequest::new(cli.path.clone(), cli.recursive);
    let result = engine.run_scan(&request).map_err(anyhow::Error::from)?;

    match cli.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .context("Failed to serialize scan results")?;
            println!("{json}");
        }
        OutputFormat::Text => print_text_summary(&result),
    }

    Ok(exit_code_for(&result))
}

/// Map a completed scan to its process exit code.
#[must_use]
pub fn exit_code_for(result: &AnalysisResult) -> ExitCode {
    if !result.error_findings.is_empty() {
        ExitCode::PartialSuccess
    } else if result.has_findings() {
        ExitCode::Success
    } else {
        ExitCode::CleanScan
    }
}

/// Whether an error chain bottoms out in scan interruption.
#[must_use]
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.downcast_ref::<EngineError>()
        .is_some_and(|e| matches!(e, EngineError::Interrupted))
}

fn print_text_summary(result: &AnalysisResult) {
    if result.is_clean() {
        println!("No blurry images, duplicates, or errors found.");
        return;
    }

    if !result.blur_findings.is_empty() {
        println!("Blurry images ({}):", result.blur_findings.len());
        for finding in &result.blur_findings {
            println!("  [{:>3}] {}", finding.score, finding.file.path.display());
        }
    }

    if !result.groups.is_empty() {
        println!("Duplicate / similar groups ({}):", result.groups.len());
        for group in &result.groups {
            let tag = match group.kind {
                analysis::GroupKind::Duplicate => "duplicate",
                analysis::GroupKind::Similar => "similar",
            };
            println!("  {} ({}%):", tag, group.similarity);
            for file in &group.files {
                println!("    {} ({} bytes)", file.path.display(), file.size);
            }
        }
    }

    if !result.error_findings.is_empty() {
        println!("Files that could not be analyzed ({}):", result.error_findings.len());
        for finding in &result.error_findings {
            println!("  {}: {}", finding.file.path.display(), finding.message);
        }
    }
}
