//! Analyze and analyze-file command handlers

use super::reporter;
use crate::commands::{AnalyzeArgs, AnalyzeFileArgs};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use storeprobe::analysis::{analyze_all, analyze_file, Aggregation, SessionArtifacts};

/// Execute the analyze command
pub fn execute_analyze(config: &CliConfig, args: &AnalyzeArgs) -> CliResult<()> {
    let store = config.store_config()?;
    let input = args.input.clone().unwrap_or(store.locator_dir);
    let output = args.output.clone().unwrap_or(store.report_dir);
    let reporter = reporter(config);

    reporter.header("Locator Analysis");
    match analyze_all(&input, &output)? {
        None => reporter.warning(&format!(
            "No analysis files found in {}",
            input.display()
        )),
        Some(outcome) => {
            for line in analysis_summary_lines(&outcome.aggregation) {
                reporter.info(&line);
            }
            for path in &outcome.written {
                reporter.success(&format!("Wrote {}", path.display()));
            }
        }
    }
    Ok(())
}

/// Execute the analyze-file command
pub fn execute_analyze_file(config: &CliConfig, args: &AnalyzeFileArgs) -> CliResult<()> {
    let output = match &args.output {
        Some(dir) => dir.clone(),
        None => config.store_config()?.locator_dir,
    };
    let reporter = reporter(config);

    reporter.header(&format!("Analyzing {}", args.file.display()));
    let artifacts = analyze_file(&args.file, &args.session, &output)?;
    print_session(&reporter, &artifacts);
    reporter.success(&format!("Analysis complete. Check {} for results.", output.display()));
    Ok(())
}

pub(crate) fn print_session(reporter: &ProgressReporter, artifacts: &SessionArtifacts) {
    for line in session_summary_lines(artifacts) {
        reporter.info(&line);
    }
    for path in &artifacts.written {
        reporter.success(&format!("Wrote {}", path.display()));
    }
}

/// Headline numbers of a consolidated analysis
#[must_use]
pub fn analysis_summary_lines(aggregation: &Aggregation) -> Vec<String> {
    let summary = &aggregation.consolidated.summary;
    let quality = &aggregation.quality;
    vec![
        format!("Sessions analyzed: {}", summary.total_sessions),
        format!("Unique locators: {}", summary.total_locators),
        format!("Actions recorded: {}", summary.total_actions),
        format!(
            "Duplicated selectors: {}",
            aggregation.consolidated.duplicate_analysis.len()
        ),
        format!(
            "Quality score: {}/10 ({} good, {} warning, {} poor)",
            quality.quality_score,
            quality.analysis.good.len(),
            quality.analysis.warning.len(),
            quality.analysis.poor.len()
        ),
    ]
}

/// Headline numbers of one analyzed session
#[must_use]
pub fn session_summary_lines(artifacts: &SessionArtifacts) -> Vec<String> {
    let summary = &artifacts.report.summary;
    let pages: Vec<String> = summary
        .page_objects_detected
        .iter()
        .map(|p| format!("{p:?}"))
        .collect();
    vec![
        format!("Session: {}", artifacts.report.session),
        format!("Locators: {}", summary.total_locators),
        format!("Actions: {}", summary.total_actions),
        format!("Complexity: {:?}", summary.complexity),
        format!(
            "Page objects: {}",
            if pages.is_empty() {
                "none".to_string()
            } else {
                pages.join(", ")
            }
        ),
        format!(
            "Recommendations: {}",
            artifacts.detailed.recommendations.len()
        ),
    ]
}
