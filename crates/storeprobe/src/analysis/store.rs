//! Reading session reports and writing analysis artifacts.

use super::aggregate::{aggregate, Aggregation};
use super::extract::extract;
use super::render;
use super::session::{DetailedAnalysis, LocatorDatabase, SessionReport};
use crate::result::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Session report files end with this
pub const ANALYSIS_SUFFIX: &str = "-analysis.json";
/// Detailed reports share the suffix and are skipped during discovery
pub const DETAILED_SUFFIX: &str = "-detailed-analysis.json";
/// Cross-run session index
pub const LOCATOR_DATABASE: &str = "locator-database.json";

/// Writes artifacts into one directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ArtifactWriter {
    /// Create the directory if needed
    pub fn create(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    /// Write pretty-printed JSON
    pub fn json<T: Serialize>(&mut self, name: &str, value: &T) -> StoreResult<PathBuf> {
        let text = serde_json::to_string_pretty(value)?;
        self.text(name, &text)
    }

    /// Write text as-is
    pub fn text(&mut self, name: &str, content: &str) -> StoreResult<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, content)?;
        tracing::info!(path = %path.display(), bytes = content.len(), "wrote artifact");
        self.written.push(path.clone());
        Ok(path)
    }

    /// Consume the writer, returning written paths
    #[must_use]
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

/// Result of [`analyze_all`]
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Aggregated reports
    pub aggregation: Aggregation,
    /// Files written
    pub written: Vec<PathBuf>,
}

/// Result of [`analyze_file`]
#[derive(Debug, Clone)]
pub struct SessionArtifacts {
    /// The session report
    pub report: SessionReport,
    /// The detailed analysis
    pub detailed: DetailedAnalysis,
    /// Files written
    pub written: Vec<PathBuf>,
}

fn is_session_report(name: &str) -> bool {
    name.ends_with(ANALYSIS_SUFFIX) && !name.ends_with(DETAILED_SUFFIX)
}

/// Session report files in `dir`, sorted by path
pub fn discover_analysis_files(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_session_report);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one session report
pub fn load_session(path: &Path) -> StoreResult<SessionReport> {
    let raw = fs::read_to_string(path)?;
    let report = serde_json::from_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded session report");
    Ok(report)
}

/// Aggregate every session report in `input` and write the consolidated
/// artifacts into `output`
///
/// Returns `None` without writing anything when `input` is missing or holds
/// no session reports.
pub fn analyze_all(input: &Path, output: &Path) -> StoreResult<Option<AnalysisOutcome>> {
    analyze_all_at(input, output, Utc::now())
}

/// [`analyze_all`] with a fixed clock
pub fn analyze_all_at(
    input: &Path,
    output: &Path,
    at: DateTime<Utc>,
) -> StoreResult<Option<AnalysisOutcome>> {
    if !input.is_dir() {
        tracing::warn!(dir = %input.display(), "No locator directory found");
        return Ok(None);
    }
    let files = discover_analysis_files(input)?;
    if files.is_empty() {
        tracing::info!(dir = %input.display(), "No analysis files found");
        return Ok(None);
    }

    let reports = files
        .iter()
        .map(|f| load_session(f))
        .collect::<StoreResult<Vec<_>>>()?;
    tracing::info!(sessions = reports.len(), "loaded session reports");

    let aggregation = aggregate(&reports, at);
    let mut writer = ArtifactWriter::create(output)?;
    writer.json("consolidated-report.json", &aggregation.consolidated)?;
    writer.text(
        "analysis-report.md",
        &render::analysis_markdown(&aggregation.consolidated),
    )?;
    writer.json("page-object-merge-report.json", &aggregation.page_objects)?;
    writer.text(
        "enhanced-page-objects.ts",
        &render::enhanced_page_objects_ts(&aggregation.page_objects),
    )?;
    writer.json("locator-quality-report.json", &aggregation.quality)?;
    writer.json("usage-statistics.json", &aggregation.usage)?;

    Ok(Some(AnalysisOutcome {
        aggregation,
        written: writer.into_written(),
    }))
}

/// Read-modify-write the locator database in `dir`
pub fn update_locator_database(dir: &Path, report: &SessionReport) -> StoreResult<PathBuf> {
    let path = dir.join(LOCATOR_DATABASE);
    let mut db: LocatorDatabase = if path.is_file() {
        serde_json::from_str(&fs::read_to_string(&path)?)?
    } else {
        LocatorDatabase::default()
    };
    db.record(report);
    fs::write(&path, serde_json::to_string_pretty(&db)?)?;
    tracing::info!(path = %path.display(), sessions = db.sessions.len(), "updated locator database");
    Ok(path)
}

/// Session names prefix artifact file names, so they must stay inside the
/// output directory
pub fn validate_session(session: &str) -> StoreResult<()> {
    let plain = !session.trim().is_empty()
        && session != "."
        && !session.contains("..")
        && !session.contains(['/', '\\', '\0']);
    if plain {
        Ok(())
    } else {
        Err(StoreError::InvalidSession {
            name: session.to_string(),
        })
    }
}

/// Analyze one recorded script and write its per-session artifacts
pub fn analyze_file(path: &Path, session: &str, output: &Path) -> StoreResult<SessionArtifacts> {
    analyze_file_at(path, session, "", output, Utc::now())
}

/// [`analyze_file`] with a recorded URL and a fixed clock
pub fn analyze_file_at(
    path: &Path,
    session: &str,
    url: &str,
    output: &Path,
    at: DateTime<Utc>,
) -> StoreResult<SessionArtifacts> {
    validate_session(session)?;
    if !path.is_file() {
        return Err(StoreError::not_found("File", path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    let extraction = extract(&content);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::info!(file = %file_name, session, locators = extraction.locators.len(), "analyzing script");

    let report = SessionReport::build(session, url, &extraction, at);
    let detailed = DetailedAnalysis::build(session, &file_name, &extraction, at);

    let mut writer = ArtifactWriter::create(output)?;
    writer.json(&format!("{session}{ANALYSIS_SUFFIX}"), &report)?;
    writer.json(&format!("{session}{DETAILED_SUFFIX}"), &detailed)?;
    writer.text(&format!("{session}-report.md"), &render::session_markdown(&detailed))?;
    writer.text(
        &format!("{session}-locator-list.md"),
        &render::locator_list_markdown(&detailed),
    )?;
    writer.text(
        &format!("{session}-page-object-suggestions.js"),
        &render::page_object_suggestions_js(&detailed),
    )?;
    let mut written = writer.into_written();
    written.push(update_locator_database(output, &report)?);

    Ok(SessionArtifacts {
        report,
        detailed,
        written,
    })
}
