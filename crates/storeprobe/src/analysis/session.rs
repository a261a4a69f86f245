//! Per-session reports built from one extraction.

use super::extract::{ActionRecord, Extraction, LocatorRecord, LocatorType};
use super::page_type::PageType;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// More locators than this makes a session "complex"
pub const COMPLEX_THRESHOLD: usize = 20;

/// ISO-8601 timestamp with millisecond precision
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Session size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Complex,
}

impl Complexity {
    /// Classify by locator count
    #[must_use]
    pub const fn from_locator_count(count: usize) -> Self {
        if count > COMPLEX_THRESHOLD {
            Self::Complex
        } else {
            Self::Simple
        }
    }

    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Complex => "complex",
        }
    }
}

/// Counts for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_locators: usize,
    pub total_actions: usize,
    /// Page types that received at least one locator
    pub page_objects_detected: Vec<PageType>,
    pub complexity: Complexity,
}

/// Kind of session-level recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionRecommendationKind {
    /// Selectors used more than once in the session
    Duplicates,
    /// Positional or chained selectors
    Fragile,
}

/// Advice attached to a session report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecommendation {
    #[serde(rename = "type")]
    pub kind: SessionRecommendationKind,
    pub message: String,
    /// Selectors concerned
    pub details: Vec<String>,
}

/// `<session>-analysis.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Session name
    pub session: String,
    /// Page the session was recorded against, when known
    #[serde(default)]
    pub url: String,
    /// ISO-8601 creation time
    pub timestamp: String,
    pub summary: SessionSummary,
    pub locators: Vec<LocatorRecord>,
    pub actions: Vec<ActionRecord>,
    /// Locators grouped by inferred page type
    pub page_objects: BTreeMap<PageType, Vec<LocatorRecord>>,
    #[serde(default)]
    pub recommendations: Vec<SessionRecommendation>,
}

/// Group locators by inferred page type
#[must_use]
pub fn group_by_page_type(locators: &[LocatorRecord]) -> BTreeMap<PageType, Vec<LocatorRecord>> {
    let mut groups: BTreeMap<PageType, Vec<LocatorRecord>> = BTreeMap::new();
    for locator in locators {
        groups
            .entry(PageType::infer(&locator.selector, &locator.context))
            .or_default()
            .push(locator.clone());
    }
    groups
}

/// Selectors that occur more than once, each listed once in first-seen order
#[must_use]
pub fn repeated_selectors(locators: &[LocatorRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    for locator in locators {
        let selector = locator.selector.as_str();
        if !seen.insert(selector) && reported.insert(selector) {
            out.push(selector.to_string());
        }
    }
    out
}

fn is_fragile(locator: &LocatorRecord) -> bool {
    locator.selector.contains("nth-child")
        || locator.selector.contains("xpath")
        || locator.kind == LocatorType::Complex
}

impl SessionReport {
    /// Build the report for one recorded session
    #[must_use]
    pub fn build(session: &str, url: &str, extraction: &Extraction, at: DateTime<Utc>) -> Self {
        let page_objects = group_by_page_type(&extraction.locators);

        let mut recommendations = Vec::new();
        let duplicates = repeated_selectors(&extraction.locators);
        if !duplicates.is_empty() {
            recommendations.push(SessionRecommendation {
                kind: SessionRecommendationKind::Duplicates,
                message: "Found duplicate locators that could be consolidated".to_string(),
                details: duplicates,
            });
        }
        let fragile: Vec<String> = extraction
            .locators
            .iter()
            .filter(|l| is_fragile(l))
            .map(|l| l.selector.clone())
            .collect();
        if !fragile.is_empty() {
            recommendations.push(SessionRecommendation {
                kind: SessionRecommendationKind::Fragile,
                message: "Found potentially fragile locators".to_string(),
                details: fragile,
            });
        }

        Self {
            session: session.to_string(),
            url: url.to_string(),
            timestamp: iso_timestamp(at),
            summary: SessionSummary {
                total_locators: extraction.locators.len(),
                total_actions: extraction.actions.len(),
                page_objects_detected: page_objects.keys().copied().collect(),
                complexity: Complexity::from_locator_count(extraction.locators.len()),
            },
            locators: extraction.locators.clone(),
            actions: extraction.actions.clone(),
            page_objects,
            recommendations,
        }
    }
}

/// Severity of a detailed-analysis recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
    Success,
}

/// Kind of detailed-analysis recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailedRecommendationKind {
    FragileLocators,
    MissingTestids,
    GoodPractices,
}

impl DetailedRecommendationKind {
    /// Kebab-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FragileLocators => "fragile-locators",
            Self::MissingTestids => "missing-testids",
            Self::GoodPractices => "good-practices",
        }
    }
}

/// Advice in a detailed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedRecommendation {
    #[serde(rename = "type")]
    pub kind: DetailedRecommendationKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Summary block of a detailed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedSummary {
    pub total_locators: usize,
    pub total_actions: usize,
    pub total_lines: usize,
    /// Locator count per type
    pub locator_types: BTreeMap<LocatorType, usize>,
}

/// `<session>-detailed-analysis.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub session_name: String,
    /// File name of the analyzed script
    pub original_file: String,
    pub timestamp: String,
    pub summary: DetailedSummary,
    pub locators: Vec<LocatorRecord>,
    pub actions: Vec<ActionRecord>,
    pub recommendations: Vec<DetailedRecommendation>,
    pub page_object_suggestions: BTreeMap<PageType, Vec<LocatorRecord>>,
}

/// Locator count per type
#[must_use]
pub fn type_distribution(locators: &[LocatorRecord]) -> BTreeMap<LocatorType, usize> {
    let mut counts = BTreeMap::new();
    for locator in locators {
        *counts.entry(locator.kind).or_insert(0) += 1;
    }
    counts
}

fn detailed_recommendations(locators: &[LocatorRecord]) -> Vec<DetailedRecommendation> {
    let mut out = Vec::new();

    let fragile: Vec<String> = locators
        .iter()
        .filter(|l| l.kind.is_fragile())
        .map(|l| l.selector.clone())
        .collect();
    if !fragile.is_empty() {
        out.push(DetailedRecommendation {
            kind: DetailedRecommendationKind::FragileLocators,
            severity: Severity::Warning,
            message: format!("Found {} potentially fragile locator(s)", fragile.len()),
            locators: Some(fragile),
            suggestion: None,
        });
    }

    if !locators.iter().any(|l| l.kind == LocatorType::Testid) {
        out.push(DetailedRecommendation {
            kind: DetailedRecommendationKind::MissingTestids,
            severity: Severity::Info,
            message: "Consider adding data-testid attributes for more stable testing".to_string(),
            locators: None,
            suggestion: Some("Add data-testid attributes to key elements".to_string()),
        });
    }

    let stable: Vec<String> = locators
        .iter()
        .filter(|l| matches!(l.kind, LocatorType::Id | LocatorType::Testid))
        .map(|l| l.selector.clone())
        .collect();
    if !stable.is_empty() {
        out.push(DetailedRecommendation {
            kind: DetailedRecommendationKind::GoodPractices,
            severity: Severity::Success,
            message: format!(
                "Found {} stable locator(s) using IDs or test IDs",
                stable.len()
            ),
            locators: Some(stable),
            suggestion: None,
        });
    }

    out
}

impl DetailedAnalysis {
    /// Build the detailed analysis for one script
    #[must_use]
    pub fn build(
        session: &str,
        original_file: &str,
        extraction: &Extraction,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_name: session.to_string(),
            original_file: original_file.to_string(),
            timestamp: iso_timestamp(at),
            summary: DetailedSummary {
                total_locators: extraction.locators.len(),
                total_actions: extraction.actions.len(),
                total_lines: extraction.total_lines,
                locator_types: type_distribution(&extraction.locators),
            },
            locators: extraction.locators.clone(),
            actions: extraction.actions.clone(),
            recommendations: detailed_recommendations(&extraction.locators),
            page_object_suggestions: group_by_page_type(&extraction.locators),
        }
    }
}

/// One entry of `locator-database.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseEntry {
    pub timestamp: String,
    pub locator_count: usize,
    pub locators: Vec<LocatorRecord>,
}

/// Session name to latest locators, accumulated across runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorDatabase {
    pub sessions: BTreeMap<String, DatabaseEntry>,
}

impl LocatorDatabase {
    /// Insert or replace the entry for a session
    pub fn record(&mut self, report: &SessionReport) {
        self.sessions.insert(
            report.session.clone(),
            DatabaseEntry {
                timestamp: report.timestamp.clone(),
                locator_count: report.locators.len(),
                locators: report.locators.clone(),
            },
        );
    }
}
