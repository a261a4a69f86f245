//! Locator analysis for recorded codegen scripts.
//!
//! A recorded script is scanned into locator and action records
//! ([`extract()`]), summarised per session ([`SessionReport`],
//! [`DetailedAnalysis`]) and, across sessions, merged into consolidated,
//! page-object, quality and usage reports ([`aggregate()`]). [`analyze_file`]
//! and [`analyze_all`] write those reports to disk.

mod aggregate;
mod codegen;
mod extract;
mod page_type;
mod render;
mod session;
mod store;

pub use aggregate::{
    aggregate, find_duplicates, global_recommendations, merge_locators, merge_page_objects,
    quality_report, quality_score, usage_statistics, Aggregation, ConsolidatedReport,
    ConsolidatedSummary, DuplicateLocator, GlobalRecommendation, GlobalRecommendationKind,
    MergedLocator, PageObjectGroup, PageObjectLocator, PageObjectMergeReport, Priority,
    QualityBuckets, QualityReport, ScoredLocator, SessionOverview, UsageStatistics, GOOD_SCORE,
    TOP_REUSABLE, WARNING_SCORE,
};
pub use codegen::{
    collect, getter_name, quick_scan, recording_path, render_getters, CodegenTarget, QuickScan,
    Recorder,
};
pub use extract::{
    classify, extract, suggest_name, ActionKind, ActionRecord, Extraction, LocatorRecord,
    LocatorType,
};
pub use page_type::PageType;
pub use render::{
    analysis_markdown, enhanced_page_objects_ts, js_single_quoted, locator_list_markdown,
    page_object_suggestions_js, session_markdown,
};
pub use session::{
    group_by_page_type, iso_timestamp, repeated_selectors, type_distribution, Complexity,
    DatabaseEntry, DetailedAnalysis, DetailedRecommendation, DetailedRecommendationKind,
    DetailedSummary, LocatorDatabase, SessionRecommendation, SessionRecommendationKind,
    SessionReport, SessionSummary, Severity, COMPLEX_THRESHOLD,
};
pub use store::{
    analyze_all, analyze_all_at, analyze_file, analyze_file_at, discover_analysis_files,
    load_session, update_locator_database, validate_session, AnalysisOutcome, ArtifactWriter,
    SessionArtifacts, ANALYSIS_SUFFIX, DETAILED_SUFFIX, LOCATOR_DATABASE,
};
