//! Cross-session aggregation.
//!
//! Everything here is a pure function of the loaded session reports; the
//! returned [`Aggregation`] is what the store writes out.

use super::extract::{ActionKind, LocatorRecord, LocatorType};
use super::page_type::PageType;
use super::session::{iso_timestamp, Complexity, SessionReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Reusable-locator recommendations keep this many entries
pub const TOP_REUSABLE: usize = 10;
/// Scores at or above this are "good"
pub const GOOD_SCORE: u8 = 8;
/// Scores at or above this are "warning"
pub const WARNING_SCORE: u8 = 5;

/// A selector with every session it appeared in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedLocator {
    /// First record seen for the selector
    #[serde(flatten)]
    pub record: LocatorRecord,
    /// Sessions in first-seen order
    pub sessions: Vec<String>,
    /// Occurrences across all sessions
    pub count: usize,
}

/// Merge locators from every session by selector
///
/// Sorted by count descending; equal counts keep first-appearance order.
#[must_use]
pub fn merge_locators(reports: &[SessionReport]) -> Vec<MergedLocator> {
    let mut merged: Vec<MergedLocator> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for report in reports {
        for locator in &report.locators {
            match index.get(locator.selector.as_str()) {
                Some(&i) => {
                    let entry = &mut merged[i];
                    entry.count += 1;
                    if !entry.sessions.contains(&report.session) {
                        entry.sessions.push(report.session.clone());
                    }
                }
                None => {
                    index.insert(&locator.selector, merged.len());
                    merged.push(MergedLocator {
                        record: locator.clone(),
                        sessions: vec![report.session.clone()],
                        count: 1,
                    });
                }
            }
        }
    }
    merged.sort_by(|a, b| b.count.cmp(&a.count));
    merged
}

/// Selector seen more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateLocator {
    pub selector: String,
    pub count: usize,
}

/// Selectors with more than one occurrence, most frequent first
#[must_use]
pub fn find_duplicates(merged: &[MergedLocator]) -> Vec<DuplicateLocator> {
    let mut duplicates: Vec<DuplicateLocator> = merged
        .iter()
        .filter(|m| m.count > 1)
        .map(|m| DuplicateLocator {
            selector: m.record.selector.clone(),
            count: m.count,
        })
        .collect();
    duplicates.sort_by(|a, b| b.count.cmp(&a.count));
    duplicates
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// Kind of cross-session recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalRecommendationKind {
    ReusableLocators,
    FragileLocators,
}

/// Cross-session advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRecommendation {
    #[serde(rename = "type")]
    pub kind: GlobalRecommendationKind,
    pub priority: Priority,
    pub message: String,
    pub data: Vec<MergedLocator>,
}

/// Reusable and fragile locator advice
#[must_use]
pub fn global_recommendations(merged: &[MergedLocator]) -> Vec<GlobalRecommendation> {
    let mut out = Vec::new();

    let reusable: Vec<MergedLocator> = merged
        .iter()
        .filter(|m| m.count > 1)
        .take(TOP_REUSABLE)
        .cloned()
        .collect();
    if !reusable.is_empty() {
        out.push(GlobalRecommendation {
            kind: GlobalRecommendationKind::ReusableLocators,
            priority: Priority::High,
            message: "These locators are used frequently and should be in page objects".to_string(),
            data: reusable,
        });
    }

    let fragile: Vec<MergedLocator> = merged
        .iter()
        .filter(|m| {
            m.record.selector.contains("nth-child")
                || m.record.selector.contains("xpath")
                || m.record.kind == LocatorType::Complex
        })
        .cloned()
        .collect();
    if !fragile.is_empty() {
        out.push(GlobalRecommendation {
            kind: GlobalRecommendationKind::FragileLocators,
            priority: Priority::Medium,
            message: "These locators might be fragile and should be improved".to_string(),
            data: fragile,
        });
    }

    out
}

/// Session line of the consolidated report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOverview {
    pub session: String,
    pub url: String,
    pub timestamp: String,
    pub locator_count: usize,
    pub action_count: usize,
    pub complexity: Complexity,
}

/// Totals of the consolidated report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedSummary {
    pub total_sessions: usize,
    /// Distinct selectors
    pub total_locators: usize,
    pub total_actions: usize,
    pub generated_at: String,
}

/// `consolidated-report.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedReport {
    pub summary: ConsolidatedSummary,
    pub sessions: Vec<SessionOverview>,
    pub all_locators: Vec<MergedLocator>,
    pub duplicate_analysis: Vec<DuplicateLocator>,
    pub recommendations: Vec<GlobalRecommendation>,
}

/// A page-object locator with its usage across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageObjectLocator {
    #[serde(flatten)]
    pub record: LocatorRecord,
    pub usage_count: usize,
}

/// Locators merged for one page type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageObjectGroup {
    pub total_locators: usize,
    pub locators: Vec<PageObjectLocator>,
}

/// `page-object-merge-report.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageObjectMergeReport {
    pub generated_at: String,
    pub page_objects: BTreeMap<PageType, PageObjectGroup>,
}

/// Merge every session's page-object groups
#[must_use]
pub fn merge_page_objects(reports: &[SessionReport]) -> BTreeMap<PageType, PageObjectGroup> {
    let mut groups: BTreeMap<PageType, Vec<PageObjectLocator>> = BTreeMap::new();
    for report in reports {
        for (page_type, locators) in &report.page_objects {
            let group = groups.entry(*page_type).or_default();
            for locator in locators {
                match group.iter_mut().find(|l| l.record.selector == locator.selector) {
                    Some(existing) => existing.usage_count += 1,
                    None => group.push(PageObjectLocator {
                        record: locator.clone(),
                        usage_count: 1,
                    }),
                }
            }
        }
    }
    groups
        .into_iter()
        .map(|(page_type, mut locators)| {
            locators.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
            (
                page_type,
                PageObjectGroup {
                    total_locators: locators.len(),
                    locators,
                },
            )
        })
        .collect()
}

/// Score a selector's stability from 1 (brittle) to 10 (stable)
///
/// ```
/// use storeprobe::analysis::quality_score;
///
/// assert_eq!(quality_score("#search_query_top"), 8);
/// assert_eq!(quality_score("[data-testid=\"cart\"]"), 8);
/// assert_eq!(quality_score("div > ul > li:nth-child(2) > a"), 1);
/// ```
#[must_use]
pub fn quality_score(selector: &str) -> u8 {
    let is_id = selector.starts_with('#');
    let positional = selector.contains("nth-child");
    let xpath = selector.contains("xpath");
    let long = selector.split(' ').count() > 4;

    let mut score: i32 = 5;
    if is_id {
        score += 3;
    }
    if selector.contains("[data-testid") {
        score += 3;
    }
    if selector.contains("[aria-label") {
        score += 2;
    }
    if selector.contains("text=") {
        score += 1;
    }
    if positional {
        score -= 3;
    }
    if xpath {
        score -= 2;
    }
    if long {
        score -= 2;
    }
    if selector.chars().any(|c| c.is_ascii_digit()) {
        score -= 1;
    }

    if is_id && !positional && !xpath {
        score = score.max(i32::from(GOOD_SCORE));
    }
    if positional && long {
        score = score.min(1);
    }
    score.clamp(1, 10) as u8
}

/// A merged locator with its score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredLocator {
    #[serde(flatten)]
    pub locator: MergedLocator,
    pub quality_score: u8,
}

/// Scored locators by bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityBuckets {
    pub good: Vec<ScoredLocator>,
    pub warning: Vec<ScoredLocator>,
    pub poor: Vec<ScoredLocator>,
}

/// `locator-quality-report.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub timestamp: String,
    /// Rounded mean score, 0 without locators
    pub quality_score: u32,
    pub analysis: QualityBuckets,
}

/// Score and bucket merged locators
#[must_use]
pub fn quality_report(merged: &[MergedLocator], at: DateTime<Utc>) -> QualityReport {
    let mut buckets = QualityBuckets::default();
    let mut total: u32 = 0;
    for locator in merged {
        let score = quality_score(&locator.record.selector);
        total += u32::from(score);
        let scored = ScoredLocator {
            locator: locator.clone(),
            quality_score: score,
        };
        if score >= GOOD_SCORE {
            buckets.good.push(scored);
        } else if score >= WARNING_SCORE {
            buckets.warning.push(scored);
        } else {
            buckets.poor.push(scored);
        }
    }
    let quality_score = if merged.is_empty() {
        0
    } else {
        (f64::from(total) / merged.len() as f64).round() as u32
    };
    QualityReport {
        timestamp: iso_timestamp(at),
        quality_score,
        analysis: buckets,
    }
}

/// `usage-statistics.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatistics {
    pub timestamp: String,
    /// Distinct selectors per type
    pub locator_types: BTreeMap<LocatorType, usize>,
    /// Action calls per method across sessions
    pub action_types: BTreeMap<ActionKind, usize>,
    /// Locators per page type across sessions
    pub page_object_distribution: BTreeMap<PageType, usize>,
}

/// Count locator types, actions and page-object sizes
#[must_use]
pub fn usage_statistics(
    reports: &[SessionReport],
    merged: &[MergedLocator],
    at: DateTime<Utc>,
) -> UsageStatistics {
    let mut locator_types = BTreeMap::new();
    for locator in merged {
        *locator_types.entry(locator.record.kind).or_insert(0) += 1;
    }
    let mut action_types = BTreeMap::new();
    let mut page_object_distribution = BTreeMap::new();
    for report in reports {
        for action in &report.actions {
            *action_types.entry(action.action).or_insert(0) += 1;
        }
        for (page_type, locators) in &report.page_objects {
            *page_object_distribution.entry(*page_type).or_insert(0) += locators.len();
        }
    }
    UsageStatistics {
        timestamp: iso_timestamp(at),
        locator_types,
        action_types,
        page_object_distribution,
    }
}

/// All cross-session outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub consolidated: ConsolidatedReport,
    pub page_objects: PageObjectMergeReport,
    pub quality: QualityReport,
    pub usage: UsageStatistics,
}

/// Aggregate loaded session reports
#[must_use]
pub fn aggregate(reports: &[SessionReport], at: DateTime<Utc>) -> Aggregation {
    let merged = merge_locators(reports);
    let generated_at = iso_timestamp(at);

    let consolidated = ConsolidatedReport {
        summary: ConsolidatedSummary {
            total_sessions: reports.len(),
            total_locators: merged.len(),
            total_actions: reports.iter().map(|r| r.actions.len()).sum(),
            generated_at: generated_at.clone(),
        },
        sessions: reports
            .iter()
            .map(|r| SessionOverview {
                session: r.session.clone(),
                url: r.url.clone(),
                timestamp: r.timestamp.clone(),
                locator_count: r.locators.len(),
                action_count: r.actions.len(),
                complexity: r.summary.complexity,
            })
            .collect(),
        duplicate_analysis: find_duplicates(&merged),
        recommendations: global_recommendations(&merged),
        all_locators: merged.clone(),
    };

    tracing::debug!(
        sessions = reports.len(),
        locators = merged.len(),
        "aggregated sessions"
    );

    Aggregation {
        page_objects: PageObjectMergeReport {
            generated_at,
            page_objects: merge_page_objects(reports),
        },
        quality: quality_report(&merged, at),
        usage: usage_statistics(reports, &merged, at),
        consolidated,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::extract::extract;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    fn session(name: &str, script: &str) -> SessionReport {
        SessionReport::build(name, "http://shop.test", &extract(script), at())
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn test_same_selector_adds_counts_and_sessions() {
            let reports = vec![
                session("a", "page.locator('#search_query_top').click()"),
                session("b", "page.locator('#search_query_top').fill('x')\npage.locator('.logo')"),
            ];
            let merged = merge_locators(&reports);
            assert_eq!(merged.len(), 2);
            assert_eq!(merged[0].record.selector, "#search_query_top");
            assert_eq!(merged[0].count, 2);
            assert_eq!(merged[0].sessions, vec!["a", "b"]);
            assert_eq!(merged[1].count, 1);
        }

        #[test]
        fn test_sessions_deduplicated() {
            let reports = vec![session("a", "page.locator('#x')\npage.locator('#x')")];
            let merged = merge_locators(&reports);
            assert_eq!(merged[0].count, 2);
            assert_eq!(merged[0].sessions, vec!["a"]);
        }

        #[test]
        fn test_ties_keep_first_appearance() {
            let reports = vec![session("a", "page.locator('#b')\npage.locator('#a')")];
            let selectors: Vec<String> = merge_locators(&reports)
                .into_iter()
                .map(|m| m.record.selector)
                .collect();
            assert_eq!(selectors, vec!["#b", "#a"]);
        }

        #[test]
        fn test_duplicates_and_recommendations() {
            let reports = vec![
                session("a", "page.locator('#x')\npage.locator('li:nth-child(2)')"),
                session("b", "page.locator('#x')"),
            ];
            let merged = merge_locators(&reports);
            let duplicates = find_duplicates(&merged);
            assert_eq!(
                duplicates,
                vec![DuplicateLocator {
                    selector: "#x".to_string(),
                    count: 2
                }]
            );
            let recs = global_recommendations(&merged);
            assert_eq!(recs[0].kind, GlobalRecommendationKind::ReusableLocators);
            assert_eq!(recs[0].priority, Priority::High);
            assert_eq!(recs[1].kind, GlobalRecommendationKind::FragileLocators);
            assert_eq!(recs[1].data[0].record.selector, "li:nth-child(2)");
        }

        #[test]
        fn test_merged_json_is_flat() {
            let merged = merge_locators(&[session("a", "page.locator('#x')")]);
            let json = serde_json::to_value(&merged[0]).unwrap();
            assert_eq!(json["selector"], "#x");
            assert_eq!(json["type"], "id");
            assert_eq!(json["count"], 1);
        }
    }

    mod scoring_tests {
        use super::*;

        #[test]
        fn test_id_floor() {
            assert_eq!(quality_score("#email"), 8);
            assert_eq!(quality_score("#email2"), 8);
            assert_eq!(quality_score("#a b c d e"), 8);
        }

        #[test]
        fn test_positional_cap() {
            assert_eq!(quality_score("#a li:nth-child(2) b c d"), 1);
            assert_eq!(quality_score("li:nth-child(2)"), 1);
        }

        #[test]
        fn test_bonuses() {
            assert_eq!(quality_score(".logo"), 5);
            assert_eq!(quality_score("text=Sign in"), 6);
            assert_eq!(quality_score("button[aria-label=\"Close\"]"), 7);
            assert_eq!(quality_score("xpath=//div"), 3);
        }

        #[test]
        fn test_quality_report_buckets() {
            let merged = merge_locators(&[session(
                "a",
                "page.locator('#x')\npage.locator('.logo')\npage.locator('li:nth-child(2)')",
            )]);
            let report = quality_report(&merged, at());
            assert_eq!(report.analysis.good.len(), 1);
            assert_eq!(report.analysis.warning.len(), 1);
            assert_eq!(report.analysis.poor.len(), 1);
            // (8 + 5 + 1) / 3
            assert_eq!(report.quality_score, 5);
        }

        #[test]
        fn test_quality_report_empty() {
            let report = quality_report(&[], at());
            assert_eq!(report.quality_score, 0);
            assert!(report.analysis.good.is_empty());
        }

        proptest! {
            #[test]
            fn prop_score_in_range(selector in ".{0,60}") {
                let score = quality_score(&selector);
                prop_assert!((1..=10).contains(&score));
            }

            #[test]
            fn prop_plain_id_at_least_good(name in "[a-wyz_]{1,20}( [a-wyz]{1,5}){0,6}") {
                let selector = format!("#{name}");
                prop_assert!(quality_score(&selector) >= GOOD_SCORE);
            }

            #[test]
            fn prop_long_positional_is_one(prefix in "[a-z#.]{1,8}", n in 1u8..9) {
                let selector = format!("{prefix} ul li:nth-child({n}) span a");
                prop_assert_eq!(quality_score(&selector), 1);
            }
        }
    }

    mod aggregate_tests {
        use super::*;

        #[test]
        fn test_aggregate_summary() {
            let reports = vec![
                session("search", "page.locator('#search_query_top').fill('dress')"),
                session("cart", "page.locator('.cart_quantity_input').fill('2')\npage.locator('#search_query_top').click()"),
            ];
            let out = aggregate(&reports, at());
            assert_eq!(out.consolidated.summary.total_sessions, 2);
            assert_eq!(out.consolidated.summary.total_locators, 2);
            assert_eq!(out.consolidated.summary.total_actions, 3);
            assert_eq!(out.consolidated.summary.generated_at, "2025-03-14T09:30:00.000Z");
            assert_eq!(out.consolidated.sessions[1].locator_count, 2);

            let home = &out.page_objects.page_objects[&PageType::HomePage];
            assert_eq!(home.locators[0].record.selector, "#search_query_top");
            assert_eq!(home.locators[0].usage_count, 2);

            assert_eq!(out.usage.action_types[&ActionKind::Fill], 2);
            assert_eq!(out.usage.action_types[&ActionKind::Click], 1);
            assert_eq!(out.usage.locator_types[&LocatorType::Id], 1);
        }

        #[test]
        fn test_usage_json_keys() {
            let out = aggregate(&[session("s", "page.locator('#a').selectOption('1')")], at());
            let json = serde_json::to_value(&out.usage).unwrap();
            assert_eq!(json["actionTypes"]["selectOption"], 1);
            assert_eq!(json["locatorTypes"]["id"], 1);
        }
    }
}
