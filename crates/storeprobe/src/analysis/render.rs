//! Markdown, JavaScript and TypeScript renderings of analysis results.

use super::aggregate::{ConsolidatedReport, PageObjectMergeReport};
use super::extract::{LocatorRecord, LocatorType};
use super::session::{DetailedAnalysis, Severity};
use std::collections::{BTreeSet, HashMap};

/// Rows shown under "Most Used Locators"
const MOST_USED_ROWS: usize = 10;
/// Rows shown under "Duplicate Locators"
const DUPLICATE_ROWS: usize = 5;
/// Selectors listed per page type in the session report
const PAGE_PREVIEW_ROWS: usize = 5;

/// Escape text for a single-quoted JavaScript string
#[must_use]
pub fn js_single_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Make property names unique by suffixing `_2`, `_3`, ...
fn unique_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let n = seen.entry(name).or_insert(0);
            *n += 1;
            if *n == 1 {
                name.to_string()
            } else {
                format!("{name}_{n}")
            }
        })
        .collect()
}

/// Locators grouped by type in first-seen order
fn group_by_type(locators: &[LocatorRecord]) -> Vec<(LocatorType, Vec<&LocatorRecord>)> {
    let mut groups: Vec<(LocatorType, Vec<&LocatorRecord>)> = Vec::new();
    for locator in locators {
        match groups.iter_mut().find(|(kind, _)| *kind == locator.kind) {
            Some((_, members)) => members.push(locator),
            None => groups.push((locator.kind, vec![locator])),
        }
    }
    groups
}

/// `analysis-report.md`
#[must_use]
pub fn analysis_markdown(report: &ConsolidatedReport) -> String {
    let mut md = String::from("# Locator Analysis Report\n\n");
    md.push_str(&format!("**Generated:** {}\n\n", report.summary.generated_at));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- **Total Sessions:** {}\n", report.summary.total_sessions));
    md.push_str(&format!("- **Total Locators:** {}\n", report.summary.total_locators));
    md.push_str(&format!("- **Total Actions:** {}\n\n", report.summary.total_actions));

    md.push_str("## Session Details\n\n");
    md.push_str("| Session | URL | Locators | Actions | Complexity |\n");
    md.push_str("|---------|-----|----------|---------|------------|\n");
    for s in &report.sessions {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            s.session,
            s.url,
            s.locator_count,
            s.action_count,
            s.complexity.as_str()
        ));
    }

    md.push_str("\n## Most Used Locators\n\n");
    for (i, locator) in report.all_locators.iter().take(MOST_USED_ROWS).enumerate() {
        md.push_str(&format!(
            "{}. `{}` (used {}x)\n",
            i + 1,
            locator.record.selector,
            locator.count
        ));
    }

    if !report.duplicate_analysis.is_empty() {
        md.push_str("\n## Duplicate Locators\n\n");
        for dup in report.duplicate_analysis.iter().take(DUPLICATE_ROWS) {
            md.push_str(&format!("- `{}` appears {} times\n", dup.selector, dup.count));
        }
    }
    md
}

/// `enhanced-page-objects.ts`
#[must_use]
pub fn enhanced_page_objects_ts(report: &PageObjectMergeReport) -> String {
    let mut ts = String::from("// Generated TypeScript locators for recorded page objects\n");
    ts.push_str(&format!("// Generated on: {}\n\n", report.generated_at));
    ts.push_str("import { Page, Locator } from '@playwright/test';\n\n");

    for (page_type, group) in &report.page_objects {
        let names = unique_names(
            group
                .locators
                .iter()
                .map(|l| l.record.suggested_name.as_str()),
        );

        ts.push_str(&format!("export interface I{page_type}Locators {{\n"));
        for (locator, name) in group.locators.iter().zip(&names) {
            ts.push_str(&format!(
                "  /** Selector: {} | Usage: {}x */\n",
                locator.record.selector, locator.usage_count
            ));
            ts.push_str(&format!("  {name}: Locator;\n"));
        }
        ts.push_str("}\n\n");

        ts.push_str(&format!(
            "export class Enhanced{page_type} implements I{page_type}Locators {{\n"
        ));
        ts.push_str("  constructor(private page: Page) {}\n\n");
        for (locator, name) in group.locators.iter().zip(&names) {
            ts.push_str(&format!("  get {name}(): Locator {{\n"));
            ts.push_str(&format!(
                "    return this.page.locator('{}');\n",
                js_single_quoted(&locator.record.selector)
            ));
            ts.push_str("  }\n\n");
        }
        ts.push_str("}\n\n");
    }
    ts
}

/// `<session>-report.md`
#[must_use]
pub fn session_markdown(analysis: &DetailedAnalysis) -> String {
    let mut md = format!("# Codegen Analysis Report: {}\n\n", analysis.session_name);
    md.push_str(&format!("**Generated:** {}\n", analysis.timestamp));
    md.push_str(&format!("**Original File:** {}\n\n", analysis.original_file));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- **Total Locators:** {}\n", analysis.summary.total_locators));
    md.push_str(&format!("- **Total Actions:** {}\n", analysis.summary.total_actions));
    md.push_str(&format!("- **Total Lines:** {}\n\n", analysis.summary.total_lines));

    md.push_str("### Locator Type Distribution\n\n");
    for (kind, count) in &analysis.summary.locator_types {
        md.push_str(&format!("- **{kind}:** {count}\n"));
    }

    if !analysis.recommendations.is_empty() {
        md.push_str("\n## Recommendations\n\n");
        for rec in &analysis.recommendations {
            let label = match rec.severity {
                Severity::Warning => "WARNING",
                Severity::Info => "INFO",
                Severity::Success => "OK",
            };
            md.push_str(&format!("### [{label}] {}\n", rec.kind.as_str()));
            md.push_str(&format!("{}\n\n", rec.message));
        }
    }

    md.push_str("\n## Suggested Page Objects\n\n");
    for (page_type, locators) in &analysis.page_object_suggestions {
        md.push_str(&format!("### {page_type} ({} locators)\n", locators.len()));
        for locator in locators.iter().take(PAGE_PREVIEW_ROWS) {
            md.push_str(&format!("- `{}`\n", locator.selector));
        }
        if locators.len() > PAGE_PREVIEW_ROWS {
            md.push_str(&format!(
                "- ... and {} more\n",
                locators.len() - PAGE_PREVIEW_ROWS
            ));
        }
        md.push('\n');
    }
    md
}

/// `<session>-locator-list.md`
#[must_use]
pub fn locator_list_markdown(analysis: &DetailedAnalysis) -> String {
    let mut md = format!("# Locator List - {}\n\n", analysis.session_name);
    md.push_str(&format!("Generated: {}\n\n", analysis.timestamp));

    for (kind, locators) in group_by_type(&analysis.locators) {
        md.push_str(&format!(
            "## {} Locators ({})\n\n",
            kind.as_str().to_uppercase(),
            locators.len()
        ));
        for (i, locator) in locators.iter().enumerate() {
            let actions = if locator.chained_methods.is_empty() {
                "None".to_string()
            } else {
                locator.chained_methods.join(", ")
            };
            md.push_str(&format!("### {}. {}\n", i + 1, locator.suggested_name));
            md.push_str(&format!("- **Selector:** `{}`\n", locator.selector));
            md.push_str(&format!("- **Line:** {}\n", locator.line_number));
            md.push_str(&format!("- **Actions:** {actions}\n"));
            md.push_str(&format!("- **Code:** `{}`\n\n", locator.full_line));
        }
    }
    md
}

/// `<session>-page-object-suggestions.js`
#[must_use]
pub fn page_object_suggestions_js(analysis: &DetailedAnalysis) -> String {
    let mut js = String::from("// Page object suggestions from a recorded session\n");
    js.push_str(&format!("// Session: {}\n", analysis.session_name));
    js.push_str(&format!("// Generated: {}\n\n", analysis.timestamp));

    for (page_type, locators) in &analysis.page_object_suggestions {
        js.push_str(&format!("// ========== {page_type} ==========\n"));
        js.push_str(&format!("export class Enhanced{page_type} {{\n"));
        js.push_str("  constructor(page) {\n");
        js.push_str("    this.page = page;\n\n");

        for (kind, members) in group_by_type(locators) {
            js.push_str(&format!("    // {} locators\n", kind.as_str().to_uppercase()));
            for locator in members {
                js.push_str(&format!(
                    "    this.{} = page.locator('{}'); // Line {}\n",
                    locator.suggested_name,
                    js_single_quoted(&locator.selector),
                    locator.line_number
                ));
            }
            js.push('\n');
        }
        js.push_str("  }\n\n");

        let mut emitted = BTreeSet::new();
        for action in locators.iter().flat_map(|l| l.chained_methods.iter()) {
            if !emitted.insert(action.as_str()) {
                continue;
            }
            js.push_str(&format!("  async {action}Element(elementName) {{\n"));
            js.push_str(&format!("    await this[elementName].{action}();\n"));
            js.push_str("  }\n\n");
        }
        js.push_str("}\n\n");
    }
    js
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::aggregate;
    use crate::analysis::extract::extract;
    use crate::analysis::session::SessionReport;
    use chrono::{TimeZone, Utc};

    const SCRIPT: &str = "await page.locator('#search_query_top').click();\n\
        await page.locator('#search_query_top').fill('dress');\n\
        await page.locator('.logo').hover();\n\
        await page.locator('#email').fill('a@b.c');";

    fn detailed() -> DetailedAnalysis {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        DetailedAnalysis::build("search", "search-1.js", &extract(SCRIPT), at)
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn test_js_escaping() {
            assert_eq!(js_single_quoted("a[title='x']"), "a[title=\\'x\\']");
        }

        #[test]
        fn test_unique_names() {
            assert_eq!(
                unique_names(["email", "email", "logo", "email"]),
                vec!["email", "email_2", "logo", "email_3"]
            );
        }
    }

    mod session_render_tests {
        use super::*;

        #[test]
        fn test_locator_list_groups_by_type() {
            let md = locator_list_markdown(&detailed());
            assert!(md.starts_with("# Locator List - search"));
            assert!(md.contains("## ID Locators (3)"));
            assert!(md.contains("## CLASS Locators (1)"));
            assert!(md.contains("- **Actions:** hover"));
            assert!(md.contains("- **Code:** `await page.locator('.logo').hover();`"));
        }

        #[test]
        fn test_session_markdown() {
            let md = session_markdown(&detailed());
            assert!(md.contains("**Original File:** search-1.js"));
            assert!(md.contains("- **id:** 3"));
            assert!(md.contains("### [INFO] missing-testids"));
            assert!(md.contains("### [OK] good-practices"));
        }

        #[test]
        fn test_suggestions_js() {
            let js = page_object_suggestions_js(&detailed());
            assert!(js.contains("export class EnhancedHomePage {"));
            assert!(js.contains("this.search_query_top = page.locator('#search_query_top'); // Line 1"));
            assert_eq!(js.matches("async clickElement(elementName)").count(), 1);
            assert!(js.contains("async fillElement(elementName)"));
        }
    }

    mod aggregate_render_tests {
        use super::*;

        fn reports() -> Vec<SessionReport> {
            let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
            vec![
                SessionReport::build("one", "http://shop.test/", &extract(SCRIPT), at),
                SessionReport::build("two", "http://shop.test/cart", &extract("page.locator('#search_query_top').click()"), at),
            ]
        }

        #[test]
        fn test_analysis_markdown() {
            let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
            let out = aggregate(&reports(), at);
            let md = analysis_markdown(&out.consolidated);
            assert!(md.contains("- **Total Sessions:** 2"));
            assert!(md.contains("| one | http://shop.test/ | 4 | 4 | simple |"));
            assert!(md.contains("1. `#search_query_top` (used 3x)"));
            assert!(md.contains("- `#search_query_top` appears 3 times"));
        }

        #[test]
        fn test_typescript() {
            let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
            let out = aggregate(&reports(), at);
            let ts = enhanced_page_objects_ts(&out.page_objects);
            assert!(ts.contains("import { Page, Locator } from '@playwright/test';"));
            assert!(ts.contains("export interface IHomePageLocators {"));
            assert!(ts.contains("export class EnhancedHomePage implements IHomePageLocators {"));
            assert!(ts.contains("  get search_query_top(): Locator {"));
            assert!(ts.contains("/** Selector: #search_query_top | Usage: 3x */"));
        }
    }
}
