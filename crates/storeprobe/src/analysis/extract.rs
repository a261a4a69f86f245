//! Locator and action extraction from recorded automation scripts.
//!
//! Scanning is line based: every `page.locator(...)`, `page.getByTestId(...)`,
//! `page.getByText(...)` and `page.getByRole(...)` call on a line yields one
//! [`LocatorRecord`], and every chained action call yields one
//! [`ActionRecord`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Lines of context kept on each side of a match
const CONTEXT_RADIUS: usize = 2;

/// Selector family, ordered from most to least stable for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorType {
    /// `#id`
    Id,
    /// `[data-testid=...]`
    Testid,
    /// `.class`
    Class,
    /// `text=...`
    Text,
    /// `[attr=value]`
    Attribute,
    /// Chained with `>>`
    Complex,
    /// Uses `nth-child`
    Positional,
    /// Anything else
    Css,
}

impl LocatorType {
    /// Lower-case name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Testid => "testid",
            Self::Class => "class",
            Self::Text => "text",
            Self::Attribute => "attribute",
            Self::Complex => "complex",
            Self::Positional => "positional",
            Self::Css => "css",
        }
    }

    /// Positional and chained selectors break when the layout changes
    #[must_use]
    pub const fn is_fragile(self) -> bool {
        matches!(self, Self::Positional | Self::Complex)
    }
}

impl fmt::Display for LocatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction recorded against a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Click,
    Dblclick,
    Fill,
    SelectOption,
    Check,
    Uncheck,
    Hover,
    Focus,
    Press,
}

impl ActionKind {
    /// Method name as written in the script
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Dblclick => "dblclick",
            Self::Fill => "fill",
            Self::SelectOption => "selectOption",
            Self::Check => "check",
            Self::Uncheck => "uncheck",
            Self::Hover => "hover",
            Self::Focus => "focus",
            Self::Press => "press",
        }
    }

    fn from_method(name: &str) -> Option<Self> {
        Some(match name {
            "click" => Self::Click,
            "dblclick" => Self::Dblclick,
            "fill" => Self::Fill,
            "selectOption" => Self::SelectOption,
            "check" => Self::Check,
            "uncheck" => Self::Uncheck,
            "hover" => Self::Hover,
            "focus" => Self::Focus,
            "press" => Self::Press,
            _ => return None,
        })
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One locator found in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorRecord {
    /// Selector text
    pub selector: String,
    /// Selector family
    #[serde(rename = "type")]
    pub kind: LocatorType,
    /// 1-based line
    pub line_number: usize,
    /// snake_case property name for a page object
    pub suggested_name: String,
    /// Surrounding source lines
    pub context: String,
    /// The trimmed source line
    #[serde(default)]
    pub full_line: String,
    /// Methods chained on the same line
    #[serde(default)]
    pub chained_methods: Vec<String>,
}

/// One action call found in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    /// Action method
    pub action: ActionKind,
    /// 1-based line
    pub line_number: usize,
    /// Matched call text, e.g. `.fill('dress')`
    pub full_command: String,
    /// Surrounding source lines
    pub context: String,
}

/// Everything pulled out of one script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Locators in source order
    pub locators: Vec<LocatorRecord>,
    /// Actions in source order
    pub actions: Vec<ActionRecord>,
    /// Modules named in `import ... from '...'` lines
    pub imports: Vec<String>,
    /// Number of lines in the script
    pub total_lines: usize,
}

fn regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn locator_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex(
        &RE,
        r#"page\.locator\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#,
    )
}

fn test_id_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex(
        &RE,
        r#"page\.getByTestId\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#,
    )
}

fn text_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex(
        &RE,
        r#"page\.getByText\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#,
    )
}

fn role_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex(
        &RE,
        r#"page\.getByRole\(\s*['"](\w+)['"](?:\s*,\s*\{\s*name:\s*(?:'([^']*)'|"([^"]*)"))?"#,
    )
}

fn action_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex(
        &RE,
        r"\.(click|dblclick|fill|selectOption|check|uncheck|hover|focus|press)\s*\([^)]*\)",
    )
}

fn chained_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex(
        &RE,
        r"\.(click|dblclick|fill|selectOption|check|uncheck|hover|focus|press|waitFor|isVisible)\s*\(",
    )
}

fn import_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex(&RE, r#"import.*from.*['"](.*)['"]"#)
}

/// First non-empty alternative among the quote-style captures
fn quoted(caps: &regex::Captures<'_>, groups: &[usize]) -> Option<String> {
    groups
        .iter()
        .find_map(|&i| caps.get(i))
        .map(|m| m.as_str().to_string())
}

/// Classify a selector
///
/// Precedence: `#` prefix, `.` prefix, `nth-child`, `text=`,
/// `[data-testid`, brackets, `>>`, then plain CSS.
#[must_use]
pub fn classify(selector: &str) -> LocatorType {
    if selector.starts_with('#') {
        LocatorType::Id
    } else if selector.starts_with('.') {
        LocatorType::Class
    } else if selector.contains("nth-child") {
        LocatorType::Positional
    } else if selector.contains("text=") {
        LocatorType::Text
    } else if selector.contains("[data-testid") {
        LocatorType::Testid
    } else if selector.contains('[') && selector.contains(']') {
        LocatorType::Attribute
    } else if selector.contains(">>") {
        LocatorType::Complex
    } else {
        LocatorType::Css
    }
}

fn squash_underscores(raw: &str) -> String {
    raw.split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn strip_brackets(selector: &str) -> String {
    let mut out = String::with_capacity(selector.len());
    let mut depth = 0usize;
    for c in selector.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Suggest a snake_case property name for a selector
///
/// ```
/// use storeprobe::analysis::suggest_name;
///
/// assert_eq!(suggest_name("#search_query_top"), "search_query_top");
/// assert_eq!(suggest_name("#SubmitLogin"), "login_submitlogin");
/// assert_eq!(suggest_name("[data-testid=\"x\"]"), "unknown_element");
/// ```
#[must_use]
pub fn suggest_name(selector: &str) -> String {
    let lower = selector.to_lowercase();
    let cleaned: String = strip_brackets(&selector.replace(['#', '.'], ""))
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let mut name = squash_underscores(&cleaned);

    let prefixes: [(&[&str], &str); 3] = [
        (&["search"], "search"),
        (&["cart"], "cart"),
        (&["login", "signin"], "login"),
    ];
    for (keywords, prefix) in prefixes {
        if keywords.iter().any(|k| lower.contains(k)) && !name.starts_with(prefix) {
            name = format!("{prefix}_{name}");
        }
    }
    for suffix in ["button", "input", "form"] {
        if lower.contains(suffix) && !name.ends_with(suffix) {
            name = format!("{name}_{suffix}");
        }
    }

    let name = squash_underscores(&name);
    if name.is_empty() {
        "unknown_element".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("el_{name}")
    } else {
        name
    }
}

fn context(lines: &[&str], index: usize) -> String {
    let start = index.saturating_sub(CONTEXT_RADIUS);
    let end = (index + CONTEXT_RADIUS + 1).min(lines.len());
    lines[start..end].join("\n")
}

/// Selectors referenced on one line, in order of appearance
fn selectors_on_line(line: &str) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    if let Some(re) = locator_re() {
        for caps in re.captures_iter(line) {
            if let (Some(m), Some(sel)) = (caps.get(0), quoted(&caps, &[1, 2, 3])) {
                found.push((m.start(), sel));
            }
        }
    }
    if let Some(re) = test_id_re() {
        for caps in re.captures_iter(line) {
            if let (Some(m), Some(id)) = (caps.get(0), quoted(&caps, &[1, 2, 3])) {
                found.push((m.start(), format!("[data-testid=\"{id}\"]")));
            }
        }
    }
    if let Some(re) = text_re() {
        for caps in re.captures_iter(line) {
            if let (Some(m), Some(text)) = (caps.get(0), quoted(&caps, &[1, 2, 3])) {
                found.push((m.start(), format!("text={text}")));
            }
        }
    }
    if let Some(re) = role_re() {
        for caps in re.captures_iter(line) {
            let (Some(m), Some(role)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let selector = match quoted(&caps, &[2, 3]) {
                Some(name) => format!("role={}[name=\"{name}\"]", role.as_str()),
                None => format!("role={}", role.as_str()),
            };
            found.push((m.start(), selector));
        }
    }
    found.sort_by_key(|(pos, _)| *pos);
    found
}

/// Scan a script for locators and actions
///
/// ```
/// use storeprobe::analysis::{extract, ActionKind, LocatorType};
///
/// let found = extract("await page.locator('#search_query_top').fill('dress');");
/// assert_eq!(found.locators.len(), 1);
/// assert_eq!(found.locators[0].kind, LocatorType::Id);
/// assert_eq!(found.actions[0].action, ActionKind::Fill);
/// ```
#[must_use]
pub fn extract(content: &str) -> Extraction {
    let lines: Vec<&str> = content.lines().collect();
    let mut extraction = Extraction {
        total_lines: content.split('\n').count(),
        ..Extraction::default()
    };

    if let Some(re) = import_re() {
        extraction.imports = re
            .captures_iter(content)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();
    }

    for (index, line) in lines.iter().enumerate() {
        let chained: Vec<String> = chained_re()
            .map(|re| {
                re.captures_iter(line)
                    .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        for (_, selector) in selectors_on_line(line) {
            extraction.locators.push(LocatorRecord {
                kind: classify(&selector),
                suggested_name: suggest_name(&selector),
                line_number: index + 1,
                context: context(&lines, index),
                full_line: line.trim().to_string(),
                chained_methods: chained.clone(),
                selector,
            });
        }

        if let Some(re) = action_re() {
            for caps in re.captures_iter(line) {
                let (Some(full), Some(method)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if let Some(action) = ActionKind::from_method(method.as_str()) {
                    extraction.actions.push(ActionRecord {
                        action,
                        line_number: index + 1,
                        full_command: full.as_str().to_string(),
                        context: context(&lines, index),
                    });
                }
            }
        }
    }

    tracing::debug!(
        locators = extraction.locators.len(),
        actions = extraction.actions.len(),
        "extracted script"
    );
    extraction
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod classify_tests {
        use super::*;

        #[test]
        fn test_prefixes_win() {
            assert_eq!(classify("#cart_summary"), LocatorType::Id);
            assert_eq!(classify("#block_top_menu li:nth-child(2)"), LocatorType::Id);
            assert_eq!(classify(".product-name"), LocatorType::Class);
        }

        #[test]
        fn test_nth_child_forces_positional() {
            assert_eq!(classify("li:nth-child(3) >> text=Dresses"), LocatorType::Positional);
            assert_eq!(classify("ul li:nth-child(2) [data-testid=\"x\"]"), LocatorType::Positional);
        }

        #[test]
        fn test_remaining_markers() {
            assert_eq!(classify("text=Sign in"), LocatorType::Text);
            assert_eq!(classify("[data-testid=\"submit\"]"), LocatorType::Testid);
            assert_eq!(classify("input[name=\"email\"]"), LocatorType::Attribute);
            assert_eq!(classify("div >> a"), LocatorType::Complex);
            assert_eq!(classify("button"), LocatorType::Css);
        }

        #[test]
        fn test_fragility() {
            assert!(LocatorType::Positional.is_fragile());
            assert!(LocatorType::Complex.is_fragile());
            assert!(!LocatorType::Id.is_fragile());
        }
    }

    mod naming_tests {
        use super::*;

        #[test]
        fn test_plain_names() {
            assert_eq!(suggest_name("#email"), "email");
            assert_eq!(suggest_name(".product-name"), "product_name");
        }

        #[test]
        fn test_keyword_prefixes() {
            assert_eq!(suggest_name(".shopping_cart > a"), "cart_shopping_cart_a");
            assert_eq!(suggest_name("a.login"), "login_alogin");
            assert_eq!(suggest_name("#search_query_top"), "search_query_top");
        }

        #[test]
        fn test_keyword_suffixes() {
            assert_eq!(suggest_name("button[name=\"submitSearch\"]"), "search_button");
            assert_eq!(suggest_name("#contact-form"), "contact_form");
            assert_eq!(suggest_name("input"), "input");
        }

        #[test]
        fn test_digit_and_empty() {
            assert_eq!(suggest_name("#123abc"), "el_123abc");
            assert_eq!(suggest_name("[data-testid=\"x\"]"), "unknown_element");
        }
    }

    mod extract_tests {
        use super::*;

        const SCRIPT: &str = "import { test, expect } from '@playwright/test';\n\
            \n\
            test('test', async ({ page }) => {\n\
            \x20 await page.goto('http://www.automationpractice.pl/');\n\
            \x20 await page.locator('#search_query_top').click();\n\
            \x20 await page.locator('#search_query_top').fill('dress');\n\
            \x20 await page.locator(\"button[name='submit_search']\").click();\n\
            \x20 await page.getByRole('link', { name: 'Sign in' }).click();\n\
            \x20 await page.getByTestId('cart').hover();\n\
            });";

        #[test]
        fn test_search_fill_line() {
            let found = extract("await page.locator('#search_query_top').fill('dress');");
            assert_eq!(found.locators.len(), 1);
            let loc = &found.locators[0];
            assert_eq!(loc.selector, "#search_query_top");
            assert_eq!(loc.kind, LocatorType::Id);
            assert_eq!(loc.line_number, 1);
            assert_eq!(loc.chained_methods, vec!["fill"]);
            assert_eq!(found.actions.len(), 1);
            assert_eq!(found.actions[0].action, ActionKind::Fill);
            assert_eq!(found.actions[0].full_command, ".fill('dress')");
        }

        #[test]
        fn test_script() {
            let found = extract(SCRIPT);
            let selectors: Vec<&str> = found.locators.iter().map(|l| l.selector.as_str()).collect();
            assert_eq!(
                selectors,
                vec![
                    "#search_query_top",
                    "#search_query_top",
                    "button[name='submit_search']",
                    "role=link[name=\"Sign in\"]",
                    "[data-testid=\"cart\"]",
                ]
            );
            assert_eq!(found.actions.len(), 5);
            assert_eq!(found.imports, vec!["@playwright/test"]);
            assert_eq!(found.total_lines, 10);
            assert_eq!(found.locators[4].kind, LocatorType::Testid);
        }

        #[test]
        fn test_context_spans_two_lines_each_side() {
            let found = extract(SCRIPT);
            let ctx = &found.locators[0].context;
            assert_eq!(ctx.lines().count(), 5);
            assert!(ctx.contains("page.goto"));
            assert!(ctx.contains("submit_search"));
        }

        #[test]
        fn test_multiple_matches_on_one_line() {
            let found = extract("page.locator('#a').click(); page.locator('.b').check();");
            assert_eq!(found.locators.len(), 2);
            assert_eq!(found.locators[1].kind, LocatorType::Class);
            let actions: Vec<ActionKind> = found.actions.iter().map(|a| a.action).collect();
            assert_eq!(actions, vec![ActionKind::Click, ActionKind::Check]);
        }

        #[test]
        fn test_nested_quotes_are_kept() {
            let found = extract(r#"await page.locator('a:has-text("Sign out")').click();"#);
            assert_eq!(found.locators[0].selector, r#"a:has-text("Sign out")"#);
        }

        #[test]
        fn test_record_json_shape() {
            let found = extract("page.locator('.price').isVisible()");
            let json = serde_json::to_value(&found.locators[0]).unwrap();
            assert_eq!(json["type"], "class");
            assert_eq!(json["lineNumber"], 1);
            assert_eq!(json["suggestedName"], "price");
            assert_eq!(json["chainedMethods"][0], "isVisible");
        }

        #[test]
        fn test_empty_script() {
            let found = extract("");
            assert!(found.locators.is_empty());
            assert!(found.actions.is_empty());
            assert_eq!(found.total_lines, 1);
        }
    }
}
