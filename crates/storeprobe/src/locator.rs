//! Locators: inert descriptions of how to find elements on a page.
//!
//! A [`Locator`] is a chain of [`Selector`]s, each optionally narrowed to one
//! match by index. Nothing is resolved until a [`crate::PageDriver`] acts on
//! it. The string form uses the recorder's chaining syntax, so
//! `.cart_item >> nth=1 >> .cart_description` reads the same in logs, in
//! fake DOM fixtures and in recorded scripts.

use serde_json::{json, Value};
use std::fmt;

/// Selector types for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary", "#search_query_top")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Text content selector (`text=Dress`)
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS selector filtered by text (`a:has-text("Sign out")`)
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Comma-separated alternatives where at least one needs more than CSS
    Any(Vec<Selector>),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse a recorder-style selector string.
    ///
    /// Recognises `text=`, `xpath=` (and bare `//` paths) and the
    /// `:has-text("...")` pseudo-class; anything else is treated as CSS.
    /// A comma list is only split when one of its parts uses `:has-text`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains(":has-text(") {
            let parts = split_top_level(raw);
            if parts.len() > 1 {
                return Self::Any(parts.into_iter().map(Self::parse).collect());
            }
        }
        if let Some(text) = raw.strip_prefix("text=") {
            return Self::Text(unquote(text).to_string());
        }
        if let Some(path) = raw.strip_prefix("xpath=") {
            return Self::XPath(path.to_string());
        }
        if raw.starts_with("//") || raw.starts_with("(//") {
            return Self::XPath(raw.to_string());
        }
        if let Some(idx) = raw.find(":has-text(") {
            let css = raw[..idx].trim();
            let inner = raw[idx + ":has-text(".len()..]
                .strip_suffix(')')
                .unwrap_or(&raw[idx + ":has-text(".len()..]);
            return Self::CssWithText {
                css: if css.is_empty() { "*" } else { css }.to_string(),
                text: unquote(inner).to_string(),
            };
        }
        Self::Css(raw.to_string())
    }

    /// In-page resolver step for this selector
    #[must_use]
    pub fn to_js(&self) -> Value {
        match self {
            Self::Css(s) => json!({ "kind": "css", "css": s }),
            Self::XPath(s) => json!({ "kind": "xpath", "xpath": s }),
            Self::Text(t) => json!({ "kind": "text", "text": t }),
            Self::TestId(id) => json!({ "kind": "css", "css": format!("[data-testid={id:?}]") }),
            Self::CssWithText { css, text } => {
                json!({ "kind": "css", "css": css, "hasText": text })
            }
            Self::Any(alternatives) => {
                let alternatives: Vec<Value> = alternatives.iter().map(Self::to_js).collect();
                json!({ "kind": "any", "alternatives": alternatives })
            }
        }
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "[data-testid={id:?}]"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
            Self::Any(alternatives) => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
        }
    }
}

/// Split on commas that sit outside quotes, brackets and parentheses
fn split_top_level(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(raw[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(raw[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Step {
    selector: Selector,
    index: Option<usize>,
}

/// A chain of selectors scoping down to one or more elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    /// Create a locator from a selector string
    #[must_use]
    pub fn new(selector: &str) -> Self {
        Self::from_selector(Selector::parse(selector))
    }

    /// Create a locator from a parsed selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            steps: vec![Step {
                selector,
                index: None,
            }],
        }
    }

    /// Narrow to the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Narrow to the match at `index`
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        let mut next = self.clone();
        if let Some(last) = next.steps.last_mut() {
            last.index = Some(index);
        }
        next
    }

    /// Scope a nested selector inside this locator's matches
    #[must_use]
    pub fn locator(&self, selector: &str) -> Self {
        let mut next = self.clone();
        next.steps.push(Step {
            selector: Selector::parse(selector),
            index: None,
        });
        next
    }

    /// Index applied to the innermost selector, if any
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.steps.last().and_then(|s| s.index)
    }

    /// The same locator without the innermost index
    #[must_use]
    pub fn without_index(&self) -> Self {
        let mut next = self.clone();
        if let Some(last) = next.steps.last_mut() {
            last.index = None;
        }
        next
    }

    /// Innermost selector
    #[must_use]
    pub fn selector(&self) -> Option<&Selector> {
        self.steps.last().map(|s| &s.selector)
    }

    /// Resolver steps for in-page evaluation
    #[must_use]
    pub fn to_js(&self) -> Value {
        let steps: Vec<Value> = self
            .steps
            .iter()
            .flat_map(|step| {
                let mut out = vec![step.selector.to_js()];
                if let Some(i) = step.index {
                    out.push(json!({ "kind": "nth", "index": i }));
                }
                out
            })
            .collect();
        Value::Array(steps)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{}", step.selector)?;
            if let Some(index) = step.index {
                write!(f, " >> nth={index}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_parse_css() {
            assert_eq!(
                Selector::parse("#search_query_top"),
                Selector::css("#search_query_top")
            );
        }

        #[test]
        fn test_parse_text_strips_quotes() {
            assert_eq!(Selector::parse("text='Blouse'"), Selector::text("Blouse"));
            assert_eq!(Selector::parse("text=Dress"), Selector::text("Dress"));
        }

        #[test]
        fn test_parse_has_text() {
            let sel = Selector::parse(r#"a:has-text("Sign out")"#);
            assert_eq!(
                sel,
                Selector::CssWithText {
                    css: "a".to_string(),
                    text: "Sign out".to_string()
                }
            );
            assert_eq!(sel.to_string(), r#"a:has-text("Sign out")"#);
        }

        #[test]
        fn test_parse_comma_list_with_has_text() {
            let sel = Selector::parse(r#"#idTab1, .nav-tabs a:has-text("Data, sheet")"#);
            let Selector::Any(alts) = &sel else {
                panic!("expected alternatives, got {sel:?}");
            };
            assert_eq!(alts[0], Selector::css("#idTab1"));
            assert_eq!(
                alts[1],
                Selector::CssWithText {
                    css: ".nav-tabs a".to_string(),
                    text: "Data, sheet".to_string()
                }
            );
            assert_eq!(sel.to_string(), r#"#idTab1, .nav-tabs a:has-text("Data, sheet")"#);
        }

        #[test]
        fn test_plain_comma_list_stays_css() {
            assert_eq!(
                Selector::parse(".cross, .close"),
                Selector::css(".cross, .close")
            );
        }

        #[test]
        fn test_parse_xpath() {
            assert!(matches!(
                Selector::parse("//div[@id='x']"),
                Selector::XPath(_)
            ));
            assert!(matches!(
                Selector::parse("xpath=//span"),
                Selector::XPath(_)
            ));
        }

        #[test]
        fn test_test_id_display() {
            assert_eq!(
                Selector::test_id("submit").to_string(),
                r#"[data-testid="submit"]"#
            );
        }

        #[test]
        fn test_to_js_has_text() {
            let js = Selector::parse("button:has-text('Save')").to_js();
            assert_eq!(js["kind"], "css");
            assert_eq!(js["css"], "button");
            assert_eq!(js["hasText"], "Save");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_display_chain() {
            let loc = Locator::new(".cart_item").nth(1).locator(".cart_description");
            assert_eq!(loc.to_string(), ".cart_item >> nth=1 >> .cart_description");
        }

        #[test]
        fn test_first_and_index() {
            let loc = Locator::new(r#"a[title="Women"]"#).first();
            assert_eq!(loc.index(), Some(0));
            assert_eq!(loc.without_index().index(), None);
            assert_eq!(loc.without_index().to_string(), r#"a[title="Women"]"#);
        }

        #[test]
        fn test_to_js_steps() {
            let loc = Locator::new(".ac_results").locator("text=Blouse").first();
            let js = loc.to_js();
            let steps = js.as_array().unwrap();
            assert_eq!(steps.len(), 3);
            assert_eq!(steps[1]["kind"], "text");
            assert_eq!(steps[2]["index"], 0);
        }
    }
}
