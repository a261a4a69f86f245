//! Page Object Model support.
//!
//! [`Page`] is the shared handle every page object holds: a driver plus the
//! storefront base URL. It wraps the raw [`PageDriver`] calls with the
//! conveniences page objects need: relative navigation, visibility checks that
//! never fail and trimmed text.

use crate::driver::{ClickOptions, LoadState, PageDriver, SelectOption, WaitState};
use crate::locator::Locator;
use crate::result::{StoreError, StoreResult};
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Trait for page objects representing a page of the storefront.
pub trait PageObject {
    /// Path (relative to the base URL) that opens this page
    fn url_pattern(&self) -> &str;

    /// Optional wait time for page load (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        30000
    }

    /// Get the page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Driver handle shared by page objects
#[derive(Debug)]
pub struct Page<D: PageDriver> {
    driver: Arc<D>,
    base_url: String,
}

impl<D: PageDriver> Clone for Page<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            base_url: self.base_url.clone(),
        }
    }
}

impl<D: PageDriver> Page<D> {
    /// Create a page handle
    #[must_use]
    pub fn new(driver: D, base_url: impl Into<String>) -> Self {
        Self::from_arc(Arc::new(driver), base_url)
    }

    /// Create a page handle over a shared driver
    #[must_use]
    pub fn from_arc(driver: Arc<D>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Storefront base URL (no trailing slash)
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a path or query string against the base URL
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Build a locator
    #[must_use]
    pub fn locator(&self, selector: &str) -> Locator {
        Locator::new(selector)
    }

    /// Navigate relative to the base URL
    pub async fn goto(&self, path: &str) -> StoreResult<()> {
        let url = self.resolve(path);
        tracing::debug!(%url, "navigate");
        self.driver.goto(&url).await
    }

    /// URL of the current document
    pub async fn url(&self) -> StoreResult<String> {
        self.driver.current_url().await
    }

    /// Document title
    pub async fn title(&self) -> StoreResult<String> {
        self.driver.title().await
    }

    /// Reload
    pub async fn reload(&self) -> StoreResult<()> {
        self.driver.reload().await
    }

    /// History back
    pub async fn go_back(&self) -> StoreResult<()> {
        self.driver.go_back().await
    }

    /// Wait for network idle
    pub async fn wait_for_network_idle(&self) -> StoreResult<()> {
        self.driver.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Wait for a load state
    pub async fn wait_for_load_state(&self, state: LoadState) -> StoreResult<()> {
        self.driver.wait_for_load_state(state).await
    }

    /// Fixed pause in milliseconds
    pub async fn pause(&self, ms: u64) -> StoreResult<()> {
        self.driver
            .wait_for_timeout(Duration::from_millis(ms))
            .await
    }

    /// Wait for an element state
    pub async fn wait_for(&self, locator: &Locator, state: WaitState, ms: u64) -> StoreResult<()> {
        self.driver
            .wait_for(locator, state, Duration::from_millis(ms))
            .await
    }

    /// Visible within `ms`, treating a timeout or absent element as `false`
    pub async fn is_visible_within(&self, locator: &Locator, ms: u64) -> StoreResult<bool> {
        match self.wait_for(locator, WaitState::Visible, ms).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_missing() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Visible right now
    pub async fn is_visible(&self, locator: &Locator) -> StoreResult<bool> {
        self.driver.is_visible(locator).await
    }

    /// Number of matches
    pub async fn count(&self, locator: &Locator) -> StoreResult<usize> {
        self.driver.count(locator).await
    }

    /// Trimmed text of the first match
    pub async fn text(&self, locator: &Locator) -> StoreResult<Option<String>> {
        Ok(self
            .driver
            .text_content(locator)
            .await?
            .map(|t| t.trim().to_string()))
    }

    /// Trimmed text of the first match, failing when absent
    pub async fn require_text(&self, locator: &Locator) -> StoreResult<String> {
        self.text(locator)
            .await?
            .ok_or_else(|| StoreError::ElementNotFound {
                selector: locator.to_string(),
            })
    }

    /// Trimmed text of every match
    pub async fn texts(&self, locator: &Locator) -> StoreResult<Vec<String>> {
        Ok(self
            .driver
            .all_text_contents(locator)
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect())
    }

    /// Field value
    pub async fn value(&self, locator: &Locator) -> StoreResult<String> {
        self.driver.input_value(locator).await
    }

    /// Attribute of the first match
    pub async fn attribute(&self, locator: &Locator, name: &str) -> StoreResult<Option<String>> {
        self.driver.attribute(locator, name).await
    }

    /// Attribute of every match
    pub async fn attributes(&self, locator: &Locator, name: &str) -> StoreResult<Vec<String>> {
        self.driver.all_attributes(locator, name).await
    }

    /// Checked state
    pub async fn is_checked(&self, locator: &Locator) -> StoreResult<bool> {
        self.driver.is_checked(locator).await
    }

    /// Click
    pub async fn click(&self, locator: &Locator) -> StoreResult<()> {
        self.driver.click(locator, ClickOptions::default()).await
    }

    /// Click without actionability checks
    pub async fn force_click(&self, locator: &Locator) -> StoreResult<()> {
        self.driver.click(locator, ClickOptions::forced()).await
    }

    /// Fill a field
    pub async fn fill(&self, locator: &Locator, value: &str) -> StoreResult<()> {
        self.driver.fill(locator, value).await
    }

    /// Clear a field
    pub async fn clear(&self, locator: &Locator) -> StoreResult<()> {
        self.driver.fill(locator, "").await
    }

    /// Press a key
    pub async fn press(&self, locator: &Locator, key: &str) -> StoreResult<()> {
        self.driver.press(locator, key).await
    }

    /// Hover
    pub async fn hover(&self, locator: &Locator) -> StoreResult<()> {
        self.driver.hover(locator).await
    }

    /// Check a checkbox
    pub async fn check(&self, locator: &Locator) -> StoreResult<()> {
        self.driver.set_checked(locator, true).await
    }

    /// Uncheck a checkbox
    pub async fn uncheck(&self, locator: &Locator) -> StoreResult<()> {
        self.driver.set_checked(locator, false).await
    }

    /// Select by visible label
    pub async fn select_label(&self, locator: &Locator, label: &str) -> StoreResult<()> {
        self.driver
            .select_option(locator, SelectOption::Label(label.to_string()))
            .await
    }

    /// Select by value attribute
    pub async fn select_value(&self, locator: &Locator, value: &str) -> StoreResult<()> {
        self.driver
            .select_option(locator, SelectOption::Value(value.to_string()))
            .await
    }

    /// Attach a file
    pub async fn upload(&self, locator: &Locator, path: &Path) -> StoreResult<()> {
        self.driver.set_input_files(locator, path).await
    }
}

fn price_noise() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$,\s]").ok()).as_ref()
}

fn digit_run() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").ok()).as_ref()
}

/// Parse a displayed price (`"$1,234.50"`, `" 16.51 "`) into a number.
///
/// Returns `None` when nothing numeric remains.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    price_noise()?.replace_all(text, "").parse().ok()
}

/// Parse a displayed price, treating unparseable text as zero
#[must_use]
pub fn price_or_zero(text: Option<&str>) -> f64 {
    text.and_then(parse_price).unwrap_or(0.0)
}

/// First run of digits in `text` (`"Showing 1 - 7 of 7 items"` gives 1)
#[must_use]
pub fn first_int(text: &str) -> Option<u64> {
    digit_run()?.find(text)?.as_str().parse().ok()
}
