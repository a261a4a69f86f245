//! PageDriver: the browser-automation seam.
//!
//! Page objects talk to the browser only through [`PageDriver`], so the same
//! journey code runs against a live Chromium (`ChromiumDriver`, feature
//! `browser`) or against [`MockDriver`], an in-memory fake DOM used by unit
//! tests.

use crate::locator::Locator;
use crate::result::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Page load milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// `load` event fired
    #[default]
    Load,
    /// `DOMContentLoaded` fired
    DomContentLoaded,
    /// No network activity for a short quiet period
    NetworkIdle,
}

/// Element states a caller can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitState {
    /// Present and rendered
    #[default]
    Visible,
    /// Absent or not rendered
    Hidden,
    /// Present in the DOM
    Attached,
    /// Absent from the DOM
    Detached,
}

/// How to pick an `<option>` in a `<select>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOption {
    /// Match the visible label
    Label(String),
    /// Match the `value` attribute
    Value(String),
    /// Match by position
    Index(usize),
}

/// Click behaviour
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickOptions {
    /// Skip actionability checks (click hidden or covered elements)
    pub force: bool,
}

impl ClickOptions {
    /// Forced click
    #[must_use]
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP via chromiumoxide (feature `browser`)
/// - [`MockDriver`] - fake DOM for unit testing
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> StoreResult<()>;

    /// URL of the current document
    async fn current_url(&self) -> StoreResult<String>;

    /// Document title
    async fn title(&self) -> StoreResult<String>;

    /// Reload the current document
    async fn reload(&self) -> StoreResult<()>;

    /// Go back in history
    async fn go_back(&self) -> StoreResult<()>;

    /// Wait for a page load milestone
    async fn wait_for_load_state(&self, state: LoadState) -> StoreResult<()>;

    /// Sleep for a fixed duration
    async fn wait_for_timeout(&self, duration: Duration) -> StoreResult<()>;

    /// Wait until the locator reaches `state`, failing with
    /// [`StoreError::Timeout`] after `timeout`
    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> StoreResult<()>;

    /// Number of matching elements
    async fn count(&self, locator: &Locator) -> StoreResult<usize>;

    /// Whether the first match is rendered
    async fn is_visible(&self, locator: &Locator) -> StoreResult<bool>;

    /// Whether the first match is a checked checkbox or radio
    async fn is_checked(&self, locator: &Locator) -> StoreResult<bool>;

    /// Text content of the first match, `None` when nothing matches
    async fn text_content(&self, locator: &Locator) -> StoreResult<Option<String>>;

    /// Text content of every match
    async fn all_text_contents(&self, locator: &Locator) -> StoreResult<Vec<String>>;

    /// Current value of the first matching form field
    async fn input_value(&self, locator: &Locator) -> StoreResult<String>;

    /// Attribute of the first match
    async fn attribute(&self, locator: &Locator, name: &str) -> StoreResult<Option<String>>;

    /// Attribute of every match (missing attributes are skipped)
    async fn all_attributes(&self, locator: &Locator, name: &str) -> StoreResult<Vec<String>>;

    /// Click the first match
    async fn click(&self, locator: &Locator, options: ClickOptions) -> StoreResult<()>;

    /// Replace the value of the first matching field
    async fn fill(&self, locator: &Locator, value: &str) -> StoreResult<()>;

    /// Press a key while the first match is focused
    async fn press(&self, locator: &Locator, key: &str) -> StoreResult<()>;

    /// Move the pointer over the first match
    async fn hover(&self, locator: &Locator) -> StoreResult<()>;

    /// Check or uncheck the first match
    async fn set_checked(&self, locator: &Locator, checked: bool) -> StoreResult<()>;

    /// Choose an option in the first matching `<select>`
    async fn select_option(&self, locator: &Locator, option: SelectOption) -> StoreResult<()>;

    /// Attach a file to the first matching file input; an empty path clears it
    async fn set_input_files(&self, locator: &Locator, path: &Path) -> StoreResult<()>;
}

// ============================================================================
// Mock driver
// ============================================================================

/// A fake DOM element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Text content
    pub text: String,
    /// Form value
    pub value: String,
    /// Rendered
    pub visible: bool,
    /// Checkbox/radio state
    pub checked: bool,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// `<option>` labels when the element is a `<select>`
    pub options: Vec<String>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            value: String::new(),
            visible: true,
            checked: false,
            attributes: HashMap::new(),
            options: Vec::new(),
        }
    }
}

impl MockElement {
    /// Visible element with text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Hidden element
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }

    /// Set the form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set `<select>` option labels
    #[must_use]
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| (*o).to_string()).collect();
        self
    }

    /// Set the checked state
    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// Side effect triggered by clicking a mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEffect {
    /// Change the current URL
    Navigate(String),
    /// Make elements under a key visible (inserting one if absent)
    Show(String),
    /// Hide elements under a key
    Hide(String),
    /// Remove elements under a key
    Remove(String),
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    title: String,
    history: Vec<String>,
    elements: HashMap<String, Vec<MockElement>>,
    effects: HashMap<String, Vec<MockEffect>>,
    call_history: Vec<String>,
}

impl MockState {
    fn lookup(&self, locator: &Locator) -> Vec<MockElement> {
        if let Some(found) = self.elements.get(&locator.to_string()) {
            return found.clone();
        }
        if let Some(i) = locator.index() {
            if let Some(all) = self.elements.get(&locator.without_index().to_string()) {
                return all.get(i).cloned().into_iter().collect();
            }
        }
        Vec::new()
    }

    fn lookup_mut(&mut self, locator: &Locator) -> Option<&mut MockElement> {
        let key = locator.to_string();
        if self.elements.contains_key(&key) {
            return self.elements.get_mut(&key).and_then(|v| v.first_mut());
        }
        let i = locator.index()?;
        self.elements
            .get_mut(&locator.without_index().to_string())
            .and_then(|v| v.get_mut(i))
    }

    fn apply(&mut self, effect: MockEffect) {
        match effect {
            MockEffect::Navigate(url) => {
                let previous = std::mem::replace(&mut self.url, url);
                self.history.push(previous);
            }
            MockEffect::Show(key) => {
                let entry = self.elements.entry(key).or_default();
                if entry.is_empty() {
                    entry.push(MockElement::default());
                }
                for el in entry.iter_mut() {
                    el.visible = true;
                }
            }
            MockEffect::Hide(key) => {
                if let Some(els) = self.elements.get_mut(&key) {
                    for el in els {
                        el.visible = false;
                    }
                }
            }
            MockEffect::Remove(key) => {
                let _ = self.elements.remove(&key);
            }
        }
    }
}

/// Mock driver for unit testing
///
/// Elements are registered under the string form of a [`Locator`]; an
/// indexed locator (`.item >> nth=2`) falls back to the third element
/// registered under `.item`. Acting on a locator with no registered element
/// fails with [`StoreError::ElementNotFound`], which is how tests simulate a
/// missing or changed page.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means a test panicked mid-call; the data is
        // still usable for the assertions that follow.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register elements under a selector
    #[must_use]
    pub fn with_elements(self, selector: &str, elements: Vec<MockElement>) -> Self {
        self.set_elements(selector, elements);
        self
    }

    /// Register a single visible element with text
    #[must_use]
    pub fn with_text(self, selector: &str, text: &str) -> Self {
        self.with_elements(selector, vec![MockElement::text(text)])
    }

    /// Register a single visible element
    #[must_use]
    pub fn with_element(self, selector: &str) -> Self {
        self.with_elements(selector, vec![MockElement::default()])
    }

    /// Register an effect fired when `selector` is clicked
    #[must_use]
    pub fn on_click(self, selector: &str, effect: MockEffect) -> Self {
        self.state()
            .effects
            .entry(selector.to_string())
            .or_default()
            .push(effect);
        self
    }

    /// Set the document title
    #[must_use]
    pub fn with_title(self, title: &str) -> Self {
        self.state().title = title.to_string();
        self
    }

    /// Replace elements under a selector
    pub fn set_elements(&self, selector: &str, elements: Vec<MockElement>) {
        let _ = self
            .state()
            .elements
            .insert(selector.to_string(), elements);
    }

    /// Current value of a field, for assertions
    #[must_use]
    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.state()
            .lookup(&Locator::new(selector))
            .first()
            .map(|e| e.value.clone())
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, call: &str) -> bool {
        self.state().call_history.iter().any(|c| c.starts_with(call))
    }

    fn log(&self, call: String) {
        tracing::debug!(%call, "mock driver");
        self.state().call_history.push(call);
    }

    /// Log the call and keep the state locked for the caller
    fn record(&self, call: String) -> MutexGuard<'_, MockState> {
        self.log(call);
        self.state()
    }

    fn require(state: &MockState, locator: &Locator) -> StoreResult<MockElement> {
        state
            .lookup(locator)
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::ElementNotFound {
                selector: locator.to_string(),
            })
    }

    fn mutate<F>(&self, call: String, locator: &Locator, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut MockElement) -> StoreResult<()>,
    {
        let mut state = self.record(call);
        match state.lookup_mut(locator) {
            Some(el) => f(el),
            None => Err(StoreError::ElementNotFound {
                selector: locator.to_string(),
            }),
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> StoreResult<()> {
        let mut state = self.record(format!("goto:{url}"));
        state.apply(MockEffect::Navigate(url.to_string()));
        Ok(())
    }

    async fn current_url(&self) -> StoreResult<String> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> StoreResult<String> {
        Ok(self.state().title.clone())
    }

    async fn reload(&self) -> StoreResult<()> {
        self.log("reload".to_string());
        Ok(())
    }

    async fn go_back(&self) -> StoreResult<()> {
        let mut state = self.record("go_back".to_string());
        if let Some(previous) = state.history.pop() {
            state.url = previous;
        }
        Ok(())
    }

    async fn wait_for_load_state(&self, state: LoadState) -> StoreResult<()> {
        self.log(format!("wait_for_load_state:{state:?}"));
        Ok(())
    }

    async fn wait_for_timeout(&self, duration: Duration) -> StoreResult<()> {
        self.log(format!("wait_for_timeout:{}", duration.as_millis()));
        Ok(())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        wait: WaitState,
        timeout: Duration,
    ) -> StoreResult<()> {
        let state = self.record(format!("wait_for:{locator}:{wait:?}"));
        let found = state.lookup(locator);
        let satisfied = match wait {
            WaitState::Visible => found.first().is_some_and(|e| e.visible),
            WaitState::Hidden => found.first().map_or(true, |e| !e.visible),
            WaitState::Attached => !found.is_empty(),
            WaitState::Detached => found.is_empty(),
        };
        if satisfied {
            Ok(())
        } else {
            Err(StoreError::Timeout {
                ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn count(&self, locator: &Locator) -> StoreResult<usize> {
        Ok(self.record(format!("count:{locator}")).lookup(locator).len())
    }

    async fn is_visible(&self, locator: &Locator) -> StoreResult<bool> {
        let state = self.record(format!("is_visible:{locator}"));
        Ok(state.lookup(locator).first().is_some_and(|e| e.visible))
    }

    async fn is_checked(&self, locator: &Locator) -> StoreResult<bool> {
        let state = self.record(format!("is_checked:{locator}"));
        Ok(Self::require(&state, locator)?.checked)
    }

    async fn text_content(&self, locator: &Locator) -> StoreResult<Option<String>> {
        let state = self.record(format!("text_content:{locator}"));
        Ok(state.lookup(locator).first().map(|e| e.text.clone()))
    }

    async fn all_text_contents(&self, locator: &Locator) -> StoreResult<Vec<String>> {
        let state = self.record(format!("all_text_contents:{locator}"));
        Ok(state.lookup(locator).into_iter().map(|e| e.text).collect())
    }

    async fn input_value(&self, locator: &Locator) -> StoreResult<String> {
        let state = self.record(format!("input_value:{locator}"));
        Ok(Self::require(&state, locator)?.value)
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> StoreResult<Option<String>> {
        let state = self.record(format!("attribute:{locator}:{name}"));
        Ok(state
            .lookup(locator)
            .first()
            .and_then(|e| e.attributes.get(name).cloned()))
    }

    async fn all_attributes(&self, locator: &Locator, name: &str) -> StoreResult<Vec<String>> {
        let state = self.record(format!("all_attributes:{locator}:{name}"));
        Ok(state
            .lookup(locator)
            .into_iter()
            .filter_map(|mut e| e.attributes.remove(name))
            .collect())
    }

    async fn click(&self, locator: &Locator, options: ClickOptions) -> StoreResult<()> {
        let mut state = self.record(format!("click:{locator}"));
        let el = Self::require(&state, locator)?;
        if !el.visible && !options.force {
            return Err(StoreError::Timeout { ms: 30_000 });
        }
        let effects = state
            .effects
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default();
        for effect in effects {
            state.apply(effect);
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> StoreResult<()> {
        self.mutate(format!("fill:{locator}:{value}"), locator, |el| {
            el.value = value.to_string();
            Ok(())
        })
    }

    async fn press(&self, locator: &Locator, key: &str) -> StoreResult<()> {
        let state = self.record(format!("press:{locator}:{key}"));
        Self::require(&state, locator).map(|_| ())
    }

    async fn hover(&self, locator: &Locator) -> StoreResult<()> {
        let state = self.record(format!("hover:{locator}"));
        Self::require(&state, locator).map(|_| ())
    }

    async fn set_checked(&self, locator: &Locator, checked: bool) -> StoreResult<()> {
        self.mutate(format!("set_checked:{locator}:{checked}"), locator, |el| {
            el.checked = checked;
            Ok(())
        })
    }

    async fn select_option(&self, locator: &Locator, option: SelectOption) -> StoreResult<()> {
        let call = format!("select_option:{locator}:{option:?}");
        let selector = locator.to_string();
        self.mutate(call, locator, |el| {
            let chosen = match &option {
                SelectOption::Label(label) => el.options.iter().find(|o| *o == label).cloned(),
                SelectOption::Value(value) => Some(value.clone()),
                SelectOption::Index(i) => el.options.get(*i).cloned(),
            };
            match chosen {
                Some(value) => {
                    el.value = value;
                    Ok(())
                }
                None => Err(StoreError::ElementNotFound {
                    selector: format!("{selector} option {option:?}"),
                }),
            }
        })
    }

    async fn set_input_files(&self, locator: &Locator, path: &Path) -> StoreResult<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.mutate(format!("set_input_files:{locator}:{name}"), locator, |el| {
            el.value = name.clone();
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod mock_driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_goto_records_history() {
            let driver = MockDriver::new();
            driver.goto("http://shop.test/").await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "http://shop.test/");
            assert!(driver.was_called("goto:http://shop.test/"));
        }

        #[tokio::test]
        async fn test_click_missing_element_fails() {
            let driver = MockDriver::new();
            let err = driver
                .click(&Locator::new("#nope"), ClickOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_hidden_click_needs_force() {
            let driver = MockDriver::new().with_elements("#x", vec![MockElement::hidden()]);
            let loc = Locator::new("#x");
            assert!(driver.click(&loc, ClickOptions::default()).await.is_err());
            assert!(driver.click(&loc, ClickOptions::forced()).await.is_ok());
        }

        #[tokio::test]
        async fn test_fill_updates_value() {
            let driver = MockDriver::new().with_element("#email");
            driver.fill(&Locator::new("#email"), "a@b.c").await.unwrap();
            assert_eq!(driver.value_of("#email").as_deref(), Some("a@b.c"));
        }

        #[tokio::test]
        async fn test_nth_falls_back_to_list() {
            let driver = MockDriver::new().with_elements(
                ".price",
                vec![MockElement::text("$1.00"), MockElement::text("$2.00")],
            );
            let second = Locator::new(".price").nth(1);
            assert_eq!(
                driver.text_content(&second).await.unwrap().as_deref(),
                Some("$2.00")
            );
            assert_eq!(driver.count(&Locator::new(".price")).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_click_effects() {
            let driver = MockDriver::new()
                .with_element("#go")
                .with_elements("#modal", vec![MockElement::hidden()])
                .on_click("#go", MockEffect::Show("#modal".to_string()))
                .on_click("#go", MockEffect::Navigate("http://next".to_string()));
            driver
                .click(&Locator::new("#go"), ClickOptions::default())
                .await
                .unwrap();
            assert!(driver.is_visible(&Locator::new("#modal")).await.unwrap());
            assert_eq!(driver.current_url().await.unwrap(), "http://next");
            driver.go_back().await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_wait_for_states() {
            let driver = MockDriver::new().with_elements("#h", vec![MockElement::hidden()]);
            let h = Locator::new("#h");
            let t = Duration::from_millis(10);
            assert!(driver.wait_for(&h, WaitState::Hidden, t).await.is_ok());
            assert!(driver.wait_for(&h, WaitState::Attached, t).await.is_ok());
            let err = driver.wait_for(&h, WaitState::Visible, t).await.unwrap_err();
            assert!(matches!(err, StoreError::Timeout { ms: 10 }));
        }

        #[tokio::test]
        async fn test_waits_and_reload_are_recorded() {
            let driver = MockDriver::new();
            driver.reload().await.unwrap();
            driver.wait_for_load_state(LoadState::Load).await.unwrap();
            driver
                .wait_for_timeout(Duration::from_millis(250))
                .await
                .unwrap();
            // the state lock must be released after each call
            driver.goto("http://shop.test/").await.unwrap();
            assert!(driver.was_called("reload"));
            assert!(driver.was_called("wait_for_load_state:Load"));
            assert!(driver.was_called("wait_for_timeout:250"));
            assert!(driver.was_called("goto:http://shop.test/"));
        }

        #[tokio::test]
        async fn test_select_option_by_label() {
            let driver = MockDriver::new().with_elements(
                "#id_contact",
                vec![MockElement::default().with_options(&["-- Choose --", "Webmaster"])],
            );
            let loc = Locator::new("#id_contact");
            driver
                .select_option(&loc, SelectOption::Label("Webmaster".to_string()))
                .await
                .unwrap();
            assert_eq!(driver.input_value(&loc).await.unwrap(), "Webmaster");
            assert!(driver
                .select_option(&loc, SelectOption::Label("Nobody".to_string()))
                .await
                .is_err());
        }
    }
}
