//! Browser control for live storefront runs.
//!
//! With the `browser` feature this module drives Chromium over the Chrome
//! `DevTools` Protocol via chromiumoxide. Locators are resolved in-page by a
//! small script that understands CSS, `text=`, `:has-text()`, XPath and
//! `nth=` steps, so a [`crate::Locator`] chain means the same thing here as
//! in the mock driver.

use std::time::Duration;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Upper bound for navigations and load-state waits
    pub navigation_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
/// Resolves a JSON array of locator steps to a list of elements.
/// `__STEPS__` is replaced with the serialized steps.
const RESOLVER_JS: &str = r"(() => {
  const steps = __STEPS__;
  const hasText = (el, t) => (el.textContent || '').includes(t);
  const find = (root, step) => {
    if (step.kind === 'any') return step.alternatives.flatMap(alt => find(root, alt));
    if (step.kind === 'css') {
      const found = Array.from(root.querySelectorAll(step.css));
      return step.hasText === undefined ? found : found.filter(el => hasText(el, step.hasText));
    }
    if (step.kind === 'text') {
      return Array.from(root.querySelectorAll('*')).filter(el =>
        hasText(el, step.text) && !Array.from(el.children).some(c => hasText(c, step.text)));
    }
    if (step.kind === 'xpath') {
      const found = [];
      const snap = document.evaluate(step.xpath, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
      for (let i = 0; i < snap.snapshotLength; i++) found.push(snap.snapshotItem(i));
      return found;
    }
    return [];
  };
  let nodes = [document];
  for (const step of steps) {
    if (step.kind === 'nth') {
      nodes = nodes[step.index] ? [nodes[step.index]] : [];
      continue;
    }
    const next = [];
    for (const root of nodes) {
      for (const el of find(root, step)) if (!next.includes(el)) next.push(el);
    }
    nodes = next;
  }
  return nodes;
})()";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const VISIBLE_JS: &str = "const visible = el => !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) && getComputedStyle(el).visibility !== 'hidden';";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const TARGET_ATTR: &str = "data-storeprobe-target";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
/// Wrap `body` so it runs with `nodes` bound to the locator's matches
fn locator_script(locator: &crate::Locator, body: &str) -> String {
    let resolver = RESOLVER_JS.replace("__STEPS__", &locator.to_js().to_string());
    format!("(() => {{ const nodes = {resolver}; {VISIBLE_JS} {body} }})()")
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
mod cdp {
    use super::{locator_script, BrowserConfig, TARGET_ATTR};
    use crate::driver::{ClickOptions, LoadState, PageDriver, SelectOption, WaitState};
    use crate::locator::Locator;
    use crate::result::{StoreError, StoreResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::sync::Mutex;

    const POLL_INTERVAL: Duration = Duration::from_millis(100);
    const NETWORK_QUIET: Duration = Duration::from_millis(500);

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct ChromiumBrowser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumBrowser {
        /// Launch a new browser instance
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> StoreResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .request_timeout(config.navigation_timeout);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| StoreError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                StoreError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "chromium launched");

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a fresh page
        ///
        /// # Errors
        ///
        /// Returns error if page cannot be created
        pub async fn new_page(&self) -> StoreResult<ChromiumDriver> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            Ok(ChromiumDriver {
                page,
                navigation_timeout: self.config.navigation_timeout,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> StoreResult<()> {
            {
                let mut browser = self.inner.lock().await;
                browser
                    .close()
                    .await
                    .map_err(|e| StoreError::BrowserLaunchError {
                        message: e.to_string(),
                    })?;
            }
            self.handle.abort();
            Ok(())
        }
    }

    /// A Chromium tab implementing [`PageDriver`]
    #[derive(Debug, Clone)]
    pub struct ChromiumDriver {
        page: CdpPage,
        navigation_timeout: Duration,
    }

    impl ChromiumDriver {
        async fn eval<T: DeserializeOwned>(&self, script: String) -> StoreResult<T> {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| StoreError::page(e.to_string()))
        }

        async fn on_locator<T: DeserializeOwned>(
            &self,
            locator: &Locator,
            body: &str,
        ) -> StoreResult<T> {
            self.eval(locator_script(locator, body)).await
        }

        /// Run `body` against the first match, failing when nothing matches
        async fn on_first<T: DeserializeOwned>(
            &self,
            locator: &Locator,
            body: &str,
        ) -> StoreResult<T> {
            let script = format!(
                "const el = nodes[0]; if (!el) return {{ missing: true }}; return {{ missing: false, value: (() => {{ {body} }})() }};"
            );
            let out: serde_json::Value = self.on_locator(locator, &script).await?;
            if out["missing"].as_bool().unwrap_or(true) {
                return Err(StoreError::ElementNotFound {
                    selector: locator.to_string(),
                });
            }
            serde_json::from_value(out["value"].clone()).map_err(StoreError::from)
        }

        /// Tag the first match so CDP can address it as a DOM element
        async fn element(&self, locator: &Locator) -> StoreResult<Element> {
            let body = format!(
                "document.querySelectorAll('[{TARGET_ATTR}]').forEach(e => e.removeAttribute('{TARGET_ATTR}')); el.setAttribute('{TARGET_ATTR}', '1'); el.scrollIntoView({{ block: 'center' }}); return true;"
            );
            let _: bool = self.on_first(locator, &body).await?;
            self.page
                .find_element(format!("[{TARGET_ATTR}]"))
                .await
                .map_err(|_| StoreError::ElementNotFound {
                    selector: locator.to_string(),
                })
        }

        async fn poll<F>(&self, timeout: Duration, mut check: F) -> StoreResult<()>
        where
            F: FnMut() -> futures::future::BoxFuture<'static, StoreResult<bool>>,
        {
            let deadline = Instant::now() + timeout;
            loop {
                if check().await? {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(StoreError::Timeout {
                        ms: timeout.as_millis() as u64,
                    });
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn goto(&self, url: &str) -> StoreResult<()> {
            tracing::debug!(url, "goto");
            self.page
                .goto(url)
                .await
                .map_err(|e| StoreError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> StoreResult<String> {
            self.page
                .url()
                .await
                .map(Option::unwrap_or_default)
                .map_err(|e| StoreError::page(e.to_string()))
        }

        async fn title(&self) -> StoreResult<String> {
            self.page
                .get_title()
                .await
                .map(Option::unwrap_or_default)
                .map_err(|e| StoreError::page(e.to_string()))
        }

        async fn reload(&self) -> StoreResult<()> {
            self.page
                .reload()
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            Ok(())
        }

        async fn go_back(&self) -> StoreResult<()> {
            let _: bool = self
                .eval("(() => { history.back(); return true; })()".to_string())
                .await?;
            tokio::time::sleep(NETWORK_QUIET).await;
            self.wait_for_load_state(LoadState::Load).await
        }

        async fn wait_for_load_state(&self, state: LoadState) -> StoreResult<()> {
            let page = self.page.clone();
            let mut last_resources: Option<(u64, Instant)> = None;
            let deadline = Instant::now() + self.navigation_timeout;
            loop {
                let probe: serde_json::Value = {
                    let result = page
                        .evaluate(
                            "({ ready: document.readyState, resources: performance.getEntriesByType('resource').length })",
                        )
                        .await
                        .map_err(|e| StoreError::page(e.to_string()))?;
                    result
                        .into_value()
                        .map_err(|e| StoreError::page(e.to_string()))?
                };
                let ready = probe["ready"].as_str().unwrap_or("loading");
                let done = match state {
                    LoadState::DomContentLoaded => ready != "loading",
                    LoadState::Load => ready == "complete",
                    LoadState::NetworkIdle => {
                        let resources = probe["resources"].as_u64().unwrap_or(0);
                        let now = Instant::now();
                        match last_resources {
                            Some((count, since)) if count == resources => {
                                ready == "complete" && now.duration_since(since) >= NETWORK_QUIET
                            }
                            _ => {
                                last_resources = Some((resources, now));
                                false
                            }
                        }
                    }
                };
                if done {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(StoreError::Timeout {
                        ms: self.navigation_timeout.as_millis() as u64,
                    });
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        async fn wait_for_timeout(&self, duration: Duration) -> StoreResult<()> {
            tokio::time::sleep(duration).await;
            Ok(())
        }

        async fn wait_for(
            &self,
            locator: &Locator,
            state: WaitState,
            timeout: Duration,
        ) -> StoreResult<()> {
            let body = match state {
                WaitState::Visible => "return visible(nodes[0]);",
                WaitState::Hidden => "return !visible(nodes[0]);",
                WaitState::Attached => "return nodes.length > 0;",
                WaitState::Detached => "return nodes.length === 0;",
            };
            let script = locator_script(locator, body);
            let this = self.clone();
            self.poll(timeout, move || {
                let this = this.clone();
                let script = script.clone();
                Box::pin(async move { this.eval::<bool>(script).await })
            })
            .await
        }

        async fn count(&self, locator: &Locator) -> StoreResult<usize> {
            self.on_locator(locator, "return nodes.length;").await
        }

        async fn is_visible(&self, locator: &Locator) -> StoreResult<bool> {
            self.on_locator(locator, "return visible(nodes[0]);").await
        }

        async fn is_checked(&self, locator: &Locator) -> StoreResult<bool> {
            self.on_first(locator, "return !!el.checked;").await
        }

        async fn text_content(&self, locator: &Locator) -> StoreResult<Option<String>> {
            self.on_locator(locator, "return nodes[0] ? nodes[0].textContent : null;")
                .await
        }

        async fn all_text_contents(&self, locator: &Locator) -> StoreResult<Vec<String>> {
            self.on_locator(locator, "return nodes.map(n => n.textContent || '');")
                .await
        }

        async fn input_value(&self, locator: &Locator) -> StoreResult<String> {
            self.on_first(locator, "return el.value === undefined ? '' : String(el.value);")
                .await
        }

        async fn attribute(&self, locator: &Locator, name: &str) -> StoreResult<Option<String>> {
            let body = format!(
                "return nodes[0] ? nodes[0].getAttribute({}) : null;",
                serde_json::Value::from(name)
            );
            self.on_locator(locator, &body).await
        }

        async fn all_attributes(&self, locator: &Locator, name: &str) -> StoreResult<Vec<String>> {
            let body = format!(
                "return nodes.map(n => n.getAttribute({})).filter(v => v !== null);",
                serde_json::Value::from(name)
            );
            self.on_locator(locator, &body).await
        }

        async fn click(&self, locator: &Locator, options: ClickOptions) -> StoreResult<()> {
            tracing::debug!(%locator, force = options.force, "click");
            if options.force {
                let _: bool = self.on_first(locator, "el.click(); return true;").await?;
                return Ok(());
            }
            self.wait_for(locator, WaitState::Visible, self.navigation_timeout)
                .await?;
            self.element(locator)
                .await?
                .click()
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            Ok(())
        }

        async fn fill(&self, locator: &Locator, value: &str) -> StoreResult<()> {
            tracing::debug!(%locator, value, "fill");
            let el = self.element(locator).await?;
            let _: bool = self
                .on_first(
                    locator,
                    "el.focus(); el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true })); return true;",
                )
                .await?;
            el.type_str(value)
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            let _: bool = self
                .on_first(
                    locator,
                    "el.dispatchEvent(new Event('change', { bubbles: true })); return true;",
                )
                .await?;
            Ok(())
        }

        async fn press(&self, locator: &Locator, key: &str) -> StoreResult<()> {
            let el = self.element(locator).await?;
            el.focus()
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            el.press_key(key)
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            Ok(())
        }

        async fn hover(&self, locator: &Locator) -> StoreResult<()> {
            self.element(locator)
                .await?
                .hover()
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            Ok(())
        }

        async fn set_checked(&self, locator: &Locator, checked: bool) -> StoreResult<()> {
            let body = format!("if (!!el.checked !== {checked}) el.click(); return true;");
            let _: bool = self.on_first(locator, &body).await?;
            Ok(())
        }

        async fn select_option(&self, locator: &Locator, option: SelectOption) -> StoreResult<()> {
            let matcher = match &option {
                SelectOption::Label(label) => format!(
                    "o.textContent.trim() === {}",
                    serde_json::Value::from(label.as_str())
                ),
                SelectOption::Value(value) => {
                    format!("o.value === {}", serde_json::Value::from(value.as_str()))
                }
                SelectOption::Index(i) => format!("o.index === {i}"),
            };
            let body = format!(
                "const opt = Array.from(el.options || []).find(o => {matcher}); if (!opt) return false; el.value = opt.value; el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;"
            );
            let found: bool = self.on_first(locator, &body).await?;
            if found {
                Ok(())
            } else {
                Err(StoreError::ElementNotFound {
                    selector: format!("{locator} option {option:?}"),
                })
            }
        }

        async fn set_input_files(&self, locator: &Locator, path: &Path) -> StoreResult<()> {
            let el = self.element(locator).await?;
            let files: Vec<String> = if path.as_os_str().is_empty() {
                Vec::new()
            } else {
                vec![path.to_string_lossy().into_owned()]
            };
            let params = SetFileInputFilesParams::builder()
                .files(files)
                .backend_node_id(el.backend_node_id)
                .build()
                .map_err(StoreError::page)?;
            self.page
                .execute(params)
                .await
                .map_err(|e| StoreError::page(e.to_string()))?;
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumBrowser, ChromiumDriver};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::Locator;

    #[test]
    fn test_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.viewport_height, 720);
    }

    #[test]
    fn test_config_builder() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_viewport(800, 600)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium");
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.viewport_width, 800);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }

    #[test]
    fn test_locator_script_embeds_steps() {
        let script = locator_script(&Locator::new("#search_query_top"), "return nodes.length;");
        assert!(script.contains(r##""css":"#search_query_top""##));
        assert!(script.contains("return nodes.length;"));
        assert!(!script.contains("__STEPS__"));
    }
}
