//! Replays locators captured by the recorder against the live storefront.
//!
//! The selectors below are the ones a recording session produced; when a
//! new session yields different ones, update them here and rerun the
//! `codegen` suite to see whether the page objects still agree.

use super::Journey;
use crate::driver::PageDriver;
use crate::fixtures::TestData;
use crate::locator::Locator;
use crate::page_object::Page;
use crate::pages::Storefront;
use crate::result::StoreResult;
use crate::scenario::{Scenario, ScenarioReport};
use serde::Serialize;

const SEARCH_INPUT: &str = "#search_query_top";
const SEARCH_BUTTON: &str = r#"[name="submit_search"]"#;
const SEARCH_RESULTS: &str = ".product-container";
const PRODUCT_LINK: &str = ".product-name a";
const ADD_TO_CART: &str = ".ajax_add_to_cart_button, #add_to_cart button";
const SEARCH_TERM: &str = "dress";

/// A page-object selector next to the one the recorder produced for the
/// same element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocatorComparison {
    /// Element name
    pub name: &'static str,
    /// Selector used by the page objects
    pub current: &'static str,
    /// Selector emitted by the recorder
    pub codegen: &'static str,
    /// Text typed (then cleared) through the current selector, for inputs
    pub fill: Option<&'static str>,
}

/// Selectors compared by [`current_vs_codegen`]
pub const CODEGEN_COMPARISONS: [LocatorComparison; 2] = [
    LocatorComparison {
        name: "Search Input",
        current: SEARCH_INPUT,
        codegen: SEARCH_INPUT,
        fill: Some("test"),
    },
    LocatorComparison {
        name: "Search Button",
        current: SEARCH_BUTTON,
        codegen: SEARCH_BUTTON,
        fill: None,
    },
];

/// Visibility of both selectors of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    /// Page-object selector is visible
    pub current_visible: bool,
    /// Recorder selector is visible
    pub codegen_visible: bool,
}

impl LocatorComparison {
    /// Check both selectors and exercise the current one when it is an input
    pub async fn check<D: PageDriver>(&self, page: &Page<D>) -> StoreResult<ComparisonOutcome> {
        let current = Locator::new(self.current);
        let outcome = ComparisonOutcome {
            current_visible: page.is_visible(&current).await?,
            codegen_visible: page.is_visible(&Locator::new(self.codegen)).await?,
        };
        tracing::info!(
            element = self.name,
            current = self.current,
            codegen = self.codegen,
            current_visible = outcome.current_visible,
            codegen_visible = outcome.codegen_visible,
            "locator comparison"
        );
        if let (Some(value), true) = (self.fill, outcome.current_visible) {
            page.fill(&current, value).await?;
            page.clear(&current).await?;
        }
        Ok(outcome)
    }
}

async fn search_with_recorded_locators<D: PageDriver>(page: &Page<D>) -> StoreResult<()> {
    page.fill(&Locator::new(SEARCH_INPUT), SEARCH_TERM).await?;
    page.click(&Locator::new(SEARCH_BUTTON)).await?;
    page.wait_for_network_idle().await
}

/// Search through the recorded search box selectors
pub async fn search_locators<D: PageDriver>(store: &Storefront<D>, _data: &TestData) -> ScenarioReport {
    let scenario = Scenario::new(Journey::SearchLocators.name());
    let page = store.page();

    scenario
        .step("Open homepage", async { store.home.goto().await })
        .await;

    scenario
        .step("Search locators are visible", async {
            let mut soft = scenario.soft();
            for selector in [SEARCH_INPUT, SEARCH_BUTTON] {
                let visible = page.is_visible(&Locator::new(selector)).await?;
                soft.assert_true(visible, &format!("{selector} visible"));
            }
            Ok(soft)
        })
        .await;

    scenario
        .step("Search with recorded locators", async {
            search_with_recorded_locators(page).await?;
            let mut soft = scenario.soft();
            let results = Locator::new(SEARCH_RESULTS).first();
            soft.assert_true(
                page.is_visible_within(&results, 5000).await?,
                "search results visible",
            );
            Ok(soft)
        })
        .await;

    scenario.finish()
}

/// Reach a product through recorded selectors and add it to the cart
pub async fn cart_locators<D: PageDriver>(store: &Storefront<D>, _data: &TestData) -> ScenarioReport {
    let scenario = Scenario::new(Journey::CartLocators.name());
    let page = store.page();

    scenario
        .step("Open homepage", async { store.home.goto().await })
        .await;

    scenario
        .step("Search and open first product", async {
            search_with_recorded_locators(page).await?;
            page.force_click(&Locator::new(PRODUCT_LINK).first()).await?;
            page.wait_for_network_idle().await
        })
        .await;

    scenario
        .step("Add to cart with recorded locator", async {
            let button = Locator::new(ADD_TO_CART).first();
            if page.is_visible(&button).await? {
                page.click(&button).await?;
                page.pause(2000).await?;
                tracing::info!("recorded add-to-cart locator works");
            }
            Ok(())
        })
        .await;

    scenario.finish()
}

/// Log which of the page-object and recorded selectors are visible
pub async fn current_vs_codegen<D: PageDriver>(
    store: &Storefront<D>,
    _data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::CurrentVsCodegen.name());
    let page = store.page();

    scenario
        .step("Open homepage", async { store.home.goto().await })
        .await;

    scenario
        .step("Compare current and recorded locators", async {
            for comparison in &CODEGEN_COMPARISONS {
                if let Err(e) = comparison.check(page).await {
                    tracing::warn!(element = comparison.name, error = %e, "comparison failed");
                }
            }
            Ok(())
        })
        .await;

    scenario.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::scenario::StepStatus;

    fn store(driver: MockDriver) -> Storefront<MockDriver> {
        Storefront::new(&Page::new(driver, "http://shop.test"))
    }

    fn search_box() -> MockDriver {
        MockDriver::new()
            .with_element(SEARCH_INPUT)
            .with_element(SEARCH_BUTTON)
    }

    #[tokio::test]
    async fn test_search_locators_pass() {
        let driver = search_box().with_elements(SEARCH_RESULTS, vec![MockElement::default(); 3]);
        let report = search_locators(&store(driver), &TestData::default()).await;
        assert_eq!(report.passed(), 3);
    }

    #[tokio::test]
    async fn test_search_without_results_fails() {
        let report = search_locators(&store(search_box()), &TestData::default()).await;
        assert_eq!(report.steps[2].status, StepStatus::Failed);
        assert!(report.steps[2].messages[0].contains("search results visible"));
    }

    #[tokio::test]
    async fn test_changed_search_box_is_reported() {
        let driver = MockDriver::new().with_element(SEARCH_BUTTON);
        let report = search_locators(&store(driver), &TestData::default()).await;
        assert_eq!(report.steps[1].status, StepStatus::Failed);
        assert_eq!(report.steps[1].messages.len(), 1);
        assert_eq!(report.steps[2].status, StepStatus::Skipped);
    }

    #[tokio::test]
    async fn test_hidden_add_to_cart_is_not_clicked() {
        let driver = search_box()
            .with_elements(PRODUCT_LINK, vec![MockElement::hidden()])
            .with_elements(ADD_TO_CART, vec![MockElement::hidden()]);
        let store = store(driver);
        let report = cart_locators(&store, &TestData::default()).await;
        assert!(report.is_success());
        assert_eq!(report.skipped(), 0);
        assert!(!store.page().driver().was_called("click:.ajax_add_to_cart_button"));
    }

    #[tokio::test]
    async fn test_visible_add_to_cart_is_clicked() {
        let driver = search_box()
            .with_elements(PRODUCT_LINK, vec![MockElement::default()])
            .with_element(ADD_TO_CART);
        let store = store(driver);
        let report = cart_locators(&store, &TestData::default()).await;
        assert_eq!(report.passed(), 3);
        assert!(store.page().driver().was_called("click:.ajax_add_to_cart_button"));
    }

    #[tokio::test]
    async fn test_comparison_fills_and_clears_input() {
        let page = Page::new(search_box(), "http://shop.test");
        let outcome = CODEGEN_COMPARISONS[0].check(&page).await.unwrap();
        assert!(outcome.current_visible && outcome.codegen_visible);
        let driver = page.driver();
        assert!(driver.was_called("fill:#search_query_top:test"));
        assert_eq!(driver.value_of(SEARCH_INPUT).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_comparison_on_blank_page_still_passes() {
        let store = store(MockDriver::new());
        let report = current_vs_codegen(&store, &TestData::default()).await;
        assert_eq!(report.passed(), 2);
        assert!(!store.page().driver().was_called("fill:"));
    }
}
