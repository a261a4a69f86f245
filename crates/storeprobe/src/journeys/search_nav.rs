//! Search and category navigation journeys.

use super::{optional, Journey};
use crate::assertion::SoftAssertions;
use crate::driver::PageDriver;
use crate::fixtures::TestData;
use crate::locator::Locator;
use crate::pages::{Category, Size, Storefront};
use crate::scenario::{Scenario, ScenarioReport};

/// Partial query typed to trigger auto-complete
const AUTO_COMPLETE_PREFIX: &str = "Blo";

/// Search for a term that matches nothing
pub async fn search_no_results<D: PageDriver>(
    store: &Storefront<D>,
    data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::SearchNoResults.name());
    let home = &store.home;

    scenario
        .step("Navigate to homepage", async {
            home.goto().await?;
            let mut soft = scenario.soft();
            let title = store.page().title().await?;
            soft.assert_contains(&title, "My Shop", "page title");
            Ok(soft)
        })
        .await;

    scenario
        .step("Search for non-existent product", async {
            home.search_for_product(&data.invalid_search_term).await?;
            let mut soft = scenario.soft();
            let shown = store
                .page()
                .is_visible_within(&home.search_no_results, 5000)
                .await?;
            soft.assert_true(shown, "no-results warning visible");
            Ok(soft)
        })
        .await;

    scenario
        .step("Verify no results message is displayed", async {
            let mut soft = scenario.soft();
            soft.assert_true(home.is_no_results_displayed().await?, "no results displayed");
            let count = home.search_results_count().await;
            soft.assert_contains(&count, "0", "results count");
            Ok(soft)
        })
        .await;

    scenario.finish()
}

/// Type a prefix, follow an auto-complete suggestion or fall back to a
/// plain search, and expect results
pub async fn search_auto_suggest<D: PageDriver>(
    store: &Storefront<D>,
    _data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::SearchAutoSuggest.name());
    let home = &store.home;
    let page = store.page();

    scenario
        .step("Navigate to homepage", async { home.goto().await })
        .await;

    scenario
        .step("Start typing in search field to trigger auto-complete", async {
            page.fill(&home.search_query_input, AUTO_COMPLETE_PREFIX)
                .await?;
            match home.wait_for_search_auto_complete().await {
                Ok(()) => {
                    let suggestions = home.search_auto_complete.locator("li");
                    if page.count(&suggestions).await? > 0 {
                        page.click(&suggestions.first()).await?;
                    }
                }
                Err(e) => {
                    tracing::info!(error = %e, "auto-complete not available, submitting search");
                    page.click(&home.search_query_submit).await?;
                }
            }
            Ok(())
        })
        .await;

    scenario
        .step("Verify search results are displayed", async {
            page.wait_for_network_idle().await?;
            let mut soft = scenario.soft();
            let results = Locator::new(".product-container, .product-name").first();
            soft.assert_true(
                page.is_visible_within(&results, 5000).await?,
                "search results or product visible",
            );
            Ok(soft)
        })
        .await;

    scenario.finish()
}

/// Open the Women category, filter by size and toggle list/grid views
pub async fn category_navigation<D: PageDriver>(
    store: &Storefront<D>,
    data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::CategoryNavigation.name());
    let (home, category) = (&store.home, &store.category);

    scenario
        .step("Navigate to homepage", async { home.goto().await })
        .await;

    scenario
        .step("Navigate to Women category", async {
            home.navigate_to_category(Category::Women).await?;
            category.wait_for_products_to_load().await
        })
        .await;

    scenario
        .step("Verify category page is loaded with products", async {
            let mut soft = scenario.soft();
            soft.assert_gt(&category.product_count().await?, &0, "product count");
            let name = category.current_category_name().await?.unwrap_or_default();
            soft.assert_contains_ignore_case(&name, "women", "category name");
            Ok(soft)
        })
        .await;

    scenario
        .step("Apply size filter", async {
            Ok(optional("size filter", async {
                let size: Size = data.filter_size.parse()?;
                category.filter_by_size(size).await?;
                category.wait_for_products_to_load().await?;

                let mut soft = SoftAssertions::new();
                soft.assert_true(
                    category.is_filter_applied(&data.filter_size).await?,
                    "size filter applied",
                );
                let names = category.all_product_names().await?;
                soft.assert_not_empty(&names, "filtered products");
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario
        .step("Switch between grid and list view", async {
            Ok(optional("view switching", async {
                category.switch_to_list_view().await?;
                category.switch_to_grid_view().await?;
                let mut soft = SoftAssertions::new();
                let visible = store
                    .page()
                    .is_visible(&category.product_items.first())
                    .await?;
                soft.assert_true(visible, "products visible after view changes");
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario.finish()
}

/// Open Dresses, check the breadcrumb and open a product
pub async fn breadcrumb_navigation<D: PageDriver>(
    store: &Storefront<D>,
    _data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::BreadcrumbNavigation.name());
    let (home, category) = (&store.home, &store.category);
    let page = store.page();

    scenario
        .step("Navigate to homepage", async { home.goto().await })
        .await;

    scenario
        .step("Navigate to a category through breadcrumbs", async {
            home.navigate_to_category(Category::Dresses).await?;
            category.wait_for_products_to_load().await
        })
        .await;

    scenario
        .step("Verify breadcrumb navigation", async {
            let mut soft = scenario.soft();
            let exists = page.is_visible(&category.breadcrumb).await?;
            soft.assert_true(exists, "breadcrumb visible");
            if exists {
                let trail = page.text(&category.breadcrumb).await?.unwrap_or_default();
                soft.assert_contains_ignore_case(&trail, "women", "breadcrumb trail");
            }
            Ok(soft)
        })
        .await;

    scenario
        .step("Click on a product to verify navigation", async {
            let mut soft = scenario.soft();
            if !category.all_product_names().await?.is_empty() {
                category.click_product(0).await?;
                soft.assert_contains(&page.url().await?, "id_product", "product URL");
            }
            Ok(soft)
        })
        .await;

    scenario.finish()
}

/// Search a broad term and page forward and back through the results
pub async fn search_pagination<D: PageDriver>(
    store: &Storefront<D>,
    _data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::SearchPagination.name());
    let (home, category) = (&store.home, &store.category);

    scenario
        .step("Navigate to homepage and search for products", async {
            home.goto().await?;
            home.search_for_product("dress").await?;
            category.wait_for_products_to_load().await
        })
        .await;

    scenario
        .step("Verify search results and check pagination", async {
            let mut soft = scenario.soft();
            soft.assert_gt(&category.product_count().await?, &0, "product count");

            if store.page().is_visible(&category.pagination_next).await? {
                let first_page = category.all_product_names().await?;
                if category.go_to_next_page().await? {
                    let next_page = category.all_product_names().await?;
                    soft.assert_true(next_page != first_page, "next page lists other products");
                    soft.assert_true(
                        category.go_to_previous_page().await?,
                        "previous page reachable",
                    );
                }
            }
            Ok(soft)
        })
        .await;

    scenario.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockEffect, MockElement};
    use crate::page_object::Page;
    use crate::scenario::StepStatus;

    fn store(driver: MockDriver) -> Storefront<MockDriver> {
        Storefront::new(&Page::new(driver, "http://shop.test"))
    }

    fn statuses(report: &ScenarioReport) -> Vec<StepStatus> {
        report.steps.iter().map(|s| s.status).collect()
    }

    #[tokio::test]
    async fn test_search_no_results_passes() {
        let driver = MockDriver::new()
            .with_title("My Shop")
            .with_element("#search_query_top")
            .with_element(r#"[name="submit_search"]"#)
            .with_text(".alert-warning", "No results were found for your search")
            .with_text(".heading-counter", "0 results have been found.");
        let report = search_no_results(&store(driver), &TestData::default()).await;
        assert_eq!(statuses(&report), vec![StepStatus::Passed; 3]);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_search_no_results_fails_when_products_shown() {
        let driver = MockDriver::new()
            .with_title("My Shop")
            .with_element("#search_query_top")
            .with_element(r#"[name="submit_search"]"#)
            .with_text(".heading-counter", "3 results have been found.");
        let report = search_no_results(&store(driver), &TestData::default()).await;
        assert_eq!(
            statuses(&report),
            vec![StepStatus::Passed, StepStatus::Failed, StepStatus::Failed]
        );
    }

    #[tokio::test]
    async fn test_auto_suggest_falls_back_to_submit() {
        let driver = MockDriver::new()
            .with_element("#search_query_top")
            .with_element(r#"[name="submit_search"]"#)
            .with_text(".product-container, .product-name", "Blouse");
        let store = store(driver);
        let report = search_auto_suggest(&store, &TestData::default()).await;
        assert!(report.is_success());
        assert_eq!(report.skipped(), 0);
        let driver = store.page().driver();
        assert_eq!(driver.value_of("#search_query_top").as_deref(), Some("Blo"));
        assert!(driver.was_called(r#"click:[name="submit_search"]"#));
    }

    #[tokio::test]
    async fn test_auto_suggest_clicks_first_suggestion() {
        let driver = MockDriver::new()
            .with_element("#search_query_top")
            .with_element(".ac_results")
            .with_elements(
                ".ac_results >> li",
                vec![MockElement::text("Blouse"), MockElement::text("Blue dress")],
            )
            .with_text(".product-container, .product-name", "Blouse");
        let store = store(driver);
        let report = search_auto_suggest(&store, &TestData::default()).await;
        assert!(report.is_success());
        assert!(store.page().driver().was_called("click:.ac_results >> li"));
        assert!(!store.page().driver().was_called("click:[name="));
    }

    #[tokio::test]
    async fn test_category_navigation_without_filters() {
        let driver = MockDriver::new()
            .with_elements(r#"a[title="Women"]"#, vec![MockElement::default()])
            .with_element(".product_list")
            .with_text(".product-count", "Showing 1 - 7 of 7 items")
            .with_text(".category-name, .page-heading", "Women ");
        let report = category_navigation(&store(driver), &TestData::default()).await;
        // Size filter and view toggles are absent and only logged.
        assert_eq!(statuses(&report), vec![StepStatus::Passed; 5]);
    }

    #[tokio::test]
    async fn test_breadcrumb_opens_product() {
        let driver = MockDriver::new()
            .with_elements(r#"a[title="Women"]"#, vec![MockElement::default()])
            .with_elements(r#"a[title="Dresses"]"#, vec![MockElement::default()])
            .with_element(".product_list")
            .with_text(".breadcrumb", "Home > Women > Dresses")
            .with_elements(".product-name", vec![MockElement::text("Printed Dress")])
            .with_elements(".product-name a", vec![MockElement::default()])
            .on_click(
                ".product-name a >> nth=0",
                MockEffect::Navigate("http://shop.test/index.php?id_product=3".to_string()),
            );
        let report = breadcrumb_navigation(&store(driver), &TestData::default()).await;
        assert_eq!(statuses(&report), vec![StepStatus::Passed; 4]);
    }

    #[tokio::test]
    async fn test_pagination_without_next_link() {
        let driver = MockDriver::new()
            .with_element("#search_query_top")
            .with_element(r#"[name="submit_search"]"#)
            .with_element(".product_list")
            .with_text(".product-count", "Showing 1 - 7 of 7 items");
        let report = search_pagination(&store(driver), &TestData::default()).await;
        assert!(report.is_success());
        assert_eq!(report.skipped(), 0);
    }
}
