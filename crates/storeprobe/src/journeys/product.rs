//! Product listing and product detail journeys.

use super::{optional, Journey};
use crate::assertion::SoftAssertions;
use crate::driver::{PageDriver, WaitState};
use crate::fixtures::TestData;
use crate::locator::Locator;
use crate::pages::{Category, Color, Size, Storefront};
use crate::result::{StoreError, StoreResult};
use crate::scenario::{Scenario, ScenarioReport};

/// Ascending price labels tried when the configured one is missing
pub const ALTERNATIVE_SORTS: [&str; 3] = ["Price: Low to High", "Price ascending", "Price \u{2191}"];

/// Colour tried when the size filter is unavailable
const FALLBACK_COLOR: Color = Color::Blue;

/// Open `category` from the header and wait for its products
async fn open_category<D: PageDriver>(store: &Storefront<D>, category: Category) -> StoreResult<()> {
    store.home.navigate_to_category(category).await?;
    store.category.wait_for_products_to_load().await
}

/// First size containing "M", else the first size
pub(super) fn preferred_size(sizes: &[String]) -> Option<&str> {
    sizes
        .iter()
        .find(|s| s.contains('M'))
        .or_else(|| sizes.first())
        .map(String::as_str)
}

/// Filter Women by size (colour as fallback), then Dresses by size and colour
pub async fn filter_by_category_and_size<D: PageDriver>(
    store: &Storefront<D>,
    data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::FilterByCategoryAndSize.name());
    let category = &store.category;

    scenario
        .step("Navigate to Women category", async {
            store.home.goto().await?;
            open_category(store, Category::Women).await
        })
        .await;

    scenario
        .step("Get initial product count", async {
            let mut soft = scenario.soft();
            soft.assert_gt(&category.product_count().await?, &0, "initial product count");
            Ok(soft)
        })
        .await;

    scenario
        .step("Apply size filter", async {
            let by_size = async {
                let listed = category.all_product_names().await?.len() as u64;
                let size: Size = data.filter_size.parse()?;
                category.filter_by_size(size).await?;
                category.wait_for_products_to_load().await?;

                let mut soft = SoftAssertions::new();
                let filtered = category.product_count().await?;
                soft.assert_true(filtered <= listed, "filtered count does not grow");
                soft.assert_true(
                    category.is_filter_applied(&data.filter_size).await?,
                    "size filter applied",
                );
                Ok::<_, StoreError>(soft)
            };
            let soft = match by_size.await {
                Ok(soft) => soft,
                Err(e) => {
                    tracing::info!(error = %e, "size filter not available, trying colour");
                    optional("colour filter", async {
                        category.filter_by_color(FALLBACK_COLOR).await?;
                        category.wait_for_products_to_load().await?;
                        let mut soft = SoftAssertions::new();
                        let names = category.all_product_names().await?;
                        soft.assert_not_empty(&names, "colour-filtered products");
                        Ok(soft)
                    })
                    .await
                }
            };
            Ok(soft)
        })
        .await;

    scenario
        .step("Navigate to Dresses subcategory", async {
            open_category(store, Category::Dresses).await?;
            let mut soft = scenario.soft();
            soft.assert_not_empty(&category.all_product_names().await?, "dresses");
            let name = category.current_category_name().await?.unwrap_or_default();
            soft.assert_contains_ignore_case(&name, "dress", "category name");
            Ok(soft)
        })
        .await;

    scenario
        .step("Apply multiple filters if available", async {
            Ok(optional("combined filters", async {
                category.filter_by_size(Size::M).await?;
                category.filter_by_color(FALLBACK_COLOR).await?;
                let mut soft = SoftAssertions::new();
                soft.assert_not_empty(&category.applied_filters().await?, "applied filters");
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario.finish()
}

/// Sort Women by price both ways and by name
pub async fn sort_by_price<D: PageDriver>(store: &Storefront<D>, data: &TestData) -> ScenarioReport {
    let scenario = Scenario::new(Journey::SortByPrice.name());
    let category = &store.category;

    scenario
        .step("Navigate to category with products", async {
            store.home.goto().await?;
            open_category(store, Category::Women).await
        })
        .await;

    scenario
        .step("Get initial product prices", async {
            let mut soft = scenario.soft();
            soft.assert_not_empty(&category.all_product_prices().await?, "prices");
            Ok(soft)
        })
        .await;

    scenario
        .step("Sort by price: lowest first", async {
            let ascending = async {
                category.sort_by(&data.sort_option).await?;
                let prices = category.all_product_prices().await?;
                let mut soft = SoftAssertions::new();
                soft.assert_not_empty(&prices, "sorted prices");
                soft.assert_sorted(&prices, false, "prices lowest first");
                Ok::<_, StoreError>(soft)
            };
            match ascending.await {
                Ok(soft) => Ok(soft),
                Err(e) => {
                    tracing::info!(error = %e, option = %data.sort_option, "sort option missing");
                    for label in ALTERNATIVE_SORTS {
                        if category.sort_by(label).await.is_ok() {
                            tracing::info!(label, "sorted with alternative label");
                            break;
                        }
                    }
                    Ok(SoftAssertions::new())
                }
            }
        })
        .await;

    scenario
        .step("Sort by price: highest first", async {
            Ok(optional("descending price sort", async {
                category.sort_by("Price: Highest first").await?;
                let mut soft = SoftAssertions::new();
                let prices = category.all_product_prices().await?;
                soft.assert_sorted(&prices, true, "prices highest first");
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario
        .step("Sort by name", async {
            Ok(optional("name sort", async {
                category.sort_by("Product Name: A to Z").await?;
                let mut soft = SoftAssertions::new();
                let names = category.all_product_names().await?;
                soft.assert_sorted(&names, false, "names A to Z");
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario.finish()
}

/// Open a searched product, change quantity and variants, add it to the
/// cart and browse its tabs
pub async fn update_product_details<D: PageDriver>(
    store: &Storefront<D>,
    data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::UpdateProductDetails.name());
    let product = &store.product;
    let page = store.page();

    scenario
        .step("Navigate to a product", async {
            store.home.goto().await?;
            store.home.search_for_product(&data.product_to_search).await?;
            store.category.wait_for_products_to_load().await?;
            store.category.click_product(0).await?;
            product.wait_for_product_to_load().await
        })
        .await;

    scenario
        .step("Verify product page elements", async {
            let mut soft = scenario.soft();
            let name = product.product_name().await?;
            soft.assert_false(name.is_empty(), "product name present");
            soft.assert_gt(&product.product_price().await?, &0.0, "product price");
            soft.assert_some(&product.product_availability().await?, "availability");
            Ok(soft)
        })
        .await;

    scenario
        .step("Update product quantity", async {
            let mut soft = scenario.soft();
            let initial = product.current_quantity().await?;
            soft.assert_gt(&initial, &0, "initial quantity");

            product.increase_quantity(2).await?;
            let increased = product.current_quantity().await?;
            soft.assert_eq(&increased, &(initial + 2), "increased quantity");

            product.decrease_quantity(1).await?;
            let decreased = product.current_quantity().await?;
            soft.assert_eq(&decreased, &increased.saturating_sub(1), "decreased quantity");

            product.set_quantity(5).await?;
            soft.assert_eq(&product.current_quantity().await?, &5, "quantity set to 5");
            Ok(soft)
        })
        .await;

    scenario
        .step("Select product size if available", async {
            Ok(optional("size selection", async {
                let sizes = product.available_sizes().await?;
                if let Some(size) = preferred_size(&sizes) {
                    product.select_size(size).await?;
                    page.pause(1000).await?;
                }
                Ok(SoftAssertions::new())
            })
            .await)
        })
        .await;

    scenario
        .step("Select product color if available", async {
            Ok(optional("colour selection", async {
                if let Some(color) = product.available_colors().await?.first() {
                    product.select_color(color).await?;
                    page.pause(1000).await?;
                }
                Ok(SoftAssertions::new())
            })
            .await)
        })
        .await;

    scenario
        .step("Add product to cart", async {
            let mut soft = scenario.soft();
            if product.is_out_of_stock().await? {
                tracing::info!("product is out of stock, not adding to cart");
                return Ok(soft);
            }
            product.add_to_cart().await?;
            let info = product.cart_modal_info().await?;
            soft.assert_some(&info, "cart modal");
            if let Some(info) = &info {
                soft.assert_false(info.product_name.is_empty(), "cart modal product name");
            }
            product.continue_shopping().await?;
            Ok(soft)
        })
        .await;

    scenario
        .step("Explore product tabs", async {
            Ok(optional("product tabs", async {
                product.open_description_tab().await?;
                let mut soft = SoftAssertions::new();
                soft.assert_true(
                    page.is_visible(&product.description_content).await?,
                    "description visible",
                );
                soft.merge(
                    optional("data sheet tab", async {
                        product.open_data_sheet_tab().await?;
                        let mut soft = SoftAssertions::new();
                        soft.assert_true(
                            page.is_visible(&product.data_sheet_content).await?,
                            "data sheet visible",
                        );
                        Ok(soft)
                    })
                    .await,
                );
                soft.merge(
                    optional("reviews tab", async {
                        product.open_reviews_tab().await?;
                        let mut soft = SoftAssertions::new();
                        soft.assert_true(
                            page.is_visible(&product.reviews_content).await?,
                            "reviews visible",
                        );
                        Ok(soft)
                    })
                    .await,
                );
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario.finish()
}

/// Open a product and click through its thumbnails
pub async fn image_gallery<D: PageDriver>(store: &Storefront<D>, _data: &TestData) -> ScenarioReport {
    let scenario = Scenario::new(Journey::ImageGallery.name());
    let product = &store.product;
    let page = store.page();

    scenario
        .step("Navigate to a product with images", async {
            store.home.goto().await?;
            store.home.search_for_product("dress").await?;
            store.category.wait_for_products_to_load().await?;
            store.category.click_product(0).await?;
            product.wait_for_product_to_load().await
        })
        .await;

    scenario
        .step("Interact with product images", async {
            page.wait_for(&product.main_product_image, WaitState::Visible, 5000)
                .await?;
            Ok(optional("thumbnails", async {
                let thumbnails = page.count(&product.thumbnail_images).await?;
                for index in (1..thumbnails).take(2) {
                    product.click_thumbnail(index).await?;
                    page.pause(1000).await?;
                }
                Ok(SoftAssertions::new())
            })
            .await)
        })
        .await;

    scenario.finish()
}

/// Wishlist, comparison and related products from a product page
pub async fn comparison_wishlist<D: PageDriver>(
    store: &Storefront<D>,
    _data: &TestData,
) -> ScenarioReport {
    let scenario = Scenario::new(Journey::ComparisonWishlist.name());
    let product = &store.product;
    let page = store.page();

    scenario
        .step("Navigate to product page", async {
            store.home.goto().await?;
            open_category(store, Category::Women).await?;
            store.category.click_product(0).await?;
            product.wait_for_product_to_load().await
        })
        .await;

    scenario
        .step("Add product to wishlist if available", async {
            Ok(optional("wishlist", async {
                product.add_to_wishlist().await?;
                if page.is_visible_within(&product.success_message, 3000).await? {
                    tracing::info!("wishlist confirmed");
                }
                Ok(SoftAssertions::new())
            })
            .await)
        })
        .await;

    scenario
        .step("Add product to comparison if available", async {
            Ok(optional("comparison", async {
                product.add_to_compare().await?;
                page.pause(2000).await?;
                let mut soft = SoftAssertions::new();
                let markers = page.count(&Locator::new(".compare, [data-compare]")).await?;
                soft.assert_gt(&markers, &0, "compare elements");
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario
        .step("Check related products", async {
            Ok(optional("related products", async {
                let mut soft = SoftAssertions::new();
                let related = product.related_products().await?;
                if let Some(first) = related.first() {
                    soft.assert_false(first.name.is_empty(), "related product name");
                    soft.assert_false(first.price.is_empty(), "related product price");
                    product.click_related_product(0).await?;
                    let name = product.product_name().await?;
                    soft.assert_false(name.is_empty(), "related product page name");
                }
                Ok(soft)
            })
            .await)
        })
        .await;

    scenario.finish()
}
