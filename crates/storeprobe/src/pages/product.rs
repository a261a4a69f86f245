//! Product detail page: variants, quantity, cart layer, tabs, reviews.

use crate::driver::{PageDriver, WaitState};
use crate::locator::Locator;
use crate::page_object::{parse_price, Page, PageObject};
use crate::result::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Name and displayed price of a related product tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedProduct {
    /// Product name
    pub name: String,
    /// Price as displayed
    pub price: String,
}

/// Contents of the "added to cart" layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartModalInfo {
    /// Product name
    pub product_name: String,
    /// Line price as displayed
    pub price: String,
    /// Quantity as displayed
    pub quantity: String,
}

/// Product detail page
#[derive(Debug, Clone)]
pub struct ProductPage<D: PageDriver> {
    page: Page<D>,
    /// Product heading
    pub product_name: Locator,
    /// Price
    pub product_price: Locator,
    /// Short description
    pub product_description: Locator,
    /// Reference code
    pub product_reference: Locator,
    /// Condition
    pub product_condition: Locator,
    /// Availability label
    pub product_availability: Locator,
    /// Main image
    pub main_product_image: Locator,
    /// Thumbnails
    pub thumbnail_images: Locator,
    /// Size dropdown
    pub size_select: Locator,
    /// Colour swatches
    pub color_options: Locator,
    /// Quantity field
    pub quantity_input: Locator,
    /// Quantity "+"
    pub quantity_up_button: Locator,
    /// Quantity "-"
    pub quantity_down_button: Locator,
    /// Add to cart
    pub add_to_cart_button: Locator,
    /// Add to wishlist
    pub add_to_wishlist_button: Locator,
    /// Add to compare
    pub compare_button: Locator,
    /// Print
    pub print_button: Locator,
    /// Send to a friend
    pub send_to_friend_button: Locator,
    /// Cart layer
    pub cart_modal: Locator,
    /// Cart layer product name
    pub cart_modal_product_name: Locator,
    /// Cart layer price
    pub cart_modal_price: Locator,
    /// Cart layer quantity
    pub cart_modal_quantity: Locator,
    /// Cart layer "Continue shopping"
    pub continue_shopping_button: Locator,
    /// Cart layer "Proceed to checkout"
    pub proceed_to_checkout_button: Locator,
    /// Cart layer close
    pub cart_modal_close_button: Locator,
    /// Description tab
    pub description_tab: Locator,
    /// Data sheet tab
    pub data_sheet_tab: Locator,
    /// Reviews tab
    pub reviews_tab: Locator,
    /// Description tab body
    pub description_content: Locator,
    /// Data sheet tab body
    pub data_sheet_content: Locator,
    /// Reviews tab body
    pub reviews_content: Locator,
    /// "Write a review"
    pub write_review_button: Locator,
    /// Review title
    pub review_title_input: Locator,
    /// Review body
    pub review_comment_textarea: Locator,
    /// Rating inputs
    pub review_rating_stars: Locator,
    /// Review submit
    pub submit_review_button: Locator,
    /// Facebook share
    pub facebook_share: Locator,
    /// Twitter share
    pub twitter_share: Locator,
    /// Related product tiles
    pub related_products: Locator,
    /// Breadcrumb trail
    pub breadcrumb: Locator,
    /// Breadcrumb link back to the category
    pub back_to_category: Locator,
    /// Success alert
    pub success_message: Locator,
    /// Error alert
    pub error_message: Locator,
}

impl<D: PageDriver> PageObject for ProductPage<D> {
    fn url_pattern(&self) -> &str {
        "/index.php?controller=product"
    }

    fn page_name(&self) -> &str {
        "ProductPage"
    }
}

impl<D: PageDriver> ProductPage<D> {
    /// Bind the page object to a driver handle
    #[must_use]
    pub fn new(page: Page<D>) -> Self {
        Self {
            page,
            product_name: Locator::new("#pb-left-column h1, .pb-center-column h1"),
            product_price: Locator::new("#our_price_display, .pb-center-column .price"),
            product_description: Locator::new(
                "#short_description_content, .product-description",
            ),
            product_reference: Locator::new("#product_reference"),
            product_condition: Locator::new("#product_condition"),
            product_availability: Locator::new("#availability_statut, .availability span"),
            main_product_image: Locator::new("#bigpic, .pb-center-column .product-image img"),
            thumbnail_images: Locator::new("#thumbs_list img, .pb-left-column .thumbs img"),
            size_select: Locator::new("#group_1"),
            color_options: Locator::new("#color_to_pick_list a, .attribute_list .color_pick"),
            quantity_input: Locator::new("#quantity_wanted"),
            quantity_up_button: Locator::new(
                r#".product_quantity_up, .btn.btn-default[data-field-qty="qty"]"#,
            ),
            quantity_down_button: Locator::new(
                r#".product_quantity_down, .btn.btn-default[data-field-qty="qty"]"#,
            ),
            add_to_cart_button: Locator::new("#add_to_cart button, .pb-center-column .btn-primary"),
            add_to_wishlist_button: Locator::new("#wishlist_button, .btn-outline"),
            compare_button: Locator::new(".compare, .btn-outline"),
            print_button: Locator::new(".print"),
            send_to_friend_button: Locator::new(".send-to-friend"),
            cart_modal: Locator::new("#layer_cart, .modal-cart"),
            cart_modal_product_name: Locator::new(
                "#layer_cart_product_title, .modal-cart .product-name",
            ),
            cart_modal_price: Locator::new("#layer_cart_product_price, .modal-cart .product-price"),
            cart_modal_quantity: Locator::new(
                "#layer_cart_product_quantity, .modal-cart .product-quantity",
            ),
            continue_shopping_button: Locator::new(".continue, .btn-secondary"),
            proceed_to_checkout_button: Locator::new(
                r#".btn-primary:has-text("Proceed"), a[title*="checkout"]"#,
            ),
            cart_modal_close_button: Locator::new(".cross, .close, .modal-cart .btn-secondary"),
            description_tab: Locator::new(r#"#idTab1, .nav-tabs a:has-text("Description")"#),
            data_sheet_tab: Locator::new(r#"#idTab2, .nav-tabs a:has-text("Data sheet")"#),
            reviews_tab: Locator::new(r#"#idTab5, .nav-tabs a:has-text("Reviews")"#),
            description_content: Locator::new("#idTabContent1, .tab-content .description"),
            data_sheet_content: Locator::new("#idTabContent2, .tab-content .data-sheet"),
            reviews_content: Locator::new("#idTabContent5, .tab-content .reviews"),
            write_review_button: Locator::new(r#".btn-outline:has-text("Write")"#),
            review_title_input: Locator::new("#comment_title"),
            review_comment_textarea: Locator::new("#content"),
            review_rating_stars: Locator::new(".star_content input"),
            submit_review_button: Locator::new("#submitNewMessage"),
            facebook_share: Locator::new(".facebook-share"),
            twitter_share: Locator::new(".twitter-share"),
            related_products: Locator::new("#featured-products_block_center .product-container"),
            breadcrumb: Locator::new(".breadcrumb"),
            back_to_category: Locator::new(".navigation_page a"),
            success_message: Locator::new(".alert-success"),
            error_message: Locator::new(".alert-danger"),
        }
    }

    /// Driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        &self.page
    }

    /// Wait up to 10s for the heading, then for network idle
    pub async fn wait_for_product_to_load(&self) -> StoreResult<()> {
        self.page
            .wait_for(&self.product_name, WaitState::Visible, 10_000)
            .await?;
        self.page.wait_for_network_idle().await
    }

    /// Product heading
    pub async fn product_name(&self) -> StoreResult<String> {
        self.wait_for_product_to_load().await?;
        self.page.require_text(&self.product_name).await
    }

    /// Displayed price as a number
    pub async fn product_price(&self) -> StoreResult<f64> {
        let text = self.page.require_text(&self.product_price).await?;
        parse_price(&text).ok_or_else(|| StoreError::AssertionFailed {
            message: format!("price {text:?} is not numeric"),
        })
    }

    /// Short description
    pub async fn product_description(&self) -> StoreResult<Option<String>> {
        self.page.text(&self.product_description).await
    }

    /// Availability label
    pub async fn product_availability(&self) -> StoreResult<Option<String>> {
        self.page.text(&self.product_availability).await
    }

    /// Choose a size by label
    pub async fn select_size(&self, size: &str) -> StoreResult<()> {
        self.page.select_label(&self.size_select, size).await?;
        self.page.pause(500).await
    }

    /// Click a colour swatch by name
    pub async fn select_color(&self, color: &str) -> StoreResult<()> {
        let swatch = Locator::new(&format!(
            r#"[title="{color}"], [data-color="{}"]"#,
            color.to_lowercase()
        ));
        self.page.click(&swatch).await?;
        self.page.pause(500).await
    }

    /// Type a quantity
    pub async fn set_quantity(&self, quantity: u32) -> StoreResult<()> {
        self.page
            .fill(&self.quantity_input, &quantity.to_string())
            .await
    }

    /// Press "+" `times` times
    pub async fn increase_quantity(&self, times: u32) -> StoreResult<()> {
        for _ in 0..times {
            self.page.click(&self.quantity_up_button).await?;
            self.page.pause(200).await?;
        }
        Ok(())
    }

    /// Press "-" `times` times
    pub async fn decrease_quantity(&self, times: u32) -> StoreResult<()> {
        for _ in 0..times {
            self.page.click(&self.quantity_down_button).await?;
            self.page.pause(200).await?;
        }
        Ok(())
    }

    /// Quantity field value, 0 when not numeric
    pub async fn current_quantity(&self) -> StoreResult<u32> {
        let value = self.page.value(&self.quantity_input).await?;
        Ok(value.trim().parse().unwrap_or(0))
    }

    /// Add to cart and wait up to 5s for the cart layer
    pub async fn add_to_cart(&self) -> StoreResult<()> {
        self.page.click(&self.add_to_cart_button).await?;
        self.page
            .wait_for(&self.cart_modal, WaitState::Visible, 5000)
            .await
    }

    /// Add to wishlist
    pub async fn add_to_wishlist(&self) -> StoreResult<()> {
        self.page.click(&self.add_to_wishlist_button).await?;
        self.page.pause(1000).await
    }

    /// Add to comparison
    pub async fn add_to_compare(&self) -> StoreResult<()> {
        self.page.click(&self.compare_button).await?;
        self.page.pause(1000).await
    }

    /// Dismiss the cart layer via "Continue shopping"
    pub async fn continue_shopping(&self) -> StoreResult<()> {
        self.page.click(&self.continue_shopping_button).await?;
        self.page
            .wait_for(&self.cart_modal, WaitState::Hidden, 5000)
            .await
    }

    /// Leave the cart layer towards checkout
    pub async fn proceed_to_checkout(&self) -> StoreResult<()> {
        self.page.click(&self.proceed_to_checkout_button).await?;
        self.page.wait_for_network_idle().await
    }

    /// Close the cart layer
    pub async fn close_cart_modal(&self) -> StoreResult<()> {
        self.page.click(&self.cart_modal_close_button).await?;
        self.page
            .wait_for(&self.cart_modal, WaitState::Hidden, 5000)
            .await
    }

    /// Click a thumbnail (no-op when absent)
    pub async fn click_thumbnail(&self, index: usize) -> StoreResult<()> {
        if self.page.count(&self.thumbnail_images).await? > index {
            self.page.click(&self.thumbnail_images.nth(index)).await?;
            self.page.pause(500).await?;
        }
        Ok(())
    }

    async fn open_tab(&self, tab: &Locator, content: &Locator) -> StoreResult<()> {
        self.page.click(tab).await?;
        self.page.wait_for(content, WaitState::Visible, 30_000).await
    }

    /// Show the description tab
    pub async fn open_description_tab(&self) -> StoreResult<()> {
        self.open_tab(&self.description_tab, &self.description_content)
            .await
    }

    /// Show the data sheet tab
    pub async fn open_data_sheet_tab(&self) -> StoreResult<()> {
        self.open_tab(&self.data_sheet_tab, &self.data_sheet_content)
            .await
    }

    /// Show the reviews tab
    pub async fn open_reviews_tab(&self) -> StoreResult<()> {
        self.open_tab(&self.reviews_tab, &self.reviews_content).await
    }

    /// Post a review with a 1-5 star rating
    pub async fn write_review(&self, title: &str, comment: &str, rating: usize) -> StoreResult<()> {
        self.open_reviews_tab().await?;
        self.page.click(&self.write_review_button).await?;
        self.page.fill(&self.review_title_input, title).await?;
        self.page.fill(&self.review_comment_textarea, comment).await?;

        if rating >= 1 && self.page.count(&self.review_rating_stars).await? >= rating {
            self.page
                .click(&self.review_rating_stars.nth(rating - 1))
                .await?;
        }

        self.page.click(&self.submit_review_button).await?;
        self.page.pause(2000).await
    }

    /// Facebook share button
    pub async fn share_on_facebook(&self) -> StoreResult<()> {
        self.page.click(&self.facebook_share).await
    }

    /// Twitter share button
    pub async fn share_on_twitter(&self) -> StoreResult<()> {
        self.page.click(&self.twitter_share).await
    }

    /// Name and price of every related product tile
    pub async fn related_products(&self) -> StoreResult<Vec<RelatedProduct>> {
        let total = self.page.count(&self.related_products).await?;
        let mut products = Vec::with_capacity(total);
        for i in 0..total {
            let tile = self.related_products.nth(i);
            products.push(RelatedProduct {
                name: self
                    .page
                    .text(&tile.locator(".product-name"))
                    .await?
                    .unwrap_or_default(),
                price: self
                    .page
                    .text(&tile.locator(".price"))
                    .await?
                    .unwrap_or_default(),
            });
        }
        Ok(products)
    }

    /// Open a related product (no-op when absent)
    pub async fn click_related_product(&self, index: usize) -> StoreResult<()> {
        if self.page.count(&self.related_products).await? > index {
            self.page.click(&self.related_products.nth(index)).await?;
            self.wait_for_product_to_load().await?;
        }
        Ok(())
    }

    /// Cart layer contents, `None` when the layer is closed
    pub async fn cart_modal_info(&self) -> StoreResult<Option<CartModalInfo>> {
        if !self.page.is_visible(&self.cart_modal).await? {
            return Ok(None);
        }
        Ok(Some(CartModalInfo {
            product_name: self.page.require_text(&self.cart_modal_product_name).await?,
            price: self.page.require_text(&self.cart_modal_price).await?,
            quantity: self.page.require_text(&self.cart_modal_quantity).await?,
        }))
    }

    /// Whether availability reads "out of stock"
    pub async fn is_out_of_stock(&self) -> StoreResult<bool> {
        Ok(self
            .product_availability()
            .await?
            .is_some_and(|a| a.to_lowercase().contains("out of stock")))
    }

    /// Size labels in the dropdown, skipping blanks and the `--` placeholder
    pub async fn available_sizes(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .page
            .texts(&self.size_select.locator("option"))
            .await?
            .into_iter()
            .filter(|s| !s.is_empty() && s != "--")
            .collect())
    }

    /// Colour swatch titles
    pub async fn available_colors(&self) -> StoreResult<Vec<String>> {
        self.page.attributes(&self.color_options, "title").await
    }

    /// Print button
    pub async fn print_product(&self) -> StoreResult<()> {
        self.page.click(&self.print_button).await
    }

    /// "Send to a friend"
    pub async fn send_to_friend(&self) -> StoreResult<()> {
        self.page.click(&self.send_to_friend_button).await?;
        self.page.wait_for_network_idle().await
    }

    /// Follow the breadcrumb back to the category
    pub async fn go_back_to_category(&self) -> StoreResult<()> {
        self.page.click(&self.back_to_category).await?;
        self.page.wait_for_network_idle().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockEffect, MockElement};

    fn product(driver: MockDriver) -> ProductPage<MockDriver> {
        ProductPage::new(Page::new(driver, "http://shop.test"))
    }

    #[tokio::test]
    async fn test_price_parses() {
        let p = product(MockDriver::new().with_text("#our_price_display, .pb-center-column .price", "$27.00"));
        assert_eq!(p.product_price().await.unwrap(), 27.0);
    }

    #[tokio::test]
    async fn test_add_to_cart_waits_for_layer() {
        let p = product(
            MockDriver::new()
                .with_element("#add_to_cart button, .pb-center-column .btn-primary")
                .with_elements("#layer_cart, .modal-cart", vec![MockElement::hidden()])
                .on_click(
                    "#add_to_cart button, .pb-center-column .btn-primary",
                    MockEffect::Show("#layer_cart, .modal-cart".to_string()),
                ),
        );
        p.add_to_cart().await.unwrap();
        assert!(p.page().is_visible(&p.cart_modal).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_to_cart_times_out_without_layer() {
        let p = product(
            MockDriver::new()
                .with_element("#add_to_cart button, .pb-center-column .btn-primary"),
        );
        assert!(matches!(
            p.add_to_cart().await.unwrap_err(),
            StoreError::Timeout { ms: 5000 }
        ));
    }

    #[tokio::test]
    async fn test_cart_modal_info() {
        let p = product(
            MockDriver::new()
                .with_element("#layer_cart, .modal-cart")
                .with_text("#layer_cart_product_title, .modal-cart .product-name", "Blouse")
                .with_text("#layer_cart_product_price, .modal-cart .product-price", " $27.00 ")
                .with_text("#layer_cart_product_quantity, .modal-cart .product-quantity", "2"),
        );
        let info = p.cart_modal_info().await.unwrap().unwrap();
        assert_eq!(info.product_name, "Blouse");
        assert_eq!(info.price, "$27.00");
        assert_eq!(info.quantity, "2");
    }

    #[tokio::test]
    async fn test_available_sizes_skip_placeholder() {
        let p = product(MockDriver::new().with_elements(
            "#group_1 >> option",
            vec![
                MockElement::text("--"),
                MockElement::text(" S "),
                MockElement::text("M"),
                MockElement::text(""),
            ],
        ));
        assert_eq!(p.available_sizes().await.unwrap(), vec!["S", "M"]);
    }

    #[tokio::test]
    async fn test_quantity_round_trip() {
        let p = product(MockDriver::new().with_element("#quantity_wanted"));
        p.set_quantity(3).await.unwrap();
        assert_eq!(p.current_quantity().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_out_of_stock() {
        let p = product(MockDriver::new().with_text(
            "#availability_statut, .availability span",
            "This product is no longer in stock / Out of stock",
        ));
        assert!(p.is_out_of_stock().await.unwrap());
    }

    #[tokio::test]
    async fn test_related_products() {
        let tiles = "#featured-products_block_center .product-container";
        let p = product(
            MockDriver::new()
                .with_elements(tiles, vec![MockElement::default()])
                .with_text(&format!("{tiles} >> nth=0 >> .product-name"), " Blouse ")
                .with_text(&format!("{tiles} >> nth=0 >> .price"), "$27.00"),
        );
        let related = p.related_products().await.unwrap();
        assert_eq!(
            related,
            vec![RelatedProduct {
                name: "Blouse".to_string(),
                price: "$27.00".to_string()
            }]
        );
    }
}
