//! Shopping cart summary: line items, quantities, totals, vouchers,
//! shipping estimate, gift wrapping, cross-sell.

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::page_object::{price_or_zero, Page, PageObject};
use crate::pages::product::RelatedProduct;
use crate::result::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Largest difference tolerated between computed and displayed subtotal
pub const SUBTOTAL_TOLERANCE: f64 = 0.01;

/// Upper bound on removals performed by [`CartPage::clear_cart`]
const MAX_CLEAR_ROUNDS: usize = 50;

/// One cart row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Quantity
    pub quantity: u32,
    /// Row total as displayed
    pub total: f64,
}

/// Cart totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Products subtotal
    pub subtotal: f64,
    /// Shipping
    pub shipping: f64,
    /// Tax
    pub tax: f64,
    /// Grand total
    pub total: f64,
    /// Number of rows
    pub item_count: usize,
    /// Whether the empty-cart warning is shown
    pub is_empty: bool,
}

/// Whether `Σ price × quantity` over `lines` matches `displayed` within
/// [`SUBTOTAL_TOLERANCE`]. An empty cart always matches.
#[must_use]
pub fn subtotal_matches(lines: &[CartLine], displayed: f64) -> bool {
    if lines.is_empty() {
        return true;
    }
    let expected: f64 = lines
        .iter()
        .map(|l| l.price * f64::from(l.quantity))
        .sum();
    (expected - displayed).abs() < SUBTOTAL_TOLERANCE
}

/// Cart summary page
#[derive(Debug, Clone)]
pub struct CartPage<D: PageDriver> {
    page: Page<D>,
    /// Cart table
    pub cart_table: Locator,
    /// Cart rows
    pub cart_items: Locator,
    /// Product name links
    pub product_names: Locator,
    /// Unit prices
    pub product_prices: Locator,
    /// Quantity fields
    pub quantity_inputs: Locator,
    /// Quantity "+" buttons
    pub quantity_increase_buttons: Locator,
    /// Quantity "-" buttons
    pub quantity_decrease_buttons: Locator,
    /// Per-row update buttons (older themes)
    pub quantity_update_buttons: Locator,
    /// Row delete links
    pub delete_buttons: Locator,
    /// Subtotal
    pub subtotal_amount: Locator,
    /// Shipping
    pub shipping_amount: Locator,
    /// Tax
    pub tax_amount: Locator,
    /// Total
    pub total_amount: Locator,
    /// Voucher code field
    pub voucher_input: Locator,
    /// Voucher submit
    pub add_voucher_button: Locator,
    /// Voucher error alert
    pub voucher_error: Locator,
    /// Voucher success alert
    pub voucher_success: Locator,
    /// Applied voucher rows
    pub applied_vouchers: Locator,
    /// Voucher remove links
    pub remove_voucher_buttons: Locator,
    /// "Proceed to checkout"
    pub proceed_to_checkout_button: Locator,
    /// "Continue shopping"
    pub continue_shopping_button: Locator,
    /// Empty-cart warning
    pub empty_cart_message: Locator,
    /// Heading
    pub cart_title: Locator,
    /// Country dropdown
    pub country_select: Locator,
    /// State dropdown
    pub state_select: Locator,
    /// Postcode field
    pub zip_code_input: Locator,
    /// Carrier update button
    pub update_carrier_button: Locator,
    /// Gift wrapping checkbox
    pub gift_wrapping_checkbox: Locator,
    /// Gift message
    pub gift_message_textarea: Locator,
    /// Cross-sell tiles
    pub cross_sell_products: Locator,
    /// Cross-sell add buttons
    pub cross_sell_add_to_cart_buttons: Locator,
}

impl<D: PageDriver> PageObject for CartPage<D> {
    fn url_pattern(&self) -> &str {
        "/index.php?controller=order"
    }

    fn page_name(&self) -> &str {
        "CartPage"
    }
}

impl<D: PageDriver> CartPage<D> {
    /// Bind the page object to a driver handle
    #[must_use]
    pub fn new(page: Page<D>) -> Self {
        Self {
            page,
            cart_table: Locator::new("#cart_summary"),
            cart_items: Locator::new(".cart_item"),
            product_names: Locator::new(".cart_description h5 a"),
            product_prices: Locator::new(".cart_unit .price"),
            quantity_inputs: Locator::new(r#"input[name*="quantity"]"#),
            quantity_increase_buttons: Locator::new(".cart_quantity_up"),
            quantity_decrease_buttons: Locator::new(".cart_quantity_down"),
            quantity_update_buttons: Locator::new(".cart_quantity_button .btn"),
            delete_buttons: Locator::new(".cart_quantity_delete"),
            subtotal_amount: Locator::new("#total_product"),
            shipping_amount: Locator::new("#total_shipping"),
            tax_amount: Locator::new("#total_tax"),
            total_amount: Locator::new("#total_price"),
            voucher_input: Locator::new("#discount_name"),
            add_voucher_button: Locator::new(r#"[name="submitDiscount"]"#),
            voucher_error: Locator::new(".alert-danger"),
            voucher_success: Locator::new(".alert-success"),
            applied_vouchers: Locator::new(".cart_discount"),
            remove_voucher_buttons: Locator::new(".price_discount_delete"),
            proceed_to_checkout_button: Locator::new(
                r#".cart_navigation .button-medium:has-text("Proceed")"#,
            ),
            continue_shopping_button: Locator::new(".cart_navigation .button-exclusive-medium"),
            empty_cart_message: Locator::new(".alert-warning"),
            cart_title: Locator::new("#cart_title, .page-heading"),
            country_select: Locator::new("#id_country"),
            state_select: Locator::new("#id_state"),
            zip_code_input: Locator::new("#postcode"),
            update_carrier_button: Locator::new(r#"[name="processCarrier"]"#),
            gift_wrapping_checkbox: Locator::new("#gift"),
            gift_message_textarea: Locator::new("#gift_message"),
            cross_sell_products: Locator::new("#crossselling .product-container"),
            cross_sell_add_to_cart_buttons: Locator::new("#crossselling .ajax_add_to_cart_button"),
        }
    }

    /// Driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        &self.page
    }

    /// Open the cart summary
    pub async fn goto(&self) -> StoreResult<()> {
        self.page.goto(self.url_pattern()).await?;
        self.wait_for_cart_to_load().await
    }

    /// Network idle plus a 1s settle for the AJAX cart
    pub async fn wait_for_cart_to_load(&self) -> StoreResult<()> {
        self.page.wait_for_network_idle().await?;
        self.page.pause(1000).await
    }

    /// Number of rows
    pub async fn item_count(&self) -> StoreResult<usize> {
        self.wait_for_cart_to_load().await?;
        self.page.count(&self.cart_items).await
    }

    /// Whether the empty-cart warning is shown
    pub async fn is_empty(&self) -> StoreResult<bool> {
        self.page.is_visible(&self.empty_cart_message).await
    }

    /// Names of every row
    pub async fn all_product_names(&self) -> StoreResult<Vec<String>> {
        if self.is_empty().await? {
            return Ok(Vec::new());
        }
        self.page.texts(&self.product_names).await
    }

    /// Unit prices of every row
    pub async fn all_product_prices(&self) -> StoreResult<Vec<f64>> {
        if self.is_empty().await? {
            return Ok(Vec::new());
        }
        Ok(self
            .page
            .texts(&self.product_prices)
            .await?
            .iter()
            .map(|t| price_or_zero(Some(t.as_str())))
            .collect())
    }

    /// Quantities of every row
    pub async fn all_product_quantities(&self) -> StoreResult<Vec<u32>> {
        if self.is_empty().await? {
            return Ok(Vec::new());
        }
        let total = self.page.count(&self.quantity_inputs).await?;
        let mut quantities = Vec::with_capacity(total);
        for i in 0..total {
            quantities.push(self.product_quantity(i).await?);
        }
        Ok(quantities)
    }

    /// Quantity of row `index`, 0 when absent
    pub async fn product_quantity(&self, index: usize) -> StoreResult<u32> {
        if self.page.count(&self.quantity_inputs).await? <= index {
            return Ok(0);
        }
        let value = self.page.value(&self.quantity_inputs.nth(index)).await?;
        Ok(value.trim().parse().unwrap_or(0))
    }

    /// Type a new quantity into row `index` and commit it with the row's
    /// update button, or Tab when the theme has none
    pub async fn update_product_quantity(&self, index: usize, quantity: u32) -> StoreResult<()> {
        if self.page.count(&self.quantity_inputs).await? <= index {
            return Ok(());
        }
        let input = self.quantity_inputs.nth(index);
        self.page.clear(&input).await?;
        self.page.fill(&input, &quantity.to_string()).await?;

        if self.page.count(&self.quantity_update_buttons).await? > index {
            self.page
                .click(&self.quantity_update_buttons.nth(index))
                .await?;
        } else {
            self.page.press(&input, "Tab").await?;
        }
        self.wait_for_cart_to_load().await
    }

    async fn click_row_button(&self, buttons: &Locator, index: usize) -> StoreResult<()> {
        if self.page.count(buttons).await? > index {
            self.page.click(&buttons.nth(index)).await?;
            self.wait_for_cart_to_load().await?;
        }
        Ok(())
    }

    /// "+" on row `index`
    pub async fn increase_product_quantity(&self, index: usize) -> StoreResult<()> {
        self.click_row_button(&self.quantity_increase_buttons, index)
            .await
    }

    /// "-" on row `index`
    pub async fn decrease_product_quantity(&self, index: usize) -> StoreResult<()> {
        self.click_row_button(&self.quantity_decrease_buttons, index)
            .await
    }

    /// Delete row `index`
    pub async fn remove_product(&self, index: usize) -> StoreResult<()> {
        self.click_row_button(&self.delete_buttons, index).await
    }

    /// Delete the first row whose name contains `name`
    pub async fn remove_product_by_name(&self, name: &str) -> StoreResult<()> {
        let names = self.all_product_names().await?;
        match names.iter().position(|n| n.contains(name)) {
            Some(index) => self.remove_product(index).await,
            None => Err(StoreError::not_found("Product", format!("{name} in cart"))),
        }
    }

    async fn amount(&self, locator: &Locator) -> StoreResult<f64> {
        Ok(price_or_zero(self.page.text(locator).await?.as_deref()))
    }

    /// Products subtotal (non-numeric text reads as 0)
    pub async fn subtotal(&self) -> StoreResult<f64> {
        self.amount(&self.subtotal_amount).await
    }

    /// Shipping (non-numeric text such as "Free shipping!" reads as 0)
    pub async fn shipping_cost(&self) -> StoreResult<f64> {
        self.amount(&self.shipping_amount).await
    }

    /// Tax
    pub async fn tax(&self) -> StoreResult<f64> {
        self.amount(&self.tax_amount).await
    }

    /// Grand total
    pub async fn total(&self) -> StoreResult<f64> {
        self.amount(&self.total_amount).await
    }

    /// Submit a voucher code
    pub async fn apply_voucher(&self, code: &str) -> StoreResult<()> {
        self.page.fill(&self.voucher_input, code).await?;
        self.page.click(&self.add_voucher_button).await?;
        self.wait_for_cart_to_load().await
    }

    async fn visible_text(&self, locator: &Locator) -> StoreResult<Option<String>> {
        if self.page.is_visible(locator).await? {
            self.page.text(locator).await
        } else {
            Ok(None)
        }
    }

    /// Voucher error, if shown
    pub async fn voucher_error_message(&self) -> StoreResult<Option<String>> {
        self.visible_text(&self.voucher_error).await
    }

    /// Voucher confirmation, if shown
    pub async fn voucher_success_message(&self) -> StoreResult<Option<String>> {
        self.visible_text(&self.voucher_success).await
    }

    /// Remove applied voucher `index`
    pub async fn remove_voucher(&self, index: usize) -> StoreResult<()> {
        self.click_row_button(&self.remove_voucher_buttons, index)
            .await
    }

    /// Continue to the checkout steps
    pub async fn proceed_to_checkout(&self) -> StoreResult<()> {
        self.page.click(&self.proceed_to_checkout_button).await?;
        self.page.wait_for_network_idle().await
    }

    /// Back to the catalogue
    pub async fn continue_shopping(&self) -> StoreResult<()> {
        self.page.click(&self.continue_shopping_button).await?;
        self.page.wait_for_network_idle().await
    }

    /// Fill the shipping estimate form; empty arguments are skipped
    pub async fn update_shipping_info(
        &self,
        country: &str,
        state: &str,
        zip_code: &str,
    ) -> StoreResult<()> {
        if !country.is_empty() {
            self.page.select_label(&self.country_select, country).await?;
            self.page.pause(1000).await?;
        }
        if !state.is_empty() && self.page.is_visible(&self.state_select).await? {
            self.page.select_label(&self.state_select, state).await?;
        }
        if !zip_code.is_empty() {
            self.page.fill(&self.zip_code_input, zip_code).await?;
        }
        self.page.click(&self.update_carrier_button).await?;
        self.wait_for_cart_to_load().await
    }

    /// Tick gift wrapping with an optional message
    pub async fn enable_gift_wrapping(&self, message: &str) -> StoreResult<()> {
        self.page.check(&self.gift_wrapping_checkbox).await?;
        if !message.is_empty() {
            self.page.fill(&self.gift_message_textarea, message).await?;
        }
        self.wait_for_cart_to_load().await
    }

    /// Untick gift wrapping
    pub async fn disable_gift_wrapping(&self) -> StoreResult<()> {
        self.page.uncheck(&self.gift_wrapping_checkbox).await?;
        self.wait_for_cart_to_load().await
    }

    /// Name and price of every cross-sell tile
    pub async fn cross_sell_products(&self) -> StoreResult<Vec<RelatedProduct>> {
        let total = self.page.count(&self.cross_sell_products).await?;
        let mut products = Vec::with_capacity(total);
        for i in 0..total {
            let tile = self.cross_sell_products.nth(i);
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

    /// Add cross-sell product `index`
    pub async fn add_cross_sell_product(&self, index: usize) -> StoreResult<()> {
        self.click_row_button(&self.cross_sell_add_to_cart_buttons, index)
            .await
    }

    /// Details of row `index`, `None` when absent
    pub async fn product_details(&self, index: usize) -> StoreResult<Option<CartLine>> {
        if self.page.count(&self.cart_items).await? <= index {
            return Ok(None);
        }
        let row = self.cart_items.nth(index);
        let name = self
            .page
            .text(&row.locator(".product-name"))
            .await?
            .unwrap_or_default();
        let price = price_or_zero(self.page.text(&row.locator(".price").first()).await?.as_deref());
        let quantity = self
            .page
            .value(&row.locator(".cart_quantity_input"))
            .await?
            .trim()
            .parse()
            .unwrap_or(0);
        let total = price_or_zero(
            self.page
                .text(&row.locator(".cart_total .price"))
                .await?
                .as_deref(),
        );
        Ok(Some(CartLine {
            name,
            price,
            quantity,
            total,
        }))
    }

    /// Delete rows until the empty-cart warning appears
    pub async fn clear_cart(&self) -> StoreResult<()> {
        for _ in 0..MAX_CLEAR_ROUNDS {
            if self.is_empty().await? {
                return Ok(());
            }
            if self.page.count(&self.delete_buttons).await? == 0 {
                break;
            }
            self.remove_product(0).await?;
            self.page.pause(1000).await?;
        }
        if self.is_empty().await? {
            Ok(())
        } else {
            Err(StoreError::AssertionFailed {
                message: "cart still has items after clearing".to_string(),
            })
        }
    }

    /// Check the displayed subtotal against the rows
    pub async fn validate_cart_calculations(&self) -> StoreResult<bool> {
        if self.is_empty().await? {
            return Ok(true);
        }
        let count = self.item_count().await?;
        let mut lines = Vec::with_capacity(count);
        for i in 0..count {
            if let Some(line) = self.product_details(i).await? {
                lines.push(line);
            }
        }
        let displayed = self.subtotal().await?;
        let valid = subtotal_matches(&lines, displayed);
        if !valid {
            tracing::warn!(displayed, rows = lines.len(), "cart subtotal mismatch");
        }
        Ok(valid)
    }

    /// Totals plus row count
    pub async fn summary(&self) -> StoreResult<CartSummary> {
        Ok(CartSummary {
            subtotal: self.subtotal().await?,
            shipping: self.shipping_cost().await?,
            tax: self.tax().await?,
            total: self.total().await?,
            item_count: self.item_count().await?,
            is_empty: self.is_empty().await?,
        })
    }
}
