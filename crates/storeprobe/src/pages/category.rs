//! Category listing: product grid, layered filters, sorting, pagination.

use crate::driver::{PageDriver, WaitState};
use crate::locator::Locator;
use crate::page_object::{first_int, parse_price, Page, PageObject};
use crate::result::{StoreError, StoreResult};
use std::str::FromStr;

/// Layered-navigation size filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// S
    S,
    /// M
    M,
    /// L
    L,
    /// XL
    Xl,
}

impl Size {
    const fn attribute_id(self) -> u32 {
        match self {
            Self::S => 1,
            Self::M => 2,
            Self::L => 3,
            Self::Xl => 4,
        }
    }

    /// Label shown next to the checkbox
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
        }
    }
}

impl FromStr for Size {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Self::S),
            "M" => Ok(Self::M),
            "L" => Ok(Self::L),
            "XL" => Ok(Self::Xl),
            _ => Err(StoreError::not_found("Size", s)),
        }
    }
}

/// Layered-navigation colour filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Beige
    Beige,
    /// White
    White,
    /// Black
    Black,
    /// Orange
    Orange,
    /// Blue
    Blue,
    /// Green
    Green,
    /// Yellow
    Yellow,
    /// Pink
    Pink,
}

impl Color {
    const fn attribute_id(self) -> u32 {
        match self {
            Self::Beige => 7,
            Self::White => 8,
            Self::Black => 11,
            Self::Orange => 13,
            Self::Blue => 14,
            Self::Green => 15,
            Self::Yellow => 16,
            Self::Pink => 24,
        }
    }
}

impl FromStr for Color {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beige" => Ok(Self::Beige),
            "White" => Ok(Self::White),
            "Black" => Ok(Self::Black),
            "Orange" => Ok(Self::Orange),
            "Blue" => Ok(Self::Blue),
            "Green" => Ok(Self::Green),
            "Yellow" => Ok(Self::Yellow),
            "Pink" => Ok(Self::Pink),
            _ => Err(StoreError::not_found("Color", s)),
        }
    }
}

/// Sort keys and the labels the sort dropdown shows for them
pub const SORT_OPTIONS: [(&str, &str); 8] = [
    ("position", "Position"),
    ("name:asc", "Product Name: A to Z"),
    ("name:desc", "Product Name: Z to A"),
    ("price:asc", "Price: Lowest first"),
    ("price:desc", "Price: Highest first"),
    ("quantity:desc", "In stock"),
    ("reference:asc", "Reference: Lowest first"),
    ("reference:desc", "Reference: Highest first"),
];

/// Dropdown label for a sort key (`"price:asc"`)
#[must_use]
pub fn sort_label(key: &str) -> Option<&'static str> {
    SORT_OPTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

/// Category listing page
#[derive(Debug, Clone)]
pub struct CategoryPage<D: PageDriver> {
    page: Page<D>,
    /// Product list wrapper
    pub product_container: Locator,
    /// Product tiles
    pub product_items: Locator,
    /// Product name headings
    pub product_names: Locator,
    /// Product prices
    pub product_prices: Locator,
    /// Product images
    pub product_images: Locator,
    /// Size checkboxes
    pub size_filters: Locator,
    /// Colour checkboxes
    pub color_filters: Locator,
    /// Category checkboxes
    pub category_filters: Locator,
    /// Price range slider
    pub price_slider: Locator,
    /// Sort dropdown
    pub sort_by_select: Locator,
    /// Grid view toggle
    pub grid_view_button: Locator,
    /// List view toggle
    pub list_view_button: Locator,
    /// Next page link
    pub pagination_next: Locator,
    /// Previous page link
    pub pagination_previous: Locator,
    /// Numbered page links
    pub pagination_numbers: Locator,
    /// Product counter
    pub product_count: Locator,
    /// Breadcrumb trail
    pub breadcrumb: Locator,
    /// Category heading
    pub category_title: Locator,
    /// "No results" warning
    pub no_results_message: Locator,
    /// Active layered filters
    pub active_filters: Locator,
}

impl<D: PageDriver> PageObject for CategoryPage<D> {
    fn url_pattern(&self) -> &str {
        "/index.php?id_category=3&controller=category"
    }

    fn page_name(&self) -> &str {
        "CategoryPage"
    }
}

impl<D: PageDriver> CategoryPage<D> {
    /// Bind the page object to a driver handle
    #[must_use]
    pub fn new(page: Page<D>) -> Self {
        Self {
            page,
            product_container: Locator::new(".product_list"),
            product_items: Locator::new(".product-container"),
            product_names: Locator::new(".product-name"),
            product_prices: Locator::new(".price"),
            product_images: Locator::new(".product-image-container img"),
            size_filters: Locator::new("#layered_id_attribute_group_1 input"),
            color_filters: Locator::new("#layered_id_attribute_group_3 input"),
            category_filters: Locator::new("#layered_category input"),
            price_slider: Locator::new("#layered_price_range"),
            sort_by_select: Locator::new("#selectProductSort"),
            grid_view_button: Locator::new("#grid"),
            list_view_button: Locator::new("#list"),
            pagination_next: Locator::new(".pagination .pagination_next"),
            pagination_previous: Locator::new(".pagination .pagination_previous"),
            pagination_numbers: Locator::new(
                ".pagination li:not(.pagination_next):not(.pagination_previous) a",
            ),
            product_count: Locator::new(".product-count"),
            breadcrumb: Locator::new(".breadcrumb"),
            category_title: Locator::new(".category-name, .page-heading"),
            no_results_message: Locator::new(".alert-warning"),
            active_filters: Locator::new(".layered_filter .selected"),
        }
    }

    /// Driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        &self.page
    }

    /// Open the default (Women) category
    pub async fn goto(&self) -> StoreResult<()> {
        self.page.goto(self.url_pattern()).await?;
        self.wait_for_products_to_load().await
    }

    /// Wait up to 10s for the grid, then for network idle
    pub async fn wait_for_products_to_load(&self) -> StoreResult<()> {
        self.page
            .wait_for(&self.product_container, WaitState::Visible, 10_000)
            .await?;
        self.page.wait_for_network_idle().await
    }

    /// First integer in the product counter, 0 when absent
    pub async fn product_count(&self) -> StoreResult<u64> {
        let text = self.page.text(&self.product_count.first()).await?;
        Ok(text.as_deref().and_then(first_int).unwrap_or(0))
    }

    /// Names of every listed product
    pub async fn all_product_names(&self) -> StoreResult<Vec<String>> {
        self.wait_for_products_to_load().await?;
        self.page.texts(&self.product_names).await
    }

    /// Prices of every listed product, skipping unparseable entries
    pub async fn all_product_prices(&self) -> StoreResult<Vec<f64>> {
        self.wait_for_products_to_load().await?;
        Ok(self
            .page
            .texts(&self.product_prices)
            .await?
            .iter()
            .filter_map(|t| parse_price(t))
            .collect())
    }

    /// Tick a size filter
    pub async fn filter_by_size(&self, size: Size) -> StoreResult<()> {
        let label = Locator::new(&format!(
            r#"label[for="layered_id_attribute_group_1_{}"]"#,
            size.attribute_id()
        ));
        self.page.click(&label).await?;
        self.wait_for_products_to_load().await
    }

    /// Tick a colour filter
    pub async fn filter_by_color(&self, color: Color) -> StoreResult<()> {
        let label = Locator::new(&format!(
            r#"label[for="layered_id_attribute_group_3_{}"]"#,
            color.attribute_id()
        ));
        self.page.click(&label).await?;
        self.wait_for_products_to_load().await
    }

    /// Choose a sort order by its dropdown label
    pub async fn sort_by(&self, label: &str) -> StoreResult<()> {
        self.page.select_label(&self.sort_by_select, label).await?;
        self.wait_for_products_to_load().await
    }

    /// Grid layout
    pub async fn switch_to_grid_view(&self) -> StoreResult<()> {
        self.page.click(&self.grid_view_button).await?;
        self.page.pause(1000).await
    }

    /// List layout
    pub async fn switch_to_list_view(&self) -> StoreResult<()> {
        self.page.click(&self.list_view_button).await?;
        self.page.pause(1000).await
    }

    /// Open the product at `index`.
    ///
    /// Tries the name link, then the image link (both force-clicked to get
    /// past hover overlays), then navigates to the product's `href`.
    pub async fn click_product(&self, index: usize) -> StoreResult<()> {
        self.wait_for_products_to_load().await?;

        for selector in [".product-name a", ".product-image-container a"] {
            let links = Locator::new(selector);
            if self.page.count(&links).await? > index {
                self.page.force_click(&links.nth(index)).await?;
                return self.page.wait_for_network_idle().await;
            }
        }

        let links = Locator::new(r#".product-container a[href*="id_product"]"#);
        if self.page.count(&links).await? > index {
            if let Some(href) = self.page.attribute(&links.nth(index), "href").await? {
                self.page.goto(&href).await?;
                return self.page.wait_for_network_idle().await;
            }
        }

        tracing::warn!(index, "no product link found");
        Err(StoreError::not_found("Product at index", index.to_string()))
    }

    /// Open the first product whose name contains `name`
    pub async fn click_product_by_name(&self, name: &str) -> StoreResult<()> {
        let link = Locator::new(&format!(".product-name:has-text({name:?})")).first();
        self.page.click(&link).await?;
        self.page.wait_for_network_idle().await
    }

    async fn click_tile_button(&self, selector: &str, index: usize, pause_ms: u64) -> StoreResult<()> {
        let buttons = Locator::new(selector);
        if self.page.count(&buttons).await? > index {
            self.page.click(&buttons.nth(index)).await?;
            self.page.pause(pause_ms).await?;
        }
        Ok(())
    }

    /// Add the product at `index` to the cart (no-op when absent)
    pub async fn add_to_cart(&self, index: usize) -> StoreResult<()> {
        self.click_tile_button(".ajax_add_to_cart_button", index, 2000)
            .await
    }

    /// Add the product at `index` to the wishlist (no-op when absent)
    pub async fn add_to_wishlist(&self, index: usize) -> StoreResult<()> {
        self.click_tile_button(".addToWishlist", index, 1000).await
    }

    /// Add the product at `index` to the comparison (no-op when absent)
    pub async fn add_to_compare(&self, index: usize) -> StoreResult<()> {
        self.click_tile_button(".add_to_compare", index, 1000).await
    }

    /// Follow the "next" link if shown; returns whether it was
    pub async fn go_to_next_page(&self) -> StoreResult<bool> {
        self.follow_if_visible(&self.pagination_next).await
    }

    /// Follow the "previous" link if shown; returns whether it was
    pub async fn go_to_previous_page(&self) -> StoreResult<bool> {
        self.follow_if_visible(&self.pagination_previous).await
    }

    async fn follow_if_visible(&self, link: &Locator) -> StoreResult<bool> {
        if !self.page.is_visible(link).await? {
            return Ok(false);
        }
        self.page.click(link).await?;
        self.wait_for_products_to_load().await?;
        Ok(true)
    }

    /// Heading text
    pub async fn current_category_name(&self) -> StoreResult<Option<String>> {
        self.page.text(&self.category_title.first()).await
    }

    /// Drop filters by reloading the listing
    pub async fn clear_all_filters(&self) -> StoreResult<()> {
        self.page.reload().await?;
        self.wait_for_products_to_load().await
    }

    /// Whether an active filter mentions `value`
    pub async fn is_filter_applied(&self, value: &str) -> StoreResult<bool> {
        Ok(self
            .applied_filters()
            .await?
            .iter()
            .any(|f| f.contains(value)))
    }

    /// Text of every active filter
    pub async fn applied_filters(&self) -> StoreResult<Vec<String>> {
        self.page.texts(&self.active_filters).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    fn listing(driver: MockDriver) -> CategoryPage<MockDriver> {
        CategoryPage::new(Page::new(driver.with_element(".product_list"), "http://shop.test"))
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_size_and_color_parse() {
            assert_eq!("XL".parse::<Size>().unwrap(), Size::Xl);
            assert_eq!("Pink".parse::<Color>().unwrap(), Color::Pink);
            assert!("XXL".parse::<Size>().is_err());
            assert_eq!(
                "Purple".parse::<Color>().unwrap_err().to_string(),
                "Color Purple not found"
            );
        }

        #[test]
        fn test_sort_label() {
            assert_eq!(sort_label("price:asc"), Some("Price: Lowest first"));
            assert_eq!(sort_label("name:desc"), Some("Product Name: Z to A"));
            assert_eq!(sort_label("random"), None);
        }

        #[tokio::test]
        async fn test_filter_by_size_clicks_label() {
            let cat = listing(
                MockDriver::new().with_element(r#"label[for="layered_id_attribute_group_1_2"]"#),
            );
            cat.filter_by_size(Size::M).await.unwrap();
            assert!(cat
                .page()
                .driver()
                .was_called(r#"click:label[for="layered_id_attribute_group_1_2"]"#));
        }

        #[tokio::test]
        async fn test_is_filter_applied() {
            let cat = listing(MockDriver::new().with_elements(
                ".layered_filter .selected",
                vec![MockElement::text("Size: M")],
            ));
            assert!(cat.is_filter_applied("M").await.unwrap());
            assert!(!cat.is_filter_applied("XL").await.unwrap());
        }
    }

    mod listing_tests {
        use super::*;

        #[tokio::test]
        async fn test_product_count_parses_digits() {
            let cat = listing(MockDriver::new().with_text(".product-count", "Showing 1 - 7 of 7 items"));
            assert_eq!(cat.product_count().await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_prices_parse() {
            let cat = listing(MockDriver::new().with_elements(
                ".price",
                vec![MockElement::text("$16.51"), MockElement::text("$1,028.00")],
            ));
            assert_eq!(cat.all_product_prices().await.unwrap(), vec![16.51, 1028.0]);
        }

        #[tokio::test]
        async fn test_click_product_falls_back_to_image() {
            let cat = listing(MockDriver::new().with_elements(
                ".product-image-container a",
                vec![MockElement::default(), MockElement::default()],
            ));
            cat.click_product(1).await.unwrap();
            assert!(cat
                .page()
                .driver()
                .was_called("click:.product-image-container a >> nth=1"));
        }

        #[tokio::test]
        async fn test_click_product_falls_back_to_href() {
            let cat = listing(MockDriver::new().with_elements(
                r#".product-container a[href*="id_product"]"#,
                vec![MockElement::default().with_attr("href", "http://shop.test/?id_product=5")],
            ));
            cat.click_product(0).await.unwrap();
            assert_eq!(
                cat.page().url().await.unwrap(),
                "http://shop.test/?id_product=5"
            );
        }

        #[tokio::test]
        async fn test_click_product_missing() {
            let cat = listing(MockDriver::new());
            assert!(cat.click_product(0).await.unwrap_err().is_missing());
        }

        #[tokio::test]
        async fn test_next_page_hidden() {
            let cat = listing(MockDriver::new());
            assert!(!cat.go_to_next_page().await.unwrap());
        }
    }
}
