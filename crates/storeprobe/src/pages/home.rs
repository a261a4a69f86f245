//! Storefront landing page: search, header navigation, newsletter.

use crate::driver::{PageDriver, WaitState};
use crate::locator::Locator;
use crate::page_object::{Page, PageObject};
use crate::result::{StoreError, StoreResult};

/// Top-menu categories reachable from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Women
    Women,
    /// Women > Dresses
    Dresses,
    /// Women > Tops > T-shirts
    TShirts,
}

impl std::str::FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "women" => Ok(Self::Women),
            "dresses" => Ok(Self::Dresses),
            "t-shirts" | "tshirts" => Ok(Self::TShirts),
            _ => Err(StoreError::not_found("Category", s)),
        }
    }
}

/// Selectors probed, in order, for a visible result counter
const RESULT_COUNT_SELECTORS: [&str; 4] = [
    ".product-count",
    ".heading-counter",
    ".toolbar-amount",
    ".nb-products",
];

/// Landing page
#[derive(Debug, Clone)]
pub struct HomePage<D: PageDriver> {
    page: Page<D>,
    /// Search box
    pub search_query_input: Locator,
    /// Search submit button
    pub search_query_submit: Locator,
    /// Auto-complete dropdown
    pub search_auto_complete: Locator,
    /// "No results" warning
    pub search_no_results: Locator,
    /// Header sign-in link
    pub sign_in_link: Locator,
    /// Header contact link
    pub contact_us_link: Locator,
    /// Shop logo
    pub logo: Locator,
    /// "Add to cart" buttons on product tiles
    pub add_to_cart_button: Locator,
    /// "Proceed to checkout" in the cart layer
    pub proceed_to_checkout_button: Locator,
    /// Header cart block
    pub cart_dropdown: Locator,
    /// Newsletter e-mail field
    pub newsletter_input: Locator,
    /// Newsletter submit
    pub newsletter_submit: Locator,
    /// Success alert
    pub newsletter_success: Locator,
    /// Error alert
    pub newsletter_error: Locator,
    /// Women menu entry
    pub women_category: Locator,
    /// Dresses menu entry
    pub dresses_category: Locator,
    /// T-shirts menu entry
    pub tshirts_category: Locator,
}

impl<D: PageDriver> PageObject for HomePage<D> {
    fn url_pattern(&self) -> &str {
        "/"
    }

    fn page_name(&self) -> &str {
        "HomePage"
    }
}

impl<D: PageDriver> HomePage<D> {
    /// Bind the page object to a driver handle
    #[must_use]
    pub fn new(page: Page<D>) -> Self {
        Self {
            page,
            search_query_input: Locator::new("#search_query_top"),
            search_query_submit: Locator::new(r#"[name="submit_search"]"#),
            search_auto_complete: Locator::new(".ac_results"),
            search_no_results: Locator::new(".alert-warning"),
            sign_in_link: Locator::new(".login"),
            contact_us_link: Locator::new("#contact-link a"),
            logo: Locator::new("#header_logo"),
            add_to_cart_button: Locator::new(".ajax_add_to_cart_button"),
            proceed_to_checkout_button: Locator::new(r#"[title="Proceed to checkout"]"#),
            cart_dropdown: Locator::new(".shopping_cart"),
            newsletter_input: Locator::new("#newsletter-input"),
            newsletter_submit: Locator::new(r#"[name="submitNewsletter"]"#),
            newsletter_success: Locator::new(".alert-success"),
            newsletter_error: Locator::new(".alert-danger"),
            women_category: Locator::new(r#"a[title="Women"]"#).first(),
            dresses_category: Locator::new(r#"a[title="Dresses"]"#).first(),
            tshirts_category: Locator::new(r#"a[title="T-shirts"]"#).first(),
        }
    }

    /// Driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        &self.page
    }

    /// Open the landing page
    pub async fn goto(&self) -> StoreResult<()> {
        self.page.goto(self.url_pattern()).await?;
        self.page.wait_for_network_idle().await
    }

    /// Search via the header box
    pub async fn search_for_product(&self, product_name: &str) -> StoreResult<()> {
        self.page
            .fill(&self.search_query_input, product_name)
            .await?;
        self.page.click(&self.search_query_submit).await?;
        self.page.wait_for_network_idle().await
    }

    /// Wait up to 5s for the auto-complete dropdown
    pub async fn wait_for_search_auto_complete(&self) -> StoreResult<()> {
        self.page
            .wait_for(&self.search_auto_complete, WaitState::Visible, 5000)
            .await
    }

    /// Click an auto-complete suggestion by its text
    pub async fn select_auto_complete_option(&self, option_text: &str) -> StoreResult<()> {
        let option = self
            .search_auto_complete
            .locator(&format!("text={option_text}"));
        self.page.click(&option).await
    }

    /// Add the first listed product and let the cart animation settle
    pub async fn add_first_product_to_cart(&self) -> StoreResult<()> {
        self.page.click(&self.add_to_cart_button.first()).await?;
        self.page.pause(2000).await
    }

    /// Continue from the cart layer
    pub async fn proceed_to_checkout(&self) -> StoreResult<()> {
        self.page.click(&self.proceed_to_checkout_button).await
    }

    /// Open the sign-in page
    pub async fn click_sign_in(&self) -> StoreResult<()> {
        self.page.click(&self.sign_in_link).await
    }

    /// Open the contact page
    pub async fn click_contact_us(&self) -> StoreResult<()> {
        self.page.click(&self.contact_us_link).await
    }

    /// Submit the newsletter form
    pub async fn subscribe_to_newsletter(&self, email: &str) -> StoreResult<()> {
        self.page.fill(&self.newsletter_input, email).await?;
        self.page.click(&self.newsletter_submit).await
    }

    /// Navigate through the top menu. Sub-categories open the Women menu
    /// first.
    pub async fn navigate_to_category(&self, category: Category) -> StoreResult<()> {
        self.page.hover(&self.women_category).await?;
        let target = match category {
            Category::Women => &self.women_category,
            Category::Dresses => &self.dresses_category,
            Category::TShirts => &self.tshirts_category,
        };
        self.page.click(target).await?;
        self.page.wait_for_network_idle().await
    }

    /// Text of the first visible result counter, or the number of product
    /// tiles when no counter is shown. Never fails; errors read as `"0"`.
    pub async fn search_results_count(&self) -> String {
        self.try_search_results_count()
            .await
            .unwrap_or_else(|_| "0".to_string())
    }

    async fn try_search_results_count(&self) -> StoreResult<String> {
        for selector in RESULT_COUNT_SELECTORS {
            let counter = Locator::new(selector);
            if self.page.is_visible_within(&counter, 2000).await? {
                let text = self.page.text(&counter).await?.unwrap_or_default();
                return Ok(if text.is_empty() { "0".to_string() } else { text });
            }
        }
        let tiles = Locator::new(".product-container, .product_list li");
        Ok(self.page.count(&tiles).await?.to_string())
    }

    /// Whether the "no results" warning is shown
    pub async fn is_no_results_displayed(&self) -> StoreResult<bool> {
        self.page.is_visible(&self.search_no_results).await
    }
}
