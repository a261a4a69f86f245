//! Order funnel entry: leaving the summary step and identifying as a guest.

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::page_object::{Page, PageObject};
use crate::result::StoreResult;

/// Checkout steps after the cart summary
#[derive(Debug, Clone)]
pub struct CheckoutPage<D: PageDriver> {
    page: Page<D>,
    /// "Proceed to checkout" on the summary step
    pub proceed_to_checkout_summary_button: Locator,
    /// Guest / new-account e-mail
    pub email_input: Locator,
    /// Create-account submit
    pub create_account_button: Locator,
}

impl<D: PageDriver> PageObject for CheckoutPage<D> {
    fn url_pattern(&self) -> &str {
        "/index.php?controller=order&step=1"
    }

    fn page_name(&self) -> &str {
        "CheckoutPage"
    }
}

impl<D: PageDriver> CheckoutPage<D> {
    /// Bind the page object to a driver handle
    #[must_use]
    pub fn new(page: Page<D>) -> Self {
        Self {
            page,
            proceed_to_checkout_summary_button: Locator::new(".cart_navigation .button").first(),
            email_input: Locator::new("#email_create"),
            create_account_button: Locator::new("#SubmitCreate"),
        }
    }

    /// Driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        &self.page
    }

    /// Leave the summary step
    pub async fn proceed_from_summary(&self) -> StoreResult<()> {
        self.page
            .click(&self.proceed_to_checkout_summary_button)
            .await
    }

    /// Identify with an e-mail address
    pub async fn enter_guest_email(&self, email: &str) -> StoreResult<()> {
        self.page.fill(&self.email_input, email).await?;
        self.page.click(&self.create_account_button).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockEffect};

    #[tokio::test]
    async fn test_guest_flow() {
        let driver = MockDriver::new()
            .with_element(".cart_navigation .button")
            .with_element("#email_create")
            .with_element("#SubmitCreate")
            .on_click(
                ".cart_navigation .button >> nth=0",
                MockEffect::Navigate("http://shop.test/index.php?controller=order&step=1".to_string()),
            );
        let page = CheckoutPage::new(Page::new(driver, "http://shop.test"));
        page.proceed_from_summary().await.unwrap();
        page.enter_guest_email("guest@example.com").await.unwrap();

        let driver = page.page().driver();
        assert!(page.page().url().await.unwrap().contains("step=1"));
        assert_eq!(
            driver.value_of("#email_create").as_deref(),
            Some("guest@example.com")
        );
        assert!(driver.was_called("click:#SubmitCreate"));
    }
}
