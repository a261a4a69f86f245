//! Page-type inference for recorded locators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page a locator most likely belongs to
///
/// Variant order is the inference precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PageType {
    HomePage,
    CartPage,
    LoginPage,
    ProductPage,
    ContactPage,
    CheckoutPage,
    CategoryPage,
    GeneralPage,
}

impl PageType {
    /// Every page type in precedence order
    pub const ALL: [Self; 8] = [
        Self::HomePage,
        Self::CartPage,
        Self::LoginPage,
        Self::ProductPage,
        Self::ContactPage,
        Self::CheckoutPage,
        Self::CategoryPage,
        Self::GeneralPage,
    ];

    /// Infer from a selector and the source around it
    ///
    /// ```
    /// use storeprobe::analysis::PageType;
    ///
    /// assert_eq!(PageType::infer("#email", "fill('secret') // password"), PageType::LoginPage);
    /// assert_eq!(PageType::infer(".cart_quantity_input", ""), PageType::CartPage);
    /// ```
    #[must_use]
    pub fn infer(selector: &str, context: &str) -> Self {
        let combined = format!("{selector} {context}").to_lowercase();
        let has = |needle: &str| combined.contains(needle);

        if has("search") {
            Self::HomePage
        } else if has("cart") || has("quantity") {
            Self::CartPage
        } else if has("login") || has("signin") || (has("email") && has("password")) {
            Self::LoginPage
        } else if has("product") || has("add to cart") {
            Self::ProductPage
        } else if has("contact") || has("message") {
            Self::ContactPage
        } else if has("checkout") || has("order") {
            Self::CheckoutPage
        } else if has("category") || has("filter") {
            Self::CategoryPage
        } else {
            Self::GeneralPage
        }
    }

    /// Type name as used in reports and generated class names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HomePage => "HomePage",
            Self::CartPage => "CartPage",
            Self::LoginPage => "LoginPage",
            Self::ProductPage => "ProductPage",
            Self::ContactPage => "ContactPage",
            Self::CheckoutPage => "CheckoutPage",
            Self::CategoryPage => "CategoryPage",
            Self::GeneralPage => "GeneralPage",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
