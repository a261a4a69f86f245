//! Page objects for the storefront.
//!
//! Each page object owns a [`crate::Page`] handle and one public
//! [`crate::Locator`] per UI element, plus async actions that do one or two
//! driver calls followed by a wait.

mod cart;
mod category;
mod checkout;
mod contact;
mod home;
mod login;
mod product;

pub use cart::{subtotal_matches, CartLine, CartPage, CartSummary, SUBTOTAL_TOLERANCE};
pub use category::{sort_label, CategoryPage, Color, Size, SORT_OPTIONS};
pub use checkout::CheckoutPage;
pub use contact::{ContactForm, ContactInformation, ContactUsPage, RequiredFields, SocialPlatform};
pub use home::{Category, HomePage};
pub use login::LoginPage;
pub use product::{CartModalInfo, ProductPage, RelatedProduct};

use crate::driver::PageDriver;
use crate::page_object::Page;

/// Every page object bound to one shared driver
#[derive(Debug, Clone)]
pub struct Storefront<D: PageDriver> {
    /// Landing page
    pub home: HomePage<D>,
    /// Category and search listings
    pub category: CategoryPage<D>,
    /// Product detail
    pub product: ProductPage<D>,
    /// Cart summary
    pub cart: CartPage<D>,
    /// Sign-in and registration
    pub login: LoginPage<D>,
    /// Checkout steps
    pub checkout: CheckoutPage<D>,
    /// Contact form
    pub contact: ContactUsPage<D>,
}

impl<D: PageDriver> Storefront<D> {
    /// Build every page object over `page`
    #[must_use]
    pub fn new(page: &Page<D>) -> Self {
        Self {
            home: HomePage::new(page.clone()),
            category: CategoryPage::new(page.clone()),
            product: ProductPage::new(page.clone()),
            cart: CartPage::new(page.clone()),
            login: LoginPage::new(page.clone()),
            checkout: CheckoutPage::new(page.clone()),
            contact: ContactUsPage::new(page.clone()),
        }
    }

    /// Shared driver handle
    #[must_use]
    pub const fn page(&self) -> &Page<D> {
        self.home.page()
    }
}
