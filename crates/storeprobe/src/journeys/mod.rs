//! End-to-end journeys over the storefront page objects.
//!
//! Each journey is an async function taking a [`Storefront`] and the shared
//! [`TestData`] and returning the [`ScenarioReport`] of its steps. Optional
//! storefront features (auto-complete, layered filters, gift wrapping...)
//! are probed inside a step; when they are missing the step logs and moves
//! on instead of failing.
//!
//! [`Journey`] is the registry the CLI runner selects from, and
//! [`JourneyRunner`] runs a selection, opening a fresh page per journey.

mod auth_account;
mod cart_other;
mod checkout;
mod codegen_validation;
mod product;
mod search_nav;

pub use auth_account::{
    existing_email, invalid_login, my_account, password_validation, registration_and_login,
    ACCOUNT_LINKS, WEAK_PASSWORDS,
};
pub use cart_other::{
    cart_persistence, contact_form, cross_sell, gift_wrapping, newsletter, remove_item,
    update_quantity, voucher, INVALID_NEWSLETTER_EMAILS, INVALID_VOUCHERS,
};
pub use checkout::{checkout_variants, guest_purchase};
pub use codegen_validation::{
    cart_locators, current_vs_codegen, search_locators, ComparisonOutcome, LocatorComparison,
    CODEGEN_COMPARISONS,
};
pub use product::{
    comparison_wishlist, filter_by_category_and_size, image_gallery, sort_by_price,
    update_product_details, ALTERNATIVE_SORTS,
};
pub use search_nav::{
    breadcrumb_navigation, category_navigation, search_auto_suggest, search_no_results,
    search_pagination,
};

use crate::assertion::SoftAssertions;
use crate::driver::PageDriver;
use crate::fixtures::TestData;
use crate::pages::Storefront;
use crate::result::{StoreError, StoreResult};
use crate::scenario::ScenarioReport;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;

/// Journey groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Suite {
    /// Search and category navigation
    SearchNavigation,
    /// Registration, login and account pages
    AuthAccount,
    /// Product listing and detail interaction
    ProductInteraction,
    /// Cart, contact form, newsletter and vouchers
    CartAndOther,
    /// Checkout flows
    Checkout,
    /// Checks of recorded codegen locators
    CodegenValidation,
}

impl Suite {
    /// Every suite, in run order
    pub const ALL: [Self; 6] = [
        Self::SearchNavigation,
        Self::AuthAccount,
        Self::ProductInteraction,
        Self::CartAndOther,
        Self::Checkout,
        Self::CodegenValidation,
    ];

    /// CLI name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchNavigation => "search-nav",
            Self::AuthAccount => "auth",
            Self::ProductInteraction => "product",
            Self::CartAndOther => "cart",
            Self::Checkout => "checkout",
            Self::CodegenValidation => "codegen",
        }
    }

    /// Journeys in this suite
    #[must_use]
    pub fn journeys(self) -> Vec<Journey> {
        Journey::ALL
            .iter()
            .copied()
            .filter(|j| j.suite() == self)
            .collect()
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Suite {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|suite| suite.as_str() == lower)
            .ok_or_else(|| StoreError::not_found("Suite", s))
    }
}

/// Every registered journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Journey {
    SearchNoResults,
    SearchAutoSuggest,
    CategoryNavigation,
    BreadcrumbNavigation,
    SearchPagination,
    RegistrationAndLogin,
    InvalidLogin,
    MyAccount,
    PasswordValidation,
    ExistingEmail,
    FilterByCategoryAndSize,
    SortByPrice,
    UpdateProductDetails,
    ImageGallery,
    ComparisonWishlist,
    UpdateQuantity,
    RemoveItem,
    ContactForm,
    Newsletter,
    Voucher,
    CrossSell,
    GiftWrapping,
    CartPersistence,
    GuestPurchase,
    CheckoutVariants,
    SearchLocators,
    CartLocators,
    CurrentVsCodegen,
}

impl Journey {
    /// Registry, grouped by suite
    pub const ALL: [Self; 28] = [
        Self::SearchNoResults,
        Self::SearchAutoSuggest,
        Self::CategoryNavigation,
        Self::BreadcrumbNavigation,
        Self::SearchPagination,
        Self::RegistrationAndLogin,
        Self::InvalidLogin,
        Self::MyAccount,
        Self::PasswordValidation,
        Self::ExistingEmail,
        Self::FilterByCategoryAndSize,
        Self::SortByPrice,
        Self::UpdateProductDetails,
        Self::ImageGallery,
        Self::ComparisonWishlist,
        Self::UpdateQuantity,
        Self::RemoveItem,
        Self::ContactForm,
        Self::Newsletter,
        Self::Voucher,
        Self::CrossSell,
        Self::GiftWrapping,
        Self::CartPersistence,
        Self::GuestPurchase,
        Self::CheckoutVariants,
        Self::SearchLocators,
        Self::CartLocators,
        Self::CurrentVsCodegen,
    ];

    /// Owning suite
    #[must_use]
    pub const fn suite(self) -> Suite {
        match self {
            Self::SearchNoResults
            | Self::SearchAutoSuggest
            | Self::CategoryNavigation
            | Self::BreadcrumbNavigation
            | Self::SearchPagination => Suite::SearchNavigation,
            Self::RegistrationAndLogin
            | Self::InvalidLogin
            | Self::MyAccount
            | Self::PasswordValidation
            | Self::ExistingEmail => Suite::AuthAccount,
            Self::FilterByCategoryAndSize
            | Self::SortByPrice
            | Self::UpdateProductDetails
            | Self::ImageGallery
            | Self::ComparisonWishlist => Suite::ProductInteraction,
            Self::UpdateQuantity
            | Self::RemoveItem
            | Self::ContactForm
            | Self::Newsletter
            | Self::Voucher
            | Self::CrossSell
            | Self::GiftWrapping
            | Self::CartPersistence => Suite::CartAndOther,
            Self::GuestPurchase | Self::CheckoutVariants => Suite::Checkout,
            Self::SearchLocators | Self::CartLocators | Self::CurrentVsCodegen => {
                Suite::CodegenValidation
            }
        }
    }

    /// Human-readable title, used as the scenario name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SearchNoResults => "Search with No Results",
            Self::SearchAutoSuggest => "Search Auto-Suggest Interaction",
            Self::CategoryNavigation => "Category Navigation and Product Filtering",
            Self::BreadcrumbNavigation => "Breadcrumb Navigation",
            Self::SearchPagination => "Search Results Pagination",
            Self::RegistrationAndLogin => "Full User Registration & Login",
            Self::InvalidLogin => "Invalid Login Attempt",
            Self::MyAccount => "My Account Page Verification",
            Self::PasswordValidation => "Password Validation",
            Self::ExistingEmail => "Account Creation with Existing Email",
            Self::FilterByCategoryAndSize => "Filter Products by Category and Size",
            Self::SortByPrice => "Sort Products by Price",
            Self::UpdateProductDetails => "Update Product Details",
            Self::ImageGallery => "Product Image Gallery Interaction",
            Self::ComparisonWishlist => "Product Comparison and Wishlist",
            Self::UpdateQuantity => "Update Item Quantity in Cart",
            Self::RemoveItem => "Remove Item from Cart",
            Self::ContactForm => "Contact Us Form Submission",
            Self::Newsletter => "Newsletter Subscription",
            Self::Voucher => "Shopping Cart Voucher/Discount Application",
            Self::CrossSell => "Cross-sell Products in Cart",
            Self::GiftWrapping => "Gift Wrapping Options",
            Self::CartPersistence => "Cart Persistence Across Sessions",
            Self::GuestPurchase => "Guest Purchase",
            Self::CheckoutVariants => "Checkout with Product Variants",
            Self::SearchLocators => "Validate Search Locators from Codegen",
            Self::CartLocators => "Validate Cart Locators from Codegen",
            Self::CurrentVsCodegen => "Compare Current vs Codegen Locators",
        }
    }

    /// Whether `filter` appears in the title, ignoring case
    #[must_use]
    pub fn matches(self, filter: &str) -> bool {
        self.name().to_lowercase().contains(&filter.to_lowercase())
    }

    /// Journeys of `suite` (all suites when `None`) whose title contains
    /// `filter` (any title when `None`)
    #[must_use]
    pub fn select(suite: Option<Suite>, filter: Option<&str>) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|j| suite.map_or(true, |s| j.suite() == s))
            .filter(|j| filter.map_or(true, |f| j.matches(f)))
            .collect()
    }

    /// Run this journey
    pub async fn run<D: PageDriver>(self, store: &Storefront<D>, data: &TestData) -> ScenarioReport {
        match self {
            Self::SearchNoResults => search_no_results(store, data).await,
            Self::SearchAutoSuggest => search_auto_suggest(store, data).await,
            Self::CategoryNavigation => category_navigation(store, data).await,
            Self::BreadcrumbNavigation => breadcrumb_navigation(store, data).await,
            Self::SearchPagination => search_pagination(store, data).await,
            Self::RegistrationAndLogin => registration_and_login(store, data).await,
            Self::InvalidLogin => invalid_login(store, data).await,
            Self::MyAccount => my_account(store, data).await,
            Self::PasswordValidation => password_validation(store, data).await,
            Self::ExistingEmail => existing_email(store, data).await,
            Self::FilterByCategoryAndSize => filter_by_category_and_size(store, data).await,
            Self::SortByPrice => sort_by_price(store, data).await,
            Self::UpdateProductDetails => update_product_details(store, data).await,
            Self::ImageGallery => image_gallery(store, data).await,
            Self::ComparisonWishlist => comparison_wishlist(store, data).await,
            Self::UpdateQuantity => update_quantity(store, data).await,
            Self::RemoveItem => remove_item(store, data).await,
            Self::ContactForm => contact_form(store, data).await,
            Self::Newsletter => newsletter(store, data).await,
            Self::Voucher => voucher(store, data).await,
            Self::CrossSell => cross_sell(store, data).await,
            Self::GiftWrapping => gift_wrapping(store, data).await,
            Self::CartPersistence => cart_persistence(store, data).await,
            Self::GuestPurchase => guest_purchase(store, data).await,
            Self::CheckoutVariants => checkout_variants(store, data).await,
            Self::SearchLocators => search_locators(store, data).await,
            Self::CartLocators => cart_locators(store, data).await,
            Self::CurrentVsCodegen => current_vs_codegen(store, data).await,
        }
    }
}

impl std::fmt::Display for Journey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Results of a journey run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// One report per journey, in run order
    pub reports: Vec<ScenarioReport>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Every journey passed at least one step and failed none
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(ScenarioReport::is_success)
    }

    /// Journeys that passed at least one step and failed none
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    /// Journeys with a failed step or without a single passed one
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    /// Journeys run
    #[must_use]
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Reports of failed journeys
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.reports.iter().filter(|r| !r.is_success()).collect()
    }
}

/// Runs a selection of journeys, each on a freshly opened storefront
#[derive(Debug, Default, Clone, Copy)]
pub struct JourneyRunner {
    /// Stop after the first failed journey
    pub fail_fast: bool,
}

impl JourneyRunner {
    /// Runner that runs every journey
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after the first failed journey
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Run `journeys` in order. `open` is called once per journey and
    /// yields the storefront it runs on; an error from `open` aborts the run.
    pub async fn run<D, F, Fut>(
        &self,
        journeys: &[Journey],
        data: &TestData,
        mut open: F,
    ) -> StoreResult<RunSummary>
    where
        D: PageDriver,
        F: FnMut(Journey) -> Fut,
        Fut: Future<Output = StoreResult<Storefront<D>>>,
    {
        let started = Instant::now();
        let mut reports = Vec::with_capacity(journeys.len());
        for journey in journeys {
            let store = open(*journey).await?;
            let report = journey.run(&store, data).await;
            let failed = !report.is_success();
            reports.push(report);
            if failed && self.fail_fast {
                tracing::warn!(journey = %journey, "stopping after failed journey");
                break;
            }
        }
        Ok(RunSummary {
            reports,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// Search `term`, open the first result and, when in stock, add it to the
/// cart and continue to the cart summary. Returns whether it was added.
pub(crate) async fn add_searched_product_to_cart<D: PageDriver>(
    store: &Storefront<D>,
    term: &str,
) -> StoreResult<bool> {
    store.home.goto().await?;
    store.home.search_for_product(term).await?;
    store.category.wait_for_products_to_load().await?;
    store.category.click_product(0).await?;
    store.product.wait_for_product_to_load().await?;

    if store.product.is_out_of_stock().await? {
        tracing::info!(term, "first result is out of stock");
        return Ok(false);
    }
    store.product.add_to_cart().await?;
    store.product.proceed_to_checkout().await?;
    store.cart.wait_for_cart_to_load().await?;
    Ok(true)
}

/// Check an optional storefront feature. A driver error means the feature is
/// absent: it is logged and the check yields no assertions.
pub(crate) async fn optional<Fut>(feature: &str, check: Fut) -> SoftAssertions
where
    Fut: Future<Output = StoreResult<SoftAssertions>>,
{
    match check.await {
        Ok(soft) => soft,
        Err(e) => {
            tracing::info!(feature, error = %e, "feature not available, continuing");
            SoftAssertions::new()
        }
    }
}
