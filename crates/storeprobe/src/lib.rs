//! Storeprobe: page-object end-to-end journeys for an e-commerce storefront,
//! plus tooling that mines recorded codegen scripts for reusable locators.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                      STOREPROBE Architecture                       │
//! ├───────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌──────────────────────┐    │
//! │   │ Journeys   │───►│ Page       │───►│ PageDriver           │    │
//! │   │ (Scenario) │    │ Objects    │    │ Mock │ Chromium (CDP)│    │
//! │   └────────────┘    └────────────┘    └──────────────────────┘    │
//! │                                                                    │
//! │   ┌────────────┐    ┌────────────┐    ┌──────────────────────┐    │
//! │   │ Recorded   │───►│ Extract &  │───►│ JSON / Markdown /    │    │
//! │   │ scripts    │    │ Aggregate  │    │ JS reports           │    │
//! │   └────────────┘    └────────────┘    └──────────────────────┘    │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Journeys never fail fast: a driver error skips the current step and a
//! failed soft assertion fails it, and both are collected into a
//! [`ScenarioReport`].

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Locator analysis over recorded codegen scripts
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate, clippy::doc_markdown)]
pub mod analysis;
mod assertion;
mod browser;
mod config;
mod driver;
mod fixtures;
/// End-to-end storefront journeys and their registry
pub mod journeys;
mod locator;
mod page_object;
/// Storefront page objects
pub mod pages;
mod result;
mod scenario;

pub use assertion::{AssertionFailure, AssertionSummary, SoftAssertions};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumDriver};
pub use config::{StoreConfig, Viewport, DEFAULT_CONFIG_FILE};
pub use driver::{
    ClickOptions, LoadState, MockDriver, MockEffect, MockElement, PageDriver, SelectOption,
    WaitState,
};
pub use fixtures::{unique_email, Credentials, TestData, UserData};
pub use journeys::{Journey, JourneyRunner, RunSummary, Suite};
pub use locator::{Locator, Selector};
pub use page_object::{first_int, parse_price, price_or_zero, Page, PageObject};
pub use pages::Storefront;
pub use result::{StoreError, StoreResult};
pub use scenario::{Scenario, ScenarioReport, StepOutcome, StepRecord, StepStatus};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used items
pub mod prelude {
    pub use crate::assertion::SoftAssertions;
    pub use crate::driver::{MockDriver, PageDriver, WaitState};
    pub use crate::fixtures::TestData;
    pub use crate::journeys::{Journey, JourneyRunner, Suite};
    pub use crate::locator::Locator;
    pub use crate::page_object::{Page, PageObject};
    pub use crate::pages::Storefront;
    pub use crate::result::{StoreError, StoreResult};
    pub use crate::scenario::{Scenario, ScenarioReport, StepStatus};
}
