//! Journeys against the live demo storefront.
//!
//! Needs the `browser` feature, a local Chromium and network access:
//!
//! ```text
//! cargo test -p storeprobe --features browser --test live_journeys -- --ignored
//! ```

#![cfg(feature = "browser")]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use storeprobe::{
    ChromiumBrowser, Journey, JourneyRunner, Page, RunSummary, StoreConfig, Storefront, Suite,
    TestData,
};

async fn run_live(journeys: &[Journey]) -> RunSummary {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let config = StoreConfig::discover(None).expect("config should load");
    let browser = ChromiumBrowser::launch(config.browser_config().with_no_sandbox())
        .await
        .expect("chromium should launch");
    let data = TestData::load_or_default(config.test_data.as_deref()).expect("test data");

    let base_url = config.base_url.clone();
    let browser_ref = &browser;
    let summary = JourneyRunner::new()
        .run(journeys, &data, |_| {
            let base_url = base_url.clone();
            async move {
                let driver = browser_ref.new_page().await?;
                Ok(Storefront::new(&Page::new(driver, base_url)))
            }
        })
        .await
        .expect("every page should open");

    browser.close().await.expect("browser should close");
    summary
}

#[tokio::test]
#[ignore = "Requires chromium and network access to the demo storefront"]
async fn test_live_search_and_navigation() {
    let summary = run_live(&Suite::SearchNavigation.journeys()).await;
    assert_eq!(summary.total(), 5);
    for report in &summary.reports {
        assert_eq!(report.skipped(), 0, "{} skipped steps", report.name);
    }
}

#[tokio::test]
#[ignore = "Requires chromium and network access to the demo storefront"]
async fn test_live_codegen_locators() {
    let summary = run_live(&Suite::CodegenValidation.journeys()).await;
    assert!(summary.all_passed(), "{:#?}", summary.failures());
}

#[tokio::test]
#[ignore = "Requires chromium and network access to the demo storefront"]
async fn test_live_guest_checkout() {
    let summary = run_live(&[Journey::GuestPurchase]).await;
    assert!(summary.all_passed(), "{:#?}", summary.failures());
}
