//! Run command handler

use crate::commands::{RunArgs, SuiteArg};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::path::Path;
use std::time::Duration;
use storeprobe::{Journey, RunSummary, ScenarioReport};

/// Journeys selected by `--suite` and `--filter`
#[must_use]
pub fn select_journeys(suite: Option<SuiteArg>, filter: Option<&str>) -> Vec<Journey> {
    Journey::select(suite.map(Into::into), filter)
}

/// Print per-journey results and the summary, write the JSON report when
/// requested, and turn failed journeys into an error
pub fn finish_run(
    reporter: &ProgressReporter,
    summary: &RunSummary,
    report_path: Option<&Path>,
) -> CliResult<()> {
    for report in &summary.reports {
        reporter.journey(report);
    }
    let skipped = summary.reports.iter().map(ScenarioReport::skipped).sum();
    reporter.summary(
        summary.passed_count(),
        summary.failed_count(),
        skipped,
        Duration::from_millis(summary.duration_ms),
    );

    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
        reporter.info(&format!("Run summary written to {}", path.display()));
    }

    if summary.all_passed() {
        Ok(())
    } else {
        Err(CliError::journeys_failed(
            summary.failed_count(),
            summary.total(),
        ))
    }
}

/// Execute the run command
#[cfg(feature = "browser")]
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    use storeprobe::TestData;

    let journeys = select_journeys(args.suite, args.filter.as_deref());
    if journeys.is_empty() {
        return Err(CliError::invalid_argument(
            "no journeys match the given suite and filter",
        ));
    }

    let mut store = config.store_config()?;
    if let Some(url) = &args.base_url {
        store = store.with_base_url(url.clone());
    }
    if args.headed {
        store = store.with_headless(false);
    }
    let data = TestData::load_or_default(store.test_data.as_deref())?;

    let mut reporter = super::reporter(config);
    reporter.header(&format!(
        "Running {} journeys against {}",
        journeys.len(),
        store.base_url
    ));
    let summary = super::runtime()?.block_on(chromium::run(
        &store,
        &journeys,
        &data,
        args.fail_fast,
        &mut reporter,
    ))?;
    finish_run(&reporter, &summary, args.report.as_deref())
}

/// Execute the run command
#[cfg(not(feature = "browser"))]
pub fn execute_run(_config: &CliConfig, _args: &RunArgs) -> CliResult<()> {
    Err(CliError::FeatureDisabled { feature: "browser" })
}

#[cfg(feature = "browser")]
mod chromium {
    use crate::error::CliResult;
    use crate::output::ProgressReporter;
    use storeprobe::{
        ChromiumBrowser, Journey, JourneyRunner, Page, RunSummary, StoreConfig, Storefront,
        TestData,
    };

    /// Run `journeys` in one Chromium instance, one page each
    pub(super) async fn run(
        store: &StoreConfig,
        journeys: &[Journey],
        data: &TestData,
        fail_fast: bool,
        reporter: &mut ProgressReporter,
    ) -> CliResult<RunSummary> {
        let browser = ChromiumBrowser::launch(store.browser_config()).await?;
        let runner = if fail_fast {
            JourneyRunner::new().with_fail_fast()
        } else {
            JourneyRunner::new()
        };

        reporter.start_progress(journeys.len() as u64, "Starting Chromium");
        let result = {
            let reporter = &*reporter;
            let browser = &browser;
            runner
                .run(journeys, data, |journey| {
                    reporter.set_message(journey.name());
                    reporter.increment(1);
                    let base_url = store.base_url.clone();
                    async move {
                        let driver = browser.new_page().await?;
                        Ok(Storefront::new(&Page::new(driver, base_url)))
                    }
                })
                .await
        };
        reporter.finish();

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "failed to close browser");
        }
        Ok(result?)
    }
}
