//! Step runner for journeys.
//!
//! A [`Scenario`] runs named steps in order. A step is an async block that
//! yields either `()` or the [`SoftAssertions`] it collected. A step with
//! failed soft assertions is recorded as failed. A step whose block errors is
//! logged and the scenario moves on: it is recorded as failed when a
//! collector from [`Scenario::soft`] had already seen a failure, and as
//! skipped otherwise.

use crate::assertion::{FailureLog, SoftAssertions};
use crate::result::StoreResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Ran and every assertion held
    Passed,
    /// Ran and at least one assertion failed
    Failed,
    /// Could not run to completion (element missing, driver error)
    Skipped,
}

/// Record of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Step title
    pub name: String,
    /// Outcome
    pub status: StepStatus,
    /// Assertion failures or the error that stopped the step
    pub messages: Vec<String>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// What a step block may yield
pub trait StepOutcome {
    /// Assertions collected by the step
    fn into_assertions(self) -> SoftAssertions;
}

impl StepOutcome for () {
    fn into_assertions(self) -> SoftAssertions {
        SoftAssertions::new()
    }
}

impl StepOutcome for SoftAssertions {
    fn into_assertions(self) -> SoftAssertions {
        self
    }
}

/// A named sequence of steps
#[derive(Debug)]
pub struct Scenario {
    name: String,
    steps: Mutex<Vec<StepRecord>>,
    log: FailureLog,
    started: Instant,
}

impl Scenario {
    /// Start a scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::info!(scenario = %name, "scenario started");
        Self {
            name,
            steps: Mutex::new(Vec::new()),
            log: FailureLog::default(),
            started: Instant::now(),
        }
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collector whose failures are kept for the running step even if the
    /// step errors before yielding it
    #[must_use]
    pub fn soft(&self) -> SoftAssertions {
        SoftAssertions::reporting_to(Arc::clone(&self.log))
    }

    /// Run one step and record its outcome
    pub async fn step<O, Fut>(&self, name: &str, body: Fut) -> StepStatus
    where
        O: StepOutcome,
        Fut: Future<Output = StoreResult<O>>,
    {
        let started = Instant::now();
        drop(self.take_logged());
        let result = body.await;
        let logged = self.take_logged();
        let (status, messages) = match result {
            Ok(outcome) => {
                let soft = outcome.into_assertions();
                if soft.all_passed() {
                    (StepStatus::Passed, Vec::new())
                } else {
                    let messages = soft.failures().iter().map(|f| f.message.clone()).collect();
                    (StepStatus::Failed, messages)
                }
            }
            Err(e) if logged.is_empty() => {
                tracing::warn!(scenario = %self.name, step = name, error = %e, "step skipped");
                (StepStatus::Skipped, vec![e.to_string()])
            }
            Err(e) => {
                tracing::warn!(
                    scenario = %self.name,
                    step = name,
                    error = %e,
                    "step stopped after failed assertions"
                );
                let mut messages = logged;
                messages.push(e.to_string());
                (StepStatus::Failed, messages)
            }
        };
        tracing::debug!(scenario = %self.name, step = name, ?status, "step finished");
        self.records().push(StepRecord {
            name: name.to_string(),
            status,
            messages,
            duration_ms: duration_ms(started.elapsed()),
        });
        status
    }

    fn take_logged(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn records(&self) -> MutexGuard<'_, Vec<StepRecord>> {
        self.steps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the scenario
    #[must_use]
    pub fn finish(self) -> ScenarioReport {
        let report = ScenarioReport {
            name: self.name,
            duration_ms: duration_ms(self.started.elapsed()),
            steps: self
                .steps
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        };
        tracing::info!(
            scenario = %report.name,
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "scenario finished"
        );
        report
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Finished scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Steps in run order
    pub steps: Vec<StepRecord>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl ScenarioReport {
    fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Passed steps
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(StepStatus::Passed)
    }

    /// Failed steps
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(StepStatus::Failed)
    }

    /// Skipped steps
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(StepStatus::Skipped)
    }

    /// At least one step passed and none failed
    ///
    /// A scenario whose every step was skipped never reached the storefront
    /// features it checks, so it does not count as a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.passed() > 0
    }
}
