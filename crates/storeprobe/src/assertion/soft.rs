//! Soft assertions.
//!
//! Journeys check many things per step and keep going after a miss, so every
//! check is recorded here and the step decides at the end whether it failed.

use crate::result::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

/// Failure messages shared between a step runner and the collectors it hands
/// out
pub(crate) type FailureLog = Arc<Mutex<Vec<String>>>;

/// A single assertion failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Message describing the failure
    pub message: String,
    /// Index of this failure in the sequence
    pub index: usize,
}

/// Soft assertions collector
///
/// ```
/// use storeprobe::SoftAssertions;
///
/// let mut soft = SoftAssertions::new();
/// soft.assert_contains_any("Authentication failed.", &["Invalid email", "Authentication failed"], "login error");
/// soft.assert_true(false, "logout link visible");
/// assert_eq!(soft.failure_count(), 1);
/// assert!(soft.verify().is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct SoftAssertions {
    failures: Vec<AssertionFailure>,
    assertion_count: usize,
    log: Option<FailureLog>,
}

impl SoftAssertions {
    /// Create a new soft assertions collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector that also copies every failure into `log`
    pub(crate) fn reporting_to(log: FailureLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    /// Assert two values are equal
    pub fn assert_eq<T: PartialEq + Debug>(&mut self, actual: &T, expected: &T, message: &str) {
        self.assertion_count += 1;
        if actual != expected {
            self.record_failure(format!("{message}: expected {expected:?}, got {actual:?}"));
        }
    }

    /// Assert a condition is true
    pub fn assert_true(&mut self, condition: bool, message: &str) {
        self.assertion_count += 1;
        if !condition {
            self.record_failure(format!("{message}: expected true, got false"));
        }
    }

    /// Assert a condition is false
    pub fn assert_false(&mut self, condition: bool, message: &str) {
        self.assertion_count += 1;
        if condition {
            self.record_failure(format!("{message}: expected false, got true"));
        }
    }

    /// Assert a value is Some
    pub fn assert_some<T>(&mut self, opt: &Option<T>, message: &str) {
        self.assertion_count += 1;
        if opt.is_none() {
            self.record_failure(format!("{message}: expected Some, got None"));
        }
    }

    /// Assert a string contains a substring
    pub fn assert_contains(&mut self, haystack: &str, needle: &str, message: &str) {
        self.assertion_count += 1;
        if !haystack.contains(needle) {
            self.record_failure(format!(
                "{message}: expected '{haystack}' to contain '{needle}'"
            ));
        }
    }

    /// Assert a string contains a substring, ignoring case
    pub fn assert_contains_ignore_case(&mut self, haystack: &str, needle: &str, message: &str) {
        self.assertion_count += 1;
        if !haystack.to_lowercase().contains(&needle.to_lowercase()) {
            self.record_failure(format!(
                "{message}: expected '{haystack}' to contain '{needle}' (any case)"
            ));
        }
    }

    /// Assert a string contains at least one of `needles`
    pub fn assert_contains_any(&mut self, haystack: &str, needles: &[&str], message: &str) {
        self.assertion_count += 1;
        if !needles.iter().any(|n| haystack.contains(n)) {
            self.record_failure(format!(
                "{message}: expected '{haystack}' to contain one of {needles:?}"
            ));
        }
    }

    /// Assert `actual > bound`
    pub fn assert_gt<T: PartialOrd + Debug>(&mut self, actual: &T, bound: &T, message: &str) {
        self.assertion_count += 1;
        if actual <= bound {
            self.record_failure(format!("{message}: expected {actual:?} > {bound:?}"));
        }
    }

    /// Assert a collection is not empty
    pub fn assert_not_empty<T>(&mut self, collection: &[T], message: &str) {
        self.assertion_count += 1;
        if collection.is_empty() {
            self.record_failure(format!("{message}: expected non-empty collection"));
        }
    }

    /// Assert two floats are approximately equal
    pub fn assert_approx_eq(&mut self, actual: f64, expected: f64, epsilon: f64, message: &str) {
        self.assertion_count += 1;
        if (actual - expected).abs() >= epsilon {
            self.record_failure(format!(
                "{message}: expected {actual} ~ {expected} (epsilon: {epsilon})"
            ));
        }
    }

    /// Assert a slice is sorted ascending (`descending == false`) or
    /// descending
    pub fn assert_sorted<T: PartialOrd + Debug>(
        &mut self,
        values: &[T],
        descending: bool,
        message: &str,
    ) {
        self.assertion_count += 1;
        let sorted = values.windows(2).all(|w| {
            if descending {
                w[0] >= w[1]
            } else {
                w[0] <= w[1]
            }
        });
        if !sorted {
            let order = if descending { "descending" } else { "ascending" };
            self.record_failure(format!("{message}: expected {order} order, got {values:?}"));
        }
    }

    /// Record a custom failure
    pub fn fail(&mut self, message: impl Into<String>) {
        self.assertion_count += 1;
        self.record_failure(message.into());
    }

    fn record_failure(&mut self, message: String) {
        tracing::warn!(%message, "soft assertion failed");
        self.push_failure(message);
    }

    fn push_failure(&mut self, message: String) {
        if let Some(log) = &self.log {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.clone());
        }
        let failure = AssertionFailure {
            message,
            index: self.failures.len(),
        };
        self.failures.push(failure);
    }

    /// Get all failures
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Get the number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Get the total number of assertions checked
    #[must_use]
    pub const fn assertion_count(&self) -> usize {
        self.assertion_count
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fail with every collected message if any assertion failed
    pub fn verify(&self) -> StoreResult<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        let messages: Vec<&str> = self.failures.iter().map(|f| f.message.as_str()).collect();
        Err(StoreError::AssertionFailed {
            message: format!(
                "{} assertion(s) failed: {}",
                self.failures.len(),
                messages.join("; ")
            ),
        })
    }

    /// Move all failures out, leaving the collector empty
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Append the checks of `other`, renumbering its failures
    pub fn merge(&mut self, other: Self) {
        self.assertion_count += other.assertion_count;
        for failure in other.failures {
            self.push_failure(failure.message);
        }
    }

    /// Get a summary of the assertions
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.assertion_count,
            passed: self.assertion_count - self.failures.len(),
            failed: self.failures.len(),
        }
    }
}

/// Summary of assertion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total assertions checked
    pub total: usize,
    /// Assertions that passed
    pub passed: usize,
    /// Assertions that failed
    pub failed: usize,
}
