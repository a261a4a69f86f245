//! Assertions for journey validation.

mod soft;

pub use soft::{AssertionFailure, AssertionSummary, SoftAssertions};
pub(crate) use soft::FailureLog;
