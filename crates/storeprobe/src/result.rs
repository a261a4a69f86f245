//! Result and error types for Storeprobe.

use thiserror::Error;

/// Result type for Storeprobe operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in Storeprobe
#[derive(Debug, Error)]
pub enum StoreError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error (CDP call or script evaluation failed)
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// No element matched a locator
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Locator that matched nothing
        selector: String,
    },

    /// A named entity (category, size, colour, product...) is unknown
    #[error("{kind} {name} not found")]
    NotFound {
        /// What was looked up
        kind: String,
        /// The name that did not resolve
        name: String,
    },

    /// Selector could not be parsed
    #[error("Invalid selector: {message}")]
    InvalidSelector {
        /// Error message
        message: String,
    },

    /// Session name cannot be used as a file name prefix
    #[error("Invalid session name '{name}': use a plain name without path separators")]
    InvalidSession {
        /// Rejected name
        name: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// External process (codegen recorder) failed
    #[error("Process error: {message}")]
    ProcessError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl StoreError {
    /// Unknown named entity
    #[must_use]
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Page-level failure
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Whether the error means "the element or entity is absent" rather than
    /// a broken driver
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::NotFound { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found("Category", "Shoes");
        assert_eq!(err.to_string(), "Category Shoes not found");
        assert!(err.is_missing());
    }

    #[test]
    fn test_timeout_is_missing() {
        assert!(StoreError::Timeout { ms: 5000 }.is_missing());
        assert!(!StoreError::page("boom").is_missing());
    }

    #[test]
    fn test_json_error_from() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: StoreError = parse.unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
