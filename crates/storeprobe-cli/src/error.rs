//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more journeys failed
    #[error("{failed} of {total} journeys failed")]
    JourneysFailed {
        /// Failed journeys
        failed: usize,
        /// Journeys run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storeprobe library error
    #[error("{0}")]
    Store(#[from] storeprobe::StoreError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Feature compiled out
    #[error("{feature} support not enabled. Rebuild with --features {feature}")]
    FeatureDisabled {
        /// Cargo feature name
        feature: &'static str,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a journeys-failed error
    #[must_use]
    pub const fn journeys_failed(failed: usize, total: usize) -> Self {
        Self::JourneysFailed { failed, total }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad arg");
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_journeys_failed_error() {
        let err = CliError::journeys_failed(2, 5);
        assert_eq!(err.to_string(), "2 of 5 journeys failed");
    }

    #[test]
    fn test_feature_disabled_error() {
        let err = CliError::FeatureDisabled { feature: "browser" };
        assert!(err.to_string().contains("--features browser"));
    }

    #[test]
    fn test_store_error_from() {
        let store_err = storeprobe::StoreError::not_found("File", "missing.js");
        let cli_err: CliError = store_err.into();
        assert_eq!(cli_err.to_string(), "File missing.js not found");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
