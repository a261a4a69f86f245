//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests

pub mod analyze;
pub mod codegen;
pub mod list;
pub mod run;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

pub use analyze::{analysis_summary_lines, execute_analyze, execute_analyze_file, session_summary_lines};
pub use codegen::{default_session_name, execute_codegen, execute_collect, execute_scan, scan_summary_lines};
pub use list::{execute_list, render_journey_list, render_journey_list_json};
pub use run::{execute_run, finish_run, select_journeys};

/// Reporter honouring the configured colour and quiet settings
#[must_use]
pub fn reporter(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))
}
