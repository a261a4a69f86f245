//! Storeprobe CLI Library
//!
//! Command-line interface for storefront journeys and codegen locator
//! analysis.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    AnalyzeArgs, AnalyzeFileArgs, Cli, CodegenArgs, CollectArgs, ColorArg, Commands, ListArgs,
    RunArgs, ScanArgs, SuiteArg,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, ProgressReporter};
