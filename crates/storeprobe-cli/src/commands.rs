//! CLI command definitions using clap

use crate::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Storeprobe: storefront journeys and codegen locator analysis
#[derive(Parser, Debug)]
#[command(name = "storeprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Project config file (defaults to ./storeprobe.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Consolidate every session report into cross-session reports
    Analyze(AnalyzeArgs),

    /// Analyze one recorded codegen script
    AnalyzeFile(AnalyzeFileArgs),

    /// Record a codegen session, then analyze it
    Collect(CollectArgs),

    /// Launch the codegen recorder on a storefront page
    Codegen(CodegenArgs),

    /// Scan generated code and print page-object getters
    Scan(ScanArgs),

    /// Run storefront journeys in Chromium
    Run(RunArgs),

    /// List registered journeys
    List(ListArgs),
}

/// Arguments for the analyze command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Directory holding `<session>-analysis.json` files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for consolidated reports
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the analyze-file command
#[derive(Parser, Debug)]
pub struct AnalyzeFileArgs {
    /// Recorded script
    pub file: PathBuf,

    /// Session name used for artifact file names
    pub session: String,

    /// Directory for the per-session artifacts
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the collect command
#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// Page to start recording on (defaults to the configured base URL)
    pub url: Option<String>,

    /// Session name (defaults to `session_<millis>`)
    pub session: Option<String>,
}

/// Arguments for the codegen command
#[derive(Parser, Debug)]
pub struct CodegenArgs {
    /// homepage, cart, login, women or contact
    #[arg(default_value = "homepage")]
    pub page_type: String,
}

/// Arguments for the scan command
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// File with generated code
    pub file: PathBuf,

    /// Page-object name used in the generated header comment
    #[arg(short, long, default_value = "PageObject")]
    pub name: String,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only run this suite
    #[arg(short, long)]
    pub suite: Option<SuiteArg>,

    /// Only run journeys whose title contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Storefront root, overriding the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Stop after the first failed journey
    #[arg(long)]
    pub fail_fast: bool,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list this suite
    #[arg(short, long)]
    pub suite: Option<SuiteArg>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Journey suite names
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuiteArg {
    /// Search and category navigation
    SearchNav,
    /// Registration, login and account pages
    Auth,
    /// Product listing and detail interaction
    Product,
    /// Cart, contact form, newsletter and vouchers
    Cart,
    /// Checkout flows
    Checkout,
    /// Recorded codegen locator checks
    Codegen,
}

impl From<SuiteArg> for storeprobe::Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::SearchNav => Self::SearchNavigation,
            SuiteArg::Auth => Self::AuthAccount,
            SuiteArg::Product => Self::ProductInteraction,
            SuiteArg::Cart => Self::CartAndOther,
            SuiteArg::Checkout => Self::Checkout,
            SuiteArg::Codegen => Self::CodegenValidation,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use storeprobe::Suite;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("storeprobe").chain(args.iter().copied())).unwrap()
    }

    mod cli_tests {
        use super::*;

        #[test]
        fn test_cli_is_well_formed() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = parse(&["list", "-vv", "--color", "never", "--config", "shop.yaml"]);
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.color, ColorArg::Never));
            assert_eq!(cli.config, Some(PathBuf::from("shop.yaml")));
        }

        #[test]
        fn test_missing_subcommand_is_error() {
            assert!(Cli::try_parse_from(["storeprobe"]).is_err());
        }
    }

    mod analyze_tests {
        use super::*;

        #[test]
        fn test_analyze_defaults() {
            let cli = parse(&["analyze"]);
            match cli.command {
                Commands::Analyze(args) => {
                    assert!(args.input.is_none());
                    assert!(args.output.is_none());
                }
                other => panic!("unexpected command {other:?}"),
            }
        }

        #[test]
        fn test_analyze_file_positionals() {
            let cli = parse(&["analyze-file", "rec.js", "checkout", "-o", "out"]);
            match cli.command {
                Commands::AnalyzeFile(args) => {
                    assert_eq!(args.file, PathBuf::from("rec.js"));
                    assert_eq!(args.session, "checkout");
                    assert_eq!(args.output, Some(PathBuf::from("out")));
                }
                other => panic!("unexpected command {other:?}"),
            }
        }

        #[test]
        fn test_analyze_file_requires_session() {
            let result = Cli::try_parse_from(["storeprobe", "analyze-file", "rec.js"]);
            assert!(result.is_err());
        }
    }

    mod codegen_tests {
        use super::*;

        #[test]
        fn test_codegen_defaults_to_homepage() {
            match parse(&["codegen"]).command {
                Commands::Codegen(args) => assert_eq!(args.page_type, "homepage"),
                other => panic!("unexpected command {other:?}"),
            }
        }

        #[test]
        fn test_collect_optional_positionals() {
            match parse(&["collect", "http://shop.test/"]).command {
                Commands::Collect(args) => {
                    assert_eq!(args.url.as_deref(), Some("http://shop.test/"));
                    assert!(args.session.is_none());
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_run_flags() {
            let cli = parse(&[
                "run",
                "--suite",
                "search-nav",
                "--filter",
                "breadcrumb",
                "--base-url",
                "http://shop.test",
                "--headed",
            ]);
            match cli.command {
                Commands::Run(args) => {
                    assert_eq!(args.suite, Some(SuiteArg::SearchNav));
                    assert_eq!(args.filter.as_deref(), Some("breadcrumb"));
                    assert_eq!(args.base_url.as_deref(), Some("http://shop.test"));
                    assert!(args.headed);
                    assert!(!args.fail_fast);
                }
                other => panic!("unexpected command {other:?}"),
            }
        }

        #[test]
        fn test_unknown_suite_is_error() {
            let result = Cli::try_parse_from(["storeprobe", "run", "--suite", "payments"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_suite_arg_names_match_library() {
            for arg in SuiteArg::value_variants() {
                let name = arg.to_possible_value().unwrap();
                let suite: Suite = (*arg).into();
                assert_eq!(name.get_name(), suite.as_str());
            }
        }
    }
}
