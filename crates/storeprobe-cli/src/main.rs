//! Storeprobe CLI: storefront journeys and codegen locator analysis
//!
//! ## Usage
//!
//! ```bash
//! storeprobe list                          # List journeys by suite
//! storeprobe run --suite checkout          # Run journeys in Chromium
//! storeprobe codegen cart                  # Record on the cart page
//! storeprobe analyze-file rec.js checkout  # Analyze one recording
//! storeprobe analyze                       # Consolidate all sessions
//! ```

use clap::Parser;
use std::process::ExitCode;
use storeprobe_cli::{handlers, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Analyze(args) => handlers::execute_analyze(&config, &args),
        Commands::AnalyzeFile(args) => handlers::execute_analyze_file(&config, &args),
        Commands::Collect(args) => handlers::execute_collect(&config, &args),
        Commands::Codegen(args) => handlers::execute_codegen(&config, &args),
        Commands::Scan(args) => handlers::execute_scan(&config, &args),
        Commands::Run(args) => handlers::execute_run(&config, &args),
        Commands::List(args) => handlers::execute_list(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    let config = CliConfig::new().with_verbosity(verbosity).with_color(color);
    match &cli.config {
        Some(path) => config.with_config_path(path),
        None => config,
    }
}

/// `RUST_LOG` wins over the `-v`/`-q` derived level
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("storeprobe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = build_config(&parse(&["list"]));
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert_eq!(config.color, ColorChoice::Auto);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let config = build_config(&parse(&["-q", "-vv", "list"]));
        assert_eq!(config.verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_verbose_levels() {
        assert_eq!(build_config(&parse(&["-v", "list"])).verbosity, Verbosity::Verbose);
        assert_eq!(build_config(&parse(&["-vvv", "list"])).verbosity, Verbosity::Debug);
    }

    #[test]
    fn test_config_path_is_forwarded() {
        let config = build_config(&parse(&["--config", "shop.yaml", "list"]));
        assert_eq!(config.config_path, Some("shop.yaml".into()));
    }
}
