//! Collect, codegen and scan command handlers

use super::analyze::print_session;
use super::{reporter, runtime};
use crate::commands::{CodegenArgs, CollectArgs, ScanArgs};
use crate::config::CliConfig;
use crate::error::CliResult;
use std::time::{SystemTime, UNIX_EPOCH};
use storeprobe::analysis::{collect, quick_scan, render_getters, CodegenTarget, QuickScan, Recorder};

/// Execute the collect command
pub fn execute_collect(config: &CliConfig, args: &CollectArgs) -> CliResult<()> {
    let store = config.store_config()?;
    let url = args.url.clone().unwrap_or_else(|| store.base_url.clone());
    let session = args.session.clone().unwrap_or_else(default_session_name);
    let reporter = reporter(config);

    reporter.header("Auto Locator Collector");
    reporter.info(&format!("Recording session '{session}' on {url}"));
    reporter.info("Interact with the page, then close the recorder to analyze the script");

    let recorder = Recorder::new().with_viewport(store.viewport);
    let artifacts =
        runtime()?.block_on(collect(&recorder, &store.locator_dir, &url, &session))?;
    print_session(&reporter, &artifacts);
    reporter.success(&format!(
        "Analysis complete. Check {} for results.",
        store.locator_dir.display()
    ));
    Ok(())
}

/// Execute the codegen command
pub fn execute_codegen(config: &CliConfig, args: &CodegenArgs) -> CliResult<()> {
    let store = config.store_config()?;
    let target = CodegenTarget::from_name(&args.page_type);
    let url = target.url(&store.base_url);
    let reporter = reporter(config);

    reporter.header("Codegen Recorder");
    reporter.info(&format!("Recording {url}"));
    let recorder = Recorder::new().with_viewport(store.viewport);
    runtime()?.block_on(recorder.record(&url, None))?;
    reporter.success("Recorder closed");
    Ok(())
}

/// Execute the scan command
pub fn execute_scan(config: &CliConfig, args: &ScanArgs) -> CliResult<()> {
    let code = std::fs::read_to_string(&args.file)?;
    let scan = quick_scan(&code);
    let reporter = reporter(config);

    for line in scan_summary_lines(&scan) {
        reporter.info(&line);
    }
    println!("{}", render_getters(&scan, &args.name));
    Ok(())
}

/// Session name for a recording started now
#[must_use]
pub fn default_session_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("session_{millis}")
}

/// Human summary of a quick scan
#[must_use]
pub fn scan_summary_lines(scan: &QuickScan) -> Vec<String> {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    vec![
        format!("Locators: {}", scan.locators.len()),
        format!("Clicks: {}", yes_no(scan.has_clicks)),
        format!("Fills: {}", yes_no(scan.has_fills)),
        format!("Code length: {} bytes", scan.code_length),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    #[test]
    fn test_default_session_name() {
        let name = default_session_name();
        let millis = name.strip_prefix("session_").unwrap();
        assert!(millis.parse::<u128>().unwrap() > 0);
    }

    #[test]
    fn test_scan_summary_lines() {
        let scan = quick_scan("await page.locator('#email').fill('a@b.c');");
        assert_eq!(
            scan_summary_lines(&scan),
            vec![
                "Locators: 1".to_string(),
                "Clicks: no".to_string(),
                "Fills: yes".to_string(),
                format!("Code length: {} bytes", scan.code_length),
            ]
        );
    }

    #[test]
    fn test_scan_missing_file_is_error() {
        let config = CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never);
        let args = ScanArgs {
            file: "/nonexistent/generated.js".into(),
            name: "HomePage".to_string(),
        };
        assert!(execute_scan(&config, &args).is_err());
    }
}
