//! Output formatting and progress reporting

use clap::ValueEnum;
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storeprobe::{ScenarioReport, StepStatus};

/// Output format for listings and run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Progress reporter for journey runs and analysis commands
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` journeys
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish and remove the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    fn prefixed(&self, symbol: &str, plain: &str, paint: fn(&str) -> String, message: &str) {
        let prefix = if self.use_color {
            paint(symbol)
        } else {
            plain.to_string()
        };
        let line = format!("{prefix} {message}");
        match self.progress_bar {
            Some(ref pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(&line);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("✓", "PASS", |s| style(s).green().bold().to_string(), message);
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.prefixed("✗", "FAIL", |s| style(s).red().bold().to_string(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("⚠", "WARN", |s| style(s).yellow().bold().to_string(), message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("ℹ", "INFO", |s| style(s).blue().bold().to_string(), message);
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print one finished journey with its non-passing steps
    pub fn journey(&self, report: &ScenarioReport) {
        let line = format!(
            "{} ({} passed, {} failed, {} skipped)",
            report.name,
            report.passed(),
            report.failed(),
            report.skipped()
        );
        if report.is_success() {
            self.success(&line);
        } else {
            self.failure(&line);
        }
        if self.quiet && report.is_success() {
            return;
        }
        for step in report.steps.iter().filter(|s| s.status != StepStatus::Passed) {
            let _ = self.term.write_line(&format!(
                "    {} {}: {}",
                step_label(step.status),
                step.name,
                step.messages.join("; ")
            ));
        }
    }

    /// Print the journey run summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} journeys in {:.2}s ({} passed, {} failed, {} steps skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} journeys in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} steps skipped)"
            ));
        }
    }
}

const fn step_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Passed => "passed",
        StepStatus::Failed => "failed",
        StepStatus::Skipped => "skipped",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use storeprobe::StepRecord;

    fn report(statuses: &[StepStatus]) -> ScenarioReport {
        ScenarioReport {
            name: "Guest Purchase".to_string(),
            steps: statuses
                .iter()
                .enumerate()
                .map(|(i, status)| StepRecord {
                    name: format!("step {i}"),
                    status: *status,
                    messages: Vec::new(),
                    duration_ms: 1,
                })
                .collect(),
            duration_ms: 3,
        }
    }

    mod output_format_tests {
        use super::*;

        #[test]
        fn test_default_format() {
            assert_eq!(OutputFormat::default(), OutputFormat::Text);
        }

        #[test]
        fn test_value_names() {
            let json = OutputFormat::from_str("json", true).unwrap();
            assert_eq!(json, OutputFormat::Json);
            assert!(OutputFormat::from_str("tap", true).is_err());
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_default_reporter() {
            let reporter = ProgressReporter::default();
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_messages() {
            let reporter = ProgressReporter::new(false, false);
            reporter.success("passed");
            reporter.failure("failed");
            reporter.warning("warning");
            reporter.info("info");
            reporter.header("Header");
        }

        #[test]
        fn test_journey_lines() {
            let reporter = ProgressReporter::new(false, false);
            reporter.journey(&report(&[StepStatus::Passed; 3]));
            reporter.journey(&report(&[StepStatus::Passed, StepStatus::Failed, StepStatus::Skipped]));
        }

        #[test]
        fn test_summary() {
            let reporter = ProgressReporter::new(false, false);
            reporter.summary(10, 0, 2, Duration::from_secs(5));
            reporter.summary(8, 2, 0, Duration::from_secs(3));
        }

        #[test]
        fn test_progress_bar_is_removed_on_finish() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(10, "Running journeys");
            reporter.increment(1);
            reporter.set_message("Guest Purchase");
            reporter.success("printed above the bar");
            reporter.finish();
            assert!(reporter.progress_bar.is_none());
        }

        #[test]
        fn test_quiet_mode_has_no_progress_bar() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running journeys");
            assert!(reporter.progress_bar.is_none());
            reporter.failure("shown");
        }

        #[test]
        fn test_step_labels() {
            assert_eq!(step_label(StepStatus::Failed), "failed");
            assert_eq!(step_label(StepStatus::Skipped), "skipped");
        }
    }
}
