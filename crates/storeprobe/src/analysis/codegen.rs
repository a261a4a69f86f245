//! Codegen recorder launcher and quick scans of recorded code.

use super::store::{analyze_file_at, validate_session, SessionArtifacts};
use crate::config::Viewport;
use crate::result::{StoreError, StoreResult};
use chrono::Utc;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;

/// Storefront page a recording starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenTarget {
    Homepage,
    Cart,
    Login,
    Women,
    Contact,
}

impl CodegenTarget {
    /// Every target with its CLI name
    pub const ALL: [(&'static str, Self); 5] = [
        ("homepage", Self::Homepage),
        ("cart", Self::Cart),
        ("login", Self::Login),
        ("women", Self::Women),
        ("contact", Self::Contact),
    ];

    /// Look up a target by name; unknown names fall back to the homepage
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self::ALL
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, t)| *t)
            .unwrap_or_else(|| {
                tracing::warn!(page_type = name, "unknown page type, recording the homepage");
                Self::Homepage
            })
    }

    /// Path and query below the storefront root
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Homepage => "/",
            Self::Cart => "/index.php?controller=order",
            Self::Login => "/index.php?controller=authentication",
            Self::Women => "/index.php?id_category=3&controller=category",
            Self::Contact => "/index.php?controller=contact",
        }
    }

    /// Full URL under `base_url`
    #[must_use]
    pub fn url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

/// Launches `npx playwright codegen`
#[derive(Debug, Clone)]
pub struct Recorder {
    program: String,
    viewport: Viewport,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            viewport: Viewport::default(),
        }
    }
}

impl Recorder {
    /// Recorder with default program and viewport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another launcher executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Record with this viewport
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Launcher arguments
    #[must_use]
    pub fn args(&self, url: &str, output: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "playwright".to_string(),
            "codegen".to_string(),
            url.to_string(),
            "--target=javascript".to_string(),
            format!(
                "--viewport-size={},{}",
                self.viewport.width, self.viewport.height
            ),
        ];
        if let Some(path) = output {
            args.push(format!("--output={}", path.display()));
        }
        args
    }

    /// Run the recorder with inherited stdio until it exits
    pub async fn record(&self, url: &str, output: Option<&Path>) -> StoreResult<()> {
        let args = self.args(url, output);
        tracing::info!(program = %self.program, url, "starting codegen recorder");

        let status = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| StoreError::ProcessError {
                message: format!("failed to start {}: {e}. Is Node.js installed?", self.program),
            })?;

        if status.success() {
            tracing::info!("codegen recorder exited");
            Ok(())
        } else {
            Err(StoreError::ProcessError {
                message: format!("{} exited with code {:?}", self.program, status.code()),
            })
        }
    }
}

/// Where a recording for `session` is saved
#[must_use]
pub fn recording_path(dir: &Path, session: &str, millis: i64) -> PathBuf {
    dir.join(format!("{session}-{millis}.js"))
}

/// Record a session into `dir` and analyze the recorded script
pub async fn collect(
    recorder: &Recorder,
    dir: &Path,
    url: &str,
    session: &str,
) -> StoreResult<SessionArtifacts> {
    validate_session(session)?;
    std::fs::create_dir_all(dir)?;
    let now = Utc::now();
    let script = recording_path(dir, session, now.timestamp_millis());
    recorder.record(url, Some(&script)).await?;
    if !script.is_file() {
        return Err(StoreError::ProcessError {
            message: format!("recorder produced no script at {}", script.display()),
        });
    }
    analyze_file_at(&script, session, url, dir, now)
}

/// Summary of a pasted code snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickScan {
    /// `page.locator(...)` selectors, unique, first-seen order
    pub locators: Vec<String>,
    /// Contains `.click()`
    pub has_clicks: bool,
    /// Contains `.fill('...')`
    pub has_fills: bool,
    /// Length in bytes
    pub code_length: usize,
}

fn scan_regexes() -> Option<&'static (Regex, Regex, Regex)> {
    static RES: OnceLock<Option<(Regex, Regex, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        Some((
            Regex::new(r#"page\.locator\(['"`]([^'"`]+)['"`]\)"#).ok()?,
            Regex::new(r"\.click\(\)").ok()?,
            Regex::new(r#"\.fill\(['"`]([^'"`]+)['"`]\)"#).ok()?,
        ))
    })
    .as_ref()
}

/// Scan generated code for locators and interactions
#[must_use]
pub fn quick_scan(code: &str) -> QuickScan {
    let mut scan = QuickScan {
        locators: Vec::new(),
        has_clicks: false,
        has_fills: false,
        code_length: code.len(),
    };
    let Some((locator, click, fill)) = scan_regexes() else {
        return scan;
    };
    for caps in locator.captures_iter(code) {
        if let Some(m) = caps.get(1) {
            if !scan.locators.iter().any(|l| l == m.as_str()) {
                scan.locators.push(m.as_str().to_string());
            }
        }
    }
    scan.has_clicks = click.is_match(code);
    scan.has_fills = fill.is_match(code);
    scan
}

/// camelCase getter name for a selector, ending in `Element`
///
/// ```
/// use storeprobe::analysis::getter_name;
///
/// assert_eq!(getter_name("#search_query_top"), "searchQueryTopElement");
/// assert_eq!(getter_name(".shopping_cart > a"), "shoppingCartAElement");
/// ```
#[must_use]
pub fn getter_name(selector: &str) -> String {
    let words: String = selector
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect();
    let mut chars = words.chars();
    let camel = chars.next().map_or_else(String::new, |first| {
        first.to_ascii_lowercase().to_string() + chars.as_str()
    });
    if camel.is_empty() {
        "element".to_string()
    } else {
        camel + "Element"
    }
}

/// JavaScript getters for every scanned locator
#[must_use]
pub fn render_getters(scan: &QuickScan, page_object_name: &str) -> String {
    let mut out = format!("\n// Generated methods for {page_object_name} (from Codegen)\n");
    for locator in &scan.locators {
        out.push_str(&format!(
            "\n  // Generated locator: {locator}\n  get {}() {{\n    return this.page.locator('{}');\n  }}\n",
            getter_name(locator),
            super::render::js_single_quoted(locator)
        ));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod target_tests {
        use super::*;

        #[test]
        fn test_urls() {
            let base = "http://www.automationpractice.pl/";
            assert_eq!(CodegenTarget::Homepage.url(base), "http://www.automationpractice.pl/");
            assert_eq!(
                CodegenTarget::from_name("women").url(base),
                "http://www.automationpractice.pl/index.php?id_category=3&controller=category"
            );
            assert_eq!(CodegenTarget::from_name("CART"), CodegenTarget::Cart);
        }

        #[test]
        fn test_unknown_falls_back_to_homepage() {
            assert_eq!(CodegenTarget::from_name("checkout"), CodegenTarget::Homepage);
        }
    }

    mod recorder_tests {
        use super::*;

        #[test]
        fn test_args() {
            let args = Recorder::new().args(
                "http://shop.test/",
                Some(Path::new("out/search-1.js")),
            );
            assert_eq!(
                args,
                vec![
                    "playwright",
                    "codegen",
                    "http://shop.test/",
                    "--target=javascript",
                    "--viewport-size=1280,720",
                    "--output=out/search-1.js",
                ]
            );
        }

        #[test]
        fn test_recording_path() {
            let path = recording_path(Path::new("rec"), "checkout", 1_700_000_000_000);
            assert_eq!(path, PathBuf::from("rec/checkout-1700000000000.js"));
        }

        #[tokio::test]
        async fn test_missing_program_is_process_error() {
            let recorder = Recorder::new().with_program("storeprobe-no-such-recorder");
            let err = recorder.record("http://shop.test", None).await.unwrap_err();
            assert!(matches!(err, StoreError::ProcessError { .. }));
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn test_collect_without_script_fails() {
            let dir = tempfile::tempdir().unwrap();
            let recorder = Recorder::new().with_program("true");
            let err = collect(&recorder, dir.path(), "http://shop.test", "s")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("recorder produced no script"));
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn test_failing_recorder() {
            let recorder = Recorder::new().with_program("false");
            let err = recorder.record("http://shop.test", None).await.unwrap_err();
            assert!(err.to_string().contains("exited with code"));
        }
    }

    mod scan_tests {
        use super::*;

        const CODE: &str = "await page.locator('#search_query_top').click();\n\
            await page.locator('#search_query_top').fill('dress');\n\
            await page.locator('.button-search').click();";

        #[test]
        fn test_quick_scan() {
            let scan = quick_scan(CODE);
            assert_eq!(scan.locators, vec!["#search_query_top", ".button-search"]);
            assert!(scan.has_clicks);
            assert!(scan.has_fills);
            assert_eq!(scan.code_length, CODE.len());
        }

        #[test]
        fn test_quick_scan_empty() {
            let scan = quick_scan("");
            assert!(scan.locators.is_empty());
            assert!(!scan.has_clicks && !scan.has_fills);
        }

        #[test]
        fn test_getter_names() {
            assert_eq!(getter_name("#SubmitLogin"), "submitLoginElement");
            assert_eq!(getter_name(".button-search"), "buttonSearchElement");
            assert_eq!(getter_name(">>"), "element");
        }

        #[test]
        fn test_render_getters() {
            let out = render_getters(&quick_scan(CODE), "HomePage");
            assert!(out.contains("// Generated methods for HomePage (from Codegen)"));
            assert!(out.contains("  get searchQueryTopElement() {\n    return this.page.locator('#search_query_top');\n  }"));
            assert_eq!(out.matches("get ").count(), 2);
        }
    }
}
