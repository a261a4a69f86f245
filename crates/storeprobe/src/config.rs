//! Project configuration (`storeprobe.yaml`).
//!
//! Every key is optional; a missing file means defaults.

use crate::browser::BrowserConfig;
use crate::result::StoreResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "storeprobe.yaml";

/// Browser viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Settings shared by the journey runner and the locator tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storefront root
    pub base_url: String,
    /// Run Chromium without a window
    pub headless: bool,
    /// Browser viewport
    pub viewport: Viewport,
    /// Where recorded scripts and per-session reports live
    pub locator_dir: PathBuf,
    /// Where consolidated reports are written
    pub report_dir: PathBuf,
    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// Optional JSON file with journey inputs
    pub test_data: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.automationpractice.pl".to_string(),
            headless: true,
            viewport: Viewport::default(),
            locator_dir: PathBuf::from(".github/CodeGenLocator"),
            report_dir: PathBuf::from("locator-reports"),
            navigation_timeout_ms: 30_000,
            test_data: None,
        }
    }
}

impl StoreConfig {
    /// Parse YAML text
    pub fn from_yaml(yaml: &str) -> StoreResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Read a YAML file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given, else `storeprobe.yaml` when present, else
    /// defaults
    pub fn discover(path: Option<&Path>) -> StoreResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Browser launch settings derived from this config
    #[must_use]
    pub fn browser_config(&self) -> BrowserConfig {
        BrowserConfig::default()
            .with_headless(self.headless)
            .with_viewport(self.viewport.width, self.viewport.height)
            .with_navigation_timeout(Duration::from_millis(self.navigation_timeout_ms))
    }
}
