//! Suite configuration, loadable from YAML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SmokeResult;

/// A named viewport size. The name is used in generated file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenFormat {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl ScreenFormat {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }
}

/// Tolerances applied by the comparator. Both values are empirically
/// chosen for cross-machine rendering noise; they are settings, not
/// hard-coded constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompareSettings {
    /// Per-channel similarity threshold on a 0-1 scale. A pixel counts
    /// as different only when some channel delta exceeds this.
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Number of outermost rows/columns excluded from the diff region.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: u32,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            edge_margin: default_edge_margin(),
        }
    }
}

fn default_threshold() -> f32 {
    0.2
}

fn default_edge_margin() -> u32 {
    1
}

/// Configuration for a full smoke suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Routes to smoke test, e.g. `["", "app/employee/34/details"]`.
    /// Required; an empty list yields zero test cases.
    pub routes: Vec<String>,

    /// Viewport sizes tested for each route
    #[serde(default = "default_screen_formats")]
    pub screen_formats: Vec<ScreenFormat>,

    /// Browser names tested for each route/format pair
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,

    /// Base URL prefixed before each route. Defaults to the loopback
    /// address on the fixture server's port.
    #[serde(default)]
    pub app_url: Option<String>,

    /// Build output directory served by the fixture server
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Fixture server port. Only change this on a port 4444 conflict.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory for screenshots captured this run (overwritten each run)
    #[serde(default = "default_current_dir")]
    pub current_dir: PathBuf,

    /// Directory for baseline screenshots (created once, never overwritten)
    #[serde(default = "default_baseline_dir")]
    pub baseline_dir: PathBuf,

    #[serde(default)]
    pub compare: CompareSettings,

    /// Deadline for one capture+compare case, covering browser launch
    /// and navigation latency
    #[serde(default = "default_case_timeout_ms")]
    pub case_timeout_ms: u64,

    /// Directory for the suite-result JSON artifact
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_screen_formats() -> Vec<ScreenFormat> {
    vec![
        ScreenFormat::new("wide", 800, 600),
        ScreenFormat::new("narrow", 375, 667),
    ]
}

fn default_browsers() -> Vec<String> {
    vec!["chrome".to_string()]
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_port() -> u16 {
    4444
}

fn default_current_dir() -> PathBuf {
    PathBuf::from("test/integration/screenshots-current")
}

fn default_baseline_dir() -> PathBuf {
    PathBuf::from("test/integration/screenshots-baseline")
}

fn default_case_timeout_ms() -> u64 {
    10_000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("test-results")
}

impl SuiteConfig {
    /// Create a configuration with the given routes and defaults for
    /// everything else
    pub fn new(routes: Vec<String>) -> Self {
        Self {
            routes,
            screen_formats: default_screen_formats(),
            browsers: default_browsers(),
            app_url: None,
            static_dir: default_static_dir(),
            port: default_port(),
            current_dir: default_current_dir(),
            baseline_dir: default_baseline_dir(),
            compare: CompareSettings::default(),
            case_timeout_ms: default_case_timeout_ms(),
            output_dir: default_output_dir(),
        }
    }

    /// Parse a suite configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> SmokeResult<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.normalize();
        Ok(config)
    }

    /// Parse a suite configuration from a YAML file
    pub fn from_file(path: &Path) -> SmokeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Replace empty browser/format lists with the documented defaults.
    /// Routes are left alone: an empty route list is a valid degenerate
    /// suite with zero cases.
    pub fn normalize(&mut self) {
        if self.browsers.is_empty() {
            self.browsers = default_browsers();
        }
        if self.screen_formats.is_empty() {
            self.screen_formats = default_screen_formats();
        }
    }

    /// The URL prefixed before each route
    pub fn base_url(&self) -> String {
        self.app_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/", self.port))
    }

    pub fn case_timeout(&self) -> Duration {
        Duration::from_millis(self.case_timeout_ms)
    }
}
