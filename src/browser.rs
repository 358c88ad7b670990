//! Playwright browser automation
//!
//! Each test case gets its own short-lived browser: a generated Node.js
//! script launches the engine headless with the case's viewport,
//! navigates, screenshots, and closes the browser again. A crashed or
//! hung page in one case cannot leak state into another.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::config::ScreenFormat;
use crate::error::{SmokeError, SmokeResult};

/// The browser engines Playwright can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserEngine {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserEngine {
    /// Map a configured browser name to an engine. Recognized names
    /// select their engine; anything else is a pure label that runs on
    /// Chromium.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "firefox" => Self::Firefox,
            "webkit" | "safari" => Self::Webkit,
            _ => Self::Chromium,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

/// Check that Playwright is installed before the suite runs
pub fn check_playwright_installed() -> SmokeResult<()> {
    let status = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(SmokeError::PlaywrightNotFound),
    }
}

/// Result line emitted by the generated script on failure
#[derive(Debug, Deserialize)]
struct ScriptOutcome {
    #[allow(dead_code)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Browser session scoped to a single test case: one engine, one
/// viewport, one base URL
pub struct PageSession {
    engine: BrowserEngine,
    viewport_width: u32,
    viewport_height: u32,
    base_url: String,
}

impl PageSession {
    pub fn new(engine: BrowserEngine, format: &ScreenFormat, base_url: &str) -> Self {
        Self {
            engine,
            viewport_width: format.width,
            viewport_height: format.height,
            base_url: base_url.to_string(),
        }
    }

    /// The full URL the session navigates to for a route
    pub fn url_for(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// Launch a fresh browser, navigate to the route at this session's
    /// viewport, and persist a screenshot to `out_path`
    pub async fn goto_and_screenshot(&self, route: &str, out_path: &Path) -> SmokeResult<()> {
        let script = self.script_for(route, out_path)?;
        run_script(&script).await
    }

    /// Render the case script. The screenshot path is anchored to the
    /// harness working directory first; the node process must never
    /// resolve it against its own cwd.
    fn script_for(&self, route: &str, out_path: &Path) -> SmokeResult<String> {
        Ok(self.build_script(route, &absolutize(out_path)?))
    }

    fn build_script(&self, route: &str, out_path: &Path) -> String {
        format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {engine}.launch({{ headless: true }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();

  try {{
    await page.goto({url});
    await page.screenshot({{ path: {out} }});
    console.log(JSON.stringify({{ success: true }}));
  }} catch (error) {{
    console.error(JSON.stringify({{ success: false, error: error.message }}));
    process.exit(1);
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            engine = self.engine.as_str(),
            width = self.viewport_width,
            height = self.viewport_height,
            url = js_string(&self.url_for(route)),
            out = js_string(&out_path.to_string_lossy()),
        )
    }
}

/// Resolve a possibly-relative screenshot path against the harness
/// working directory
fn absolutize(path: &Path) -> SmokeResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Embed a value as a JavaScript string literal. JSON string syntax is
/// valid JS, so quotes and backslashes in routes and paths survive.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Write the script to a scratch directory and execute it with node
async fn run_script(script: &str) -> SmokeResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let script_path = temp_dir.path().join("case.js");
    std::fs::write(&script_path, script)?;

    debug!("running browser script: {}", script_path.display());

    let output = TokioCommand::new("node").arg(&script_path).output().await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find_map(|line| serde_json::from_str::<ScriptOutcome>(line).ok())
            .and_then(|outcome| outcome.error)
            .unwrap_or_else(|| stderr.trim().to_string());
        return Err(SmokeError::Browser(reason));
    }

    Ok(())
}
