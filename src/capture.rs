//! Screenshot capture and lazy baseline materialization

use std::path::PathBuf;

use tracing::info;

use crate::browser::PageSession;
use crate::error::SmokeResult;
use crate::matrix::TestCase;

/// Captures the current screenshot for a case and materializes the
/// baseline on first run.
///
/// Current files are regenerated (overwritten) every run; a baseline,
/// once present, is never touched again by the harness.
pub struct ScreenshotCapturer {
    current_dir: PathBuf,
    baseline_dir: PathBuf,
}

impl ScreenshotCapturer {
    /// Create a capturer, ensuring both screenshot directories exist
    pub fn new(current_dir: PathBuf, baseline_dir: PathBuf) -> SmokeResult<Self> {
        std::fs::create_dir_all(&current_dir)?;
        std::fs::create_dir_all(&baseline_dir)?;
        Ok(Self {
            current_dir,
            baseline_dir,
        })
    }

    pub fn current_path(&self, file_name: &str) -> PathBuf {
        self.current_dir.join(format!("{file_name}.png"))
    }

    pub fn baseline_path(&self, file_name: &str) -> PathBuf {
        self.baseline_dir.join(format!("{file_name}.png"))
    }

    /// Navigate the session to the case's route, persist the screenshot
    /// under the current directory, and copy it to the baseline
    /// directory if no baseline exists yet. Returns the derived file
    /// name used as the comparison key.
    pub async fn capture(&self, session: &PageSession, case: &TestCase) -> SmokeResult<String> {
        let file_name = case.file_name();
        let current = self.current_path(&file_name);

        info!("smoke testing page {}", session.url_for(&case.route));
        info!("taking screenshot {} -> {}", file_name, current.display());
        session.goto_and_screenshot(&case.route, &current).await?;

        self.ensure_baseline(&file_name)?;

        Ok(file_name)
    }

    /// Materialize the baseline from the current screenshot if none
    /// exists yet - a copy of the same rendered frame, not a second
    /// render. An existing baseline is never touched. Returns whether
    /// a baseline was created.
    pub fn ensure_baseline(&self, file_name: &str) -> SmokeResult<bool> {
        let baseline = self.baseline_path(file_name);
        if baseline.exists() {
            return Ok(false);
        }
        info!("no baseline for {file_name}, creating one from this run's screenshot");
        std::fs::copy(self.current_path(file_name), baseline)?;
        Ok(true)
    }
}
