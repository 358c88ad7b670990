//! Suite orchestration - wires the fixture server and per-case browser
//! lifecycle around the test matrix

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::browser::{check_playwright_installed, BrowserEngine, PageSession};
use crate::capture::ScreenshotCapturer;
use crate::compare::{PixelDiff, ScreenshotComparator};
use crate::config::SuiteConfig;
use crate::error::{SmokeError, SmokeResult};
use crate::matrix::{self, TestCase};
use crate::server::FixtureServer;

/// Result of one test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub browser: String,
    pub format: String,
    pub route: String,
    pub file_name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub diff: Option<PixelDiff>,
    pub error: Option<String>,
}

/// Result of one full suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

/// Drives the suite: global setup, one sequential pass over the test
/// matrix with a fresh browser per case, global teardown.
///
/// A failed, crashed, or timed-out case never aborts the remaining
/// matrix; there are no retries anywhere.
pub struct SmokeRunner {
    config: SuiteConfig,
    server: FixtureServer,
}

impl SmokeRunner {
    pub fn new(mut config: SuiteConfig) -> Self {
        config.normalize();
        let server = FixtureServer::new(config.static_dir.clone(), config.port);
        Self { config, server }
    }

    /// Run every case in the matrix and return the tallied results
    pub async fn run(&mut self) -> SmokeResult<SuiteResult> {
        check_playwright_installed()?;

        let capturer = ScreenshotCapturer::new(
            self.config.current_dir.clone(),
            self.config.baseline_dir.clone(),
        )?;
        let comparator = ScreenshotComparator::new(
            self.config.current_dir.clone(),
            self.config.baseline_dir.clone(),
            self.config.compare,
        );

        self.server.start().await?;

        let cases = matrix::expand(
            &self.config.browsers,
            &self.config.screen_formats,
            &self.config.routes,
        );
        info!("running {} smoke case(s)...", cases.len());

        let start = Instant::now();
        let mut results = Vec::with_capacity(cases.len());
        let mut passed = 0;
        let mut failed = 0;

        for case in &cases {
            let result = self.run_case(case, &capturer, &comparator).await;
            if result.passed {
                passed += 1;
                info!("✓ {} ({} ms)", result.file_name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.file_name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        self.server.stop().await;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "smoke results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteResult {
            total: cases.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Run one case under the per-case deadline. Each case gets its own
    /// browser instance; all failures stay local to the case.
    async fn run_case(
        &self,
        case: &TestCase,
        capturer: &ScreenshotCapturer,
        comparator: &ScreenshotComparator,
    ) -> CaseResult {
        let start = Instant::now();
        let file_name = case.file_name();

        let outcome = tokio::time::timeout(
            self.config.case_timeout(),
            self.capture_and_compare(case, capturer, comparator),
        )
        .await;

        let (passed, diff, case_error) = match outcome {
            Ok(Ok(diff)) => (true, Some(diff), None),
            Ok(Err(e)) => (false, None, Some(e.to_string())),
            Err(_) => (
                false,
                None,
                Some(SmokeError::Timeout(file_name.clone()).to_string()),
            ),
        };

        CaseResult {
            browser: case.browser.clone(),
            format: case.format.name.clone(),
            route: case.route.clone(),
            file_name,
            passed,
            duration_ms: start.elapsed().as_millis() as u64,
            diff,
            error: case_error,
        }
    }

    async fn capture_and_compare(
        &self,
        case: &TestCase,
        capturer: &ScreenshotCapturer,
        comparator: &ScreenshotComparator,
    ) -> SmokeResult<PixelDiff> {
        let engine = BrowserEngine::from_name(&case.browser);
        let session = PageSession::new(engine, &case.format, &self.config.base_url());

        let file_name = capturer.capture(&session, case).await?;
        comparator.compare(&file_name).await
    }

    /// Write suite results to a JSON artifact under the output directory
    pub fn write_results(&self, results: &SuiteResult) -> SmokeResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("smoke-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_result_round_trips_through_json() {
        let result = SuiteResult {
            total: 1,
            passed: 1,
            failed: 0,
            duration_ms: 42,
            results: vec![CaseResult {
                browser: "chrome".to_string(),
                format: "wide".to_string(),
                route: String::new(),
                file_name: "chrome_wide_index".to_string(),
                passed: true,
                duration_ms: 42,
                diff: Some(PixelDiff {
                    diff_pixels: 0,
                    percent_different: 0.0,
                    used_pixels: 81,
                    current_bytes: 1024,
                }),
                error: None,
            }],
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: SuiteResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total, 1);
        assert_eq!(parsed.results[0].file_name, "chrome_wide_index");
        assert!(parsed.results[0].passed);
    }
}
