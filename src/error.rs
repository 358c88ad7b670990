//! Error types for the smoke-test harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Fixture server failed to start: {0}")]
    ServerStartup(String),

    #[error("Fixture server not ready after {0} attempts")]
    ServerReadiness(usize),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Image heights differ for {name}: current {current} vs baseline {baseline}")]
    HeightMismatch {
        name: String,
        current: u32,
        baseline: u32,
    },

    #[error("Image widths differ for {name}: current {current} vs baseline {baseline}")]
    WidthMismatch {
        name: String,
        current: u32,
        baseline: u32,
    },

    #[error("Screenshot mismatch: {name}.png ({current_bytes} bytes) has {diff_pixels} differing pixel(s), {percent_different:.4}% different")]
    ScreenshotMismatch {
        name: String,
        current_bytes: u64,
        diff_pixels: u64,
        percent_different: f64,
    },

    #[error("Case timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type SmokeResult<T> = Result<T, SmokeError>;
