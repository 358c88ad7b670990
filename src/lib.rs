//! Visual-regression smoke-test harness
//!
//! Serves a local build of a web application over loopback, drives a
//! headless browser to each configured route at each configured
//! viewport size, captures screenshots, and pixel-diffs them against
//! stored baselines. A missing baseline is created from the first run;
//! any pixel difference beyond the configured threshold fails that
//! case.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     SmokeRunner                            │
//! │   ├── FixtureServer     static assets on 127.0.0.1:4444    │
//! │   ├── matrix::expand    browsers x formats x routes        │
//! │   └── per case (fresh browser each):                       │
//! │         ├── ScreenshotCapturer   viewport, goto, persist   │
//! │         └── ScreenshotComparator decode both, dims, diff   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cases run sequentially and fail independently; the only intra-case
//! concurrency is the comparator decoding the current and baseline
//! images in parallel.

pub mod browser;
pub mod capture;
pub mod compare;
pub mod config;
pub mod error;
pub mod matrix;
pub mod runner;
pub mod server;

pub use browser::{BrowserEngine, PageSession};
pub use capture::ScreenshotCapturer;
pub use compare::{PixelDiff, ScreenshotComparator};
pub use config::{CompareSettings, ScreenFormat, SuiteConfig};
pub use error::{SmokeError, SmokeResult};
pub use matrix::TestCase;
pub use runner::{CaseResult, SmokeRunner, SuiteResult};
pub use server::FixtureServer;
