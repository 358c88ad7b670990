//! Fixture server - serves the built application's static assets over
//! loopback for the duration of the suite

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{SmokeError, SmokeResult};

const READINESS_ATTEMPTS: usize = 50;
const READINESS_INTERVAL: Duration = Duration::from_millis(100);

/// Static-file server bound to a fixed loopback port.
///
/// Exactly one instance runs for the full suite lifetime: started once
/// before any case, stopped once after all cases. `start` on a running
/// server and `stop` on a stopped (or never-started) server are no-ops.
pub struct FixtureServer {
    static_dir: PathBuf,
    port: u16,
    running: Option<Running>,
}

struct Running {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl FixtureServer {
    pub fn new(static_dir: PathBuf, port: u16) -> Self {
        Self {
            static_dir,
            port,
            running: None,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port)
    }

    /// Bind the loopback port, spawn the serve loop, and wait until the
    /// server answers requests
    pub async fn start(&mut self) -> SmokeResult<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            SmokeError::ServerStartup(format!("failed to bind {addr}: {e}"))
        })?;

        let app = Router::new()
            .fallback_service(ServeDir::new(&self.static_dir))
            .layer(TraceLayer::new_for_http());

        let (shutdown, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = serve.await {
                warn!("fixture server exited with error: {e}");
            }
        });

        self.running = Some(Running { shutdown, task });
        self.wait_until_ready().await?;

        info!(
            "fixture server serving {} at {}",
            self.static_dir.display(),
            self.base_url()
        );
        Ok(())
    }

    /// Poll the base URL until the server answers. Any HTTP response
    /// counts as ready; only connection failures are retried.
    async fn wait_until_ready(&self) -> SmokeResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;
        let url = self.base_url();

        for attempt in 1..=READINESS_ATTEMPTS {
            match client.get(&url).send().await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    if attempt == 1 {
                        info!("waiting for fixture server to start...");
                    }
                    // Connection refused is expected while the listener task spins up
                    if !e.is_connect() {
                        warn!("fixture server probe error: {e}");
                    }
                }
            }
            sleep(READINESS_INTERVAL).await;
        }

        Err(SmokeError::ServerReadiness(READINESS_ATTEMPTS))
    }

    /// Release the port. Safe to call when never started.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            info!("stopping fixture server");
            let _ = running.shutdown.send(());
            let _ = running.task.await;
        }
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(());
            running.task.abort();
        }
    }
}
