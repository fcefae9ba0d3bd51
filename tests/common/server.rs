//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own session state.

use super::constants::*;
use super::fake_backends::{FakeGemini, FakeOEmbed};
use sonifai_server::config::{AppConfig, CliConfig};
use sonifai_server::server::{make_app, RequestsLoggingLevel};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance
///
/// When dropped, the server and its fake backends shut down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Fake model backend, present for online servers
    pub gemini: Option<FakeGemini>,

    /// Fake oEmbed endpoint, present for online servers
    pub oembed: Option<FakeOEmbed>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server without API key, answering with sample data immediately
    pub async fn spawn_offline() -> Self {
        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::None,
            no_metadata: true,
            offline_delay_ms: Some(0),
            ..Default::default()
        };
        Self::spawn_with(cli, None, None).await
    }

    /// Spawns a server wired to fresh fake Gemini and oEmbed backends
    pub async fn spawn_online() -> Self {
        let gemini = FakeGemini::spawn().await;
        let oembed = FakeOEmbed::spawn().await;
        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::None,
            api_key: Some(TEST_API_KEY.to_string()),
            model: TEST_MODEL.to_string(),
            api_base_url: gemini.base_url.clone(),
            request_timeout_sec: REQUEST_TIMEOUT_SECS,
            oembed_endpoint: oembed.endpoint.clone(),
            oembed_timeout_sec: 2,
            ..Default::default()
        };
        Self::spawn_with(cli, Some(gemini), Some(oembed)).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if configuration is invalid, port binding fails, or the
    /// server doesn't become ready within timeout.
    async fn spawn_with(
        cli: CliConfig,
        gemini: Option<FakeGemini>,
        oembed: Option<FakeOEmbed>,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let app_config = AppConfig::resolve(&CliConfig { port, ..cli }, None)
            .expect("Failed to resolve test config");
        let requester = Arc::new(app_config.build_requester());
        let metadata = app_config
            .build_metadata_fetcher()
            .expect("Failed to build metadata fetcher");
        let app = make_app(app_config.server_config(), requester, metadata);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            gemini,
            oembed,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    pub fn gemini(&self) -> &FakeGemini {
        self.gemini.as_ref().expect("Server was spawned offline")
    }

    pub fn oembed(&self) -> &FakeOEmbed {
        self.oembed.as_ref().expect("Server was spawned offline")
    }

    /// Waits for the server to become ready by polling the home route
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
