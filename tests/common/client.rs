//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server route.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Home & Metrics
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.client.get(self.url("/")).send().await.unwrap()
    }

    pub async fn get_metrics(&self) -> Response {
        self.client.get(self.url("/metrics")).send().await.unwrap()
    }

    // ========================================================================
    // Stateless Tools
    // ========================================================================

    pub async fn classify(&self, source: &str) -> Response {
        self.client
            .post(self.url("/v1/classify"))
            .json(&json!({ "source": source }))
            .send()
            .await
            .unwrap()
    }

    pub async fn vary(&self, analysis: &Value, params: Value) -> Response {
        self.client
            .post(self.url("/v1/variation"))
            .json(&json!({ "analysis": analysis, "params": params }))
            .send()
            .await
            .unwrap()
    }

    pub async fn prompt(&self, analysis: &Value) -> Response {
        self.client
            .post(self.url("/v1/prompt"))
            .json(&json!({ "analysis": analysis }))
            .send()
            .await
            .unwrap()
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn analyze(&self, source: &str) -> Response {
        self.client
            .post(self.url("/v1/session/analyze"))
            .json(&json!({ "source": source }))
            .send()
            .await
            .unwrap()
    }

    pub async fn get_session(&self) -> Response {
        self.client
            .get(self.url("/v1/session"))
            .send()
            .await
            .unwrap()
    }

    pub async fn set_variation(&self, tempo: i32, key: i32, energy: i32) -> Response {
        self.client
            .put(self.url("/v1/session/variation"))
            .json(&json!({ "tempo": tempo, "key": key, "energy": energy }))
            .send()
            .await
            .unwrap()
    }

    pub async fn session_prompt(&self) -> Response {
        self.client
            .post(self.url("/v1/session/prompt"))
            .send()
            .await
            .unwrap()
    }
}
