//! In-process stand-ins for the Gemini API and the oEmbed endpoint
//!
//! Each fake binds to a random local port and records what it receives,
//! so tests can assert on outgoing requests as well as on responses.

use super::constants::*;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the fake model answers with
#[derive(Clone, Debug)]
pub enum FakeReply {
    /// 200 with a single candidate carrying this text
    Text(String),
    /// Non-success HTTP status with a plain body
    Status(u16),
}

impl FakeReply {
    pub fn text(text: &str) -> Self {
        FakeReply::Text(text.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct RecordedGeneration {
    pub model_call: String,
    pub api_key: Option<String>,
    pub body: Value,
}

impl RecordedGeneration {
    pub fn prompt_text(&self) -> &str {
        self.body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
    }

    pub fn is_structured(&self) -> bool {
        self.body["generationConfig"].get("responseSchema").is_some()
    }
}

struct GeminiScript {
    analysis_reply: FakeReply,
    prompt_reply: FakeReply,
    requests: Vec<RecordedGeneration>,
}

#[derive(Clone)]
struct GeminiState(Arc<Mutex<GeminiScript>>);

/// Fake `models/{model}:generateContent` endpoint
///
/// Structured requests (carrying a response schema) get the analysis reply,
/// plain text requests get the prompt reply.
pub struct FakeGemini {
    pub base_url: String,
    state: GeminiState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeGemini {
    pub async fn spawn() -> Self {
        let state = GeminiState(Arc::new(Mutex::new(GeminiScript {
            analysis_reply: FakeReply::text(ANALYSIS_REPLY),
            prompt_reply: FakeReply::text(PROMPT_REPLY),
            requests: Vec::new(),
        })));

        let app = Router::new()
            .route("/models/{call}", post(generate_content))
            .with_state(state.clone());
        let (base_url, shutdown_tx) = serve(app).await;

        Self {
            base_url,
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn set_analysis_reply(&self, reply: FakeReply) {
        self.state.0.lock().unwrap().analysis_reply = reply;
    }

    pub fn set_prompt_reply(&self, reply: FakeReply) {
        self.state.0.lock().unwrap().prompt_reply = reply;
    }

    pub fn requests(&self) -> Vec<RecordedGeneration> {
        self.state.0.lock().unwrap().requests.clone()
    }
}

impl Drop for FakeGemini {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn generate_content(
    State(state): State<GeminiState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let recorded = RecordedGeneration {
        model_call: call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    };
    let reply = {
        let mut script = state.0.lock().unwrap();
        let reply = if recorded.is_structured() {
            script.analysis_reply.clone()
        } else {
            script.prompt_reply.clone()
        };
        script.requests.push(recorded);
        reply
    };

    match reply {
        FakeReply::Text(text) => Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 10,
                "candidatesTokenCount": 20,
                "totalTokenCount": 30
            }
        }))
        .into_response(),
        FakeReply::Status(status) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "fake backend failure",
        )
            .into_response(),
    }
}

#[derive(Default)]
struct OEmbedScript {
    available: bool,
    requested_urls: Vec<String>,
}

#[derive(Clone)]
struct OEmbedState(Arc<Mutex<OEmbedScript>>);

/// Fake oEmbed endpoint knowing a single video
pub struct FakeOEmbed {
    pub endpoint: String,
    state: OEmbedState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeOEmbed {
    pub async fn spawn() -> Self {
        let state = OEmbedState(Arc::new(Mutex::new(OEmbedScript {
            available: true,
            requested_urls: Vec::new(),
        })));

        let app = Router::new()
            .route("/oembed", get(oembed))
            .with_state(state.clone());
        let (base_url, shutdown_tx) = serve(app).await;

        Self {
            endpoint: format!("{}/oembed", base_url),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Makes every lookup fail with 503
    pub fn set_unavailable(&self) {
        self.state.0.lock().unwrap().available = false;
    }

    /// The `url` query parameters received so far
    pub fn requested_urls(&self) -> Vec<String> {
        self.state.0.lock().unwrap().requested_urls.clone()
    }
}

impl Drop for FakeOEmbed {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn oembed(
    State(state): State<OEmbedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let url = params.get("url").cloned().unwrap_or_default();
    let available = {
        let mut script = state.0.lock().unwrap();
        script.requested_urls.push(url.clone());
        script.available
    };

    if !available {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if params.get("format").map(String::as_str) != Some("json") || !url.contains(VIDEO_ID) {
        return StatusCode::NOT_FOUND.into_response();
    }

    Json(json!({
        "title": VIDEO_TITLE,
        "author_name": VIDEO_AUTHOR,
        "type": "video",
        "provider_name": "YouTube"
    }))
    .into_response()
}

async fn serve(app: Router) -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Fake backend failed");
    });

    (format!("http://127.0.0.1:{}", port), shutdown_tx)
}
