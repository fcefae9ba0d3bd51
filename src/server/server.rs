use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::services::ServeDir;
use tracing::info;

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{log_requests, metrics::metrics_handler, state::*, ServerConfig};
use crate::analysis::{apply_variation, Analysis, VariationParams};
use crate::metadata::MetadataFetcher;
use crate::requester::AnalysisRequester;
use crate::session::{AnalysisSession, SessionError, SessionSnapshot};
use crate::source::SourceClassification;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub offline: bool,
    pub model: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct SourceBody {
    pub source: String,
}

#[derive(Deserialize, Debug)]
struct VariationBody {
    pub analysis: Analysis,
    #[serde(default)]
    pub params: VariationParams,
}

#[derive(Deserialize, Debug)]
struct PromptBody {
    pub analysis: Analysis,
}

#[derive(Serialize)]
struct PromptResponse {
    prompt: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn session_error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::EmptySource | SessionError::InvalidVariation(_) => StatusCode::BAD_REQUEST,
        SessionError::Superseded { .. } => StatusCode::CONFLICT,
        SessionError::NoAnalysis => StatusCode::NOT_FOUND,
        SessionError::Analysis(_) | SessionError::Prompt(_) => StatusCode::BAD_GATEWAY,
    };
    error_response(status, err.to_string())
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        offline: state.requester.is_offline(),
        model: state.requester.model().map(String::from),
    };
    Json(stats)
}

async fn post_classify(Json(body): Json<SourceBody>) -> Json<SourceClassification> {
    Json(SourceClassification::of(body.source.trim()))
}

async fn post_variation(Json(body): Json<VariationBody>) -> Response {
    match body.params.validate() {
        Ok(()) => {
            // Out-of-range scores from clients get the same treatment as model output.
            let analysis = body.analysis.clamped();
            Json(apply_variation(&analysis, &body.params)).into_response()
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

async fn post_prompt(
    State(requester): State<GuardedRequester>,
    Json(body): Json<PromptBody>,
) -> Response {
    match requester.request_prompt(&body.analysis).await {
        Ok(prompt) => Json(PromptResponse { prompt }).into_response(),
        Err(err) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

async fn post_session_analyze(
    State(session): State<GuardedSession>,
    Json(body): Json<SourceBody>,
) -> Response {
    match session.analyze(&body.source).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => session_error_response(err),
    }
}

async fn get_session(State(session): State<GuardedSession>) -> Json<SessionSnapshot> {
    Json(session.snapshot())
}

async fn put_session_variation(
    State(session): State<GuardedSession>,
    Json(params): Json<VariationParams>,
) -> Response {
    match session.set_variation(params) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => session_error_response(err),
    }
}

async fn post_session_prompt(State(session): State<GuardedSession>) -> Response {
    match session.generate_prompt().await {
        Ok(prompt) => Json(PromptResponse { prompt }).into_response(),
        Err(err) => session_error_response(err),
    }
}

pub fn make_app(
    config: ServerConfig,
    requester: Arc<AnalysisRequester>,
    metadata: Option<Arc<dyn MetadataFetcher>>,
) -> Router {
    let session = Arc::new(AnalysisSession::new(requester.clone(), metadata));
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        requester,
        session,
    };

    let tool_routes: Router = Router::new()
        .route("/classify", post(post_classify))
        .route("/variation", post(post_variation))
        .route("/prompt", post(post_prompt))
        .with_state(state.clone());

    let session_routes: Router = Router::new()
        .route("/", get(get_session))
        .route("/analyze", post(post_session_analyze))
        .route("/variation", put(put_session_variation))
        .route("/prompt", post(post_session_prompt))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .route("/metrics", get(metrics_handler))
        .with_state(state.clone());

    let home_router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            home_router.fallback_service(static_files_service)
        }
        None => home_router,
    };

    let mut app: Router = home_router
        .nest("/v1", tool_routes)
        .nest("/v1/session", session_routes);

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

pub async fn run_server(
    config: ServerConfig,
    requester: Arc<AnalysisRequester>,
    metadata: Option<Arc<dyn MetadataFetcher>>,
) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, requester, metadata);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Ready to serve at {}!", address);

    Ok(axum::serve(listener, app).await?)
}
