use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use repochat_pipeline::{ChatService, Orchestrator, PipelineError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state of the HTTP control surface
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// `None` when no answer generator is configured
    pub chat: Option<ChatService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
struct FileQuery {
    path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDependencies {
    file_path: String,
    dependencies: Vec<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/analyze/:id", post(trigger_analysis).delete(cancel_analysis))
        .route("/api/v1/analyze/:id/status", get(analysis_status))
        .route("/api/v1/analyze/:id/dependencies", get(dependency_graph))
        .route("/api/v1/analyze/:id/dependencies/file", get(file_dependencies))
        .route("/api/v1/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

pub(crate) fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let hint = match code {
        "already_running" => Some(
            "Poll GET /api/v1/analyze/{id}/status until the run finishes, or cancel it with DELETE."
                .to_string(),
        ),
        "chat_unavailable" => Some(
            "Start the server with --llm-url and --llm-model (or REPOCHAT_LLM_URL / REPOCHAT_LLM_MODEL)."
                .to_string(),
        ),
        "invalid_request" => Some("Send a JSON body of the form {\"query\": \"...\"}.".to_string()),
        _ => None,
    };

    let body = ErrorBody {
        error: ErrorEnvelope {
            code: code.to_string(),
            message,
            hint,
        },
    };
    (status, Json(body)).into_response()
}

async fn trigger_analysis(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.orchestrator.trigger(&id) {
        Ok(updates) => {
            log::info!("Analysis triggered for repository: {id}");
            let snapshot = updates.borrow().clone();
            (StatusCode::ACCEPTED, Json(snapshot)).into_response()
        }
        Err(err @ PipelineError::AlreadyRunning(_)) => {
            error_response(StatusCode::CONFLICT, "already_running", err.to_string())
        }
        Err(err) => {
            log::error!("Failed to trigger analysis for {id}: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
        }
    }
}

async fn analysis_status(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    Json(state.orchestrator.status(&id)).into_response()
}

async fn dependency_graph(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let graph = state.orchestrator.graph(&id);
    Json(graph.as_ref()).into_response()
}

async fn file_dependencies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<FileQuery>,
) -> Response {
    let dependencies = state.orchestrator.file_dependencies(&id, &query.path);
    Json(FileDependencies {
        file_path: query.path,
        dependencies,
    })
    .into_response()
}

async fn cancel_analysis(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    if state.orchestrator.cancel(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(
            StatusCode::NOT_FOUND,
            "not_running",
            format!("No running analysis for repository: {id}"),
        )
    }
}

async fn chat(State(state): State<Arc<AppState>>, Json(request): Json<ChatRequest>) -> Response {
    let Some(service) = state.chat.as_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "chat_unavailable",
            "No answer generator configured".to_string(),
        );
    };
    if request.query.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "query must be non-empty".to_string(),
        );
    }

    match service.chat(&request.query).await {
        Ok(response) => Json(ChatResponse { response }).into_response(),
        Err(err @ PipelineError::Generation(_)) => {
            log::warn!("Chat failed: {err}");
            error_response(StatusCode::BAD_GATEWAY, "generation_failed", err.to_string())
        }
        Err(err) => {
            log::error!("Chat failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
        }
    }
}

async fn health() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}
