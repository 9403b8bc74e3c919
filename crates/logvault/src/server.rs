use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use logvault_core::config::Config;
use logvault_core::error::LogVaultError;
use logvault_core::model::{LogEntry, Project, ProjectSpec};
use logvault_core::query::{
    AiRequest, AiResponse, DeleteProjectResponse, IngestResponse, LogQuery, LogQueryResponse,
    StatusResponse, parse_levels,
};
use logvault_ingest::CoordinatorConfig;
use logvault_store::Store;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use uuid::Uuid;

use crate::ai;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub cfg: Arc<Config>,
    pub http: reqwest::Client,
}

pub fn router(store: Store, cfg: Config) -> Router {
    let state = AppState {
        store: Arc::new(store),
        cfg: Arc::new(cfg),
        http: reqwest::Client::new(),
    };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status))
        .route("/v1/projects", get(list_projects).post(create_project))
        .route(
            "/v1/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/v1/projects/{id}/logs", get(query_logs).post(ingest_logs))
        .route("/v1/ai/summarize", post(ai_summarize))
        .route("/v1/ai/scan", post(ai_scan))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Maps the error taxonomy onto HTTP statuses; every error body carries a
/// machine-readable kind and a human-readable detail.
pub struct ApiError(LogVaultError);

impl From<LogVaultError> for ApiError {
    fn from(err: LogVaultError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            LogVaultError::Validation(_) | LogVaultError::Parse(_) => {
                (StatusCode::BAD_REQUEST, "validation")
            }
            LogVaultError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            LogVaultError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "config"),
            LogVaultError::Store(_) => (StatusCode::BAD_GATEWAY, "store"),
            LogVaultError::CascadeDelete(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "cascade_delete")
            }
            LogVaultError::Io(_) | LogVaultError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        let body = Json(serde_json::json!({
            "error": kind,
            "detail": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(state.store.status()?))
}

async fn ingest_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    // validate shape before touching the store
    let logs = body
        .get("logs")
        .ok_or_else(|| LogVaultError::Validation("missing logs field".to_string()))?;
    let logs = logs
        .as_array()
        .ok_or_else(|| LogVaultError::Validation("logs must be an array".to_string()))?;
    if logs.is_empty() {
        return Err(LogVaultError::Validation("logs must be a non-empty list".to_string()).into());
    }
    let entries: Vec<LogEntry> = serde_json::from_value(serde_json::Value::Array(logs.clone()))
        .map_err(|e| LogVaultError::Validation(format!("malformed log entries: {e}")))?;

    let coordinator_cfg = CoordinatorConfig {
        parallelism: state.cfg.ingest_parallelism,
        batch_timeout: state.cfg.batch_timeout,
    };
    let count = logvault_ingest::ingest_logs(
        Arc::clone(&state.store),
        &id,
        entries,
        state.cfg.batch_size,
        coordinator_cfg,
    )
    .await?;
    Ok(Json(IngestResponse { count }))
}

#[derive(Debug, Deserialize)]
struct LogQueryParams {
    level: Option<String>,
    search: Option<String>,
    start: Option<String>,
    end: Option<String>,
    limit: Option<usize>,
    skip: Option<usize>,
}

async fn query_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LogQueryParams>,
) -> Result<Json<LogQueryResponse>, ApiError> {
    let query = LogQuery {
        project_id: id,
        levels: params.level.as_deref().and_then(parse_levels),
        search: params.search.filter(|s| !s.is_empty()),
        start: params.start.filter(|s| !s.is_empty()),
        end: params.end.filter(|s| !s.is_empty()),
        limit: params.limit.unwrap_or(state.cfg.query_default_limit),
        skip: params.skip.unwrap_or(0),
    };
    Ok(Json(state.store.query_logs(&query)?))
}

async fn create_project(
    State(state): State<AppState>,
    Json(spec): Json<ProjectSpec>,
) -> Result<Json<Project>, ApiError> {
    if spec.name.trim().is_empty() {
        return Err(LogVaultError::Validation("project name is required".to_string()).into());
    }
    let project = spec.into_project(Uuid::new_v4().to_string());
    state.store.insert_project(&project)?;
    Ok(Json(project))
}

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.store.list_projects()?))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .store
        .get_project(&id)?
        .ok_or_else(|| LogVaultError::NotFound(format!("project {id}")))?;
    Ok(Json(project))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(spec): Json<ProjectSpec>,
) -> Result<Json<Project>, ApiError> {
    if spec.name.trim().is_empty() {
        return Err(LogVaultError::Validation("project name is required".to_string()).into());
    }
    Ok(Json(state.store.update_project(&id, spec)?))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteProjectResponse>, ApiError> {
    let logs_deleted = state.store.delete_project(&id)?;
    Ok(Json(DeleteProjectResponse {
        success: true,
        logs_deleted,
    }))
}

async fn ai_summarize(
    State(state): State<AppState>,
    Json(req): Json<AiRequest>,
) -> Result<Json<AiResponse>, ApiError> {
    Ok(Json(ai::summarize(&state.http, &state.cfg, req).await?))
}

async fn ai_scan(
    State(state): State<AppState>,
    Json(req): Json<AiRequest>,
) -> Result<Json<AiResponse>, ApiError> {
    Ok(Json(ai::scan(&state.http, &state.cfg, req).await?))
}
