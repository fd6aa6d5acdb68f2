//! Axum handlers and router wiring.
//!
//! # Design
//! Handlers do edge work only: parse path ids and wire strings, enforce
//! the request validation order, and shape response envelopes. Every
//! decision about the collection itself lives in `TodoStore`, reached
//! through one `Arc<RwLock<_>>` boundary so read-modify-write sequences
//! (id allocation, delete-and-report) stay atomic under the
//! multi-threaded runtime.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{debug, error, info};

use crate::config;
use crate::error::ApiError;
use crate::store::{validate_text, TodoStore};
use crate::types::{
    BulkDeleteQuery, BulkDeleteResponse, CreateTodo, ListQuery, ListResponse, Priority,
    StatsResponse, TaskResponse, TodoPatch, UpdateTodo,
};

/// Shared handler state: the store plus process metadata for `/api/health`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<TodoStore>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(TodoStore::new())),
            started_at: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the router with a fresh, empty store.
pub fn app() -> Router {
    Router::new()
        .route("/", get(root_info))
        .route("/api/health", get(health))
        .route(
            "/api/todos",
            get(list_todos).post(create_todo).delete(delete_todos),
        )
        .route("/api/todos/stats", get(stats))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(AppState::new())
}

/// Map a panic anywhere in the handling path to the structured 500
/// envelope instead of a torn-down connection. Detail exposure follows
/// the same production gate as every other internal error.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(%detail, "handler panicked");
    ApiError::Internal(detail).into_response()
}

/// Path ids are parsed leniently: a non-numeric id is "not found", never
/// a client error and never a crash.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>().map_err(|_| ApiError::NotFound)
}

/// Parse a priority field from a request body. Unlike the list filter
/// this is strict: an unrecognized value is rejected.
fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) => Priority::parse(s).map(Some).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "Priority must be one of: low, medium, high (got \"{s}\")"
            ))
        }),
    }
}

async fn root_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "In-memory todo list API",
        "endpoints": {
            "health": "GET /api/health",
            "list": "GET /api/todos",
            "get": "GET /api/todos/:id",
            "create": "POST /api/todos",
            "update": "PUT /api/todos/:id",
            "delete": "DELETE /api/todos/:id",
            "deleteAll": "DELETE /api/todos",
            "stats": "GET /api/todos/stats",
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "environment": config::environment(),
    }))
}

async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse> {
    let filter = query.into_filter();
    let store = state.store.read().await;
    let (data, total) = store.list(&filter);
    Json(ListResponse {
        success: true,
        count: data.len(),
        total,
        data,
    })
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_id(&id)?;
    let store = state.store.read().await;
    let task = store.get(id)?;
    Ok(Json(TaskResponse {
        success: true,
        data: task,
        message: None,
    }))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    // Validation order: empty text, text length, then priority.
    let text = validate_text(input.text.as_deref().unwrap_or(""))?;
    let priority = parse_priority(input.priority.as_deref())?.unwrap_or_default();
    let task = state.store.write().await.create(text, priority);
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            success: true,
            data: task,
            message: Some("Todo created successfully".to_string()),
        }),
    ))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_id(&id)?;
    let mut store = state.store.write().await;
    // Existence is checked before field validation, so a bad patch
    // against a missing id reports 404, not 400.
    if !store.contains(id) {
        return Err(ApiError::NotFound);
    }
    let patch = TodoPatch {
        text: input.text.as_deref().map(validate_text).transpose()?,
        completed: input.completed,
        priority: parse_priority(input.priority.as_deref())?,
    };
    let task = store.update(id, patch)?;
    Ok(Json(TaskResponse {
        success: true,
        data: task,
        message: Some("Todo updated successfully".to_string()),
    }))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_id(&id)?;
    let task = state.store.write().await.delete(id)?;
    Ok(Json(TaskResponse {
        success: true,
        data: task,
        message: Some("Todo deleted successfully".to_string()),
    }))
}

async fn delete_todos(
    State(state): State<AppState>,
    Query(query): Query<BulkDeleteQuery>,
) -> Json<BulkDeleteResponse> {
    let completed = query.completed.map(|s| s == "true");
    let deleted_count = state.store.write().await.delete_all(completed);
    info!(deleted_count, filtered = completed.is_some(), "bulk delete");
    let message = match completed {
        Some(true) => format!("{deleted_count} completed todos deleted"),
        Some(false) => format!("{deleted_count} active todos deleted"),
        None => format!("All todos deleted ({deleted_count} total)"),
    };
    Json(BulkDeleteResponse {
        success: true,
        message,
        deleted_count,
    })
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.store.read().await;
    Json(StatsResponse {
        success: true,
        data: store.stats(),
    })
}

async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    debug!(path = %uri.path(), "unmatched route");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.path(),
        })),
    )
}
