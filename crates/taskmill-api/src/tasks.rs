// Task HTTP routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use taskmill_contracts::{SubmitTaskRequest, Task, TaskPriority};
use taskmill_core::TaskScheduler;
use utoipa::ToSchema;
use uuid::Uuid;

/// App state shared across task routes
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<TaskScheduler>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { error: msg.into() })
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/tasks", get(list_tasks).post(submit_task))
        .route("/v1/tasks/:task_id", get(get_task))
        .with_state(state)
}

/// POST /v1/tasks - Submit a new task
#[utoipa::path(
    post,
    path = "/v1/tasks",
    request_body = SubmitTaskRequest,
    responses(
        (status = 202, description = "Task accepted for execution", body = Task),
        (status = 400, description = "Invalid priority", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn submit_task(
    State(state): State<AppState>,
    Json(req): Json<SubmitTaskRequest>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, Json<ErrorResponse>)> {
    // Reject bad priorities before the scheduler is touched.
    let priority: TaskPriority = req
        .priority
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, ErrorResponse::new(e)))?;

    let task = state.scheduler.submit_task(priority, req.payload).await;
    Ok((StatusCode::ACCEPTED, Json(task)))
}

/// GET /v1/tasks/{task_id} - Get a task by id
#[utoipa::path(
    get,
    path = "/v1/tasks/{task_id}",
    params(("task_id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, (StatusCode, Json<ErrorResponse>)> {
    match state.scheduler.get_task(task_id).await {
        Some(task) => Ok(Json(task)),
        None => Err((StatusCode::NOT_FOUND, ErrorResponse::new("task not found"))),
    }
}

/// GET /v1/tasks - List all known tasks
#[utoipa::path(
    get,
    path = "/v1/tasks",
    responses((status = 200, description = "All known tasks", body = Vec<Task>)),
    tag = "tasks"
)]
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.scheduler.get_all_tasks().await)
}
