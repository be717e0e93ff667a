//! Task CRUD and schedule optimization, scoped to the authenticated caller.
//!
//! A task owned by someone else is reported as not found.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use kairos_core::{KairosError, Task, TaskInput, TaskPatch, TaskStatus, User};

use crate::extract::AuthUser;
use crate::state::AppState;

use super::{ApiError, ApiResult, ErrorResponse};

/// Partial update body: any task field plus an optional status change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskUpdate {
    #[serde(flatten)]
    pub patch: TaskPatch,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Optional body of `/optimize-schedule`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

fn owned_task(state: &AppState, user: &User, raw_id: &str) -> ApiResult<Task> {
    let not_found = || ApiError::from(KairosError::task_not_found(raw_id));
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    state
        .repo
        .tasks
        .get(id)
        .filter(|task| task.owner_id == Some(user.id))
        .ok_or_else(not_found)
}

/// Create a task owned by the caller.
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "Tasks",
    security(("bearer" = [])),
    request_body = TaskInput,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload?;
    input.validate(Utc::now())?;
    let task = state.repo.tasks.create(input, Some(user.id));
    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks.
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "Tasks",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's tasks", body = Vec<Task>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Json<Vec<Task>> {
    Json(state.repo.tasks.list(Some(user.id)))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = Task),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    owned_task(&state, &user, &id).map(Json)
}

#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Task ID")),
    request_body = TaskUpdate,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<TaskUpdate>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let task = owned_task(&state, &user, &id)?;
    let Json(update) = payload?;
    update.patch.validate(Utc::now())?;
    state
        .repo
        .tasks
        .update(task.id, update.patch, update.status)
        .map(Json)
        .ok_or_else(|| KairosError::task_not_found(task.id).into())
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let task = owned_task(&state, &user, &id)?;
    if state.repo.tasks.delete(task.id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(KairosError::task_not_found(task.id).into())
    }
}

/// Rank tasks into a schedule and persist the computed priorities.
///
/// Tasks in the body are ranked as given (re-owned to the caller). With no
/// body, or an empty list, the caller's stored tasks are ranked.
#[utoipa::path(
    post,
    path = "/optimize-schedule",
    tag = "Schedule",
    security(("bearer" = [])),
    request_body(content = OptimizeRequest, description = "Tasks to rank; omit to rank stored tasks"),
    responses(
        (status = 200, description = "Tasks in schedule order", body = Vec<Task>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Malformed task in body", body = ErrorResponse)
    )
)]
pub async fn optimize_schedule(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> ApiResult<Json<Vec<Task>>> {
    let request: OptimizeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        OptimizeRequest::default()
    } else {
        serde_json::from_slice::<Option<OptimizeRequest>>(&body)
            .map_err(|e| {
                ApiError::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Invalid request body: {}", e),
                )
            })?
            .unwrap_or_default()
    };

    let outcome = if request.tasks.is_empty() {
        state.ranker.rank_owner(user.id, &state.repo.tasks).await
    } else {
        let mut tasks = request.tasks;
        for task in &mut tasks {
            task.validate_fields()?;
            task.owner_id = Some(user.id);
        }
        debug!("Ranking {} submitted tasks for user '{}'", tasks.len(), user.id);
        state
            .ranker
            .rank_at(tasks, &state.repo.tasks, Utc::now())
            .await
    };

    Ok(Json(outcome.tasks))
}
