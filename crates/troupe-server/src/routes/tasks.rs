//! Task lifecycle routes.
//!
//! `POST /tasks` accepts a batch, records it, and runs it in the
//! background against the owning session; the other routes observe and
//! cancel recorded batches.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::error;
use troupe_core::task::{TaskBatch, TaskStatus};
use troupe_core::{Result, TroupeError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_batches).post(submit_tasks))
        .route("/tasks/:id", get(get_batch))
        .route("/tasks/:id/cancel", post(cancel_batch))
        .route("/tasks/:id/logs", get(batch_logs))
}

/// Body of `POST /tasks` (also the `tasks/submit` RPC params).
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTasksRequest {
    /// Session to run against
    pub session_id: String,
    /// When set, (re)creates the session for this persona first
    #[serde(default)]
    pub persona: Option<String>,
    /// Ordered task texts
    pub tasks: Vec<String>,
}

/// Records a batch and spawns its sequential run.
///
/// Shared by the REST route and the A2A `tasks/submit` method. The batch
/// is returned in `Pending` state; its status moves as the background run
/// progresses.
pub async fn submit_batch(state: &AppState, request: SubmitTasksRequest) -> Result<TaskBatch> {
    if let Some(persona) = &request.persona {
        state
            .orchestrator
            .create_session(
                &request.session_id,
                persona,
                &state.catalog,
                &state.table,
                &state.bindings,
            )
            .await?;
    } else if !state.orchestrator.contains_session(&request.session_id).await {
        return Err(TroupeError::session_not_found(&request.session_id));
    }

    let batch = state
        .tasks
        .create(&request.session_id, request.tasks.clone())
        .await;
    let token = state
        .tasks
        .token(&batch.id)
        .await
        .unwrap_or_default();

    let runner_state = state.clone();
    let batch_id = batch.id.clone();
    let session_id = request.session_id;
    let tasks = request.tasks;
    let retry = state.retry;
    tokio::spawn(async move {
        runner_state
            .tasks
            .set_status(&batch_id, TaskStatus::Running)
            .await;
        match runner_state
            .orchestrator
            .run_sequential_tasks(&session_id, &tasks, &retry, &token)
            .await
        {
            Ok(()) => {
                runner_state
                    .tasks
                    .set_status(&batch_id, TaskStatus::Completed)
                    .await;
            }
            Err(err) if err.is_cancelled() => {
                runner_state
                    .tasks
                    .set_failed(&batch_id, TaskStatus::Cancelled, err.to_string())
                    .await;
            }
            Err(err) => {
                error!(batch_id = %batch_id, "Task batch failed: {err}");
                runner_state
                    .tasks
                    .set_failed(&batch_id, TaskStatus::Failed, err.to_string())
                    .await;
            }
        }
    });

    Ok(batch)
}

async fn submit_tasks(
    State(state): State<AppState>,
    Json(request): Json<SubmitTasksRequest>,
) -> ApiResult<(StatusCode, Json<TaskBatch>)> {
    let batch = submit_batch(&state, request).await?;
    Ok((StatusCode::ACCEPTED, Json(batch)))
}

async fn list_batches(State(state): State<AppState>) -> Json<Vec<TaskBatch>> {
    Json(state.tasks.list().await)
}

async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskBatch>> {
    state
        .tasks
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task batch '{id}' not found")))
}

async fn cancel_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<TaskBatch>)> {
    if !state.tasks.cancel(&id).await {
        return Err(ApiError::not_found(format!("task batch '{id}' not found")));
    }
    // The status flips to Cancelled once the runner observes the token;
    // what is returned here may still read Running.
    let batch = state
        .tasks
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("task batch '{id}' not found")))?;
    Ok((StatusCode::ACCEPTED, Json(batch)))
}

async fn batch_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let batch = state
        .tasks
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("task batch '{id}' not found")))?;
    let history = state
        .orchestrator
        .get_session_history(&batch.session_id)
        .await?;
    Ok(Json(history))
}
