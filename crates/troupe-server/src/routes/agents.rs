//! Agent directory routes.
//!
//! Thin HTTP bindings over `AgentRegistry`: POST is register (upsert),
//! PATCH is strict update (404 rather than implicit creation), DELETE is
//! idempotent.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};
use troupe_core::agent::AgentRecord;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents", get(list_agents).post(register_agent))
        .route(
            "/agents/:id",
            get(get_agent).patch(update_agent).delete(delete_agent),
        )
}

#[derive(Debug, Deserialize)]
struct ListParams {
    capability: Option<String>,
}

async fn register_agent(
    State(state): State<AppState>,
    Json(record): Json<AgentRecord>,
) -> ApiResult<(StatusCode, Json<AgentRecord>)> {
    let record = state.registry.register(record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_agents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<AgentRecord>>> {
    let records = match params.capability.as_deref() {
        Some(capability) => state.registry.find_by_capability(capability).await?,
        None => state.registry.list().await?,
    };
    Ok(Json(records))
}

async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AgentRecord>> {
    state
        .registry
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("agent '{id}' not found")))
}

async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(partial): Json<Map<String, Value>>,
) -> ApiResult<Json<AgentRecord>> {
    state
        .registry
        .update(&id, partial)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("agent '{id}' not found")))
}

async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.registry.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
