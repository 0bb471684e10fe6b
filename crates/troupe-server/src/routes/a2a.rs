//! A2A JSON-RPC endpoint.
//!
//! Every inbound message is checked by the envelope validator before any
//! method handler runs; a malformed envelope is answered with the full
//! violation list so the peer can fix it in one pass. Valid envelopes are
//! dispatched by method name onto the registry and the orchestrator.

use crate::routes::tasks::{SubmitTasksRequest, submit_batch};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use troupe_core::TroupeError;
use troupe_core::agent::AgentRecord;
use troupe_protocol::{MessageEnvelope, RpcResponse, error_codes, validate_envelope};

/// A method-level failure, turned into a JSON-RPC error object.
struct RpcFailure {
    code: i32,
    message: String,
}

impl RpcFailure {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn invalid_params(err: serde_json::Error) -> Self {
        Self::new(error_codes::INVALID_PARAMS, err.to_string())
    }
}

impl From<TroupeError> for RpcFailure {
    fn from(err: TroupeError) -> Self {
        let code = match &err {
            TroupeError::PersonaNotFound { .. } | TroupeError::SessionNotFound { .. } => {
                error_codes::NOT_FOUND
            }
            TroupeError::Registry { .. } => error_codes::REGISTRY_ERROR,
            TroupeError::Generation { .. } => error_codes::BACKEND_ERROR,
            TroupeError::Config(_) | TroupeError::Serialization { .. } => {
                error_codes::INVALID_PARAMS
            }
            _ => error_codes::INTERNAL_ERROR,
        };
        Self::new(code, err.to_string())
    }
}

/// `POST /a2a`, the JSON-RPC entry point.
pub async fn rpc(State(state): State<AppState>, Json(candidate): Json<Value>) -> Json<RpcResponse> {
    let report = validate_envelope(&candidate);
    if !report.valid {
        // The candidate may not even have an id; echo it when present.
        let id = candidate.get("id").cloned().unwrap_or(Value::Null);
        let data = serde_json::to_value(&report.errors).unwrap_or(Value::Null);
        return Json(RpcResponse::error_with_data(
            id,
            error_codes::INVALID_REQUEST,
            "Invalid request",
            data,
        ));
    }

    // Validation guarantees the parse succeeds.
    let envelope = match MessageEnvelope::parse(&candidate) {
        Ok(envelope) => envelope,
        Err(err) => {
            return Json(RpcResponse::error(
                Value::Null,
                error_codes::INVALID_REQUEST,
                err.to_string(),
            ));
        }
    };

    let id = Value::String(envelope.id.clone());
    match dispatch(&state, envelope).await {
        Ok(result) => Json(RpcResponse::success(id, result)),
        Err(failure) => Json(RpcResponse::error(id, failure.code, failure.message)),
    }
}

#[derive(Debug, Deserialize)]
struct IdParams {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListAgentsParams {
    #[serde(default)]
    capability: Option<String>,
}

async fn dispatch(state: &AppState, envelope: MessageEnvelope) -> Result<Value, RpcFailure> {
    let params = Value::Object(envelope.params);
    match envelope.method.as_str() {
        "agents/register" => {
            let record: AgentRecord =
                serde_json::from_value(params).map_err(RpcFailure::invalid_params)?;
            let record = state.registry.register(record).await?;
            Ok(serde_json::to_value(record).unwrap_or(Value::Null))
        }
        "agents/get" => {
            let params: IdParams =
                serde_json::from_value(params).map_err(RpcFailure::invalid_params)?;
            match state.registry.get_by_id(&params.id).await? {
                Some(record) => Ok(serde_json::to_value(record).unwrap_or(Value::Null)),
                None => Err(RpcFailure::new(
                    error_codes::NOT_FOUND,
                    format!("agent '{}' not found", params.id),
                )),
            }
        }
        "agents/list" => {
            let params: ListAgentsParams =
                serde_json::from_value(params).map_err(RpcFailure::invalid_params)?;
            let records = match params.capability.as_deref() {
                Some(capability) => state.registry.find_by_capability(capability).await?,
                None => state.registry.list().await?,
            };
            Ok(serde_json::to_value(records).unwrap_or(Value::Null))
        }
        "tasks/submit" => {
            let request: SubmitTasksRequest =
                serde_json::from_value(params).map_err(RpcFailure::invalid_params)?;
            let batch = submit_batch(state, request).await?;
            Ok(serde_json::to_value(batch).unwrap_or(Value::Null))
        }
        "tasks/status" => {
            let params: IdParams =
                serde_json::from_value(params).map_err(RpcFailure::invalid_params)?;
            match state.tasks.get(&params.id).await {
                Some(batch) => Ok(serde_json::to_value(batch).unwrap_or(Value::Null)),
                None => Err(RpcFailure::new(
                    error_codes::NOT_FOUND,
                    format!("task batch '{}' not found", params.id),
                )),
            }
        }
        "tasks/cancel" => {
            let params: IdParams =
                serde_json::from_value(params).map_err(RpcFailure::invalid_params)?;
            if state.tasks.cancel(&params.id).await {
                Ok(json!({ "cancelled": true }))
            } else {
                Err(RpcFailure::new(
                    error_codes::NOT_FOUND,
                    format!("task batch '{}' not found", params.id),
                ))
            }
        }
        other => Err(RpcFailure::new(
            error_codes::METHOD_NOT_FOUND,
            format!("unknown method '{other}'"),
        )),
    }
}
