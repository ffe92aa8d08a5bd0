use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::AppState;
use crate::core::agent::TaskAgent;
use crate::core::error::AgentError;
use crate::core::literal::LiteralMap;
use crate::core::state::TaskState;
use crate::core::task::TaskTemplate;

/// Structured error reply: distinct status per error kind, body carries
/// the machine-readable kind plus detail. Nothing is downgraded to a
/// default response.
type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub template: TaskTemplate,
    #[serde(default)]
    pub output_prefix: String,
    #[serde(default)]
    pub inputs: Option<LiteralMap>,
}

#[derive(Serialize)]
pub struct CreateTaskResponse {
    /// The continuation token, base64 over the binary encoding.
    pub resource_meta: String,
}

#[derive(Deserialize)]
pub struct TaskRef {
    pub task_type: String,
    pub resource_meta: String,
}

#[derive(Serialize)]
pub struct GetTaskResponse {
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<LiteralMap>,
}

fn agent_for(state: &AppState, task_type: &str) -> Result<Arc<dyn TaskAgent>, ApiError> {
    state.registry.get(task_type).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": {
                    "kind": "unknown_task_type",
                    "message": format!("no agent registered for task type '{task_type}'"),
                }
            })),
        )
    })
}

fn error_reply(operation: &str, task_type: &str, err: AgentError) -> ApiError {
    let status = match &err {
        AgentError::UnsupportedType(_) | AgentError::MalformedMetadata(_) => {
            StatusCode::BAD_REQUEST
        }
        AgentError::NotFound(_) => StatusCode::NOT_FOUND,
        AgentError::Submission(_) | AgentError::Backend(_) => StatusCode::BAD_GATEWAY,
        AgentError::OutputResolution(_) | AgentError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error!(task_type, operation, error = %err, "agent operation failed");
    (
        status,
        Json(serde_json::json!({
            "error": { "kind": err.kind(), "message": err.to_string() }
        })),
    )
}

fn decode_meta(raw: &str) -> Result<Vec<u8>, AgentError> {
    BASE64
        .decode(raw)
        .map_err(|e| AgentError::MalformedMetadata(format!("resource_meta is not base64: {e}")))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<CreateTaskResponse>, ApiError> {
    let task_type = req.template.task_type.clone();
    let agent = agent_for(&state, &task_type)?;
    info!(task_type = %task_type, operation = "create", "dispatching");

    let bytes = agent
        .create(&req.template, &req.output_prefix, req.inputs.as_ref())
        .await
        .map_err(|e| error_reply("create", &task_type, e))?;

    Ok(Json(CreateTaskResponse {
        resource_meta: BASE64.encode(bytes),
    }))
}

pub async fn get_task(
    State(state): State<AppState>,
    Json(req): Json<TaskRef>,
) -> Result<Json<GetTaskResponse>, ApiError> {
    let agent = agent_for(&state, &req.task_type)?;
    info!(task_type = %req.task_type, operation = "get", "dispatching");

    let bytes =
        decode_meta(&req.resource_meta).map_err(|e| error_reply("get", &req.task_type, e))?;
    let observed = agent
        .get(&bytes)
        .await
        .map_err(|e| error_reply("get", &req.task_type, e))?;

    Ok(Json(GetTaskResponse {
        state: observed.state,
        outputs: observed.outputs,
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Json(req): Json<TaskRef>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let agent = agent_for(&state, &req.task_type)?;
    info!(task_type = %req.task_type, operation = "delete", "dispatching");

    let bytes =
        decode_meta(&req.resource_meta).map_err(|e| error_reply("delete", &req.task_type, e))?;
    agent
        .delete(&bytes)
        .await
        .map_err(|e| error_reply("delete", &req.task_type, e))?;

    Ok(Json(serde_json::json!({})))
}
