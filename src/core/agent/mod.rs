//! The job agent: create/get/delete for one task type against a
//! [JobBackend] capability.
//!
//! The agent is deliberately stateless. It holds no job table, no cache,
//! and no interior mutability; the only state lives in the external
//! backend and in the caller-held continuation token. That is what makes
//! it safe under arbitrary interleaving of calls from multiple
//! orchestrator replicas, across process restarts, with no locking.
//! Retry policy belongs to the caller: the agent never retries, and a
//! create repeated after a failed create produces a new, distinct job.

use async_trait::async_trait;
use tracing::info;

use crate::core::backend::{BackendError, JobBackend};
use crate::core::bridge::TypeBridge;
use crate::core::error::AgentError;
use crate::core::literal::LiteralMap;
use crate::core::metadata::JobToken;
use crate::core::state::{StatusMap, TaskState};
use crate::core::task::TaskTemplate;

/// What a poll observed: the derived state, plus outputs when (and only
/// when) the job has succeeded and the task declares outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskObservation {
    pub state: TaskState,
    pub outputs: Option<LiteralMap>,
}

/// Object-safe dispatch seam consumed by the registry and the RPC layer.
#[async_trait]
pub trait TaskAgent: Send + Sync {
    fn task_type(&self) -> &str;

    /// Start a job and return the encoded continuation token. The only
    /// state-changing operation in the protocol.
    async fn create(
        &self,
        template: &TaskTemplate,
        output_prefix: &str,
        inputs: Option<&LiteralMap>,
    ) -> Result<Vec<u8>, AgentError>;

    /// Observe the job identified by a previously issued token. Read-only
    /// and safe to repeat indefinitely; terminal states are absorbing.
    async fn get(&self, token_bytes: &[u8]) -> Result<TaskObservation, AgentError>;

    /// Request best-effort cancellation of the external job. Does not
    /// guarantee the job stops, only that cancellation was asked for.
    async fn delete(&self, token_bytes: &[u8]) -> Result<(), AgentError>;
}

/// The generic agent. Concrete backends plug in via `B`; the status and
/// type tables are that backend's configuration data.
pub struct JobAgent<B> {
    task_type: String,
    backend: B,
    status_map: StatusMap,
    bridge: TypeBridge,
}

impl<B> JobAgent<B> {
    pub fn new(
        task_type: impl Into<String>,
        backend: B,
        status_map: StatusMap,
        bridge: TypeBridge,
    ) -> Self {
        Self {
            task_type: task_type.into(),
            backend,
            status_map,
            bridge,
        }
    }
}

#[async_trait]
impl<B: JobBackend> TaskAgent for JobAgent<B> {
    fn task_type(&self) -> &str {
        &self.task_type
    }

    async fn create(
        &self,
        template: &TaskTemplate,
        output_prefix: &str,
        inputs: Option<&LiteralMap>,
    ) -> Result<Vec<u8>, AgentError> {
        // Translate every input before touching the backend: an unmappable
        // type must fail fast with no partial submission.
        let mut params = Vec::new();
        if let Some(inputs) = inputs {
            for (name, value) in inputs {
                let declared = template.interface.inputs.get(name).ok_or_else(|| {
                    AgentError::UnsupportedType(format!(
                        "input '{name}' is not declared in the task interface"
                    ))
                })?;
                params.push(self.bridge.to_native(name, declared, value)?);
            }
        }

        info!(task_type = %self.task_type, "submitting job");
        let handle = self
            .backend
            .submit(&template.custom, output_prefix, &params)
            .await
            .map_err(|e| AgentError::Submission(e.to_string()))?;
        info!(task_type = %self.task_type, job_id = %handle.job_id, "job submitted");

        JobToken::for_handle(handle, &template.interface).encode()
    }

    async fn get(&self, token_bytes: &[u8]) -> Result<TaskObservation, AgentError> {
        let token = JobToken::decode(token_bytes)?;
        let handle = token.handle();

        let native = self.backend.status(&handle).await.map_err(|e| match e {
            BackendError::NotFound => AgentError::NotFound(token.job_id.clone()),
            other => AgentError::Backend(other.to_string()),
        })?;
        let state = self.status_map.translate(&native);

        if state != TaskState::Succeeded || token.outputs.is_empty() {
            return Ok(TaskObservation {
                state,
                outputs: None,
            });
        }

        // The job succeeded; anything that goes wrong from here on is an
        // output-resolution failure, reported distinctly from job failure.
        let locator = self
            .backend
            .result_location(&handle)
            .await
            .map_err(|e| AgentError::OutputResolution(e.to_string()))?;
        let mut outputs = LiteralMap::new();
        for binding in &token.outputs {
            let value = self
                .bridge
                .wrap_result(&binding.kind, &locator)
                .map_err(|e| AgentError::OutputResolution(e.to_string()))?;
            outputs.insert(binding.name.clone(), value);
        }

        Ok(TaskObservation {
            state,
            outputs: Some(outputs),
        })
    }

    async fn delete(&self, token_bytes: &[u8]) -> Result<(), AgentError> {
        let token = JobToken::decode(token_bytes)?;
        info!(task_type = %self.task_type, job_id = %token.job_id, "requesting cancellation");
        self.backend
            .cancel(&token.handle())
            .await
            .map_err(|e| match e {
                BackendError::NotFound => AgentError::NotFound(token.job_id.clone()),
                other => AgentError::Backend(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests;
