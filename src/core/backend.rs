//! The backend capability seam: the interface any concrete job-execution
//! system plugs into, plus an in-process loopback implementation used by
//! `serve` and the end-to-end router tests.
//!
//! All mutation in the whole system happens behind this trait; the agent
//! itself owns nothing mutable. The backend is the external system: it
//! provides its own consistency guarantees, and the agent neither assumes
//! nor relies on it being linearizable across calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::bridge::{NativeParam, NativeTypeMap};
use crate::core::state::{StatusMap, TaskState};

/// Identifies a job inside the backend. Everything here round-trips
/// through the continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// Location of a job's result inside the backend. A reference, not data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLocator {
    pub uri: String,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend has no record of the referenced job.
    #[error("no such job")]
    NotFound,
    /// The backend rejected the request (bad config, bad parameters, quota).
    #[error("rejected: {0}")]
    Rejected(String),
    /// Transport-level fault; the request may never have reached the backend.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// The outbound capability the agent delegates to. One implementation per
/// external system.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Start a job. The config blob comes from the task template and is
    /// opaque to the agent.
    async fn submit(
        &self,
        config: &serde_json::Value,
        output_prefix: &str,
        params: &[NativeParam],
    ) -> Result<JobHandle, BackendError>;

    /// Report the backend-native status string for a job. Read-only.
    async fn status(&self, handle: &JobHandle) -> Result<String, BackendError>;

    /// Request cancellation. Must succeed as a no-op when the job is
    /// already terminal.
    async fn cancel(&self, handle: &JobHandle) -> Result<(), BackendError>;

    /// Where the job's result can be read from once it has succeeded.
    async fn result_location(&self, handle: &JobHandle) -> Result<ResultLocator, BackendError>;
}

#[async_trait]
impl<B: JobBackend + ?Sized> JobBackend for std::sync::Arc<B> {
    async fn submit(
        &self,
        config: &serde_json::Value,
        output_prefix: &str,
        params: &[NativeParam],
    ) -> Result<JobHandle, BackendError> {
        (**self).submit(config, output_prefix, params).await
    }

    async fn status(&self, handle: &JobHandle) -> Result<String, BackendError> {
        (**self).status(handle).await
    }

    async fn cancel(&self, handle: &JobHandle) -> Result<(), BackendError> {
        (**self).cancel(handle).await
    }

    async fn result_location(&self, handle: &JobHandle) -> Result<ResultLocator, BackendError> {
        (**self).result_location(handle).await
    }
}

/// In-process development backend: every submitted job "runs" for a fixed
/// duration and then reports success. Exists so the server is runnable and
/// the protocol testable end to end without an external system; real
/// deployments register their own [JobBackend] implementations.
pub struct LoopbackBackend {
    run_for: Duration,
    jobs: Mutex<HashMap<String, LoopbackJob>>,
}

struct LoopbackJob {
    started: Instant,
    canceled: bool,
    output_prefix: String,
}

impl LoopbackBackend {
    pub fn new(run_for: Duration) -> Self {
        Self {
            run_for,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Status table for loopback jobs. Backend configuration data, not
    /// agent logic.
    pub fn status_map() -> StatusMap {
        StatusMap::new([
            ("PENDING", TaskState::Queued),
            ("RUNNING", TaskState::Running),
            ("DONE", TaskState::Succeeded),
            ("CANCELLED", TaskState::Failed),
        ])
    }

    /// Native parameter tags for loopback jobs. Structured inputs are
    /// deliberately absent: references cannot be passed in, only returned.
    pub fn native_types() -> NativeTypeMap {
        NativeTypeMap::new([
            ("integer", "INT64"),
            ("float", "FLOAT64"),
            ("boolean", "BOOL"),
            ("text", "STRING"),
            ("datetime", "DATETIME"),
            ("list", "ARRAY"),
        ])
    }

    fn native_status(job: &LoopbackJob, run_for: Duration) -> &'static str {
        if job.canceled {
            "CANCELLED"
        } else if job.started.elapsed() >= run_for {
            "DONE"
        } else {
            "RUNNING"
        }
    }
}

#[async_trait]
impl JobBackend for LoopbackBackend {
    async fn submit(
        &self,
        _config: &serde_json::Value,
        output_prefix: &str,
        _params: &[NativeParam],
    ) -> Result<JobHandle, BackendError> {
        let job_id = uuid::Uuid::new_v4().to_string();
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| BackendError::Unavailable("job table poisoned".to_string()))?;
        jobs.insert(
            job_id.clone(),
            LoopbackJob {
                started: Instant::now(),
                canceled: false,
                output_prefix: output_prefix.to_string(),
            },
        );
        Ok(JobHandle {
            job_id,
            annotations: BTreeMap::new(),
        })
    }

    async fn status(&self, handle: &JobHandle) -> Result<String, BackendError> {
        let jobs = self
            .jobs
            .lock()
            .map_err(|_| BackendError::Unavailable("job table poisoned".to_string()))?;
        let job = jobs.get(&handle.job_id).ok_or(BackendError::NotFound)?;
        Ok(Self::native_status(job, self.run_for).to_string())
    }

    async fn cancel(&self, handle: &JobHandle) -> Result<(), BackendError> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| BackendError::Unavailable("job table poisoned".to_string()))?;
        let job = jobs.get_mut(&handle.job_id).ok_or(BackendError::NotFound)?;
        // Cancelling a finished job stays a no-op.
        if Self::native_status(job, self.run_for) != "DONE" {
            job.canceled = true;
        }
        Ok(())
    }

    async fn result_location(&self, handle: &JobHandle) -> Result<ResultLocator, BackendError> {
        let jobs = self
            .jobs
            .lock()
            .map_err(|_| BackendError::Unavailable("job table poisoned".to_string()))?;
        let job = jobs.get(&handle.job_id).ok_or(BackendError::NotFound)?;
        let prefix = job.output_prefix.trim_end_matches('/');
        let uri = if prefix.is_empty() {
            format!("loopback://jobs/{}", handle.job_id)
        } else {
            format!("{}/{}", prefix, handle.job_id)
        };
        Ok(ResultLocator {
            uri,
            format: String::new(),
        })
    }
}
