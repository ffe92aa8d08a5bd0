//! Shared fixtures: a scriptable stub backend and agent builders.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::core::agent::JobAgent;
use crate::core::backend::{BackendError, JobBackend, JobHandle, ResultLocator};
use crate::core::bridge::{NativeParam, NativeTypeMap, TypeBridge};
use crate::core::literal::LiteralKind;
use crate::core::state::{StatusMap, TaskState};
use crate::core::task::{TaskInterface, TaskTemplate};

/// Backend double. `status: None` simulates a backend with no record of
/// any job; the failure toggles flip behavior mid-test.
pub(super) struct StubBackend {
    pub status: Option<&'static str>,
    pub fail_submit: AtomicBool,
    pub fail_result: AtomicBool,
    pub submits: AtomicUsize,
    pub cancels: AtomicUsize,
}

impl StubBackend {
    pub fn with_status(status: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status: Some(status),
            fail_submit: AtomicBool::new(false),
            fail_result: AtomicBool::new(false),
            submits: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
        })
    }

    pub fn vanished() -> Arc<Self> {
        Arc::new(Self {
            status: None,
            fail_submit: AtomicBool::new(false),
            fail_result: AtomicBool::new(false),
            submits: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
        })
    }

    pub fn rejecting() -> Arc<Self> {
        let stub = Self::with_status("RUNNING");
        stub.fail_submit.store(true, Ordering::SeqCst);
        stub
    }
}

#[async_trait]
impl JobBackend for StubBackend {
    async fn submit(
        &self,
        _config: &serde_json::Value,
        _output_prefix: &str,
        _params: &[NativeParam],
    ) -> Result<JobHandle, BackendError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected("quota exceeded".to_string()));
        }
        Ok(JobHandle {
            job_id: format!("stub-{n}"),
            annotations: BTreeMap::new(),
        })
    }

    async fn status(&self, _handle: &JobHandle) -> Result<String, BackendError> {
        self.status
            .map(str::to_string)
            .ok_or(BackendError::NotFound)
    }

    async fn cancel(&self, _handle: &JobHandle) -> Result<(), BackendError> {
        if self.status.is_none() {
            return Err(BackendError::NotFound);
        }
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn result_location(&self, handle: &JobHandle) -> Result<ResultLocator, BackendError> {
        if self.fail_result.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("result gone".to_string()));
        }
        Ok(ResultLocator {
            uri: format!("stub://results/{}", handle.job_id),
            format: String::new(),
        })
    }
}

pub(super) fn stub_status_map() -> StatusMap {
    StatusMap::new([
        ("PENDING", TaskState::Queued),
        ("RUNNING", TaskState::Running),
        ("SUCCEEDED", TaskState::Succeeded),
        ("FAILED", TaskState::Failed),
    ])
}

pub(super) fn stub_bridge() -> TypeBridge {
    TypeBridge::new(NativeTypeMap::new([
        ("integer", "INT64"),
        ("text", "STRING"),
        ("boolean", "BOOL"),
    ]))
}

pub(super) fn stub_agent(backend: Arc<StubBackend>) -> JobAgent<Arc<StubBackend>> {
    JobAgent::new("stub_task", backend, stub_status_map(), stub_bridge())
}

/// A template declaring one integer input and one structured output.
pub(super) fn query_template() -> TaskTemplate {
    TaskTemplate {
        task_type: "stub_task".to_string(),
        custom: serde_json::json!({"statement": "select * from t where c = @x"}),
        interface: TaskInterface {
            inputs: IndexMap::from([("x".to_string(), LiteralKind::Integer)]),
            outputs: IndexMap::from([("results".to_string(), LiteralKind::Structured)]),
        },
    }
}
