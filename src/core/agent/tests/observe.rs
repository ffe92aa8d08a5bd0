use std::sync::atomic::Ordering;

use indexmap::IndexMap;

use super::support::{StubBackend, query_template, stub_agent};
use crate::core::agent::TaskAgent;
use crate::core::error::AgentError;
use crate::core::literal::{Literal, LiteralMap};
use crate::core::state::TaskState;

async fn created_token(backend: std::sync::Arc<StubBackend>) -> Vec<u8> {
    let agent = stub_agent(backend);
    let inputs: LiteralMap = IndexMap::from([("x".to_string(), Literal::Integer(5))]);
    agent
        .create(&query_template(), "out://run", Some(&inputs))
        .await
        .unwrap()
}

#[tokio::test]
async fn succeeded_job_yields_outputs_keyed_by_declared_name() {
    let backend = StubBackend::with_status("SUCCEEDED");
    let token = created_token(backend.clone()).await;

    let observed = stub_agent(backend).get(&token).await.unwrap();

    assert_eq!(observed.state, TaskState::Succeeded);
    let outputs = observed.outputs.expect("succeeded job declares outputs");
    match &outputs["results"] {
        Literal::Structured { uri, .. } => assert_eq!(uri, "stub://results/stub-1"),
        other => panic!("expected structured locator, got {other:?}"),
    }
}

#[tokio::test]
async fn running_job_reports_running_with_no_outputs() {
    let backend = StubBackend::with_status("RUNNING");
    let token = created_token(backend.clone()).await;
    let observed = stub_agent(backend).get(&token).await.unwrap();
    assert_eq!(observed.state, TaskState::Running);
    assert!(observed.outputs.is_none());
}

#[tokio::test]
async fn unknown_backend_status_translates_to_running_not_an_error() {
    let backend = StubBackend::with_status("UNKNOWN_EXOTIC");
    let token = created_token(backend.clone()).await;
    let observed = stub_agent(backend).get(&token).await.unwrap();
    assert_eq!(observed.state, TaskState::Running);
}

#[tokio::test]
async fn terminal_observation_is_idempotent() {
    for status in ["SUCCEEDED", "FAILED"] {
        let backend = StubBackend::with_status(status);
        let token = created_token(backend.clone()).await;
        let agent = stub_agent(backend);
        let first = agent.get(&token).await.unwrap().state;
        let second = agent.get(&token).await.unwrap().state;
        assert!(first.is_terminal());
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn failed_job_carries_no_outputs() {
    let backend = StubBackend::with_status("FAILED");
    let token = created_token(backend.clone()).await;
    let observed = stub_agent(backend).get(&token).await.unwrap();
    assert_eq!(observed.state, TaskState::Failed);
    assert!(observed.outputs.is_none());
}

#[tokio::test]
async fn missing_backend_record_is_not_found() {
    let live = StubBackend::with_status("RUNNING");
    let token = created_token(live).await;

    // Same token presented to a backend with no record of the job.
    let err = stub_agent(StubBackend::vanished())
        .get(&token)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::NotFound(_)));
}

#[tokio::test]
async fn malformed_token_is_rejected_never_defaulted_to_a_state() {
    let agent = stub_agent(StubBackend::with_status("RUNNING"));
    let err = agent.get(b"garbage-bytes").await.unwrap_err();
    assert!(matches!(err, AgentError::MalformedMetadata(_)));
}

#[tokio::test]
async fn unreadable_result_is_output_resolution_not_job_failure() {
    let backend = StubBackend::with_status("SUCCEEDED");
    let token = created_token(backend.clone()).await;

    backend.fail_result.store(true, Ordering::SeqCst);
    let err = stub_agent(backend).get(&token).await.unwrap_err();
    assert!(matches!(err, AgentError::OutputResolution(_)));
}

#[tokio::test]
async fn succeeded_job_without_declared_outputs_reports_no_output_map() {
    let backend = StubBackend::with_status("SUCCEEDED");
    let agent = stub_agent(backend);
    let mut template = query_template();
    template.interface.outputs.clear();

    let token = agent.create(&template, "", None).await.unwrap();
    let observed = agent.get(&token).await.unwrap();
    assert_eq!(observed.state, TaskState::Succeeded);
    assert!(observed.outputs.is_none());
}
