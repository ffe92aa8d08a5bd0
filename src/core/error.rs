/// Protocol-level error taxonomy for the job agent.
///
/// Every variant is surfaced to the RPC caller as a structured error; the
/// web layer maps each to a distinct HTTP status. The agent never retries
/// internally and never downgrades a failure to a default response.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// An input or output type has no backend mapping. Reported before any
    /// backend interaction occurs.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The backend rejected the job at create time. Carries the backend's
    /// error detail; whether to retry create is the caller's decision.
    #[error("job submission failed: {0}")]
    Submission(String),

    /// A continuation token failed to decode. Always a hard failure:
    /// misrouting to the wrong external job would be a correctness
    /// violation, so this is never tolerated or defaulted.
    #[error("malformed resource metadata: {0}")]
    MalformedMetadata(String),

    /// The backend has no record of the referenced job. Reported distinctly
    /// from transient faults so callers do not busy-poll forever.
    #[error("job not found: {0}")]
    NotFound(String),

    /// The job succeeded but its result could not be resolved or converted.
    /// Distinct from job failure so the caller can tell the two apart.
    #[error("output resolution failed: {0}")]
    OutputResolution(String),

    /// The backend could not be reached or answered with a transport-level
    /// fault on get/delete. Callers retry by re-invoking the operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// Unexpected internal condition (e.g. token serialization failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Stable machine-readable name, used in wire error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::UnsupportedType(_) => "unsupported_type",
            AgentError::Submission(_) => "submission_failed",
            AgentError::MalformedMetadata(_) => "malformed_metadata",
            AgentError::NotFound(_) => "not_found",
            AgentError::OutputResolution(_) => "output_resolution_failed",
            AgentError::Backend(_) => "backend_error",
            AgentError::Internal(_) => "internal_error",
        }
    }
}
