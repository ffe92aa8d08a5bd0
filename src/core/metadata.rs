//! The continuation token: the only thing correlating a logical job across
//! stateless create/get/delete calls.
//!
//! Encoded as a BSON document. BSON is self-describing, so a decoder
//! ignores fields it does not know about and fields added in later schema
//! versions fall back to their defaults on old tokens. That is what keeps
//! tokens valid across process restarts and mixed-version replicas.
//! One codec serves all three operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::backend::JobHandle;
use crate::core::error::AgentError;
use crate::core::literal::LiteralKind;
use crate::core::task::TaskInterface;

/// Current token schema version.
pub const TOKEN_VERSION: i32 = 1;

/// A declared output carried inside the token, so that get can key the
/// output map without any server-side record of the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBinding {
    pub name: String,
    pub kind: LiteralKind,
}

/// The opaque continuation token, in decoded form. Created once at create
/// time, immutable, re-serialized on every call; destroyed implicitly when
/// the caller stops presenting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobToken {
    pub version: i32,
    /// External job identifier issued by the backend.
    pub job_id: String,
    /// Backend-specific extras needed to re-identify the job.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Declared outputs of the task, recorded at create time.
    #[serde(default)]
    pub outputs: Vec<OutputBinding>,
}

impl JobToken {
    /// Build a token from a freshly submitted job and the template's
    /// declared output interface.
    pub fn for_handle(handle: JobHandle, interface: &TaskInterface) -> Self {
        let outputs = interface
            .outputs
            .iter()
            .map(|(name, kind)| OutputBinding {
                name: name.clone(),
                kind: kind.clone(),
            })
            .collect();
        Self {
            version: TOKEN_VERSION,
            job_id: handle.job_id,
            annotations: handle.annotations,
            outputs,
        }
    }

    /// Reconstruct the backend handle this token identifies.
    pub fn handle(&self) -> JobHandle {
        JobHandle {
            job_id: self.job_id.clone(),
            annotations: self.annotations.clone(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, AgentError> {
        bson::to_vec(self).map_err(|e| AgentError::Internal(format!("token encode: {e}")))
    }

    /// Decode failure is always reported as malformed metadata, never as
    /// an empty or defaulted record.
    pub fn decode(bytes: &[u8]) -> Result<Self, AgentError> {
        if bytes.is_empty() {
            return Err(AgentError::MalformedMetadata("empty token".to_string()));
        }
        bson::from_slice(bytes).map_err(|e| AgentError::MalformedMetadata(e.to_string()))
    }
}
