use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::literal::LiteralKind;

/// Immutable description of a unit of work. Owned by the orchestrator and
/// passed by value into create; the agent never stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Task-type identifier; the registry routes on this.
    pub task_type: String,
    /// Backend-specific configuration blob, passed to the backend untouched.
    #[serde(default)]
    pub custom: serde_json::Value,
    /// Declared input/output interface for the task.
    #[serde(default)]
    pub interface: TaskInterface,
}

/// Declared parameter interface: name → generic type descriptor, in
/// declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskInterface {
    #[serde(default)]
    pub inputs: IndexMap<String, LiteralKind>,
    #[serde(default)]
    pub outputs: IndexMap<String, LiteralKind>,
}
