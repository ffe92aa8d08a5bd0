use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Generic, backend-agnostic job state. Derived from backend status on
/// every poll, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Queued => "QUEUED",
            TaskState::Running => "RUNNING",
            TaskState::Succeeded => "SUCCEEDED",
            TaskState::Failed => "FAILED",
        }
    }

    pub fn from_status(value: &str) -> Option<Self> {
        match value {
            "QUEUED" => Some(TaskState::Queued),
            "RUNNING" => Some(TaskState::Running),
            "SUCCEEDED" => Some(TaskState::Succeeded),
            "FAILED" => Some(TaskState::Failed),
            _ => None,
        }
    }

    /// SUCCEEDED and FAILED are absorbing: once observed, every later
    /// poll reports the same state.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// Lookup table from backend-native status strings to [TaskState].
///
/// The mapping is backend-specific configuration data, not agent logic:
/// adding a backend status is a data change. Lookups are case-insensitive,
/// and anything outside the table translates to Running. An unknown
/// status means "keep polling", never premature completion.
#[derive(Debug, Clone)]
pub struct StatusMap {
    table: HashMap<String, TaskState>,
}

impl StatusMap {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, TaskState)>,
        S: AsRef<str>,
    {
        let table = entries
            .into_iter()
            .map(|(status, state)| (status.as_ref().trim().to_ascii_uppercase(), state))
            .collect();
        Self { table }
    }

    /// Total over all input strings: unmapped statuses fall back to Running.
    pub fn translate(&self, status: &str) -> TaskState {
        self.table
            .get(&status.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or(TaskState::Running)
    }
}
