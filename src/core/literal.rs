//! Generic tagged values exchanged between the orchestrator and the agent.
//!
//! The variant set is closed on purpose: every supported generic type is an
//! explicit variant with its own native conversion in the type bridge, so
//! an unsupported type is rejected at conversion time instead of surfacing
//! as a runtime lookup surprise deep inside a backend call.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A generic tagged value. Immutable once constructed; produced by the
/// orchestrator for inputs and by the agent for outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Datetime(DateTime<Utc>),
    List(Vec<Literal>),
    /// A reference to structured data living in the backend (e.g. a result
    /// table). Wraps a locator; never the materialized data itself.
    Structured { uri: String, format: String },
}

/// Type descriptor matching the [Literal] variants. Used in task
/// interfaces and output bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Integer,
    Float,
    Boolean,
    Text,
    Datetime,
    List(Box<LiteralKind>),
    Structured,
}

/// Ordered mapping from parameter name to value. Insertion order is
/// preserved so the agent sees parameters the way the caller declared them.
pub type LiteralMap = IndexMap<String, Literal>;

impl Literal {
    /// Whether this value conforms to a declared kind. List values must
    /// conform element-wise.
    pub fn conforms_to(&self, kind: &LiteralKind) -> bool {
        match (self, kind) {
            (Literal::Integer(_), LiteralKind::Integer) => true,
            (Literal::Float(_), LiteralKind::Float) => true,
            (Literal::Boolean(_), LiteralKind::Boolean) => true,
            (Literal::Text(_), LiteralKind::Text) => true,
            (Literal::Datetime(_), LiteralKind::Datetime) => true,
            (Literal::List(items), LiteralKind::List(elem)) => {
                items.iter().all(|item| item.conforms_to(elem))
            }
            (Literal::Structured { .. }, LiteralKind::Structured) => true,
            _ => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Boolean(_) => "boolean",
            Literal::Text(_) => "text",
            Literal::Datetime(_) => "datetime",
            Literal::List(_) => "list",
            Literal::Structured { .. } => "structured",
        }
    }
}

impl LiteralKind {
    /// Table key used by the native type map. List kinds share one key:
    /// the element kind only affects value conversion, not the tag lookup.
    pub fn name(&self) -> &'static str {
        match self {
            LiteralKind::Integer => "integer",
            LiteralKind::Float => "float",
            LiteralKind::Boolean => "boolean",
            LiteralKind::Text => "text",
            LiteralKind::Datetime => "datetime",
            LiteralKind::List(_) => "list",
            LiteralKind::Structured => "structured",
        }
    }
}
