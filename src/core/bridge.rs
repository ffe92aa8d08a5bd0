//! The type bridge: converts generic tagged values into backend-native
//! call parameters and backend result locations back into generic values.
//!
//! Both directions are pure and total over the supported type set.
//! Anything outside it is rejected explicitly: no silent coercion, no
//! truncation of numeric precision.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::backend::ResultLocator;
use crate::core::error::AgentError;
use crate::core::literal::{Literal, LiteralKind};

/// A parameter in the form the backend API expects: a named value with a
/// backend-native type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeParam {
    pub name: String,
    pub native_type: String,
    pub value: serde_json::Value,
}

/// Table from generic kind name to backend-native type tag. Like the
/// status table, this is backend configuration data: supporting a new
/// parameter type on a backend is a data change.
#[derive(Debug, Clone)]
pub struct NativeTypeMap {
    table: HashMap<String, String>,
}

impl NativeTypeMap {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = entries
            .into_iter()
            .map(|(kind, tag)| (kind.into(), tag.into()))
            .collect();
        Self { table }
    }

    pub fn tag_for(&self, kind: &LiteralKind) -> Option<&str> {
        self.table.get(kind.name()).map(String::as_str)
    }
}

/// Converts between generic literals and backend-native parameter values.
#[derive(Debug, Clone)]
pub struct TypeBridge {
    types: NativeTypeMap,
}

impl TypeBridge {
    pub fn new(types: NativeTypeMap) -> Self {
        Self { types }
    }

    /// Generic value → backend-native parameter. Fails with
    /// [AgentError::UnsupportedType] when the value does not match its
    /// declared kind or the kind has no native tag.
    pub fn to_native(
        &self,
        name: &str,
        declared: &LiteralKind,
        value: &Literal,
    ) -> Result<NativeParam, AgentError> {
        if !value.conforms_to(declared) {
            return Err(AgentError::UnsupportedType(format!(
                "input '{name}': value of kind {} does not match declared kind {}",
                value.kind_name(),
                declared.name()
            )));
        }
        let native_type = self.types.tag_for(declared).ok_or_else(|| {
            AgentError::UnsupportedType(format!(
                "input '{name}': no native mapping for kind {}",
                declared.name()
            ))
        })?;
        Ok(NativeParam {
            name: name.to_string(),
            native_type: native_type.to_string(),
            value: native_value(value)?,
        })
    }

    /// Reverse scalar mapping: backend-native value → generic literal of
    /// the declared kind. Shape mismatches are rejected, never coerced.
    pub fn from_native(
        &self,
        declared: &LiteralKind,
        value: &serde_json::Value,
    ) -> Result<Literal, AgentError> {
        let mismatch = || {
            AgentError::UnsupportedType(format!(
                "native value {value} does not decode as kind {}",
                declared.name()
            ))
        };
        match declared {
            LiteralKind::Integer => value.as_i64().map(Literal::Integer).ok_or_else(mismatch),
            LiteralKind::Float => value.as_f64().map(Literal::Float).ok_or_else(mismatch),
            LiteralKind::Boolean => value.as_bool().map(Literal::Boolean).ok_or_else(mismatch),
            LiteralKind::Text => value
                .as_str()
                .map(|s| Literal::Text(s.to_string()))
                .ok_or_else(mismatch),
            LiteralKind::Datetime => {
                let raw = value.as_str().ok_or_else(mismatch)?;
                let parsed = DateTime::parse_from_rfc3339(raw).map_err(|_| mismatch())?;
                Ok(Literal::Datetime(parsed.with_timezone(&Utc)))
            }
            LiteralKind::List(elem) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                let converted: Result<Vec<Literal>, AgentError> = items
                    .iter()
                    .map(|item| self.from_native(elem, item))
                    .collect();
                Ok(Literal::List(converted?))
            }
            LiteralKind::Structured => {
                let uri = value
                    .get("uri")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(mismatch)?;
                let format = value
                    .get("format")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default();
                Ok(Literal::Structured {
                    uri: uri.to_string(),
                    format: format.to_string(),
                })
            }
        }
    }

    /// Wrap a backend result location in a generic value. Only structured
    /// output kinds can carry a locator; the data itself is never read.
    pub fn wrap_result(
        &self,
        declared: &LiteralKind,
        locator: &ResultLocator,
    ) -> Result<Literal, AgentError> {
        match declared {
            LiteralKind::Structured => Ok(Literal::Structured {
                uri: locator.uri.clone(),
                format: locator.format.clone(),
            }),
            other => Err(AgentError::UnsupportedType(format!(
                "output kind {} cannot wrap a result locator",
                other.name()
            ))),
        }
    }
}

fn native_value(value: &Literal) -> Result<serde_json::Value, AgentError> {
    match value {
        Literal::Integer(i) => Ok(serde_json::Value::from(*i)),
        Literal::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                AgentError::UnsupportedType("non-finite float has no native form".to_string())
            }),
        Literal::Boolean(b) => Ok(serde_json::Value::from(*b)),
        Literal::Text(s) => Ok(serde_json::Value::from(s.as_str())),
        Literal::Datetime(dt) => Ok(serde_json::Value::from(dt.to_rfc3339())),
        Literal::List(items) => {
            let converted: Result<Vec<serde_json::Value>, AgentError> =
                items.iter().map(native_value).collect();
            Ok(serde_json::Value::Array(converted?))
        }
        Literal::Structured { uri, format } => {
            Ok(serde_json::json!({ "uri": uri, "format": format }))
        }
    }
}
