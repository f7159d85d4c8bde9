//! Request Validator — decodes a raw creation payload into a typed intent.
//!
//! Decoding is two-step: bytes → `serde_json::Value`, then each recognised field
//! is interpreted against the JSON kind it must have. A field of the wrong kind
//! is rejected, never coerced. The first problem found wins.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// JSON kinds, named the way they are reported back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Boolean,
    Numeric,
    Text,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(_) => JsonKind::Numeric,
            Value::String(_) => JsonKind::Text,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Numeric => "numeric",
            JsonKind::Text => "text",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required parameter '{0}'")]
    MissingField(&'static str),

    #[error("cannot interpret {found} value as the expected {expected} field `{field}`")]
    TypeMismatch {
        field: String,
        expected: JsonKind,
        found: JsonKind,
    },

    #[error("invalid value for field `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("request body is not valid JSON: {0}")]
    Malformed(String),
}

/// A validated creation request. Carries no account: that comes from the
/// request context, never from the body.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBaselineIntent {
    pub name: String,
    /// As supplied, duplicates included.
    pub inventory_ids: Vec<Uuid>,
    /// Opaque structured config. `to_time` (RFC3339 with offset) is the one
    /// recognised key; it is passed through, not checked here.
    pub config: Option<Map<String, Value>>,
}

impl CreateBaselineIntent {
    pub fn parse(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return Err(mismatch("body", JsonKind::Object, &other)),
        };

        let name = match fields.remove("name") {
            None => return Err(ValidationError::MissingField("name")),
            Some(Value::String(name)) => name,
            Some(other) => return Err(mismatch("name", JsonKind::Text, &other)),
        };

        let inventory_ids = match fields.remove("inventory_ids") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => parse_inventory_ids(items)?,
            Some(other) => return Err(mismatch("inventory_ids", JsonKind::Array, &other)),
        };

        let config = match fields.remove("config") {
            None | Some(Value::Null) => None,
            Some(Value::Object(config)) => Some(config),
            Some(other) => return Err(mismatch("config", JsonKind::Object, &other)),
        };

        Ok(CreateBaselineIntent {
            name,
            inventory_ids,
            config,
        })
    }
}

fn parse_inventory_ids(items: Vec<Value>) -> Result<Vec<Uuid>, ValidationError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let field = format!("inventory_ids[{i}]");
            match item {
                Value::String(raw) => {
                    Uuid::parse_str(&raw).map_err(|e| ValidationError::InvalidValue {
                        field,
                        reason: format!("'{raw}' is not a UUID ({e})"),
                    })
                }
                other => Err(mismatch(&field, JsonKind::Text, &other)),
            }
        })
        .collect()
}

fn mismatch(field: &str, expected: JsonKind, found: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: JsonKind::of(found),
    }
}
