//! Native JSON bridge.
//!
//! Converts between plain JSON documents and [`Value`]. Plain JSON cannot say
//! whether `5` is an integer or a double, nor tell a key or a timestamp from
//! an object or a string, so a few tagged single-field objects carry the type:
//!
//! | JSON | Value |
//! |------|-------|
//! | `5` | `Integer(5)` |
//! | `7.8` | `Double(7.8)` |
//! | `{"$int": 5}` | `Integer(5)` |
//! | `{"$double": 5}` | `Double(5.0)` |
//! | `{"$timestamp": "2024-01-01T00:00:00Z"}` | `Timestamp(..)` |
//! | `{"$blob": "AQID"}` | `Blob([1, 2, 3])` |
//! | `{"$key": {"namespace": "ns", "path": [["Kind", 1], ["Sub"]]}}` | `Key(..)` |
//! | `{"$entity": {"$int": 5}}` | `Entity(..)` with a property named `$int` |
//!
//! A plain number with no fractional part decodes as an integer; callers that
//! need a double must use the `$double` tag. Integers outside the `i64` range
//! are rejected rather than rounded. `$double` also accepts the strings
//! `"NaN"`, `"inf"` and `"-inf"`.

use crate::entity::Entity;
use crate::key::{Identifier, Key, PathElement};
use crate::value::Value;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map};

const INT_TAG: &str = "$int";
const DOUBLE_TAG: &str = "$double";
const TIMESTAMP_TAG: &str = "$timestamp";
const BLOB_TAG: &str = "$blob";
const KEY_TAG: &str = "$key";
const ENTITY_TAG: &str = "$entity";

const TAGS: [&str; 6] = [INT_TAG, DOUBLE_TAG, TIMESTAMP_TAG, BLOB_TAG, KEY_TAG, ENTITY_TAG];

/// Errors raised while reading tagged JSON values.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// A tagged object has a payload of the wrong shape
    #[error("Invalid {tag} value: {reason}")]
    InvalidTag { tag: &'static str, reason: String },

    /// A `$key` path is malformed
    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),

    /// A `$blob` payload is not valid base64
    #[error("Invalid base64 blob: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A `$timestamp` payload is not RFC 3339
    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// A plain integer that does not fit in an `i64`
    #[error("Integer {0} is out of range; use {{\"$double\": {0}}} for a floating-point value")]
    IntegerOutOfRange(String),

    /// The document is not an object where an entity was expected
    #[error("Expected a JSON object for an entity, got {0}")]
    NotAnObject(String),
}

fn invalid(tag: &'static str, reason: impl Into<String>) -> JsonError {
    JsonError::InvalidTag {
        tag,
        reason: reason.into(),
    }
}

// ============================================================================
// JSON → Value
// ============================================================================

/// Convert a JSON value into a native value.
pub fn value_from_json(json: &serde_json::Value) -> Result<Value, JsonError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if n.is_u64() {
                Err(JsonError::IntegerOutOfRange(n.to_string()))
            } else {
                n.as_f64()
                    .map(Value::Double)
                    .ok_or_else(|| JsonError::IntegerOutOfRange(n.to_string()))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(arr) => arr
            .iter()
            .map(value_from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        serde_json::Value::Object(obj) => match tagged_value(obj)? {
            Some(value) => Ok(value),
            None => entity_from_map(obj).map(Value::Entity),
        },
    }
}

/// Convert a JSON object into an entity, keeping property order.
pub fn entity_from_json(json: &serde_json::Value) -> Result<Entity, JsonError> {
    match json {
        serde_json::Value::Object(obj) => entity_from_map(obj),
        other => Err(JsonError::NotAnObject(json_type_name(other).to_string())),
    }
}

fn entity_from_map(obj: &Map<String, serde_json::Value>) -> Result<Entity, JsonError> {
    let mut entity = Entity::new();
    for (name, value) in obj {
        entity.insert(name.clone(), value_from_json(value)?);
    }
    Ok(entity)
}

/// Decode a single-field tagged object. Objects that are not tagged return
/// `None` and are treated as nested entities.
fn tagged_value(obj: &Map<String, serde_json::Value>) -> Result<Option<Value>, JsonError> {
    if obj.len() != 1 {
        return Ok(None);
    }
    let Some((tag, payload)) = obj.iter().next() else {
        return Ok(None);
    };
    let value = match tag.as_str() {
        INT_TAG => {
            let i = payload
                .as_i64()
                .ok_or_else(|| invalid(INT_TAG, format!("expected an integer, got {payload}")))?;
            Value::Integer(i)
        }
        DOUBLE_TAG => {
            let f = match payload {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.parse::<f64>().ok().filter(|f| !f.is_finite()),
                _ => None,
            }
            .ok_or_else(|| {
                invalid(
                    DOUBLE_TAG,
                    format!("expected a number, \"NaN\", \"inf\" or \"-inf\", got {payload}"),
                )
            })?;
            Value::Double(f)
        }
        TIMESTAMP_TAG => {
            let s = payload
                .as_str()
                .ok_or_else(|| invalid(TIMESTAMP_TAG, "expected an RFC 3339 string"))?;
            Value::Timestamp(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
        }
        BLOB_TAG => {
            let s = payload
                .as_str()
                .ok_or_else(|| invalid(BLOB_TAG, "expected a base64 string"))?;
            Value::Blob(base64::engine::general_purpose::STANDARD.decode(s)?)
        }
        KEY_TAG => Value::Key(key_from_json(payload)?),
        ENTITY_TAG => Value::Entity(entity_from_json(payload)?),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Parse the `$key` payload: `{"namespace"?: string, "path": [[kind, id?], ...]}`.
pub fn key_from_json(json: &serde_json::Value) -> Result<Key, JsonError> {
    let obj = json
        .as_object()
        .ok_or_else(|| invalid(KEY_TAG, "expected an object with a path"))?;
    let namespace = match obj.get("namespace") {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(ns)) => ns.clone(),
        Some(other) => return Err(invalid(KEY_TAG, format!("namespace must be a string, got {other}"))),
    };
    let path = obj
        .get("path")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| invalid(KEY_TAG, "missing path array"))?;

    let path = path
        .iter()
        .map(path_element_from_json)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Key { namespace, path })
}

fn path_element_from_json(json: &serde_json::Value) -> Result<PathElement, JsonError> {
    let parts = json
        .as_array()
        .ok_or_else(|| JsonError::InvalidKeyPath(format!("expected [kind, id?], got {json}")))?;
    let kind = match parts.first() {
        Some(serde_json::Value::String(kind)) => kind.clone(),
        _ => {
            return Err(JsonError::InvalidKeyPath(format!(
                "path element must start with a kind name, got {json}"
            )))
        }
    };
    let id = match parts.get(1) {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(name)) => Some(Identifier::Name(name.clone())),
        Some(serde_json::Value::Number(n)) => {
            let id = n.as_i64().ok_or_else(|| {
                JsonError::InvalidKeyPath(format!("id must be a 64-bit integer, got {n}"))
            })?;
            Some(Identifier::Id(id))
        }
        Some(other) => {
            return Err(JsonError::InvalidKeyPath(format!(
                "identifier must be a string or integer, got {other}"
            )))
        }
    };
    if parts.len() > 2 {
        return Err(JsonError::InvalidKeyPath(format!(
            "path element has more than two parts: {json}"
        )));
    }
    Ok(PathElement { kind, id })
}

// ============================================================================
// Value → JSON
// ============================================================================

/// Convert a native value into JSON, tagging types plain JSON would lose.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(*b),
        Value::Integer(i) => json!(*i),
        Value::Double(f) => {
            if !f.is_finite() {
                json!({ DOUBLE_TAG: f.to_string() })
            } else if f.fract() != 0.0 {
                json!(*f)
            } else {
                // Whole doubles would read back as integers without the tag
                json!({ DOUBLE_TAG: *f })
            }
        }
        Value::String(s) => json!(s),
        Value::Timestamp(dt) => {
            json!({ TIMESTAMP_TAG: dt.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
        }
        Value::Blob(b) => {
            json!({ BLOB_TAG: base64::engine::general_purpose::STANDARD.encode(b) })
        }
        Value::Key(key) => json!({ KEY_TAG: key_to_json(key) }),
        Value::Entity(entity) => {
            let obj = entity_to_json(entity);
            // A lone tag-named property would read back as a tagged value
            match entity.names().next() {
                Some(name) if entity.len() == 1 && TAGS.contains(&name) => {
                    json!({ ENTITY_TAG: obj })
                }
                _ => obj,
            }
        }
        Value::List(values) => serde_json::Value::Array(values.iter().map(value_to_json).collect()),
    }
}

/// Convert an entity into a JSON object.
pub fn entity_to_json(entity: &Entity) -> serde_json::Value {
    let mut obj = Map::new();
    for (name, value) in entity.iter() {
        obj.insert(name.to_string(), value_to_json(value));
    }
    serde_json::Value::Object(obj)
}

/// Convert a key into the `$key` payload form.
pub fn key_to_json(key: &Key) -> serde_json::Value {
    let path: Vec<serde_json::Value> = key
        .path
        .iter()
        .map(|element| match &element.id {
            Some(Identifier::Id(id)) => json!([element.kind, id]),
            Some(Identifier::Name(name)) => json!([element.kind, name]),
            None => json!([element.kind]),
        })
        .collect();
    if key.namespace.is_empty() {
        json!({ "path": path })
    } else {
        json!({ "namespace": key.namespace, "path": path })
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
