//! Reverse conversion: wire protos → native values and entities.

use crate::error::CodecError;
use crate::key::key_from_key_proto;
use crate::proto::{EntityProto, EntityResult, ValueProto, WireValue};
use chrono::DateTime;
use datastore_core::{Entity, Key, Value};

/// Convert a wire value into a native value.
///
/// An empty union decodes to [`Value::Null`]. The `indexed` flag carries no
/// native meaning and is dropped.
pub fn value_from_value_proto(proto: &ValueProto) -> Result<Value, CodecError> {
    let Some(value) = &proto.value else {
        return Ok(Value::Null);
    };
    let value = match value {
        WireValue::KeyValue(key) => Value::Key(key_from_key_proto(key)?),
        WireValue::StringValue(s) => Value::String(s.clone()),
        WireValue::BooleanValue(b) => Value::Bool(*b),
        WireValue::IntegerValue(i) => Value::Integer(*i),
        WireValue::DoubleValue(f) => Value::Double(*f),
        WireValue::TimestampMicrosecondsValue(micros) => {
            let dt = DateTime::from_timestamp_micros(*micros)
                .ok_or(CodecError::InvalidTimestamp(*micros))?;
            Value::Timestamp(dt)
        }
        WireValue::BlobValue(bytes) => Value::Blob(bytes.clone()),
        WireValue::EntityValue(entity) => Value::Entity(entity_from_entity_proto(entity)?),
        WireValue::ListValue(elements) => Value::List(
            elements
                .iter()
                .map(value_from_value_proto)
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    Ok(value)
}

/// Convert a wire entity into a native entity.
///
/// Properties are read in order; a repeated name keeps the last value. The
/// entity's own key, if any, is not part of the property bag.
pub fn entity_from_entity_proto(proto: &EntityProto) -> Result<Entity, CodecError> {
    let mut entity = Entity::new();
    for property in &proto.property {
        entity.insert(property.name.clone(), value_from_value_proto(&property.value)?);
    }
    Ok(entity)
}

/// Convert a lookup or query result batch into key/entity pairs.
pub fn format_results(results: &[EntityResult]) -> Result<Vec<(Key, Entity)>, CodecError> {
    results
        .iter()
        .map(|result| -> Result<(Key, Entity), CodecError> {
            let key = result
                .entity
                .key
                .as_ref()
                .ok_or(CodecError::MissingEntityKey)?;
            Ok((
                key_from_key_proto(key)?,
                entity_from_entity_proto(&result.entity)?,
            ))
        })
        .collect()
}

impl TryFrom<&ValueProto> for Value {
    type Error = CodecError;

    fn try_from(proto: &ValueProto) -> Result<Self, Self::Error> {
        value_from_value_proto(proto)
    }
}

impl TryFrom<&EntityProto> for Entity {
    type Error = CodecError;

    fn try_from(proto: &EntityProto) -> Result<Self, Self::Error> {
        entity_from_entity_proto(proto)
    }
}
