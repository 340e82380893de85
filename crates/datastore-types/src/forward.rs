//! Forward conversion: native values and entities → wire protos.

use crate::error::CodecError;
use crate::key::key_to_key_proto;
use crate::proto::{EntityProto, PropertyProto, ValueProto, WireValue};
use datastore_core::{Entity, Key, KindSchema, Value};

/// Convert a native value into a wire value.
///
/// Nested entities are marked `indexed: false` so the datastore does not
/// index their sub-properties individually. `Value::Null` has no wire arm and
/// is rejected.
pub fn value_to_value_proto(value: &Value) -> Result<ValueProto, CodecError> {
    let proto = match value {
        Value::Null => return Err(CodecError::UnsupportedValue(value.type_name())),
        Value::Key(key) => ValueProto::new(WireValue::KeyValue(key_to_key_proto(key)?)),
        Value::String(s) => ValueProto::new(WireValue::StringValue(s.clone())),
        Value::Bool(b) => ValueProto::new(WireValue::BooleanValue(*b)),
        Value::Integer(i) => ValueProto::new(WireValue::IntegerValue(*i)),
        Value::Double(f) => ValueProto::new(WireValue::DoubleValue(*f)),
        // Millisecond precision, expressed in microseconds
        Value::Timestamp(dt) => {
            ValueProto::new(WireValue::TimestampMicrosecondsValue(dt.timestamp_millis() * 1000))
        }
        Value::Blob(bytes) => ValueProto::new(WireValue::BlobValue(bytes.clone())),
        Value::List(values) => {
            let elements = values
                .iter()
                .map(value_to_value_proto)
                .collect::<Result<Vec<_>, _>>()?;
            ValueProto::new(WireValue::ListValue(elements))
        }
        Value::Entity(entity) => {
            ValueProto::new(WireValue::EntityValue(entity_to_entity_proto(entity)?))
                .with_indexed(false)
        }
    };
    Ok(proto)
}

/// Convert an entity into a wire entity, one property per native property in
/// insertion order.
pub fn entity_to_entity_proto(entity: &Entity) -> Result<EntityProto, CodecError> {
    let property = entity
        .iter()
        .map(|(name, value)| -> Result<PropertyProto, CodecError> {
            Ok(PropertyProto {
                name: name.to_string(),
                value: value_to_value_proto(value)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EntityProto {
        key: None,
        property,
    })
}

/// Like [`entity_to_entity_proto`], but fields the schema marks as not
/// indexed carry `indexed: false`. For list values the flag goes on each
/// element, as the protocol does not accept it on the list itself.
pub fn entity_to_entity_proto_with_schema(
    entity: &Entity,
    schema: &KindSchema,
) -> Result<EntityProto, CodecError> {
    let mut proto = entity_to_entity_proto(entity)?;
    for property in proto
        .property
        .iter_mut()
        .filter(|p| !schema.is_indexed(&p.name))
    {
        match &mut property.value.value {
            Some(WireValue::ListValue(elements)) => {
                for element in elements.iter_mut() {
                    element.indexed = Some(false);
                }
            }
            _ => property.value.indexed = Some(false),
        }
    }
    Ok(proto)
}

/// Convert an entity together with its key, as sent in insert and upsert
/// mutations.
pub fn entity_to_keyed_entity_proto(key: &Key, entity: &Entity) -> Result<EntityProto, CodecError> {
    let mut proto = entity_to_entity_proto(entity)?;
    proto.key = Some(key_to_key_proto(key)?);
    Ok(proto)
}

impl TryFrom<&Value> for ValueProto {
    type Error = CodecError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value_to_value_proto(value)
    }
}

impl TryFrom<&Entity> for EntityProto {
    type Error = CodecError;

    fn try_from(entity: &Entity) -> Result<Self, Self::Error> {
        entity_to_entity_proto(entity)
    }
}
