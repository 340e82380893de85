//! Wire types.
//!
//! Serde models of the datastore's JSON protocol. Field names follow the
//! protocol exactly (`partition_id`, `path_element`, `string_value`, ...).
//! The value union is modelled as an enum so that exactly one arm can be
//! populated; the JSON form keeps the protocol's flat one-field-per-arm
//! layout.

use serde::{Deserialize, Serialize};

// ============================================================================
// Keys
// ============================================================================

/// Partition a key lives in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// One element of a wire key path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathElementProto {
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Wire key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyProto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<PartitionId>,

    #[serde(default)]
    pub path_element: Vec<PathElementProto>,
}

// ============================================================================
// Values
// ============================================================================

/// The populated arm of a wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    KeyValue(KeyProto),
    StringValue(String),
    BooleanValue(bool),
    IntegerValue(i64),
    DoubleValue(f64),
    TimestampMicrosecondsValue(i64),
    BlobValue(Vec<u8>),
    EntityValue(EntityProto),
    ListValue(Vec<ValueProto>),
}

/// Wire value: at most one union arm plus the `indexed` flag.
///
/// A value with no arm set is valid on the wire and decodes to null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValueProto", into = "RawValueProto")]
pub struct ValueProto {
    pub value: Option<WireValue>,
    pub indexed: Option<bool>,
}

impl ValueProto {
    /// Wrap a union arm with no `indexed` flag.
    pub fn new(value: WireValue) -> Self {
        Self {
            value: Some(value),
            indexed: None,
        }
    }

    /// Set the `indexed` flag.
    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = Some(indexed);
        self
    }
}

/// Flat JSON layout of [`ValueProto`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawValueProto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_value: Option<KeyProto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    integer_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp_microseconds_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    blob_value: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entity_value: Option<EntityProto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_value: Option<Vec<ValueProto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indexed: Option<bool>,
}

impl TryFrom<RawValueProto> for ValueProto {
    type Error = String;

    fn try_from(raw: RawValueProto) -> Result<Self, Self::Error> {
        let arms = [
            raw.key_value.map(WireValue::KeyValue),
            raw.string_value.map(WireValue::StringValue),
            raw.boolean_value.map(WireValue::BooleanValue),
            raw.integer_value.map(WireValue::IntegerValue),
            raw.double_value.map(WireValue::DoubleValue),
            raw.timestamp_microseconds_value
                .map(WireValue::TimestampMicrosecondsValue),
            raw.blob_value.map(WireValue::BlobValue),
            raw.entity_value.map(WireValue::EntityValue),
            raw.list_value.map(WireValue::ListValue),
        ];
        let mut populated = arms.into_iter().flatten();
        let value = populated.next();
        if populated.next().is_some() {
            return Err("value proto has more than one value field set".to_string());
        }
        Ok(Self {
            value,
            indexed: raw.indexed,
        })
    }
}

impl From<ValueProto> for RawValueProto {
    fn from(proto: ValueProto) -> Self {
        let mut raw = RawValueProto {
            indexed: proto.indexed,
            ..Default::default()
        };
        match proto.value {
            Some(WireValue::KeyValue(k)) => raw.key_value = Some(k),
            Some(WireValue::StringValue(s)) => raw.string_value = Some(s),
            Some(WireValue::BooleanValue(b)) => raw.boolean_value = Some(b),
            Some(WireValue::IntegerValue(i)) => raw.integer_value = Some(i),
            Some(WireValue::DoubleValue(f)) => raw.double_value = Some(f),
            Some(WireValue::TimestampMicrosecondsValue(t)) => {
                raw.timestamp_microseconds_value = Some(t)
            }
            Some(WireValue::BlobValue(b)) => raw.blob_value = Some(b),
            Some(WireValue::EntityValue(e)) => raw.entity_value = Some(e),
            Some(WireValue::ListValue(l)) => raw.list_value = Some(l),
            None => {}
        }
        raw
    }
}

/// Blobs travel as base64 strings in the JSON form.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(b)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|s| {
                base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Named property of a wire entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyProto {
    pub name: String,
    pub value: ValueProto,
}

/// Wire entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityProto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyProto>,

    #[serde(default)]
    pub property: Vec<PropertyProto>,
}

/// One entry of a lookup or query result batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    pub entity: EntityProto,
}

// ============================================================================
// Queries
// ============================================================================

/// Kind a query runs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindExpression {
    pub name: String,
}

/// Reference to a property by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyReference {
    pub name: String,
}

impl PropertyReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Comparison operator of a property filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyOperator {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    HasAncestor,
}

impl PropertyOperator {
    /// Wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Self::HasAncestor => "HAS_ANCESTOR",
        }
    }
}

/// Operator joining the children of a composite filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeOperator {
    And,
}

/// Comparison of one property against a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub property: PropertyReference,
    pub operator: PropertyOperator,
    pub value: ValueProto,
}

/// Boolean combination of filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFilter {
    pub filter: Vec<FilterProto>,
    pub operator: CompositeOperator,
}

/// Wire filter: either a property filter or a composite filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterProto {
    PropertyFilter(PropertyFilter),
    CompositeFilter(CompositeFilter),
}

/// Sort direction on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionProto {
    Ascending,
    Descending,
}

/// Sort order on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOrder {
    pub property: PropertyReference,
    pub direction: DirectionProto,
}

/// Wire query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryProto {
    #[serde(default)]
    pub projection: Vec<String>,

    #[serde(default)]
    pub kind: Vec<KindExpression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterProto>,

    #[serde(default)]
    pub order: Vec<PropertyOrder>,

    #[serde(default)]
    pub group_by: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
