//! Query conversion: native query descriptor → wire query.

use crate::error::CodecError;
use crate::forward::value_to_value_proto;
use crate::key::key_to_key_proto;
use crate::proto::{
    CompositeFilter, CompositeOperator, DirectionProto, FilterProto, KindExpression,
    PropertyFilter, PropertyOperator, PropertyOrder, PropertyReference, QueryProto, ValueProto,
    WireValue,
};
use base64::Engine;
use datastore_core::{Direction, Filter, Order, Query, KEY_PROPERTY};
use std::str::FromStr;

impl FromStr for PropertyOperator {
    type Err = CodecError;

    /// Accepts the operators callers write (`=`, `<`, `<=`, `>`, `>=`) and
    /// the wire names themselves.
    fn from_str(op: &str) -> Result<Self, Self::Err> {
        match op.trim() {
            "=" | "EQUAL" => Ok(Self::Equal),
            "<" | "LESS_THAN" => Ok(Self::LessThan),
            "<=" | "LESS_THAN_OR_EQUAL" => Ok(Self::LessThanOrEqual),
            ">" | "GREATER_THAN" => Ok(Self::GreaterThan),
            ">=" | "GREATER_THAN_OR_EQUAL" => Ok(Self::GreaterThanOrEqual),
            "HAS_ANCESTOR" => Ok(Self::HasAncestor),
            other => Err(CodecError::UnknownOperator(other.to_string())),
        }
    }
}

impl From<Direction> for DirectionProto {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Ascending => Self::Ascending,
            Direction::Descending => Self::Descending,
        }
    }
}

fn filter_to_filter_proto(filter: &Filter) -> Result<FilterProto, CodecError> {
    Ok(FilterProto::PropertyFilter(PropertyFilter {
        property: PropertyReference::new(&filter.property),
        operator: filter.operator.parse()?,
        value: value_to_value_proto(&filter.value)?,
    }))
}

fn order_to_property_order(order: &Order) -> PropertyOrder {
    PropertyOrder {
        property: PropertyReference::new(&order.property),
        direction: order.direction.into(),
    }
}

fn validate_cursor(cursor: &Option<String>) -> Result<Option<String>, CodecError> {
    if let Some(cursor) = cursor {
        base64::engine::general_purpose::STANDARD.decode(cursor)?;
    }
    Ok(cursor.clone())
}

/// Convert a query descriptor into a wire query.
///
/// Explicit filters keep their order; an ancestor constraint becomes a
/// trailing `__key__ HAS_ANCESTOR` filter. A single resulting filter is
/// emitted bare, several are joined by an AND composite filter.
pub fn query_to_query_proto(query: &Query) -> Result<QueryProto, CodecError> {
    let mut filters = query
        .filters
        .iter()
        .map(filter_to_filter_proto)
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(ancestor) = &query.ancestor {
        filters.push(FilterProto::PropertyFilter(PropertyFilter {
            property: PropertyReference::new(KEY_PROPERTY),
            operator: PropertyOperator::HasAncestor,
            value: ValueProto::new(WireValue::KeyValue(key_to_key_proto(ancestor)?)),
        }));
    }

    let filter = match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(FilterProto::CompositeFilter(CompositeFilter {
            filter: filters,
            operator: CompositeOperator::And,
        })),
    };

    let proto = QueryProto {
        projection: query.select.clone(),
        kind: vec![KindExpression {
            name: query.kind.clone(),
        }],
        filter,
        order: query.orders.iter().map(order_to_property_order).collect(),
        group_by: query.group_by.clone(),
        start_cursor: validate_cursor(&query.start_cursor)?,
        end_cursor: validate_cursor(&query.end_cursor)?,
        offset: query.offset.filter(|n| *n > 0),
        limit: query.limit.filter(|n| *n > 0),
    };

    tracing::trace!(
        kind = %query.kind,
        filters = query.filters.len(),
        has_ancestor = query.ancestor.is_some(),
        "Converted query to wire form"
    );

    Ok(proto)
}

impl TryFrom<&Query> for QueryProto {
    type Error = CodecError;

    fn try_from(query: &Query) -> Result<Self, Self::Error> {
        query_to_query_proto(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datastore_core::Key;
    use serde_json::json;

    fn to_json(query: &Query) -> serde_json::Value {
        serde_json::to_value(query_to_query_proto(query).unwrap()).unwrap()
    }

    #[test]
    fn test_operator_normalization() {
        let cases = [
            ("=", PropertyOperator::Equal),
            ("<", PropertyOperator::LessThan),
            ("<=", PropertyOperator::LessThanOrEqual),
            (">", PropertyOperator::GreaterThan),
            (">=", PropertyOperator::GreaterThanOrEqual),
            ("HAS_ANCESTOR", PropertyOperator::HasAncestor),
            ("EQUAL", PropertyOperator::Equal),
        ];
        for (op, expected) in cases {
            assert_eq!(op.parse::<PropertyOperator>().unwrap(), expected);
        }
        assert!(matches!(
            "!=".parse::<PropertyOperator>(),
            Err(CodecError::UnknownOperator(ref op)) if op == "!="
        ));
    }

    #[test]
    fn test_unfiltered_query() {
        assert_eq!(
            to_json(&Query::new("Kind1")),
            json!({
                "projection": [],
                "kind": [{"name": "Kind1"}],
                "order": [],
                "group_by": []
            })
        );
    }

    #[test]
    fn test_single_filter_is_bare() {
        let query = Query::new("Kind1").filter("age", ">=", 21);
        assert_eq!(
            to_json(&query)["filter"],
            json!({
                "property_filter": {
                    "property": {"name": "age"},
                    "operator": "GREATER_THAN_OR_EQUAL",
                    "value": {"integer_value": 21}
                }
            })
        );
    }

    #[test]
    fn test_ancestor_only_is_bare() {
        let query = Query::new("Kind1").has_ancestor(Key::with_id("Kind2", "somename"));
        let proto = query_to_query_proto(&query).unwrap();
        assert!(matches!(
            proto.filter,
            Some(FilterProto::PropertyFilter(PropertyFilter {
                operator: PropertyOperator::HasAncestor,
                ..
            }))
        ));
    }

    #[test]
    fn test_filter_with_ancestor() {
        let query = Query::new("Kind1")
            .filter("name", "=", "John")
            .has_ancestor(Key::with_id("Kind2", "somename"));

        assert_eq!(
            to_json(&query),
            json!({
                "projection": [],
                "kind": [{"name": "Kind1"}],
                "filter": {
                    "composite_filter": {
                        "filter": [
                            {"property_filter": {
                                "property": {"name": "name"},
                                "operator": "EQUAL",
                                "value": {"string_value": "John"}
                            }},
                            {"property_filter": {
                                "property": {"name": "__key__"},
                                "operator": "HAS_ANCESTOR",
                                "value": {"key_value": {
                                    "path_element": [{"kind": "Kind2", "name": "somename"}]
                                }}
                            }}
                        ],
                        "operator": "AND"
                    }
                },
                "order": [],
                "group_by": []
            })
        );
    }

    #[test]
    fn test_multiple_filters_keep_order() {
        let query = Query::new("Person")
            .filter("age", ">", 18)
            .filter("age", "<", 65)
            .filter("__key__", "=", Key::with_id("Person", 1));
        let proto = query_to_query_proto(&query).unwrap();
        let Some(FilterProto::CompositeFilter(composite)) = proto.filter else {
            panic!("Expected composite filter");
        };
        let operators: Vec<_> = composite
            .filter
            .iter()
            .map(|f| match f {
                FilterProto::PropertyFilter(pf) => pf.operator,
                FilterProto::CompositeFilter(_) => panic!("Unexpected nested composite"),
            })
            .collect();
        assert_eq!(
            operators,
            vec![
                PropertyOperator::GreaterThan,
                PropertyOperator::LessThan,
                PropertyOperator::Equal
            ]
        );
    }

    #[test]
    fn test_projection_order_group_by() {
        let query = Query::new("Person")
            .select("name")
            .select("age")
            .order("-age")
            .order("name")
            .group_by("city");
        let json = to_json(&query);
        assert_eq!(json["projection"], json!(["name", "age"]));
        assert_eq!(
            json["order"],
            json!([
                {"property": {"name": "age"}, "direction": "DESCENDING"},
                {"property": {"name": "name"}, "direction": "ASCENDING"}
            ])
        );
        assert_eq!(json["group_by"], json!(["city"]));
    }

    #[test]
    fn test_pagination() {
        let query = Query::new("Person")
            .start("c3RhcnQ=")
            .end("ZW5k")
            .offset(0)
            .limit(20);
        let proto = query_to_query_proto(&query).unwrap();
        assert_eq!(proto.start_cursor.as_deref(), Some("c3RhcnQ="));
        assert_eq!(proto.end_cursor.as_deref(), Some("ZW5k"));
        assert_eq!(proto.offset, None);
        assert_eq!(proto.limit, Some(20));

        let bad = Query::new("Person").start("***");
        assert!(matches!(
            query_to_query_proto(&bad),
            Err(CodecError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_invalid_filter_fails_whole_query() {
        let query = Query::new("Person").filter("age", "~", 1);
        assert!(matches!(
            query_to_query_proto(&query),
            Err(CodecError::UnknownOperator(_))
        ));

        let query = Query::new("Person").has_ancestor(Key::default());
        assert!(matches!(
            query_to_query_proto(&query),
            Err(CodecError::Key(_))
        ));
    }
}
