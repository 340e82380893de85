//! Query descriptors.
//!
//! A [`Query`] is the plain description a query builder produces. It is not
//! validated here; operator strings stay exactly as the caller wrote them and
//! are normalized when the query is converted to its wire form.

use crate::key::Key;
use crate::value::Value;

/// Name of the pseudo-property that addresses an entity's key.
pub const KEY_PROPERTY: &str = "__key__";

/// A single property comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Property name
    pub property: String,

    /// Operator as written by the caller (`=`, `<`, `<=`, `>`, `>=`)
    pub operator: String,

    /// Value compared against
    pub value: Value,
}

impl Filter {
    /// Create a filter.
    pub fn new(
        property: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            property: property.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// A sort order on one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Property name
    pub property: String,

    /// Sort direction
    pub direction: Direction,
}

impl Order {
    /// Ascending order on `property`.
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Ascending,
        }
    }

    /// Descending order on `property`.
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Descending,
        }
    }

    /// Parse the sign-prefixed form: `-name` sorts descending, `+name` and
    /// `name` ascending.
    pub fn parse(spec: &str) -> Self {
        if let Some(property) = spec.strip_prefix('-') {
            Self::descending(property)
        } else {
            Self::ascending(spec.strip_prefix('+').unwrap_or(spec))
        }
    }
}

/// Query descriptor for a single kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    /// Kind to query
    pub kind: String,

    /// Property filters, combined with AND
    pub filters: Vec<Filter>,

    /// Restrict results to descendants of this key
    pub ancestor: Option<Key>,

    /// Projected property names
    pub select: Vec<String>,

    /// Sort orders
    pub orders: Vec<Order>,

    /// Group-by property names
    pub group_by: Vec<String>,

    /// Base64 cursor to start from
    pub start_cursor: Option<String>,

    /// Base64 cursor to end at
    pub end_cursor: Option<String>,

    /// Number of results to skip
    pub offset: Option<u32>,

    /// Maximum number of results
    pub limit: Option<u32>,
}

impl Query {
    /// Create an unfiltered query for `kind`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Add a property filter.
    pub fn filter(
        mut self,
        property: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter::new(property, operator, value));
        self
    }

    /// Restrict the query to descendants of `key`.
    pub fn has_ancestor(mut self, key: Key) -> Self {
        self.ancestor = Some(key);
        self
    }

    /// Project a property.
    pub fn select(mut self, property: impl Into<String>) -> Self {
        self.select.push(property.into());
        self
    }

    /// Add a sort order in sign-prefixed form.
    pub fn order(mut self, spec: &str) -> Self {
        self.orders.push(Order::parse(spec));
        self
    }

    /// Group by a property.
    pub fn group_by(mut self, property: impl Into<String>) -> Self {
        self.group_by.push(property.into());
        self
    }

    /// Start from a cursor.
    pub fn start(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(cursor.into());
        self
    }

    /// End at a cursor.
    pub fn end(mut self, cursor: impl Into<String>) -> Self {
        self.end_cursor = Some(cursor.into());
        self
    }

    /// Skip results.
    pub fn offset(mut self, n: u32) -> Self {
        self.offset = Some(n);
        self
    }

    /// Limit results.
    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parse() {
        assert_eq!(Order::parse("-created"), Order::descending("created"));
        assert_eq!(Order::parse("+name"), Order::ascending("name"));
        assert_eq!(Order::parse("name"), Order::ascending("name"));
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new("Kind1")
            .filter("name", "=", "John")
            .has_ancestor(Key::with_id("Kind2", "somename"))
            .select("name")
            .order("-age")
            .group_by("city")
            .limit(10);

        assert_eq!(query.kind, "Kind1");
        assert_eq!(query.filters, vec![Filter::new("name", "=", "John")]);
        assert_eq!(query.ancestor, Some(Key::with_id("Kind2", "somename")));
        assert_eq!(query.select, vec!["name"]);
        assert_eq!(query.orders, vec![Order::descending("age")]);
        assert_eq!(query.group_by, vec!["city"]);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, None);
    }
}
