//! Query descriptor documents.
//!
//! The CLI reads query descriptors from YAML or JSON files:
//!
//! ```yaml
//! kind: Person
//! filters:
//!   - property: age
//!     op: ">="
//!     value: 21
//! ancestor:
//!   path: [["Company", "acme"]]
//! select: [name]
//! order: ["-age"]
//! group_by: []
//! limit: 10
//! ```
//!
//! Filter values use the tagged JSON forms of `datastore_core::json`.

use datastore_core::json::{key_from_json, value_from_json};
use datastore_core::{JsonError, Order, Query};
use serde::Deserialize;

/// A single filter entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterDocument {
    pub property: String,
    pub op: String,
    pub value: serde_json::Value,
}

/// Query descriptor as written in a file.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDocument {
    pub kind: String,

    #[serde(default)]
    pub filters: Vec<FilterDocument>,

    /// Ancestor key in `$key` payload form
    #[serde(default)]
    pub ancestor: Option<serde_json::Value>,

    #[serde(default)]
    pub select: Vec<String>,

    /// Sign-prefixed sort orders (`-age`, `name`)
    #[serde(default)]
    pub order: Vec<String>,

    #[serde(default)]
    pub group_by: Vec<String>,

    #[serde(default)]
    pub start_cursor: Option<String>,

    #[serde(default)]
    pub end_cursor: Option<String>,

    #[serde(default)]
    pub offset: Option<u32>,

    #[serde(default)]
    pub limit: Option<u32>,
}

impl QueryDocument {
    /// Parse a YAML (or JSON) query document.
    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    /// Build the native query descriptor.
    pub fn into_query(self) -> Result<Query, JsonError> {
        let filters = self
            .filters
            .into_iter()
            .map(|f| -> Result<_, JsonError> {
                Ok(datastore_core::Filter {
                    property: f.property,
                    operator: f.op,
                    value: value_from_json(&f.value)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ancestor = self.ancestor.as_ref().map(key_from_json).transpose()?;

        Ok(Query {
            kind: self.kind,
            filters,
            ancestor,
            select: self.select,
            orders: self.order.iter().map(|o| Order::parse(o)).collect(),
            group_by: self.group_by,
            start_cursor: self.start_cursor,
            end_cursor: self.end_cursor,
            offset: self.offset,
            limit: self.limit,
        })
    }
}
