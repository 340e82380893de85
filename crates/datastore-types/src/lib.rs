//! Datastore wire type conversions for datastore-core types.
//!
//! This crate provides the serde model of the datastore's JSON protocol and
//! the conversions between it and datastore-core's native model.
//!
//! # Modules
//!
//! - [`proto`] - Wire types (`KeyProto`, `ValueProto`, `EntityProto`, `QueryProto`, ...)
//! - [`key`] - Key ↔ wire key conversion
//! - [`forward`] - Value/Entity → wire conversion
//! - [`reverse`] - Wire → Value/Entity conversion
//! - [`query`] - Query descriptor → wire query conversion
//!
//! # Example
//!
//! ```rust
//! use datastore_core::{Entity, Key, Value};
//! use datastore_types::{entity_from_entity_proto, entity_to_entity_proto, key_to_key_proto};
//!
//! let key = Key::with_id("Kind", 123).in_namespace("ns");
//! let proto = key_to_key_proto(&key).unwrap();
//! assert_eq!(proto.path_element[0].id, Some(123));
//!
//! let entity = Entity::new().with("name", "Some name").with("count", 5);
//! let wire = entity_to_entity_proto(&entity).unwrap();
//! assert_eq!(entity_from_entity_proto(&wire).unwrap(), entity);
//! ```

pub mod error;
pub mod forward;
pub mod key;
pub mod proto;
pub mod query;
pub mod reverse;

pub use error::CodecError;
pub use forward::{
    entity_to_entity_proto, entity_to_entity_proto_with_schema, entity_to_keyed_entity_proto,
    value_to_value_proto,
};
pub use key::{is_key_complete, key_from_key_proto, key_to_key_proto};
pub use proto::{EntityProto, EntityResult, KeyProto, QueryProto, ValueProto, WireValue};
pub use query::query_to_query_proto;
pub use reverse::{entity_from_entity_proto, format_results, value_from_value_proto};
