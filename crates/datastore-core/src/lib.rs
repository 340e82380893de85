//! Core native types for datastore-codec.
//!
//! This crate provides the language-side object model that the wire codecs
//! convert to and from:
//!
//! - [`Key`] - Namespaced, hierarchical entity keys
//! - [`Value`] - Tagged property values, plus the [`Int`]/[`Double`] wrappers
//! - [`Entity`] - Insertion-ordered property bags
//! - [`Query`] - Query descriptors produced by a query builder
//! - [`KindRegistry`] - Per-kind field metadata
//!
//! # Architecture
//!
//! ```text
//! datastore-core (this crate)
//!    │
//!    └─── datastore-types   (wire types + Key/Value/Entity/Query codecs)
//!            │
//!            └─── datastore-codec   (CLI)
//! ```
//!
//! # Example
//!
//! ```rust
//! use datastore_core::{Entity, Key, Value};
//!
//! let author = Key::with_id("Author", "burcu");
//! let post = Entity::new()
//!     .with("title", "Hello")
//!     .with("author", author)
//!     .with("views", 5);
//!
//! assert_eq!(post.get("views"), Some(&Value::Integer(5)));
//! ```

pub mod entity;
pub mod json;
pub mod key;
pub mod query;
pub mod schema;
pub mod value;

// Re-exports for convenience
pub use entity::Entity;
pub use json::JsonError;
pub use key::{Identifier, Key, KeyError, PathElement};
pub use query::{Direction, Filter, Order, Query, KEY_PROPERTY};
pub use schema::{FieldSchema, KindRegistry, KindSchema, SchemaError, ValueType};
pub use value::{Double, Int, Value};
