//! Hierarchical entity keys.
//!
//! A [`Key`] is a namespace plus an ordered path of `(kind, identifier)`
//! elements. Every element except the last must carry an identifier; the
//! last one may be left empty to describe a key whose id is still to be
//! allocated by the datastore.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a single path element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Numeric id (usually allocated by the datastore)
    Id(i64),
    /// Caller-chosen string name
    Name(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<i32> for Identifier {
    fn from(id: i32) -> Self {
        Self::Id(id as i64)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// One `(kind, identifier)` step of a key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathElement {
    /// Kind name of the entity at this level
    pub kind: String,

    /// Identifier, absent for an incomplete trailing element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifier>,
}

impl PathElement {
    /// Create a path element with an identifier.
    pub fn new(kind: impl Into<String>, id: impl Into<Identifier>) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.into()),
        }
    }

    /// Create a path element without an identifier.
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
        }
    }
}

/// Structural key errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The path has no elements
    #[error("A key should contain at least a kind")]
    EmptyPath,

    /// A non-final path element has neither an id nor a name
    #[error("Ancestor keys require an id or name (kind '{kind}')")]
    MissingAncestorIdentifier {
        /// Kind of the offending element
        kind: String,
    },
}

/// Hierarchical entity key.
///
/// Keys are plain values: two keys are equal when their namespaces and
/// paths are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Namespace, empty for the default namespace
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Path from the root ancestor down to this entity
    pub path: Vec<PathElement>,
}

impl Key {
    /// Create a key in the default namespace from path elements.
    pub fn new(path: Vec<PathElement>) -> Self {
        Self {
            namespace: String::new(),
            path,
        }
    }

    /// Create a single-element key with an identifier.
    pub fn with_id(kind: impl Into<String>, id: impl Into<Identifier>) -> Self {
        Self::new(vec![PathElement::new(kind, id)])
    }

    /// Create a single-element key whose identifier is not yet allocated.
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Self::new(vec![PathElement::incomplete(kind)])
    }

    /// Return this key moved into `namespace`.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Return a child key of this one.
    pub fn child(&self, kind: impl Into<String>, id: impl Into<Identifier>) -> Self {
        let mut key = self.clone();
        key.path.push(PathElement::new(kind, id));
        key
    }

    /// Return an incomplete child key of this one.
    pub fn incomplete_child(&self, kind: impl Into<String>) -> Self {
        let mut key = self.clone();
        key.path.push(PathElement::incomplete(kind));
        key
    }

    /// Kind of the last path element.
    pub fn kind(&self) -> Option<&str> {
        self.path.last().map(|e| e.kind.as_str())
    }

    /// Identifier of the last path element.
    pub fn id(&self) -> Option<&Identifier> {
        self.path.last().and_then(|e| e.id.as_ref())
    }

    /// Parent key, if this key has ancestors.
    pub fn parent(&self) -> Option<Key> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Key {
            namespace: self.namespace.clone(),
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Whether the namespace is the default one.
    pub fn is_default_namespace(&self) -> bool {
        self.namespace.is_empty()
    }

    /// A key is complete when its last element carries an identifier.
    pub fn is_complete(&self) -> bool {
        self.path.last().is_some_and(|e| e.id.is_some())
    }

    /// Check the structural rules required by the wire format.
    ///
    /// The path must be non-empty and every ancestor element must carry an
    /// identifier. The final element may be incomplete.
    pub fn validate(&self) -> Result<(), KeyError> {
        let Some((_, ancestors)) = self.path.split_last() else {
            return Err(KeyError::EmptyPath);
        };
        if let Some(missing) = ancestors.iter().find(|e| e.id.is_none()) {
            return Err(KeyError::MissingAncestorIdentifier {
                kind: missing.kind.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}/", self.namespace)?;
        }
        for (i, element) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match &element.id {
                Some(id) => write!(f, "{}:{id}", element.kind)?,
                None => f.write_str(&element.kind)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete() {
        assert!(!Key::incomplete("Kind1").is_complete());
        assert!(Key::with_id("Kind1", 3).is_complete());
        assert!(!Key::default().is_complete());
        assert!(!Key::with_id("Parent", "p").incomplete_child("Kind1").is_complete());
    }

    #[test]
    fn test_validate() {
        assert_eq!(Key::default().validate(), Err(KeyError::EmptyPath));
        assert!(Key::incomplete("Kind1").validate().is_ok());

        let key = Key::new(vec![
            PathElement::incomplete("Parent"),
            PathElement::new("Child", 1),
        ]);
        assert_eq!(
            key.validate(),
            Err(KeyError::MissingAncestorIdentifier {
                kind: "Parent".to_string()
            })
        );
    }

    #[test]
    fn test_parent_and_accessors() {
        let key = Key::with_id("Parent", "p").child("Child", 7).in_namespace("ns");
        assert_eq!(key.kind(), Some("Child"));
        assert_eq!(key.id(), Some(&Identifier::Id(7)));

        let parent = key.parent().expect("parent should exist");
        assert_eq!(parent, Key::with_id("Parent", "p").in_namespace("ns"));
        assert!(parent.parent().is_none());
    }

    #[test]
    fn test_display() {
        let key = Key::with_id("Kind", 123).child("Sub", "name");
        assert_eq!(key.to_string(), "Kind:123/Sub:name");
        assert_eq!(
            Key::incomplete("Kind").in_namespace("ns").to_string(),
            "ns/Kind"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            KeyError::EmptyPath.to_string(),
            "A key should contain at least a kind"
        );
        assert!(KeyError::MissingAncestorIdentifier {
            kind: "K".to_string()
        }
        .to_string()
        .starts_with("Ancestor keys require an id or name"));
    }
}
