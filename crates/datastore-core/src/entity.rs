//! Property bags.

use crate::value::Value;

/// An insertion-ordered mapping from property name to [`Value`].
///
/// Inserting a name that is already present replaces its value but keeps
/// its original position, so wire output order is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    properties: Vec<(String, Value)>,
}

impl Entity {
    /// Create an empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a property, returning the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.properties.push((name, value));
                None
            }
        }
    }

    /// Get a property value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.properties.iter().position(|(n, _)| n == name)?;
        Some(self.properties.remove(idx).1)
    }

    /// Whether a property is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether there are no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Property names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }

    /// Properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Entity {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        for (name, value) in iter {
            entity.insert(name, value);
        }
        entity
    }
}

impl IntoIterator for Entity {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let entity = Entity::new()
            .with("zeta", 1)
            .with("alpha", "a")
            .with("mid", true);
        assert_eq!(entity.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut entity = Entity::new().with("a", 1).with("b", 2);
        let previous = entity.insert("a", 10);
        assert_eq!(previous, Some(Value::Integer(1)));
        assert_eq!(entity.get("a"), Some(&Value::Integer(10)));
        assert_eq!(entity.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(entity.len(), 2);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut entity = Entity::new().with("a", 1);
        assert!(entity.contains("a"));
        assert_eq!(entity.remove("a"), Some(Value::Integer(1)));
        assert!(entity.is_empty());
        assert_eq!(entity.remove("a"), None);
    }

    #[test]
    fn test_from_iterator_last_wins() {
        let entity: Entity = vec![
            ("n", Value::Integer(1)),
            ("n", Value::Integer(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(entity.len(), 1);
        assert_eq!(entity.get("n"), Some(&Value::Integer(2)));
    }
}
