//! Kind registry.
//!
//! The registry maps `(namespace, kind)` pairs to field metadata. It is
//! populated once at startup (in code or from a YAML file) and read
//! afterwards by callers that want typing or indexing hints. Conversions
//! never require a registered kind.
//!
//! ## YAML Format
//!
//! ```yaml
//! kinds:
//!   - kind: Person
//!     fields:
//!       name: { kind: string }
//!       tags: { kind: string, multi: true }
//!       bio: { kind: string, indexed: false }
//!   - namespace: archive
//!     kind: Person
//!     fields: {}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Kind name failed validation
    #[error("Kinds should match [A-Za-z0-9_]+ and contain a non-digit character, got '{0}'")]
    InvalidKind(String),

    /// Error reading registry file
    #[error("Failed to read registry file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

// ============================================================================
// Field Metadata
// ============================================================================

/// Native value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Boolean,
    Integer,
    Double,
    Timestamp,
    Blob,
    Key,
    Entity,
}

fn default_indexed() -> bool {
    true
}

/// Metadata for one field of a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Value type of the field (or of each element when `multi`)
    pub kind: ValueType,

    /// Whether the field holds a list of values
    #[serde(default)]
    pub multi: bool,

    /// Whether the datastore should index the field
    #[serde(default = "default_indexed")]
    pub indexed: bool,
}

impl FieldSchema {
    /// Single-valued, indexed field.
    pub fn new(kind: ValueType) -> Self {
        Self {
            kind,
            multi: false,
            indexed: true,
        }
    }

    /// Mark the field as repeated.
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Mark the field as not indexed.
    pub fn unindexed(mut self) -> Self {
        self.indexed = false;
        self
    }
}

/// Field metadata of a kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindSchema {
    fields: HashMap<String, FieldSchema>,
}

impl KindSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insert.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Set a field, replacing any previous definition.
    pub fn insert_field(&mut self, name: impl Into<String>, field: FieldSchema) {
        self.fields.insert(name.into(), field);
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Get a field by name for in-place modification.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldSchema> {
        self.fields.get_mut(name)
    }

    /// Whether the field should be indexed. Unknown fields are indexed.
    pub fn is_indexed(&self, name: &str) -> bool {
        self.field(name).map_or(true, |f| f.indexed)
    }

    /// All field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Check a kind name: ASCII letters, digits and underscores, not purely
/// numeric.
pub fn validate_kind(kind: &str) -> Result<(), SchemaError> {
    let allowed = kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let all_digits = kind.chars().all(|c| c.is_ascii_digit());
    if kind.is_empty() || !allowed || all_digits {
        return Err(SchemaError::InvalidKind(kind.to_string()));
    }
    Ok(())
}

fn normalize_namespace(namespace: Option<&str>) -> String {
    namespace.unwrap_or_default().to_string()
}

/// Registry of kind schemas keyed by `(namespace, kind)`.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: HashMap<(String, String), KindSchema>,
}

impl KindRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind. A missing or empty namespace means the default
    /// namespace. Re-registering a pair replaces the earlier schema.
    pub fn register_kind(
        &mut self,
        namespace: Option<&str>,
        kind: &str,
        schema: KindSchema,
    ) -> Result<(), SchemaError> {
        validate_kind(kind)?;
        let namespace = normalize_namespace(namespace);
        tracing::debug!(namespace = %namespace, kind, "Registering kind");
        if self
            .kinds
            .insert((namespace, kind.to_string()), schema)
            .is_some()
        {
            tracing::debug!(kind, "Replaced existing kind registration");
        }
        Ok(())
    }

    /// Look up a kind.
    pub fn get_kind(&self, namespace: Option<&str>, kind: &str) -> Option<&KindSchema> {
        self.kinds.get(&(normalize_namespace(namespace), kind.to_string()))
    }

    /// Look up a kind for in-place modification.
    pub fn get_kind_mut(&mut self, namespace: Option<&str>, kind: &str) -> Option<&mut KindSchema> {
        self.kinds
            .get_mut(&(normalize_namespace(namespace), kind.to_string()))
    }

    /// Registered `(namespace, kind)` pairs, sorted.
    pub fn kinds(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .kinds
            .keys()
            .map(|(ns, kind)| (ns.as_str(), kind.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no kind is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Load a registry from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a registry from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;
        let mut registry = Self::new();
        for entry in file.kinds {
            registry.register_kind(entry.namespace.as_deref(), &entry.kind, entry.fields)?;
        }
        Ok(registry)
    }
}

/// On-disk registry layout.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    kinds: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    #[serde(default)]
    namespace: Option<String>,
    kind: String,
    #[serde(default)]
    fields: KindSchema,
}

// ============================================================================
// Tests
// ============================================================================
