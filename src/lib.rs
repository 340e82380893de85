//! datastore-codec library
//!
//! Command implementations behind the `datastore-codec` binary. Each command
//! reads a document (wire JSON, native JSON, or a query descriptor), runs it
//! through the codecs in `datastore-types`, and returns the converted
//! document.
//!
//! # CLI Usage
//!
//! ```bash
//! # Wire form of a key
//! datastore-codec encode-key --namespace ns Company:acme Person:42
//!
//! # Native JSON → wire entity, applying index hints from a registry file
//! datastore-codec encode-entity --kinds kinds.yaml --kind Person person.json
//!
//! # Wire entity → native JSON
//! datastore-codec decode-entity entity_proto.json
//!
//! # Query descriptor → wire query
//! datastore-codec encode-query query.yaml
//! ```

use anyhow::Context;
use clap::Parser;
use datastore_core::json::{entity_from_json, entity_to_json, key_to_json};
use datastore_core::{Identifier, Key, KindRegistry, PathElement};
use datastore_types::proto::EntityProto;
use datastore_types::{
    entity_from_entity_proto, entity_to_entity_proto, entity_to_entity_proto_with_schema,
    format_results, key_from_key_proto, key_to_key_proto, query_to_query_proto, EntityResult,
    KeyProto, QueryProto,
};
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};

pub mod document;

pub use document::QueryDocument;

#[derive(Parser, Clone, Debug, Default)]
pub struct RegistryOpts {
    /// YAML file of kind definitions
    #[arg(long, env = "DATASTORE_KINDS")]
    pub kinds: Option<PathBuf>,
}

impl RegistryOpts {
    /// Load the registry, or an empty one when no file is configured.
    pub fn load(&self) -> anyhow::Result<KindRegistry> {
        match &self.kinds {
            Some(path) => {
                let registry = KindRegistry::from_file(path)
                    .with_context(|| format!("Failed to load kinds from {}", path.display()))?;
                tracing::info!(
                    "Loaded {} kind(s) from {}",
                    registry.len(),
                    path.display()
                );
                Ok(registry)
            }
            None => Ok(KindRegistry::new()),
        }
    }
}

#[derive(Parser, Clone, Debug, Default)]
pub struct OutputOpts {
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl OutputOpts {
    /// Render a serializable document as JSON text.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(out)
    }
}

/// Read a document from a file, or from stdin when the path is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse a `Kind`, `Kind:123`, `Kind:name` or `Kind:'123'` path argument.
///
/// A suffix that parses as an integer becomes a numeric id unless it is
/// quoted, in which case it is a name.
pub fn parse_path_element(arg: &str) -> anyhow::Result<PathElement> {
    let element = match arg.split_once(':') {
        Some((kind, "")) => anyhow::bail!("Empty identifier for kind '{kind}' in '{arg}'"),
        Some((kind, id)) => match unquote(id) {
            Some("") => anyhow::bail!("Empty name for kind '{kind}' in '{arg}'"),
            Some(name) => PathElement::new(kind, name),
            None => match id.parse::<i64>() {
                Ok(id) => PathElement::new(kind, Identifier::Id(id)),
                Err(_) => PathElement::new(kind, id),
            },
        },
        None => PathElement::incomplete(arg),
    };
    if element.kind.is_empty() {
        anyhow::bail!("Empty kind in path element '{arg}'");
    }
    Ok(element)
}

fn unquote(s: &str) -> Option<&str> {
    ['\'', '"']
        .iter()
        .find_map(|q| s.strip_prefix(*q).and_then(|rest| rest.strip_suffix(*q)))
}

/// Build the wire form of a key from CLI path arguments.
pub fn encode_key(namespace: &str, path: &[String]) -> anyhow::Result<KeyProto> {
    let elements = path
        .iter()
        .map(|arg| parse_path_element(arg))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let key = Key::new(elements).in_namespace(namespace);
    tracing::debug!("Encoding key {}", key);
    Ok(key_to_key_proto(&key)?)
}

/// Decode a wire key into its native JSON form plus completeness.
pub fn decode_key(input: &str) -> anyhow::Result<serde_json::Value> {
    let proto: KeyProto = serde_json::from_str(input).context("Input is not a wire key")?;
    let key = key_from_key_proto(&proto)?;
    Ok(json!({
        "key": key_to_json(&key),
        "complete": key.is_complete(),
    }))
}

/// Convert a native JSON entity into a wire entity.
///
/// When `kind` is registered, its index hints are applied. A `$key` payload
/// under the reserved `__key__` property becomes the entity's key.
pub fn encode_entity(
    input: &str,
    registry: &KindRegistry,
    namespace: Option<&str>,
    kind: Option<&str>,
) -> anyhow::Result<EntityProto> {
    let json: serde_json::Value = serde_json::from_str(input).context("Input is not JSON")?;
    let mut entity = entity_from_json(&json)?;

    let key = match entity.remove(datastore_core::KEY_PROPERTY) {
        Some(datastore_core::Value::Key(key)) => Some(key),
        Some(other) => anyhow::bail!(
            "'{}' must hold a key, got {}",
            datastore_core::KEY_PROPERTY,
            other.type_name()
        ),
        None => None,
    };

    let schema = kind.and_then(|k| registry.get_kind(namespace, k));
    if kind.is_some() && schema.is_none() {
        tracing::warn!("Kind {:?} is not registered, encoding without index hints", kind);
    }

    let mut proto = match schema {
        Some(schema) => entity_to_entity_proto_with_schema(&entity, schema)?,
        None => entity_to_entity_proto(&entity)?,
    };
    if let Some(key) = key {
        proto.key = Some(key_to_key_proto(&key)?);
    }
    Ok(proto)
}

/// Convert a wire entity into native JSON.
///
/// An entity carrying a key is rendered as `{"key": ..., "data": ...}`.
pub fn decode_entity(input: &str) -> anyhow::Result<serde_json::Value> {
    let proto: EntityProto = serde_json::from_str(input).context("Input is not a wire entity")?;
    let entity = entity_from_entity_proto(&proto)?;
    match &proto.key {
        Some(key) => Ok(json!({
            "key": key_to_json(&key_from_key_proto(key)?),
            "data": entity_to_json(&entity),
        })),
        None => Ok(entity_to_json(&entity)),
    }
}

/// Convert a batch of wire entity results into `[{"key", "data"}]`.
pub fn decode_results(input: &str) -> anyhow::Result<serde_json::Value> {
    let results: Vec<EntityResult> =
        serde_json::from_str(input).context("Input is not a list of entity results")?;
    let formatted = format_results(&results)?;
    Ok(serde_json::Value::Array(
        formatted
            .iter()
            .map(|(key, entity)| json!({ "key": key_to_json(key), "data": entity_to_json(entity) }))
            .collect(),
    ))
}

/// Convert a query descriptor document into a wire query.
pub fn encode_query(input: &str) -> anyhow::Result<QueryProto> {
    let doc = QueryDocument::from_yaml(input).context("Input is not a query document")?;
    let query = doc.into_query()?;
    Ok(query_to_query_proto(&query)?)
}

/// Validate a registry file and list what it registers.
pub fn check_kinds(path: &Path) -> anyhow::Result<serde_json::Value> {
    let registry = RegistryOpts {
        kinds: Some(path.to_path_buf()),
    }
    .load()?;
    let kinds = registry
        .kinds()
        .into_iter()
        .map(|(namespace, kind)| {
            let mut fields = registry
                .get_kind(Some(namespace), kind)
                .map(|schema| schema.field_names())
                .unwrap_or_default();
            fields.sort_unstable();
            json!({ "namespace": namespace, "kind": kind, "fields": fields })
        })
        .collect();
    Ok(serde_json::Value::Array(kinds))
}
