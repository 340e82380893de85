//! Key conversion in both directions.

use crate::error::CodecError;
use crate::proto::{KeyProto, PartitionId, PathElementProto};
use datastore_core::{Identifier, Key, KeyError, PathElement};

/// Convert a wire key into a [`Key`].
///
/// An element with both `id` and `name` keeps the id. Only the final element
/// may lack an identifier.
pub fn key_from_key_proto(proto: &KeyProto) -> Result<Key, CodecError> {
    let namespace = proto
        .partition_id
        .as_ref()
        .and_then(|p| p.namespace.clone())
        .unwrap_or_default();

    let last = proto.path_element.len().saturating_sub(1);
    let mut path = Vec::with_capacity(proto.path_element.len());
    for (i, element) in proto.path_element.iter().enumerate() {
        let id = match (&element.id, &element.name) {
            (Some(id), _) => Some(Identifier::Id(*id)),
            (None, Some(name)) => Some(Identifier::Name(name.clone())),
            (None, None) if i == last => None,
            (None, None) => {
                return Err(KeyError::MissingAncestorIdentifier {
                    kind: element.kind.clone(),
                }
                .into())
            }
        };
        path.push(PathElement {
            kind: element.kind.clone(),
            id,
        });
    }

    Ok(Key { namespace, path })
}

/// Convert a [`Key`] into its wire form.
///
/// The key must have a non-empty path whose ancestors all carry an
/// identifier. `partition_id` is only emitted for a non-default namespace.
pub fn key_to_key_proto(key: &Key) -> Result<KeyProto, CodecError> {
    key.validate()?;

    let path_element = key
        .path
        .iter()
        .map(|element| {
            let (id, name) = match &element.id {
                Some(Identifier::Id(id)) => (Some(*id), None),
                Some(Identifier::Name(name)) => (None, Some(name.clone())),
                None => (None, None),
            };
            PathElementProto {
                kind: element.kind.clone(),
                id,
                name,
            }
        })
        .collect();

    let partition_id = (!key.is_default_namespace()).then(|| PartitionId {
        dataset_id: None,
        namespace: Some(key.namespace.clone()),
    });

    Ok(KeyProto {
        partition_id,
        path_element,
    })
}

/// Whether the key's last path element carries an identifier.
pub fn is_key_complete(key: &Key) -> bool {
    key.is_complete()
}

impl TryFrom<&Key> for KeyProto {
    type Error = CodecError;

    fn try_from(key: &Key) -> Result<Self, Self::Error> {
        key_to_key_proto(key)
    }
}

impl TryFrom<&KeyProto> for Key {
    type Error = CodecError;

    fn try_from(proto: &KeyProto) -> Result<Self, Self::Error> {
        key_from_key_proto(proto)
    }
}
