//! Conversion errors.

use datastore_core::KeyError;

/// Error raised by the wire codecs.
///
/// Every conversion fails before producing output; there are no partial
/// results.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Structural key error (empty path, ancestor without identifier)
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A value of this type cannot be encoded
    #[error("Unsupported field value: {0}")]
    UnsupportedValue(&'static str),

    /// A filter operator outside the supported set
    #[error("Unknown filter operator: '{0}'")]
    UnknownOperator(String),

    /// A wire timestamp outside the representable range
    #[error("Timestamp out of range: {0} microseconds")]
    InvalidTimestamp(i64),

    /// A query cursor that is not valid base64
    #[error("Invalid cursor: {0}")]
    InvalidCursor(#[from] base64::DecodeError),

    /// A result entity came back without its key
    #[error("Entity result has no key")]
    MissingEntityKey,

    /// Malformed wire JSON
    #[error("Invalid wire JSON: {0}")]
    Json(#[from] serde_json::Error),
}
