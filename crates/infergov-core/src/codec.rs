//! Canonical JSON codec
//!
//! Every persisted artifact goes through this module. Canonical form is
//! compact JSON with object keys sorted by Unicode code point, no
//! insignificant whitespace, and UTF-8 output. Two structurally equal values
//! always encode to the same bytes, so their SHA-256 digests match.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Failure to produce or read canonical bytes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("value is not representable as canonical JSON: {0}")]
    Unserializable(String),

    #[error("non-finite number in field '{0}'")]
    NonFinite(String),

    #[error("bytes are not valid JSON for the expected shape: {0}")]
    Decode(String),
}

/// Serialize a value into its canonical JSON bytes
///
/// # Errors
///
/// Returns `EncodingError::Unserializable` when serde cannot represent the
/// value (including a non-finite float rejected by [`finite_f64`]).
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodingError> {
    let value = serde_json::to_value(value).map_err(classify)?;
    canonical_value_bytes(&value)
}

/// Canonical bytes of an already-built JSON value
///
/// # Errors
///
/// Returns `EncodingError::Unserializable` if a string cannot be escaped.
pub fn canonical_value_bytes(value: &Value) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::with_capacity(256);
    write_canonical(value, &mut out)?;
    Ok(out)
}

/// Lowercase hex SHA-256 of raw bytes
pub fn hash_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 of the canonical encoding of `value`
///
/// # Errors
///
/// Propagates [`canonicalize`] failures.
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodingError> {
    Ok(hash_hex(&canonicalize(value)?))
}

/// Parse stored bytes back into a typed record
///
/// # Errors
///
/// Returns `EncodingError::Decode` when the bytes are not valid UTF-8 JSON
/// or do not match the shape of `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EncodingError> {
    serde_json::from_slice(bytes).map_err(|e| EncodingError::Decode(e.to_string()))
}

/// True if `s` is a 64-character lowercase hex digest
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

const NON_FINITE_MARKER: &str = "non-finite float:";

/// `serialize_with` helper that refuses NaN and infinities
///
/// serde_json would otherwise emit `null` for them and the hash would
/// silently cover a different value than the caller held.
///
/// # Errors
///
/// Returns a serializer error for non-finite input.
pub fn finite_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        Err(serde::ser::Error::custom(format!(
            "{} {}",
            NON_FINITE_MARKER, value
        )))
    }
}

fn classify(err: serde_json::Error) -> EncodingError {
    let msg = err.to_string();
    if let Some(rest) = msg.strip_prefix(NON_FINITE_MARKER) {
        EncodingError::NonFinite(rest.trim().to_string())
    } else {
        EncodingError::Unserializable(msg)
    }
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), EncodingError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out)?;
                out.push(b':');
                write_canonical(&map[key], out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_string(s: &str, out: &mut Vec<u8>) -> Result<(), EncodingError> {
    let escaped = serde_json::to_string(s).map_err(|e| EncodingError::Unserializable(e.to_string()))?;
    out.extend_from_slice(escaped.as_bytes());
    Ok(())
}
