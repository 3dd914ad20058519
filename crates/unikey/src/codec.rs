//! # Packed Wire Format
//!
//! MessagePack helpers shared by every packed structure: key tuples,
//! key info, password blobs and the extended signature maps.
//!
//! ## Key Tuples
//!
//! | Discriminant | Kind | Elements |
//! |--------------|------|----------|
//! | 0 | private key | e, p, q |
//! | 1 | public key | e, n |
//! | 2 | password protected | rounds, salt, prf, ciphertext, crc32 |
//!
//! Timestamps use the MessagePack timestamp extension (type -1). The 8-byte
//! form is emitted; the 4, 8 and 12-byte forms are accepted.

use crate::error::FormatError;
use chrono::{DateTime, Utc};
use rmpv::Value;
use std::fmt;

/// MessagePack extension type reserved for timestamps.
pub const TIMESTAMP_EXT: i8 = -1;

const SECONDS_MASK_34: u64 = (1 << 34) - 1;

/// Kind of packed key, stored as the first tuple element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Unprotected private key
    Private,
    /// Public key
    Public,
    /// Private key wrapped with a password
    PasswordProtected,
}

impl KeyKind {
    /// Tuple discriminant.
    pub fn discriminant(self) -> i64 {
        match self {
            KeyKind::Private => 0,
            KeyKind::Public => 1,
            KeyKind::PasswordProtected => 2,
        }
    }

    /// Inverse of [`KeyKind::discriminant`].
    pub fn from_discriminant(value: i64) -> Option<Self> {
        match value {
            0 => Some(KeyKind::Private),
            1 => Some(KeyKind::Public),
            2 => Some(KeyKind::PasswordProtected),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyKind::Private => "private",
            KeyKind::Public => "public",
            KeyKind::PasswordProtected => "password protected",
        })
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Serialize a value. Writing into a `Vec` cannot fail.
pub fn pack(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    rmpv::encode::write_value(&mut out, value).unwrap_or_default();
    out
}

/// Deepest nesting accepted by [`load`]. Packed keys and envelopes are flat.
pub const MAX_DEPTH: usize = 8;

/// Deserialize exactly one value; trailing bytes are rejected.
pub fn load(bytes: &[u8]) -> Result<Value, FormatError> {
    let mut cursor = bytes;
    let value = rmpv::decode::read_value_with_max_depth(&mut cursor, MAX_DEPTH)
        .map_err(|e| FormatError::malformed_with("failed to decode packed data", e))?;
    if !cursor.is_empty() {
        return Err(FormatError::malformed(format!(
            "{} trailing bytes after packed value",
            cursor.len()
        )));
    }
    Ok(value)
}

/// Deserialize a non-empty array.
pub fn load_tuple(bytes: &[u8]) -> Result<Vec<Value>, FormatError> {
    match load(bytes)? {
        Value::Array(items) if !items.is_empty() => Ok(items),
        Value::Array(_) => Err(FormatError::malformed("empty packed tuple")),
        _ => Err(FormatError::malformed("packed data is not a tuple")),
    }
}

/// Deserialize a map.
pub fn load_map(bytes: &[u8]) -> Result<Vec<(Value, Value)>, FormatError> {
    match load(bytes)? {
        Value::Map(entries) => Ok(entries),
        _ => Err(FormatError::malformed("packed data is not a map")),
    }
}

/// Read the key kind from the first tuple element.
pub fn key_kind(items: &[Value]) -> Result<KeyKind, FormatError> {
    let discriminant = int_at(items, 0, "key type")?;
    KeyKind::from_discriminant(discriminant).ok_or(FormatError::UnknownKind(discriminant))
}

// =============================================================================
// FIELD ACCESS
// =============================================================================

fn at<'a>(items: &'a [Value], index: usize, what: &str) -> Result<&'a Value, FormatError> {
    items
        .get(index)
        .ok_or_else(|| FormatError::malformed(format!("missing {what}")))
}

/// Integer element.
pub fn int_at(items: &[Value], index: usize, what: &str) -> Result<i64, FormatError> {
    as_int(at(items, index, what)?, what)
}

/// Byte-string element.
pub fn binary_at<'a>(items: &'a [Value], index: usize, what: &str) -> Result<&'a [u8], FormatError> {
    as_binary(at(items, index, what)?, what)
}

/// Byte-string element that may be nil.
pub fn optional_binary_at(items: &[Value], index: usize, what: &str) -> Result<Option<Vec<u8>>, FormatError> {
    match at(items, index, what)? {
        Value::Nil => Ok(None),
        other => as_binary(other, what).map(|b| Some(b.to_vec())),
    }
}

/// UTF-8 string element.
pub fn str_at<'a>(items: &'a [Value], index: usize, what: &str) -> Result<&'a str, FormatError> {
    at(items, index, what)?
        .as_str()
        .ok_or_else(|| FormatError::malformed(format!("{what} is not a string")))
}

/// Integer value.
pub fn as_int(value: &Value, what: &str) -> Result<i64, FormatError> {
    value
        .as_i64()
        .ok_or_else(|| FormatError::malformed(format!("{what} is not an integer")))
}

/// Byte-string value.
pub fn as_binary<'a>(value: &'a Value, what: &str) -> Result<&'a [u8], FormatError> {
    match value {
        Value::Binary(bytes) => Ok(bytes),
        _ => Err(FormatError::malformed(format!("{what} is not a byte string"))),
    }
}

/// Look up a string key in a map.
pub fn get<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

/// Look up a required byte-string entry.
pub fn require_binary<'a>(map: &'a [(Value, Value)], key: &str) -> Result<&'a [u8], FormatError> {
    let value = get(map, key).ok_or_else(|| FormatError::malformed(format!("missing {key}")))?;
    as_binary(value, key)
}

/// Build a map with string keys in the given order.
pub fn map<I>(entries: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    Value::Map(entries.into_iter().map(|(k, v)| (Value::from(k), v)).collect())
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Encode a timestamp as the 8-byte extension form.
///
/// Seconds outside the 34-bit range fall back to the 12-byte form.
pub fn timestamp(at: DateTime<Utc>) -> Value {
    let seconds = at.timestamp();
    let nanos = at.timestamp_subsec_nanos();
    if seconds >= 0 && (seconds as u64) <= SECONDS_MASK_34 {
        let data = (u64::from(nanos) << 34) | seconds as u64;
        Value::Ext(TIMESTAMP_EXT, data.to_be_bytes().to_vec())
    } else {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&nanos.to_be_bytes());
        data.extend_from_slice(&seconds.to_be_bytes());
        Value::Ext(TIMESTAMP_EXT, data)
    }
}

/// Decode any of the three timestamp extension forms.
pub fn parse_timestamp(value: &Value, what: &str) -> Result<DateTime<Utc>, FormatError> {
    let data = match value {
        Value::Ext(TIMESTAMP_EXT, data) => data.as_slice(),
        _ => return Err(FormatError::malformed(format!("{what} is not a timestamp"))),
    };

    let (seconds, nanos) = match data.len() {
        4 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(data);
            (i64::from(u32::from_be_bytes(raw)), 0)
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(data);
            let packed = u64::from_be_bytes(raw);
            ((packed & SECONDS_MASK_34) as i64, (packed >> 34) as u32)
        }
        12 => {
            let mut raw_nanos = [0u8; 4];
            let mut raw_seconds = [0u8; 8];
            raw_nanos.copy_from_slice(&data[..4]);
            raw_seconds.copy_from_slice(&data[4..]);
            (i64::from_be_bytes(raw_seconds), u32::from_be_bytes(raw_nanos))
        }
        n => {
            return Err(FormatError::malformed(format!(
                "{what}: bad timestamp length {n}"
            )))
        }
    };

    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| FormatError::malformed(format!("{what}: timestamp out of range")))
}
