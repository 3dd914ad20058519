//! # Key Addresses
//!
//! Compact, checksummed identifiers derived from a key's public components.
//!
//! ```text
//! [ key_mask << 4 | type_mark ] || digest(e || n) || crc32(prefix)
//! ```
//!
//! | Variant | Digest | Size |
//! |---------|--------|------|
//! | short | SHA3-256 | 37 bytes |
//! | long | SHA3-384 | 53 bytes |
//!
//! The text form is base58. Matching compares variant, key mask and digest;
//! the type mark is informational.

use super::key::KeyIdentity;
use crate::error::{FormatError, KeyError};
use shared_crypto::checksum::CRC32_SIZE;
use shared_crypto::{crc32_bytes, verify_crc32_bytes, HashType};
use std::fmt;
use std::str::FromStr;

/// Packed size of a short address.
pub const SHORT_ADDRESS_SIZE: usize = 1 + 32 + CRC32_SIZE;

/// Packed size of a long address.
pub const LONG_ADDRESS_SIZE: usize = 1 + 48 + CRC32_SIZE;

/// Largest type mark that fits the low nibble.
pub const MAX_TYPE_MARK: u8 = 0x0f;

/// Identity token derived from a key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyAddress {
    packed: Vec<u8>,
}

impl KeyAddress {
    /// Address of `key` with a user type mark in `0..=15`.
    pub fn new<K: KeyIdentity + ?Sized>(key: &K, type_mark: u8, long: bool) -> Result<Self, KeyError> {
        if type_mark > MAX_TYPE_MARK {
            return Err(FormatError::InvalidAddress(format!(
                "type mark {type_mark} exceeds {MAX_TYPE_MARK}"
            ))
            .into());
        }
        Ok(Self::derive(key, type_mark, long))
    }

    pub(crate) fn derive<K: KeyIdentity + ?Sized>(key: &K, type_mark: u8, long: bool) -> Self {
        let hash = if long { HashType::Sha3_384 } else { HashType::Sha3_256 };
        let mut digest = hash.make_digest();
        key.update_digest_with_key_components(digest.as_mut());

        let key_mask = key_mask_for_bits(key.info().key_length() * 8);
        let mut packed = Vec::with_capacity(if long { LONG_ADDRESS_SIZE } else { SHORT_ADDRESS_SIZE });
        packed.push((key_mask << 4) | (type_mark & MAX_TYPE_MARK));
        packed.extend_from_slice(&digest.finalize());
        let checksum = crc32_bytes(&packed);
        packed.extend_from_slice(&checksum);
        Self { packed }
    }

    /// Parse and validate packed address bytes.
    pub fn from_packed(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() != SHORT_ADDRESS_SIZE && bytes.len() != LONG_ADDRESS_SIZE {
            return Err(FormatError::InvalidAddress(format!(
                "bad length {}",
                bytes.len()
            )));
        }
        let (body, checksum) = bytes.split_at(bytes.len() - CRC32_SIZE);
        if !verify_crc32_bytes(body, checksum) {
            return Err(FormatError::InvalidAddress("checksum mismatch".to_string()));
        }
        Ok(Self {
            packed: bytes.to_vec(),
        })
    }

    pub fn packed(&self) -> &[u8] {
        &self.packed
    }

    pub fn is_long(&self) -> bool {
        self.packed.len() == LONG_ADDRESS_SIZE
    }

    pub fn type_mark(&self) -> u8 {
        self.packed[0] & MAX_TYPE_MARK
    }

    /// Key strength class: 1 for RSA-2048, 2 for RSA-4096, 0 otherwise.
    pub fn key_mask(&self) -> u8 {
        self.packed[0] >> 4
    }

    /// Digest of the key components.
    pub fn key_digest(&self) -> &[u8] {
        &self.packed[1..self.packed.len() - CRC32_SIZE]
    }

    /// Same variant, same key mask and same digest.
    pub fn is_matching_key_address(&self, other: &KeyAddress) -> bool {
        self.is_long() == other.is_long()
            && self.key_mask() == other.key_mask()
            && self.key_digest() == other.key_digest()
    }

    /// True when this address was derived from `key`.
    pub fn is_matching_key<K: KeyIdentity + ?Sized>(&self, key: &K) -> bool {
        key.is_matching_key_address(self)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.packed).into_string()
    }
}

fn key_mask_for_bits(bits: usize) -> u8 {
    match bits {
        2048 => 1,
        4096 => 2,
        _ => 0,
    }
}

impl fmt::Display for KeyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for KeyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyAddress({})", self.to_base58())
    }
}

impl FromStr for KeyAddress {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| FormatError::InvalidAddress(e.to_string()))?;
        Self::from_packed(&bytes)
    }
}
