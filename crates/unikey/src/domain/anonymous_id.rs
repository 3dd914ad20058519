//! Anonymous ids: `random(32) || HMAC-SHA256(fingerprint, random)`.
//!
//! Fresh for every call and unlinkable without the key, yet any holder of
//! the key can tell an id was made for it. The MAC key is the public
//! fingerprint, so anyone who knows the fingerprint can also mint ids.

use super::fingerprint::Fingerprint;
use crate::error::{FormatError, KeyError};
use rand::RngCore;
use shared_crypto::hashing::HMAC_SHA256_SIZE;
use shared_crypto::{hmac_sha256, verify_hmac_sha256};
use std::fmt;

/// Random prefix size in bytes.
pub const RANDOM_PART_SIZE: usize = 32;

/// Total anonymous id size.
pub const ANONYMOUS_ID_SIZE: usize = RANDOM_PART_SIZE + HMAC_SHA256_SIZE;

/// Randomized, verifiable token tied to a key fingerprint.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AnonymousId([u8; ANONYMOUS_ID_SIZE]);

impl AnonymousId {
    /// New id for the key with this fingerprint.
    pub fn create(fingerprint: &Fingerprint) -> Result<Self, KeyError> {
        let mut bytes = [0u8; ANONYMOUS_ID_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes[..RANDOM_PART_SIZE]);
        let mac = hmac_sha256(fingerprint.as_ref(), &bytes[..RANDOM_PART_SIZE])?;
        bytes[RANDOM_PART_SIZE..].copy_from_slice(&mac);
        Ok(Self(bytes))
    }

    /// Parse persisted id bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() != ANONYMOUS_ID_SIZE {
            return Err(FormatError::malformed(format!(
                "anonymous id must be {ANONYMOUS_ID_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; ANONYMOUS_ID_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; ANONYMOUS_ID_SIZE] {
        &self.0
    }

    /// True when `id` was created for `fingerprint`. Wrong-length input never matches.
    pub fn matches(id: &[u8], fingerprint: &Fingerprint) -> bool {
        if id.len() != ANONYMOUS_ID_SIZE {
            return false;
        }
        let (random, mac) = id.split_at(RANDOM_PART_SIZE);
        verify_hmac_sha256(fingerprint.as_ref(), random, mac)
    }
}

impl AsRef<[u8]> for AnonymousId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AnonymousId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnonymousId({})", hex::encode(self.0))
    }
}
