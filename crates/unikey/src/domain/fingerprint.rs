//! Key fingerprints: an algorithm tag byte followed by a digest of the
//! public components.

use crate::error::FormatError;
use std::fmt;

/// Tag byte for SHA-256 based fingerprints.
pub const FINGERPRINT_SHA256: u8 = 7;

/// Tag byte reserved for SHA-384 based fingerprints.
pub const FINGERPRINT_SHA384: u8 = 8;

/// Fingerprint size in bytes: tag + SHA-256 digest.
pub const FINGERPRINT_SIZE: usize = 33;

/// Deterministic identifier of a key's public parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    /// Fingerprint from a SHA-256 digest of `e || n`.
    pub(crate) fn from_sha256(digest: &[u8; 32]) -> Self {
        let mut bytes = [0u8; FINGERPRINT_SIZE];
        bytes[0] = FINGERPRINT_SHA256;
        bytes[1..].copy_from_slice(digest);
        Self(bytes)
    }

    /// Parse a persisted fingerprint.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() != FINGERPRINT_SIZE {
            return Err(FormatError::malformed(format!(
                "fingerprint must be {FINGERPRINT_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0] != FINGERPRINT_SHA256 {
            return Err(FormatError::malformed(format!(
                "unsupported fingerprint tag {}",
                bytes[0]
            )));
        }
        let mut out = [0u8; FINGERPRINT_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.0
    }

    /// Algorithm tag byte.
    pub fn algorithm_tag(&self) -> u8 {
        self.0[0]
    }

    /// Digest without the tag byte.
    pub fn digest(&self) -> &[u8] {
        &self.0[1..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
