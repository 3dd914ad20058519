//! # Hash Algorithm Registry
//!
//! Closed set of digest algorithms used by the key layer, addressable both
//! by enum and by canonical algorithm name.
//!
//! ## Supported
//!
//! | Variant | Name | Output |
//! |---------|------|--------|
//! | `Sha1` | SHA-1 | 20 bytes (OAEP padding only) |
//! | `Sha256` | SHA-256 | 32 bytes |
//! | `Sha512` | SHA-512 | 64 bytes |
//! | `Sha3_256` | SHA3-256 | 32 bytes |
//! | `Sha3_384` | SHA3-384 | 48 bytes |
//! | `Sha3_512` | SHA3-512 | 64 bytes |

use crate::CryptoError;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::digest::DynDigest;
use sha2::{Digest, Sha256, Sha512};
use sha3::{Sha3_256, Sha3_384, Sha3_512};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// HMAC output size for the SHA-256 based MAC (bytes).
pub const HMAC_SHA256_SIZE: usize = 32;

const READ_CHUNK: usize = 8 * 1024;

type HmacSha256 = Hmac<Sha256>;

/// Supported hash functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashType {
    /// SHA-1, kept for OAEP/MGF1 compatibility
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
    /// SHA3-256
    Sha3_256,
    /// SHA3-384
    Sha3_384,
    /// SHA3-512
    Sha3_512,
}

impl HashType {
    /// Every registered hash type.
    pub const ALL: [HashType; 6] = [
        HashType::Sha1,
        HashType::Sha256,
        HashType::Sha512,
        HashType::Sha3_256,
        HashType::Sha3_384,
        HashType::Sha3_512,
    ];

    /// Canonical algorithm name.
    pub fn algorithm_name(self) -> &'static str {
        match self {
            HashType::Sha1 => "SHA-1",
            HashType::Sha256 => "SHA-256",
            HashType::Sha512 => "SHA-512",
            HashType::Sha3_256 => "SHA3-256",
            HashType::Sha3_384 => "SHA3-384",
            HashType::Sha3_512 => "SHA3-512",
        }
    }

    /// Look up a hash type by its canonical algorithm name.
    pub fn from_algorithm_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.algorithm_name() == name)
    }

    /// Digest output size in bytes.
    pub fn digest_size(self) -> usize {
        match self {
            HashType::Sha1 => 20,
            HashType::Sha256 | HashType::Sha3_256 => 32,
            HashType::Sha3_384 => 48,
            HashType::Sha512 | HashType::Sha3_512 => 64,
        }
    }

    /// Create a fresh digest engine for this hash type.
    pub fn make_digest(self) -> Box<dyn DynDigest + Send> {
        match self {
            HashType::Sha1 => Box::new(Sha1::default()),
            HashType::Sha256 => Box::new(Sha256::default()),
            HashType::Sha512 => Box::new(Sha512::default()),
            HashType::Sha3_256 => Box::new(Sha3_256::default()),
            HashType::Sha3_384 => Box::new(Sha3_384::default()),
            HashType::Sha3_512 => Box::new(Sha3_512::default()),
        }
    }

    /// Hash data (one-shot).
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut digest = self.make_digest();
        digest.update(data);
        digest.finalize().into_vec()
    }

    /// Hash everything a reader yields.
    pub fn digest_reader<R: Read>(self, reader: &mut R) -> std::io::Result<Vec<u8>> {
        let mut digest = self.make_digest();
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            digest.update(&buf[..n]);
        }
        Ok(digest.finalize().into_vec())
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm_name())
    }
}

impl FromStr for HashType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_algorithm_name(s).ok_or_else(|| CryptoError::UnknownHashAlgorithm(s.to_string()))
    }
}

/// SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// SHA-512 (one-shot).
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Sha512::digest(data));
    out
}

/// SHA3-384 (one-shot).
pub fn sha3_384(data: &[u8]) -> [u8; 48] {
    let mut out = [0u8; 48];
    out.copy_from_slice(&Sha3_384::digest(data));
    out
}

/// HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; HMAC_SHA256_SIZE], CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CryptoError::InvalidInput(format!("hmac key: {e}")))?;
    mac.update(data);
    let mut out = [0u8; HMAC_SHA256_SIZE];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Constant-time check of an HMAC-SHA256 tag.
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}
