//! # Password-Based Key Derivation
//!
//! PBKDF2 over a selectable HMAC pseudo-random function. The PRF names are
//! part of persisted key blobs and must not change.

use crate::CryptoError;
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// Pseudo-random function used by PBKDF2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Prf {
    /// No PRF; derivation is impossible
    None,
    /// HMAC-SHA1
    HmacSha1,
    /// HMAC-SHA256 (default for password-protected keys)
    #[default]
    HmacSha256,
    /// HMAC-SHA512
    HmacSha512,
}

impl Prf {
    /// Persisted name.
    pub fn name(self) -> &'static str {
        match self {
            Prf::None => "NONE",
            Prf::HmacSha1 => "HMAC_SHA1",
            Prf::HmacSha256 => "HMAC_SHA256",
            Prf::HmacSha512 => "HMAC_SHA512",
        }
    }

    /// Numeric code used inside packed key info.
    pub fn code(self) -> u8 {
        match self {
            Prf::None => 0,
            Prf::HmacSha1 => 1,
            Prf::HmacSha256 => 2,
            Prf::HmacSha512 => 3,
        }
    }

    /// Inverse of [`Prf::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Prf::None),
            1 => Some(Prf::HmacSha1),
            2 => Some(Prf::HmacSha256),
            3 => Some(Prf::HmacSha512),
            _ => None,
        }
    }
}

impl fmt::Display for Prf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Prf {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Prf::None),
            "HMAC_SHA1" => Ok(Prf::HmacSha1),
            "HMAC_SHA256" => Ok(Prf::HmacSha256),
            "HMAC_SHA512" => Ok(Prf::HmacSha512),
            other => Err(CryptoError::UnknownPrf(other.to_string())),
        }
    }
}

/// Derive `length` bytes from a password with PBKDF2.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivationFailed` for `Prf::None`, zero rounds
/// or a zero output length.
pub fn derive_key(
    prf: Prf,
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    length: usize,
) -> Result<Vec<u8>, CryptoError> {
    if rounds == 0 {
        return Err(CryptoError::KeyDerivationFailed("rounds must be positive".into()));
    }
    if length == 0 {
        return Err(CryptoError::KeyDerivationFailed("empty output requested".into()));
    }

    let mut out = vec![0u8; length];
    match prf {
        Prf::None => {
            return Err(CryptoError::KeyDerivationFailed("no PRF selected".into()));
        }
        Prf::HmacSha1 => pbkdf2_hmac::<Sha1>(password, salt, rounds, &mut out),
        Prf::HmacSha256 => pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut out),
        Prf::HmacSha512 => pbkdf2_hmac::<Sha512>(password, salt, rounds, &mut out),
    }
    Ok(out)
}
