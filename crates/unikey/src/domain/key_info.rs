//! # Key Info
//!
//! Descriptive metadata for a key: algorithm, short tag, key length and,
//! for password-derived symmetric keys, the KDF parameters.
//!
//! Packed as `[algorithm, tag|nil, prf, key_length, rounds, salt|nil]`.

use crate::codec;
use crate::error::{FormatError, KeyError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rmpv::Value;
use shared_crypto::{symmetric, CryptoError, Prf, SymmetricKey};
use std::fmt;

/// Key algorithm recorded in [`KeyInfo`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Not specified
    #[default]
    Undefined,
    /// RSA public key
    RsaPublic,
    /// RSA private key
    RsaPrivate,
    /// AES-256 symmetric key
    Aes256,
}

impl Algorithm {
    /// Persisted code.
    pub fn code(self) -> i64 {
        match self {
            Algorithm::Undefined => 0,
            Algorithm::RsaPublic => 1,
            Algorithm::RsaPrivate => 2,
            Algorithm::Aes256 => 3,
        }
    }

    /// Inverse of [`Algorithm::code`].
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Algorithm::Undefined),
            1 => Some(Algorithm::RsaPublic),
            2 => Some(Algorithm::RsaPrivate),
            3 => Some(Algorithm::Aes256),
            _ => None,
        }
    }

    fn is_rsa(self) -> bool {
        matches!(self, Algorithm::RsaPublic | Algorithm::RsaPrivate)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Undefined => "Undefined",
            Algorithm::RsaPublic => "RSAPublic",
            Algorithm::RsaPrivate => "RSAPrivate",
            Algorithm::Aes256 => "AES256",
        })
    }
}

/// Key metadata. Only the tag changes after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInfo {
    algorithm: Algorithm,
    tag: Option<Vec<u8>>,
    prf: Prf,
    key_length: usize,
    rounds: u32,
    salt: Option<Vec<u8>>,
}

impl KeyInfo {
    /// Info for an asymmetric key of `key_length` bytes.
    pub fn new(algorithm: Algorithm, tag: Option<Vec<u8>>, key_length: usize) -> Self {
        Self {
            algorithm,
            tag,
            prf: Prf::None,
            key_length,
            rounds: 0,
            salt: None,
        }
    }

    /// Info describing an AES-256 key derived from a password.
    pub fn for_password(prf: Prf, rounds: u32, salt: Vec<u8>, tag: Option<Vec<u8>>) -> Self {
        Self {
            algorithm: Algorithm::Aes256,
            tag,
            prf,
            key_length: symmetric::KEY_SIZE,
            rounds,
            salt: Some(salt),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn tag(&self) -> Option<&[u8]> {
        self.tag.as_deref()
    }

    pub fn prf(&self) -> Prf {
        self.prf
    }

    /// Key length in bytes.
    pub fn key_length(&self) -> usize {
        self.key_length
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    pub fn set_tag(&mut self, tag: Vec<u8>) {
        self.tag = Some(tag);
    }

    /// Base64 of the tag; empty without one.
    pub fn base64_tag(&self) -> String {
        self.tag.as_ref().map(|t| BASE64.encode(t)).unwrap_or_default()
    }

    /// Same key length and compatible algorithms.
    ///
    /// Public and private RSA keys of one length match each other.
    pub fn match_type(&self, other: &KeyInfo) -> bool {
        if self.key_length != other.key_length {
            return false;
        }
        self.algorithm == other.algorithm || (self.algorithm.is_rsa() && other.algorithm.is_rsa())
    }

    /// Both tags present and equal.
    pub fn match_tag(&self, other: &KeyInfo) -> bool {
        match (&self.tag, &other.tag) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Derive the symmetric key this info describes from a password.
    pub fn derive_password(&self, password: &str) -> Result<SymmetricKey, KeyError> {
        if self.algorithm != Algorithm::Aes256 {
            return Err(KeyError::Config(format!(
                "cannot derive a password key for {}",
                self.algorithm
            )));
        }
        let salt = self
            .salt
            .as_deref()
            .ok_or_else(|| KeyError::Config("password key info has no salt".to_string()))?;
        if self.prf == Prf::None {
            return Err(CryptoError::UnknownPrf(Prf::None.name().to_string()).into());
        }
        Ok(SymmetricKey::derive_from_password(
            self.prf,
            password.as_bytes(),
            salt,
            self.rounds,
        )?)
    }

    pub fn pack(&self) -> Vec<u8> {
        let optional = |b: &Option<Vec<u8>>| b.clone().map(Value::Binary).unwrap_or(Value::Nil);
        codec::pack(&Value::Array(vec![
            Value::from(self.algorithm.code()),
            optional(&self.tag),
            Value::from(self.prf.code()),
            Value::from(self.key_length as u64),
            Value::from(self.rounds),
            optional(&self.salt),
        ]))
    }

    pub fn unpack(bytes: &[u8]) -> Result<Self, FormatError> {
        let items = codec::load_tuple(bytes)?;

        let code = codec::int_at(&items, 0, "algorithm")?;
        let algorithm = Algorithm::from_code(code)
            .ok_or_else(|| FormatError::malformed(format!("unknown key algorithm {code}")))?;
        let prf_code = codec::int_at(&items, 2, "prf")?;
        let prf = u8::try_from(prf_code)
            .ok()
            .and_then(Prf::from_code)
            .ok_or_else(|| FormatError::malformed(format!("unknown PRF code {prf_code}")))?;
        let key_length = usize::try_from(codec::int_at(&items, 3, "key length")?)
            .map_err(|e| FormatError::malformed_with("bad key length", e))?;
        let rounds = u32::try_from(codec::int_at(&items, 4, "rounds")?)
            .map_err(|e| FormatError::malformed_with("bad rounds", e))?;

        Ok(Self {
            algorithm,
            tag: codec::optional_binary_at(&items, 1, "tag")?,
            prf,
            key_length,
            rounds,
            salt: codec::optional_binary_at(&items, 5, "salt")?,
        })
    }
}

impl fmt::Display for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.key_length)
    }
}
