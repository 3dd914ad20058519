//! # Private Key
//!
//! RSA private key `{e, p, q}`. Signs with PSS and decrypts OAEP through
//! its engine pool. Derives exactly one public key, memoized on first use.
//!
//! Packed as `[0, e, p, q]`. See [`super::password`] for the protected form.

use super::address::KeyAddress;
use super::fingerprint::Fingerprint;
use super::key::KeyIdentity;
use super::key_info::{Algorithm, KeyInfo};
use super::padding;
use super::pool::{Engine, EnginePool};
use super::public_key::PublicKey;
use crate::codec::{self, KeyKind};
use crate::error::{FormatError, KeyError};
use rmpv::Value;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};
use shared_crypto::{DynDigest, HashType};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

pub struct PrivateKey {
    pool: EnginePool<RsaPrivateKey>,
    e: Vec<u8>,
    p: Vec<u8>,
    q: Vec<u8>,
    public_key: OnceLock<PublicKey>,
    info: OnceLock<KeyInfo>,
}

impl PrivateKey {
    /// Generate a fresh key of `bits` strength with exponent 65537.
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        debug!(bits, "generating RSA key");
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)?;
        Self::from_primitive(key)
    }

    /// Wrap a two-prime RSA private key.
    pub fn from_primitive(key: RsaPrivateKey) -> Result<Self, KeyError> {
        let (p, q) = match key.primes() {
            [p, q] => (p.to_bytes_be(), q.to_bytes_be()),
            primes => {
                return Err(FormatError::malformed(format!(
                    "expected 2 primes, key has {}",
                    primes.len()
                ))
                .into())
            }
        };
        Ok(Self {
            e: key.e().to_bytes_be(),
            p,
            q,
            pool: EnginePool::new(key),
            public_key: OnceLock::new(),
            info: OnceLock::new(),
        })
    }

    /// Build from big-endian exponent and prime bytes.
    pub fn from_components(e: &[u8], p: &[u8], q: &[u8]) -> Result<Self, KeyError> {
        if e.is_empty() || p.is_empty() || q.is_empty() {
            return Err(FormatError::malformed("empty private key component").into());
        }
        let (e, p, q) = (
            BigUint::from_bytes_be(e),
            BigUint::from_bytes_be(p),
            BigUint::from_bytes_be(q),
        );
        let mut key = RsaPrivateKey::from_p_q(p.clone(), q.clone(), e.clone())
            .map_err(|err| FormatError::malformed_with("invalid private key components", err))?;
        key.validate()
            .and_then(|()| key.precompute())
            .map_err(|err| FormatError::malformed_with("inconsistent private key components", err))?;

        Ok(Self {
            e: e.to_bytes_be(),
            p: p.to_bytes_be(),
            q: q.to_bytes_be(),
            pool: EnginePool::new(key),
            public_key: OnceLock::new(),
            info: OnceLock::new(),
        })
    }

    /// Parse a packed, unprotected private key.
    pub fn unpack(bytes: &[u8]) -> Result<Self, KeyError> {
        let items = codec::load_tuple(bytes)?;
        match codec::key_kind(&items)? {
            KeyKind::Private => Self::from_components(
                codec::binary_at(&items, 1, "e")?,
                codec::binary_at(&items, 2, "p")?,
                codec::binary_at(&items, 3, "q")?,
            ),
            KeyKind::Public => Err(FormatError::WrongKind {
                expected: KeyKind::Private,
                found: KeyKind::Public,
            }
            .into()),
            KeyKind::PasswordProtected => Err(FormatError::PasswordProtected.into()),
        }
    }

    /// Parse a packed private key. The info is always re-derived from the
    /// key, so `_info` only documents what the caller expected.
    pub fn unpack_with_info(bytes: &[u8], _info: &KeyInfo) -> Result<Self, KeyError> {
        Self::unpack(bytes)
    }

    /// Read and parse a packed private key file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let bytes = std::fs::read(path)?;
        Self::unpack(&bytes)
    }

    /// The derived public key. Always the same value for one private key.
    pub fn public_key(&self) -> &PublicKey {
        self.public_key
            .get_or_init(|| PublicKey::from_primitive(self.pool.key().to_public_key()))
    }

    /// PSS-sign `data` with the largest salt the modulus allows.
    pub fn sign(&self, data: &[u8], hash: HashType) -> Result<Vec<u8>, KeyError> {
        self.sign_reader(&mut &data[..], hash)
    }

    pub fn sign_str(&self, text: &str, hash: HashType) -> Result<Vec<u8>, KeyError> {
        self.sign(text.as_bytes(), hash)
    }

    /// PSS-sign everything `reader` yields.
    pub fn sign_reader<R: Read>(&self, reader: &mut R, hash: HashType) -> Result<Vec<u8>, KeyError> {
        let hashed = hash.digest_reader(reader)?;
        self.pool.run(|engine| {
            let Engine { key, rng } = engine;
            padding::pss_sign(key, rng, hash, &hashed)
        })
    }

    /// OAEP-decrypt `ciphertext`.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KeyError> {
        self.pool
            .run(|engine| {
                let Engine { key, rng } = engine;
                key.decrypt_blinded(rng, padding::oaep(), ciphertext)
            })
            .map_err(KeyError::from)
    }

    /// Modulus size in bits.
    pub fn bit_strength(&self) -> usize {
        self.pool.key().n().bits()
    }

    pub fn set_tag(&mut self, tag: impl Into<Vec<u8>>) {
        let mut info = self.info().clone();
        info.set_tag(tag.into());
        self.info = OnceLock::from(info);
    }

    pub fn set_tag_str(&mut self, tag: &str) {
        self.set_tag(tag.as_bytes());
    }

    /// Spare engines created so far by concurrent use.
    pub fn spare_engines(&self) -> usize {
        self.pool.spare_count()
    }
}

impl KeyIdentity for PrivateKey {
    fn fingerprint(&self) -> &Fingerprint {
        self.public_key().fingerprint()
    }

    fn info(&self) -> &KeyInfo {
        self.info.get_or_init(|| {
            let public = self.public_key().info();
            KeyInfo::new(
                Algorithm::RsaPrivate,
                public.tag().map(<[u8]>::to_vec),
                public.key_length(),
            )
        })
    }

    fn update_digest_with_key_components(&self, digest: &mut dyn DynDigest) {
        self.public_key().update_digest_with_key_components(digest);
    }

    fn short_address(&self) -> &KeyAddress {
        self.public_key().short_address()
    }

    fn long_address(&self) -> &KeyAddress {
        self.public_key().long_address()
    }

    fn pack(&self) -> Vec<u8> {
        codec::pack(&Value::Array(vec![
            Value::from(KeyKind::Private.discriminant()),
            Value::Binary(self.e.clone()),
            Value::Binary(self.p.clone()),
            Value::Binary(self.q.clone()),
        ]))
    }

    fn is_private(&self) -> bool {
        true
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self {
            pool: EnginePool::new(self.pool.key().clone()),
            e: self.e.clone(),
            p: self.p.clone(),
            q: self.q.clone(),
            public_key: self.public_key.clone(),
            info: self.info.clone(),
        }
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.e == other.e && self.p == other.p && self.q == other.q
    }
}

impl Eq for PrivateKey {}

impl Hash for PrivateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(&self.p[..self.p.len().min(4)]);
    }
}

/// Renders the public representation; private components never appear.
impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.public_key(), f)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({})", self.public_key())
    }
}
