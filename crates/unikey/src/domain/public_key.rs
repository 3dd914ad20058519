//! # Public Key
//!
//! RSA public key `{e, n}`: OAEP encryption through the engine pool and PSS
//! verification over any registered digest.
//!
//! Packed as `[1, e, n]`, components as unsigned big-endian bytes.

use super::address::KeyAddress;
use super::fingerprint::Fingerprint;
use super::key::{self, KeyIdentity};
use super::key_info::{Algorithm, KeyInfo};
use super::padding;
use super::pool::{Engine, EnginePool};
use crate::codec::{self, KeyKind};
use crate::error::{FormatError, KeyError};
use rmpv::Value;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use shared_crypto::{DynDigest, HashType};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::sync::OnceLock;

/// Largest modulus accepted when importing public components.
pub const MAX_MODULUS_BITS: usize = 8192;

/// Bytes of the fingerprint digest used as the key tag.
const TAG_RANGE: std::ops::Range<usize> = 1..6;

pub struct PublicKey {
    pool: EnginePool<RsaPublicKey>,
    e: Vec<u8>,
    n: Vec<u8>,
    fingerprint: Fingerprint,
    info: KeyInfo,
    short_address: OnceLock<KeyAddress>,
    long_address: OnceLock<KeyAddress>,
}

impl PublicKey {
    /// Wrap an RSA public key, deriving its fingerprint and info.
    pub fn from_primitive(primitive: RsaPublicKey) -> Self {
        let e = primitive.e().to_bytes_be();
        let n = primitive.n().to_bytes_be();

        let mut digest = HashType::Sha256.make_digest();
        key::feed_components(digest.as_mut(), &e, &n);
        let mut sha = [0u8; 32];
        sha.copy_from_slice(&digest.finalize());
        let fingerprint = Fingerprint::from_sha256(&sha);

        let info = KeyInfo::new(
            Algorithm::RsaPublic,
            Some(fingerprint.as_bytes()[TAG_RANGE].to_vec()),
            primitive.size(),
        );

        Self {
            pool: EnginePool::new(primitive),
            e,
            n,
            fingerprint,
            info,
            short_address: OnceLock::new(),
            long_address: OnceLock::new(),
        }
    }

    /// Build from big-endian exponent and modulus bytes.
    pub fn from_components(e: &[u8], n: &[u8]) -> Result<Self, KeyError> {
        if e.is_empty() || n.is_empty() {
            return Err(FormatError::malformed("empty public key component").into());
        }
        let key = RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(n),
            BigUint::from_bytes_be(e),
            MAX_MODULUS_BITS,
        )
        .map_err(|err| FormatError::malformed_with("invalid public key components", err))?;
        Ok(Self::from_primitive(key))
    }

    /// Parse a packed public key.
    pub fn unpack(bytes: &[u8]) -> Result<Self, KeyError> {
        let items = codec::load_tuple(bytes)?;
        match codec::key_kind(&items)? {
            KeyKind::Public => Self::from_components(
                codec::binary_at(&items, 1, "e")?,
                codec::binary_at(&items, 2, "n")?,
            ),
            found => Err(FormatError::WrongKind {
                expected: KeyKind::Public,
                found,
            }
            .into()),
        }
    }

    /// Parse a packed public key, keeping `info` instead of the derived one.
    pub fn unpack_with_info(bytes: &[u8], info: KeyInfo) -> Result<Self, KeyError> {
        let mut key = Self::unpack(bytes)?;
        key.info = info;
        Ok(key)
    }

    /// OAEP-encrypt `data`; it must fit the padding limit for this modulus.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        self.pool
            .run(|engine| {
                let Engine { key, rng } = engine;
                key.encrypt(rng, padding::oaep(), data)
            })
            .map_err(KeyError::from)
    }

    pub fn encrypt_str(&self, text: &str) -> Result<Vec<u8>, KeyError> {
        self.encrypt(text.as_bytes())
    }

    /// Check a PSS signature over `data`.
    pub fn verify(&self, data: &[u8], signature: &[u8], hash: HashType) -> Result<bool, KeyError> {
        self.verify_reader(&mut &data[..], signature, hash)
    }

    pub fn verify_str(&self, text: &str, signature: &[u8], hash: HashType) -> Result<bool, KeyError> {
        self.verify(text.as_bytes(), signature, hash)
    }

    /// Check a PSS signature over everything `reader` yields.
    pub fn verify_reader<R: Read>(
        &self,
        reader: &mut R,
        signature: &[u8],
        hash: HashType,
    ) -> Result<bool, KeyError> {
        let hashed = hash.digest_reader(reader)?;
        Ok(padding::pss_verify(self.pool.key(), hash, &hashed, signature))
    }

    /// Modulus size in bits.
    pub fn bit_strength(&self) -> usize {
        self.pool.key().n().bits()
    }

    pub fn public_exponent(&self) -> u64 {
        self.e.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }

    pub fn set_tag(&mut self, tag: impl Into<Vec<u8>>) {
        self.info.set_tag(tag.into());
    }

    pub fn set_tag_str(&mut self, tag: &str) {
        self.set_tag(tag.as_bytes());
    }

    /// Spare engines created so far by concurrent use.
    pub fn spare_engines(&self) -> usize {
        self.pool.spare_count()
    }
}

impl KeyIdentity for PublicKey {
    fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn update_digest_with_key_components(&self, digest: &mut dyn DynDigest) {
        key::feed_components(digest, &self.e, &self.n);
    }

    fn short_address(&self) -> &KeyAddress {
        self.short_address
            .get_or_init(|| KeyAddress::derive(self, 0, false))
    }

    fn long_address(&self) -> &KeyAddress {
        self.long_address
            .get_or_init(|| KeyAddress::derive(self, 0, true))
    }

    fn pack(&self) -> Vec<u8> {
        codec::pack(&Value::Array(vec![
            Value::from(KeyKind::Public.discriminant()),
            Value::Binary(self.e.clone()),
            Value::Binary(self.n.clone()),
        ]))
    }

    fn is_public(&self) -> bool {
        true
    }
}

impl Clone for PublicKey {
    fn clone(&self) -> Self {
        Self {
            pool: EnginePool::new(self.pool.key().clone()),
            e: self.e.clone(),
            n: self.n.clone(),
            fingerprint: self.fingerprint,
            info: self.info.clone(),
            short_address: self.short_address.clone(),
            long_address: self.long_address.clone(),
        }
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.e == other.e && self.n == other.n
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(&self.n[..self.n.len().min(4)]);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        key::describe(&self.info, f)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}
