//! # Key Identity & Capabilities
//!
//! [`KeyIdentity`] carries everything derived from a key's fingerprint, info
//! and public components: tags, addresses, anonymous ids and matching.
//!
//! [`AnyKey`] is the closed set of concrete keys. It exposes every
//! capability and fails the ones its variant lacks with
//! [`KeyError::Unsupported`].

use super::address::KeyAddress;
use super::anonymous_id::AnonymousId;
use super::fingerprint::Fingerprint;
use super::key_info::KeyInfo;
use super::private_key::PrivateKey;
use super::public_key::PublicKey;
use crate::codec::{self, KeyKind};
use crate::error::{Capability, FormatError, KeyError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use shared_crypto::{DynDigest, HashType};
use std::fmt;
use std::io::Read;

/// Identity operations shared by every key.
pub trait KeyIdentity {
    /// Fingerprint of the public components.
    fn fingerprint(&self) -> &Fingerprint;

    fn info(&self) -> &KeyInfo;

    /// Feed `e` then `n` into `digest`.
    fn update_digest_with_key_components(&self, digest: &mut dyn DynDigest);

    /// Memoized short address, type mark 0.
    fn short_address(&self) -> &KeyAddress;

    /// Memoized long address, type mark 0.
    fn long_address(&self) -> &KeyAddress;

    /// Packed key tuple.
    fn pack(&self) -> Vec<u8>;

    fn is_public(&self) -> bool {
        false
    }

    fn is_private(&self) -> bool {
        false
    }

    fn can_sign(&self) -> bool {
        self.is_private()
    }

    fn packed_info(&self) -> Vec<u8> {
        self.info().pack()
    }

    fn pack_to_base64(&self) -> String {
        BASE64.encode(self.pack())
    }

    fn match_type(&self, other: &dyn KeyIdentity) -> bool {
        self.info().match_type(other.info())
    }

    fn match_tag(&self, other: &dyn KeyIdentity) -> bool {
        self.info().match_tag(other.info())
    }

    fn create_anonymous_id(&self) -> Result<AnonymousId, KeyError> {
        AnonymousId::create(self.fingerprint())
    }

    fn match_anonymous_id(&self, id: &[u8]) -> bool {
        AnonymousId::matches(id, self.fingerprint())
    }

    /// Fresh address with a type mark in `0..=15`.
    fn address(&self, long: bool, type_mark: u8) -> Result<KeyAddress, KeyError> {
        KeyAddress::new(self, type_mark, long)
    }

    /// Compare against the memoized address of the same variant.
    fn is_matching_key_address(&self, address: &KeyAddress) -> bool {
        let own = if address.is_long() {
            self.long_address()
        } else {
            self.short_address()
        };
        own.is_matching_key_address(address)
    }

    /// True when both keys share public components.
    fn is_matching_key(&self, other: &dyn KeyIdentity) -> bool {
        self.short_address()
            .is_matching_key_address(other.short_address())
    }
}

pub(crate) fn feed_components(digest: &mut dyn DynDigest, e: &[u8], n: &[u8]) {
    digest.update(e);
    digest.update(n);
}

/// `{info}:{base64 tag}` of a public key's info.
pub(crate) fn describe(info: &KeyInfo, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", info, info.base64_tag())
}

// =============================================================================
// ANY KEY
// =============================================================================

/// A private or public key behind one type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnyKey {
    /// Decrypt and sign
    Private(PrivateKey),
    /// Encrypt and verify
    Public(PublicKey),
}

impl AnyKey {
    /// Parse a packed private or public key.
    pub fn unpack(bytes: &[u8]) -> Result<Self, KeyError> {
        let items = codec::load_tuple(bytes)?;
        match codec::key_kind(&items)? {
            KeyKind::Private => PrivateKey::unpack(bytes).map(AnyKey::Private),
            KeyKind::Public => PublicKey::unpack(bytes).map(AnyKey::Public),
            KeyKind::PasswordProtected => Err(FormatError::PasswordProtected.into()),
        }
    }

    /// Parse a packed key, unwrapping password protection when present.
    pub fn unpack_with_password(bytes: &[u8], password: &str) -> Result<Self, KeyError> {
        let items = codec::load_tuple(bytes)?;
        match codec::key_kind(&items)? {
            KeyKind::Public => PublicKey::unpack(bytes).map(AnyKey::Public),
            _ => PrivateKey::unpack_with_password(bytes, password).map(AnyKey::Private),
        }
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            AnyKey::Public(key) => key.encrypt(data),
            AnyKey::Private(_) => Err(KeyError::Unsupported(Capability::Encrypt)),
        }
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            AnyKey::Private(key) => key.decrypt(data),
            AnyKey::Public(_) => Err(KeyError::Unsupported(Capability::Decrypt)),
        }
    }

    pub fn sign(&self, data: &[u8], hash: HashType) -> Result<Vec<u8>, KeyError> {
        self.sign_reader(&mut &data[..], hash)
    }

    pub fn sign_reader<R: Read>(&self, reader: &mut R, hash: HashType) -> Result<Vec<u8>, KeyError> {
        match self {
            AnyKey::Private(key) => key.sign_reader(reader, hash),
            AnyKey::Public(_) => Err(KeyError::Unsupported(Capability::Sign)),
        }
    }

    pub fn verify(&self, data: &[u8], signature: &[u8], hash: HashType) -> Result<bool, KeyError> {
        self.verify_reader(&mut &data[..], signature, hash)
    }

    pub fn verify_str(&self, text: &str, signature: &[u8], hash: HashType) -> Result<bool, KeyError> {
        self.verify(text.as_bytes(), signature, hash)
    }

    pub fn verify_reader<R: Read>(
        &self,
        reader: &mut R,
        signature: &[u8],
        hash: HashType,
    ) -> Result<bool, KeyError> {
        match self {
            AnyKey::Public(key) => key.verify_reader(reader, signature, hash),
            AnyKey::Private(_) => Err(KeyError::Unsupported(Capability::Verify)),
        }
    }

    /// Public half: derived for private keys, the key itself otherwise.
    pub fn public_key(&self) -> &PublicKey {
        match self {
            AnyKey::Private(key) => key.public_key(),
            AnyKey::Public(key) => key,
        }
    }

    pub fn as_private(&self) -> Option<&PrivateKey> {
        match self {
            AnyKey::Private(key) => Some(key),
            AnyKey::Public(_) => None,
        }
    }

    pub fn set_tag(&mut self, tag: impl Into<Vec<u8>>) {
        match self {
            AnyKey::Private(key) => key.set_tag(tag),
            AnyKey::Public(key) => key.set_tag(tag),
        }
    }

    pub fn bit_strength(&self) -> usize {
        self.public_key().bit_strength()
    }

    fn identity(&self) -> &dyn KeyIdentity {
        match self {
            AnyKey::Private(key) => key,
            AnyKey::Public(key) => key,
        }
    }
}

impl KeyIdentity for AnyKey {
    fn fingerprint(&self) -> &Fingerprint {
        self.identity().fingerprint()
    }

    fn info(&self) -> &KeyInfo {
        self.identity().info()
    }

    fn update_digest_with_key_components(&self, digest: &mut dyn DynDigest) {
        self.identity().update_digest_with_key_components(digest);
    }

    fn short_address(&self) -> &KeyAddress {
        self.identity().short_address()
    }

    fn long_address(&self) -> &KeyAddress {
        self.identity().long_address()
    }

    fn pack(&self) -> Vec<u8> {
        self.identity().pack()
    }

    fn is_public(&self) -> bool {
        matches!(self, AnyKey::Public(_))
    }

    fn is_private(&self) -> bool {
        matches!(self, AnyKey::Private(_))
    }
}

impl From<PrivateKey> for AnyKey {
    fn from(key: PrivateKey) -> Self {
        AnyKey::Private(key)
    }
}

impl From<PublicKey> for AnyKey {
    fn from(key: PublicKey) -> Self {
        AnyKey::Public(key)
    }
}

impl fmt::Display for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.public_key(), f)
    }
}
