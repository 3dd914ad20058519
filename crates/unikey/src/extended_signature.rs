//! # Extended Signature
//!
//! Dual-hash signature envelope. The signed target record binds the signer's
//! key id, two digests of the payload, a creation time and optionally the
//! signer's packed public key:
//!
//! ```text
//! target   = { key, sha512, sha3_384, created_at, [pub_key] }
//! envelope = { exts: target, sign: PSS/SHA-512(target), sign2: PSS/SHA3-384(target) }
//! ```
//!
//! A signature is valid only when both RSA signatures and both payload
//! digests check out.

use crate::codec;
use crate::domain::{KeyIdentity, PrivateKey, PublicKey};
use crate::error::{FormatError, KeyError};
use chrono::{DateTime, Utc};
use rmpv::Value;
use shared_crypto::{sha3_384, sha512, HashType};
use tracing::debug;

/// A verified extended signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedSignature {
    key_id: Vec<u8>,
    created_at: DateTime<Utc>,
    public_key: Option<PublicKey>,
    signature: Vec<u8>,
}

impl ExtendedSignature {
    /// Fingerprint of the signing key's public half.
    pub fn key_id(&self) -> &[u8] {
        &self.key_id
    }

    /// Creation time, seconds precision.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Public key embedded by the signer, if any.
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    /// The envelope bytes this was verified from.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// Key id of any key: the fingerprint of its public half.
pub fn key_id<K: KeyIdentity + ?Sized>(key: &K) -> Vec<u8> {
    key.fingerprint().as_ref().to_vec()
}

/// Sign `data`, optionally embedding the packed public key.
pub fn sign(key: &PrivateKey, data: &[u8], save_public_key: bool) -> Result<Vec<u8>, KeyError> {
    let target = create_target_signature(key.public_key(), data, save_public_key, Utc::now());
    let sign = key.sign(&target, HashType::Sha512)?;
    let sign2 = key.sign(&target, HashType::Sha3_384)?;
    Ok(of(&target, &sign, &sign2))
}

/// Pack the target record for `data`. `created_at` is truncated to seconds.
pub fn create_target_signature(
    public_key: &PublicKey,
    data: &[u8],
    save_public_key: bool,
    created_at: DateTime<Utc>,
) -> Vec<u8> {
    let seconds = DateTime::from_timestamp(created_at.timestamp(), 0).unwrap_or(created_at);
    let mut entries = vec![
        ("key", Value::Binary(key_id(public_key))),
        ("sha512", Value::Binary(sha512(data).to_vec())),
        ("sha3_384", Value::Binary(sha3_384(data).to_vec())),
        ("created_at", codec::timestamp(seconds)),
    ];
    if save_public_key {
        entries.push(("pub_key", Value::Binary(public_key.pack())));
    }
    codec::pack(&codec::map(entries))
}

/// Assemble an envelope from a target record and its two signatures.
pub fn of(target: &[u8], sign: &[u8], sign2: &[u8]) -> Vec<u8> {
    codec::pack(&codec::map([
        ("exts", Value::Binary(target.to_vec())),
        ("sign", Value::Binary(sign.to_vec())),
        ("sign2", Value::Binary(sign2.to_vec())),
    ]))
}

/// Verify `signature` over `data` with `key`.
///
/// Returns `Ok(None)` when any signature or digest fails; malformed
/// envelopes are errors.
pub fn verify(key: &PublicKey, signature: &[u8], data: &[u8]) -> Result<Option<ExtendedSignature>, KeyError> {
    let envelope = codec::load_map(signature)?;
    let target = codec::require_binary(&envelope, "exts")?;
    let sign = codec::require_binary(&envelope, "sign")?;
    let sign2 = codec::require_binary(&envelope, "sign2")?;

    if !key.verify(target, sign, HashType::Sha512)? {
        debug!("extended signature: SHA-512 signature mismatch");
        return Ok(None);
    }
    if !key.verify(target, sign2, HashType::Sha3_384)? {
        debug!("extended signature: SHA3-384 signature mismatch");
        return Ok(None);
    }

    let record = codec::load_map(target)?;
    if codec::require_binary(&record, "sha512")? != &sha512(data)[..] {
        debug!("extended signature: SHA-512 digest mismatch");
        return Ok(None);
    }
    if codec::require_binary(&record, "sha3_384")? != &sha3_384(data)[..] {
        debug!("extended signature: SHA3-384 digest mismatch");
        return Ok(None);
    }

    let created_at = codec::get(&record, "created_at")
        .ok_or_else(|| FormatError::malformed("missing created_at"))
        .and_then(|v| codec::parse_timestamp(v, "created_at"))?;

    Ok(Some(ExtendedSignature {
        key_id: codec::require_binary(&record, "key")?.to_vec(),
        created_at,
        public_key: embedded_public_key(&record)?,
        signature: signature.to_vec(),
    }))
}

/// Key id recorded in an envelope, without verifying it.
pub fn extract_key_id(signature: &[u8]) -> Result<Vec<u8>, KeyError> {
    let record = target_record(signature)?;
    Ok(codec::require_binary(&record, "key")?.to_vec())
}

/// Public key embedded in an envelope, without verifying it.
pub fn extract_public_key(signature: &[u8]) -> Result<Option<PublicKey>, KeyError> {
    embedded_public_key(&target_record(signature)?)
}

fn target_record(signature: &[u8]) -> Result<Vec<(Value, Value)>, KeyError> {
    let envelope = codec::load_map(signature)?;
    Ok(codec::load_map(codec::require_binary(&envelope, "exts")?)?)
}

fn embedded_public_key(record: &[(Value, Value)]) -> Result<Option<PublicKey>, KeyError> {
    match codec::get(record, "pub_key") {
        None | Some(Value::Nil) => Ok(None),
        Some(value) => {
            let packed = codec::as_binary(value, "pub_key")?;
            PublicKey::unpack(packed)
                .map(Some)
                .map_err(|e| e.into_format("invalid embedded public key"))
        }
    }
}
