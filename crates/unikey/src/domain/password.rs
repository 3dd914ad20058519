//! # Password Protection
//!
//! Wraps a packed private key with a password-derived AES-256 key:
//!
//! ```text
//! [2, rounds, salt, prf_name, nonce || ciphertext || tag, crc32(plaintext)]
//! ```
//!
//! A failed authentication tag or a CRC32 mismatch after decryption both
//! mean the password was wrong. Every other failure is a format error.

use super::key::KeyIdentity;
use super::key_info::KeyInfo;
use super::private_key::PrivateKey;
use crate::codec::{self, KeyKind};
use crate::config::PasswordConfig;
use crate::error::{FormatError, KeyError};
use rmpv::Value;
use shared_crypto::{crc32_bytes, verify_crc32_bytes, CryptoError, Prf};
use tracing::warn;
use zeroize::Zeroize;

/// Salt for password-derived keys.
///
/// A frozen wire constant, not the module path of [`PrivateKey`]: moving the
/// type must not change the keys new blobs are wrapped with. Equal passwords
/// and rounds derive equal keys. Readers always use the salt stored in the
/// blob, so blobs written with any other salt stay readable.
pub const PRIVATE_KEY_SALT: &[u8] = b"unikey::PrivateKey";

impl PrivateKey {
    /// Pack this key encrypted under `password`.
    pub fn pack_with_password(&self, password: &str, config: &PasswordConfig) -> Result<Vec<u8>, KeyError> {
        config.validate()?;

        let info = KeyInfo::for_password(config.prf, config.kdf_rounds, PRIVATE_KEY_SALT.to_vec(), None);
        let wrapping_key = info.derive_password(password)?;

        let mut plaintext = self.pack();
        let checksum = crc32_bytes(&plaintext);
        let ciphertext = wrapping_key.encrypt(&plaintext);
        plaintext.zeroize();
        let ciphertext = ciphertext?;

        Ok(codec::pack(&Value::Array(vec![
            Value::from(KeyKind::PasswordProtected.discriminant()),
            Value::from(config.kdf_rounds),
            Value::Binary(PRIVATE_KEY_SALT.to_vec()),
            Value::from(config.prf.name()),
            Value::Binary(ciphertext),
            Value::Binary(checksum.to_vec()),
        ])))
    }

    /// Unpack a key that may or may not be password protected.
    ///
    /// Unprotected private keys are accepted as-is; the password is unused.
    pub fn unpack_with_password(bytes: &[u8], password: &str) -> Result<Self, KeyError> {
        let items = codec::load_tuple(bytes)?;
        match codec::key_kind(&items)? {
            KeyKind::Private => Self::unpack(bytes),
            KeyKind::Public => Err(FormatError::WrongKind {
                expected: KeyKind::Private,
                found: KeyKind::Public,
            }
            .into()),
            KeyKind::PasswordProtected => unwrap_protected(&items, password)
                .map_err(|e| e.into_format("failed to unpack password protected private key")),
        }
    }
}

fn unwrap_protected(items: &[Value], password: &str) -> Result<PrivateKey, KeyError> {
    let rounds = u32::try_from(codec::int_at(items, 1, "rounds")?)
        .map_err(|e| FormatError::malformed_with("bad KDF rounds", e))?;
    let salt = codec::binary_at(items, 2, "salt")?;
    let prf: Prf = codec::str_at(items, 3, "prf")?
        .parse()
        .map_err(|e: CryptoError| FormatError::malformed_with("unknown PRF", e))?;
    let ciphertext = codec::binary_at(items, 4, "ciphertext")?;
    let checksum = codec::binary_at(items, 5, "checksum")?;

    let wrapping_key = KeyInfo::for_password(prf, rounds, salt.to_vec(), None).derive_password(password)?;

    let mut plaintext = match wrapping_key.decrypt(ciphertext) {
        Ok(plaintext) => plaintext,
        Err(CryptoError::AuthenticationFailed) => {
            warn!("password protected key failed authentication");
            return Err(FormatError::WrongPassword.into());
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_crc32_bytes(&plaintext, checksum) {
        plaintext.zeroize();
        warn!("password protected key failed checksum");
        return Err(FormatError::WrongPassword.into());
    }

    let key = PrivateKey::unpack(&plaintext);
    plaintext.zeroize();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn key() -> &'static PrivateKey {
        static KEY: OnceLock<PrivateKey> = OnceLock::new();
        KEY.get_or_init(|| PrivateKey::generate(1024).unwrap())
    }

    fn protected(password: &str) -> Vec<u8> {
        key()
            .pack_with_password(password, &PasswordConfig::testing())
            .unwrap()
    }

    #[test]
    fn test_password_round_trip() {
        let packed = protected("correct horse");
        let back = PrivateKey::unpack_with_password(&packed, "correct horse").unwrap();
        assert_eq!(&back, key());
    }

    #[test]
    fn test_blob_layout() {
        let items = codec::load_tuple(&protected("pw")).unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(codec::key_kind(&items).unwrap(), KeyKind::PasswordProtected);
        assert_eq!(codec::int_at(&items, 1, "rounds").unwrap(), 250);
        assert_eq!(codec::binary_at(&items, 2, "salt").unwrap(), PRIVATE_KEY_SALT);
        assert_eq!(codec::str_at(&items, 3, "prf").unwrap(), "HMAC_SHA256");
        assert_eq!(codec::binary_at(&items, 5, "checksum").unwrap().len(), 4);
    }

    #[test]
    fn test_salt_is_a_fixed_constant() {
        assert_eq!(PRIVATE_KEY_SALT, b"unikey::PrivateKey");
        assert_eq!(
            codec::binary_at(&codec::load_tuple(&protected("a")).unwrap(), 2, "salt").unwrap(),
            codec::binary_at(&codec::load_tuple(&protected("b")).unwrap(), 2, "salt").unwrap(),
        );
    }

    #[test]
    fn test_stored_salt_is_used_when_reading() {
        let salt = std::any::type_name::<PrivateKey>().as_bytes().to_vec();
        let info = KeyInfo::for_password(Prf::HmacSha256, 250, salt.clone(), None);
        let plaintext = key().pack();
        let ciphertext = info.derive_password("pw").unwrap().encrypt(&plaintext).unwrap();
        let blob = codec::pack(&Value::Array(vec![
            Value::from(2),
            Value::from(250),
            Value::Binary(salt),
            Value::from("HMAC_SHA256"),
            Value::Binary(ciphertext),
            Value::Binary(crc32_bytes(&plaintext).to_vec()),
        ]));

        assert_eq!(&PrivateKey::unpack_with_password(&blob, "pw").unwrap(), key());
        assert!(PrivateKey::unpack_with_password(&blob, "other")
            .unwrap_err()
            .is_wrong_password());
    }

    #[test]
    fn test_wrong_password() {
        let err = PrivateKey::unpack_with_password(&protected("right"), "wrong").unwrap_err();
        assert!(err.is_wrong_password(), "got {err:?}");
        assert!(err.is_format_error());
    }

    #[test]
    fn test_protected_blob_needs_password_path() {
        let err = PrivateKey::unpack(&protected("pw")).unwrap_err();
        assert!(matches!(err, KeyError::Format(FormatError::PasswordProtected)));
    }

    #[test]
    fn test_plain_and_public_inputs() {
        let plain = PrivateKey::unpack_with_password(&key().pack(), "ignored").unwrap();
        assert_eq!(&plain, key());

        let err = PrivateKey::unpack_with_password(&key().public_key().pack(), "pw").unwrap_err();
        assert!(matches!(err, KeyError::Format(FormatError::WrongKind { .. })));
    }

    #[test]
    fn test_checksum_mismatch_is_wrong_password() {
        let mut items = codec::load_tuple(&protected("pw")).unwrap();
        items[5] = Value::Binary(vec![0, 0, 0, 0]);
        let tampered = codec::pack(&Value::Array(items));

        let err = PrivateKey::unpack_with_password(&tampered, "pw").unwrap_err();
        assert!(err.is_wrong_password(), "got {err:?}");
    }

    #[test]
    fn test_malformed_blob_is_not_wrong_password() {
        let mut items = codec::load_tuple(&protected("pw")).unwrap();
        items[3] = Value::from("HMAC_MD5");
        let bad_prf = codec::pack(&Value::Array(items));

        let err = PrivateKey::unpack_with_password(&bad_prf, "pw").unwrap_err();
        assert!(err.is_format_error());
        assert!(!err.is_wrong_password());

        let truncated = codec::pack(&Value::Array(vec![Value::from(2), Value::from(250)]));
        let err = PrivateKey::unpack_with_password(&truncated, "pw").unwrap_err();
        assert!(err.is_format_error());
        assert!(!err.is_wrong_password());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PasswordConfig::testing().with_kdf_rounds(0);
        assert!(matches!(
            key().pack_with_password("pw", &config),
            Err(KeyError::Config(_))
        ));
    }

    #[test]
    fn test_other_prf_round_trip() {
        let config = PasswordConfig::testing().with_prf(Prf::HmacSha512);
        let packed = key().pack_with_password("pw", &config).unwrap();
        assert_eq!(&PrivateKey::unpack_with_password(&packed, "pw").unwrap(), key());
    }
}
