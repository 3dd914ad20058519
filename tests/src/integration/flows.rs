//! # Integration Test Flows
//!
//! End-to-end scenarios across both crates:
//!
//! 1. **Hybrid envelope**: a session key wrapped with RSA-OAEP, the payload
//!    sealed with AES-GCM, the whole thing covered by an extended signature
//! 2. **Key ring**: public keys found by their text addresses
//! 3. **Anonymous recipients**: a recipient recognizes its own anonymous id
//!    among many candidates
//! 4. **Key storage**: password-protected keys written to and read from disk

#[cfg(test)]
mod tests {
    use parking_lot::RwLock;
    use shared_crypto::SymmetricKey;
    use std::collections::HashMap;
    use std::sync::OnceLock;
    use unikey::extended_signature;
    use unikey::{
        AnonymousId, AnyKey, KeyAddress, KeyConfig, KeyIdentity, PrivateKey, PublicKey,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn alice() -> &'static PrivateKey {
        static KEY: OnceLock<PrivateKey> = OnceLock::new();
        KEY.get_or_init(|| PrivateKey::generate(1024).unwrap())
    }

    fn bob() -> &'static PrivateKey {
        static KEY: OnceLock<PrivateKey> = OnceLock::new();
        KEY.get_or_init(|| PrivateKey::generate(1024).unwrap())
    }

    /// A sealed message: wrapped session key, sealed payload, signature over both.
    struct Envelope {
        wrapped_key: Vec<u8>,
        sealed: Vec<u8>,
        signature: Vec<u8>,
    }

    fn seal(from: &PrivateKey, to: &PublicKey, payload: &[u8]) -> Envelope {
        let session = SymmetricKey::generate();
        let wrapped_key = to.encrypt(session.as_bytes()).unwrap();
        let sealed = session.encrypt(payload).unwrap();

        let mut covered = wrapped_key.clone();
        covered.extend_from_slice(&sealed);
        let signature = extended_signature::sign(from, &covered, true).unwrap();

        Envelope {
            wrapped_key,
            sealed,
            signature,
        }
    }

    fn open(envelope: &Envelope, me: &PrivateKey) -> Option<(PublicKey, Vec<u8>)> {
        let sender = extended_signature::extract_public_key(&envelope.signature).ok()??;
        let mut covered = envelope.wrapped_key.clone();
        covered.extend_from_slice(&envelope.sealed);
        extended_signature::verify(&sender, &envelope.signature, &covered).ok()??;

        let session = SymmetricKey::from_slice(&me.decrypt(&envelope.wrapped_key).ok()?).ok()?;
        let payload = session.decrypt(&envelope.sealed).ok()?;
        Some((sender, payload))
    }

    // =============================================================================
    // HYBRID ENVELOPE
    // =============================================================================

    #[test]
    fn test_hybrid_envelope_round_trip() {
        let envelope = seal(alice(), bob().public_key(), b"meet at noon");
        let (sender, payload) = open(&envelope, bob()).expect("bob opens the envelope");

        assert_eq!(payload, b"meet at noon");
        assert_eq!(sender.fingerprint(), alice().fingerprint(), "sender identified");
        assert!(sender.is_matching_key(alice()));
    }

    #[test]
    fn test_hybrid_envelope_wrong_recipient() {
        let envelope = seal(alice(), bob().public_key(), b"for bob only");
        assert!(open(&envelope, alice()).is_none(), "alice cannot unwrap bob's session key");
    }

    #[test]
    fn test_hybrid_envelope_tampering() {
        let mut envelope = seal(alice(), bob().public_key(), b"exact words");
        let last = envelope.sealed.len() - 1;
        envelope.sealed[last] ^= 0x01;
        assert!(open(&envelope, bob()).is_none(), "signature covers the sealed payload");
    }

    // =============================================================================
    // KEY RING
    // =============================================================================

    /// Public keys indexed by short address text.
    #[derive(Default)]
    struct KeyRing {
        keys: RwLock<HashMap<String, PublicKey>>,
    }

    impl KeyRing {
        fn add(&self, key: &PublicKey) {
            self.keys
                .write()
                .insert(key.short_address().to_string(), key.clone());
        }

        fn find(&self, address: &KeyAddress) -> Option<PublicKey> {
            self.keys
                .read()
                .values()
                .find(|key| key.is_matching_key_address(address))
                .cloned()
        }
    }

    #[test]
    fn test_key_ring_lookup_by_address() {
        let ring = KeyRing::default();
        ring.add(alice().public_key());
        ring.add(bob().public_key());

        let text = bob().short_address().to_string();
        let address: KeyAddress = text.parse().unwrap();
        assert_eq!(ring.find(&address).as_ref(), Some(bob().public_key()));

        let marked = alice().address(false, 9).unwrap();
        assert_eq!(
            ring.find(&marked).as_ref(),
            Some(alice().public_key()),
            "type marks do not change which key an address names"
        );

        let long = alice().long_address();
        assert_eq!(ring.find(long).as_ref(), Some(alice().public_key()));

        let stranger = PrivateKey::generate(1024).unwrap();
        assert!(ring.find(stranger.short_address()).is_none());
    }

    // =============================================================================
    // ANONYMOUS RECIPIENTS
    // =============================================================================

    #[test]
    fn test_recipient_recognizes_own_anonymous_id() {
        let ids: Vec<AnonymousId> = (0..20)
            .map(|i| {
                let key: &dyn KeyIdentity = if i == 13 { bob() } else { alice() };
                key.create_anonymous_id().unwrap()
            })
            .collect();

        let mine: Vec<usize> = ids
            .iter()
            .enumerate()
            .filter(|(_, id)| bob().match_anonymous_id(id.as_bytes()))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(mine, vec![13]);

        assert!(
            bob().public_key().match_anonymous_id(ids[13].as_bytes()),
            "the public half recognizes the same ids"
        );
    }

    // =============================================================================
    // KEY STORAGE
    // =============================================================================

    #[test]
    fn test_protected_key_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.key");

        let config = KeyConfig::from_lookup(|name| match name {
            "UNIKEY_KDF_ROUNDS" => Some("300".to_string()),
            _ => None,
        });
        assert_eq!(config.password.kdf_rounds, 300);

        let packed = alice()
            .pack_with_password("correct horse", &config.password)
            .unwrap();
        std::fs::write(&path, &packed).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let restored = AnyKey::unpack_with_password(&bytes, "correct horse").unwrap();
        assert_eq!(restored.as_private(), Some(alice()));
        assert_eq!(restored.fingerprint(), alice().fingerprint());

        let err = AnyKey::unpack_with_password(&bytes, "battery staple").unwrap_err();
        assert!(err.is_wrong_password(), "got {err}");

        assert!(AnyKey::unpack(&bytes).unwrap_err().is_format_error());
    }

    #[test]
    fn test_public_key_passes_through_password_unpack() {
        let packed = bob().public_key().pack();
        let key = AnyKey::unpack_with_password(&packed, "ignored").unwrap();
        assert!(key.is_public());
        assert_eq!(key.public_key(), bob().public_key());
    }

    #[test]
    fn test_signature_identifies_signer() {
        let signature = extended_signature::sign(alice(), b"release-1.0.tar", false).unwrap();
        let key_id = extended_signature::extract_key_id(&signature).unwrap();
        assert_eq!(hex::encode(&key_id), alice().fingerprint().to_hex());

        let signer = [alice().public_key(), bob().public_key()]
            .into_iter()
            .find(|key| key.fingerprint().as_bytes()[..] == key_id[..])
            .expect("signer found by key id");
        assert!(extended_signature::verify(signer, &signature, b"release-1.0.tar")
            .unwrap()
            .is_some());
    }
}
