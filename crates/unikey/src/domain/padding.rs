//! RSA padding schemes: OAEP for encryption, PSS for signatures.
//!
//! Both use SHA-1 for MGF1. The `rsa` crate's `Pss` ties MGF1 to the message
//! digest, so EMSA-PSS (RFC 8017 §9.1) is done here over the raw RSA
//! operation.

use crate::error::KeyError;
use rand::RngCore;
use rsa::hazmat::{rsa_decrypt_and_check, rsa_encrypt};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use shared_crypto::HashType;

/// PSS trailer field.
const TRAILER: u8 = 0xbc;

/// OAEP with SHA-1 for both the label hash and MGF1.
pub(crate) fn oaep() -> Oaep {
    Oaep::new::<Sha1>()
}

/// `emLen - hLen - 2`, where `emLen` covers `modulus_bits - 1` bits.
pub(crate) fn max_salt_len(hash: HashType, modulus_bits: usize) -> usize {
    let em_len = modulus_bits.saturating_sub(1).div_ceil(8);
    em_len.saturating_sub(hash.digest_size() + 2)
}

// =============================================================================
// PSS SIGN / VERIFY
// =============================================================================

/// PSS-sign a precomputed `m_hash` with the largest salt the modulus allows.
pub(crate) fn pss_sign<R: rand::CryptoRng + RngCore>(
    key: &RsaPrivateKey,
    rng: &mut R,
    hash: HashType,
    m_hash: &[u8],
) -> Result<Vec<u8>, KeyError> {
    let modulus_bits = key.n().bits();
    let em = emsa_pss_encode(hash, m_hash, modulus_bits - 1, rng)?;
    let signature = rsa_decrypt_and_check(key, Some(rng), &BigUint::from_bytes_be(&em))?;
    Ok(left_pad(&signature.to_bytes_be(), key.size()))
}

/// Check a PSS signature over a precomputed `m_hash`.
pub(crate) fn pss_verify(key: &RsaPublicKey, hash: HashType, m_hash: &[u8], signature: &[u8]) -> bool {
    let k = key.size();
    if signature.len() != k {
        return false;
    }
    let s = BigUint::from_bytes_be(signature);
    if &s >= key.n() {
        return false;
    }
    let Ok(m) = rsa_encrypt(key, &s) else {
        return false;
    };

    let em_bits = key.n().bits() - 1;
    let em_len = em_bits.div_ceil(8);
    let em = left_pad(&m.to_bytes_be(), k);
    // When emBits is a multiple of 8 the encoded message is one byte short.
    let (leading, em) = em.split_at(k - em_len);
    leading.iter().all(|b| *b == 0) && emsa_pss_verify(hash, m_hash, em, em_bits)
}

fn emsa_pss_encode<R: RngCore>(
    hash: HashType,
    m_hash: &[u8],
    em_bits: usize,
    rng: &mut R,
) -> Result<Vec<u8>, KeyError> {
    let h_len = hash.digest_size();
    let em_len = em_bits.div_ceil(8);
    let s_len = max_salt_len(hash, em_bits + 1);
    if m_hash.len() != h_len || em_len < h_len + s_len + 2 {
        return Err(rsa::Error::MessageTooLong.into());
    }

    let mut salt = vec![0u8; s_len];
    rng.fill_bytes(&mut salt);
    let h = salted_hash(hash, m_hash, &salt);

    let db_len = em_len - h_len - 1;
    let mut em = vec![0u8; em_len];
    let ps_len = db_len - s_len - 1;
    em[ps_len] = 0x01;
    em[ps_len + 1..db_len].copy_from_slice(&salt);
    mgf1_sha1_xor(&h, &mut em[..db_len]);
    em[0] &= top_byte_mask(em_len, em_bits);
    em[db_len..em_len - 1].copy_from_slice(&h);
    em[em_len - 1] = TRAILER;
    Ok(em)
}

fn emsa_pss_verify(hash: HashType, m_hash: &[u8], em: &[u8], em_bits: usize) -> bool {
    let h_len = hash.digest_size();
    let em_len = em.len();
    let s_len = max_salt_len(hash, em_bits + 1);
    if m_hash.len() != h_len || em_len < h_len + s_len + 2 || em[em_len - 1] != TRAILER {
        return false;
    }

    let db_len = em_len - h_len - 1;
    let mask = top_byte_mask(em_len, em_bits);
    if em[0] & !mask != 0 {
        return false;
    }

    let h = &em[db_len..em_len - 1];
    let mut db = em[..db_len].to_vec();
    mgf1_sha1_xor(h, &mut db);
    db[0] &= mask;

    let ps_len = db_len - s_len - 1;
    if db[..ps_len].iter().any(|b| *b != 0) || db[ps_len] != 0x01 {
        return false;
    }
    salted_hash(hash, m_hash, &db[ps_len + 1..]) == h
}

/// `Hash(0x00 * 8 || m_hash || salt)`
fn salted_hash(hash: HashType, m_hash: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut digest = hash.make_digest();
    digest.update(&[0u8; 8]);
    digest.update(m_hash);
    digest.update(salt);
    digest.finalize().into_vec()
}

/// XOR `out` with MGF1-SHA1(`seed`).
fn mgf1_sha1_xor(seed: &[u8], out: &mut [u8]) {
    for (counter, chunk) in out.chunks_mut(Sha1::output_size()).enumerate() {
        let block = Sha1::new()
            .chain_update(seed)
            .chain_update((counter as u32).to_be_bytes())
            .finalize();
        for (byte, mask) in chunk.iter_mut().zip(block.iter()) {
            *byte ^= mask;
        }
    }
}

/// Bits of the first byte that fall inside `em_bits`.
fn top_byte_mask(em_len: usize, em_bits: usize) -> u8 {
    0xff >> (8 * em_len - em_bits)
}

fn left_pad(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len.saturating_sub(bytes.len())];
    out.extend_from_slice(bytes);
    out
}
