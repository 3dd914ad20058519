//! Keys shared by the integration tests. RSA generation dominates test time,
//! so each test binary generates at most one key per strength.

#![allow(dead_code)]

use std::sync::OnceLock;
use unikey::PrivateKey;

pub fn key_1024() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    KEY.get_or_init(|| PrivateKey::generate(1024).expect("1024-bit key generation"))
}

pub fn key_2048() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    KEY.get_or_init(|| PrivateKey::generate(2048).expect("2048-bit key generation"))
}
