//! # Unikey Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | key-generation | RSA key generation, 1024 and 2048 bits |
//! | pss-sign-verify | PSS per digest and per message size |
//! | oaep-encrypt-decrypt | session key wrapping |
//! | extended-signature | dual-hash envelopes |
//! | password-protection | KDF plus AES-GCM wrap at testing strength |
//! | key-address / fingerprint / anonymous-id | identity derivations |

use criterion::{criterion_group, criterion_main};
use unikey_tests::benchmarks::{identity, key_operations};

criterion_group!(
    benches,
    key_operations::bench_key_generation,
    key_operations::bench_sign_verify,
    key_operations::bench_encrypt_decrypt,
    key_operations::bench_extended_signature,
    key_operations::bench_password_protection,
    identity::bench_addresses,
    identity::bench_fingerprint,
    identity::bench_anonymous_ids,
);

criterion_main!(benches);
