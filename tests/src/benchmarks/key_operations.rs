//! # Key Operation Benchmarks
//!
//! RSA operations at the strengths the crate is typically used with:
//! - PSS sign and verify per digest
//! - OAEP encrypt and decrypt
//! - extended signature sign and verify
//! - password wrap and unwrap at the testing KDF strength

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::time::Duration;
use unikey::{extended_signature, HashType, PasswordConfig, PrivateKey};

/// Generate random message
fn generate_message(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

fn generate_key(bits: usize) -> PrivateKey {
    PrivateKey::generate(bits).expect("benchmark key generation")
}

pub fn bench_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key-generation");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    for bits in [1024usize, 2048] {
        group.bench_with_input(BenchmarkId::new("generate", bits), &bits, |b, &bits| {
            b.iter(|| black_box(generate_key(bits)))
        });
    }

    group.finish();
}

pub fn bench_sign_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("pss-sign-verify");
    group.measurement_time(Duration::from_secs(10));

    let key = generate_key(2048);
    let message = generate_message(1024);

    for hash in [HashType::Sha256, HashType::Sha512, HashType::Sha3_384] {
        let name = hash.algorithm_name();
        group.bench_with_input(BenchmarkId::new("sign", name), &hash, |b, &hash| {
            b.iter(|| black_box(key.sign(&message, hash).unwrap()))
        });

        let signature = key.sign(&message, hash).unwrap();
        group.bench_with_input(BenchmarkId::new("verify", name), &hash, |b, &hash| {
            b.iter(|| black_box(key.public_key().verify(&message, &signature, hash).unwrap()))
        });
    }

    for size in [64usize, 4096, 65536] {
        let message = generate_message(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("sign_sha256_bytes", size), &message, |b, m| {
            b.iter(|| black_box(key.sign(m, HashType::Sha256).unwrap()))
        });
    }

    group.finish();
}

pub fn bench_encrypt_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("oaep-encrypt-decrypt");
    group.measurement_time(Duration::from_secs(10));

    let key = generate_key(2048);
    let session_key = generate_message(32);
    let ciphertext = key.public_key().encrypt(&session_key).unwrap();

    group.bench_function("encrypt_32", |b| {
        b.iter(|| black_box(key.public_key().encrypt(&session_key).unwrap()))
    });
    group.bench_function("decrypt_32", |b| {
        b.iter(|| black_box(key.decrypt(&ciphertext).unwrap()))
    });

    group.finish();
}

pub fn bench_extended_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("extended-signature");
    group.measurement_time(Duration::from_secs(10));

    let key = generate_key(2048);
    let document = generate_message(16 * 1024);
    let signature = extended_signature::sign(&key, &document, true).unwrap();

    group.bench_function("sign_16k", |b| {
        b.iter(|| black_box(extended_signature::sign(&key, &document, true).unwrap()))
    });
    group.bench_function("verify_16k", |b| {
        b.iter(|| {
            black_box(extended_signature::verify(key.public_key(), &signature, &document).unwrap())
        })
    });
    group.bench_function("extract_public_key", |b| {
        b.iter(|| black_box(extended_signature::extract_public_key(&signature).unwrap()))
    });

    group.finish();
}

pub fn bench_password_protection(c: &mut Criterion) {
    let mut group = c.benchmark_group("password-protection");
    group.sample_size(20);

    let key = generate_key(1024);
    let config = PasswordConfig::testing();
    let packed = key.pack_with_password("benchmark", &config).unwrap();

    group.bench_function("pack_with_password", |b| {
        b.iter(|| black_box(key.pack_with_password("benchmark", &config).unwrap()))
    });
    group.bench_function("unpack_with_password", |b| {
        b.iter(|| black_box(PrivateKey::unpack_with_password(&packed, "benchmark").unwrap()))
    });
    group.bench_function("unpack_plain", |b| {
        let plain = unikey::KeyIdentity::pack(&key);
        b.iter(|| black_box(PrivateKey::unpack(&plain).unwrap()))
    });

    group.finish();
}
