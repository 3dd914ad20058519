//! # Identity Benchmarks
//!
//! Fingerprints, addresses and anonymous ids. Memoized addresses are cheap;
//! the interesting numbers are fresh derivations and text parsing.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use unikey::{KeyAddress, KeyIdentity, PrivateKey, PublicKey};

pub fn bench_addresses(c: &mut Criterion) {
    let mut group = c.benchmark_group("key-address");
    group.measurement_time(Duration::from_secs(5));

    let key = PrivateKey::generate(2048).expect("benchmark key generation");
    let public = key.public_key();

    for long in [false, true] {
        let name = if long { "long" } else { "short" };
        group.bench_with_input(BenchmarkId::new("derive", name), &long, |b, &long| {
            b.iter(|| black_box(public.address(long, 3).unwrap()))
        });
    }

    let text = public.long_address().to_string();
    group.bench_function("parse_base58_long", |b| {
        b.iter(|| black_box(text.parse::<KeyAddress>().unwrap()))
    });

    let address = public.address(false, 0).unwrap();
    group.bench_function("match_key", |b| {
        b.iter(|| black_box(address.is_matching_key(public)))
    });

    group.finish();
}

pub fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    let key = PrivateKey::generate(2048).expect("benchmark key generation");
    let packed = key.public_key().pack();

    // Unpacking a public key derives its fingerprint eagerly.
    group.bench_function("unpack_public_key", |b| {
        b.iter(|| black_box(PublicKey::unpack(&packed).unwrap()))
    });

    group.finish();
}

pub fn bench_anonymous_ids(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonymous-id");

    let key = PrivateKey::generate(1024).expect("benchmark key generation");
    let ids: Vec<_> = (0..1000)
        .map(|_| key.create_anonymous_id().unwrap())
        .collect();

    group.bench_function("create", |b| {
        b.iter(|| black_box(key.create_anonymous_id().unwrap()))
    });

    group.throughput(Throughput::Elements(ids.len() as u64));
    group.bench_function("match_1000", |b| {
        b.iter(|| {
            black_box(
                ids.iter()
                    .filter(|id| key.match_anonymous_id(id.as_bytes()))
                    .count(),
            )
        })
    });

    group.finish();
}
