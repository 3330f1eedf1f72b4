//! Performance benchmarks for curvekex-crypto.
//!
//! Run with: `cargo bench -p curvekex-crypto`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use curvekex_crypto::ecdsa::EcdsaP256SigningKey;
use curvekex_crypto::ed25519::SigningKey;
use curvekex_crypto::hash::{HashAlgorithm, digest};
use curvekex_crypto::x25519::PrivateKey;
use rand_core::OsRng;

// ============================================================================
// X25519 Benchmarks
// ============================================================================

fn bench_x25519_keygen(c: &mut Criterion) {
    c.bench_function("x25519_keygen", |b| {
        b.iter(|| {
            let private = PrivateKey::generate(&mut OsRng).unwrap();
            black_box(private.public_key())
        })
    });
}

fn bench_x25519_exchange(c: &mut Criterion) {
    let alice = PrivateKey::generate(&mut OsRng).unwrap();
    let bob_public = PrivateKey::generate(&mut OsRng).unwrap().public_key();

    c.bench_function("x25519_exchange", |b| {
        b.iter(|| alice.exchange(black_box(&bob_public)))
    });
}

// ============================================================================
// Host Signature Benchmarks
// ============================================================================

fn bench_ed25519_verify(c: &mut Criterion) {
    let key = SigningKey::generate(&mut OsRng);
    let verifying = key.verifying_key();
    let hash = [0x42u8; 32];
    let signature = key.sign(&hash);

    c.bench_function("ed25519_verify", |b| {
        b.iter(|| verifying.verify(black_box(&hash), black_box(&signature)))
    });
}

fn bench_ecdsa_p256_verify(c: &mut Criterion) {
    let key = EcdsaP256SigningKey::generate(&mut OsRng);
    let verifying = key.verifying_key();
    let hash = [0x42u8; 32];
    let (r, s) = key.sign(&hash);

    c.bench_function("ecdsa_p256_verify", |b| {
        b.iter(|| verifying.verify(black_box(&hash), black_box(&r), black_box(&s)))
    });
}

// ============================================================================
// Hash Benchmarks
// ============================================================================

fn bench_transcript_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcript_digest");

    // Typical KEXINIT transcripts are 1-2 KiB each
    let sizes = [512, 2048, 8192];

    for size in sizes {
        let data = vec![0xAA; size];
        group.throughput(Throughput::Bytes(size as u64));
        for alg in [HashAlgorithm::Sha256, HashAlgorithm::Sha512] {
            group.bench_with_input(BenchmarkId::new(alg.name(), size), &data, |b, data| {
                b.iter(|| digest(alg, black_box(data)))
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_x25519_keygen,
    bench_x25519_exchange,
    bench_ed25519_verify,
    bench_ecdsa_p256_verify,
    bench_transcript_digest
);
criterion_main!(benches);
