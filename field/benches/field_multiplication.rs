use criterion::{black_box, criterion_group, criterion_main, Criterion};
use field::{from_hex, BabyBear, Bls381Fr, Bn254Fr, RandomField};
use p3_field::{Field, PrimeCharacteristicRing};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_babybear_mul(c: &mut Criterion) {
    c.bench_function("babybear_mul", |bencher| {
        let a = BabyBear::from_u32(123456789);
        let b = BabyBear::from_u32(987654321);
        bencher.iter(|| black_box(black_box(a) * black_box(b)))
    });
}

fn bench_bn254_mul(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let a = Bn254Fr::random(&mut rng);
    let b = Bn254Fr::random(&mut rng);
    c.bench_function("bn254_mul", |bencher| {
        bencher.iter(|| black_box(black_box(a) * black_box(b)))
    });
}

fn bench_bls381_mul(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let a = Bls381Fr::random(&mut rng);
    let b = Bls381Fr::random(&mut rng);
    c.bench_function("bls381_mul", |bencher| {
        bencher.iter(|| black_box(black_box(a) * black_box(b)))
    });
}

fn bench_bn254_inverse(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let a = Bn254Fr::random(&mut rng);
    c.bench_function("bn254_inverse", |bencher| {
        bencher.iter(|| black_box(black_box(a).try_inverse()))
    });
}

fn bench_bn254_from_hex(c: &mut Criterion) {
    let hex = "2a1b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f80";
    c.bench_function("bn254_from_hex", |bencher| {
        bencher.iter(|| black_box(from_hex::<Bn254Fr>(black_box(hex))))
    });
}

criterion_group!(
    benches,
    bench_babybear_mul,
    bench_bn254_mul,
    bench_bls381_mul,
    bench_bn254_inverse,
    bench_bn254_from_hex
);
criterion_main!(benches);
