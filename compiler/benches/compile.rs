use std::fmt::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use field::{BabyBear, Bn254Fr, RandomField};
use p3_field::{Field, PrimeCharacteristicRing};
use r1cs_compiler::{compile, CircuitReader, CompilerConfig, InputValues};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Running product and sum over two inputs, with a 32-bit split of every
/// eighth product.
fn synthetic_circuit(rounds: usize) -> String {
    let mut body = String::new();
    let (mut prod, mut acc) = (1, 2);
    let mut next = 3;
    for round in 0..rounds {
        writeln!(body, "mul in 2 <{prod} {acc}> out 1 <{next}>").unwrap();
        writeln!(body, "add in 2 <{next} {acc}> out 1 <{}>", next + 1).unwrap();
        writeln!(body, "const-mul-3 in 1 <{}> out 1 <{}>", next + 1, next + 2).unwrap();
        prod = next;
        acc = next + 2;
        next += 3;
        if round % 8 == 7 {
            let bits: Vec<String> = (next..next + 32).map(|w| w.to_string()).collect();
            writeln!(body, "split in 1 <{}> out 32 <{}>", 0, bits.join(" ")).unwrap();
            next += 32;
        }
    }
    writeln!(body, "mul in 2 <{prod} {acc}> out 1 <{next}>").unwrap();
    format!(
        "total {}\ninput 0\ninput 1\ninput 2\n{body}output {next}\n",
        next + 1
    )
}

fn inputs<F: Field + RandomField>(rng: &mut StdRng) -> InputValues<F> {
    [(0, F::ONE), (1, F::random(rng)), (2, F::random(rng))]
        .into_iter()
        .collect()
}

fn bench_compile_babybear(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let circuit = synthetic_circuit(1 << 10);
    let values = inputs::<BabyBear>(&mut rng);

    c.bench_function("compile_babybear_1k_rounds", |bencher| {
        bencher.iter(|| {
            let compiled = compile(black_box(&circuit), &values).expect("compile");
            black_box(compiled);
        })
    });
}

fn bench_compile_bn254(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let circuit = synthetic_circuit(1 << 10);
    let values = inputs::<Bn254Fr>(&mut rng);
    let reader = CircuitReader::new(CompilerConfig::unchecked());

    c.bench_function("compile_bn254_1k_rounds_unchecked", |bencher| {
        bencher.iter(|| {
            let compiled = reader.compile(black_box(&circuit), &values).expect("compile");
            black_box(compiled);
        })
    });
}

criterion_group!(benches, bench_compile_babybear, bench_compile_bn254);
criterion_main!(benches);
