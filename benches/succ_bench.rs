use criterion::{black_box, criterion_group, criterion_main, Criterion};
use indexed_seq::{
    BitVector, BitVectorBuilder, GlobalParameters, IndexedSequence, IndexedSequenceEnumerator,
    SequenceEncoding, SequenceEnumerator,
};

struct Fixture {
    name: &'static str,
    bits: BitVector,
    universe: u64,
    n: u64,
}

fn fixture(
    name: &'static str,
    values: Vec<u64>,
    universe: u64,
    params: &GlobalParameters,
) -> Fixture {
    let n = values.len() as u64;
    let mut builder = BitVectorBuilder::new();
    IndexedSequence::write(&mut builder, values, universe, n, params).unwrap();
    Fixture {
        name,
        bits: builder.build(),
        universe,
        n,
    }
}

fn bench_sequences(c: &mut Criterion) {
    let params = GlobalParameters::default();
    let universe = 1u64 << 22;
    let fixtures = [
        // ~1% density: Elias-Fano
        fixture(
            "sparse",
            (0..universe / 100).map(|i| i * 100 + (i * 37) % 100).collect(),
            universe,
            &params,
        ),
        // ~90% density: ranked bitvector
        fixture(
            "dense",
            (0..universe).filter(|v| v % 10 != 0).collect(),
            universe,
            &params,
        ),
        fixture("full", (0..universe).collect(), universe, &params),
    ];

    let mut group = c.benchmark_group("indexed_sequence");
    for f in &fixtures {
        let open = || IndexedSequenceEnumerator::new(&f.bits, 0, f.universe, f.n, &params);
        println!("{}: {} ({} bits)", f.name, open().encoding(), f.bits.len());

        group.bench_function(format!("{}/scan", f.name), |b| {
            b.iter(|| {
                let mut e = open();
                let mut sum = 0u64;
                for _ in 0..f.n {
                    sum = sum.wrapping_add(e.next().1);
                }
                black_box(sum)
            })
        });

        group.bench_function(format!("{}/next_geq", f.name), |b| {
            b.iter(|| {
                let mut e = open();
                let mut lb = 0u64;
                while lb < f.universe {
                    black_box(e.next_geq(lb));
                    lb += 4099;
                }
            })
        });

        group.bench_function(format!("{}/move_to", f.name), |b| {
            b.iter(|| {
                let mut e = open();
                let mut p = 0u64;
                for _ in 0..10_000 {
                    p = (p + 7919) % f.n;
                    black_box(e.move_to(p).ok());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sequences);
criterion_main!(benches);
