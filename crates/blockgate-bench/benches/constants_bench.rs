//! Constant access benchmarks: table lookup by name against the typed
//! enums and the exported getters.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use blockgate_abi::constants_abi::{ACCESSORS, blockgate_zmq_linger};
use blockgate_core::{SocketType, lookup};

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("constant_lookup");

    for name in ["SIZEOF_ZMQ_MSG_T", "ZMQ_LINGER", "ZMQ_XSUB", "ZMQ_NOT_A_THING"] {
        group.bench_with_input(BenchmarkId::new("by_name", name), name, |b, n| {
            b.iter(|| black_box(lookup(black_box(n))));
        });
    }

    group.bench_function("typed_from_raw", |b| {
        b.iter(|| black_box(SocketType::from_raw(black_box(10))));
    });

    group.bench_function("extern_getter", |b| {
        b.iter(|| black_box(blockgate_zmq_linger()));
    });

    group.bench_function("all_getters", |b| {
        b.iter(|| {
            let sum: i32 = ACCESSORS.iter().map(|(_, getter)| getter()).sum();
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
