//! Benchmarking observation decoding and TEC calibration
//! using a tiny file, in both formats
extern crate criterion;
use criterion::{criterion_group, criterion_main, Criterion};

use rinex_tec::prelude::*;

fn decoding(path: &str, table: &LeapSecondTable) {
    let mut warnings = Vec::<Warning>::new();
    let _ = Decoder::new(table)
        .decode_file(path, &mut warnings)
        .unwrap();
}

fn benchmark(c: &mut Criterion) {
    let table = LeapSecondTable::builtin().unwrap();
    let mut parsing_grp = c.benchmark_group("parsing");

    parsing_grp.bench_function("OBS/V2", |b| {
        b.iter(|| {
            decoding("test_resources/OBS/V2/brux0010.21o", &table);
        })
    });

    parsing_grp.bench_function("CRNX/V1", |b| {
        b.iter(|| {
            decoding("test_resources/OBS/V2/brux0010.21d", &table);
        })
    });

    parsing_grp.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
