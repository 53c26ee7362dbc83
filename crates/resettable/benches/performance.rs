// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Measures the overhead the wrapper adds on top of a raw stream, plus reset
//! throughput.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use resettable::ResettableStream;
use resettable::testing::Null;

fn wrapper_overhead(c: &mut Criterion) {
    let direct = Null::new();
    c.bench_function("write_direct", |b| {
        b.iter(|| direct.write(black_box(b"payload")).unwrap());
    });

    let wrapped = ResettableStream::new(Arc::new(Null::new()));
    c.bench_function("write_wrapped", |b| {
        b.iter(|| wrapped.write(black_box(b"payload")).unwrap());
    });

    let mut buf = [0_u8; 64];
    c.bench_function("read_wrapped", |b| {
        b.iter(|| wrapped.read(black_box(&mut buf)).unwrap());
    });
}

fn reset_throughput(c: &mut Criterion) {
    let stream = ResettableStream::new(Arc::new(Null::new()));
    c.bench_function("reset", |b| {
        b.iter(|| stream.reset(Arc::new(Null::new()), false).unwrap());
    });
}

criterion_group!(benches, wrapper_overhead, reset_throughput);
criterion_main!(benches);
