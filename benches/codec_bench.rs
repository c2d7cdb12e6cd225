//! Criterion benchmarks for the AMF3 codec
//!
//! Run with: cargo bench

use amfpack::amf::{Array, Object};
use amfpack::{get_signed_varint, Decoder, Encoder, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");
    group.throughput(Throughput::Elements(1));

    group.bench_function("encode_4_byte", |b| {
        b.iter(|| {
            let mut encoder = Encoder::new();
            encoder.add_integer(black_box(-42)).unwrap();
            encoder.len()
        });
    });

    group.bench_function("decode_3_byte", |b| {
        b.iter(|| get_signed_varint(black_box(&[0x86u8, 0xca, 0x3f][..])).unwrap());
    });

    group.finish();
}

/// An array of records sharing one trait and a handful of repeated strings
fn build_records(encoder: &mut Encoder, count: usize) -> Value {
    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        let mut record = Object::anonymous();
        record.set("id", Value::Integer(i as i32)).unwrap();
        record.set("kind", "sample".into()).unwrap();
        record.set("score", Value::Double(i as f64 * 0.5)).unwrap();
        records.push(Value::Object(encoder.heap_mut().insert_object(record)));
    }
    Value::Array(encoder.heap_mut().insert_array(Array::from_dense(records)))
}

fn bench_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("records");

    for count in [10usize, 1000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(format!("encode_{}", count), |b| {
            b.iter(|| {
                let mut encoder = Encoder::new();
                let root = build_records(&mut encoder, count);
                encoder.add_value(&root).unwrap();
                encoder.finish()
            });
        });

        let mut encoder = Encoder::new();
        let root = build_records(&mut encoder, count);
        encoder.add_value(&root).unwrap();
        let encoded = encoder.finish();

        group.bench_function(format!("decode_{}", count), |b| {
            b.iter(|| {
                let mut decoder = Decoder::new(encoded.clone());
                black_box(decoder.read_data_type().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_varint, bench_records);
criterion_main!(benches);
