//! Throughput benchmarks for body copying and header parsing
//!
//! - Data mover copy rate across body sizes
//! - Header block parsing across entry counts
//! - Full in-memory write + read of a small archive

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pbo_archive::pbo::header;
use pbo_archive::{PboReader, PboWriter};
use pbo_core::{Archive, DataMover, Entry, Property, ReadLimits};
use std::hint::black_box;
use std::io::Cursor;

/// Body sizes for the copy benchmark
const BODY_SIZES: &[(usize, &str)] = &[
    (256, "256B"),
    (4 * 1024, "4KB"),
    (64 * 1024, "64KB"),
    (1024 * 1024, "1MB"),
];

fn sequential(size: usize) -> Vec<u8> {
    (0..size).map(|i| i as u8).collect()
}

fn archive_with(count: usize) -> Archive {
    let entries = (0..count)
        .map(|i| Entry::regular(format!("addons\\data\\file_{i:05}.paa").into_bytes(), 128))
        .collect();
    let mut archive = Archive::from_entries(entries);
    archive.properties.push(Property::new("prefix", "addons\\data"));
    archive
}

fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("data_mover");

    for &(size, name) in BODY_SIZES {
        let data = sequential(size);
        let mut mover = DataMover::new();
        let mut out = Vec::with_capacity(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                out.clear();
                let mut source = Cursor::new(data.as_slice());
                mover
                    .copy(&mut source, &mut out, data.len() as u64)
                    .unwrap();
                black_box(&out);
            });
        });
    }

    group.finish();
}

fn bench_header_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("header_parse");

    for count in [10usize, 100, 1000] {
        let mut block = Vec::new();
        header::write_header_block(&mut block, &archive_with(count)).unwrap();

        group.throughput(Throughput::Bytes(block.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &block, |b, block| {
            b.iter(|| {
                let mut cursor = Cursor::new(block.as_slice());
                let archive =
                    header::read_archive(&mut cursor, 0, &ReadLimits::BOUNDED).unwrap();
                black_box(archive);
            });
        });
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let archive = archive_with(50);
    let body = sequential(128);

    c.bench_function("write_read_50_entries", |b| {
        b.iter(|| {
            let mut writer = PboWriter::new(Vec::new());
            writer.write_header(&archive).unwrap();
            for _ in 0..archive.entries.len() {
                writer.write_body_bytes(&body).unwrap();
            }
            let bytes = writer.finish().unwrap();

            let mut reader = PboReader::new(Cursor::new(bytes)).unwrap();
            let last = reader.entries()[49].clone();
            black_box(reader.extract_to_vec(&last).unwrap());
        });
    });
}

criterion_group!(benches, bench_copy, bench_header_parse, bench_roundtrip);
criterion_main!(benches);
