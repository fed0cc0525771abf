//! Codec benchmarks: address parsing, frame encoding, response decoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fx5_mc::{DeviceAddress, FrameHeader, McResponse, ReadCommand, WriteWordCommand};

fn bench_parse_address(c: &mut Criterion) {
    c.bench_function("parse_address", |b| {
        b.iter(|| DeviceAddress::parse(black_box("D500")).unwrap())
    });
}

fn bench_encode_read(c: &mut Criterion) {
    let header = FrameHeader::default();
    let address: DeviceAddress = "D500".parse().unwrap();
    c.bench_function("encode_read", |b| {
        b.iter(|| {
            ReadCommand::new(black_box(header), black_box(address), 1)
                .unwrap()
                .to_bytes()
        })
    });
}

fn bench_encode_write_block(c: &mut Criterion) {
    let header = FrameHeader::default();
    let address: DeviceAddress = "D100".parse().unwrap();
    let data = vec![0x1234u16; 64];
    c.bench_function("encode_write_64_words", |b| {
        b.iter(|| {
            WriteWordCommand::new(black_box(header), black_box(address), black_box(&data))
                .unwrap()
                .to_bytes()
        })
    });
}

fn bench_decode_response(c: &mut Criterion) {
    // 64-word read response
    let payload_len = 2 + 128u16;
    let mut frame = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
    frame.extend_from_slice(&payload_len.to_le_bytes());
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(&[0xAB; 128]);

    c.bench_function("decode_response_64_words", |b| {
        b.iter(|| {
            McResponse::from_bytes(black_box(&frame))
                .unwrap()
                .to_words()
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_parse_address,
    bench_encode_read,
    bench_encode_write_block,
    bench_decode_response
);
criterion_main!(benches);
