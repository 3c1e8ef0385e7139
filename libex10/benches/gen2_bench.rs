use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use libex10::protocol::Gen2Command;
use libex10::test_support::{sample_read, sample_select};
use libex10::tx_command::TxCommandManager;
use libex10::transport::MockTransport;

fn bench_select_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_encode");
    for &mask_bytes in &[2usize, 8usize, 16usize] {
        let cmd = sample_select(&vec![0xe2; mask_bytes]);
        group.bench_with_input(BenchmarkId::from_parameter(mask_bytes), &cmd, |b, cmd| {
            b.iter(|| {
                black_box(cmd.encode().unwrap());
            });
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let encoded = sample_read(6).encode().unwrap();
    c.bench_function("read_decode", |b| {
        b.iter(|| {
            black_box(Gen2Command::decode(black_box(&encoded)).unwrap());
        });
    });
}

fn bench_write_sequence(c: &mut Criterion) {
    let mut m = TxCommandManager::new();
    m.encode_and_append_command(&sample_select(&[0xe2, 0x80]), 0).unwrap();
    for id in 1..6 {
        m.encode_and_append_command(&sample_read(id), id).unwrap();
    }
    c.bench_function("write_sequence", |b| {
        b.iter(|| {
            let mut device = MockTransport::new();
            m.write_sequence(&mut device).unwrap();
            black_box(device.writes.len());
        });
    });
}

criterion_group!(benches, bench_select_encode, bench_decode, bench_write_sequence);
criterion_main!(benches);
