use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use packet_lens::WireIntrospector;

fn len_field(field: u64, body: &[u8]) -> Vec<u8> {
    let mut out = vec![(field << 3 | 2) as u8];
    let mut len = body.len();
    while len >= 0x80 {
        out.push((len as u8) | 0x80);
        len >>= 7;
    }
    out.push(len as u8);
    out.extend_from_slice(body);
    out
}

fn flat_message(fields: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..fields {
        out.extend([0x08, (i % 128) as u8]);
        out.extend(len_field(2, b"player-name"));
        out.push(0x1D);
        out.extend(1.5f32.to_le_bytes());
    }
    out
}

fn nested_message(depth: usize) -> Vec<u8> {
    let mut out = vec![0x08, 0x01];
    for _ in 0..depth {
        out = len_field(1, &out);
    }
    out
}

fn bench_introspect(c: &mut Criterion) {
    let mut group = c.benchmark_group("introspect");
    let introspector = WireIntrospector::default();

    for &fields in &[16usize, 256, 4096] {
        let data = flat_message(fields);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("flat", fields), &data, |b, data| {
            b.iter(|| introspector.decode(data, 0))
        });
    }

    for &depth in &[8usize, 32, 64] {
        let data = nested_message(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &data, |b, data| {
            b.iter(|| introspector.decode(data, 0))
        });
    }

    let noise: Vec<u8> = (0..65536u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
    group.throughput(Throughput::Bytes(noise.len() as u64));
    group.bench_function("noise_64k", |b| b.iter(|| introspector.decode(&noise, 0)));

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let message = WireIntrospector::default().decode(&flat_message(256), 0);
    c.bench_function("render_256_fields", |b| b.iter(|| message.render()));
}

criterion_group!(benches, bench_introspect, bench_render);
criterion_main!(benches);
