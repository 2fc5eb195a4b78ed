use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use framekit_core::graphics::FrameBuffer;

fn bench_fill_test_pattern(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_test_pattern");

    for (width, height) in [(320usize, 240usize), (1280, 720), (1920, 1080)].iter() {
        let id = format!("{}x{}", width, height);
        group.bench_with_input(BenchmarkId::from_parameter(id), &(*width, *height), |b, &(w, h)| {
            let mut buffer = FrameBuffer::new(w, h).unwrap();
            let mut offset = 0u32;
            b.iter(|| {
                offset = offset.wrapping_add(1);
                buffer.fill_test_pattern(offset, offset.wrapping_mul(2));
                black_box(buffer.pixels()[0]);
            });
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    c.bench_function("framebuffer_resize_720p", |b| {
        let mut buffer = FrameBuffer::new(800, 600).unwrap();
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let (w, h) = if flip { (1280, 720) } else { (800, 600) };
            buffer.resize(w, h).unwrap();
            black_box(buffer.size_in_bytes());
        });
    });
}

criterion_group!(benches, bench_fill_test_pattern, bench_resize);
criterion_main!(benches);
