use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pv_core::Image;
use pv_oracle::{DEFAULT_MIN_LEVEL_DIM, ReferencePyramid, pyramid_reduce};

fn synthetic(width: usize, height: usize) -> Image<f64> {
    Image::from_fn(width, height, |x, y| ((x * 31 + y * 17) % 251) as f64 / 250.0)
}

fn bench_reduce(c: &mut Criterion) {
    let img = synthetic(512, 512);

    c.bench_function("pyramid_reduce_512x512", |b| {
        b.iter(|| {
            let out = pyramid_reduce(black_box(&img));
            black_box(out);
        });
    });
}

fn bench_laplacian_round_trip(c: &mut Criterion) {
    let img = synthetic(512, 384);

    c.bench_function("laplacian_build_and_reconstruct_4_levels_512x384", |b| {
        b.iter(|| {
            let lap = ReferencePyramid::laplacian(black_box(&img), 4, DEFAULT_MIN_LEVEL_DIM);
            let coeffs = vec![1.0; lap.num_levels()];
            let out = ReferencePyramid::reconstruct(lap.levels(), &coeffs)
                .expect("coefficient count matches");
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_reduce, bench_laplacian_round_trip);
criterion_main!(benches);
