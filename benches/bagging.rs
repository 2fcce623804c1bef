use bagging_rust::{
    BaggingClassifier, ConfigBuilder, DataLoader, Linear, Mlp, RecordingReporter, Resampler,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;

fn create_classification_data(n_rows: usize, n_features: usize, n_classes: usize) -> (Array2<f64>, Array1<usize>) {
    let mut rng = StdRng::seed_from_u64(42);
    let inputs = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen_range(-1.0..1.0));
    let targets = inputs
        .rows()
        .into_iter()
        .map(|row| ((row.sum() + n_features as f64) * n_classes as f64 / (2.0 * n_features as f64)) as usize)
        .map(|c| c.min(n_classes - 1))
        .collect();
    (inputs, targets)
}

fn bench_bootstrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap");
    for batch_size in [32usize, 128, 1024].iter() {
        group.bench_with_input(BenchmarkId::new("mask", batch_size), batch_size, |b, &size| {
            let mut resampler = Resampler::with_seed(0);
            b.iter(|| resampler.bootstrap_mask(black_box(size)))
        });
    }
    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for n_estimators in [1usize, 5, 10].iter() {
        let (inputs, targets) = create_classification_data(1024, 8, 3);
        let loader = DataLoader::new(inputs, targets, 64).unwrap();

        group.bench_with_input(BenchmarkId::new("mlp", n_estimators), n_estimators, |b, &n| {
            b.iter(|| {
                let config = ConfigBuilder::new()
                    .n_estimators(n)
                    .output_dim(3)
                    .epochs(2)
                    .random_seed(1)
                    .build()
                    .unwrap();
                let mut ensemble =
                    BaggingClassifier::try_new(config, |i| Mlp::builder(8, 32, 3).seed(i as u64).build()).unwrap();
                ensemble
                    .fit_with_reporter(black_box(&loader), &mut RecordingReporter::new())
                    .unwrap();
            })
        });
    }

    group.finish();
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward");

    let config = ConfigBuilder::new().n_estimators(10).output_dim(3).build().unwrap();
    let ensemble = BaggingClassifier::new(config, |i| Linear::with_seed(8, 3, i as u64)).unwrap();

    for n_rows in [64usize, 1024, 8192].iter() {
        let (inputs, _) = create_classification_data(*n_rows, 8, 3);
        group.bench_with_input(BenchmarkId::new("linear", n_rows), &inputs, |b, x| {
            b.iter(|| ensemble.forward(black_box(x.view())).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bootstrap, bench_fit, bench_forward);
criterion_main!(benches);
