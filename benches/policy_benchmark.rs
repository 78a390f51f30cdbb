use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::{Array1, Array2};
use rand::distributions::Standard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regimen::knn::KnnRegressor;
use regimen::model::Predictor;
use regimen::policy::boltzmann_policy;

fn random_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |_| rng.sample(Standard))
}

fn benchmark_boltzmann(c: &mut Criterion) {
    let arm_count = 4;
    let sizes = [1_000_usize, 10_000, 100_000];
    let matrices: Vec<_> = sizes
        .iter()
        .map(|&rows| (rows, random_matrix(rows, arm_count, 0xB017 + rows as u64)))
        .collect();

    let mut group = c.benchmark_group("boltzmann_policy");
    for (rows, matrix) in matrices.iter() {
        group.throughput(Throughput::Elements((*rows * arm_count) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), matrix, |b, input| {
            b.iter(|| {
                let policy = boltzmann_policy(black_box(input.view()), 1.0).unwrap();
                black_box(policy);
            });
        });
    }
    group.finish();
}

fn benchmark_knn_predict(c: &mut Criterion) {
    let train_rows = 500;
    let width = 8;
    let train_x = random_matrix(train_rows, width, 0x5EED);
    let train_y = Array1::from_iter(train_x.column(0).iter().copied());
    let model = KnnRegressor::fit(train_x, train_y, 22).unwrap();

    let batch_sizes = [100_usize, 1_000];
    let batches: Vec<_> = batch_sizes
        .iter()
        .map(|&rows| (rows, random_matrix(rows, width, 0xFEED + rows as u64)))
        .collect();

    let mut group = c.benchmark_group("knn_predict");
    for (rows, batch) in batches.iter() {
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), batch, |b, input| {
            b.iter(|| {
                let predictions = model.predict(black_box(input.view()));
                black_box(predictions);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_boltzmann, benchmark_knn_predict);
criterion_main!(benches);
