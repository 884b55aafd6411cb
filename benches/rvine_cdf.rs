use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use vine_cdf::copulas::bivariate::CopulaType;
use vine_cdf::copulas::bivariate::PairCopula;
use vine_cdf::copulas::vine::RVineModel;
use vine_cdf::VineCdf;

fn dvine(d: usize) -> RVineModel {
  let trees: Vec<Vec<PairCopula>> = (0..d - 1)
    .map(|t| {
      (0..d - 1 - t)
        .map(|e| match (t + e) % 3 {
          0 => PairCopula::from_tau(CopulaType::Gumbel, 0.4),
          1 => PairCopula::from_tau(CopulaType::Clayton, 0.3),
          _ => PairCopula::from_tau(CopulaType::Frank, 0.2),
        })
        .collect()
    })
    .collect();
  RVineModel::dvine(d, &trees)
}

fn bench_point(c: &mut Criterion) {
  let mut group = c.benchmark_group("point");

  for d in [3usize, 5, 8] {
    let model = dvine(d);
    let cdf = VineCdf::new().n(10_000);
    let point = vec![0.5; d];
    group.bench_with_input(BenchmarkId::from_parameter(d), &d, |b, _| {
      let mut rng = StdRng::seed_from_u64(1);
      b.iter(|| black_box(cdf.evaluate(point.clone(), &model, &mut rng)))
    });
  }

  group.finish();
}

fn bench_batch(c: &mut Criterion) {
  let mut group = c.benchmark_group("batch");
  let model = dvine(5);
  let cdf = VineCdf::new().n(5_000);
  let table = Array2::from_shape_fn((16, 5), |(i, j)| 0.05 + 0.9 * ((i * 5 + j) % 16) as f64 / 16.0);

  group.bench_function("sequential", |b| {
    let mut rng = StdRng::seed_from_u64(2);
    b.iter(|| black_box(cdf.evaluate(table.clone(), &model, &mut rng)))
  });

  group.bench_function("parallel", |b| {
    b.iter(|| black_box(cdf.evaluate_par(table.clone(), &model, 2)))
  });

  group.finish();
}

criterion_group!(benches, bench_point, bench_batch);
criterion_main!(benches);
