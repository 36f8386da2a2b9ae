// Benchmarks for document search and prediction ranking
use agroflow_core::{Collection, CollectionConfig, Distance, Payload, Point, PointId, Vector};
use agroflow_vision::{rank, LabelEncoder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;

const DIM: usize = 1024;

fn generate_random_vector(rng: &mut impl Rng, dim: usize) -> Vector {
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data)
}

fn generate_random_point(rng: &mut impl Rng, id: usize, dim: usize) -> Point {
    let mut payload = Payload::new();
    payload.insert("text".into(), format!("document number {}", id).into());
    payload.insert("file_name".into(), format!("report_{}.md", id).into());
    Point::new(PointId::Integer(id as u64), generate_random_vector(rng, dim), payload)
}

fn benchmark_batch_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_upsert");
    let mut rng = StdRng::seed_from_u64(7);

    for size in [100, 1000, 5000].iter() {
        let points: Vec<Point> = (0..*size).map(|i| generate_random_point(&mut rng, i, DIM)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| {
                let collection = Collection::new(CollectionConfig::new("bench", DIM, Distance::Cosine));
                collection.batch_upsert(points.clone()).unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let mut rng = StdRng::seed_from_u64(11);

    for size in [1000, 10000].iter() {
        let collection = Collection::new(CollectionConfig::new("bench", DIM, Distance::Cosine));
        let points: Vec<Point> = (0..*size).map(|i| generate_random_point(&mut rng, i, DIM)).collect();
        collection.batch_upsert(points).unwrap();
        let query = generate_random_vector(&mut rng, DIM);

        group.bench_with_input(BenchmarkId::new("top5", size), &query, |b, query| {
            b.iter(|| collection.search(black_box(query), 5).unwrap());
        });
    }

    group.finish();
}

fn benchmark_rank(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let classes: Vec<String> = (0..38).map(|i| format!("disease_{:02}", i)).collect();
    let encoder = LabelEncoder::new(classes).unwrap();

    let mut probs: Vec<f32> = (0..38).map(|_| rng.random::<f32>()).collect();
    let total: f32 = probs.iter().sum();
    probs.iter_mut().for_each(|p| *p /= total);

    c.bench_function("rank_top3", |b| {
        b.iter(|| rank(black_box(&probs), &encoder, 3).unwrap());
    });
}

criterion_group!(benches, benchmark_batch_upsert, benchmark_search, benchmark_rank);
criterion_main!(benches);
