use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_dataframe::column::Column;
use rust_dataframe::execution::{ExecutionEngine, ExecutionOptions};
use rust_dataframe::frame::DataFrame;
use rust_dataframe::path::ColumnPath;
use rust_dataframe::processing::AddOptions;
use rust_dataframe::types::Value;

fn bench_rows() -> usize {
    std::env::var("RUST_DATAFRAME_ADD_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (1_000..=5_000_000).contains(&v))
        .unwrap_or(100_000)
}

fn build_frame(rows: usize) -> DataFrame {
    let ids = (0..rows).map(|i| Value::Int64(i as i64)).collect();
    let buckets = (0..rows).map(|i| Value::Int64((i % 64) as i64)).collect();
    let scores = (0..rows)
        .map(|i| {
            if i % 17 == 0 {
                Value::Null
            } else {
                Value::Float64((i % 100) as f64 / 10.0)
            }
        })
        .collect();

    DataFrame::new(vec![
        Column::create_with_type_inference("id", ids, None).unwrap(),
        Column::create_with_type_inference("bucket", buckets, None).unwrap(),
        Column::create_with_type_inference("score", scores, None).unwrap(),
    ])
    .unwrap()
    // Nest `score` so path inserts have a group to rebuild.
    .group_columns(&["score"], "metrics")
    .unwrap()
}

fn bench_add(c: &mut Criterion) {
    let rows = bench_rows();
    let df = build_frame(rows);
    let grouped = df.group_by(&["bucket"]).unwrap();
    let engine = ExecutionEngine::new(ExecutionOptions::default());

    let mut group = c.benchmark_group("add");
    group.sample_size(10);
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("computed_top_level", rows), &rows, |b, _| {
        b.iter(|| {
            let out = df.add("id2", |row| row.i64("id").map(|v| v * 2)).unwrap();
            black_box(out);
        })
    });

    group.bench_with_input(BenchmarkId::new("computed_at_path", rows), &rows, |b, _| {
        let path = ColumnPath::new(["metrics", "scaled"]);
        let score = ColumnPath::new(["metrics", "score"]);
        b.iter(|| {
            let out = df
                .add_at(&path, |row| {
                    row.get_path(&score).and_then(|v| v.as_f64()).map(|s| s * 10.0)
                })
                .unwrap();
            black_box(out);
        })
    });

    group.bench_with_input(BenchmarkId::new("group_sequential", rows), &rows, |b, _| {
        b.iter(|| {
            let out = grouped.add("id2", |row| row.i64("id").map(|v| v * 2)).unwrap();
            black_box(out);
        })
    });

    group.bench_with_input(BenchmarkId::new("group_parallel", rows), &rows, |b, _| {
        b.iter(|| {
            let out = engine
                .add_to_groups(&grouped, "id2", &AddOptions::default(), |row| {
                    row.i64("id").map(|v| v * 2)
                })
                .unwrap();
            black_box(out);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_add);
criterion_main!(benches);
