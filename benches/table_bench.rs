//! Benchmarks for heapdb table operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use heapdb::join::nested_loop_join;
use heapdb::{Catalog, ColumnType, Table};
use tempfile::TempDir;

fn people_catalog() -> Catalog {
    Catalog::new()
        .with_column("id", ColumnType::Int32)
        .with_char("name", 32)
        .with_column("score", ColumnType::Float64)
}

fn filled_table(dir: &TempDir, name: &str, rows: u32) -> Table {
    let mut table = Table::open_in(dir.path(), name, people_catalog()).unwrap();
    for i in 0..rows {
        table
            .insert(&[i.to_string(), format!("person-{}", i), "1.5".to_string()])
            .unwrap();
    }
    table
}

fn insert_benchmarks(c: &mut Criterion) {
    c.bench_function("insert_1000_rows", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let table = Table::open_in(dir.path(), "bench", people_catalog()).unwrap();
                (dir, table)
            },
            |(_dir, mut table)| {
                for i in 0..1000u32 {
                    let row = [i.to_string(), "someone".to_string(), "2.25".to_string()];
                    black_box(table.insert(&row).unwrap());
                }
            },
            BatchSize::PerIteration,
        )
    });
}

fn read_benchmarks(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let table = filled_table(&dir, "reads", 10_000);

    let mut id = 0u64;
    c.bench_function("read_row_by_id", |b| {
        b.iter(|| {
            id = (id + 7919) % 10_000;
            black_box(table.read_row_by_id(id).unwrap())
        })
    });

    c.bench_function("query_full_scan", |b| {
        b.iter(|| black_box(table.query("SELECT name WHERE id >= 9990").unwrap().len()))
    });
}

fn join_benchmarks(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let inner = filled_table(&dir, "inner", 200);
    let outer = filled_table(&dir, "outer", 200);

    c.bench_function("nested_loop_join_200x200", |b| {
        b.iter(|| black_box(nested_loop_join(&inner, &outer, "id", "id").unwrap()))
    });
}

criterion_group!(benches, insert_benchmarks, read_benchmarks, join_benchmarks);
criterion_main!(benches);
