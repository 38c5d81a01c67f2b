use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dokumentu::data::dataset::DatasetHandle;
use dokumentu::data::memory_store::MemoryStore;
use dokumentu::ui::slot_pool::SlotPool;
use dokumentu::ui::viewport::{CellLabeler, DisplaySlot, ScrollCoordinator, TableController};
use std::sync::Arc;

fn create_test_controller(rows: usize, cols: usize) -> TableController {
    let headers: Vec<String> = (0..cols).map(|c| format!("column_number_{}", c)).collect();
    let mut store = MemoryStore::new(headers);
    for row in 0..rows {
        store.push_row((0..cols).map(|col| format!("r{}c{}", row, col)));
    }

    TableController::new(
        DatasetHandle::new(Arc::new(store)),
        ScrollCoordinator::new(),
        CellLabeler::default(),
    )
}

fn benchmark_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind");

    group.bench_function("header_20_cols", |b| {
        let mut controller = create_test_controller(100, 20);
        let mut slot = DisplaySlot::new();
        b.iter(|| controller.bind(&mut slot, black_box(0)).unwrap());
    });

    group.bench_function("data_20_cols", |b| {
        let mut controller = create_test_controller(10_000, 20);
        let mut slot = DisplaySlot::new();
        let mut position = 1;
        b.iter(|| {
            controller.bind(&mut slot, black_box(position)).unwrap();
            position = position % 10_000 + 1;
        });
    });

    group.finish();
}

fn benchmark_scrolling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll");

    // One row down per iteration on a 50 row screen
    group.bench_function("recycle_one_row", |b| {
        let mut controller = create_test_controller(100_000, 12);
        let mut pool = SlotPool::new(true);
        pool.sync(&mut controller, 50).unwrap();
        b.iter(|| {
            if !pool.scroll_by(1).viewport_changed {
                pool.to_first();
            }
            pool.sync(&mut controller, 50).unwrap();
        });
    });

    group.bench_function("horizontal_fan_out_50_rows", |b| {
        let mut controller = create_test_controller(1_000, 12);
        let mut pool = SlotPool::new(true);
        pool.sync(&mut controller, 50).unwrap();
        let mut offset = 0;
        b.iter(|| {
            offset = (offset + 1) % 200;
            pool.scroll_row_to(1, black_box(offset));
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_bind, benchmark_scrolling);
criterion_main!(benches);
