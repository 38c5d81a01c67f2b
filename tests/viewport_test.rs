use dokumentu::data::csv_store::{CsvOptions, CsvStore};
use dokumentu::data::data_provider::DataProvider;
use dokumentu::data::dataset::DatasetHandle;
use dokumentu::data::memory_store::MemoryStore;
use dokumentu::ui::slot_pool::SlotPool;
use dokumentu::ui::viewport::{
    BindOutcome, CellLabeler, DisplaySlot, ScrollCoordinator, SlotKind, TableController,
    ViewportError,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Helper to write a CSV fixture to a temp file
fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn controller_for(store: impl DataProvider + 'static) -> TableController {
    TableController::new(
        DatasetHandle::new(Arc::new(store)),
        ScrollCoordinator::new(),
        CellLabeler::default(),
    )
}

#[test]
fn test_item_count_and_resolution_for_csv_file() {
    let mut content = String::from("id,transaction_amount,order date of purchase\n");
    for i in 0..250 {
        content.push_str(&format!("{},{}.50,2024-01-{:02}\n", i, i * 3, i % 28 + 1));
    }
    let file = write_csv(&content);
    let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
    let controller = controller_for(store);

    assert_eq!(controller.item_count(), 251);
    assert_eq!(controller.resolve(0), Ok(SlotKind::Header));
    for k in [1, 2, 125, 250] {
        assert_eq!(
            controller.resolve(k),
            Ok(SlotKind::Data { logical_row: k - 1 })
        );
    }
    assert!(controller.resolve(251).is_err());
}

#[test]
fn test_header_labels_from_csv_file() {
    let file = write_csv("customer_identification,abcdefghijklmnopqrst,id\n1,2,3\n");
    let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
    let mut controller = controller_for(store);

    let mut header = DisplaySlot::new();
    controller.bind(&mut header, 0).unwrap();

    assert_eq!(header.cells(), &["customer_ide", "abcdefghijkl", "id"]);
    assert_eq!(
        controller.full_header(0),
        Some("customer_identification")
    );
}

#[test]
fn test_header_only_file_renders_only_header() {
    let file = write_csv("A,B\n");
    let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
    let mut controller = controller_for(store);
    let mut pool = SlotPool::new(true);

    assert_eq!(controller.item_count(), 1);
    pool.sync(&mut controller, 20).unwrap();

    assert_eq!(pool.visible().count(), 1);
    assert_eq!(controller.stats().data_binds, 0);
    assert_eq!(pool.slot_at(0).unwrap().cells(), &["A", "B"]);
}

#[test]
fn test_missing_row_renders_empty_instead_of_failing() {
    let store = MemoryStore::new(["a", "b"])
        .with_rows([["1", "2"], ["3", "4"], ["5", "6"]])
        .with_claimed_rows(6);
    let mut controller = controller_for(store);
    let mut pool = SlotPool::new(true);

    pool.sync(&mut controller, 10).unwrap();

    let last = pool.slot_at(6).unwrap();
    assert_eq!(last.kind(), Some(SlotKind::Data { logical_row: 5 }));
    assert_eq!(last.cells(), &["", ""]);
    assert_eq!(pool.slot_at(3).unwrap().cells(), &["5", "6"]);
}

#[test]
fn test_ragged_csv_rows_are_padded() {
    let file = write_csv("a,b,c\n1\n1,2,3\n");
    let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
    let mut controller = controller_for(store);

    let mut slot = DisplaySlot::new();
    controller.bind(&mut slot, 1).unwrap();
    assert_eq!(slot.cells(), &["1", "", ""]);
}

#[test]
fn test_drag_keeps_every_row_aligned_while_scrolling() {
    let mut store = MemoryStore::new(["n", "text"]);
    for n in 0..500 {
        store.push_row([n.to_string(), format!("value number {}", n)]);
    }
    let mut controller = controller_for(store);
    let mut pool = SlotPool::new(true);
    pool.sync(&mut controller, 12).unwrap();

    pool.scroll_row_to(5, 120);
    assert_eq!(controller.coordinator().propagation_count(), 1);

    for _ in 0..40 {
        pool.scroll_by(7);
        pool.sync(&mut controller, 12).unwrap();
        assert!(pool.visible().all(|slot| slot.offset() == 120));
    }

    pool.scroll_row_to(0, 3);
    assert!(pool.visible().all(|slot| slot.offset() == 3));
    assert_eq!(controller.coordinator().propagation_count(), 2);
}

#[test]
fn test_reload_discards_in_flight_content() {
    let file = write_csv("a\nold\n");
    let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
    let mut controller = controller_for(store);
    let in_flight = controller.fetch(1).unwrap();

    let reloaded = write_csv("a\nnew\n");
    let store = CsvStore::load(reloaded.path(), &CsvOptions::default()).unwrap();
    controller.replace_dataset(DatasetHandle::new(Arc::new(store)));

    let mut slot = DisplaySlot::new();
    assert_eq!(controller.apply(&mut slot, in_flight), BindOutcome::Stale);
    controller.bind(&mut slot, 1).unwrap();
    assert_eq!(slot.cells(), &["new"]);
}

#[test]
fn test_teardown_twice_then_bind_reports_detached() {
    let mut controller = controller_for(MemoryStore::new(["a"]).with_rows([["1"]]));
    let mut pool = SlotPool::new(false);
    pool.sync(&mut controller, 5).unwrap();
    assert_eq!(controller.coordinator().len(), 2);

    pool.teardown(&mut controller);
    controller.teardown();

    assert!(controller.coordinator().is_empty());
    assert_eq!(
        controller.bind(&mut DisplaySlot::new(), 0),
        Err(ViewportError::Detached)
    );
}
