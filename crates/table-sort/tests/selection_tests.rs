//! Integration tests for the selection model.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use table_sort::model::{
    GestureModifiers, SelectionModel, SortColumn, SortInfo, Sorter, TableHeader, TableSorter,
};

use common::Column;

fn selection(rows: usize) -> (Arc<Column>, Arc<SelectionModel>) {
    let source = Column::new((0..rows as i64).collect());
    let selection = Arc::new(SelectionModel::new(source.clone()));
    selection.attach();
    (source, selection)
}

#[test]
fn test_plain_click_then_shift_ranges() {
    let (_source, selection) = selection(10);

    selection.do_something(4, 0, GestureModifiers::NONE);
    assert!(selection.is_row_selected(4));
    assert_eq!(selection.selected_count(), 1);

    selection.do_something(7, 0, GestureModifiers::SHIFT);
    assert_eq!(selection.selected_rows(), vec![4, 5, 6, 7]);

    selection.do_something(2, 0, GestureModifiers::SHIFT);
    assert_eq!(selection.selected_rows(), vec![2, 3, 4]);
    assert!(!selection.is_row_selected(5));
}

#[test]
fn test_ctrl_clicks() {
    let (_source, selection) = selection(10);

    selection.do_something(4, 0, GestureModifiers::CTRL);
    selection.do_something(6, 0, GestureModifiers::CTRL);
    selection.do_something(4, 0, GestureModifiers::CTRL);

    assert_eq!(selection.selected_rows(), vec![6]);
}

#[test]
fn test_plain_click_selects_exactly_one() {
    let (_source, selection) = selection(64);
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..50 {
        let row = rng.gen_range(0..64);
        let modifiers = match rng.gen_range(0..3) {
            0 => GestureModifiers::NONE,
            1 => GestureModifiers::SHIFT,
            _ => GestureModifiers::CTRL,
        };
        selection.do_something(row, 0, modifiers);

        let target = rng.gen_range(0..64);
        selection.do_something(target, 1, GestureModifiers::NONE);
        assert_eq!(selection.selected_rows(), vec![target]);
    }
}

#[test]
fn test_clear_deselects_everything() {
    let (_source, selection) = selection(20);
    selection.select_all();
    selection.clear();

    for row in 0..20 {
        assert!(!selection.is_row_selected(row));
    }
    assert_eq!(selection.cursor(), None);
}

#[test]
fn test_shift_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..30 {
        let (_source, selection) = selection(50);
        for _ in 0..5 {
            let row = rng.gen_range(0..50);
            selection.do_something(row, 0, GestureModifiers::CTRL);
        }

        let target = rng.gen_range(0..50);
        selection.do_something(target, 0, GestureModifiers::SHIFT);
        let once = selection.selected_rows();
        selection.do_something(target, 0, GestureModifiers::SHIFT);
        assert_eq!(selection.selected_rows(), once);
    }
}

#[test]
fn test_shift_relative_to_first_anchor() {
    let (_source, selection) = selection(30);
    selection.do_something(10, 0, GestureModifiers::NONE);

    selection.do_something(20, 0, GestureModifiers::SHIFT);
    selection.do_something(15, 0, GestureModifiers::SHIFT);
    selection.do_something(5, 0, GestureModifiers::SHIFT);

    assert_eq!(selection.selected_rows(), (5..=10).collect::<Vec<_>>());
    assert_eq!(selection.anchor(), Some(10));
}

#[test]
fn test_ctrl_is_its_own_inverse() {
    let mut rng = StdRng::seed_from_u64(9);
    let (_source, selection) = selection(40);
    for _ in 0..10 {
        selection.do_something(rng.gen_range(0..40), 0, GestureModifiers::CTRL);
    }

    for _ in 0..20 {
        let before = selection.selected_rows();
        let row = rng.gen_range(0..40);

        selection.do_something(row, 0, GestureModifiers::CTRL);
        assert_ne!(selection.is_row_selected(row), before.contains(&row));
        selection.do_something(row, 0, GestureModifiers::CTRL);
        assert_eq!(selection.selected_rows(), before);
    }
}

#[test]
fn test_single_row_model() {
    let (_source, selection) = selection(1);

    selection.do_something(0, 0, GestureModifiers::SHIFT);
    assert_eq!(selection.selected_rows(), vec![0]);

    selection.clear();
    selection.do_something(0, 0, GestureModifiers::CTRL);
    assert_eq!(selection.selected_rows(), vec![0]);

    selection.do_something(0, 0, GestureModifiers::SHIFT);
    assert_eq!(selection.selected_rows(), vec![0]);
}

#[test]
fn test_empty_model() {
    let (_source, selection) = selection(0);
    selection.do_something(0, 0, GestureModifiers::NONE);

    let mut seen = 0;
    selection.foreach(|_| seen += 1);
    assert_eq!(seen, 0);
    assert_eq!(selection.row_count(), Some(0));
}

#[test]
fn test_structural_changes_reset() {
    let (source, selection) = selection(10);
    let cursor_resets = Arc::new(AtomicUsize::new(0));
    let selection_changes = Arc::new(AtomicUsize::new(0));

    let c = cursor_resets.clone();
    selection.cursor_changed.connect(move |cursor| {
        if cursor.is_none() {
            c.fetch_add(1, Ordering::SeqCst);
        }
    });
    let s = selection_changes.clone();
    selection.selection_changed.connect(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    });

    selection.do_something(3, 0, GestureModifiers::NONE);
    source.append(&[10]);
    assert_eq!(selection.selected_count(), 0);
    assert_eq!(selection.row_count(), None);

    selection.do_something(3, 0, GestureModifiers::NONE);
    source.remove(0);
    selection.do_something(3, 0, GestureModifiers::NONE);
    source.replace(vec![1, 2]);

    assert_eq!(cursor_resets.load(Ordering::SeqCst), 3);
    // Three gestures and three resets.
    assert_eq!(selection_changes.load(Ordering::SeqCst), 6);
    assert!(!selection.is_row_selected(3));
}

#[test]
fn test_shift_range_through_table_sorter() {
    // Display order by value: rows 3, 0, 4, 1, 2.
    let source = Column::new(vec![20, 40, 50, 10, 30]);
    let sorter = Arc::new(TableSorter::new(
        source.clone(),
        Arc::new(SortInfo::from_columns(vec![SortColumn::ascending(0)])),
        Arc::new(TableHeader::new()),
    ));
    sorter.attach();

    let selection = Arc::new(SelectionModel::with_sorter(source.clone(), sorter.clone()));
    selection.attach();

    selection.do_something(0, 0, GestureModifiers::NONE);
    selection.do_something(1, 0, GestureModifiers::SHIFT);
    assert_eq!(selection.selected_rows(), vec![0, 1, 4]);

    let events = Arc::new(Mutex::new(Vec::new()));
    let e = events.clone();
    selection.cursor_changed.connect(move |cursor| e.lock().push(*cursor));

    selection.do_something(3, 2, GestureModifiers::SHIFT);
    assert_eq!(selection.selected_rows(), vec![0, 3]);
    assert_eq!(*events.lock(), vec![Some((3, 2))]);

    // Sorter still answers for the rows the selection covers.
    assert_eq!(sorter.model_to_sorted(3), Ok(0));
}
