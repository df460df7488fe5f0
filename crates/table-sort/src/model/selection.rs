//! Row selection for table views.
//!
//! This module provides [`SelectionModel`], which tracks which model rows
//! are selected, the cursor cell and the anchor row of shift-click ranges.
//!
//! # Example
//!
//! ```ignore
//! use table_sort::model::{GestureModifiers, SelectionModel};
//!
//! let selection = SelectionModel::new(source);
//! selection.attach();
//!
//! selection.do_something(4, 0, GestureModifiers::NONE);
//! selection.do_something(7, 0, GestureModifiers::SHIFT);
//! assert_eq!(selection.selected_rows(), vec![4, 5, 6, 7]);
//!
//! // Listen for changes
//! selection.selection_changed.connect(|_| {
//!     println!("selection changed");
//! });
//! ```
//!
//! # Lifecycle
//!
//! The selection starts out *uninitialized*: no row count is known and no
//! bitmask exists. The first gesture reads the row count from the source and
//! allocates a cleared [`RowBitmask`]. Any structural change reported by the
//! source drops the bitmask again, so nothing is selected afterwards.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use table_sort_core::logging::targets;
use table_sort_core::{ConnectionId, Result, Signal};

use super::bitmask::RowBitmask;
use super::sorter::Sorter;
use super::traits::TableSource;

/// Keyboard modifiers held during a click gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureModifiers {
    /// Extend the range from the anchor row.
    pub shift: bool,
    /// Toggle a single row.
    pub ctrl: bool,
}

impl GestureModifiers {
    /// Plain click.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };

    /// Shift-click.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };

    /// Ctrl-click.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };

    /// Creates modifiers with shift set.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Creates modifiers with ctrl set.
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

#[derive(Default)]
struct SelectionState {
    /// `None` while uninitialized.
    mask: Option<RowBitmask>,
    cursor: Option<(usize, usize)>,
    anchor: Option<usize>,
}

impl SelectionState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

struct Connections {
    model_changed: ConnectionId,
    rows_inserted: ConnectionId,
    rows_deleted: ConnectionId,
}

/// What a gesture changed, emitted once the state lock is released.
#[derive(Default)]
struct GestureOutcome {
    selection: bool,
    cursor: Option<Option<(usize, usize)>>,
}

/// Tracks selected rows, the cursor and the range anchor.
///
/// Selection is stored by model row. When a [`Sorter`] is installed, shift
/// ranges are computed in sorted order so they match what the user sees.
///
/// # Signals
///
/// - `cursor_changed`: Emitted when the cursor moves, with the new
///   `(row, column)` or `None` once cleared
/// - `selection_changed`: Emitted when the set of selected rows may have
///   changed
pub struct SelectionModel {
    source: Arc<dyn TableSource>,
    sorter: RwLock<Option<Arc<dyn Sorter>>>,
    state: Mutex<SelectionState>,
    connections: Mutex<Option<Connections>>,

    /// Emitted when the cursor moves. Args: the new cursor
    pub cursor_changed: Signal<Option<(usize, usize)>>,

    /// Emitted when the selection changes.
    pub selection_changed: Signal<()>,
}

impl SelectionModel {
    /// Creates an uninitialized selection over `source` in model order.
    pub fn new(source: Arc<dyn TableSource>) -> Self {
        Self {
            source,
            sorter: RwLock::new(None),
            state: Mutex::new(SelectionState::default()),
            connections: Mutex::new(None),
            cursor_changed: Signal::new(),
            selection_changed: Signal::new(),
        }
    }

    /// Creates an uninitialized selection whose ranges follow `sorter`.
    pub fn with_sorter(source: Arc<dyn TableSource>, sorter: Arc<dyn Sorter>) -> Self {
        let selection = Self::new(source);
        *selection.sorter.write() = Some(sorter);
        selection
    }

    /// Sets or removes the sorter used for range gestures.
    pub fn set_sorter(&self, sorter: Option<Arc<dyn Sorter>>) {
        *self.sorter.write() = sorter;
    }

    /// Returns the sorter used for range gestures.
    pub fn sorter(&self) -> Option<Arc<dyn Sorter>> {
        self.sorter.read().clone()
    }

    // =========================================================================
    // Source Tracking
    // =========================================================================

    /// Subscribes to the source's structural change signals.
    ///
    /// Each one resets the selection to uninitialized. Attaching twice is a
    /// no-op.
    pub fn attach(self: &Arc<Self>) {
        let mut connections = self.connections.lock();
        if connections.is_some() {
            return;
        }

        let signals = self.source.signals();

        let weak = Arc::downgrade(self);
        let model_changed = signals.model_changed.connect(move |_| {
            if let Some(selection) = weak.upgrade() {
                selection.clear();
            }
        });

        let weak = Arc::downgrade(self);
        let rows_inserted = signals.rows_inserted.connect(move |_| {
            if let Some(selection) = weak.upgrade() {
                selection.clear();
            }
        });

        let weak = Arc::downgrade(self);
        let rows_deleted = signals.rows_deleted.connect(move |_| {
            if let Some(selection) = weak.upgrade() {
                selection.clear();
            }
        });

        *connections = Some(Connections {
            model_changed,
            rows_inserted,
            rows_deleted,
        });
    }

    /// Disconnects from the source.
    pub fn detach(&self) {
        let Some(connections) = self.connections.lock().take() else {
            return;
        };

        let signals = self.source.signals();
        signals.model_changed.disconnect(connections.model_changed);
        signals.rows_inserted.disconnect(connections.rows_inserted);
        signals.rows_deleted.disconnect(connections.rows_deleted);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the row count captured at allocation, or `None` while
    /// uninitialized.
    pub fn row_count(&self) -> Option<usize> {
        self.state.lock().mask.as_ref().map(RowBitmask::len)
    }

    /// Returns `true` if `row` is selected.
    ///
    /// Rows past the end, and every row while uninitialized, are not
    /// selected.
    pub fn is_row_selected(&self, row: usize) -> bool {
        self.state
            .lock()
            .mask
            .as_ref()
            .is_some_and(|mask| mask.get(row))
    }

    /// Calls `callback` with each selected row in ascending model order.
    ///
    /// The callback must not modify this selection.
    pub fn foreach<F>(&self, mut callback: F)
    where
        F: FnMut(usize),
    {
        for row in self.selected_rows() {
            callback(row);
        }
    }

    /// Returns the selected rows in ascending model order.
    pub fn selected_rows(&self) -> Vec<usize> {
        self.state
            .lock()
            .mask
            .as_ref()
            .map(|mask| mask.iter().collect())
            .unwrap_or_default()
    }

    /// Returns the number of selected rows.
    pub fn selected_count(&self) -> usize {
        self.state.lock().mask.as_ref().map_or(0, RowBitmask::count)
    }

    /// Returns the cursor cell as `(row, column)`.
    pub fn cursor(&self) -> Option<(usize, usize)> {
        self.state.lock().cursor
    }

    /// Returns the anchor row of shift-click ranges.
    pub fn anchor(&self) -> Option<usize> {
        self.state.lock().anchor
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Applies a click on `(row, col)`.
    ///
    /// - shift: selects the range from the anchor to `row` in sorted order,
    ///   relative to the previous shift range. The anchor stays put.
    /// - ctrl: toggles `row` and moves the anchor to it.
    /// - otherwise: selects only `row` and moves the anchor to it.
    ///
    /// Rows outside the source are ignored.
    pub fn do_something(&self, row: usize, col: usize, modifiers: GestureModifiers) {
        let outcome = {
            let mut state = self.state.lock();
            match self.apply_gesture(&mut state, row, col, modifiers) {
                Some(outcome) => outcome,
                None => return,
            }
        };
        self.emit(outcome);
    }

    /// Like [`do_something`](Self::do_something), but clicking an already
    /// selected row only moves the cursor.
    ///
    /// This keeps a multi-row selection intact when a drag starts on it.
    pub fn maybe_do_something(&self, row: usize, col: usize, modifiers: GestureModifiers) {
        {
            let mut state = self.state.lock();
            if state.mask.as_ref().is_some_and(|mask| mask.get(row)) {
                state.cursor = Some((row, col));
                return;
            }
        }
        self.do_something(row, col, modifiers);
    }

    /// Drops the bitmask and cursor.
    ///
    /// Both signals fire even if nothing was selected.
    pub fn clear(&self) {
        self.state.lock().reset();
        tracing::trace!(target: targets::SELECTION, "selection reset");
        self.cursor_changed.emit(None);
        self.selection_changed.emit(());
    }

    /// Selects every row. The cursor is left alone.
    pub fn select_all(&self) {
        {
            let mut state = self.state.lock();
            self.allocated(&mut state).set_all();
        }
        self.selection_changed.emit(());
    }

    /// Flips the selection state of every row.
    pub fn invert_selection(&self) {
        {
            let mut state = self.state.lock();
            self.allocated(&mut state).invert();
        }
        self.selection_changed.emit(());
    }

    fn allocated<'a>(&self, state: &'a mut SelectionState) -> &'a mut RowBitmask {
        state.mask.get_or_insert_with(|| {
            let count = self.source.row_count();
            tracing::trace!(target: targets::SELECTION, count, "allocating selection");
            RowBitmask::new(count)
        })
    }

    fn apply_gesture(
        &self,
        state: &mut SelectionState,
        row: usize,
        col: usize,
        modifiers: GestureModifiers,
    ) -> Option<GestureOutcome> {
        let count = self.allocated(state).len();
        if row >= count {
            tracing::debug!(target: targets::SELECTION, row, count, "gesture outside table ignored");
            return None;
        }

        let mut outcome = GestureOutcome::default();
        match (modifiers.shift, state.anchor) {
            (true, Some(anchor)) => {
                let previous = state.cursor.map_or(anchor, |(cursor_row, _)| cursor_row);
                if let Err(err) = self.change_range(state, anchor, previous, row) {
                    tracing::warn!(target: targets::SELECTION, %err, row, "range gesture ignored");
                    return None;
                }
                outcome.selection = true;
            }
            _ if modifiers.ctrl => {
                self.allocated(state).toggle(row);
                state.anchor = Some(row);
                outcome.selection = true;
            }
            _ => {
                let mask = self.allocated(state);
                if !mask.is_only(row) {
                    mask.clear_all();
                    mask.set(row, true);
                    outcome.selection = true;
                }
                state.anchor = Some(row);
            }
        }

        if state.cursor != Some((row, col)) {
            state.cursor = Some((row, col));
            outcome.cursor = Some(state.cursor);
        }

        Some(outcome)
    }

    /// Moves the far end of the anchor range from `previous` to `row`.
    ///
    /// Positions that left the range are cleared and positions that joined
    /// it are set. Everything is translated up front so a failed lookup
    /// leaves the selection untouched.
    fn change_range(
        &self,
        state: &mut SelectionState,
        anchor: usize,
        previous: usize,
        row: usize,
    ) -> Result<()> {
        let sorter = self.sorter.read().clone().filter(|s| s.needs_sorting());

        let to_sorted = |row: usize| match &sorter {
            Some(sorter) => sorter.model_to_sorted(row),
            None => Ok(row),
        };

        let anchor = to_sorted(anchor)?;
        let previous = to_sorted(previous)?;
        let target = to_sorted(row)?;

        let old = (anchor.min(previous), anchor.max(previous));
        let new = (anchor.min(target), anchor.max(target));

        // Both ranges contain the anchor, so each difference is at most one
        // segment on either side.
        let mut segments = Vec::with_capacity(2);
        if old.0 < new.0 {
            segments.push((old.0, new.0 - 1, false));
        } else if new.0 < old.0 {
            segments.push((new.0, old.0 - 1, true));
        }
        if old.1 > new.1 {
            segments.push((new.1 + 1, old.1, false));
        } else if new.1 > old.1 {
            segments.push((old.1 + 1, new.1, true));
        }

        let mask = self.allocated(state);
        match &sorter {
            None => {
                for (start, end, value) in segments {
                    mask.set_range(start, end, value);
                }
            }
            Some(sorter) => {
                let mut changes = Vec::new();
                for (start, end, value) in segments {
                    for position in start..=end {
                        changes.push((sorter.sorted_to_model(position)?, value));
                    }
                }
                for (row, value) in changes {
                    mask.set(row, value);
                }
            }
        }

        Ok(())
    }

    fn emit(&self, outcome: GestureOutcome) {
        if outcome.selection {
            self.selection_changed.emit(());
        }
        if let Some(cursor) = outcome.cursor {
            self.cursor_changed.emit(cursor);
        }
    }
}

impl Drop for SelectionModel {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sorter::SorterArray;
    use crate::model::traits::SourceSignals;
    use crate::model::value::CellValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Rows {
        count: AtomicUsize,
        signals: SourceSignals,
    }

    impl Rows {
        fn new(count: usize) -> Arc<Self> {
            Arc::new(Self {
                count: AtomicUsize::new(count),
                signals: SourceSignals::new(),
            })
        }
    }

    impl TableSource for Rows {
        fn row_count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }

        fn value_at(&self, _row: usize, _column: usize) -> CellValue {
            CellValue::None
        }

        fn signals(&self) -> &SourceSignals {
            &self.signals
        }
    }

    fn counter<T: 'static>(signal: &Signal<T>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        signal.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_starts_uninitialized() {
        let selection = SelectionModel::new(Rows::new(10));
        assert_eq!(selection.row_count(), None);
        assert!(!selection.is_row_selected(0));
        assert_eq!(selection.cursor(), None);
        assert_eq!(selection.selected_count(), 0);
    }

    #[test]
    fn test_plain_click() {
        let selection = SelectionModel::new(Rows::new(10));
        selection.do_something(4, 1, GestureModifiers::NONE);

        assert_eq!(selection.row_count(), Some(10));
        assert_eq!(selection.selected_rows(), vec![4]);
        assert_eq!(selection.cursor(), Some((4, 1)));
        assert_eq!(selection.anchor(), Some(4));
    }

    #[test]
    fn test_plain_click_on_only_row_is_quiet() {
        let selection = SelectionModel::new(Rows::new(10));
        selection.do_something(4, 1, GestureModifiers::NONE);

        let selection_changes = counter(&selection.selection_changed);
        let cursor_changes = counter(&selection.cursor_changed);

        selection.do_something(4, 1, GestureModifiers::NONE);
        assert_eq!(selection_changes.load(Ordering::SeqCst), 0);
        assert_eq!(cursor_changes.load(Ordering::SeqCst), 0);

        selection.do_something(4, 2, GestureModifiers::NONE);
        assert_eq!(selection_changes.load(Ordering::SeqCst), 0);
        assert_eq!(cursor_changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shift_range_follows_anchor() {
        let selection = SelectionModel::new(Rows::new(10));
        selection.do_something(4, 0, GestureModifiers::NONE);
        selection.do_something(7, 0, GestureModifiers::SHIFT);
        assert_eq!(selection.selected_rows(), vec![4, 5, 6, 7]);

        selection.do_something(2, 0, GestureModifiers::SHIFT);
        assert_eq!(selection.selected_rows(), vec![2, 3, 4]);
        assert_eq!(selection.anchor(), Some(4));
    }

    #[test]
    fn test_shift_range_in_sorted_order() {
        let source = Rows::new(6);
        // Sorted order is reversed model order.
        let sorter: Arc<dyn Sorter> = Arc::new(SorterArray::with_compare(6, |a, b, _| b.cmp(&a)));
        let selection = SelectionModel::with_sorter(source, sorter);

        selection.do_something(4, 0, GestureModifiers::NONE);
        selection.do_something(1, 0, GestureModifiers::SHIFT);
        assert_eq!(selection.selected_rows(), vec![1, 2, 3, 4]);

        selection.do_something(3, 0, GestureModifiers::SHIFT);
        assert_eq!(selection.selected_rows(), vec![3, 4]);
    }

    #[test]
    fn test_shift_without_anchor_acts_as_click() {
        let selection = SelectionModel::new(Rows::new(10));
        selection.do_something(3, 0, GestureModifiers::SHIFT);
        assert_eq!(selection.selected_rows(), vec![3]);
        assert_eq!(selection.anchor(), Some(3));
    }

    #[test]
    fn test_ctrl_toggle_moves_anchor() {
        let selection = SelectionModel::new(Rows::new(10));
        selection.do_something(4, 0, GestureModifiers::CTRL);
        selection.do_something(6, 0, GestureModifiers::CTRL);
        selection.do_something(4, 0, GestureModifiers::CTRL);

        assert_eq!(selection.selected_rows(), vec![6]);
        assert_eq!(selection.anchor(), Some(4));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let selection = SelectionModel::new(Rows::new(3));
        let changes = counter(&selection.selection_changed);

        selection.do_something(3, 0, GestureModifiers::NONE);
        assert_eq!(changes.load(Ordering::SeqCst), 0);
        assert_eq!(selection.cursor(), None);
        assert!(!selection.is_row_selected(3));
    }

    #[test]
    fn test_maybe_do_something_keeps_selection() {
        let selection = SelectionModel::new(Rows::new(10));
        selection.do_something(2, 0, GestureModifiers::NONE);
        selection.do_something(5, 0, GestureModifiers::SHIFT);
        let cursor_changes = counter(&selection.cursor_changed);

        selection.maybe_do_something(3, 1, GestureModifiers::NONE);
        assert_eq!(selection.selected_count(), 4);
        assert_eq!(selection.cursor(), Some((3, 1)));
        assert_eq!(cursor_changes.load(Ordering::SeqCst), 0);

        selection.maybe_do_something(8, 1, GestureModifiers::NONE);
        assert_eq!(selection.selected_rows(), vec![8]);
    }

    #[test]
    fn test_clear_always_notifies() {
        let selection = SelectionModel::new(Rows::new(10));
        let selection_changes = counter(&selection.selection_changed);

        let cursor = Arc::new(Mutex::new(Some((0, 0))));
        let c = cursor.clone();
        selection.cursor_changed.connect(move |new| *c.lock() = *new);

        selection.clear();
        assert_eq!(selection_changes.load(Ordering::SeqCst), 1);
        assert_eq!(*cursor.lock(), None);
        assert_eq!(selection.row_count(), None);
    }

    #[test]
    fn test_select_all_and_invert() {
        let selection = SelectionModel::new(Rows::new(5));
        selection.do_something(1, 0, GestureModifiers::NONE);
        let changes = counter(&selection.selection_changed);

        selection.invert_selection();
        assert_eq!(selection.selected_rows(), vec![0, 2, 3, 4]);

        selection.select_all();
        assert_eq!(selection.selected_count(), 5);
        assert_eq!(selection.cursor(), Some((1, 0)));
        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_source_changes_reset() {
        let source = Rows::new(4);
        let selection = Arc::new(SelectionModel::new(source.clone()));
        selection.attach();

        selection.do_something(2, 0, GestureModifiers::NONE);
        source.count.store(6, Ordering::SeqCst);
        source.signals.emit_rows_inserted(4, 2, || {});

        assert_eq!(selection.row_count(), None);
        assert_eq!(selection.selected_count(), 0);

        selection.do_something(5, 0, GestureModifiers::NONE);
        assert_eq!(selection.row_count(), Some(6));
        assert!(selection.is_row_selected(5));
    }

    #[test]
    fn test_foreach_ascending() {
        let selection = SelectionModel::new(Rows::new(40));
        for row in [33, 2, 17] {
            selection.do_something(row, 0, GestureModifiers::CTRL);
        }

        let mut seen = Vec::new();
        selection.foreach(|row| seen.push(row));
        assert_eq!(seen, vec![2, 17, 33]);

        // Restartable.
        let mut again = 0;
        selection.foreach(|_| again += 1);
        assert_eq!(again, 3);
    }
}
