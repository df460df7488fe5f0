//! Traits for the external data sources sorters and selections observe.
//!
//! The sorters, selection model and tree view never own the data they order.
//! They hold a shared reference to a [`TableSource`] (or [`TreeSource`]) and
//! subscribe to its change signals so they can throw away derived state when
//! the source's structure changes.

use table_sort_core::Signal;

use super::value::CellValue;

/// A flat source of rows in "model order".
///
/// # Example
///
/// ```
/// use table_sort::model::{CellValue, SourceSignals, TableSource};
///
/// struct Prices {
///     values: Vec<i64>,
///     signals: SourceSignals,
/// }
///
/// impl TableSource for Prices {
///     fn row_count(&self) -> usize {
///         self.values.len()
///     }
///
///     fn value_at(&self, row: usize, _column: usize) -> CellValue {
///         self.values.get(row).copied().into()
///     }
///
///     fn signals(&self) -> &SourceSignals {
///         &self.signals
///     }
/// }
/// ```
pub trait TableSource: Send + Sync {
    /// Returns the number of rows currently in model order.
    fn row_count(&self) -> usize;

    /// Returns the value of one cell.
    ///
    /// Only comparators read values; the core itself never does.
    fn value_at(&self, row: usize, column: usize) -> CellValue;

    /// Returns the structural change signals of this source.
    fn signals(&self) -> &SourceSignals;
}

/// A hierarchical source whose rows form a tree.
///
/// Rows are still identified by their model-order index; the hierarchy is
/// described by [`root`](TreeSource::root), [`children`](TreeSource::children)
/// and [`is_ancestor`](TreeSource::is_ancestor).
pub trait TreeSource: TableSource {
    /// Returns the row of the root node, if the source has one.
    fn root(&self) -> Option<usize>;

    /// Returns the children of `row` in source order.
    fn children(&self, row: usize) -> Vec<usize>;

    /// Returns `true` if `candidate` is a proper ancestor of `of`.
    fn is_ancestor(&self, candidate: usize, of: usize) -> bool;

    /// Returns the hierarchy change signals of this source.
    fn tree_signals(&self) -> &TreeSourceSignals;
}

/// Structural change signals emitted by a [`TableSource`].
///
/// Listeners treat every one of these as "derived state is stale".
pub struct SourceSignals {
    /// Emitted after the source changed wholesale.
    pub model_changed: Signal<()>,

    /// Emitted after rows were inserted.
    /// Args: (first inserted row, number of rows)
    pub rows_inserted: Signal<(usize, usize)>,

    /// Emitted after rows were deleted.
    /// Args: (first deleted row, number of rows)
    pub rows_deleted: Signal<(usize, usize)>,
}

impl Default for SourceSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceSignals {
    /// Creates a new set of source signals.
    pub fn new() -> Self {
        Self {
            model_changed: Signal::new(),
            rows_inserted: Signal::new(),
            rows_deleted: Signal::new(),
        }
    }

    /// Emits `model_changed` after running `change_fn`.
    pub fn emit_model_changed<F>(&self, change_fn: F)
    where
        F: FnOnce(),
    {
        change_fn();
        self.model_changed.emit(());
    }

    /// Emits `rows_inserted` after running `insert_fn`.
    ///
    /// Nothing is emitted for an empty insertion.
    pub fn emit_rows_inserted<F>(&self, at: usize, count: usize, insert_fn: F)
    where
        F: FnOnce(),
    {
        insert_fn();
        if count > 0 {
            self.rows_inserted.emit((at, count));
        }
    }

    /// Emits `rows_deleted` after running `delete_fn`.
    ///
    /// Nothing is emitted for an empty deletion.
    pub fn emit_rows_deleted<F>(&self, at: usize, count: usize, delete_fn: F)
    where
        F: FnOnce(),
    {
        delete_fn();
        if count > 0 {
            self.rows_deleted.emit((at, count));
        }
    }
}

/// Hierarchy change signals emitted by a [`TreeSource`].
pub struct TreeSourceSignals {
    /// Emitted after a node was added. Args: the new row.
    pub node_inserted: Signal<usize>,

    /// Emitted after a node (and its subtree) was removed. Args: the row.
    pub node_removed: Signal<usize>,

    /// Emitted when a node's values changed but its position in the
    /// hierarchy did not. Args: the row.
    pub node_data_changed: Signal<usize>,

    /// Emitted when a single cell of a node changed.
    /// Args: (row, column)
    pub node_col_changed: Signal<(usize, usize)>,

    /// Emitted when the structure below a node changed in a way that cannot
    /// be described incrementally. Args: the row.
    pub node_changed: Signal<usize>,
}

impl Default for TreeSourceSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSourceSignals {
    /// Creates a new set of tree source signals.
    pub fn new() -> Self {
        Self {
            node_inserted: Signal::new(),
            node_removed: Signal::new(),
            node_data_changed: Signal::new(),
            node_col_changed: Signal::new(),
            node_changed: Signal::new(),
        }
    }
}
