//! Flat sorter bound to a live table source.

use std::sync::Arc;

use parking_lot::Mutex;
use table_sort_core::logging::targets;
use table_sort_core::{ConnectionId, Result};

use super::compare::{CacheFactory, CompareCache, MultiKeyCompare, RowCompareFn};
use super::header::TableHeader;
use super::sort_info::SortInfo;
use super::sorter::{Sorter, SorterArray};
use super::traits::TableSource;

struct Connections {
    model_changed: ConnectionId,
    rows_inserted: ConnectionId,
    rows_deleted: ConnectionId,
    sort_info_changed: ConnectionId,
}

/// A [`SorterArray`] kept in sync with a [`TableSource`] and a [`SortInfo`].
///
/// The comparator is the multi-key comparator over the sort info's keys,
/// each column resolved through the [`TableHeader`]. Every sort pass
/// prefetches the key columns of all rows, so the source is read once per
/// row and key rather than once per comparison.
///
/// After [`attach`](Self::attach):
///
/// - `model_changed`, `rows_deleted` and insertions in the middle of the
///   table reset the row count
/// - insertions at the end are placed incrementally with
///   [`SorterArray::append`]
/// - `sort_info_changed` reinstalls the comparator
pub struct TableSorter {
    source: Arc<dyn TableSource>,
    sort_info: Arc<SortInfo>,
    header: Arc<TableHeader>,
    array: SorterArray,
    connections: Mutex<Option<Connections>>,
}

impl TableSorter {
    /// Creates a sorter over the current rows of `source`.
    ///
    /// The sorter does not follow the source until it is attached.
    pub fn new(source: Arc<dyn TableSource>, sort_info: Arc<SortInfo>, header: Arc<TableHeader>) -> Self {
        let sorter = Self {
            array: SorterArray::new(source.row_count()),
            source,
            sort_info,
            header,
            connections: Mutex::new(None),
        };
        sorter.install_compare();
        sorter
    }

    /// Returns the source this sorter orders.
    pub fn source(&self) -> &Arc<dyn TableSource> {
        &self.source
    }

    /// Returns the sort keys this sorter follows.
    pub fn sort_info(&self) -> &Arc<SortInfo> {
        &self.sort_info
    }

    /// Returns the column comparator registry.
    pub fn header(&self) -> &Arc<TableHeader> {
        &self.header
    }

    /// Subscribes to the source's and sort info's change signals.
    ///
    /// Attaching twice is a no-op.
    pub fn attach(self: &Arc<Self>) {
        let mut connections = self.connections.lock();
        if connections.is_some() {
            return;
        }

        let signals = self.source.signals();

        let weak = Arc::downgrade(self);
        let model_changed = signals.model_changed.connect(move |_| {
            if let Some(sorter) = weak.upgrade() {
                sorter.reset_count();
            }
        });

        let weak = Arc::downgrade(self);
        let rows_inserted = signals.rows_inserted.connect(move |&(at, count)| {
            if let Some(sorter) = weak.upgrade() {
                sorter.rows_inserted(at, count);
            }
        });

        let weak = Arc::downgrade(self);
        let rows_deleted = signals.rows_deleted.connect(move |_| {
            if let Some(sorter) = weak.upgrade() {
                sorter.reset_count();
            }
        });

        let weak = Arc::downgrade(self);
        let sort_info_changed = self.sort_info.sort_info_changed.connect(move |_| {
            if let Some(sorter) = weak.upgrade() {
                sorter.install_compare();
            }
        });

        *connections = Some(Connections {
            model_changed,
            rows_inserted,
            rows_deleted,
            sort_info_changed,
        });
        tracing::debug!(target: targets::SORTER, "table sorter attached");
    }

    /// Disconnects from the source and sort info.
    pub fn detach(&self) {
        let Some(connections) = self.connections.lock().take() else {
            return;
        };

        let signals = self.source.signals();
        signals.model_changed.disconnect(connections.model_changed);
        signals.rows_inserted.disconnect(connections.rows_inserted);
        signals.rows_deleted.disconnect(connections.rows_deleted);
        self.sort_info
            .sort_info_changed
            .disconnect(connections.sort_info_changed);
        tracing::debug!(target: targets::SORTER, "table sorter detached");
    }

    /// Returns `true` while subscribed to change signals.
    pub fn is_attached(&self) -> bool {
        self.connections.lock().is_some()
    }

    /// Re-resolves the comparator from the current sort keys and header.
    ///
    /// Call this after registering a different column comparator.
    pub fn refresh(&self) {
        self.install_compare();
    }

    fn install_compare(&self) {
        let keys = MultiKeyCompare::new(&self.sort_info, &self.header);
        if keys.is_empty() {
            self.array.set_cache_factory(None);
            self.array.set_compare(None);
            return;
        }

        let keys = Arc::new(keys);

        let source = Arc::clone(&self.source);
        let k = Arc::clone(&keys);
        let compare: RowCompareFn = Arc::new(move |a, b, cache| k.compare(&*source, a, b, cache));

        let source = Arc::clone(&self.source);
        let factory: CacheFactory = Arc::new(move || CompareCache::new(keys.prefetch(&*source)));

        self.array.set_cache_factory(Some(factory));
        self.array.set_compare(Some(compare));
    }

    fn reset_count(&self) {
        self.array.set_count(self.source.row_count());
    }

    fn rows_inserted(&self, at: usize, count: usize) {
        let old = self.array.row_count();
        if at == old && self.source.row_count() == old + count {
            self.array.append(count);
        } else {
            tracing::trace!(target: targets::SORTER, at, count, "mid-table insert, resetting");
            self.reset_count();
        }
    }
}

impl Drop for TableSorter {
    fn drop(&mut self) {
        self.detach();
    }
}

impl Sorter for TableSorter {
    fn model_to_sorted(&self, row: usize) -> Result<usize> {
        self.array.model_to_sorted(row)
    }

    fn sorted_to_model(&self, position: usize) -> Result<usize> {
        self.array.sorted_to_model(position)
    }

    fn model_to_sorted_array(&self) -> Arc<Vec<usize>> {
        self.array.model_to_sorted_array()
    }

    fn sorted_to_model_array(&self) -> Arc<Vec<usize>> {
        self.array.sorted_to_model_array()
    }

    fn needs_sorting(&self) -> bool {
        self.array.needs_sorting()
    }

    fn row_count(&self) -> usize {
        self.array.row_count()
    }
}
