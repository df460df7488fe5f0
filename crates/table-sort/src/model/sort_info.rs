//! Sort criteria shared by sorters and tree views.
//!
//! [`SortInfo`] is an ordered list of `(column, ascending)` keys. The first
//! key is the primary sort key; later keys only break ties left by earlier
//! ones. Every mutation fires [`SortInfo::sort_info_changed`] so attached
//! sorters can invalidate themselves.
//!
//! ```
//! use table_sort::model::{SortColumn, SortInfo};
//!
//! let info = SortInfo::new();
//! info.set_columns(vec![SortColumn::descending(2), SortColumn::ascending(0)]);
//! assert!(info.affects_sort(2));
//! assert!(!info.affects_sort(1));
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use table_sort_core::Signal;

/// One sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortColumn {
    /// The source column compared by this key.
    pub column: usize,
    /// `false` negates the column comparator's result.
    pub ascending: bool,
}

impl SortColumn {
    /// An ascending key on `column`.
    pub const fn ascending(column: usize) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    /// A descending key on `column`.
    pub const fn descending(column: usize) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// Ordered sort keys with change notification.
pub struct SortInfo {
    columns: RwLock<Vec<SortColumn>>,

    /// Emitted after the sort keys changed.
    pub sort_info_changed: Signal<()>,
}

impl Default for SortInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SortInfo {
    /// Creates sort info with no keys (rows stay in model order).
    pub fn new() -> Self {
        Self::from_columns(Vec::new())
    }

    /// Creates sort info from previously saved keys.
    pub fn from_columns(columns: Vec<SortColumn>) -> Self {
        Self {
            columns: RwLock::new(columns),
            sort_info_changed: Signal::new(),
        }
    }

    /// Returns a copy of the current keys, suitable for persisting.
    pub fn snapshot(&self) -> Vec<SortColumn> {
        self.columns.read().clone()
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.columns.read().len()
    }

    /// Returns `true` if no keys are set.
    pub fn is_empty(&self) -> bool {
        self.columns.read().is_empty()
    }

    /// Returns the key at `index`.
    pub fn get(&self, index: usize) -> Option<SortColumn> {
        self.columns.read().get(index).copied()
    }

    /// Returns `true` if `column` participates in any key.
    pub fn affects_sort(&self, column: usize) -> bool {
        self.columns.read().iter().any(|key| key.column == column)
    }

    /// Replaces all keys.
    pub fn set_columns(&self, columns: Vec<SortColumn>) {
        *self.columns.write() = columns;
        self.sort_info_changed.emit(());
    }

    /// Sets the key at `index`, appending if `index` is one past the end.
    ///
    /// Indices further out are ignored.
    pub fn set_sort_column(&self, index: usize, key: SortColumn) {
        {
            let mut columns = self.columns.write();
            match index.cmp(&columns.len()) {
                std::cmp::Ordering::Less => columns[index] = key,
                std::cmp::Ordering::Equal => columns.push(key),
                std::cmp::Ordering::Greater => return,
            }
        }
        self.sort_info_changed.emit(());
    }

    /// Appends a key with the lowest priority.
    pub fn push(&self, key: SortColumn) {
        self.columns.write().push(key);
        self.sort_info_changed.emit(());
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.columns.write().clear();
        self.sort_info_changed.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_set_sort_column_bounds() {
        let info = SortInfo::new();
        info.set_sort_column(0, SortColumn::ascending(3));
        info.set_sort_column(1, SortColumn::descending(1));
        info.set_sort_column(5, SortColumn::ascending(9));
        info.set_sort_column(0, SortColumn::descending(4));

        assert_eq!(
            info.snapshot(),
            vec![SortColumn::descending(4), SortColumn::descending(1)]
        );
    }

    #[test]
    fn test_changes_emit_signal() {
        let info = SortInfo::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        info.sort_info_changed.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        info.push(SortColumn::ascending(0));
        info.set_columns(vec![SortColumn::ascending(1)]);
        info.set_sort_column(7, SortColumn::ascending(2));
        info.clear();

        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(info.is_empty());
    }

    #[test]
    fn test_listener_can_read_keys() {
        let info = Arc::new(SortInfo::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&info);
        let s = seen.clone();
        info.sort_info_changed.connect(move |_| {
            if let Some(info) = weak.upgrade() {
                s.store(info.len(), Ordering::SeqCst);
            }
        });

        info.set_columns(vec![SortColumn::ascending(0), SortColumn::ascending(1)]);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
