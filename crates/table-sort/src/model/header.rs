//! Per-column comparator registry.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::value::{compare_values, CellValue};

/// Type alias for a column's value comparator.
pub type ColumnCompareFn = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// Maps source columns to their type-specific comparators.
///
/// Columns without a registered comparator fall back to [`compare_values`].
///
/// ```
/// use table_sort::model::{CellValue, TableHeader};
/// use std::cmp::Ordering;
///
/// let header = TableHeader::new();
/// // Case-insensitive subject column.
/// header.set_compare(1, |a: &CellValue, b: &CellValue| {
///     let a = a.as_str().unwrap_or_default().to_lowercase();
///     let b = b.as_str().unwrap_or_default().to_lowercase();
///     a.cmp(&b)
/// });
///
/// assert_eq!(header.compare(1, &"Re: x".into(), &"re: x".into()), Ordering::Equal);
/// ```
#[derive(Default)]
pub struct TableHeader {
    comparators: RwLock<HashMap<usize, ColumnCompareFn>>,
}

impl TableHeader {
    /// Creates a header where every column uses [`compare_values`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the comparator for `column`, replacing any previous one.
    pub fn set_compare<F>(&self, column: usize, compare: F)
    where
        F: Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    {
        self.comparators.write().insert(column, Arc::new(compare));
    }

    /// Removes the comparator for `column`.
    pub fn clear_compare(&self, column: usize) {
        self.comparators.write().remove(&column);
    }

    /// Returns the comparator for `column`, if one is registered.
    pub fn compare_fn(&self, column: usize) -> Option<ColumnCompareFn> {
        self.comparators.read().get(&column).cloned()
    }

    /// Compares two values of `column`.
    pub fn compare(&self, column: usize, a: &CellValue, b: &CellValue) -> Ordering {
        match self.compare_fn(column) {
            Some(compare) => compare(a, b),
            None => compare_values(a, b),
        }
    }
}
