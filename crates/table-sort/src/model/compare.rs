//! Row comparators and the per-pass compare cache.
//!
//! A sort pass compares the same rows many times. Before the pass starts the
//! sorter asks its [`CacheFactory`] for a [`CompareCache`], hands it to every
//! comparator call of that pass, then drops it. The cache is opaque to the
//! sorter; comparators recover their concrete type with
//! [`CompareCache::downcast_ref`].

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::header::{ColumnCompareFn, TableHeader};
use super::sort_info::{SortColumn, SortInfo};
use super::traits::TableSource;
use super::value::{compare_values, CellValue};

/// Type alias for a row comparator.
///
/// Receives two model rows and the cache of the current pass (if a factory
/// is installed). Ties do not need breaking; sorters order equal rows by
/// ascending model row.
pub type RowCompareFn = Arc<dyn Fn(usize, usize, Option<&CompareCache>) -> Ordering + Send + Sync>;

/// Type alias for a compare cache factory, invoked once per sort pass.
pub type CacheFactory = Arc<dyn Fn() -> CompareCache + Send + Sync>;

/// Opaque side table that lives for exactly one sort pass.
pub struct CompareCache {
    inner: Box<dyn Any + Send + Sync>,
}

impl CompareCache {
    /// Wraps a value as a compare cache.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
        }
    }

    /// Returns the cached value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for CompareCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareCache").finish_non_exhaustive()
    }
}

/// Orders two rows by `compare`, then by ascending model row.
///
/// This is the total order every sorter in this crate sorts by.
pub(crate) fn total_order(
    compare: &RowCompareFn,
    cache: Option<&CompareCache>,
    a: usize,
    b: usize,
) -> Ordering {
    compare(a, b, cache).then_with(|| a.cmp(&b))
}

/// Sort keys resolved against a header's column comparators.
///
/// Comparators are looked up once when the keys are built, not on every
/// comparison.
#[derive(Clone, Default)]
pub struct MultiKeyCompare {
    keys: Vec<(SortColumn, Option<ColumnCompareFn>)>,
}

impl fmt::Debug for MultiKeyCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<_> = self.keys.iter().map(|(key, _)| key).collect();
        f.debug_struct("MultiKeyCompare").field("keys", &keys).finish()
    }
}

impl MultiKeyCompare {
    /// Resolves the current keys of `info` through `header`.
    pub fn new(info: &SortInfo, header: &TableHeader) -> Self {
        Self::from_columns(&info.snapshot(), header)
    }

    /// Resolves an explicit key list through `header`.
    pub fn from_columns(columns: &[SortColumn], header: &TableHeader) -> Self {
        Self {
            keys: columns
                .iter()
                .map(|key| (*key, header.compare_fn(key.column)))
                .collect(),
        }
    }

    /// Returns `true` if there are no keys, in which case every pair of rows
    /// compares equal.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two rows key by key, stopping at the first difference.
    ///
    /// Values come from `cache` when it holds [`PrefetchedValues`] covering
    /// both rows, otherwise from `source`.
    pub fn compare<S: TableSource + ?Sized>(
        &self,
        source: &S,
        a: usize,
        b: usize,
        cache: Option<&CompareCache>,
    ) -> Ordering {
        let prefetched = cache.and_then(|c| c.downcast_ref::<PrefetchedValues>());

        for (index, (key, compare)) in self.keys.iter().enumerate() {
            let cached = prefetched.and_then(|p| Some((p.value(index, a)?, p.value(index, b)?)));
            let ord = match cached {
                Some((va, vb)) => Self::compare_with(compare, va, vb),
                None => {
                    let va = source.value_at(a, key.column);
                    let vb = source.value_at(b, key.column);
                    Self::compare_with(compare, &va, &vb)
                }
            };

            let ord = if key.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }

        Ordering::Equal
    }

    /// Like [`compare`](Self::compare), with ties broken by ascending row.
    pub fn compare_total<S: TableSource + ?Sized>(&self, source: &S, a: usize, b: usize) -> Ordering {
        self.compare(source, a, b, None).then_with(|| a.cmp(&b))
    }

    /// Reads every key column of every row of `source` into a cache.
    pub fn prefetch<S: TableSource + ?Sized>(&self, source: &S) -> PrefetchedValues {
        let rows = source.row_count();
        let columns = self
            .keys
            .iter()
            .map(|(key, _)| (0..rows).map(|row| source.value_at(row, key.column)).collect())
            .collect();
        PrefetchedValues { columns }
    }

    fn compare_with(compare: &Option<ColumnCompareFn>, a: &CellValue, b: &CellValue) -> Ordering {
        match compare {
            Some(compare) => compare(a, b),
            None => compare_values(a, b),
        }
    }
}

/// Compare cache holding the sort-key values of every row.
#[derive(Debug, Clone)]
pub struct PrefetchedValues {
    /// Indexed by key position, then by model row.
    columns: Vec<Vec<CellValue>>,
}

impl PrefetchedValues {
    /// Returns the value of key `key` for `row`, if it was prefetched.
    pub fn value(&self, key: usize, row: usize) -> Option<&CellValue> {
        self.columns.get(key)?.get(row)
    }

    /// Returns the number of rows covered.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::traits::SourceSignals;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    struct Grid {
        rows: Vec<Vec<CellValue>>,
        reads: AtomicUsize,
        signals: SourceSignals,
    }

    impl Grid {
        fn new(rows: Vec<Vec<CellValue>>) -> Self {
            Self {
                rows,
                reads: AtomicUsize::new(0),
                signals: SourceSignals::new(),
            }
        }
    }

    impl TableSource for Grid {
        fn row_count(&self) -> usize {
            self.rows.len()
        }

        fn value_at(&self, row: usize, column: usize) -> CellValue {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            self.rows[row][column].clone()
        }

        fn signals(&self) -> &SourceSignals {
            &self.signals
        }
    }

    fn grid() -> Grid {
        Grid::new(vec![
            vec!["b".into(), 1.into()],
            vec!["a".into(), 2.into()],
            vec!["b".into(), 0.into()],
        ])
    }

    #[test]
    fn test_cache_downcast() {
        let cache = CompareCache::new(vec![1u32, 2, 3]);
        assert_eq!(cache.downcast_ref::<Vec<u32>>().map(Vec::len), Some(3));
        assert!(cache.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_total_order_breaks_ties_by_row() {
        let compare: RowCompareFn = Arc::new(|_, _, _| Ordering::Equal);
        assert_eq!(total_order(&compare, None, 4, 2), Ordering::Greater);
        assert_eq!(total_order(&compare, None, 2, 2), Ordering::Equal);
    }

    #[test]
    fn test_multi_key_secondary_key() {
        let source = grid();
        let header = TableHeader::new();
        let keys = MultiKeyCompare::from_columns(
            &[SortColumn::ascending(0), SortColumn::descending(1)],
            &header,
        );

        assert_eq!(keys.compare(&source, 1, 0, None), Ordering::Less);
        // Equal on column 0, column 1 descending: 1 > 0 so row 0 first.
        assert_eq!(keys.compare(&source, 0, 2, None), Ordering::Less);
        assert_eq!(keys.compare(&source, 0, 0, None), Ordering::Equal);
        assert_eq!(keys.compare_total(&source, 2, 2), Ordering::Equal);
    }

    #[test]
    fn test_empty_keys_compare_equal() {
        let source = grid();
        let keys = MultiKeyCompare::default();
        assert!(keys.is_empty());
        assert_eq!(keys.compare(&source, 0, 1, None), Ordering::Equal);
        assert_eq!(keys.compare_total(&source, 0, 1), Ordering::Less);
    }

    #[test]
    fn test_header_comparator_is_used() {
        let source = grid();
        let header = TableHeader::new();
        header.set_compare(1, |a, b| compare_values(b, a));
        let keys = MultiKeyCompare::from_columns(&[SortColumn::ascending(1)], &header);

        assert_eq!(keys.compare(&source, 0, 1, None), Ordering::Greater);
    }

    #[test]
    fn test_prefetched_values_skip_source() {
        let source = grid();
        let keys = MultiKeyCompare::from_columns(&[SortColumn::ascending(0)], &TableHeader::new());

        let cache = CompareCache::new(keys.prefetch(&source));
        let after_prefetch = source.reads.load(AtomicOrdering::SeqCst);
        assert_eq!(after_prefetch, 3);

        assert_eq!(keys.compare(&source, 1, 2, Some(&cache)), Ordering::Less);
        assert_eq!(source.reads.load(AtomicOrdering::SeqCst), after_prefetch);

        let prefetched = cache.downcast_ref::<PrefetchedValues>().map(PrefetchedValues::rows);
        assert_eq!(prefetched, Some(3));
    }
}
