//! Mapping between model order and sorted order.
//!
//! A [`Sorter`] answers two questions for a view: which model row is shown at
//! sorted position `n`, and at which sorted position model row `m` is shown.
//! [`SorterArray`] is the flat implementation. It keeps two permutation
//! arrays:
//!
//! - `sorted`: sorted position -> model row
//! - `backsorted`: model row -> sorted position
//!
//! Both are computed lazily on the first lookup after an invalidation and
//! dropped wholesale whenever the row set or the comparator changes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use table_sort::model::{Sorter, SorterArray};
//!
//! let values = Arc::new(vec![30, 10, 20]);
//! let v = values.clone();
//! let sorter = SorterArray::with_compare(3, move |a, b, _| v[a].cmp(&v[b]));
//!
//! assert_eq!(*sorter.sorted_to_model_array(), vec![1, 2, 0]);
//! assert_eq!(sorter.model_to_sorted(0).unwrap(), 2);
//! ```

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;
use table_sort_core::logging::targets;
use table_sort_core::{PerfSpan, Result, SortError};

use super::compare::{total_order, CacheFactory, CompareCache, RowCompareFn};

/// Bidirectional mapping between model rows and sorted positions.
///
/// Lookups outside `[0, row_count)` fail with [`SortError::OutOfRange`].
/// Such a failure means the caller holds an index that went stale when it
/// missed a structural change.
pub trait Sorter: Send + Sync {
    /// Returns the sorted position of model row `row`.
    fn model_to_sorted(&self, row: usize) -> Result<usize>;

    /// Returns the model row shown at sorted position `position`.
    fn sorted_to_model(&self, position: usize) -> Result<usize>;

    /// Returns the full model row -> sorted position array.
    fn model_to_sorted_array(&self) -> Arc<Vec<usize>>;

    /// Returns the full sorted position -> model row array.
    fn sorted_to_model_array(&self) -> Arc<Vec<usize>>;

    /// Returns `true` if the mapping is not the identity.
    fn needs_sorting(&self) -> bool;

    /// Returns the number of rows covered by the mapping.
    fn row_count(&self) -> usize;
}

#[derive(Default)]
struct Arrays {
    count: usize,
    sorted: Option<Arc<Vec<usize>>>,
    backsorted: Option<Arc<Vec<usize>>>,
}

impl Arrays {
    fn clean(&mut self) {
        self.sorted = None;
        self.backsorted = None;
    }
}

/// Flat sorter over a fixed number of rows and a row comparator.
///
/// Without a comparator the mapping is the identity. With one, rows are
/// ordered by the comparator and then by ascending model row, so the result
/// never depends on the sort algorithm's stability.
pub struct SorterArray {
    arrays: RwLock<Arrays>,
    compare: RwLock<Option<RowCompareFn>>,
    cache_factory: RwLock<Option<CacheFactory>>,
}

impl SorterArray {
    /// Creates an identity sorter over `count` rows.
    pub fn new(count: usize) -> Self {
        Self {
            arrays: RwLock::new(Arrays {
                count,
                ..Default::default()
            }),
            compare: RwLock::new(None),
            cache_factory: RwLock::new(None),
        }
    }

    /// Creates a sorter over `count` rows ordered by `compare`.
    pub fn with_compare<F>(count: usize, compare: F) -> Self
    where
        F: Fn(usize, usize, Option<&CompareCache>) -> Ordering + Send + Sync + 'static,
    {
        let sorter = Self::new(count);
        *sorter.compare.write() = Some(Arc::new(compare));
        sorter
    }

    /// Installs or removes the row comparator.
    ///
    /// Both permutation arrays are discarded either way.
    pub fn set_compare(&self, compare: Option<RowCompareFn>) {
        tracing::debug!(
            target: targets::SORTER,
            installed = compare.is_some(),
            "comparator changed"
        );
        *self.compare.write() = compare;
        self.clean();
    }

    /// Installs or removes the compare cache factory.
    ///
    /// The factory runs once at the start of every full sort, and at the start
    /// of an append pass large enough for a side table to pay off. A
    /// comparator must order rows the same way with or without a cache.
    pub fn set_cache_factory(&self, factory: Option<CacheFactory>) {
        *self.cache_factory.write() = factory;
    }

    /// Discards both arrays and resets the row count.
    pub fn set_count(&self, count: usize) {
        let mut arrays = self.arrays.write();
        arrays.clean();
        arrays.count = count;
        tracing::trace!(target: targets::SORTER, count, "row count reset");
    }

    /// Adds `n` rows at the end of model order.
    ///
    /// If the sorted array has already been computed, each new row is placed
    /// into it by binary search, giving the same array a full sort would. The
    /// backsorted array is discarded.
    pub fn append(&self, n: usize) {
        if n == 0 {
            return;
        }

        let compare = self.compare.read().clone();
        let mut arrays = self.arrays.write();
        let old = arrays.count;
        arrays.count += n;
        arrays.backsorted = None;

        let Some(sorted) = arrays.sorted.as_mut() else {
            tracing::trace!(target: targets::SORTER, old, n, "append without sorted array");
            return;
        };

        let sorted = Arc::make_mut(sorted);
        match compare {
            None => sorted.extend(old..old + n),
            Some(compare) => {
                let _span = PerfSpan::with_rows("sorter.append", n);
                let cache = if prefetch_pays_off(n, old + n) {
                    self.new_cache()
                } else {
                    None
                };
                for row in old..old + n {
                    let position = sorted.partition_point(|&other| {
                        total_order(&compare, cache.as_ref(), other, row) == Ordering::Less
                    });
                    sorted.insert(position, row);
                }
            }
        }

        tracing::trace!(target: targets::SORTER, old, n, "appended rows into sorted array");
    }

    /// Discards both arrays, keeping the row count.
    pub fn clean(&self) {
        self.arrays.write().clean();
    }

    fn new_cache(&self) -> Option<CompareCache> {
        let factory = self.cache_factory.read().clone();
        factory.map(|factory| factory())
    }

    fn sorted(&self) -> Arc<Vec<usize>> {
        if let Some(sorted) = self.arrays.read().sorted.clone() {
            return sorted;
        }

        let mut arrays = self.arrays.write();
        self.sort_locked(&mut arrays)
    }

    fn backsorted(&self) -> Arc<Vec<usize>> {
        if let Some(backsorted) = self.arrays.read().backsorted.clone() {
            return backsorted;
        }

        let mut arrays = self.arrays.write();
        if let Some(backsorted) = &arrays.backsorted {
            return Arc::clone(backsorted);
        }

        let sorted = self.sort_locked(&mut arrays);
        let _span = PerfSpan::with_rows("sorter.backsort", sorted.len());
        let mut backsorted = vec![0; sorted.len()];
        for (position, &row) in sorted.iter().enumerate() {
            backsorted[row] = position;
        }

        let backsorted = Arc::new(backsorted);
        arrays.backsorted = Some(Arc::clone(&backsorted));
        backsorted
    }

    fn sort_locked(&self, arrays: &mut Arrays) -> Arc<Vec<usize>> {
        if let Some(sorted) = &arrays.sorted {
            return Arc::clone(sorted);
        }

        let mut rows: Vec<usize> = (0..arrays.count).collect();
        if let Some(compare) = self.compare.read().clone() {
            let _span = PerfSpan::with_rows("sorter.sort", rows.len());
            let cache = self.new_cache();
            rows.sort_unstable_by(|&a, &b| total_order(&compare, cache.as_ref(), a, b));
            tracing::trace!(target: targets::SORTER, rows = rows.len(), "sorted");
        }

        let sorted = Arc::new(rows);
        arrays.sorted = Some(Arc::clone(&sorted));
        sorted
    }
}

/// Whether placing `n` rows by binary search into `total` rows reads enough
/// values to justify building a side table over all of them.
fn prefetch_pays_off(n: usize, total: usize) -> bool {
    let probes = n.saturating_mul((usize::BITS - total.leading_zeros()) as usize);
    probes.saturating_mul(2) >= total
}

impl Sorter for SorterArray {
    fn model_to_sorted(&self, row: usize) -> Result<usize> {
        let count = self.row_count();
        SortError::check_range(row, count)?;
        if !self.needs_sorting() {
            return Ok(row);
        }

        self.backsorted()
            .get(row)
            .copied()
            .ok_or(SortError::OutOfRange { index: row, count })
    }

    fn sorted_to_model(&self, position: usize) -> Result<usize> {
        let count = self.row_count();
        SortError::check_range(position, count)?;
        if !self.needs_sorting() {
            return Ok(position);
        }

        self.sorted()
            .get(position)
            .copied()
            .ok_or(SortError::OutOfRange {
                index: position,
                count,
            })
    }

    fn model_to_sorted_array(&self) -> Arc<Vec<usize>> {
        self.backsorted()
    }

    fn sorted_to_model_array(&self) -> Arc<Vec<usize>> {
        self.sorted()
    }

    fn needs_sorting(&self) -> bool {
        self.compare.read().is_some()
    }

    fn row_count(&self) -> usize {
        self.arrays.read().count
    }
}
