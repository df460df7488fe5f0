//! table-sort - sorted index arrays, row selection and sorted trees for
//! table views.
//!
//! This is the main crate; it re-exports the core systems of
//! `table-sort-core` alongside the [`model`] module.
//!
//! # Example
//!
//! ```
//! use table_sort::model::{Sorter, SorterArray};
//!
//! let values = [30, 10, 20];
//! let sorter = SorterArray::with_compare(3, move |a, b, _| values[a].cmp(&values[b]));
//!
//! assert_eq!(*sorter.sorted_to_model_array(), vec![1, 2, 0]);
//! sorter.append(0);
//! assert_eq!(sorter.row_count(), 3);
//! ```

pub use table_sort_core::*;

pub mod model;
pub mod prelude;

static_assertions::assert_impl_all!(model::SorterArray: Send, Sync);
static_assertions::assert_impl_all!(model::TableSorter: Send, Sync);
static_assertions::assert_impl_all!(model::SelectionModel: Send, Sync);
static_assertions::assert_impl_all!(model::TreeSorted: Send, Sync);
static_assertions::assert_impl_all!(model::SortInfo: Send, Sync);
