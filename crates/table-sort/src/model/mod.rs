//! Sorting and selection for table and tree views.
//!
//! This module keeps the derived state a view needs on top of an external
//! data source, without ever owning the data itself:
//!
//! - which model row is shown at which position ([`Sorter`])
//! - which rows are selected and where the cursor is ([`SelectionModel`])
//! - how a hierarchical source looks with its siblings sorted ([`TreeSorted`])
//!
//! # Core Types
//!
//! - `TableSource` / `TreeSource`: The traits external sources implement
//! - `SortInfo`: Ordered `(column, ascending)` sort keys
//! - `TableHeader`: Per-column value comparators
//! - `CompareCache`: Opaque per-pass side table handed to comparators
//!
//! # Sorters
//!
//! - `SorterArray`: Lazily sorted/backsorted permutation over a row comparator
//! - `TableSorter`: A `SorterArray` kept in sync with a `TableSource`
//! - `TreeSorted`: Pre-order of a sorted tree
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use table_sort::model::{GestureModifiers, SelectionModel, Sorter, SorterArray};
//! # use table_sort::model::{CellValue, SourceSignals, TableSource};
//! # struct Rows(SourceSignals);
//! # impl TableSource for Rows {
//! #     fn row_count(&self) -> usize { 10 }
//! #     fn value_at(&self, _: usize, _: usize) -> CellValue { CellValue::None }
//! #     fn signals(&self) -> &SourceSignals { &self.0 }
//! # }
//! # let source = Arc::new(Rows(SourceSignals::new()));
//!
//! // Show rows in reverse model order.
//! let sorter = Arc::new(SorterArray::with_compare(10, |a, b, _| b.cmp(&a)));
//! let selection = SelectionModel::with_sorter(source, sorter.clone());
//!
//! selection.do_something(2, 0, GestureModifiers::NONE);
//! selection.do_something(0, 0, GestureModifiers::SHIFT);
//! assert_eq!(selection.selected_rows(), vec![0, 1, 2]);
//! assert_eq!(sorter.model_to_sorted(2).unwrap(), 7);
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  signals  ┌──────────────┐  positions  ┌────────────────┐
//! │ TableSource │──────────>│    Sorter    │<────────────│ SelectionModel │
//! │ TreeSource  │           │ (array/tree) │             │   (bitmask)    │
//! └─────────────┘           └──────────────┘             └────────────────┘
//!        │                         ▲
//!        │ value_at                │ sort_info_changed
//!        v                         │
//! ┌─────────────┐           ┌──────────────┐
//! │ TableHeader │──────────>│   SortInfo   │
//! └─────────────┘           └──────────────┘
//! ```

mod bitmask;
mod compare;
mod header;
mod selection;
mod sort_info;
mod sorter;
mod table_sorter;
mod traits;
mod tree_sorted;
mod value;

pub use bitmask::RowBitmask;
pub use compare::{CacheFactory, CompareCache, MultiKeyCompare, PrefetchedValues, RowCompareFn};
pub use header::{ColumnCompareFn, TableHeader};
pub use selection::{GestureModifiers, SelectionModel};
pub use sort_info::{SortColumn, SortInfo};
pub use sorter::{Sorter, SorterArray};
pub use table_sorter::TableSorter;
pub use traits::{SourceSignals, TableSource, TreeSource, TreeSourceSignals};
pub use tree_sorted::{TreeSorted, TreeSortedConfig};
pub use value::{compare_values, CellValue};
