//! Prelude module for table-sort.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use table_sort::prelude::*;
//! ```

// ============================================================================
// Signals and Errors
// ============================================================================

pub use crate::{ConnectionId, Signal, SortError};

// ============================================================================
// Sources and Sort Keys
// ============================================================================

pub use crate::model::{
    CellValue, SortColumn, SortInfo, SourceSignals, TableHeader, TableSource, TreeSource,
    TreeSourceSignals,
};

// ============================================================================
// Sorters and Selection
// ============================================================================

pub use crate::model::{
    GestureModifiers, SelectionModel, Sorter, SorterArray, TableSorter, TreeSorted,
    TreeSortedConfig,
};
