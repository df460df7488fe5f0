//! Core systems for table-sort.
//!
//! This crate provides the foundation shared by the sorters, selection model
//! and tree view of the `table-sort` crate:
//!
//! - **Signals**: synchronous, in-order observer lists ([`Signal`])
//! - **Errors**: the fail-fast sorter error taxonomy ([`SortError`])
//! - **Logging**: `tracing` targets and performance spans ([`logging`])
//! - **Guards**: non-reentrant section flags ([`ReentrancyGuard`])
//!
//! # Signal Example
//!
//! ```
//! use table_sort_core::Signal;
//!
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let conn_id = rows_inserted.connect(|(at, count)| {
//!     println!("{count} rows inserted at {at}");
//! });
//!
//! rows_inserted.emit((10, 2));
//! rows_inserted.disconnect(conn_id);
//! ```

mod error;
mod guard;
pub mod logging;
pub mod signal;

pub use error::{Result, SortError};
pub use guard::{ReentrancyGuard, ReentrancyToken};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
