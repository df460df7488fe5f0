//! Logging facilities for table-sort.
//!
//! table-sort uses the `tracing` crate for instrumentation and never installs
//! a subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("table_sort::sorter=trace")
//!     .init();
//! ```
//!
//! Sort passes, backsorts and tree rebuilds are wrapped in a [`PerfSpan`] so
//! their duration shows up under the [`targets::PERF`] target.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal delivery target.
    pub const SIGNAL: &str = "table_sort_core::signal";
    /// Flat sorter (sort/backsort/append) target.
    pub const SORTER: &str = "table_sort::sorter";
    /// Selection model target.
    pub const SELECTION: &str = "table_sort::selection";
    /// Sorted tree view target.
    pub const TREE: &str = "table_sort::tree";
    /// Performance spans.
    pub const PERF: &str = "table_sort::perf";
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// This is useful for tracking the duration of sort passes.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }

    /// Create a performance span that also records how many rows the
    /// operation covers.
    pub fn with_rows(name: &'static str, rows: usize) -> Self {
        let span =
            tracing::info_span!(target: targets::PERF, "perf", operation = name, rows = rows);
        Self {
            span: span.entered(),
        }
    }
}
