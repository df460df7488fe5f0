//! Error types for table-sort.

/// Errors raised by sorter lookups.
///
/// Every variant describes a caller bug: an index that was cached before a
/// structural change the caller failed to observe. Callers are expected to
/// treat these as assertion failures rather than recover from them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    /// A row or sorted position outside `[0, count)`.
    #[error("index {index} out of range for {count} rows")]
    OutOfRange {
        /// The offending row or sorted position.
        index: usize,
        /// The number of rows the sorter currently covers.
        count: usize,
    },

    /// A source row that is not present in a tree view.
    #[error("row {0} is not present in the sorted tree")]
    UnknownRow(usize),
}

impl SortError {
    /// Checks `index` against `count`, producing [`SortError::OutOfRange`]
    /// when it falls outside.
    #[inline]
    pub fn check_range(index: usize, count: usize) -> Result<()> {
        if index < count {
            Ok(())
        } else {
            Err(Self::OutOfRange { index, count })
        }
    }
}

/// A specialized Result type for table-sort operations.
pub type Result<T> = std::result::Result<T, SortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert!(SortError::check_range(0, 1).is_ok());
        assert_eq!(
            SortError::check_range(3, 3),
            Err(SortError::OutOfRange { index: 3, count: 3 })
        );
        assert!(SortError::check_range(0, 0).is_err());
    }

    #[test]
    fn test_display() {
        let err = SortError::OutOfRange { index: 7, count: 5 };
        assert_eq!(err.to_string(), "index 7 out of range for 5 rows");
        assert_eq!(
            SortError::UnknownRow(4).to_string(),
            "row 4 is not present in the sorted tree"
        );
    }
}
