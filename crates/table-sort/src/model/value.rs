//! Cell values read from an external source.
//!
//! The core never interprets values itself; it only hands pairs of them to a
//! column comparator. [`compare_values`] is the comparator used for columns
//! that have none registered.

use std::cmp::Ordering;

/// A value stored in one cell of the external source.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// No data.
    #[default]
    None,
    /// Boolean data.
    Bool(bool),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// String data.
    String(String),
}

impl CellValue {
    /// Returns `true` if this is `CellValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, CellValue::None)
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::None => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::String(_) => 3,
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::None, Into::into)
    }
}

/// Compares two cell values for sorting.
///
/// Values of the same kind use their natural order (floats via
/// [`f64::total_cmp`]); integers and floats compare numerically with each
/// other. Values of different kinds order as
/// `None < Bool < number < String`.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::String(sa), CellValue::String(sb)) => sa.cmp(sb),
        (CellValue::Int(ia), CellValue::Int(ib)) => ia.cmp(ib),
        (CellValue::Float(fa), CellValue::Float(fb)) => fa.total_cmp(fb),
        (CellValue::Int(ia), CellValue::Float(fb)) => (*ia as f64).total_cmp(fb),
        (CellValue::Float(fa), CellValue::Int(ib)) => fa.total_cmp(&(*ib as f64)),
        (CellValue::Bool(ba), CellValue::Bool(bb)) => ba.cmp(bb),
        _ => a.rank().cmp(&b.rank()),
    }
}
