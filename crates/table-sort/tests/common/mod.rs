//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::RwLock;
use table_sort::model::{CellValue, SourceSignals, TableSource, TreeSource, TreeSourceSignals};

/// A flat source with one integer column.
pub struct Column {
    values: RwLock<Vec<i64>>,
    signals: SourceSignals,
}

impl Column {
    pub fn new(values: Vec<i64>) -> Arc<Self> {
        Arc::new(Self {
            values: RwLock::new(values),
            signals: SourceSignals::new(),
        })
    }

    pub fn value(&self, row: usize) -> i64 {
        self.values.read()[row]
    }

    pub fn append(&self, values: &[i64]) {
        let at = self.row_count();
        self.signals.emit_rows_inserted(at, values.len(), || {
            self.values.write().extend_from_slice(values)
        });
    }

    pub fn insert(&self, at: usize, value: i64) {
        self.signals
            .emit_rows_inserted(at, 1, || self.values.write().insert(at, value));
    }

    pub fn remove(&self, at: usize) {
        self.signals.emit_rows_deleted(at, 1, || {
            self.values.write().remove(at);
        });
    }

    pub fn replace(&self, values: Vec<i64>) {
        self.signals
            .emit_model_changed(|| *self.values.write() = values);
    }
}

impl TableSource for Column {
    fn row_count(&self) -> usize {
        self.values.read().len()
    }

    fn value_at(&self, row: usize, _column: usize) -> CellValue {
        self.values.read().get(row).copied().into()
    }

    fn signals(&self) -> &SourceSignals {
        &self.signals
    }
}

/// A hierarchical source: each row has an optional parent and one value.
pub struct Outline {
    nodes: RwLock<Vec<(Option<usize>, i64)>>,
    signals: SourceSignals,
    tree_signals: TreeSourceSignals,
}

impl Outline {
    pub fn new(nodes: Vec<(Option<usize>, i64)>) -> Arc<Self> {
        Arc::new(Self {
            nodes: RwLock::new(nodes),
            signals: SourceSignals::new(),
            tree_signals: TreeSourceSignals::new(),
        })
    }

    pub fn push(&self, parent: usize, value: i64) -> usize {
        let row = {
            let mut nodes = self.nodes.write();
            nodes.push((Some(parent), value));
            nodes.len() - 1
        };
        self.tree_signals.node_inserted.emit(row);
        row
    }
}

impl TableSource for Outline {
    fn row_count(&self) -> usize {
        self.nodes.read().len()
    }

    fn value_at(&self, row: usize, _column: usize) -> CellValue {
        self.nodes.read().get(row).map(|node| node.1).into()
    }

    fn signals(&self) -> &SourceSignals {
        &self.signals
    }
}

impl TreeSource for Outline {
    fn root(&self) -> Option<usize> {
        self.nodes.read().iter().position(|node| node.0.is_none())
    }

    fn children(&self, row: usize) -> Vec<usize> {
        let nodes = self.nodes.read();
        (0..nodes.len())
            .filter(|&child| nodes[child].0 == Some(row))
            .collect()
    }

    fn is_ancestor(&self, candidate: usize, of: usize) -> bool {
        let nodes = self.nodes.read();
        let mut current = nodes.get(of).and_then(|node| node.0);
        while let Some(row) = current {
            if row == candidate {
                return true;
            }
            current = nodes.get(row).and_then(|node| node.0);
        }
        false
    }

    fn tree_signals(&self) -> &TreeSourceSignals {
        &self.tree_signals
    }
}
