//! Sorted view over a hierarchical source.
//!
//! [`TreeSorted`] mirrors the hierarchy of a [`TreeSource`] while ordering
//! every node's children by the multi-key comparator of a [`SortInfo`].
//! Parent/child edges follow the source; sibling order is owned by the view.
//!
//! New nodes are placed by a linear scan over their siblings. When many
//! arrive in a row (more than [`TreeSortedConfig::insert_max`] since the view
//! was last queried), placement is skipped: the node is appended and its
//! parent is re-sorted once, on the next query. Observable ordering is the
//! same either way.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use table_sort::model::{SortColumn, SortInfo, TableHeader, TreeSorted};
//!
//! let sort_info = Arc::new(SortInfo::from_columns(vec![SortColumn::ascending(0)]));
//! let tree = Arc::new(TreeSorted::new(source, sort_info, Arc::new(TableHeader::new())));
//! tree.add_all();
//! tree.attach();
//!
//! for child in tree.children(tree.root().unwrap()) {
//!     println!("{child}");
//! }
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use table_sort_core::logging::targets;
use table_sort_core::{ConnectionId, PerfSpan, ReentrancyGuard, Result, Signal, SortError};

use super::compare::MultiKeyCompare;
use super::header::TableHeader;
use super::sort_info::SortInfo;
use super::sorter::Sorter;
use super::traits::{TableSource, TreeSource};

/// Tuning for [`TreeSorted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSortedConfig {
    /// Incremental placements allowed between two queries before new and
    /// repositioned nodes are batched into a deferred parent re-sort.
    pub insert_max: usize,
}

impl Default for TreeSortedConfig {
    fn default() -> Self {
        Self { insert_max: 4 }
    }
}

impl TreeSortedConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`insert_max`](Self::insert_max).
    pub fn with_insert_max(mut self, insert_max: usize) -> Self {
        self.insert_max = insert_max;
        self
    }
}

new_key_type! {
    struct NodeId;
}

struct Node {
    row: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Pre-order of the tree and its inverse.
#[derive(Clone)]
struct Order {
    sorted: Arc<Vec<usize>>,
    backsorted: Arc<Vec<usize>>,
}

/// Marks a model row that is not part of the tree in the backsorted array.
const ABSENT: usize = usize::MAX;

#[derive(Default)]
struct TreeState {
    nodes: SlotMap<NodeId, Node>,
    by_row: HashMap<usize, NodeId>,
    root: Option<NodeId>,
    /// Nodes whose children must be re-sorted before the next query.
    pending: Vec<NodeId>,
    order: Option<Order>,
}

impl TreeState {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn row(&self, id: NodeId) -> Option<usize> {
        self.nodes.get(id).map(|node| node.row)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| &node.children)
    }

    fn child_rows(&self, id: NodeId) -> Vec<usize> {
        self.children(id)
            .iter()
            .filter_map(|&child| self.row(child))
            .collect()
    }

    fn insert_node(&mut self, row: usize, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.insert(Node {
            row,
            parent,
            children: Vec::new(),
        });
        self.by_row.insert(row, id);
        self.order = None;
        id
    }

    fn mark_pending(&mut self, id: NodeId) {
        if !self.pending.contains(&id) {
            self.pending.push(id);
        }
        self.order = None;
    }

    /// First sibling slot under `parent` that `row` sorts before.
    fn insert_position<S>(&self, parent: NodeId, row: usize, keys: &MultiKeyCompare, source: &S) -> usize
    where
        S: TableSource + ?Sized,
    {
        let siblings = self.children(parent);
        siblings
            .iter()
            .position(|&sibling| {
                self.row(sibling)
                    .is_some_and(|other| keys.compare_total(source, row, other) == Ordering::Less)
            })
            .unwrap_or(siblings.len())
    }

    /// Sorts the children of `id`, returning `true` if their order changed.
    fn sort_children<S>(&mut self, id: NodeId, keys: &MultiKeyCompare, source: &S) -> bool
    where
        S: TableSource + ?Sized,
    {
        let mut keyed: Vec<(usize, NodeId)> = self
            .children(id)
            .iter()
            .filter_map(|&child| Some((self.row(child)?, child)))
            .collect();
        if keyed.len() < 2 {
            return false;
        }

        keyed.sort_unstable_by(|a, b| keys.compare_total(source, a.0, b.0));
        let sorted: Vec<NodeId> = keyed.into_iter().map(|(_, child)| child).collect();
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if node.children == sorted {
            return false;
        }
        node.children = sorted;
        self.order = None;
        true
    }

    /// Fetches everything below `id` from the source, depth first, sorting
    /// each child list. Rows already in the tree are skipped.
    fn fill_children<S>(&mut self, id: NodeId, keys: &MultiKeyCompare, source: &S) -> usize
    where
        S: TreeSource + ?Sized,
    {
        let Some(row) = self.row(id) else {
            return 0;
        };

        let mut added = 0;
        let mut stack = vec![(id, row)];
        while let Some((id, row)) = stack.pop() {
            let mut children = source.children(row);
            children.retain(|child| !self.by_row.contains_key(child));
            children.sort_unstable_by(|&a, &b| keys.compare_total(source, a, b));
            children.dedup();

            for child in children {
                let child_id = self.insert_node(child, Some(id));
                if let Some(node) = self.nodes.get_mut(id) {
                    node.children.push(child_id);
                }
                stack.push((child_id, child));
                added += 1;
            }
        }
        added
    }

    /// Moves `id` to its sorted slot among its siblings.
    ///
    /// Returns the parent row if the node moved.
    fn place<S>(&mut self, id: NodeId, keys: &MultiKeyCompare, source: &S) -> Option<usize>
    where
        S: TableSource + ?Sized,
    {
        let row = self.row(id)?;
        let parent = self.parent(id)?;
        let old_index = self.children(parent).iter().position(|&child| child == id)?;

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.remove(old_index);
        }
        let new_index = self.insert_position(parent, row, keys, source);
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.insert(new_index, id);
        }

        if new_index == old_index {
            return None;
        }
        self.order = None;
        self.row(parent)
    }

    /// Removes `id` and everything below it, returning how many nodes went.
    fn remove_subtree(&mut self, id: NodeId) -> usize {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.retain(|&child| child != id);
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                self.by_row.remove(&node.row);
                stack.extend(node.children);
                removed += 1;
            }
        }

        let nodes = &self.nodes;
        self.pending.retain(|&id| nodes.contains_key(id));
        self.order = None;
        removed
    }

    fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    fn compute_order(&self, source_rows: usize) -> Order {
        let mut sorted = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            sorted.push(node.row);
            stack.extend(node.children.iter().rev());
        }

        let len = sorted
            .iter()
            .map(|&row| row + 1)
            .max()
            .unwrap_or(0)
            .max(source_rows);
        let mut backsorted = vec![ABSENT; len];
        for (position, &row) in sorted.iter().enumerate() {
            backsorted[row] = position;
        }

        Order {
            sorted: Arc::new(sorted),
            backsorted: Arc::new(backsorted),
        }
    }
}

struct Connections {
    node_inserted: ConnectionId,
    node_removed: ConnectionId,
    node_data_changed: ConnectionId,
    node_col_changed: ConnectionId,
    node_changed: ConnectionId,
    sort_info_changed: ConnectionId,
}

/// A tree of source rows whose siblings are kept in sorted order.
///
/// # Signals
///
/// - `node_inserted`: a row was added to the tree
/// - `node_removed`: a row and its subtree were removed
/// - `node_changed`: the children below a row were rebuilt or reordered
/// - `node_resorted`: the children below a row were reordered
pub struct TreeSorted {
    source: Arc<dyn TreeSource>,
    sort_info: Arc<SortInfo>,
    header: Arc<TableHeader>,
    config: TreeSortedConfig,
    state: RwLock<TreeState>,
    /// Incremental placements since the last query.
    insert_count: AtomicUsize,
    resorting: ReentrancyGuard,
    connections: Mutex<Option<Connections>>,

    /// Emitted after a node was added. Args: the row
    pub node_inserted: Signal<usize>,

    /// Emitted after a node and its subtree were removed. Args: the row
    pub node_removed: Signal<usize>,

    /// Emitted after the structure or order below a node changed.
    /// Args: the row
    pub node_changed: Signal<usize>,

    /// Emitted after the children of a node were reordered. Args: the row
    pub node_resorted: Signal<usize>,
}

impl TreeSorted {
    /// Creates an empty view with the default configuration.
    ///
    /// Call [`add_all`](Self::add_all) to populate it from the source.
    pub fn new(source: Arc<dyn TreeSource>, sort_info: Arc<SortInfo>, header: Arc<TableHeader>) -> Self {
        Self::with_config(source, sort_info, header, TreeSortedConfig::default())
    }

    /// Creates an empty view with an explicit configuration.
    pub fn with_config(
        source: Arc<dyn TreeSource>,
        sort_info: Arc<SortInfo>,
        header: Arc<TableHeader>,
        config: TreeSortedConfig,
    ) -> Self {
        Self {
            source,
            sort_info,
            header,
            config,
            state: RwLock::new(TreeState::default()),
            insert_count: AtomicUsize::new(0),
            resorting: ReentrancyGuard::new(),
            connections: Mutex::new(None),
            node_inserted: Signal::new(),
            node_removed: Signal::new(),
            node_changed: Signal::new(),
            node_resorted: Signal::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TreeSortedConfig {
        &self.config
    }

    /// Returns the sort keys this view follows.
    pub fn sort_info(&self) -> &Arc<SortInfo> {
        &self.sort_info
    }

    fn keys(&self) -> MultiKeyCompare {
        MultiKeyCompare::new(&self.sort_info, &self.header)
    }

    // =========================================================================
    // Source Tracking
    // =========================================================================

    /// Subscribes to the source's hierarchy signals and to sort key changes.
    ///
    /// | signal | action |
    /// |---|---|
    /// | `node_inserted` | [`add`](Self::add) |
    /// | `node_removed` | [`remove`](Self::remove) |
    /// | `node_data_changed` | [`reposition`](Self::reposition) |
    /// | `node_col_changed` | [`column_changed`](Self::column_changed) |
    /// | `node_changed` | [`rebuild_node`](Self::rebuild_node) |
    /// | `sort_info_changed` | [`resort`](Self::resort) |
    ///
    /// Attaching twice is a no-op.
    pub fn attach(self: &Arc<Self>) {
        let mut connections = self.connections.lock();
        if connections.is_some() {
            return;
        }

        let signals = self.source.tree_signals();

        let weak = Arc::downgrade(self);
        let node_inserted = signals.node_inserted.connect(move |&row| {
            if let Some(tree) = weak.upgrade() {
                tree.add(row);
            }
        });

        let weak = Arc::downgrade(self);
        let node_removed = signals.node_removed.connect(move |&row| {
            if let Some(tree) = weak.upgrade() {
                tree.remove(row);
            }
        });

        let weak = Arc::downgrade(self);
        let node_data_changed = signals.node_data_changed.connect(move |&row| {
            if let Some(tree) = weak.upgrade() {
                tree.reposition(row);
            }
        });

        let weak = Arc::downgrade(self);
        let node_col_changed = signals.node_col_changed.connect(move |&(row, column)| {
            if let Some(tree) = weak.upgrade() {
                tree.column_changed(row, column);
            }
        });

        let weak = Arc::downgrade(self);
        let node_changed = signals.node_changed.connect(move |&row| {
            if let Some(tree) = weak.upgrade() {
                tree.rebuild_node(row);
            }
        });

        let weak = Arc::downgrade(self);
        let sort_info_changed = self.sort_info.sort_info_changed.connect(move |_| {
            if let Some(tree) = weak.upgrade() {
                tree.resort();
            }
        });

        *connections = Some(Connections {
            node_inserted,
            node_removed,
            node_data_changed,
            node_col_changed,
            node_changed,
            sort_info_changed,
        });
        tracing::debug!(target: targets::TREE, "sorted tree attached");
    }

    /// Disconnects from the source and sort info.
    pub fn detach(&self) {
        let Some(connections) = self.connections.lock().take() else {
            return;
        };

        let signals = self.source.tree_signals();
        signals.node_inserted.disconnect(connections.node_inserted);
        signals.node_removed.disconnect(connections.node_removed);
        signals.node_data_changed.disconnect(connections.node_data_changed);
        signals.node_col_changed.disconnect(connections.node_col_changed);
        signals.node_changed.disconnect(connections.node_changed);
        self.sort_info
            .sort_info_changed
            .disconnect(connections.sort_info_changed);
    }

    // =========================================================================
    // Tree Edits
    // =========================================================================

    /// Adds `row` at its sorted position.
    ///
    /// The view walks down from the root, descending into any sibling that is
    /// an ancestor of `row`. At the level where it stops, siblings that are
    /// descendants of `row` move under the new node. The root is created from
    /// the source on first use.
    ///
    /// Returns `false` if `row` is already present or the source has no root.
    pub fn add(&self, row: usize) -> bool {
        let keys = self.keys();
        let mut inserted = Vec::with_capacity(2);

        {
            let mut state = self.state.write();
            if state.by_row.contains_key(&row) {
                tracing::trace!(target: targets::TREE, row, "row already in tree");
                return false;
            }

            let root = match state.root {
                Some(root) => root,
                None => {
                    let Some(root_row) = self.source.root() else {
                        tracing::debug!(target: targets::TREE, row, "source has no root");
                        return false;
                    };
                    let root = state.insert_node(root_row, None);
                    state.root = Some(root);
                    inserted.push(root_row);
                    root
                }
            };

            if !state.by_row.contains_key(&row) {
                self.insert_below(&mut state, root, row, &keys);
                inserted.push(row);
            }
        }

        for row in inserted {
            self.node_inserted.emit(row);
        }
        true
    }

    fn insert_below(&self, state: &mut TreeState, root: NodeId, row: usize, keys: &MultiKeyCompare) {
        let source = &*self.source;

        let mut parent = root;
        while let Some(next) = state.children(parent).iter().copied().find(|&sibling| {
            state
                .row(sibling)
                .is_some_and(|other| source.is_ancestor(other, row))
        }) {
            parent = next;
        }

        let (adopted, remaining): (Vec<NodeId>, Vec<NodeId>) =
            state.children(parent).iter().partition(|&&sibling| {
                state
                    .row(sibling)
                    .is_some_and(|other| source.is_ancestor(row, other))
            });

        let id = state.insert_node(row, Some(parent));
        for &child in &adopted {
            if let Some(node) = state.nodes.get_mut(child) {
                node.parent = Some(id);
            }
        }
        if !adopted.is_empty() {
            tracing::trace!(target: targets::TREE, row, adopted = adopted.len(), "adopted siblings");
            // Siblings of a pending parent may be out of order.
            if state.pending.contains(&parent) {
                state.mark_pending(id);
            }
        }
        if let Some(node) = state.nodes.get_mut(id) {
            node.children = adopted;
        }
        if let Some(node) = state.nodes.get_mut(parent) {
            node.children = remaining;
        }

        let position = if self.throttled(state, parent) {
            state.children(parent).len()
        } else {
            state.insert_position(parent, row, keys, source)
        };
        if let Some(node) = state.nodes.get_mut(parent) {
            node.children.insert(position, id);
        }
    }

    /// Counts one incremental placement under `parent`.
    ///
    /// Returns `true` (and defers a re-sort of `parent`) when placement
    /// should be skipped.
    fn throttled(&self, state: &mut TreeState, parent: NodeId) -> bool {
        let count = self.insert_count.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        if count > self.config.insert_max || state.pending.contains(&parent) {
            state.mark_pending(parent);
            return true;
        }
        false
    }

    /// Discards the tree and rebuilds it from the source.
    ///
    /// Every child list is sorted as it is fetched. Emits one `node_changed`
    /// for the root.
    pub fn add_all(&self) {
        let keys = self.keys();
        let source = &*self.source;
        let _span = PerfSpan::new("tree.add_all");

        let root_row = {
            let mut state = self.state.write();
            state.clear();
            self.insert_count.store(0, AtomicOrdering::Relaxed);

            let Some(root_row) = source.root() else {
                tracing::debug!(target: targets::TREE, "source has no root, tree left empty");
                return;
            };

            let root = state.insert_node(root_row, None);
            state.root = Some(root);
            state.fill_children(root, &keys, source);

            tracing::debug!(target: targets::TREE, nodes = state.nodes.len(), "tree rebuilt");
            root_row
        };

        self.node_changed.emit(root_row);
    }

    /// Re-sorts the children of every node in place.
    ///
    /// Nodes and edges are kept; only sibling order changes. Emits
    /// `node_changed` then `node_resorted` for the root. A call made while
    /// another re-sort is running (from one of those listeners, say) does
    /// nothing and returns `false`.
    pub fn resort(&self) -> bool {
        let Some(_token) = self.resorting.try_enter() else {
            tracing::debug!(target: targets::TREE, "nested resort ignored");
            return false;
        };

        let keys = self.keys();
        let root_row = {
            let mut state = self.state.write();
            let _span = PerfSpan::with_rows("tree.resort", state.nodes.len());

            let ids: Vec<NodeId> = state.nodes.keys().collect();
            for id in ids {
                state.sort_children(id, &keys, &*self.source);
            }
            state.pending.clear();
            state.order = None;
            state.root.and_then(|root| state.row(root))
        };
        self.insert_count.store(0, AtomicOrdering::Relaxed);

        if let Some(root) = root_row {
            self.node_changed.emit(root);
            self.node_resorted.emit(root);
        }
        true
    }

    /// Removes `row` and its subtree.
    ///
    /// Returns `false` if `row` is not in the tree.
    pub fn remove(&self, row: usize) -> bool {
        let removed = {
            let mut state = self.state.write();
            let Some(&id) = state.by_row.get(&row) else {
                return false;
            };
            state.remove_subtree(id)
        };

        tracing::trace!(target: targets::TREE, row, removed, "removed subtree");
        self.node_removed.emit(row);
        true
    }

    /// Moves `row` to its sorted slot among its siblings after its values
    /// changed.
    ///
    /// Returns `true` if the node moved, in which case `node_changed` and
    /// `node_resorted` are emitted for the parent.
    ///
    /// Past [`TreeSortedConfig::insert_max`] placements since the last query
    /// the move is deferred: this returns `false` and the parent is re-sorted
    /// on the next query, which emits the same two signals for it.
    pub fn reposition(&self, row: usize) -> bool {
        let keys = self.keys();

        let moved_under = {
            let mut state = self.state.write();
            let Some(&id) = state.by_row.get(&row) else {
                return false;
            };
            let Some(parent) = state.parent(id) else {
                return false;
            };
            if self.throttled(&mut state, parent) {
                tracing::trace!(target: targets::TREE, row, "reposition deferred");
                return false;
            }
            state.place(id, &keys, &*self.source)
        };

        match moved_under {
            Some(parent_row) => {
                self.node_changed.emit(parent_row);
                self.node_resorted.emit(parent_row);
                true
            }
            None => false,
        }
    }

    /// Repositions `row` after one of its cells changed, but only when
    /// `column` is one of the sort keys.
    ///
    /// Returns `true` if the node moved.
    pub fn column_changed(&self, row: usize, column: usize) -> bool {
        if !self.sort_info.affects_sort(column) {
            tracing::trace!(target: targets::TREE, row, column, "column not sorted on");
            return false;
        }
        self.reposition(row)
    }

    /// Regenerates everything below `row` after the source's structure under
    /// it changed.
    ///
    /// The children of `row` are dropped and fetched again from the source,
    /// sorted, and `row` itself is moved to its sorted slot among its
    /// siblings. Other subtrees keep their nodes. A change at the root
    /// rebuilds the whole tree with [`add_all`](Self::add_all).
    ///
    /// Emits `node_changed` for `row`, then `node_changed` and
    /// `node_resorted` for its parent if it moved. Returns `false` if `row`
    /// is not in the tree.
    pub fn rebuild_node(&self, row: usize) -> bool {
        if self.source.root() == Some(row) || self.root() == Some(row) {
            self.add_all();
            return true;
        }

        let keys = self.keys();
        let moved_under = {
            let mut state = self.state.write();
            let Some(&id) = state.by_row.get(&row) else {
                tracing::trace!(target: targets::TREE, row, "changed row not in tree");
                return false;
            };

            let stale: Vec<NodeId> = state.children(id).to_vec();
            let removed: usize = stale
                .into_iter()
                .map(|child| state.remove_subtree(child))
                .sum();
            let added = state.fill_children(id, &keys, &*self.source);
            state.pending.retain(|&pending| pending != id);
            state.order = None;
            tracing::trace!(target: targets::TREE, row, removed, added, "subtree regenerated");

            state.place(id, &keys, &*self.source)
        };

        self.node_changed.emit(row);
        if let Some(parent_row) = moved_under {
            self.node_changed.emit(parent_row);
            self.node_resorted.emit(parent_row);
        }
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Applies deferred re-sorts and resets the placement counter.
    ///
    /// Emits `node_changed` and `node_resorted` for every node whose children
    /// actually changed order.
    fn flush(&self) {
        self.insert_count.store(0, AtomicOrdering::Relaxed);
        if self.state.read().pending.is_empty() {
            return;
        }

        let keys = self.keys();
        let mut resorted = Vec::new();
        {
            let mut state = self.state.write();
            let pending = std::mem::take(&mut state.pending);
            tracing::trace!(target: targets::TREE, nodes = pending.len(), "flushing deferred resorts");
            for id in pending {
                if state.sort_children(id, &keys, &*self.source) {
                    resorted.extend(state.row(id));
                }
            }
        }

        for row in resorted {
            self.node_changed.emit(row);
            self.node_resorted.emit(row);
        }
    }

    fn order(&self) -> Order {
        self.flush();
        if let Some(order) = self.state.read().order.clone() {
            return order;
        }

        let mut state = self.state.write();
        if let Some(order) = state.order.clone() {
            return order;
        }
        let order = state.compute_order(self.source.row_count());
        state.order = Some(order.clone());
        order
    }

    /// Returns the root row.
    pub fn root(&self) -> Option<usize> {
        let state = self.state.read();
        state.root.and_then(|root| state.row(root))
    }

    /// Returns the children of `row` in sorted order.
    ///
    /// Rows not in the tree have no children.
    pub fn children(&self, row: usize) -> Vec<usize> {
        self.flush();
        let state = self.state.read();
        state
            .by_row
            .get(&row)
            .map(|&id| state.child_rows(id))
            .unwrap_or_default()
    }

    /// Returns the parent of `row`.
    pub fn parent(&self, row: usize) -> Option<usize> {
        let state = self.state.read();
        let id = *state.by_row.get(&row)?;
        state.parent(id).and_then(|parent| state.row(parent))
    }

    /// Returns `true` if `row` is in the tree.
    pub fn contains(&self, row: usize) -> bool {
        self.state.read().by_row.contains_key(&row)
    }

    /// Returns the depth of `row`, the root being at depth 0.
    pub fn depth(&self, row: usize) -> Option<usize> {
        let state = self.state.read();
        state.by_row.get(&row).map(|&id| state.depth(id))
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TreeSorted {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Sorted order is the pre-order traversal of the tree, root first.
///
/// The model-to-sorted array holds `usize::MAX` for rows that are not in the
/// tree; [`model_to_sorted`](Sorter::model_to_sorted) reports them as
/// [`SortError::UnknownRow`].
impl Sorter for TreeSorted {
    fn model_to_sorted(&self, row: usize) -> Result<usize> {
        SortError::check_range(row, self.source.row_count())?;
        match self.order().backsorted.get(row) {
            Some(&position) if position != ABSENT => Ok(position),
            _ => Err(SortError::UnknownRow(row)),
        }
    }

    fn sorted_to_model(&self, position: usize) -> Result<usize> {
        let order = self.order();
        SortError::check_range(position, order.sorted.len())?;
        order
            .sorted
            .get(position)
            .copied()
            .ok_or(SortError::OutOfRange {
                index: position,
                count: order.sorted.len(),
            })
    }

    fn model_to_sorted_array(&self) -> Arc<Vec<usize>> {
        self.order().backsorted
    }

    fn sorted_to_model_array(&self) -> Arc<Vec<usize>> {
        self.order().sorted
    }

    fn needs_sorting(&self) -> bool {
        true
    }

    fn row_count(&self) -> usize {
        self.len()
    }
}
