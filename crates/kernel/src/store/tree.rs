//! Nested-set tree index.
//!
//! Backs both the category hierarchy and comment threads. Each node carries
//! materialized bounds (tree, lft, rgt, depth), so ancestor/descendant
//! membership is an interval test and traversals never walk parent chains.
//! Siblings are ordered by an order key at insertion time (insertion-sorted:
//! a later key change does not re-sort existing nodes). Multiple roots form
//! a forest; tree ids increase monotonically with root creation.
//!
//! Every mutating operation validates before touching any bounds, so a
//! returned error means the index is unchanged.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct NodeMeta<K> {
    parent: Option<Uuid>,
    tree: u64,
    lft: i64,
    rgt: i64,
    depth: i64,
    key: K,
}

/// Ordered forest with nested-set bounds.
#[derive(Debug, Clone)]
pub(crate) struct TreeIndex<K> {
    nodes: HashMap<Uuid, NodeMeta<K>>,
    /// Root ids, insertion-sorted by order key.
    roots: Vec<Uuid>,
    next_tree: u64,
}

impl<K: Ord + Clone> TreeIndex<K> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            next_tree: 1,
        }
    }

    /// Root ids in forest order.
    pub(crate) fn roots(&self) -> &[Uuid] {
        &self.roots
    }

    /// `(tree, lft)` sort key; orders the whole forest in traversal order.
    pub(crate) fn position(&self, id: Uuid) -> Option<(u64, i64)> {
        self.nodes.get(&id).map(|n| (n.tree, n.lft))
    }

    /// Nesting depth (0 for roots).
    pub(crate) fn depth(&self, id: Uuid) -> Option<i64> {
        self.nodes.get(&id).map(|n| n.depth)
    }

    /// Whether `id` falls within `ancestor`'s bounds. Inclusive: a node is
    /// considered a descendant of itself.
    pub(crate) fn is_descendant_of(&self, id: Uuid, ancestor: Uuid) -> bool {
        match (self.nodes.get(&id), self.nodes.get(&ancestor)) {
            (Some(node), Some(anc)) => {
                node.tree == anc.tree && anc.lft <= node.lft && node.rgt <= anc.rgt
            }
            _ => false,
        }
    }

    /// Insert a new node under `parent` (or as a new root), positioned among
    /// siblings by `key` after all existing siblings with keys <= `key`.
    pub(crate) fn insert(&mut self, id: Uuid, parent: Option<Uuid>, key: K) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(Error::InvalidParent("node is already indexed"));
        }

        let Some(parent_id) = parent else {
            let tree = self.next_tree;
            self.next_tree += 1;
            let pos = self.root_position(&key);
            self.roots.insert(pos, id);
            self.nodes.insert(
                id,
                NodeMeta {
                    parent: None,
                    tree,
                    lft: 1,
                    rgt: 2,
                    depth: 0,
                    key,
                },
            );
            return Ok(());
        };

        if parent_id == id {
            return Err(Error::InvalidParent("node cannot be its own parent"));
        }
        let (tree, depth) = match self.nodes.get(&parent_id) {
            Some(p) => (p.tree, p.depth + 1),
            None => return Err(Error::NotFound("parent node")),
        };

        let target = self.child_gap(parent_id, &key);
        self.open_gap(tree, target, 2, &HashSet::new());
        self.nodes.insert(
            id,
            NodeMeta {
                parent: Some(parent_id),
                tree,
                lft: target,
                rgt: target + 1,
                depth,
                key,
            },
        );
        Ok(())
    }

    /// Move a subtree under a new parent (or out as a new root), keeping the
    /// subtree's internal structure intact.
    pub(crate) fn reparent(&mut self, id: Uuid, new_parent: Option<Uuid>) -> Result<()> {
        let Some(node) = self.nodes.get(&id) else {
            return Err(Error::NotFound("node"));
        };
        let old_parent = node.parent;
        let (old_tree, old_lft, old_rgt, old_depth) = (node.tree, node.lft, node.rgt, node.depth);
        let key = node.key.clone();

        if let Some(np) = new_parent {
            if np == id {
                return Err(Error::InvalidParent("node cannot be its own parent"));
            }
            if !self.nodes.contains_key(&np) {
                return Err(Error::NotFound("parent node"));
            }
            if self.is_descendant_of(np, id) {
                return Err(Error::InvalidParent("new parent is a descendant of the node"));
            }
        } else if old_parent.is_none() {
            // Already a root.
            return Ok(());
        }

        let subtree = self.descendants(id, true);
        let sub_set: HashSet<Uuid> = subtree.iter().copied().collect();
        let width = old_rgt - old_lft + 1;

        // Rebase the subtree to zero and detach it, so the gap arithmetic
        // below cannot touch it even when source and destination share a
        // tree.
        for sid in &subtree {
            if let Some(n) = self.nodes.get_mut(sid) {
                n.lft -= old_lft;
                n.rgt -= old_lft;
                n.depth -= old_depth;
            }
        }
        if let Some(n) = self.nodes.get_mut(&id) {
            n.parent = None;
        }
        self.close_gap(old_tree, old_rgt, width, &sub_set);
        if old_parent.is_none() {
            self.roots.retain(|r| *r != id);
        }

        match new_parent {
            None => {
                let tree = self.next_tree;
                self.next_tree += 1;
                let pos = self.root_position(&key);
                self.roots.insert(pos, id);
                for sid in &subtree {
                    if let Some(n) = self.nodes.get_mut(sid) {
                        n.tree = tree;
                        n.lft += 1;
                        n.rgt += 1;
                    }
                }
            }
            Some(np) => {
                let (dest_tree, dest_depth) = match self.nodes.get(&np) {
                    Some(p) => (p.tree, p.depth),
                    None => return Err(Error::NotFound("parent node")),
                };
                let target = self.child_gap(np, &key);
                self.open_gap(dest_tree, target, width, &sub_set);
                for sid in &subtree {
                    if let Some(n) = self.nodes.get_mut(sid) {
                        n.tree = dest_tree;
                        n.lft += target;
                        n.rgt += target;
                        n.depth += dest_depth + 1;
                    }
                }
                if let Some(n) = self.nodes.get_mut(&id) {
                    n.parent = Some(np);
                }
            }
        }
        Ok(())
    }

    /// Remove a node and its whole subtree, closing the gap it leaves.
    /// Returns the removed ids in pre-order; empty if the node is unknown.
    pub(crate) fn remove(&mut self, id: Uuid) -> Vec<Uuid> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let (tree, rgt) = (node.tree, node.rgt);
        let width = node.rgt - node.lft + 1;

        let removed = self.descendants(id, true);
        for rid in &removed {
            self.nodes.remove(rid);
        }
        self.roots.retain(|r| *r != id);
        self.close_gap(tree, rgt, width, &HashSet::new());
        removed
    }

    /// Nodes within `id`'s bounds, in pre-order. Empty if `id` is unknown.
    pub(crate) fn descendants(&self, id: Uuid, include_self: bool) -> Vec<Uuid> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut found: Vec<(i64, Uuid)> = self
            .nodes
            .iter()
            .filter(|(nid, n)| {
                n.tree == node.tree
                    && n.lft >= node.lft
                    && n.rgt <= node.rgt
                    && (include_self || **nid != id)
            })
            .map(|(nid, n)| (n.lft, *nid))
            .collect();
        found.sort_unstable_by_key(|&(lft, _)| lft);
        found.into_iter().map(|(_, nid)| nid).collect()
    }

    /// Root-to-node path. Empty if `id` is unknown.
    pub(crate) fn ancestors(&self, id: Uuid, include_self: bool) -> Vec<Uuid> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut found: Vec<(i64, Uuid)> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.tree == node.tree && n.lft < node.lft && n.rgt > node.rgt)
            .map(|(nid, n)| (n.lft, *nid))
            .collect();
        found.sort_unstable_by_key(|&(lft, _)| lft);
        let mut path: Vec<Uuid> = found.into_iter().map(|(_, nid)| nid).collect();
        if include_self {
            path.push(id);
        }
        path
    }

    /// Update a node's order key without repositioning it. Only future
    /// sibling insertions see the new key.
    pub(crate) fn set_key(&mut self, id: Uuid, key: K) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.key = key;
        }
    }

    /// Insertion point among `parent`'s children: the lft of the first child
    /// whose key exceeds `key`, or the parent's rgt if none does. Equal keys
    /// therefore keep insertion order.
    fn child_gap(&self, parent_id: Uuid, key: &K) -> i64 {
        let mut children: Vec<(i64, &K)> = self
            .nodes
            .values()
            .filter(|n| n.parent == Some(parent_id))
            .map(|n| (n.lft, &n.key))
            .collect();
        children.sort_unstable_by_key(|&(lft, _)| lft);
        for (lft, child_key) in children {
            if *child_key > *key {
                return lft;
            }
        }
        self.nodes.get(&parent_id).map_or(1, |p| p.rgt)
    }

    /// Position among roots, after all roots with keys <= `key`.
    fn root_position(&self, key: &K) -> usize {
        self.roots
            .iter()
            .position(|r| self.nodes.get(r).is_some_and(|n| n.key > *key))
            .unwrap_or(self.roots.len())
    }

    /// Shift bounds at or after `at` right by `width` within `tree`,
    /// skipping `exclude`.
    fn open_gap(&mut self, tree: u64, at: i64, width: i64, exclude: &HashSet<Uuid>) {
        for (nid, n) in self.nodes.iter_mut() {
            if n.tree != tree || exclude.contains(nid) {
                continue;
            }
            if n.lft >= at {
                n.lft += width;
            }
            if n.rgt >= at {
                n.rgt += width;
            }
        }
    }

    /// Shift bounds strictly after `after` left by `width` within `tree`,
    /// skipping `exclude`.
    fn close_gap(&mut self, tree: u64, after: i64, width: i64, exclude: &HashSet<Uuid>) {
        for (nid, n) in self.nodes.iter_mut() {
            if n.tree != tree || exclude.contains(nid) {
                continue;
            }
            if n.lft > after {
                n.lft -= width;
            }
            if n.rgt > after {
                n.rgt -= width;
            }
        }
    }
}
