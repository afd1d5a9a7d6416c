// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchy builder: turns borrowed host data into a flat, pre-order layout tree.
//!
//! The host tree is never copied. Each [`LayoutNode`] records the index of its
//! host node among its parent's children (its `slot`), so the host node can be
//! resolved again from a [`NodeId`] by walking down from the root. The reverse
//! direction (host node to [`NodeId`]) goes through a side table keyed by
//! [`RawKey`], the address of the borrowed host node.

use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Identifier of a node in a [`Hierarchy`].
///
/// This is the node's pre-order index (the root is `0`). Identifiers are only
/// meaningful for the hierarchy that produced them; every rebuild reassigns
/// them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The root of every non-empty hierarchy.
    pub const ROOT: Self = Self(0);

    /// Returns the pre-order index of this node.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a host node, derived from its address.
///
/// Host data installed in a chart is boxed and not moved while installed, so
/// the address of a borrowed node is a stable identity for the lifetime of the
/// installed data. Keys taken from data that has since been replaced simply fail
/// to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawKey(usize);

impl RawKey {
    /// Returns the identity key of a borrowed host node.
    pub fn of<T>(node: &T) -> Self {
        Self(core::ptr::from_ref(node).addr())
    }
}

/// Sibling comparator applied before angular spans are assigned.
pub type SortFn = dyn Fn(&LayoutNode, &LayoutNode) -> Ordering;

/// A node of the layout tree.
///
/// `x0..x1` is the angular span in domain units (cumulative value, the root spans
/// `0..total_value`) and `y0..y1` is the depth band (`y0 == depth`). Both are
/// filled in by [`crate::partition::partition`]; freshly built nodes have empty
/// spans.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    /// Pre-order identifier.
    pub id: NodeId,
    /// Parent node, `None` for the root.
    pub parent: Option<NodeId>,
    /// Children in layout order (after sorting).
    pub children: SmallVec<[NodeId; 4]>,
    /// Distance from the root.
    pub depth: u32,
    /// Length of the longest downward path to a leaf.
    pub height: u32,
    /// Aggregated size of this subtree.
    pub value: f64,
    /// Index of the host node in its parent's host children (`0` for the root).
    pub slot: u32,
    /// Start of the angular span.
    pub x0: f64,
    /// End of the angular span.
    pub x1: f64,
    /// Inner edge of the depth band.
    pub y0: f64,
    /// Outer edge of the depth band.
    pub y1: f64,
}

impl LayoutNode {
    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The layout tree derived from host data.
///
/// ## Example
///
/// ```rust
/// use understory_sunburst::hierarchy::Hierarchy;
///
/// struct Item {
///     size: f64,
///     children: Vec<Item>,
/// }
///
/// let data = Item {
///     size: 0.0,
///     children: vec![
///         Item { size: 10.0, children: vec![] },
///         Item { size: 30.0, children: vec![] },
///     ],
/// };
///
/// let h = Hierarchy::build(&data, |n| &n.children[..], |n| Some(n.size), None);
/// assert_eq!(h.len(), 3);
/// assert_eq!(h.total_value(), 40.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    nodes: Vec<LayoutNode>,
    keys: Vec<RawKey>,
    by_key: HashMap<RawKey, NodeId>,
    max_depth: u32,
}

/// Build-time record, indexed in host pre-order.
struct Draft {
    key: RawKey,
    parent: Option<usize>,
    slot: u32,
    depth: u32,
    own: f64,
    children: SmallVec<[usize; 4]>,
}

/// Sanitizes a host size into a non-negative contribution.
///
/// Only leaves carry weight: an internal node's value is the sum of its
/// children's, whatever its own size says. Absent leaf sizes weigh `1`;
/// non-finite or non-positive sizes weigh nothing.
fn contribution(size: Option<f64>, is_leaf: bool) -> f64 {
    match size {
        _ if !is_leaf => 0.0,
        None => 1.0,
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(_) => 0.0,
    }
}

impl Hierarchy {
    /// Builds the layout tree for `root`.
    ///
    /// Sizes are aggregated bottom-up, each node's children are then stably sorted
    /// with `sort` (if any), and finally identifiers are assigned in pre-order of
    /// the sorted tree. The comparator sees provisional identifiers; compare on
    /// `value`, `depth`, `height` or `slot` instead.
    ///
    /// Angular and radial spans are left empty; run
    /// [`crate::partition::partition`] to fill them in.
    pub fn build<'a, T, C, S>(root: &'a T, children: C, size: S, sort: Option<&SortFn>) -> Self
    where
        C: Fn(&'a T) -> &'a [T],
        S: Fn(&T) -> Option<f64>,
    {
        // Host pre-order walk with an explicit stack; deep trees must not recurse.
        let mut drafts: Vec<Draft> = Vec::new();
        let mut stack: Vec<(&'a T, Option<usize>, u32, u32)> = alloc::vec![(root, None, 0, 0)];
        while let Some((node, parent, slot, depth)) = stack.pop() {
            let kids = children(node);
            let idx = drafts.len();
            drafts.push(Draft {
                key: RawKey::of(node),
                parent,
                slot,
                depth,
                own: contribution(size(node), kids.is_empty()),
                children: SmallVec::new(),
            });
            if let Some(p) = parent {
                drafts[p].children.push(idx);
            }
            for (i, kid) in kids.iter().enumerate().rev() {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Sibling slots use 32-bit indices by design."
                )]
                let slot = i as u32;
                stack.push((kid, Some(idx), slot, depth + 1));
            }
        }

        // Children always follow their parent in pre-order, so a reverse sweep
        // sees every child before its parent.
        let mut values: Vec<f64> = drafts.iter().map(|d| d.own).collect();
        let mut heights: Vec<u32> = alloc::vec![0; drafts.len()];
        for idx in (1..drafts.len()).rev() {
            if let Some(p) = drafts[idx].parent {
                values[p] += values[idx];
                heights[p] = heights[p].max(heights[idx] + 1);
            }
        }

        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let provisional: Vec<LayoutNode> = drafts
            .iter()
            .enumerate()
            .map(|(idx, d)| LayoutNode {
                id: NodeId(idx as u32),
                parent: d.parent.map(|p| NodeId(p as u32)),
                children: d.children.iter().map(|&c| NodeId(c as u32)).collect(),
                depth: d.depth,
                height: heights[idx],
                value: values[idx],
                slot: d.slot,
                x0: 0.0,
                x1: 0.0,
                y0: 0.0,
                y1: 0.0,
            })
            .collect();

        if let Some(cmp) = sort {
            for d in &mut drafts {
                // `sort_by` is stable: equal siblings keep insertion order.
                d.children
                    .sort_by(|&a, &b| cmp(&provisional[a], &provisional[b]));
            }
        }

        // Final pre-order over the sorted tree; `remap[draft] = final id`.
        let mut remap = alloc::vec![0_u32; drafts.len()];
        let mut order: Vec<usize> = Vec::with_capacity(drafts.len());
        let mut pending = alloc::vec![0_usize];
        while let Some(idx) = pending.pop() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let next = order.len() as u32;
            remap[idx] = next;
            order.push(idx);
            pending.extend(drafts[idx].children.iter().rev().copied());
        }

        let mut nodes = Vec::with_capacity(order.len());
        let mut keys = Vec::with_capacity(order.len());
        let mut by_key = HashMap::with_capacity(order.len());
        let mut max_depth = 0;
        for &idx in &order {
            let d = &drafts[idx];
            let p = &provisional[idx];
            let id = NodeId(remap[idx]);
            max_depth = max_depth.max(d.depth);
            keys.push(d.key);
            by_key.insert(d.key, id);
            nodes.push(LayoutNode {
                id,
                parent: d.parent.map(|p| NodeId(remap[p])),
                children: d.children.iter().map(|&c| NodeId(remap[c])).collect(),
                ..p.clone()
            });
        }

        log::debug!(
            "built sunburst hierarchy: {} nodes, max depth {max_depth}",
            nodes.len()
        );

        Self {
            nodes,
            keys,
            by_key,
            max_depth,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the hierarchy has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    /// Returns the node for `id`, if it belongs to this hierarchy.
    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id.index())
    }

    /// All nodes in pre-order (the `layoutData` flat list).
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [LayoutNode] {
        &mut self.nodes
    }

    /// Returns the parent of `id`.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Returns the children of `id` in layout order.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| &n.children[..]).unwrap_or(&[])
    }

    /// Iterates from `id` up to the root, both inclusive.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.node(id).map(|n| n.id);
        core::iter::successors(start, move |&cur| self.parent_of(cur))
    }

    /// Returns the path from the root down to `id`, both inclusive.
    ///
    /// Empty when `id` is not part of this hierarchy.
    pub fn path_to(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut path: SmallVec<[NodeId; 8]> = self.ancestors(id).collect();
        path.reverse();
        path
    }

    /// Looks up the node built from a host node.
    pub fn lookup<T>(&self, node: &T) -> Option<NodeId> {
        self.lookup_key(RawKey::of(node))
    }

    /// Looks up the node built from the host node with identity `key`.
    pub fn lookup_key(&self, key: RawKey) -> Option<NodeId> {
        self.by_key.get(&key).copied()
    }

    /// Identity of the host node behind `id`.
    pub fn key_of(&self, id: NodeId) -> Option<RawKey> {
        self.keys.get(id.index()).copied()
    }

    /// Resolves the host node behind `id` by walking down from `root`.
    ///
    /// `root` and `children` must be the data and accessor this hierarchy was
    /// built from.
    pub fn resolve<'a, T, C>(&self, root: &'a T, children: C, id: NodeId) -> Option<&'a T>
    where
        C: Fn(&'a T) -> &'a [T],
    {
        let path = self.path_to(id);
        let mut cur = root;
        for step in path.iter().skip(1) {
            let slot = self.node(*step)?.slot as usize;
            cur = children(cur).get(slot)?;
        }
        (!path.is_empty()).then_some(cur)
    }

    /// Aggregated value of the root (`0` when empty).
    pub fn total_value(&self) -> f64 {
        self.root().map_or(0.0, |r| r.value)
    }

    /// Depth of the deepest node.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Number of depth bands (`max_depth + 1`), the outer boundary of the tree.
    pub fn depth_extent(&self) -> f64 {
        f64::from(self.max_depth) + 1.0
    }
}
