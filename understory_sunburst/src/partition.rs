// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radial partition: assigns angular spans and depth bands to a [`Hierarchy`].

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::hierarchy::Hierarchy;

/// Fills in `x0/x1/y0/y1` for every node of `hierarchy`.
///
/// The root spans `0..total_value`. Children are laid out contiguously, with no
/// padding, in layout order from their parent's `x0`; each child spans exactly
/// its value, so together they cover the parent's span. Depth bands are
/// unit-wide: `y0 = depth`, `y1 = depth + 1`.
///
/// This is a single pre-order pass: every parent precedes its children in the
/// node list, so a parent's span is final before its children are placed.
pub fn partition(hierarchy: &mut Hierarchy) {
    let nodes = hierarchy.nodes_mut();
    if nodes.is_empty() {
        return;
    }
    nodes[0].x0 = 0.0;
    nodes[0].x1 = nodes[0].value;

    for idx in 0..nodes.len() {
        let depth = f64::from(nodes[idx].depth);
        nodes[idx].y0 = depth;
        nodes[idx].y1 = depth + 1.0;

        let mut cursor = nodes[idx].x0;
        for c in 0..nodes[idx].children.len() {
            let child = nodes[idx].children[c].index();
            let width = nodes[child].value;
            nodes[child].x0 = cursor;
            cursor += width;
            nodes[child].x1 = cursor;
        }
        debug_assert!(
            nodes[idx].children.is_empty()
                || (cursor - nodes[idx].x1).abs() <= 1e-9 * nodes[idx].x1.abs().max(1.0),
            "children must cover their parent's span"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::{Item, branch, kids, leaf, size};
    use crate::hierarchy::{LayoutNode, NodeId};
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn laid_out(data: &Item) -> Hierarchy {
        let mut h = Hierarchy::build(data, kids, size, None);
        partition(&mut h);
        h
    }

    #[test]
    fn two_children_scenario() {
        let data = Item {
            size: Some(0.0),
            ..branch("A", vec![leaf("B", 10.0), leaf("C", 30.0)])
        };
        let h = laid_out(&data);
        let span = |i: u32| {
            let n = h.node(NodeId(i)).unwrap();
            (n.x0, n.x1)
        };
        assert_eq!(span(0), (0.0, 40.0));
        assert_eq!(span(1), (0.0, 10.0));
        assert_eq!(span(2), (10.0, 40.0));
    }

    #[test]
    fn depth_bands_are_unit_wide() {
        let data = branch("r", vec![branch("a", vec![leaf("b", 1.0)]), leaf("c", 1.0)]);
        let h = laid_out(&data);
        let bands: Vec<(f64, f64)> = h.nodes().iter().map(|n| (n.y0, n.y1)).collect();
        assert_eq!(bands, [(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (1.0, 2.0)]);
    }

    #[test]
    fn zero_valued_nodes_have_zero_width() {
        let data = branch("r", vec![leaf("a", 2.0), leaf("zero", 0.0), leaf("b", 2.0)]);
        let h = laid_out(&data);
        let zero = h.node(NodeId(2)).unwrap();
        assert_eq!(zero.x0, zero.x1);
        assert_eq!(zero.x0, 2.0);
        assert_eq!(h.node(NodeId(3)).unwrap().x0, 2.0);
    }

    #[test]
    fn sized_parent_is_covered_by_children() {
        let mut data = branch("r", vec![leaf("a", 1.0), leaf("b", 1.0)]);
        data.size = Some(3.0);
        let h = laid_out(&data);
        let root = h.root().unwrap();
        assert_eq!((root.x0, root.x1), (0.0, 2.0));
        assert_eq!(h.node(NodeId(2)).unwrap().x1, root.x1);
    }

    #[test]
    fn empty_hierarchy_is_noop() {
        let mut h = Hierarchy::default();
        partition(&mut h);
        assert!(h.is_empty());
    }

    fn arb_tree() -> impl Strategy<Value = Item> {
        let leaves = (0.0..100.0_f64).prop_map(|v| leaf("leaf", v));
        leaves.prop_recursive(4, 64, 6, |inner| {
            let own = prop::option::of(-10.0..100.0_f64);
            (prop::collection::vec(inner, 1..6), own).prop_map(|(children, own)| Item {
                size: own,
                ..branch("node", children)
            })
        })
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    proptest! {
        #[test]
        fn children_partition_parent(data in arb_tree()) {
            let h = laid_out(&data);
            for n in h.nodes().iter().filter(|n| !n.is_leaf()) {
                let kids: Vec<&LayoutNode> =
                    n.children.iter().map(|&c| h.node(c).unwrap()).collect();
                prop_assert!(close(kids[0].x0, n.x0));
                prop_assert!(close(kids[kids.len() - 1].x1, n.x1));
                for pair in kids.windows(2) {
                    prop_assert!(close(pair[0].x1, pair[1].x0));
                }
                let sum: f64 = kids.iter().map(|k| k.x1 - k.x0).sum();
                prop_assert!(close(sum, n.x1 - n.x0));
            }
        }

        #[test]
        fn bands_match_depth(data in arb_tree()) {
            let h = laid_out(&data);
            for n in h.nodes() {
                prop_assert_eq!(n.y1 - n.y0, 1.0);
                prop_assert_eq!(n.y0, f64::from(n.depth));
                prop_assert_eq!(n.depth, h.path_to(n.id).len() as u32 - 1);
            }
        }

        #[test]
        fn layout_is_deterministic(data in arb_tree()) {
            let a = laid_out(&data);
            let b = laid_out(&data);
            prop_assert_eq!(a.nodes(), b.nodes());
        }
    }
}
