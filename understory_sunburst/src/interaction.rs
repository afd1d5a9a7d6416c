// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input: wedge picking, click routing and the hover tooltip.
//!
//! Picking walks a [`Frame`] from the top of the paint order down, so the
//! wedge drawn last wins where wedges overlap. Exiting wedges are still drawn
//! while they fade out but never receive input.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Size};

use crate::hierarchy::{Hierarchy, NodeId};
use crate::scene::{Frame, Phase};

/// Vertical distance, in pixels, between the pointer and the tooltip's top edge.
pub const VERTICAL_OFFSET: f64 = 21.0;

/// Separator between breadcrumb labels.
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// What a click did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClickOutcome {
    /// No layout to interact with.
    Ignored,
    /// A wedge was hit and the click callback received it.
    Callback(NodeId),
    /// A wedge was hit and became the focus.
    Focused(NodeId),
    /// The background was hit and the focus was cleared.
    ClearedFocus,
}

/// Returns the topmost live wedge under `pt`.
///
/// `tolerance` widens wedges radially. When several wedges are within
/// tolerance, the one whose edge is closest wins, and ties go to the wedge
/// painted last.
pub fn pick(frame: &Frame, pt: Point, tolerance: f64) -> Option<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;
    for w in frame.wedges.iter().rev() {
        if w.phase == Phase::Exiting {
            continue;
        }
        let Some(distance) = w.wedge.hit_test(frame.center, pt, tolerance) else {
            continue;
        };
        if distance == 0.0 {
            return Some(w.id);
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((w.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Labels along the path from the root to `id`, joined with
/// [`BREADCRUMB_SEPARATOR`].
pub fn breadcrumb(hierarchy: &Hierarchy, id: NodeId, mut label_of: impl FnMut(NodeId) -> String) -> String {
    let labels: Vec<String> = hierarchy.path_to(id).iter().map(|&n| label_of(n)).collect();
    labels.join(BREADCRUMB_SEPARATOR)
}

/// The hover tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    /// Node under the pointer.
    pub node: NodeId,
    /// Pointer position in chart coordinates.
    pub anchor: Point,
    /// Breadcrumb from the root to the node.
    pub title: String,
    /// Rich content for the node.
    pub content: String,
    /// Fraction of the tooltip's width to shift it left, `anchor.x / width`.
    ///
    /// Near the left edge the tooltip hangs to the right of the pointer and near
    /// the right edge to its left, so it stays inside the chart.
    pub shift: f64,
}

impl Tooltip {
    /// Builds a tooltip anchored at `anchor` on a chart `width` pixels wide.
    pub fn new(node: NodeId, anchor: Point, width: f64, title: String, content: String) -> Self {
        let shift = if width > 0.0 {
            (anchor.x / width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            node,
            anchor,
            title,
            content,
            shift,
        }
    }

    /// Top-left corner of a tooltip box of `size`.
    pub fn origin(&self, size: Size) -> Point {
        Point::new(
            self.anchor.x - self.shift * size.width,
            self.anchor.y + VERTICAL_OFFSET,
        )
    }
}

/// Hover tracking between pointer events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HoverState {
    node: Option<NodeId>,
    tooltip: Option<Tooltip>,
}

impl HoverState {
    /// Node under the pointer.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Tooltip, when one is shown.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Records the hovered node and tooltip; returns whether the node changed.
    pub fn set(&mut self, node: Option<NodeId>, tooltip: Option<Tooltip>) -> bool {
        let changed = self.node != node;
        self.node = node;
        self.tooltip = tooltip;
        changed
    }

    /// Clears hover; returns whether a node was hovered.
    pub fn clear(&mut self) -> bool {
        self.set(None, None)
    }
}
