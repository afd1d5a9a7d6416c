// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible-set reconciliation and per-frame wedge state.
//!
//! Each render computes the set of nodes visible under the current focus and
//! reconciles it against the wedges already on screen:
//!
//! - **enter**: new wedges start transparent and fade in;
//! - **update**: surviving wedges transition their fill to the new color;
//! - **exit**: vanished wedges fade out and are dropped once transparent.
//!
//! Geometry is not stored here. Every wedge, exiting ones included, is drawn
//! from the live zoom scales each frame, so all transitions share one time base.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Size};

use crate::color::Color;
use crate::geometry::{GuideArc, Wedge};
use crate::hierarchy::{Hierarchy, NodeId};
use crate::transition::{Easing, Tween};
use crate::zoom::FocusWindow;

/// Default minimum visible slice angle, in degrees of the focus window.
pub const DEFAULT_MIN_SLICE_ANGLE: f64 = 0.2;

/// Nodes visible under `window`, in id order.
///
/// A node is visible when its span overlaps the window and its share of the
/// window exceeds `min_slice_angle / 360`. A non-positive `min_slice_angle`
/// disables the width test.
pub fn visible_nodes(hierarchy: &Hierarchy, window: &FocusWindow, min_slice_angle: f64) -> Vec<NodeId> {
    let span = window.span();
    let threshold = min_slice_angle / 360.0;
    hierarchy
        .nodes()
        .iter()
        .filter(|n| n.x1 >= window.x0 && n.x0 <= window.x1)
        .filter(|n| {
            if threshold <= 0.0 {
                return true;
            }
            span > 0.0 && (n.x1 - n.x0) / span > threshold
        })
        .map(|n| n.id)
        .collect()
}

/// Outcome of diffing two visible sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// In the new set only.
    pub entered: Vec<NodeId>,
    /// In both sets.
    pub updated: Vec<NodeId>,
    /// In the old set only.
    pub exited: Vec<NodeId>,
}

/// Three-way diff of `previous` against `next`, each list in ascending id order.
pub fn reconcile(previous: &[NodeId], next: &[NodeId]) -> Reconciliation {
    let before: HashSet<NodeId> = previous.iter().copied().collect();
    let after: HashSet<NodeId> = next.iter().copied().collect();
    let mut out = Reconciliation {
        entered: next.iter().copied().filter(|id| !before.contains(id)).collect(),
        updated: next.iter().copied().filter(|id| before.contains(id)).collect(),
        exited: previous.iter().copied().filter(|id| !after.contains(id)).collect(),
    };
    out.entered.sort_unstable();
    out.updated.sort_unstable();
    out.exited.sort_unstable();
    out
}

/// Lifecycle stage of an on-screen wedge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fading in.
    Entering,
    /// Part of the visible set.
    Present,
    /// Fading out; removed once transparent.
    Exiting,
}

#[derive(Clone, Debug)]
struct WedgeState {
    phase: Phase,
    opacity: Tween<f64>,
    fill: Tween<Color>,
}

/// Shared timing of the transitions started by one render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Timing {
    /// Start time in milliseconds.
    pub now: f64,
    /// Duration in milliseconds.
    pub duration: f64,
    /// Easing curve.
    pub easing: Easing,
}

/// The wedges currently on screen and their paint order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    wedges: HashMap<NodeId, WedgeState>,
    order: Vec<NodeId>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wedges on screen, exiting ones included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is on screen.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids of the wedges that are not exiting, in ascending order.
    pub fn live_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .wedges
            .iter()
            .filter(|(_, w)| w.phase != Phase::Exiting)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Paint order, back to front.
    pub fn paint_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Phase of `id`, if it is on screen.
    pub fn phase(&self, id: NodeId) -> Option<Phase> {
        self.wedges.get(&id).map(|w| w.phase)
    }

    /// Opacity of `id` at `now`.
    pub fn opacity(&self, id: NodeId, now: f64) -> Option<f64> {
        self.wedges.get(&id).map(|w| w.opacity.sample(now))
    }

    /// Fill of `id` at `now`.
    pub fn fill(&self, id: NodeId, now: f64) -> Option<Color> {
        self.wedges.get(&id).map(|w| w.fill.sample(now))
    }

    /// Drops every wedge without transitions.
    pub fn clear(&mut self) {
        self.wedges.clear();
        self.order.clear();
    }

    /// Reconciles the scene toward `visible` and starts the matching transitions.
    ///
    /// `color_of` supplies the target fill of entering and updated wedges.
    pub fn apply(
        &mut self,
        visible: &[NodeId],
        timing: Timing,
        mut color_of: impl FnMut(NodeId) -> Color,
    ) -> Reconciliation {
        let rec = reconcile(&self.live_ids(), visible);
        let Timing {
            now,
            duration,
            easing,
        } = timing;

        for &id in &rec.entered {
            let color = color_of(id);
            if let Some(w) = self.wedges.get_mut(&id) {
                // Still fading out from an earlier render: bring it back.
                w.phase = Phase::Entering;
                w.opacity.retarget(1.0, now, duration, easing);
                w.fill.retarget(color, now, duration, easing);
            } else {
                self.wedges.insert(
                    id,
                    WedgeState {
                        phase: Phase::Entering,
                        opacity: Tween::new(0.0, 1.0, now, duration, easing),
                        fill: Tween::settled(color),
                    },
                );
                self.order.push(id);
            }
        }
        for &id in &rec.updated {
            let color = color_of(id);
            if let Some(w) = self.wedges.get_mut(&id) {
                w.fill.retarget(color, now, duration, easing);
            }
        }
        for &id in &rec.exited {
            if let Some(w) = self.wedges.get_mut(&id) {
                w.phase = Phase::Exiting;
                w.opacity.retarget(0.0, now, duration, easing);
            }
        }

        log::trace!(
            "reconciled sunburst scene: {} entered, {} updated, {} exited",
            rec.entered.len(),
            rec.updated.len(),
            rec.exited.len()
        );
        rec
    }

    /// Settles finished fades at `now`: entering wedges become present and
    /// exited wedges are removed.
    pub fn prune(&mut self, now: f64) {
        let mut removed = false;
        self.wedges.retain(|_, w| {
            let done = w.opacity.is_finished(now);
            match w.phase {
                Phase::Exiting if done => {
                    removed = true;
                    false
                }
                Phase::Entering if done => {
                    w.phase = Phase::Present;
                    true
                }
                _ => true,
            }
        });
        if removed {
            let wedges = &self.wedges;
            self.order.retain(|id| wedges.contains_key(id));
        }
    }

    /// Moves `id` to the top of the paint order.
    pub fn raise(&mut self, id: NodeId) {
        if let Some(pos) = self.order.iter().position(|&o| o == id) {
            let id = self.order.remove(pos);
            self.order.push(id);
        }
    }

    /// Raises `id`, then each of its ancestors, so the focused branch paints
    /// above its siblings with the root on top.
    pub fn raise_ancestry(&mut self, hierarchy: &Hierarchy, id: NodeId) {
        for a in hierarchy.ancestors(id) {
            self.raise(a);
        }
    }
}

/// A curved label and its guide.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Text to lay along the guide.
    pub text: String,
    /// Guide arc, relative to the frame center.
    pub guide: GuideArc,
}

/// One wedge of a rendered frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameWedge {
    /// Node drawn by this wedge.
    pub id: NodeId,
    /// Geometry under the live scales.
    pub wedge: Wedge,
    /// Fill color.
    pub fill: Color,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Label, when labels are enabled and the text fits this frame.
    pub label: Option<Label>,
    /// Lifecycle stage.
    pub phase: Phase,
}

/// A snapshot of the chart at one instant, wedges in paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Chart size in pixels.
    pub size: Size,
    /// Center of the chart.
    pub center: Point,
    /// Wedges, back to front.
    pub wedges: Vec<FrameWedge>,
}

impl Frame {
    /// A frame with nothing to draw.
    pub fn empty(size: Size) -> Self {
        Self {
            size,
            center: center_of(size),
            wedges: Vec::new(),
        }
    }

    /// The wedge drawing `id`, if any.
    pub fn wedge(&self, id: NodeId) -> Option<&FrameWedge> {
        self.wedges.iter().find(|w| w.id == id)
    }
}

/// Center of a chart of `size`.
pub fn center_of(size: Size) -> Point {
    Point::new(size.width / 2.0, size.height / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::{branch, kids, leaf, size};
    use crate::partition::partition;
    use crate::zoom::Focus;
    use alloc::vec;

    fn wide_and_thin() -> Hierarchy {
        // Root with one big child and three tiny ones (1/1000 of the circle each).
        let data = branch(
            "r",
            vec![
                branch("big", vec![leaf("b1", 500.0), leaf("b2", 497.0)]),
                leaf("t1", 1.0),
                leaf("t2", 1.0),
                leaf("t3", 1.0),
            ],
        );
        let mut h = Hierarchy::build(&data, kids, size, None);
        partition(&mut h);
        h
    }

    #[test]
    fn thin_slices_are_elided() {
        let h = wide_and_thin();
        let w = FocusWindow::of(&h, Focus::WholeTree);
        // 1/1000 of a turn is 0.36 degrees: above the 0.2 default, below 0.5.
        assert_eq!(visible_nodes(&h, &w, DEFAULT_MIN_SLICE_ANGLE).len(), 7);
        let coarse = visible_nodes(&h, &w, 0.5);
        assert_eq!(coarse, [NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let data = branch("r", vec![leaf("a", 1.0), leaf("nothing", 0.0)]);
        let mut h = Hierarchy::build(&data, kids, size, None);
        partition(&mut h);
        let w = FocusWindow::of(&h, Focus::WholeTree);
        assert_eq!(visible_nodes(&h, &w, 0.0).len(), 3);
        assert_eq!(visible_nodes(&h, &w, DEFAULT_MIN_SLICE_ANGLE).len(), 2);
    }

    #[test]
    fn large_threshold_keeps_only_the_focus_branch() {
        let h = wide_and_thin();
        // Focus on "big": its two children each take about half of the window.
        let w = FocusWindow::of(&h, Focus::Node(NodeId(1)));
        let ids = visible_nodes(&h, &w, 100.0);
        assert_eq!(ids, [NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        // With the children narrower than the threshold only the focus and its
        // ancestors remain.
        let ids = visible_nodes(&h, &w, 200.0);
        assert_eq!(ids, [NodeId(0), NodeId(1)]);
    }

    #[test]
    fn focus_window_excludes_disjoint_nodes() {
        let h = wide_and_thin();
        let w = FocusWindow::of(&h, Focus::Node(NodeId(5)));
        let ids = visible_nodes(&h, &w, 0.0);
        // Root, t1 and t3 touch t2's span at its edges; "big" and its kids do not.
        assert_eq!(ids, [NodeId(0), NodeId(4), NodeId(5), NodeId(6)]);
    }

    #[test]
    fn reconcile_three_way() {
        let prev = [NodeId(0), NodeId(1), NodeId(2)];
        let next = [NodeId(0), NodeId(2), NodeId(3)];
        let rec = reconcile(&prev, &next);
        assert_eq!(rec.entered, [NodeId(3)]);
        assert_eq!(rec.updated, [NodeId(0), NodeId(2)]);
        assert_eq!(rec.exited, [NodeId(1)]);
    }

    fn timing(now: f64) -> Timing {
        Timing {
            now,
            duration: 100.0,
            easing: Easing::Linear,
        }
    }

    #[test]
    fn enter_update_exit_lifecycle() {
        let mut scene = Scene::new();
        let grey = |_| Color::LIGHT_GREY;
        scene.apply(&[NodeId(0), NodeId(1)], timing(0.0), grey);
        assert_eq!(scene.opacity(NodeId(1), 0.0), Some(0.0));
        assert_eq!(scene.opacity(NodeId(1), 50.0), Some(0.5));
        scene.prune(100.0);
        assert_eq!(scene.phase(NodeId(1)), Some(Phase::Present));

        let rec = scene.apply(&[NodeId(0)], timing(200.0), |_| Color::BLACK);
        assert_eq!(rec.exited, [NodeId(1)]);
        assert_eq!(scene.phase(NodeId(1)), Some(Phase::Exiting));
        assert_eq!(scene.opacity(NodeId(1), 250.0), Some(0.5));
        assert_eq!(scene.fill(NodeId(0), 300.0), Some(Color::BLACK));
        assert_eq!(scene.live_ids(), [NodeId(0)]);

        scene.prune(250.0);
        assert_eq!(scene.len(), 2);
        scene.prune(300.0);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.paint_order(), [NodeId(0)]);
    }

    #[test]
    fn exiting_wedge_can_come_back() {
        let mut scene = Scene::new();
        let grey = |_| Color::LIGHT_GREY;
        scene.apply(&[NodeId(0), NodeId(1)], timing(0.0), grey);
        scene.prune(100.0);
        scene.apply(&[NodeId(0)], timing(100.0), grey);
        let rec = scene.apply(&[NodeId(0), NodeId(1)], timing(150.0), grey);
        assert_eq!(rec.entered, [NodeId(1)]);
        assert_eq!(scene.opacity(NodeId(1), 150.0), Some(0.5));
        assert_eq!(scene.opacity(NodeId(1), 250.0), Some(1.0));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn raising_the_focus_stack() {
        let h = wide_and_thin();
        let mut scene = Scene::new();
        let ids: Vec<NodeId> = (0..6).map(NodeId).collect();
        scene.apply(&ids, timing(0.0), |_| Color::LIGHT_GREY);
        scene.raise_ancestry(&h, NodeId(2));
        assert_eq!(
            scene.paint_order(),
            [NodeId(3), NodeId(4), NodeId(5), NodeId(2), NodeId(1), NodeId(0)]
        );
    }
}
