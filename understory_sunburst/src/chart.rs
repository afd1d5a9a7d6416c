// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sunburst chart widget.
//!
//! [`Sunburst`] owns the host's data and accessors, and ties the pipeline
//! together:
//!
//! 1. **Layout**: data and accessors are turned into a [`Hierarchy`] and
//!    partitioned.
//! 2. **Zoom**: the focus is resolved against the layout and the scale domains
//!    start moving toward its window.
//! 3. **Render**: the visible set is reconciled against the wedges on screen.
//!
//! Setters only record what they invalidate. [`Sunburst::update`] runs the
//! stages that are pending, in that order, and [`Sunburst::frame`] samples
//! every running transition into a [`Frame`].
//!
//! Time is supplied by the host in milliseconds, from whatever clock drives
//! its frame loop; it only needs to be monotonic.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Size};

use crate::color::Color;
use crate::geometry::{GuideArc, Wedge, label_fits};
use crate::hierarchy::{Hierarchy, LayoutNode, NodeId, RawKey, SortFn};
use crate::interaction::{ClickOutcome, HoverState, Tooltip, breadcrumb, pick};
use crate::partition::partition;
use crate::scale::Scales;
use crate::scene::{
    DEFAULT_MIN_SLICE_ANGLE, Frame, FrameWedge, Label, Scene, Timing, visible_nodes,
};
use crate::transition::{DEFAULT_DURATION, Easing};
use crate::zoom::{Focus, FocusWindow, ZoomController};

/// Identifies one chart instance.
///
/// Used to namespace element ids when several charts share a document.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartId(pub u64);

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags::bitflags! {
    /// Pipeline stages waiting for the next [`Sunburst::update`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Invalidation: u8 {
        /// Rebuild and partition the hierarchy.
        const LAYOUT = 0b0000_0001;
        /// Re-resolve the focus and retarget the zoom.
        const ZOOM   = 0b0000_0010;
        /// Recompute the visible set and restyle wedges.
        const RENDER = 0b0000_0100;
    }
}

/// Chart options.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// Chart size in pixels. The outer radius is half the smaller side.
    pub size: Size,
    /// Slices narrower than this many degrees of the focus window are not drawn.
    /// Zero or less draws everything.
    pub min_slice_angle: f64,
    /// Whether to draw curved labels.
    pub show_labels: bool,
    /// Duration of zoom and fade transitions, in milliseconds.
    pub transition_duration: f64,
    /// Easing of zoom and fade transitions.
    pub easing: Easing,
    /// Radial slack, in pixels, granted to pointer hit tests.
    pub hit_tolerance: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            size: Size::new(600.0, 600.0),
            min_slice_angle: DEFAULT_MIN_SLICE_ANGLE,
            show_labels: true,
            transition_duration: DEFAULT_DURATION,
            easing: Easing::CubicInOut,
            hit_tolerance: 0.0,
        }
    }
}

/// Children accessor.
pub type ChildrenFn<T> = dyn Fn(&T) -> &[T];
/// Size accessor. `None` leaves weigh `1`.
pub type SizeFn<T> = dyn Fn(&T) -> Option<f64>;
/// Label accessor.
pub type LabelFn<T> = dyn Fn(&T) -> String;
/// Color accessor, given the node and its parent.
pub type ColorFn<T> = dyn Fn(&T, Option<&T>) -> Color;
/// Tooltip content accessor.
pub type TooltipFn<T> = dyn Fn(&T, &LayoutNode) -> String;
/// Tooltip predicate.
pub type ShowTooltipFn<T> = dyn Fn(&T, &LayoutNode) -> bool;
/// Click callback.
pub type ClickFn<T> = dyn FnMut(&T, NodeId);
/// Hover callback, called with `None` when the pointer leaves all wedges.
pub type HoverFn<T> = dyn FnMut(Option<(&T, NodeId)>);

fn no_children<T>(_: &T) -> &[T] {
    &[]
}

/// Resolves the host node behind `id`.
fn host<'a, T>(
    data: Option<&'a T>,
    hierarchy: &Hierarchy,
    children: &ChildrenFn<T>,
    id: NodeId,
) -> Option<&'a T> {
    hierarchy.resolve(data?, children, id)
}

/// An interactive sunburst chart over host data of type `T`.
///
/// ## Example
///
/// ```rust
/// use understory_sunburst::{ChartId, Focus, Sunburst};
///
/// struct Dir {
///     name: &'static str,
///     bytes: f64,
///     entries: Vec<Dir>,
/// }
///
/// let mut chart = Sunburst::new(ChartId(1));
/// chart.set_children(|d: &Dir| &d.entries[..]);
/// chart.set_size(|d: &Dir| (d.entries.is_empty()).then_some(d.bytes));
/// chart.set_label(|d: &Dir| d.name.into());
/// chart.set_data(Some(Dir {
///     name: "root",
///     bytes: 0.0,
///     entries: vec![
///         Dir { name: "src", bytes: 30.0, entries: vec![] },
///         Dir { name: "docs", bytes: 10.0, entries: vec![] },
///     ],
/// }));
///
/// let frame = chart.frame(0.0);
/// assert_eq!(frame.wedges.len(), 3);
///
/// // Zoom on "src"; the transition runs over the following frames.
/// chart.focus_on_with(|root| root.entries.first());
/// chart.frame(16.0);
/// assert!(matches!(chart.focus(), Focus::Node(_)));
/// assert!(chart.is_animating());
/// ```
pub struct Sunburst<T: 'static> {
    id: ChartId,
    options: Options,

    data: Option<Box<T>>,
    children: Box<ChildrenFn<T>>,
    size: Box<SizeFn<T>>,
    sort: Option<Box<SortFn>>,
    label: Box<LabelFn<T>>,
    color: Box<ColorFn<T>>,
    tooltip_content: Box<TooltipFn<T>>,
    show_tooltip: Box<ShowTooltipFn<T>>,
    on_node_click: Option<Box<ClickFn<T>>>,
    on_hover: Option<Box<HoverFn<T>>>,

    hierarchy: Option<Hierarchy>,
    /// Last layout of exiting wedges whose ids the current layout lacks.
    retired: HashMap<NodeId, LayoutNode>,
    focus_key: Option<RawKey>,
    focus: Focus,
    zoom: ZoomController,
    jump_next_zoom: bool,
    scene: Scene,
    hover: HoverState,
    pending: Invalidation,
    clock: f64,
}

impl<T: 'static> fmt::Debug for Sunburst<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sunburst")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("has_data", &self.data.is_some())
            .field("nodes", &self.hierarchy.as_ref().map_or(0, Hierarchy::len))
            .field("focus", &self.focus)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Sunburst<T> {
    /// Creates an empty chart with default options.
    pub fn new(id: ChartId) -> Self {
        Self::with_options(id, Options::default())
    }

    /// Creates an empty chart.
    pub fn with_options(id: ChartId, options: Options) -> Self {
        let mut zoom = ZoomController::new(FocusWindow::whole_tree(0.0).domains(1.0));
        zoom.duration = options.transition_duration;
        zoom.easing = options.easing;
        Self {
            id,
            options,
            data: None,
            children: Box::new(no_children::<T>),
            size: Box::new(|_| None),
            sort: None,
            label: Box::new(|_| String::new()),
            color: Box::new(|_, _| Color::LIGHT_GREY),
            tooltip_content: Box::new(|_, _| String::new()),
            show_tooltip: Box::new(|_, _| true),
            on_node_click: None,
            on_hover: None,
            hierarchy: None,
            retired: HashMap::new(),
            focus_key: None,
            focus: Focus::WholeTree,
            zoom,
            jump_next_zoom: true,
            scene: Scene::new(),
            hover: HoverState::default(),
            pending: Invalidation::LAYOUT,
            clock: 0.0,
        }
    }

    /// This chart's identifier.
    pub fn id(&self) -> ChartId {
        self.id
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Stages waiting for the next [`Sunburst::update`].
    pub fn pending(&self) -> Invalidation {
        self.pending
    }

    /// The installed data.
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Mutable access to the installed data; schedules a layout.
    ///
    /// If the focused node is removed or moved in memory, the focus falls back
    /// to the whole tree at the next layout.
    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.pending |= Invalidation::LAYOUT;
        self.data.as_deref_mut()
    }

    /// The current layout, as of the last [`Sunburst::update`].
    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    /// The resolved focus, as of the last [`Sunburst::update`].
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// The node under the pointer.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.node()
    }

    /// The tooltip, when one is shown.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.hover.tooltip()
    }

    /// Whether the zoom or any fade is still running.
    pub fn is_animating(&self) -> bool {
        self.zoom.is_animating()
            || self
                .scene
                .paint_order()
                .iter()
                .any(|&id| self.scene.opacity(id, self.clock) != Some(1.0))
    }

    /// Resizes the chart.
    pub fn set_size_px(&mut self, width: f64, height: f64) {
        self.options.size = Size::new(width, height);
        self.pending |= Invalidation::RENDER;
    }

    /// Installs new data, or clears the chart with `None`.
    ///
    /// The focus is reset; node identities from the previous data are gone.
    pub fn set_data(&mut self, data: Option<T>) {
        self.data = data.map(Box::new);
        self.focus_key = None;
        self.pending |= Invalidation::LAYOUT;
    }

    /// Sets the children accessor.
    pub fn set_children<F>(&mut self, f: F)
    where
        F: Fn(&T) -> &[T] + 'static,
    {
        self.children = Box::new(f);
        self.pending |= Invalidation::LAYOUT;
    }

    /// Sets the size accessor.
    pub fn set_size<F>(&mut self, f: F)
    where
        F: Fn(&T) -> Option<f64> + 'static,
    {
        self.size = Box::new(f);
        self.pending |= Invalidation::LAYOUT;
    }

    /// Sets or clears the sibling comparator.
    pub fn set_sort<F>(&mut self, f: Option<F>)
    where
        F: Fn(&LayoutNode, &LayoutNode) -> core::cmp::Ordering + 'static,
    {
        self.sort = f.map(|f| Box::new(f) as Box<SortFn>);
        self.pending |= Invalidation::LAYOUT;
    }

    /// Sets the label accessor.
    pub fn set_label<F>(&mut self, f: F)
    where
        F: Fn(&T) -> String + 'static,
    {
        self.label = Box::new(f);
        self.pending |= Invalidation::RENDER;
    }

    /// Sets the color accessor.
    pub fn set_color<F>(&mut self, f: F)
    where
        F: Fn(&T, Option<&T>) -> Color + 'static,
    {
        self.color = Box::new(f);
        self.pending |= Invalidation::RENDER;
    }

    /// Sets the minimum visible slice angle, in degrees.
    pub fn set_min_slice_angle(&mut self, degrees: f64) {
        self.options.min_slice_angle = degrees;
        self.pending |= Invalidation::RENDER;
    }

    /// Shows or hides labels.
    pub fn set_show_labels(&mut self, show: bool) {
        self.options.show_labels = show;
        self.pending |= Invalidation::RENDER;
    }

    /// Sets the tooltip content accessor.
    pub fn set_tooltip_content<F>(&mut self, f: F)
    where
        F: Fn(&T, &LayoutNode) -> String + 'static,
    {
        self.tooltip_content = Box::new(f);
        self.pending |= Invalidation::RENDER;
    }

    /// Sets the predicate deciding which nodes get a tooltip.
    pub fn set_show_tooltip<F>(&mut self, f: F)
    where
        F: Fn(&T, &LayoutNode) -> bool + 'static,
    {
        self.show_tooltip = Box::new(f);
        self.pending |= Invalidation::RENDER;
    }

    /// Sets the duration of transitions started from now on.
    pub fn set_transition_duration(&mut self, millis: f64) {
        self.options.transition_duration = millis;
        self.zoom.duration = millis;
    }

    /// Sets the easing of transitions started from now on.
    pub fn set_easing(&mut self, easing: Easing) {
        self.options.easing = easing;
        self.zoom.easing = easing;
    }

    /// Sets or clears the click callback.
    ///
    /// While set, clicking a wedge calls it instead of focusing the wedge.
    pub fn set_on_node_click<F>(&mut self, f: Option<F>)
    where
        F: FnMut(&T, NodeId) + 'static,
    {
        self.on_node_click = f.map(|f| Box::new(f) as Box<ClickFn<T>>);
    }

    /// Sets or clears the hover callback.
    pub fn set_on_hover<F>(&mut self, f: Option<F>)
    where
        F: FnMut(Option<(&T, NodeId)>) + 'static,
    {
        self.on_hover = f.map(|f| Box::new(f) as Box<HoverFn<T>>);
    }

    /// Focuses on the host node with identity `key`, or the whole tree.
    pub fn focus_on_key(&mut self, key: Option<RawKey>) {
        self.focus_key = key;
        self.pending |= Invalidation::ZOOM;
    }

    /// Focuses on `node`, which must be part of the installed data, or the
    /// whole tree.
    pub fn focus_on(&mut self, node: Option<&T>) {
        self.focus_on_key(node.map(RawKey::of));
    }

    /// Focuses on the node `select` picks from the installed data.
    pub fn focus_on_with<F>(&mut self, select: F)
    where
        F: FnOnce(&T) -> Option<&T>,
    {
        let key = self.data.as_deref().and_then(select).map(RawKey::of);
        self.focus_on_key(key);
    }

    /// Focuses on a node of the current layout, or the whole tree.
    pub fn focus_on_id(&mut self, id: Option<NodeId>) {
        let key = id.and_then(|id| self.hierarchy.as_ref()?.key_of(id));
        if id.is_some() && key.is_none() {
            log::debug!("focus id {id:?} is not part of the current layout");
        }
        self.focus_on_key(key);
    }

    /// Zooms back out to the whole tree.
    pub fn clear_focus(&mut self) {
        self.focus_on_key(None);
    }

    /// Runs the pending pipeline stages at time `now`, then advances running
    /// transitions.
    pub fn update(&mut self, now: f64) {
        self.clock = now;
        if self.pending.contains(Invalidation::LAYOUT) {
            self.relayout();
        }
        if self.pending.contains(Invalidation::ZOOM) {
            self.rezoom(now);
        }
        if self.pending.contains(Invalidation::RENDER) {
            self.render(now);
        }
        self.pending = Invalidation::empty();
        self.zoom.advance(now);
        self.scene.prune(now);
        self.retired.retain(|id, _| self.scene.phase(*id).is_some());
    }

    /// Updates the chart and returns everything to draw at time `now`.
    pub fn frame(&mut self, now: f64) -> Frame {
        self.update(now);
        self.snapshot(now, true)
    }

    /// Rebuilds the layout. Wedges on screen are kept so the next render
    /// reconciles them against the new visible set.
    fn relayout(&mut self) {
        self.hover.clear();
        self.pending |= Invalidation::ZOOM | Invalidation::RENDER;

        let previous = self.hierarchy.take();
        let Some(data) = self.data.as_deref() else {
            log::debug!("sunburst {} has no data", self.id);
            self.scene.clear();
            self.retired.clear();
            self.jump_next_zoom = true;
            return;
        };
        let mut hierarchy = Hierarchy::build(data, &*self.children, &*self.size, self.sort.as_deref());
        partition(&mut hierarchy);

        self.retired.retain(|id, _| hierarchy.node(*id).is_none());
        if let Some(previous) = &previous {
            for &id in self.scene.paint_order() {
                if hierarchy.node(id).is_none()
                    && let Some(node) = previous.node(id)
                {
                    self.retired.insert(id, node.clone());
                }
            }
        }
        self.hierarchy = Some(hierarchy);
    }

    fn rezoom(&mut self, now: f64) {
        self.pending |= Invalidation::RENDER;
        let Some(hierarchy) = &self.hierarchy else {
            self.focus = Focus::WholeTree;
            return;
        };
        self.focus = match self.focus_key {
            None => Focus::WholeTree,
            Some(key) => match hierarchy.lookup_key(key) {
                Some(id) => Focus::Node(id),
                None => {
                    log::debug!("focused node left the layout; showing the whole tree");
                    self.focus_key = None;
                    Focus::WholeTree
                }
            },
        };
        let target = FocusWindow::of(hierarchy, self.focus).domains(hierarchy.depth_extent());
        if self.jump_next_zoom {
            self.zoom.jump_to(target);
            self.jump_next_zoom = false;
        } else {
            self.zoom.zoom_to(target, now);
        }
    }

    fn render(&mut self, now: f64) {
        let Self {
            options,
            data,
            children,
            color,
            hierarchy,
            focus,
            zoom,
            scene,
            ..
        } = self;
        let Some(hierarchy) = hierarchy.as_ref() else {
            return;
        };
        let window = FocusWindow::of(hierarchy, *focus);
        let visible = visible_nodes(hierarchy, &window, options.min_slice_angle);
        let timing = Timing {
            now,
            duration: zoom.duration,
            easing: zoom.easing,
        };
        let data = data.as_deref();
        let children: &ChildrenFn<T> = &**children;
        let color: &ColorFn<T> = &**color;
        scene.apply(&visible, timing, |id| {
            let node = host(data, hierarchy, children, id);
            let parent = hierarchy
                .parent_of(id)
                .and_then(|p| host(data, hierarchy, children, p));
            node.map_or(Color::LIGHT_GREY, |n| color(n, parent))
        });
        if let Focus::Node(id) = *focus {
            scene.raise_ancestry(hierarchy, id);
        }
    }

    fn scales(&self, hierarchy: &Hierarchy) -> Scales {
        let size = self.options.size;
        let max_radius = (size.width.min(size.height) / 2.0).max(0.0);
        Scales::new(self.zoom.domains(), max_radius, hierarchy.depth_extent())
    }

    /// Samples the scene at `now`. Hit testing only needs geometry, so it
    /// skips `with_labels`.
    fn snapshot(&self, now: f64, with_labels: bool) -> Frame {
        let mut frame = Frame::empty(self.options.size);
        let Some(hierarchy) = &self.hierarchy else {
            return frame;
        };
        let scales = self.scales(hierarchy);
        let data = self.data.as_deref();
        for &id in self.scene.paint_order() {
            let Some(phase) = self.scene.phase(id) else {
                continue;
            };
            let (node, current) = match hierarchy.node(id) {
                Some(node) => (node, true),
                None => match self.retired.get(&id) {
                    Some(node) => (node, false),
                    None => continue,
                },
            };
            let wedge = Wedge::for_node(node, &scales);
            let label = if with_labels && current && self.options.show_labels {
                host(data, hierarchy, &*self.children, id).and_then(|n| {
                    let text = (self.label)(n);
                    if text.is_empty() || !label_fits(&text, &wedge) {
                        return None;
                    }
                    GuideArc::for_wedge(&wedge).map(|guide| Label { text, guide })
                })
            } else {
                None
            };
            frame.wedges.push(FrameWedge {
                id,
                wedge,
                fill: self.scene.fill(id, now).unwrap_or_default(),
                opacity: self.scene.opacity(id, now).unwrap_or(1.0),
                label,
                phase,
            });
        }
        frame
    }

    /// Whether pointer input can be resolved against the current layout.
    fn accepts_input(&self) -> bool {
        self.hierarchy.is_some() && !self.pending.contains(Invalidation::LAYOUT)
    }

    /// Handles a click at `pt`, in chart coordinates.
    ///
    /// A hit on a wedge goes to the click callback when one is set and focuses
    /// the wedge otherwise. A click on the background clears the focus. Input
    /// is ignored until data installed since the last update has been laid out.
    pub fn click(&mut self, pt: Point) -> ClickOutcome {
        if !self.accepts_input() {
            return ClickOutcome::Ignored;
        }
        let frame = self.snapshot(self.clock, false);
        let Some(id) = pick(&frame, pt, self.options.hit_tolerance) else {
            self.clear_focus();
            return ClickOutcome::ClearedFocus;
        };
        let Self {
            data,
            children,
            hierarchy,
            on_node_click,
            ..
        } = self;
        if let Some(callback) = on_node_click.as_mut() {
            let node = hierarchy
                .as_ref()
                .and_then(|h| host(data.as_deref(), h, &**children, id));
            if let Some(node) = node {
                callback(node, id);
            }
            return ClickOutcome::Callback(id);
        }
        self.focus_on_id(Some(id));
        ClickOutcome::Focused(id)
    }

    /// Tracks the pointer at `pt` and returns the tooltip to show, if any.
    pub fn pointer_move(&mut self, pt: Point) -> Option<&Tooltip> {
        if !self.accepts_input() {
            self.pointer_leave();
            return None;
        }
        let frame = self.snapshot(self.clock, false);
        let hit = pick(&frame, pt, self.options.hit_tolerance);
        let tooltip = hit.and_then(|id| self.tooltip_for(id, pt));
        if self.hover.set(hit, tooltip) {
            self.notify_hover();
        }
        self.hover.tooltip()
    }

    /// Hides the tooltip and clears hover.
    pub fn pointer_leave(&mut self) {
        if self.hover.clear() {
            self.notify_hover();
        }
    }

    fn tooltip_for(&self, id: NodeId, anchor: Point) -> Option<Tooltip> {
        let hierarchy = self.hierarchy.as_ref()?;
        let data = self.data.as_deref();
        let resolve = |id| host(data, hierarchy, &*self.children, id);
        let node = resolve(id)?;
        let layout = hierarchy.node(id)?;
        if !(self.show_tooltip)(node, layout) {
            return None;
        }
        let title = breadcrumb(hierarchy, id, |n| {
            resolve(n).map(|n| (self.label)(n)).unwrap_or_default()
        });
        let content = (self.tooltip_content)(node, layout);
        Some(Tooltip::new(id, anchor, self.options.size.width, title, content))
    }

    fn notify_hover(&mut self) {
        let Self {
            data,
            children,
            hierarchy,
            hover,
            on_hover,
            ..
        } = self;
        let Some(callback) = on_hover.as_mut() else {
            return;
        };
        let hovered = hover.node().and_then(|id| {
            let node = host(data.as_deref(), hierarchy.as_ref()?, &**children, id)?;
            Some((node, id))
        });
        callback(hovered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::{Item, branch, leaf};
    use crate::scene::Phase;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::f64::consts::{FRAC_PI_2, TAU};

    const B: NodeId = NodeId(1);
    const C: NodeId = NodeId(2);

    /// `A -> [B(10), C(30)]` on a 200x200 chart: the root band spans radii
    /// `0..50`, the leaves `50..100`; B covers a quarter turn from twelve
    /// o'clock.
    fn chart() -> Sunburst<Item> {
        let mut chart = Sunburst::with_options(
            ChartId(7),
            Options {
                size: Size::new(200.0, 200.0),
                ..Options::default()
            },
        );
        chart.set_children(|n: &Item| &n.children[..]);
        chart.set_size(|n: &Item| n.size);
        chart.set_label(|n: &Item| n.name.clone());
        chart.set_data(Some(branch("A", vec![leaf("B", 10.0), leaf("C", 30.0)])));
        chart
    }

    const IN_B: Point = Point::new(150.0, 50.0);
    const IN_C: Point = Point::new(25.0, 100.0);
    const OUTSIDE: Point = Point::new(199.0, 199.0);

    #[test]
    fn first_frame_lays_out_and_fades_in() {
        let mut chart = chart();
        assert_eq!(chart.pending(), Invalidation::LAYOUT);
        let frame = chart.frame(0.0);
        assert_eq!(chart.pending(), Invalidation::empty());
        assert_eq!(frame.center, Point::new(100.0, 100.0));
        assert_eq!(frame.wedges.len(), 3);
        assert!(frame.wedges.iter().all(|w| w.opacity == 0.0));

        let b = frame.wedge(B).unwrap().wedge;
        assert_eq!((b.start_angle, b.end_angle), (0.0, FRAC_PI_2));
        assert_eq!((b.inner_radius, b.outer_radius), (50.0, 100.0));

        let frame = chart.frame(750.0);
        assert!(frame.wedges.iter().all(|w| w.opacity == 1.0));
        assert!(!chart.is_animating());
    }

    #[test]
    fn click_focuses_and_background_click_zooms_out() {
        let mut chart = chart();
        chart.frame(0.0);
        assert_eq!(chart.click(IN_C), ClickOutcome::Focused(C));
        chart.frame(100.0);
        assert_eq!(chart.focus(), Focus::Node(C));

        let c = chart.frame(850.0).wedge(C).unwrap().wedge;
        assert_eq!((c.start_angle, c.end_angle), (0.0, TAU));
        assert_eq!((c.inner_radius, c.outer_radius), (0.0, 100.0));
        // The focused branch paints on top, root last.
        assert_eq!(chart.scene.paint_order(), [B, C, NodeId::ROOT]);

        assert_eq!(chart.click(OUTSIDE), ClickOutcome::ClearedFocus);
        chart.frame(900.0);
        assert_eq!(chart.focus(), Focus::WholeTree);
        let c = chart.frame(1650.0).wedge(C).unwrap().wedge;
        assert_eq!((c.start_angle, c.end_angle), (FRAC_PI_2, TAU));
        assert_eq!((c.inner_radius, c.outer_radius), (50.0, 100.0));
    }

    #[test]
    fn click_callback_replaces_focusing() {
        let mut chart = chart();
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = clicked.clone();
        chart.set_on_node_click(Some(move |n: &Item, id| {
            sink.borrow_mut().push((n.name.clone(), id));
        }));
        chart.frame(0.0);
        assert_eq!(chart.click(IN_B), ClickOutcome::Callback(B));
        chart.frame(10.0);
        assert_eq!(chart.focus(), Focus::WholeTree);
        assert_eq!(*clicked.borrow(), [("B".to_string(), B)]);
    }

    #[test]
    fn refocusing_the_same_node_is_idempotent() {
        let mut chart = chart();
        chart.frame(0.0);
        chart.focus_on_with(|a| a.children.get(1));
        chart.frame(100.0);
        assert!(chart.zoom.is_animating());
        assert_eq!(chart.zoom.transition_start(), Some(100.0));
        chart.focus_on_with(|a| a.children.get(1));
        chart.frame(400.0);
        assert_eq!(chart.zoom.transition_start(), Some(100.0));
        assert_eq!(chart.focus(), Focus::Node(C));
    }

    #[test]
    fn stale_focus_falls_back_to_whole_tree() {
        let mut chart = chart();
        chart.frame(0.0);
        chart.focus_on_id(Some(C));
        chart.frame(10.0);
        assert_eq!(chart.focus(), Focus::Node(C));

        if let Some(a) = chart.data_mut() {
            a.children.truncate(1);
        }
        chart.frame(20.0);
        assert_eq!(chart.focus(), Focus::WholeTree);
        assert_eq!(chart.hierarchy().unwrap().len(), 2);
    }

    #[test]
    fn unknown_focus_is_whole_tree() {
        let mut chart = chart();
        chart.frame(0.0);
        let stranger = leaf("C", 30.0);
        chart.focus_on(Some(&stranger));
        chart.frame(10.0);
        assert_eq!(chart.focus(), Focus::WholeTree);
        chart.focus_on_id(Some(NodeId(42)));
        chart.frame(20.0);
        assert_eq!(chart.focus(), Focus::WholeTree);
    }

    #[test]
    fn thin_slices_fade_out() {
        let mut chart = chart();
        chart.frame(0.0);
        // B is a quarter of the circle, 90 degrees.
        chart.set_min_slice_angle(100.0);
        let frame = chart.frame(1000.0);
        assert_eq!(frame.wedge(B).unwrap().phase, Phase::Exiting);
        assert_eq!(chart.frame(1375.0).wedge(B).unwrap().opacity, 0.5);
        // Exiting wedges ignore the pointer.
        assert_eq!(chart.click(IN_B), ClickOutcome::ClearedFocus);
        assert!(chart.frame(1750.0).wedge(B).is_none());
    }

    #[test]
    fn recolor_transitions_fill() {
        let mut chart = chart();
        chart.frame(0.0);
        chart.set_color(|_, parent| if parent.is_some() { Color::BLACK } else { Color::WHITE });
        chart.frame(1000.0);
        let frame = chart.frame(1750.0);
        assert_eq!(frame.wedge(NodeId::ROOT).unwrap().fill, Color::WHITE);
        assert_eq!(frame.wedge(C).unwrap().fill, Color::BLACK);
    }

    #[test]
    fn labels_follow_the_fit_test() {
        let mut chart = chart();
        let frame = chart.frame(0.0);
        // C: mid radius 75 over three quarters of a turn.
        let label = frame.wedge(C).unwrap().label.as_ref().unwrap();
        assert_eq!(label.text, "C");
        assert_eq!(label.guide.radius, 75.0);

        chart.set_label(|n: &Item| n.name.repeat(100));
        assert!(chart.frame(10.0).wedges.iter().all(|w| w.label.is_none()));

        chart.set_label(|n: &Item| n.name.clone());
        chart.set_show_labels(false);
        assert!(chart.frame(20.0).wedges.iter().all(|w| w.label.is_none()));
    }

    #[test]
    fn hover_shows_breadcrumb_tooltip() {
        let mut chart = chart();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        chart.set_on_hover(Some(move |hit: Option<(&Item, NodeId)>| {
            sink.borrow_mut().push(hit.map(|(n, _)| n.name.clone()));
        }));
        chart.set_tooltip_content(|n: &Item, l: &LayoutNode| alloc::format!("{}: {}", n.name, l.value));
        chart.frame(0.0);

        let tip = chart.pointer_move(IN_C).cloned().unwrap();
        assert_eq!(tip.node, C);
        assert_eq!(tip.title, "A > C");
        assert_eq!(tip.content, "C: 30");
        assert_eq!(tip.shift, 0.125);
        assert_eq!(tip.origin(Size::new(80.0, 20.0)), Point::new(15.0, 121.0));

        // Moving within the same wedge does not re-notify.
        chart.pointer_move(Point::new(26.0, 100.0));
        chart.pointer_leave();
        assert!(chart.tooltip().is_none());
        assert_eq!(*seen.borrow(), [Some("C".to_string()), None]);
    }

    #[test]
    fn tooltip_predicate_suppresses_content() {
        let mut chart = chart();
        chart.set_show_tooltip(|n: &Item, _: &LayoutNode| n.name != "C");
        chart.frame(0.0);
        assert!(chart.pointer_move(IN_C).is_none());
        assert_eq!(chart.hovered(), Some(C));
        assert_eq!(chart.pointer_move(IN_B).map(|t| t.node), Some(B));
    }

    #[test]
    fn empty_chart_ignores_input() {
        let mut chart = chart();
        chart.set_data(None);
        let frame = chart.frame(0.0);
        assert!(frame.wedges.is_empty());
        assert!(chart.hierarchy().is_none());
        assert_eq!(chart.click(IN_B), ClickOutcome::Ignored);
        assert!(chart.pointer_move(IN_B).is_none());
    }

    #[test]
    fn new_data_replaces_layout_without_stale_wedges() {
        let mut chart = chart();
        chart.frame(0.0);
        chart.set_data(Some(branch("X", vec![leaf("Y", 1.0)])));
        // Input waits for the new layout.
        assert_eq!(chart.click(IN_B), ClickOutcome::Ignored);
        let frame = chart.frame(750.0);
        // C has no counterpart in the new layout and is still fading out.
        assert_eq!(frame.wedges.len(), 3);
        assert_eq!(frame.wedge(C).map(|w| w.phase), Some(Phase::Exiting));
        assert_eq!(chart.hierarchy().unwrap().total_value(), 1.0);
        let frame = chart.frame(1500.0);
        assert_eq!(frame.wedges.len(), 2);
        assert!(chart.retired.is_empty());
    }

    #[test]
    fn resorting_keeps_wedges_on_screen() {
        let mut chart = chart();
        chart.frame(0.0);
        chart.frame(1000.0);
        chart.set_sort(Some(|a: &LayoutNode, b: &LayoutNode| b.value.total_cmp(&a.value)));
        let frame = chart.frame(1010.0);
        assert_eq!(frame.wedges.len(), 3);
        assert!(frame.wedges.iter().all(|w| w.phase == Phase::Present));
        assert!(frame.wedges.iter().all(|w| w.opacity == 1.0));
        // C sorts first now and takes B's old id.
        assert_eq!(chart.hierarchy().unwrap().node(B).unwrap().value, 30.0);
    }

    #[test]
    fn shrinking_data_fades_removed_wedges_out() {
        let mut chart = chart();
        chart.frame(0.0);
        chart.frame(1000.0);
        chart.set_data(Some(branch("A", vec![leaf("B", 10.0)])));
        let frame = chart.frame(1010.0);
        let phases: Vec<(NodeId, Phase)> = frame.wedges.iter().map(|w| (w.id, w.phase)).collect();
        assert_eq!(
            phases,
            [
                (NodeId::ROOT, Phase::Present),
                (B, Phase::Present),
                (C, Phase::Exiting)
            ]
        );
        assert!(frame.wedge(C).unwrap().label.is_none());
        // Exiting wedges are not hit.
        assert_eq!(chart.pointer_move(IN_C).map(|t| t.node), None);

        let c = chart.frame(1400.0).wedge(C).unwrap().opacity;
        assert!(c > 0.0 && c < 1.0);
        let frame = chart.frame(2000.0);
        assert_eq!(frame.wedges.len(), 2);
        assert_eq!(chart.scene.phase(C), None);
    }

    #[test]
    fn hit_testing_skips_the_label_accessor() {
        let calls = Rc::new(RefCell::new(0_u32));
        let sink = calls.clone();
        let mut chart = chart();
        chart.set_label(move |n: &Item| {
            *sink.borrow_mut() += 1;
            n.name.clone()
        });
        chart.set_show_tooltip(|_: &Item, _: &LayoutNode| false);
        chart.frame(0.0);
        let after_frame = *calls.borrow();
        assert!(after_frame > 0);
        chart.pointer_move(IN_B);
        chart.click(OUTSIDE);
        assert_eq!(*calls.borrow(), after_frame);
    }

    #[test]
    fn resizing_rescales_the_chart() {
        let mut chart = chart();
        chart.frame(0.0);
        chart.set_size_px(400.0, 300.0);
        let frame = chart.frame(10.0);
        assert_eq!(frame.center, Point::new(200.0, 150.0));
        assert_eq!(frame.wedge(C).unwrap().wedge.outer_radius, 150.0);
    }
}
