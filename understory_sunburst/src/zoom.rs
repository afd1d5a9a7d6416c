// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus and zoom.
//!
//! A [`Focus`] selects the part of the tree mapped onto the full circle. Its
//! [`FocusWindow`] determines the scale domains the chart zooms toward, and
//! [`ZoomController`] animates the live domains toward that target.
//!
//! Retargeting mid-flight starts a fresh tween from the *live* domains, so the
//! zoom always continues from what is on screen and the easing curve restarts.

use crate::hierarchy::{Hierarchy, NodeId};
use crate::scale::ScaleDomains;
use crate::transition::{DEFAULT_DURATION, Easing, Tween};

/// What the chart is zoomed on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Focus {
    /// The whole tree fills the circle.
    #[default]
    WholeTree,
    /// The given node fills the circle and its band becomes the center.
    Node(NodeId),
}

/// The region of domain space mapped onto the visible circle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FocusWindow {
    /// Start of the angular window.
    pub x0: f64,
    /// End of the angular window.
    pub x1: f64,
    /// Depth of the window's inner edge.
    pub y0: f64,
}

impl FocusWindow {
    /// The window showing the whole tree.
    pub const fn whole_tree(total_value: f64) -> Self {
        Self {
            x0: 0.0,
            x1: total_value,
            y0: 0.0,
        }
    }

    /// The window for `focus` in `hierarchy`.
    ///
    /// A focus node that is not part of the hierarchy yields the whole tree.
    pub fn of(hierarchy: &Hierarchy, focus: Focus) -> Self {
        match focus {
            Focus::Node(id) => match hierarchy.node(id) {
                Some(n) => Self {
                    x0: n.x0,
                    x1: n.x1,
                    y0: n.y0,
                },
                None => Self::whole_tree(hierarchy.total_value()),
            },
            Focus::WholeTree => Self::whole_tree(hierarchy.total_value()),
        }
    }

    /// Angular width of the window in domain units.
    pub fn span(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Scale domains that map this window onto the full chart.
    ///
    /// The radius domain runs from the window's inner edge to the outer boundary
    /// of the tree, in normalized depth.
    pub fn domains(&self, depth_extent: f64) -> ScaleDomains {
        ScaleDomains {
            angle: [self.x0, self.x1],
            radius: [self.y0 / depth_extent, 1.0],
        }
    }
}

/// Animates the live scale domains toward a target.
#[derive(Clone, Debug)]
pub struct ZoomController {
    live: ScaleDomains,
    target: ScaleDomains,
    tween: Option<Tween<ScaleDomains>>,
    /// Duration of new zoom transitions, in milliseconds.
    pub duration: f64,
    /// Easing of new zoom transitions.
    pub easing: Easing,
}

impl ZoomController {
    /// Creates a controller resting at `initial`.
    pub fn new(initial: ScaleDomains) -> Self {
        Self {
            live: initial,
            target: initial,
            tween: None,
            duration: DEFAULT_DURATION,
            easing: Easing::CubicInOut,
        }
    }

    /// Domains as of the last [`ZoomController::advance`].
    pub fn domains(&self) -> ScaleDomains {
        self.live
    }

    /// Domains the controller is heading to (or resting at).
    pub fn target(&self) -> ScaleDomains {
        self.target
    }

    /// Start time of the running transition, if any.
    pub fn transition_start(&self) -> Option<f64> {
        self.tween.map(|t| t.start)
    }

    /// Whether a transition is still running.
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Moves to `domains` immediately, dropping any running transition.
    pub fn jump_to(&mut self, domains: ScaleDomains) {
        self.live = domains;
        self.target = domains;
        self.tween = None;
    }

    /// Starts a transition from the live domains at `now` toward `target`.
    ///
    /// Returns `false`, and leaves any running transition alone, when `target`
    /// is already the current target.
    pub fn zoom_to(&mut self, target: ScaleDomains, now: f64) -> bool {
        if target == self.target {
            return false;
        }
        self.advance(now);
        self.target = target;
        self.tween = Some(Tween::new(
            self.live,
            target,
            now,
            self.duration,
            self.easing,
        ));
        true
    }

    /// Samples the transition at `now` and returns the live domains.
    pub fn advance(&mut self, now: f64) -> ScaleDomains {
        if let Some(tween) = self.tween {
            self.live = tween.sample(now);
            if tween.is_finished(now) {
                self.tween = None;
            }
        }
        self.live
    }
}
