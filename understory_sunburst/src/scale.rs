// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Angle and radius scales.
//!
//! Layout spans live in domain space: cumulative value for angles and depth for
//! radii. [`Scales`] maps them into screen space for the current zoom state. The
//! radius scale works on *normalized* depth, `depth / depth_extent`, so the outer
//! boundary of the whole tree is always `1` regardless of how deep it is.

use core::f64::consts::TAU;

use crate::hierarchy::LayoutNode;
use crate::transition::Lerp;

/// A linear mapping from a domain interval to a range interval.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearScale {
    /// Input interval.
    pub domain: [f64; 2],
    /// Output interval.
    pub range: [f64; 2],
    /// Whether inputs outside the domain map to the nearest range bound.
    pub clamp: bool,
}

impl LinearScale {
    /// Creates an unclamped scale.
    pub const fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    /// Returns this scale with clamping enabled.
    #[must_use]
    pub const fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    /// Maps `value` from the domain into the range.
    ///
    /// A degenerate domain (`d0 == d1`) maps everything to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        let mut t = if span == 0.0 {
            0.5
        } else {
            (value - d0) / span
        };
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0.lerp(r1, t)
    }
}

/// The two domains animated by a zoom.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaleDomains {
    /// Angle domain, in value units.
    pub angle: [f64; 2],
    /// Radius domain, in normalized depth.
    pub radius: [f64; 2],
}

impl Lerp for ScaleDomains {
    fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            angle: self.angle.lerp(other.angle, t),
            radius: self.radius.lerp(other.radius, t),
        }
    }
}

/// Live angle and radius scales for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scales {
    /// Value to angle in radians, clamped to `[0, 2π]`.
    pub angle: LinearScale,
    /// Normalized depth to radius in pixels (unclamped).
    pub radius: LinearScale,
    /// Depth of the outer boundary of the tree (`max_depth + 1`).
    pub depth_extent: f64,
}

impl Scales {
    /// Builds the scales for `domains` on a chart of outer radius `max_radius`.
    pub fn new(domains: ScaleDomains, max_radius: f64, depth_extent: f64) -> Self {
        debug_assert!(depth_extent > 0.0, "depth extent must be positive");
        Self {
            angle: LinearScale::new(domains.angle, [0.0, TAU]).clamped(),
            radius: LinearScale::new(domains.radius, [0.0, max_radius]),
            depth_extent,
        }
    }

    /// Angle in radians of a domain position.
    pub fn angle_of(&self, x: f64) -> f64 {
        self.angle.apply(x)
    }

    /// Radius in pixels of a depth, floored at zero.
    pub fn radius_of(&self, y: f64) -> f64 {
        self.radius.apply(y / self.depth_extent).max(0.0)
    }

    /// Angular extent of `node` in radians.
    pub fn sweep_of(&self, node: &LayoutNode) -> f64 {
        self.angle_of(node.x1) - self.angle_of(node.x0)
    }
}
