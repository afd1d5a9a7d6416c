// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wedge and label-guide geometry.
//!
//! Angles follow the sunburst convention: `0` is twelve o'clock and angles grow
//! clockwise in y-down screen space, so a point at angle `a` and radius `r` sits
//! at `(r·sin a, -r·cos a)` from the center. [`GuideArc`] angles instead use the
//! Kurbo convention (`0` is three o'clock), which is the sunburst angle minus
//! `π/2`.

use alloc::format;
use alloc::string::String;
use core::f64::consts::{FRAC_PI_2, PI, TAU};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Arc, BezPath, Point, Vec2};

use crate::hierarchy::LayoutNode;
use crate::scale::Scales;

/// Average glyph advance, in pixels, assumed by [`label_fits`].
pub const CHAR_PX: f64 = 6.0;

/// Sweeps this close to a full turn are drawn as full rings.
const FULL_TURN_EPSILON: f64 = 1e-9;

/// One annular sector of the chart, in screen units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Wedge {
    /// Start angle in radians.
    pub start_angle: f64,
    /// End angle in radians.
    pub end_angle: f64,
    /// Inner radius in pixels.
    pub inner_radius: f64,
    /// Outer radius in pixels.
    pub outer_radius: f64,
}

impl Wedge {
    /// The wedge of `node` under the current scales.
    pub fn for_node(node: &LayoutNode, scales: &Scales) -> Self {
        Self {
            start_angle: scales.angle_of(node.x0),
            end_angle: scales.angle_of(node.x1),
            inner_radius: scales.radius_of(node.y0),
            outer_radius: scales.radius_of(node.y1),
        }
    }

    /// Angular extent in radians.
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Radius halfway between the inner and outer edges.
    pub fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    /// Whether the wedge covers no area.
    pub fn is_empty(&self) -> bool {
        self.sweep() <= 0.0 || self.outer_radius <= self.inner_radius
    }

    fn is_full_turn(&self) -> bool {
        self.sweep() >= TAU - FULL_TURN_EPSILON
    }

    /// Point at `angle` and `radius` around `center`.
    pub fn point_at(center: Point, angle: f64, radius: f64) -> Point {
        center + Vec2::new(radius * angle.sin(), -radius * angle.cos())
    }

    /// Point in the middle of the wedge, where a straight label would go.
    pub fn centroid(&self, center: Point) -> Point {
        Self::point_at(
            center,
            (self.start_angle + self.end_angle) / 2.0,
            self.mid_radius(),
        )
    }

    /// Outline of the wedge as a Bézier path around `center`.
    ///
    /// Arcs are approximated by cubics within `tolerance`. A full turn becomes a
    /// disc, or a ring with a reversed inner subpath when the inner radius is
    /// positive.
    pub fn to_path(&self, center: Point, tolerance: f64) -> BezPath {
        let mut path = BezPath::new();
        if self.is_empty() {
            return path;
        }
        let full = self.is_full_turn();
        let sweep = if full { TAU } else { self.sweep() };
        let ring = |radius: f64, start: f64, sweep: f64| Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle: start - FRAC_PI_2,
            sweep_angle: sweep,
            x_rotation: 0.0,
        };

        path.move_to(Self::point_at(center, self.start_angle, self.outer_radius));
        path.extend(ring(self.outer_radius, self.start_angle, sweep).append_iter(tolerance));
        if self.inner_radius > 0.0 {
            if full {
                path.close_path();
                path.move_to(Self::point_at(center, self.start_angle, self.inner_radius));
                path.extend(ring(self.inner_radius, self.start_angle, -TAU).append_iter(tolerance));
            } else {
                let end = self.start_angle + sweep;
                path.line_to(Self::point_at(center, end, self.inner_radius));
                path.extend(ring(self.inner_radius, end, -sweep).append_iter(tolerance));
            }
        } else if !full {
            path.line_to(center);
        }
        path.close_path();
        path
    }

    /// SVG path data for the wedge around `center`, using exact arc commands.
    pub fn svg_path_data(&self, center: Point) -> String {
        if self.is_empty() {
            return String::new();
        }
        let (a0, r0, r1) = (self.start_angle, self.inner_radius, self.outer_radius);
        let at = |angle: f64, radius: f64| svg_point(Self::point_at(center, angle, radius));

        if self.is_full_turn() {
            // A single arc cannot start and end on the same point; use two halves.
            let mut d = format!(
                "M{}A{r1:.3},{r1:.3},0,1,1,{}A{r1:.3},{r1:.3},0,1,1,{}Z",
                at(a0, r1),
                at(a0 + PI, r1),
                at(a0, r1),
            );
            if r0 > 0.0 {
                d.push_str(&format!(
                    "M{}A{r0:.3},{r0:.3},0,1,0,{}A{r0:.3},{r0:.3},0,1,0,{}Z",
                    at(a0, r0),
                    at(a0 + PI, r0),
                    at(a0, r0),
                ));
            }
            return d;
        }

        let a1 = self.end_angle;
        let large = u8::from(self.sweep() > PI);
        let mut d = format!(
            "M{}A{r1:.3},{r1:.3},0,{large},1,{}",
            at(a0, r1),
            at(a1, r1)
        );
        if r0 > 0.0 {
            d.push_str(&format!(
                "L{}A{r0:.3},{r0:.3},0,{large},0,{}Z",
                at(a1, r0),
                at(a0, r0)
            ));
        } else {
            d.push_str(&format!("L{}Z", svg_point(center)));
        }
        d
    }

    /// Whether `pt` lies inside the wedge drawn around `center`.
    pub fn contains(&self, center: Point, pt: Point) -> bool {
        self.hit_test(center, pt, 0.0) == Some(0.0)
    }

    /// Polar hit test of `pt` against the wedge drawn around `center`.
    ///
    /// `tolerance` widens the wedge radially. Returns the radial distance outside
    /// the wedge (`0.0` for interior points), or `None` on a miss.
    pub fn hit_test(&self, center: Point, pt: Point, tolerance: f64) -> Option<f64> {
        if self.sweep() <= 0.0 {
            return None;
        }
        let v = pt - center;
        let r = v.hypot();
        if r < self.inner_radius - tolerance || r > self.outer_radius + tolerance {
            return None;
        }
        if !self.is_full_turn() {
            let mut angle = v.x.atan2(-v.y);
            if angle < 0.0 {
                angle += TAU;
            }
            if angle < self.start_angle || angle > self.end_angle {
                return None;
            }
        }
        let distance = if r < self.inner_radius {
            self.inner_radius - r
        } else if r > self.outer_radius {
            r - self.outer_radius
        } else {
            0.0
        };
        Some(distance)
    }
}

fn svg_point(p: Point) -> String {
    format!("{:.3},{:.3}", p.x, p.y)
}

/// Wraps an angle into `(-π, π]`.
fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a <= -PI {
        a + TAU
    } else if a > PI {
        a - TAU
    } else {
        a
    }
}

/// An invisible arc at the wedge's mid-radius that curved label text follows.
///
/// Angles use the Kurbo convention. In the lower half of the chart the arc runs
/// counterclockwise so that text laid along it reads left to right.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GuideArc {
    /// Radius in pixels.
    pub radius: f64,
    /// Angle at which the text starts.
    pub start_angle: f64,
    /// Angle at which the text ends.
    pub end_angle: f64,
    /// Direction of travel from `start_angle` to `end_angle`.
    pub counterclockwise: bool,
}

impl GuideArc {
    /// The guide for `wedge`, or `None` when its radius or sweep is zero.
    pub fn for_wedge(wedge: &Wedge) -> Option<Self> {
        let radius = wedge.mid_radius().max(0.0);
        if radius <= 0.0 || wedge.sweep() <= 0.0 {
            return None;
        }
        let mut start = wedge.start_angle - FRAC_PI_2;
        let mut end = wedge.end_angle - FRAC_PI_2;
        let middle = normalize_angle((start + end) / 2.0);
        let counterclockwise = middle > 0.0 && middle < PI;
        if counterclockwise {
            core::mem::swap(&mut start, &mut end);
        }
        Some(Self {
            radius,
            start_angle: start,
            end_angle: end,
            counterclockwise,
        })
    }

    /// Unsigned angular extent.
    pub fn sweep(&self) -> f64 {
        (self.end_angle - self.start_angle).abs()
    }

    /// Arc length, the space available to the label.
    pub fn length(&self) -> f64 {
        self.radius * self.sweep()
    }

    fn point(&self, center: Point, angle: f64) -> Point {
        center + Vec2::new(self.radius * angle.cos(), self.radius * angle.sin())
    }

    /// Where the text starts.
    pub fn start_point(&self, center: Point) -> Point {
        self.point(center, self.start_angle)
    }

    /// Where the text ends.
    pub fn end_point(&self, center: Point) -> Point {
        self.point(center, self.end_angle)
    }

    /// The guide as a Kurbo arc around `center`.
    pub fn to_arc(&self, center: Point) -> Arc {
        let sweep = if self.counterclockwise {
            -self.sweep()
        } else {
            self.sweep()
        };
        Arc {
            center,
            radii: Vec2::new(self.radius, self.radius),
            start_angle: self.start_angle,
            sweep_angle: sweep,
            x_rotation: 0.0,
        }
    }

    /// SVG path data for the guide around `center`.
    pub fn svg_path_data(&self, center: Point) -> String {
        let r = self.radius;
        let sweep_flag = u8::from(!self.counterclockwise);
        let start = svg_point(self.start_point(center));
        if self.sweep() >= TAU - FULL_TURN_EPSILON {
            let half = if self.counterclockwise { -PI } else { PI };
            let mid = svg_point(self.point(center, self.start_angle + half));
            return format!(
                "M{start}A{r:.3},{r:.3},0,1,{sweep_flag},{mid}A{r:.3},{r:.3},0,1,{sweep_flag},{start}"
            );
        }
        let large = u8::from(self.sweep() > PI);
        let end = svg_point(self.end_point(center));
        format!("M{start}A{r:.3},{r:.3},0,{large},{sweep_flag},{end}")
    }
}

/// Whether `text` fits along the mid-radius of `wedge`.
///
/// Each character is assumed to be [`CHAR_PX`] wide; labels that do not fit are
/// hidden, never truncated.
pub fn label_fits(text: &str, wedge: &Wedge) -> bool {
    let perimeter = wedge.mid_radius().max(0.0) * wedge.sweep();
    #[allow(
        clippy::cast_precision_loss,
        reason = "Label lengths are far below 2^52 characters."
    )]
    let chars = text.chars().count() as f64;
    chars * CHAR_PX < perimeter
}
