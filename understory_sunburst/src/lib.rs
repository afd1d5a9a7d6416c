// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_sunburst --heading-base-level=0

//! Understory Sunburst: a headless, zoomable sunburst chart.
//!
//! A sunburst draws a tree as concentric rings. The root sits in the center,
//! each level of depth is one ring further out, and every node's angular share
//! of its ring is proportional to its aggregated size.
//!
//! This crate owns everything between host data and drawing commands:
//!
//! - [`hierarchy`]: turns borrowed host data into a flat layout tree with
//!   aggregated sizes, optional sibling sorting and pre-order [`NodeId`]s.
//! - [`partition`](mod@partition): assigns every node an angular span and a depth band.
//! - [`zoom`]: focus on a node and animate the scale domains toward it.
//! - [`geometry`]: annular wedges, polar hit testing and curved label guides.
//! - [`scene`]: visible-set reconciliation with enter, update and exit fades.
//! - [`interaction`]: click-to-focus, hover tracking and tooltip placement.
//! - [`svg`]: serializes a [`Frame`] as an SVG document.
//!
//! [`Sunburst`] ties these together behind setters and a per-frame
//! [`Sunburst::frame`] call. It does not own a clock, a window or a renderer:
//! the host passes the current time in milliseconds and draws the returned
//! [`Frame`], either through Kurbo paths ([`Wedge::to_path`]) or as SVG.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_sunburst::{ChartId, ClickOutcome, Focus, Sunburst, svg};
//!
//! struct Node {
//!     name: String,
//!     size: f64,
//!     children: Vec<Node>,
//! }
//!
//! fn leaf(name: &str, size: f64) -> Node {
//!     Node { name: name.into(), size, children: vec![] }
//! }
//!
//! let mut chart = Sunburst::new(ChartId(1));
//! chart.set_size_px(200.0, 200.0);
//! chart.set_children(|n: &Node| &n.children[..]);
//! chart.set_size(|n: &Node| Some(n.size));
//! chart.set_label(|n: &Node| n.name.clone());
//! chart.set_data(Some(Node {
//!     name: "A".into(),
//!     size: 0.0,
//!     children: vec![leaf("B", 10.0), leaf("C", 30.0)],
//! }));
//!
//! let frame = chart.frame(0.0);
//! assert_eq!(frame.wedges.len(), 3);
//!
//! // C covers the last three quarters of the outer ring; click inside it.
//! let outcome = chart.click(Point::new(25.0, 100.0));
//! assert!(matches!(outcome, ClickOutcome::Focused(_)));
//!
//! // After the transition C fills the whole circle.
//! chart.frame(16.0);
//! let frame = chart.frame(16.0 + 750.0);
//! assert!(matches!(chart.focus(), Focus::Node(_)));
//! let document = svg::to_svg(&frame, chart.id());
//! assert!(document.contains("main-arc"));
//! ```
//!
//! Floats are assumed to be finite once they leave the size accessor; sizes
//! that are non-finite or negative are treated as zero.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod chart;
pub mod color;
pub mod geometry;
pub mod hierarchy;
pub mod interaction;
pub mod partition;
pub mod scale;
pub mod scene;
pub mod svg;
pub mod transition;
pub mod zoom;

pub use chart::{ChartId, Invalidation, Options, Sunburst};
pub use color::Color;
pub use geometry::{GuideArc, Wedge};
pub use hierarchy::{Hierarchy, LayoutNode, NodeId, RawKey};
pub use interaction::{ClickOutcome, Tooltip};
pub use scene::{Frame, FrameWedge, Label, Phase};
pub use transition::{Easing, Tween};
pub use zoom::{Focus, FocusWindow};
