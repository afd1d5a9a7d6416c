// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG serialization of a [`Frame`].
//!
//! Each wedge becomes a `slice` group holding its `main-arc` path and, when it
//! is labelled, an invisible `hidden-arc` guide with a `textPath` that
//! references it by id. Guide ids are namespaced by [`ChartId`] so several
//! charts can share one document.

use alloc::format;
use alloc::string::String;

use crate::chart::ChartId;
use crate::hierarchy::NodeId;
use crate::scene::{Frame, FrameWedge};

/// Element id of the label guide of `node` in chart `chart`.
pub fn guide_id(chart: ChartId, node: NodeId) -> String {
    format!("sunburst-{chart}-guide-{}", node.index())
}

/// Escapes text for use in SVG content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn slice(out: &mut String, chart: ChartId, w: &FrameWedge, frame: &Frame) {
    let d = w.wedge.svg_path_data(frame.center);
    out.push_str(&format!(
        "<g class=\"slice\" data-node=\"{}\" opacity=\"{:.3}\">",
        w.id.index(),
        w.opacity.clamp(0.0, 1.0)
    ));
    if !d.is_empty() {
        out.push_str(&format!(
            "<path class=\"main-arc\" d=\"{d}\" fill=\"{}\"/>",
            w.fill
        ));
    }
    if let Some(label) = &w.label {
        let id = guide_id(chart, w.id);
        out.push_str(&format!(
            "<path class=\"hidden-arc\" id=\"{id}\" d=\"{}\" fill=\"none\"/>",
            label.guide.svg_path_data(frame.center)
        ));
        out.push_str(&format!(
            "<text><textPath href=\"#{id}\" startOffset=\"50%\" text-anchor=\"middle\">{}</textPath></text>",
            escape(&label.text)
        ));
    }
    out.push_str("</g>");
}

/// Serializes `frame` as a standalone SVG document.
pub fn to_svg(frame: &Frame, chart: ChartId) -> String {
    let (w, h) = (frame.size.width, frame.size.height);
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"sunburst-viz\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );
    for wedge in &frame.wedges {
        slice(&mut out, chart, wedge, frame);
    }
    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::{GuideArc, Wedge};
    use crate::scene::{Label, Phase};
    use core::f64::consts::{FRAC_PI_2, PI};
    use kurbo::Size;

    fn frame_with(label: Option<&str>) -> Frame {
        let mut frame = Frame::empty(Size::new(20.0, 20.0));
        let wedge = Wedge {
            start_angle: 0.0,
            end_angle: FRAC_PI_2,
            inner_radius: 0.0,
            outer_radius: 10.0,
        };
        frame.wedges.push(FrameWedge {
            id: NodeId(3),
            wedge,
            fill: Color::rgb(0x1f, 0x77, 0xb4),
            opacity: 1.0,
            label: label.map(|text| Label {
                text: text.into(),
                guide: GuideArc::for_wedge(&wedge).unwrap(),
            }),
            phase: Phase::Present,
        });
        frame
    }

    #[test]
    fn guide_ids_are_namespaced() {
        assert_eq!(guide_id(ChartId(7), NodeId(3)), "sunburst-7-guide-3");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn unlabelled_slice() {
        let svg = to_svg(&frame_with(None), ChartId(1));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("viewBox=\"0 0 20 20\""));
        assert!(svg.contains(
            "<path class=\"main-arc\" d=\"M10.000,0.000A10.000,10.000,0,0,1,20.000,10.000L10.000,10.000Z\" fill=\"#1f77b4\"/>"
        ));
        assert!(!svg.contains("textPath"));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn labelled_slice_references_its_guide() {
        let svg = to_svg(&frame_with(Some("R&D")), ChartId(2));
        assert!(svg.contains("<path class=\"hidden-arc\" id=\"sunburst-2-guide-3\""));
        assert!(svg.contains("<textPath href=\"#sunburst-2-guide-3\""));
        assert!(svg.contains(">R&amp;D</textPath>"));
    }

    #[test]
    fn empty_wedges_have_no_path() {
        let mut frame = frame_with(None);
        frame.wedges[0].wedge.end_angle = 0.0;
        frame.wedges[0].opacity = PI;
        let svg = to_svg(&frame, ChartId(1));
        assert!(!svg.contains("main-arc"));
        assert!(svg.contains("opacity=\"1.000\""));
    }
}
