// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sunburst of a small file tree, zoomed on one directory, written as SVG.
//!
//! This example shows how to:
//! - install host data and accessors on a `Sunburst`,
//! - drive transitions by calling `frame` with a millisecond clock,
//! - route pointer input (hover tooltip, click-to-focus),
//! - serialize the settled frame with `svg::to_svg`.
//!
//! Run:
//! - `cargo run -p understory_sunburst_demos --example sunburst_svg > sunburst.svg`

use kurbo::Point;
use understory_sunburst::{ChartId, ClickOutcome, Color, LayoutNode, NodeId, Sunburst, svg};

/// A file or directory; files carry a size in bytes.
struct Entry {
    name: &'static str,
    bytes: Option<f64>,
    entries: Vec<Entry>,
}

fn file(name: &'static str, bytes: f64) -> Entry {
    Entry {
        name,
        bytes: Some(bytes),
        entries: Vec::new(),
    }
}

fn dir(name: &'static str, entries: Vec<Entry>) -> Entry {
    Entry {
        name,
        bytes: None,
        entries,
    }
}

const PALETTE: [&str; 6] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];

fn main() {
    let data = dir(
        "repo",
        vec![
            dir(
                "src",
                vec![
                    file("chart.rs", 24_000.0),
                    file("scene.rs", 12_000.0),
                    file("geometry.rs", 14_000.0),
                    dir("tests", vec![file("tree.rs", 3_000.0), file("zoom.rs", 2_500.0)]),
                ],
            ),
            dir("docs", vec![file("guide.md", 8_000.0), file("faq.md", 1_200.0)]),
            file("Cargo.toml", 900.0),
            file("LICENSE", 11_000.0),
        ],
    );

    let mut chart = Sunburst::new(ChartId(1));
    chart.set_size_px(480.0, 480.0);
    chart.set_children(|e: &Entry| &e.entries[..]);
    chart.set_size(|e: &Entry| e.bytes);
    chart.set_label(|e: &Entry| e.name.to_string());
    chart.set_sort(Some(|a: &LayoutNode, b: &LayoutNode| {
        b.value.total_cmp(&a.value)
    }));
    chart.set_color(|e: &Entry, _parent: Option<&Entry>| {
        let hash = e.name.bytes().fold(0_usize, |h, b| h.wrapping_mul(31).wrapping_add(b.into()));
        Color::from_hex(PALETTE[hash % PALETTE.len()]).unwrap_or_default()
    });
    chart.set_tooltip_content(|e: &Entry, node: &LayoutNode| {
        format!("{} bytes", node.value.max(e.bytes.unwrap_or(0.0)))
    });
    chart.set_on_hover(Some(|hit: Option<(&Entry, NodeId)>| {
        eprintln!("hover: {:?}", hit.map(|(e, _)| e.name));
    }));
    chart.set_data(Some(data));

    // Frames at 60 Hz while the chart fades in.
    let mut now = 0.0;
    while now <= 750.0 {
        chart.frame(now);
        now += 16.0;
    }

    // Hover somewhere on the right side of the chart.
    if let Some(tip) = chart.pointer_move(Point::new(400.0, 240.0)) {
        eprintln!("tooltip: {} ({})", tip.title, tip.content);
    }
    chart.pointer_leave();

    // Zoom on "src" and let the transition settle.
    chart.focus_on_with(|repo| repo.entries.iter().find(|e| e.name == "src"));
    let start = now;
    while now <= start + 800.0 {
        chart.frame(now);
        now += 16.0;
    }
    let frame = chart.frame(now);
    eprintln!(
        "focused on {:?}; {} wedges, {} labelled",
        chart.focus(),
        frame.wedges.len(),
        frame.wedges.iter().filter(|w| w.label.is_some()).count()
    );

    // Clicking outside the chart zooms back out on the next frame.
    let outcome = chart.click(Point::new(0.0, 0.0));
    assert_eq!(outcome, ClickOutcome::ClearedFocus);

    println!("{}", svg::to_svg(&frame, chart.id()));
}
