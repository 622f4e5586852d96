//! Radial partition layout for sunburst charts, with label placement and hit-testing.

use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{CanvasArea, Point, point};

const MIN_ARC_ANGLE: f64 = 0.001;
const MAX_PAD_ANGLE: f64 = 0.005;

/// Hierarchical input. Only leaf values count; values on inner nodes are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SunburstNode {
    pub id: Option<String>,
    pub name: String,
    pub value: Option<f64>,
    pub children: Vec<SunburstNode>,
}

impl SunburstNode {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<SunburstNode>) -> Self {
        Self {
            name: name.into(),
            children,
            ..Self::default()
        }
    }
}

/// One node of the partition. Angles are radians clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcSegment {
    pub name: String,
    pub id: Option<String>,
    pub parent: Option<usize>,
    pub depth: usize,
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl ArcSegment {
    pub fn angle(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn mid_angle(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn mid_radius(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// Outer edge as drawn: one pixel inside the band to leave a ring gap.
    pub fn outer_radius(&self) -> f64 {
        self.y1 - 1.0
    }

    pub fn pad_angle(&self) -> f64 {
        (self.angle() / 2.0).min(MAX_PAD_ANGLE)
    }

    pub fn is_drawn(&self) -> bool {
        self.depth > 0 && self.angle() > MIN_ARC_ANGLE
    }

    /// Labels are shown when the arc is long enough at its mid radius to hold the font.
    pub fn label_visible(&self, font_size: f64) -> bool {
        self.depth > 0 && self.mid_radius() * self.angle() > font_size
    }

    pub fn label_transform(&self) -> LabelTransform {
        let degrees = self.mid_angle().to_degrees();
        LabelTransform {
            rotate: degrees - 90.0,
            translate: self.mid_radius(),
            flipped: degrees >= 180.0,
        }
    }

    fn contains(&self, angle: f64, radius: f64) -> bool {
        angle >= self.x0 && angle < self.x1 && radius >= self.y0 && radius < self.y1
    }
}

/// Radial label placement: rotate to the arc's mid angle, move out to its mid radius and
/// turn upright on the left half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelTransform {
    pub rotate: f64,
    pub translate: f64,
    pub flipped: bool,
}

impl fmt::Display for LabelTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rotate({}) translate({}, 0) rotate({})",
            self.rotate,
            self.translate,
            if self.flipped { 180 } else { 0 }
        )
    }
}

/// Flattened partition in pre-order; index 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct SunburstLayout {
    pub radius: f64,
    pub arcs: Vec<ArcSegment>,
}

struct Summed<'a> {
    node: &'a SunburstNode,
    value: f64,
    height: usize,
    children: Vec<Summed<'a>>,
}

fn summed(node: &SunburstNode) -> Summed<'_> {
    if node.children.is_empty() {
        let value = node.value.filter(|v| v.is_finite()).unwrap_or(0.0);
        return Summed {
            node,
            value,
            height: 0,
            children: Vec::new(),
        };
    }
    let mut children: Vec<Summed<'_>> = node.children.iter().map(summed).collect();
    children.sort_by(|a, b| b.value.total_cmp(&a.value));
    Summed {
        node,
        value: children.iter().map(|c| c.value).sum(),
        height: children.iter().map(|c| c.height + 1).max().unwrap_or(0),
        children,
    }
}

impl SunburstLayout {
    /// Partitions `[0, 2π] × [0, radius]`: every depth gets an equal ring and every child
    /// an angular share proportional to its value.
    pub fn partition(root: &SunburstNode, radius: f64) -> Self {
        let tree = summed(root);
        let band = radius / (tree.height + 1) as f64;
        let mut arcs = Vec::new();
        place(&tree, None, 0, [0.0, TAU], band, &mut arcs);
        Self { radius, arcs }
    }

    /// Radius that fits the canvas.
    pub fn radius_for(canvas: &CanvasArea) -> f64 {
        canvas.width.min(canvas.height) / 2.0
    }

    pub fn root(&self) -> Option<&ArcSegment> {
        self.arcs.first()
    }

    pub fn total(&self) -> f64 {
        self.root().map_or(0.0, |r| r.value)
    }

    pub fn height(&self) -> usize {
        self.arcs.iter().map(|a| a.depth).max().unwrap_or(0)
    }

    /// Arcs worth drawing: everything but the root, minus slivers.
    pub fn visible_arcs(&self) -> impl Iterator<Item = (usize, &ArcSegment)> {
        self.arcs.iter().enumerate().filter(|(_, a)| a.is_drawn())
    }

    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            let Some(arc) = self.arcs.get(i) else { break };
            out.push(i);
            cursor = arc.parent;
        }
        out
    }

    /// Names from the root down to `index`, joined with `/`.
    pub fn breadcrumb(&self, index: usize) -> String {
        let mut names: Vec<&str> = self
            .ancestors(index)
            .into_iter()
            .map(|i| self.arcs[i].name.as_str())
            .collect();
        names.reverse();
        names.join("/")
    }

    pub fn share_of_root(&self, index: usize) -> f64 {
        let total = self.total();
        match self.arcs.get(index) {
            Some(arc) if total != 0.0 => arc.value / total,
            _ => 0.0,
        }
    }

    pub fn tooltip(&self, index: usize) -> String {
        format!(
            "{}\n{}",
            self.breadcrumb(index),
            format_percent(self.share_of_root(index))
        )
    }

    /// The drawn arc under `p`, for a chart centred on `centre`.
    pub fn arc_at(&self, p: Point, centre: Point) -> Option<usize> {
        let dx = p.x - centre.x;
        let dy = p.y - centre.y;
        let radius = dx.hypot(dy);
        let mut angle = dx.atan2(-dy);
        if angle < 0.0 {
            angle += TAU;
        }
        self.visible_arcs()
            .filter(|(_, a)| a.contains(angle, radius))
            .max_by_key(|(_, a)| a.depth)
            .map(|(i, _)| i)
    }
}

fn place(
    node: &Summed<'_>,
    parent: Option<usize>,
    depth: usize,
    [x0, x1]: [f64; 2],
    band: f64,
    out: &mut Vec<ArcSegment>,
) {
    let index = out.len();
    out.push(ArcSegment {
        name: node.node.name.clone(),
        id: node.node.id.clone(),
        parent,
        depth,
        value: node.value,
        x0,
        x1,
        y0: band * depth as f64,
        y1: band * (depth + 1) as f64,
    });

    let k = if node.value != 0.0 {
        (x1 - x0) / node.value
    } else {
        0.0
    };
    let mut x = x0;
    for child in &node.children {
        let start = x;
        x += child.value * k;
        place(child, Some(index), depth + 1, [start, x], band, out);
    }
}

/// Percentage with up to two decimals and no trailing zeros: `0.5 → "50%"`,
/// `0.12345 → "12.35%"`.
pub fn format_percent(share: f64) -> String {
    if !share.is_finite() {
        return "0%".to_string();
    }
    let s = format!("{:.2}", share * 100.0);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{s}%")
}

/// Screen centre of a sunburst drawn in `canvas`.
pub fn centre_of(canvas: &CanvasArea) -> Point {
    point(
        canvas.left() + canvas.width / 2.0,
        canvas.top() + canvas.height / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SunburstNode {
        SunburstNode::branch(
            "root",
            vec![
                SunburstNode::leaf("small", 1.0),
                SunburstNode {
                    value: Some(100.0),
                    ..SunburstNode::branch(
                        "big",
                        vec![SunburstNode::leaf("a", 2.0), SunburstNode::leaf("b", 1.0)],
                    )
                },
            ],
        )
    }

    #[test]
    fn inner_values_are_ignored_and_children_sorted() {
        let layout = SunburstLayout::partition(&sample(), 90.0);
        assert_eq!(layout.total(), 4.0);
        let names: Vec<&str> = layout.arcs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["root", "big", "a", "b", "small"]);
        let big = &layout.arcs[1];
        assert!((big.angle() - TAU * 0.75).abs() < 1e-12);
        assert_eq!((big.y0, big.y1), (30.0, 60.0));
    }

    #[test]
    fn tooltip_joins_ancestors_and_share() {
        let layout = SunburstLayout::partition(&sample(), 90.0);
        assert_eq!(layout.tooltip(3), "root/big/b\n25%");
        assert_eq!(format_percent(0.123456), "12.35%");
    }

    #[test]
    fn hit_test_uses_clockwise_angles_from_top() {
        let layout = SunburstLayout::partition(&sample(), 90.0);
        let c = point(100.0, 100.0);
        // Straight right is a quarter turn: inside "big" at depth one, "a" at depth two.
        assert_eq!(layout.arc_at(point(145.0, 100.0), c), Some(1));
        assert_eq!(layout.arc_at(point(175.0, 100.0), c), Some(2));
        // Root ring is never hit.
        assert_eq!(layout.arc_at(point(110.0, 100.0), c), None);
    }
}
