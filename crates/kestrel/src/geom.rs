use serde::{Deserialize, Serialize};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;
pub type Box2D = euclid::Box2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width, height)
}

/// Corner-to-corner box; the corners may be given in any order.
pub fn box_from_corners(a: Point, b: Point) -> Box2D {
    Box2D::new(
        point(a.x.min(b.x), a.y.min(b.y)),
        point(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Space reserved around the plotting area for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }
}

/// The plotting area of a container: its size minus padding, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasArea {
    pub padding: Insets,
    pub width: f64,
    pub height: f64,
}

impl CanvasArea {
    pub fn from_container(container: Size, padding: Insets) -> Self {
        Self {
            padding,
            width: (container.width - padding.left - padding.right).max(0.0),
            height: (container.height - padding.top - padding.bottom).max(0.0),
        }
    }

    pub fn left(&self) -> f64 {
        self.padding.left
    }

    pub fn top(&self) -> f64 {
        self.padding.top
    }

    pub fn right(&self) -> f64 {
        self.padding.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.padding.top + self.height
    }

    pub fn rect(&self) -> Rect {
        rect(self.padding.left, self.padding.top, self.width, self.height)
    }

    pub fn bounds(&self) -> Box2D {
        self.rect().to_box2d()
    }

    pub fn is_collapsed(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
