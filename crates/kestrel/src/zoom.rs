//! Zoom transforms and the clamp/constrain algebra behind pan and zoom gestures.
//!
//! A [`ZoomTransform`] maps base pixels to zoomed pixels as `p * k + t`. Every interaction
//! goes through [`ZoomConstraints::compose`], which proposes a transform for the event,
//! clamps its scale factor and then pulls the translation back inside the translate extent.

use serde::{Deserialize, Serialize};

use crate::geom::{Box2D, Point, Rect, point};

// Corrections smaller than this are float noise from a previous constrain pass.
const CONSTRAIN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.k.is_finite() && self.k > 0.0 && self.x.is_finite() && self.y.is_finite()
    }

    pub fn apply(&self, p: Point) -> Point {
        point(self.apply_x(p.x), self.apply_y(p.y))
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.k + self.x
    }

    pub fn apply_y(&self, y: f64) -> f64 {
        y * self.k + self.y
    }

    pub fn invert(&self, p: Point) -> Point {
        point(self.invert_x(p.x), self.invert_y(p.y))
    }

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.x) / self.k
    }

    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.y) / self.k
    }

    /// Multiplies the scale factor, keeping the translation.
    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.k * k, self.x, self.y)
    }

    /// Translates by `(x, y)` in pre-scale units.
    pub fn translate(&self, x: f64, y: f64) -> Self {
        Self::new(self.k, self.x + self.k * x, self.y + self.k * y)
    }

    /// The transform with scale `k` that keeps the base point `anchor` under pixel `at`.
    pub fn anchored(&self, k: f64, at: Point, anchor: Point) -> Self {
        Self::new(k, at.x - anchor.x * k, at.y - anchor.y * k)
    }
}

/// Wheel `deltaMode` of a DOM wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

/// A raw interaction, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ZoomEvent {
    /// Scales by `2^(-delta_y * mode_factor)` around the pointer.
    Wheel {
        point: Point,
        delta_y: f64,
        #[serde(default)]
        delta_mode: WheelDeltaMode,
        /// Pinch gestures arrive as ctrl+wheel and zoom ten times faster.
        #[serde(default)]
        ctrl: bool,
    },
    /// Pointer moved by `(dx, dy)` while pressed; `origin` is where the move started.
    Drag { origin: Point, dx: f64, dy: f64 },
    /// Multiplies the scale around `anchor`, or the centre of the extent.
    ScaleBy { factor: f64, anchor: Option<Point> },
    /// Replaces the transform outright (still clamped and constrained).
    Set { transform: ZoomTransform },
}

impl ZoomEvent {
    /// Where the event happened, when it has a pointer position.
    pub fn origin(&self) -> Option<Point> {
        match *self {
            ZoomEvent::Wheel { point, .. } => Some(point),
            ZoomEvent::Drag { origin, .. } => Some(origin),
            ZoomEvent::ScaleBy { anchor, .. } => anchor,
            ZoomEvent::Set { .. } => None,
        }
    }
}

pub fn wheel_delta(delta_y: f64, mode: WheelDeltaMode, ctrl: bool) -> f64 {
    let mode_factor = match mode {
        WheelDeltaMode::Line => 0.05,
        WheelDeltaMode::Page => 1.0,
        WheelDeltaMode::Pixel => 0.002,
    };
    -delta_y * mode_factor * if ctrl { 10.0 } else { 1.0 }
}

/// Limits applied after every transform update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConstraints {
    /// `[k_min, k_max]`.
    pub scale_extent: [f64; 2],
    /// Base-pixel box the visible window may not be panned out of.
    pub translate_extent: Box2D,
    /// The visible window, in container pixels.
    pub extent: Box2D,
}

impl Default for ZoomConstraints {
    fn default() -> Self {
        Self {
            scale_extent: [0.0, f64::INFINITY],
            translate_extent: unbounded_box(),
            extent: Box2D::zero(),
        }
    }
}

pub fn unbounded_box() -> Box2D {
    Box2D::new(
        point(f64::NEG_INFINITY, f64::NEG_INFINITY),
        point(f64::INFINITY, f64::INFINITY),
    )
}

impl ZoomConstraints {
    pub fn new(scale_extent: [f64; 2], translate_extent: Box2D, extent: Box2D) -> Self {
        Self {
            scale_extent,
            translate_extent,
            extent,
        }
    }

    /// Constraints for a driver that owns one axis of `strip`: the strip is both the
    /// window and the pannable range along that axis, the other axis is unbounded.
    pub fn for_axis_strip(axis: DriverAxis, strip: Rect, scale_extent: [f64; 2]) -> Self {
        let b = strip.to_box2d();
        let free = unbounded_box();
        let translate_extent = match axis {
            DriverAxis::X => Box2D::new(point(b.min.x, free.min.y), point(b.max.x, free.max.y)),
            DriverAxis::Y => Box2D::new(point(free.min.x, b.min.y), point(free.max.x, b.max.y)),
            DriverAxis::Both => b,
        };
        Self::new(scale_extent, translate_extent, b)
    }

    pub fn clamp_scale(&self, k: f64) -> f64 {
        let [k_min, k_max] = self.scale_extent;
        k_max.min(k_min.max(k))
    }

    pub fn centre(&self) -> Point {
        self.extent.center()
    }

    /// Smallest translation that brings the window back inside the translate extent,
    /// leaving `k` alone.
    pub fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        let e = self.extent;
        let te = self.translate_extent;
        let dx0 = t.invert_x(e.min.x) - te.min.x;
        let dx1 = t.invert_x(e.max.x) - te.max.x;
        let dy0 = t.invert_y(e.min.y) - te.min.y;
        let dy1 = t.invert_y(e.max.y) - te.max.y;
        t.translate(axis_correction(dx0, dx1), axis_correction(dy0, dy1))
    }

    /// Scale clamp followed by bounds constrain.
    pub fn normalize(&self, t: ZoomTransform) -> ZoomTransform {
        let clamped = ZoomTransform::new(self.clamp_scale(t.k), t.x, t.y);
        self.constrain(clamped)
    }

    /// The transform `event` produces on top of `previous`. Non-finite results leave
    /// `previous` in place.
    pub fn compose(&self, previous: ZoomTransform, event: &ZoomEvent) -> ZoomTransform {
        let proposed = match *event {
            ZoomEvent::Wheel {
                point: at,
                delta_y,
                delta_mode,
                ctrl,
            } => {
                let k = self.clamp_scale(previous.k * 2f64.powf(wheel_delta(delta_y, delta_mode, ctrl)));
                previous.anchored(k, at, previous.invert(at))
            }
            ZoomEvent::Drag { dx, dy, .. } => {
                ZoomTransform::new(previous.k, previous.x + dx, previous.y + dy)
            }
            ZoomEvent::ScaleBy { factor, anchor } => {
                let at = anchor.unwrap_or_else(|| self.centre());
                let k = self.clamp_scale(previous.k * factor);
                previous.anchored(k, at, previous.invert(at))
            }
            ZoomEvent::Set { transform } => transform,
        };

        let next = self.normalize(proposed);
        if next.is_finite() {
            next
        } else {
            tracing::warn!(?event, "discarding non-finite zoom transform");
            previous
        }
    }
}

fn axis_correction(d0: f64, d1: f64) -> f64 {
    let c = if d1 > d0 {
        d0
    } else {
        let near = d0.min(0.0);
        if near != 0.0 { near } else { d1.max(0.0) }
    };
    if !c.is_finite() || c.abs() < CONSTRAIN_EPSILON {
        0.0
    } else {
        c
    }
}

/// Which component(s) of a transform a driver owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverAxis {
    X,
    Y,
    Both,
}

/// One independent zoom behaviour and its current transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomDriver {
    axis: DriverAxis,
    transform: ZoomTransform,
    constraints: ZoomConstraints,
}

impl ZoomDriver {
    pub fn new(axis: DriverAxis, constraints: ZoomConstraints) -> Self {
        Self {
            axis,
            transform: ZoomTransform::IDENTITY,
            constraints,
        }
    }

    pub fn axis(&self) -> DriverAxis {
        self.axis
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn constraints(&self) -> &ZoomConstraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: ZoomConstraints) {
        self.constraints = constraints;
    }

    /// Puts the driver back at `transform`, clamped and constrained.
    pub fn reset(&mut self, transform: ZoomTransform) {
        let next = self.constraints.normalize(transform);
        self.transform = if next.is_finite() {
            next
        } else {
            ZoomTransform::IDENTITY
        };
    }

    /// Applies `event`. Single-axis drivers keep the other axis' translation as it was.
    pub fn apply(&mut self, event: &ZoomEvent) -> ZoomTransform {
        let mut next = self.constraints.compose(self.transform, event);
        match self.axis {
            DriverAxis::X => next.y = self.transform.y,
            DriverAxis::Y => next.x = self.transform.x,
            DriverAxis::Both => {}
        }
        if next != self.transform {
            tracing::trace!(axis = ?self.axis, k = next.k, x = next.x, y = next.y, "zoom");
        }
        self.transform = next;
        next
    }
}

/// The transforms currently applied to each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoomState {
    pub x: ZoomTransform,
    pub y: ZoomTransform,
}

/// Where a combined-driver event is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoomRoute {
    X,
    Y,
    Both,
    Ignore,
}

/// Screen regions used to route combined events: the axis strips and the plotting area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomRegions {
    pub x_strip: Rect,
    pub y_strip: Rect,
    pub content: Rect,
}

impl ZoomRegions {
    pub fn route(&self, origin: Option<Point>) -> ZoomRoute {
        let Some(p) = origin else {
            return ZoomRoute::Both;
        };
        if self.x_strip.contains(p) {
            ZoomRoute::X
        } else if self.y_strip.contains(p) {
            ZoomRoute::Y
        } else if self.content.contains(p) {
            ZoomRoute::Both
        } else {
            ZoomRoute::Ignore
        }
    }
}

/// How a chart's axes share zoom state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomLinkage {
    /// One transform drives both axes.
    Linked(ZoomDriver),
    /// Each axis has its own driver; combined events are routed by pointer origin.
    PerAxis { x: ZoomDriver, y: ZoomDriver },
}

impl ZoomLinkage {
    pub fn state(&self) -> ZoomState {
        match self {
            ZoomLinkage::Linked(d) => ZoomState {
                x: d.transform(),
                y: d.transform(),
            },
            ZoomLinkage::PerAxis { x, y } => ZoomState {
                x: x.transform(),
                y: y.transform(),
            },
        }
    }

    pub fn reset(&mut self, identity: ZoomTransform) {
        match self {
            ZoomLinkage::Linked(d) => d.reset(identity),
            ZoomLinkage::PerAxis { x, y } => {
                x.reset(identity);
                y.reset(identity);
            }
        }
    }

    /// Sends `event` to `driver`. `Both` on a per-axis linkage is routed through `regions`.
    pub fn apply(&mut self, driver: DriverAxis, event: &ZoomEvent, regions: &ZoomRegions) -> ZoomState {
        match self {
            ZoomLinkage::Linked(d) => {
                d.apply(event);
            }
            ZoomLinkage::PerAxis { x, y } => {
                let route = match driver {
                    DriverAxis::X => ZoomRoute::X,
                    DriverAxis::Y => ZoomRoute::Y,
                    DriverAxis::Both => regions.route(event.origin()),
                };
                match route {
                    ZoomRoute::X => {
                        x.apply(event);
                    }
                    ZoomRoute::Y => {
                        y.apply(event);
                    }
                    ZoomRoute::Both => {
                        x.apply(event);
                        y.apply(event);
                    }
                    ZoomRoute::Ignore => {}
                }
            }
        }
        self.state()
    }
}
