//! Effective (zoomed) scales and pixel inversion, including heatmap grid addressing.

use kestrel_scale::{DomainValue, Scale};
use serde::{Deserialize, Serialize};

use crate::axis::Orientation;
use crate::error::{Error, Result};
use crate::geom::{Box2D, CanvasArea, Point, Rect, box_from_corners, point};
use crate::zoom::ZoomTransform;

/// Cell size and the gap between cells, in unzoomed pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub cell_size: f64,
    pub spacing: f64,
}

impl GridLayout {
    pub fn new(cell_size: f64, spacing: f64) -> Self {
        Self { cell_size, spacing }
    }

    pub fn unit_size(&self) -> f64 {
        self.cell_size + self.spacing
    }

    /// Whether `offset` (pixels from the grid origin along one axis) lands inside a cell
    /// whose pitch is `zoomed_unit`. The gap keeps its unzoomed width.
    pub fn contains_offset(&self, offset: f64, zoomed_unit: f64) -> bool {
        if !(zoomed_unit > 0.0) || !offset.is_finite() {
            return false;
        }
        let margin = self.spacing / 2.0;
        let zoomed_cell = zoomed_unit - self.spacing;
        let r = offset % zoomed_unit;
        r > margin && r < zoomed_cell + margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridIndex {
    pub row: i64,
    pub col: i64,
}

impl GridIndex {
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

/// Addressable grid: the layout plus the inclusive row and column index ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub layout: GridLayout,
    pub rows: [i64; 2],
    pub cols: [i64; 2],
}

impl GridSpec {
    pub fn contains(&self, index: GridIndex) -> bool {
        index.row >= self.rows[0]
            && index.row <= self.rows[1]
            && index.col >= self.cols[0]
            && index.col <= self.cols[1]
    }

    pub fn clamp(&self, index: GridIndex) -> GridIndex {
        GridIndex::new(
            index.row.max(self.rows[0]).min(self.rows[1]),
            index.col.max(self.cols[0]).min(self.cols[1]),
        )
    }

    /// Every index in the inclusive rectangle spanned by `a` and `b`, row-major.
    pub fn cells_between(&self, a: GridIndex, b: GridIndex) -> Vec<GridIndex> {
        let (r0, r1) = (a.row.min(b.row), a.row.max(b.row));
        let (c0, c1) = (a.col.min(b.col), a.col.max(b.col));
        let mut out = Vec::with_capacity(((r1 - r0 + 1) * (c1 - c0 + 1)).max(0) as usize);
        for row in r0..=r1 {
            for col in c0..=c1 {
                out.push(GridIndex::new(row, col));
            }
        }
        out
    }
}

/// Result of addressing a pixel on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridHit {
    pub index: GridIndex,
    /// The index lies within the configured row/column ranges.
    pub in_domain: bool,
    pub inside_x: bool,
    pub inside_y: bool,
}

impl GridHit {
    pub fn in_cell(&self) -> bool {
        self.inside_x && self.inside_y
    }

    pub fn is_hit(&self) -> bool {
        self.in_domain && self.in_cell()
    }
}

/// A base scale together with the zoom transform applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisView {
    pub orientation: Orientation,
    pub base: Scale,
    pub transform: ZoomTransform,
    /// Marks plotted against this axis are clipped to the canvas.
    pub clipped: bool,
}

impl AxisView {
    fn translation(&self) -> f64 {
        match self.orientation {
            Orientation::X => self.transform.x,
            Orientation::Y => self.transform.y,
        }
    }

    /// The base scale with its range mapped through `pixel * k + t`. A collapsed range or
    /// a broken transform yields the base scale unchanged.
    pub fn effective_scale(&self) -> Scale {
        if self.base.range_length() == 0.0 || !self.transform.is_finite() {
            return self.base.clone();
        }
        self.base.rescaled(self.transform.k, self.translation())
    }
}

/// Immutable snapshot of everything needed to map between pixels and data.
///
/// Renderers and hit-testers read from the same snapshot, so they always agree on where a
/// value is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportMapper {
    pub canvas: CanvasArea,
    pub x: AxisView,
    pub y: AxisView,
    pub grid: Option<GridSpec>,
}

impl ViewportMapper {
    pub fn axis(&self, orientation: Orientation) -> &AxisView {
        match orientation {
            Orientation::X => &self.x,
            Orientation::Y => &self.y,
        }
    }

    pub fn effective_scale(&self, orientation: Orientation) -> Scale {
        self.axis(orientation).effective_scale()
    }

    /// Clip rectangle for marks drawn along `orientation`: the canvas when the axis is
    /// clipped, `None` when marks may spill over it.
    pub fn clip_rect(&self, orientation: Orientation) -> Option<Rect> {
        self.axis(orientation).clipped.then(|| self.canvas.rect())
    }

    pub fn invert(&self, orientation: Orientation, pixel: f64) -> Result<DomainValue> {
        Ok(self.effective_scale(orientation).to_domain(pixel)?)
    }

    /// Domain interval currently visible across the canvas, for continuous axes.
    pub fn visible_domain(&self, orientation: Orientation) -> Option<[f64; 2]> {
        let scale = self.effective_scale(orientation);
        let [p0, p1] = match orientation {
            Orientation::X => [self.canvas.left(), self.canvas.right()],
            Orientation::Y => [self.canvas.bottom(), self.canvas.top()],
        };
        Some([scale.invert_f64(p0).ok()?, scale.invert_f64(p1).ok()?])
    }

    fn grid(&self) -> Result<&GridSpec> {
        self.grid.as_ref().ok_or(Error::GridNotConfigured)
    }

    pub fn invert_row(&self, pixel_y: f64) -> Result<i64> {
        Ok(round_index(self.effective_scale(Orientation::Y).invert_f64(pixel_y)?))
    }

    pub fn invert_col(&self, pixel_x: f64) -> Result<i64> {
        Ok(round_index(self.effective_scale(Orientation::X).invert_f64(pixel_x)?))
    }

    /// Pitch of one grid unit after zooming.
    pub fn zoomed_unit_size(&self) -> Result<f64> {
        let x = self.effective_scale(Orientation::X);
        let a = x.to_pixel(&DomainValue::Number(1.0))?;
        let b = x.to_pixel(&DomainValue::Number(2.0))?;
        Ok((b - a).abs())
    }

    /// Per-axis "inside a cell" flags for a pixel position.
    pub fn in_grid_range(&self, pixel: Point) -> Result<(bool, bool)> {
        let grid = self.grid()?;
        let unit = self.zoomed_unit_size()?;
        let tx = self.x.transform;
        let ty = self.y.transform;
        let ox = pixel.x - self.canvas.left() * tx.k - tx.x;
        let oy = pixel.y - self.canvas.top() * ty.k - ty.y;
        Ok((
            grid.layout.contains_offset(ox, unit),
            grid.layout.contains_offset(oy, unit),
        ))
    }

    pub fn grid_hit(&self, pixel: Point) -> Result<GridHit> {
        let grid = self.grid()?;
        let index = GridIndex::new(self.invert_row(pixel.y)?, self.invert_col(pixel.x)?);
        let (inside_x, inside_y) = self.in_grid_range(pixel)?;
        Ok(GridHit {
            index,
            in_domain: grid.contains(index),
            inside_x,
            inside_y,
        })
    }

    /// The cell under a pixel, or `None` for gaps and positions outside the grid domain.
    pub fn invert_grid_cell(&self, pixel: Point) -> Result<Option<GridIndex>> {
        let hit = self.grid_hit(pixel)?;
        Ok(hit.is_hit().then_some(hit.index))
    }

    /// Every cell touched by a pixel rectangle, with the corners clamped to the grid domain.
    pub fn invert_range(&self, rect: Box2D) -> Result<Vec<GridIndex>> {
        let grid = self.grid()?;
        let rect = box_from_corners(rect.min, rect.max);
        let a = grid.clamp(GridIndex::new(
            self.invert_row(rect.min.y)?,
            self.invert_col(rect.min.x)?,
        ));
        let b = grid.clamp(GridIndex::new(
            self.invert_row(rect.max.y)?,
            self.invert_col(rect.max.x)?,
        ));
        Ok(grid.cells_between(a, b))
    }

    /// Brush selection: corners resting in a gap are nudged one spacing towards the inside
    /// of the rectangle before inverting.
    pub fn brush_cells(&self, a: Point, b: Point) -> Result<Vec<GridIndex>> {
        let spacing = self.grid()?.layout.spacing;
        let rect = box_from_corners(a, b);
        let mut min = rect.min;
        let mut max = rect.max;

        let (in_x, in_y) = self.in_grid_range(min)?;
        if !in_x {
            min.x += spacing;
        }
        if !in_y {
            min.y += spacing;
        }
        let (in_x, in_y) = self.in_grid_range(max)?;
        if !in_x {
            max.x -= spacing;
        }
        if !in_y {
            max.y -= spacing;
        }
        self.invert_range(Box2D::new(point(min.x, min.y), point(max.x, max.y)))
    }
}

fn round_index(v: f64) -> i64 {
    if v.is_finite() {
        // JS Math.round: halves go up.
        (v + 0.5).floor() as i64
    } else {
        0
    }
}
