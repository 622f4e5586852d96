//! The per-chart engine: owns axes, zoom drivers and redraw scheduling, and answers the
//! mapping and hit-testing queries renderers ask.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use kestrel_scale::time::epoch_ms;
use kestrel_scale::{DomainValue, Scale, ScaleKind, TimeUnit, time_tick_count};
use serde_json::Value;
use uuid::Uuid;

use crate::axis::{Axis, Orientation};
use crate::config::{AxisOptions, ChartKind, ChartOptions, deep_merge_value, resolve_options};
use crate::domain::{
    DomainInput, GridAxis, apply_bar_value_domain, apply_domain, band_padding, band_scale_extent,
    grid_scale_extent, value_extent,
};
use crate::error::{Error, Result};
use crate::geom::{Box2D, CanvasArea, Point, Size, point};
use crate::schedule::{RedrawBatch, RedrawReason, RedrawScheduler};
use crate::selection::{ClickTarget, SelectionModel, apply_brush, apply_click, apply_group_click};
use crate::sunburst::{SunburstLayout, SunburstNode, centre_of};
use crate::text::{DeterministicLabelMeasurer, LabelMeasurer};
use crate::ticks::{TickPlan, TickRequest, plan_tick_count, plan_ticks};
use crate::viewport::{AxisView, GridIndex, GridLayout, GridSpec, ViewportMapper};
use crate::zoom::{
    DriverAxis, ZoomConstraints, ZoomDriver, ZoomEvent, ZoomLinkage, ZoomRegions, ZoomState,
    ZoomTransform,
};

/// Opaque per-instance identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartId(Uuid);

impl ChartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

pub type SharedMeasurer = Arc<dyn LabelMeasurer + Send + Sync>;

pub struct ChartEngine {
    id: ChartId,
    kind: ChartKind,
    options: ChartOptions,
    canvas: CanvasArea,
    x_axis: Axis,
    y_axis: Axis,
    zoom: ZoomLinkage,
    regions: ZoomRegions,
    grid: Option<GridSpec>,
    measurer: SharedMeasurer,
    scheduler: RedrawScheduler,
    torn_down: bool,
}

impl fmt::Debug for ChartEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartEngine")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("canvas", &self.canvas)
            .field("zoom", &self.zoom.state())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl ChartEngine {
    /// Resolves `options` over the defaults of `kind` and configures both axes.
    pub fn new(kind: ChartKind, options: &Value) -> Result<Self> {
        let options = resolve_options(kind, options)?;
        let mut x_axis = Axis::configure(Orientation::X, &options.x_axis)?;
        let mut y_axis = Axis::configure(Orientation::Y, &options.y_axis)?;
        x_axis.scale.set_round(kind.rounds_ranges());
        y_axis.scale.set_round(kind.rounds_ranges());

        let zoom = match kind {
            ChartKind::Heatmap => {
                ZoomLinkage::Linked(ZoomDriver::new(DriverAxis::Both, ZoomConstraints::default()))
            }
            _ => ZoomLinkage::PerAxis {
                x: ZoomDriver::new(DriverAxis::X, ZoomConstraints::default()),
                y: ZoomDriver::new(DriverAxis::Y, ZoomConstraints::default()),
            },
        };

        let engine = Self {
            id: ChartId::new(),
            kind,
            options,
            canvas: CanvasArea::default(),
            x_axis,
            y_axis,
            zoom,
            regions: ZoomRegions::default(),
            grid: None,
            measurer: Arc::new(DeterministicLabelMeasurer::default()),
            scheduler: RedrawScheduler::new(),
            torn_down: false,
        };
        tracing::debug!(id = %engine.id, kind = kind.as_str(), "chart created");
        Ok(engine)
    }

    /// Replaces the label measurer used for tick planning.
    pub fn with_measurer(mut self, measurer: SharedMeasurer) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn canvas_area(&self) -> CanvasArea {
        self.canvas
    }

    pub fn axis(&self, orientation: Orientation) -> &Axis {
        match orientation {
            Orientation::X => &self.x_axis,
            Orientation::Y => &self.y_axis,
        }
    }

    fn axis_mut(&mut self, orientation: Orientation) -> &mut Axis {
        match orientation {
            Orientation::X => &mut self.x_axis,
            Orientation::Y => &mut self.y_axis,
        }
    }

    pub fn grid(&self) -> Option<&GridSpec> {
        self.grid.as_ref()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom.state()
    }

    pub fn zoom_linkage(&self) -> &ZoomLinkage {
        &self.zoom
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn ensure_live(&self) -> Result<()> {
        if self.torn_down {
            return Err(Error::TornDown { id: self.id });
        }
        Ok(())
    }

    /// Merges `options` over the current options of one axis and rebuilds it. The scale
    /// is kept unless the axis type changes; zoom is reset either way.
    pub fn configure_axis(&mut self, orientation: Orientation, options: &Value) -> Result<&Scale> {
        self.ensure_live()?;
        let mut merged = serde_json::to_value(&self.axis(orientation).options)?;
        deep_merge_value(&mut merged, options);
        let merged: AxisOptions = serde_json::from_value(merged)?;

        let round = self.kind.rounds_ranges();
        let axis = self.axis_mut(orientation);
        let replaced = axis.reconfigure(&merged)?;
        if replaced {
            axis.scale.set_round(round);
        }
        match orientation {
            Orientation::X => self.options.x_axis = merged,
            Orientation::Y => self.options.y_axis = merged,
        }
        tracing::debug!(
            id = %self.id,
            %orientation,
            kind = %self.axis(orientation).scale.kind(),
            replaced,
            "axis configured"
        );

        self.layout();
        self.reset_zoom();
        self.request(RedrawReason::Render);
        Ok(&self.axis(orientation).scale)
    }

    /// Recomputes the domain of one axis from data. `min`/`max` fall back to the axis
    /// options. Heatmap axes take the rounded data extent as their cell index range. The
    /// value axis of a bar chart follows the stacked/grouped layout and always includes 0;
    /// plain values count as a single series there.
    pub fn update_domain(
        &mut self,
        orientation: Orientation,
        input: &DomainInput,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<()> {
        self.ensure_live()?;
        let kind = self.kind;
        let layout = self.options.layout;
        let axis = self.axis_mut(orientation);
        let min = min.or(axis.options.min);
        let max = max.or(axis.options.max);

        if kind == ChartKind::Heatmap {
            let DomainInput::Values(values) = input else {
                return Err(kestrel_scale::Error::DomainKindMismatch {
                    expected: axis.scale.kind(),
                    found: input.kind_name(),
                }
                .into());
            };
            let extent = value_extent(values.iter().copied().chain(min).chain(max));
            axis.options.domain = Some(extent.unwrap_or([0.0, 0.0]));
        } else if let (ChartKind::Bar, ScaleKind::Linear, Some(rows)) =
            (kind, axis.scale.kind(), input.bar_rows())
        {
            apply_bar_value_domain(&mut axis.scale, &rows, layout, min, max)?;
        } else {
            apply_domain(&mut axis.scale, input, min, max)?;
        }

        self.layout();
        self.reset_zoom();
        self.request(RedrawReason::Render);
        Ok(())
    }

    /// Sets the container size. Ranges, zoom extents and the grid are rebuilt and the zoom
    /// is reset to its identity.
    pub fn set_viewport(&mut self, container: Size) -> Result<()> {
        self.ensure_live()?;
        self.canvas = CanvasArea::from_container(container, self.options.padding);
        if self.canvas.is_collapsed() {
            tracing::warn!(id = %self.id, ?container, "canvas collapsed to zero size");
        }
        self.layout();
        self.reset_zoom();
        tracing::debug!(
            id = %self.id,
            width = self.canvas.width,
            height = self.canvas.height,
            "viewport set"
        );
        self.request(RedrawReason::Render);
        Ok(())
    }

    /// Feeds one interaction to `driver` and returns the resulting transforms.
    pub fn apply_zoom_delta(&mut self, driver: DriverAxis, event: &ZoomEvent) -> Result<ZoomState> {
        self.ensure_live()?;
        let before = self.zoom.state();
        let after = self.zoom.apply(driver, event, &self.regions);
        if after != before {
            self.request(RedrawReason::Render);
        }
        Ok(after)
    }

    pub fn zoom_in(&mut self, driver: DriverAxis) -> Result<ZoomState> {
        self.scale_by(driver, 2.0)
    }

    pub fn zoom_out(&mut self, driver: DriverAxis) -> Result<ZoomState> {
        self.scale_by(driver, 0.5)
    }

    fn scale_by(&mut self, driver: DriverAxis, factor: f64) -> Result<ZoomState> {
        self.apply_zoom_delta(
            driver,
            &ZoomEvent::ScaleBy {
                factor,
                anchor: None,
            },
        )
    }

    /// Immutable mapping state for one render pass.
    pub fn snapshot(&self) -> ViewportMapper {
        let state = self.zoom.state();
        ViewportMapper {
            canvas: self.canvas,
            x: AxisView {
                orientation: Orientation::X,
                base: self.x_axis.scale.clone(),
                transform: state.x,
                clipped: self.x_axis.options.clipped,
            },
            y: AxisView {
                orientation: Orientation::Y,
                base: self.y_axis.scale.clone(),
                transform: state.y,
                clipped: self.y_axis.options.clipped,
            },
            grid: self.grid,
        }
    }

    pub fn effective_scale(&self, orientation: Orientation) -> Scale {
        self.snapshot().effective_scale(orientation)
    }

    pub fn invert(&self, orientation: Orientation, pixel: f64) -> Result<DomainValue> {
        self.snapshot().invert(orientation, pixel)
    }

    pub fn invert_grid_cell(&self, pixel: Point) -> Result<Option<GridIndex>> {
        self.snapshot().invert_grid_cell(pixel)
    }

    pub fn invert_range(&self, rect: Box2D) -> Result<Vec<GridIndex>> {
        self.snapshot().invert_range(rect)
    }

    /// Ticks for one axis at the current zoom.
    pub fn plan_ticks(&self, orientation: Orientation) -> TickPlan {
        let axis = self.axis(orientation);
        let state = self.zoom.state();
        let k = match orientation {
            Orientation::X => state.x.k,
            Orientation::Y => state.y.k,
        };
        let request = self.tick_request(axis, k);
        plan_ticks(&self.effective_scale(orientation), &request, self.measurer.as_ref())
    }

    // The finest precision the axis may show: the maxZoom precision when set, else the
    // minZoom one. Reading maxZoom first keeps fully zoomed ticks at the unit the zoom
    // limit was derived from.
    fn tick_request<'a>(&self, axis: &'a Axis, zoom_k: f64) -> TickRequest<'a> {
        let (min_zoom, max_zoom) = self.options.zoom_bounds(&axis.options);
        TickRequest {
            orientation: axis.orientation,
            window: axis.base_range(&self.canvas),
            font: &axis.options.font,
            gap: axis.options.padding,
            zoom_k,
            min_precision: max_zoom
                .precision()
                .or(min_zoom.precision())
                .unwrap_or(TimeUnit::Millisecond),
        }
    }

    /// Bar charts: pads the category axis so bands stay near the maximum width, and caps
    /// the category zoom where a band would exceed it. Other kinds are left alone.
    pub fn apply_band_padding(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.pad_bands() {
            self.request(RedrawReason::Render);
        }
        Ok(())
    }

    fn pad_bands(&mut self) -> bool {
        let length = self.canvas.width;
        let max_band_width = self.options.max_band_width;
        let Scale::Band(band) = &mut self.x_axis.scale else {
            return false;
        };
        let (inner, outer) = band_padding(band.domain().len(), length, max_band_width);
        band.set_padding(inner, outer);
        let extent = band_scale_extent(max_band_width, band.step());
        if let ZoomLinkage::PerAxis { x, .. } = &mut self.zoom {
            let mut constraints = *x.constraints();
            constraints.scale_extent = extent;
            x.set_constraints(constraints);
            x.reset(x.transform());
        }
        true
    }

    /// Changes the heatmap cell size and spacing.
    pub fn set_grid(&mut self, layout: GridLayout) -> Result<()> {
        self.ensure_live()?;
        self.options.grid_size = layout.cell_size;
        self.options.grid_spacing = layout.spacing;
        self.layout();
        self.reset_zoom();
        self.request(RedrawReason::Render);
        Ok(())
    }

    /// Heatmap click at `pixel`.
    pub fn click(
        &mut self,
        pixel: Point,
        multi: bool,
        selection: &mut dyn SelectionModel<GridIndex>,
    ) -> Result<()> {
        self.ensure_live()?;
        let hit = self.snapshot().grid_hit(pixel)?;
        let target = if !hit.in_domain {
            ClickTarget::OutsideDomain
        } else if hit.in_cell() {
            ClickTarget::Item(hit.index)
        } else {
            ClickTarget::Gap
        };
        apply_click(selection, target, multi);
        self.request(RedrawReason::Selection);
        Ok(())
    }

    /// Heatmap brush from corner `a` to corner `b`. Returns the brushed cells.
    pub fn brush(
        &mut self,
        a: Point,
        b: Point,
        multi: bool,
        selection: &mut dyn SelectionModel<GridIndex>,
    ) -> Result<Vec<GridIndex>> {
        self.ensure_live()?;
        let cells = self.snapshot().brush_cells(a, b)?;
        apply_brush(selection, &cells, multi);
        self.request(RedrawReason::Selection);
        Ok(cells)
    }

    /// Heatmap axis tick click: an x tick addresses a column, a y tick a row.
    pub fn click_axis_tick(
        &mut self,
        orientation: Orientation,
        index: i64,
        multi: bool,
        selection: &mut dyn SelectionModel<GridIndex>,
    ) -> Result<()> {
        self.ensure_live()?;
        let grid = self.grid.ok_or(Error::GridNotConfigured)?;
        let cells: Vec<GridIndex> = match orientation {
            Orientation::X => (grid.rows[0]..=grid.rows[1])
                .map(|row| GridIndex::new(row, index))
                .collect(),
            Orientation::Y => (grid.cols[0]..=grid.cols[1])
                .map(|col| GridIndex::new(index, col))
                .collect(),
        };
        apply_group_click(selection, &cells, multi);
        self.request(RedrawReason::Selection);
        Ok(())
    }

    /// Sunburst partition sized to the current canvas.
    pub fn sunburst_layout(&self, root: &SunburstNode) -> SunburstLayout {
        SunburstLayout::partition(root, SunburstLayout::radius_for(&self.canvas))
    }

    pub fn sunburst_centre(&self) -> Point {
        centre_of(&self.canvas)
    }

    pub fn request_redraw(&mut self, reason: RedrawReason, now: Instant) {
        self.scheduler.request(reason, now);
    }

    fn request(&mut self, reason: RedrawReason) {
        self.scheduler.request(reason, Instant::now());
    }

    /// Records a container size; the viewport follows once the resize window elapses.
    pub fn observe_resize(&mut self, container: Size, now: Instant) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.scheduler.observe_resize(container, now))
    }

    /// Flushes due redraws. A due resize is applied to the viewport before returning.
    pub fn poll_redraw(&mut self, now: Instant) -> Result<Option<RedrawBatch>> {
        self.ensure_live()?;
        let Some(batch) = self.scheduler.poll(now) else {
            return Ok(None);
        };
        if let Some(size) = batch.size {
            self.set_viewport(size)?;
            // set_viewport schedules its own render; this batch already covers it.
            let _ = self.scheduler.poll(now);
        }
        Ok(Some(batch))
    }

    pub fn next_redraw_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Drops pending redraws. Every later mutating call fails with [`Error::TornDown`].
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel();
        self.torn_down = true;
        tracing::debug!(id = %self.id, "chart torn down");
    }

    fn layout(&mut self) {
        if self.kind == ChartKind::Heatmap {
            self.layout_grid();
        } else {
            self.layout_axes();
        }
        self.regions = ZoomRegions {
            x_strip: self.x_axis.strip(&self.canvas),
            y_strip: self.y_axis.strip(&self.canvas),
            content: self.canvas.rect(),
        };
    }

    fn layout_axes(&mut self) {
        let canvas = self.canvas;
        for axis in [&mut self.x_axis, &mut self.y_axis] {
            let range = axis.base_range(&canvas);
            axis.scale.set_range(range);
        }
        let x_extent = self.axis_scale_extent(Orientation::X);
        let y_extent = self.axis_scale_extent(Orientation::Y);
        if let ZoomLinkage::PerAxis { x, y } = &mut self.zoom {
            x.set_constraints(ZoomConstraints::for_axis_strip(
                DriverAxis::X,
                self.x_axis.strip(&canvas),
                x_extent,
            ));
            y.set_constraints(ZoomConstraints::for_axis_strip(
                DriverAxis::Y,
                self.y_axis.strip(&canvas),
                y_extent,
            ));
        }
        if self.kind == ChartKind::Bar {
            self.pad_bands();
        }
    }

    // Per-axis zoom limits. Time precisions become "ticks at that precision over ticks
    // that fit at identity".
    fn axis_scale_extent(&self, orientation: Orientation) -> [f64; 2] {
        let axis = self.axis(orientation);
        let (min_zoom, max_zoom) = self.options.zoom_bounds(&axis.options);
        let mut extent = [min_zoom.boundary(), max_zoom.boundary()];
        if axis.scale.kind() != ScaleKind::Time
            || (min_zoom.precision().is_none() && max_zoom.precision().is_none())
        {
            return extent;
        }
        let Some([d0, d1]) = axis.scale.continuous_domain() else {
            return extent;
        };

        let request = self.tick_request(axis, 1.0);
        let count_based = plan_tick_count(&axis.scale, &request, self.measurer.as_ref()).max(1) as f64;
        for (slot, bound) in [min_zoom, max_zoom].into_iter().enumerate() {
            if let Some(precision) = bound.precision() {
                let count = time_tick_count(epoch_ms(d0), epoch_ms(d1), precision) as f64;
                extent[slot] = count / count_based;
            }
        }
        tracing::debug!(%orientation, ?extent, "time precision zoom bounds");
        extent
    }

    fn layout_grid(&mut self) {
        let canvas = self.canvas;
        let layout = GridLayout::new(self.options.grid_size, self.options.grid_spacing);
        let unit = layout.unit_size();
        let gx = GridAxis::new(self.x_axis.options.domain, canvas.left(), canvas.width, unit);
        let gy = GridAxis::new(self.y_axis.options.domain, canvas.top(), canvas.height, unit);

        let scale_extent = grid_scale_extent(
            self.options.min_zoom.boundary(),
            self.options.max_zoom.boundary(),
            [canvas.width, canvas.height],
            [gx.data_length, gy.data_length],
        );
        let translate_extent = Box2D::new(
            point(canvas.left(), canvas.top()),
            point(canvas.left() + gx.data_length, canvas.top() + gy.data_length),
        );

        self.x_axis.scale = gx.scale.into();
        self.y_axis.scale = gy.scale.into();
        self.grid = Some(GridSpec {
            layout,
            rows: gy.indices,
            cols: gx.indices,
        });
        if let ZoomLinkage::Linked(driver) = &mut self.zoom {
            driver.set_constraints(ZoomConstraints::new(
                scale_extent,
                translate_extent,
                canvas.bounds(),
            ));
        }
    }

    fn reset_zoom(&mut self) {
        let identity = match &self.zoom {
            ZoomLinkage::Linked(driver) => {
                let c = driver.constraints();
                let k = c.scale_extent[0];
                let origin = c.translate_extent.min;
                if k.is_finite() && k > 0.0 {
                    ZoomTransform::new(k, origin.x * (1.0 - k), origin.y * (1.0 - k))
                } else {
                    ZoomTransform::IDENTITY
                }
            }
            ZoomLinkage::PerAxis { .. } => ZoomTransform::IDENTITY,
        };
        self.zoom.reset(identity);
        tracing::debug!(id = %self.id, state = ?self.zoom.state(), "zoom reset");
    }
}
