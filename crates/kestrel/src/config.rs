//! Chart options and their layered resolution.
//!
//! Hosts pass options as loosely-typed JSON. [`resolve_options`] deep-merges them over the
//! defaults of the chart kind and deserializes the result once; the engine never consults
//! defaults again after that.

use kestrel_scale::TimePrecision;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::axis::{AxisPosition, AxisType};
use crate::error::Result;
use crate::geom::Insets;

pub const DEFAULT_FONT_FAMILY: &str = "Google Sans";
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Bar,
    Heatmap,
    StepLine,
    Sunburst,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Heatmap => "heatmap",
            ChartKind::StepLine => "stepLine",
            ChartKind::Sunburst => "sunburst",
        }
    }

    /// Whether axis ranges snap to whole pixels.
    pub fn rounds_ranges(self) -> bool {
        matches!(self, ChartKind::Bar | ChartKind::StepLine)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarLayout {
    #[default]
    Grouped,
    Stacked,
}

/// A zoom limit: `true` is unbounded, `false` pins the limit to 1, a number is used as is,
/// and a time precision is converted once the axis domain is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoomBound {
    Flag(bool),
    Factor(f64),
    Precision(TimePrecision),
}

impl Default for ZoomBound {
    fn default() -> Self {
        ZoomBound::Flag(false)
    }
}

impl ZoomBound {
    pub fn boundary(self) -> f64 {
        match self {
            ZoomBound::Flag(true) => f64::INFINITY,
            ZoomBound::Flag(false) => 1.0,
            ZoomBound::Factor(k) if k.is_finite() && k > 0.0 => k,
            ZoomBound::Factor(_) => 1.0,
            ZoomBound::Precision(_) => 1.0,
        }
    }

    pub fn precision(self) -> Option<TimePrecision> {
        match self {
            ZoomBound::Precision(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontOptions {
    #[serde(rename = "font-family", alias = "family")]
    pub family: String,
    #[serde(rename = "font-size", alias = "size")]
    pub size: f64,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY.to_string(),
            size: DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOptions {
    #[serde(rename = "type")]
    pub axis_type: Option<AxisType>,
    pub position: Option<AxisPosition>,
    /// Lower domain override. Dates are epoch milliseconds.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_zoom: Option<ZoomBound>,
    pub max_zoom: Option<ZoomBound>,
    /// Minimum gap between tick labels, in pixels.
    pub padding: f64,
    pub font: FontOptions,
    /// Fixed `[first, last]` grid index range (heatmap).
    pub domain: Option<[f64; 2]>,
    /// Clip marks plotted along this axis to the canvas.
    pub clipped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    pub padding: Insets,
    pub min_zoom: ZoomBound,
    pub max_zoom: ZoomBound,
    pub x_axis: AxisOptions,
    pub y_axis: AxisOptions,
    pub layout: BarLayout,
    pub max_band_width: f64,
    pub grid_size: f64,
    pub grid_spacing: f64,
    pub font: FontOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            padding: Insets::default(),
            min_zoom: ZoomBound::default(),
            max_zoom: ZoomBound::default(),
            x_axis: AxisOptions::default(),
            y_axis: AxisOptions::default(),
            layout: BarLayout::Grouped,
            max_band_width: 100.0,
            grid_size: 32.0,
            grid_spacing: 4.0,
            font: FontOptions::default(),
        }
    }
}

impl ChartOptions {
    /// The axis-level bound when set, otherwise the chart-level one.
    pub fn zoom_bounds(&self, axis: &AxisOptions) -> (ZoomBound, ZoomBound) {
        (
            axis.min_zoom.unwrap_or(self.min_zoom),
            axis.max_zoom.unwrap_or(self.max_zoom),
        )
    }
}

/// Default options for `kind`, as JSON so callers can inspect or extend them.
pub fn default_options(kind: ChartKind) -> Value {
    let font = json!({ "font-family": DEFAULT_FONT_FAMILY, "font-size": DEFAULT_FONT_SIZE });
    match kind {
        ChartKind::Bar => json!({
            "padding": { "top": 10, "right": 0, "bottom": 30, "left": 80 },
            "layout": "grouped",
            "maxBandWidth": 100,
            "xAxis": {
                "type": "string", "clipped": true, "font": font,
                "minZoom": 1, "maxZoom": 10, "padding": 10, "position": "bottom"
            },
            "yAxis": {
                "type": "number", "clipped": false, "font": font,
                "minZoom": 1, "maxZoom": 1, "padding": 10, "position": "left"
            }
        }),
        ChartKind::Heatmap => json!({
            "gridSpacing": 4,
            "gridSize": 32,
            "padding": { "top": 40, "right": 0, "bottom": 0, "left": 50 },
            "minZoom": 0.5,
            "maxZoom": 4,
            "xAxis": {
                "type": "number", "clipped": true, "font": font, "padding": 10, "position": "top"
            },
            "yAxis": {
                "type": "number", "clipped": false, "font": font, "padding": 10, "position": "left"
            }
        }),
        ChartKind::StepLine => json!({
            "padding": { "top": 0, "right": 0, "bottom": 40, "left": 50 },
            "minZoom": false,
            "maxZoom": false,
            "xAxis": { "clipped": true, "font": font, "padding": 10, "position": "bottom" },
            "yAxis": { "clipped": false, "font": font, "padding": 10, "position": "left" }
        }),
        ChartKind::Sunburst => json!({
            "padding": { "top": 10, "right": 10, "bottom": 10, "left": 10 },
            "font": { "font-size": 10 }
        }),
    }
}

/// `explicit` layered over the defaults of `kind`.
pub fn resolve_options(kind: ChartKind, explicit: &Value) -> Result<ChartOptions> {
    let mut merged = default_options(kind);
    deep_merge_value(&mut merged, explicit);
    let options = serde_json::from_value(merged)?;
    tracing::debug!(kind = kind.as_str(), "resolved chart options");
    Ok(options)
}

/// Objects merge key by key; any other value replaces the base. `null` keeps the base.
pub fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_override_nested_defaults() {
        let opts = resolve_options(
            ChartKind::Bar,
            &json!({ "padding": { "left": 20 }, "xAxis": { "maxZoom": 4 } }),
        )
        .unwrap();
        assert_eq!(opts.padding, Insets::new(10.0, 0.0, 30.0, 20.0));
        assert_eq!(opts.x_axis.max_zoom, Some(ZoomBound::Factor(4.0)));
        assert_eq!(opts.x_axis.min_zoom, Some(ZoomBound::Factor(1.0)));
        assert_eq!(opts.x_axis.font.size, 14.0);
        assert_eq!(opts.x_axis.axis_type, Some(AxisType::String));
    }

    #[test]
    fn zoom_bounds_accept_flags_numbers_and_precisions() {
        let bounds: Vec<ZoomBound> =
            serde_json::from_value(json!([true, false, 2.5, "minute"])).unwrap();
        assert_eq!(bounds[0].boundary(), f64::INFINITY);
        assert_eq!(bounds[1].boundary(), 1.0);
        assert_eq!(bounds[2].boundary(), 2.5);
        assert_eq!(bounds[3].precision(), Some(TimePrecision::Minute));
        assert_eq!(bounds[3].boundary(), 1.0);
    }

    #[test]
    fn null_keeps_default_and_bad_types_are_rejected() {
        let opts = resolve_options(ChartKind::Heatmap, &json!({ "gridSize": null })).unwrap();
        assert_eq!(opts.grid_size, 32.0);
        assert!(resolve_options(ChartKind::Heatmap, &json!({ "xAxis": { "position": "middle" } })).is_err());
    }
}
