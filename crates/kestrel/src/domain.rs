//! Data to domain policies: extents with overrides, degenerate fallbacks and the chart
//! specific layouts (stacked bars, band padding, heatmap grids).

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use kestrel_scale::time::{MS_PER_DAY, epoch_ms};
use kestrel_scale::{LinearScale, Scale};

use crate::config::BarLayout;
use crate::error::Result;

const HALF_DAY_MS: f64 = (MS_PER_DAY / 2) as f64;

/// Raw values an axis domain is computed from.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainInput {
    /// Plain numbers, or epoch milliseconds for date axes.
    Values(Vec<f64>),
    Times(Vec<DateTime<Utc>>),
    Categories(Vec<String>),
    /// One row per category, one value per series (bar value axes).
    Series(Vec<Vec<f64>>),
}

impl DomainInput {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DomainInput::Values(_) => "number",
            DomainInput::Times(_) => "time",
            DomainInput::Categories(_) => "category",
            DomainInput::Series(_) => "series",
        }
    }

    fn millis(&self) -> Option<Vec<f64>> {
        match self {
            DomainInput::Values(v) => Some(v.clone()),
            DomainInput::Times(t) => Some(t.iter().map(|d| d.timestamp_millis() as f64).collect()),
            DomainInput::Categories(_) | DomainInput::Series(_) => None,
        }
    }

    /// Rows for the bar value rule: series rows as given, plain values as one series.
    pub fn bar_rows(&self) -> Option<Vec<Vec<f64>>> {
        match self {
            DomainInput::Series(rows) => Some(rows.clone()),
            DomainInput::Values(values) => Some(values.iter().map(|v| vec![*v]).collect()),
            DomainInput::Times(_) | DomainInput::Categories(_) => None,
        }
    }
}

impl From<Vec<f64>> for DomainInput {
    fn from(v: Vec<f64>) -> Self {
        DomainInput::Values(v)
    }
}

impl From<Vec<DateTime<Utc>>> for DomainInput {
    fn from(v: Vec<DateTime<Utc>>) -> Self {
        DomainInput::Times(v)
    }
}

impl From<Vec<String>> for DomainInput {
    fn from(v: Vec<String>) -> Self {
        DomainInput::Categories(v)
    }
}

/// `[min, max]` of the finite values.
pub fn value_extent<I>(values: I) -> Option<[f64; 2]>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}

// Extent widened by the overrides. Overrides never narrow the data.
fn widened(extent: Option<[f64; 2]>, min: Option<f64>, max: Option<f64>) -> Option<[f64; 2]> {
    let min = min.filter(|v| v.is_finite());
    let max = max.filter(|v| v.is_finite());
    let lo = [extent.map(|e| e[0]), min].into_iter().flatten().reduce(f64::min);
    let hi = [extent.map(|e| e[1]), max].into_iter().flatten().reduce(f64::max);
    match (lo, hi) {
        (Some(lo), Some(hi)) => Some([lo.min(hi), lo.max(hi)]),
        (Some(v), None) | (None, Some(v)) => Some([v, v]),
        (None, None) => None,
    }
}

fn with_fallback(domain: Option<[f64; 2]>, empty: [f64; 2], half_span: f64) -> [f64; 2] {
    match domain {
        None => {
            tracing::warn!("no finite values; using the default domain");
            empty
        }
        Some([lo, hi]) if lo == hi => {
            tracing::warn!(value = lo, "single-point domain widened");
            [lo - half_span, hi + half_span]
        }
        Some(d) => d,
    }
}

/// Continuous domain before nice rounding: data extent widened by the overrides, `[0, 1]`
/// when empty and `v ± 0.5` for a single value.
pub fn continuous_domain<I>(values: I, min: Option<f64>, max: Option<f64>) -> [f64; 2]
where
    I: IntoIterator<Item = f64>,
{
    with_fallback(widened(value_extent(values), min, max), [0.0, 1.0], 0.5)
}

/// Temporal domain in epoch milliseconds: one day from the epoch when empty, `t ± 12h` for
/// a single instant.
pub fn temporal_domain<I>(millis: I, min: Option<f64>, max: Option<f64>) -> [f64; 2]
where
    I: IntoIterator<Item = f64>,
{
    let representable = |ms: f64| if ms.is_finite() { epoch_ms(ms) as f64 } else { ms };
    let millis = millis.into_iter().map(representable);
    with_fallback(
        widened(value_extent(millis), min.map(representable), max.map(representable)),
        [0.0, MS_PER_DAY as f64],
        HALF_DAY_MS,
    )
}

/// Category keys in first-seen order without duplicates.
pub fn ordinal_domain<I, S>(keys: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}

/// Computes the domain of `scale` from `input` and rounds it outward.
pub fn apply_domain(
    scale: &mut Scale,
    input: &DomainInput,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<()> {
    match (&mut *scale, input) {
        (Scale::Band(band), DomainInput::Categories(keys)) => {
            band.set_domain(ordinal_domain(keys.iter().map(String::as_str)));
        }
        (Scale::Linear(linear), DomainInput::Values(values)) => {
            linear.domain = continuous_domain(values.iter().copied(), min, max);
            linear.nice(10.0);
        }
        (Scale::Linear(linear), DomainInput::Series(rows)) => {
            linear.domain = continuous_domain(rows.iter().flatten().copied(), min, max);
            linear.nice(10.0);
        }
        (Scale::Time(time), DomainInput::Values(_) | DomainInput::Times(_)) => {
            let millis = input.millis().unwrap_or_default();
            time.set_domain_ms(temporal_domain(millis, min, max));
            time.nice();
        }
        (scale, input) => {
            return Err(kestrel_scale::Error::DomainKindMismatch {
                expected: scale.kind(),
                found: input.kind_name(),
            }
            .into());
        }
    }
    tracing::debug!(kind = %scale.kind(), domain = ?scale.continuous_domain(), "domain updated");
    Ok(())
}

/// Value-axis candidates of a bar chart. Each row holds one value per series.
///
/// Stacked layouts contribute the running sum across the series of each row; grouped
/// layouts contribute the absolute value of every bar. Zero is always included.
pub fn bar_value_candidates(rows: &[Vec<f64>], layout: BarLayout) -> Vec<f64> {
    let mut out = Vec::with_capacity(rows.iter().map(Vec::len).sum::<usize>() + 1);
    for row in rows {
        let values = row.iter().map(|v| if v.is_finite() { *v } else { 0.0 });
        match layout {
            BarLayout::Stacked => {
                let mut sum = 0.0;
                for v in values {
                    sum += v;
                    out.push(sum);
                }
            }
            BarLayout::Grouped => out.extend(values.map(f64::abs)),
        }
    }
    out.push(0.0);
    out
}

/// The bar value-axis domain before overrides and nice rounding.
pub fn bar_value_domain(rows: &[Vec<f64>], layout: BarLayout) -> [f64; 2] {
    value_extent(bar_value_candidates(rows, layout)).unwrap_or([0.0, 0.0])
}

/// Sets a bar chart's value-axis domain from `rows` under `layout`, then applies the
/// overrides and rounds it outward like any continuous domain.
pub fn apply_bar_value_domain(
    scale: &mut Scale,
    rows: &[Vec<f64>],
    layout: BarLayout,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<()> {
    let candidates = DomainInput::Values(bar_value_candidates(rows, layout));
    apply_domain(scale, &candidates, min, max)
}

/// `(inner, outer)` band padding that keeps bars near `max_band_width` without letting
/// them thin out when categories are dense.
pub fn band_padding(category_count: usize, viewport_length: f64, max_band_width: f64) -> (f64, f64) {
    let fit = viewport_length / max_band_width;
    let outer = (1.0 - category_count as f64 / fit).max(0.01);
    (outer.max(0.38), outer)
}

/// Scale extent of the bar category driver: zooming in stops once a band reaches
/// `max_band_width`.
pub fn band_scale_extent(max_band_width: f64, step: f64) -> [f64; 2] {
    if !(step > 0.0) {
        return [1.0, 1.0];
    }
    [1.0, (max_band_width / step).max(1.0)]
}

/// One heatmap axis: its base scale and the pixel length of all its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    /// First and last cell index, inclusive.
    pub indices: [i64; 2],
    pub scale: LinearScale,
    pub data_length: f64,
}

impl GridAxis {
    /// Cell `i` is centred on `offset + (i - first + 0.5) * unit`. The scale spans as many
    /// whole cells as fit the canvas.
    pub fn new(domain: Option<[f64; 2]>, offset: f64, canvas_length: f64, unit: f64) -> Self {
        let [a, b] = domain.unwrap_or([0.0, 0.0]);
        let (a, b) = (round_half_up(a), round_half_up(b));
        let (first, last) = (a.min(b), a.max(b));
        let cells = if unit > 0.0 {
            round_half_up(canvas_length / unit).max(1.0)
        } else {
            1.0
        };
        let start = first - 0.5;
        Self {
            indices: [first as i64, last as i64],
            scale: LinearScale::new([start, start + cells], [offset, offset + cells * unit]),
            data_length: (last - first + 1.0) * unit,
        }
    }
}

fn round_half_up(v: f64) -> f64 {
    if v.is_finite() { (v + 0.5).floor() } else { 0.0 }
}

/// Heatmap zoom limits: the scale may shrink until all cells fit, but never below
/// `min_zoom`.
pub fn grid_scale_extent(
    min_zoom: f64,
    max_zoom: f64,
    canvas: [f64; 2],
    data: [f64; 2],
) -> [f64; 2] {
    let fit = [canvas[0] / data[0], canvas[1] / data[1]]
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(1.0, f64::min);
    [min_zoom.max(fit), max_zoom]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_widen() {
        assert_eq!(continuous_domain([2.0, 7.0], Some(4.0), Some(5.0)), [2.0, 7.0]);
        assert_eq!(continuous_domain([2.0, 7.0], Some(-1.0), None), [-1.0, 7.0]);
    }

    #[test]
    fn degenerate_inputs_fall_back() {
        assert_eq!(continuous_domain(Vec::new(), None, None), [0.0, 1.0]);
        assert_eq!(continuous_domain([3.0, 3.0, f64::NAN], None, None), [2.5, 3.5]);
        assert_eq!(
            temporal_domain([0.0], None, None),
            [-HALF_DAY_MS, HALF_DAY_MS]
        );
    }

    #[test]
    fn grouped_bars_use_absolute_values() {
        let rows = vec![vec![-4.0, 2.0], vec![1.0, 3.0]];
        assert_eq!(bar_value_domain(&rows, BarLayout::Grouped), [0.0, 4.0]);
        assert_eq!(bar_value_domain(&rows, BarLayout::Stacked), [-4.0, 4.0]);
    }

    #[test]
    fn dense_categories_get_minimum_padding() {
        let (inner, outer) = band_padding(40, 400.0, 100.0);
        assert_eq!(outer, 0.01);
        assert_eq!(inner, 0.38);
        let (inner, outer) = band_padding(2, 1000.0, 100.0);
        assert!((outer - 0.8).abs() < 1e-12);
        assert_eq!(inner, outer);
    }

    #[test]
    fn grid_axis_centres_cells_on_indices() {
        let axis = GridAxis::new(Some([2.0, 11.0]), 50.0, 360.0, 36.0);
        assert_eq!(axis.indices, [2, 11]);
        assert_eq!(axis.data_length, 360.0);
        assert!((axis.scale.map(2.0) - 68.0).abs() < 1e-9);
        assert!((axis.scale.map(3.0) - 104.0).abs() < 1e-9);
    }
}
