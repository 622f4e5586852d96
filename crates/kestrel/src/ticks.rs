//! Tick planning: how many ticks fit an axis, and which values they land on.

use kestrel_scale::format::{format_number, format_time};
use kestrel_scale::ticks::{tick_step, ticks};
use kestrel_scale::time::{datetime_from_ms, epoch_ms};
use kestrel_scale::{DomainValue, Scale, TimeInterval, TimeUnit, choose_interval};

use crate::axis::Orientation;
use crate::config::{DEFAULT_FONT_SIZE, FontOptions};
use crate::text::LabelMeasurer;

const MAX_LABEL_SAMPLES: f64 = 64.0;
// Tick count the label formatter assumes when no plan exists yet.
const FORMAT_TICK_COUNT: f64 = 10.0;

/// Everything the planner needs to know about the axis besides its scale.
#[derive(Debug, Clone)]
pub struct TickRequest<'a> {
    pub orientation: Orientation,
    /// Unzoomed pixel window of the axis: `[left, right]` or `[bottom, top]`.
    pub window: [f64; 2],
    pub font: &'a FontOptions,
    /// Minimum gap between two labels, in pixels.
    pub gap: f64,
    /// Current zoom factor; ordinal axes reveal more labels as it grows.
    pub zoom_k: f64,
    pub min_precision: TimeUnit,
}

impl TickRequest<'_> {
    pub fn length(&self) -> f64 {
        (self.window[1] - self.window[0]).abs()
    }

    fn font_size(&self) -> f64 {
        if self.font.size > 0.0 {
            self.font.size
        } else {
            DEFAULT_FONT_SIZE
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickPlan {
    pub count: usize,
    pub values: Vec<DomainValue>,
    /// Pixel position of each value on the effective scale.
    pub positions: Vec<f64>,
    pub labels: Vec<String>,
    /// Calendar step of temporal axes.
    pub interval: Option<TimeInterval>,
}

impl TickPlan {
    fn empty(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `max(1, floor(length / (ceil(label_size) + gap)))`.
pub fn tick_count_for(length: f64, label_size: f64, gap: f64) -> usize {
    let tick_size = (label_size.ceil() + gap).max(1.0);
    if !length.is_finite() || length <= 0.0 {
        return 1;
    }
    ((length / tick_size).floor() as usize).max(1)
}

/// Number of ticks whose labels fit along the axis without overlapping.
///
/// Vertical axes use the font size as the label extent. Horizontal axes measure labels
/// sampled across the axis (every category for band scales).
pub fn plan_tick_count(
    scale: &Scale,
    request: &TickRequest<'_>,
    measurer: &dyn LabelMeasurer,
) -> usize {
    let label_size = match request.orientation {
        Orientation::Y => request.font_size(),
        Orientation::X => {
            let font = FontOptions {
                family: request.font.family.clone(),
                size: request.font_size(),
            };
            sample_labels(scale, request)
                .iter()
                .map(|label| measurer.measure(label, &font).width)
                .fold(request.gap, f64::max)
        }
    };
    tick_count_for(request.length(), label_size, request.gap)
}

/// The tick values for `count` ticks over the visible part of `scale`.
pub fn plan_tick_values(scale: &Scale, count: usize, request: &TickRequest<'_>) -> TickPlan {
    let count = count.max(1);
    match scale {
        Scale::Band(band) => {
            let k = if request.zoom_k.is_finite() && request.zoom_k > 0.0 {
                request.zoom_k
            } else {
                1.0
            };
            let n = band.domain().len();
            let stride = ((n as f64 / count as f64 / k).floor() as usize).max(1);
            let half = band.bandwidth() / 2.0;
            let mut plan = TickPlan::empty(count);
            for (i, key) in band.domain().iter().enumerate() {
                if i % stride != 0 {
                    continue;
                }
                let Some(p) = band.map(key) else { continue };
                plan.values.push(DomainValue::Category(key.clone()));
                plan.positions.push(p + half);
                plan.labels.push(key.clone());
            }
            plan
        }
        Scale::Linear(linear) => {
            let Some([lo, hi]) = visible_domain(scale, request.window) else {
                return TickPlan::empty(count);
            };
            let step = tick_step(lo, hi, count as f64);
            let mut plan = TickPlan::empty(count);
            for v in ticks(lo, hi, count as f64) {
                plan.values.push(DomainValue::Number(v));
                plan.positions.push(linear.map(v));
                plan.labels.push(format_number(v, step));
            }
            plan
        }
        Scale::Time(time) => {
            let Some([lo, hi]) = visible_domain(scale, request.window) else {
                return TickPlan::empty(count);
            };
            let interval = choose_interval(lo, hi, count as f64, request.min_precision);
            let mut plan = TickPlan::empty(count);
            for ms in interval.ticks(epoch_ms(lo.ceil()), epoch_ms(hi.floor())) {
                let Some(at) = datetime_from_ms(ms) else { continue };
                plan.values.push(DomainValue::Time(at));
                plan.positions.push(time.map_ms(ms as f64));
                plan.labels.push(format_time(ms));
            }
            plan.interval = Some(interval);
            plan
        }
    }
}

/// Count and values in one pass.
pub fn plan_ticks(
    scale: &Scale,
    request: &TickRequest<'_>,
    measurer: &dyn LabelMeasurer,
) -> TickPlan {
    let count = plan_tick_count(scale, request, measurer);
    let plan = plan_tick_values(scale, count, request);
    tracing::trace!(
        orientation = %request.orientation,
        count,
        ticks = plan.len(),
        "planned ticks"
    );
    plan
}

/// Domain interval shown in `window`, ascending. `None` for band scales and broken
/// mappings.
pub fn visible_domain(scale: &Scale, window: [f64; 2]) -> Option<[f64; 2]> {
    let a = scale.invert_f64(window[0]).ok()?;
    let b = scale.invert_f64(window[1]).ok()?;
    if !(a.is_finite() && b.is_finite()) {
        return None;
    }
    Some([a.min(b), a.max(b)])
}

fn sample_labels(scale: &Scale, request: &TickRequest<'_>) -> Vec<String> {
    if let Some(categories) = scale.categories() {
        return categories.iter().cloned().collect();
    }
    let [w0, w1] = request.window;
    let (start, stop) = (w0.min(w1), w0.max(w1));
    let samples = (stop - start).min(MAX_LABEL_SAMPLES).max(1.0);
    let step = visible_domain(scale, request.window)
        .map(|[lo, hi]| tick_step(lo, hi, FORMAT_TICK_COUNT))
        .unwrap_or(0.0);

    ticks(start, stop, samples)
        .into_iter()
        .filter_map(|px| scale.invert_f64(px).ok())
        .filter(|v| v.is_finite())
        .map(|v| match scale {
            Scale::Time(_) => format_time(epoch_ms(v.round())),
            _ => format_number(v, step),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::LabelMetrics;
    use kestrel_scale::{BandScale, LinearScale};

    fn request(font: &FontOptions, window: [f64; 2]) -> TickRequest<'_> {
        TickRequest {
            orientation: Orientation::X,
            window,
            font,
            gap: 10.0,
            zoom_k: 1.0,
            min_precision: TimeUnit::Millisecond,
        }
    }

    #[test]
    fn count_uses_widest_label_plus_gap() {
        let font = FontOptions::default();
        let scale: Scale = LinearScale::new([0.0, 100.0], [0.0, 300.0]).into();
        let fixed = |_: &str, _: &FontOptions| LabelMetrics {
            width: 19.2,
            height: 14.0,
        };
        // ceil(19.2) + 10 = 30 px per tick.
        assert_eq!(plan_tick_count(&scale, &request(&font, [0.0, 300.0]), &fixed), 10);
    }

    #[test]
    fn band_ticks_thin_out_by_stride() {
        let font = FontOptions::default();
        let keys: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
        let scale: Scale = BandScale::new(keys, [0.0, 100.0]).into();
        let mut req = request(&font, [0.0, 100.0]);
        let plan = plan_tick_values(&scale, 3, &req);
        assert_eq!(plan.labels, ["c0", "c3", "c6", "c9"]);

        req.zoom_k = 4.0;
        let plan = plan_tick_values(&scale, 3, &req);
        assert_eq!(plan.len(), 10);
    }
}
