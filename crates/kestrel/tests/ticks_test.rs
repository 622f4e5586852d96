use kestrel::axis::Orientation;
use kestrel::config::FontOptions;
use kestrel::scale::time::MS_PER_MINUTE;
use kestrel::scale::{DomainValue, LinearScale, Scale, TimeScale, TimeUnit};
use kestrel::text::{LabelMeasurer, LabelMetrics};
use kestrel::ticks::{TickRequest, plan_tick_count, plan_tick_values, plan_ticks, tick_count_for};

fn request(orientation: Orientation, window: [f64; 2], font: &FontOptions) -> TickRequest<'_> {
    TickRequest {
        orientation,
        window,
        font,
        gap: 10.0,
        zoom_k: 1.0,
        min_precision: TimeUnit::Millisecond,
    }
}

fn fixed_width(width: f64) -> impl LabelMeasurer {
    move |_: &str, font: &FontOptions| LabelMetrics {
        width,
        height: font.size,
    }
}

#[test]
fn tick_count_grows_with_axis_length() {
    let mut previous = 0;
    for length in (0..=40).map(|i| i as f64 * 50.0) {
        let count = tick_count_for(length, 30.0, 10.0);
        assert!(count >= 1);
        assert!(count >= previous, "{length}: {count} < {previous}");
        previous = count;
    }
    assert_eq!(tick_count_for(300.0, 19.2, 10.0), 10);
    assert_eq!(tick_count_for(f64::NAN, 19.2, 10.0), 1);
}

#[test]
fn vertical_axes_use_the_font_size() {
    let font = FontOptions::default();
    let scale: Scale = LinearScale::new([0.0, 100.0], [310.0, 10.0]).into();
    let req = request(Orientation::Y, [310.0, 10.0], &font);
    // 14px labels plus a 10px gap over 300px.
    assert_eq!(plan_tick_count(&scale, &req, &fixed_width(500.0)), 12);

    let plan = plan_ticks(&scale, &req, &fixed_width(500.0));
    assert_eq!(plan.labels.first().map(String::as_str), Some("0"));
    assert_eq!(plan.labels.last().map(String::as_str), Some("100"));
    assert_eq!(plan.len(), 11);
    assert_eq!(plan.positions[0], 310.0);
}

#[test]
fn time_axes_pick_calendar_intervals() {
    let font = FontOptions::default();
    let scale: Scale = TimeScale::from_millis([0.0, (47 * MS_PER_MINUTE) as f64], [0.0, 470.0]).into();
    let req = request(Orientation::X, [0.0, 470.0], &font);
    let plan = plan_ticks(&scale, &req, &fixed_width(60.0));
    assert_eq!(plan.count, 6);
    assert_eq!(plan.interval, Some(TimeUnit::Minute.every(10)));
    assert_eq!(plan.len(), 5);
    assert_eq!(plan.labels[0], "1970");
    assert_eq!(plan.labels[1], "12:10");
    assert_eq!(plan.positions[1], 100.0);
}

#[test]
fn zoomed_linear_axes_tick_the_visible_domain() {
    let font = FontOptions::default();
    let base: Scale = LinearScale::new([0.0, 100.0], [0.0, 300.0]).into();
    let zoomed = base.rescaled(2.0, 0.0);
    let req = request(Orientation::X, [0.0, 300.0], &font);
    let plan = plan_tick_values(&zoomed, 5, &req);
    let values: Vec<f64> = plan.values.iter().filter_map(DomainValue::as_number).collect();
    assert_eq!(values, [0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    assert_eq!(plan.positions, [0.0, 60.0, 120.0, 180.0, 240.0, 300.0]);
}
