use chrono::{TimeZone, Utc};
use kestrel::config::BarLayout;
use kestrel::domain::{
    DomainInput, apply_domain, band_scale_extent, bar_value_domain, grid_scale_extent,
    ordinal_domain,
};
use kestrel::Error;
use kestrel::scale::{BandScale, LinearScale, Scale, TimeScale};

#[test]
fn stacked_bars_span_the_running_sum() {
    let rows = vec![vec![3.0, 5.0, 2.0]];
    assert_eq!(bar_value_domain(&rows, BarLayout::Stacked), [0.0, 10.0]);
    assert_eq!(bar_value_domain(&rows, BarLayout::Grouped), [0.0, 5.0]);
}

#[test]
fn linear_domains_are_niced_after_overrides() {
    let mut scale: Scale = LinearScale::default().into();
    apply_domain(&mut scale, &DomainInput::Values(vec![3.0, 47.0]), Some(-3.2), None).unwrap();
    assert_eq!(scale.continuous_domain(), Some([-5.0, 50.0]));
}

#[test]
fn time_axes_accept_instants_and_epoch_millis() {
    let mut scale: Scale = TimeScale::default().into();
    let a = Utc.with_ymd_and_hms(2024, 5, 1, 3, 7, 0).unwrap();
    let b = Utc.with_ymd_and_hms(2024, 5, 1, 22, 40, 0).unwrap();
    apply_domain(&mut scale, &DomainInput::from(vec![a, b]), None, None).unwrap();
    let [d0, d1] = scale.continuous_domain().unwrap();
    assert!(d0 <= a.timestamp_millis() as f64);
    assert!(d1 >= b.timestamp_millis() as f64);

    let mut scale: Scale = TimeScale::default().into();
    apply_domain(&mut scale, &DomainInput::Values(Vec::new()), None, None).unwrap();
    assert_eq!(scale.continuous_domain(), Some([0.0, 86_400_000.0]));
}

#[test]
fn categories_keep_first_seen_order() {
    let keys = ordinal_domain(["b", "a", "b", "c"]);
    assert_eq!(keys.into_iter().collect::<Vec<_>>(), ["b", "a", "c"]);

    let mut scale: Scale = BandScale::default().into();
    let input = DomainInput::from(vec!["x".to_string(), "y".to_string(), "x".to_string()]);
    apply_domain(&mut scale, &input, None, None).unwrap();
    assert_eq!(scale.categories().map(|c| c.len()), Some(2));
}

#[test]
fn mismatched_inputs_are_rejected() {
    let mut scale: Scale = BandScale::default().into();
    let err = apply_domain(&mut scale, &DomainInput::Values(vec![1.0]), None, None).unwrap_err();
    assert!(matches!(err, Error::Scale(_)));
    assert_eq!(err.to_string(), "band scale cannot map a number value");
}

#[test]
fn zoom_extents_for_bands_and_grids() {
    assert_eq!(band_scale_extent(100.0, 12.5), [1.0, 8.0]);
    assert_eq!(band_scale_extent(100.0, 150.0), [1.0, 1.0]);
    assert_eq!(band_scale_extent(100.0, 0.0), [1.0, 1.0]);

    // Zooming out stops once every cell fits, and never passes the configured floor.
    assert_eq!(grid_scale_extent(0.5, 4.0, [360.0, 360.0], [720.0, 360.0]), [0.5, 4.0]);
    assert_eq!(grid_scale_extent(0.25, 4.0, [360.0, 360.0], [720.0, 360.0]), [0.5, 4.0]);
    // Data smaller than the canvas cannot be zoomed out past identity.
    assert_eq!(grid_scale_extent(0.5, 4.0, [360.0, 360.0], [180.0, 180.0]), [1.0, 4.0]);
}
