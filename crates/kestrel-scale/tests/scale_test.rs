use chrono::{NaiveDate, TimeZone, Utc};
use kestrel_scale::time::{MS_PER_DAY, MS_PER_MINUTE};
use kestrel_scale::{
    BandScale, DomainValue, Error, LinearScale, Scale, ScaleKind, TimeScale, TimeUnit,
    choose_interval, format, time_tick_count,
};

fn utc_ms(y: i32, mo: u32, d: u32, h: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis()
}

#[test]
fn rescaled_linear_scale_maps_through_the_transform() {
    let base: Scale = LinearScale::new([0.0, 10.0], [0.0, 100.0]).into();
    let zoomed = base.rescaled(2.0, -50.0);
    assert_eq!(zoomed.range(), [-50.0, 150.0]);
    assert_eq!(zoomed.to_pixel(&DomainValue::Number(5.0)).unwrap(), 50.0);
    assert_eq!(zoomed.invert_f64(50.0).unwrap(), 5.0);
    // The base is untouched.
    assert_eq!(base.range(), [0.0, 100.0]);
}

#[test]
fn rescaled_band_scale_widens_every_slot() {
    let base: Scale = BandScale::new(["a", "b", "c", "d"], [0.0, 100.0]).into();
    assert_eq!(base.step(), Some(25.0));
    let zoomed = base.rescaled(2.0, 0.0);
    assert_eq!(zoomed.step(), Some(50.0));
    assert_eq!(zoomed.to_pixel(&"c".into()).unwrap(), 100.0);
    assert_eq!(zoomed.snap(120.0), Some(2));
}

#[test]
fn band_scales_refuse_inversion_and_foreign_values() {
    let band: Scale = BandScale::new(["a"], [0.0, 10.0]).into();
    assert_eq!(
        band.to_domain(3.0).unwrap_err(),
        Error::NotInvertible {
            kind: ScaleKind::Band
        }
    );
    assert_eq!(
        band.to_pixel(&"zz".into()).unwrap_err(),
        Error::UnknownCategory {
            key: "zz".to_string()
        }
    );

    let linear: Scale = LinearScale::default().into();
    let err = linear.to_pixel(&"a".into()).unwrap_err();
    assert_eq!(
        err,
        Error::DomainKindMismatch {
            expected: ScaleKind::Linear,
            found: "category"
        }
    );
    assert_eq!(err.to_string(), "linear scale cannot map a category value");
}

#[test]
fn band_scales_rebuild_their_layout_when_deserialized() {
    let mut band = BandScale::new(["a", "b", "c", "d"], [0.0, 100.0]);
    band.set_padding(0.5, 0.25);
    let json = serde_json::to_value(Scale::from(band)).unwrap();
    assert_eq!(json["kind"], "band");

    let back: Scale = serde_json::from_value(json).unwrap();
    assert_eq!(back.step(), Some(25.0));
    assert_eq!(back.bandwidth(), Some(12.5));
    assert_eq!(back.to_pixel(&"c".into()).unwrap(), 56.25);
}

#[test]
fn time_scale_round_trips_instants() {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
    let scale: Scale = TimeScale::new([t0, t1], [0.0, 240.0]).into();
    let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    assert_eq!(scale.to_pixel(&noon.into()).unwrap(), 120.0);
    assert_eq!(scale.to_domain(120.0).unwrap(), DomainValue::Time(noon));
}

#[test]
fn nice_rounds_continuous_domains_only() {
    let mut linear: Scale = LinearScale::new([0.13, 0.96], [0.0, 1.0]).into();
    linear.nice();
    assert_eq!(linear.continuous_domain(), Some([0.1, 1.0]));

    let mut band: Scale = BandScale::new(["x", "y"], [0.0, 1.0]).into();
    band.nice();
    assert_eq!(band.categories().map(|c| c.len()), Some(2));
}

#[test]
fn interval_chooser_prefers_the_closer_neighbour() {
    let span = (47 * MS_PER_MINUTE) as f64;
    assert_eq!(
        choose_interval(0.0, span, 6.0, TimeUnit::Millisecond),
        TimeUnit::Minute.every(10)
    );
}

#[test]
fn interval_chooser_falls_back_below_and_above_the_table() {
    assert_eq!(
        choose_interval(0.0, 100.0, 10.0, TimeUnit::Millisecond),
        TimeUnit::Millisecond.every(10)
    );
    let fifty_years = (50 * 365 * MS_PER_DAY) as f64;
    assert_eq!(
        choose_interval(0.0, fifty_years, 10.0, TimeUnit::Millisecond),
        TimeUnit::Year.every(5)
    );
}

#[test]
fn tick_counts_per_precision_are_at_least_one() {
    assert_eq!(time_tick_count(0, MS_PER_DAY, TimeUnit::Hour), 24);
    assert_eq!(time_tick_count(0, 0, TimeUnit::Hour), 1);
    assert_eq!(
        time_tick_count(utc_ms(2024, 1, 15, 0), utc_ms(2024, 7, 1, 0), TimeUnit::Month),
        6
    );
}

#[test]
fn time_labels_use_the_coarsest_boundary() {
    assert_eq!(format::format_time(0), "1970");
    assert_eq!(format::format_time(utc_ms(2024, 3, 1, 0)), "March");
    assert_eq!(format::format_time(utc_ms(2024, 3, 14, 15)), "03 PM");
    assert_eq!(format::format_number(2500.0, 500.0), "2,500");
}
