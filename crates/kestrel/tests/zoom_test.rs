use kestrel::geom::{Box2D, point, rect};
use kestrel::zoom::{
    DriverAxis, WheelDeltaMode, ZoomConstraints, ZoomDriver, ZoomEvent, ZoomLinkage, ZoomRegions,
    ZoomRoute, ZoomTransform, wheel_delta,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn assert_transform(actual: ZoomTransform, expected: ZoomTransform) {
    assert!(
        approx(actual.k, expected.k) && approx(actual.x, expected.x) && approx(actual.y, expected.y),
        "{actual:?} != {expected:?}"
    );
}

fn wheel(x: f64, y: f64, delta_y: f64) -> ZoomEvent {
    ZoomEvent::Wheel {
        point: point(x, y),
        delta_y,
        delta_mode: WheelDeltaMode::Pixel,
        ctrl: false,
    }
}

fn regions() -> ZoomRegions {
    ZoomRegions {
        x_strip: rect(50.0, 300.0, 400.0, 40.0),
        y_strip: rect(0.0, 0.0, 50.0, 300.0),
        content: rect(50.0, 0.0, 400.0, 300.0),
    }
}

fn per_axis() -> ZoomLinkage {
    let r = regions();
    ZoomLinkage::PerAxis {
        x: ZoomDriver::new(
            DriverAxis::X,
            ZoomConstraints::for_axis_strip(DriverAxis::X, r.x_strip, [1.0, 8.0]),
        ),
        y: ZoomDriver::new(
            DriverAxis::Y,
            ZoomConstraints::for_axis_strip(DriverAxis::Y, r.y_strip, [1.0, 8.0]),
        ),
    }
}

#[test]
fn wheel_delta_follows_the_dom_delta_mode() {
    assert!(approx(wheel_delta(-500.0, WheelDeltaMode::Pixel, false), 1.0));
    assert!(approx(wheel_delta(-500.0, WheelDeltaMode::Pixel, true), 10.0));
    assert!(approx(wheel_delta(2.0, WheelDeltaMode::Line, false), -0.1));
    assert!(approx(wheel_delta(1.0, WheelDeltaMode::Page, false), -1.0));
}

#[test]
fn normalize_is_idempotent() {
    let window = Box2D::new(point(0.0, 0.0), point(200.0, 100.0));
    let c = ZoomConstraints::new([0.5, 6.0], window, window);
    for t in [
        ZoomTransform::new(12.0, 40.0, -900.0),
        ZoomTransform::new(0.1, -5.0, 5.0),
        ZoomTransform::new(2.0, -150.0, -20.0),
        ZoomTransform::IDENTITY,
    ] {
        let once = c.normalize(t);
        assert_transform(c.normalize(once), once);
        assert!(once.k >= 0.5 && once.k <= 6.0);
    }
}

#[test]
fn adversarial_sequences_stay_within_bounds() {
    let window = Box2D::new(point(0.0, 0.0), point(200.0, 100.0));
    let c = ZoomConstraints::new([1.0, 5.0], window, window);
    let mut driver = ZoomDriver::new(DriverAxis::Both, c);

    let events = [
        wheel(10.0, 10.0, -5000.0),
        ZoomEvent::Drag {
            origin: point(5.0, 5.0),
            dx: 1e6,
            dy: -1e6,
        },
        wheel(190.0, 90.0, 3000.0),
        ZoomEvent::ScaleBy {
            factor: 1e9,
            anchor: Some(point(199.0, 1.0)),
        },
        ZoomEvent::Drag {
            origin: point(5.0, 5.0),
            dx: -1e6,
            dy: f64::INFINITY,
        },
        wheel(100.0, 50.0, f64::NAN),
        ZoomEvent::Set {
            transform: ZoomTransform::new(-3.0, 0.0, 0.0),
        },
    ];
    for _ in 0..20 {
        for event in &events {
            let t = driver.apply(event);
            assert!(t.is_finite(), "{event:?} produced {t:?}");
            assert!(t.k >= 1.0 && t.k <= 5.0);
            assert!(t.invert_x(0.0) >= -1e-6);
            assert!(t.invert_x(200.0) <= 200.0 + 1e-6);
            assert!(t.invert_y(0.0) >= -1e-6);
            assert!(t.invert_y(100.0) <= 100.0 + 1e-6);
        }
    }
}

#[test]
fn combined_events_route_by_pointer_origin() {
    let r = regions();
    assert_eq!(r.route(Some(point(200.0, 320.0))), ZoomRoute::X);
    assert_eq!(r.route(Some(point(25.0, 150.0))), ZoomRoute::Y);
    assert_eq!(r.route(Some(point(200.0, 150.0))), ZoomRoute::Both);
    assert_eq!(r.route(Some(point(25.0, 320.0))), ZoomRoute::Ignore);
    assert_eq!(r.route(None), ZoomRoute::Both);
}

#[test]
fn x_strip_events_leave_the_y_axis_alone() {
    let mut zoom = per_axis();
    let state = zoom.apply(DriverAxis::Both, &wheel(200.0, 320.0, -500.0), &regions());
    assert_transform(state.x, ZoomTransform::new(2.0, -200.0, 0.0));
    assert_eq!(state.y, ZoomTransform::IDENTITY);

    let state = zoom.apply(DriverAxis::Both, &wheel(25.0, 150.0, -500.0), &regions());
    assert_transform(state.x, ZoomTransform::new(2.0, -200.0, 0.0));
    assert_transform(state.y, ZoomTransform::new(2.0, 0.0, -150.0));
}

#[test]
fn events_outside_every_region_are_ignored() {
    let mut zoom = per_axis();
    let before = zoom.state();
    let after = zoom.apply(DriverAxis::Both, &wheel(25.0, 320.0, -500.0), &regions());
    assert_eq!(after, before);
}

#[test]
fn panning_at_identity_is_pulled_back() {
    let mut zoom = per_axis();
    let state = zoom.apply(
        DriverAxis::Y,
        &ZoomEvent::Drag {
            origin: point(25.0, 150.0),
            dx: 40.0,
            dy: 40.0,
        },
        &regions(),
    );
    assert_eq!(state.y, ZoomTransform::IDENTITY);
}

#[test]
fn linked_drivers_share_one_transform() {
    let window = Box2D::new(point(0.0, 0.0), point(100.0, 100.0));
    let mut zoom = ZoomLinkage::Linked(ZoomDriver::new(
        DriverAxis::Both,
        ZoomConstraints::new([1.0, 4.0], window, window),
    ));
    let state = zoom.apply(
        DriverAxis::Both,
        &ZoomEvent::ScaleBy {
            factor: 2.0,
            anchor: None,
        },
        &ZoomRegions::default(),
    );
    assert_transform(state.x, ZoomTransform::new(2.0, -50.0, -50.0));
    assert_eq!(state.x, state.y);

    zoom.reset(ZoomTransform::new(0.25, 0.0, 0.0));
    assert_eq!(zoom.state().x, ZoomTransform::IDENTITY);
}
