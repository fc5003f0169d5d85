use super::*;

const ALL: [Ease; 13] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::InQuart,
    Ease::OutQuart,
    Ease::InOutQuart,
    Ease::OutBack,
    Ease::OutElastic,
    Ease::CubicBezier(0.42, 0.0, 0.58, 1.0),
];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert!(ease.apply(0.0).abs() < 1e-9, "{ease} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease} at 1");
    }
}

#[test]
fn input_is_clamped() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), ease.apply(0.0));
        assert_eq!(ease.apply(7.0), ease.apply(1.0));
        assert_eq!(ease.apply(f64::NAN), ease.apply(0.0));
    }
}

#[test]
fn every_curve_stays_in_unit_range() {
    let wild = Ease::CubicBezier(0.3, -0.8, 0.7, 1.9);
    for ease in ALL.into_iter().chain([wild]) {
        for i in 0..=40 {
            let v = ease.apply(i as f64 / 40.0);
            assert!((0.0..=1.0).contains(&v), "{ease} left [0, 1] at step {i}: {v}");
        }
    }
}

#[test]
fn monotonic_curves_never_decrease() {
    for ease in ALL.into_iter().filter(|e| e.is_monotonic()) {
        let mut prev = 0.0;
        for i in 0..=20 {
            let v = ease.apply(i as f64 / 20.0);
            assert!(v + 1e-9 >= prev, "{ease} not monotonic at step {i}");
            prev = v;
        }
    }
    assert!(!Ease::OutElastic.is_monotonic());
}

#[test]
fn out_back_plateaus_where_it_would_overshoot() {
    // The raw curve peaks near 1.0994 at t = 0.6.
    assert_eq!(Ease::OutBack.apply(0.6), 1.0);
    assert!(Ease::OutBack.apply(0.3) < 1.0);
}

#[test]
fn linear_bezier_is_identity() {
    let ease = Ease::CubicBezier(0.25, 0.25, 0.75, 0.75);
    for i in 0..=10 {
        let t = i as f64 / 10.0;
        assert!((ease.apply(t) - t).abs() < 1e-4);
    }
}

#[test]
fn names_resolve_across_styles() {
    assert_eq!(Ease::from_name("easeInOutCubic"), Some(Ease::InOutCubic));
    assert_eq!(Ease::from_name("in-out-cubic"), Some(Ease::InOutCubic));
    assert_eq!(Ease::from_name("power2.out"), Some(Ease::OutCubic));
    assert_eq!(Ease::from_name("back.out"), Some(Ease::OutBack));
    assert_eq!(
        Ease::from_name("cubic-bezier(0.4, 0, 0.2, 1)"),
        Some(Ease::CubicBezier(0.4, 0.0, 0.2, 1.0))
    );
    assert_eq!(Ease::from_name("cubic-bezier(0.4, 0)"), None);
    assert_eq!(Ease::from_name("wobble"), None);
}

#[test]
fn canonical_names_round_trip() {
    for ease in ALL {
        assert_eq!(Ease::from_name(&ease.name()), Some(ease));
    }
}

#[test]
fn ease_spec_keeps_unknown_names() {
    let spec: EaseSpec = serde_json::from_str("\"wobble\"").unwrap();
    assert_eq!(spec, EaseSpec::Unknown("wobble".to_string()));
    assert_eq!(spec.ease(), None);

    let known: EaseSpec = serde_json::from_str("\"easeOutQuad\"").unwrap();
    assert_eq!(known.ease(), Some(Ease::OutQuad));
    assert_eq!(serde_json::to_string(&known).unwrap(), "\"outQuad\"");
}
