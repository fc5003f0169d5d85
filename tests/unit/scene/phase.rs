use super::*;
use crate::animation::ease::Ease;

fn partition() -> PhaseMap {
    PhaseMap::new()
        .with("intro", PhaseDefinition::new(0.0, 0.3))
        .with("hold", PhaseDefinition::new(0.3, 0.7))
        .with("outro", PhaseDefinition::new(0.7, 1.0))
}

#[test]
fn map_phase_is_clamped_and_linear() {
    let (start, end) = (0.2, 0.6);
    for i in 0..=100 {
        let p = i as f64 / 100.0;
        let v = map_phase(p, start, end);
        assert!((0.0..=1.0).contains(&v));
        if p < start {
            assert_eq!(v, 0.0);
        } else if p > end {
            assert_eq!(v, 1.0);
        } else {
            assert!((v - (p - start) / (end - start)).abs() < 1e-12);
        }
    }
    assert_eq!(map_phase(0.2, start, end), 0.0);
    assert_eq!(map_phase(0.6, start, end), 1.0);
    assert!((map_phase(0.4, start, end) - 0.5).abs() < 1e-12);
}

#[test]
fn map_phase_handles_degenerate_ranges_and_nan() {
    assert_eq!(map_phase(0.4, 0.5, 0.5), 0.0);
    assert_eq!(map_phase(0.5, 0.5, 0.5), 1.0);
    assert_eq!(map_phase(0.9, 0.8, 0.2), 1.0);
    assert_eq!(map_phase(0.1, 0.8, 0.2), 0.0);
    assert_eq!(map_phase(f64::NAN, 0.0, 1.0), 0.0);
}

#[test]
fn easing_is_applied_after_linear_mapping() {
    let phase = PhaseDefinition::new(0.0, 0.5).with_ease(Ease::InQuad);
    assert!((map_phase_definition(0.25, &phase) - 0.25).abs() < 1e-12);

    let overshoot = PhaseDefinition::new(0.0, 1.0).with_ease(Ease::OutBack);
    for i in 0..=20 {
        let v = map_phase_definition(i as f64 / 20.0, &overshoot);
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn unknown_easing_falls_back_to_linear() {
    let phase = PhaseDefinition {
        start: 0.0,
        end: 1.0,
        ease: Some(EaseSpec::Unknown("wobble".into())),
    };
    assert_eq!(map_phase_definition(0.3, &phase), 0.3);
}

#[test]
fn map_all_phases_keys_match_declared_names() {
    let phases = partition();
    let out = map_all_phases(0.5, &phases);
    let names: Vec<&str> = out.names().collect();
    assert_eq!(names, vec!["intro", "hold", "outro"]);
    assert_eq!(out.get("intro"), Some(1.0));
    assert!((out.get("hold").unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(out.get("outro"), Some(0.0));
    assert_eq!(out.get("missing"), None);
    assert!(out.is_mid_phase("hold"));
    assert!(!out.is_mid_phase("intro"));
}

#[test]
fn map_all_phases_is_seek_independent() {
    let phases = partition();
    let direct = map_all_phases(0.42, &phases);
    let _ = map_all_phases(0.9, &phases);
    assert_eq!(map_all_phases(0.42, &phases), direct);
}

#[test]
fn clean_partition_has_no_diagnostics() {
    let report = validate_phases(&partition());
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn range_violations_are_errors() {
    let phases = PhaseMap::new()
        .with("backwards", PhaseDefinition::new(0.6, 0.4))
        .with("empty", PhaseDefinition::new(0.5, 0.5))
        .with("low", PhaseDefinition::new(-0.1, 0.2))
        .with("high", PhaseDefinition::new(0.8, 1.2));
    let report = validate_phases(&phases);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 4);
    assert!(report.errors.iter().any(|e| e.contains("'backwards'")));
    assert!(report.errors.iter().any(|e| e.contains("'empty'")));
    assert!(report.errors.iter().any(|e| e.contains("outside [0, 1]")));
}

#[test]
fn gap_and_overlap_are_warnings() {
    let gapped = PhaseMap::new()
        .with("a", PhaseDefinition::new(0.0, 0.45))
        .with("b", PhaseDefinition::new(0.5, 1.0));
    let report = validate_phases(&gapped);
    assert!(report.valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("gap"));

    let overlapping = PhaseMap::new()
        .with("a", PhaseDefinition::new(0.0, 0.6))
        .with("b", PhaseDefinition::new(0.5, 1.0));
    let report = validate_phases(&overlapping);
    assert!(report.valid);
    assert!(report.warnings[0].contains("overlaps"));
}

#[test]
fn small_gaps_within_tolerance_pass() {
    let phases = PhaseMap::new()
        .with("a", PhaseDefinition::new(0.0, 0.495))
        .with("b", PhaseDefinition::new(0.5, 1.0));
    assert!(validate_phases(&phases).warnings.is_empty());
    assert_eq!(
        validate_phases_with_tolerance(&phases, 0.001).warnings.len(),
        1
    );
}
