use super::*;
use crate::scene::model::DurationSpec;

fn stacked() -> HeadlessDriver {
    let driver = HeadlessDriver::new(100.0);
    let a = SceneConfig::new("a", 0);
    let b = SceneConfig::new("b", 1).with_duration(DurationSpec::Viewports(2.0));
    for scene in [&b, &a] {
        let root = driver.resolve_root(&scene.id).unwrap();
        driver.attach(scene, &root);
    }
    driver
}

#[test]
fn layout_stacks_scenes_by_order() {
    let driver = stacked();
    assert_eq!(
        driver.layout(),
        vec![("a".to_string(), 0.0, 100.0), ("b".to_string(), 100.0, 300.0)]
    );
    assert_eq!(driver.total_px(), 300.0);
    assert_eq!(driver.position_of("b"), Some(100.0));
}

#[test]
fn first_move_enters_scene_under_position() {
    let driver = stacked();
    let signals = driver.scroll_to_position(0.0);
    assert_eq!(
        signals,
        vec![
            ("a".to_string(), DriverSignal::Enter),
            ("a".to_string(), DriverSignal::Progress(0.0)),
        ]
    );
}

#[test]
fn forward_move_leaves_before_entering() {
    let driver = stacked();
    driver.scroll_to_position(50.0);
    let signals = driver.scroll_to_position(200.0);
    assert_eq!(
        signals,
        vec![
            ("a".to_string(), DriverSignal::Progress(1.0)),
            ("a".to_string(), DriverSignal::Leave),
            ("b".to_string(), DriverSignal::Enter),
            ("b".to_string(), DriverSignal::Progress(0.5)),
        ]
    );
}

#[test]
fn backward_move_visits_later_scenes_first() {
    let driver = stacked();
    driver.scroll_to_position(200.0);
    let signals = driver.scroll_to_position(50.0);
    assert_eq!(signals[0], ("b".to_string(), DriverSignal::Progress(0.0)));
    assert_eq!(signals[1], ("b".to_string(), DriverSignal::Leave));
    assert_eq!(signals[2], ("a".to_string(), DriverSignal::Enter));
    assert_eq!(signals[3], ("a".to_string(), DriverSignal::Progress(0.5)));
}

#[test]
fn jumping_over_a_scene_settles_it() {
    let driver = stacked();
    let signals = driver.scroll_to_position(300.0);
    assert_eq!(
        signals,
        vec![
            ("a".to_string(), DriverSignal::Enter),
            ("a".to_string(), DriverSignal::Progress(1.0)),
            ("a".to_string(), DriverSignal::Leave),
            ("b".to_string(), DriverSignal::Enter),
            ("b".to_string(), DriverSignal::Progress(1.0)),
        ]
    );
}

#[test]
fn unchanged_position_is_silent() {
    let driver = stacked();
    driver.scroll_to_position(150.0);
    assert!(driver.scroll_to_position(150.0).is_empty());
}

#[test]
fn missing_roots_and_detach() {
    let driver = HeadlessDriver::new(100.0).without_root("ghost");
    assert!(driver.resolve_root("ghost").is_none());

    let scene = SceneConfig::new("real", 0);
    let root = driver.resolve_root("real").unwrap();
    assert_eq!(driver.resolve_root("real"), Some(root));
    let binding = driver.attach(&scene, &root);
    assert_eq!(driver.binding_count(), 1);
    driver.detach(binding);
    assert_eq!(driver.binding_count(), 0);
    assert_eq!(driver.total_px(), 0.0);
}

#[test]
fn scroll_to_records_request() {
    let driver = stacked();
    let root = driver.resolve_root("b").unwrap();
    let opts = TransitionOptions {
        offset_px: 10.0,
        ..TransitionOptions::default()
    };
    driver.scroll_to(&root, &opts);
    let requests = driver.take_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].scene_id, "b");
    assert_eq!(requests[0].position_px, 110.0);
    assert!(driver.take_requests().is_empty());

    driver.refresh();
    assert_eq!(driver.refresh_count(), 1);
}
