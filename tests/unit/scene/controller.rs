use super::*;
use crate::driver::headless::HeadlessDriver;
use crate::effects::model::{EffectCategory, EffectConfig};
use crate::effects::presets::{FADE, PULSE, register_presets};
use crate::elements::model::{ElementConfig, ElementState};
use crate::elements::registry::ElementLifecycle;
use crate::foundation::core::ManualClock;
use crate::foundation::props::Props;
use crate::scene::model::PhaseDefinition;
use std::cell::{Cell, RefCell};

struct Fixture {
    elements: ElementRegistry,
    effects: EffectRegistry,
    driver: HeadlessDriver,
    seen: Rc<RefCell<Vec<f64>>>,
}

fn fixture() -> Fixture {
    let clock = Rc::new(ManualClock::starting_at(0.0));
    let elements = ElementRegistry::new();
    let effects = EffectRegistry::with_clock(clock);
    register_presets(&effects);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    effects.register_fn(
        EffectConfig::new("tracer", EffectCategory::Transform),
        move |state: &ElementState, progress, _: &Props, _| {
            sink.borrow_mut().push(progress);
            ElementState {
                opacity: progress,
                ..state.clone()
            }
        },
    );
    elements.register(ElementConfig::new("hero"));

    Fixture {
        elements,
        effects,
        driver: HeadlessDriver::new(100.0),
        seen,
    }
}

fn three_phase_scene() -> SceneConfig {
    SceneConfig::new("opening", 0)
        .with_phase("intro", PhaseDefinition::new(0.0, 0.2))
        .with_phase("hold", PhaseDefinition::new(0.2, 0.8))
        .with_phase("outro", PhaseDefinition::new(0.8, 1.0))
        .with_effect(EffectRef::new("tracer", "hero", ["hold"]))
}

fn controller(fx: &Fixture, scene: SceneConfig, settle_ms: u64) -> SceneController {
    SceneController::new(
        Rc::new(scene),
        fx.elements.clone(),
        fx.effects.clone(),
        Rc::new(ManualClock::starting_at(0.0)),
        ControllerOpts {
            settle_delay: Duration::from_millis(settle_ms),
        },
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn count_events(ctrl: &SceneController, event: SceneEvent) -> Rc<RefCell<Vec<SceneEventPayload>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    ctrl.on(event, move |p| sink.borrow_mut().push(p.clone()));
    log
}

#[test]
fn mid_scene_update_drives_hold_effect_once() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);
    ctrl.initialize(&fx.driver).unwrap();

    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    fx.elements.subscribe("hero", move |_| c.set(c.get() + 1));

    ctrl.update(0.5);

    assert!(approx(ctrl.get_phase_progress("hold").unwrap(), 0.5));
    assert_eq!(ctrl.get_phase_progress("intro"), Some(1.0));
    assert_eq!(ctrl.get_phase_progress("outro"), Some(0.0));
    assert_eq!(calls.get(), 1);
    assert_eq!(fx.seen.borrow().len(), 1);
    assert!(approx(fx.seen.borrow()[0], 0.5));
    assert!(approx(fx.elements.get_state("hero").unwrap().opacity, 0.5));
    assert!(approx(ctrl.timeline_position(), 0.5));
}

#[test]
fn repeated_update_is_idempotent() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);
    ctrl.initialize(&fx.driver).unwrap();

    ctrl.update(0.5);
    let first_state = fx.elements.get_state("hero").unwrap();
    let first_phases = ctrl.state().phase_progress.clone();
    ctrl.update(0.5);

    assert_eq!(fx.elements.get_state("hero").unwrap(), first_state);
    assert_eq!(ctrl.state().phase_progress, first_phases);
}

#[test]
fn backward_seek_matches_direct_seek() {
    let fx = fixture();
    let scene = SceneConfig::new("s", 0)
        .with_phase("reveal", PhaseDefinition::new(0.0, 1.0))
        .with_effect(EffectRef::new(FADE, "hero", ["reveal"]));
    let mut ctrl = controller(&fx, scene, 100);
    ctrl.initialize(&fx.driver).unwrap();

    ctrl.update(0.9);
    ctrl.update(0.25);
    let via_jump = fx.elements.get_state("hero").unwrap();

    fx.elements.reset("hero");
    ctrl.update(0.25);
    assert_eq!(fx.elements.get_state("hero").unwrap(), via_jump);
    assert!(approx(via_jump.opacity, 0.25));
}

#[test]
fn effects_outside_their_phases_are_not_applied() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);
    ctrl.initialize(&fx.driver).unwrap();

    ctrl.update(0.1);
    ctrl.update(0.9);
    assert!(fx.seen.borrow().is_empty());
    assert!(ctrl.get_debug_info().active_effects.is_empty());

    ctrl.update(0.3);
    assert_eq!(ctrl.get_debug_info().active_effects, vec!["tracer".to_string()]);
}

#[test]
fn first_active_phase_follows_declaration_order() {
    let fx = fixture();
    let scene = SceneConfig::new("s", 0)
        .with_phase("late", PhaseDefinition::new(0.4, 0.9))
        .with_phase("early", PhaseDefinition::new(0.0, 0.6))
        .with_effect(EffectRef::new("tracer", "hero", ["early", "late"]));
    let mut ctrl = controller(&fx, scene, 100);
    ctrl.initialize(&fx.driver).unwrap();

    ctrl.update(0.5);
    // "late" is declared first, so its 0.2 wins over "early"'s 0.833.
    assert!(approx(fx.seen.borrow()[0], 0.2));
}

#[test]
fn phase_boundaries_emit_enter_and_exit() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);
    ctrl.initialize(&fx.driver).unwrap();
    let entered = count_events(&ctrl, SceneEvent::PhaseEnter);
    let exited = count_events(&ctrl, SceneEvent::PhaseExit);
    let progress = count_events(&ctrl, SceneEvent::Progress);

    ctrl.update(0.1);
    ctrl.update(0.5);
    ctrl.update(0.5);

    let names = |log: &Rc<RefCell<Vec<SceneEventPayload>>>| {
        log.borrow()
            .iter()
            .map(|p| p.phase.clone().unwrap_or_default())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&entered), vec!["intro", "hold"]);
    assert_eq!(names(&exited), vec!["intro"]);
    assert_eq!(progress.borrow().len(), 3);
    assert_eq!(progress.borrow()[2].phase_progress.len(), 3);
}

#[test]
fn lifecycle_settles_through_frames() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene().pinned(true), 100);
    ctrl.initialize(&fx.driver).unwrap();
    let enters = count_events(&ctrl, SceneEvent::Enter);
    let completes = count_events(&ctrl, SceneEvent::Complete);

    assert_eq!(ctrl.lifecycle(), Lifecycle::Idle);
    ctrl.on_enter();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Entering);
    assert!(ctrl.state().is_active);
    assert!(ctrl.state().is_pinned);

    ctrl.on_enter();
    assert_eq!(enters.borrow().len(), 1);

    ctrl.frame(Duration::from_millis(60));
    assert_eq!(ctrl.lifecycle(), Lifecycle::Entering);
    ctrl.frame(Duration::from_millis(60));
    assert_eq!(ctrl.lifecycle(), Lifecycle::Active);

    ctrl.on_leave();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Exiting);
    assert!(!ctrl.state().is_active);
    assert!(!ctrl.state().is_pinned);
    ctrl.frame(Duration::from_millis(100));
    assert_eq!(ctrl.lifecycle(), Lifecycle::Complete);
    assert_eq!(completes.borrow().len(), 1);

    ctrl.on_enter();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Entering);
    assert_eq!(enters.borrow().len(), 2);
}

#[test]
fn reentry_during_exit_cancels_completion() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);
    ctrl.initialize(&fx.driver).unwrap();
    let completes = count_events(&ctrl, SceneEvent::Complete);

    ctrl.on_enter();
    ctrl.on_leave();
    ctrl.frame(Duration::from_millis(50));
    ctrl.on_enter();
    ctrl.frame(Duration::from_millis(100));

    assert_eq!(ctrl.lifecycle(), Lifecycle::Active);
    assert!(completes.borrow().is_empty());
}

#[test]
fn zero_settle_delay_transitions_immediately() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 0);
    ctrl.initialize(&fx.driver).unwrap();

    ctrl.on_enter();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Active);
    ctrl.on_leave();
    assert_eq!(ctrl.lifecycle(), Lifecycle::Complete);
}

#[test]
fn missing_root_fails_initialize() {
    let fx = fixture();
    let driver = HeadlessDriver::new(100.0).without_root("opening");
    let mut ctrl = controller(&fx, three_phase_scene(), 100);

    let err = ctrl.initialize(&driver).unwrap_err();
    assert!(matches!(err, StoryboardError::MissingRoot(ref id) if id == "opening"));
    assert!(!ctrl.is_initialized());
    assert_eq!(driver.binding_count(), 0);
    assert_eq!(fx.effects.instance_count(), 0);
}

#[test]
fn initialize_is_idempotent_and_skips_unknown_effects() {
    let fx = fixture();
    let scene = three_phase_scene().with_effect(EffectRef::new("nope", "hero", ["hold"]));
    let mut ctrl = controller(&fx, scene, 100);

    ctrl.initialize(&fx.driver).unwrap();
    ctrl.initialize(&fx.driver).unwrap();

    assert_eq!(ctrl.instance_ids().len(), 1);
    assert_eq!(fx.driver.binding_count(), 1);
    assert!(ctrl.root().is_some());
}

#[test]
fn unknown_target_and_phase_are_skipped() {
    let fx = fixture();
    let scene = three_phase_scene()
        .with_effect(EffectRef::new("tracer", "ghost", ["hold"]))
        .with_effect(EffectRef::new("tracer", "hero", ["missing"]));
    let mut ctrl = controller(&fx, scene, 100);
    ctrl.initialize(&fx.driver).unwrap();

    ctrl.update(0.5);
    assert_eq!(fx.seen.borrow().len(), 1);
    assert!(!fx.elements.contains("ghost"));
    assert_eq!(ctrl.get_phase_progress("missing"), None);
}

#[test]
fn update_guards() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);

    ctrl.update(0.5);
    assert_eq!(ctrl.state().progress, 0.0);

    ctrl.initialize(&fx.driver).unwrap();
    ctrl.update(1.7);
    assert_eq!(ctrl.state().progress, 1.0);
    ctrl.update(f64::NAN);
    assert_eq!(ctrl.state().progress, 1.0);
    ctrl.update(-3.0);
    assert_eq!(ctrl.state().progress, 0.0);
    assert!(ctrl.state().last_update.is_some());
}

#[test]
fn continuous_effects_advance_only_while_active() {
    let fx = fixture();
    let scene = SceneConfig::new("ambient", 0).with_effect(
        EffectRef::new(PULSE, "hero", Vec::<String>::new()).with_params(
            Props::new()
                .with("period", 1.0)
                .with("min", 0.0)
                .with("max", 1.0),
        ),
    );
    let mut ctrl = controller(&fx, scene, 100);
    ctrl.initialize(&fx.driver).unwrap();

    ctrl.frame(Duration::from_millis(500));
    assert_eq!(fx.elements.get_state("hero").unwrap().opacity, 1.0);
    fx.elements.set_state("hero", ElementPatch::new().opacity(0.3));

    ctrl.on_enter();
    ctrl.frame(Duration::from_millis(500));
    assert!(approx(fx.elements.get_state("hero").unwrap().opacity, 1.0));
    ctrl.frame(Duration::from_millis(500));
    assert!(approx(fx.elements.get_state("hero").unwrap().opacity, 0.0));
}

#[test]
fn persistent_elements_get_scene_hooks() {
    struct Recorder(Rc<RefCell<Vec<String>>>);
    impl ElementLifecycle for Recorder {
        fn on_scene_enter(&self, element_id: &str, scene_id: &str) {
            self.0.borrow_mut().push(format!("enter {element_id} {scene_id}"));
        }
        fn on_scene_exit(&self, element_id: &str, scene_id: &str) {
            self.0.borrow_mut().push(format!("exit {element_id} {scene_id}"));
        }
    }

    let fx = fixture();
    fx.elements.register(ElementConfig::new("logo"));
    fx.elements.register(ElementConfig::new("sky").global().in_scene("opening"));
    let log = Rc::new(RefCell::new(Vec::new()));
    fx.elements.set_lifecycle("logo", Recorder(Rc::clone(&log)));
    fx.elements.set_lifecycle("sky", Recorder(Rc::clone(&log)));
    fx.elements.set_lifecycle("hero", Recorder(Rc::clone(&log)));

    let scene = three_phase_scene()
        .with_element("logo", true)
        .with_element("hero", false);
    let mut ctrl = controller(&fx, scene, 100);
    ctrl.initialize(&fx.driver).unwrap();
    ctrl.on_enter();
    ctrl.on_leave();

    assert_eq!(
        *log.borrow(),
        vec![
            "enter logo opening",
            "enter sky opening",
            "exit logo opening",
            "exit sky opening",
        ]
    );
}

#[test]
fn cleanup_tears_down_and_is_idempotent() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);
    ctrl.initialize(&fx.driver).unwrap();
    let progress = count_events(&ctrl, SceneEvent::Progress);
    ctrl.on_enter();
    ctrl.update(0.5);

    ctrl.cleanup(&fx.driver);
    ctrl.cleanup(&fx.driver);

    assert!(!ctrl.is_initialized());
    assert_eq!(ctrl.lifecycle(), Lifecycle::Idle);
    assert_eq!(fx.driver.binding_count(), 0);
    assert_eq!(fx.effects.instance_count(), 0);
    assert_eq!(ctrl.get_phase_progress("hold"), Some(0.0));

    ctrl.initialize(&fx.driver).unwrap();
    ctrl.update(0.5);
    assert_eq!(progress.borrow().len(), 1);
}

#[test]
fn debug_info_reflects_state() {
    let fx = fixture();
    let mut ctrl = controller(&fx, three_phase_scene(), 100);
    ctrl.initialize(&fx.driver).unwrap();
    ctrl.on_enter();
    ctrl.update(0.5);

    let info = ctrl.get_debug_info();
    assert_eq!(info.id, "opening");
    assert_eq!(info.order, 0);
    assert!(info.initialized);
    assert_eq!(info.lifecycle, Lifecycle::Entering);
    assert!(info.is_active);

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["lifecycle"], "entering");
    assert!(json["phase_progress"]["hold"].as_f64().is_some());
}
