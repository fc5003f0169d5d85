use crate::driver::{DriverSignal, ScrollDriver, TransitionOptions};
use crate::effects::registry::EffectRegistry;
use crate::elements::model::ElementConfig;
use crate::elements::registry::ElementRegistry;
use crate::foundation::core::{Clock, SystemClock};
use crate::foundation::error::StoryboardResult;
use crate::foundation::observer::{ListenerId, Subject};
use crate::scene::controller::{SceneController, SceneEvent, SceneEventPayload};
use crate::scene::model::SceneConfig;
use crate::scene::phase::{PhaseValidation, validate_phases_with_tolerance};
use crate::storyboard::config::{StoryboardConfig, StoryboardOpts, validate_scene_order};
use crate::storyboard::debug::StoryboardDebugInfo;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

/// Manager-level event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManagerEvent {
    /// `transition_to_scene` accepted a request.
    TransitionStart,
    /// The transition target entered.
    TransitionComplete,
    /// The active scene was set or cleared.
    ActiveSceneChanged,
}

/// Delivered with every [`ManagerEvent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerEventPayload {
    /// Previously active scene.
    pub from: Option<String>,
    /// Newly active scene, or the transition target.
    pub to: Option<String>,
}

/// Active-scene tracking shared with controller listeners.
#[derive(Default)]
struct Tracker {
    active: RefCell<Option<String>>,
    pending_transition: RefCell<Option<String>>,
    events: Subject<ManagerEvent, ManagerEventPayload>,
}

impl Tracker {
    fn scene_entered(&self, scene_id: &str) {
        let previous = self.active.replace(Some(scene_id.to_string()));
        if previous.as_deref() != Some(scene_id) {
            self.events.emit(
                &ManagerEvent::ActiveSceneChanged,
                &ManagerEventPayload {
                    from: previous.clone(),
                    to: Some(scene_id.to_string()),
                },
            );
        }

        let completes = self.pending_transition.borrow().as_deref() == Some(scene_id);
        if completes {
            self.pending_transition.replace(None);
            self.events.emit(
                &ManagerEvent::TransitionComplete,
                &ManagerEventPayload {
                    from: previous,
                    to: Some(scene_id.to_string()),
                },
            );
        }
    }

    fn scene_exited(&self, scene_id: &str) {
        let was_active = self.active.borrow().as_deref() == Some(scene_id);
        if !was_active {
            return;
        }
        self.active.replace(None);
        self.events.emit(
            &ManagerEvent::ActiveSceneChanged,
            &ManagerEventPayload {
                from: Some(scene_id.to_string()),
                to: None,
            },
        );
    }

    fn scene_progressed(&self, payload: &SceneEventPayload) {
        if self.active.borrow().is_none() && payload.lifecycle.is_inside() {
            self.scene_entered(&payload.scene_id);
        }
    }

    fn active(&self) -> Option<String> {
        self.active.borrow().clone()
    }
}

/// Owns the scene controllers and the shared registries, and routes driver signals.
pub struct StoryboardManager {
    scenes: Vec<Rc<SceneConfig>>,
    element_configs: Vec<ElementConfig>,
    diagnostics: BTreeMap<String, PhaseValidation>,
    opts: StoryboardOpts,

    elements: ElementRegistry,
    effects: EffectRegistry,
    driver: Rc<dyn ScrollDriver>,
    clock: Rc<dyn Clock>,

    initialized: bool,
    registered_elements: Vec<String>,
    controllers: Vec<SceneController>,
    index: HashMap<String, usize>,
    tracker: Rc<Tracker>,
}

impl StoryboardManager {
    /// Validate the scene list and prepare a manager; nothing is wired until `initialize`.
    ///
    /// Fails with [`crate::StoryboardError::SceneOrder`] on duplicate ids, duplicate orders, or
    /// gaps. Phase problems are logged and kept as diagnostics.
    pub fn new(
        config: StoryboardConfig,
        driver: Rc<dyn ScrollDriver>,
        opts: StoryboardOpts,
    ) -> StoryboardResult<Self> {
        Self::with_clock(config, driver, opts, Rc::new(SystemClock::new()))
    }

    /// [`StoryboardManager::new`] with an explicit clock for timestamps.
    pub fn with_clock(
        config: StoryboardConfig,
        driver: Rc<dyn ScrollDriver>,
        opts: StoryboardOpts,
        clock: Rc<dyn Clock>,
    ) -> StoryboardResult<Self> {
        validate_scene_order(&config.scenes)?;

        let mut diagnostics = BTreeMap::new();
        for scene in &config.scenes {
            let report = validate_phases_with_tolerance(&scene.phases, opts.phase_tolerance);
            for err in &report.errors {
                tracing::error!(scene = %scene.id, "{err}");
            }
            for warning in &report.warnings {
                tracing::warn!(scene = %scene.id, "{warning}");
            }
            diagnostics.insert(scene.id.clone(), report);
        }

        let mut scenes: Vec<Rc<SceneConfig>> = config.scenes.into_iter().map(Rc::new).collect();
        scenes.sort_by_key(|s| s.order);

        Ok(Self {
            scenes,
            element_configs: config.elements,
            diagnostics,
            opts,
            elements: ElementRegistry::new(),
            effects: EffectRegistry::with_clock(Rc::clone(&clock)),
            driver,
            clock,
            initialized: false,
            registered_elements: Vec::new(),
            controllers: Vec::new(),
            index: HashMap::new(),
            tracker: Rc::new(Tracker::default()),
        })
    }

    /// Register elements, build and wire controllers, and initialize them. Idempotent.
    ///
    /// A scene that fails to initialize is logged and left non-functional.
    #[tracing::instrument(skip(self), fields(scenes = self.scenes.len()))]
    pub fn initialize(&mut self) {
        if self.initialized {
            tracing::debug!("storyboard already initialized");
            return;
        }

        let (globals, scoped): (Vec<&ElementConfig>, Vec<&ElementConfig>) =
            self.element_configs.iter().partition(|e| e.is_persistent());
        for element in globals.into_iter().chain(scoped) {
            if self.elements.register(element.clone()) {
                self.registered_elements.push(element.id.clone());
            }
        }

        for scene in &self.scenes {
            let controller = SceneController::new(
                Rc::clone(scene),
                self.elements.clone(),
                self.effects.clone(),
                Rc::clone(&self.clock),
                self.opts.controller.clone(),
            );
            self.wire(&controller);
            self.index.insert(scene.id.clone(), self.controllers.len());
            self.controllers.push(controller);
        }

        let mut failed = 0usize;
        for controller in &mut self.controllers {
            if let Err(err) = controller.initialize(self.driver.as_ref()) {
                tracing::error!(
                    scene = %controller.id(),
                    error = %err,
                    "scene left non-functional"
                );
                failed += 1;
            }
        }

        self.initialized = true;
        tracing::info!(
            scenes = self.controllers.len(),
            failed,
            elements = self.registered_elements.len(),
            "storyboard initialized"
        );
    }

    fn wire(&self, controller: &SceneController) {
        let tracker = Rc::clone(&self.tracker);
        controller.on(SceneEvent::Enter, move |p| tracker.scene_entered(&p.scene_id));
        let tracker = Rc::clone(&self.tracker);
        controller.on(SceneEvent::Exit, move |p| tracker.scene_exited(&p.scene_id));
        let tracker = Rc::clone(&self.tracker);
        controller.on(SceneEvent::Progress, move |p| tracker.scene_progressed(p));
    }

    /// Tear down every controller and unregister the elements this manager registered.
    /// Idempotent.
    pub fn cleanup(&mut self) {
        for controller in &mut self.controllers {
            controller.cleanup(self.driver.as_ref());
        }
        self.controllers.clear();
        self.index.clear();
        for id in self.registered_elements.drain(..) {
            self.elements.unregister(&id);
        }
        self.tracker.active.replace(None);
        self.tracker.pending_transition.replace(None);
        if self.initialized {
            tracing::info!("storyboard cleaned up");
        }
        self.initialized = false;
    }

    /// Return `true` between `initialize` and `cleanup`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Route one driver signal to its scene. Returns `false` for an unknown scene.
    pub fn dispatch(&mut self, scene_id: &str, signal: DriverSignal) -> bool {
        let Some(&idx) = self.index.get(scene_id) else {
            tracing::warn!(scene = %scene_id, ?signal, "signal for unknown scene; ignoring");
            return false;
        };
        let controller = &mut self.controllers[idx];
        match signal {
            DriverSignal::Enter => controller.on_enter(),
            DriverSignal::Leave => controller.on_leave(),
            DriverSignal::Progress(p) => controller.update(p),
        }
        true
    }

    /// [`StoryboardManager::dispatch`] for a batch, in order.
    pub fn dispatch_all<I>(&mut self, signals: I)
    where
        I: IntoIterator<Item = (String, DriverSignal)>,
    {
        for (scene_id, signal) in signals {
            self.dispatch(&scene_id, signal);
        }
    }

    /// Advance every scene's settle timers and continuous effects.
    pub fn frame(&mut self, delta: Duration) {
        for controller in &mut self.controllers {
            controller.frame(delta);
        }
    }

    /// Ask the driver to recompute scroll ranges.
    pub fn refresh(&self) {
        self.driver.refresh();
    }

    /// Scroll to a scene. Returns `false` when the scene is unknown, already active, or has no
    /// root; `transition-complete` fires when the scene next enters.
    #[tracing::instrument(skip(self, opts))]
    pub fn transition_to_scene(&mut self, scene_id: &str, opts: &TransitionOptions) -> bool {
        let Some(&idx) = self.index.get(scene_id) else {
            tracing::warn!("transition to unknown scene; ignoring");
            return false;
        };
        let from = self.tracker.active();
        if from.as_deref() == Some(scene_id) {
            tracing::warn!("transition to the active scene; ignoring");
            return false;
        }
        let Some(root) = self.controllers[idx].root() else {
            tracing::warn!("transition to an uninitialized scene; ignoring");
            return false;
        };

        self.tracker
            .pending_transition
            .replace(Some(scene_id.to_string()));
        self.tracker.events.emit(
            &ManagerEvent::TransitionStart,
            &ManagerEventPayload {
                from,
                to: Some(scene_id.to_string()),
            },
        );
        self.driver.scroll_to(&root, opts);
        true
    }

    /// Controller for `scene_id`.
    pub fn get_scene(&self, scene_id: &str) -> Option<&SceneController> {
        self.index.get(scene_id).map(|&i| &self.controllers[i])
    }

    /// Mutable controller for `scene_id`.
    pub fn get_scene_mut(&mut self, scene_id: &str) -> Option<&mut SceneController> {
        self.index.get(scene_id).map(|&i| &mut self.controllers[i])
    }

    /// Controllers in scene order.
    pub fn get_all_scenes(&self) -> &[SceneController] {
        &self.controllers
    }

    /// Controller of the active scene.
    pub fn get_active_scene(&self) -> Option<&SceneController> {
        self.tracker
            .active()
            .and_then(|id| self.index.get(&id).map(|&i| &self.controllers[i]))
    }

    /// Id of the active scene.
    pub fn active_scene_id(&self) -> Option<String> {
        self.tracker.active()
    }

    /// Listen for a manager event.
    pub fn on(
        &self,
        event: ManagerEvent,
        listener: impl Fn(&ManagerEventPayload) + 'static,
    ) -> ListenerId {
        self.tracker.events.on(event, listener)
    }

    /// Remove a manager listener. Idempotent.
    pub fn off(&self, id: ListenerId) -> bool {
        self.tracker.events.off(id)
    }

    /// Shared element registry.
    pub fn elements(&self) -> &ElementRegistry {
        &self.elements
    }

    /// Shared effect registry. Register effects here before `initialize`.
    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    /// Phase diagnostics collected at construction, keyed by scene id.
    pub fn phase_diagnostics(&self) -> &BTreeMap<String, PhaseValidation> {
        &self.diagnostics
    }

    /// Snapshot of every scene, both registries, and phase diagnostics.
    pub fn get_debug_info(&self) -> StoryboardDebugInfo {
        StoryboardDebugInfo {
            initialized: self.initialized,
            active_scene: self.tracker.active(),
            scenes: self.controllers.iter().map(SceneController::get_debug_info).collect(),
            element_count: self.elements.len(),
            effect_count: self.effects.len(),
            instance_count: self.effects.instance_count(),
            phase_diagnostics: self.diagnostics.clone(),
        }
    }
}

impl std::fmt::Debug for StoryboardManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryboardManager")
            .field("scenes", &self.scenes.len())
            .field("initialized", &self.initialized)
            .field("active", &self.tracker.active())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/manager.rs"]
mod tests;
