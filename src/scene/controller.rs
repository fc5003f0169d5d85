use crate::driver::{DriverBinding, SceneRoot, ScrollDriver};
use crate::effects::model::InstanceId;
use crate::effects::registry::EffectRegistry;
use crate::elements::model::ElementPatch;
use crate::elements::registry::ElementRegistry;
use crate::foundation::core::{Clock, Timestamp};
use crate::foundation::error::{StoryboardError, StoryboardResult};
use crate::foundation::observer::{ListenerId, Subject};
use crate::scene::lifecycle::{Lifecycle, Settle};
use crate::scene::model::{EffectRef, SceneConfig};
use crate::scene::phase::{PhaseProgress, map_all_phases};
use std::rc::Rc;
use std::time::Duration;

/// Tuning for [`SceneController`].
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerOpts {
    /// Time between an enter/leave signal and the settled lifecycle state.
    pub settle_delay: Duration,
}

impl Default for ControllerOpts {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
        }
    }
}

/// Scene event kinds a listener can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneEvent {
    /// The scene became active.
    Enter,
    /// The scene stopped being active.
    Exit,
    /// Scene progress changed.
    Progress,
    /// A phase moved strictly inside `(0, 1)`.
    PhaseEnter,
    /// A phase left `(0, 1)` at either end.
    PhaseExit,
    /// The exit settle delay elapsed.
    Complete,
}

/// Delivered with every [`SceneEvent`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEventPayload {
    /// Emitting scene.
    pub scene_id: String,
    /// Lifecycle at emission time.
    pub lifecycle: Lifecycle,
    /// Scene progress in `[0, 1]`.
    pub progress: f64,
    /// The phase for `PhaseEnter` / `PhaseExit`.
    pub phase: Option<String>,
    /// Every phase, in declaration order.
    pub phase_progress: PhaseProgress,
}

/// Mutable runtime state of one scene.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SceneState {
    /// Last applied scene progress in `[0, 1]`.
    pub progress: f64,
    /// Between enter and exit.
    pub is_active: bool,
    /// Active and the scene config asks for pinning.
    pub is_pinned: bool,
    /// Progress of each declared phase.
    pub phase_progress: PhaseProgress,
    /// Clock time of the last update, `None` before the first.
    pub last_update: Option<Timestamp>,
}

/// Snapshot from [`SceneController::get_debug_info`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneDebugInfo {
    /// Scene id.
    pub id: String,
    /// Storyboard position.
    pub order: u32,
    /// Whether `initialize` resolved a root.
    pub initialized: bool,
    /// Current lifecycle.
    pub lifecycle: Lifecycle,
    /// Scene progress.
    pub progress: f64,
    /// Between enter and exit.
    pub is_active: bool,
    /// Pinned while active.
    pub is_pinned: bool,
    /// Progress of each declared phase.
    pub phase_progress: PhaseProgress,
    /// Effect ids currently mid-phase.
    pub active_effects: Vec<String>,
}

#[derive(Clone, Debug)]
struct BoundEffect {
    effect: EffectRef,
    instance: InstanceId,
}

/// Drives one scene: lifecycle, phase progress, and effect application.
///
/// Every `update` is a full recomputation from the given progress, so seeking backwards or
/// jumping produces the same element state as scrolling there would.
pub struct SceneController {
    config: Rc<SceneConfig>,
    elements: ElementRegistry,
    effects: EffectRegistry,
    clock: Rc<dyn Clock>,
    opts: ControllerOpts,

    initialized: bool,
    lifecycle: Lifecycle,
    settle: Option<Settle>,
    state: SceneState,
    timeline_position: f64,
    frame_delta: f64,
    root: Option<SceneRoot>,
    binding: Option<DriverBinding>,
    bound: Vec<BoundEffect>,
    events: Subject<SceneEvent, SceneEventPayload>,
}

impl SceneController {
    /// Controller for `config`, sharing the given registries and clock.
    ///
    /// Nothing touches the driver until [`SceneController::initialize`].
    pub fn new(
        config: Rc<SceneConfig>,
        elements: ElementRegistry,
        effects: EffectRegistry,
        clock: Rc<dyn Clock>,
        opts: ControllerOpts,
    ) -> Self {
        let state = SceneState {
            phase_progress: map_all_phases(0.0, &config.phases),
            ..SceneState::default()
        };
        Self {
            config,
            elements,
            effects,
            clock,
            opts,
            initialized: false,
            lifecycle: Lifecycle::Idle,
            settle: None,
            state,
            timeline_position: 0.0,
            frame_delta: 0.0,
            root: None,
            binding: None,
            bound: Vec::new(),
            events: Subject::new(),
        }
    }

    /// Scene id.
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Configuration this controller was built from.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Current runtime state.
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Current lifecycle phase.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Return `true` once a root was resolved and the scene bound.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resolved root, once initialized.
    pub fn root(&self) -> Option<SceneRoot> {
        self.root
    }

    /// Position of the scene's internal timeline in `[0, 1]`.
    pub fn timeline_position(&self) -> f64 {
        self.timeline_position
    }

    /// Effect instances owned by this scene, in declaration order.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.bound.iter().map(|b| b.instance.clone()).collect()
    }

    /// Resolve the root, create effect instances, and attach to the driver.
    ///
    /// Idempotent. Fails with [`StoryboardError::MissingRoot`] when the host has no root for
    /// this scene; effects that cannot be instantiated are logged and skipped.
    pub fn initialize(&mut self, driver: &dyn ScrollDriver) -> StoryboardResult<()> {
        if self.initialized {
            tracing::debug!(scene = %self.config.id, "scene already initialized");
            return Ok(());
        }

        let Some(root) = driver.resolve_root(&self.config.id) else {
            tracing::error!(scene = %self.config.id, "scene root container not found");
            return Err(StoryboardError::missing_root(&self.config.id));
        };

        for effect in &self.config.effects {
            if !self.elements.contains(&effect.target) {
                tracing::debug!(
                    scene = %self.config.id,
                    effect = %effect.id,
                    target = %effect.target,
                    "effect target not registered; it will be skipped until it is"
                );
            }
            match self
                .effects
                .create_instance(&effect.id, &effect.target, Some(&effect.params))
            {
                Ok(instance) => self.bound.push(BoundEffect {
                    effect: effect.clone(),
                    instance,
                }),
                Err(err) => {
                    tracing::warn!(scene = %self.config.id, error = %err, "skipping effect");
                }
            }
        }

        self.binding = Some(driver.attach(&self.config, &root));
        self.root = Some(root);
        self.initialized = true;
        tracing::debug!(
            scene = %self.config.id,
            effects = self.bound.len(),
            "scene initialized"
        );
        Ok(())
    }

    /// Handle an enter signal.
    pub fn on_enter(&mut self) {
        if !self.initialized {
            tracing::warn!(scene = %self.config.id, "enter before initialize; ignoring");
            return;
        }
        if !self.lifecycle.can_enter() {
            tracing::debug!(scene = %self.config.id, lifecycle = %self.lifecycle, "enter ignored");
            return;
        }
        self.lifecycle = Lifecycle::Entering;
        self.settle = Some(Settle::new(Lifecycle::Active, self.opts.settle_delay));
        self.state.is_active = true;
        self.state.is_pinned = self.config.pin;
        tracing::debug!(scene = %self.config.id, "scene enter");

        for id in self.persistent_element_ids() {
            self.elements.notify_scene_enter(&id, &self.config.id);
        }
        self.emit(SceneEvent::Enter, None);
        self.settle_if_immediate();
    }

    /// Handle a leave signal.
    pub fn on_leave(&mut self) {
        if !self.initialized {
            return;
        }
        if !self.lifecycle.can_leave() {
            tracing::debug!(scene = %self.config.id, lifecycle = %self.lifecycle, "leave ignored");
            return;
        }
        self.lifecycle = Lifecycle::Exiting;
        self.settle = Some(Settle::new(Lifecycle::Complete, self.opts.settle_delay));
        self.state.is_active = false;
        self.state.is_pinned = false;
        tracing::debug!(scene = %self.config.id, "scene exit");

        for id in self.persistent_element_ids() {
            self.elements.notify_scene_exit(&id, &self.config.id);
        }
        self.emit(SceneEvent::Exit, None);
        self.settle_if_immediate();
    }

    /// Recompute phases for `progress`, seek the timeline, and apply effects.
    ///
    /// `progress` is clamped to `[0, 1]`; NaN is ignored.
    pub fn update(&mut self, progress: f64) {
        if !self.initialized {
            tracing::warn!(scene = %self.config.id, "update before initialize; ignoring");
            return;
        }
        if progress.is_nan() {
            tracing::warn!(scene = %self.config.id, "NaN scene progress; ignoring");
            return;
        }
        let progress = progress.clamp(0.0, 1.0);

        let next = map_all_phases(progress, &self.config.phases);
        let previous = std::mem::replace(&mut self.state.phase_progress, next);
        self.state.progress = progress;
        self.state.last_update = Some(self.clock.now());
        self.timeline_position = progress;

        let mut entered = Vec::new();
        let mut exited = Vec::new();
        for name in self.state.phase_progress.names() {
            let was = previous.is_mid_phase(name);
            let now = self.state.phase_progress.is_mid_phase(name);
            if now && !was {
                entered.push(name.to_string());
            } else if was && !now {
                exited.push(name.to_string());
            }
        }

        self.apply_effects();

        for name in &exited {
            self.emit(SceneEvent::PhaseExit, Some(name));
        }
        for name in &entered {
            self.emit(SceneEvent::PhaseEnter, Some(name));
        }
        self.emit(SceneEvent::Progress, None);
    }

    /// Advance settle timers and continuous effects by `delta`.
    pub fn frame(&mut self, delta: Duration) {
        if !self.initialized {
            return;
        }
        self.frame_delta = delta.as_secs_f64();

        if let Some(settle) = &mut self.settle
            && settle.advance(delta)
        {
            let to = settle.to;
            self.settle = None;
            self.settle_into(to);
        }

        if !self.state.is_active {
            return;
        }
        for bound in &self.bound {
            if !self.effects.is_continuous(&bound.instance) {
                continue;
            }
            let Some(current) = self.elements.get_state(&bound.effect.target) else {
                continue;
            };
            if let Some(next) = self
                .effects
                .update_instance(&bound.instance, &current, self.frame_delta)
            {
                self.elements
                    .set_state(&bound.effect.target, ElementPatch::diff(&current, &next));
            }
        }
    }

    /// Progress of one phase, `None` for an undeclared name.
    pub fn get_phase_progress(&self, phase: &str) -> Option<f64> {
        self.state.phase_progress.get(phase)
    }

    /// Listen for `event`. Listeners run in subscription order.
    pub fn on(
        &self,
        event: SceneEvent,
        listener: impl Fn(&SceneEventPayload) + 'static,
    ) -> ListenerId {
        self.events.on(event, listener)
    }

    /// Remove a listener. Idempotent.
    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Snapshot for debugging overlays and logs.
    pub fn get_debug_info(&self) -> SceneDebugInfo {
        SceneDebugInfo {
            id: self.config.id.clone(),
            order: self.config.order,
            initialized: self.initialized,
            lifecycle: self.lifecycle,
            progress: self.state.progress,
            is_active: self.state.is_active,
            is_pinned: self.state.is_pinned,
            phase_progress: self.state.phase_progress.clone(),
            active_effects: self
                .bound
                .iter()
                .filter(|b| self.active_phase_progress(&b.effect).is_some())
                .map(|b| b.effect.id.clone())
                .collect(),
        }
    }

    /// Destroy effect instances, detach from the driver, and drop listeners. Idempotent.
    pub fn cleanup(&mut self, driver: &dyn ScrollDriver) {
        if let Some(binding) = self.binding.take() {
            driver.detach(binding);
        }
        for bound in self.bound.drain(..) {
            self.effects.destroy_instance(&bound.instance);
        }
        self.events.clear();
        self.settle = None;
        self.root = None;
        self.lifecycle = Lifecycle::Idle;
        self.state = SceneState {
            phase_progress: map_all_phases(0.0, &self.config.phases),
            ..SceneState::default()
        };
        self.timeline_position = 0.0;
        if self.initialized {
            tracing::debug!(scene = %self.config.id, "scene cleaned up");
        }
        self.initialized = false;
    }

    /// First of the effect's phases, in scene declaration order, that is strictly mid-phase.
    fn active_phase_progress(&self, effect: &EffectRef) -> Option<f64> {
        self.state
            .phase_progress
            .iter()
            .filter(|(name, _)| effect.phases.iter().any(|p| p == name))
            .map(|(_, v)| v)
            .find(|v| *v > 0.0 && *v < 1.0)
    }

    fn apply_effects(&self) {
        for bound in &self.bound {
            let Some(phase_progress) = self.active_phase_progress(&bound.effect) else {
                self.effects.deactivate_instance(&bound.instance);
                continue;
            };
            let target = &bound.effect.target;
            let Some(current) = self.elements.get_state(target) else {
                continue;
            };
            let next = self.effects.apply_instance(
                &bound.instance,
                &current,
                phase_progress,
                self.frame_delta,
            );
            self.elements.set_state(target, ElementPatch::diff(&current, &next));
        }
    }

    fn persistent_element_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .config
            .elements
            .iter()
            .filter(|e| e.persistent)
            .map(|e| e.id.clone())
            .collect();
        for config in self.elements.persistent_elements() {
            if config.scenes.iter().any(|s| *s == self.config.id) && !ids.contains(&config.id) {
                ids.push(config.id);
            }
        }
        ids
    }

    fn settle_if_immediate(&mut self) {
        if self.opts.settle_delay.is_zero()
            && let Some(settle) = self.settle.take()
        {
            self.settle_into(settle.to);
        }
    }

    fn settle_into(&mut self, to: Lifecycle) {
        self.lifecycle = to;
        if to == Lifecycle::Complete {
            self.emit(SceneEvent::Complete, None);
        }
    }

    fn emit(&self, event: SceneEvent, phase: Option<&str>) {
        if self.events.listener_count(&event) == 0 {
            return;
        }
        let payload = SceneEventPayload {
            scene_id: self.config.id.clone(),
            lifecycle: self.lifecycle,
            progress: self.state.progress,
            phase: phase.map(str::to_string),
            phase_progress: self.state.phase_progress.clone(),
        };
        self.events.emit(&event, &payload);
    }
}

impl std::fmt::Debug for SceneController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneController")
            .field("id", &self.config.id)
            .field("lifecycle", &self.lifecycle)
            .field("progress", &self.state.progress)
            .field("effects", &self.bound.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/controller.rs"]
mod tests;
