use crate::effects::model::{
    EffectApplication, EffectCategory, EffectConfig, EffectInstance, FnEffect, InstanceId,
    RuntimeState,
};
use crate::elements::model::ElementState;
use crate::foundation::core::{Clock, SystemClock};
use crate::foundation::error::{StoryboardError, StoryboardResult};
use crate::foundation::props::Props;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

struct Registered {
    config: EffectConfig,
    application: Rc<dyn EffectApplication>,
}

#[derive(Default)]
struct Inner {
    effects: BTreeMap<String, Registered>,
    instances: BTreeMap<InstanceId, EffectInstance>,
}

/// Effect configurations, their applications, and the instances bound to elements.
///
/// A cheap-clone handle like [`crate::ElementRegistry`]. Application hooks run with no internal
/// borrow held.
#[derive(Clone)]
pub struct EffectRegistry {
    inner: Rc<RefCell<Inner>>,
    clock: Rc<dyn Clock>,
}

impl EffectRegistry {
    /// Empty registry stamping instances with a [`SystemClock`].
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock::new()))
    }

    /// Empty registry with an explicit clock.
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::default())),
            clock,
        }
    }

    /// Bind `application` to `config.id`. A duplicate id is logged and rejected.
    pub fn register(
        &self,
        config: EffectConfig,
        application: impl EffectApplication + 'static,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.effects.contains_key(&config.id) {
            tracing::warn!(effect = %config.id, "effect already registered; ignoring");
            return false;
        }
        inner.effects.insert(
            config.id.clone(),
            Registered {
                config,
                application: Rc::new(application),
            },
        );
        true
    }

    /// [`EffectRegistry::register`] for a plain `apply` closure.
    pub fn register_fn<F>(&self, config: EffectConfig, apply: F) -> bool
    where
        F: Fn(&ElementState, f64, &Props, f64) -> ElementState + 'static,
    {
        self.register(config, FnEffect(apply))
    }

    /// Remove an effect, running `cleanup` on and deleting every instance of it first.
    pub fn unregister(&self, effect_id: &str) -> bool {
        let (application, orphans) = {
            let mut inner = self.inner.borrow_mut();
            let Some(registered) = inner.effects.remove(effect_id) else {
                return false;
            };
            let ids: Vec<InstanceId> = inner
                .instances
                .values()
                .filter(|i| i.effect_id == effect_id)
                .map(|i| i.id.clone())
                .collect();
            let orphans: Vec<EffectInstance> = ids
                .iter()
                .filter_map(|id| inner.instances.remove(id))
                .collect();
            (registered.application, orphans)
        };
        for mut instance in orphans {
            application.cleanup(&mut instance);
        }
        true
    }

    /// Create an instance of `effect_id` bound to `target`.
    ///
    /// `params` are merged over the effect's defaults; schema mismatches are logged, not
    /// rejected. Fails only when `effect_id` is not registered.
    pub fn create_instance(
        &self,
        effect_id: &str,
        target: &str,
        params: Option<&Props>,
    ) -> StoryboardResult<InstanceId> {
        let (application, mut instance) = {
            let inner = self.inner.borrow();
            let Some(registered) = inner.effects.get(effect_id) else {
                return Err(StoryboardError::unknown_effect(effect_id));
            };
            let defaults = &registered.config.default_params;
            let params = match params {
                Some(overrides) => overrides.merged_over(defaults),
                None => defaults.clone(),
            };
            for problem in registered.config.validate_params(&params) {
                tracing::warn!(effect = effect_id, target, "{problem}");
            }

            let base = format!("{effect_id}-{target}-{}", self.clock.now().as_millis());
            let mut id = InstanceId(base.clone());
            let mut n = 1;
            while inner.instances.contains_key(&id) {
                id = InstanceId(format!("{base}-{n}"));
                n += 1;
            }

            let instance = EffectInstance {
                id,
                effect_id: effect_id.to_string(),
                target: target.to_string(),
                params,
                runtime: RuntimeState::default(),
                internal: serde_json::Value::Null,
            };
            (Rc::clone(&registered.application), instance)
        };

        application.initialize(&mut instance);
        let id = instance.id.clone();
        self.inner.borrow_mut().instances.insert(id.clone(), instance);
        Ok(id)
    }

    /// Run the instance's `apply` and return the resulting state.
    ///
    /// Fails open: a missing instance or application is logged and `state` comes back unchanged.
    pub fn apply_instance(
        &self,
        id: &InstanceId,
        state: &ElementState,
        progress: f64,
        delta: f64,
    ) -> ElementState {
        let (application, params) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let Some(instance) = inner.instances.get_mut(id) else {
                tracing::warn!(instance = %id, "apply on unknown effect instance; skipping");
                return state.clone();
            };
            let Some(registered) = inner.effects.get(&instance.effect_id) else {
                tracing::warn!(
                    instance = %id,
                    effect = %instance.effect_id,
                    "effect application missing; skipping"
                );
                return state.clone();
            };
            instance.runtime = RuntimeState {
                is_active: progress > 0.0 && progress < 1.0,
                progress,
                last_update: Some(self.clock.now()),
            };
            (Rc::clone(&registered.application), instance.params.clone())
        };
        application.apply(state, progress, &params, delta)
    }

    /// Run the instance's continuous `update` hook, if its application declares one.
    pub fn update_instance(
        &self,
        id: &InstanceId,
        state: &ElementState,
        delta: f64,
    ) -> Option<ElementState> {
        let (application, params, mut internal) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let instance = inner.instances.get_mut(id)?;
            let registered = inner.effects.get(&instance.effect_id)?;
            if !registered.application.is_continuous() {
                return None;
            }
            instance.runtime.last_update = Some(self.clock.now());
            (
                Rc::clone(&registered.application),
                instance.params.clone(),
                std::mem::take(&mut instance.internal),
            )
        };
        let out = application.update(state, delta, &params, &mut internal);
        if let Some(instance) = self.inner.borrow_mut().instances.get_mut(id) {
            instance.internal = internal;
        }
        out
    }

    /// Whether the instance's application runs a continuous `update`.
    pub fn is_continuous(&self, id: &InstanceId) -> bool {
        let inner = self.inner.borrow();
        inner
            .instances
            .get(id)
            .and_then(|i| inner.effects.get(&i.effect_id))
            .is_some_and(|r| r.application.is_continuous())
    }

    /// Mark an instance inactive (it was skipped this frame).
    pub fn deactivate_instance(&self, id: &InstanceId) {
        if let Some(instance) = self.inner.borrow_mut().instances.get_mut(id) {
            instance.runtime.is_active = false;
        }
    }

    /// Run `cleanup` and delete the instance.
    pub fn destroy_instance(&self, id: &InstanceId) -> bool {
        let (application, mut instance) = {
            let mut inner = self.inner.borrow_mut();
            let Some(instance) = inner.instances.remove(id) else {
                return false;
            };
            let application = inner
                .effects
                .get(&instance.effect_id)
                .map(|r| Rc::clone(&r.application));
            (application, instance)
        };
        if let Some(application) = application {
            application.cleanup(&mut instance);
        }
        true
    }

    /// Snapshot of an instance.
    pub fn instance(&self, id: &InstanceId) -> Option<EffectInstance> {
        self.inner.borrow().instances.get(id).cloned()
    }

    /// Ids of every instance of `effect_id`.
    pub fn instances_of(&self, effect_id: &str) -> Vec<InstanceId> {
        self.inner
            .borrow()
            .instances
            .values()
            .filter(|i| i.effect_id == effect_id)
            .map(|i| i.id.clone())
            .collect()
    }

    /// Number of live instances.
    pub fn instance_count(&self) -> usize {
        self.inner.borrow().instances.len()
    }

    /// Configuration of `effect_id`.
    pub fn get_config(&self, effect_id: &str) -> Option<EffectConfig> {
        self.inner
            .borrow()
            .effects
            .get(effect_id)
            .map(|r| r.config.clone())
    }

    /// Return `true` when `effect_id` is registered.
    pub fn contains(&self, effect_id: &str) -> bool {
        self.inner.borrow().effects.contains_key(effect_id)
    }

    /// Every registered configuration, sorted by id.
    pub fn get_all(&self) -> Vec<EffectConfig> {
        self.inner
            .borrow()
            .effects
            .values()
            .map(|r| r.config.clone())
            .collect()
    }

    /// Registered configurations in `category`, sorted by id.
    pub fn get_by_category(&self, category: EffectCategory) -> Vec<EffectConfig> {
        self.inner
            .borrow()
            .effects
            .values()
            .filter(|r| r.config.category == category)
            .map(|r| r.config.clone())
            .collect()
    }

    /// Number of registered effects.
    pub fn len(&self) -> usize {
        self.inner.borrow().effects.len()
    }

    /// Return `true` when no effect is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().effects.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("effects", &self.len())
            .field("instances", &self.instance_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
