use crate::elements::model::{ElementConfig, ElementPatch, ElementState};
use crate::foundation::observer::{ListenerId, Subject};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Handle returned by [`ElementRegistry::subscribe`].
pub type SubscriptionId = ListenerId;

/// Scene lifecycle hook for persistent elements.
pub trait ElementLifecycle {
    /// A scene referencing the element was entered.
    fn on_scene_enter(&self, element_id: &str, scene_id: &str);
    /// A scene referencing the element was left.
    fn on_scene_exit(&self, element_id: &str, scene_id: &str);
}

struct Entry {
    config: ElementConfig,
    state: ElementState,
    lifecycle: Option<Rc<dyn ElementLifecycle>>,
}

/// Element configurations, their current state, and state subscribers.
///
/// A cheap-clone handle: clones share the same storage. All methods take `&self`; no internal
/// borrow is held while subscriber callbacks or lifecycle hooks run, so those may call back
/// into the registry.
#[derive(Clone, Default)]
pub struct ElementRegistry {
    entries: Rc<RefCell<BTreeMap<String, Entry>>>,
    subscribers: Rc<Subject<String, ElementState>>,
}

impl ElementRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element; its current state starts as a copy of `initial_state`.
    ///
    /// Out-of-range opacity or morph progress in `initial_state` is clamped into `[0, 1]`, and
    /// the stored config keeps the clamped values so `reset` restores them too. A duplicate id
    /// is logged and ignored. Returns whether the element was added.
    pub fn register(&self, mut config: ElementConfig) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&config.id) {
            tracing::warn!(element = %config.id, "element already registered; ignoring");
            return false;
        }
        config.initial_state = config.initial_state.clamped();
        let state = config.initial_state.clone();
        entries.insert(
            config.id.clone(),
            Entry {
                config,
                state,
                lifecycle: None,
            },
        );
        true
    }

    /// Remove an element along with its state, lifecycle hook, and subscriptions.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.entries.borrow_mut().remove(id).is_some();
        if removed {
            self.subscribers.off_key(&id.to_string());
        }
        removed
    }

    /// Remove every element and subscription.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.subscribers.clear();
    }

    /// Current state of `id`.
    pub fn get_state(&self, id: &str) -> Option<ElementState> {
        self.entries.borrow().get(id).map(|e| e.state.clone())
    }

    /// Configuration of `id`.
    pub fn get_config(&self, id: &str) -> Option<ElementConfig> {
        self.entries.borrow().get(id).map(|e| e.config.clone())
    }

    /// Return `true` when `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.borrow().contains_key(id)
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Merge `patch` into the state of `id`, then notify its subscribers in subscription order.
    ///
    /// Unknown ids are logged and ignored. Returns whether the element exists.
    pub fn set_state(&self, id: &str, patch: ElementPatch) -> bool {
        let snapshot = {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(id) else {
                tracing::warn!(element = id, "set_state on unknown element; ignoring");
                return false;
            };
            entry.state.apply(patch);
            entry.state.clone()
        };
        self.subscribers.emit(&id.to_string(), &snapshot);
        true
    }

    /// Subscribe to state changes of `id`.
    ///
    /// Subscribing to an id that is not (yet) registered is allowed; the callback fires once the
    /// element exists and changes. Unregistering the element drops the subscription.
    pub fn subscribe(
        &self,
        id: &str,
        callback: impl Fn(&ElementState) + 'static,
    ) -> SubscriptionId {
        self.subscribers.on(id.to_string(), callback)
    }

    /// Drop a subscription. Idempotent; returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.subscribers.off(subscription)
    }

    /// Number of live subscriptions for `id`.
    pub fn subscriber_count(&self, id: &str) -> usize {
        self.subscribers.listener_count(&id.to_string())
    }

    /// Elements that list `scene_id` among their scenes.
    pub fn scene_elements(&self, scene_id: &str) -> Vec<ElementConfig> {
        self.entries
            .borrow()
            .values()
            .filter(|e| e.config.scenes.iter().any(|s| s == scene_id))
            .map(|e| e.config.clone())
            .collect()
    }

    /// Global-scope elements.
    pub fn persistent_elements(&self) -> Vec<ElementConfig> {
        self.entries
            .borrow()
            .values()
            .filter(|e| e.config.is_persistent())
            .map(|e| e.config.clone())
            .collect()
    }

    /// Restore the initial state of `id` and notify subscribers.
    pub fn reset(&self, id: &str) -> bool {
        let Some(initial) = self
            .entries
            .borrow()
            .get(id)
            .map(|e| e.config.initial_state.clone())
        else {
            tracing::warn!(element = id, "reset on unknown element; ignoring");
            return false;
        };
        self.replace_state(id, initial)
    }

    /// Restore the initial state of every element.
    pub fn reset_all(&self) {
        for id in self.ids() {
            self.reset(&id);
        }
    }

    fn replace_state(&self, id: &str, state: ElementState) -> bool {
        {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(id) else {
                return false;
            };
            entry.state = state.clone();
        }
        self.subscribers.emit(&id.to_string(), &state);
        true
    }

    /// Attach a scene lifecycle hook to `id`, replacing any previous one.
    pub fn set_lifecycle(&self, id: &str, hook: impl ElementLifecycle + 'static) -> bool {
        match self.entries.borrow_mut().get_mut(id) {
            Some(entry) => {
                entry.lifecycle = Some(Rc::new(hook));
                true
            }
            None => {
                tracing::warn!(element = id, "lifecycle hook for unknown element; ignoring");
                false
            }
        }
    }

    /// Tell `id` that `scene_id` was entered.
    pub fn notify_scene_enter(&self, id: &str, scene_id: &str) {
        if let Some(hook) = self.lifecycle_of(id) {
            hook.on_scene_enter(id, scene_id);
        }
    }

    /// Tell `id` that `scene_id` was left.
    pub fn notify_scene_exit(&self, id: &str, scene_id: &str) {
        if let Some(hook) = self.lifecycle_of(id) {
            hook.on_scene_exit(id, scene_id);
        }
    }

    fn lifecycle_of(&self, id: &str) -> Option<Rc<dyn ElementLifecycle>> {
        self.entries
            .borrow()
            .get(id)
            .and_then(|e| e.lifecycle.clone())
    }
}

impl std::fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("elements", &self.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/elements/registry.rs"]
mod tests;
