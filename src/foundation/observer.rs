use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by [`Subject::on`]; pass it back to [`Subject::off`] to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Listener<P> = Rc<dyn Fn(&P)>;

/// Keyed observer list with subscription-order delivery.
///
/// Slots are never reused, so a stale [`ListenerId`] can never remove a newer listener and
/// `off` stays O(1). Emission snapshots the matching listeners and releases the internal borrow
/// before invoking them: callbacks may subscribe, unsubscribe, or emit re-entrantly. Listeners
/// added during an emission first fire on the next one.
pub struct Subject<K, P> {
    slots: RefCell<Vec<Option<(K, Listener<P>)>>>,
    live: Cell<usize>,
}

impl<K: PartialEq, P> Subject<K, P> {
    /// Empty subject.
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            live: Cell::new(0),
        }
    }

    /// Subscribe `listener` to `key`.
    pub fn on(&self, key: K, listener: impl Fn(&P) + 'static) -> ListenerId {
        let mut slots = self.slots.borrow_mut();
        slots.push(Some((key, Rc::new(listener))));
        self.live.set(self.live.get() + 1);
        ListenerId(slots.len() - 1)
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut slots = self.slots.borrow_mut();
        match slots.get_mut(id.0) {
            Some(slot @ Some(_)) => {
                *slot = None;
                self.live.set(self.live.get() - 1);
                true
            }
            _ => false,
        }
    }

    /// Remove every listener registered under `key`; returns how many were removed.
    pub fn off_key(&self, key: &K) -> usize {
        let mut removed = 0;
        for slot in self.slots.borrow_mut().iter_mut() {
            if slot.as_ref().is_some_and(|(k, _)| k == key) {
                *slot = None;
                removed += 1;
            }
        }
        self.live.set(self.live.get() - removed);
        removed
    }

    /// Drop every listener.
    pub fn clear(&self) {
        for slot in self.slots.borrow_mut().iter_mut() {
            *slot = None;
        }
        self.live.set(0);
    }

    /// Deliver `payload` to every listener of `key`, in subscription order.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, key: &K, payload: &P) -> usize {
        let targets: Vec<Listener<P>> = self
            .slots
            .borrow()
            .iter()
            .flatten()
            .filter(|(k, _)| k == key)
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in &targets {
            listener(payload);
        }
        targets.len()
    }

    /// Number of live listeners for `key`.
    pub fn listener_count(&self, key: &K) -> usize {
        self.slots
            .borrow()
            .iter()
            .flatten()
            .filter(|(k, _)| k == key)
            .count()
    }

    /// Number of live listeners across all keys.
    pub fn len(&self) -> usize {
        self.live.get()
    }

    /// Return `true` when no listener is live.
    pub fn is_empty(&self) -> bool {
        self.live.get() == 0
    }
}

impl<K: PartialEq, P> Default for Subject<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> std::fmt::Debug for Subject<K, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("listeners", &self.live.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/observer.rs"]
mod tests;
