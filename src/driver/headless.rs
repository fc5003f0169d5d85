use crate::driver::{DriverBinding, DriverSignal, SceneRoot, ScrollDriver, TransitionOptions};
use crate::scene::model::SceneConfig;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

#[derive(Clone, Debug)]
struct Span {
    binding: DriverBinding,
    scene_id: String,
    order: u32,
    length_px: f64,
}

/// A scroll-to request recorded by [`HeadlessDriver::scroll_to`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollRequest {
    /// Scene whose root was requested.
    pub scene_id: String,
    /// Page position the request resolves to.
    pub position_px: f64,
    /// Options passed by the caller.
    pub opts: TransitionOptions,
}

/// In-memory scroll driver: scenes stacked end-to-end on a virtual page.
///
/// Each attached scene spans `duration.viewports(viewport_px) * viewport_px` pixels. Moving the
/// virtual scroll position with [`HeadlessDriver::scroll_to_position`] yields the signals a
/// scroll-trigger library would fire; the caller forwards them to the manager.
#[derive(Debug)]
pub struct HeadlessDriver {
    viewport_px: f64,
    spans: RefCell<Vec<Span>>,
    roots: RefCell<BTreeMap<String, SceneRoot>>,
    missing_roots: HashSet<String>,
    position: Cell<Option<f64>>,
    next_id: Cell<u64>,
    requests: RefCell<Vec<ScrollRequest>>,
    refreshes: Cell<u32>,
}

impl HeadlessDriver {
    /// Driver for a viewport `viewport_px` pixels tall.
    pub fn new(viewport_px: f64) -> Self {
        Self {
            viewport_px: if viewport_px > 0.0 { viewport_px } else { 1.0 },
            spans: RefCell::new(Vec::new()),
            roots: RefCell::new(BTreeMap::new()),
            missing_roots: HashSet::new(),
            position: Cell::new(None),
            next_id: Cell::new(1),
            requests: RefCell::new(Vec::new()),
            refreshes: Cell::new(0),
        }
    }

    /// Builder-style: `scene_id` has no root in this host.
    pub fn without_root(mut self, scene_id: impl Into<String>) -> Self {
        self.missing_roots.insert(scene_id.into());
        self
    }

    /// Viewport height in pixels.
    pub fn viewport_px(&self) -> f64 {
        self.viewport_px
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// `(scene_id, start_px, end_px)` for every attached scene, in scene order.
    pub fn layout(&self) -> Vec<(String, f64, f64)> {
        let mut spans = self.spans.borrow().clone();
        spans.sort_by_key(|s| s.order);
        let mut at = 0.0;
        spans
            .into_iter()
            .map(|s| {
                let start = at;
                at += s.length_px;
                (s.scene_id, start, at)
            })
            .collect()
    }

    /// Total scrollable length of the virtual page.
    pub fn total_px(&self) -> f64 {
        self.layout().last().map_or(0.0, |(_, _, end)| *end)
    }

    /// Start of `scene_id`'s span, if attached.
    pub fn position_of(&self, scene_id: &str) -> Option<f64> {
        self.layout()
            .into_iter()
            .find(|(id, _, _)| id == scene_id)
            .map(|(_, start, _)| start)
    }

    /// Current virtual scroll position, `None` before the first move.
    pub fn position(&self) -> Option<f64> {
        self.position.get()
    }

    /// Move the virtual scroll position and return the resulting signals.
    ///
    /// Scenes are visited in scroll direction, so a scene is left before the next one is
    /// entered. Scenes jumped over completely still get `Enter`, a final `Progress`, and `Leave`.
    pub fn scroll_to_position(&self, position_px: f64) -> Vec<(String, DriverSignal)> {
        let layout = self.layout();
        let total = layout.last().map_or(0.0, |(_, _, end)| *end);
        let new = position_px.clamp(0.0, total.max(0.0));
        let old = self.position.replace(Some(new));
        let forward = old.is_none_or(|o| new >= o);
        let old = old.unwrap_or(f64::NEG_INFINITY);

        let last = layout.len().saturating_sub(1);
        let inside = |i: usize, start: f64, end: f64, pos: f64| {
            start <= pos && (pos < end || (i == last && pos <= end))
        };

        let mut visit: Vec<usize> = (0..layout.len()).collect();
        if !forward {
            visit.reverse();
        }

        let mut out = Vec::new();
        for i in visit {
            let (id, start, end) = &layout[i];
            let (start, end) = (*start, *end);
            let progress = |pos: f64| {
                let len = end - start;
                if len > 0.0 { ((pos - start) / len).clamp(0.0, 1.0) } else { 1.0 }
            };
            let was = inside(i, start, end, old);
            let now = inside(i, start, end, new);

            match (was, now) {
                (false, true) => {
                    out.push((id.clone(), DriverSignal::Enter));
                    out.push((id.clone(), DriverSignal::Progress(progress(new))));
                }
                (true, true) => {
                    if old != new {
                        out.push((id.clone(), DriverSignal::Progress(progress(new))));
                    }
                }
                (true, false) => {
                    out.push((id.clone(), DriverSignal::Progress(progress(new))));
                    out.push((id.clone(), DriverSignal::Leave));
                }
                (false, false) => {
                    let crossed = (old < start && new >= end) || (old >= end && new < start);
                    if crossed {
                        out.push((id.clone(), DriverSignal::Enter));
                        out.push((id.clone(), DriverSignal::Progress(progress(new))));
                        out.push((id.clone(), DriverSignal::Leave));
                    }
                }
            }
        }
        out
    }

    /// Drain the recorded scroll-to requests.
    pub fn take_requests(&self) -> Vec<ScrollRequest> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }

    /// Number of [`ScrollDriver::refresh`] calls.
    pub fn refresh_count(&self) -> u32 {
        self.refreshes.get()
    }

    /// Number of live bindings.
    pub fn binding_count(&self) -> usize {
        self.spans.borrow().len()
    }
}

impl Default for HeadlessDriver {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl ScrollDriver for HeadlessDriver {
    fn resolve_root(&self, scene_id: &str) -> Option<SceneRoot> {
        if self.missing_roots.contains(scene_id) {
            return None;
        }
        if let Some(root) = self.roots.borrow().get(scene_id) {
            return Some(*root);
        }
        let root = SceneRoot(self.next());
        self.roots.borrow_mut().insert(scene_id.to_string(), root);
        Some(root)
    }

    fn attach(&self, scene: &SceneConfig, _root: &SceneRoot) -> DriverBinding {
        let binding = DriverBinding(self.next());
        self.spans.borrow_mut().push(Span {
            binding,
            scene_id: scene.id.clone(),
            order: scene.order,
            length_px: scene.duration.viewports(self.viewport_px) * self.viewport_px,
        });
        binding
    }

    fn detach(&self, binding: DriverBinding) {
        self.spans.borrow_mut().retain(|s| s.binding != binding);
    }

    fn scroll_to(&self, root: &SceneRoot, opts: &TransitionOptions) {
        let scene_id = self
            .roots
            .borrow()
            .iter()
            .find(|(_, r)| *r == root)
            .map(|(id, _)| id.clone());
        let Some(scene_id) = scene_id else {
            tracing::warn!(root = root.0, "scroll_to for unknown root; ignoring");
            return;
        };
        let Some(start) = self.position_of(&scene_id) else {
            tracing::warn!(scene = %scene_id, "scroll_to for detached scene; ignoring");
            return;
        };
        self.requests.borrow_mut().push(ScrollRequest {
            scene_id,
            position_px: start + opts.offset_px,
            opts: opts.clone(),
        });
    }

    fn refresh(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/headless.rs"]
mod tests;
