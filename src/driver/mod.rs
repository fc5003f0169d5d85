//! The boundary to whatever links scroll position to scenes.
//!
//! A driver resolves scene roots, keeps one binding per initialized scene, and reports scroll
//! activity back through [`crate::StoryboardManager::dispatch`] as [`DriverSignal`]s.

pub(crate) mod headless;

use crate::animation::ease::Ease;
use crate::scene::model::SceneConfig;
use std::time::Duration;

/// Opaque host handle for a scene's root container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct SceneRoot(pub u64);

/// Opaque handle for one scene's scroll-linking binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct DriverBinding(pub u64);

/// Scroll activity for one scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriverSignal {
    /// The scene's scroll range was entered (from either direction).
    Enter,
    /// The scene's scroll range was left (in either direction).
    Leave,
    /// Scene progress in `[0, 1]`.
    Progress(f64),
}

/// How a requested scroll-to-scene should be performed.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionOptions {
    /// Animated scroll duration.
    pub duration: Duration,
    /// Easing for the animated scroll.
    pub ease: Ease,
    /// Pixel offset from the scene root's top.
    pub offset_px: f64,
    /// Jump without animating.
    pub immediate: bool,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1000),
            ease: Ease::InOutCubic,
            offset_px: 0.0,
            immediate: false,
        }
    }
}

/// Host-side scroll linking.
pub trait ScrollDriver {
    /// Resolve the scene's root container, `None` if the host has none.
    fn resolve_root(&self, scene_id: &str) -> Option<SceneRoot>;

    /// Start reporting scroll activity for `scene`.
    fn attach(&self, scene: &SceneConfig, root: &SceneRoot) -> DriverBinding;

    /// Stop reporting for a binding returned by [`ScrollDriver::attach`].
    fn detach(&self, binding: DriverBinding);

    /// Scroll the page so that `root` comes into view.
    fn scroll_to(&self, root: &SceneRoot, opts: &TransitionOptions);

    /// Recompute scroll ranges after layout changes.
    fn refresh(&self) {}
}
