use crate::scene::controller::SceneDebugInfo;
use crate::scene::phase::PhaseValidation;
use std::collections::BTreeMap;

/// Snapshot from [`crate::StoryboardManager::get_debug_info`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StoryboardDebugInfo {
    /// Whether the manager is initialized.
    pub initialized: bool,
    /// Id of the active scene.
    pub active_scene: Option<String>,
    /// Per-scene snapshots in scene order.
    pub scenes: Vec<SceneDebugInfo>,
    /// Registered elements.
    pub element_count: usize,
    /// Registered effect definitions.
    pub effect_count: usize,
    /// Live effect instances.
    pub instance_count: usize,
    /// Phase diagnostics keyed by scene id.
    pub phase_diagnostics: BTreeMap<String, PhaseValidation>,
}

impl StoryboardDebugInfo {
    /// Snapshot of scene `id`.
    pub fn scene(&self, id: &str) -> Option<&SceneDebugInfo> {
        self.scenes.iter().find(|s| s.id == id)
    }

    /// Pretty-printed JSON, as written by the CLI.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
