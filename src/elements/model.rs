use crate::foundation::core::{Vec3, clamp01};
use crate::foundation::props::Props;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Mutable state of one element, as seen by renderers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    /// Whether the element is shown at all.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Optional position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// Optional rotation (radians per axis).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    /// Optional scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    /// Free-form material properties, owned by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Props>,
    /// Morph target name for morphable elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph_target: Option<String>,
    /// Morph progress toward `morph_target`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph_progress: Option<f64>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            position: None,
            rotation: None,
            scale: None,
            material: None,
            morph_target: None,
            morph_progress: None,
        }
    }
}

impl ElementState {
    /// Hidden, fully transparent state.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            opacity: 0.0,
            ..Self::default()
        }
    }

    /// Shallow merge: every key present in `patch` replaces the current value.
    pub fn apply(&mut self, patch: ElementPatch) {
        if let Some(v) = patch.visible {
            self.visible = v;
        }
        if let Some(v) = patch.opacity {
            self.opacity = clamp01(v);
        }
        if let Some(v) = patch.position {
            self.position = Some(v);
        }
        if let Some(v) = patch.rotation {
            self.rotation = Some(v);
        }
        if let Some(v) = patch.scale {
            self.scale = Some(v);
        }
        if let Some(v) = patch.material {
            self.material = Some(v);
        }
        if let Some(v) = patch.morph_target {
            self.morph_target = Some(v);
        }
        if let Some(v) = patch.morph_progress {
            self.morph_progress = Some(clamp01(v));
        }
    }

    /// Copy with `opacity` and `morph_progress` pulled into `[0, 1]`.
    pub(crate) fn clamped(mut self) -> Self {
        self.opacity = clamp01(self.opacity);
        self.morph_progress = self.morph_progress.map(clamp01);
        self
    }

    /// Copy with `patch` applied.
    pub fn patched(&self, patch: ElementPatch) -> Self {
        let mut out = self.clone();
        out.apply(patch);
        out
    }
}

/// Partial [`ElementState`] update. Absent keys leave the current value untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// New opacity (clamped on merge).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// New position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// New rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    /// New scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    /// Replacement material bag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<Props>,
    /// New morph target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morph_target: Option<String>,
    /// New morph progress (clamped on merge).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morph_progress: Option<f64>,
}

impl ElementPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style visibility.
    pub fn visible(mut self, v: bool) -> Self {
        self.visible = Some(v);
        self
    }

    /// Builder-style opacity.
    pub fn opacity(mut self, v: f64) -> Self {
        self.opacity = Some(v);
        self
    }

    /// Builder-style position.
    pub fn position(mut self, v: Vec3) -> Self {
        self.position = Some(v);
        self
    }

    /// Builder-style rotation.
    pub fn rotation(mut self, v: Vec3) -> Self {
        self.rotation = Some(v);
        self
    }

    /// Builder-style scale.
    pub fn scale(mut self, v: Vec3) -> Self {
        self.scale = Some(v);
        self
    }

    /// Builder-style material.
    pub fn material(mut self, v: Props) -> Self {
        self.material = Some(v);
        self
    }

    /// Builder-style morph target and progress.
    pub fn morph(mut self, target: impl Into<String>, progress: f64) -> Self {
        self.morph_target = Some(target.into());
        self.morph_progress = Some(progress);
        self
    }

    /// Return `true` when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch holding only the keys where `new` differs from `old`.
    ///
    /// Optional keys that `new` cleared cannot be expressed as a patch and are left out.
    pub fn diff(old: &ElementState, new: &ElementState) -> Self {
        fn changed<T: Clone + PartialEq>(old: &Option<T>, new: &Option<T>) -> Option<T> {
            if old != new { new.clone() } else { None }
        }
        Self {
            visible: (old.visible != new.visible).then_some(new.visible),
            opacity: (old.opacity != new.opacity).then_some(new.opacity),
            position: changed(&old.position, &new.position),
            rotation: changed(&old.rotation, &new.rotation),
            scale: changed(&old.scale, &new.scale),
            material: changed(&old.material, &new.material),
            morph_target: changed(&old.morph_target, &new.morph_target),
            morph_progress: changed(&old.morph_progress, &new.morph_progress),
        }
    }
}

/// Whether an element lives inside one scene or persists across scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementScope {
    /// Scoped to the scenes that reference it.
    #[default]
    Scene,
    /// Persists across scene boundaries.
    Global,
}

/// Registration-time configuration of one element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// Unique element id.
    pub id: String,
    /// Scene-scoped or global.
    #[serde(default)]
    pub scope: ElementScope,
    /// Scenes that reference the element.
    #[serde(default)]
    pub scenes: Vec<String>,
    /// State restored by `register` and `reset`, clamped on registration.
    #[serde(default)]
    pub initial_state: ElementState,
    /// Whether the element supports morph targets.
    #[serde(default)]
    pub morphable: bool,
}

impl ElementConfig {
    /// Scene-scoped element with the default initial state.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope: ElementScope::Scene,
            scenes: Vec::new(),
            initial_state: ElementState::default(),
            morphable: false,
        }
    }

    /// Builder-style global scope.
    pub fn global(mut self) -> Self {
        self.scope = ElementScope::Global;
        self
    }

    /// Builder-style scene membership.
    pub fn in_scene(mut self, scene_id: impl Into<String>) -> Self {
        self.scenes.push(scene_id.into());
        self
    }

    /// Builder-style initial state.
    pub fn with_initial_state(mut self, state: ElementState) -> Self {
        self.initial_state = state;
        self
    }

    /// Return `true` for global elements.
    pub fn is_persistent(&self) -> bool {
        self.scope == ElementScope::Global
    }
}

#[cfg(test)]
#[path = "../../tests/unit/elements/model.rs"]
mod tests;
