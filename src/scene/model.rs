use crate::animation::ease::{Ease, EaseSpec};
use crate::foundation::props::Props;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named sub-interval `[start, end]` of a scene's progress domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    /// Phase start in scene progress, `[0, 1]`.
    pub start: f64,
    /// Phase end in scene progress, `[0, 1]`, strictly greater than `start`.
    pub end: f64,
    /// Optional easing applied to the linear phase progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<EaseSpec>,
}

impl PhaseDefinition {
    /// Linear phase over `[start, end]`.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            ease: None,
        }
    }

    /// Builder-style easing.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = Some(EaseSpec::Known(ease));
        self
    }
}

/// Phases of a scene in declaration order.
///
/// Declaration order is significant: when an effect lists several phases, the first one (in
/// this order) that is mid-flight drives it. Deserialization keeps the document's key order;
/// a repeated key replaces the earlier definition in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseMap {
    entries: Vec<(String, PhaseDefinition)>,
}

impl PhaseMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, phase: PhaseDefinition) -> Self {
        self.insert(name, phase);
        self
    }

    /// Insert a phase, replacing an existing one of the same name without moving it.
    pub fn insert(&mut self, name: impl Into<String>, phase: PhaseDefinition) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = phase,
            None => self.entries.push((name, phase)),
        }
    }

    /// Phase by name.
    pub fn get(&self, name: &str) -> Option<&PhaseDefinition> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    /// Return `true` when a phase named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhaseDefinition)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Phase names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when no phase is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, PhaseDefinition)> for PhaseMap {
    fn from_iter<I: IntoIterator<Item = (S, PhaseDefinition)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, phase) in iter {
            map.insert(name, phase);
        }
        map
    }
}

impl Serialize for PhaseMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, phase) in &self.entries {
            map.serialize_entry(name, phase)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PhaseMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> serde::de::Visitor<'de> for OrderedVisitor {
            type Value = PhaseMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of phase name to { start, end, ease? }")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<Self::Value, A::Error> {
                let mut map = PhaseMap::new();
                while let Some((name, phase)) = access.next_entry::<String, PhaseDefinition>()? {
                    map.insert(name, phase);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Scroll distance a scene occupies. Opaque to the core; only scroll drivers interpret it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    /// Multiple of the viewport height.
    Viewports(f64),
    /// Driver expression such as `"200%"`, `"+=150%"` or `"800px"`.
    Expr(String),
}

impl Default for DurationSpec {
    fn default() -> Self {
        Self::Viewports(1.0)
    }
}

impl DurationSpec {
    /// Length in viewport heights for a viewport of `viewport_px` pixels.
    ///
    /// Unparseable expressions and non-positive results fall back to one viewport.
    pub fn viewports(&self, viewport_px: f64) -> f64 {
        let v = match self {
            Self::Viewports(v) => Some(*v),
            Self::Expr(expr) => {
                let e = expr.trim();
                let e = e.strip_prefix("+=").unwrap_or(e).trim();
                if let Some(pct) = e.strip_suffix('%') {
                    pct.trim().parse::<f64>().ok().map(|p| p / 100.0)
                } else if let Some(px) = e.strip_suffix("px") {
                    px.trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|_| viewport_px > 0.0)
                        .map(|p| p / viewport_px)
                } else {
                    e.parse::<f64>().ok()
                }
            }
        };
        match v {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 1.0,
        }
    }
}

/// Scroll-linking smoothing: `true` for direct linking, a number for a smoothing lag in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scrub {
    /// Direct (`true`) or no (`false`) scroll linking.
    Enabled(bool),
    /// Smoothing lag in seconds.
    Smoothing(f64),
}

impl Default for Scrub {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

/// An element a scene uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementRef {
    /// Element id in the element registry.
    pub id: String,
    /// Persistent elements receive scene enter/exit lifecycle callbacks.
    #[serde(default)]
    pub persistent: bool,
}

/// An effect bound to a target element during some phases of a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectRef {
    /// Effect id in the effect registry.
    pub id: String,
    /// Target element id.
    pub target: String,
    /// Phases that drive the effect.
    #[serde(default)]
    pub phases: Vec<String>,
    /// Overrides merged over the effect's default params.
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub params: Props,
}

impl EffectRef {
    /// Bind `effect` to `target` during `phases`.
    pub fn new<I, S>(effect: impl Into<String>, target: impl Into<String>, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: effect.into(),
            target: target.into(),
            phases: phases.into_iter().map(Into::into).collect(),
            params: Props::new(),
        }
    }

    /// Builder-style params.
    pub fn with_params(mut self, params: Props) -> Self {
        self.params = params;
        self
    }
}

/// Immutable configuration of one scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Unique scene id; also the host lookup key for the scene's root container.
    pub id: String,
    /// Position in the storyboard. Orders are unique and contiguous.
    pub order: u32,
    /// Scroll distance the scene occupies.
    #[serde(default)]
    pub duration: DurationSpec,
    /// Named phases in declaration order.
    #[serde(default)]
    pub phases: PhaseMap,
    /// Elements the scene uses.
    #[serde(default)]
    pub elements: Vec<ElementRef>,
    /// Effects the scene drives.
    #[serde(default)]
    pub effects: Vec<EffectRef>,
    /// Whether the scene is pinned while active.
    #[serde(default)]
    pub pin: bool,
    /// Scroll-linking mode.
    #[serde(default)]
    pub scrub: Scrub,
}

impl SceneConfig {
    /// Scene with no phases, elements, or effects.
    pub fn new(id: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
            duration: DurationSpec::default(),
            phases: PhaseMap::new(),
            elements: Vec::new(),
            effects: Vec::new(),
            pin: false,
            scrub: Scrub::default(),
        }
    }

    /// Builder-style phase.
    pub fn with_phase(mut self, name: impl Into<String>, phase: PhaseDefinition) -> Self {
        self.phases.insert(name, phase);
        self
    }

    /// Builder-style element reference.
    pub fn with_element(mut self, id: impl Into<String>, persistent: bool) -> Self {
        self.elements.push(ElementRef {
            id: id.into(),
            persistent,
        });
        self
    }

    /// Builder-style effect reference.
    pub fn with_effect(mut self, effect: EffectRef) -> Self {
        self.effects.push(effect);
        self
    }

    /// Builder-style duration.
    pub fn with_duration(mut self, duration: DurationSpec) -> Self {
        self.duration = duration;
        self
    }

    /// Builder-style pin flag.
    pub fn pinned(mut self, pin: bool) -> Self {
        self.pin = pin;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
