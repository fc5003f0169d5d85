use crate::elements::model::ElementState;
use crate::foundation::core::{Timestamp, Vec3};
use crate::foundation::props::Props;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse grouping of effects, for tooling and introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    /// Position, rotation, scale.
    Transform,
    /// Material properties.
    Material,
    /// Visibility and opacity.
    Visibility,
    /// Morph targets.
    Morph,
    /// Lights and time-of-day.
    Lighting,
    /// Continuous background motion.
    Ambient,
}

/// Expected JSON kind of one effect parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Any JSON number.
    Number,
    /// `true` / `false`.
    Bool,
    /// Any string.
    String,
    /// `[x, y, z]`, `{ x, y, z }`, or a uniform number.
    Vector,
    /// Anything.
    Any,
}

/// Validation metadata for one effect parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Expected kind.
    pub kind: ParamKind,
    /// Inclusive lower bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Whether the parameter must be present after merging defaults.
    #[serde(default)]
    pub required: bool,
}

impl ParamSpec {
    /// Spec for `kind` with no bounds.
    pub fn new(kind: ParamKind) -> Self {
        Self {
            kind,
            min: None,
            max: None,
            required: false,
        }
    }

    /// Builder-style numeric range.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Builder-style required flag.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Registration-time configuration of one effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Unique effect id.
    pub id: String,
    /// Category for tooling.
    pub category: EffectCategory,
    /// Params every instance starts from.
    #[serde(default)]
    pub default_params: Props,
    /// Optional validation metadata, keyed by param name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_schema: Option<BTreeMap<String, ParamSpec>>,
}

impl EffectConfig {
    /// Effect with no default params and no schema.
    pub fn new(id: impl Into<String>, category: EffectCategory) -> Self {
        Self {
            id: id.into(),
            category,
            default_params: Props::new(),
            param_schema: None,
        }
    }

    /// Builder-style default param.
    pub fn with_default(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.default_params.insert(key, value);
        self
    }

    /// Builder-style schema entry.
    pub fn with_param(mut self, key: impl Into<String>, spec: ParamSpec) -> Self {
        self.param_schema
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), spec);
        self
    }

    /// Check merged params against the schema. Unknown keys are never reported.
    pub fn validate_params(&self, params: &Props) -> Vec<String> {
        let Some(schema) = &self.param_schema else {
            return Vec::new();
        };
        let mut problems = Vec::new();
        for (key, spec) in schema {
            let Some(value) = params.get(key) else {
                if spec.required {
                    problems.push(format!("effect '{}': missing required param '{key}'", self.id));
                }
                continue;
            };
            let kind_ok = match spec.kind {
                ParamKind::Number => value.is_number(),
                ParamKind::Bool => value.is_boolean(),
                ParamKind::String => value.is_string(),
                ParamKind::Vector => Vec3::from_json(value).is_some(),
                ParamKind::Any => true,
            };
            if !kind_ok {
                problems.push(format!(
                    "effect '{}': param '{key}' should be {:?}",
                    self.id, spec.kind
                ));
                continue;
            }
            if let Some(n) = value.as_f64() {
                if spec.min.is_some_and(|min| n < min) || spec.max.is_some_and(|max| n > max) {
                    problems.push(format!(
                        "effect '{}': param '{key}' = {n} is outside [{}, {}]",
                        self.id,
                        spec.min.unwrap_or(f64::NEG_INFINITY),
                        spec.max.unwrap_or(f64::INFINITY)
                    ));
                }
            }
        }
        problems
    }
}

/// Identifier of one effect instance: `"{effect}-{target}-{created_ms}"`, suffixed when taken.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    /// Borrow the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-instance bookkeeping updated on every application.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RuntimeState {
    /// Whether the last application happened mid-phase.
    pub is_active: bool,
    /// Progress passed to the last application.
    pub progress: f64,
    /// When the instance was last applied.
    pub last_update: Option<Timestamp>,
}

/// A materialized (effect, target, params) binding.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EffectInstance {
    /// Instance id.
    pub id: InstanceId,
    /// Effect id.
    pub effect_id: String,
    /// Target element id.
    pub target: String,
    /// Default params merged with the binding's overrides.
    pub params: Props,
    /// Application bookkeeping.
    pub runtime: RuntimeState,
    /// Opaque state owned by the effect's application.
    pub internal: serde_json::Value,
}

/// The behavior bound to an effect id.
///
/// `apply` must be a function of its inputs: the controller calls it once per frame with the
/// current element state and trusts that repeating a call with the same progress yields the
/// same state.
pub trait EffectApplication {
    /// Transform `state` for `progress` in `[0, 1]`. `delta` is seconds since the last frame.
    fn apply(
        &self,
        state: &ElementState,
        progress: f64,
        params: &Props,
        delta: f64,
    ) -> ElementState;

    /// Called once when an instance is created.
    fn initialize(&self, _instance: &mut EffectInstance) {}

    /// Called once when an instance is destroyed.
    fn cleanup(&self, _instance: &mut EffectInstance) {}

    /// Whether [`EffectApplication::update`] should run every frame while the scene is active.
    fn is_continuous(&self) -> bool {
        false
    }

    /// Frame-clock hook for continuous effects; returns the new state, if any.
    fn update(
        &self,
        _state: &ElementState,
        _delta: f64,
        _params: &Props,
        _internal: &mut serde_json::Value,
    ) -> Option<ElementState> {
        None
    }
}

/// Adapter turning a closure into an [`EffectApplication`].
pub struct FnEffect<F>(pub F);

impl<F> EffectApplication for FnEffect<F>
where
    F: Fn(&ElementState, f64, &Props, f64) -> ElementState,
{
    fn apply(
        &self,
        state: &ElementState,
        progress: f64,
        params: &Props,
        delta: f64,
    ) -> ElementState {
        (self.0)(state, progress, params, delta)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/model.rs"]
mod tests;
